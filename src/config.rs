use std::fs;

use camino::Utf8Path;
use serde::Deserialize;

use crate::error::{Error, Result};
use crate::model::{ProviderId, ProviderOptions};
use crate::resolver::DEFAULT_PROVIDER;

/// File configuration for the resolver.
///
/// ```toml
/// geocode_providers = ["openstreetmap"]
/// reverse_providers = ["openstreetmap"]
///
/// [options.openstreetmap]
/// language = "en"
/// ```
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// Providers tried, in order, for forward geocoding.
    pub geocode_providers: Vec<ProviderId>,
    /// Providers tried, in order, for reverse geocoding.
    pub reverse_providers: Vec<ProviderId>,
    pub options: ProviderOptions,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            geocode_providers: vec![ProviderId::new(DEFAULT_PROVIDER)],
            reverse_providers: vec![ProviderId::new(DEFAULT_PROVIDER)],
            options: ProviderOptions::default(),
        }
    }
}

impl Config {
    /// Read and parse a TOML configuration file.
    pub fn load(path: &Utf8Path) -> Result<Self> {
        let text = fs::read_to_string(path).map_err(|e| Error::Config {
            path: path.to_owned(),
            reason: e.to_string(),
        })?;
        toml::from_str(&text).map_err(|e| Error::Config {
            path: path.to_owned(),
            reason: e.to_string(),
        })
    }

    /// Parse configuration from a TOML string.
    pub fn from_toml_str(text: &str) -> std::result::Result<Self, toml::de::Error> {
        toml::from_str(text)
    }
}
