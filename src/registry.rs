use std::collections::HashMap;
use std::fmt;

use crate::dumpers::{GeoJsonDumper, GpxDumper, KmlDumper, WktDumper};
use crate::error::{Error, Result};
use crate::model::{Options, ProviderId};
use crate::provider::{Dumper, Provider};
use crate::providers::OpenStreetMap;

/// Builds a fresh provider from its options.
pub type ProviderFactory = Box<dyn Fn(&Options) -> Result<Box<dyn Provider>>>;

/// Builds a fresh dumper from its options.
pub type DumperFactory = Box<dyn Fn(&Options) -> Result<Box<dyn Dumper>>>;

/// The two kinds of plugin a registry holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PluginKind {
    Provider,
    Dumper,
}

impl fmt::Display for PluginKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PluginKind::Provider => f.write_str("provider"),
            PluginKind::Dumper => f.write_str("dumper"),
        }
    }
}

struct Entry<F> {
    name: Option<String>,
    factory: F,
}

impl<F> Entry<F> {
    fn display_name(&self, id: &ProviderId) -> String {
        self.name.clone().unwrap_or_else(|| id.to_string())
    }
}

/// Explicit registration table of provider and dumper plugins.
///
/// Built once at startup and handed to whoever needs to instantiate plugins.
/// Every `resolve_*` call runs the factory again, so instances never share
/// state.
pub struct PluginRegistry {
    providers: HashMap<ProviderId, Entry<ProviderFactory>>,
    dumpers: HashMap<ProviderId, Entry<DumperFactory>>,
}

impl fmt::Debug for PluginRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut providers: Vec<_> = self.providers.keys().map(ProviderId::as_str).collect();
        let mut dumpers: Vec<_> = self.dumpers.keys().map(ProviderId::as_str).collect();
        providers.sort_unstable();
        dumpers.sort_unstable();
        f.debug_struct("PluginRegistry")
            .field("providers", &providers)
            .field("dumpers", &dumpers)
            .finish()
    }
}

impl Default for PluginRegistry {
    fn default() -> Self {
        let mut registry = Self::empty();

        crate::register_provider!(
            registry,
            "openstreetmap",
            "OpenStreetMap",
            OpenStreetMap::from_options
        );

        crate::register_dumper!(registry, "geojson", "GeoJSON", GeoJsonDumper::from_options);
        crate::register_dumper!(registry, "gpx", "GPX", GpxDumper::from_options);
        crate::register_dumper!(registry, "kml", "KML", KmlDumper::from_options);
        crate::register_dumper!(registry, "wkt", "WKT", WktDumper::from_options);

        registry
    }
}

impl PluginRegistry {
    /// A registry with no plugins at all.
    pub fn empty() -> Self {
        Self {
            providers: HashMap::new(),
            dumpers: HashMap::new(),
        }
    }

    /// Register a provider factory, replacing any previous one under `id`.
    ///
    /// Without a display name the plugin is listed under its id.
    pub fn register_provider<F>(
        &mut self,
        id: impl Into<ProviderId>,
        name: Option<&str>,
        factory: F,
    )
    where
        F: Fn(&Options) -> Result<Box<dyn Provider>> + 'static,
    {
        self.providers.insert(
            id.into(),
            Entry {
                name: name.map(str::to_string),
                factory: Box::new(factory),
            },
        );
    }

    /// Register a dumper factory, replacing any previous one under `id`.
    pub fn register_dumper<F>(
        &mut self,
        id: impl Into<ProviderId>,
        name: Option<&str>,
        factory: F,
    )
    where
        F: Fn(&Options) -> Result<Box<dyn Dumper>> + 'static,
    {
        self.dumpers.insert(
            id.into(),
            Entry {
                name: name.map(str::to_string),
                factory: Box::new(factory),
            },
        );
    }

    /// Instantiate the provider registered under `id`.
    pub fn resolve_provider(
        &self,
        id: &ProviderId,
        options: &Options,
    ) -> Result<Box<dyn Provider>> {
        let entry = self.providers.get(id).ok_or_else(|| Error::PluginNotFound {
            kind: PluginKind::Provider,
            id: id.to_string(),
        })?;
        (entry.factory)(options)
    }

    /// Instantiate the dumper registered under `id`.
    pub fn resolve_dumper(&self, id: &ProviderId, options: &Options) -> Result<Box<dyn Dumper>> {
        let entry = self.dumpers.get(id).ok_or_else(|| Error::PluginNotFound {
            kind: PluginKind::Dumper,
            id: id.to_string(),
        })?;
        (entry.factory)(options)
    }

    pub fn contains(&self, kind: PluginKind, id: &ProviderId) -> bool {
        match kind {
            PluginKind::Provider => self.providers.contains_key(id),
            PluginKind::Dumper => self.dumpers.contains_key(id),
        }
    }

    /// All plugins of `kind` as (id, display name), sorted by display name.
    pub fn list_plugins(&self, kind: PluginKind) -> Vec<(ProviderId, String)> {
        let mut plugins: Vec<(ProviderId, String)> = match kind {
            PluginKind::Provider => self
                .providers
                .iter()
                .map(|(id, entry)| (id.clone(), entry.display_name(id)))
                .collect(),
            PluginKind::Dumper => self
                .dumpers
                .iter()
                .map(|(id, entry)| (id.clone(), entry.display_name(id)))
                .collect(),
        };
        plugins.sort_by(|a, b| a.1.cmp(&b.1).then_with(|| a.0.cmp(&b.0)));
        plugins
    }
}

/// Register a provider whose constructor returns a concrete type.
///
/// The display name may be left out, in which case the id is listed.
///
/// # Examples
///
/// ```
/// # use geocoder::{register_provider, PluginKind, PluginRegistry, ProviderId};
/// # use geocoder::providers::OpenStreetMap;
/// let mut registry = PluginRegistry::empty();
/// register_provider!(registry, "nominatim", "Nominatim", OpenStreetMap::from_options);
/// register_provider!(registry, "osm", OpenStreetMap::from_options);
/// assert!(registry.contains(PluginKind::Provider, &ProviderId::new("nominatim")));
/// assert!(registry.contains(PluginKind::Provider, &ProviderId::new("osm")));
/// ```
#[macro_export]
macro_rules! register_provider {
    (@named $registry:expr, $id:expr, $name:expr, $ctor:expr) => {
        $registry.register_provider($id, $name, |options: &$crate::Options| {
            let provider = ($ctor)(options)?;
            Ok(Box::new(provider) as Box<dyn $crate::Provider>)
        });
    };
    ($registry:expr, $id:expr, $name:expr, $ctor:expr) => {
        $crate::register_provider!(@named $registry, $id, Some($name), $ctor)
    };
    ($registry:expr, $id:expr, $ctor:expr) => {
        $crate::register_provider!(@named $registry, $id, None, $ctor)
    };
}

/// Register a dumper whose constructor returns a concrete type.
#[macro_export]
macro_rules! register_dumper {
    (@named $registry:expr, $id:expr, $name:expr, $ctor:expr) => {
        $registry.register_dumper($id, $name, |options: &$crate::Options| {
            let dumper = ($ctor)(options)?;
            Ok(Box::new(dumper) as Box<dyn $crate::Dumper>)
        });
    };
    ($registry:expr, $id:expr, $name:expr, $ctor:expr) => {
        $crate::register_dumper!(@named $registry, $id, Some($name), $ctor)
    };
    ($registry:expr, $id:expr, $ctor:expr) => {
        $crate::register_dumper!(@named $registry, $id, None, $ctor)
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_registry_has_builtins() {
        let registry = PluginRegistry::default();
        assert!(registry.contains(PluginKind::Provider, &ProviderId::new("openstreetmap")));
        assert!(registry.contains(PluginKind::Dumper, &ProviderId::new("geojson")));
        assert!(registry.contains(PluginKind::Dumper, &ProviderId::new("WKT")));
    }

    #[test]
    fn unknown_plugin_is_reported_with_kind() {
        let registry = PluginRegistry::default();
        let err = registry
            .resolve_provider(&ProviderId::new("googlemaps"), &Options::new())
            .unwrap_err();
        assert!(matches!(
            err,
            Error::PluginNotFound { kind: PluginKind::Provider, ref id } if id == "googlemaps"
        ));
        assert_eq!(err.to_string(), "unknown provider plugin: googlemaps");
    }

    #[test]
    fn dumpers_listed_by_display_name() {
        let registry = PluginRegistry::default();
        let names: Vec<String> = registry
            .list_plugins(PluginKind::Dumper)
            .into_iter()
            .map(|(_, name)| name)
            .collect();
        assert_eq!(names, vec!["GPX", "GeoJSON", "KML", "WKT"]);
    }

    #[test]
    fn unnamed_plugin_is_listed_under_its_id() {
        let mut registry = PluginRegistry::empty();
        crate::register_dumper!(registry, "wkt", "WKT", WktDumper::from_options);
        crate::register_dumper!(registry, "kml", KmlDumper::from_options);
        registry.register_dumper("Atom", None, |_| Ok(Box::new(GpxDumper)));

        let listed = registry.list_plugins(PluginKind::Dumper);
        let listed: Vec<(&str, &str)> = listed
            .iter()
            .map(|(id, name)| (id.as_str(), name.as_str()))
            .collect();
        assert_eq!(listed, vec![("wkt", "WKT"), ("atom", "atom"), ("kml", "kml")]);
    }
}
