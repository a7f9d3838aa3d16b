use std::fmt;

use crate::error::{ProviderError, Result};
use crate::model::{Address, AddressCollection};

/// A geocoding backend.
///
/// Calls are blocking; a provider may perform network I/O and is expected to
/// enforce its own timeouts.
pub trait Provider: fmt::Debug {
    /// Human-readable name of the backend.
    fn name(&self) -> &str;

    /// Forward geocode: resolve free text into addresses.
    fn geocode(&self, query: &str) -> std::result::Result<AddressCollection, ProviderError>;

    /// Reverse geocode: resolve a coordinate pair into addresses.
    fn reverse(
        &self,
        latitude: f64,
        longitude: f64,
    ) -> std::result::Result<AddressCollection, ProviderError>;
}

/// Renders a single address in some output format.
pub trait Dumper: fmt::Debug {
    fn name(&self) -> &str;

    fn dump(&self, address: &Address) -> Result<String>;
}
