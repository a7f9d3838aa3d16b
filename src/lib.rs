//! The geocoder library: forward and reverse geocoding with provider fallback.
//!
//! Providers and dumpers are plugins registered in a [`PluginRegistry`] by
//! identifier. A [`FallbackResolver`] tries an ordered list of providers and
//! returns the first answer; failures along the way go to a [`LogSink`].
//!
//! # Examples
//!
//! Registering a custom provider and resolving through it:
//!
//! ```rust
//! use geocoder::{
//!     Address, AddressCollection, FallbackResolver, MemorySink, PluginRegistry, Provider,
//!     ProviderError, ProviderId, ProviderOptions, ResolutionOutcome,
//! };
//!
//! #[derive(Debug)]
//! struct Fixed;
//!
//! impl Provider for Fixed {
//!     fn name(&self) -> &str {
//!         "Fixed"
//!     }
//!
//!     fn geocode(&self, query: &str) -> Result<AddressCollection, ProviderError> {
//!         Ok(AddressCollection::new(vec![Address {
//!             formatted: Some(query.to_string()),
//!             ..Address::default()
//!         }]))
//!     }
//!
//!     fn reverse(&self, _lat: f64, _lon: f64) -> Result<AddressCollection, ProviderError> {
//!         Err(ProviderError::Unsupported("reverse".to_string()))
//!     }
//! }
//!
//! let mut registry = PluginRegistry::empty();
//! registry.register_provider("fixed", Some("Fixed"), |_| Ok(Box::new(Fixed)));
//!
//! let sink = MemorySink::new();
//! let resolver = FallbackResolver::new(registry, &sink).with_geocode_providers(["fixed"]);
//! let outcome = resolver.geocode("221B Baker Street", &ProviderOptions::new())?;
//! assert!(matches!(outcome, ResolutionOutcome::Success(_)));
//!
//! let fixed = [ProviderId::new("fixed")];
//! let outcome = resolver.resolve_reverse(&fixed, 51.5, -0.15, &ProviderOptions::new())?;
//! assert_eq!(outcome, ResolutionOutcome::Failure);
//! assert_eq!(sink.len(), 2);
//! # Ok::<(), geocoder::Error>(())
//! ```

pub mod config;
pub mod dumpers;
pub mod error;
pub mod log;
pub mod model;
pub mod provider;
pub mod providers;
pub mod registry;
pub mod resolver;

pub use crate::config::Config;
pub use crate::error::{Error, ProviderError, Result};
pub use crate::log::{LogEntry, LogSink, MemorySink, Severity, TracingSink};
pub use crate::model::{
    Address, AddressCollection, AdminLevel, Bounds, Coordinates, Options, ProviderId,
    ProviderOptions, Query, ResolutionOutcome,
};
pub use crate::provider::{Dumper, Provider};
pub use crate::registry::{PluginKind, PluginRegistry};
pub use crate::resolver::{FallbackResolver, DEFAULT_PROVIDER};
