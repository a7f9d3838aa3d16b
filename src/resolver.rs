//! Multi-provider fallback resolution.
//!
//! [`FallbackResolver`] walks an ordered list of provider identifiers and
//! returns the first successful answer. Provider failures are logged to the
//! injected [`LogSink`] and the next candidate is tried; only a
//! misconfiguration (unknown identifier, rejected options) aborts the walk.

use crate::error::{ProviderError, Result};
use crate::log::{LogSink, Severity, TracingSink};
use crate::model::{AddressCollection, ProviderId, ProviderOptions, Query, ResolutionOutcome};
use crate::provider::Provider;
use crate::registry::PluginRegistry;

/// Provider tried when the caller does not name any.
pub const DEFAULT_PROVIDER: &str = "openstreetmap";

/// Tries providers in order until one answers.
#[derive(Debug)]
pub struct FallbackResolver<S = TracingSink> {
    registry: PluginRegistry,
    sink: S,
    geocode_providers: Vec<ProviderId>,
    reverse_providers: Vec<ProviderId>,
}

impl Default for FallbackResolver<TracingSink> {
    fn default() -> Self {
        Self::new(PluginRegistry::default(), TracingSink)
    }
}

impl<S: LogSink> FallbackResolver<S> {
    /// Create a resolver whose default list is `[DEFAULT_PROVIDER]` for both
    /// directions.
    pub fn new(registry: PluginRegistry, sink: S) -> Self {
        Self {
            registry,
            sink,
            geocode_providers: vec![ProviderId::new(DEFAULT_PROVIDER)],
            reverse_providers: vec![ProviderId::new(DEFAULT_PROVIDER)],
        }
    }

    /// Replace the providers used by [`geocode`](Self::geocode).
    pub fn with_geocode_providers<I, T>(mut self, ids: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<ProviderId>,
    {
        self.geocode_providers = ids.into_iter().map(Into::into).collect();
        self
    }

    /// Replace the providers used by [`reverse`](Self::reverse).
    pub fn with_reverse_providers<I, T>(mut self, ids: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<ProviderId>,
    {
        self.reverse_providers = ids.into_iter().map(Into::into).collect();
        self
    }

    pub fn registry(&self) -> &PluginRegistry {
        &self.registry
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }

    pub fn geocode_providers(&self) -> &[ProviderId] {
        &self.geocode_providers
    }

    pub fn reverse_providers(&self) -> &[ProviderId] {
        &self.reverse_providers
    }

    /// Forward geocode `query` with the default provider list.
    pub fn geocode(&self, query: &str, options: &ProviderOptions) -> Result<ResolutionOutcome> {
        self.resolve_geocode(&self.geocode_providers, query, options)
    }

    /// Reverse geocode a coordinate pair with the default provider list.
    pub fn reverse(
        &self,
        latitude: f64,
        longitude: f64,
        options: &ProviderOptions,
    ) -> Result<ResolutionOutcome> {
        self.resolve_reverse(&self.reverse_providers, latitude, longitude, options)
    }

    /// Forward geocode `query`, trying `provider_ids` in order.
    ///
    /// # Errors
    ///
    /// Fails only when a provider cannot be instantiated. Provider call
    /// failures are logged and end up as [`ResolutionOutcome::Failure`] once
    /// every candidate is exhausted.
    pub fn resolve_geocode(
        &self,
        provider_ids: &[ProviderId],
        query: &str,
        options: &ProviderOptions,
    ) -> Result<ResolutionOutcome> {
        self.resolve(provider_ids, &Query::Address(query.to_string()), options)
    }

    /// Reverse geocode `(latitude, longitude)`, trying `provider_ids` in order.
    ///
    /// # Errors
    ///
    /// Same contract as [`resolve_geocode`](Self::resolve_geocode).
    pub fn resolve_reverse(
        &self,
        provider_ids: &[ProviderId],
        latitude: f64,
        longitude: f64,
        options: &ProviderOptions,
    ) -> Result<ResolutionOutcome> {
        let query = Query::Coordinates {
            latitude,
            longitude,
        };
        self.resolve(provider_ids, &query, options)
    }

    fn resolve(
        &self,
        provider_ids: &[ProviderId],
        query: &Query,
        options: &ProviderOptions,
    ) -> Result<ResolutionOutcome> {
        for id in provider_ids {
            let provider_options = options.for_provider(id);
            // Resolution failures are configuration errors and are not caught.
            let provider = self.registry.resolve_provider(id, &provider_options)?;

            tracing::debug!(provider = %id, query = %query, "trying provider");
            match call(provider.as_ref(), query) {
                Ok(addresses) => {
                    tracing::debug!(provider = %id, results = addresses.len(), "provider answered");
                    return Ok(ResolutionOutcome::Success(addresses));
                }
                // Credential failures and other failures are both non-fatal.
                Err(err) => {
                    self.sink.log(&format!("{}: {}", id, err), Severity::Error);
                }
            }
        }

        self.sink.log(&query.failure_message(), Severity::Error);
        Ok(ResolutionOutcome::Failure)
    }
}

fn call(
    provider: &dyn Provider,
    query: &Query,
) -> std::result::Result<AddressCollection, ProviderError> {
    match query {
        Query::Address(text) => provider.geocode(text),
        Query::Coordinates {
            latitude,
            longitude,
        } => provider.reverse(*latitude, *longitude),
    }
}
