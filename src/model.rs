use std::borrow::Borrow;
use std::collections::HashMap;
use std::fmt;

use serde::{Deserialize, Serialize};

/// Free-form settings handed to a plugin factory.
pub type Options = serde_json::Map<String, serde_json::Value>;

/// Identifier of a registered plugin, e.g. `openstreetmap`.
///
/// Identifiers are case-insensitive and always stored lowercase, so
/// `ProviderId::new("OpenStreetMap") == ProviderId::new("openstreetmap")`.
/// Nothing else is normalized: surrounding whitespace is part of the id.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub struct ProviderId(String);

impl ProviderId {
    pub fn new(id: impl AsRef<str>) -> Self {
        Self(id.as_ref().to_lowercase())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ProviderId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<String> for ProviderId {
    fn from(s: String) -> Self {
        Self::new(s)
    }
}

impl From<&str> for ProviderId {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

impl From<ProviderId> for String {
    fn from(id: ProviderId) -> Self {
        id.0
    }
}

impl AsRef<str> for ProviderId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl Borrow<str> for ProviderId {
    fn borrow(&self) -> &str {
        &self.0
    }
}

/// Per-provider options, keyed by provider identifier.
///
/// A provider without an entry gets an empty [`Options`] map.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProviderOptions(HashMap<ProviderId, Options>);

impl ProviderOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a single option key for a provider, keeping its other keys.
    pub fn set(
        &mut self,
        id: impl Into<ProviderId>,
        key: impl Into<String>,
        value: serde_json::Value,
    ) {
        self.0.entry(id.into()).or_default().insert(key.into(), value);
    }

    /// Options for `id`, or an empty map if none were given.
    pub fn for_provider(&self, id: &ProviderId) -> Options {
        self.0.get(id).cloned().unwrap_or_default()
    }

    /// Overlay `other` on top of `self`, key by key.
    pub fn merge(&mut self, other: ProviderOptions) {
        for (id, options) in other.0 {
            let entry = self.0.entry(id).or_default();
            for (key, value) in options {
                entry.insert(key, value);
            }
        }
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// What a resolution call is looking for.
#[derive(Debug, Clone, PartialEq)]
pub enum Query {
    /// Free-text address for a forward geocode.
    Address(String),
    /// Coordinate pair for a reverse geocode.
    Coordinates { latitude: f64, longitude: f64 },
}

impl Query {
    /// Diagnostic logged when no provider could answer this query.
    pub fn failure_message(&self) -> String {
        match self {
            Query::Address(text) => format!("No plugin could geocode: \"{}\".", text),
            Query::Coordinates {
                latitude,
                longitude,
            } => format!(
                "No plugin could reverse geocode: \"{} {}\".",
                latitude, longitude
            ),
        }
    }
}

impl fmt::Display for Query {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Query::Address(text) => f.write_str(text),
            Query::Coordinates {
                latitude,
                longitude,
            } => write!(f, "{} {}", latitude, longitude),
        }
    }
}

/// A latitude/longitude pair in decimal degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub latitude: f64,
    pub longitude: f64,
}

impl Coordinates {
    pub const fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }
}

/// A bounding box in decimal degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Bounds {
    pub south: f64,
    pub west: f64,
    pub north: f64,
    pub east: f64,
}

/// One administrative subdivision (state, county, ...) of an address.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdminLevel {
    /// 1 is the largest subdivision below the country.
    pub level: u8,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
}

/// A single geocoding result.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Address {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub coordinates: Option<Coordinates>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bounds: Option<Bounds>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub street_number: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub street_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sub_locality: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub locality: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub postal_code: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub admin_levels: Vec<AdminLevel>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub country: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub country_code: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timezone: Option<String>,
    /// Human-readable one-line form as returned by the backend.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub formatted: Option<String>,
    /// Identifier of the provider that produced this result.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub provided_by: Option<String>,
}

/// Ordered results of one successful provider call.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AddressCollection(Vec<Address>);

impl AddressCollection {
    pub fn new(addresses: Vec<Address>) -> Self {
        Self(addresses)
    }

    pub fn first(&self) -> Option<&Address> {
        self.0.first()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Address> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl FromIterator<Address> for AddressCollection {
    fn from_iter<I: IntoIterator<Item = Address>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl IntoIterator for AddressCollection {
    type Item = Address;
    type IntoIter = std::vec::IntoIter<Address>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

impl<'a> IntoIterator for &'a AddressCollection {
    type Item = &'a Address;
    type IntoIter = std::slice::Iter<'a, Address>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

/// Result of a fallback resolution.
///
/// `Failure` covers both "no provider was listed" and "every provider
/// failed"; the logged diagnostics tell the two apart.
#[derive(Debug, Clone, PartialEq)]
pub enum ResolutionOutcome {
    Success(AddressCollection),
    Failure,
}

impl ResolutionOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, ResolutionOutcome::Success(_))
    }

    pub fn addresses(&self) -> Option<&AddressCollection> {
        match self {
            ResolutionOutcome::Success(addresses) => Some(addresses),
            ResolutionOutcome::Failure => None,
        }
    }

    pub fn into_option(self) -> Option<AddressCollection> {
        match self {
            ResolutionOutcome::Success(addresses) => Some(addresses),
            ResolutionOutcome::Failure => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn provider_id_is_lowercased() {
        assert_eq!(ProviderId::new("OpenStreetMap").as_str(), "openstreetmap");
    }

    #[test]
    fn provider_id_keeps_whitespace() {
        let padded = ProviderId::new(" GoogleMaps ");
        assert_eq!(padded.as_str(), " googlemaps ");
        assert_ne!(padded, ProviderId::new("googlemaps"));
    }

    #[test]
    fn provider_id_deserializes_normalized() {
        let id: ProviderId = serde_json::from_str("\"OSM\"").unwrap();
        assert_eq!(id.as_str(), "osm");
    }

    #[test]
    fn missing_provider_options_are_empty() {
        let mut options = ProviderOptions::new();
        options.set("openstreetmap", "key", json!("X"));

        let osm = options.for_provider(&ProviderId::new("openstreetmap"));
        assert_eq!(osm.get("key"), Some(&json!("X")));
        assert!(options.for_provider(&ProviderId::new("googlemaps")).is_empty());
    }

    #[test]
    fn options_keys_are_case_insensitive() {
        let options: ProviderOptions =
            serde_json::from_value(json!({"OpenStreetMap": {"limit": 3}})).unwrap();
        let osm = options.for_provider(&ProviderId::new("openstreetmap"));
        assert_eq!(osm.get("limit"), Some(&json!(3)));
    }

    #[test]
    fn merge_overlays_single_keys() {
        let mut base = ProviderOptions::new();
        base.set("osm", "limit", json!(5));
        base.set("osm", "language", json!("en"));

        let mut overlay = ProviderOptions::new();
        overlay.set("osm", "limit", json!(1));
        base.merge(overlay);

        let osm = base.for_provider(&ProviderId::new("osm"));
        assert_eq!(osm.get("limit"), Some(&json!(1)));
        assert_eq!(osm.get("language"), Some(&json!("en")));
    }

    #[test]
    fn failure_messages_embed_the_query() {
        let forward = Query::Address("221B Baker Street".to_string());
        assert_eq!(
            forward.failure_message(),
            "No plugin could geocode: \"221B Baker Street\"."
        );

        let reverse = Query::Coordinates {
            latitude: 51.5237,
            longitude: -0.1585,
        };
        assert_eq!(
            reverse.failure_message(),
            "No plugin could reverse geocode: \"51.5237 -0.1585\"."
        );
    }

    #[test]
    fn address_skips_empty_fields_when_serialized() {
        let address = Address {
            locality: Some("London".to_string()),
            ..Address::default()
        };
        assert_eq!(
            serde_json::to_value(&address).unwrap(),
            json!({"locality": "London"})
        );
    }
}
