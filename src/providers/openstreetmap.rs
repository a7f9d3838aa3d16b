use std::time::Duration;

use reqwest::blocking::{Client, Response};
use reqwest::StatusCode;
use serde::Deserialize;

use crate::error::{Error, ProviderError, Result};
use crate::model::{Address, AddressCollection, AdminLevel, Bounds, Coordinates, Options};
use crate::provider::Provider;

const ID: &str = "openstreetmap";
const DEFAULT_ENDPOINT: &str = "https://nominatim.openstreetmap.org";
const DEFAULT_USER_AGENT: &str = concat!("geocoder/", env!("CARGO_PKG_VERSION"));
const DEFAULT_TIMEOUT_SECS: u64 = 15;
const DEFAULT_LIMIT: u32 = 5;

/// Options accepted by the `openstreetmap` provider.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct OpenStreetMapOptions {
    /// Base URL of a Nominatim instance.
    pub endpoint: String,
    pub user_agent: String,
    pub timeout_secs: u64,
    /// Maximum number of forward geocoding results.
    pub limit: u32,
    /// Preferred result language, sent as `accept-language`.
    pub language: Option<String>,
    /// Contact address, recommended by the public Nominatim usage policy.
    pub email: Option<String>,
}

impl Default for OpenStreetMapOptions {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_ENDPOINT.to_string(),
            user_agent: DEFAULT_USER_AGENT.to_string(),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            limit: DEFAULT_LIMIT,
            language: None,
            email: None,
        }
    }
}

impl OpenStreetMapOptions {
    pub fn from_options(options: &Options) -> Result<Self> {
        serde_json::from_value(serde_json::Value::Object(options.clone())).map_err(|e| {
            Error::InvalidOptions {
                id: ID.to_string(),
                reason: e.to_string(),
            }
        })
    }
}

/// Nominatim (OpenStreetMap) geocoding over HTTP.
#[derive(Debug)]
pub struct OpenStreetMap {
    client: Client,
    options: OpenStreetMapOptions,
}

impl OpenStreetMap {
    pub fn new(options: OpenStreetMapOptions) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(options.timeout_secs))
            .user_agent(options.user_agent.clone())
            .build()
            .map_err(|e| Error::InvalidOptions {
                id: ID.to_string(),
                reason: format!("cannot build http client: {}", e),
            })?;
        Ok(Self { client, options })
    }

    /// Factory used by the plugin registry.
    pub fn from_options(options: &Options) -> Result<Self> {
        Self::new(OpenStreetMapOptions::from_options(options)?)
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.options.endpoint.trim_end_matches('/'), path)
    }

    fn common_params(&self) -> Vec<(&'static str, String)> {
        let mut params = vec![
            ("format", "jsonv2".to_string()),
            ("addressdetails", "1".to_string()),
        ];
        if let Some(language) = &self.options.language {
            params.push(("accept-language", language.clone()));
        }
        if let Some(email) = &self.options.email {
            params.push(("email", email.clone()));
        }
        params
    }

    fn get(
        &self,
        path: &str,
        params: &[(&'static str, String)],
    ) -> std::result::Result<String, ProviderError> {
        let response = self
            .client
            .get(self.url(path))
            .query(params)
            .send()
            .map_err(|e| ProviderError::Http(e.to_string()))?;
        read_body(response)
    }
}

impl Provider for OpenStreetMap {
    fn name(&self) -> &str {
        "OpenStreetMap"
    }

    fn geocode(&self, query: &str) -> std::result::Result<AddressCollection, ProviderError> {
        let mut params = self.common_params();
        params.push(("q", query.to_string()));
        params.push(("limit", self.options.limit.to_string()));

        let body = self.get("search", &params)?;
        let addresses = parse_search(&body)?;
        if addresses.is_empty() {
            return Err(ProviderError::NoResult(format!(
                "no result for \"{}\"",
                query
            )));
        }
        Ok(addresses)
    }

    fn reverse(
        &self,
        latitude: f64,
        longitude: f64,
    ) -> std::result::Result<AddressCollection, ProviderError> {
        let mut params = self.common_params();
        params.push(("lat", latitude.to_string()));
        params.push(("lon", longitude.to_string()));

        let body = self.get("reverse", &params)?;
        parse_reverse(&body)
    }
}

fn read_body(response: Response) -> std::result::Result<String, ProviderError> {
    let status = response.status();
    check_status(status)?;
    response
        .text()
        .map_err(|e| ProviderError::Http(format!("failed to read response body: {}", e)))
}

fn check_status(status: StatusCode) -> std::result::Result<(), ProviderError> {
    match status {
        s if s.is_success() => Ok(()),
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => Err(ProviderError::InvalidCredentials(
            format!("nominatim returned status {}", status),
        )),
        StatusCode::TOO_MANY_REQUESTS => Err(ProviderError::QuotaExceeded(format!(
            "nominatim returned status {}",
            status
        ))),
        _ => Err(ProviderError::Http(format!(
            "nominatim returned status {}",
            status
        ))),
    }
}

#[derive(Deserialize)]
struct Place {
    lat: String,
    lon: String,
    display_name: Option<String>,
    /// `[south, north, west, east]` as strings.
    boundingbox: Option<[String; 4]>,
    address: Option<PlaceAddress>,
}

#[derive(Deserialize)]
struct PlaceAddress {
    house_number: Option<String>,
    road: Option<String>,
    suburb: Option<String>,
    neighbourhood: Option<String>,
    city: Option<String>,
    town: Option<String>,
    village: Option<String>,
    hamlet: Option<String>,
    county: Option<String>,
    state: Option<String>,
    postcode: Option<String>,
    country: Option<String>,
    country_code: Option<String>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum ReverseResponse {
    Error { error: String },
    Place(Box<Place>),
}

fn parse_search(body: &str) -> std::result::Result<AddressCollection, ProviderError> {
    let places: Vec<Place> = serde_json::from_str(body).map_err(|e| {
        ProviderError::InvalidResponse(format!("failed to parse search response: {}", e))
    })?;
    places.into_iter().map(to_address).collect()
}

fn parse_reverse(body: &str) -> std::result::Result<AddressCollection, ProviderError> {
    let response: ReverseResponse = serde_json::from_str(body).map_err(|e| {
        ProviderError::InvalidResponse(format!("failed to parse reverse response: {}", e))
    })?;
    match response {
        ReverseResponse::Error { error } => Err(ProviderError::NoResult(error)),
        ReverseResponse::Place(place) => Ok(AddressCollection::new(vec![to_address(*place)?])),
    }
}

fn parse_degrees(value: &str, what: &str) -> std::result::Result<f64, ProviderError> {
    value
        .trim()
        .parse::<f64>()
        .map_err(|e| ProviderError::InvalidResponse(format!("invalid {}: {}", what, e)))
}

fn to_address(place: Place) -> std::result::Result<Address, ProviderError> {
    let coordinates = Coordinates::new(
        parse_degrees(&place.lat, "lat")?,
        parse_degrees(&place.lon, "lon")?,
    );

    let bounds = match &place.boundingbox {
        Some([south, north, west, east]) => Some(Bounds {
            south: parse_degrees(south, "south bound")?,
            west: parse_degrees(west, "west bound")?,
            north: parse_degrees(north, "north bound")?,
            east: parse_degrees(east, "east bound")?,
        }),
        None => None,
    };

    let mut address = Address {
        coordinates: Some(coordinates),
        bounds,
        formatted: place.display_name,
        provided_by: Some(ID.to_string()),
        ..Address::default()
    };

    if let Some(details) = place.address {
        address.street_number = details.house_number;
        address.street_name = details.road;
        address.sub_locality = details.suburb.or(details.neighbourhood);
        address.locality = details
            .city
            .or(details.town)
            .or(details.village)
            .or(details.hamlet);
        address.postal_code = details.postcode;
        address.country = details.country;
        address.country_code = details.country_code.map(|c| c.to_uppercase());

        if let Some(state) = details.state {
            address.admin_levels.push(AdminLevel {
                level: 1,
                name: state,
                code: None,
            });
        }
        if let Some(county) = details.county {
            address.admin_levels.push(AdminLevel {
                level: 2,
                name: county,
                code: None,
            });
        }
    }

    Ok(address)
}
