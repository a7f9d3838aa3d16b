//! Built-in dumpers: render an [`Address`] as GeoJSON, GPX, KML or WKT.

use std::fmt;

use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use quick_xml::Writer;
use serde_json::{json, Value};

use crate::error::{Error, Result};
use crate::model::{Address, Coordinates, Options};
use crate::provider::Dumper;

fn coordinates(address: &Address) -> Result<Coordinates> {
    address.coordinates.ok_or_else(|| Error::Dump {
        reason: "address has no coordinates".to_string(),
    })
}

/// Best available one-line label for an address.
fn label(address: &Address) -> String {
    if let Some(formatted) = &address.formatted {
        return formatted.clone();
    }
    let street = [address.street_number.as_deref(), address.street_name.as_deref()]
        .into_iter()
        .flatten()
        .collect::<Vec<_>>()
        .join(" ");
    [
        Some(street.as_str()).filter(|s| !s.is_empty()),
        address.postal_code.as_deref(),
        address.locality.as_deref(),
        address.country.as_deref(),
    ]
    .into_iter()
    .flatten()
    .collect::<Vec<_>>()
    .join(", ")
}

fn xml_error(err: impl fmt::Display) -> Error {
    Error::Dump {
        reason: format!("xml: {}", err),
    }
}

/// Indented XML document written into memory.
struct XmlDocument(Writer<Vec<u8>>);

impl XmlDocument {
    fn new(standalone: Option<&str>) -> Result<Self> {
        let mut doc = Self(Writer::new_with_indent(Vec::new(), b' ', 2));
        doc.event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), standalone)))?;
        Ok(doc)
    }

    fn event(&mut self, event: Event<'_>) -> Result<()> {
        self.0.write_event(event).map_err(xml_error)
    }

    fn open(&mut self, name: &str, attributes: &[(&str, &str)]) -> Result<()> {
        let start = BytesStart::new(name).with_attributes(attributes.iter().copied());
        self.event(Event::Start(start))
    }

    fn close(&mut self, name: &str) -> Result<()> {
        self.event(Event::End(BytesEnd::new(name)))
    }

    fn empty(&mut self, name: &str, attributes: &[(&str, &str)]) -> Result<()> {
        let start = BytesStart::new(name).with_attributes(attributes.iter().copied());
        self.event(Event::Empty(start))
    }

    fn text(&mut self, name: &str, text: &str) -> Result<()> {
        self.open(name, &[])?;
        self.event(Event::Text(BytesText::new(text)))?;
        self.close(name)
    }

    fn finish(self) -> Result<String> {
        String::from_utf8(self.0.into_inner()).map_err(xml_error)
    }
}

/// GeoJSON `Feature` with a `Point` geometry.
#[derive(Debug, Default, Clone, Copy)]
pub struct GeoJsonDumper;

impl GeoJsonDumper {
    pub fn from_options(_options: &Options) -> Result<Self> {
        Ok(Self)
    }
}

impl Dumper for GeoJsonDumper {
    fn name(&self) -> &str {
        "GeoJSON"
    }

    fn dump(&self, address: &Address) -> Result<String> {
        let point = coordinates(address)?;

        let mut properties = serde_json::to_value(address)?;
        if let Value::Object(map) = &mut properties {
            map.remove("coordinates");
            map.remove("bounds");
        }

        let mut feature = json!({
            "type": "Feature",
            "geometry": {
                "type": "Point",
                "coordinates": [point.longitude, point.latitude],
            },
            "properties": properties,
        });
        if let Some(bounds) = address.bounds {
            feature["bounds"] = json!({
                "south": bounds.south,
                "west": bounds.west,
                "north": bounds.north,
                "east": bounds.east,
            });
        }

        Ok(serde_json::to_string(&feature)?)
    }
}

/// Well-known text `POINT(lon lat)`.
#[derive(Debug, Default, Clone, Copy)]
pub struct WktDumper;

impl WktDumper {
    pub fn from_options(_options: &Options) -> Result<Self> {
        Ok(Self)
    }
}

impl Dumper for WktDumper {
    fn name(&self) -> &str {
        "WKT"
    }

    fn dump(&self, address: &Address) -> Result<String> {
        let point = coordinates(address)?;
        Ok(format!("POINT({} {})", point.longitude, point.latitude))
    }
}

/// KML document with a single `Placemark`.
#[derive(Debug, Default, Clone, Copy)]
pub struct KmlDumper;

impl KmlDumper {
    pub fn from_options(_options: &Options) -> Result<Self> {
        Ok(Self)
    }
}

impl Dumper for KmlDumper {
    fn name(&self) -> &str {
        "KML"
    }

    fn dump(&self, address: &Address) -> Result<String> {
        let point = coordinates(address)?;
        let name = label(address);

        let mut doc = XmlDocument::new(None)?;
        doc.open("kml", &[("xmlns", "http://www.opengis.net/kml/2.2")])?;
        doc.open("Document", &[])?;
        doc.open("Placemark", &[])?;
        doc.text("name", &name)?;
        doc.text("description", &name)?;
        doc.open("Point", &[])?;
        doc.text("coordinates", &format!("{},{},0", point.longitude, point.latitude))?;
        doc.close("Point")?;
        doc.close("Placemark")?;
        doc.close("Document")?;
        doc.close("kml")?;
        doc.finish()
    }
}

/// GPX document with a single waypoint.
#[derive(Debug, Default, Clone, Copy)]
pub struct GpxDumper;

impl GpxDumper {
    pub fn from_options(_options: &Options) -> Result<Self> {
        Ok(Self)
    }
}

impl Dumper for GpxDumper {
    fn name(&self) -> &str {
        "GPX"
    }

    fn dump(&self, address: &Address) -> Result<String> {
        let point = coordinates(address)?;

        let mut doc = XmlDocument::new(Some("no"))?;
        doc.open(
            "gpx",
            &[
                ("version", "1.0"),
                ("creator", "geocoder"),
                ("xmlns", "http://www.topografix.com/GPX/1/0"),
            ],
        )?;
        if let Some(bounds) = address.bounds {
            let (south, west) = (bounds.south.to_string(), bounds.west.to_string());
            let (north, east) = (bounds.north.to_string(), bounds.east.to_string());
            doc.empty(
                "bounds",
                &[
                    ("minlat", south.as_str()),
                    ("minlon", west.as_str()),
                    ("maxlat", north.as_str()),
                    ("maxlon", east.as_str()),
                ],
            )?;
        }
        let (lat, lon) = (point.latitude.to_string(), point.longitude.to_string());
        doc.open("wpt", &[("lat", lat.as_str()), ("lon", lon.as_str())])?;
        doc.text("name", &label(address))?;
        doc.text("type", "Address")?;
        doc.close("wpt")?;
        doc.close("gpx")?;
        doc.finish()
    }
}
