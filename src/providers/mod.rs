//! Built-in geocoding providers.

pub mod openstreetmap;

pub use openstreetmap::OpenStreetMap;
