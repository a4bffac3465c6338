//! Resolve "Use Your Current Location" to the nearest known job location.
//!
//! The host position comes from a [`PositionProvider`]; job locations are placed on the map
//! through a [`Gazetteer`]. Locations the gazetteer does not know (e.g. "Remote") are never
//! picked.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;

use crate::error::{ConfigError, GeoError};
use crate::models::LocationOption;

const EARTH_RADIUS_MILES: f64 = 3_958.8;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub latitude: f64,
    pub longitude: f64,
}

impl Coordinates {
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }

    /// Great-circle (haversine) distance in miles.
    pub fn distance_miles(&self, other: &Coordinates) -> f64 {
        let lat1 = self.latitude.to_radians();
        let lat2 = other.latitude.to_radians();
        let dlat = lat2 - lat1;
        let dlng = (other.longitude - self.longitude).to_radians();

        let a = (dlat / 2.0).sin().powi(2) + lat1.cos() * lat2.cos() * (dlng / 2.0).sin().powi(2);
        2.0 * EARTH_RADIUS_MILES * a.sqrt().asin()
    }

    /// Parse `"LAT,LON"`.
    pub fn parse(raw: &str) -> Result<Self, String> {
        let (lat, lng) = raw
            .split_once(',')
            .ok_or_else(|| format!("expected LAT,LON, got '{}'", raw))?;
        let latitude: f64 = lat.trim().parse().map_err(|e| format!("latitude: {}", e))?;
        let longitude: f64 = lng.trim().parse().map_err(|e| format!("longitude: {}", e))?;
        if !(-90.0..=90.0).contains(&latitude) {
            return Err(format!("latitude {} out of range", latitude));
        }
        if !(-180.0..=180.0).contains(&longitude) {
            return Err(format!("longitude {} out of range", longitude));
        }
        Ok(Self::new(latitude, longitude))
    }
}

// --- Position providers ---

pub trait PositionProvider {
    fn current_position(&self) -> Result<Coordinates, GeoError>;
}

/// A position supplied up front through configuration.
#[derive(Debug, Clone, Copy)]
pub struct FixedPosition(pub Coordinates);

impl PositionProvider for FixedPosition {
    fn current_position(&self) -> Result<Coordinates, GeoError> {
        Ok(self.0)
    }
}

/// No position source configured.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoPosition;

impl PositionProvider for NoPosition {
    fn current_position(&self) -> Result<Coordinates, GeoError> {
        Err(GeoError::Unavailable)
    }
}

pub fn provider_for(position: Option<Coordinates>) -> Box<dyn PositionProvider> {
    match position {
        Some(coords) => Box::new(FixedPosition(coords)),
        None => Box::new(NoPosition),
    }
}

// --- Gazetteer ---

const BUILTIN_PLACES: &[(&str, f64, f64)] = &[
    ("NYC", 40.712_8, -74.006_0),
    ("New York", 40.712_8, -74.006_0),
    ("San Francisco", 37.774_9, -122.419_4),
    ("Los Angeles", 34.052_2, -118.243_7),
    ("Seattle", 47.606_2, -122.332_1),
    ("Austin", 30.267_2, -97.743_1),
    ("Chicago", 41.878_1, -87.629_8),
    ("Boston", 42.360_1, -71.058_9),
    ("Denver", 39.739_2, -104.990_3),
    ("Toronto", 43.653_2, -79.383_2),
    ("London", 51.507_4, -0.127_8),
    ("Berlin", 52.520_0, 13.405_0),
    ("Paris", 48.856_6, 2.352_2),
    ("Amsterdam", 52.367_6, 4.904_1),
    ("Bangalore", 12.971_6, 77.594_6),
    ("Singapore", 1.352_1, 103.819_8),
    ("Sydney", -33.868_8, 151.209_3),
];

#[derive(Debug, Clone, Default)]
pub struct Gazetteer {
    places: HashMap<String, Coordinates>,
}

impl Gazetteer {
    pub fn builtin() -> Self {
        let places = BUILTIN_PLACES
            .iter()
            .map(|(name, lat, lng)| (normalize(name), Coordinates::new(*lat, *lng)))
            .collect();
        Self { places }
    }

    pub fn insert(&mut self, name: &str, coords: Coordinates) {
        self.places.insert(normalize(name), coords);
    }

    pub fn lookup(&self, name: &str) -> Option<Coordinates> {
        self.places.get(&normalize(name)).copied()
    }

    pub fn len(&self) -> usize {
        self.places.len()
    }

    /// Merge a JSON object of `{"Name": {"latitude": .., "longitude": ..}}` over the current
    /// entries.
    pub fn extend_from_json(&mut self, json: &str) -> Result<usize, serde_json::Error> {
        let entries: HashMap<String, Coordinates> = serde_json::from_str(json)?;
        let count = entries.len();
        for (name, coords) in entries {
            self.insert(&name, coords);
        }
        Ok(count)
    }

    pub fn with_file(mut self, path: &Path) -> Result<Self, ConfigError> {
        let gazetteer_err = |reason: String| ConfigError::Gazetteer {
            path: path.display().to_string(),
            reason,
        };
        let json = std::fs::read_to_string(path).map_err(|e| gazetteer_err(e.to_string()))?;
        let added = self
            .extend_from_json(&json)
            .map_err(|e| gazetteer_err(e.to_string()))?;
        tracing::debug!(path = %path.display(), added, "loaded gazetteer");
        Ok(self)
    }
}

fn normalize(name: &str) -> String {
    name.trim().to_lowercase()
}

/// The option closest to `origin`. Ties keep the earlier option.
pub fn nearest_location(
    origin: Coordinates,
    options: &[LocationOption],
    gazetteer: &Gazetteer,
) -> Option<LocationOption> {
    let mut best: Option<(&LocationOption, f64)> = None;
    for option in options.iter().filter(|o| !o.is_current_location()) {
        let Some(coords) = gazetteer.lookup(&option.value) else {
            continue;
        };
        let distance = origin.distance_miles(&coords);
        if best.is_none_or(|(_, d)| distance < d) {
            best = Some((option, distance));
        }
    }
    best.map(|(option, _)| option.clone())
}

/// One-shot position query followed by nearest-location lookup. Any failure leaves the
/// location unselected.
pub fn resolve_current_location(
    provider: &dyn PositionProvider,
    options: &[LocationOption],
    gazetteer: &Gazetteer,
) -> Option<LocationOption> {
    let origin = match provider.current_position() {
        Ok(coords) => coords,
        Err(e) => {
            tracing::warn!(error = %e, "error getting location");
            return None;
        }
    };

    let nearest = nearest_location(origin, options, gazetteer);
    match &nearest {
        Some(option) => tracing::info!(
            latitude = origin.latitude,
            longitude = origin.longitude,
            location = %option.value,
            "resolved current location"
        ),
        None => tracing::warn!(
            latitude = origin.latitude,
            longitude = origin.longitude,
            "no job location has known coordinates"
        ),
    }
    nearest
}
