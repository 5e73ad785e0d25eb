// This is the models module containing shared data structures
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// A rendering position, serialized as `[longitude, latitude]`.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq)]
pub struct CoordinatePair(pub f64, pub f64);

impl CoordinatePair {
    /// Fallback position for records that could not be read.
    pub const ORIGIN: CoordinatePair = CoordinatePair(0.0, 0.0);

    pub fn new(longitude: f64, latitude: f64) -> Self {
        CoordinatePair(longitude, latitude)
    }

    pub fn longitude(&self) -> f64 {
        self.0
    }

    pub fn latitude(&self) -> f64 {
        self.1
    }
}

// A GeoJSON feature as loaded from the static datasets
#[derive(Serialize, Deserialize, Clone, Debug, Default)]
pub struct FeatureRecord {
    #[serde(default)]
    pub properties: Option<Map<String, Value>>,
    #[serde(default)]
    pub geometry: Option<Value>,
}

impl FeatureRecord {
    /// String-valued property, `None` when absent or not a string.
    pub fn string_property(&self, key: &str) -> Option<&str> {
        self.properties
            .as_ref()
            .and_then(|props| props.get(key))
            .and_then(Value::as_str)
    }
}

#[derive(Serialize, Deserialize, Clone, Debug, Default)]
pub struct FeatureCollection {
    #[serde(default)]
    pub features: Vec<FeatureRecord>,
}

// Aggregated bin handed back by the hexagon layer on hover; only the point list is read
#[derive(Serialize, Deserialize, Clone, Debug, Default)]
pub struct HexBin {
    #[serde(default)]
    pub points: Vec<Value>,
}

#[derive(Serialize, Deserialize, Clone, Copy, Debug, Default, PartialEq)]
pub struct NormalizationStats {
    pub records_processed: usize,
    pub fallbacks: usize,
    pub runs: usize,
}
