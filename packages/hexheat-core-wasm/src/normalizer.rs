//! Converts feature records carrying string latitude/longitude properties into
//! `[longitude, latitude]` pairs. Total over its input: every record yields a
//! pair, malformed ones the origin.

use crate::console_log;
use crate::coordinate_parser::{CoordinateError, GeoPoint};
use crate::models::{CoordinatePair, FeatureRecord};
use crate::module_state::ModuleState;

pub const LATITUDE_KEY: &str = "latitude";
pub const LONGITUDE_KEY: &str = "longitude";

/// Rewrites a locale-formatted number: the first comma becomes the decimal
/// point and the next comma is dropped ("1,234,56" -> "1.23456").
///
/// A lone thousands separator ("1,234") is read as a decimal point.
pub fn normalize_coordinate_text(raw: &str) -> String {
    raw.replacen(',', ".", 1).replacen(',', "", 1)
}

pub fn parse_coordinate(latitude: &str, longitude: &str) -> Result<CoordinatePair, CoordinateError> {
    let expr = format!(
        "{} {}",
        normalize_coordinate_text(latitude),
        normalize_coordinate_text(longitude)
    );
    GeoPoint::parse(&expr).map(GeoPoint::to_pair)
}

pub fn normalize_feature(feature: &FeatureRecord) -> Result<CoordinatePair, CoordinateError> {
    let latitude = feature
        .string_property(LATITUDE_KEY)
        .ok_or(CoordinateError::MissingField(LATITUDE_KEY))?;
    let longitude = feature
        .string_property(LONGITUDE_KEY)
        .ok_or(CoordinateError::MissingField(LONGITUDE_KEY))?;
    parse_coordinate(latitude, longitude)
}

/// Normalizes a batch and reports how many records fell back to the origin.
pub fn normalize_batch(features: &[FeatureRecord]) -> (Vec<CoordinatePair>, usize) {
    let mut fallbacks = 0;
    let pairs = features
        .iter()
        .enumerate()
        .map(|(index, feature)| match normalize_feature(feature) {
            Ok(pair) => pair,
            Err(err) => {
                fallbacks += 1;
                console_log!(
                    "Feature {} has no usable coordinate ({}): {:?}",
                    index,
                    err,
                    feature.properties
                );
                CoordinatePair::ORIGIN
            }
        })
        .collect();
    (pairs, fallbacks)
}

/// Same as [`normalize_batch`], also recorded in the module statistics.
pub fn normalize_features(features: &[FeatureRecord]) -> Vec<CoordinatePair> {
    let (pairs, fallbacks) = normalize_batch(features);
    ModuleState::global().lock().record_run(pairs.len(), fallbacks);
    console_log!(
        "Normalized {} features, {} fell back to the origin",
        pairs.len(),
        fallbacks
    );
    pairs
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn record(props: serde_json::Value) -> FeatureRecord {
        serde_json::from_value(json!({ "type": "Feature", "properties": props })).unwrap()
    }

    fn close(pair: CoordinatePair, longitude: f64, latitude: f64) -> bool {
        (pair.longitude() - longitude).abs() < 1e-9 && (pair.latitude() - latitude).abs() < 1e-9
    }

    #[test]
    fn test_text_normalization() {
        assert_eq!(normalize_coordinate_text("33,7490"), "33.7490");
        assert_eq!(normalize_coordinate_text("1,234,56"), "1.23456");
        assert_eq!(normalize_coordinate_text("1,234"), "1.234");
        assert_eq!(normalize_coordinate_text("1,2,3,4"), "1.23,4");
        assert_eq!(normalize_coordinate_text("-84.3880"), "-84.3880");
    }

    #[test]
    fn test_decimal_strings() {
        let feature = record(json!({ "latitude": "33.7490", "longitude": "-84.3880" }));
        assert!(close(normalize_feature(&feature).unwrap(), -84.388, 33.749));
    }

    #[test]
    fn test_comma_decimal_strings() {
        let feature = record(json!({ "latitude": "33,7490", "longitude": "-84,3880" }));
        assert!(close(normalize_feature(&feature).unwrap(), -84.388, 33.749));
    }

    #[test]
    fn test_missing_and_empty_latitude() {
        let missing = record(json!({ "longitude": "-84.3880" }));
        assert_eq!(
            normalize_feature(&missing),
            Err(CoordinateError::MissingField(LATITUDE_KEY))
        );

        let empty = record(json!({ "latitude": "", "longitude": "-84.3880" }));
        assert!(normalize_feature(&empty).is_err());

        let (pairs, fallbacks) = normalize_batch(&[missing, empty]);
        assert_eq!(pairs, vec![CoordinatePair::ORIGIN, CoordinatePair::ORIGIN]);
        assert_eq!(fallbacks, 2);
    }

    #[test]
    fn test_garbage_longitude_falls_back() {
        let feature = record(json!({ "latitude": "33.7490", "longitude": "not a number" }));
        let (pairs, fallbacks) = normalize_batch(&[feature]);
        assert_eq!(pairs, vec![CoordinatePair::ORIGIN]);
        assert_eq!(fallbacks, 1);
    }

    #[test]
    fn test_numeric_property_is_malformed() {
        let feature = record(json!({ "latitude": 33.749, "longitude": "-84.3880" }));
        assert_eq!(
            normalize_feature(&feature),
            Err(CoordinateError::MissingField(LATITUDE_KEY))
        );
    }

    #[test]
    fn test_length_and_order_preserved() {
        let features = vec![
            record(json!({ "latitude": "33.7490", "longitude": "-84.3880" })),
            record(json!({ "latitude": "garbage" })),
            FeatureRecord::default(),
            record(json!({ "latitude": "33,8", "longitude": "-84,4" })),
        ];
        let pairs = normalize_features(&features);
        assert_eq!(pairs.len(), features.len());
        assert!(close(pairs[0], -84.388, 33.749));
        assert_eq!(pairs[1], CoordinatePair::ORIGIN);
        assert_eq!(pairs[2], CoordinatePair::ORIGIN);
        assert!(close(pairs[3], -84.4, 33.8));
        assert!(normalize_features(&[]).is_empty());
    }
}
