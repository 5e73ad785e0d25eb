//! Builds the single data array fed to the hexagon layer from the static
//! datasets: property-based collections go through the normalizer,
//! geometry-based ones contribute a position read from their geometry.

use geo::Centroid;
use geo_types::{Coord, LineString, MultiLineString, MultiPoint, MultiPolygon, Point, Polygon};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::console_log;
use crate::models::{CoordinatePair, FeatureCollection, FeatureRecord};
use crate::normalizer::normalize_features;

// Input accepted by the assembly entry point
#[derive(Serialize, Deserialize, Clone, Debug, Default)]
#[serde(rename_all = "camelCase")]
pub struct DatasetBundle {
    /// Collections with string `latitude`/`longitude` properties
    #[serde(default)]
    pub point_sets: Vec<FeatureCollection>,
    /// Collections whose position comes from GeoJSON geometry
    #[serde(default)]
    pub geometry_sets: Vec<FeatureCollection>,
}

/// Concatenates every collection in order, one pair per feature.
pub fn assemble(bundle: &DatasetBundle) -> Vec<CoordinatePair> {
    let mut data = Vec::new();

    for collection in &bundle.point_sets {
        data.extend(normalize_features(&collection.features));
    }

    for collection in &bundle.geometry_sets {
        data.extend(collection.features.iter().map(|feature| {
            feature_position(feature).unwrap_or_else(|| {
                console_log!("Feature geometry unusable, using origin: {:?}", feature.geometry);
                CoordinatePair::ORIGIN
            })
        }));
    }

    console_log!(
        "Assembled {} positions from {} point sets and {} geometry sets",
        data.len(),
        bundle.point_sets.len(),
        bundle.geometry_sets.len()
    );
    data
}

pub fn feature_position(feature: &FeatureRecord) -> Option<CoordinatePair> {
    feature.geometry.as_ref().and_then(geometry_position)
}

/// Point geometries give their own position, lines and polygons their
/// centroid, anything else the mean of its vertices.
pub fn geometry_position(geometry: &Value) -> Option<CoordinatePair> {
    let coordinates = geometry.get("coordinates");
    let centroid = match geometry.get("type").and_then(Value::as_str)? {
        "Point" => coordinates.and_then(position).map(Point::from),
        "LineString" => coordinates.and_then(line_string)?.centroid(),
        "MultiLineString" => {
            let lines = coordinates?
                .as_array()?
                .iter()
                .map(line_string)
                .collect::<Option<Vec<_>>>()?;
            MultiLineString::new(lines).centroid()
        }
        "Polygon" => coordinates.and_then(polygon)?.centroid(),
        "MultiPolygon" => {
            let polygons = coordinates?
                .as_array()?
                .iter()
                .map(polygon)
                .collect::<Option<Vec<_>>>()?;
            MultiPolygon::new(polygons).centroid()
        }
        _ => {
            let mut vertices = Vec::new();
            collect_positions(geometry, &mut vertices);
            MultiPoint::from(vertices).centroid()
        }
    }?;

    if centroid.x().is_finite() && centroid.y().is_finite() {
        Some(CoordinatePair::new(centroid.x(), centroid.y()))
    } else {
        None
    }
}

fn position(value: &Value) -> Option<Coord<f64>> {
    let items = value.as_array()?;
    if items.len() < 2 {
        return None;
    }
    Some(Coord {
        x: items[0].as_f64()?,
        y: items[1].as_f64()?,
    })
}

fn line_string(value: &Value) -> Option<LineString<f64>> {
    let coords = value
        .as_array()?
        .iter()
        .map(position)
        .collect::<Option<Vec<_>>>()?;
    if coords.is_empty() {
        return None;
    }
    Some(LineString::new(coords))
}

fn polygon(value: &Value) -> Option<Polygon<f64>> {
    let mut rings = value
        .as_array()?
        .iter()
        .map(line_string)
        .collect::<Option<Vec<_>>>()?
        .into_iter();
    let exterior = rings.next()?;
    Some(Polygon::new(exterior, rings.collect()))
}

// Walks "coordinates" and "geometries" of any geometry object
fn collect_positions(value: &Value, out: &mut Vec<Point<f64>>) {
    if let Some(coord) = position(value) {
        out.push(Point::from(coord));
        return;
    }
    match value {
        Value::Array(items) => items.iter().for_each(|item| collect_positions(item, out)),
        Value::Object(map) => {
            for key in ["coordinates", "geometries"] {
                if let Some(child) = map.get(key) {
                    collect_positions(child, out);
                }
            }
        }
        _ => {}
    }
}
