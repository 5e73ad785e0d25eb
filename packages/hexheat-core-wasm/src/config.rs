//! Layer, view and animation settings handed to the JavaScript renderer.
//!
//! Every field has a default, so JavaScript may pass a partial object and
//! get the complete configuration back.

use serde::{Deserialize, Serialize};
use thiserror::Error;

pub type Rgb = [u8; 3];

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    #[error("elevation scale min {min} is greater than max {max}")]
    ElevationScale { min: u32, max: u32 },
    #[error("animation tick interval must be positive")]
    TickInterval,
    #[error("opacity {0} is outside [0, 1]")]
    Opacity(f64),
    #[error("radius must be positive, got {0}")]
    Radius(f64),
    #[error("upper percentile {0} is outside (0, 100]")]
    UpperPercentile(f64),
    #[error("coverage {0} is outside [0, 1]")]
    Coverage(f64),
    #[error("color range is empty")]
    EmptyColorRange,
    #[error("elevation range [{0}, {1}] is inverted")]
    ElevationRange(f64, f64),
    #[error("zoom range [{0}, {1}] is inverted")]
    ZoomRange(f64, f64),
}

/// Bounds of the animated elevation scale.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq)]
#[serde(default)]
pub struct ElevationRange {
    pub min: u32,
    pub max: u32,
}

impl Default for ElevationRange {
    fn default() -> Self {
        Self { min: 1, max: 5 }
    }
}

#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq)]
#[serde(default, rename_all = "camelCase")]
pub struct AnimationTiming {
    /// Wait before the ramp starts so the data can finish loading
    pub start_delay_ms: u32,
    pub tick_interval_ms: u32,
}

impl Default for AnimationTiming {
    fn default() -> Self {
        Self {
            start_delay_ms: 1500,
            tick_interval_ms: 20,
        }
    }
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(default, rename_all = "camelCase")]
pub struct ViewState {
    pub longitude: f64,
    pub latitude: f64,
    pub zoom: f64,
    pub min_zoom: f64,
    pub max_zoom: f64,
    pub pitch: f64,
    pub bearing: f64,
}

impl Default for ViewState {
    fn default() -> Self {
        Self {
            longitude: -84.386330,
            latitude: 33.753746,
            zoom: 9.0,
            min_zoom: 5.0,
            max_zoom: 100.0,
            pitch: 40.5,
            bearing: 0.0,
        }
    }
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(default, rename_all = "camelCase")]
pub struct Material {
    pub ambient: f64,
    pub diffuse: f64,
    pub shininess: f64,
    pub specular_color: Rgb,
}

impl Default for Material {
    fn default() -> Self {
        Self {
            ambient: 0.64,
            diffuse: 0.6,
            shininess: 32.0,
            specular_color: [51, 51, 51],
        }
    }
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct PointLight {
    pub color: Rgb,
    pub intensity: f64,
    pub position: [f64; 3],
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(default, rename_all = "camelCase")]
pub struct Lighting {
    pub ambient_color: Rgb,
    pub ambient_intensity: f64,
    pub point_lights: Vec<PointLight>,
}

impl Default for Lighting {
    fn default() -> Self {
        Self {
            ambient_color: [255, 255, 255],
            ambient_intensity: 1.0,
            point_lights: vec![
                PointLight {
                    color: [255, 255, 255],
                    intensity: 0.8,
                    position: [-0.144528, 49.739968, 80000.0],
                },
                PointLight {
                    color: [255, 255, 255],
                    intensity: 0.8,
                    position: [-3.807751, 54.104682, 8000.0],
                },
            ],
        }
    }
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(default, rename_all = "camelCase")]
pub struct HeatmapConfig {
    pub color_range: Vec<Rgb>,
    pub elevation_range: [f64; 2],
    pub elevation_scale: ElevationRange,
    pub radius: f64,
    pub upper_percentile: f64,
    pub coverage: f64,
    pub opacity: f64,
    pub extruded: bool,
    pub pickable: bool,
    pub initial_view_state: ViewState,
    pub map_style: String,
    pub material: Material,
    pub lighting: Lighting,
    pub animation: AnimationTiming,
}

impl Default for HeatmapConfig {
    fn default() -> Self {
        Self {
            color_range: vec![
                [1, 152, 189],
                [73, 227, 206],
                [216, 254, 181],
                [254, 237, 177],
                [254, 173, 84],
                [209, 55, 78],
            ],
            elevation_range: [0.0, 3000.0],
            elevation_scale: ElevationRange::default(),
            radius: 1000.0,
            upper_percentile: 99.0,
            coverage: 1.0,
            opacity: 0.7,
            extruded: true,
            pickable: true,
            initial_view_state: ViewState::default(),
            map_style: "mapbox://styles/mapbox/dark-v9".to_string(),
            material: Material::default(),
            lighting: Lighting::default(),
            animation: AnimationTiming::default(),
        }
    }
}

impl HeatmapConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        let scale = self.elevation_scale;
        if scale.min > scale.max {
            return Err(ConfigError::ElevationScale {
                min: scale.min,
                max: scale.max,
            });
        }
        if self.animation.tick_interval_ms == 0 {
            return Err(ConfigError::TickInterval);
        }
        if !(0.0..=1.0).contains(&self.opacity) {
            return Err(ConfigError::Opacity(self.opacity));
        }
        if !(self.radius > 0.0) {
            return Err(ConfigError::Radius(self.radius));
        }
        if !(self.upper_percentile > 0.0 && self.upper_percentile <= 100.0) {
            return Err(ConfigError::UpperPercentile(self.upper_percentile));
        }
        if !(0.0..=1.0).contains(&self.coverage) {
            return Err(ConfigError::Coverage(self.coverage));
        }
        if self.color_range.is_empty() {
            return Err(ConfigError::EmptyColorRange);
        }
        let [low, high] = self.elevation_range;
        if low > high {
            return Err(ConfigError::ElevationRange(low, high));
        }
        let view = &self.initial_view_state;
        if view.min_zoom > view.max_zoom {
            return Err(ConfigError::ZoomRange(view.min_zoom, view.max_zoom));
        }
        Ok(())
    }

    pub fn validated(self) -> Result<HeatmapConfig, ConfigError> {
        self.validate()?;
        Ok(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_validate() {
        let config = HeatmapConfig::default();
        assert_eq!(config.validate(), Ok(()));
        assert_eq!(config.elevation_scale, ElevationRange { min: 1, max: 5 });
        assert_eq!(config.animation.start_delay_ms, 1500);
        assert_eq!(config.animation.tick_interval_ms, 20);
        assert_eq!(config.color_range.len(), 6);
    }

    #[test]
    fn test_partial_json_fills_defaults() {
        let config: HeatmapConfig = serde_json::from_str(
            r#"{ "radius": 500, "elevationScale": { "max": 8 }, "animation": { "startDelayMs": 0 } }"#,
        )
        .unwrap();
        let config = config.validated().unwrap();
        assert_eq!(config.radius, 500.0);
        assert_eq!(config.elevation_scale, ElevationRange { min: 1, max: 8 });
        assert_eq!(config.animation.start_delay_ms, 0);
        assert_eq!(config.animation.tick_interval_ms, 20);
        assert_eq!(config.initial_view_state, ViewState::default());
    }

    #[test]
    fn test_serializes_camel_case() {
        let value = serde_json::to_value(HeatmapConfig::default()).unwrap();
        assert_eq!(value["upperPercentile"], 99.0);
        assert_eq!(value["initialViewState"]["minZoom"], 5.0);
        assert_eq!(value["mapStyle"], "mapbox://styles/mapbox/dark-v9");
    }

    fn rejected(mutate: impl FnOnce(&mut HeatmapConfig)) -> ConfigError {
        let mut config = HeatmapConfig::default();
        mutate(&mut config);
        config.validate().unwrap_err()
    }

    #[test]
    fn test_validation_rejects_each_case() {
        assert_eq!(
            rejected(|c| c.elevation_scale = ElevationRange { min: 6, max: 5 }),
            ConfigError::ElevationScale { min: 6, max: 5 }
        );
        assert_eq!(
            rejected(|c| c.animation.tick_interval_ms = 0),
            ConfigError::TickInterval
        );
        assert_eq!(rejected(|c| c.opacity = 1.5), ConfigError::Opacity(1.5));
        assert_eq!(rejected(|c| c.radius = 0.0), ConfigError::Radius(0.0));
        assert_eq!(
            rejected(|c| c.upper_percentile = 0.0),
            ConfigError::UpperPercentile(0.0)
        );
        assert_eq!(rejected(|c| c.coverage = -0.1), ConfigError::Coverage(-0.1));
        assert_eq!(rejected(|c| c.color_range.clear()), ConfigError::EmptyColorRange);
        assert_eq!(
            rejected(|c| c.elevation_range = [10.0, 1.0]),
            ConfigError::ElevationRange(10.0, 1.0)
        );
        assert_eq!(
            rejected(|c| c.initial_view_state.min_zoom = 200.0),
            ConfigError::ZoomRange(200.0, 100.0)
        );
    }

    #[test]
    fn test_invalid_json_is_reported() {
        assert!(serde_json::from_str::<HeatmapConfig>("{ not json").is_err());
        let config: HeatmapConfig = serde_json::from_str(r#"{ "opacity": 3 }"#).unwrap();
        assert_eq!(config.validated(), Err(ConfigError::Opacity(3.0)));
    }
}
