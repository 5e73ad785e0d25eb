use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use serde_wasm_bindgen::{from_value, to_value};

// Create a console module for logging
pub mod console;
// Shared data structures
pub mod models;
// Free-form coordinate expression parsing
pub mod coordinate_parser;
// Feature properties -> [lon, lat]
pub mod normalizer;
// Combining the static datasets into one data array
pub mod datasets;
// Layer, view and animation settings
pub mod config;
// Elevation scale animation
pub mod animator;
// Per-run cancellation of scheduled callbacks
mod cancellation;
// window.setTimeout / setInterval host
mod timers;
// Hover tooltip
pub mod tooltip;
// View-level state
pub mod view;
// Normalization statistics
mod module_state;

use config::HeatmapConfig;
use datasets::DatasetBundle;
use models::{CoordinatePair, FeatureCollection, HexBin};
use module_state::ModuleState;
use timers::BrowserTimers;
use tooltip::TooltipState;
use view::HeatmapView;

// Enable better panic messages in console during development
#[cfg(feature = "console_error_panic_hook")]
pub use console_error_panic_hook::set_once as set_panic_hook;

// Use the macro from our console module
#[macro_export]
macro_rules! console_log {
    ($($t:tt)*) => (crate::console::log(&format!($($t)*)))
}

use std::sync::Once;
static INIT: Once = Once::new();

// This sets up the wasm_bindgen start functionality
#[wasm_bindgen(start)]
pub fn start() {
    INIT.call_once(|| {
        // Set the panic hook for better error messages
        #[cfg(feature = "console_error_panic_hook")]
        console_error_panic_hook::set_once();

        console_log!("WASM module initialized successfully");
    });
}

// Undefined or null means "use the defaults"
fn resolve_config(value: JsValue) -> Result<HeatmapConfig, JsValue> {
    let config: HeatmapConfig = if value.is_undefined() || value.is_null() {
        HeatmapConfig::default()
    } else {
        from_value(value).map_err(|e| JsValue::from_str(&format!("Invalid heatmap config: {}", e)))?
    };
    config
        .validated()
        .map_err(|e| JsValue::from_str(&e.to_string()))
}

/// Normalize a GeoJSON FeatureCollection with string latitude/longitude
/// properties into `[[lon, lat], ...]`, one entry per feature.
#[wasm_bindgen]
pub fn normalize_feature_collection(geojson: &str) -> Result<JsValue, JsValue> {
    let collection: FeatureCollection = serde_json::from_str(geojson)
        .map_err(|e| JsValue::from_str(&format!("Invalid FeatureCollection: {}", e)))?;
    let pairs = normalizer::normalize_features(&collection.features);
    Ok(to_value(&pairs)?)
}

/// Build the heatmap data array from `{ pointSets: [...], geometrySets: [...] }`.
#[wasm_bindgen]
pub fn assemble_heatmap_data(bundle_json: &str) -> Result<JsValue, JsValue> {
    let bundle: DatasetBundle = serde_json::from_str(bundle_json)
        .map_err(|e| JsValue::from_str(&format!("Invalid dataset bundle: {}", e)))?;
    Ok(to_value(&datasets::assemble(&bundle))?)
}

// Strict variant for form input: errors are reported instead of falling back
#[wasm_bindgen]
pub fn parse_coordinate_expression(latitude: &str, longitude: &str) -> Result<JsValue, JsValue> {
    let pair = normalizer::parse_coordinate(latitude, longitude)
        .map_err(|e| JsValue::from_str(&e.to_string()))?;
    Ok(to_value(&pair)?)
}

#[wasm_bindgen]
pub fn default_heatmap_config() -> Result<JsValue, JsValue> {
    Ok(to_value(&HeatmapConfig::default())?)
}

#[wasm_bindgen]
pub fn resolve_heatmap_config(partial: JsValue) -> Result<JsValue, JsValue> {
    let config = resolve_config(partial)?;
    Ok(to_value(&config)?)
}

#[wasm_bindgen]
pub fn get_normalization_stats() -> Result<JsValue, JsValue> {
    let stats = ModuleState::global().lock().stats();
    Ok(to_value(&stats)?)
}

#[wasm_bindgen]
pub fn reset_normalization_stats() -> bool {
    ModuleState::global().lock().reset();
    true
}

/// Hover handler for the hexagon layer: `object` is the hovered bin or
/// null/undefined when the pointer left every bin.
#[wasm_bindgen]
pub fn set_tooltip(element_id: &str, object: JsValue, x: f64, y: f64) -> Result<(), JsValue> {
    let bin: Option<HexBin> = if object.is_undefined() || object.is_null() {
        None
    } else {
        Some(from_value(object)?)
    };
    let state = TooltipState::from_hover(bin.as_ref(), x, y);

    let document = web_sys::window()
        .and_then(|w| w.document())
        .ok_or_else(|| JsValue::from_str("No document available"))?;
    let element = document
        .get_element_by_id(element_id)
        .ok_or_else(|| JsValue::from_str(&format!("Tooltip element '{}' not found", element_id)))?
        .dyn_into::<web_sys::HtmlElement>()
        .map_err(|_| JsValue::from_str(&format!("Element '{}' is not an HTML element", element_id)))?;
    state.apply(&element)
}

/// Heatmap view state exposed to the rendering component: the data array and
/// the animated elevation scale.
#[wasm_bindgen]
pub struct HeatmapAnimation {
    view: HeatmapView<BrowserTimers>,
}

#[wasm_bindgen]
impl HeatmapAnimation {
    /// `listener` is called with each new elevation scale so the component can re-render.
    #[wasm_bindgen(constructor)]
    pub fn new(config: JsValue, listener: Option<js_sys::Function>) -> Result<HeatmapAnimation, JsValue> {
        let config = resolve_config(config)?;
        let timers = BrowserTimers::new().map_err(|e| JsValue::from_str(&e.to_string()))?;
        let view = HeatmapView::new(timers, &config);

        if let Some(listener) = listener {
            view.animator().set_listener(move |value| {
                if let Err(e) = listener.call1(&JsValue::NULL, &JsValue::from(value)) {
                    console_log!("Elevation listener failed: {:?}", e);
                }
            });
        }

        Ok(HeatmapAnimation { view })
    }

    pub fn mount(&self) -> Result<(), JsValue> {
        self.sweep();
        self.view
            .mount()
            .map_err(|e| JsValue::from_str(&e.to_string()))
    }

    #[wasm_bindgen(js_name = setData)]
    pub fn set_data(&mut self, data: JsValue) -> Result<(), JsValue> {
        self.sweep();
        let data: Option<Vec<CoordinatePair>> = if data.is_undefined() || data.is_null() {
            None
        } else {
            Some(from_value(data)?)
        };
        self.view
            .set_data(data)
            .map_err(|e| JsValue::from_str(&e.to_string()))
    }

    /// Assemble the datasets, keep the result as the view data and return it.
    #[wasm_bindgen(js_name = loadDatasets)]
    pub fn load_datasets(&mut self, bundle_json: &str) -> Result<JsValue, JsValue> {
        self.sweep();
        let bundle: DatasetBundle = serde_json::from_str(bundle_json)
            .map_err(|e| JsValue::from_str(&format!("Invalid dataset bundle: {}", e)))?;
        let data = datasets::assemble(&bundle);
        let value = to_value(&data)?;
        self.view
            .set_data(Some(data))
            .map_err(|e| JsValue::from_str(&e.to_string()))?;
        Ok(value)
    }

    pub fn restart(&self) -> Result<(), JsValue> {
        self.sweep();
        self.view
            .animator()
            .restart()
            .map_err(|e| JsValue::from_str(&e.to_string()))
    }

    pub fn unmount(&self) {
        self.sweep();
        self.view.unmount();
    }

    #[wasm_bindgen(getter, js_name = elevationScale)]
    pub fn elevation_scale(&self) -> u32 {
        self.view.elevation_scale()
    }

    #[wasm_bindgen(getter)]
    pub fn phase(&self) -> String {
        self.view.phase().as_str().to_string()
    }

    pub fn data(&self) -> Result<JsValue, JsValue> {
        match self.view.data() {
            Some(data) => Ok(to_value(data)?),
            None => Ok(JsValue::NULL),
        }
    }
}

impl HeatmapAnimation {
    // Releases timer closures retired by earlier callbacks
    fn sweep(&self) {
        self.view.animator().host().sweep();
    }
}
