use wasm_bindgen::prelude::*;

use crate::models::HexBin;

// Offset of the tooltip box from the hovered screen position
const OFFSET_X: f64 = -50.0;
const OFFSET_Y: f64 = -40.0;

#[derive(Clone, Debug, PartialEq)]
pub struct TooltipState {
    pub visible: bool,
    pub text: String,
    pub left: f64,
    pub top: f64,
}

impl TooltipState {
    pub fn hidden() -> Self {
        Self {
            visible: false,
            text: String::new(),
            left: 0.0,
            top: 0.0,
        }
    }

    pub fn from_hover(bin: Option<&HexBin>, x: f64, y: f64) -> Self {
        match bin {
            Some(bin) => Self {
                visible: true,
                text: format!("{} locations", bin.points.len()),
                left: x + OFFSET_X,
                top: y + OFFSET_Y,
            },
            None => Self::hidden(),
        }
    }

    pub fn display(&self) -> &'static str {
        if self.visible {
            "block"
        } else {
            "none"
        }
    }

    /// Writes content and placement to the tooltip element; a hidden tooltip
    /// keeps its last content.
    pub fn apply(&self, element: &web_sys::HtmlElement) -> Result<(), JsValue> {
        let style = element.style();
        if self.visible {
            element.set_inner_html(&self.text);
            style.set_property("left", &format!("{}px", self.left))?;
            style.set_property("top", &format!("{}px", self.top))?;
        }
        style.set_property("display", self.display())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_bin_shows_count_offset_from_cursor() {
        let bin: HexBin = serde_json::from_value(json!({
            "points": [[-84.39, 33.75], [-84.38, 33.74], [-84.37, 33.76]],
            "position": [-84.38, 33.75]
        }))
        .unwrap();
        let state = TooltipState::from_hover(Some(&bin), 200.0, 120.0);
        assert!(state.visible);
        assert_eq!(state.text, "3 locations");
        assert_eq!(state.left, 150.0);
        assert_eq!(state.top, 80.0);
        assert_eq!(state.display(), "block");
    }

    #[test]
    fn test_no_bin_hides() {
        let state = TooltipState::from_hover(None, 200.0, 120.0);
        assert_eq!(state, TooltipState::hidden());
        assert_eq!(state.display(), "none");
    }
}
