use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use web_sys::{Document, HtmlButtonElement, HtmlCanvasElement, HtmlElement, PointerEvent};

use sketchsolve_shared::{Point, ToolMode};

pub fn get_element<T: JsCast>(document: &Document, id: &str) -> Result<T, JsValue> {
    let element = document
        .get_element_by_id(id)
        .ok_or_else(|| JsValue::from_str(&format!("Missing element: {id}")))?;
    element
        .dyn_into::<T>()
        .map_err(|_| JsValue::from_str(&format!("Invalid element type: {id}")))
}

pub fn set_tool_button(button: &HtmlButtonElement, active: bool) {
    let _ = button.class_list().toggle_with_force("active", active);
    let pressed = if active { "true" } else { "false" };
    let _ = button.set_attribute("aria-pressed", pressed);
}

pub fn set_history_button(button: &HtmlButtonElement, available: bool) {
    let disabled = if available { "false" } else { "true" };
    let _ = button.set_attribute("aria-disabled", disabled);
}

pub fn set_canvas_mode(canvas: &HtmlCanvasElement, tool: ToolMode) {
    let cursor = match tool {
        ToolMode::Pencil => "crosshair",
        ToolMode::Eraser => "cell",
    };
    let _ = canvas.style().set_property("cursor", cursor);
}

/// Keeps touch drags on the canvas from scrolling the page.
pub fn disable_touch_scroll(canvas: &HtmlCanvasElement) {
    let _ = canvas.style().set_property("touch-action", "none");
}

pub fn set_visible(element: &HtmlElement, visible: bool) {
    let display = if visible { "block" } else { "none" };
    let _ = element.style().set_property("display", display);
}

/// Client coordinates to canvas pixels. The canvas may be displayed at a
/// different size than its backing store.
pub fn event_to_point(canvas: &HtmlCanvasElement, event: &PointerEvent) -> Option<Point> {
    let rect = canvas.get_bounding_client_rect();
    if rect.width() <= 0.0 || rect.height() <= 0.0 {
        return None;
    }
    let scale_x = canvas.width() as f64 / rect.width();
    let scale_y = canvas.height() as f64 / rect.height();
    Point::new_finite(
        (event.client_x() as f64 - rect.left()) * scale_x,
        (event.client_y() as f64 - rect.top()) * scale_y,
    )
}

pub fn is_touch_event(event: &PointerEvent) -> bool {
    event.pointer_type() == "touch"
}
