use std::cell::{Cell, RefCell};
use std::rc::Rc;

use js_sys::Reflect;
use log::{debug, info, warn};
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use wasm_bindgen_futures::spawn_local;
use web_sys::{Event, HtmlButtonElement, HtmlCanvasElement, KeyboardEvent, PointerEvent};

use sketchsolve_shared::{Board, Submission, ToolMode};

use crate::actions::{clear, redo, select_tool, undo};
use crate::config::{ids, Config};
use crate::dom::{
    disable_touch_scroll, event_to_point, get_element, is_touch_event, set_visible,
};
use crate::state::{Controls, Widget};
use crate::submit::submit_current;
use crate::surface::CanvasSurface;

fn document_ready_state(document: &web_sys::Document) -> Option<String> {
    Reflect::get(document.as_ref(), &JsValue::from_str("readyState"))
        .ok()?
        .as_string()
}

#[wasm_bindgen(start)]
pub fn run() -> Result<(), JsValue> {
    console_error_panic_hook::set_once();

    let window = web_sys::window().ok_or_else(|| JsValue::from_str("Missing window"))?;
    let document = window
        .document()
        .ok_or_else(|| JsValue::from_str("Missing document"))?;
    let started = Rc::new(Cell::new(false));

    if document_ready_state(&document).as_deref() != Some("loading") {
        started.set(true);
        return start_app();
    }

    let onready_started = started.clone();
    let onready = Closure::<dyn FnMut(Event)>::new(move |_| {
        if onready_started.replace(true) {
            return;
        }
        if let Err(err) = start_app() {
            web_sys::console::error_1(&err);
        }
    });
    document.add_event_listener_with_callback(
        "DOMContentLoaded",
        onready.as_ref().unchecked_ref(),
    )?;
    onready.forget();

    Ok(())
}

fn start_app() -> Result<(), JsValue> {
    let window = web_sys::window().ok_or_else(|| JsValue::from_str("Missing window"))?;
    let document = window
        .document()
        .ok_or_else(|| JsValue::from_str("Missing document"))?;

    let (config, config_error) = match Config::from_window(&window) {
        Ok(config) => (config, None),
        Err(error) => (Config::default(), Some(error)),
    };
    let _ = console_log::init_with_level(config.log_level());
    if let Some(error) = config_error {
        warn!("{error}; falling back to defaults");
    }
    debug!("Starting with {config:?}");

    let canvas: HtmlCanvasElement = get_element(&document, ids::CANVAS)?;
    let controls = Controls {
        pencil: get_element(&document, ids::PENCIL)?,
        eraser: get_element(&document, ids::ERASER)?,
        undo: get_element(&document, ids::UNDO)?,
        redo: get_element(&document, ids::REDO)?,
        clear: get_element(&document, ids::CLEAR)?,
        solve: get_element(&document, ids::SOLVE)?,
        output: get_element(&document, ids::OUTPUT)?,
        spinner: get_element(&document, ids::SPINNER)?,
    };

    let surface = CanvasSurface::new(canvas.clone())?;
    let widget = Rc::new(Widget {
        window: window.clone(),
        document: document.clone(),
        config,
        board: RefCell::new(Board::new(surface)),
        submission: RefCell::new(Submission::default()),
        controls,
    });

    disable_touch_scroll(&canvas);
    set_visible(&widget.controls.spinner, false);
    widget.sync_ui();

    {
        let down_widget = widget.clone();
        let down_canvas = canvas.clone();
        let ondown = Closure::<dyn FnMut(PointerEvent)>::new(move |event: PointerEvent| {
            if event.button() != 0 {
                return;
            }
            if is_touch_event(&event) {
                event.prevent_default();
            }
            let Some(point) = event_to_point(&down_canvas, &event) else {
                return;
            };
            down_widget
                .board
                .borrow_mut()
                .pointer_down(event.pointer_id(), point);
        });
        canvas.add_event_listener_with_callback("pointerdown", ondown.as_ref().unchecked_ref())?;
        ondown.forget();
    }

    {
        let move_widget = widget.clone();
        let move_canvas = canvas.clone();
        let onmove = Closure::<dyn FnMut(PointerEvent)>::new(move |event: PointerEvent| {
            if is_touch_event(&event) {
                event.prevent_default();
            }
            let mut board = move_widget.board.borrow_mut();
            if !board.is_drawing() {
                return;
            }
            if let Some(point) = event_to_point(&move_canvas, &event) {
                board.pointer_move(event.pointer_id(), point);
            }
        });
        canvas.add_event_listener_with_callback("pointermove", onmove.as_ref().unchecked_ref())?;
        onmove.forget();
    }

    for name in ["pointerup", "pointerleave", "pointercancel"] {
        let up_widget = widget.clone();
        let onup = Closure::<dyn FnMut(PointerEvent)>::new(move |event: PointerEvent| {
            let committed = up_widget.board.borrow_mut().pointer_up(event.pointer_id());
            if committed {
                up_widget.sync_ui();
            }
        });
        canvas.add_event_listener_with_callback(name, onup.as_ref().unchecked_ref())?;
        onup.forget();
    }

    add_click(&widget.controls.pencil, {
        let widget = widget.clone();
        move || select_tool(&widget, ToolMode::Pencil)
    })?;
    add_click(&widget.controls.eraser, {
        let widget = widget.clone();
        move || select_tool(&widget, ToolMode::Eraser)
    })?;
    add_click(&widget.controls.undo, {
        let widget = widget.clone();
        move || undo(&widget)
    })?;
    add_click(&widget.controls.redo, {
        let widget = widget.clone();
        move || redo(&widget)
    })?;
    add_click(&widget.controls.clear, {
        let widget = widget.clone();
        move || clear(&widget)
    })?;
    add_click(&widget.controls.solve, {
        let widget = widget.clone();
        move || spawn_local(submit_current(widget.clone()))
    })?;

    {
        let key_widget = widget.clone();
        let onkeydown = Closure::<dyn FnMut(KeyboardEvent)>::new(move |event: KeyboardEvent| {
            if !(event.meta_key() || event.ctrl_key()) {
                return;
            }
            let key = event.key();
            if event.shift_key() && key.eq_ignore_ascii_case("z") {
                event.prevent_default();
                redo(&key_widget);
                return;
            }
            if key.eq_ignore_ascii_case("z") {
                event.prevent_default();
                undo(&key_widget);
                return;
            }
            if key.eq_ignore_ascii_case("y") {
                event.prevent_default();
                redo(&key_widget);
            }
        });
        window.add_event_listener_with_callback("keydown", onkeydown.as_ref().unchecked_ref())?;
        onkeydown.forget();
    }

    let (width, height) = widget.board.borrow().surface().size();
    info!("Sketch pad ready ({width}x{height}), solving via {}", widget.config.endpoint);
    Ok(())
}

fn add_click(
    button: &HtmlButtonElement,
    mut handler: impl FnMut() + 'static,
) -> Result<(), JsValue> {
    let onclick = Closure::<dyn FnMut(Event)>::new(move |_| handler());
    button.add_event_listener_with_callback("click", onclick.as_ref().unchecked_ref())?;
    onclick.forget();
    Ok(())
}
