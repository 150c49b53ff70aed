use js_sys::{Array, Function, Promise, Reflect};
use log::{debug, error};
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use wasm_bindgen_futures::{spawn_local, JsFuture};
use web_sys::{HtmlElement, Window};

use sketchsolve_shared::{error_markup, SubmitError};

use crate::util::js_error_message;

pub fn clear_output(output: &HtmlElement) {
    output.set_inner_html("");
}

pub fn show_error(output: &HtmlElement, error: &SubmitError) {
    output.set_inner_html(&error_markup(error));
}

/// Inserts solution markup and, when MathJax is on the page, typesets it in
/// the background.
pub fn show_solution(window: &Window, output: &HtmlElement, markup: &str) {
    output.set_inner_html(markup);
    let window = window.clone();
    let output = output.clone();
    spawn_local(async move {
        typeset(&window, &output).await;
    });
}

fn mathjax_typesetter(window: &Window) -> Option<(JsValue, Function)> {
    let mathjax = Reflect::get(window.as_ref(), &JsValue::from_str("MathJax")).ok()?;
    if !mathjax.is_object() {
        return None;
    }
    let typeset = Reflect::get(&mathjax, &JsValue::from_str("typesetPromise"))
        .ok()?
        .dyn_into::<Function>()
        .ok()?;
    Some((mathjax, typeset))
}

async fn typeset(window: &Window, output: &HtmlElement) {
    let Some((mathjax, typeset)) = mathjax_typesetter(window) else {
        debug!("MathJax not loaded, leaving solution markup as is");
        return;
    };
    let elements = Array::of1(output.as_ref());
    let result = match typeset.call1(&mathjax, &elements) {
        Ok(value) => match value.dyn_into::<Promise>() {
            Ok(promise) => JsFuture::from(promise).await.map(|_| ()),
            Err(_) => Ok(()),
        },
        Err(err) => Err(err),
    };
    match result {
        Ok(()) => debug!("MathJax typeset complete"),
        Err(err) => error!("MathJax typeset error: {}", js_error_message(&err)),
    }
}
