use js_sys::{Function, Promise};
use log::debug;
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use wasm_bindgen_futures::JsFuture;
use web_sys::{Blob, CanvasRenderingContext2d, Document, HtmlCanvasElement, HtmlImageElement};

use sketchsolve_shared::{
    EncodedImage, Point, Snapshot, StrokeStyle, SubmitError, Surface, EXPORT_BACKGROUND,
    IMAGE_MIME,
};

use crate::util::js_error_message;

pub struct CanvasSurface {
    canvas: HtmlCanvasElement,
    ctx: CanvasRenderingContext2d,
    last: Option<Point>,
}

fn context_2d(canvas: &HtmlCanvasElement) -> Result<CanvasRenderingContext2d, JsValue> {
    canvas
        .get_context("2d")?
        .ok_or_else(|| JsValue::from_str("Missing canvas context"))?
        .dyn_into::<CanvasRenderingContext2d>()
        .map_err(JsValue::from)
}

impl CanvasSurface {
    pub fn new(canvas: HtmlCanvasElement) -> Result<Self, JsValue> {
        let ctx = context_2d(&canvas)?;
        ctx.set_line_cap("round");
        ctx.set_line_join("round");
        Ok(Self {
            canvas,
            ctx,
            last: None,
        })
    }

    pub fn canvas(&self) -> &HtmlCanvasElement {
        &self.canvas
    }

    pub fn size(&self) -> (u32, u32) {
        (self.canvas.width(), self.canvas.height())
    }

    /// Replaces the whole raster with a decoded snapshot.
    pub fn draw_image(&self, image: &HtmlImageElement) -> Result<(), JsValue> {
        self.wipe();
        self.ctx
            .draw_image_with_html_image_element(image, 0.0, 0.0)
    }

    fn wipe(&self) {
        self.ctx.clear_rect(
            0.0,
            0.0,
            self.canvas.width() as f64,
            self.canvas.height() as f64,
        );
    }
}

impl Surface for CanvasSurface {
    type Error = String;

    fn begin_stroke(&mut self, point: Point) {
        self.last = Some(point);
    }

    fn extend_stroke(&mut self, point: Point) {
        let Some(from) = self.last.replace(point) else {
            return;
        };
        self.ctx.begin_path();
        self.ctx.move_to(from.x, from.y);
        self.ctx.line_to(point.x, point.y);
        self.ctx.stroke();
    }

    fn end_stroke(&mut self) {
        self.last = None;
    }

    fn set_style(&mut self, style: StrokeStyle) {
        self.ctx.set_stroke_style_str(style.color);
        self.ctx.set_line_width(style.width);
    }

    fn clear(&mut self) {
        self.wipe();
    }

    fn export_image(&self) -> Result<Snapshot, String> {
        self.canvas
            .to_data_url_with_type(IMAGE_MIME)
            .map(Snapshot::encoded)
            .map_err(|error| js_error_message(&error))
    }
}

pub async fn decode_image(image: &EncodedImage) -> Result<HtmlImageElement, JsValue> {
    let element = HtmlImageElement::new()?;
    element.set_src(image.as_str());
    JsFuture::from(element.decode()).await?;
    Ok(element)
}

async fn canvas_to_blob(canvas: &HtmlCanvasElement) -> Result<Option<Blob>, JsValue> {
    let promise = Promise::new(&mut |resolve: Function, reject: Function| {
        let callback = Closure::once_into_js(move |blob: JsValue| {
            let _ = resolve.call1(&JsValue::NULL, &blob);
        });
        if let Err(error) = canvas.to_blob_with_type(callback.unchecked_ref(), IMAGE_MIME) {
            let _ = reject.call1(&JsValue::NULL, &error);
        }
    });
    let value = JsFuture::from(promise).await?;
    Ok(value.dyn_into::<Blob>().ok())
}

fn unexpected(error: JsValue) -> SubmitError {
    SubmitError::Transport(js_error_message(&error))
}

/// Flattens `snapshot` onto an opaque white canvas of the given size and
/// encodes it as PNG.
pub async fn compose_export(
    document: &Document,
    width: u32,
    height: u32,
    snapshot: &Snapshot,
) -> Result<Blob, SubmitError> {
    let image = snapshot.image().ok_or(SubmitError::Capture)?;

    let offscreen = document
        .create_element("canvas")
        .and_then(|element| {
            element
                .dyn_into::<HtmlCanvasElement>()
                .map_err(JsValue::from)
        })
        .map_err(unexpected)?;
    offscreen.set_width(width);
    offscreen.set_height(height);
    let ctx = context_2d(&offscreen).map_err(unexpected)?;
    ctx.set_fill_style_str(EXPORT_BACKGROUND);
    ctx.fill_rect(0.0, 0.0, width as f64, height as f64);

    let decoded = decode_image(image).await.map_err(unexpected)?;
    ctx.draw_image_with_html_image_element(&decoded, 0.0, 0.0)
        .map_err(unexpected)?;

    match canvas_to_blob(&offscreen).await.map_err(unexpected)? {
        Some(blob) if blob.size() > 0.0 => {
            debug!("Encoded {width}x{height} export, {} bytes", blob.size());
            Ok(blob)
        }
        _ => Err(SubmitError::Capture),
    }
}
