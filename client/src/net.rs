use wasm_bindgen::JsCast;
use wasm_bindgen::JsValue;
use wasm_bindgen_futures::JsFuture;
use web_sys::{Blob, FormData, RequestInit, Response, Window};

use sketchsolve_shared::{RawReply, IMAGE_FIELD, IMAGE_FILENAME};

/// Posts `image` as multipart form data and reads the whole body as text.
pub async fn post_image(
    window: &Window,
    endpoint: &str,
    image: &Blob,
) -> Result<RawReply, JsValue> {
    let form = FormData::new()?;
    form.append_with_blob_and_filename(IMAGE_FIELD, image, IMAGE_FILENAME)?;

    let init = RequestInit::new();
    init.set_method("POST");
    init.set_body(form.as_ref());

    let response: Response = JsFuture::from(window.fetch_with_str_and_init(endpoint, &init))
        .await?
        .dyn_into()?;
    let body = JsFuture::from(response.text()?)
        .await?
        .as_string()
        .unwrap_or_default();
    Ok(RawReply {
        status: response.status(),
        status_text: response.status_text(),
        body,
    })
}
