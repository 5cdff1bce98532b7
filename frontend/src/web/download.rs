//! 文件下载
//!
//! 把文本包成 Blob，通过临时 `<a download>` 触发浏览器下载。

use sigpa::{AppError, AppResult};
use wasm_bindgen::{JsCast, JsValue};
use web_sys::{Blob, BlobPropertyBag, HtmlAnchorElement, Url};

fn js_error(context: &str, value: JsValue) -> AppError {
    AppError::browser(format!("{}: {:?}", context, value)).in_op("download")
}

pub fn download_text(file_name: &str, mime: &str, body: &str) -> AppResult<()> {
    let document = web_sys::window()
        .and_then(|w| w.document())
        .ok_or_else(|| AppError::browser("document is not available").in_op("download"))?;
    let body_el = document
        .body()
        .ok_or_else(|| AppError::browser("document has no body").in_op("download"))?;

    let parts = js_sys::Array::of1(&JsValue::from_str(body));
    let options = BlobPropertyBag::new();
    options.set_type(mime);
    let blob = Blob::new_with_str_sequence_and_options(&parts, &options)
        .map_err(|e| js_error("Blob::new", e))?;
    let url = Url::create_object_url_with_blob(&blob).map_err(|e| js_error("createObjectURL", e))?;

    let anchor: HtmlAnchorElement = document
        .create_element("a")
        .map_err(|e| js_error("createElement", e))?
        .dyn_into()
        .map_err(|e| js_error("HtmlAnchorElement cast", e.into()))?;
    anchor.set_href(&url);
    anchor.set_download(file_name);

    let appended = body_el.append_child(&anchor);
    if appended.is_ok() {
        anchor.click();
        let _ = body_el.remove_child(&anchor);
    }
    let _ = Url::revoke_object_url(&url);
    appended.map(|_| ()).map_err(|e| js_error("appendChild", e))
}
