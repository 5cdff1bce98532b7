//! Rust 值与 `JsValue` 之间的转换
//!
//! 自定义事件的 `detail` 需要真正的 JS 对象，而不是 JSON 字符串。

use js_sys::wasm_bindgen::JsValue;
use serde::Serialize;

#[derive(Debug)]
pub enum Error {
    SerdeWasmBindgen(serde_wasm_bindgen::Error),
}

impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Error::SerdeWasmBindgen(e) => write!(f, "Serde WASM Bindgen Error: {}", e),
        }
    }
}

impl std::error::Error for Error {}

impl From<serde_wasm_bindgen::Error> for Error {
    fn from(e: serde_wasm_bindgen::Error) -> Self {
        Error::SerdeWasmBindgen(e)
    }
}

/// Serialize a Rust data structure into a JsValue
pub fn to_value<T: Serialize>(value: &T) -> Result<JsValue, Error> {
    // 大整数按 JS number 输出，`JSON.stringify` 不支持 BigInt
    let serializer =
        serde_wasm_bindgen::Serializer::new().serialize_large_number_types_as_bigints(false);
    value.serialize(&serializer).map_err(Error::from)
}
