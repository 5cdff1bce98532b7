//! 浏览器 API 封装
//!
//! 内核定义的 `Host`、`Fetcher`、`KeyValueStore`、`Navigator` 在这里落地。

pub mod download;
mod host;
mod http;
pub mod shell;
mod storage;
pub mod theme;
pub mod timer;

pub use host::BrowserHost;
pub use http::HttpClient;
pub use storage::BrowserStorage;
