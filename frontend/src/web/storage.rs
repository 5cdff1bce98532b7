//! LocalStorage 封装模块
//!
//! 主题等字符串值直接使用 `web_sys::Storage`；会话这类结构化数据通过
//! `gloo-storage` 以 JSON 形式保存。

use gloo_storage::Storage as _;
use serde::{Serialize, de::DeserializeOwned};
use sigpa::KeyValueStore;

/// 浏览器 localStorage
#[derive(Debug, Clone, Copy, Default)]
pub struct BrowserStorage;

impl BrowserStorage {
    fn storage() -> Option<web_sys::Storage> {
        web_sys::window()?.local_storage().ok()?
    }

    /// 读取 JSON 值；键不存在或内容无法解析时返回 `None`
    pub fn get_json<T: DeserializeOwned>(key: &str) -> Option<T> {
        gloo_storage::LocalStorage::get(key).ok()
    }

    pub fn set_json<T: Serialize>(key: &str, value: &T) -> bool {
        gloo_storage::LocalStorage::set(key, value).is_ok()
    }
}

impl KeyValueStore for BrowserStorage {
    fn get(&self, key: &str) -> Option<String> {
        Self::storage()?.get_item(key).ok()?
    }

    fn set(&self, key: &str, value: &str) -> bool {
        Self::storage()
            .and_then(|s| s.set_item(key, value).ok())
            .is_some()
    }

    fn delete(&self, key: &str) -> bool {
        Self::storage()
            .and_then(|s| s.remove_item(key).ok())
            .is_some()
    }
}
