//! 内核配置
//!
//! 所有值都有编译期默认值，由宿主在构造服务时覆盖。

use std::num::NonZeroUsize;

use sigpa_shared::{APP_NAME, STORAGE_THEME_KEY};

pub const DEFAULT_DATA_BASE_PATH: &str = "./data";
pub const DEFAULT_CACHE_CAPACITY: usize = 32;
pub const DEFAULT_ROOT_ELEMENT_ID: &str = "view-root";
pub const DEFAULT_TITLE_PREFIX: &str = APP_NAME;
pub const DEFAULT_THEME_KEY: &str = STORAGE_THEME_KEY;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    /// 数据文件所在目录（不带结尾斜杠也可以）
    pub data_base_path: String,
    /// 数据缓存最多保留的条目数
    pub cache_capacity: NonZeroUsize,
    /// 功能模块挂载的根元素 id
    pub root_element_id: String,
    /// 文档标题前缀：`"<prefix> – <route title>"`
    pub title_prefix: String,
    /// LocalStorage 中保存主题的键
    pub theme_storage_key: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            data_base_path: DEFAULT_DATA_BASE_PATH.to_string(),
            cache_capacity: NonZeroUsize::new(DEFAULT_CACHE_CAPACITY).unwrap_or(NonZeroUsize::MIN),
            root_element_id: DEFAULT_ROOT_ELEMENT_ID.to_string(),
            title_prefix: DEFAULT_TITLE_PREFIX.to_string(),
            theme_storage_key: DEFAULT_THEME_KEY.to_string(),
        }
    }
}

impl AppConfig {
    pub fn with_data_base_path(mut self, path: impl Into<String>) -> Self {
        self.data_base_path = path.into();
        self
    }

    /// 容量为 0 时按 1 处理
    pub fn with_cache_capacity(mut self, capacity: usize) -> Self {
        self.cache_capacity = NonZeroUsize::new(capacity).unwrap_or(NonZeroUsize::MIN);
        self
    }

    pub fn with_title_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.title_prefix = prefix.into();
        self
    }

    pub fn page_title(&self, route_title: &str) -> String {
        format!("{} – {}", self.title_prefix, route_title)
    }

    pub fn not_found_title(&self) -> String {
        self.page_title("Página no encontrada")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_and_titles() {
        let cfg = AppConfig::default();
        assert_eq!(cfg.data_base_path, "./data");
        assert_eq!(cfg.cache_capacity.get(), DEFAULT_CACHE_CAPACITY);
        assert_eq!(cfg.page_title("Riego"), "SIGPA – Riego");
        assert_eq!(cfg.not_found_title(), "SIGPA – Página no encontrada");
    }

    #[test]
    fn zero_capacity_is_clamped() {
        let cfg = AppConfig::default().with_cache_capacity(0);
        assert_eq!(cfg.cache_capacity.get(), 1);
    }
}
