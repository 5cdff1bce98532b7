//! SIGPA 核心
//!
//! 与平台无关的单页应用内核：
//! - `route`: 路由表与功能模块的挂载契约
//! - `router`: 基于 hash 的路由状态机
//! - `repository`: 数据文件加载与 LRU 缓存
//! - `theme`: 主题持久化与变更通知
//! - `guard`: 会话状态到页面跳转的映射
//! - `profile`: 用户档案读写
//!
//! 所有与浏览器打交道的部分都通过 trait 注入（`Host`、`Fetcher`、`KeyValueStore`、
//! `Navigator`、`ProfileStore`），因此内核可以在原生环境下完整测试。

// =========================================================
// 跨平台日志宏
// =========================================================

#[cfg(target_arch = "wasm32")]
macro_rules! log_info {
    ($($t:tt)*) => (web_sys::console::log_1(&format!($($t)*).into()))
}

#[cfg(not(target_arch = "wasm32"))]
macro_rules! log_info {
    ($($t:tt)*) => (println!($($t)*))
}

#[cfg(target_arch = "wasm32")]
macro_rules! log_warn {
    ($($t:tt)*) => (web_sys::console::warn_1(&format!($($t)*).into()))
}

#[cfg(not(target_arch = "wasm32"))]
macro_rules! log_warn {
    ($($t:tt)*) => (eprintln!($($t)*))
}

#[cfg(target_arch = "wasm32")]
macro_rules! log_error {
    ($($t:tt)*) => (web_sys::console::error_1(&format!($($t)*).into()))
}

#[cfg(not(target_arch = "wasm32"))]
macro_rules! log_error {
    ($($t:tt)*) => (eprintln!($($t)*))
}

pub mod config;
pub mod error;
pub mod guard;
pub mod host;
pub mod profile;
pub mod repository;
pub mod route;
pub mod router;
pub mod theme;

pub use config::AppConfig;
pub use error::{AppError, AppResult, ErrorStatus};
pub use guard::{AuthGuard, DashboardShell, GuardAction, Navigator, ShellPage};
pub use host::{FallbackView, Host, LocationEvent};
pub use profile::{ProfileService, ProfileStore};
pub use repository::{CacheStats, EvictionReason, Fetcher, JsonRepository};
pub use route::{
    FeatureModule, FnHandle, ModuleHandle, MountContext, NavigationToken, NoopHandle, Route,
    RouteMeta, RouteTable,
};
pub use router::{Router, RouterPhase, Transition};
pub use theme::{KeyValueStore, ThemeChanged, ThemeService};

pub use sigpa_shared as shared;
