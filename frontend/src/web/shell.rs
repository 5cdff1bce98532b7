//! 页面外壳服务
//!
//! 封装 History API：登录页与控制面板是两个顶层页面，通过 pathname 区分；
//! 面板内部的功能模块由 hash 路由器负责，这里不处理 hash。
//! 页面跳转只更新信号，认证相关的判断由 `AuthGuard` 完成。

use leptos::prelude::*;
use sigpa::{Navigator, ShellPage};
use wasm_bindgen::prelude::*;

/// 获取当前浏览器路径
fn current_path() -> String {
    web_sys::window()
        .and_then(|w| w.location().pathname().ok())
        .unwrap_or_else(|| "/".to_string())
}

/// 推送 History 状态
fn push_history_state(path: &str) {
    if let Some(window) = web_sys::window() {
        if let Ok(history) = window.history() {
            let _ = history.push_state_with_url(&JsValue::NULL, "", Some(path));
        }
    }
}

/// 替换 History 状态（用于重定向）
fn replace_history_state(path: &str) {
    if let Some(window) = web_sys::window() {
        if let Ok(history) = window.history() {
            let _ = history.replace_state_with_url(&JsValue::NULL, "", Some(path));
        }
    }
}

/// 外壳服务
///
/// 只包含信号句柄，可以复制进任意闭包。
#[derive(Clone, Copy)]
pub struct ShellService {
    page: ReadSignal<ShellPage>,
    set_page: WriteSignal<ShellPage>,
}

impl ShellService {
    fn new() -> Self {
        let (page, set_page) = signal(ShellPage::from_path(&current_path()));
        Self { page, set_page }
    }

    pub fn page(&self) -> ReadSignal<ShellPage> {
        self.page
    }

    /// 用户主动跳转（如点击链接）
    pub fn navigate(&self, page: ShellPage) {
        push_history_state(page.to_path());
        self.update(page);
    }

    fn update(&self, page: ShellPage) {
        if self.page.get_untracked() != page {
            self.set_page.set(page);
        }
    }

    /// 浏览器后退/前进
    ///
    /// hash 变化同样会触发 popstate，此时页面不变，信号也不更新。
    fn init_popstate_listener(&self) {
        let shell = *self;
        let closure = Closure::<dyn Fn()>::new(move || {
            shell.update(ShellPage::from_path(&current_path()));
        });

        if let Some(window) = web_sys::window() {
            let _ = window
                .add_event_listener_with_callback("popstate", closure.as_ref().unchecked_ref());
        }

        // 泄漏闭包以保持监听器存活
        closure.forget();
    }
}

impl Navigator for ShellService {
    fn current_page(&self) -> ShellPage {
        self.page.get_untracked()
    }

    /// 重定向不留历史记录，登录后按后退键不会回到登录页
    fn redirect(&self, page: ShellPage) {
        replace_history_state(page.to_path());
        self.update(page);
    }
}

/// 创建外壳服务并放入 Context
pub fn provide_shell() -> ShellService {
    let shell = ShellService::new();
    shell.init_popstate_listener();
    provide_context(shell);
    shell
}

// ============================================================================
// UI 组件
// ============================================================================

/// 根据当前页面渲染对应的组件
#[component]
pub fn ShellOutlet(
    shell: ShellService,
    /// 页面匹配函数
    matcher: fn(ShellPage) -> AnyView,
) -> impl IntoView {
    move || matcher(shell.page().get())
}
