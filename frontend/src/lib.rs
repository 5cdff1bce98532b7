//! SIGPA 前端应用
//!
//! 两层页面结构：
//! - 外壳页面（登录 / 控制面板 / 404）由 `web::shell` 按 URL path 切换，
//!   `AuthGuard` 观察会话信号决定跳转；
//! - 控制面板内部由内核的 hash 路由器把 `features` 中的功能模块挂载到 `#view-root`。
//!
//! 浏览器相关的实现集中在 `web`，内核只看到 `Host`、`Fetcher`、`KeyValueStore` 等接口。

mod api;
mod auth;
mod components {
    pub mod dashboard;
    pub mod fallback;
    pub mod login;
}
mod config;
mod features;
mod firebase;
mod serde_helper;
mod services;
mod toast;
mod web;

use std::rc::Rc;

use crate::auth::{AuthContext, init_auth};
use crate::components::dashboard::DashboardPage;
use crate::components::login::LoginPage;
use crate::config::FrontendConfig;
use crate::services::{AppServices, DashboardChrome, provide_services};
use crate::toast::{ToastQueue, ToastStack};
use crate::web::shell::{ShellOutlet, provide_shell};

use leptos::prelude::*;
use leptos::task::spawn_local;
use sigpa::{AuthGuard, ShellPage};

/// 页面匹配函数
fn page_matcher(page: ShellPage) -> AnyView {
    match page {
        ShellPage::Login => view! { <LoginPage /> }.into_any(),
        ShellPage::Dashboard => view! { <DashboardPage /> }.into_any(),
        ShellPage::NotFound => view! {
            <div class="flex items-center justify-center min-h-screen bg-base-200">
                <div class="text-center">
                    <h1 class="text-6xl font-bold text-error">"404"</h1>
                    <p class="text-xl mt-4">"Página no encontrada"</p>
                    <a href="/" class="btn btn-primary mt-6">"Volver al inicio"</a>
                </div>
            </div>
        }
        .into_any(),
    }
}

#[component]
pub fn App() -> impl IntoView {
    // 1. 会话与提示队列（纯信号句柄）
    let auth = AuthContext::new();
    provide_context(auth);
    let toasts = ToastQueue::new();

    // 2. 服务：恢复会话、应用主题
    let app = AppServices::new(FrontendConfig::from_env(), toasts, auth);
    init_auth(&auth, &app);
    web::theme::install(&app.theme);
    let chrome = DashboardChrome::new(app.clone());
    provide_services(app);

    // 3. 守卫：会话或页面变化时重新判断
    let shell = provide_shell();
    let guard = StoredValue::new_local(Rc::new(AuthGuard::new(shell, chrome.clone())));
    let chrome = StoredValue::new_local(chrome);
    let user = auth.user_signal();

    Effect::new(move |_| {
        let user = user.get();
        if shell.page().get() != ShellPage::Dashboard {
            chrome.with_value(|c| c.teardown());
        }
        let guard = guard.get_value();
        spawn_local(async move {
            guard.on_session_changed(user).await;
        });
    });

    view! {
        <ShellOutlet shell=shell matcher=page_matcher />
        <ToastStack queue=toasts />
    }
}
