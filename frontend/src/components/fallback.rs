//! 路由器在 `#view-root` 中渲染的兜底视图

use leptos::prelude::*;
use sigpa::FallbackView;

/// 未注册的 hash
#[component]
pub fn RouteNotFound(hash: String) -> impl IntoView {
    view! {
        <div class="hero min-h-[60vh]">
            <div class="hero-content text-center">
                <div>
                    <h1 class="text-6xl font-bold text-warning">
                        <i class="bi bi-signpost-split"></i>
                        " 404"
                    </h1>
                    <p class="text-xl mt-4">"Página no encontrada"</p>
                    <p class="text-base-content/60 mt-2">
                        <code>{hash}</code>
                    </p>
                    <a href="#/" class="btn btn-primary mt-6">
                        <i class="bi bi-house-door"></i>
                        " Volver al inicio"
                    </a>
                </div>
            </div>
        </div>
    }
}

/// 模块加载或挂载失败
#[component]
pub fn MountErrorAlert(path: &'static str, message: String) -> impl IntoView {
    let reload = move |_| {
        let _ = window().location().reload();
    };

    view! {
        <div role="alert" class="alert alert-error m-4">
            <i class="bi bi-exclamation-triangle"></i>
            <div>
                <h3 class="font-bold">"Error al cargar el módulo " {path}</h3>
                <div class="text-sm">{message}</div>
            </div>
            <button type="button" class="btn btn-sm" on:click=reload>
                "Recargar página"
            </button>
        </div>
    }
}

pub fn fallback_view(view: FallbackView) -> AnyView {
    match view {
        FallbackView::NotFound { hash } => view! { <RouteNotFound hash=hash /> }.into_any(),
        FallbackView::MountError { path, message } => {
            view! { <MountErrorAlert path=path message=message /> }.into_any()
        }
    }
}
