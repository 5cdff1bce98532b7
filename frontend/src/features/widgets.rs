//! 功能模块共用的小组件

use leptos::prelude::*;

#[component]
pub fn PageHeader(
    icon: &'static str,
    title: &'static str,
    #[prop(into)] subtitle: String,
) -> impl IntoView {
    view! {
        <div class="mb-6">
            <h1 class="text-2xl font-bold flex items-center gap-2">
                <i class=format!("bi {} text-primary", icon)></i>
                {title}
            </h1>
            <p class="text-base-content/70">{subtitle}</p>
        </div>
    }
}

#[component]
pub fn Card(icon: &'static str, title: &'static str, children: Children) -> impl IntoView {
    view! {
        <div class="card bg-base-100 shadow-xl h-full">
            <div class="card-body">
                <h2 class="card-title text-lg">
                    <i class=format!("bi {}", icon)></i>
                    {title}
                </h2>
                {children()}
            </div>
        </div>
    }
}

#[component]
pub fn EmptyState(message: &'static str) -> impl IntoView {
    view! { <p class="text-base-content/50 py-4">{message}</p> }
}

/// 状态文字到徽章样式
pub fn status_badge(status: &str) -> &'static str {
    match status {
        "activo" | "active" | "saludable" | "healthy" | "completado" => "badge badge-success",
        "pendiente" | "pending" | "programado" | "scheduled" => "badge badge-info",
        "alerta" | "warning" | "atención" => "badge badge-warning",
        "inactivo" | "inactive" | "error" | "danger" => "badge badge-error",
        _ => "badge badge-ghost",
    }
}
