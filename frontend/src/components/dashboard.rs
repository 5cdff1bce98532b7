//! 控制面板外壳
//!
//! 侧边栏、顶栏与 `#view-root`。功能模块不在这里渲染：守卫确认侧边栏出现后，
//! hash 路由器把模块挂载到 `#view-root` 上。

use crate::auth::{logout, use_auth};
use crate::services::use_services;
use crate::web::timer::{CLOCK_TICK_MS, Interval, clock_label, clock_title};
use chrono::Local;
use leptos::prelude::*;
use sigpa_shared::navigation::{FeatureKind, NAV_ROUTES, nav_entry};
use sigpa_shared::{APP_NAME, Theme};

#[component]
pub fn DashboardPage() -> impl IntoView {
    let (collapsed, set_collapsed) = signal(false);

    view! {
        <div class="flex min-h-screen bg-base-200">
            <Sidebar collapsed=collapsed />
            <div class="flex-1 flex flex-col min-w-0">
                <Topbar set_collapsed=set_collapsed />
                <main id="view-root" class="flex-1 p-4 md:p-8" aria-live="polite"></main>
            </div>
        </div>
    }
}

#[component]
fn Sidebar(collapsed: ReadSignal<bool>) -> impl IntoView {
    let links = NAV_ROUTES
        .iter()
        .filter(|entry| entry.kind != FeatureKind::Profile)
        .map(|entry| {
            view! {
                <li>
                    <a class="c-sidebar__link" href=entry.href() title=entry.title>
                        <i class=format!("bi {}", entry.icon)></i>
                        <span class="c-sidebar__label">{entry.title}</span>
                    </a>
                </li>
            }
        })
        .collect_view();

    view! {
        <aside class=move || {
            if collapsed.get() {
                "c-sidebar c-sidebar--collapsed bg-base-100 shadow-xl w-16"
            } else {
                "c-sidebar bg-base-100 shadow-xl w-64"
            }
        }>
            <div class="flex items-center gap-2 p-4 font-bold text-xl text-primary">
                <i class="bi bi-flower1"></i>
                <span class="c-sidebar__label">{APP_NAME}</span>
            </div>
            <ul class="menu w-full">{links}</ul>
        </aside>
    }
}

#[component]
fn Topbar(set_collapsed: WriteSignal<bool>) -> impl IntoView {
    view! {
        <header class="navbar bg-base-100 shadow px-4 gap-2">
            <button
                class="btn btn-ghost btn-square"
                aria-label="Menú"
                on:click=move |_| set_collapsed.update(|c| *c = !*c)
            >
                <i class="bi bi-list text-xl"></i>
            </button>
            <div class="flex-1"></div>
            <Clock />
            <ThemeSelector />
            <UserMenu />
        </header>
    }
}

#[component]
fn Clock() -> impl IntoView {
    let (now, set_now) = signal(Local::now());
    // 随组件 owner 一起释放
    let _ticker = StoredValue::new_local(Interval::new(CLOCK_TICK_MS, move || {
        set_now.try_set(Local::now());
    }));

    view! {
        <span class="hidden md:inline-flex items-center gap-1 font-mono text-sm"
            title=move || now.with(clock_title)>
            <i class="bi bi-clock"></i>
            {move || now.with(clock_label)}
        </span>
    }
}

#[component]
fn ThemeSelector() -> impl IntoView {
    let services = use_services();
    let (selected, set_selected) = signal(services.with_value(|s| s.theme.current()));

    let choose = move |theme: Theme| {
        services.with_value(|s| s.theme.set(theme));
        set_selected.set(theme);
    };

    view! {
        <div class="dropdown dropdown-end">
            <div tabindex="0" role="button" class="btn btn-ghost btn-sm gap-1" title="Tema">
                <i class=move || format!("bi {}", selected.get().icon())></i>
                <span class="hidden md:inline">{move || selected.get().label()}</span>
            </div>
            <ul tabindex="0" class="dropdown-content z-[1] menu p-2 shadow bg-base-100 rounded-box w-40">
                {Theme::ALL
                    .into_iter()
                    .map(|theme| {
                        view! {
                            <li>
                                <a
                                    class=move || if selected.get() == theme { "active" } else { "" }
                                    on:click=move |_| choose(theme)
                                >
                                    <i class=format!("bi {}", theme.icon())></i>
                                    {theme.label()}
                                </a>
                            </li>
                        }
                    })
                    .collect_view()}
            </ul>
        </div>
    }
}

#[component]
fn UserMenu() -> impl IntoView {
    let auth = use_auth();
    let services = use_services();
    let user = auth.user_signal();
    let profile = nav_entry(FeatureKind::Profile);

    let name = move || {
        user.with(|u| u.as_ref().map(|u| u.short_name().to_string()).unwrap_or_default())
    };
    let photo = move || user.with(|u| u.as_ref().and_then(|u| u.photo_url.clone()));
    let on_logout = move |_| services.with_value(|s| logout(auth, s));

    view! {
        <div class="dropdown dropdown-end">
            <div tabindex="0" role="button" class="btn btn-ghost gap-2">
                {move || match photo() {
                    Some(url) => view! {
                        <div class="avatar"><div class="w-8 rounded-full"><img src=url alt="Avatar" /></div></div>
                    }.into_any(),
                    None => view! { <i class="bi bi-person-circle text-2xl"></i> }.into_any(),
                }}
                <span class="hidden md:inline">{name}</span>
            </div>
            <ul tabindex="0" class="dropdown-content z-[1] menu p-2 shadow bg-base-100 rounded-box w-52">
                <li>
                    <a href=profile.href()>
                        <i class=format!("bi {}", profile.icon)></i>
                        "Mi Perfil"
                    </a>
                </li>
                <li>
                    <a class="text-error" on:click=on_logout>
                        <i class="bi bi-box-arrow-right"></i>
                        "Cerrar Sesión"
                    </a>
                </li>
            </ul>
        </div>
    }
}
