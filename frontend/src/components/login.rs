use crate::auth::{login, register, use_auth};
use crate::services::use_services;
use leptos::prelude::*;
use leptos::task::spawn_local;
use sigpa_shared::APP_NAME;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum AuthMode {
    Login,
    Register,
}

impl AuthMode {
    fn submit_label(&self) -> &'static str {
        match self {
            AuthMode::Login => "Iniciar Sesión",
            AuthMode::Register => "Crear Cuenta",
        }
    }

    fn busy_label(&self) -> &'static str {
        match self {
            AuthMode::Login => "Iniciando sesión...",
            AuthMode::Register => "Creando cuenta...",
        }
    }
}

/// 登录与注册共用一个表单
///
/// 成功后不在这里跳转：会话信号变化后由守卫重定向到控制面板。
#[component]
pub fn LoginPage() -> impl IntoView {
    let auth = use_auth();
    let services = use_services();

    let (mode, set_mode) = signal(AuthMode::Login);
    let (email, set_email) = signal(String::new());
    let (password, set_password) = signal(String::new());
    let (is_submitting, set_is_submitting) = signal(false);
    let (error_msg, set_error_msg) = signal(Option::<String>::None);

    let switch_mode = move |next: AuthMode| {
        set_mode.set(next);
        set_error_msg.set(None);
    };

    let on_submit = move |ev: leptos::web_sys::SubmitEvent| {
        ev.prevent_default();
        if is_submitting.get_untracked() {
            return;
        }
        set_is_submitting.set(true);
        set_error_msg.set(None);

        let app = services.with_value(|s| s.clone());
        let current = mode.get_untracked();
        let email = email.get_untracked();
        let password = password.get_untracked();
        spawn_local(async move {
            let result = match current {
                AuthMode::Login => login(auth, app, email, password).await,
                AuthMode::Register => register(auth, app, email, password).await,
            };
            if let Err(message) = result {
                set_error_msg.set(Some(message));
            }
            set_is_submitting.set(false);
        });
    };

    let tab_class = move |tab: AuthMode| {
        if mode.get() == tab {
            "tab tab-active"
        } else {
            "tab"
        }
    };

    view! {
        <div class="hero min-h-screen bg-base-200">
            <div class="hero-content flex-col w-full max-w-md">
                <div class="text-center mb-4">
                    <div class="flex flex-col items-center gap-2">
                        <div class="p-3 bg-primary/10 rounded-2xl text-primary">
                            <i class="bi bi-flower1 text-4xl"></i>
                        </div>
                        <h1 class="text-3xl font-bold">{APP_NAME}</h1>
                        <p class="text-base-content/70">
                            "Sistema Integral de Gestión de Producción Agrícola"
                        </p>
                    </div>
                </div>

                <div class="card shrink-0 w-full shadow-2xl bg-base-100">
                    <div role="tablist" class="tabs tabs-bordered px-6 pt-4">
                        <a role="tab" class=move || tab_class(AuthMode::Login)
                            on:click=move |_| switch_mode(AuthMode::Login)>
                            "Iniciar Sesión"
                        </a>
                        <a role="tab" class=move || tab_class(AuthMode::Register)
                            on:click=move |_| switch_mode(AuthMode::Register)>
                            "Registrarse"
                        </a>
                    </div>
                    <form class="card-body" on:submit=on_submit>
                        {move || error_msg.get().map(|message| view! {
                            <div role="alert" class="alert alert-error text-sm py-2">
                                <i class="bi bi-exclamation-triangle"></i>
                                <span>{message}</span>
                            </div>
                        })}

                        <div class="form-control">
                            <label class="label" for="email">
                                <span class="label-text">"Email"</span>
                            </label>
                            <input
                                id="email"
                                type="email"
                                placeholder="usuario@finca.co"
                                autocomplete="email"
                                on:input=move |ev| set_email.set(event_target_value(&ev))
                                prop:value=email
                                class="input input-bordered"
                                required
                            />
                        </div>
                        <div class="form-control">
                            <label class="label" for="password">
                                <span class="label-text">"Contraseña"</span>
                            </label>
                            <input
                                id="password"
                                type="password"
                                placeholder="••••••••"
                                on:input=move |ev| set_password.set(event_target_value(&ev))
                                prop:value=password
                                class="input input-bordered"
                                required
                            />
                        </div>
                        <div class="form-control mt-6">
                            <button class="btn btn-primary" disabled=move || is_submitting.get()>
                                {move || {
                                    let current = mode.get();
                                    if is_submitting.get() {
                                        view! { <span class="loading loading-spinner"></span> {current.busy_label()} }.into_any()
                                    } else {
                                        current.submit_label().into_any()
                                    }
                                }}
                            </button>
                        </div>
                    </form>
                </div>
            </div>
        </div>
    }
}
