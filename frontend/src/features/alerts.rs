//! 告警：当前告警、通知列表，以及通过中继发送测试邮件 / 短信

use leptos::prelude::*;
use leptos::task::spawn_local;
use sigpa_shared::fixtures::{AlertsData, FarmAlert, Notification};
use sigpa_shared::protocol::{EmailAlert, SmsAlert};
use sigpa_shared::validation::validate_email;

use super::FixtureModule;
use super::widgets::{Card, EmptyState, PageHeader};
use crate::services::{AppServices, Services};

pub fn module(services: AppServices) -> FixtureModule<AlertsData> {
    FixtureModule::new("alertas", services, render)
}

fn level_class(level: &str) -> &'static str {
    match level {
        "danger" => "alert alert-error",
        "warning" => "alert alert-warning",
        "success" => "alert alert-success",
        _ => "alert alert-info",
    }
}

fn level_icon(level: &str) -> &'static str {
    match level {
        "danger" => "bi bi-exclamation-octagon",
        "warning" => "bi bi-exclamation-triangle",
        _ => "bi bi-info-circle",
    }
}

fn render(data: AlertsData, services: Services) -> AnyView {
    let AlertsData {
        alerts,
        notifications,
    } = data;

    view! {
        <div>
            <PageHeader
                icon="bi-exclamation-triangle"
                title="Alertas"
                subtitle="Avisos del sistema y notificaciones de la finca"
            />
            <div class="grid gap-4 lg:grid-cols-3">
                <div class="lg:col-span-2 space-y-4">
                    <Card icon="bi-bell text-warning" title="Alertas activas">
                        <AlertList alerts=alerts />
                    </Card>
                    <Card icon="bi-envelope-open text-info" title="Notificaciones">
                        <NotificationList notifications=notifications />
                    </Card>
                </div>
                <TestAlertForm services=services />
            </div>
        </div>
    }
    .into_any()
}

#[component]
fn AlertList(alerts: Vec<FarmAlert>) -> impl IntoView {
    if alerts.is_empty() {
        return view! { <EmptyState message="No hay alertas activas" /> }.into_any();
    }

    view! {
        <div class="space-y-2">
            {alerts
                .into_iter()
                .map(|alert| view! {
                    <div role="alert" class=level_class(&alert.level)>
                        <i class=level_icon(&alert.level)></i>
                        <div>
                            <h3 class="font-bold">{alert.title}</h3>
                            <div class="text-sm">{alert.message}</div>
                        </div>
                        <small>{alert.time}</small>
                    </div>
                })
                .collect_view()}
        </div>
    }
    .into_any()
}

#[component]
fn NotificationList(notifications: Vec<Notification>) -> impl IntoView {
    if notifications.is_empty() {
        return view! { <EmptyState message="No hay notificaciones" /> }.into_any();
    }

    view! {
        <ul class="divide-y divide-base-200">
            {notifications
                .into_iter()
                .map(|n| {
                    let class = if n.read { "py-2 text-base-content/60" } else { "py-2 font-semibold" };
                    view! {
                        <li class=class>
                            <p>{n.message}</p>
                            <small class="text-base-content/60 font-normal">{n.time}</small>
                        </li>
                    }
                })
                .collect_view()}
        </ul>
    }
    .into_any()
}

/// 发送到中继的示例告警
#[component]
fn TestAlertForm(services: Services) -> impl IntoView {
    let default_email = services
        .with_value(|s| s.auth.current_user().map(|u| u.email))
        .unwrap_or_default();
    let (email, set_email) = signal(default_email);
    let (phone, set_phone) = signal(String::new());
    let (sending, set_sending) = signal(false);

    let send_email = move |_| {
        let to = email.get_untracked();
        let (api, toasts) = services.with_value(|s| (s.alerts.clone(), s.toasts));
        if let Err(e) = validate_email(&to) {
            toasts.warning(e.message());
            return;
        }
        set_sending.set(true);
        spawn_local(async move {
            match api.send_email(&EmailAlert::sample(to)).await {
                Ok(_) => toasts.success("📧 Correo enviado correctamente"),
                Err(e) => {
                    web_sys::console::error_1(&format!("[Alertas] {}", e).into());
                    toasts.error("❌ Error al enviar correo");
                }
            }
            set_sending.set(false);
        });
    };

    let send_sms = move |_| {
        let to = phone.get_untracked().trim().to_string();
        let (api, toasts) = services.with_value(|s| (s.alerts.clone(), s.toasts));
        if to.is_empty() {
            toasts.warning("Ingresa un número de teléfono");
            return;
        }
        set_sending.set(true);
        spawn_local(async move {
            match api.send_sms(&SmsAlert::sample(to)).await {
                Ok(_) => toasts.success("📱 SMS enviado correctamente"),
                Err(e) => {
                    web_sys::console::error_1(&format!("[Alertas] {}", e).into());
                    toasts.error("❌ Error al enviar SMS");
                }
            }
            set_sending.set(false);
        });
    };

    view! {
        <Card icon="bi-send text-primary" title="Alerta de prueba">
            <label class="form-control w-full">
                <span class="label-text">"Correo"</span>
                <input
                    type="email"
                    class="input input-bordered"
                    prop:value=email
                    on:input=move |ev| set_email.set(event_target_value(&ev))
                />
            </label>
            <button class="btn btn-primary mt-2" disabled=move || sending.get() on:click=send_email>
                <i class="bi bi-envelope"></i>
                "Enviar correo"
            </button>
            <label class="form-control w-full mt-4">
                <span class="label-text">"Teléfono"</span>
                <input
                    type="tel"
                    class="input input-bordered"
                    placeholder="+573001112233"
                    prop:value=phone
                    on:input=move |ev| set_phone.set(event_target_value(&ev))
                />
            </label>
            <button class="btn btn-secondary mt-2" disabled=move || sending.get() on:click=send_sms>
                <i class="bi bi-phone"></i>
                "Enviar SMS"
            </button>
        </Card>
    }
}
