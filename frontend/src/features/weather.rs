//! 天气：当前状况、农事提醒与预报
//!
//! 每 10 分钟从数据文件重新读取一次，也可以手动刷新。刷新失败时继续显示旧数据。
//! 当前数据可以导出为 JSON 文件。

use async_trait::async_trait;
use leptos::prelude::*;
use leptos::task::spawn_local;
use sigpa::{AppResult, FeatureModule, ModuleHandle, MountContext, NoopHandle};
use sigpa_shared::fixtures::{CurrentWeather, ForecastDay, WeatherData};
use sigpa_shared::format::format_number;
use sigpa_shared::weather::{
    WeatherExport, advisories, weather_color, weather_icon, wind_direction,
};
use web_sys::HtmlElement;

use super::widgets::{Card, EmptyState, PageHeader};
use super::{mount_view, show_loading};
use crate::services::{AppServices, Services};
use crate::web::download::download_text;
use crate::web::timer::Interval;

const FIXTURE: &str = "clima";
const REFRESH_MS: u32 = 600_000;

pub struct WeatherModule {
    services: AppServices,
}

pub fn module(services: AppServices) -> WeatherModule {
    WeatherModule { services }
}

#[async_trait(?Send)]
impl FeatureModule<HtmlElement> for WeatherModule {
    async fn mount(&self, ctx: MountContext<HtmlElement>) -> AppResult<Box<dyn ModuleHandle>> {
        show_loading(&ctx.container);
        let data: WeatherData = self.services.repository.load_as(FIXTURE).await?;
        if !ctx.token.is_current() {
            return Ok(Box::new(NoopHandle));
        }

        let services = self.services.clone();
        Ok(mount_view(&ctx.container, move || {
            view! { <WeatherView initial=data services=StoredValue::new_local(services) /> }
                .into_any()
        }))
    }
}

/// 重新读取；成功后才替换缓存
async fn reload(services: Services) -> AppResult<WeatherData> {
    let repository = services.with_value(|s| s.repository.clone());
    repository.refresh_as(FIXTURE).await
}

fn export(data: &WeatherData) -> AppResult<()> {
    let export = WeatherExport::new(data, chrono::Utc::now());
    let body = serde_json::to_string_pretty(&export)
        .map_err(|e| sigpa::AppError::from(e).in_op("weather.export"))?;
    download_text(&export.file_name(), "application/json", &body)
}

#[component]
fn WeatherView(initial: WeatherData, services: Services) -> impl IntoView {
    let data = RwSignal::new(initial);
    let (refreshing, set_refreshing) = signal(false);

    let refresh = move |notify: bool| {
        set_refreshing.set(true);
        spawn_local(async move {
            let toasts = services.with_value(|s| s.toasts);
            match reload(services).await {
                Ok(fresh) => {
                    data.set(fresh);
                    if notify {
                        toasts.success("Datos del clima actualizados");
                    }
                }
                Err(e) => {
                    web_sys::console::error_1(&format!("[Clima] {}", e).into());
                    toasts.error("Error al actualizar datos del clima");
                }
            }
            set_refreshing.set(false);
        });
    };

    let on_export = move |_| {
        let toasts = services.with_value(|s| s.toasts);
        match data.with(export) {
            Ok(()) => toasts.success("Datos exportados correctamente"),
            Err(e) => {
                web_sys::console::error_1(&format!("[Clima] {}", e).into());
                toasts.error("Error al exportar los datos");
            }
        }
    };

    // 定时器随模块的 owner 一起释放
    let _timer = StoredValue::new_local(Interval::new(REFRESH_MS, move || refresh(false)));

    view! {
        <div>
            <div class="flex justify-between items-start">
                <PageHeader
                    icon="bi-cloud-sun"
                    title="Clima"
                    subtitle="Condiciones meteorológicas y recomendaciones para la finca"
                />
                <div class="flex gap-1">
                    <button class="btn btn-ghost btn-circle" title="Exportar datos" on:click=on_export>
                        <i class="bi bi-download"></i>
                    </button>
                    <button
                        class="btn btn-ghost btn-circle"
                        title="Actualizar"
                        disabled=move || refreshing.get()
                        on:click=move |_| refresh(true)
                    >
                        <i class=move || if refreshing.get() { "bi bi-arrow-clockwise animate-spin" } else { "bi bi-arrow-clockwise" }></i>
                    </button>
                </div>
            </div>
            <div class="grid gap-4 lg:grid-cols-3">
                <Card icon="bi-thermometer-half text-warning" title="Ahora">
                    {move || view! { <CurrentPanel current=data.with(|d| d.current.clone()) /> }}
                </Card>
                <div class="lg:col-span-2">
                    <Card icon="bi-calendar-week text-info" title="Pronóstico">
                        {move || view! { <ForecastList forecast=data.with(|d| d.forecast.clone()) /> }}
                    </Card>
                </div>
            </div>
        </div>
    }
}

#[component]
fn CurrentPanel(current: CurrentWeather) -> impl IntoView {
    let code = current.weather_code.unwrap_or_default();
    let notes = advisories(&current);

    view! {
        <div class="text-center">
            <i class=format!("bi {} {} text-6xl", weather_icon(code), weather_color(code))></i>
            <h3 class="text-4xl font-bold">{format!("{}°C", format_number(current.temperature, 0))}</h3>
            <p class="text-base-content/70">{current.description.clone()}</p>
        </div>
        <div class="grid grid-cols-2 gap-2 mt-4 text-sm">
            <div><i class="bi bi-droplet"></i>{format!(" Humedad {}%", format_number(current.humidity, 0))}</div>
            <div>
                <i class="bi bi-wind"></i>
                {format!(
                    " {} km/h {}",
                    format_number(current.wind_speed, 0),
                    wind_direction(current.wind_direction)
                )}
            </div>
        </div>
        <div class="mt-4 space-y-2">
            {notes
                .into_iter()
                .map(|note| view! {
                    <div role="alert" class=format!("alert alert-{} text-sm py-2", note.level.as_str())>
                        <i class=format!("bi {}", note.icon)></i>
                        <span>{note.message}</span>
                    </div>
                })
                .collect_view()}
        </div>
    }
}

#[component]
fn ForecastList(forecast: Vec<ForecastDay>) -> impl IntoView {
    if forecast.is_empty() {
        return view! { <EmptyState message="Pronóstico no disponible" /> }.into_any();
    }

    view! {
        <div class="grid grid-cols-2 md:grid-cols-4 xl:grid-cols-7 gap-2">
            {forecast
                .into_iter()
                .map(|day| view! {
                    <div class="card bg-base-200 p-3 text-center">
                        <div class="font-mono text-sm">{day.date}</div>
                        <i class=format!(
                            "bi {} {} text-3xl",
                            weather_icon(day.weather_code),
                            weather_color(day.weather_code)
                        )></i>
                        <div>{format!("{}° / {}°", format_number(day.max, 0), format_number(day.min, 0))}</div>
                        <small class="text-info">
                            <i class="bi bi-umbrella"></i>
                            {format!(" {} mm", format_number(day.precipitation, 1))}
                        </small>
                    </div>
                })
                .collect_view()}
        </div>
    }
    .into_any()
}
