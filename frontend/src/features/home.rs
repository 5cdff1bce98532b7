//! 首页：统计卡片、最近活动与当前天气

use leptos::prelude::*;
use sigpa_shared::fixtures::{Activity, HomeData, StatCard, WeatherSnapshot};
use sigpa_shared::format::format_number;
use sigpa_shared::weather::{weather_color, weather_icon, wind_direction};

use super::FixtureModule;
use super::widgets::{Card, EmptyState, PageHeader};
use crate::services::{AppServices, Services};

pub fn module(services: AppServices) -> FixtureModule<HomeData> {
    FixtureModule::new("home", services, render)
}

fn render(data: HomeData, _services: Services) -> AnyView {
    let HomeData {
        stats,
        recent_activities,
        weather,
    } = data;

    view! {
        <div>
            <PageHeader
                icon="bi-house-door"
                title="Dashboard Principal"
                subtitle="Bienvenido al sistema de gestión de producción agrícola"
            />
            <div class="grid gap-4 md:grid-cols-2 xl:grid-cols-4 mb-6">
                {stats.into_iter().map(|stat| view! { <StatTile stat=stat /> }).collect_view()}
            </div>
            <div class="grid gap-4 lg:grid-cols-3">
                <div class="lg:col-span-2">
                    <Card icon="bi-activity text-info" title="Actividades Recientes">
                        <ActivityList activities=recent_activities />
                    </Card>
                </div>
                <Card icon="bi-cloud-sun text-warning" title="Clima">
                    <WeatherSummary weather=weather />
                </Card>
            </div>
        </div>
    }
    .into_any()
}

#[component]
fn StatTile(stat: StatCard) -> impl IntoView {
    let trend = if stat.is_positive() {
        ("text-success", "bi-arrow-up")
    } else {
        ("text-error", "bi-arrow-down")
    };

    view! {
        <div class="stat bg-base-100 shadow rounded-box">
            <div class=format!("stat-figure text-{}", stat.color)>
                <i class=format!("bi {} text-3xl", stat.icon)></i>
            </div>
            <div class="stat-title">{stat.title.clone()}</div>
            <div class="stat-value text-2xl">{format_number(stat.value, 0)}</div>
            {stat.change.clone().map(|change| view! {
                <div class="stat-desc">
                    <span class=trend.0>
                        <i class=format!("bi {}", trend.1)></i>
                        {change}
                    </span>
                    " vs mes anterior"
                </div>
            })}
        </div>
    }
}

#[component]
pub fn ActivityList(activities: Vec<Activity>) -> impl IntoView {
    if activities.is_empty() {
        return view! { <EmptyState message="No hay actividades recientes" /> }.into_any();
    }

    view! {
        <ul class="divide-y divide-base-200">
            {activities
                .into_iter()
                .map(|activity| view! {
                    <li class="flex items-center gap-3 py-2">
                        <i class=format!("bi {} text-{} text-xl", activity.icon, activity.color)></i>
                        <div>
                            <p>{activity.message}</p>
                            <small class="text-base-content/60">{activity.time}</small>
                        </div>
                    </li>
                })
                .collect_view()}
        </ul>
    }
    .into_any()
}

#[component]
fn WeatherSummary(weather: Option<WeatherSnapshot>) -> impl IntoView {
    let Some(weather) = weather else {
        return view! { <EmptyState message="Información no disponible" /> }.into_any();
    };
    let current = weather.current;
    let icon = match (&current.icon, current.weather_code) {
        (Some(icon), _) => icon.clone(),
        (None, Some(code)) => format!("{} {}", weather_icon(code), weather_color(code)),
        (None, None) => "bi-cloud text-base-content/50".to_string(),
    };

    view! {
        <div class="text-center">
            <i class=format!("bi {} text-5xl", icon)></i>
            <h3 class="text-3xl font-bold mt-2">{format!("{}°C", format_number(current.temperature, 1))}</h3>
            <p class="text-base-content/70">{current.description.clone()}</p>
            <small class="text-base-content/60">
                {format!("Humedad: {}%", format_number(current.humidity, 0))}
            </small>
            <p class="text-sm mt-2">
                <i class="bi bi-wind"></i>
                {format!(
                    " {} km/h {}",
                    format_number(current.wind_speed, 0),
                    wind_direction(current.wind_direction)
                )}
            </p>
        </div>
    }
    .into_any()
}
