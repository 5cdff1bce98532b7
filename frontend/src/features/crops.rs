//! 我的作物：作物列表、汇总与最近活动

use leptos::prelude::*;
use sigpa_shared::fixtures::{Crop, CropsData};
use sigpa_shared::format::format_number;

use super::FixtureModule;
use super::home::ActivityList;
use super::widgets::{Card, EmptyState, PageHeader, status_badge};
use crate::services::{AppServices, Services};

pub fn module(services: AppServices) -> FixtureModule<CropsData> {
    FixtureModule::new("mis-cultivos", services, render)
}

fn render(data: CropsData, _services: Services) -> AnyView {
    let CropsData {
        crops,
        statistics,
        recent_activities,
    } = data;

    view! {
        <div>
            <PageHeader
                icon="bi-flower1"
                title="Mis Cultivos"
                subtitle="Gestión y seguimiento de tus cultivos"
            />
            <div class="stats stats-vertical md:stats-horizontal shadow w-full bg-base-100 mb-6">
                <div class="stat">
                    <div class="stat-title">"Cultivos"</div>
                    <div class="stat-value text-success">{statistics.total_crops}</div>
                </div>
                <div class="stat">
                    <div class="stat-title">"Área total"</div>
                    <div class="stat-value text-2xl">
                        {format!("{} ha", format_number(statistics.total_area, 1))}
                    </div>
                </div>
                <div class="stat">
                    <div class="stat-title">"Rendimiento medio"</div>
                    <div class="stat-value text-2xl">
                        {format!("{} t/ha", format_number(statistics.average_yield, 1))}
                    </div>
                </div>
            </div>
            <div class="grid gap-4 xl:grid-cols-3">
                <div class="xl:col-span-2 grid gap-4 md:grid-cols-2">
                    <CropCards crops=crops />
                </div>
                <Card icon="bi-activity text-info" title="Actividades Recientes">
                    <ActivityList activities=recent_activities />
                </Card>
            </div>
        </div>
    }
    .into_any()
}

#[component]
fn CropCards(crops: Vec<Crop>) -> impl IntoView {
    if crops.is_empty() {
        return view! { <EmptyState message="Aún no has registrado cultivos" /> }.into_any();
    }

    crops
        .into_iter()
        .map(|crop| view! {
            <div class="card bg-base-100 shadow">
                <div class="card-body">
                    <div class="flex justify-between items-center">
                        <h2 class="card-title">{crop.name}</h2>
                        <span class=status_badge(&crop.status)>{crop.status.clone()}</span>
                    </div>
                    <p class="text-base-content/70">{crop.variety}</p>
                    <dl class="grid grid-cols-2 gap-1 text-sm">
                        <dt class="text-base-content/60">"Área"</dt>
                        <dd>{format!("{} ha", format_number(crop.area, 1))}</dd>
                        <dt class="text-base-content/60">"Etapa"</dt>
                        <dd>{crop.stage}</dd>
                        <dt class="text-base-content/60">"Siembra"</dt>
                        <dd class="font-mono">{crop.planted_at}</dd>
                        <dt class="text-base-content/60">"Cosecha estimada"</dt>
                        <dd class="font-mono">{crop.expected_harvest}</dd>
                    </dl>
                </div>
            </div>
        })
        .collect_view()
        .into_any()
}
