//! 灌溉：分区状态、今日计划与用水统计

use leptos::prelude::*;
use sigpa_shared::fixtures::{IrrigationData, IrrigationSector, IrrigationSlot};
use sigpa_shared::format::format_number;

use super::FixtureModule;
use super::widgets::{Card, EmptyState, PageHeader, status_badge};
use crate::services::{AppServices, Services};

pub fn module(services: AppServices) -> FixtureModule<IrrigationData> {
    FixtureModule::new("riego", services, render)
}

fn render(data: IrrigationData, _services: Services) -> AnyView {
    let IrrigationData {
        sectors,
        schedule,
        statistics,
    } = data;

    view! {
        <div>
            <PageHeader
                icon="bi-droplet"
                title="Gestión de Riego"
                subtitle="Control y programación de sistemas de riego"
            />
            <div class="stats stats-vertical md:stats-horizontal shadow w-full bg-base-100 mb-6">
                <div class="stat">
                    <div class="stat-title">"Agua utilizada"</div>
                    <div class="stat-value text-info text-2xl">
                        {format!("{} m³", format_number(statistics.total_water_used, 0))}
                    </div>
                </div>
                <div class="stat">
                    <div class="stat-title">"Eficiencia media"</div>
                    <div class="stat-value text-success text-2xl">
                        {format!("{}%", format_number(statistics.average_efficiency, 1))}
                    </div>
                </div>
                <div class="stat">
                    <div class="stat-title">"Área regada"</div>
                    <div class="stat-value text-2xl">
                        {format!("{} ha", format_number(statistics.total_area, 1))}
                    </div>
                </div>
            </div>
            <div class="grid gap-4 lg:grid-cols-2">
                <Card icon="bi-geo-alt text-primary" title="Sectores de Riego">
                    <SectorTable sectors=sectors />
                </Card>
                <Card icon="bi-clock text-warning" title="Programación">
                    <ScheduleList schedule=schedule />
                </Card>
            </div>
        </div>
    }
    .into_any()
}

#[component]
fn SectorTable(sectors: Vec<IrrigationSector>) -> impl IntoView {
    if sectors.is_empty() {
        return view! { <EmptyState message="No hay sectores registrados" /> }.into_any();
    }

    view! {
        <div class="overflow-x-auto">
            <table class="table table-zebra">
                <thead>
                    <tr>
                        <th>"Sector"</th>
                        <th>"Cultivo"</th>
                        <th>"Área"</th>
                        <th>"Humedad"</th>
                        <th>"Estado"</th>
                    </tr>
                </thead>
                <tbody>
                    {sectors
                        .into_iter()
                        .map(|sector| {
                            let moisture = sector.moisture.unwrap_or_default();
                            view! {
                                <tr>
                                    <td>{sector.name}</td>
                                    <td>{sector.crop}</td>
                                    <td>{format!("{} ha", format_number(sector.area, 1))}</td>
                                    <td>
                                        <progress
                                            class="progress progress-info w-20"
                                            value=moisture.to_string()
                                            max="100"
                                        ></progress>
                                        {format!(" {}%", format_number(moisture, 0))}
                                    </td>
                                    <td>
                                        <span class=status_badge(&sector.status)>{sector.status.clone()}</span>
                                    </td>
                                </tr>
                            }
                        })
                        .collect_view()}
                </tbody>
            </table>
        </div>
    }
    .into_any()
}

#[component]
fn ScheduleList(schedule: Vec<IrrigationSlot>) -> impl IntoView {
    if schedule.is_empty() {
        return view! { <EmptyState message="No hay riegos programados" /> }.into_any();
    }

    view! {
        <ul class="timeline timeline-vertical timeline-compact">
            {schedule
                .into_iter()
                .map(|slot| view! {
                    <li>
                        <div class="timeline-start font-mono">{slot.start}</div>
                        <div class="timeline-middle"><i class="bi bi-droplet-fill text-info"></i></div>
                        <div class="timeline-end timeline-box">
                            {format!("{} · {} min", slot.sector, slot.duration_minutes)}
                        </div>
                        <hr />
                    </li>
                })
                .collect_view()}
        </ul>
    }
    .into_any()
}
