//! 作物生长：最新测量值、生长曲线与现场记录簿
//!
//! "Resumen" 显示数据文件中的测量值；"Bitácora" 是只保存在内存中的手工记录。

use leptos::prelude::*;
use sigpa_shared::fixtures::{GrowthData, GrowthMetric, GrowthSeries};
use sigpa_shared::format::format_number;
use sigpa_shared::logbook::{EntryDraft, GrowthLog};

use super::FixtureModule;
use super::widgets::{Card, EmptyState, PageHeader};
use crate::services::{AppServices, Services};

pub fn module(services: AppServices) -> FixtureModule<GrowthData> {
    FixtureModule::new("crecimiento", services, render)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Tab {
    Summary,
    Logbook,
}

fn render(data: GrowthData, services: Services) -> AnyView {
    let GrowthData { metrics, charts } = data;
    let (tab, set_tab) = signal(Tab::Summary);
    let tab_class = move |t: Tab| if tab.get() == t { "tab tab-active" } else { "tab" };

    view! {
        <div>
            <PageHeader
                icon="bi-graph-up-arrow"
                title="Crecimiento"
                subtitle="Seguimiento del desarrollo de los cultivos"
            />
            <div role="tablist" class="tabs tabs-boxed mb-4 w-fit">
                <a role="tab" class=move || tab_class(Tab::Summary) on:click=move |_| set_tab.set(Tab::Summary)>
                    "Resumen"
                </a>
                <a role="tab" class=move || tab_class(Tab::Logbook) on:click=move |_| set_tab.set(Tab::Logbook)>
                    "Bitácora"
                </a>
            </div>
            <div class="grid gap-4 lg:grid-cols-2" hidden=move || tab.get() != Tab::Summary>
                <Card icon="bi-rulers text-success" title="Mediciones">
                    <MetricTable metrics=metrics />
                </Card>
                <Card icon="bi-bar-chart text-primary" title="Evolución">
                    <SeriesBars charts=charts />
                </Card>
            </div>
            <div hidden=move || tab.get() != Tab::Logbook>
                <Logbook services=services />
            </div>
        </div>
    }
    .into_any()
}

#[component]
fn MetricTable(metrics: Vec<GrowthMetric>) -> impl IntoView {
    if metrics.is_empty() {
        return view! { <EmptyState message="No hay mediciones registradas" /> }.into_any();
    }

    view! {
        <table class="table">
            <thead>
                <tr>
                    <th>"Cultivo"</th>
                    <th>"Etapa"</th>
                    <th>"Altura"</th>
                    <th>"Fecha"</th>
                </tr>
            </thead>
            <tbody>
                {metrics
                    .into_iter()
                    .map(|m| view! {
                        <tr>
                            <td>{m.crop}</td>
                            <td><span class="badge badge-outline">{m.stage}</span></td>
                            <td>{format!("{} cm", format_number(m.height_cm, 1))}</td>
                            <td class="font-mono">{m.date}</td>
                        </tr>
                    })
                    .collect_view()}
            </tbody>
        </table>
    }
    .into_any()
}

/// 每条曲线画成一组横向进度条，长度相对整组的最大值
#[component]
fn SeriesBars(charts: Vec<GrowthSeries>) -> impl IntoView {
    if charts.is_empty() {
        return view! { <EmptyState message="Sin datos de evolución" /> }.into_any();
    }

    view! {
        <div class="space-y-4">
            {charts
                .into_iter()
                .map(|series| {
                    let max = series.points.iter().cloned().fold(0.0_f64, f64::max).max(1.0);
                    let delta = series.delta();
                    let (delta_class, sign) = if delta >= 0.0 {
                        ("text-success", "+")
                    } else {
                        ("text-error", "")
                    };
                    view! {
                        <div>
                            <div class="flex justify-between">
                                <span class="font-semibold">{series.label.clone()}</span>
                                <span class=delta_class>
                                    {format!("{}{} cm", sign, format_number(delta, 1))}
                                </span>
                            </div>
                            {series
                                .points
                                .into_iter()
                                .map(|p| view! {
                                    <progress
                                        class="progress progress-success w-full"
                                        value=p.to_string()
                                        max=max.to_string()
                                    ></progress>
                                })
                                .collect_view()}
                        </div>
                    }
                })
                .collect_view()}
        </div>
    }
    .into_any()
}

// =========================================================
// 记录簿
// =========================================================

#[component]
fn Logbook(services: Services) -> impl IntoView {
    let log = RwSignal::new(GrowthLog::new());
    let selected = RwSignal::new(None::<usize>);

    let (crop, set_crop) = signal(String::new());
    let (height, set_height) = signal(String::new());
    let (date, set_date) = signal(String::new());
    let (notes, set_notes) = signal(String::new());

    let on_submit = move |ev: leptos::web_sys::SubmitEvent| {
        ev.prevent_default();
        let toasts = services.with_value(|s| s.toasts);
        let draft = EntryDraft {
            crop: crop.get_untracked(),
            height: height.get_untracked(),
            date: date.get_untracked(),
            notes: notes.get_untracked(),
        };
        match draft.validate() {
            Ok(entry) => {
                toasts.success(format!("Registro guardado: {}", entry.summary()));
                log.update(|l| {
                    l.push(entry);
                });
                set_crop.set(String::new());
                set_height.set(String::new());
                set_date.set(String::new());
                set_notes.set(String::new());
            }
            Err(message) => toasts.warning(message),
        }
    };

    view! {
        <div class="grid gap-4 lg:grid-cols-2">
            <Card icon="bi-journal-plus text-success" title="Nuevo registro">
                <form class="space-y-3" on:submit=on_submit>
                    <label class="form-control">
                        <span class="label-text">"Cultivo"</span>
                        <input
                            type="text"
                            class="input input-bordered"
                            placeholder="Maíz"
                            prop:value=crop
                            on:input=move |ev| set_crop.set(event_target_value(&ev))
                        />
                    </label>
                    <div class="grid grid-cols-2 gap-3">
                        <label class="form-control">
                            <span class="label-text">"Altura (cm)"</span>
                            <input
                                type="text"
                                inputmode="decimal"
                                class="input input-bordered"
                                prop:value=height
                                on:input=move |ev| set_height.set(event_target_value(&ev))
                            />
                        </label>
                        <label class="form-control">
                            <span class="label-text">"Fecha"</span>
                            <input
                                type="date"
                                class="input input-bordered"
                                prop:value=date
                                on:input=move |ev| set_date.set(event_target_value(&ev))
                            />
                        </label>
                    </div>
                    <label class="form-control">
                        <span class="label-text">"Observaciones"</span>
                        <textarea
                            class="textarea textarea-bordered"
                            rows="2"
                            prop:value=notes
                            on:input=move |ev| set_notes.set(event_target_value(&ev))
                        ></textarea>
                    </label>
                    <button type="submit" class="btn btn-primary w-full">
                        <i class="bi bi-save"></i>
                        " Guardar registro"
                    </button>
                </form>
            </Card>
            <Card icon="bi-bar-chart-line text-primary" title="Altura registrada">
                <HeightChart log=log />
            </Card>
            <div class="lg:col-span-2">
                <Card icon="bi-clock-history text-info" title="Historial">
                    <History log=log selected=selected />
                </Card>
            </div>
            <EntryDetail log=log selected=selected />
        </div>
    }
}

#[component]
fn History(log: RwSignal<GrowthLog>, selected: RwSignal<Option<usize>>) -> impl IntoView {
    move || {
        if log.with(|l| l.is_empty()) {
            return view! { <EmptyState message="Aún no hay registros" /> }.into_any();
        }
        let rows = log.with(|l| {
            l.entries()
                .iter()
                .enumerate()
                .map(|(i, e)| (i, e.crop.clone(), e.height_label(), e.date_label()))
                .collect::<Vec<_>>()
        });

        view! {
            <table class="table">
                <thead>
                    <tr>
                        <th>"Cultivo"</th>
                        <th>"Altura"</th>
                        <th>"Fecha"</th>
                        <th></th>
                    </tr>
                </thead>
                <tbody>
                    {rows
                        .into_iter()
                        .map(|(i, crop, height, date)| view! {
                            <tr>
                                <td>{crop}</td>
                                <td>{height}</td>
                                <td class="font-mono">{date}</td>
                                <td>
                                    <button class="btn btn-xs btn-ghost" on:click=move |_| selected.set(Some(i))>
                                        "Ver"
                                    </button>
                                </td>
                            </tr>
                        })
                        .collect_view()}
                </tbody>
            </table>
        }
        .into_any()
    }
}

/// 每条记录一根柱子，高度相对最高记录
#[component]
fn HeightChart(log: RwSignal<GrowthLog>) -> impl IntoView {
    move || {
        let bars = log.with(|l| l.chart());
        if bars.is_empty() {
            return view! { <EmptyState message="Registra mediciones para ver la gráfica" /> }
                .into_any();
        }

        view! {
            <div class="flex items-end gap-2 h-48 overflow-x-auto">
                {bars
                    .into_iter()
                    .map(|bar| view! {
                        <div class="flex flex-col items-center justify-end h-full min-w-10">
                            <span class="text-xs">{format_number(bar.height_cm, 1)}</span>
                            <div
                                class="w-8 bg-success rounded-t"
                                style=format!("height: {:.0}%", bar.ratio * 100.0)
                            ></div>
                            <span class="text-xs font-mono mt-1">{bar.label}</span>
                        </div>
                    })
                    .collect_view()}
            </div>
        }
        .into_any()
    }
}

#[component]
fn EntryDetail(log: RwSignal<GrowthLog>, selected: RwSignal<Option<usize>>) -> impl IntoView {
    move || {
        let entry = selected
            .get()
            .and_then(|i| log.with(|l| l.get(i).cloned()))?;

        Some(view! {
            <div class="modal modal-open" role="dialog">
                <div class="modal-box">
                    <h3 class="font-bold text-lg">"Detalle del registro"</h3>
                    <p class="py-1"><b>"Cultivo: "</b>{entry.crop.clone()}</p>
                    <p class="py-1"><b>"Altura: "</b>{entry.height_label()}</p>
                    <p class="py-1"><b>"Fecha: "</b>{entry.date_label()}</p>
                    <p class="py-1"><b>"Observaciones: "</b>{entry.notes_or_na().to_string()}</p>
                    <div class="modal-action">
                        <button class="btn" on:click=move |_| selected.set(None)>"Cerrar"</button>
                    </div>
                </div>
            </div>
        })
    }
}
