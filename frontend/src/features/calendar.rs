//! 农事日历：近期事件与待办任务

use leptos::prelude::*;
use sigpa_shared::fixtures::{CalendarData, CalendarEvent, FarmTask};

use super::FixtureModule;
use super::widgets::{Card, EmptyState, PageHeader};
use crate::services::{AppServices, Services};

pub fn module(services: AppServices) -> FixtureModule<CalendarData> {
    FixtureModule::new("calendario", services, render)
}

fn event_icon(kind: &str) -> &'static str {
    match kind {
        "riego" => "bi-droplet text-info",
        "siembra" => "bi-flower1 text-success",
        "cosecha" => "bi-basket text-warning",
        "fertilizacion" | "fertilización" => "bi-capsule text-secondary",
        _ => "bi-calendar-event text-primary",
    }
}

fn render(data: CalendarData, _services: Services) -> AnyView {
    let CalendarData { mut events, tasks } = data;
    events.sort_by(|a, b| a.date.cmp(&b.date));

    view! {
        <div>
            <PageHeader
                icon="bi-calendar3"
                title="Calendario"
                subtitle="Planificación de actividades agrícolas"
            />
            <div class="grid gap-4 lg:grid-cols-2">
                <Card icon="bi-calendar-event text-primary" title="Próximos eventos">
                    <EventList events=events />
                </Card>
                <Card icon="bi-list-check text-success" title="Tareas">
                    <TaskList tasks=tasks />
                </Card>
            </div>
        </div>
    }
    .into_any()
}

#[component]
fn EventList(events: Vec<CalendarEvent>) -> impl IntoView {
    if events.is_empty() {
        return view! { <EmptyState message="No hay eventos programados" /> }.into_any();
    }

    view! {
        <ul class="divide-y divide-base-200">
            {events
                .into_iter()
                .map(|event| view! {
                    <li class="flex items-center gap-3 py-2">
                        <i class=format!("bi {} text-xl", event_icon(&event.kind))></i>
                        <div class="flex-1">{event.title}</div>
                        <span class="badge badge-outline font-mono">{event.date}</span>
                    </li>
                })
                .collect_view()}
        </ul>
    }
    .into_any()
}

#[component]
fn TaskList(tasks: Vec<FarmTask>) -> impl IntoView {
    if tasks.is_empty() {
        return view! { <EmptyState message="No hay tareas pendientes" /> }.into_any();
    }

    // 完成状态只在本页面内切换，不写回数据文件
    view! {
        <ul>
            {tasks
                .into_iter()
                .map(|task| {
                    let (done, set_done) = signal(task.done);
                    view! {
                        <li class="flex items-center gap-3 py-2">
                            <input
                                type="checkbox"
                                class="checkbox checkbox-success"
                                prop:checked=done
                                on:change=move |ev| set_done.set(event_target_checked(&ev))
                            />
                            <span class=move || if done.get() { "flex-1 line-through" } else { "flex-1" }>
                                {task.title}
                            </span>
                            <small class="text-base-content/60">{task.due}</small>
                        </li>
                    }
                })
                .collect_view()}
        </ul>
    }
    .into_any()
}
