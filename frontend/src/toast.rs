//! 提示消息
//!
//! 功能模块挂载在独立的 owner 下，拿不到 App 的 Context，
//! 所以队列本身放进 `AppServices`，只包含可复制的信号句柄。

use leptos::prelude::*;
use leptos::task::spawn_local;

use crate::web::timer::sleep;

const TOAST_TIMEOUT_MS: u32 = 3_000;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToastKind {
    Success,
    Warning,
    Error,
}

impl ToastKind {
    fn class(&self) -> &'static str {
        match self {
            ToastKind::Success => "alert alert-success shadow-lg",
            ToastKind::Warning => "alert alert-warning shadow-lg",
            ToastKind::Error => "alert alert-error shadow-lg",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Toast {
    id: u64,
    kind: ToastKind,
    message: String,
}

#[derive(Clone, Copy)]
pub struct ToastQueue {
    items: RwSignal<Vec<Toast>>,
    next_id: StoredValue<u64>,
}

impl ToastQueue {
    pub fn new() -> Self {
        Self {
            items: RwSignal::new(Vec::new()),
            next_id: StoredValue::new(0),
        }
    }

    /// 显示一条消息，3 秒后自动消失
    pub fn show(&self, kind: ToastKind, message: impl Into<String>) {
        let id = self.next_id.get_value();
        self.next_id.set_value(id + 1);
        self.items.update(|items| {
            items.push(Toast {
                id,
                kind,
                message: message.into(),
            })
        });

        let items = self.items;
        spawn_local(async move {
            sleep(TOAST_TIMEOUT_MS).await;
            let _ = items.try_update(|items| items.retain(|t| t.id != id));
        });
    }

    pub fn success(&self, message: impl Into<String>) {
        self.show(ToastKind::Success, message);
    }

    pub fn warning(&self, message: impl Into<String>) {
        self.show(ToastKind::Warning, message);
    }

    pub fn error(&self, message: impl Into<String>) {
        self.show(ToastKind::Error, message);
    }
}

#[component]
pub fn ToastStack(queue: ToastQueue) -> impl IntoView {
    view! {
        <div class="toast toast-top toast-end z-50">
            <For
                each=move || queue.items.get()
                key=|toast| toast.id
                children=|toast| view! {
                    <div class=toast.kind.class()>
                        <span>{toast.message}</span>
                    </div>
                }
            />
        </div>
    }
}
