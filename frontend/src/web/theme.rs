//! 主题在页面上的落地
//!
//! 内核的 `ThemeService` 负责持久化与解析；这里把结果写到 `<html data-theme>`，
//! 派发 `themeChanged` 事件，并跟随系统的深色模式偏好。

use sigpa::{KeyValueStore, ThemeChanged, ThemeService};
use sigpa_shared::THEME_CHANGED_EVENT;
use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use web_sys::{CustomEvent, CustomEventInit, MediaQueryList};

use crate::serde_helper;

const DARK_QUERY: &str = "(prefers-color-scheme: dark)";

fn dark_media_query() -> Option<MediaQueryList> {
    web_sys::window()?.match_media(DARK_QUERY).ok()?
}

pub fn system_prefers_dark() -> bool {
    dark_media_query().map(|q| q.matches()).unwrap_or(false)
}

fn apply_to_document(change: &ThemeChanged) {
    let Some(document) = web_sys::window().and_then(|w| w.document()) else {
        return;
    };
    if let Some(root) = document.document_element() {
        let _ = root.set_attribute("data-theme", change.theme.as_str());
    }

    let detail = match serde_helper::to_value(change) {
        Ok(detail) => detail,
        Err(e) => {
            web_sys::console::warn_1(&format!("[Theme] {}", e).into());
            return;
        }
    };
    let init = CustomEventInit::new();
    init.set_detail(&detail);
    if let Ok(event) = CustomEvent::new_with_event_init_dict(THEME_CHANGED_EVENT, &init) {
        let _ = document.dispatch_event(&event);
    }
}

/// 订阅主题变化、应用已保存的主题，并监听系统偏好
pub fn install<S: KeyValueStore + 'static>(theme: &ThemeService<S>) {
    theme.subscribe(apply_to_document);
    theme.initialize(system_prefers_dark());

    let Some(query) = dark_media_query() else {
        return;
    };
    let service = theme.clone();
    let closure = Closure::<dyn Fn(web_sys::MediaQueryListEvent)>::new(
        move |ev: web_sys::MediaQueryListEvent| {
            service.set_system_preference(ev.matches());
        },
    );
    let _ = query.add_event_listener_with_callback("change", closure.as_ref().unchecked_ref());
    closure.forget();
}
