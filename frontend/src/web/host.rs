//! 浏览器宿主
//!
//! 内核路由器通过 `Host` 操作页面；这里是唯一直接读写 `location.hash`、
//! `document.title` 与导航链接的地方。

use std::any::Any;
use std::cell::RefCell;
use std::rc::Rc;

use futures::future::LocalBoxFuture;
use sigpa::host::is_active_link;
use sigpa::{FallbackView, Host, LocationEvent};
use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use web_sys::{Document, HtmlElement};

use crate::components::fallback::fallback_view;

/// 侧边栏中的导航链接
pub const NAV_LINK_SELECTOR: &str = ".c-sidebar__link";

fn document() -> Option<Document> {
    web_sys::window()?.document()
}

/// 兜底视图的挂载句柄，drop 时释放 owner 并移除节点
type MountedFallback = Box<dyn Any>;

/// 浏览器宿主
///
/// 位置监听器由宿主持有，宿主随路由器释放时一并从 window 上移除。
pub struct BrowserHost {
    root_element_id: String,
    listeners: RefCell<Vec<(LocationEvent, Closure<dyn Fn()>)>>,
    fallback: RefCell<Option<MountedFallback>>,
}

impl BrowserHost {
    pub fn new(root_element_id: impl Into<String>) -> Self {
        Self {
            root_element_id: root_element_id.into(),
            listeners: RefCell::new(Vec::new()),
            fallback: RefCell::new(None),
        }
    }
}

impl Drop for BrowserHost {
    fn drop(&mut self) {
        let listeners = std::mem::take(self.listeners.get_mut());
        let Some(window) = web_sys::window() else {
            return;
        };
        for (event, closure) in &listeners {
            let _ = window.remove_event_listener_with_callback(
                event.event_name(),
                closure.as_ref().unchecked_ref(),
            );
        }
    }
}

impl Host for BrowserHost {
    type Container = HtmlElement;

    fn root_element(&self) -> Option<HtmlElement> {
        document()?
            .get_element_by_id(&self.root_element_id)?
            .dyn_into::<HtmlElement>()
            .ok()
    }

    fn location_hash(&self) -> String {
        web_sys::window()
            .and_then(|w| w.location().hash().ok())
            .unwrap_or_default()
    }

    fn set_location_hash(&self, hash: &str) {
        if let Some(window) = web_sys::window() {
            let _ = window.location().set_hash(hash);
        }
    }

    fn set_document_title(&self, title: &str) {
        if let Some(doc) = document() {
            doc.set_title(title);
        }
    }

    fn set_active_nav(&self, hash: &str) {
        let Some(links) = document().and_then(|d| d.query_selector_all(NAV_LINK_SELECTOR).ok())
        else {
            return;
        };

        for i in 0..links.length() {
            let Some(link) = links.item(i).and_then(|n| n.dyn_into::<web_sys::Element>().ok())
            else {
                continue;
            };
            let href = link.get_attribute("href").unwrap_or_default();
            if is_active_link(&href, hash) {
                let _ = link.class_list().add_1("active");
                let _ = link.set_attribute("aria-current", "page");
            } else {
                let _ = link.class_list().remove_1("active");
                let _ = link.remove_attribute("aria-current");
            }
        }
    }

    fn render_fallback(&self, container: &HtmlElement, view: &FallbackView) {
        self.clear_fallback(container);
        container.set_inner_html("");
        let view = view.clone();
        let handle = leptos::mount::mount_to(container.clone(), move || fallback_view(view));
        *self.fallback.borrow_mut() = Some(Box::new(handle));
    }

    fn clear_fallback(&self, _container: &HtmlElement) {
        let previous = self.fallback.borrow_mut().take();
        drop(previous);
    }

    fn add_location_listener(&self, event: LocationEvent, on_change: Rc<dyn Fn()>) {
        let Some(window) = web_sys::window() else {
            return;
        };
        let closure = Closure::<dyn Fn()>::new(move || on_change());
        if window
            .add_event_listener_with_callback(event.event_name(), closure.as_ref().unchecked_ref())
            .is_ok()
        {
            self.listeners.borrow_mut().push((event, closure));
        }
    }

    fn spawn_local(&self, task: LocalBoxFuture<'static, ()>) {
        wasm_bindgen_futures::spawn_local(task);
    }
}
