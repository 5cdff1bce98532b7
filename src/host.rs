//! 宿主接口
//!
//! 路由器对页面的所有操作（读写 hash、标题、导航高亮、兜底视图、事件监听、
//! 任务派发）都经过 `Host`。浏览器实现在前端 crate，测试使用内存实现。

use std::rc::Rc;

use futures::future::LocalBoxFuture;

/// 触发重新路由的位置事件
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LocationEvent {
    HashChange,
    PopState,
}

impl LocationEvent {
    pub fn event_name(&self) -> &'static str {
        match self {
            LocationEvent::HashChange => "hashchange",
            LocationEvent::PopState => "popstate",
        }
    }
}

/// 路由器自己渲染的两种视图
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FallbackView {
    /// 未注册的 hash，提供返回首页的链接
    NotFound { hash: String },
    /// 功能模块挂载失败，提供重新加载页面的按钮
    MountError { path: &'static str, message: String },
}

pub trait Host: 'static {
    /// 功能模块挂载的容器（浏览器中是 `HtmlElement`）
    type Container: Clone + 'static;

    fn root_element(&self) -> Option<Self::Container>;

    /// 当前 `location.hash`，可能为空串
    fn location_hash(&self) -> String;

    fn set_location_hash(&self, hash: &str);

    fn set_document_title(&self, title: &str);

    /// 高亮 href 与 `hash` 完全相同的导航链接，其余取消高亮
    fn set_active_nav(&self, hash: &str);

    fn render_fallback(&self, container: &Self::Container, view: &FallbackView);

    /// 挂载下一个模块或卸载当前模块前调用，释放 `render_fallback` 留下的视图
    fn clear_fallback(&self, _container: &Self::Container) {}

    fn add_location_listener(&self, event: LocationEvent, on_change: Rc<dyn Fn()>);

    /// 在当前线程的事件循环上运行任务
    fn spawn_local(&self, task: LocalBoxFuture<'static, ()>);
}

/// 导航链接是否对应当前 hash（精确比较）
pub fn is_active_link(href: &str, hash: &str) -> bool {
    href == hash
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn active_link_is_exact() {
        assert!(is_active_link("#/riego", "#/riego"));
        assert!(!is_active_link("#/riego", "#/riego/"));
        assert!(!is_active_link("#/", "#/riego"));
    }
}
