//! 功能模块
//!
//! 每个侧边栏项对应一个实现 `FeatureModule<HtmlElement>` 的模块。
//! 视图通过 `mount_to` 挂载在路由器交给的容器上，各自拥有独立的 owner；
//! 卸载句柄释放 owner 并清空容器。

use std::marker::PhantomData;
use std::rc::Rc;

use async_trait::async_trait;
use leptos::prelude::*;
use serde::de::DeserializeOwned;
use sigpa::{
    AppResult, FeatureModule, FnHandle, ModuleHandle, MountContext, NoopHandle, Route, RouteTable,
};
use sigpa_shared::navigation::{FeatureKind, NAV_ROUTES};
use web_sys::HtmlElement;

use crate::services::{AppServices, Services};

mod alerts;
mod calendar;
mod crops;
mod growth;
mod home;
mod irrigation;
mod profile;
mod weather;
mod widgets;

const LOADING_MARKUP: &str = r#"<div class="flex justify-center py-16"><span class="loading loading-spinner loading-lg text-primary"></span></div>"#;

/// 在容器上挂载视图，返回对应的卸载句柄
pub fn mount_view<F>(container: &HtmlElement, view: F) -> Box<dyn ModuleHandle>
where
    F: FnOnce() -> AnyView + 'static,
{
    container.set_inner_html("");
    let handle = leptos::mount::mount_to(container.clone(), view);
    let container = container.clone();
    Box::new(FnHandle::new(move || {
        drop(handle);
        container.set_inner_html("");
    }))
}

pub fn show_loading(container: &HtmlElement) {
    container.set_inner_html(LOADING_MARKUP);
}

// =========================================================
// 读取数据文件的模块
// =========================================================

type Render<T> = fn(T, Services) -> AnyView;

/// 先读取 `./data/<fixture>.json`，再渲染
///
/// 读取失败时仓库返回兜底对象，视图照常渲染空状态。
pub struct FixtureModule<T> {
    fixture: &'static str,
    services: AppServices,
    render: Render<T>,
    _data: PhantomData<T>,
}

impl<T> FixtureModule<T> {
    pub fn new(fixture: &'static str, services: AppServices, render: Render<T>) -> Self {
        Self {
            fixture,
            services,
            render,
            _data: PhantomData,
        }
    }
}

#[async_trait(?Send)]
impl<T: DeserializeOwned + 'static> FeatureModule<HtmlElement> for FixtureModule<T> {
    async fn mount(&self, ctx: MountContext<HtmlElement>) -> AppResult<Box<dyn ModuleHandle>> {
        show_loading(&ctx.container);
        let data: T = self.services.repository.load_as(self.fixture).await?;

        // 等待期间用户已经去了别的页面
        if !ctx.token.is_current() {
            return Ok(Box::new(NoopHandle));
        }

        let services = self.services.clone();
        let render = self.render;
        Ok(mount_view(&ctx.container, move || {
            render(data, StoredValue::new_local(services))
        }))
    }
}

// =========================================================
// 路由表
// =========================================================

fn module_for(kind: FeatureKind, services: AppServices) -> Rc<dyn FeatureModule<HtmlElement>> {
    match kind {
        FeatureKind::Home => Rc::new(home::module(services)),
        FeatureKind::Irrigation => Rc::new(irrigation::module(services)),
        FeatureKind::Calendar => Rc::new(calendar::module(services)),
        FeatureKind::Alerts => Rc::new(alerts::module(services)),
        FeatureKind::Growth => Rc::new(growth::module(services)),
        FeatureKind::Weather => Rc::new(weather::module(services)),
        FeatureKind::Crops => Rc::new(crops::module(services)),
        FeatureKind::Profile => Rc::new(profile::ProfileModule::new(services)),
    }
}

/// 按导航清单注册全部路由，模块在第一次访问时创建
pub fn route_table(services: &AppServices) -> AppResult<RouteTable<HtmlElement>> {
    let mut table = RouteTable::new();
    for entry in NAV_ROUTES.iter() {
        let kind = entry.kind;
        let services = services.clone();
        table.register(Route::lazy(entry.path, entry.title, move || {
            let services = services.clone();
            async move { Ok(module_for(kind, services)) }
        }))?;
    }
    Ok(table)
}
