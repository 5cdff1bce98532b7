//! 路由表与挂载契约
//!
//! 每个路由把一个路径映射到一个功能模块。模块代码在第一次导航到该路径时才加载，
//! 之后的导航复用已加载的模块。挂载返回一个句柄，路由器在离开时调用其 `unmount`。

use std::cell::{Cell, RefCell};
use std::future::Future;
use std::rc::Rc;

use async_trait::async_trait;
use futures::FutureExt;
use futures::future::LocalBoxFuture;

use crate::error::{AppError, AppResult};

// =========================================================
// 导航令牌
// =========================================================

/// 标识一次路由切换
///
/// 新的切换开始后，旧令牌的 `is_current()` 变为 false。模块在等待数据之后、
/// 写入容器之前检查它，避免过期结果写进已被下一个模块接管的容器。
#[derive(Debug, Clone)]
pub struct NavigationToken {
    generation: u64,
    latest: Rc<Cell<u64>>,
}

impl NavigationToken {
    pub(crate) fn new(generation: u64, latest: Rc<Cell<u64>>) -> Self {
        Self { generation, latest }
    }

    /// 不受任何路由器约束、始终有效的令牌
    pub fn detached() -> Self {
        Self::new(0, Rc::new(Cell::new(0)))
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn is_current(&self) -> bool {
        self.latest.get() == self.generation
    }
}

/// 传给 `FeatureModule::mount` 的参数
pub struct MountContext<C> {
    pub container: C,
    pub token: NavigationToken,
}

// =========================================================
// 挂载契约
// =========================================================

/// 已挂载模块的句柄
#[async_trait(?Send)]
pub trait ModuleHandle {
    /// 释放模块占用的资源。必须幂等；没有副作用的模块直接返回 `Ok(())`。
    async fn unmount(&mut self) -> AppResult<()>;
}

/// 功能模块
#[async_trait(?Send)]
pub trait FeatureModule<C: 'static> {
    async fn mount(&self, ctx: MountContext<C>) -> AppResult<Box<dyn ModuleHandle>>;
}

/// 没有需要清理的资源
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopHandle;

#[async_trait(?Send)]
impl ModuleHandle for NoopHandle {
    async fn unmount(&mut self) -> AppResult<()> {
        Ok(())
    }
}

/// 卸载时执行一次闭包，之后的调用不再执行
pub struct FnHandle {
    teardown: Option<Box<dyn FnOnce()>>,
}

impl FnHandle {
    pub fn new<F>(teardown: F) -> Self
    where
        F: FnOnce() + 'static,
    {
        Self {
            teardown: Some(Box::new(teardown)),
        }
    }

    pub fn is_released(&self) -> bool {
        self.teardown.is_none()
    }
}

#[async_trait(?Send)]
impl ModuleHandle for FnHandle {
    async fn unmount(&mut self) -> AppResult<()> {
        if let Some(teardown) = self.teardown.take() {
            teardown();
        }
        Ok(())
    }
}

// =========================================================
// 路由
// =========================================================

pub type ModuleLoader<C> =
    Rc<dyn Fn() -> LocalBoxFuture<'static, AppResult<Rc<dyn FeatureModule<C>>>>>;

/// 对外暴露的路由信息
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RouteMeta {
    pub path: &'static str,
    pub title: &'static str,
}

impl RouteMeta {
    pub fn hash(&self) -> String {
        format!("#{}", self.path)
    }
}

pub struct Route<C: 'static> {
    path: &'static str,
    title: &'static str,
    loader: ModuleLoader<C>,
    module: RefCell<Option<Rc<dyn FeatureModule<C>>>>,
    loads: Cell<usize>,
}

impl<C: 'static> Route<C> {
    /// 延迟加载：`loader` 在第一次导航到该路径时执行
    pub fn lazy<F, Fut>(path: &'static str, title: &'static str, loader: F) -> Self
    where
        F: Fn() -> Fut + 'static,
        Fut: Future<Output = AppResult<Rc<dyn FeatureModule<C>>>> + 'static,
    {
        Self {
            path,
            title,
            loader: Rc::new(move || loader().boxed_local()),
            module: RefCell::new(None),
            loads: Cell::new(0),
        }
    }

    /// 已加载的模块
    pub fn eager(path: &'static str, title: &'static str, module: Rc<dyn FeatureModule<C>>) -> Self {
        let for_loader = module.clone();
        Self {
            path,
            title,
            loader: Rc::new(move || {
                let module = for_loader.clone();
                async move { Ok(module) }.boxed_local()
            }),
            module: RefCell::new(Some(module)),
            loads: Cell::new(0),
        }
    }

    pub fn path(&self) -> &'static str {
        self.path
    }

    pub fn title(&self) -> &'static str {
        self.title
    }

    pub fn hash(&self) -> String {
        format!("#{}", self.path)
    }

    pub fn meta(&self) -> RouteMeta {
        RouteMeta {
            path: self.path,
            title: self.title,
        }
    }

    pub fn is_loaded(&self) -> bool {
        self.module.borrow().is_some()
    }

    /// loader 实际执行的次数
    pub fn load_count(&self) -> usize {
        self.loads.get()
    }

    /// 取得模块，必要时执行 loader
    pub async fn module(&self) -> AppResult<Rc<dyn FeatureModule<C>>> {
        let cached = self.module.borrow().clone();
        if let Some(module) = cached {
            return Ok(module);
        }

        let loaded = (self.loader)()
            .await
            .map_err(|e| e.in_op_with("route.load", self.path))?;
        self.loads.set(self.loads.get() + 1);
        *self.module.borrow_mut() = Some(loaded.clone());
        Ok(loaded)
    }
}

// =========================================================
// 路由表
// =========================================================

pub struct RouteTable<C: 'static> {
    routes: Vec<Rc<Route<C>>>,
}

impl<C: 'static> Default for RouteTable<C> {
    fn default() -> Self {
        Self { routes: Vec::new() }
    }
}

impl<C: 'static> RouteTable<C> {
    pub fn new() -> Self {
        Self::default()
    }

    /// 注册路由。路径必须以 `/` 开头且唯一。
    pub fn register(&mut self, route: Route<C>) -> AppResult<()> {
        if !route.path.starts_with('/') {
            return Err(AppError::invalid_input(format!(
                "route path must start with '/': {}",
                route.path
            ))
            .in_op("route_table.register"));
        }
        if self.routes.iter().any(|r| r.path == route.path) {
            return Err(
                AppError::invalid_input(format!("duplicate route path: {}", route.path))
                    .in_op("route_table.register"),
            );
        }
        self.routes.push(Rc::new(route));
        Ok(())
    }

    pub fn with(mut self, route: Route<C>) -> AppResult<Self> {
        self.register(route)?;
        Ok(self)
    }

    /// 精确匹配 `"#" + path`，不做参数、前缀或结尾斜杠处理
    pub fn find(&self, hash: &str) -> Option<Rc<Route<C>>> {
        self.routes
            .iter()
            .find(|route| hash.strip_prefix('#') == Some(route.path))
            .cloned()
    }

    pub fn get(&self, path: &str) -> Option<Rc<Route<C>>> {
        self.routes.iter().find(|route| route.path == path).cloned()
    }

    pub fn len(&self) -> usize {
        self.routes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Rc<Route<C>>> {
        self.routes.iter()
    }

    pub fn metas(&self) -> Vec<RouteMeta> {
        self.routes.iter().map(|route| route.meta()).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct StaticModule;

    #[async_trait(?Send)]
    impl FeatureModule<()> for StaticModule {
        async fn mount(&self, _ctx: MountContext<()>) -> AppResult<Box<dyn ModuleHandle>> {
            Ok(Box::new(NoopHandle))
        }
    }

    fn lazy_route(path: &'static str, calls: Rc<Cell<usize>>) -> Route<()> {
        Route::lazy(path, "Test", move || {
            let calls = calls.clone();
            async move {
                calls.set(calls.get() + 1);
                Ok(Rc::new(StaticModule) as Rc<dyn FeatureModule<()>>)
            }
        })
    }

    #[tokio::test]
    async fn lazy_loader_runs_once() {
        let calls = Rc::new(Cell::new(0));
        let route = lazy_route("/riego", calls.clone());
        assert!(!route.is_loaded());

        route.module().await.unwrap();
        route.module().await.unwrap();

        assert!(route.is_loaded());
        assert_eq!(calls.get(), 1);
        assert_eq!(route.load_count(), 1);
    }

    #[tokio::test]
    async fn failed_load_is_retried_next_time() {
        let attempts = Rc::new(Cell::new(0));
        let counter = attempts.clone();
        let route: Route<()> = Route::lazy("/clima", "Clima", move || {
            let counter = counter.clone();
            async move {
                counter.set(counter.get() + 1);
                if counter.get() == 1 {
                    Err(AppError::fetch("chunk unavailable"))
                } else {
                    Ok(Rc::new(StaticModule) as Rc<dyn FeatureModule<()>>)
                }
            }
        });

        let err = route.module().await.err().unwrap();
        assert_eq!(err.spans()[0].detail.as_deref(), Some("/clima"));
        assert!(route.module().await.is_ok());
        assert_eq!(attempts.get(), 2);
    }

    #[test]
    fn register_rejects_bad_and_duplicate_paths() {
        let calls = Rc::new(Cell::new(0));
        let mut table = RouteTable::new();
        table.register(lazy_route("/", calls.clone())).unwrap();

        let dup = table.register(lazy_route("/", calls.clone()));
        assert!(dup.is_err());

        let relative = table.register(lazy_route("riego", calls.clone()));
        assert_eq!(
            relative.err().unwrap().status,
            crate::error::ErrorStatus::InvalidInput
        );
        assert_eq!(table.len(), 1);
    }

    #[test]
    fn find_is_exact() {
        let calls = Rc::new(Cell::new(0));
        let table = RouteTable::new()
            .with(lazy_route("/", calls.clone()))
            .and_then(|t| t.with(lazy_route("/riego", calls.clone())))
            .unwrap();

        assert_eq!(table.find("#/").unwrap().path(), "/");
        assert_eq!(table.find("#/riego").unwrap().path(), "/riego");
        assert!(table.find("/riego").is_none());
        assert!(table.find("#/riego/").is_none());
        assert!(table.find("#/rie").is_none());
        assert!(table.find("").is_none());
    }

    #[tokio::test]
    async fn fn_handle_runs_teardown_once() {
        let runs = Rc::new(Cell::new(0));
        let counter = runs.clone();
        let mut handle = FnHandle::new(move || counter.set(counter.get() + 1));

        handle.unmount().await.unwrap();
        handle.unmount().await.unwrap();

        assert_eq!(runs.get(), 1);
        assert!(handle.is_released());
    }

    #[test]
    fn token_goes_stale_when_generation_moves() {
        let latest = Rc::new(Cell::new(3));
        let token = NavigationToken::new(3, latest.clone());
        assert!(token.is_current());
        latest.set(4);
        assert!(!token.is_current());
        assert!(NavigationToken::detached().is_current());
    }
}
