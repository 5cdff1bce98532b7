//! 路由服务模块 - 核心引擎
//!
//! 基于 `location.hash` 的路由状态机：`Uninitialized → Idle ⇄ Transitioning`。
//! 实现了"监听 -> 解析 -> 卸载旧模块 -> 挂载新模块"的导航流程。
//!
//! 同一时刻至多有一个模块处于挂载状态：路由切换通过异步互斥锁串行执行，
//! 旧模块的 `unmount` 总是在新模块的 `mount` 开始之前完成。

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use futures::FutureExt;
use futures::lock::Mutex;

use crate::config::AppConfig;
use crate::error::{AppError, AppResult};
use crate::host::{FallbackView, Host, LocationEvent};
use crate::route::{ModuleHandle, MountContext, NavigationToken, Route, RouteMeta, RouteTable};

const DEFAULT_HASH: &str = "#/";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RouterPhase {
    Uninitialized,
    Idle,
    Transitioning,
}

/// 一次 `handle_route_change` 的结果
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Transition {
    /// 新模块已挂载
    Mounted(RouteMeta),
    /// 目标路由已经处于挂载状态
    Unchanged(RouteMeta),
    /// hash 未注册，已显示 404 视图
    NotFound { hash: String },
    /// 模块加载或挂载失败，已显示错误视图
    MountFailed { route: RouteMeta, message: String },
    /// 等待期间出现了更新的导航请求，本次请求被跳过
    Superseded,
    /// 路由器尚未初始化
    Uninitialized,
}

struct RouterState<C: 'static> {
    current_route: Option<Rc<Route<C>>>,
    current_module: Option<Box<dyn ModuleHandle>>,
    root_element: Option<C>,
    phase: RouterPhase,
}

struct RouterInner<H: Host> {
    host: H,
    routes: RouteTable<H::Container>,
    config: AppConfig,
    state: RefCell<RouterState<H::Container>>,
    /// 每次 `handle_route_change` 调用递增
    requested: Cell<u64>,
    /// 目标 hash 改变或模块被卸载时递增，导航令牌与之比较
    generation: Rc<Cell<u64>>,
    /// 最近一次请求指向的 hash
    claimed: RefCell<Option<String>>,
    transition: Mutex<()>,
}

/// 路由器
///
/// 克隆开销很小，所有克隆共享同一份状态。
pub struct Router<H: Host> {
    inner: Rc<RouterInner<H>>,
}

impl<H: Host> Clone for Router<H> {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
        }
    }
}

impl<H: Host> Router<H> {
    pub fn new(host: H, routes: RouteTable<H::Container>, config: AppConfig) -> Self {
        Self {
            inner: Rc::new(RouterInner {
                host,
                routes,
                config,
                state: RefCell::new(RouterState {
                    current_route: None,
                    current_module: None,
                    root_element: None,
                    phase: RouterPhase::Uninitialized,
                }),
                requested: Cell::new(0),
                generation: Rc::new(Cell::new(0)),
                claimed: RefCell::new(None),
                transition: Mutex::new(()),
            }),
        }
    }

    /// 初始化：定位根元素、注册 hashchange / popstate 监听，并处理当前 URL
    ///
    /// 根元素缺失时返回错误但不会 panic；重复调用不会重复注册监听。
    pub async fn initialize(&self) -> AppResult<()> {
        if self.is_initialized() {
            return Ok(());
        }

        let Some(root) = self.inner.host.root_element() else {
            log_error!(
                "[Router] Root element #{} not found",
                self.inner.config.root_element_id
            );
            return Err(AppError::not_found(format!(
                "root element #{} not found",
                self.inner.config.root_element_id
            ))
            .in_op("router.initialize"));
        };

        {
            let mut state = self.inner.state.borrow_mut();
            state.root_element = Some(root);
            state.phase = RouterPhase::Idle;
        }

        for event in [LocationEvent::HashChange, LocationEvent::PopState] {
            self.inner
                .host
                .add_location_listener(event, self.location_listener());
        }

        self.handle_route_change().await;
        Ok(())
    }

    /// 位置变化时派发一次路由处理
    ///
    /// 监听器只持有弱引用，路由器被释放后监听器什么也不做。
    fn location_listener(&self) -> Rc<dyn Fn()> {
        let weak = Rc::downgrade(&self.inner);
        Rc::new(move || {
            let Some(inner) = weak.upgrade() else {
                return;
            };
            let router = Router { inner };
            let task = {
                let router = router.clone();
                async move {
                    router.handle_route_change().await;
                }
                .boxed_local()
            };
            router.inner.host.spawn_local(task);
        })
    }

    /// **核心方法：处理路由变化**
    ///
    /// 流程：解析 hash -> 卸载旧模块 -> 更新标题与导航 -> 挂载新模块
    pub async fn handle_route_change(&self) -> Transition {
        let inner = &self.inner;
        let request = inner.requested.get() + 1;
        inner.requested.set(request);
        // 挂载中的模块在等待数据时就能发现自己已经过期
        self.claim(&self.current_hash());

        let _guard = inner.transition.lock().await;

        // 排队期间来了更新的请求，由它负责最终状态
        if inner.requested.get() != request {
            return Transition::Superseded;
        }

        let Some(root) = inner.state.borrow().root_element.clone() else {
            log_warn!("[Router] Route change ignored: router not initialized");
            return Transition::Uninitialized;
        };

        let hash = self.current_hash();

        // hashchange 与 popstate 会针对同一次跳转各触发一次
        if let Some(meta) = self.mounted_meta_for(&hash) {
            return Transition::Unchanged(meta);
        }

        self.claim(&hash);
        let generation = inner.generation.get();

        let outgoing = {
            let mut state = inner.state.borrow_mut();
            state.phase = RouterPhase::Transitioning;
            state.current_route = None;
            state.current_module.take()
        };

        if let Some(mut handle) = outgoing {
            if let Err(e) = handle.unmount().await {
                log_error!("[Router] Error unmounting module: {}", e);
            }
        }

        let transition = match inner.routes.find(&hash) {
            Some(route) => self.mount_route(route, &hash, root, generation).await,
            None => {
                log_warn!("[Router] Route {} not found, showing 404", hash);
                inner
                    .host
                    .render_fallback(&root, &FallbackView::NotFound { hash: hash.clone() });
                inner
                    .host
                    .set_document_title(&inner.config.not_found_title());
                Transition::NotFound { hash }
            }
        };

        inner.state.borrow_mut().phase = RouterPhase::Idle;
        transition
    }

    async fn mount_route(
        &self,
        route: Rc<Route<H::Container>>,
        hash: &str,
        root: H::Container,
        generation: u64,
    ) -> Transition {
        let inner = &self.inner;
        inner
            .host
            .set_document_title(&inner.config.page_title(route.title()));
        inner.host.set_active_nav(hash);
        inner.host.clear_fallback(&root);

        let ctx = MountContext {
            container: root.clone(),
            token: NavigationToken::new(generation, inner.generation.clone()),
        };

        let mounted = match route.module().await {
            Ok(module) => module.mount(ctx).await,
            Err(e) => Err(e),
        };

        match mounted {
            Ok(handle) => {
                let mut state = inner.state.borrow_mut();
                state.current_route = Some(route.clone());
                state.current_module = Some(handle);
                log_info!("[Router] Mounted {}", route.path());
                Transition::Mounted(route.meta())
            }
            Err(e) => {
                let e = e.in_op_with("router.mount", route.path());
                log_error!("[Router] Error mounting module: {}", e);
                inner.host.render_fallback(
                    &root,
                    &FallbackView::MountError {
                        path: route.path(),
                        message: e.message().to_string(),
                    },
                );
                Transition::MountFailed {
                    route: route.meta(),
                    message: e.to_string(),
                }
            }
        }
    }

    /// 卸载当前模块并清空路由状态（例如注销时）
    pub async fn unmount_current(&self) -> Option<RouteMeta> {
        let _guard = self.inner.transition.lock().await;
        self.inner.generation.set(self.inner.generation.get() + 1);
        self.inner.claimed.borrow_mut().take();

        let (route, handle, root) = {
            let mut state = self.inner.state.borrow_mut();
            (
                state.current_route.take(),
                state.current_module.take(),
                state.root_element.clone(),
            )
        };
        if let Some(root) = &root {
            self.inner.host.clear_fallback(root);
        }
        if let Some(mut handle) = handle {
            if let Err(e) = handle.unmount().await {
                log_error!("[Router] Error unmounting module: {}", e);
            }
        }
        route.map(|r| r.meta())
    }

    /// 设置 `location.hash`，由监听器异步触发路由处理
    pub fn navigate(&self, path: &str) {
        let hash = if path.starts_with('#') {
            path.to_string()
        } else {
            format!("#{}", path)
        };
        self.inner.host.set_location_hash(&hash);
    }

    /// 精确匹配，不做任何归一化
    pub fn find_route(&self, hash: &str) -> Option<RouteMeta> {
        self.inner.routes.find(hash).map(|route| route.meta())
    }

    /// 当前 hash，空串按 `#/` 处理
    pub fn current_hash(&self) -> String {
        let hash = self.inner.host.location_hash();
        if hash.is_empty() {
            DEFAULT_HASH.to_string()
        } else {
            hash
        }
    }

    pub fn current_route(&self) -> Option<RouteMeta> {
        self.inner
            .state
            .borrow()
            .current_route
            .as_ref()
            .map(|route| route.meta())
    }

    pub fn has_mounted_module(&self) -> bool {
        self.inner.state.borrow().current_module.is_some()
    }

    pub fn phase(&self) -> RouterPhase {
        self.inner.state.borrow().phase
    }

    pub fn is_initialized(&self) -> bool {
        self.phase() != RouterPhase::Uninitialized
    }

    pub fn routes(&self) -> Vec<RouteMeta> {
        self.inner.routes.metas()
    }

    pub fn config(&self) -> &AppConfig {
        &self.inner.config
    }

    pub fn host(&self) -> &H {
        &self.inner.host
    }

    /// 目标 hash 与上一次不同时推进代数
    ///
    /// hashchange 与 popstate 对同一次跳转各触发一次，第二次不会让进行中的挂载过期。
    fn claim(&self, hash: &str) {
        let mut claimed = self.inner.claimed.borrow_mut();
        if claimed.as_deref() != Some(hash) {
            *claimed = Some(hash.to_string());
            self.inner.generation.set(self.inner.generation.get() + 1);
        }
    }

    fn mounted_meta_for(&self, hash: &str) -> Option<RouteMeta> {
        let state = self.inner.state.borrow();
        match (&state.current_route, &state.current_module) {
            (Some(route), Some(_)) if route.hash() == hash => Some(route.meta()),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests;
