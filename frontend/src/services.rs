//! 应用服务
//!
//! 内核服务都基于 `Rc`，不能直接放进 Leptos 的 Context（要求 `Send + Sync`），
//! 因此整体包进 `StoredValue::new_local`，Context 和闭包里只传递这个句柄。

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use async_trait::async_trait;
use leptos::prelude::*;
use sigpa::{
    AppError, AppResult, DashboardShell, JsonRepository, ProfileService, Router, ThemeService,
};
use sigpa_shared::AuthUser;

use crate::api::AlertApi;
use crate::auth::AuthContext;
use crate::config::FrontendConfig;
use crate::features;
use crate::firebase::{FirestoreProfileStore, IdentityClient};
use crate::toast::ToastQueue;
use crate::web::timer::sleep;
use crate::web::{BrowserHost, BrowserStorage, HttpClient};

/// 等待 DOM 就绪时的重试次数与间隔
const DOM_RETRIES: u32 = 10;
const DOM_RETRY_MS: u32 = 100;

const SIDEBAR_SELECTOR: &str = ".c-sidebar";

#[derive(Clone)]
pub struct AppServices {
    pub config: Rc<FrontendConfig>,
    pub repository: JsonRepository<HttpClient>,
    pub theme: ThemeService<BrowserStorage>,
    pub identity: IdentityClient,
    pub profiles: Rc<ProfileService<FirestoreProfileStore>>,
    pub alerts: AlertApi,
    pub toasts: ToastQueue,
    pub auth: AuthContext,
}

impl AppServices {
    pub fn new(config: FrontendConfig, toasts: ToastQueue, auth: AuthContext) -> Self {
        let repository = JsonRepository::new(HttpClient, &config.app);
        repository.on_evict(|name, reason| {
            web_sys::console::log_1(&format!("[Repository] {} evicted ({:?})", name, reason).into());
        });

        Self {
            theme: ThemeService::new(BrowserStorage, &config.app),
            identity: IdentityClient::new(config.firebase_api_key.clone()),
            profiles: Rc::new(ProfileService::new(FirestoreProfileStore::new(
                config.firebase_project_id.clone(),
            ))),
            alerts: AlertApi::new(config.alert_relay_url.clone()),
            repository,
            toasts,
            auth,
            config: Rc::new(config),
        }
    }

    pub fn profile_store(&self) -> &FirestoreProfileStore {
        self.profiles.store()
    }
}

/// Context 与闭包中传递的服务句柄
pub type Services = StoredValue<AppServices, LocalStorage>;

pub fn provide_services(services: AppServices) -> Services {
    let handle = StoredValue::new_local(services);
    provide_context(handle);
    handle
}

pub fn use_services() -> Services {
    use_context::<Services>().expect("AppServices should be provided")
}

// =========================================================
// 控制面板外壳
// =========================================================

struct ChromeInner {
    services: AppServices,
    router: RefCell<Option<Router<BrowserHost>>>,
    /// 路由器正在初始化，守卫的重复通知直接返回
    starting: Cell<bool>,
}

/// 控制面板的侧边栏、顶栏由 `DashboardPage` 组件渲染；
/// 这里等待它们出现在 DOM 中，然后在 `#view-root` 上启动 hash 路由器。
#[derive(Clone)]
pub struct DashboardChrome {
    inner: Rc<ChromeInner>,
}

impl DashboardChrome {
    pub fn new(services: AppServices) -> Self {
        Self {
            inner: Rc::new(ChromeInner {
                services,
                router: RefCell::new(None),
                starting: Cell::new(false),
            }),
        }
    }

    pub fn router(&self) -> Option<Router<BrowserHost>> {
        self.inner.router.borrow().clone()
    }

    /// 离开控制面板：卸载当前功能模块并释放路由器
    pub fn teardown(&self) {
        let Some(router) = self.inner.router.borrow_mut().take() else {
            return;
        };
        leptos::task::spawn_local(async move {
            if let Some(route) = router.unmount_current().await {
                web_sys::console::log_1(&format!("[Dashboard] Unmounted {}", route.path).into());
            }
        });
    }
}

fn sidebar_rendered() -> bool {
    web_sys::window()
        .and_then(|w| w.document())
        .and_then(|d| d.query_selector(SIDEBAR_SELECTOR).ok().flatten())
        .is_some()
}

#[async_trait(?Send)]
impl DashboardShell for DashboardChrome {
    async fn load_chrome(&self, user: &AuthUser) -> AppResult<()> {
        for _ in 0..DOM_RETRIES {
            if sidebar_rendered() {
                web_sys::console::log_1(
                    &format!("[Dashboard] Interfaz cargada para {}", user.email).into(),
                );
                return Ok(());
            }
            sleep(DOM_RETRY_MS).await;
        }
        Err(AppError::not_found("dashboard sidebar was not rendered").in_op("dashboard.load_chrome"))
    }

    async fn start_router(&self) -> AppResult<()> {
        if self.inner.starting.get() || self.router().is_some_and(|r| r.is_initialized()) {
            return Ok(());
        }
        self.inner.starting.set(true);
        let result = self.build_router().await;
        self.inner.starting.set(false);
        result
    }
}

impl DashboardChrome {
    async fn build_router(&self) -> AppResult<()> {
        let services = &self.inner.services;
        let app = services.config.app.clone();
        let routes = features::route_table(services)?;
        let router = Router::new(BrowserHost::new(app.root_element_id.clone()), routes, app);
        *self.inner.router.borrow_mut() = Some(router.clone());

        for attempt in 1..=DOM_RETRIES {
            if sigpa::Host::root_element(router.host()).is_some() {
                return router.initialize().await;
            }
            web_sys::console::warn_1(
                &format!("[Dashboard] #view-root no disponible (intento {})", attempt).into(),
            );
            sleep(DOM_RETRY_MS).await;
        }
        router.initialize().await
    }
}
