//! 认证守卫
//!
//! 把"会话状态 × 当前页面"映射为一次跳转或一次面板加载。
//! 页面分类与跳转目标是纯逻辑，不依赖 DOM；跳转本身与面板加载通过注入的
//! `Navigator` / `DashboardShell` 完成。

use std::cell::{Cell, RefCell};
use std::fmt::Display;

use async_trait::async_trait;
use sigpa_shared::AuthUser;

use crate::error::AppResult;

/// 顶层页面
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ShellPage {
    /// 登录页面 (默认页面)
    #[default]
    Login,
    /// 控制面板 (需要认证)
    Dashboard,
    /// 页面未找到
    NotFound,
}

impl ShellPage {
    /// 将 URL path 解析为页面
    pub fn from_path(path: &str) -> Self {
        match path {
            "" | "/" | "/login" => Self::Login,
            "/dashboard" => Self::Dashboard,
            p if p.ends_with("/index.html") => Self::Login,
            p if p.ends_with("/dashboard.html") => Self::Dashboard,
            _ => Self::NotFound,
        }
    }

    pub fn to_path(&self) -> &'static str {
        match self {
            Self::Login => "/",
            Self::Dashboard => "/dashboard",
            Self::NotFound => "/404",
        }
    }

    /// **核心守卫逻辑：定义该页面是否需要认证**
    pub fn requires_auth(&self) -> bool {
        matches!(self, Self::Dashboard)
    }

    /// 已认证用户是否应该离开此页面（如登录页）
    pub fn should_redirect_when_authenticated(&self) -> bool {
        matches!(self, Self::Login)
    }

    pub fn auth_failure_redirect() -> Self {
        Self::Login
    }

    pub fn auth_success_redirect() -> Self {
        Self::Dashboard
    }
}

impl Display for ShellPage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.to_path())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GuardAction {
    RedirectToDashboard,
    LoadDashboard,
    RedirectToLogin,
    Stay,
}

/// 根据会话与当前页面决定动作
pub fn decide(user: Option<&AuthUser>, page: ShellPage) -> GuardAction {
    match user {
        Some(_) if page.should_redirect_when_authenticated() => GuardAction::RedirectToDashboard,
        Some(_) if page == ShellPage::Dashboard => GuardAction::LoadDashboard,
        None if page.requires_auth() => GuardAction::RedirectToLogin,
        _ => GuardAction::Stay,
    }
}

// =========================================================
// 注入接口
// =========================================================

pub trait Navigator {
    fn current_page(&self) -> ShellPage;

    fn redirect(&self, page: ShellPage);
}

/// 控制面板外壳：侧边栏、顶栏与路由器
#[async_trait(?Send)]
pub trait DashboardShell {
    async fn load_chrome(&self, user: &AuthUser) -> AppResult<()>;

    async fn start_router(&self) -> AppResult<()>;
}

// =========================================================
// 守卫
// =========================================================

pub struct AuthGuard<N, D> {
    navigator: N,
    shell: D,
    user: RefCell<Option<AuthUser>>,
    chrome_loaded: Cell<bool>,
    router_started: Cell<bool>,
}

impl<N: Navigator, D: DashboardShell> AuthGuard<N, D> {
    pub fn new(navigator: N, shell: D) -> Self {
        Self {
            navigator,
            shell,
            user: RefCell::new(None),
            chrome_loaded: Cell::new(false),
            router_started: Cell::new(false),
        }
    }

    pub fn current_user(&self) -> Option<AuthUser> {
        self.user.borrow().clone()
    }

    pub fn is_dashboard_loaded(&self) -> bool {
        self.chrome_loaded.get() && self.router_started.get()
    }

    /// 会话变化（登录、注销、页面加载时的首次通知）时调用
    ///
    /// 面板加载失败只记录日志，不会向上传播。
    pub async fn on_session_changed(&self, user: Option<AuthUser>) -> GuardAction {
        let page = self.navigator.current_page();
        let action = decide(user.as_ref(), page);
        *self.user.borrow_mut() = user.clone();

        match action {
            GuardAction::RedirectToDashboard => {
                self.redirect(ShellPage::auth_success_redirect());
            }
            GuardAction::RedirectToLogin => {
                self.redirect(ShellPage::auth_failure_redirect());
            }
            GuardAction::LoadDashboard => {
                if let Some(user) = user {
                    self.load_dashboard(&user).await;
                }
            }
            GuardAction::Stay => {}
        }
        action
    }

    /// 离开当前页面后，目标页面重新加载自己的外壳
    fn redirect(&self, page: ShellPage) {
        log_info!("[Guard] Redirecting to {}", page);
        self.chrome_loaded.set(false);
        self.router_started.set(false);
        self.navigator.redirect(page);
    }

    async fn load_dashboard(&self, user: &AuthUser) {
        if !self.chrome_loaded.get() {
            if let Err(e) = self.shell.load_chrome(user).await {
                log_error!("[Guard] Error al cargar interfaz del dashboard: {}", e);
                return;
            }
            self.chrome_loaded.set(true);
        }

        if !self.router_started.get() {
            match self.shell.start_router().await {
                Ok(()) => self.router_started.set(true),
                Err(e) => log_error!("[Guard] Error al inicializar router: {}", e),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::AppError;
    use std::rc::Rc;

    #[derive(Default)]
    struct TestContext {
        log: RefCell<Vec<String>>,
        page: Cell<ShellPage>,
        fail_chrome: Cell<bool>,
        fail_router: Cell<bool>,
    }

    impl TestContext {
        fn push_log(&self, msg: String) {
            self.log.borrow_mut().push(msg);
        }

        fn take_log(&self) -> Vec<String> {
            self.log.borrow_mut().drain(..).collect()
        }
    }

    struct TestNavigator {
        ctx: Rc<TestContext>,
    }

    impl Navigator for TestNavigator {
        fn current_page(&self) -> ShellPage {
            self.ctx.page.get()
        }

        fn redirect(&self, page: ShellPage) {
            self.ctx.push_log(format!("redirect:{}", page));
            self.ctx.page.set(page);
        }
    }

    struct TestShell {
        ctx: Rc<TestContext>,
    }

    #[async_trait(?Send)]
    impl DashboardShell for TestShell {
        async fn load_chrome(&self, user: &AuthUser) -> AppResult<()> {
            self.ctx.push_log(format!("chrome:{}", user.uid));
            if self.ctx.fail_chrome.get() {
                return Err(AppError::fetch("partial missing"));
            }
            Ok(())
        }

        async fn start_router(&self) -> AppResult<()> {
            self.ctx.push_log("router".to_string());
            if self.ctx.fail_router.get() {
                return Err(AppError::not_found("root element #view-root not found"));
            }
            Ok(())
        }
    }

    fn user() -> AuthUser {
        AuthUser {
            uid: "u1".into(),
            email: "ana@finca.co".into(),
            display_name: None,
            photo_url: None,
            provider_ids: vec!["password".into()],
        }
    }

    fn setup(page: ShellPage) -> (Rc<TestContext>, AuthGuard<TestNavigator, TestShell>) {
        let ctx = Rc::new(TestContext::default());
        ctx.page.set(page);
        let guard = AuthGuard::new(
            TestNavigator { ctx: ctx.clone() },
            TestShell { ctx: ctx.clone() },
        );
        (ctx, guard)
    }

    #[test]
    fn pages_from_paths() {
        assert_eq!(ShellPage::from_path(""), ShellPage::Login);
        assert_eq!(ShellPage::from_path("/"), ShellPage::Login);
        assert_eq!(ShellPage::from_path("/index.html"), ShellPage::Login);
        assert_eq!(ShellPage::from_path("/app/index.html"), ShellPage::Login);
        assert_eq!(ShellPage::from_path("/dashboard"), ShellPage::Dashboard);
        assert_eq!(ShellPage::from_path("/dashboard.html"), ShellPage::Dashboard);
        assert_eq!(ShellPage::from_path("/otra"), ShellPage::NotFound);
    }

    #[test]
    fn decisions_for_every_page_and_session() {
        let u = user();
        let cases = [
            (Some(&u), ShellPage::Login, GuardAction::RedirectToDashboard),
            (Some(&u), ShellPage::Dashboard, GuardAction::LoadDashboard),
            (Some(&u), ShellPage::NotFound, GuardAction::Stay),
            (None, ShellPage::Login, GuardAction::Stay),
            (None, ShellPage::Dashboard, GuardAction::RedirectToLogin),
            (None, ShellPage::NotFound, GuardAction::Stay),
        ];
        for (user, page, expected) in cases {
            assert_eq!(decide(user, page), expected, "{:?} on {}", user.map(|u| &u.uid), page);
        }
    }

    #[tokio::test]
    async fn login_page_redirects_authenticated_user() {
        let (ctx, guard) = setup(ShellPage::Login);
        let action = guard.on_session_changed(Some(user())).await;

        assert_eq!(action, GuardAction::RedirectToDashboard);
        assert_eq!(ctx.take_log(), vec!["redirect:/dashboard"]);
        assert_eq!(guard.current_user().unwrap().uid, "u1");
    }

    #[tokio::test]
    async fn dashboard_loads_chrome_then_router_once() {
        let (ctx, guard) = setup(ShellPage::Dashboard);
        guard.on_session_changed(Some(user())).await;
        // 令牌刷新等原因再次通知同一用户
        guard.on_session_changed(Some(user())).await;

        assert_eq!(ctx.take_log(), vec!["chrome:u1", "router"]);
        assert!(guard.is_dashboard_loaded());
    }

    #[tokio::test]
    async fn chrome_failure_skips_router_and_retries_later() {
        let (ctx, guard) = setup(ShellPage::Dashboard);
        ctx.fail_chrome.set(true);
        guard.on_session_changed(Some(user())).await;
        assert_eq!(ctx.take_log(), vec!["chrome:u1"]);
        assert!(!guard.is_dashboard_loaded());

        ctx.fail_chrome.set(false);
        guard.on_session_changed(Some(user())).await;
        assert_eq!(ctx.take_log(), vec!["chrome:u1", "router"]);
    }

    #[tokio::test]
    async fn router_failure_is_logged_not_propagated() {
        let (ctx, guard) = setup(ShellPage::Dashboard);
        ctx.fail_router.set(true);
        let action = guard.on_session_changed(Some(user())).await;

        assert_eq!(action, GuardAction::LoadDashboard);
        assert_eq!(ctx.take_log(), vec!["chrome:u1", "router"]);
        assert!(!guard.is_dashboard_loaded());
    }

    #[tokio::test]
    async fn logout_on_dashboard_redirects_and_resets() {
        let (ctx, guard) = setup(ShellPage::Dashboard);
        guard.on_session_changed(Some(user())).await;
        let action = guard.on_session_changed(None).await;

        assert_eq!(action, GuardAction::RedirectToLogin);
        assert!(guard.current_user().is_none());
        assert!(!guard.is_dashboard_loaded());
        assert_eq!(ctx.page.get(), ShellPage::Login);
        ctx.take_log();

        // 再次登录：登录页 -> 面板 -> 重新加载外壳
        guard.on_session_changed(Some(user())).await;
        guard.on_session_changed(Some(user())).await;
        assert_eq!(ctx.take_log(), vec!["redirect:/dashboard", "chrome:u1", "router"]);
    }

    #[tokio::test]
    async fn anonymous_on_login_stays() {
        let (ctx, guard) = setup(ShellPage::Login);
        assert_eq!(guard.on_session_changed(None).await, GuardAction::Stay);
        assert!(ctx.take_log().is_empty());
    }
}
