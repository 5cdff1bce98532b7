//! 认证模块
//!
//! 管理会话状态，与页面外壳解耦：外壳通过 `AuthGuard` 观察会话信号，
//! 这里只负责登录、注册、注销以及会话的持久化。

use leptos::prelude::*;
use sigpa::{AppError, ErrorStatus, KeyValueStore};
use sigpa_shared::validation::{auth_error_message, validate_credentials};
use sigpa_shared::{AuthUser, STORAGE_SESSION_KEY};

use crate::firebase::Session;
use crate::services::AppServices;
use crate::web::BrowserStorage;

/// 认证上下文
///
/// 只包含信号句柄，通过 Context 与 `AppServices` 在组件间共享。
#[derive(Clone, Copy)]
pub struct AuthContext {
    session: ReadSignal<Option<Session>>,
    set_session: WriteSignal<Option<Session>>,
}

impl AuthContext {
    pub fn new() -> Self {
        let (session, set_session) = signal(None);
        Self {
            session,
            set_session,
        }
    }

    /// 当前用户（用于守卫注入）
    pub fn user_signal(&self) -> Signal<Option<AuthUser>> {
        let session = self.session;
        Signal::derive(move || session.with(|s| s.as_ref().map(|s| s.user.clone())))
    }

    pub fn current_user(&self) -> Option<AuthUser> {
        self.session.with_untracked(|s| s.as_ref().map(|s| s.user.clone()))
    }

    pub fn current_session(&self) -> Option<Session> {
        self.session.get_untracked()
    }

    fn store(&self, session: Option<Session>) {
        match &session {
            Some(session) => {
                BrowserStorage::set_json(STORAGE_SESSION_KEY, session);
            }
            None => {
                BrowserStorage.delete(STORAGE_SESSION_KEY);
            }
        }
        self.set_session.set(session);
    }
}

impl Default for AuthContext {
    fn default() -> Self {
        Self::new()
    }
}

pub fn use_auth() -> AuthContext {
    use_context::<AuthContext>().expect("AuthContext should be provided")
}

/// 从 localStorage 恢复上次的会话
pub fn init_auth(ctx: &AuthContext, services: &AppServices) {
    if let Some(session) = BrowserStorage::get_json::<Session>(STORAGE_SESSION_KEY) {
        services
            .profile_store()
            .set_token(Some(session.id_token.clone()));
        ctx.set_session.set(Some(session));
    }
}

/// 身份服务错误转为界面提示
fn failure_message(e: &AppError) -> String {
    if e.status == ErrorStatus::Unauthorized {
        auth_error_message(e.message()).to_string()
    } else {
        web_sys::console::error_1(&format!("[Auth] {}", e).into());
        "Error de conexión. Inténtalo de nuevo".to_string()
    }
}

/// 写入档案后才认为会话建立成功
async fn establish(ctx: AuthContext, services: &AppServices, session: Session) -> Result<(), String> {
    let store = services.profile_store();
    store.set_token(Some(session.id_token.clone()));

    if let Err(e) = services.profiles.upsert_from_session(&session.user).await {
        web_sys::console::error_1(&format!("[Auth] Error en upsertUserProfile: {}", e).into());
        store.set_token(None);
        return Err("No se pudo guardar el perfil de usuario".to_string());
    }

    ctx.store(Some(session));
    Ok(())
}

fn precheck(services: &AppServices, email: &str, password: &str) -> Result<(), String> {
    validate_credentials(email, password).map_err(|e| e.message().to_string())?;
    if !services.config.has_identity_provider() {
        return Err("El proveedor de identidad no está configurado".to_string());
    }
    Ok(())
}

/// 邮箱密码登录
pub async fn login(
    ctx: AuthContext,
    services: AppServices,
    email: String,
    password: String,
) -> Result<(), String> {
    let email = email.trim().to_string();
    precheck(&services, &email, &password)?;

    let session = services
        .identity
        .sign_in(&email, &password)
        .await
        .map_err(|e| failure_message(&e))?;
    establish(ctx, &services, session).await
}

/// 注册，显示名称默认取邮箱 @ 之前的部分
pub async fn register(
    ctx: AuthContext,
    services: AppServices,
    email: String,
    password: String,
) -> Result<(), String> {
    let email = email.trim().to_string();
    precheck(&services, &email, &password)?;

    let display_name = email.split('@').next().unwrap_or_default().to_string();
    let session = services
        .identity
        .sign_up(&email, &password, &display_name)
        .await
        .map_err(|e| failure_message(&e))?;
    establish(ctx, &services, session).await
}

/// 注销并清除状态
///
/// 不需要手动跳转，守卫会观察到会话变化并重定向到登录页。
pub fn logout(ctx: AuthContext, services: &AppServices) {
    services.profile_store().set_token(None);
    ctx.store(None);
}

/// 档案保存后同步会话中的显示名称与头像
pub fn refresh_user(ctx: AuthContext, display_name: &str, photo_url: &str) {
    let Some(mut session) = ctx.current_session() else {
        return;
    };
    session.user.display_name = Some(display_name.to_string()).filter(|n| !n.is_empty());
    session.user.photo_url = Some(photo_url.to_string()).filter(|p| !p.is_empty());
    ctx.store(Some(session));
}
