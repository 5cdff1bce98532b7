//! 用户档案
//!
//! 每次登录后把会话用户写入文档库（集合 `users`，文档 id 为 uid）。
//! 新用户写入 `created_at`，老用户只刷新身份字段与时间戳。

use std::rc::Rc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sigpa_shared::{AuthUser, ProfilePatch, UserProfile};

use crate::error::AppResult;

pub mod document;

#[async_trait(?Send)]
pub trait ProfileStore {
    async fn get(&self, uid: &str) -> AppResult<Option<UserProfile>>;

    /// 整体写入（存在则覆盖）
    async fn put(&self, profile: &UserProfile) -> AppResult<()>;
}

type Clock = Rc<dyn Fn() -> DateTime<Utc>>;

pub struct ProfileService<S> {
    store: S,
    clock: Clock,
}

impl<S: ProfileStore> ProfileService<S> {
    pub fn new(store: S) -> Self {
        Self {
            store,
            clock: Rc::new(Utc::now),
        }
    }

    pub fn with_clock<F>(mut self, clock: F) -> Self
    where
        F: Fn() -> DateTime<Utc> + 'static,
    {
        self.clock = Rc::new(clock);
        self
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// 登录或注册成功后调用
    pub async fn upsert_from_session(&self, user: &AuthUser) -> AppResult<UserProfile> {
        let now = (self.clock)();
        let existing = self
            .store
            .get(&user.uid)
            .await
            .map_err(|e| e.in_op_with("profile.upsert", user.uid.as_str()))?;

        let profile = match existing {
            None => UserProfile {
                uid: user.uid.clone(),
                email: user.email.clone(),
                display_name: user.display_name.clone().unwrap_or_default(),
                photo_url: user.photo_url.clone().unwrap_or_default(),
                provider_ids: user.provider_ids.clone(),
                created_at: now,
                updated_at: now,
                last_login_at: Some(now),
            },
            Some(mut profile) => {
                if let Some(name) = non_empty(&user.display_name) {
                    profile.display_name = name.to_string();
                }
                if let Some(photo) = non_empty(&user.photo_url) {
                    profile.photo_url = photo.to_string();
                }
                profile.provider_ids = user.provider_ids.clone();
                profile.updated_at = now;
                profile.last_login_at = Some(now);
                profile
            }
        };

        self.store
            .put(&profile)
            .await
            .map_err(|e| e.in_op_with("profile.upsert", user.uid.as_str()))?;
        log_info!("[Profile] Upserted profile {}", profile.uid);
        Ok(profile)
    }

    pub async fn get_profile(&self, uid: &str) -> AppResult<Option<UserProfile>> {
        self.store
            .get(uid)
            .await
            .map_err(|e| e.in_op_with("profile.get", uid))
    }

    /// 修改显示名称与头像
    ///
    /// 档案不存在时新建一份，邮箱与登录方式取自 `session`。
    pub async fn update_profile(
        &self,
        uid: &str,
        patch: &ProfilePatch,
        session: Option<&AuthUser>,
    ) -> AppResult<UserProfile> {
        let now = (self.clock)();
        let existing = self.get_profile(uid).await?;

        let profile = match existing {
            Some(mut profile) => {
                if let Some(name) = &patch.display_name {
                    profile.display_name = name.trim().to_string();
                }
                if let Some(photo) = &patch.photo_url {
                    profile.photo_url = photo.trim().to_string();
                }
                profile.updated_at = now;
                profile
            }
            None => {
                log_warn!("[Profile] Documento de usuario {} no existe, creando uno nuevo", uid);
                UserProfile {
                    uid: uid.to_string(),
                    email: session.map(|s| s.email.clone()).unwrap_or_default(),
                    display_name: patch.display_name.clone().unwrap_or_default(),
                    photo_url: patch.photo_url.clone().unwrap_or_default(),
                    provider_ids: session.map(|s| s.provider_ids.clone()).unwrap_or_default(),
                    created_at: now,
                    updated_at: now,
                    last_login_at: Some(now),
                }
            }
        };

        self.store
            .put(&profile)
            .await
            .map_err(|e| e.in_op_with("profile.update", uid))?;
        Ok(profile)
    }
}

fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|v| !v.trim().is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{AppError, ErrorStatus};
    use chrono::TimeZone;
    use std::cell::{Cell, RefCell};
    use std::collections::HashMap;

    #[derive(Default)]
    struct TestContext {
        log: RefCell<Vec<String>>,
        docs: RefCell<HashMap<String, UserProfile>>,
        fail_put: Cell<bool>,
    }

    #[derive(Clone)]
    struct MemoryProfileStore {
        ctx: Rc<TestContext>,
    }

    #[async_trait(?Send)]
    impl ProfileStore for MemoryProfileStore {
        async fn get(&self, uid: &str) -> AppResult<Option<UserProfile>> {
            self.ctx.log.borrow_mut().push(format!("get:{}", uid));
            Ok(self.ctx.docs.borrow().get(uid).cloned())
        }

        async fn put(&self, profile: &UserProfile) -> AppResult<()> {
            self.ctx.log.borrow_mut().push(format!("put:{}", profile.uid));
            if self.ctx.fail_put.get() {
                return Err(AppError::store("PERMISSION_DENIED"));
            }
            self.ctx
                .docs
                .borrow_mut()
                .insert(profile.uid.clone(), profile.clone());
            Ok(())
        }
    }

    fn at(hour: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 3, 1, hour, 0, 0).unwrap()
    }

    fn setup() -> (Rc<TestContext>, Rc<Cell<u32>>, ProfileService<MemoryProfileStore>) {
        let ctx = Rc::new(TestContext::default());
        let hour = Rc::new(Cell::new(8));
        let clock_hour = hour.clone();
        let service = ProfileService::new(MemoryProfileStore { ctx: ctx.clone() })
            .with_clock(move || at(clock_hour.get()));
        (ctx, hour, service)
    }

    fn session(display_name: Option<&str>) -> AuthUser {
        AuthUser {
            uid: "u1".into(),
            email: "ana@finca.co".into(),
            display_name: display_name.map(str::to_string),
            photo_url: None,
            provider_ids: vec!["password".into()],
        }
    }

    #[tokio::test]
    async fn first_login_creates_profile() {
        let (ctx, _, service) = setup();
        let profile = service.upsert_from_session(&session(Some("Ana"))).await.unwrap();

        assert_eq!(profile.display_name, "Ana");
        assert_eq!(profile.photo_url, "");
        assert_eq!(profile.created_at, at(8));
        assert_eq!(profile.last_login_at, Some(at(8)));
        assert_eq!(*ctx.log.borrow(), vec!["get:u1", "put:u1"]);
    }

    #[tokio::test]
    async fn later_login_keeps_created_at_and_known_name() {
        let (ctx, hour, service) = setup();
        service.upsert_from_session(&session(Some("Ana"))).await.unwrap();

        hour.set(17);
        let profile = service.upsert_from_session(&session(None)).await.unwrap();

        assert_eq!(profile.created_at, at(8));
        assert_eq!(profile.updated_at, at(17));
        assert_eq!(profile.last_login_at, Some(at(17)));
        assert_eq!(profile.display_name, "Ana");
        assert_eq!(ctx.docs.borrow()["u1"], profile);
    }

    #[tokio::test]
    async fn update_patches_only_given_fields() {
        let (_, hour, service) = setup();
        service.upsert_from_session(&session(Some("Ana"))).await.unwrap();

        hour.set(9);
        let patch = ProfilePatch {
            display_name: None,
            photo_url: Some(" https://img/ana.png ".into()),
        };
        let profile = service.update_profile("u1", &patch, None).await.unwrap();

        assert_eq!(profile.display_name, "Ana");
        assert_eq!(profile.photo_url, "https://img/ana.png");
        assert_eq!(profile.updated_at, at(9));
        assert_eq!(profile.last_login_at, Some(at(8)));
    }

    #[tokio::test]
    async fn update_creates_missing_profile_from_session() {
        let (_, _, service) = setup();
        let patch = ProfilePatch {
            display_name: Some("Ana G.".into()),
            photo_url: None,
        };
        let user = session(None);
        let profile = service.update_profile("u1", &patch, Some(&user)).await.unwrap();

        assert_eq!(profile.email, "ana@finca.co");
        assert_eq!(profile.display_name, "Ana G.");
        assert_eq!(profile.provider_ids, vec!["password"]);
        assert!(service.get_profile("u1").await.unwrap().is_some());
    }

    #[tokio::test]
    async fn store_errors_carry_context() {
        let (ctx, _, service) = setup();
        ctx.fail_put.set(true);

        let err = service.upsert_from_session(&session(None)).await.unwrap_err();
        assert_eq!(err.status, ErrorStatus::Store);
        assert_eq!(err.spans()[0].operation, "profile.upsert");
        assert!(service.get_profile("u1").await.unwrap().is_none());
    }
}
