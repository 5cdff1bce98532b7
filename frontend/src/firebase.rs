//! Firebase REST 适配器
//!
//! - `IdentityClient`: Identity Toolkit（邮箱密码登录、注册、修改显示名称）
//! - `FirestoreProfileStore`: 文档库中的 `users/{uid}` 档案，实现内核的 `ProfileStore`

use std::cell::RefCell;
use std::rc::Rc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize, de::DeserializeOwned};
use sigpa::profile::document;
use sigpa::{AppError, AppResult, ProfileStore};
use sigpa_shared::{AuthUser, PROFILE_COLLECTION, UserProfile};

use crate::web::HttpClient;

const IDENTITY_ENDPOINT: &str = "https://identitytoolkit.googleapis.com/v1";
const FIRESTORE_ENDPOINT: &str = "https://firestore.googleapis.com/v1";
const PASSWORD_PROVIDER: &str = "password";

// =========================================================
// 会话
// =========================================================

/// 登录后保存在 localStorage 中的会话
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Session {
    pub user: AuthUser,
    pub id_token: String,
    pub refresh_token: String,
}

// =========================================================
// Identity Toolkit
// =========================================================

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct PasswordRequest<'a> {
    email: &'a str,
    password: &'a str,
    return_secure_token: bool,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct UpdateRequest<'a> {
    id_token: &'a str,
    display_name: &'a str,
    return_secure_token: bool,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct AccountResponse {
    local_id: String,
    #[serde(default)]
    email: String,
    #[serde(default)]
    display_name: Option<String>,
    #[serde(default)]
    photo_url: Option<String>,
    #[serde(default)]
    id_token: Option<String>,
    #[serde(default)]
    refresh_token: Option<String>,
}

#[derive(Deserialize)]
struct ErrorEnvelope {
    error: ErrorBody,
}

#[derive(Deserialize)]
struct ErrorBody {
    message: String,
}

/// 从错误响应中取出错误码（如 `EMAIL_NOT_FOUND`）
fn error_code(body: &str) -> String {
    serde_json_wasm::from_str::<ErrorEnvelope>(body)
        .map(|e| e.error.message)
        .unwrap_or_else(|_| body.to_string())
}

fn decode<T: DeserializeOwned>(body: &str, op: &str) -> AppResult<T> {
    serde_json_wasm::from_str(body).map_err(|e| AppError::parse(e.to_string()).in_op(op))
}

fn encode<T: Serialize>(value: &T, op: &str) -> AppResult<String> {
    serde_json_wasm::to_string(value).map_err(|e| AppError::parse(e.to_string()).in_op(op))
}

#[derive(Debug, Clone)]
pub struct IdentityClient {
    api_key: String,
}

impl IdentityClient {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
        }
    }

    fn url(&self, method: &str) -> String {
        format!("{}/accounts:{}?key={}", IDENTITY_ENDPOINT, method, self.api_key)
    }

    /// 调用 accounts 接口；失败时错误消息是服务端的错误码
    async fn call(&self, method: &str, body: String) -> AppResult<AccountResponse> {
        let op = format!("identity.{}", method);
        let response = HttpClient::post(&self.url(method))
            .json_body(body)
            .send()
            .await
            .map_err(|e| e.in_op(op.as_str()))?;

        let ok = response.ok();
        let text = response.text().await?;
        if !ok {
            return Err(AppError::unauthorized(error_code(&text)).in_op(op));
        }
        decode(&text, &op)
    }

    fn session(&self, account: AccountResponse) -> AppResult<Session> {
        let id_token = account
            .id_token
            .ok_or_else(|| AppError::parse("missing idToken").in_op("identity.session"))?;
        Ok(Session {
            user: AuthUser {
                uid: account.local_id,
                email: account.email,
                display_name: account.display_name.filter(|n| !n.is_empty()),
                photo_url: account.photo_url.filter(|p| !p.is_empty()),
                provider_ids: vec![PASSWORD_PROVIDER.to_string()],
            },
            id_token,
            refresh_token: account.refresh_token.unwrap_or_default(),
        })
    }

    pub async fn sign_in(&self, email: &str, password: &str) -> AppResult<Session> {
        let body = encode(
            &PasswordRequest {
                email,
                password,
                return_secure_token: true,
            },
            "identity.signInWithPassword",
        )?;
        let account = self.call("signInWithPassword", body).await?;
        self.session(account)
    }

    /// 注册并设置显示名称
    pub async fn sign_up(&self, email: &str, password: &str, display_name: &str) -> AppResult<Session> {
        let body = encode(
            &PasswordRequest {
                email,
                password,
                return_secure_token: true,
            },
            "identity.signUp",
        )?;
        let account = self.call("signUp", body).await?;
        let session = self.session(account)?;
        self.update_display_name(session, display_name).await
    }

    pub async fn update_display_name(&self, mut session: Session, display_name: &str) -> AppResult<Session> {
        let body = encode(
            &UpdateRequest {
                id_token: &session.id_token,
                display_name,
                return_secure_token: true,
            },
            "identity.update",
        )?;
        let account = self.call("update", body).await?;
        session.user.display_name = account
            .display_name
            .filter(|n| !n.is_empty())
            .or_else(|| Some(display_name.to_string()));
        if let Some(token) = account.id_token {
            session.id_token = token;
        }
        if let Some(token) = account.refresh_token {
            session.refresh_token = token;
        }
        Ok(session)
    }
}

// =========================================================
// Firestore
// =========================================================

#[derive(Debug, Clone)]
pub struct FirestoreProfileStore {
    project_id: String,
    token: Rc<RefCell<Option<String>>>,
}

impl FirestoreProfileStore {
    pub fn new(project_id: impl Into<String>) -> Self {
        Self {
            project_id: project_id.into(),
            token: Rc::new(RefCell::new(None)),
        }
    }

    /// 登录、注销时更新访问令牌
    pub fn set_token(&self, token: Option<String>) {
        *self.token.borrow_mut() = token;
    }

    fn document_url(&self, uid: &str) -> String {
        format!(
            "{}/projects/{}/databases/(default)/documents/{}/{}",
            FIRESTORE_ENDPOINT, self.project_id, PROFILE_COLLECTION, uid
        )
    }

    fn bearer(&self, op: &str) -> AppResult<String> {
        self.token
            .borrow()
            .as_ref()
            .map(|t| format!("Bearer {}", t))
            .ok_or_else(|| AppError::unauthorized("no active session").in_op(op))
    }
}

#[async_trait(?Send)]
impl ProfileStore for FirestoreProfileStore {
    async fn get(&self, uid: &str) -> AppResult<Option<UserProfile>> {
        let auth = self.bearer("firestore.get")?;
        let response = HttpClient::get(&self.document_url(uid))
            .header("Authorization", &auth)
            .send()
            .await?;

        if response.status() == 404 {
            return Ok(None);
        }
        let text = response.text_if_ok().await?;
        let doc: serde_json::Value = serde_json::from_str(&text)
            .map_err(|e| AppError::parse(e.to_string()).in_op_with("firestore.get", uid))?;
        document::from_document(&doc).map(Some)
    }

    async fn put(&self, profile: &UserProfile) -> AppResult<()> {
        let auth = self.bearer("firestore.put")?;
        let body = document::to_document(profile).to_string();
        HttpClient::patch(&self.document_url(&profile.uid))
            .header("Authorization", &auth)
            .json_body(body)
            .send()
            .await?
            .text_if_ok()
            .await
            .map_err(|e| e.in_op_with("firestore.put", profile.uid.as_str()))?;
        Ok(())
    }
}
