use worker::*;

pub mod error;
mod http;
mod relay;
mod transport;

use error::{ErrorResponse, RelayResult};
use http::WorkerHttpClient;
use relay::{AlertRelay, outcome};
use sigpa_shared::protocol::{ApiRequest, EmailAlert, SmsAlert};
use transport::{HttpMailTransport, HttpSmsTransport, ProviderConfig};

// =========================================================
// 常量定义
// =========================================================
const DEFAULT_MAIL_ENDPOINT: &str = "https://api.resend.com/emails";
const DEFAULT_MAIL_FROM: &str = "SIGPA <alertas@sigpa.co>";

// =========================================================
// 日志宏
// =========================================================

#[cfg(target_arch = "wasm32")]
macro_rules! log_info { ($($t:tt)*) => (worker::console_log!($($t)*)) }
#[cfg(not(target_arch = "wasm32"))]
macro_rules! log_info { ($($t:tt)*) => (println!($($t)*)) }

#[cfg(target_arch = "wasm32")]
macro_rules! log_error { ($($t:tt)*) => (worker::console_error!($($t)*)) }
#[cfg(not(target_arch = "wasm32"))]
macro_rules! log_error { ($($t:tt)*) => (eprintln!($($t)*)) }

// =========================================================
// 运行时配置
// =========================================================

struct RuntimeConfig {
    mail: ProviderConfig,
    sms: ProviderConfig,
}

fn var(env: &Env, name: &str) -> Option<String> {
    env.var(name).map(|v| v.to_string()).ok()
}

fn secret(env: &Env, name: &str) -> String {
    env.secret(name).map(|s| s.to_string()).unwrap_or_default()
}

impl RuntimeConfig {
    fn new(env: &Env) -> Self {
        Self {
            mail: ProviderConfig {
                endpoint: var(env, "MAIL_ENDPOINT").unwrap_or_else(|| DEFAULT_MAIL_ENDPOINT.to_string()),
                api_key: secret(env, "MAIL_API_KEY"),
                sender: var(env, "MAIL_FROM").unwrap_or_else(|| DEFAULT_MAIL_FROM.to_string()),
            },
            sms: ProviderConfig {
                endpoint: var(env, "SMS_ENDPOINT").unwrap_or_default(),
                api_key: secret(env, "SMS_AUTH_TOKEN"),
                sender: var(env, "SMS_FROM").unwrap_or_default(),
            },
        }
    }
}

// =========================================================
// 响应处理
// =========================================================

/// 客户端只收到纯文本确认；失败详情写入日志
fn respond<R: ApiRequest>(result: RelayResult<()>) -> Result<Response> {
    let (status, message) = outcome::<R>(&result);
    match result {
        Ok(()) => log_info!("[Relay] {} -> {}", R::PATH, message),
        Err(e) => {
            let detail = ErrorResponse::from(e);
            log_error!(
                "[Relay] {} failed [{}]: {}",
                R::PATH,
                detail.error_code(),
                serde_json::to_string(&detail).unwrap_or_else(|_| detail.message.clone())
            );
        }
    }
    Response::ok(message).map(|r| r.with_status(status))
}

// =========================================================
// API Controllers (适配层)
// =========================================================

async fn send_email(mut req: Request, ctx: RouteContext<()>) -> Result<Response> {
    let cfg = RuntimeConfig::new(&ctx.env);
    let body = req.text().await.unwrap_or_default();

    let mail = HttpMailTransport::new(WorkerHttpClient, cfg.mail);
    let sms = HttpSmsTransport::new(WorkerHttpClient, cfg.sms);
    let result = AlertRelay::new(&mail, &sms).relay_email(&body).await;

    respond::<EmailAlert>(result)
}

async fn send_sms(mut req: Request, ctx: RouteContext<()>) -> Result<Response> {
    let cfg = RuntimeConfig::new(&ctx.env);
    let body = req.text().await.unwrap_or_default();

    let mail = HttpMailTransport::new(WorkerHttpClient, cfg.mail);
    let sms = HttpSmsTransport::new(WorkerHttpClient, cfg.sms);
    let result = AlertRelay::new(&mail, &sms).relay_sms(&body).await;

    respond::<SmsAlert>(result)
}

// =========================================================
// Entry Points
// =========================================================

#[event(fetch)]
pub async fn main(req: Request, env: Env, _ctx: Context) -> Result<Response> {
    console_error_panic_hook::set_once();

    let cors = Cors::new()
        .with_origins(vec!["*"])
        .with_methods(vec![Method::Post, Method::Options])
        .with_allowed_headers(vec!["Content-Type"]);

    let router = Router::new();
    router
        .post_async(EmailAlert::PATH, send_email)
        .post_async(SmsAlert::PATH, send_sms)
        .options_async(EmailAlert::PATH, |_, _| async { Response::empty() })
        .options_async(SmsAlert::PATH, |_, _| async { Response::empty() })
        .run(req, env)
        .await?
        .with_cors(&cors)
}
