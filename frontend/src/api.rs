//! 告警中继客户端
//!
//! 中继只返回一行纯文本（`Correo enviado` / `Error enviando correo`），
//! 非 2xx 时把这行文本作为错误消息返回。

use gloo_net::http::Request;
use sigpa::{AppError, AppResult};
use sigpa_shared::protocol::{ApiRequest, EmailAlert, HttpMethod, SmsAlert};

#[derive(Clone, Debug, PartialEq)]
pub struct AlertApi {
    pub base_url: String,
}

impl AlertApi {
    pub fn new(base_url: impl Into<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self { base_url }
    }

    fn url(&self, path: &str) -> String {
        if path.starts_with('/') {
            format!("{}{}", self.base_url, path)
        } else {
            format!("{}/{}", self.base_url, path)
        }
    }

    /// 发送请求，成功时返回中继的确认文本
    pub async fn send<R: ApiRequest>(&self, request: &R) -> AppResult<String> {
        let url = self.url(R::PATH);
        let builder = match R::METHOD {
            HttpMethod::Get => Request::get(&url),
            HttpMethod::Post => Request::post(&url),
            HttpMethod::Patch => Request::patch(&url),
        };

        let res = builder
            .json(request)
            .map_err(|e| AppError::parse(e.to_string()).in_op_with("alerts.send", R::PATH))?
            .send()
            .await
            .map_err(|e| AppError::fetch(e.to_string()).in_op_with("alerts.send", R::PATH))?;

        let ok = res.ok();
        let text = res
            .text()
            .await
            .map_err(|e| AppError::fetch(e.to_string()).in_op_with("alerts.send", R::PATH))?;

        if ok {
            Ok(text)
        } else {
            Err(AppError::fetch(text).in_op_with("alerts.send", R::PATH))
        }
    }

    pub async fn send_email(&self, alert: &EmailAlert) -> AppResult<String> {
        self.send(alert).await
    }

    pub async fn send_sms(&self, alert: &SmsAlert) -> AppResult<String> {
        self.send(alert).await
    }
}
