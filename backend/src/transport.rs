//! 邮件与短信的发送通道
//!
//! 两个服务商都通过 HTTP JSON 接口调用，地址与密钥来自 worker 的 `[vars]` / secrets。

use async_trait::async_trait;
use serde_json::json;
use sigpa_shared::protocol::{EmailAlert, HttpMethod, SmsAlert};

use crate::error::{RelayError, RelayResult};
use crate::http::{HttpClient, HttpRequest};

#[async_trait(?Send)]
pub trait MailTransport {
    async fn send_mail(&self, alert: &EmailAlert) -> RelayResult<()>;
}

#[async_trait(?Send)]
pub trait SmsTransport {
    async fn send_sms(&self, alert: &SmsAlert) -> RelayResult<()>;
}

/// 服务商接口配置
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProviderConfig {
    pub endpoint: String,
    pub api_key: String,
    /// 发件地址或发送号码
    pub sender: String,
}

impl ProviderConfig {
    fn ensure_complete(&self, kind: &str) -> RelayResult<()> {
        if self.endpoint.trim().is_empty() {
            return Err(RelayError::config(format!("{} endpoint is not configured", kind)));
        }
        if self.api_key.is_empty() {
            return Err(RelayError::config(format!("{} api key is not configured", kind)));
        }
        Ok(())
    }

    fn request(&self, body: serde_json::Value) -> HttpRequest {
        HttpRequest::new(&self.endpoint, HttpMethod::Post)
            .with_header("Authorization", &format!("Bearer {}", self.api_key))
            .with_json(body)
    }
}

async fn dispatch<C: HttpClient>(client: &C, req: HttpRequest) -> RelayResult<()> {
    let response = client.send(req).await?;
    if response.is_success() {
        Ok(())
    } else {
        Err(RelayError::external_api(format!(
            "HTTP {}: {}",
            response.status, response.body
        )))
    }
}

// =========================================================
// 邮件
// =========================================================

pub struct HttpMailTransport<C> {
    client: C,
    config: ProviderConfig,
}

impl<C: HttpClient> HttpMailTransport<C> {
    pub fn new(client: C, config: ProviderConfig) -> Self {
        Self { client, config }
    }
}

#[async_trait(?Send)]
impl<C: HttpClient> MailTransport for HttpMailTransport<C> {
    async fn send_mail(&self, alert: &EmailAlert) -> RelayResult<()> {
        self.config
            .ensure_complete("mail")
            .map_err(|e| e.in_op("mail.send"))?;

        let req = self.config.request(json!({
            "from": self.config.sender,
            "to": alert.to,
            "subject": alert.subject,
            "text": alert.text,
        }));
        dispatch(&self.client, req)
            .await
            .map_err(|e| e.in_op_with("mail.send", alert.to.as_str()))
    }
}

// =========================================================
// 短信
// =========================================================

pub struct HttpSmsTransport<C> {
    client: C,
    config: ProviderConfig,
}

impl<C: HttpClient> HttpSmsTransport<C> {
    pub fn new(client: C, config: ProviderConfig) -> Self {
        Self { client, config }
    }
}

#[async_trait(?Send)]
impl<C: HttpClient> SmsTransport for HttpSmsTransport<C> {
    async fn send_sms(&self, alert: &SmsAlert) -> RelayResult<()> {
        self.config
            .ensure_complete("sms")
            .map_err(|e| e.in_op("sms.send"))?;

        let req = self.config.request(json!({
            "from": self.config.sender,
            "to": alert.to,
            "body": alert.body,
        }));
        dispatch(&self.client, req)
            .await
            .map_err(|e| e.in_op_with("sms.send", alert.to.as_str()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::RelayErrorStatus;
    use crate::http::MockHttpClient;

    const MAIL_URL: &str = "https://mail.test/emails";
    const SMS_URL: &str = "https://sms.test/messages";

    fn provider(endpoint: &str) -> ProviderConfig {
        ProviderConfig {
            endpoint: endpoint.to_string(),
            api_key: "key-123".to_string(),
            sender: "alertas@sigpa.co".to_string(),
        }
    }

    #[tokio::test]
    async fn mail_posts_json_with_bearer_key() {
        let client = MockHttpClient::new();
        client.mock_response(MAIL_URL, 200, "{\"id\":\"m1\"}");
        let transport = HttpMailTransport::new(client, provider(MAIL_URL));

        transport
            .send_mail(&EmailAlert::sample("ana@finca.co"))
            .await
            .unwrap();

        let requests = transport.client.requests.borrow();
        assert_eq!(requests.len(), 1);
        let req = &requests[0];
        assert_eq!(req.method, HttpMethod::Post);
        assert_eq!(req.headers["Authorization"], "Bearer key-123");
        assert_eq!(req.headers["Content-Type"], "application/json");

        let body: serde_json::Value = serde_json::from_str(req.body.as_deref().unwrap()).unwrap();
        assert_eq!(body["to"], "ana@finca.co");
        assert_eq!(body["from"], "alertas@sigpa.co");
        assert_eq!(body["subject"], "⚠️ Alerta de prueba");
    }

    #[tokio::test]
    async fn provider_rejection_is_upstream_error() {
        let client = MockHttpClient::new();
        client.mock_response(SMS_URL, 401, "bad token");
        let transport = HttpSmsTransport::new(client, provider(SMS_URL));

        let err = transport
            .send_sms(&SmsAlert::sample("+573001112233"))
            .await
            .unwrap_err();
        assert_eq!(err.status, RelayErrorStatus::ExternalApi);
        assert_eq!(err.message(), "HTTP 401: bad token");
        assert_eq!(err.spans()[0].detail.as_deref(), Some("+573001112233"));
    }

    #[tokio::test]
    async fn missing_config_never_calls_provider() {
        let transport = HttpSmsTransport::new(MockHttpClient::new(), ProviderConfig::default());

        let err = transport
            .send_sms(&SmsAlert::sample("+573001112233"))
            .await
            .unwrap_err();
        assert_eq!(err.status, RelayErrorStatus::Config);
        assert!(transport.client.requests.borrow().is_empty());
    }
}
