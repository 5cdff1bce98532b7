use serde::de::DeserializeOwned;
use sigpa_shared::protocol::{ApiRequest, EmailAlert, SmsAlert};
use sigpa_shared::validation::validate_email;

use crate::error::{RelayError, RelayResult};
use crate::transport::{MailTransport, SmsTransport};

/// 告警转发逻辑
///
/// 不依赖 worker 的 `Env` / `Request` / `Response`，发送通道通过 trait 注入。
pub struct AlertRelay<'a, M: MailTransport, S: SmsTransport> {
    mail: &'a M,
    sms: &'a S,
}

impl<'a, M: MailTransport, S: SmsTransport> AlertRelay<'a, M, S> {
    pub fn new(mail: &'a M, sms: &'a S) -> Self {
        Self { mail, sms }
    }

    pub async fn relay_email(&self, body: &str) -> RelayResult<()> {
        let alert: EmailAlert = parse_body(body).map_err(|e| e.in_op("relay.email"))?;
        validate_email(alert.to.trim())
            .map_err(|e| RelayError::invalid_input(e.message()).in_op_with("relay.email", alert.to.as_str()))?;
        self.mail.send_mail(&alert).await
    }

    pub async fn relay_sms(&self, body: &str) -> RelayResult<()> {
        let alert: SmsAlert = parse_body(body).map_err(|e| e.in_op("relay.sms"))?;
        if alert.to.trim().is_empty() {
            return Err(RelayError::invalid_input("El número de destino es obligatorio").in_op("relay.sms"));
        }
        self.sms.send_sms(&alert).await
    }
}

pub fn parse_body<R: DeserializeOwned>(body: &str) -> RelayResult<R> {
    serde_json::from_str(body).map_err(RelayError::from)
}

/// 结果到 (状态码, 响应文本) 的映射：成功 200，任何失败 500
pub fn outcome<R: ApiRequest>(result: &RelayResult<()>) -> (u16, &'static str) {
    match result {
        Ok(()) => (200, R::SUCCESS_MESSAGE),
        Err(_) => (500, R::FAILURE_MESSAGE),
    }
}
