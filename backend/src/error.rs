use std::fmt;

use serde::{Deserialize, Serialize};
use worker::wasm_bindgen::JsValue;

// =========================================================
// 错误状态枚举
// =========================================================

/// 错误状态枚举
///
/// 对外只有两种结果（200 / 500），状态码用于日志与 `ErrorResponse`。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RelayErrorStatus {
    /// 400: 收件人等字段校验失败
    InvalidInput,
    /// 400: 请求体无法解析
    Serialization,
    /// 500: 缺少服务商地址或密钥
    Config,
    /// 502: 邮件 / 短信服务商返回失败
    ExternalApi,
}

impl RelayErrorStatus {
    pub fn status_code(&self) -> u16 {
        match self {
            RelayErrorStatus::InvalidInput | RelayErrorStatus::Serialization => 400,
            RelayErrorStatus::Config => 500,
            RelayErrorStatus::ExternalApi => 502,
        }
    }

    pub fn error_code(&self) -> &'static str {
        match self {
            RelayErrorStatus::InvalidInput => "INVALID_INPUT",
            RelayErrorStatus::Serialization => "JSON_PARSE_ERROR",
            RelayErrorStatus::Config => "MISSING_CONFIG",
            RelayErrorStatus::ExternalApi => "UPSTREAM_ERROR",
        }
    }
}

// =========================================================
// 错误上下文追踪
// =========================================================

/// 结构化的错误追踪片段
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorSpan {
    /// 操作名称，如 "mail.send", "relay.email"
    pub operation: String,
    /// 额外的细节信息，如收件人
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
}

impl ErrorSpan {
    pub fn new(operation: impl Into<String>) -> Self {
        Self {
            operation: operation.into(),
            detail: None,
        }
    }

    pub fn with_detail(operation: impl Into<String>, detail: impl Into<String>) -> Self {
        Self {
            operation: operation.into(),
            detail: Some(detail.into()),
        }
    }
}

// =========================================================
// 核心错误类型
// =========================================================

#[derive(Debug)]
pub struct RelayError {
    pub status: RelayErrorStatus,
    pub message: String,
    source: Option<Box<dyn std::error::Error + Send + Sync>>,
    spans: Vec<ErrorSpan>,
}

impl RelayError {
    pub fn new(status: RelayErrorStatus, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
            source: None,
            spans: Vec::new(),
        }
    }

    pub fn invalid_input(message: impl Into<String>) -> Self {
        Self::new(RelayErrorStatus::InvalidInput, message)
    }

    pub fn serialization(message: impl Into<String>) -> Self {
        Self::new(RelayErrorStatus::Serialization, message)
    }

    pub fn config(message: impl Into<String>) -> Self {
        Self::new(RelayErrorStatus::Config, message)
    }

    pub fn external_api(message: impl Into<String>) -> Self {
        Self::new(RelayErrorStatus::ExternalApi, message)
    }

    /// 添加操作追踪（无额外细节）
    pub fn in_op(mut self, operation: impl Into<String>) -> Self {
        self.spans.push(ErrorSpan::new(operation));
        self
    }

    /// 添加操作追踪（带额外细节）
    pub fn in_op_with(mut self, operation: impl Into<String>, detail: impl Into<String>) -> Self {
        self.spans.push(ErrorSpan::with_detail(operation, detail));
        self
    }

    pub fn with_source<E: std::error::Error + Send + Sync + 'static>(mut self, source: E) -> Self {
        self.source = Some(Box::new(source));
        self
    }

    pub fn status_code(&self) -> u16 {
        self.status.status_code()
    }

    pub fn error_code(&self) -> &'static str {
        self.status.error_code()
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn spans(&self) -> &[ErrorSpan] {
        &self.spans
    }
}

// =========================================================
// Display & Error trait 实现
// =========================================================

impl fmt::Display for RelayError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.error_code(), self.message)?;

        if !self.spans.is_empty() {
            write!(f, " | trace: ")?;
            for (i, span) in self.spans.iter().enumerate() {
                if i > 0 {
                    write!(f, " -> ")?;
                }
                write!(f, "{}", span.operation)?;
                if let Some(detail) = &span.detail {
                    write!(f, "({})", detail)?;
                }
            }
        }
        Ok(())
    }
}

impl std::error::Error for RelayError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.source
            .as_ref()
            .map(|e| e.as_ref() as &(dyn std::error::Error + 'static))
    }
}

pub type RelayResult<T> = std::result::Result<T, RelayError>;

// =========================================================
// 传输用错误类型
// =========================================================

/// 写入日志的结构化错误
///
/// 客户端只看到固定的失败文本，完整的状态与追踪栈以 JSON 形式记录。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub status: RelayErrorStatus,
    pub message: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub spans: Vec<ErrorSpan>,
}

impl ErrorResponse {
    pub fn status_code(&self) -> u16 {
        self.status.status_code()
    }

    pub fn error_code(&self) -> &'static str {
        self.status.error_code()
    }
}

impl From<RelayError> for ErrorResponse {
    fn from(e: RelayError) -> Self {
        Self {
            status: e.status,
            message: e.message,
            spans: e.spans,
        }
    }
}

impl From<worker::Error> for RelayError {
    fn from(e: worker::Error) -> Self {
        RelayError::external_api(e.to_string())
    }
}

impl From<serde_json::Error> for RelayError {
    fn from(e: serde_json::Error) -> Self {
        RelayError::serialization(e.to_string()).with_source(e)
    }
}

impl From<JsValue> for RelayError {
    fn from(e: JsValue) -> Self {
        let msg = e.as_string().unwrap_or_else(|| format!("{:?}", e));
        RelayError::external_api(msg)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_includes_trace() {
        let err = RelayError::external_api("HTTP 401")
            .in_op("mail.send")
            .in_op_with("relay.email", "ana@finca.co");
        assert_eq!(
            err.to_string(),
            "[UPSTREAM_ERROR] HTTP 401 | trace: mail.send -> relay.email(ana@finca.co)"
        );
    }

    #[test]
    fn response_keeps_status_and_spans() {
        let response = ErrorResponse::from(RelayError::config("SMS_ENDPOINT is not set").in_op("sms.send"));
        assert_eq!(response.status_code(), 500);
        assert_eq!(response.error_code(), "MISSING_CONFIG");

        let json = serde_json::to_value(&response).unwrap();
        assert_eq!(json["status"], "Config");
        assert_eq!(json["spans"][0]["operation"], "sms.send");
        assert!(json["spans"][0].get("detail").is_none());
    }
}
