use std::fmt;

use serde::{Deserialize, Serialize};

// =========================================================
// 错误状态枚举
// =========================================================

/// 错误状态枚举
/// 包含错误对应的语义（状态码）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ErrorStatus {
    /// 404: 资源未找到（根元素缺失、路由未注册、档案不存在）
    NotFound,
    /// 400: 输入校验失败（重复路径、非法主题名）
    InvalidInput,
    /// 401: 会话失效或凭据错误
    Unauthorized,
    /// 422: 数据文件或响应体无法解析
    Parse,
    /// 502: 网络请求失败或返回非 2xx
    Fetch,
    /// 500: 功能模块挂载失败
    Mount,
    /// 500: 功能模块卸载失败
    Unmount,
    /// 500: 本地存储或文档库读写失败
    Store,
    /// 500: 浏览器 API 调用失败（下载、DOM 操作）
    Browser,
}

impl ErrorStatus {
    pub fn status_code(&self) -> u16 {
        match self {
            ErrorStatus::InvalidInput => 400,
            ErrorStatus::Unauthorized => 401,
            ErrorStatus::NotFound => 404,
            ErrorStatus::Parse => 422,
            ErrorStatus::Mount
            | ErrorStatus::Unmount
            | ErrorStatus::Store
            | ErrorStatus::Browser => 500,
            ErrorStatus::Fetch => 502,
        }
    }

    pub fn error_code(&self) -> &'static str {
        match self {
            ErrorStatus::NotFound => "RESOURCE_NOT_FOUND",
            ErrorStatus::InvalidInput => "INVALID_INPUT",
            ErrorStatus::Unauthorized => "UNAUTHORIZED",
            ErrorStatus::Parse => "PARSE_ERROR",
            ErrorStatus::Fetch => "FETCH_ERROR",
            ErrorStatus::Mount => "MOUNT_FAILED",
            ErrorStatus::Unmount => "UNMOUNT_FAILED",
            ErrorStatus::Store => "STORE_ERROR",
            ErrorStatus::Browser => "BROWSER_API_ERROR",
        }
    }
}

// =========================================================
// 错误上下文追踪
// =========================================================

/// 结构化的错误追踪片段
/// 记录错误发生时的操作和相关细节
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorSpan {
    /// 操作名称，如 "repository.fetch", "router.mount"
    pub operation: String,
    /// 额外的细节信息，如数据文件名、路由路径等
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

/// 内核错误
///
/// - status: 错误类型/语义
/// - message: 错误消息
/// - source: 原始错误（可选，用于错误链）
/// - spans: 结构化的调用追踪栈
#[derive(Debug)]
pub struct AppError {
    pub status: ErrorStatus,
    pub message: String,
    source: Option<Box<dyn std::error::Error + Send + Sync>>,
    spans: Vec<ErrorSpan>,
}

impl AppError {
    pub fn new(status: ErrorStatus, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
            source: None,
            spans: Vec::new(),
        }
    }

    // --- Convenience constructors ---

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(ErrorStatus::NotFound, message)
    }

    pub fn invalid_input(message: impl Into<String>) -> Self {
        Self::new(ErrorStatus::InvalidInput, message)
    }

    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::new(ErrorStatus::Unauthorized, message)
    }

    pub fn parse(message: impl Into<String>) -> Self {
        Self::new(ErrorStatus::Parse, message)
    }

    pub fn fetch(message: impl Into<String>) -> Self {
        Self::new(ErrorStatus::Fetch, message)
    }

    pub fn mount(message: impl Into<String>) -> Self {
        Self::new(ErrorStatus::Mount, message)
    }

    pub fn unmount(message: impl Into<String>) -> Self {
        Self::new(ErrorStatus::Unmount, message)
    }

    pub fn browser(message: impl Into<String>) -> Self {
        Self::new(ErrorStatus::Browser, message)
    }

    pub fn store(message: impl Into<String>) -> Self {
        Self::new(ErrorStatus::Store, message)
    }

    // --- Context builders (Builder Pattern) ---

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

    /// 设置原始错误源
    pub fn with_source<E: std::error::Error + Send + Sync + 'static>(mut self, source: E) -> Self {
        self.source = Some(Box::new(source));
        self
    }

    /// 复制状态、消息与追踪栈（原始错误源不可复制，会被丢弃）
    ///
    /// 共享的进行中请求把同一个错误交给多个等待者时使用。
    pub fn duplicate(&self) -> Self {
        Self {
            status: self.status,
            message: self.message.clone(),
            source: None,
            spans: self.spans.clone(),
        }
    }

    // --- Accessors ---

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

impl fmt::Display for AppError {
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

impl std::error::Error for AppError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.source
            .as_ref()
            .map(|e| e.as_ref() as &(dyn std::error::Error + 'static))
    }
}

pub type AppResult<T> = std::result::Result<T, AppError>;

// =========================================================
// 类型转换实现
// =========================================================

impl From<serde_json::Error> for AppError {
    fn from(e: serde_json::Error) -> Self {
        AppError::parse(e.to_string()).with_source(e)
    }
}

impl From<sigpa_shared::validation::ValidationError> for AppError {
    fn from(e: sigpa_shared::validation::ValidationError) -> Self {
        AppError::invalid_input(e.message()).with_source(e)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_includes_trace() {
        let err = AppError::fetch("HTTP 404")
            .in_op_with("repository.fetch", "home")
            .in_op("router.mount");
        assert_eq!(
            err.to_string(),
            "[FETCH_ERROR] HTTP 404 | trace: repository.fetch(home) -> router.mount"
        );
        assert_eq!(err.status_code(), 502);
    }

    #[test]
    fn duplicate_keeps_everything_but_source() {
        let parse_err = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
        let err = AppError::from(parse_err).in_op("repository.parse");
        assert!(std::error::Error::source(&err).is_some());

        let copy = err.duplicate();
        assert_eq!(copy.status, ErrorStatus::Parse);
        assert_eq!(copy.message(), err.message());
        assert_eq!(copy.spans(), err.spans());
        assert!(std::error::Error::source(&copy).is_none());
    }
}
