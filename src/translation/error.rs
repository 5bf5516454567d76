//! 翻译模块统一错误处理
//!
//! 所有错误都在批次边界被捕获并记录，不会中断整个文档的翻译

use std::fmt;

use thiserror::Error;

/// 翻译错误类型
#[derive(Error, Debug, Clone, PartialEq)]
pub enum TranslationError {
    /// 配置错误
    #[error("配置错误: {0}")]
    Config(String),

    /// 输入验证错误
    #[error("输入无效: {0}")]
    InvalidInput(String),

    /// 网络错误或非成功状态码
    #[error("传输错误{}: {message}", status_suffix(.status))]
    Transport {
        status: Option<u16>,
        message: String,
    },

    /// 速率限制错误
    #[error("请求速率过快，已达到限制")]
    RateLimited,

    /// 响应体缺少译文列表或无法解析
    #[error("响应格式错误: {0}")]
    MalformedResponse(String),

    /// 译文数量与请求数量不一致
    #[error("译文数量不匹配: 期望 {expected}，得到 {actual}")]
    Alignment { expected: usize, actual: usize },

    /// 超时错误
    #[error("操作超时: {0}")]
    Timeout(String),

    /// IO错误
    #[error("IO错误: {0}")]
    Io(String),
}

fn status_suffix(status: &Option<u16>) -> String {
    match status {
        Some(code) => format!(" (HTTP {})", code),
        None => String::new(),
    }
}

impl TranslationError {
    /// 创建不带状态码的传输错误
    pub fn transport<T: fmt::Display>(msg: T) -> Self {
        TranslationError::Transport {
            status: None,
            message: msg.to_string(),
        }
    }

    /// 检查错误是否可重试
    pub fn is_retryable(&self) -> bool {
        match self {
            TranslationError::Transport { status, .. } => {
                // 4xx 除 408 外都是请求本身的问题
                !matches!(status, Some(code) if (400..500).contains(code) && *code != 408)
            }
            TranslationError::Timeout(_) => true,
            TranslationError::RateLimited => true,
            TranslationError::Config(_) => false,
            TranslationError::InvalidInput(_) => false,
            TranslationError::MalformedResponse(_) => false,
            TranslationError::Alignment { .. } => false,
            TranslationError::Io(_) => false,
        }
    }

    /// 获取错误的严重程度
    pub fn severity(&self) -> ErrorSeverity {
        match self {
            TranslationError::Config(_) => ErrorSeverity::Critical,
            TranslationError::InvalidInput(_) => ErrorSeverity::Info,
            TranslationError::Transport { .. } => ErrorSeverity::Warning,
            TranslationError::RateLimited => ErrorSeverity::Warning,
            TranslationError::Timeout(_) => ErrorSeverity::Warning,
            TranslationError::MalformedResponse(_) => ErrorSeverity::Error,
            TranslationError::Alignment { .. } => ErrorSeverity::Error,
            TranslationError::Io(_) => ErrorSeverity::Error,
        }
    }

    /// 获取错误类别
    pub fn category(&self) -> ErrorCategory {
        match self {
            TranslationError::Config(_) => ErrorCategory::Configuration,
            TranslationError::InvalidInput(_) => ErrorCategory::Input,
            TranslationError::Transport { .. } => ErrorCategory::Network,
            TranslationError::RateLimited => ErrorCategory::RateLimit,
            TranslationError::Timeout(_) => ErrorCategory::Timeout,
            TranslationError::MalformedResponse(_) => ErrorCategory::Parsing,
            TranslationError::Alignment { .. } => ErrorCategory::Alignment,
            TranslationError::Io(_) => ErrorCategory::Io,
        }
    }
}

/// 错误严重程度
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ErrorSeverity {
    Info,
    Warning,
    Error,
    Critical,
}

/// 错误类别
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCategory {
    Configuration,
    Input,
    Network,
    RateLimit,
    Timeout,
    Parsing,
    Alignment,
    Io,
}

impl From<std::io::Error> for TranslationError {
    fn from(error: std::io::Error) -> Self {
        TranslationError::Io(error.to_string())
    }
}

impl From<serde_json::Error> for TranslationError {
    fn from(error: serde_json::Error) -> Self {
        TranslationError::MalformedResponse(format!("JSON解析错误: {}", error))
    }
}

impl From<toml::de::Error> for TranslationError {
    fn from(error: toml::de::Error) -> Self {
        TranslationError::Config(format!("TOML解析错误: {}", error))
    }
}

impl From<reqwest::Error> for TranslationError {
    fn from(error: reqwest::Error) -> Self {
        if error.is_timeout() {
            TranslationError::Timeout(error.to_string())
        } else if error.is_decode() {
            TranslationError::MalformedResponse(error.to_string())
        } else {
            TranslationError::Transport {
                status: error.status().map(|s| s.as_u16()),
                message: error.to_string(),
            }
        }
    }
}

impl From<tokio::time::error::Elapsed> for TranslationError {
    fn from(error: tokio::time::error::Elapsed) -> Self {
        TranslationError::Timeout(format!("异步操作超时: {}", error))
    }
}

/// 错误结果类型别名
pub type TranslationResult<T> = Result<T, TranslationError>;

/// 按严重程度记录批次错误
pub fn log_batch_error(batch_number: usize, error: &TranslationError) {
    match error.severity() {
        ErrorSeverity::Info => tracing::info!(batch = batch_number, "批次 {} 未翻译: {}", batch_number, error),
        ErrorSeverity::Warning => tracing::warn!(batch = batch_number, "批次 {} 翻译失败: {}", batch_number, error),
        ErrorSeverity::Error | ErrorSeverity::Critical => {
            tracing::error!(batch = batch_number, "批次 {} 翻译失败: {}", batch_number, error)
        }
    }
}
