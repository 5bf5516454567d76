//! 翻译服务商接口
//!
//! 服务商约定：按请求顺序返回与 `texts` 等长的译文列表。调度器按位置
//! 对应写回，所以不能保证顺序的服务商必须自己按索引重排（见 [`deeplx`]）。

use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::translation::config::{ProviderKind, TranslationConfig};
use crate::translation::error::{TranslationError, TranslationResult};

pub mod deeplx;
pub mod google;

pub use deeplx::DeepLxProvider;
pub use google::GoogleTranslateProvider;

/// 请求文本格式
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum TextFormat {
    /// 纯文本，线上格式为 `"text"`
    #[default]
    #[serde(rename = "text")]
    PlainText,
}

impl TextFormat {
    pub fn as_str(&self) -> &'static str {
        match self {
            TextFormat::PlainText => "text",
        }
    }
}

/// 一个批次的翻译请求
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TranslationRequest {
    pub texts: Vec<String>,
    pub target_language: String,
    pub source_language: Option<String>,
    pub format: TextFormat,
}

impl TranslationRequest {
    pub fn new(texts: Vec<String>, target_language: impl Into<String>) -> Self {
        Self {
            texts,
            target_language: target_language.into(),
            source_language: None,
            format: TextFormat::PlainText,
        }
    }

    pub fn with_source_language(mut self, source_language: Option<&str>) -> Self {
        self.source_language = source_language.map(str::to_string);
        self
    }

    pub fn len(&self) -> usize {
        self.texts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.texts.is_empty()
    }
}

/// 远程翻译服务
#[async_trait]
pub trait TranslationProvider: Send + Sync {
    /// 用于日志的服务商名称
    fn name(&self) -> &str;

    /// 翻译一个批次，返回与 `request.texts` 顺序一致的译文
    async fn translate_batch(&self, request: &TranslationRequest) -> TranslationResult<Vec<String>>;
}

/// 根据配置创建服务商
pub fn create_provider(config: &TranslationConfig) -> TranslationResult<Arc<dyn TranslationProvider>> {
    let client = reqwest::Client::builder()
        .timeout(config.request_timeout())
        .build()
        .map_err(|e| TranslationError::Config(format!("创建HTTP客户端失败: {}", e)))?;

    let provider: Arc<dyn TranslationProvider> = match config.provider {
        ProviderKind::Google => {
            let api_key = config
                .api_key
                .clone()
                .ok_or_else(|| TranslationError::Config("缺少 Google API 密钥".to_string()))?;
            Arc::new(GoogleTranslateProvider::new(client, &config.api_url, api_key)?)
        }
        ProviderKind::DeepLx => Arc::new(DeepLxProvider::new(client, &config.api_url)?),
    };

    tracing::debug!("使用翻译服务商: {} ({})", provider.name(), config.api_url);
    Ok(provider)
}

/// 读取非成功响应的错误信息
pub(crate) async fn error_from_response(response: reqwest::Response) -> TranslationError {
    let status = response.status();
    if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
        return TranslationError::RateLimited;
    }

    let body = response.text().await.unwrap_or_default();
    let message = serde_json::from_str::<serde_json::Value>(&body)
        .ok()
        .and_then(|v| v.pointer("/error/message").and_then(|m| m.as_str()).map(str::to_string))
        .unwrap_or_else(|| {
            let trimmed = body.trim();
            if trimmed.is_empty() {
                status.to_string()
            } else {
                trimmed.chars().take(200).collect()
            }
        });

    TranslationError::Transport {
        status: Some(status.as_u16()),
        message,
    }
}
