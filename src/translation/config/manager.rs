//! 简化的配置管理器
//!
//! 提供统一的配置接口，支持文件配置、环境变量和默认值

use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use super::constants;
use crate::translation::error::{TranslationError, TranslationResult};

/// 翻译服务商
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ProviderKind {
    /// Google Cloud Translation v2
    #[default]
    Google,
    /// 本地 DeepLX 服务
    DeepLx,
}

impl std::str::FromStr for ProviderKind {
    type Err = TranslationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "google" => Ok(ProviderKind::Google),
            "deeplx" => Ok(ProviderKind::DeepLx),
            other => Err(TranslationError::Config(format!("未知的翻译服务商: {}", other))),
        }
    }
}

/// 批次调度方式
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DispatchMode {
    /// 逐批处理，上一批写回完成后才发出下一批
    #[default]
    Sequential,
    /// 最多 `max_concurrent_batches` 个批次同时在途
    Concurrent,
}

/// 翻译配置
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct TranslationConfig {
    // 基础配置
    pub target_lang: String,
    pub source_lang: String,
    pub provider: ProviderKind,
    pub api_url: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,

    // 批次配置
    pub batch_size: usize,
    pub dispatch_mode: DispatchMode,
    pub max_concurrent_batches: usize,
    pub request_timeout_secs: u64,

    // 重试
    pub retry_enabled: bool,
    pub max_retry_attempts: usize,
    pub retry_delay_ms: u64,

    // 收集
    pub skip_elements: Vec<String>,
}

impl Default for TranslationConfig {
    fn default() -> Self {
        Self {
            target_lang: constants::DEFAULT_TARGET_LANG.to_string(),
            source_lang: "auto".to_string(),
            provider: ProviderKind::Google,
            api_url: constants::GOOGLE_API_URL.to_string(),
            api_key: None,

            batch_size: constants::MAX_SEGMENTS,
            dispatch_mode: DispatchMode::Sequential,
            max_concurrent_batches: constants::DEFAULT_MAX_CONCURRENT_BATCHES,
            request_timeout_secs: constants::DEFAULT_REQUEST_TIMEOUT.as_secs(),

            retry_enabled: false,
            max_retry_attempts: constants::DEFAULT_MAX_RETRY_ATTEMPTS,
            retry_delay_ms: constants::DEFAULT_RETRY_DELAY_MS,

            skip_elements: constants::SKIP_ELEMENTS
                .iter()
                .map(|s| s.to_string())
                .collect(),
        }
    }
}

impl TranslationConfig {
    /// 创建带指定语言的默认配置
    pub fn default_with_lang(target_lang: &str, api_url: Option<&str>) -> Self {
        let mut config = Self::default();
        config.target_lang = target_lang.to_string();
        if let Some(url) = api_url {
            config.api_url = url.to_string();
        }
        config
    }

    /// 切换服务商；API地址仍为另一服务商的默认值时一并切换
    pub fn set_provider(&mut self, provider: ProviderKind) {
        let default_url = |kind: ProviderKind| match kind {
            ProviderKind::Google => constants::GOOGLE_API_URL,
            ProviderKind::DeepLx => constants::DEEPLX_API_URL,
        };
        if self.api_url == default_url(self.provider) {
            self.api_url = default_url(provider).to_string();
        }
        self.provider = provider;
    }

    /// 源语言，`auto` 表示交给服务商识别
    pub fn source_language(&self) -> Option<&str> {
        let lang = self.source_lang.trim();
        if lang.is_empty() || lang.eq_ignore_ascii_case("auto") {
            None
        } else {
            Some(lang)
        }
    }

    /// 验证配置
    pub fn validate(&self) -> TranslationResult<()> {
        self.validate_limits()?;

        let url = url::Url::parse(&self.api_url)
            .map_err(|e| TranslationError::Config(format!("API地址无效 '{}': {}", self.api_url, e)))?;
        if url.scheme() != "http" && url.scheme() != "https" {
            return Err(TranslationError::Config(format!(
                "API地址必须使用 http 或 https: {}",
                self.api_url
            )));
        }

        if self.provider == ProviderKind::Google
            && self.api_key.as_deref().map_or(true, |k| k.trim().is_empty())
        {
            return Err(TranslationError::Config(
                "Google 翻译需要 API 密钥 (GOOGLE_TRANSLATE_API_KEY)".to_string(),
            ));
        }

        Ok(())
    }

    /// 只验证与服务商无关的部分
    pub fn validate_limits(&self) -> TranslationResult<()> {
        if self.target_lang.trim().is_empty() {
            return Err(TranslationError::Config("目标语言不能为空".to_string()));
        }

        if self.batch_size == 0 {
            return Err(TranslationError::Config("批次大小不能为0".to_string()));
        }

        if self.max_concurrent_batches == 0 {
            return Err(TranslationError::Config("最大并发数不能为0".to_string()));
        }

        if self.request_timeout_secs == 0 {
            return Err(TranslationError::Config("请求超时不能为0".to_string()));
        }

        Ok(())
    }

    /// 应用环境变量覆盖
    pub fn apply_env_overrides(&mut self) {
        use crate::env::{translation, EnvVar};

        if let Some(target_lang) = translation::TargetLang::get_if_set() {
            self.target_lang = target_lang;
        }

        if let Some(source_lang) = translation::SourceLang::get_if_set() {
            self.source_lang = source_lang;
        }

        if let Some(provider) = translation::Provider::get_if_set() {
            if let Ok(kind) = provider.parse::<ProviderKind>() {
                self.set_provider(kind);
            }
        }

        if let Some(api_url) = translation::ApiUrl::get_if_set() {
            self.api_url = api_url;
            tracing::info!("环境变量覆盖 API URL: {}", self.api_url);
        }

        if let Some(api_key) = translation::ApiKey::get_if_set() {
            self.api_key = Some(api_key);
        }

        if let Some(batch_size) = translation::BatchSize::get_if_set() {
            self.batch_size = batch_size;
        }

        if let Some(max_concurrent) = translation::MaxConcurrentBatches::get_if_set() {
            self.max_concurrent_batches = max_concurrent;
        }

        if let Some(timeout) = translation::RequestTimeout::get_if_set() {
            self.request_timeout_secs = timeout.as_secs();
        }
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn retry_delay(&self) -> Duration {
        Duration::from_millis(self.retry_delay_ms)
    }
}

/// 配置管理器
pub struct ConfigManager {
    config: TranslationConfig,
    source: Option<String>,
}

impl ConfigManager {
    /// 加载 `.env`、第一个存在的配置文件和环境变量，不做验证
    ///
    /// 验证留给调用方在应用命令行参数之后进行
    pub fn new() -> TranslationResult<Self> {
        Self::load_dotenv();

        let (mut config, source) = match Self::find_config_file() {
            Some(path) => {
                tracing::info!("加载配置文件: {}", path);
                (Self::load_from_file(&path)?, Some(path))
            }
            None => {
                tracing::debug!("未找到配置文件，使用默认配置");
                (TranslationConfig::default(), None)
            }
        };
        config.apply_env_overrides();

        Ok(Self { config, source })
    }

    /// 从指定文件加载，随后应用环境变量覆盖
    pub fn from_file(path: &str) -> TranslationResult<Self> {
        Self::load_dotenv();

        let mut config = Self::load_from_file(path)?;
        config.apply_env_overrides();

        Ok(Self {
            config,
            source: Some(path.to_string()),
        })
    }

    pub fn into_config(self) -> TranslationConfig {
        self.config
    }

    /// 配置来源文件
    pub fn source(&self) -> Option<&str> {
        self.source.as_deref()
    }

    fn find_config_file() -> Option<String> {
        constants::CONFIG_PATHS
            .iter()
            .map(|path| shellexpand::tilde(path).into_owned())
            .find(|path| Path::new(path).exists())
    }

    /// 从指定文件加载配置，`.json` 按 JSON 解析，其余按 TOML 解析
    pub fn load_from_file(path: &str) -> TranslationResult<TranslationConfig> {
        let expanded = shellexpand::tilde(path);
        let content = std::fs::read_to_string(expanded.as_ref())
            .map_err(|e| TranslationError::Config(format!("读取配置文件失败 {}: {}", path, e)))?;

        if expanded.ends_with(".json") {
            serde_json::from_str(&content)
                .map_err(|e| TranslationError::Config(format!("解析JSON配置失败: {}", e)))
        } else {
            Ok(toml::from_str(&content)?)
        }
    }

    /// 加载 .env 文件
    fn load_dotenv() {
        for env_file in constants::ENV_FILES {
            if Path::new(env_file).exists() && dotenv::from_filename(env_file).is_ok() {
                tracing::debug!("已加载环境变量文件: {}", env_file);
                break;
            }
        }
    }

    /// 生成示例配置文件
    pub fn generate_example_config(path: &str) -> TranslationResult<()> {
        let config = TranslationConfig::default();
        let content = toml::to_string_pretty(&config)
            .map_err(|e| TranslationError::Config(format!("序列化配置失败: {}", e)))?;

        std::fs::write(path, content)
            .map_err(|e| TranslationError::Config(format!("写入配置文件失败: {}", e)))?;

        Ok(())
    }
}
