//! 统一的环境变量管理系统
//!
//! 类型安全、可验证的环境变量访问

use std::env;
use std::fmt;
use std::time::Duration;

/// 环境变量解析错误
#[derive(Debug, Clone)]
pub struct EnvError {
    pub variable: String,
    pub message: String,
}

impl fmt::Display for EnvError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Environment variable '{}': {}", self.variable, self.message)
    }
}

impl std::error::Error for EnvError {}

pub type EnvResult<T> = Result<T, EnvError>;

/// 环境变量访问器特性
pub trait EnvVar<T> {
    const NAME: &'static str;
    const DEFAULT: Option<T>;
    const DESCRIPTION: &'static str;

    fn parse(value: &str) -> EnvResult<T>;

    fn get() -> EnvResult<T> {
        match env::var(Self::NAME) {
            Ok(value) => Self::parse(&value),
            Err(_) => match Self::DEFAULT {
                Some(default) => Ok(default),
                None => Err(not_set(Self::NAME)),
            },
        }
    }

    /// 变量已设置时才返回值；设置了但无效时记录警告并忽略
    fn get_if_set() -> Option<T> {
        let value = env::var(Self::NAME).ok()?;
        match Self::parse(&value) {
            Ok(parsed) => Some(parsed),
            Err(e) => {
                tracing::warn!("忽略无效的环境变量: {}", e);
                None
            }
        }
    }
}

/// 核心环境变量定义
pub mod core {
    use super::*;

    /// 日志级别
    pub struct LogLevel;
    impl EnvVar<String> for LogLevel {
        const NAME: &'static str = "PAGE_TRANSLATOR_LOG_LEVEL";
        const DEFAULT: Option<String> = None;
        const DESCRIPTION: &'static str = "Log level: trace, debug, info, warn, error";

        fn get() -> EnvResult<String> {
            match env::var(Self::NAME) {
                Ok(value) => Self::parse(&value),
                Err(_) => Ok("info".to_string()),
            }
        }

        fn parse(value: &str) -> EnvResult<String> {
            match value.to_lowercase().as_str() {
                "trace" | "debug" | "info" | "warn" | "error" => Ok(value.to_lowercase()),
                _ => Err(EnvError {
                    variable: Self::NAME.to_string(),
                    message: format!(
                        "Invalid log level '{}'. Use: trace, debug, info, warn, error",
                        value
                    ),
                }),
            }
        }
    }
}

/// 翻译相关环境变量
pub mod translation {
    use super::*;

    /// 目标语言
    pub struct TargetLang;
    impl EnvVar<String> for TargetLang {
        const NAME: &'static str = "PAGE_TRANSLATOR_TARGET_LANG";
        const DEFAULT: Option<String> = None;
        const DESCRIPTION: &'static str = "Target language tag (e.g. es, fr, zh-TW)";

        fn parse(value: &str) -> EnvResult<String> {
            parse_language_tag(value, Self::NAME, false)
        }
    }

    /// 源语言
    pub struct SourceLang;
    impl EnvVar<String> for SourceLang {
        const NAME: &'static str = "PAGE_TRANSLATOR_SOURCE_LANG";
        const DEFAULT: Option<String> = None;
        const DESCRIPTION: &'static str = "Source language tag ('auto' lets the provider detect it)";

        fn get() -> EnvResult<String> {
            match env::var(Self::NAME) {
                Ok(value) => Self::parse(&value),
                Err(_) => Ok("auto".to_string()),
            }
        }

        fn parse(value: &str) -> EnvResult<String> {
            parse_language_tag(value, Self::NAME, true)
        }
    }

    /// 翻译服务商
    pub struct Provider;
    impl EnvVar<String> for Provider {
        const NAME: &'static str = "PAGE_TRANSLATOR_PROVIDER";
        const DEFAULT: Option<String> = None;
        const DESCRIPTION: &'static str = "Translation provider: google, deeplx";

        fn parse(value: &str) -> EnvResult<String> {
            match value.trim().to_lowercase().as_str() {
                "google" => Ok("google".to_string()),
                "deeplx" => Ok("deeplx".to_string()),
                _ => Err(EnvError {
                    variable: Self::NAME.to_string(),
                    message: format!("Unknown provider '{}'. Use: google, deeplx", value),
                }),
            }
        }
    }

    /// API URL
    pub struct ApiUrl;
    impl EnvVar<String> for ApiUrl {
        const NAME: &'static str = "PAGE_TRANSLATOR_API_URL";
        const DEFAULT: Option<String> = None;
        const DESCRIPTION: &'static str = "Translation API endpoint URL";

        fn parse(value: &str) -> EnvResult<String> {
            let url = value.trim();
            if url.starts_with("http://") || url.starts_with("https://") {
                Ok(url.to_string())
            } else {
                Err(EnvError {
                    variable: Self::NAME.to_string(),
                    message: "API URL must start with http:// or https://".to_string(),
                })
            }
        }
    }

    /// Google Cloud Translation API 密钥
    pub struct ApiKey;
    impl EnvVar<String> for ApiKey {
        const NAME: &'static str = "GOOGLE_TRANSLATE_API_KEY";
        const DEFAULT: Option<String> = None;
        const DESCRIPTION: &'static str =
            "Google Cloud Translation API key (VITE_GOOGLE_TRANSLATE_API_KEY is accepted as a fallback)";

        fn get() -> EnvResult<String> {
            env::var(Self::NAME)
                .or_else(|_| env::var(LEGACY_API_KEY))
                .map_err(|_| not_set(Self::NAME))
                .and_then(|value| Self::parse(&value))
        }

        fn get_if_set() -> Option<String> {
            Self::get().ok()
        }

        fn parse(value: &str) -> EnvResult<String> {
            let key = value.trim();
            if key.is_empty() {
                return Err(EnvError {
                    variable: Self::NAME.to_string(),
                    message: "API key must not be empty".to_string(),
                });
            }
            Ok(key.to_string())
        }
    }

    pub const LEGACY_API_KEY: &str = "VITE_GOOGLE_TRANSLATE_API_KEY";

    /// 每批最多文本段数
    pub struct BatchSize;
    impl EnvVar<usize> for BatchSize {
        const NAME: &'static str = "PAGE_TRANSLATOR_BATCH_SIZE";
        const DEFAULT: Option<usize> = Some(128);
        const DESCRIPTION: &'static str = "Maximum text segments per provider request";

        fn parse(value: &str) -> EnvResult<usize> {
            parse_positive_usize(value, Self::NAME, 1, 1024)
        }
    }

    /// 并发批次数
    pub struct MaxConcurrentBatches;
    impl EnvVar<usize> for MaxConcurrentBatches {
        const NAME: &'static str = "PAGE_TRANSLATOR_MAX_CONCURRENT_BATCHES";
        const DEFAULT: Option<usize> = Some(4);
        const DESCRIPTION: &'static str = "Batches in flight at once when dispatching concurrently";

        fn parse(value: &str) -> EnvResult<usize> {
            parse_positive_usize(value, Self::NAME, 1, 64)
        }
    }

    /// 单次请求超时
    pub struct RequestTimeout;
    impl EnvVar<Duration> for RequestTimeout {
        const NAME: &'static str = "PAGE_TRANSLATOR_REQUEST_TIMEOUT";
        const DEFAULT: Option<Duration> = Some(Duration::from_secs(30));
        const DESCRIPTION: &'static str = "Per-batch request timeout in seconds";

        fn parse(value: &str) -> EnvResult<Duration> {
            let seconds = parse_positive_usize(value, Self::NAME, 1, 300)?;
            Ok(Duration::from_secs(seconds as u64))
        }
    }
}

/// 辅助函数
fn not_set(name: &str) -> EnvError {
    EnvError {
        variable: name.to_string(),
        message: "Required environment variable not set".to_string(),
    }
}

fn parse_language_tag(value: &str, var_name: &str, allow_auto: bool) -> EnvResult<String> {
    let tag = value.trim();
    if allow_auto && tag.eq_ignore_ascii_case("auto") {
        return Ok("auto".to_string());
    }

    let valid = !tag.is_empty()
        && tag.len() <= 16
        && tag.split('-').all(|part| !part.is_empty() && part.chars().all(|c| c.is_ascii_alphanumeric()));
    if valid {
        Ok(tag.to_string())
    } else {
        Err(EnvError {
            variable: var_name.to_string(),
            message: format!("Invalid language tag '{}'", value),
        })
    }
}

fn parse_positive_usize(value: &str, var_name: &str, min: usize, max: usize) -> EnvResult<usize> {
    let num: usize = value.trim().parse().map_err(|_| EnvError {
        variable: var_name.to_string(),
        message: "Must be a valid positive number".to_string(),
    })?;

    if num < min {
        return Err(EnvError {
            variable: var_name.to_string(),
            message: format!("Value {} is below minimum {}", num, min),
        });
    }

    if num > max {
        return Err(EnvError {
            variable: var_name.to_string(),
            message: format!("Value {} exceeds maximum {}", num, max),
        });
    }

    Ok(num)
}

/// 环境变量文档生成器
pub fn generate_env_docs() -> String {
    let mut docs = String::new();
    docs.push_str("# Environment Variables\n\n");

    let entries: [(&str, &str); 9] = [
        (core::LogLevel::NAME, core::LogLevel::DESCRIPTION),
        (translation::TargetLang::NAME, translation::TargetLang::DESCRIPTION),
        (translation::SourceLang::NAME, translation::SourceLang::DESCRIPTION),
        (translation::Provider::NAME, translation::Provider::DESCRIPTION),
        (translation::ApiUrl::NAME, translation::ApiUrl::DESCRIPTION),
        (translation::ApiKey::NAME, translation::ApiKey::DESCRIPTION),
        (translation::BatchSize::NAME, translation::BatchSize::DESCRIPTION),
        (
            translation::MaxConcurrentBatches::NAME,
            translation::MaxConcurrentBatches::DESCRIPTION,
        ),
        (translation::RequestTimeout::NAME, translation::RequestTimeout::DESCRIPTION),
    ];
    for (name, description) in entries {
        docs.push_str(&format!("- `{}`: {}\n", name, description));
    }

    docs
}
