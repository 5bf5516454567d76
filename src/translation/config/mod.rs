//! 翻译配置管理模块
//!
//! 提供简化的配置管理，支持环境变量、配置文件和默认值

pub mod manager;

// 重新导出主要类型
pub use manager::{ConfigManager, DispatchMode, ProviderKind, TranslationConfig};

/// 配置常量
pub mod constants {
    use std::time::Duration;

    // 服务商单次请求最多接受的文本段数
    pub const MAX_SEGMENTS: usize = 128;
    pub const DEFAULT_MAX_CONCURRENT_BATCHES: usize = 4;

    // 默认API设置
    pub const GOOGLE_API_URL: &str = "https://translation.googleapis.com/language/translate/v2";
    pub const DEEPLX_API_URL: &str = "http://localhost:1188/translate";
    pub const DEFAULT_TARGET_LANG: &str = "es";
    pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

    // 重试
    pub const DEFAULT_MAX_RETRY_ATTEMPTS: usize = 3;
    pub const DEFAULT_RETRY_DELAY_MS: u64 = 500;

    // 不进入的元素
    pub const SKIP_ELEMENTS: &[&str] = &["head", "script", "style", "noscript", "template"];

    // 配置文件搜索路径
    pub const CONFIG_PATHS: &[&str] = &[
        "page-translator.toml",
        ".page-translator.toml",
        "~/.config/page-translator/config.toml",
        "/etc/page-translator/config.toml",
    ];

    pub const ENV_FILES: &[&str] = &[".env.local", ".env"];
}
