//! 翻译模块
//!
//! - **document**: 文档树抽象与 HTML 实现
//! - **pipeline**: 文本收集与批次切分
//! - **provider**: 远程翻译服务
//! - **core**: 调度、写回与对外服务
//! - **config**: 配置管理
//! - **error**: 错误处理
//!
//! # 基本用法
//!
//! ```rust,no_run
//! use page_translator::translation::{HtmlDocument, TranslationConfig, TranslationService};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let mut config = TranslationConfig::default_with_lang("es", None);
//! config.api_key = Some("my-key".to_string());
//! let service = TranslationService::new(config)?;
//!
//! let mut doc = HtmlDocument::parse(b"<p>Hello</p><p>World</p>", None)?;
//! let report = service.translate_document(&mut doc, "es").await?;
//! for failed in report.failed_batches() {
//!     eprintln!("batch {} failed", failed.index + 1);
//! }
//! let html = doc.serialize()?;
//! # let _ = html;
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod core;
pub mod document;
pub mod error;
pub mod pipeline;
pub mod provider;

pub use config::{ConfigManager, DispatchMode, ProviderKind, TranslationConfig};
pub use core::{BatchOutcome, BatchResultWriter, TranslationReport, TranslationService};
pub use document::{DocumentTree, HtmlDocument};
pub use error::{TranslationError, TranslationResult};
pub use pipeline::{chunk, plan_batches, Batch, TextCollector, TextUnit};
pub use provider::{TranslationProvider, TranslationRequest};

/// 解析 HTML、翻译并序列化，返回新的 HTML 和翻译报告
pub async fn translate_html(
    service: &TranslationService,
    html: &[u8],
    encoding: Option<&str>,
    target_language: &str,
) -> TranslationResult<(Vec<u8>, TranslationReport)> {
    let mut document = HtmlDocument::parse(html, encoding)?;
    let report = service.translate_document(&mut document, target_language).await?;
    Ok((document.serialize()?, report))
}
