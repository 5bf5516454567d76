//! # Page Translator Library
//!
//! 把整张 HTML 页面的文本节点批量送往远程翻译服务，并原位写回译文。
//!
//! ## 模块组织
//!
//! - `translation` - 收集、批次、调度与写回
//! - `parsers` - HTML 解析与序列化
//! - `env` - 类型化的环境变量

pub mod env;
pub mod parsers;
pub mod translation;

pub use translation::{
    translate_html, HtmlDocument, TranslationConfig, TranslationError, TranslationReport, TranslationResult,
    TranslationService,
};
