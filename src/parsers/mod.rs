//! # 解析器模块
//!
//! HTML文档解析、DOM查询与序列化

pub mod html;

// Re-export commonly used items for convenience
pub use html::{get_charset, html_to_dom, serialize_document};
