//! HTML解析和处理模块
//!
//! - `dom`: 解析和基础DOM查询
//! - `serializer`: 序列化功能

pub mod dom;
pub mod serializer;

pub use dom::{find_nodes, get_charset, get_node_attr, get_node_name, html_to_dom};
pub use serializer::serialize_document;
