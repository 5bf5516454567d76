//! 宿主文档抽象
//!
//! 翻译管道只通过 [`DocumentTree`] 访问文档：按文档顺序枚举子节点、
//! 读取文本叶子、以及原地改写文本叶子。管道从不创建或删除节点。

use markup5ever_rcdom::{Handle, NodeData, RcDom};

use crate::parsers::html::{get_charset, get_node_name, html_to_dom, serialize_document};
use crate::translation::error::TranslationResult;

/// 可遍历、可原地改写文本的文档树
pub trait DocumentTree {
    /// 指向树中某个节点的稳定句柄
    type Node: Clone;

    /// 文档根节点
    fn root(&self) -> Self::Node;

    /// 按文档顺序返回子节点
    fn children(&self, node: &Self::Node) -> Vec<Self::Node>;

    /// 文本叶子返回其内容，其他节点返回 `None`
    fn text(&self, node: &Self::Node) -> Option<String>;

    /// 元素节点的标签名
    fn element_name(&self, node: &Self::Node) -> Option<String>;

    /// 改写文本叶子的内容；句柄不是文本叶子时返回 `false` 且不做任何修改
    fn set_text(&mut self, node: &Self::Node, value: &str) -> bool;
}

/// 基于 html5ever `RcDom` 的HTML文档
pub struct HtmlDocument {
    dom: RcDom,
    encoding: String,
}

impl HtmlDocument {
    /// 解析HTML字节
    ///
    /// 未指定字符集时使用文档 `<meta>` 中声明的字符集，都没有则为 UTF-8
    pub fn parse(data: &[u8], encoding: Option<&str>) -> TranslationResult<Self> {
        let mut dom = html_to_dom(data, encoding.unwrap_or(""))?;
        let mut document_encoding = encoding.unwrap_or("").to_string();

        if encoding.is_none() {
            if let Some(charset) = get_charset(&dom.document) {
                if !charset.eq_ignore_ascii_case("utf-8") {
                    tracing::debug!("按文档声明的字符集重新解析: {}", charset);
                    dom = html_to_dom(data, &charset)?;
                }
                document_encoding = charset;
            }
        }

        Ok(Self {
            dom,
            encoding: document_encoding,
        })
    }

    pub fn encoding(&self) -> &str {
        &self.encoding
    }

    /// 按解析时的字符集序列化
    pub fn serialize(&self) -> TranslationResult<Vec<u8>> {
        Ok(serialize_document(&self.dom.document, &self.encoding)?)
    }
}

impl DocumentTree for HtmlDocument {
    type Node = Handle;

    fn root(&self) -> Handle {
        self.dom.document.clone()
    }

    fn children(&self, node: &Handle) -> Vec<Handle> {
        node.children.borrow().iter().cloned().collect()
    }

    fn text(&self, node: &Handle) -> Option<String> {
        match &node.data {
            NodeData::Text { contents } => Some(contents.borrow().to_string()),
            _ => None,
        }
    }

    fn element_name(&self, node: &Handle) -> Option<String> {
        get_node_name(node).map(str::to_string)
    }

    fn set_text(&mut self, node: &Handle, value: &str) -> bool {
        if let NodeData::Text { contents } = &node.data {
            *contents.borrow_mut() = value.into();
            true
        } else {
            false
        }
    }
}
