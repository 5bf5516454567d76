//! 文本收集器模块
//!
//! 深度优先（前序）遍历文档树，按文档顺序收集非空白的文本叶子

use crate::translation::config::constants;
use crate::translation::document::DocumentTree;

/// 一个可翻译的文本叶子及其在文档中的位置
#[derive(Debug, Clone)]
pub struct TextUnit<N> {
    /// 收集时的原始文本（未裁剪）
    pub original_value: String,
    /// 文本节点句柄
    pub node: N,
}

impl<N> TextUnit<N> {
    pub fn new(original_value: String, node: N) -> Self {
        Self {
            original_value,
            node,
        }
    }

    /// 获取文本字符数
    pub fn char_count(&self) -> usize {
        self.original_value.chars().count()
    }
}

/// 文本收集器配置
#[derive(Debug, Clone)]
pub struct CollectorConfig {
    /// 不进入的元素标签
    pub skip_elements: Vec<String>,
}

impl Default for CollectorConfig {
    fn default() -> Self {
        Self {
            skip_elements: constants::SKIP_ELEMENTS
                .iter()
                .map(|s| s.to_string())
                .collect(),
        }
    }
}

impl CollectorConfig {
    /// 不跳过任何元素
    pub fn unfiltered() -> Self {
        Self {
            skip_elements: Vec::new(),
        }
    }
}

/// 收集统计
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CollectionStats {
    pub nodes_visited: usize,
    pub text_nodes_found: usize,
    pub blank_texts_skipped: usize,
    pub elements_skipped: usize,
    pub units_collected: usize,
}

impl CollectionStats {
    pub fn reset(&mut self) {
        *self = Default::default();
    }
}

/// 文档文本收集器
pub struct TextCollector {
    config: CollectorConfig,
    stats: CollectionStats,
}

impl Default for TextCollector {
    fn default() -> Self {
        Self::new(CollectorConfig::default())
    }
}

impl TextCollector {
    /// 创建新的文本收集器
    pub fn new(config: CollectorConfig) -> Self {
        Self {
            config,
            stats: CollectionStats::default(),
        }
    }

    /// 收集以 `root` 为根的全部可翻译文本单元
    ///
    /// 只读操作。使用显式栈而非递归，子节点逆序入栈以保持前序顺序。
    pub fn collect<T: DocumentTree>(&mut self, tree: &T, root: &T::Node) -> Vec<TextUnit<T::Node>> {
        self.stats.reset();

        let mut units = Vec::new();
        let mut stack = vec![root.clone()];

        while let Some(node) = stack.pop() {
            self.stats.nodes_visited += 1;

            if let Some(text) = tree.text(&node) {
                self.stats.text_nodes_found += 1;
                if is_blank(&text) {
                    self.stats.blank_texts_skipped += 1;
                } else {
                    units.push(TextUnit::new(text, node));
                }
                continue;
            }

            if let Some(name) = tree.element_name(&node) {
                if self.should_skip_element(&name) {
                    self.stats.elements_skipped += 1;
                    continue;
                }
            }

            let mut children = tree.children(&node);
            children.reverse();
            stack.extend(children);
        }

        self.stats.units_collected = units.len();
        tracing::debug!(
            "文本收集完成: 访问 {} 个节点，收集 {} 个文本单元",
            self.stats.nodes_visited,
            units.len()
        );

        units
    }

    /// 从文档根节点开始收集
    pub fn collect_document<T: DocumentTree>(&mut self, tree: &T) -> Vec<TextUnit<T::Node>> {
        let root = tree.root();
        self.collect(tree, &root)
    }

    fn should_skip_element(&self, tag_name: &str) -> bool {
        self.config
            .skip_elements
            .iter()
            .any(|skip| skip.eq_ignore_ascii_case(tag_name))
    }

    pub fn config(&self) -> &CollectorConfig {
        &self.config
    }

    /// 最近一次收集的统计
    pub fn stats(&self) -> &CollectionStats {
        &self.stats
    }
}

/// 只含空白或字节序标记（U+FEFF）的文本不翻译
fn is_blank(text: &str) -> bool {
    text.trim_matches(|c: char| c.is_whitespace() || c == '\u{feff}').is_empty()
}
