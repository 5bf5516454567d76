//! 批次结果写回
//!
//! 按位置把译文写回文本单元所在的节点。只改文本内容，不增删节点、不动属性。

use crate::translation::document::DocumentTree;
use crate::translation::error::{TranslationError, TranslationResult};
use crate::translation::pipeline::collector::TextUnit;

/// 把一个批次的译文写回文档
pub struct BatchResultWriter;

impl BatchResultWriter {
    /// 将 `translations[j]` 写入 `units[j]`，返回写入的单元数
    ///
    /// 数量不一致时不写入任何内容，返回 [`TranslationError::Alignment`]。
    /// 对同一组 `(units, translations)` 重复调用得到相同的结果。
    pub fn apply<T: DocumentTree>(
        tree: &mut T,
        units: &[TextUnit<T::Node>],
        translations: &[String],
    ) -> TranslationResult<usize> {
        if units.len() != translations.len() {
            return Err(TranslationError::Alignment {
                expected: units.len(),
                actual: translations.len(),
            });
        }

        let mut written = 0;
        for (unit, translated) in units.iter().zip(translations) {
            if tree.set_text(&unit.node, translated) {
                written += 1;
            } else {
                // 句柄来自同一次收集，正常情况下不会发生
                tracing::warn!("文本单元已不是文本节点，跳过: {:?}", unit.original_value);
            }
        }

        Ok(written)
    }
}
