//! 翻译批次模块
//!
//! 把按文档顺序排列的文本单元切分成不超过服务商单次请求上限的批次。
//! 文本序列和单元序列使用同一次切分，批次 *i* 的第 *j* 条文本永远对应
//! 批次 *i* 的第 *j* 个单元。

use crate::translation::error::{TranslationError, TranslationResult};
use crate::translation::pipeline::collector::TextUnit;

/// 将序列切分为最多 `max_size` 个元素的有序子序列
///
/// 边界落在 `max_size` 的整数倍处，最后一组可以更短。空输入得到空结果。
pub fn chunk<T>(items: Vec<T>, max_size: usize) -> TranslationResult<Vec<Vec<T>>> {
    if max_size == 0 {
        return Err(TranslationError::Config("批次大小不能为0".to_string()));
    }

    let mut chunks = Vec::with_capacity(items.len().div_ceil(max_size));
    let mut iter = items.into_iter().peekable();
    while iter.peek().is_some() {
        chunks.push(iter.by_ref().take(max_size).collect());
    }

    Ok(chunks)
}

/// 一个翻译批次
#[derive(Debug, Clone)]
pub struct Batch<N> {
    /// 批次序号（从0开始）
    pub index: usize,
    /// 批次内的文本单元
    pub units: Vec<TextUnit<N>>,
    /// 与 `units` 一一对应的待翻译文本
    pub texts: Vec<String>,
}

impl<N> Batch<N> {
    /// 用于日志的批次编号（从1开始）
    pub fn number(&self) -> usize {
        self.index + 1
    }

    /// 预估字符总数
    pub fn estimated_chars(&self) -> usize {
        self.units.iter().map(TextUnit::char_count).sum()
    }
}

/// 把全部文本单元切分为批次
pub fn plan_batches<N>(units: Vec<TextUnit<N>>, max_size: usize) -> TranslationResult<Vec<Batch<N>>> {
    let texts: Vec<String> = units.iter().map(|u| u.original_value.clone()).collect();

    let text_chunks = chunk(texts, max_size)?;
    let unit_chunks = chunk(units, max_size)?;
    debug_assert_eq!(text_chunks.len(), unit_chunks.len());

    let batches: Vec<Batch<N>> = text_chunks
        .into_iter()
        .zip(unit_chunks)
        .enumerate()
        .map(|(index, (texts, units))| Batch { index, units, texts })
        .collect();

    tracing::debug!("创建了 {} 个批次 (每批最多 {} 项)", batches.len(), max_size);

    Ok(batches)
}
