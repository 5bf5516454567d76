//! 翻译管道模块
//!
//! 文本收集与批次切分

pub mod batch;
pub mod collector;

// 重新导出主要类型
pub use batch::{chunk, plan_batches, Batch};
pub use collector::{CollectionStats, CollectorConfig, TextCollector, TextUnit};
