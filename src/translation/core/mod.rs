//! 翻译系统核心模块
//!
//! - **服务层** (`service.rs`): 对外入口，收集、切分、汇总报告与统计
//! - **引擎层** (`engine.rs`): 逐批调度请求，超时与重试，批次失败隔离
//! - **写回** (`writer.rs`): 按位置把译文写回文本节点
//!
//! ```text
//! TranslationService (service.rs)
//!     ├── TextCollector (pipeline/collector.rs)
//!     ├── plan_batches (pipeline/batch.rs)
//!     └── TranslationEngine (engine.rs)
//!             ├── TranslationProvider (provider/)
//!             └── BatchResultWriter (writer.rs)
//! ```

pub mod engine;
pub mod service;
pub mod writer;

pub use engine::{BatchOutcome, EngineConfig, LanguagePair, RetryPolicy, TranslationEngine};
pub use service::{ServiceStats, ServiceStatsSnapshot, TranslationReport, TranslationService};
pub use writer::BatchResultWriter;
