//! 翻译服务
//!
//! 文档翻译的入口：收集文本单元，切分批次，交给引擎调度，最后汇总成
//! [`TranslationReport`]。批次失败只出现在报告里，不会让整个调用返回错误。
//!
//! ```rust,ignore
//! use page_translator::translation::{HtmlDocument, TranslationConfig, TranslationService};
//!
//! let service = TranslationService::new(config)?;
//! let mut doc = HtmlDocument::parse(html.as_bytes(), None)?;
//! let report = service.translate_document(&mut doc, "es").await?;
//! println!("{}/{} 个文本单元已翻译", report.units_translated(), report.units_collected);
//! ```

use std::sync::{
    atomic::{AtomicU64, AtomicUsize, Ordering},
    Arc,
};
use std::time::{Duration, Instant};

use super::engine::{BatchOutcome, EngineConfig, LanguagePair, TranslationEngine};
use crate::translation::config::TranslationConfig;
use crate::translation::document::DocumentTree;
use crate::translation::error::{TranslationError, TranslationResult};
use crate::translation::pipeline::batch::plan_batches;
use crate::translation::pipeline::collector::{CollectorConfig, TextCollector};
use crate::translation::provider::{create_provider, TranslationProvider};

/// 一次文档翻译的结果汇总
#[derive(Debug, Clone)]
pub struct TranslationReport {
    pub target_language: String,
    pub units_collected: usize,
    /// 按批次序号排列
    pub batches: Vec<BatchOutcome>,
    pub elapsed: Duration,
}

impl TranslationReport {
    /// 已写回译文的单元数
    pub fn units_translated(&self) -> usize {
        self.batches
            .iter()
            .filter_map(|b| b.result.as_ref().ok())
            .sum()
    }

    pub fn failed_batches(&self) -> impl Iterator<Item = &BatchOutcome> {
        self.batches.iter().filter(|b| !b.is_success())
    }

    /// 所有批次都成功
    pub fn is_complete(&self) -> bool {
        self.batches.iter().all(BatchOutcome::is_success)
    }
}

/// 翻译服务
pub struct TranslationService {
    config: TranslationConfig,
    collector_config: CollectorConfig,
    engine: TranslationEngine,
    stats: ServiceStats,
}

impl TranslationService {
    /// 验证配置并按配置创建服务商
    pub fn new(config: TranslationConfig) -> TranslationResult<Self> {
        config.validate()?;
        let provider = create_provider(&config)?;
        Self::with_provider(config, provider)
    }

    /// 使用指定的服务商，不检查服务商相关的配置（地址、密钥）
    pub fn with_provider(
        config: TranslationConfig,
        provider: Arc<dyn TranslationProvider>,
    ) -> TranslationResult<Self> {
        config.validate_limits()?;

        let collector_config = CollectorConfig {
            skip_elements: config.skip_elements.clone(),
        };
        let engine = TranslationEngine::new(provider, EngineConfig::from(&config));

        Ok(Self {
            config,
            collector_config,
            engine,
            stats: ServiceStats::default(),
        })
    }

    /// 使用默认配置创建服务
    pub fn create_default(target_lang: &str, api_url: Option<&str>) -> TranslationResult<Self> {
        Self::new(TranslationConfig::default_with_lang(target_lang, api_url))
    }

    /// 把文档中的全部文本翻译为 `target_language`
    ///
    /// 只有目标语言为空时返回 `Err`。单个批次失败时该批次的文本保持原样，
    /// 失败记录在报告中。
    pub async fn translate_document<T: DocumentTree>(
        &self,
        tree: &mut T,
        target_language: &str,
    ) -> TranslationResult<TranslationReport> {
        let target_language = target_language.trim();
        if target_language.is_empty() {
            return Err(TranslationError::InvalidInput("目标语言不能为空".to_string()));
        }

        let start_time = Instant::now();
        tracing::info!("开始翻译文档 -> {} (服务商: {})", target_language, self.engine.provider_name());

        let mut collector = TextCollector::new(self.collector_config.clone());
        let units = collector.collect_document(tree);
        let units_collected = units.len();
        self.stats.inc_runs();
        self.stats.add_units_collected(units_collected);

        let batches = plan_batches(units, self.config.batch_size)?;
        self.stats.add_batches_dispatched(batches.len());

        let languages = LanguagePair {
            target: target_language,
            source: self.config.source_language(),
        };
        let outcomes = self.engine.dispatch(tree, batches, languages).await;

        let report = TranslationReport {
            target_language: target_language.to_string(),
            units_collected,
            batches: outcomes,
            elapsed: start_time.elapsed(),
        };

        self.stats.add_batches_failed(report.failed_batches().count());
        self.stats.add_units_translated(report.units_translated());
        self.stats.add_processing_time(report.elapsed);

        if report.is_complete() {
            tracing::info!(
                "文档翻译完成: {} 个文本单元，{} 个批次，耗时 {:?}",
                units_collected,
                report.batches.len(),
                report.elapsed
            );
        } else {
            tracing::warn!(
                "文档翻译部分完成: {}/{} 个文本单元已翻译，{} 个批次失败",
                report.units_translated(),
                units_collected,
                report.failed_batches().count()
            );
        }

        Ok(report)
    }

    pub fn config(&self) -> &TranslationConfig {
        &self.config
    }

    pub fn get_stats(&self) -> &ServiceStats {
        &self.stats
    }
}

/// 服务统计信息
#[derive(Debug, Default)]
pub struct ServiceStats {
    pub runs: AtomicUsize,
    pub units_collected: AtomicUsize,
    pub batches_dispatched: AtomicUsize,
    pub batches_failed: AtomicUsize,
    pub units_translated: AtomicUsize,
    /// 微秒
    pub processing_time: AtomicU64,
}

impl ServiceStats {
    pub fn inc_runs(&self) {
        self.runs.fetch_add(1, Ordering::Relaxed);
    }

    pub fn add_units_collected(&self, count: usize) {
        self.units_collected.fetch_add(count, Ordering::Relaxed);
    }

    pub fn add_batches_dispatched(&self, count: usize) {
        self.batches_dispatched.fetch_add(count, Ordering::Relaxed);
    }

    pub fn add_batches_failed(&self, count: usize) {
        self.batches_failed.fetch_add(count, Ordering::Relaxed);
    }

    pub fn add_units_translated(&self, count: usize) {
        self.units_translated.fetch_add(count, Ordering::Relaxed);
    }

    pub fn add_processing_time(&self, duration: Duration) {
        self.processing_time
            .fetch_add(duration.as_micros() as u64, Ordering::Relaxed);
    }

    pub fn snapshot(&self) -> ServiceStatsSnapshot {
        ServiceStatsSnapshot {
            runs: self.runs.load(Ordering::Relaxed),
            units_collected: self.units_collected.load(Ordering::Relaxed),
            batches_dispatched: self.batches_dispatched.load(Ordering::Relaxed),
            batches_failed: self.batches_failed.load(Ordering::Relaxed),
            units_translated: self.units_translated.load(Ordering::Relaxed),
            processing_time: Duration::from_micros(self.processing_time.load(Ordering::Relaxed)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ServiceStatsSnapshot {
    pub runs: usize,
    pub units_collected: usize,
    pub batches_dispatched: usize,
    pub batches_failed: usize,
    pub units_translated: usize,
    pub processing_time: Duration,
}
