//! 翻译调度引擎
//!
//! 每个批次发出一次请求，成功后把译文交给 [`BatchResultWriter`] 写回。
//! 批次之间互相独立：任一批次的传输、解析或对齐错误只记录在该批次的
//! [`BatchOutcome`] 中，其余批次照常执行。
//!
//! ## 调度方式
//!
//! - `Sequential`：上一批写回完成后才发出下一批
//! - `Concurrent`：最多 `max_concurrent_batches` 个请求同时在途，结果按完成顺序写回
//!
//! 两种方式下写回都在调度任务上逐批进行，请求 future 不持有文档句柄。

use std::sync::Arc;
use std::time::Duration;

use futures::stream::{self, StreamExt};
use tokio::time::{sleep, timeout};

use super::writer::BatchResultWriter;
use crate::translation::config::{DispatchMode, TranslationConfig};
use crate::translation::document::DocumentTree;
use crate::translation::error::{log_batch_error, TranslationError, TranslationResult};
use crate::translation::pipeline::batch::Batch;
use crate::translation::pipeline::collector::TextUnit;
use crate::translation::provider::{TranslationProvider, TranslationRequest};

/// 重试策略
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// 包括首次请求在内的最大尝试次数
    pub max_attempts: usize,
    pub base_delay: Duration,
}

impl RetryPolicy {
    /// 第 `attempt` 次失败后的等待时间：`base_delay * 2^attempt`
    pub fn delay_for(&self, attempt: usize) -> Duration {
        let factor = 1u32 << attempt.min(16);
        self.base_delay.saturating_mul(factor)
    }
}

/// 引擎配置
#[derive(Debug, Clone)]
pub struct EngineConfig {
    pub dispatch_mode: DispatchMode,
    pub max_concurrent_batches: usize,
    pub request_timeout: Duration,
    /// `None` 表示失败后不重试
    pub retry: Option<RetryPolicy>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self::from(&TranslationConfig::default())
    }
}

impl From<&TranslationConfig> for EngineConfig {
    fn from(config: &TranslationConfig) -> Self {
        Self {
            dispatch_mode: config.dispatch_mode,
            max_concurrent_batches: config.max_concurrent_batches.max(1),
            request_timeout: config.request_timeout(),
            retry: config.retry_enabled.then(|| RetryPolicy {
                max_attempts: config.max_retry_attempts.max(1),
                base_delay: config.retry_delay(),
            }),
        }
    }
}

/// 单个批次的处理结果
#[derive(Debug, Clone, PartialEq)]
pub struct BatchOutcome {
    /// 批次序号（从0开始）
    pub index: usize,
    pub unit_count: usize,
    /// 成功时为写回的单元数
    pub result: Result<usize, TranslationError>,
}

impl BatchOutcome {
    pub fn is_success(&self) -> bool {
        self.result.is_ok()
    }

    pub fn error(&self) -> Option<&TranslationError> {
        self.result.as_ref().err()
    }
}

/// 请求的目标与源语言
#[derive(Debug, Clone, Copy)]
pub struct LanguagePair<'a> {
    pub target: &'a str,
    pub source: Option<&'a str>,
}

/// 翻译调度引擎
pub struct TranslationEngine {
    provider: Arc<dyn TranslationProvider>,
    config: EngineConfig,
}

impl TranslationEngine {
    pub fn new(provider: Arc<dyn TranslationProvider>, config: EngineConfig) -> Self {
        Self { provider, config }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn provider_name(&self) -> &str {
        self.provider.name()
    }

    /// 调度全部批次并写回成功的结果，返回按批次序号排列的结果
    pub async fn dispatch<T: DocumentTree>(
        &self,
        tree: &mut T,
        batches: Vec<Batch<T::Node>>,
        languages: LanguagePair<'_>,
    ) -> Vec<BatchOutcome> {
        match self.config.dispatch_mode {
            DispatchMode::Sequential => self.dispatch_sequential(tree, batches, languages).await,
            DispatchMode::Concurrent => self.dispatch_concurrent(tree, batches, languages).await,
        }
    }

    async fn dispatch_sequential<T: DocumentTree>(
        &self,
        tree: &mut T,
        batches: Vec<Batch<T::Node>>,
        languages: LanguagePair<'_>,
    ) -> Vec<BatchOutcome> {
        let mut outcomes = Vec::with_capacity(batches.len());

        for batch in batches {
            let request = build_request(&batch, languages);
            let translated = self.translate_request(batch.number(), &request).await;
            outcomes.push(write_back(tree, batch.index, &batch.units, translated));
        }

        outcomes
    }

    async fn dispatch_concurrent<T: DocumentTree>(
        &self,
        tree: &mut T,
        batches: Vec<Batch<T::Node>>,
        languages: LanguagePair<'_>,
    ) -> Vec<BatchOutcome> {
        let mut pending: Vec<Option<Vec<TextUnit<T::Node>>>> = Vec::with_capacity(batches.len());
        let mut requests = Vec::with_capacity(batches.len());
        for batch in batches {
            requests.push((batch.index, build_request(&batch, languages)));
            pending.push(Some(batch.units));
        }

        let mut in_flight = stream::iter(requests)
            .map(|(index, request)| async move {
                let translated = self.translate_request(index + 1, &request).await;
                (index, translated)
            })
            .buffer_unordered(self.config.max_concurrent_batches);

        let mut outcomes = Vec::with_capacity(pending.len());
        while let Some((index, translated)) = in_flight.next().await {
            let units = pending.get_mut(index).and_then(Option::take).unwrap_or_default();
            outcomes.push(write_back(tree, index, &units, translated));
        }

        outcomes.sort_by_key(|outcome| outcome.index);
        outcomes
    }

    /// 发出一个批次的请求，包含超时和可选的重试
    pub async fn translate_request(
        &self,
        batch_number: usize,
        request: &TranslationRequest,
    ) -> TranslationResult<Vec<String>> {
        tracing::debug!(
            batch = batch_number,
            "发送批次 {}: {} 段文本 -> {}",
            batch_number,
            request.len(),
            request.target_language
        );

        let mut attempt = 0;
        loop {
            let error = match self.call_provider(request).await {
                Ok(translations) => return Ok(translations),
                Err(e) => e,
            };

            let policy = match self.config.retry {
                Some(policy) if error.is_retryable() && attempt + 1 < policy.max_attempts => policy,
                _ => return Err(error),
            };

            let delay = policy.delay_for(attempt);
            attempt += 1;
            tracing::warn!(
                batch = batch_number,
                "批次 {} 请求失败，{}ms后重试 (尝试 {}/{}): {}",
                batch_number,
                delay.as_millis(),
                attempt + 1,
                policy.max_attempts,
                error
            );
            sleep(delay).await;
        }
    }

    async fn call_provider(&self, request: &TranslationRequest) -> TranslationResult<Vec<String>> {
        timeout(self.config.request_timeout, self.provider.translate_batch(request)).await?
    }
}

fn build_request<N>(batch: &Batch<N>, languages: LanguagePair<'_>) -> TranslationRequest {
    tracing::trace!(batch = batch.number(), "批次 {} 预估 {} 字符", batch.number(), batch.estimated_chars());
    TranslationRequest::new(batch.texts.clone(), languages.target).with_source_language(languages.source)
}

/// 写回一个批次并生成结果；失败在这里记录，不向外传播
fn write_back<T: DocumentTree>(
    tree: &mut T,
    index: usize,
    units: &[TextUnit<T::Node>],
    translated: TranslationResult<Vec<String>>,
) -> BatchOutcome {
    let result = translated.and_then(|translations| BatchResultWriter::apply(tree, units, &translations));

    match &result {
        Ok(written) => tracing::debug!(batch = index + 1, "批次 {} 写回 {} 个文本单元", index + 1, written),
        Err(e) => log_batch_error(index + 1, e),
    }

    BatchOutcome {
        index,
        unit_count: units.len(),
        result,
    }
}
