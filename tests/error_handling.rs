//! 错误处理集成测试
//!
//! 各类批次错误的隔离、重试和调用级错误

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;

use page_translator::translation::config::TranslationConfig;
use page_translator::translation::core::{EngineConfig, LanguagePair, TranslationEngine};
use page_translator::translation::error::{ErrorCategory, TranslationError, TranslationResult};
use page_translator::translation::pipeline::{plan_batches, TextCollector};
use page_translator::translation::provider::{TranslationProvider, TranslationRequest};
use page_translator::translation::TranslationService;

#[allow(dead_code)]
mod common {
    include!("common/mod.rs");
}

use common::{default_service, service_with, HtmlTestHelper, ScriptedProvider, TestDataGenerator};

/// 每个批次都失败时文档保持原样，调用本身仍然成功
#[tokio::test]
async fn test_every_batch_error_kind_is_isolated() {
    let errors = vec![
        TranslationError::transport("connection refused"),
        TranslationError::Transport {
            status: Some(500),
            message: "internal".to_string(),
        },
        TranslationError::RateLimited,
        TranslationError::MalformedResponse("missing data.translations".to_string()),
        TranslationError::Timeout("deadline".to_string()),
    ];

    for error in errors {
        let provider = Arc::new(ScriptedProvider::new().fail_first(usize::MAX, error.clone()));
        let service = default_service(provider);
        let mut doc = HtmlTestHelper::parse(&TestDataGenerator::hello_world_page());

        let report = service
            .translate_document(&mut doc, "es")
            .await
            .expect("batch failures never fail the whole run");

        assert_eq!(report.batches[0].error(), Some(&error));
        assert_eq!(report.units_translated(), 0);
        assert_eq!(HtmlTestHelper::body_text_nodes(&doc), vec!["Hello", "  ", "World"]);
    }
}

#[tokio::test]
async fn test_retry_recovers_from_transient_error() {
    let provider = Arc::new(ScriptedProvider::new().fail_first(
        2,
        TranslationError::Transport {
            status: Some(503),
            message: "unavailable".to_string(),
        },
    ));
    let config = TranslationConfig {
        retry_enabled: true,
        max_retry_attempts: 3,
        retry_delay_ms: 1,
        ..TranslationConfig::default()
    };
    let service = service_with(config, provider.clone());
    let mut doc = HtmlTestHelper::parse(&TestDataGenerator::hello_world_page());

    let report = service.translate_document(&mut doc, "es").await.unwrap();

    assert!(report.is_complete());
    assert_eq!(provider.call_count(), 3);
    assert_eq!(HtmlTestHelper::body_text_nodes(&doc), vec!["Hola", "  ", "Mundo"]);
}

#[tokio::test]
async fn test_client_errors_are_not_retried() {
    let provider = Arc::new(ScriptedProvider::new().fail_first(
        1,
        TranslationError::Transport {
            status: Some(403),
            message: "API key not valid".to_string(),
        },
    ));
    let config = TranslationConfig {
        retry_enabled: true,
        retry_delay_ms: 1,
        ..TranslationConfig::default()
    };
    let service = service_with(config, provider.clone());
    let mut doc = HtmlTestHelper::parse(&TestDataGenerator::hello_world_page());

    let report = service.translate_document(&mut doc, "es").await.unwrap();

    assert_eq!(provider.call_count(), 1);
    assert_eq!(report.failed_batches().count(), 1);
}

#[tokio::test]
async fn test_retry_is_off_by_default() {
    let provider = Arc::new(ScriptedProvider::new().fail_first(1, TranslationError::RateLimited));
    let service = default_service(provider.clone());
    let mut doc = HtmlTestHelper::parse(&TestDataGenerator::hello_world_page());

    let report = service.translate_document(&mut doc, "es").await.unwrap();

    assert_eq!(provider.call_count(), 1);
    assert!(!report.is_complete());
}

struct HangingProvider;

#[async_trait]
impl TranslationProvider for HangingProvider {
    fn name(&self) -> &str {
        "hanging"
    }

    async fn translate_batch(&self, _request: &TranslationRequest) -> TranslationResult<Vec<String>> {
        futures::future::pending::<()>().await;
        Ok(Vec::new())
    }
}

#[tokio::test]
async fn test_hanging_provider_times_out_per_batch() {
    let config = EngineConfig {
        request_timeout: Duration::from_millis(50),
        ..EngineConfig::default()
    };
    let engine = TranslationEngine::new(Arc::new(HangingProvider), config);
    let mut doc = HtmlTestHelper::parse(&TestDataGenerator::paragraphs(3));
    let units = TextCollector::default().collect_document(&doc);
    let batches = plan_batches(units, 2).unwrap();

    let outcomes = engine
        .dispatch(
            &mut doc,
            batches,
            LanguagePair {
                target: "es",
                source: None,
            },
        )
        .await;

    assert_eq!(outcomes.len(), 2);
    for outcome in &outcomes {
        assert_eq!(outcome.error().map(TranslationError::category), Some(ErrorCategory::Timeout));
    }
    assert_eq!(
        HtmlTestHelper::body_text_nodes(&doc),
        vec!["Text 0", "Text 1", "Text 2"]
    );
}

#[tokio::test]
async fn test_empty_target_language_is_invalid_input() {
    let provider = Arc::new(ScriptedProvider::new());
    let service = default_service(provider.clone());
    let mut doc = HtmlTestHelper::parse(&TestDataGenerator::hello_world_page());

    let result = service.translate_document(&mut doc, "").await;

    assert!(matches!(result, Err(TranslationError::InvalidInput(_))));
    assert_eq!(provider.call_count(), 0);
}

#[test]
fn test_invalid_limits_are_config_errors() {
    let zero_batch = TranslationConfig {
        batch_size: 0,
        ..TranslationConfig::default()
    };
    let result = TranslationService::with_provider(zero_batch, Arc::new(ScriptedProvider::new()));
    assert!(matches!(result, Err(TranslationError::Config(_))));

    let zero_concurrency = TranslationConfig {
        max_concurrent_batches: 0,
        ..TranslationConfig::default()
    };
    let result = TranslationService::with_provider(zero_concurrency, Arc::new(ScriptedProvider::new()));
    assert!(matches!(result, Err(TranslationError::Config(_))));
}

#[tokio::test]
async fn test_malformed_html_still_translates() {
    let cases = [
        "",
        "<div>Unclosed div",
        "Plain text without tags",
        "<script>alert('test')</script>",
        "<!DOCTYPE html>",
    ];

    for html in cases {
        let provider = Arc::new(ScriptedProvider::new());
        let service = default_service(provider);
        let mut doc = HtmlTestHelper::parse(html);

        let report = service.translate_document(&mut doc, "es").await.unwrap();
        assert!(report.is_complete(), "case {:?}", html);
    }
}
