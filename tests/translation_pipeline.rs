//! 翻译管道集成测试
//!
//! 从解析到写回的端到端流程

use std::sync::Arc;

use page_translator::translation::config::{DispatchMode, TranslationConfig};
use page_translator::translation::error::TranslationError;
use page_translator::translation::provider::TextFormat;
use page_translator::translation::translate_html;

#[allow(dead_code)]
mod common {
    include!("common/mod.rs");
}

use common::{default_service, service_with, HtmlTestHelper, ScriptedProvider, TestDataGenerator};

#[tokio::test]
async fn test_hello_world_keeps_whitespace_node() {
    let provider = Arc::new(ScriptedProvider::new());
    let service = default_service(provider.clone());
    let mut doc = HtmlTestHelper::parse(&TestDataGenerator::hello_world_page());

    let report = service.translate_document(&mut doc, "es").await.unwrap();

    assert_eq!(report.units_collected, 2);
    assert_eq!(report.batches.len(), 1);
    assert!(report.is_complete());

    let requests = provider.requests();
    assert_eq!(requests.len(), 1);
    assert_eq!(requests[0].texts, vec!["Hello", "World"]);
    assert_eq!(requests[0].target_language, "es");
    assert_eq!(requests[0].format, TextFormat::PlainText);

    assert_eq!(HtmlTestHelper::body_text_nodes(&doc), vec!["Hola", "  ", "Mundo"]);
}

#[tokio::test]
async fn test_130_units_make_two_batches() {
    let provider = Arc::new(ScriptedProvider::new());
    let service = default_service(provider.clone());
    let mut doc = HtmlTestHelper::parse(&TestDataGenerator::paragraphs(130));

    let report = service.translate_document(&mut doc, "fr").await.unwrap();

    let sizes: Vec<usize> = report.batches.iter().map(|b| b.unit_count).collect();
    assert_eq!(sizes, vec![128, 2]);
    assert_eq!(report.units_translated(), 130);

    let requests = provider.requests();
    assert_eq!(requests.len(), 2);
    assert_eq!(requests[0].texts.first().map(String::as_str), Some("Text 0"));
    assert_eq!(requests[0].texts.last().map(String::as_str), Some("Text 127"));
    assert_eq!(requests[1].texts, vec!["Text 128", "Text 129"]);

    let texts = HtmlTestHelper::body_text_nodes(&doc);
    assert_eq!(texts[0], "fr:Text 0");
    assert_eq!(texts[129], "fr:Text 129");
}

#[tokio::test]
async fn test_failed_batch_keeps_original_text() {
    let provider = Arc::new(
        ScriptedProvider::new().fail_batch_containing("Text 129", TranslationError::transport("connection reset")),
    );
    let service = default_service(provider.clone());
    let mut doc = HtmlTestHelper::parse(&TestDataGenerator::paragraphs(130));

    let report = service.translate_document(&mut doc, "es").await.unwrap();

    assert!(report.batches[0].is_success());
    assert!(matches!(
        report.batches[1].error(),
        Some(TranslationError::Transport { .. })
    ));
    assert_eq!(report.units_translated(), 128);
    assert!(!report.is_complete());

    let texts = HtmlTestHelper::body_text_nodes(&doc);
    assert!(texts[..128].iter().all(|t| t.starts_with("es:")));
    assert_eq!(&texts[128..], &["Text 128", "Text 129"]);
}

#[tokio::test]
async fn test_first_batch_failure_does_not_stop_later_batches() {
    let provider = Arc::new(
        ScriptedProvider::new().fail_batch_containing("Text 0", TranslationError::RateLimited),
    );
    let service = default_service(provider.clone());
    let mut doc = HtmlTestHelper::parse(&TestDataGenerator::paragraphs(130));

    let report = service.translate_document(&mut doc, "es").await.unwrap();

    assert_eq!(provider.call_count(), 2);
    assert!(!report.batches[0].is_success());
    assert_eq!(report.batches[1].result, Ok(2));

    let texts = HtmlTestHelper::body_text_nodes(&doc);
    assert_eq!(texts[0], "Text 0");
    assert_eq!(texts[129], "es:Text 129");
}

#[tokio::test]
async fn test_pipeline_is_idempotent() {
    let provider = Arc::new(ScriptedProvider::new());
    let service = default_service(provider);
    let mut doc = HtmlTestHelper::parse(&TestDataGenerator::hello_world_page());

    service.translate_document(&mut doc, "es").await.unwrap();
    let first = HtmlTestHelper::to_string(&doc);
    service.translate_document(&mut doc, "es").await.unwrap();
    let second = HtmlTestHelper::to_string(&doc);

    assert_eq!(first, second);
    assert_eq!(HtmlTestHelper::body_text_nodes(&doc), vec!["Hola", "  ", "Mundo"]);
}

#[tokio::test]
async fn test_misaligned_response_writes_nothing() {
    let provider = Arc::new(ScriptedProvider::new().drop_last_translation());
    let service = default_service(provider);
    let mut doc = HtmlTestHelper::parse(&TestDataGenerator::hello_world_page());

    let report = service.translate_document(&mut doc, "es").await.unwrap();

    assert_eq!(
        report.batches[0].error(),
        Some(&TranslationError::Alignment { expected: 2, actual: 1 })
    );
    assert_eq!(HtmlTestHelper::body_text_nodes(&doc), vec!["Hello", "  ", "World"]);
}

#[tokio::test]
async fn test_concurrent_dispatch_isolates_failures() {
    let provider = Arc::new(
        ScriptedProvider::new().fail_batch_containing("Text 17", TranslationError::transport("boom")),
    );
    let config = TranslationConfig {
        batch_size: 5,
        dispatch_mode: DispatchMode::Concurrent,
        max_concurrent_batches: 3,
        ..TranslationConfig::default()
    };
    let service = service_with(config, provider.clone());
    let mut doc = HtmlTestHelper::parse(&TestDataGenerator::paragraphs(50));

    let report = service.translate_document(&mut doc, "de").await.unwrap();

    assert_eq!(provider.call_count(), 10);
    let indices: Vec<usize> = report.batches.iter().map(|b| b.index).collect();
    assert_eq!(indices, (0..10).collect::<Vec<_>>());
    let failed: Vec<usize> = report.failed_batches().map(|b| b.index).collect();
    assert_eq!(failed, vec![3]);

    let texts = HtmlTestHelper::body_text_nodes(&doc);
    for (i, text) in texts.iter().enumerate() {
        if (15..20).contains(&i) {
            assert_eq!(text, &format!("Text {}", i));
        } else {
            assert_eq!(text, &format!("de:Text {}", i));
        }
    }
}

#[tokio::test]
async fn test_script_style_and_head_are_not_translated() {
    let provider = Arc::new(ScriptedProvider::new());
    let service = default_service(provider.clone());
    let html = "<html><head><title>Title</title><style>p { color: red }</style></head>\
                <body><p>Hello</p><script>var x = 1;</script><noscript>Enable JS</noscript></body></html>";
    let mut doc = HtmlTestHelper::parse(html);

    service.translate_document(&mut doc, "es").await.unwrap();

    assert_eq!(provider.requests()[0].texts, vec!["Hello"]);
    let output = HtmlTestHelper::to_string(&doc);
    assert!(output.contains("<title>Title</title>"));
    assert!(output.contains("<script>var x = 1;</script>"));
    assert!(output.contains("<p>Hola</p>"));
}

#[tokio::test]
async fn test_source_language_is_forwarded() {
    let provider = Arc::new(ScriptedProvider::new());
    let config = TranslationConfig {
        source_lang: "en".to_string(),
        ..TranslationConfig::default()
    };
    let service = service_with(config, provider.clone());
    let mut doc = HtmlTestHelper::parse("<p>Hello</p>");

    service.translate_document(&mut doc, "es").await.unwrap();

    assert_eq!(provider.requests()[0].source_language.as_deref(), Some("en"));
}

#[tokio::test]
async fn test_translate_html_round_trip() {
    let provider = Arc::new(ScriptedProvider::new());
    let service = default_service(provider);

    let (html, report) = translate_html(
        &service,
        b"<html><head></head><body><h1>Hello</h1><p>World <b>and</b> more</p></body></html>",
        None,
        "es",
    )
    .await
    .unwrap();

    assert_eq!(report.units_collected, 4);
    assert_eq!(
        String::from_utf8(html).unwrap(),
        "<html><head></head><body><h1>Hola</h1><p>Mundo<b>es:and</b>es: more</p></body></html>"
    );
}
