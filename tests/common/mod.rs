// 集成测试公共模块
//
// 提供HTML辅助工具和可编排的内存翻译服务商

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use page_translator::translation::config::TranslationConfig;
use page_translator::translation::document::{DocumentTree, HtmlDocument};
use page_translator::translation::error::{TranslationError, TranslationResult};
use page_translator::translation::provider::{TranslationProvider, TranslationRequest};
use page_translator::translation::TranslationService;

/// HTML测试辅助工具
pub struct HtmlTestHelper;

impl HtmlTestHelper {
    pub fn parse(html: &str) -> HtmlDocument {
        HtmlDocument::parse(html.as_bytes(), None).expect("test HTML should parse")
    }

    /// `<body>` 下全部文本节点（包括空白节点），按文档顺序
    pub fn body_text_nodes(doc: &HtmlDocument) -> Vec<String> {
        let mut texts = Vec::new();
        let mut stack = vec![doc.root()];
        let mut in_body = false;
        while let Some(node) = stack.pop() {
            if let Some(text) = doc.text(&node) {
                if in_body {
                    texts.push(text);
                }
                continue;
            }
            if doc.element_name(&node).as_deref() == Some("body") {
                in_body = true;
            }
            let mut children = doc.children(&node);
            children.reverse();
            stack.extend(children);
        }
        texts
    }

    pub fn to_string(doc: &HtmlDocument) -> String {
        String::from_utf8(doc.serialize().expect("serialize")).expect("utf-8 output")
    }
}

/// 测试数据生成器
pub struct TestDataGenerator;

impl TestDataGenerator {
    /// `count` 个段落，内容为 `Text 0` .. `Text {count-1}`
    pub fn paragraphs(count: usize) -> String {
        let body: String = (0..count).map(|i| format!("<p>Text {}</p>", i)).collect();
        format!("<html><head><title>Page</title></head><body>{}</body></html>", body)
    }

    pub fn hello_world_page() -> String {
        "<html><body><span>Hello</span><span>  </span><span>World</span></body></html>".to_string()
    }
}

/// 按脚本应答的内存服务商
///
/// 译文先查字典，查不到时返回 `{target}:{text}`。
pub struct ScriptedProvider {
    dictionary: HashMap<String, String>,
    fail_when_contains: Option<(String, TranslationError)>,
    fail_first_calls: Option<(usize, TranslationError)>,
    drop_last_translation: bool,
    calls: AtomicUsize,
    requests: Mutex<Vec<TranslationRequest>>,
}

impl ScriptedProvider {
    pub fn new() -> Self {
        let dictionary = [("Hello", "Hola"), ("World", "Mundo"), ("Hola", "Hola"), ("Mundo", "Mundo")]
            .into_iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Self {
            dictionary,
            fail_when_contains: None,
            fail_first_calls: None,
            drop_last_translation: false,
            calls: AtomicUsize::new(0),
            requests: Mutex::new(Vec::new()),
        }
    }

    /// 请求中包含 `text` 的批次返回 `error`
    pub fn fail_batch_containing(mut self, text: &str, error: TranslationError) -> Self {
        self.fail_when_contains = Some((text.to_string(), error));
        self
    }

    /// 前 `count` 次调用返回 `error`
    pub fn fail_first(mut self, count: usize, error: TranslationError) -> Self {
        self.fail_first_calls = Some((count, error));
        self
    }

    /// 少返回一条译文
    pub fn drop_last_translation(mut self) -> Self {
        self.drop_last_translation = true;
        self
    }

    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn requests(&self) -> Vec<TranslationRequest> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl TranslationProvider for ScriptedProvider {
    fn name(&self) -> &str {
        "scripted"
    }

    async fn translate_batch(&self, request: &TranslationRequest) -> TranslationResult<Vec<String>> {
        let call = self.calls.fetch_add(1, Ordering::SeqCst);
        self.requests.lock().unwrap().push(request.clone());

        if let Some((count, error)) = &self.fail_first_calls {
            if call < *count {
                return Err(error.clone());
            }
        }
        if let Some((text, error)) = &self.fail_when_contains {
            if request.texts.iter().any(|t| t == text) {
                return Err(error.clone());
            }
        }

        let mut translations: Vec<String> = request
            .texts
            .iter()
            .map(|text| {
                self.dictionary
                    .get(text.trim())
                    .cloned()
                    .unwrap_or_else(|| format!("{}:{}", request.target_language, text))
            })
            .collect();
        if self.drop_last_translation {
            translations.pop();
        }
        Ok(translations)
    }
}

/// 使用内存服务商的翻译服务
pub fn service_with(config: TranslationConfig, provider: Arc<ScriptedProvider>) -> TranslationService {
    TranslationService::with_provider(config, provider).expect("valid test config")
}

pub fn default_service(provider: Arc<ScriptedProvider>) -> TranslationService {
    service_with(TranslationConfig::default(), provider)
}
