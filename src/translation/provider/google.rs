//! Google Cloud Translation v2
//!
//! `POST {api_url}?key=...`，请求体 `{"q": [...], "target": "es", "format": "text"}`，
//! 响应 `{"data": {"translations": [{"translatedText": "..."}]}}`，顺序与 `q` 一致。

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use url::Url;

use super::{error_from_response, TextFormat, TranslationProvider, TranslationRequest};
use crate::translation::error::{TranslationError, TranslationResult};

#[derive(Debug, Serialize)]
struct GoogleRequest<'a> {
    q: &'a [String],
    target: &'a str,
    format: TextFormat,
    #[serde(skip_serializing_if = "Option::is_none")]
    source: Option<&'a str>,
}

#[derive(Debug, Deserialize)]
struct GoogleResponse {
    data: Option<GoogleData>,
}

#[derive(Debug, Deserialize)]
struct GoogleData {
    translations: Option<Vec<GoogleTranslation>>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GoogleTranslation {
    translated_text: String,
}

/// Google 翻译服务商
pub struct GoogleTranslateProvider {
    client: reqwest::Client,
    endpoint: Url,
}

impl GoogleTranslateProvider {
    pub fn new(client: reqwest::Client, api_url: &str, api_key: String) -> TranslationResult<Self> {
        let mut endpoint = Url::parse(api_url)
            .map_err(|e| TranslationError::Config(format!("API地址无效 '{}': {}", api_url, e)))?;
        endpoint.query_pairs_mut().append_pair("key", &api_key);

        Ok(Self { client, endpoint })
    }

    fn request_body<'a>(request: &'a TranslationRequest) -> GoogleRequest<'a> {
        GoogleRequest {
            q: &request.texts,
            target: &request.target_language,
            format: request.format,
            source: request.source_language.as_deref(),
        }
    }
}

/// 解析响应体，提取按顺序排列的译文
fn parse_response(body: &str) -> TranslationResult<Vec<String>> {
    let response: GoogleResponse = serde_json::from_str(body)?;

    let translations = response
        .data
        .and_then(|data| data.translations)
        .ok_or_else(|| TranslationError::MalformedResponse("响应缺少 data.translations".to_string()))?;

    Ok(translations.into_iter().map(|t| t.translated_text).collect())
}

#[async_trait]
impl TranslationProvider for GoogleTranslateProvider {
    fn name(&self) -> &str {
        "google"
    }

    async fn translate_batch(&self, request: &TranslationRequest) -> TranslationResult<Vec<String>> {
        let response = self
            .client
            .post(self.endpoint.clone())
            .json(&Self::request_body(request))
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(error_from_response(response).await);
        }

        let body = response.text().await?;
        parse_response(&body)
    }
}
