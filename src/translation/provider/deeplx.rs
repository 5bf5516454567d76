//! DeepLX 服务商
//!
//! DeepLX 每次只接受一段文本。批次内的文本各自加上 `[j]` 索引标记后以空行
//! 连接发送，译文再按标记拆回，因此结果按索引而不是按位置对应。

use std::collections::HashMap;

use async_trait::async_trait;
use regex::Regex;
use serde::{Deserialize, Serialize};
use url::Url;

use super::{error_from_response, TranslationProvider, TranslationRequest};
use crate::translation::error::{TranslationError, TranslationResult};

#[derive(Debug, Serialize)]
struct DeepLxRequest<'a> {
    text: &'a str,
    source_lang: String,
    target_lang: String,
}

#[derive(Debug, Deserialize)]
struct DeepLxResponse {
    code: Option<u16>,
    message: Option<String>,
    data: Option<String>,
}

// 部分译文会把方括号换成全角括号
const INDEX_MARKER_PATTERN: &str = r"(?m)^[ \t]*[\[【](\d+)[\]】][ \t]?";

fn index_marker_regex() -> TranslationResult<Regex> {
    Regex::new(INDEX_MARKER_PATTERN).map_err(|e| TranslationError::Config(format!("索引标记正则无效: {}", e)))
}

/// 为每段文本加上索引标记并连接
fn join_with_markers(texts: &[String]) -> String {
    texts
        .iter()
        .enumerate()
        .map(|(i, text)| format!("[{}]{}", i, text.trim()))
        .collect::<Vec<_>>()
        .join("\n\n")
}

/// 按索引标记拆分译文
///
/// 标记必须恰好是 `0..expected_count` 各一次。原文行首自带的 `[n]` 会被当成
/// 标记，越界、重复或缺失都视为响应格式错误，避免把截断的译文写回。
fn split_by_markers(re: &Regex, response: &str, expected_count: usize) -> TranslationResult<Vec<String>> {
    let markers: Vec<(usize, usize, usize)> = re
        .captures_iter(response)
        .filter_map(|caps| {
            let whole = caps.get(0)?;
            let index = caps.get(1)?.as_str().parse::<usize>().ok()?;
            Some((index, whole.start(), whole.end()))
        })
        .collect();

    let mut indexed: HashMap<usize, String> = HashMap::with_capacity(markers.len());
    for (pos, &(index, _, body_start)) in markers.iter().enumerate() {
        if index >= expected_count {
            return Err(TranslationError::MalformedResponse(format!(
                "索引标记 [{}] 超出范围 (共 {} 段)",
                index, expected_count
            )));
        }
        let body_end = markers.get(pos + 1).map_or(response.len(), |next| next.1);
        let body = response[body_start..body_end].trim().to_string();
        if indexed.insert(index, body).is_some() {
            return Err(TranslationError::MalformedResponse(format!("索引标记 [{}] 重复", index)));
        }
    }

    (0..expected_count)
        .map(|i| {
            indexed
                .remove(&i)
                .ok_or_else(|| TranslationError::MalformedResponse(format!("缺少索引标记 [{}] 的译文", i)))
        })
        .collect()
}

/// 把原文首尾的空白补回译文
fn restore_padding(original: &str, translated: &str) -> String {
    let trimmed = original.trim();
    if trimmed.is_empty() {
        return translated.to_string();
    }
    let start = original.len() - original.trim_start().len();
    let leading = &original[..start];
    let trailing = &original[start + trimmed.len()..];
    format!("{}{}{}", leading, translated, trailing)
}

/// DeepLX 服务商
pub struct DeepLxProvider {
    client: reqwest::Client,
    endpoint: Url,
    markers: Regex,
}

impl DeepLxProvider {
    pub fn new(client: reqwest::Client, api_url: &str) -> TranslationResult<Self> {
        let endpoint = Url::parse(api_url)
            .map_err(|e| TranslationError::Config(format!("API地址无效 '{}': {}", api_url, e)))?;
        Ok(Self {
            client,
            endpoint,
            markers: index_marker_regex()?,
        })
    }
}

#[async_trait]
impl TranslationProvider for DeepLxProvider {
    fn name(&self) -> &str {
        "deeplx"
    }

    async fn translate_batch(&self, request: &TranslationRequest) -> TranslationResult<Vec<String>> {
        if request.is_empty() {
            return Ok(Vec::new());
        }

        let combined = join_with_markers(&request.texts);
        let body = DeepLxRequest {
            text: &combined,
            source_lang: request
                .source_language
                .as_deref()
                .map_or_else(|| "auto".to_string(), str::to_uppercase),
            target_lang: request.target_language.to_uppercase(),
        };

        let response = self
            .client
            .post(self.endpoint.clone())
            .json(&body)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(error_from_response(response).await);
        }

        let parsed: DeepLxResponse = serde_json::from_str(&response.text().await?)?;
        if let Some(code) = parsed.code.filter(|code| *code != 200) {
            return Err(TranslationError::Transport {
                status: Some(code),
                message: parsed.message.unwrap_or_else(|| "DeepLX 返回错误".to_string()),
            });
        }

        let data = parsed
            .data
            .ok_or_else(|| TranslationError::MalformedResponse("响应缺少 data 字段".to_string()))?;

        let translations = split_by_markers(&self.markers, &data, request.len())?;
        Ok(request
            .texts
            .iter()
            .zip(translations)
            .map(|(original, translated)| restore_padding(original, &translated))
            .collect())
    }
}
