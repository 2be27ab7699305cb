use reqwest::header::AUTHORIZATION;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::env;
use std::time::{Duration, Instant};
use tracing::{debug, warn};

use crate::config::GenerationConfig;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerationRequest {
    pub business_description: String,
    #[serde(default)]
    pub keywords: Vec<String>,
    pub tone: String,
    pub focus: String,
    pub variations: usize,
    #[serde(default)]
    pub landing_page_url: Option<String>,
}

impl GenerationRequest {
    pub fn validate(&self, max_variations: usize) -> Result<(), String> {
        if self.business_description.trim().is_empty() {
            return Err("business description is required".to_string());
        }
        if self.tone.trim().is_empty() {
            return Err("tone is required".to_string());
        }
        if self.focus.trim().is_empty() {
            return Err("focus is required".to_string());
        }
        if self.variations == 0 || self.variations > max_variations {
            return Err(format!(
                "variations must be between 1 and {}: {}",
                max_variations, self.variations
            ));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AdVariant {
    pub headline: String,
    pub description: String,
    #[serde(default)]
    pub display_url: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerationUsage {
    pub model: String,
    pub latency_ms: u128,
    pub prompt_tokens: u32,
    pub completion_tokens: u32,
    pub total_tokens: u32,
    pub cost: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerationResult {
    pub variants: Vec<AdVariant>,
    pub usage: GenerationUsage,
}

#[derive(Clone)]
pub struct LlmClient {
    client: reqwest::Client,
    api_key: String,
    api_base: String,
    model: String,
    config: GenerationConfig,
}

impl LlmClient {
    /// `Ok(None)` when `LLM_API_KEY` is not set.
    pub fn from_env(
        model_override: Option<String>,
        config: &GenerationConfig,
    ) -> Result<Option<Self>, String> {
        let Ok(api_key) = env::var("LLM_API_KEY") else {
            return Ok(None);
        };
        let api_base =
            env::var("LLM_API_BASE").unwrap_or_else(|_| "https://api.openai.com/v1".to_string());
        let model = model_override
            .or_else(|| env::var("LLM_MODEL").ok())
            .unwrap_or_else(|| "gpt-4o-mini".to_string());
        LlmClient::new(api_key, api_base, model, config.clone()).map(Some)
    }

    pub fn new(
        api_key: String,
        api_base: String,
        model: String,
        config: GenerationConfig,
    ) -> Result<Self, String> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_millis(config.timeout_ms))
            .build()
            .map_err(|err| format!("failed to build LLM client: {}", err))?;
        Ok(Self {
            client,
            api_key,
            api_base,
            model,
            config,
        })
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    pub async fn generate(&self, request: &GenerationRequest) -> Result<GenerationResult, String> {
        request.validate(self.config.max_variations)?;

        let url = format!("{}/chat/completions", self.api_base.trim_end_matches('/'));
        let chat = ChatRequest {
            model: self.model.clone(),
            temperature: self.config.temperature,
            messages: vec![
                ChatMessage {
                    role: "system".to_string(),
                    content: system_prompt(),
                },
                ChatMessage {
                    role: "user".to_string(),
                    content: build_prompt(request),
                },
            ],
        };

        let started = Instant::now();
        let response = self
            .client
            .post(url)
            .header(AUTHORIZATION, format!("Bearer {}", self.api_key))
            .json(&chat)
            .send()
            .await
            .map_err(|err| format!("LLM request failed: {}", err))?;

        let status = response.status();
        if !status.is_success() {
            let error_body = response.text().await.unwrap_or_default();
            let detail = error_body.trim();
            warn!(%status, "LLM call rejected");
            if detail.is_empty() {
                return Err(format!("LLM API error: {}", status));
            }
            return Err(format!("LLM API error: {} {}", status, detail));
        }

        let body: ChatResponse = response
            .json()
            .await
            .map_err(|err| format!("LLM response parse failed: {}", err))?;
        let latency_ms = started.elapsed().as_millis();

        let content = body
            .choices
            .first()
            .ok_or_else(|| "LLM response missing choices".to_string())?
            .message
            .content
            .trim()
            .to_string();

        let mut variants = parse_variants(&content)?;
        let fallback_url = request
            .landing_page_url
            .as_deref()
            .map(display_url_from)
            .unwrap_or_default();
        for variant in variants.iter_mut() {
            if variant.display_url.is_empty() {
                variant.display_url = fallback_url.clone();
            }
        }
        variants.truncate(request.variations);

        let usage = body.usage.unwrap_or_default();
        let cost = self.config.cost(usage.prompt_tokens, usage.completion_tokens);
        debug!(
            model = %self.model,
            latency_ms = latency_ms as u64,
            total_tokens = usage.total_tokens,
            variants = variants.len(),
            "generated ad copy"
        );

        Ok(GenerationResult {
            variants,
            usage: GenerationUsage {
                model: self.model.clone(),
                latency_ms,
                prompt_tokens: usage.prompt_tokens,
                completion_tokens: usage.completion_tokens,
                total_tokens: usage.total_tokens,
                cost,
            },
        })
    }
}

#[derive(Serialize)]
struct ChatRequest {
    model: String,
    messages: Vec<ChatMessage>,
    temperature: f64,
}

#[derive(Serialize)]
struct ChatMessage {
    role: String,
    content: String,
}

#[derive(Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
    #[serde(default)]
    usage: Option<ChatUsage>,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: ChatMessageResponse,
}

#[derive(Deserialize)]
struct ChatMessageResponse {
    content: String,
}

#[derive(Deserialize, Default)]
struct ChatUsage {
    #[serde(default)]
    prompt_tokens: u32,
    #[serde(default)]
    completion_tokens: u32,
    #[serde(default)]
    total_tokens: u32,
}

fn system_prompt() -> String {
    let prompt = r#"You are a Google Ads copywriter that answers in strict JSON.
Return a single JSON object: {"ads": [{"headline": "...", "description": "...", "displayUrl": "..."}]}
Rules:
- Headlines are at most 30 characters.
- Descriptions are at most 90 characters.
- displayUrl is a short domain/path with no scheme.
- Output JSON only, no markdown or commentary.
"#;
    prompt.to_string()
}

pub fn build_prompt(request: &GenerationRequest) -> String {
    let mut prompt = format!(
        "Business: {}\nTone: {}\nFocus: {}\nVariations: {}\n",
        request.business_description.trim(),
        request.tone.trim(),
        request.focus.trim(),
        request.variations
    );
    let keywords: Vec<&str> = request
        .keywords
        .iter()
        .map(|keyword| keyword.trim())
        .filter(|keyword| !keyword.is_empty())
        .collect();
    if !keywords.is_empty() {
        prompt.push_str(&format!("Target keywords: {}\n", keywords.join(", ")));
    }
    if let Some(url) = request.landing_page_url.as_deref() {
        if !url.trim().is_empty() {
            prompt.push_str(&format!("Landing page: {}\n", url.trim()));
        }
    }
    prompt
}

/// Accepts `{"ads": [...]}`, `{"variations": [...]}` or a bare array, optionally
/// wrapped in prose or code fences. Variants with empty copy are dropped.
pub fn parse_variants(content: &str) -> Result<Vec<AdVariant>, String> {
    let value = extract_json(content).ok_or_else(|| "LLM response missing JSON".to_string())?;
    let items = match value {
        Value::Array(items) => items,
        Value::Object(mut map) => match map.remove("ads").or_else(|| map.remove("variations")) {
            Some(Value::Array(items)) => items,
            _ => return Err("LLM JSON missing ads array".to_string()),
        },
        _ => return Err("LLM JSON has unexpected shape".to_string()),
    };

    let variants: Vec<AdVariant> = items
        .into_iter()
        .filter_map(|item| serde_json::from_value::<AdVariant>(item).ok())
        .map(|variant| AdVariant {
            headline: variant.headline.trim().to_string(),
            description: variant.description.trim().to_string(),
            display_url: variant.display_url.trim().to_string(),
        })
        .filter(|variant| !variant.headline.is_empty() && !variant.description.is_empty())
        .collect();

    if variants.is_empty() {
        return Err("LLM returned no usable ad variants".to_string());
    }
    Ok(variants)
}

fn extract_json(text: &str) -> Option<Value> {
    let mut delimiters = [('{', '}'), ('[', ']')];
    delimiters.sort_by_key(|(open, _)| text.find(*open).unwrap_or(usize::MAX));
    for (open, close) in delimiters {
        let Some(start) = text.find(open) else {
            continue;
        };
        let Some(end) = text.rfind(close) else {
            continue;
        };
        if start >= end {
            continue;
        }
        if let Ok(value) = serde_json::from_str(&text[start..=end]) {
            return Some(value);
        }
    }
    None
}

/// `https://www.example.com/shop/` -> `example.com/shop`
pub fn display_url_from(url: &str) -> String {
    let trimmed = url.trim();
    let without_scheme = trimmed
        .split_once("://")
        .map(|(_, rest)| rest)
        .unwrap_or(trimmed);
    let without_www = without_scheme.strip_prefix("www.").unwrap_or(without_scheme);
    let without_query = without_www
        .split(|ch| ch == '?' || ch == '#')
        .next()
        .unwrap_or(without_www);
    without_query.trim_end_matches('/').to_string()
}
