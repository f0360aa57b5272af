// ABOUTME: OpenAI vision client that reads laundry care symbols off a label photo
// ABOUTME: Sends one chat completion with the image inline and normalizes the JSON answer

use std::time::Duration;

use base64::{engine::general_purpose::STANDARD, Engine};
use laundrylens_config::OpenAiConfig;
use laundrylens_core::constants::MIN_SYMBOL_CONFIDENCE;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{error, info, warn};

const MAX_TOKENS: u32 = 1000;

const SYMBOL_PROMPT: &str = r#"You are an expert at reading laundry care labels.
Find every laundry care symbol visible in the image.

Only use these symbol codes, grouped by category:
1. WASH: WASH_95, WASH_60, WASH_40, WASH_30, WASH_HAND, WASH_NO
2. BLEACH: BLEACH_ANY, BLEACH_OXYGEN, BLEACH_NO
3. DRY: DRY_TUMBLE_HIGH, DRY_TUMBLE_LOW, DRY_TUMBLE_NO, DRY_LINE, DRY_FLAT
4. IRON: IRON_HIGH, IRON_MEDIUM, IRON_LOW, IRON_NO
5. DRYCLEAN: DRYCLEAN_ANY, DRYCLEAN_P, DRYCLEAN_F, DRYCLEAN_NO

Answer with JSON in exactly this shape:
{
  "symbols": [
    { "code": "SYMBOL_CODE", "confidence": 0.0 }
  ],
  "careTips": "optional extra care advice"
}

Return an empty array when no symbol is found.
Only include symbols with confidence of 0.7 or higher."#;

#[derive(Debug, Error)]
pub enum AIServiceError {
    #[error("HTTP request failed: {0}")]
    RequestFailed(#[from] reqwest::Error),

    #[error("API error: {0}")]
    ApiError(String),

    #[error("Failed to parse response: {0}")]
    ParseError(String),

    #[error("No API key configured")]
    NoApiKey,

    #[error("Invalid response format")]
    InvalidResponse,
}

pub type AIServiceResult<T> = Result<T, AIServiceError>;

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    max_tokens: u32,
    response_format: ResponseFormat,
    messages: Vec<ChatMessage>,
}

#[derive(Debug, Serialize)]
struct ResponseFormat {
    #[serde(rename = "type")]
    format_type: &'static str,
}

#[derive(Debug, Serialize)]
struct ChatMessage {
    role: &'static str,
    content: Vec<ContentPart>,
}

#[derive(Debug, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum ContentPart {
    Text { text: String },
    ImageUrl { image_url: ImageUrl },
}

#[derive(Debug, Serialize)]
struct ImageUrl {
    url: String,
    detail: &'static str,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChoiceMessage {
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawAnalysis {
    #[serde(default)]
    symbols: Vec<RawSymbol>,
    care_tips: Option<String>,
}

#[derive(Debug, Deserialize)]
struct RawSymbol {
    code: String,
    #[serde(default)]
    confidence: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VisionSymbol {
    pub code: String,
    pub confidence: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VisionAnalysis {
    pub symbols: Vec<VisionSymbol>,
    pub care_tips: Option<String>,
}

/// Vision model client for symbol detection
#[derive(Clone)]
pub struct VisionService {
    client: Client,
    api_key: Option<String>,
    model: String,
    base_url: String,
}

impl VisionService {
    pub fn new(config: &OpenAiConfig) -> AIServiceResult<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(60))
            .connect_timeout(Duration::from_secs(10))
            .build()?;

        if config.api_key.is_none() {
            info!("OpenAI API key not set - image analysis requests will be rejected");
        }

        Ok(Self {
            client,
            api_key: config.api_key.clone().filter(|k| !k.is_empty()),
            model: config.model.clone(),
            base_url: config.base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    pub async fn analyze_image(&self, image: &[u8], mime: &str) -> AIServiceResult<VisionAnalysis> {
        self.analyze_encoded(&STANDARD.encode(image), mime).await
    }

    /// Detect symbols in an already base64 encoded image
    pub async fn analyze_encoded(
        &self,
        image_base64: &str,
        mime: &str,
    ) -> AIServiceResult<VisionAnalysis> {
        let api_key = self.api_key.as_ref().ok_or(AIServiceError::NoApiKey)?;

        let request = ChatRequest {
            model: &self.model,
            max_tokens: MAX_TOKENS,
            response_format: ResponseFormat {
                format_type: "json_object",
            },
            messages: vec![ChatMessage {
                role: "user",
                content: vec![
                    ContentPart::Text {
                        text: SYMBOL_PROMPT.to_string(),
                    },
                    ContentPart::ImageUrl {
                        image_url: ImageUrl {
                            url: format!("data:{};base64,{}", mime, image_base64),
                            detail: "high",
                        },
                    },
                ],
            }],
        };

        info!(
            "Making OpenAI vision request: model={}, max_tokens={}",
            request.model, request.max_tokens
        );

        let response = self
            .client
            .post(format!("{}/chat/completions", self.base_url))
            .bearer_auth(api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    error!("OpenAI request timed out");
                    AIServiceError::ApiError("Request to the vision model timed out".to_string())
                } else {
                    error!("OpenAI request failed: {}", e);
                    AIServiceError::RequestFailed(e)
                }
            })?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            error!("OpenAI API error: {} - {}", status, error_text);
            return Err(AIServiceError::ApiError(format!(
                "API returned {}: {}",
                status, error_text
            )));
        }

        let chat: ChatResponse = response
            .json()
            .await
            .map_err(|e| AIServiceError::ParseError(e.to_string()))?;

        let content = chat
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .filter(|c| !c.trim().is_empty())
            .ok_or(AIServiceError::InvalidResponse)?;

        Ok(parse_analysis(&content))
    }
}

/// Strip markdown code fences if present (```json ... ```)
fn strip_code_fences(text: &str) -> &str {
    let cleaned = text.trim();
    if !cleaned.starts_with("```") {
        return cleaned;
    }

    let start = cleaned.find('\n').map(|i| i + 1).unwrap_or(cleaned.len());
    let end = cleaned[start..]
        .rfind("```")
        .map(|i| i + start)
        .unwrap_or(cleaned.len());
    cleaned[start..end].trim()
}

/// Normalize the model's answer. Unreadable answers count as "nothing found".
pub(crate) fn parse_analysis(content: &str) -> VisionAnalysis {
    let json_text = strip_code_fences(content);
    let raw: RawAnalysis = match serde_json::from_str(json_text) {
        Ok(raw) => raw,
        Err(e) => {
            warn!(
                "Unparseable vision response ({}): {}",
                e,
                laundrylens_core::truncate(json_text, 200)
            );
            return VisionAnalysis::default();
        }
    };

    let mut symbols: Vec<VisionSymbol> = Vec::with_capacity(raw.symbols.len());
    for symbol in raw.symbols {
        let code = symbol.code.trim().to_uppercase();
        let confidence = symbol.confidence;
        if code.is_empty()
            || !confidence.is_finite()
            || !(MIN_SYMBOL_CONFIDENCE..=1.0).contains(&confidence)
        {
            continue;
        }

        match symbols.iter_mut().find(|s| s.code == code) {
            Some(existing) if existing.confidence < confidence => existing.confidence = confidence,
            Some(_) => {}
            None => symbols.push(VisionSymbol { code, confidence }),
        }
    }

    let care_tips = raw
        .care_tips
        .map(|t| t.trim().to_string())
        .filter(|t| !t.is_empty());

    VisionAnalysis { symbols, care_tips }
}
