use std::env;

use futures::StreamExt;
use futures::stream::BoxStream;
use serde::{Deserialize, Serialize};
use thiserror::Error;

const API_BASE: &str = "https://generativelanguage.googleapis.com/v1beta";
const API_KEY_VAR: &str = "GEMINI_API_KEY";

/// Errors that can be returned by Gemini API calls.
#[derive(Debug, Error)]
pub enum GatewayError {
    /// No credential configured. Every AI affordance degrades to a
    /// permanent "unavailable" message instead of a fault.
    #[error("GEMINI_API_KEY is not set. AI features are disabled.")]
    MissingApiKey,

    /// An HTTP request failed (network error, timeout, etc.).
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// The API answered with a non-2xx status.
    #[error("Gemini API error (status {status}): {message}")]
    Api { status: u16, message: String },

    /// A response body (or SSE payload) could not be decoded.
    #[error("Failed to decode Gemini response: {0}")]
    Decode(#[from] serde_json::Error),

    /// The response carried no candidate content.
    #[error("Gemini returned no candidates")]
    EmptyResponse,
}

/// Typed client cho Gemini REST API. Clone rẻ (reqwest::Client là Arc bên trong).
#[derive(Clone)]
pub struct Gateway {
    http: reqwest::Client,
    api_key: String,
    model: String,
}

/// Một turn trong hội thoại, đồng thời là phần tử `contents` của request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Content {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
    #[serde(default)]
    pub parts: Vec<Part>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Part {
    #[serde(default)]
    pub text: String,
}

impl Content {
    fn text(role: Option<&str>, text: &str) -> Self {
        Self {
            role: role.map(str::to_string),
            parts: vec![Part {
                text: text.to_string(),
            }],
        }
    }

    pub fn user(text: &str) -> Self {
        Self::text(Some("user"), text)
    }

    pub fn model(text: &str) -> Self {
        Self::text(Some("model"), text)
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentRequest {
    contents: Vec<Content>,
    #[serde(skip_serializing_if = "Option::is_none")]
    system_instruction: Option<Content>,
    #[serde(skip_serializing_if = "Option::is_none")]
    generation_config: Option<GenerationConfig>,
    #[serde(skip_serializing_if = "Option::is_none")]
    tools: Option<Vec<Tool>>,
}

impl GenerateContentRequest {
    fn prompt(prompt: &str) -> Self {
        Self {
            contents: vec![Content::user(prompt)],
            system_instruction: None,
            generation_config: None,
            tools: None,
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    response_mime_type: String,
}

#[derive(Debug, Serialize)]
struct Tool {
    google_search: serde_json::Value,
}

impl Tool {
    fn google_search() -> Self {
        Self {
            google_search: serde_json::Value::Object(Default::default()),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Candidate {
    content: Option<Content>,
    grounding_metadata: Option<GroundingMetadata>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GroundingMetadata {
    #[serde(default)]
    grounding_chunks: Vec<GroundingChunk>,
}

#[derive(Debug, Deserialize)]
struct GroundingChunk {
    web: Option<WebSource>,
}

#[derive(Debug, Deserialize)]
struct WebSource {
    uri: Option<String>,
    title: Option<String>,
}

/// Một citation web lấy từ grounding metadata.
#[derive(Debug, Clone)]
pub struct Citation {
    pub url: String,
    pub title: Option<String>,
}

/// Kết quả của một lời gọi grounded-search.
#[derive(Debug, Clone)]
pub struct GroundedResponse {
    pub text: String,
    pub citations: Vec<Citation>,
}

impl GenerateContentResponse {
    /// Text của candidate đầu tiên (các part nối lại), None nếu không có.
    fn text(&self) -> Option<String> {
        let content = self.candidates.first()?.content.as_ref()?;
        Some(
            content
                .parts
                .iter()
                .map(|part| part.text.as_str())
                .collect::<String>(),
        )
    }

    fn citations(&self) -> Vec<Citation> {
        let Some(candidate) = self.candidates.first() else {
            return Vec::new();
        };
        let Some(metadata) = candidate.grounding_metadata.as_ref() else {
            return Vec::new();
        };
        metadata
            .grounding_chunks
            .iter()
            .filter_map(|chunk| chunk.web.as_ref())
            .filter_map(|web| {
                web.uri.as_ref().map(|uri| Citation {
                    url: uri.clone(),
                    title: web.title.clone(),
                })
            })
            .collect()
    }
}

impl Gateway {
    /// Build a gateway from the `GEMINI_API_KEY` environment variable.
    pub fn from_env(model: &str) -> Result<Self, GatewayError> {
        match env::var(API_KEY_VAR) {
            Ok(key) if !key.trim().is_empty() => Ok(Self {
                http: reqwest::Client::new(),
                api_key: key,
                model: model.to_string(),
            }),
            _ => Err(GatewayError::MissingApiKey),
        }
    }

    async fn post(
        &self,
        verb: &str,
        extra_query: &[(&str, &str)],
        request: &GenerateContentRequest,
    ) -> Result<reqwest::Response, GatewayError> {
        let url = format!("{API_BASE}/models/{}:{verb}", self.model);
        let response = self
            .http
            .post(&url)
            .query(&[("key", self.api_key.as_str())])
            .query(extra_query)
            .json(request)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(GatewayError::Api {
                status: status.as_u16(),
                message: api_error_message(&body),
            });
        }
        Ok(response)
    }

    async fn generate(
        &self,
        request: &GenerateContentRequest,
    ) -> Result<GenerateContentResponse, GatewayError> {
        let response = self.post("generateContent", &[], request).await?;
        Ok(response.json::<GenerateContentResponse>().await?)
    }

    /// `generateContent` với một prompt tự do, trả về text thô.
    pub async fn generate_text(&self, prompt: &str) -> Result<String, GatewayError> {
        let response = self.generate(&GenerateContentRequest::prompt(prompt)).await?;
        response.text().ok_or(GatewayError::EmptyResponse)
    }

    /// `generateContent` ở chế độ structured output (responseMimeType JSON).
    /// Trả về payload thô; việc parse khoan dung là của extractor.
    pub async fn generate_json(&self, prompt: &str) -> Result<String, GatewayError> {
        let mut request = GenerateContentRequest::prompt(prompt);
        request.generation_config = Some(GenerationConfig {
            response_mime_type: "application/json".to_string(),
        });
        let response = self.generate(&request).await?;
        response.text().ok_or(GatewayError::EmptyResponse)
    }

    /// `generateContent` với tool google_search; trả về text cùng các
    /// citation lấy từ groundingMetadata.groundingChunks.
    pub async fn generate_grounded(&self, prompt: &str) -> Result<GroundedResponse, GatewayError> {
        let mut request = GenerateContentRequest::prompt(prompt);
        request.tools = Some(vec![Tool::google_search()]);
        let response = self.generate(&request).await?;
        Ok(GroundedResponse {
            text: response.text().unwrap_or_default(),
            citations: response.citations(),
        })
    }

    /// Mở một phiên chat với system instruction cho trước.
    pub fn start_chat(&self, system_instruction: String) -> ChatSession {
        ChatSession {
            gateway: self.clone(),
            system_instruction,
            history: Vec::new(),
        }
    }
}

/// Phiên chat giữ system instruction và toàn bộ lịch sử các turn.
/// Lịch sử chỉ được ghi khi một turn thành công trọn vẹn, nên một lần
/// gửi thất bại có thể được thử lại mà không nhân đôi turn của người dùng.
pub struct ChatSession {
    gateway: Gateway,
    system_instruction: String,
    history: Vec<Content>,
}

impl ChatSession {
    fn request_for(&self, message: &str) -> GenerateContentRequest {
        let mut contents = self.history.clone();
        contents.push(Content::user(message));
        GenerateContentRequest {
            contents,
            system_instruction: Some(Content::text(None, &self.system_instruction)),
            generation_config: None,
            tools: None,
        }
    }

    /// Ghi một turn đã hoàn tất vào lịch sử.
    pub fn commit_turn(&mut self, user_text: &str, model_text: &str) {
        self.history.push(Content::user(user_text));
        self.history.push(Content::model(model_text));
    }

    /// Gửi một lượt và đợi trả lời trọn vẹn (dùng cho greeting).
    pub async fn send(&mut self, message: &str) -> Result<String, GatewayError> {
        let request = self.request_for(message);
        let response = self.gateway.generate(&request).await?;
        let text = response.text().ok_or(GatewayError::EmptyResponse)?;
        self.commit_turn(message, &text);
        Ok(text)
    }

    /// Gửi một lượt và nhận stream các delta text, theo thứ tự server trả về.
    /// Caller tự tích lũy text và gọi `commit_turn` khi stream kết thúc
    /// thành công.
    pub async fn send_streaming(
        &self,
        message: &str,
    ) -> Result<BoxStream<'static, Result<String, GatewayError>>, GatewayError> {
        let request = self.request_for(message);
        let response = self
            .gateway
            .post("streamGenerateContent", &[("alt", "sse")], &request)
            .await?;

        let bytes = response.bytes_stream().boxed();
        let stream = futures::stream::try_unfold(
            (bytes, String::new()),
            |(mut bytes, mut buffer)| async move {
                loop {
                    if let Some(pos) = buffer.find('\n') {
                        let line = buffer[..pos].trim_end_matches('\r').to_string();
                        buffer.drain(..=pos);
                        if let Some(payload) = sse_data_payload(&line) {
                            let parsed: GenerateContentResponse = serde_json::from_str(payload)?;
                            if let Some(delta) = parsed.text() {
                                return Ok(Some((delta, (bytes, buffer))));
                            }
                        }
                        continue;
                    }
                    match bytes.next().await {
                        Some(Ok(chunk)) => buffer.push_str(&String::from_utf8_lossy(&chunk)),
                        Some(Err(err)) => return Err(GatewayError::Http(err)),
                        None => return Ok(None),
                    }
                }
            },
        );
        Ok(stream.boxed())
    }
}

/// Payload của một dòng SSE `data: {...}`, nếu có.
fn sse_data_payload(line: &str) -> Option<&str> {
    let payload = line.strip_prefix("data:")?.trim_start();
    if payload.is_empty() {
        None
    } else {
        Some(payload)
    }
}

fn api_error_message(body: &str) -> String {
    #[derive(Deserialize)]
    struct ErrorBody {
        error: ErrorDetail,
    }
    #[derive(Deserialize)]
    struct ErrorDetail {
        message: String,
    }

    match serde_json::from_str::<ErrorBody>(body) {
        Ok(parsed) => parsed.error.message,
        Err(_) => body.chars().take(200).collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn response_text_concatenates_parts() {
        let raw = r#"{"candidates":[{"content":{"role":"model","parts":[{"text":"Hel"},{"text":"lo"}]}}]}"#;
        let response: GenerateContentResponse = serde_json::from_str(raw).unwrap();
        assert_eq!(response.text().as_deref(), Some("Hello"));
    }

    #[test]
    fn response_without_candidates_has_no_text() {
        let response: GenerateContentResponse = serde_json::from_str("{}").unwrap();
        assert!(response.text().is_none());
        assert!(response.citations().is_empty());
    }

    #[test]
    fn citations_come_from_grounding_chunks() {
        let raw = r#"{
            "candidates": [{
                "content": {"role": "model", "parts": [{"text": "ok"}]},
                "groundingMetadata": {
                    "groundingChunks": [
                        {"web": {"uri": "https://example.com/a.png", "title": "A"}},
                        {"web": {"title": "no uri, skipped"}},
                        {"web": {"uri": "https://example.com/article"}}
                    ]
                }
            }]
        }"#;
        let response: GenerateContentResponse = serde_json::from_str(raw).unwrap();
        let citations = response.citations();
        assert_eq!(citations.len(), 2);
        assert_eq!(citations[0].url, "https://example.com/a.png");
        assert_eq!(citations[0].title.as_deref(), Some("A"));
        assert!(citations[1].title.is_none());
    }

    #[test]
    fn sse_payload_extraction() {
        assert_eq!(sse_data_payload("data: {\"a\":1}"), Some("{\"a\":1}"));
        assert_eq!(sse_data_payload("data:{\"a\":1}"), Some("{\"a\":1}"));
        assert_eq!(sse_data_payload("data: "), None);
        assert_eq!(sse_data_payload(": keep-alive"), None);
        assert_eq!(sse_data_payload(""), None);
    }

    #[test]
    fn missing_key_degrades_not_panics() {
        unsafe { env::remove_var(API_KEY_VAR) };
        assert!(matches!(
            Gateway::from_env("gemini-2.5-flash"),
            Err(GatewayError::MissingApiKey)
        ));
    }

    #[test]
    fn api_error_message_prefers_structured_body() {
        let body = r#"{"error":{"code":400,"message":"API key not valid","status":"INVALID_ARGUMENT"}}"#;
        assert_eq!(api_error_message(body), "API key not valid");
        assert_eq!(api_error_message("plain failure"), "plain failure");
    }
}
