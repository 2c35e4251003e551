//! OpenAI-compatible chat wire types
//!
//! Request shapes mirror the chat-completions API: message content is either
//! a plain string or an ordered list of typed parts (`text` / `image_url`).

use chrono::Utc;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Message author role
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
    System,
    Tool,
}

/// Image reference inside a content part
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageUrl {
    pub url: String,
}

/// One typed segment of a structured message content list
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ContentPart {
    Text { text: String },
    ImageUrl { image_url: ImageUrl },
}

/// Message content: plain text or an ordered sequence of typed parts
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum MessageContent {
    Text(String),
    Parts(Vec<ContentPart>),
}

/// One chat message; transient, request-scoped
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: Role,
    #[serde(default)]
    pub content: Option<MessageContent>,
}

fn default_temperature() -> f32 {
    1.0
}

fn default_top_p() -> f32 {
    1.0
}

/// Chat completion request body
#[derive(Debug, Clone, Deserialize)]
pub struct ChatCompletionRequest {
    pub model: String,
    pub messages: Vec<ChatMessage>,
    #[serde(default = "default_temperature")]
    pub temperature: f32,
    #[serde(default = "default_top_p")]
    pub top_p: f32,
    #[serde(default)]
    pub seed: Option<i64>,
    #[serde(default)]
    pub max_tokens: Option<u32>,
    #[serde(default)]
    pub stream: bool,
    #[serde(default)]
    pub stop: Option<Vec<String>>,
    #[serde(default)]
    pub functions: Option<serde_json::Value>,
    #[serde(default)]
    pub tools: Option<serde_json::Value>,
}

/// One choice of a completion response
#[derive(Debug, Clone, Serialize)]
pub struct ChatCompletionChoice {
    pub index: u32,
    pub message: ChatMessage,
    pub finish_reason: &'static str,
}

/// Chat completion response envelope
#[derive(Debug, Clone, Serialize)]
pub struct ChatCompletionResponse {
    pub id: String,
    pub object: &'static str,
    pub created: i64,
    pub model: String,
    pub choices: Vec<ChatCompletionChoice>,
    pub usage: Option<serde_json::Value>,
}

impl ChatCompletionResponse {
    /// Wrap generated text into a single-choice `chat.completion` envelope
    pub fn single(model: &str, text: String) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            object: "chat.completion",
            created: Utc::now().timestamp(),
            model: model.to_string(),
            choices: vec![ChatCompletionChoice {
                index: 0,
                message: ChatMessage {
                    role: Role::Assistant,
                    content: Some(MessageContent::Text(text)),
                },
                finish_reason: "stop",
            }],
            usage: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_text_message_deserializes() {
        let msg: ChatMessage = serde_json::from_str(r#"{"role":"user","content":"hi"}"#).unwrap();
        assert_eq!(msg.role, Role::User);
        assert_eq!(msg.content, Some(MessageContent::Text("hi".to_string())));
    }

    #[test]
    fn test_structured_message_deserializes() {
        let msg: ChatMessage = serde_json::from_str(
            r#"{
                "role": "user",
                "content": [
                    {"type": "text", "text": "what is in this image?"},
                    {"type": "image_url", "image_url": {"url": "https://example.com/a.png"}}
                ]
            }"#,
        )
        .unwrap();

        match msg.content.unwrap() {
            MessageContent::Parts(parts) => {
                assert_eq!(parts.len(), 2);
                assert!(matches!(parts[0], ContentPart::Text { .. }));
                assert!(matches!(parts[1], ContentPart::ImageUrl { .. }));
            }
            other => panic!("expected parts, got {other:?}"),
        }
    }

    #[test]
    fn test_missing_content_allowed() {
        let msg: ChatMessage = serde_json::from_str(r#"{"role":"assistant"}"#).unwrap();
        assert!(msg.content.is_none());
    }

    #[test]
    fn test_request_defaults() {
        let request: ChatCompletionRequest = serde_json::from_str(
            r#"{"model": "m", "messages": [{"role": "user", "content": "q"}]}"#,
        )
        .unwrap();
        assert_eq!(request.temperature, 1.0);
        assert_eq!(request.top_p, 1.0);
        assert!(!request.stream);
        assert!(request.functions.is_none());
        assert!(request.tools.is_none());
    }

    #[test]
    fn test_response_envelope_shape() {
        let response = ChatCompletionResponse::single("ns/model", "hello".to_string());
        let value = serde_json::to_value(&response).unwrap();

        assert_eq!(value["object"], "chat.completion");
        assert_eq!(value["model"], "ns/model");
        assert_eq!(value["choices"][0]["index"], 0);
        assert_eq!(value["choices"][0]["message"]["role"], "assistant");
        assert_eq!(value["choices"][0]["message"]["content"], "hello");
        assert_eq!(value["choices"][0]["finish_reason"], "stop");
        assert!(value["usage"].is_null());
    }
}
