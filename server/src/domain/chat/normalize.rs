//! Chat history normalization
//!
//! Converts an OpenAI-style message list into the model's native
//! query/history/system triple. The list is consumed as a queue: an
//! optional leading system message, then (prompt, response) pairs, then
//! the final user query. Pairing uses zip-shortest semantics: a trailing
//! unpaired history message is dropped.

use std::collections::VecDeque;

use super::error::ChatError;
use super::messages::{ChatMessage, ContentPart, MessageContent, Role};
use super::resolver::ImageResolver;

/// System prompt used when the request carries no system message
pub const DEFAULT_SYSTEM_PROMPT: &str = "You are a helpful assistant.";

/// The model's native input triple
#[derive(Debug, Clone, PartialEq)]
pub struct NormalizedChat {
    /// Model-ready encoding of the final user message
    pub query: String,
    /// Prior (prompt, response) turns; None when the query is the first turn
    pub history: Option<Vec<(String, String)>>,
    pub system: String,
}

/// Normalize a message list into the query/history/system triple
///
/// Fails with `InvalidMessageSequence` unless the last message (after the
/// optional leading system message) is from the user.
pub async fn normalize_messages(
    messages: &[ChatMessage],
    resolver: &ImageResolver,
) -> Result<NormalizedChat, ChatError> {
    let mut queue: VecDeque<ChatMessage> = messages.iter().cloned().collect();

    let mut system = DEFAULT_SYSTEM_PROMPT.to_string();
    if matches!(queue.front(), Some(m) if m.role == Role::System) {
        if let Some(head) = queue.pop_front() {
            system = text_content(head.content.as_ref());
        }
    }

    let query_message = match queue.pop_back() {
        Some(m) if m.role == Role::User => m,
        _ => {
            return Err(ChatError::InvalidMessageSequence {
                messages: messages.to_vec(),
                detail: "The last message should be from the user.".to_string(),
            });
        }
    };
    let query = render_content(query_message.content.as_ref(), resolver).await?;

    let mut history = Vec::new();
    let mut turns = queue.into_iter();
    loop {
        let Some(prompt) = turns.next() else { break };
        // Zip-shortest: a trailing unpaired message is silently dropped.
        let Some(response) = turns.next() else { break };

        let prompt_text = render_content(prompt.content.as_ref(), resolver).await?;
        let response_text = text_content(response.content.as_ref());
        history.push((prompt_text, response_text));
    }

    let history = if history.is_empty() {
        None
    } else {
        Some(history)
    };

    Ok(NormalizedChat {
        query,
        history,
        system,
    })
}

/// Render message content into the model-ready encoding
///
/// Text parts pass through verbatim; image parts are resolved to local
/// paths and rendered as numbered image tags. Segment order is preserved.
async fn render_content(
    content: Option<&MessageContent>,
    resolver: &ImageResolver,
) -> Result<String, ChatError> {
    let mut out = String::new();
    let mut picture_no = 0u32;

    match content {
        None => {}
        Some(MessageContent::Text(text)) => out.push_str(text),
        Some(MessageContent::Parts(parts)) => {
            for part in parts {
                match part {
                    ContentPart::Text { text } => out.push_str(text),
                    ContentPart::ImageUrl { image_url } => {
                        let path = resolver.resolve(&image_url.url).await?;
                        picture_no += 1;
                        out.push_str(&format!(
                            "Picture {picture_no}: <img>{}</img>\n",
                            path.display()
                        ));
                    }
                }
            }
        }
    }

    Ok(out)
}

/// Raw text view of message content; images are never resolved here
/// (only user prompts carry images in this protocol).
fn text_content(content: Option<&MessageContent>) -> String {
    match content {
        None => String::new(),
        Some(MessageContent::Text(text)) => text.clone(),
        Some(MessageContent::Parts(parts)) => parts
            .iter()
            .filter_map(|part| match part {
                ContentPart::Text { text } => Some(text.as_str()),
                ContentPart::ImageUrl { .. } => None,
            })
            .collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::files::{FileCache, FileService};
    use crate::data::sqlite::SqliteService;
    use base64::engine::general_purpose::STANDARD as BASE64;
    use base64::Engine;
    use sqlx::SqlitePool;
    use std::sync::Arc;
    use std::time::Duration;
    use tempfile::TempDir;

    async fn setup_resolver(temp_dir: &TempDir) -> ImageResolver {
        let pool = SqlitePool::connect(":memory:").await.unwrap();
        SqliteService::apply_schema(&pool).await.unwrap();
        let cache = FileCache::new(temp_dir.path().join("files"));
        let files = Arc::new(FileService::new(pool, cache, 6));
        ImageResolver::new(
            files,
            temp_dir.path().join("scratch"),
            Duration::from_secs(5),
        )
        .unwrap()
    }

    fn user(text: &str) -> ChatMessage {
        ChatMessage {
            role: Role::User,
            content: Some(MessageContent::Text(text.to_string())),
        }
    }

    fn assistant(text: &str) -> ChatMessage {
        ChatMessage {
            role: Role::Assistant,
            content: Some(MessageContent::Text(text.to_string())),
        }
    }

    fn system(text: &str) -> ChatMessage {
        ChatMessage {
            role: Role::System,
            content: Some(MessageContent::Text(text.to_string())),
        }
    }

    #[tokio::test]
    async fn test_single_user_message() {
        let temp_dir = TempDir::new().unwrap();
        let resolver = setup_resolver(&temp_dir).await;

        let normalized = normalize_messages(&[user("hi")], &resolver).await.unwrap();

        assert_eq!(normalized.query, "hi");
        assert!(normalized.history.is_none());
        assert_eq!(normalized.system, DEFAULT_SYSTEM_PROMPT);
    }

    #[tokio::test]
    async fn test_system_history_and_query() {
        let temp_dir = TempDir::new().unwrap();
        let resolver = setup_resolver(&temp_dir).await;

        let messages = [system("S"), user("Q1"), assistant("A1"), user("Q2")];
        let normalized = normalize_messages(&messages, &resolver).await.unwrap();

        assert_eq!(normalized.system, "S");
        assert_eq!(
            normalized.history,
            Some(vec![("Q1".to_string(), "A1".to_string())])
        );
        assert_eq!(normalized.query, "Q2");
    }

    #[tokio::test]
    async fn test_last_message_must_be_user() {
        let temp_dir = TempDir::new().unwrap();
        let resolver = setup_resolver(&temp_dir).await;

        let messages = [user("Q1"), assistant("A1")];
        let err = normalize_messages(&messages, &resolver).await.unwrap_err();

        match err {
            ChatError::InvalidMessageSequence { messages: m, detail } => {
                assert_eq!(m.len(), 2);
                assert_eq!(detail, "The last message should be from the user.");
            }
            other => panic!("expected InvalidMessageSequence, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_empty_list_rejected() {
        let temp_dir = TempDir::new().unwrap();
        let resolver = setup_resolver(&temp_dir).await;

        let err = normalize_messages(&[], &resolver).await.unwrap_err();
        assert!(matches!(err, ChatError::InvalidMessageSequence { .. }));
    }

    #[tokio::test]
    async fn test_trailing_unpaired_history_dropped() {
        let temp_dir = TempDir::new().unwrap();
        let resolver = setup_resolver(&temp_dir).await;

        // After the query is taken, [Q1, A1, Q-orphan] remains; the orphan
        // has no paired response and is dropped.
        let messages = [
            user("Q1"),
            assistant("A1"),
            user("Q-orphan"),
            user("Q-final"),
        ];
        let normalized = normalize_messages(&messages, &resolver).await.unwrap();

        assert_eq!(normalized.query, "Q-final");
        assert_eq!(
            normalized.history,
            Some(vec![("Q1".to_string(), "A1".to_string())])
        );
    }

    #[tokio::test]
    async fn test_multimodal_query_rendering() {
        let temp_dir = TempDir::new().unwrap();
        let resolver = setup_resolver(&temp_dir).await;

        let reference = format!("data:image/png;base64,{}", BASE64.encode(b"img-bytes"));
        let messages = [ChatMessage {
            role: Role::User,
            content: Some(MessageContent::Parts(vec![
                ContentPart::Text {
                    text: "what is in this image?".to_string(),
                },
                ContentPart::ImageUrl {
                    image_url: crate::domain::chat::messages::ImageUrl { url: reference },
                },
            ])),
        }];

        let normalized = normalize_messages(&messages, &resolver).await.unwrap();

        assert!(normalized.query.starts_with("what is in this image?"));
        assert!(normalized.query.contains("Picture 1: <img>"));
        assert!(normalized.query.trim_end().ends_with("</img>"));
        assert!(normalized.query.contains(".png"));
    }

    #[tokio::test]
    async fn test_structured_assistant_turn_takes_text_only() {
        let temp_dir = TempDir::new().unwrap();
        let resolver = setup_resolver(&temp_dir).await;

        let messages = [
            user("Q1"),
            ChatMessage {
                role: Role::Assistant,
                content: Some(MessageContent::Parts(vec![
                    ContentPart::Text {
                        text: "A1".to_string(),
                    },
                    ContentPart::ImageUrl {
                        image_url: crate::domain::chat::messages::ImageUrl {
                            url: "https://example.com/never-fetched.png".to_string(),
                        },
                    },
                ])),
            },
            user("Q2"),
        ];

        // The assistant image reference must not be resolved (no download
        // is attempted), only its text parts survive.
        let normalized = normalize_messages(&messages, &resolver).await.unwrap();
        assert_eq!(
            normalized.history,
            Some(vec![("Q1".to_string(), "A1".to_string())])
        );
    }

    #[tokio::test]
    async fn test_missing_content_renders_empty() {
        let temp_dir = TempDir::new().unwrap();
        let resolver = setup_resolver(&temp_dir).await;

        let messages = [ChatMessage {
            role: Role::User,
            content: None,
        }];
        let normalized = normalize_messages(&messages, &resolver).await.unwrap();
        assert_eq!(normalized.query, "");
    }
}
