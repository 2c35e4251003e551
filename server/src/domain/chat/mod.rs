//! Chat completion pipeline
//!
//! - `messages` - OpenAI-compatible wire types
//! - `normalize` - message list to query/history/system triple
//! - `resolver` - image reference resolution
//! - `generate` - the injected generation capability
//! - `error` - chat pipeline error types

pub mod error;
pub mod generate;
pub mod messages;
pub mod normalize;
pub mod resolver;

pub use error::{ChatError, ResolveError};
pub use generate::{GenerateError, RuntimeGenerator, SamplingParams, TextGenerator};
pub use messages::{ChatCompletionRequest, ChatCompletionResponse, ChatMessage};
pub use normalize::{normalize_messages, NormalizedChat, DEFAULT_SYSTEM_PROMPT};
pub use resolver::ImageResolver;

use std::sync::Arc;

/// Chat completion service
///
/// Validates the requested model identity, rejects disallowed features,
/// normalizes the message history, and invokes the generation capability.
pub struct ChatService {
    model_name: String,
    generator: Arc<dyn TextGenerator>,
    resolver: ImageResolver,
}

impl ChatService {
    pub fn new(
        model_name: String,
        generator: Arc<dyn TextGenerator>,
        resolver: ImageResolver,
    ) -> Self {
        Self {
            model_name,
            generator,
            resolver,
        }
    }

    /// Name the served model is addressed by
    pub fn model_name(&self) -> &str {
        &self.model_name
    }

    /// Namespace portion of the model name (text before the first `/`)
    pub fn model_owner(&self) -> &str {
        self.model_name
            .split_once('/')
            .map(|(namespace, _)| namespace)
            .unwrap_or("owner")
    }

    /// Run one chat completion
    pub async fn complete(
        &self,
        request: ChatCompletionRequest,
    ) -> Result<ChatCompletionResponse, ChatError> {
        if request.model != self.model_name {
            return Err(ChatError::ModelNotFound(request.model));
        }

        if request.functions.is_some() || request.tools.is_some() {
            return Err(ChatError::FunctionCallNotAllowed(String::new()));
        }

        if request.stream {
            return Err(ChatError::NotImplemented("Stream chat"));
        }

        let normalized = normalize_messages(&request.messages, &self.resolver).await?;
        tracing::debug!(
            query = %normalized.query,
            system = %normalized.system,
            turns = normalized.history.as_ref().map(Vec::len).unwrap_or(0),
            "Normalized chat input"
        );

        let params = SamplingParams {
            temperature: request.temperature,
            top_p: request.top_p,
            seed: request.seed,
            max_tokens: request.max_tokens,
        };
        let history = normalized.history.unwrap_or_default();
        let text = self
            .generator
            .generate(&normalized.query, &history, &normalized.system, &params)
            .await?;

        Ok(ChatCompletionResponse::single(&self.model_name, text))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::files::{FileCache, FileService};
    use crate::data::sqlite::SqliteService;
    use async_trait::async_trait;
    use sqlx::SqlitePool;
    use std::sync::Mutex;
    use std::time::Duration;
    use tempfile::TempDir;

    use super::messages::{MessageContent, Role};

    #[derive(Debug, Clone, PartialEq)]
    struct RecordedCall {
        query: String,
        history: Vec<(String, String)>,
        system: String,
        params: SamplingParams,
    }

    struct MockGenerator {
        reply: String,
        calls: Mutex<Vec<RecordedCall>>,
    }

    impl MockGenerator {
        fn new(reply: &str) -> Arc<Self> {
            Arc::new(Self {
                reply: reply.to_string(),
                calls: Mutex::new(Vec::new()),
            })
        }

        fn calls(&self) -> Vec<RecordedCall> {
            self.calls.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl TextGenerator for MockGenerator {
        async fn generate(
            &self,
            query: &str,
            history: &[(String, String)],
            system: &str,
            params: &SamplingParams,
        ) -> Result<String, GenerateError> {
            self.calls.lock().unwrap().push(RecordedCall {
                query: query.to_string(),
                history: history.to_vec(),
                system: system.to_string(),
                params: params.clone(),
            });
            Ok(self.reply.clone())
        }
    }

    async fn setup_service(temp_dir: &TempDir, generator: Arc<MockGenerator>) -> ChatService {
        let pool = SqlitePool::connect(":memory:").await.unwrap();
        SqliteService::apply_schema(&pool).await.unwrap();
        let cache = FileCache::new(temp_dir.path().join("files"));
        let files = Arc::new(FileService::new(pool, cache, 6));
        let resolver = ImageResolver::new(
            files,
            temp_dir.path().join("scratch"),
            Duration::from_secs(5),
        )
        .unwrap();
        ChatService::new("Qwen/Qwen-VL-Chat-Int4".to_string(), generator, resolver)
    }

    fn request(model: &str, messages: Vec<ChatMessage>) -> ChatCompletionRequest {
        ChatCompletionRequest {
            model: model.to_string(),
            messages,
            temperature: 0.7,
            top_p: 0.9,
            seed: Some(42),
            max_tokens: None,
            stream: false,
            stop: None,
            functions: None,
            tools: None,
        }
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

    #[tokio::test]
    async fn test_model_mismatch_rejected() {
        let temp_dir = TempDir::new().unwrap();
        let generator = MockGenerator::new("reply");
        let service = setup_service(&temp_dir, generator.clone()).await;

        let err = service
            .complete(request("gpt-4", vec![user("hi")]))
            .await
            .unwrap_err();
        assert!(matches!(err, ChatError::ModelNotFound(name) if name == "gpt-4"));
        assert!(generator.calls().is_empty());
    }

    #[tokio::test]
    async fn test_tools_rejected_before_generation() {
        let temp_dir = TempDir::new().unwrap();
        let generator = MockGenerator::new("reply");
        let service = setup_service(&temp_dir, generator.clone()).await;

        let mut req = request("Qwen/Qwen-VL-Chat-Int4", vec![user("hi")]);
        req.tools = Some(serde_json::json!([{"type": "function"}]));

        let err = service.complete(req).await.unwrap_err();
        assert!(matches!(err, ChatError::FunctionCallNotAllowed(_)));
        assert!(generator.calls().is_empty());
    }

    #[tokio::test]
    async fn test_functions_rejected() {
        let temp_dir = TempDir::new().unwrap();
        let generator = MockGenerator::new("reply");
        let service = setup_service(&temp_dir, generator.clone()).await;

        let mut req = request("Qwen/Qwen-VL-Chat-Int4", vec![user("hi")]);
        req.functions = Some(serde_json::json!([]));

        let err = service.complete(req).await.unwrap_err();
        assert!(matches!(err, ChatError::FunctionCallNotAllowed(_)));
    }

    #[tokio::test]
    async fn test_stream_not_implemented() {
        let temp_dir = TempDir::new().unwrap();
        let generator = MockGenerator::new("reply");
        let service = setup_service(&temp_dir, generator.clone()).await;

        let mut req = request("Qwen/Qwen-VL-Chat-Int4", vec![user("hi")]);
        req.stream = true;

        let err = service.complete(req).await.unwrap_err();
        assert!(matches!(err, ChatError::NotImplemented(_)));
        assert!(generator.calls().is_empty());
    }

    #[tokio::test]
    async fn test_invalid_sequence_propagates() {
        let temp_dir = TempDir::new().unwrap();
        let generator = MockGenerator::new("reply");
        let service = setup_service(&temp_dir, generator.clone()).await;

        let err = service
            .complete(request(
                "Qwen/Qwen-VL-Chat-Int4",
                vec![user("hi"), assistant("hello")],
            ))
            .await
            .unwrap_err();
        assert!(matches!(err, ChatError::InvalidMessageSequence { .. }));
        assert!(generator.calls().is_empty());
    }

    #[tokio::test]
    async fn test_successful_completion() {
        let temp_dir = TempDir::new().unwrap();
        let generator = MockGenerator::new("the answer");
        let service = setup_service(&temp_dir, generator.clone()).await;

        let response = service
            .complete(request(
                "Qwen/Qwen-VL-Chat-Int4",
                vec![user("Q1"), assistant("A1"), user("Q2")],
            ))
            .await
            .unwrap();

        assert_eq!(response.object, "chat.completion");
        assert_eq!(response.model, "Qwen/Qwen-VL-Chat-Int4");
        assert_eq!(response.choices.len(), 1);
        assert_eq!(response.choices[0].finish_reason, "stop");
        assert_eq!(
            response.choices[0].message.content,
            Some(MessageContent::Text("the answer".to_string()))
        );

        let calls = generator.calls();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].query, "Q2");
        assert_eq!(calls[0].history, vec![("Q1".to_string(), "A1".to_string())]);
        assert_eq!(calls[0].system, DEFAULT_SYSTEM_PROMPT);
        assert_eq!(calls[0].params.temperature, 0.7);
        assert_eq!(calls[0].params.seed, Some(42));
    }

    #[tokio::test]
    async fn test_model_owner_namespace() {
        let temp_dir = TempDir::new().unwrap();
        let service = setup_service(&temp_dir, MockGenerator::new("")).await;
        assert_eq!(service.model_owner(), "Qwen");
        assert_eq!(service.model_name(), "Qwen/Qwen-VL-Chat-Int4");
    }
}
