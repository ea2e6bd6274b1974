//! Unit tests for the chat client glue

#[cfg(test)]
mod tests {
    use crate::chat::client::ChatClient;
    use crate::chat::gateway::{CompletionRequest, Gateway, ModelParameters};
    use crate::chat::messages::{ChatMessage, MessageRole};
    use crate::chat::raw::{RawChunk, RawResponse};
    use crate::chat::streaming::{RawStream, collect_stream};
    use crate::config::GatewayConfig;
    use crate::error::{BridgeError, BridgeResult};
    use async_trait::async_trait;
    use serde_json::json;
    use std::sync::{Arc, Mutex};

    /// Scripted gateway: returns canned payloads and records the last
    /// request it saw.
    struct ScriptedGateway {
        response: RawResponse,
        stream_chunks: Vec<BridgeResult<RawChunk>>,
        last_request: Mutex<Option<CompletionRequest>>,
    }

    impl ScriptedGateway {
        fn batch(response: RawResponse) -> Self {
            Self {
                response,
                stream_chunks: Vec::new(),
                last_request: Mutex::new(None),
            }
        }

        fn streaming(chunks: Vec<BridgeResult<RawChunk>>) -> Self {
            Self {
                response: RawResponse::Json(json!({})),
                stream_chunks: chunks,
                last_request: Mutex::new(None),
            }
        }

        fn take_request(&self) -> CompletionRequest {
            self.last_request.lock().unwrap().take().unwrap()
        }
    }

    #[async_trait]
    impl Gateway for ScriptedGateway {
        async fn complete(&self, request: &CompletionRequest) -> BridgeResult<RawResponse> {
            *self.last_request.lock().unwrap() = Some(request.clone());
            Ok(self.response.clone())
        }

        async fn complete_stream(&self, request: &CompletionRequest) -> BridgeResult<RawStream> {
            *self.last_request.lock().unwrap() = Some(request.clone());
            let chunks: Vec<BridgeResult<RawChunk>> = self
                .stream_chunks
                .iter()
                .map(|chunk| match chunk {
                    Ok(raw) => Ok(raw.clone()),
                    Err(err) => Err(err.clone()),
                })
                .collect();
            Ok(Box::pin(futures::stream::iter(chunks)))
        }
    }

    fn test_client(gateway: Arc<ScriptedGateway>) -> ChatClient {
        ChatClient::new(
            gateway,
            GatewayConfig::new()
                .with_api_key("sk-test")
                .with_max_retries(2),
            ModelParameters::new("openai/gpt-4o-mini"),
        )
        .unwrap()
    }

    #[test]
    fn test_rejects_invalid_config() {
        let gateway = Arc::new(ScriptedGateway::batch(RawResponse::Json(json!({}))));
        let result = ChatClient::new(
            gateway,
            GatewayConfig::new().with_api_base("not-a-url"),
            ModelParameters::default(),
        );
        assert!(matches!(result, Err(BridgeError::Config { .. })));
    }

    #[test]
    fn test_stream_options_present_only_when_streaming() {
        let gateway = Arc::new(ScriptedGateway::batch(RawResponse::Json(json!({}))));
        let messages = [ChatMessage::user("Hello")];

        let batch_client = test_client(gateway.clone());
        let request = batch_client.default_request(&messages);
        assert!(!request.stream);
        assert!(request.stream_options.is_none());

        let streaming_client = test_client(gateway.clone()).with_streaming(true);
        let request = streaming_client.default_request(&messages);
        assert!(request.stream);
        assert!(request.stream_options.is_some_and(|opts| opts.include_usage));

        let quiet_client = test_client(gateway)
            .with_streaming(true)
            .with_stream_usage(false);
        let request = quiet_client.default_request(&messages);
        assert!(request.stream_options.is_none());
    }

    #[test]
    fn test_request_serialization_drops_absent_parameters() {
        let gateway = Arc::new(ScriptedGateway::batch(RawResponse::Json(json!({}))));
        let client = test_client(gateway);
        let request = client.default_request(&[ChatMessage::user("hi")]);

        let body = serde_json::to_value(&request).unwrap();
        assert_eq!(body["model"], "openai/gpt-4o-mini");
        assert_eq!(body["api_key"], "sk-test");
        assert_eq!(body["max_retries"], 2);
        assert!(body.get("top_p").is_none());
        assert!(body.get("stop").is_none());
        assert!(body.get("api_base").is_none());
    }

    #[tokio::test]
    async fn test_chat_assembles_batch_response() {
        let gateway = Arc::new(ScriptedGateway::batch(RawResponse::Json(json!({
            "id": "chatcmpl-1",
            "model": "openai/gpt-4o-mini",
            "choices": [{
                "message": {"role": "assistant", "content": "Hello!"},
                "finish_reason": "stop"
            }],
            "usage": {"prompt_tokens": 3, "completion_tokens": 2}
        }))));

        let client = test_client(gateway.clone());
        let response = client.chat(&[ChatMessage::user("Hi")]).await.unwrap();

        assert_eq!(response.message.role, MessageRole::Assistant);
        assert_eq!(response.message.content, "Hello!");
        assert_eq!(
            response
                .message
                .usage_metadata
                .map(|usage| usage.total_tokens),
            Some(5)
        );

        let request = gateway.take_request();
        assert!(!request.stream);
        assert_eq!(request.messages.len(), 1);
        assert_eq!(request.messages[0]["role"], "user");
        assert_eq!(request.messages[0]["content"], "Hi");
    }

    #[tokio::test]
    async fn test_chat_forces_batch_even_on_streaming_client() {
        let gateway = Arc::new(ScriptedGateway::batch(RawResponse::Json(json!({
            "choices": [{"message": {"role": "assistant", "content": "x"}}]
        }))));
        let client = test_client(gateway.clone()).with_streaming(true);

        client.chat(&[ChatMessage::user("Hi")]).await.unwrap();
        let request = gateway.take_request();
        assert!(!request.stream);
        assert!(request.stream_options.is_none());
    }

    #[tokio::test]
    async fn test_chat_stream_yields_canonical_chunks_with_usage() {
        let gateway = Arc::new(ScriptedGateway::streaming(vec![
            Ok(RawResponse::Json(json!({
                "choices": [{"delta": {"role": "assistant", "content": "Str"}}]
            }))),
            Ok(RawResponse::Json(json!({
                "choices": [{"delta": {"content": "eam"}}]
            }))),
            Ok(RawResponse::Json(json!({
                "choices": [],
                "usage": {"prompt_tokens": 4, "completion_tokens": 2}
            }))),
        ]));

        let client = test_client(gateway.clone()).with_streaming(true);
        let stream = client.chat_stream(&[ChatMessage::user("Hi")]).await.unwrap();
        let collected = collect_stream(stream).await.unwrap();

        assert_eq!(collected.content, "Stream");
        assert_eq!(collected.usage.map(|usage| usage.total_tokens), Some(6));

        let request = gateway.take_request();
        assert!(request.stream);
        assert!(request.stream_options.is_some_and(|opts| opts.include_usage));
    }

    #[tokio::test]
    async fn test_chat_stream_propagates_gateway_failure() {
        let gateway = Arc::new(ScriptedGateway::streaming(vec![
            Ok(RawResponse::Json(json!({
                "choices": [{"delta": {"content": "partial"}}]
            }))),
            Err(BridgeError::gateway("connection dropped")),
        ]));

        let client = test_client(gateway).with_streaming(true);
        let stream = client.chat_stream(&[ChatMessage::user("Hi")]).await.unwrap();
        let result = collect_stream(stream).await;
        assert!(matches!(result, Err(BridgeError::Gateway { .. })));
    }

    #[test]
    fn test_tool_message_wire_shape() {
        let message = ChatMessage::tool("42", "call_7");
        let wire = message.to_wire();
        assert_eq!(wire["role"], "tool");
        assert_eq!(wire["content"], "42");
        assert_eq!(wire["tool_call_id"], "call_7");
    }
}
