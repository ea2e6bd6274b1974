//! Unit tests for response and stream assembly

#[cfg(test)]
mod tests {
    use crate::chat::assemble::{
        assemble_chunk, assemble_iter, assemble_response, assemble_stream,
    };
    use crate::chat::messages::MessageRole;
    use crate::chat::raw::{
        CompletionPayload, RawChoice, RawChunk, RawMessage, RawResponse,
    };
    use crate::error::{BridgeError, BridgeResult};
    use futures::StreamExt;
    use serde_json::json;

    fn content_chunk(text: &str) -> RawChunk {
        RawResponse::Json(json!({
            "choices": [{"delta": {"content": text}}]
        }))
    }

    #[test]
    fn test_batch_response_end_to_end() {
        let raw = RawResponse::Json(json!({
            "id": "chatcmpl-123",
            "model": "openai/gpt-4o",
            "created": 1700000000,
            "choices": [{
                "message": {"role": "assistant", "content": "Hi", "tool_calls": null},
                "finish_reason": "stop"
            }],
            "usage": {"prompt_tokens": 3, "completion_tokens": 2}
        }));

        let response = assemble_response(&raw).unwrap();
        assert_eq!(response.message.role, MessageRole::Assistant);
        assert_eq!(response.message.content, "Hi");
        assert!(response.message.tool_call_chunks.is_empty());

        let usage = response.message.usage_metadata.unwrap();
        assert_eq!(usage.input_tokens, 3);
        assert_eq!(usage.output_tokens, 2);
        assert_eq!(usage.total_tokens, 5);

        assert_eq!(response.model.as_deref(), Some("openai/gpt-4o"));
        assert_eq!(response.id.as_deref(), Some("chatcmpl-123"));
        assert_eq!(response.finish_reason.as_deref(), Some("stop"));
        assert_eq!(
            response.created.map(|created| created.timestamp()),
            Some(1700000000)
        );
    }

    #[test]
    fn test_batch_typed_payload_matches_json_payload() {
        let as_json = RawResponse::Json(json!({
            "model": "anthropic/claude-sonnet-4-5",
            "choices": [{
                "message": {"role": "assistant", "content": "ok"},
                "finish_reason": "end_turn"
            }],
            "usage": {"prompt_tokens": 1, "completion_tokens": 1}
        }));

        let as_typed = RawResponse::Typed(CompletionPayload {
            model: Some("anthropic/claude-sonnet-4-5".to_string()),
            choices: vec![RawChoice {
                message: Some(RawMessage {
                    role: Some("assistant".to_string()),
                    content: Some("ok".to_string()),
                    ..Default::default()
                }),
                finish_reason: Some("end_turn".to_string()),
                ..Default::default()
            }],
            usage: Some(json!({"prompt_tokens": 1, "completion_tokens": 1})),
            ..Default::default()
        });

        assert_eq!(
            assemble_response(&as_json).unwrap(),
            assemble_response(&as_typed).unwrap()
        );
    }

    #[test]
    fn test_response_without_choices_yields_empty_message() {
        let raw = RawResponse::Json(json!({
            "model": "openai/gpt-4o",
            "choices": [],
            "usage": {"prompt_tokens": 7, "completion_tokens": 0}
        }));

        let response = assemble_response(&raw).unwrap();
        assert_eq!(response.message.role, MessageRole::Assistant);
        assert_eq!(response.message.content, "");
        assert_eq!(
            response.message.usage_metadata.map(|usage| usage.input_tokens),
            Some(7)
        );
    }

    #[test]
    fn test_empty_usage_object_is_not_reported() {
        let raw = RawResponse::Json(json!({
            "choices": [{"message": {"role": "assistant", "content": "x"}}],
            "usage": {}
        }));
        let chunk = assemble_chunk(&raw).unwrap();
        assert!(chunk.usage_metadata.is_none());

        let raw = RawResponse::Json(json!({
            "choices": [{"message": {"role": "assistant", "content": "x"}}],
            "usage": null
        }));
        assert!(assemble_chunk(&raw).unwrap().usage_metadata.is_none());
    }

    #[test]
    fn test_usage_only_terminal_chunk_keeps_its_usage() {
        let raw = RawResponse::Json(json!({
            "choices": [],
            "usage": {"prompt_tokens": 10, "completion_tokens": 4}
        }));

        let chunk = assemble_chunk(&raw).unwrap();
        assert_eq!(chunk.content, "");
        assert!(chunk.tool_call_chunks.is_empty());
        let usage = chunk.usage_metadata.unwrap();
        assert_eq!(usage.total_tokens, 14);
    }

    #[test]
    fn test_iter_usage_lands_only_on_the_terminal_chunk() {
        let chunks: Vec<BridgeResult<RawChunk>> = vec![
            Ok(content_chunk("Hel")),
            Ok(content_chunk("lo")),
            Ok(content_chunk("!")),
            Ok(RawResponse::Json(json!({
                "choices": [],
                "usage": {"prompt_tokens": 9, "completion_tokens": 3, "total_tokens": 12}
            }))),
        ];

        let assembled: Vec<_> = assemble_iter(chunks)
            .collect::<BridgeResult<Vec<_>>>()
            .unwrap();

        assert_eq!(assembled.len(), 4);
        for chunk in &assembled[..3] {
            assert!(chunk.usage_metadata.is_none());
        }
        let usage = assembled[3].usage_metadata.as_ref().unwrap();
        assert_eq!(usage.total_tokens, 12);

        let content: String = assembled
            .iter()
            .map(|chunk| chunk.content.as_str())
            .collect();
        assert_eq!(content, "Hello!");
    }

    #[test]
    fn test_index_is_preserved_and_fragments_never_joined() {
        let chunks: Vec<BridgeResult<RawChunk>> = vec![
            Ok(RawResponse::Json(json!({
                "choices": [{"delta": {"tool_calls": [{
                    "id": "call_0",
                    "index": 0,
                    "function": {"name": "add", "arguments": "{\"a\":"}
                }]}}]
            }))),
            Ok(RawResponse::Json(json!({
                "choices": [{"delta": {"tool_calls": [{
                    "index": 0,
                    "function": {"arguments": "1}"}
                }]}}]
            }))),
        ];

        let assembled: Vec<_> = assemble_iter(chunks)
            .collect::<BridgeResult<Vec<_>>>()
            .unwrap();

        // The assembler hands fragments through untouched; joining by
        // index is the collection step's job.
        assert_eq!(assembled[0].tool_call_chunks[0].index, Some(0));
        assert_eq!(
            assembled[0].tool_call_chunks[0].args.as_deref(),
            Some("{\"a\":")
        );
        assert_eq!(assembled[1].tool_call_chunks[0].index, Some(0));
        assert_eq!(assembled[1].tool_call_chunks[0].args.as_deref(), Some("1}"));
    }

    #[test]
    fn test_usage_on_multiple_chunks_is_attached_independently() {
        let chunks: Vec<BridgeResult<RawChunk>> = vec![
            Ok(RawResponse::Json(json!({
                "choices": [{"delta": {"content": "a"}}],
                "usage": {"prompt_tokens": 5, "completion_tokens": 1}
            }))),
            Ok(RawResponse::Json(json!({
                "choices": [{"delta": {"content": "b"}}],
                "usage": {"prompt_tokens": 5, "completion_tokens": 2}
            }))),
        ];

        let assembled: Vec<_> = assemble_iter(chunks)
            .collect::<BridgeResult<Vec<_>>>()
            .unwrap();
        assert_eq!(
            assembled[0].usage_metadata.as_ref().map(|u| u.output_tokens),
            Some(1)
        );
        assert_eq!(
            assembled[1].usage_metadata.as_ref().map(|u| u.output_tokens),
            Some(2)
        );
    }

    #[test]
    fn test_iter_propagates_source_failure_in_place() {
        let chunks: Vec<BridgeResult<RawChunk>> = vec![
            Ok(content_chunk("ok")),
            Err(BridgeError::gateway("connection reset by peer")),
        ];

        let assembled: Vec<_> = assemble_iter(chunks).collect();
        assert!(matches!(
            assembled[1],
            Err(BridgeError::Gateway { .. })
        ));
        // Items already yielded before the failure stay valid.
        assert_eq!(assembled[0].as_ref().unwrap().content, "ok");
    }

    #[tokio::test]
    async fn test_stream_matches_iter_behavior() {
        let chunks: Vec<BridgeResult<RawChunk>> = vec![
            Ok(content_chunk("st")),
            Ok(content_chunk("ream")),
            Ok(RawResponse::Json(json!({
                "choices": [],
                "usage": {"prompt_tokens": 2, "completion_tokens": 2}
            }))),
        ];

        let stream = assemble_stream(Box::pin(futures::stream::iter(chunks)));
        let assembled: Vec<_> = stream.collect::<Vec<_>>().await;

        assert_eq!(assembled.len(), 3);
        let first = assembled[0].as_ref().unwrap();
        assert_eq!(first.content, "st");
        assert!(first.usage_metadata.is_none());
        let last = assembled[2].as_ref().unwrap();
        assert_eq!(
            last.usage_metadata.as_ref().map(|usage| usage.total_tokens),
            Some(4)
        );
    }

    #[tokio::test]
    async fn test_stream_propagates_mid_stream_failure() {
        let chunks: Vec<BridgeResult<RawChunk>> = vec![
            Ok(content_chunk("partial")),
            Err(BridgeError::gateway("stream aborted: 503")),
        ];

        let mut stream = assemble_stream(Box::pin(futures::stream::iter(chunks)));

        let first = stream.next().await.unwrap().unwrap();
        assert_eq!(first.content, "partial");

        let second = stream.next().await.unwrap();
        assert!(matches!(second, Err(BridgeError::Gateway { .. })));

        assert!(stream.next().await.is_none());
    }
}
