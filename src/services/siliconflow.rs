//! SiliconFlow provider adapter
//!
//! Speaks the OpenAI-compatible streaming chat-completion protocol:
//! normalizes internal messages to the wire shape, injects the active model
//! name into the system prompt, issues the request through the injected
//! transport, and folds the streamed deltas into accumulated text.

use std::sync::Arc;

use async_trait::async_trait;
use futures::StreamExt;
use reqwest::header::{self, HeaderMap, HeaderValue};
use serde::{Deserialize, Serialize};
use tokio_util::sync::CancellationToken;
use tracing::debug;

use crate::{
    config::{settings::Settings, CUSTOM_MODEL},
    error::{ChatError, Result},
    messages::{ChatMessage, Role},
};

use super::{
    streaming::{ChatStreamAccumulator, FrameOutcome, SseParser},
    ChatProvider, OnResultChange, ReqwestTransport, SnapshotStream, StreamingHttp,
};

/// Provider display name
pub const PROVIDER_NAME: &str = "SiliconFlow";

/// Host used when the configured host is empty
pub const DEFAULT_API_HOST: &str = "https://api.siliconflow.cn";

/// Default chat-completion request path
pub const DEFAULT_API_PATH: &str = "/v1/chat/completions";

// The provider rejects image content for most models with this exact text.
// A single fixed substring match, brittle by design.
const IMAGE_NOT_SUPPORTED_MARKER: &str = "image_url is only supported by certain models";

/// Per-adapter options, supplied once and immutable for the adapter's lifetime
#[derive(Debug, Clone)]
pub struct SiliconFlowOptions {
    pub api_key: String,
    pub api_host: String,
    pub api_path: Option<String>,
    pub model: String,
    pub custom_model_name: Option<String>,
    pub temperature: f32,
    pub top_p: f32,
}

impl SiliconFlowOptions {
    /// Build options from persisted settings plus a resolved API key
    #[must_use]
    pub fn from_settings(settings: &Settings, api_key: String) -> Self {
        Self {
            api_key,
            api_host: settings.api_host.clone(),
            api_path: settings.api_path.clone(),
            model: settings.model.clone(),
            custom_model_name: settings.custom_model_name.clone(),
            temperature: settings.temperature,
            top_p: settings.top_p,
        }
    }

    /// Model id sent on the wire; the `custom-model` sentinel substitutes
    /// the user-supplied custom name
    #[must_use]
    pub fn resolved_model(&self) -> String {
        if self.model == CUSTOM_MODEL {
            self.custom_model_name.clone().unwrap_or_default()
        } else {
            self.model.clone()
        }
    }

    /// Full request URL. The configured host is authoritative; the provider
    /// default applies only when no host is configured.
    #[must_use]
    pub fn endpoint(&self) -> String {
        let host = if self.api_host.is_empty() {
            DEFAULT_API_HOST
        } else {
            self.api_host.as_str()
        };
        let path = self.api_path.as_deref().unwrap_or(DEFAULT_API_PATH);
        format!("{host}{path}")
    }
}

/// Provider-facing message shape, stripped of internal-only fields
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WireMessage {
    pub role: Role,
    pub content: String,
}

/// Normalize internal messages to wire messages.
///
/// Order and length are preserved; only `role` and `content` are copied.
#[must_use]
pub fn to_wire_messages(messages: &[ChatMessage]) -> Vec<WireMessage> {
    messages
        .iter()
        .map(|msg| WireMessage {
            role: msg.role,
            content: msg.content.clone(),
        })
        .collect()
}

/// Prepend `Current model: <model>` to the first system message.
///
/// The provider requires this side channel to disambiguate behavior per
/// model. At most one message is modified; without a system message this is
/// a no-op. Re-running on already-injected content prepends again, so the
/// caller must normalize from application state on retry.
pub fn inject_model_system_prompt(model: &str, messages: &mut [WireMessage]) {
    for message in messages.iter_mut() {
        if message.role == Role::System {
            message.content = format!("Current model: {model}\n\n{}", message.content);
            break;
        }
    }
}

/// Streaming chat-completion request body
#[derive(Debug, Serialize)]
struct ChatCompletionRequest<'a> {
    messages: &'a [WireMessage],
    model: &'a str,
    /// Always omitted; the provider applies the per-model cap
    #[serde(skip_serializing_if = "Option::is_none")]
    max_tokens: Option<u32>,
    temperature: f32,
    top_p: f32,
    stream: bool,
}

/// SiliconFlow adapter
pub struct SiliconFlow {
    transport: Arc<dyn StreamingHttp>,
    options: SiliconFlowOptions,
}

impl SiliconFlow {
    /// Create an adapter with the default reqwest transport
    pub fn new(options: SiliconFlowOptions) -> Result<Self> {
        let transport = Arc::new(ReqwestTransport::new()?);
        Ok(Self::with_transport(options, transport))
    }

    /// Create an adapter with an injected transport
    #[must_use]
    pub fn with_transport(options: SiliconFlowOptions, transport: Arc<dyn StreamingHttp>) -> Self {
        Self { transport, options }
    }

    /// Adapter options
    #[must_use]
    pub fn options(&self) -> &SiliconFlowOptions {
        &self.options
    }

    fn headers(&self) -> Result<HeaderMap> {
        let mut headers = HeaderMap::new();
        headers.insert(
            header::AUTHORIZATION,
            HeaderValue::from_str(&format!("Bearer {}", self.options.api_key))
                .map_err(|_| ChatError::InvalidConfig("Invalid API key format".to_string()))?,
        );
        headers.insert(
            header::CONTENT_TYPE,
            HeaderValue::from_static("application/json"),
        );
        Ok(headers)
    }

    /// Lazy per-call stream of accumulated-text snapshots.
    ///
    /// The request is issued on first poll. Each item is the full text so
    /// far; the stream ends at the `[DONE]` sentinel or when the response
    /// body does. Triggering `cancel` aborts the request and yields
    /// [`ChatError::Cancelled`].
    #[must_use]
    pub fn snapshots(&self, messages: &[ChatMessage], cancel: CancellationToken) -> SnapshotStream {
        let transport = Arc::clone(&self.transport);
        let url = self.options.endpoint();
        let headers = self.headers();
        let model = self.options.resolved_model();

        let mut wire_messages = to_wire_messages(messages);
        inject_model_system_prompt(&model, &mut wire_messages);

        let body = serde_json::to_value(ChatCompletionRequest {
            messages: &wire_messages,
            model: &model,
            max_tokens: None,
            temperature: self.options.temperature,
            top_p: self.options.top_p,
            stream: true,
        });

        Box::pin(async_stream::stream! {
            let headers = match headers {
                Ok(headers) => headers,
                Err(e) => {
                    yield Err(e);
                    return;
                }
            };
            let body = match body {
                Ok(body) => body,
                Err(e) => {
                    yield Err(e.into());
                    return;
                }
            };

            debug!(%url, %model, "sending streaming chat completion request");

            let response = tokio::select! {
                () = cancel.cancelled() => Err(ChatError::Cancelled),
                response = transport.post_stream(&url, headers, body) => response,
            };
            let mut byte_stream = match response {
                Ok(stream) => stream,
                Err(e) => {
                    yield Err(e);
                    return;
                }
            };

            let mut parser = SseParser::new();
            let mut accumulator = ChatStreamAccumulator::new(PROVIDER_NAME);
            let mut done = false;

            'receive: while !done {
                let step = tokio::select! {
                    () = cancel.cancelled() => Err(ChatError::Cancelled),
                    chunk = byte_stream.next() => Ok(chunk),
                };
                let chunk = match step {
                    Ok(chunk) => chunk,
                    Err(e) => {
                        yield Err(e);
                        return;
                    }
                };

                let Some(chunk) = chunk else { break };
                let bytes = match chunk {
                    Ok(bytes) => bytes,
                    Err(e) => {
                        yield Err(e);
                        return;
                    }
                };
                let frames = match parser.parse_bytes(&bytes) {
                    Ok(frames) => frames,
                    Err(e) => {
                        yield Err(ChatError::Other(format!("Invalid UTF-8 in stream: {e}")));
                        return;
                    }
                };

                for frame in frames {
                    match accumulator.process_frame(&frame) {
                        Ok(FrameOutcome::Delta) => yield Ok(accumulator.text().to_string()),
                        Ok(FrameOutcome::NoChange) => {}
                        Ok(FrameOutcome::Done) => {
                            done = true;
                            continue 'receive;
                        }
                        Err(e) => {
                            yield Err(e);
                            return;
                        }
                    }
                }
            }

            // Flush a trailing frame the stream ended without terminating
            if !done {
                if let Some(frame) = parser.flush() {
                    match accumulator.process_frame(&frame) {
                        Ok(FrameOutcome::Delta) => yield Ok(accumulator.text().to_string()),
                        Ok(FrameOutcome::NoChange | FrameOutcome::Done) => {}
                        Err(e) => yield Err(e),
                    }
                }
            }
        })
    }

    async fn chat_completion_inner(
        &self,
        messages: &[ChatMessage],
        cancel: Option<CancellationToken>,
        mut on_result_change: Option<OnResultChange<'_>>,
    ) -> Result<String> {
        let cancel = cancel.unwrap_or_default();
        let mut snapshots = self.snapshots(messages, cancel);

        let mut result = String::new();
        while let Some(snapshot) = snapshots.next().await {
            result = snapshot?;
            if let Some(callback) = on_result_change.as_mut() {
                callback(&result);
            }
        }

        Ok(result)
    }
}

#[async_trait]
impl ChatProvider for SiliconFlow {
    fn name(&self) -> &str {
        PROVIDER_NAME
    }

    async fn call_chat_completion(
        &self,
        messages: &[ChatMessage],
        cancel: Option<CancellationToken>,
        on_result_change: Option<OnResultChange<'_>>,
    ) -> Result<String> {
        match self
            .chat_completion_inner(messages, cancel, on_result_change)
            .await
        {
            Err(ChatError::Api(message)) if message.contains(IMAGE_NOT_SUPPORTED_MARKER) => {
                Err(ChatError::ModelNotSupportImage)
            }
            result => result,
        }
    }
}

#[cfg(test)]
mod tests {
    use bytes::Bytes;
    use pretty_assertions::assert_eq;

    use crate::services::ByteStream;

    use super::*;

    /// Transport stub replaying a response body in fixed byte chunks
    struct ChunkedTransport {
        chunks: Vec<Vec<u8>>,
    }

    #[async_trait]
    impl StreamingHttp for ChunkedTransport {
        async fn post_stream(
            &self,
            _url: &str,
            _headers: HeaderMap,
            _body: serde_json::Value,
        ) -> Result<ByteStream> {
            let chunks = self.chunks.clone();
            Ok(Box::pin(futures::stream::iter(
                chunks.into_iter().map(|chunk| Ok(Bytes::from(chunk))),
            )))
        }
    }

    fn options() -> SiliconFlowOptions {
        SiliconFlowOptions {
            api_key: "sk-test".to_string(),
            api_host: String::new(),
            api_path: None,
            model: "deepseek-ai/DeepSeek-V3".to_string(),
            custom_model_name: None,
            temperature: 0.7,
            top_p: 1.0,
        }
    }

    #[test]
    fn test_normalizer_preserves_length_and_order() {
        let messages = vec![
            ChatMessage::system("sys"),
            ChatMessage {
                role: Role::User,
                content: "hi".to_string(),
                name: Some("alice".to_string()),
            },
            ChatMessage::assistant("hello"),
        ];

        let wire = to_wire_messages(&messages);
        assert_eq!(wire.len(), 3);
        assert_eq!(wire[0].role, Role::System);
        assert_eq!(wire[0].content, "sys");
        assert_eq!(wire[1].role, Role::User);
        assert_eq!(wire[1].content, "hi");
        assert_eq!(wire[2].role, Role::Assistant);

        // Internal-only fields do not survive serialization
        let json = serde_json::to_value(&wire[1]).unwrap();
        assert_eq!(
            json,
            serde_json::json!({"role": "user", "content": "hi"})
        );
    }

    #[test]
    fn test_injector_rewrites_first_system_message_only() {
        let mut wire = to_wire_messages(&[
            ChatMessage::user("before"),
            ChatMessage::system("first"),
            ChatMessage::system("second"),
        ]);

        inject_model_system_prompt("gpt-4o", &mut wire);

        assert_eq!(wire[0].content, "before");
        assert_eq!(wire[1].content, "Current model: gpt-4o\n\nfirst");
        assert_eq!(wire[2].content, "second");
    }

    #[test]
    fn test_injector_without_system_message_is_noop() {
        let original = to_wire_messages(&[ChatMessage::user("hi"), ChatMessage::assistant("yo")]);
        let mut wire = original.clone();

        inject_model_system_prompt("gpt-4o", &mut wire);
        assert_eq!(wire, original);

        // Still a no-op the second time around
        inject_model_system_prompt("gpt-4o", &mut wire);
        assert_eq!(wire, original);
    }

    #[test]
    fn test_injector_is_unguarded_on_reinjection() {
        let mut wire = to_wire_messages(&[ChatMessage::system("sys")]);

        inject_model_system_prompt("gpt-4o", &mut wire);
        inject_model_system_prompt("gpt-4o", &mut wire);

        assert_eq!(
            wire[0].content,
            "Current model: gpt-4o\n\nCurrent model: gpt-4o\n\nsys"
        );
    }

    #[test]
    fn test_resolved_model_custom_sentinel() {
        let mut opts = options();
        assert_eq!(opts.resolved_model(), "deepseek-ai/DeepSeek-V3");

        opts.model = CUSTOM_MODEL.to_string();
        assert_eq!(opts.resolved_model(), "");

        opts.custom_model_name = Some("my-model".to_string());
        assert_eq!(opts.resolved_model(), "my-model");
    }

    #[test]
    fn test_endpoint_defaults_and_overrides() {
        let mut opts = options();
        assert_eq!(
            opts.endpoint(),
            "https://api.siliconflow.cn/v1/chat/completions"
        );

        opts.api_host = "http://localhost:8080".to_string();
        opts.api_path = Some("/custom/path".to_string());
        assert_eq!(opts.endpoint(), "http://localhost:8080/custom/path");
    }

    #[test]
    fn test_request_body_shape() {
        let opts = options();
        let mut wire = to_wire_messages(&[ChatMessage::system("sys"), ChatMessage::user("hi")]);
        let model = opts.resolved_model();
        inject_model_system_prompt(&model, &mut wire);

        let body = serde_json::to_value(ChatCompletionRequest {
            messages: &wire,
            model: &model,
            max_tokens: None,
            temperature: opts.temperature,
            top_p: opts.top_p,
            stream: true,
        })
        .unwrap();

        assert_eq!(body["model"], "deepseek-ai/DeepSeek-V3");
        assert_eq!(body["stream"], true);
        assert!((body["temperature"].as_f64().unwrap() - 0.7).abs() < 1e-6);
        assert!((body["top_p"].as_f64().unwrap() - 1.0).abs() < 1e-6);
        assert!(body.get("max_tokens").is_none());
        assert_eq!(body["messages"].as_array().unwrap().len(), 2);
        assert_eq!(
            body["messages"][0]["content"],
            "Current model: deepseek-ai/DeepSeek-V3\n\nsys"
        );
    }

    #[tokio::test]
    async fn test_multibyte_delta_split_across_network_chunks() {
        let body =
            b"data: {\"choices\":[{\"delta\":{\"content\":\"\xc3\xa9\"}}]}\n\ndata: [DONE]\n\n"
                .to_vec();

        // Split mid-character, as TCP segmentation may
        let split = body.iter().position(|&b| b == 0xC3).unwrap() + 1;
        let transport = Arc::new(ChunkedTransport {
            chunks: vec![body[..split].to_vec(), body[split..].to_vec()],
        });

        let adapter = SiliconFlow::with_transport(options(), transport);
        let result = adapter
            .call_chat_completion(&[ChatMessage::user("hi")], None, None)
            .await
            .unwrap();

        assert_eq!(result, "\u{e9}");
    }

    #[test]
    fn test_headers() {
        let adapter = SiliconFlow::new(options()).unwrap();
        let headers = adapter.headers().unwrap();
        assert_eq!(
            headers.get(header::AUTHORIZATION).unwrap(),
            "Bearer sk-test"
        );
        assert_eq!(
            headers.get(header::CONTENT_TYPE).unwrap(),
            "application/json"
        );
    }
}
