//! Service layer for hosted LLM providers
//!
//! Providers are composed from two capabilities rather than a base-class
//! hierarchy: a [`StreamingHttp`] transport (implemented once, injected into
//! each adapter) and the provider-specific request/response mapping. The
//! [`ChatProvider`] trait is the seam the UI layer talks to.

pub mod siliconflow;
pub mod streaming;

use std::pin::Pin;

use async_trait::async_trait;
use bytes::Bytes;
use futures::{Stream, StreamExt};
use reqwest::{header::HeaderMap, Client};
use tokio_util::sync::CancellationToken;

use crate::{
    error::{ChatError, Result},
    messages::ChatMessage,
};

/// Raw response body stream from the transport
pub type ByteStream = Pin<Box<dyn Stream<Item = Result<Bytes>> + Send>>;

/// Lazy per-call sequence of accumulated-text snapshots.
///
/// Each item is the full text accumulated so far, not the delta.
pub type SnapshotStream = Pin<Box<dyn Stream<Item = Result<String>> + Send>>;

/// Incremental-result callback. Invoked synchronously with the full
/// accumulated text after each content delta.
pub type OnResultChange<'a> = Box<dyn FnMut(&str) + Send + 'a>;

/// Transport capability: POST a JSON body and hand back the response body
/// as a byte stream.
#[async_trait]
pub trait StreamingHttp: Send + Sync {
    /// Issue the request and return the streaming response body.
    ///
    /// Non-2xx responses are reported as [`ChatError::Api`] carrying the
    /// status and body text; connection-level failures surface as
    /// [`ChatError::Http`].
    async fn post_stream(
        &self,
        url: &str,
        headers: HeaderMap,
        body: serde_json::Value,
    ) -> Result<ByteStream>;
}

/// [`StreamingHttp`] implementation backed by a reqwest [`Client`]
pub struct ReqwestTransport {
    client: Client,
}

impl ReqwestTransport {
    /// Create a transport with a fresh client
    pub fn new() -> Result<Self> {
        let client = Client::builder().build()?;
        Ok(Self { client })
    }

    /// Create a transport from an existing client
    #[must_use]
    pub fn with_client(client: Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl StreamingHttp for ReqwestTransport {
    async fn post_stream(
        &self,
        url: &str,
        headers: HeaderMap,
        body: serde_json::Value,
    ) -> Result<ByteStream> {
        let response = self
            .client
            .post(url)
            .headers(headers)
            .json(&body)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await?;
            return Err(ChatError::Api(format!("HTTP {status}: {error_text}")));
        }

        Ok(Box::pin(
            response.bytes_stream().map(|chunk| chunk.map_err(ChatError::from)),
        ))
    }
}

/// Core trait for chat providers
///
/// One logical operation per call: one outstanding request, one accumulator,
/// one optional cancellation token. Concurrent calls are independent and
/// never share accumulator state.
#[async_trait]
pub trait ChatProvider: Send + Sync {
    /// Provider display name
    fn name(&self) -> &str;

    /// Run a streaming chat completion over `messages`.
    ///
    /// `on_result_change`, when supplied, is invoked synchronously with the
    /// full accumulated text after each content delta. Returns the final
    /// accumulated text. Triggering `cancel` aborts the outstanding request
    /// and surfaces [`ChatError::Cancelled`].
    async fn call_chat_completion(
        &self,
        messages: &[ChatMessage],
        cancel: Option<CancellationToken>,
        on_result_change: Option<OnResultChange<'_>>,
    ) -> Result<String>;
}
