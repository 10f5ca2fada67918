//! Chat-completion stream consumer
//!
//! Interprets the data frames of a streaming chat-completion response and
//! accumulates the assistant text. One accumulator is owned exclusively by
//! one in-flight call; the accumulated text only ever grows.

use serde::Deserialize;

use crate::error::{ChatError, Result};

/// End-of-stream sentinel frame
pub const DONE_SENTINEL: &str = "[DONE]";

/// One streamed chat-completion chunk
#[derive(Debug, Clone, Deserialize)]
pub struct ChatCompletionChunk {
    /// Error object embedded in a 200-status stream
    #[serde(default)]
    pub error: Option<serde_json::Value>,

    #[serde(default)]
    pub choices: Vec<StreamChoice>,
}

/// A choice within a streamed chunk
#[derive(Debug, Clone, Deserialize)]
pub struct StreamChoice {
    #[serde(default)]
    pub delta: ContentDelta,

    #[serde(default)]
    pub finish_reason: Option<String>,
}

/// Incremental content fragment for one generation step
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ContentDelta {
    pub content: Option<String>,
}

/// Result of processing one frame
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameOutcome {
    /// Content was appended; the accumulated text changed
    Delta,

    /// Frame carried no content (role preamble, finish_reason, keepalive)
    NoChange,

    /// End-of-stream sentinel; stop processing
    Done,
}

/// Accumulates assistant text from a stream of chat-completion frames
pub struct ChatStreamAccumulator {
    /// Provider display name, used in error messages
    provider: &'static str,

    /// Accumulated assistant text, append-only
    text: String,
}

impl ChatStreamAccumulator {
    /// Create an accumulator for one call
    #[must_use]
    pub fn new(provider: &'static str) -> Self {
        Self {
            provider,
            text: String::new(),
        }
    }

    /// Process one data frame.
    ///
    /// Frames that fail to parse as JSON abort the call; an `error` object
    /// embedded in the frame aborts with [`ChatError::Api`] carrying the
    /// serialized payload. A present `choices[0].delta.content` is appended
    /// even when it is the empty string.
    pub fn process_frame(&mut self, frame: &str) -> Result<FrameOutcome> {
        if frame == DONE_SENTINEL {
            return Ok(FrameOutcome::Done);
        }

        let chunk: ChatCompletionChunk = serde_json::from_str(frame)?;

        if chunk.error.is_some() {
            return Err(ChatError::Api(format!(
                "Error from {}: {frame}",
                self.provider
            )));
        }

        if let Some(content) = chunk
            .choices
            .first()
            .and_then(|choice| choice.delta.content.as_deref())
        {
            self.text.push_str(content);
            return Ok(FrameOutcome::Delta);
        }

        Ok(FrameOutcome::NoChange)
    }

    /// Full text accumulated so far
    #[must_use]
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Consume the accumulator, returning the final text
    #[must_use]
    pub fn into_text(self) -> String {
        self.text
    }
}
