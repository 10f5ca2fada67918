//! Streaming support for chat-completion responses
//!
//! Infrastructure for consuming Server-Sent Events streams from
//! OpenAI-compatible chat-completion endpoints.

pub mod chat_stream;
pub mod sse_parser;

pub use chat_stream::{ChatStreamAccumulator, FrameOutcome, DONE_SENTINEL};
pub use sse_parser::SseParser;
