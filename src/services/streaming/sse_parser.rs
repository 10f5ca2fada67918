//! Server-Sent Events (SSE) data-frame parser
//!
//! Incremental parser for the subset of the SSE format chat-completion
//! endpoints emit: `data:` fields carrying one payload per frame, frames
//! separated by blank lines. Network chunks may split frames at arbitrary
//! byte positions, so partial input is buffered until the frame completes.

/// Incremental SSE parser yielding completed data frames
pub struct SseParser {
    /// Bytes of an incomplete trailing UTF-8 sequence, held back until the
    /// next chunk completes it
    byte_buffer: Vec<u8>,

    /// Buffer for an incomplete trailing line
    line_buffer: String,

    /// Data payload of the frame currently being assembled
    data: String,

    /// Whether any `data:` field was seen for the current frame
    has_data: bool,
}

impl SseParser {
    /// Create a new parser
    #[must_use]
    pub fn new() -> Self {
        Self {
            byte_buffer: Vec::new(),
            line_buffer: String::new(),
            data: String::new(),
            has_data: false,
        }
    }

    /// Feed a chunk of raw stream bytes, returning all frames it completed.
    ///
    /// Network chunks can split a multi-byte UTF-8 character; the incomplete
    /// trailing sequence is held back until a later chunk completes it.
    /// Bytes that can never form valid UTF-8 are an error.
    pub fn parse_bytes(
        &mut self,
        chunk: &[u8],
    ) -> std::result::Result<Vec<String>, std::str::Utf8Error> {
        self.byte_buffer.extend_from_slice(chunk);

        let valid_len = match std::str::from_utf8(&self.byte_buffer) {
            Ok(_) => self.byte_buffer.len(),
            // error_len() of None means the buffer merely ends mid-sequence
            Err(e) if e.error_len().is_none() => e.valid_up_to(),
            Err(e) => return Err(e),
        };

        let ready: Vec<u8> = self.byte_buffer.drain(..valid_len).collect();
        let text = std::str::from_utf8(&ready)?;
        Ok(self.parse_chunk(text))
    }

    /// Feed a chunk of stream text, returning all frames it completed.
    ///
    /// Incomplete frames stay buffered until a later chunk finishes them.
    pub fn parse_chunk(&mut self, chunk: &str) -> Vec<String> {
        let mut frames = Vec::new();

        self.line_buffer.push_str(chunk);

        while let Some(line_end) = self.line_buffer.find('\n') {
            let line = self.line_buffer[..line_end]
                .trim_end_matches('\r')
                .to_string();
            self.line_buffer.drain(..=line_end);

            if let Some(frame) = self.process_line(&line) {
                frames.push(frame);
            }
        }

        frames
    }

    /// Process one complete line; returns a frame when a blank line closes one
    fn process_line(&mut self, line: &str) -> Option<String> {
        if line.is_empty() {
            return self.take_frame();
        }

        // Comment lines keep the connection alive, nothing more
        if line.starts_with(':') {
            return None;
        }

        let (field, value) = match line.find(':') {
            Some(pos) => {
                let value = &line[pos + 1..];
                (&line[..pos], value.strip_prefix(' ').unwrap_or(value))
            }
            None => (line, ""),
        };

        // Only `data` matters for this protocol; event/id/retry are ignored
        if field == "data" {
            if self.has_data {
                self.data.push('\n');
            }
            self.data.push_str(value);
            self.has_data = true;
        }

        None
    }

    /// Take the current frame, if one has been started
    fn take_frame(&mut self) -> Option<String> {
        if self.has_data {
            self.has_data = false;
            Some(std::mem::take(&mut self.data))
        } else {
            None
        }
    }

    /// Flush a trailing frame the stream ended without terminating
    pub fn flush(&mut self) -> Option<String> {
        if !self.line_buffer.is_empty() {
            let line = std::mem::take(&mut self.line_buffer);
            if let Some(frame) = self.process_line(&line) {
                return Some(frame);
            }
        }

        self.take_frame()
    }
}

impl Default for SseParser {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_single_frame() {
        let mut parser = SseParser::new();
        let frames = parser.parse_chunk("data: {\"text\":\"hello\"}\n\n");
        assert_eq!(frames, vec![r#"{"text":"hello"}"#.to_string()]);
    }

    #[test]
    fn test_parse_multiple_frames() {
        let mut parser = SseParser::new();
        let frames = parser.parse_chunk("data: one\n\ndata: two\n\n");
        assert_eq!(frames, vec!["one".to_string(), "two".to_string()]);
    }

    #[test]
    fn test_multi_line_data_joined_with_newline() {
        let mut parser = SseParser::new();
        let frames = parser.parse_chunk("data: line1\ndata: line2\n\n");
        assert_eq!(frames, vec!["line1\nline2".to_string()]);
    }

    #[test]
    fn test_frame_split_across_chunks() {
        let mut parser = SseParser::new();
        assert!(parser.parse_chunk("data: par").is_empty());
        assert!(parser.parse_chunk("tial").is_empty());
        let frames = parser.parse_chunk("\n\n");
        assert_eq!(frames, vec!["partial".to_string()]);
    }

    #[test]
    fn test_done_sentinel_frame() {
        let mut parser = SseParser::new();
        let frames = parser.parse_chunk("data: [DONE]\n\n");
        assert_eq!(frames, vec!["[DONE]".to_string()]);
    }

    #[test]
    fn test_comments_and_other_fields_ignored() {
        let mut parser = SseParser::new();
        let frames = parser.parse_chunk(": keepalive\nevent: message\nid: 3\ndata: test\n\n");
        assert_eq!(frames, vec!["test".to_string()]);
    }

    #[test]
    fn test_crlf_line_endings() {
        let mut parser = SseParser::new();
        let frames = parser.parse_chunk("data: test\r\n\r\n");
        assert_eq!(frames, vec!["test".to_string()]);
    }

    #[test]
    fn test_flush_unterminated_frame() {
        let mut parser = SseParser::new();
        assert!(parser.parse_chunk("data: tail").is_empty());
        assert_eq!(parser.flush(), Some("tail".to_string()));
        assert_eq!(parser.flush(), None);
    }

    #[test]
    fn test_multibyte_char_split_across_byte_chunks() {
        let mut parser = SseParser::new();
        let full = "data: caf\u{e9}\n\n".as_bytes();

        // Split inside the two-byte encoding of 'é'
        let split = full.iter().position(|&b| b == 0xC3).unwrap() + 1;
        assert!(parser.parse_bytes(&full[..split]).unwrap().is_empty());
        let frames = parser.parse_bytes(&full[split..]).unwrap();
        assert_eq!(frames, vec!["caf\u{e9}".to_string()]);
    }

    #[test]
    fn test_invalid_utf8_bytes_error() {
        let mut parser = SseParser::new();
        // 0xFF can never start a UTF-8 sequence
        assert!(parser.parse_bytes(&[0xFF, b'd', b'a']).is_err());
    }

    #[test]
    fn test_empty_data_field_still_dispatches() {
        let mut parser = SseParser::new();
        let frames = parser.parse_chunk("data:\n\n");
        assert_eq!(frames, vec![String::new()]);
    }
}
