//! Shared SSE buffer management for the streaming providers.
//!
//! Gemini (`alt=sse`) and OpenAI both frame events as `data:` lines; the
//! buffer holds partial lines across network chunks.

/// A reusable buffer for SSE byte stream parsing.
pub(crate) struct SseBuffer {
    buffer: String,
}

impl SseBuffer {
    pub fn new() -> Self {
        Self {
            buffer: String::new(),
        }
    }

    /// Append raw bytes (lossy UTF-8) to the buffer.
    pub fn push_bytes(&mut self, chunk: &bytes::Bytes) {
        self.buffer.push_str(&String::from_utf8_lossy(chunk));
    }

    /// Extract complete newline-terminated lines, trimmed (so `\r\n` framing
    /// works too). Partial trailing data stays in the buffer.
    pub fn extract_lines(&mut self) -> Vec<String> {
        let mut lines = Vec::new();
        while let Some(pos) = self.buffer.find('\n') {
            let line = self.buffer[..pos].trim().to_string();
            self.buffer.drain(..=pos);
            lines.push(line);
        }
        lines
    }

    /// Payloads of the complete `data:` lines. Comments, `event:` lines and
    /// blank separators are skipped.
    pub fn extract_data(&mut self) -> Vec<String> {
        self.extract_lines()
            .into_iter()
            .filter_map(|line| {
                line.strip_prefix("data:")
                    .map(|d| d.trim_start().to_string())
            })
            .collect()
    }

    /// Return the remaining (incomplete) data in the buffer.
    pub fn residue(&self) -> &str {
        &self.buffer
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_lines_complete() {
        let mut buf = SseBuffer::new();
        buf.push_bytes(&bytes::Bytes::from("data: hello\ndata: world\n"));
        let lines = buf.extract_lines();
        assert_eq!(lines, vec!["data: hello", "data: world"]);
        assert!(buf.residue().is_empty());
    }

    #[test]
    fn test_extract_lines_partial() {
        let mut buf = SseBuffer::new();
        buf.push_bytes(&bytes::Bytes::from("data: hello\ndata: wor"));
        let lines = buf.extract_lines();
        assert_eq!(lines, vec!["data: hello"]);
        assert_eq!(buf.residue(), "data: wor");

        // Push the rest
        buf.push_bytes(&bytes::Bytes::from("ld\n"));
        let lines = buf.extract_lines();
        assert_eq!(lines, vec!["data: world"]);
        assert!(buf.residue().is_empty());
    }

    #[test]
    fn test_extract_data_crlf_framing() {
        let mut buf = SseBuffer::new();
        buf.push_bytes(&bytes::Bytes::from(
            ": keep-alive\r\ndata: {\"a\":1}\r\n\r\nevent: x\r\ndata:{\"b\":2}\r\n\r\ndata: {\"c\"",
        ));
        let data = buf.extract_data();
        assert_eq!(data, vec!["{\"a\":1}", "{\"b\":2}"]);
        assert_eq!(buf.residue(), "data: {\"c\"");
    }
}
