//! Type definitions for streaming responses

use bytes::Bytes;

/// Simple Event structure for SSE compatibility
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Event {
    /// Event type
    pub event: Option<String>,
    /// Event data, possibly spanning several lines
    pub data: String,
}

impl Event {
    /// Create a new empty event
    pub fn new() -> Self {
        Self {
            event: None,
            data: String::new(),
        }
    }

    /// Set the event type
    pub fn event(mut self, event: &str) -> Self {
        self.event = Some(event.to_string());
        self
    }

    /// Set the event data
    pub fn data(mut self, data: &str) -> Self {
        self.data = data.to_string();
        self
    }

    /// Parse one event block (the text between blank lines).
    ///
    /// Returns `None` for blocks holding only comments or unknown fields.
    pub fn parse_block(block: &str) -> Option<Self> {
        let mut event = None;
        let mut data_lines: Vec<&str> = Vec::new();

        for line in block.lines() {
            let line = line.strip_suffix('\r').unwrap_or(line);
            if line.is_empty() || line.starts_with(':') {
                continue;
            }
            let (field, value) = match line.find(':') {
                Some(pos) => {
                    let value = &line[pos + 1..];
                    (&line[..pos], value.strip_prefix(' ').unwrap_or(value))
                }
                None => (line, ""),
            };
            match field {
                "event" => event = Some(value.to_string()),
                "data" => data_lines.push(value),
                _ => {}
            }
        }

        if event.is_none() && data_lines.is_empty() {
            return None;
        }
        Some(Self {
            event,
            data: data_lines.join("\n"),
        })
    }

    /// Whether this is the end-of-stream sentinel
    pub fn is_done(&self) -> bool {
        self.event.is_none() && self.data.trim() == "[DONE]"
    }

    /// Convert event to bytes for SSE transmission
    pub fn to_bytes(&self) -> Bytes {
        let mut result = String::new();
        if let Some(event) = &self.event {
            result.push_str(&format!("event: {}\n", event));
        }
        for line in self.data.split('\n') {
            result.push_str(&format!("data: {}\n", line));
        }
        result.push('\n');
        Bytes::from(result)
    }
}

/// Upper bound on one buffered SSE event
pub const MAX_EVENT_BYTES: usize = 1024 * 1024;

/// The upstream sent more than the framer's limit without a blank line
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
#[error("SSE event exceeds {limit} bytes without a delimiter")]
pub struct FrameTooLarge {
    pub limit: usize,
}

/// Splits an arbitrarily chunked byte stream into SSE event blocks
#[derive(Debug)]
pub struct SseFramer {
    buffer: Vec<u8>,
    /// Prefix of `buffer` already known to hold no delimiter
    scanned: usize,
    limit: usize,
}

impl Default for SseFramer {
    fn default() -> Self {
        Self::with_limit(MAX_EVENT_BYTES)
    }
}

impl SseFramer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Framer that refuses events larger than `limit` bytes
    pub fn with_limit(limit: usize) -> Self {
        Self {
            buffer: Vec::new(),
            scanned: 0,
            limit,
        }
    }

    /// Append a chunk and return every block it completed
    pub fn push(&mut self, chunk: &[u8]) -> Result<Vec<String>, FrameTooLarge> {
        self.buffer.extend_from_slice(chunk);

        let mut blocks = Vec::new();
        loop {
            // A delimiter may straddle the previous chunk boundary
            let from = self.scanned.saturating_sub(3);
            match find_delimiter(&self.buffer[from..]) {
                Some((pos, delimiter_len)) => {
                    let end = from + pos;
                    let block: Vec<u8> =
                        self.buffer.drain(..end + delimiter_len).take(end).collect();
                    blocks.push(String::from_utf8_lossy(&block).into_owned());
                    self.scanned = 0;
                }
                None => {
                    self.scanned = self.buffer.len();
                    break;
                }
            }
        }

        if self.buffer.len() > self.limit {
            return Err(FrameTooLarge { limit: self.limit });
        }
        Ok(blocks)
    }

    /// Whatever is left once the upstream ends without a final blank line
    pub fn finish(&mut self) -> Option<String> {
        self.scanned = 0;
        if self.buffer.iter().all(|b| b.is_ascii_whitespace()) {
            self.buffer.clear();
            return None;
        }
        let rest = String::from_utf8_lossy(&self.buffer).into_owned();
        self.buffer.clear();
        Some(rest)
    }
}

/// Earliest blank-line delimiter: position and length
fn find_delimiter(buffer: &[u8]) -> Option<(usize, usize)> {
    let lf = find(buffer, b"\n\n").map(|pos| (pos, 2));
    let crlf = find(buffer, b"\r\n\r\n").map(|pos| (pos, 4));
    match (lf, crlf) {
        (Some(a), Some(b)) => Some(if a.0 <= b.0 { a } else { b }),
        (a, b) => a.or(b),
    }
}

fn find(haystack: &[u8], needle: &[u8]) -> Option<usize> {
    haystack
        .windows(needle.len())
        .position(|window| window == needle)
}
