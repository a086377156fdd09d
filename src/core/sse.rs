//! Incremental `text/event-stream` framing.
//!
//! Bytes arrive in arbitrary chunks; complete lines are split out, `data:`
//! fields are accumulated and a blank line dispatches one message. Other
//! fields (`event:`, `id:`, `retry:`) and `:` comments are ignored since the
//! status stream only uses unnamed data messages.

use std::collections::VecDeque;

#[derive(Debug, Default)]
pub struct SseDecoder {
    buffer: Vec<u8>,
    data: Vec<String>,
    ready: VecDeque<String>,
}

impl SseDecoder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed one network chunk.
    pub fn feed(&mut self, chunk: &[u8]) {
        self.buffer.extend_from_slice(chunk);
        while let Some(pos) = self.buffer.iter().position(|&b| b == b'\n') {
            let mut line: Vec<u8> = self.buffer.drain(..=pos).collect();
            line.pop();
            if line.last() == Some(&b'\r') {
                line.pop();
            }
            self.process_line(&String::from_utf8_lossy(&line));
        }
    }

    /// Next complete message payload, in arrival order.
    pub fn next_message(&mut self) -> Option<String> {
        self.ready.pop_front()
    }

    /// Dispatch whatever is still buffered once the stream has ended.
    pub fn finish(&mut self) {
        if !self.buffer.is_empty() {
            let rest = std::mem::take(&mut self.buffer);
            self.process_line(&String::from_utf8_lossy(&rest));
        }
        self.dispatch();
    }

    fn process_line(&mut self, line: &str) {
        if line.is_empty() {
            self.dispatch();
            return;
        }
        if line.starts_with(':') {
            return;
        }
        let (field, value) = match line.split_once(':') {
            Some((field, value)) => (field, value.strip_prefix(' ').unwrap_or(value)),
            None => (line, ""),
        };
        if field == "data" {
            self.data.push(value.to_string());
        }
    }

    fn dispatch(&mut self) {
        if self.data.is_empty() {
            return;
        }
        let message = self.data.join("\n");
        self.data.clear();
        self.ready.push_back(message);
    }
}
