use crate::models::scan::LogLine;

/// Append-only event log for the live job.
///
/// Lines are never edited or removed one by one; the log only shrinks when
/// the whole scan is reset.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct LogBuffer {
    lines: Vec<LogLine>,
}

impl LogBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn append(&mut self, line: LogLine) {
        self.lines.push(line);
    }

    pub fn snapshot(&self) -> &[LogLine] {
        &self.lines
    }

    pub fn clear(&mut self) {
        self.lines.clear();
    }

    pub fn len(&self) -> usize {
        self.lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }
}
