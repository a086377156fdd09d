use std::ops::Range;

use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Color, Style},
    text::{Line, Span},
    widgets::{Block, StatefulWidget, Widget},
};

use crate::models::scan::LogLine;

/// Scroll position of the event log.
///
/// While `follow` is set the view sticks to the newest lines; scrolling up
/// detaches it and scrolling back to the bottom re-attaches it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LogViewState {
    pub offset: usize,
    pub follow: bool,
}

impl Default for LogViewState {
    fn default() -> Self {
        Self {
            offset: 0,
            follow: true,
        }
    }
}

impl LogViewState {
    pub fn scroll_up(&mut self, rows: usize) {
        self.follow = false;
        self.offset = self.offset.saturating_sub(rows);
    }

    pub fn scroll_down(&mut self, rows: usize) {
        self.offset = self.offset.saturating_add(rows);
    }

    pub fn to_top(&mut self) {
        self.follow = false;
        self.offset = 0;
    }

    pub fn to_bottom(&mut self) {
        self.follow = true;
    }
}

/// Rows of a `total`-line log that fit in `height` rows at the current scroll
/// position. Every row is one terminal line, so this is O(1) in log length.
pub fn visible_window(total: usize, height: usize, state: &mut LogViewState) -> Range<usize> {
    let max_offset = total.saturating_sub(height);
    if state.follow || state.offset >= max_offset {
        state.offset = max_offset;
        state.follow = true;
    }
    let start = state.offset;
    start..(start + height).min(total)
}

/// Virtualized log panel: only the rows inside the window are formatted.
pub struct LogView<'a> {
    lines: &'a [LogLine],
    block: Option<Block<'a>>,
}

impl<'a> LogView<'a> {
    pub fn new(lines: &'a [LogLine]) -> Self {
        Self { lines, block: None }
    }

    pub fn block(mut self, block: Block<'a>) -> Self {
        self.block = Some(block);
        self
    }
}

impl StatefulWidget for LogView<'_> {
    type State = LogViewState;

    fn render(self, area: Rect, buf: &mut Buffer, state: &mut Self::State) {
        let inner = if let Some(block) = &self.block {
            let inner = block.inner(area);
            block.clone().render(area, buf);
            inner
        } else {
            area
        };

        if inner.height == 0 || inner.width < 10 {
            return;
        }

        if self.lines.is_empty() {
            let line = Line::from(Span::styled(
                " No events yet",
                Style::default().fg(Color::DarkGray),
            ));
            buf.set_line(inner.x, inner.y, &line, inner.width);
            return;
        }

        let window = visible_window(self.lines.len(), inner.height as usize, state);
        for (row, entry) in self.lines[window].iter().enumerate() {
            let line = Line::from(vec![
                Span::styled(
                    format!(" {} ", entry.timestamp.format("%H:%M:%S")),
                    Style::default().fg(Color::DarkGray),
                ),
                Span::styled(entry.text.as_str(), Style::default().fg(Color::White)),
            ]);
            buf.set_line(inner.x, inner.y + row as u16, &line, inner.width);
        }
    }
}
