use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Color, Style},
    text::{Line, Span},
    widgets::Widget,
};
use unicode_width::UnicodeWidthStr;

pub struct ScanProgressBar {
    pub label: &'static str,
    pub percent: u16,
    pub message: String,
    pub stalled: bool,
}

impl Widget for ScanProgressBar {
    fn render(self, area: Rect, buf: &mut Buffer) {
        if area.height < 2 || area.width < 20 {
            return;
        }

        // Line 1: bar
        let pct_str = format!(" {:>3}%", self.percent);
        let bar_width = (area.width as usize).saturating_sub(pct_str.len() + 2);
        let filled = bar_width * self.percent.min(100) as usize / 100;
        let color = if self.stalled { Color::Yellow } else { Color::Cyan };
        let bar_line = Line::from(vec![
            Span::styled(" ", Style::default()),
            Span::styled("█".repeat(filled), Style::default().fg(color)),
            Span::styled(
                "░".repeat(bar_width - filled),
                Style::default().fg(Color::DarkGray),
            ),
            Span::styled(pct_str, Style::default().fg(Color::White)),
        ]);
        buf.set_line(area.x, area.y, &bar_line, area.width);

        // Line 2: stage and latest message
        let stage = if self.stalled {
            format!(" {} (stalled) ", self.label)
        } else {
            format!(" {} ", self.label)
        };
        let message = truncate(&self.message, (area.width as usize).saturating_sub(stage.width() + 1));
        let message_line = Line::from(vec![
            Span::styled(stage, Style::default().fg(Color::Yellow)),
            Span::styled(message, Style::default().fg(Color::DarkGray)),
        ]);
        buf.set_line(area.x, area.y + 1, &message_line, area.width);
    }
}

fn truncate(text: &str, max_width: usize) -> String {
    if text.width() <= max_width {
        return text.to_string();
    }
    if max_width < 4 {
        return "...".to_string();
    }
    let target = max_width - 3;
    let mut w = 0;
    let boundary = text
        .char_indices()
        .find(|&(_, c)| {
            w += unicode_width::UnicodeWidthChar::width(c).unwrap_or(0);
            w > target
        })
        .map(|(i, _)| i)
        .unwrap_or(text.len());
    format!("{}...", &text[..boundary])
}
