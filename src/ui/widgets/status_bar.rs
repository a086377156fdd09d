use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Color, Style},
    text::{Line, Span},
    widgets::Widget,
};

pub struct StatusBar {
    pub job_id: Option<String>,
    pub log_lines: usize,
    pub following: bool,
    pub message: Option<String>,
}

impl Widget for StatusBar {
    fn render(self, area: Rect, buf: &mut Buffer) {
        if area.height < 1 || area.width < 10 {
            return;
        }

        // A temporary message replaces the whole bar
        if let Some(msg) = &self.message {
            let line = Line::from(Span::styled(
                format!(" {}", msg),
                Style::default().fg(Color::Green),
            ));
            buf.set_line(area.x, area.y, &line, area.width);
            return;
        }

        let mut spans = Vec::new();

        match &self.job_id {
            Some(id) => spans.push(Span::styled(
                format!(" Job: {} ", id),
                Style::default().fg(Color::White),
            )),
            None => spans.push(Span::styled(
                " No active job ",
                Style::default().fg(Color::DarkGray),
            )),
        }
        spans.push(Span::styled(" | ", Style::default().fg(Color::DarkGray)));
        spans.push(Span::styled(
            format!("Log: {} lines", format_number(self.log_lines)),
            Style::default().fg(Color::White),
        ));

        if !self.following {
            let left_len: usize = spans.iter().map(|s| s.content.len()).sum();
            let paused = "Scroll paused (G to follow) ";
            let padding = (area.width as usize).saturating_sub(left_len + paused.len());
            spans.push(Span::styled(
                format!("{:pad$}", "", pad = padding),
                Style::default(),
            ));
            spans.push(Span::styled(paused, Style::default().fg(Color::Yellow)));
        }

        let line = Line::from(spans);
        buf.set_line(area.x, area.y, &line, area.width);
    }
}

fn format_number(n: usize) -> String {
    let s = n.to_string();
    let mut result = String::new();
    for (i, c) in s.chars().rev().enumerate() {
        if i > 0 && i % 3 == 0 {
            result.push(',');
        }
        result.push(c);
    }
    result.chars().rev().collect()
}
