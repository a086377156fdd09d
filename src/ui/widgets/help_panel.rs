use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph, Widget},
};

pub struct HelpPanel;

impl Widget for HelpPanel {
    fn render(self, area: Rect, buf: &mut Buffer) {
        Clear.render(area, buf);

        let help_text = vec![
            Line::from(Span::styled(
                " ScanLens - Keyboard Shortcuts ",
                Style::default()
                    .fg(Color::Cyan)
                    .add_modifier(Modifier::BOLD),
            )),
            Line::from(""),
            Line::from(Span::styled(
                "  Scan",
                Style::default()
                    .fg(Color::Yellow)
                    .add_modifier(Modifier::BOLD),
            )),
            help_line("    o           ", "Choose a file to scan"),
            help_line("    r           ", "Reset (cancel the current scan)"),
            help_line("    f           ", "Fetch the verdict again"),
            help_line("    Esc / d     ", "Dismiss error"),
            help_line("    x           ", "Export verdict as JSON"),
            help_line("    m           ", "Export Markdown report"),
            Line::from(""),
            Line::from(Span::styled(
                "  Event log",
                Style::default()
                    .fg(Color::Yellow)
                    .add_modifier(Modifier::BOLD),
            )),
            help_line("    j / Down    ", "Scroll down"),
            help_line("    k / Up      ", "Scroll up"),
            help_line("    PgDn / PgUp ", "Scroll a page"),
            help_line("    g           ", "Jump to first line"),
            help_line("    G           ", "Follow newest lines"),
            Line::from(""),
            help_line("    ?           ", "Toggle this help"),
            help_line("    q / Ctrl+C  ", "Quit"),
            Line::from(""),
            Line::from(Span::styled(
                "  Press ? or Esc to close",
                Style::default().fg(Color::DarkGray),
            )),
        ];

        let help = Paragraph::new(help_text)
            .block(
                Block::default()
                    .title(" Help ")
                    .borders(Borders::ALL)
                    .border_style(Style::default().fg(Color::Cyan)),
            )
            .style(Style::default().bg(Color::Black));
        help.render(area, buf);
    }
}

fn help_line<'a>(key: &'a str, desc: &'a str) -> Line<'a> {
    Line::from(vec![
        Span::styled(key, Style::default().fg(Color::Green)),
        Span::raw(desc),
    ])
}
