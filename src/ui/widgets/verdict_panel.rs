use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Paragraph, Widget, Wrap},
};

use crate::models::report::{ScanOutcome, Severity};

pub struct VerdictPanel<'a> {
    outcome: &'a ScanOutcome,
    block: Option<Block<'a>>,
}

impl<'a> VerdictPanel<'a> {
    pub fn new(outcome: &'a ScanOutcome) -> Self {
        Self {
            outcome,
            block: None,
        }
    }

    pub fn block(mut self, block: Block<'a>) -> Self {
        self.block = Some(block);
        self
    }
}

impl Widget for VerdictPanel<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let mut lines = vec![
            Line::from(vec![
                Span::styled(" Verdict: ", Style::default().fg(Color::DarkGray)),
                Span::styled(
                    self.outcome.label(),
                    Style::default()
                        .fg(outcome_color(self.outcome))
                        .add_modifier(Modifier::BOLD),
                ),
            ]),
            Line::from(""),
        ];

        match self.outcome {
            ScanOutcome::ErrorInfo { cause } => {
                lines.push(Line::from(Span::styled(
                    format!(" {}", cause),
                    Style::default().fg(Color::Red),
                )));
            }
            ScanOutcome::StillScanning(_) => {
                lines.push(Line::from(Span::styled(
                    " The service is still analysing this file (f to fetch again)",
                    Style::default().fg(Color::Yellow),
                )));
            }
            _ => {}
        }

        if let Some(report) = self.outcome.report() {
            if let Some(info) = &report.file_info {
                lines.push(detail_line("File", info.filename.clone()));
                lines.push(detail_line("Size", format_size(info.size)));
                lines.push(detail_line("SHA256", info.sha256.clone()));
                lines.push(Line::from(""));
            }

            let stats = &report.stats;
            lines.push(Line::from(vec![
                Span::styled(" Threats: ", Style::default().fg(Color::DarkGray)),
                Span::styled(
                    stats.threats_found.to_string(),
                    Style::default().fg(Color::White),
                ),
                Span::styled("  malicious ", Style::default().fg(Color::DarkGray)),
                Span::styled(stats.malicious.to_string(), Style::default().fg(Color::Red)),
                Span::styled("  suspicious ", Style::default().fg(Color::DarkGray)),
                Span::styled(
                    stats.suspicious.to_string(),
                    Style::default().fg(Color::Yellow),
                ),
                Span::styled("  neutral ", Style::default().fg(Color::DarkGray)),
                Span::styled(stats.neutral.to_string(), Style::default().fg(Color::White)),
            ]));
            lines.push(Line::from(""));

            for threat in &report.threats {
                lines.push(Line::from(vec![
                    Span::styled(
                        format!(" [{}] ", threat.threat_id),
                        Style::default().fg(Color::DarkGray),
                    ),
                    Span::styled(
                        format!("{:<10} ", severity_label(threat.severity)),
                        Style::default().fg(severity_color(threat.severity)),
                    ),
                    Span::styled(
                        threat.threat_type.clone(),
                        Style::default()
                            .fg(Color::White)
                            .add_modifier(Modifier::BOLD),
                    ),
                ]));
                lines.push(Line::from(Span::styled(
                    format!("     {}", threat.details),
                    Style::default().fg(Color::DarkGray),
                )));
            }

            if report.static_analysis.is_some() {
                lines.push(Line::from(""));
                lines.push(Line::from(Span::styled(
                    " Static analysis detail available (x to export)",
                    Style::default().fg(Color::DarkGray),
                )));
            }
        }

        let mut paragraph = Paragraph::new(lines).wrap(Wrap { trim: false });
        if let Some(block) = self.block {
            paragraph = paragraph.block(block);
        }
        paragraph.render(area, buf);
    }
}

fn detail_line(label: &str, value: String) -> Line<'static> {
    Line::from(vec![
        Span::styled(format!(" {:<8}", label), Style::default().fg(Color::DarkGray)),
        Span::styled(value, Style::default().fg(Color::White)),
    ])
}

pub fn outcome_color(outcome: &ScanOutcome) -> Color {
    match outcome {
        ScanOutcome::Safe(_) => Color::Green,
        ScanOutcome::Unsafe(_) => Color::Red,
        ScanOutcome::Suspicious(_) => Color::Yellow,
        ScanOutcome::StillScanning(_) => Color::Cyan,
        ScanOutcome::ErrorInfo { .. } => Color::Red,
    }
}

fn severity_label(severity: Severity) -> &'static str {
    match severity {
        Severity::Malicious => "malicious",
        Severity::Suspicious => "suspicious",
        Severity::Neutral => "neutral",
        Severity::Unknown => "unknown",
    }
}

fn severity_color(severity: Severity) -> Color {
    match severity {
        Severity::Malicious => Color::Red,
        Severity::Suspicious => Color::Yellow,
        Severity::Neutral | Severity::Unknown => Color::White,
    }
}

pub fn format_size(bytes: u64) -> String {
    const KB: u64 = 1024;
    const MB: u64 = 1024 * KB;
    const GB: u64 = 1024 * MB;

    if bytes >= GB {
        format!("{:.1} GB", bytes as f64 / GB as f64)
    } else if bytes >= MB {
        format!("{:.1} MB", bytes as f64 / MB as f64)
    } else if bytes >= KB {
        format!("{:.1} KB", bytes as f64 / KB as f64)
    } else {
        format!("{} B", bytes)
    }
}
