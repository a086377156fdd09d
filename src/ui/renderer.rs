use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Clear, Paragraph, Wrap};
use ratatui::Frame;

use crate::core::orchestrator::{ErrorKind, ErrorNotice, Orchestrator, ScanPhase};
use crate::models::report::ScanOutcome;
use crate::ui::app_state::{AppState, ViewMode};
use crate::ui::widgets::help_panel::HelpPanel;
use crate::ui::widgets::log_view::LogView;
use crate::ui::widgets::progress_bar::ScanProgressBar;
use crate::ui::widgets::status_bar::StatusBar;
use crate::ui::widgets::verdict_panel::{format_size, outcome_color, VerdictPanel};

pub fn render(frame: &mut Frame, state: &mut AppState, scan: &Orchestrator) {
    render_main(frame, state, scan);

    match state.view_mode {
        ViewMode::Help => frame.render_widget(HelpPanel, centered_rect(60, 70, frame.area())),
        ViewMode::FilePrompt => render_file_prompt(frame, state),
        ViewMode::Normal => {
            if let Some(notice) = scan.error() {
                render_error_overlay(frame, notice);
            }
        }
    }
}

fn render_main(frame: &mut Frame, state: &mut AppState, scan: &Orchestrator) {
    let area = frame.area();
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // title
            Constraint::Length(4), // progress
            Constraint::Min(5),    // log + verdict
            Constraint::Length(1), // status bar
            Constraint::Length(1), // key hints
        ])
        .split(area);

    render_title(frame, chunks[0], state, scan);

    // Progress
    let label = match scan.phase() {
        ScanPhase::Idle => "Idle",
        ScanPhase::Uploading => "Uploading",
        ScanPhase::UploadRejected => "Upload failed",
        _ => "Analysis",
    };
    let progress_block = Block::default()
        .title(format!(" {} ", scan.phase().label()))
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::DarkGray));
    let progress_inner = progress_block.inner(chunks[1]);
    frame.render_widget(progress_block, chunks[1]);
    frame.render_widget(
        ScanProgressBar {
            label,
            percent: scan.progress().percent(),
            message: scan.progress().message.clone(),
            stalled: scan.is_stalled(),
        },
        progress_inner,
    );

    // Log (left) | verdict (right, once there is one)
    let log_area = match scan.outcome() {
        Some(outcome) => {
            let main_chunks = Layout::default()
                .direction(Direction::Horizontal)
                .constraints([Constraint::Percentage(55), Constraint::Percentage(45)])
                .split(chunks[2]);
            let verdict = VerdictPanel::new(outcome).block(
                Block::default()
                    .title(" Verdict ")
                    .borders(Borders::ALL)
                    .border_style(Style::default().fg(outcome_color(outcome))),
            );
            frame.render_widget(verdict, main_chunks[1]);
            main_chunks[0]
        }
        None => chunks[2],
    };

    let lines = scan.log().snapshot();
    let log_block = Block::default()
        .title(format!(" Events ({}) ", lines.len()))
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Cyan));
    state.page_rows = log_block.inner(log_area).height as usize;
    frame.render_stateful_widget(LogView::new(lines).block(log_block), log_area, &mut state.log_view);

    let status = StatusBar {
        job_id: scan.job().map(|job| job.id.to_string()),
        log_lines: lines.len(),
        following: state.log_view.follow,
        message: state.status_message.clone(),
    };
    frame.render_widget(status, chunks[3]);

    frame.render_widget(key_hints(scan), chunks[4]);
}

fn render_title(frame: &mut Frame, area: Rect, state: &AppState, scan: &Orchestrator) {
    let mut spans = vec![
        Span::styled(
            " ScanLens ",
            Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
        ),
        Span::styled(" | ", Style::default().fg(Color::DarkGray)),
        Span::styled(state.service_url.clone(), Style::default().fg(Color::White)),
    ];

    if let Some(file) = scan.file() {
        spans.push(Span::styled(" | ", Style::default().fg(Color::DarkGray)));
        spans.push(Span::styled(
            file.name.clone(),
            Style::default().fg(Color::White).add_modifier(Modifier::BOLD),
        ));
        spans.push(Span::styled(
            format!(" ({})", format_size(file.size)),
            Style::default().fg(Color::DarkGray),
        ));
    }

    let title = Paragraph::new(Line::from(spans)).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::DarkGray)),
    );
    frame.render_widget(title, area);
}

fn key_hints(scan: &Orchestrator) -> Paragraph<'static> {
    let mut hints: Vec<(&str, &str)> = Vec::new();
    if scan.phase() == ScanPhase::Idle {
        hints.push(("o", "Open file"));
    } else {
        hints.push(("r", "Reset"));
    }
    if scan.error().is_some() {
        hints.push(("Esc", "Dismiss"));
    }
    if matches!(scan.outcome(), Some(ScanOutcome::StillScanning(_))) {
        hints.push(("f", "Fetch again"));
    }
    if scan.outcome().is_some() {
        hints.push(("x", "Export"));
    }
    hints.extend([("j/k", "Scroll"), ("?", "Help"), ("q", "Quit")]);

    let mut spans = Vec::new();
    for (key, desc) in hints {
        spans.push(Span::styled(format!(" {}", key), Style::default().fg(Color::Yellow)));
        spans.push(Span::styled(format!(": {} ", desc), Style::default().fg(Color::DarkGray)));
    }
    Paragraph::new(Line::from(spans))
}

fn render_error_overlay(frame: &mut Frame, notice: &ErrorNotice) {
    let area = centered_rect(60, 30, frame.area());
    frame.render_widget(Clear, area);

    let title = match notice.kind {
        ErrorKind::Upload => " Upload failed ",
        ErrorKind::Stream => " Progress stream lost ",
        ErrorKind::Fetch => " Result unavailable ",
    };

    let mut lines = vec![
        Line::from(Span::styled(
            format!(" {}", notice.cause),
            Style::default().fg(Color::Red).add_modifier(Modifier::BOLD),
        )),
        Line::from(""),
    ];

    if let Some(file) = &notice.file {
        lines.push(Line::from(vec![
            Span::styled("  File: ", Style::default().fg(Color::DarkGray)),
            Span::styled(file.name.clone(), Style::default().fg(Color::White)),
            Span::styled(
                format!(" ({})", format_size(file.size)),
                Style::default().fg(Color::DarkGray),
            ),
        ]));
        lines.push(Line::from(""));
    }

    if notice.kind == ErrorKind::Stream {
        lines.push(Line::from(Span::styled(
            "  The last reported progress is kept on screen.",
            Style::default().fg(Color::DarkGray),
        )));
    }
    lines.push(Line::from(Span::styled(
        "  Press Esc to dismiss, r to reset",
        Style::default().fg(Color::DarkGray),
    )));

    let panel = Paragraph::new(lines)
        .block(
            Block::default()
                .title(title)
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::Red)),
        )
        .style(Style::default().bg(Color::Black))
        .wrap(Wrap { trim: false });
    frame.render_widget(panel, area);
}

fn render_file_prompt(frame: &mut Frame, state: &AppState) {
    let area = centered_rect(70, 20, frame.area());
    frame.render_widget(Clear, area);

    let lines = vec![
        Line::from(Span::styled(
            " Path of the file to scan:",
            Style::default().fg(Color::DarkGray),
        )),
        Line::from(vec![
            Span::styled(" > ", Style::default().fg(Color::Yellow)),
            Span::styled(state.path_input.clone(), Style::default().fg(Color::White)),
            Span::styled("_", Style::default().fg(Color::Yellow)),
        ]),
        Line::from(""),
        Line::from(Span::styled(
            " Enter to upload, Esc to cancel",
            Style::default().fg(Color::DarkGray),
        )),
    ];

    let prompt = Paragraph::new(lines)
        .block(
            Block::default()
                .title(" Scan file ")
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::Cyan)),
        )
        .style(Style::default().bg(Color::Black));
    frame.render_widget(prompt, area);
}

/// Helper to create a centered rectangle within a given area
fn centered_rect(percent_x: u16, percent_y: u16, area: Rect) -> Rect {
    let popup_layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(area);

    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(popup_layout[1])[1]
}
