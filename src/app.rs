use std::path::{Path, PathBuf};
use std::time::Duration;

use crossterm::event::{Event, KeyEvent};
use crossterm::execute;
use crossterm::terminal::{self, EnterAlternateScreen, LeaveAlternateScreen};
use ratatui::backend::CrosstermBackend;
use ratatui::Terminal;
use tokio::sync::mpsc;

use crate::core::events::EventReceiver;
use crate::core::orchestrator::ScanPhase;
use crate::core::session::Session;
use crate::ui::app_state::AppState;
use crate::ui::input::{self, InputAction};
use crate::ui::renderer;

pub struct App {
    state: AppState,
    session: Session,
    initial_file: Option<PathBuf>,
}

impl App {
    pub fn new(session: Session, initial_file: Option<PathBuf>) -> Self {
        let service_url = session.settings().base_url();
        Self {
            state: AppState::new(service_url),
            session,
            initial_file,
        }
    }

    pub async fn run(&mut self, event_rx: EventReceiver) -> anyhow::Result<()> {
        // Initialize terminal
        terminal::enable_raw_mode()?;
        let mut stdout = std::io::stdout();
        execute!(stdout, EnterAlternateScreen)?;
        let backend = CrosstermBackend::new(stdout);
        let mut terminal = Terminal::new(backend)?;
        terminal.clear()?;

        if let Some(path) = self.initial_file.take() {
            self.submit(&path);
        }

        let result = self.event_loop(&mut terminal, event_rx).await;

        // Restore terminal
        self.session.reset();
        terminal::disable_raw_mode()?;
        execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
        terminal.show_cursor()?;

        result
    }

    async fn event_loop(
        &mut self,
        terminal: &mut Terminal<CrosstermBackend<std::io::Stdout>>,
        mut event_rx: EventReceiver,
    ) -> anyhow::Result<()> {
        // Terminal input is read on a blocking thread and forwarded here.
        let (input_tx, mut input_rx) = mpsc::unbounded_channel::<Event>();
        let _input_thread = tokio::task::spawn_blocking(move || {
            loop {
                match input::poll_event(Duration::from_millis(50)) {
                    Ok(Some(event)) => {
                        if input_tx.send(event).is_err() {
                            break;
                        }
                    }
                    Ok(None) => {}
                    Err(_) => break,
                }
            }
        });

        let mut tick_interval = tokio::time::interval(Duration::from_millis(100));

        loop {
            terminal.draw(|frame| {
                renderer::render(frame, &mut self.state, self.session.state());
            })?;

            tokio::select! {
                input_event = input_rx.recv() => {
                    match input_event {
                        Some(Event::Key(key)) => self.handle_key(key),
                        Some(_) => {
                            // Resize and mouse events only need a redraw
                        }
                        None => return Ok(()),
                    }
                }
                scan_event = event_rx.recv() => {
                    match scan_event {
                        Some(event) => self.session.handle(event),
                        None => return Ok(()),
                    }
                    // Drain whatever else is queued so a burst of log lines
                    // costs one redraw.
                    while let Ok(event) = event_rx.try_recv() {
                        self.session.handle(event);
                    }
                }
                _ = tick_interval.tick() => {}
            }

            if self.state.should_quit {
                return Ok(());
            }
        }
    }

    /// Presentation state, as last updated by input.
    pub fn view(&self) -> &AppState {
        &self.state
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn handle_key(&mut self, key: KeyEvent) {
        let action = input::handle_key_event(key, &mut self.state);
        self.handle_action(action);
    }

    pub fn handle_action(&mut self, action: InputAction) {
        match action {
            InputAction::Submit(path) => self.submit(&path),
            InputAction::Reset => {
                self.session.reset();
                self.state.clear_scan_view();
            }
            InputAction::Dismiss => self.session.dismiss_error(),
            InputAction::Refetch => self.session.refetch(),
            InputAction::Export => self.handle_export(),
            InputAction::ExportReport => self.handle_report_export(),
            InputAction::Quit | InputAction::None => {}
        }
    }

    fn submit(&mut self, path: &Path) {
        // A refused start must leave the live scan's log view alone.
        match self.session.start(path) {
            Ok(()) => self.state.clear_scan_view(),
            Err(e) => {
                tracing::warn!("Could not start scan: {}", e);
                self.state.set_status(e.to_string());
            }
        }
    }

    fn handle_export(&mut self) {
        let Some(outcome) = self.session.state().outcome() else {
            self.state.set_status("Nothing to export yet");
            return;
        };
        let path = PathBuf::from(format!(
            "scanlens_result_{}.json",
            chrono::Local::now().format("%Y%m%d_%H%M%S")
        ));
        match crate::export::json::export_outcome(outcome, &path) {
            Ok(()) => {
                tracing::info!("Exported to: {}", path.display());
                self.state.set_status(format!("Exported to {}", path.display()));
            }
            Err(e) => {
                tracing::error!("Export failed: {}", e);
                self.state.set_status(format!("Export failed: {}", e));
            }
        }
    }

    fn handle_report_export(&mut self) {
        if self.session.state().phase() == ScanPhase::Idle {
            self.state.set_status("Nothing to export yet");
            return;
        }
        let path = PathBuf::from(format!(
            "scanlens_report_{}.md",
            chrono::Local::now().format("%Y%m%d_%H%M%S")
        ));
        match crate::export::markdown::export_markdown(self.session.state(), &path) {
            Ok(()) => self.state.set_status(format!("Report written to {}", path.display())),
            Err(e) => {
                tracing::error!("Report export failed: {}", e);
                self.state.set_status(format!("Export failed: {}", e));
            }
        }
    }
}

/// Run one scan without a terminal UI, printing the event log to stdout.
///
/// Returns whether the scan reached `Completed`.
pub async fn run_headless(
    mut session: Session,
    mut event_rx: EventReceiver,
    path: &Path,
    export_json: Option<&Path>,
    export_report: Option<&Path>,
) -> anyhow::Result<bool> {
    session.start(path)?;
    println!("Uploading {} to {}", path.display(), session.settings().base_url());

    let mut printed = 0;
    while !session.state().is_settled() {
        let Some(event) = event_rx.recv().await else {
            break;
        };
        session.handle(event);

        let lines = session.state().log().snapshot();
        for line in &lines[printed..] {
            println!("{}", line.display());
        }
        printed = lines.len();
    }

    let scan = session.state();
    if let Some(notice) = scan.error() {
        eprintln!("error: {}", notice.cause);
    }
    if scan.is_stalled() {
        eprintln!(
            "scan stalled at {}%: {}",
            scan.progress().percent(),
            scan.progress().message
        );
    }
    if let Some(outcome) = scan.outcome() {
        println!("Verdict: {}", outcome.label());
        if let Some(report) = outcome.report() {
            for threat in &report.threats {
                println!(
                    "  [{}] {:?} {}: {}",
                    threat.threat_id, threat.severity, threat.threat_type, threat.details
                );
            }
        }
        if let Some(out) = export_json {
            crate::export::json::export_outcome(outcome, out)?;
            println!("Exported to: {}", out.display());
        }
    }
    if let Some(out) = export_report {
        crate::export::markdown::export_markdown(scan, out)?;
        println!("Report written to: {}", out.display());
    }

    Ok(scan.phase() == ScanPhase::Completed)
}
