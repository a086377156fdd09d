use std::path::PathBuf;

use crate::ui::widgets::log_view::LogViewState;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ViewMode {
    Normal,
    Help,
    FilePrompt,
}

/// Presentation-only state. Everything about the scan itself lives in the
/// session's orchestrator.
pub struct AppState {
    pub view_mode: ViewMode,
    pub service_url: String,
    pub path_input: String,
    pub log_view: LogViewState,
    pub page_rows: usize,
    pub status_message: Option<String>,
    pub should_quit: bool,
}

impl AppState {
    pub fn new(service_url: String) -> Self {
        Self {
            view_mode: ViewMode::Normal,
            service_url,
            path_input: String::new(),
            log_view: LogViewState::default(),
            page_rows: 10,
            status_message: None,
            should_quit: false,
        }
    }

    pub fn open_prompt(&mut self) {
        self.path_input.clear();
        self.view_mode = ViewMode::FilePrompt;
    }

    pub fn close_prompt(&mut self) {
        self.view_mode = ViewMode::Normal;
    }

    /// Take the typed path, leaving the prompt. `None` if nothing was typed.
    pub fn take_path_input(&mut self) -> Option<PathBuf> {
        self.view_mode = ViewMode::Normal;
        let input = std::mem::take(&mut self.path_input);
        let trimmed = input.trim();
        if trimmed.is_empty() {
            None
        } else {
            Some(PathBuf::from(trimmed))
        }
    }

    pub fn toggle_help(&mut self) {
        self.view_mode = if self.view_mode == ViewMode::Help {
            ViewMode::Normal
        } else {
            ViewMode::Help
        };
    }

    pub fn scroll_up(&mut self) {
        self.log_view.scroll_up(1);
    }

    pub fn scroll_down(&mut self) {
        self.log_view.scroll_down(1);
    }

    pub fn page_up(&mut self) {
        self.log_view.scroll_up(self.page_rows.max(1));
    }

    pub fn page_down(&mut self) {
        self.log_view.scroll_down(self.page_rows.max(1));
    }

    pub fn set_status(&mut self, message: impl Into<String>) {
        self.status_message = Some(message.into());
    }

    /// Forget scroll position and messages after the scan is reset.
    pub fn clear_scan_view(&mut self) {
        self.log_view = LogViewState::default();
        self.status_message = None;
    }
}
