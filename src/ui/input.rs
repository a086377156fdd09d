use std::path::PathBuf;
use std::time::Duration;

use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyModifiers};

use crate::ui::app_state::{AppState, ViewMode};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InputAction {
    None,
    Quit,
    Submit(PathBuf),
    Reset,
    Dismiss,
    Refetch,
    Export,
    ExportReport,
}

pub fn handle_key_event(key: KeyEvent, state: &mut AppState) -> InputAction {
    // Ctrl+C quits from anywhere
    if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
        state.should_quit = true;
        return InputAction::Quit;
    }

    match state.view_mode {
        ViewMode::Normal => handle_normal_mode(key, state),
        ViewMode::Help => handle_help_mode(key, state),
        ViewMode::FilePrompt => handle_prompt_mode(key, state),
    }
}

fn handle_normal_mode(key: KeyEvent, state: &mut AppState) -> InputAction {
    // Any key clears a transient status message
    state.status_message = None;

    match key.code {
        KeyCode::Char('q') => {
            state.should_quit = true;
            InputAction::Quit
        }
        KeyCode::Char('o') => {
            state.open_prompt();
            InputAction::None
        }
        KeyCode::Char('r') => InputAction::Reset,
        KeyCode::Char('d') | KeyCode::Esc => InputAction::Dismiss,
        KeyCode::Char('f') => InputAction::Refetch,
        KeyCode::Char('x') => InputAction::Export,
        KeyCode::Char('m') => InputAction::ExportReport,
        KeyCode::Char('j') | KeyCode::Down => {
            state.scroll_down();
            InputAction::None
        }
        KeyCode::Char('k') | KeyCode::Up => {
            state.scroll_up();
            InputAction::None
        }
        KeyCode::PageDown => {
            state.page_down();
            InputAction::None
        }
        KeyCode::PageUp => {
            state.page_up();
            InputAction::None
        }
        KeyCode::Char('g') | KeyCode::Home => {
            state.log_view.to_top();
            InputAction::None
        }
        KeyCode::Char('G') | KeyCode::End => {
            state.log_view.to_bottom();
            InputAction::None
        }
        KeyCode::Char('?') => {
            state.toggle_help();
            InputAction::None
        }
        _ => InputAction::None,
    }
}

fn handle_help_mode(key: KeyEvent, state: &mut AppState) -> InputAction {
    match key.code {
        KeyCode::Char('?') | KeyCode::Esc | KeyCode::Char('q') => {
            state.toggle_help();
            InputAction::None
        }
        _ => InputAction::None,
    }
}

fn handle_prompt_mode(key: KeyEvent, state: &mut AppState) -> InputAction {
    match key.code {
        KeyCode::Esc => {
            state.close_prompt();
            InputAction::None
        }
        KeyCode::Enter => match state.take_path_input() {
            Some(path) => InputAction::Submit(path),
            None => InputAction::None,
        },
        KeyCode::Backspace => {
            state.path_input.pop();
            InputAction::None
        }
        KeyCode::Char(c) => {
            state.path_input.push(c);
            InputAction::None
        }
        _ => InputAction::None,
    }
}

pub fn poll_event(timeout: Duration) -> anyhow::Result<Option<Event>> {
    if event::poll(timeout)? {
        Ok(Some(event::read()?))
    } else {
        Ok(None)
    }
}
