pub mod help_panel;
pub mod log_view;
pub mod progress_bar;
pub mod status_bar;
pub mod verdict_panel;
