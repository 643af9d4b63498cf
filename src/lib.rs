pub mod client;
pub mod config;
pub mod context_store;
pub mod error;
pub mod formatter;
pub mod interfaces;
pub mod logging;
pub mod panel_fsm;
pub mod runtime_paths;
pub mod terminal;
pub mod transcript;
pub mod widget;

pub type Result<T> = std::result::Result<T, error::ChatWidgetError>;
