//! A prioritized dialog queue with a show/hide lifecycle, button bars and
//! auto-click countdowns.

pub mod config;
pub mod dialogs;
pub mod surface;

pub use config::Settings;
pub use dialogs::{
    ButtonConfig, ClickOutcome, Content, DialogConfig, DialogCx, DialogError, DialogEvent, DialogId,
    DialogManager, DialogResult,
};
