//! Demo command: drive the dialog manager from the terminal

use anyhow::Result;
use clap::Args;
use dialogq::dialogs::{parse_definitions, DialogDefinition};
use dialogq::Settings;
use std::path::PathBuf;
use tracing::info;

use super::load_definitions;
use crate::tui;

/// Dialogs shown when no definitions file is given
const DEFAULT_DEFINITIONS: &str = r#"[
  {
    "title": "Welcome",
    "content": "This is the dialog queue demo.\nTab moves between buttons, Enter clicks.",
    "buttons": [{"label": "Got it", "style": "btn btn-primary"}]
  },
  {
    "title": "Update available",
    "content": "Installing in a few seconds unless you decide otherwise.",
    "modal": true,
    "priority": 2,
    "auto_show": false,
    "buttons": [
      {"label": "Install", "style": "btn btn-primary", "auto_click_after_ms": 5000},
      {"label": "Later"}
    ]
  },
  {
    "title": "Disk almost full",
    "content": "Only 3% of the disk is free.",
    "priority": 5,
    "auto_show": false,
    "buttons": [
      {"label": "Dismiss", "style": "btn btn-danger"},
      {"label": "Remind me", "close_dialog": false}
    ]
  },
  {
    "content": "A dialog without title or buttons. Close it with Esc or [x].",
    "show_title": false,
    "show_buttons": false,
    "auto_show": false
  }
]"#;

#[derive(Debug, Default, Args)]
pub struct DemoCommand {
    /// Definitions file (JSON); built-in dialogs are used when omitted
    #[arg(short, long)]
    pub file: Option<PathBuf>,

    /// Disable mouse support
    #[arg(long = "no-mouse")]
    pub no_mouse: bool,
}

impl DemoCommand {
    pub async fn execute(&self, mut settings: Settings) -> Result<()> {
        let definitions = self.definitions()?;
        if self.no_mouse {
            settings.mouse_enabled = false;
        }

        info!("Starting demo with {} dialog definitions", definitions.len());
        tui::run(settings, definitions).await
    }

    fn definitions(&self) -> Result<Vec<DialogDefinition>> {
        match &self.file {
            Some(path) => load_definitions(path),
            None => Ok(parse_definitions(DEFAULT_DEFINITIONS)?),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_definitions_parse() {
        let definitions = DemoCommand::default().definitions().unwrap();

        assert_eq!(definitions.len(), 4);
        assert_eq!(definitions[1].buttons[0].auto_click_after_ms, Some(5000));
    }
}
