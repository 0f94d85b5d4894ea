//! Check command: validate a definitions file and print the resolved dialogs

use anyhow::Result;
use clap::Args;
use dialogq::dialogs::{DialogDefinition, DialogSummary};
use dialogq::Settings;
use std::path::PathBuf;

use super::load_definitions;

#[derive(Debug, Args)]
pub struct CheckCommand {
    /// Definitions file (JSON)
    #[arg(short, long)]
    pub file: PathBuf,

    /// Pretty print the output
    #[arg(short, long)]
    pub pretty: bool,
}

impl CheckCommand {
    pub fn execute(&self, settings: &Settings) -> Result<()> {
        let definitions = load_definitions(&self.file)?;
        let summaries = summarize(definitions, settings);

        let output = if self.pretty {
            serde_json::to_string_pretty(&summaries)?
        } else {
            serde_json::to_string(&summaries)?
        };
        println!("{}", output);
        Ok(())
    }
}

/// Resolve definitions against the configured defaults
pub fn summarize(definitions: Vec<DialogDefinition>, settings: &Settings) -> Vec<DialogSummary> {
    definitions
        .into_iter()
        .map(|definition| DialogSummary::from(&definition.merge_into(settings.dialog_defaults())))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_summarize_applies_settings_defaults() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"{{"dialogs": [{{"title": "One"}}, {{"title": "Two", "priority": 7, "modal": false}}]}}"#
        )
        .unwrap();

        let settings = Settings {
            default_priority: 2,
            default_modal: true,
            ..Settings::default()
        };
        let summaries = summarize(load_definitions(file.path()).unwrap(), &settings);

        assert_eq!(summaries.len(), 2);
        assert_eq!(summaries[0].priority, 2);
        assert!(summaries[0].modal);
        assert_eq!(summaries[1].priority, 7);
        assert!(!summaries[1].modal);
    }

    #[test]
    fn test_missing_file_names_path() {
        let err = load_definitions(std::path::Path::new("/nonexistent/dialogs.json")).unwrap_err();
        assert!(err.to_string().contains("/nonexistent/dialogs.json"));
    }

    #[test]
    fn test_invalid_file_is_readable_error() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "{{").unwrap();

        let err = load_definitions(file.path()).unwrap_err();
        assert!(format!("{:#}", err).contains("expected a list of dialogs"));
    }
}
