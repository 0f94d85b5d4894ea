//! Declarative dialog definitions
//!
//! Definitions are the serializable subset of [`DialogConfig`]: every field is
//! optional and merged onto a set of defaults. Callbacks cannot be expressed in
//! JSON, so buttons with an auto-click delay get a countdown tick handler that
//! shows the remaining seconds in the label.

use super::types::{ButtonConfig, DialogConfig, DialogError, DialogResult};
use serde::{Deserialize, Serialize};
use std::time::Duration;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ButtonDefinition {
    pub label: Option<String>,
    pub style: Option<String>,
    pub auto_click_after_ms: Option<u64>,
    pub close_dialog: Option<bool>,
    /// Append the remaining seconds to the label while counting down
    pub countdown: Option<bool>,
}

impl ButtonDefinition {
    pub fn into_config(self) -> ButtonConfig {
        let defaults = ButtonConfig::default();
        let label = self.label.unwrap_or(defaults.label.clone());
        let mut button = ButtonConfig {
            label: label.clone(),
            style: self.style.unwrap_or(defaults.style.clone()),
            close_dialog: self.close_dialog.unwrap_or(defaults.close_dialog),
            ..defaults
        };

        if let Some(ms) = self.auto_click_after_ms.filter(|ms| *ms > 0) {
            let delay = Duration::from_millis(ms);
            let total = ms.div_ceil(1000);
            let countdown = self.countdown.unwrap_or(true);
            button = button.auto_click_after(delay).on_tick(move |cx, counter| {
                if countdown {
                    let remaining = total.saturating_sub(u64::from(counter));
                    cx.set_label(format!("{label} ({remaining})"));
                }
            });
        }
        button
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DialogDefinition {
    pub title: Option<String>,
    pub content: Option<String>,
    pub buttons: Vec<ButtonDefinition>,
    pub show_close: Option<bool>,
    pub show_title: Option<bool>,
    pub show_buttons: Option<bool>,
    pub modal: Option<bool>,
    pub auto_show: Option<bool>,
    pub priority: Option<i32>,
}

impl DialogDefinition {
    /// Merge onto `defaults`; fields set here win
    pub fn merge_into(self, defaults: DialogConfig) -> DialogConfig {
        let mut config = defaults;
        if let Some(title) = self.title {
            config.title = title.into();
        }
        if let Some(content) = self.content {
            config.content = content.into();
        }
        config
            .buttons
            .extend(self.buttons.into_iter().map(ButtonDefinition::into_config));
        if let Some(show_close) = self.show_close {
            config.show_close = show_close;
        }
        if let Some(show_title) = self.show_title {
            config.show_title = show_title;
        }
        if let Some(show_buttons) = self.show_buttons {
            config.show_buttons = show_buttons;
        }
        if let Some(modal) = self.modal {
            config.modal = modal;
        }
        if let Some(auto_show) = self.auto_show {
            config.auto_show = auto_show;
        }
        if let Some(priority) = self.priority {
            config.priority = priority;
        }
        config
    }
}

/// A definitions file: a bare array or an object with a `dialogs` array
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum DefinitionFile {
    List(Vec<DialogDefinition>),
    Wrapped { dialogs: Vec<DialogDefinition> },
}

/// Parse a definitions file
pub fn parse_definitions(json: &str) -> DialogResult<Vec<DialogDefinition>> {
    let file: DefinitionFile = serde_json::from_str(json).map_err(|err| {
        DialogError::InvalidDefinition(format!("expected a list of dialogs: {err}"))
    })?;

    let definitions = match file {
        DefinitionFile::List(dialogs) | DefinitionFile::Wrapped { dialogs } => dialogs,
    };
    for (index, definition) in definitions.iter().enumerate() {
        if let Some(button) = definition
            .buttons
            .iter()
            .find(|button| button.label.as_deref() == Some(""))
        {
            return Err(DialogError::InvalidDefinition(format!(
                "dialog {index} has a button with an empty label ({button:?})"
            )));
        }
    }
    Ok(definitions)
}

/// Serializable summary of a resolved configuration
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DialogSummary {
    pub title: String,
    pub content: String,
    pub priority: i32,
    pub modal: bool,
    pub auto_show: bool,
    pub show_close: bool,
    pub show_title: bool,
    pub show_buttons: bool,
    pub buttons: Vec<ButtonSummary>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ButtonSummary {
    pub label: String,
    pub style: String,
    pub close_dialog: bool,
    pub auto_click_after_ms: Option<u128>,
}

impl From<&DialogConfig> for DialogSummary {
    fn from(config: &DialogConfig) -> Self {
        Self {
            title: config.title.to_plain(),
            content: config.content.to_plain(),
            priority: config.priority,
            modal: config.modal,
            auto_show: config.auto_show,
            show_close: config.show_close,
            show_title: config.show_title,
            show_buttons: config.show_buttons,
            buttons: config
                .buttons
                .iter()
                .map(|button| ButtonSummary {
                    label: button.label.clone(),
                    style: button.style.clone(),
                    close_dialog: button.close_dialog,
                    auto_click_after_ms: button
                        .auto_click_after
                        .filter(|_| button.auto_clicks())
                        .map(|delay| delay.as_millis()),
                })
                .collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dialogs::{Content, DialogCx, DialogId};

    #[test]
    fn test_parse_bare_list() {
        let definitions = parse_definitions(
            r#"[{"title": "Hello", "priority": 3, "buttons": [{"label": "Yes"}, {}]}]"#,
        )
        .unwrap();

        assert_eq!(definitions.len(), 1);
        assert_eq!(definitions[0].title.as_deref(), Some("Hello"));
        assert_eq!(definitions[0].buttons.len(), 2);
    }

    #[test]
    fn test_parse_wrapped_list() {
        let definitions = parse_definitions(r#"{"dialogs": [{"modal": true}, {}]}"#).unwrap();

        assert_eq!(definitions.len(), 2);
        assert_eq!(definitions[0].modal, Some(true));
    }

    #[test]
    fn test_parse_rejects_garbage() {
        let err = parse_definitions(r#"{"title": "not a list"}"#).unwrap_err();
        assert!(matches!(err, DialogError::InvalidDefinition(_)));
    }

    #[test]
    fn test_parse_rejects_empty_label() {
        let err = parse_definitions(r#"[{"buttons": [{"label": ""}]}]"#).unwrap_err();
        assert!(err.to_string().contains("empty label"));
    }

    #[test]
    fn test_merge_onto_defaults() {
        let defaults = DialogConfig::default().with_priority(2).modal(true);
        let definition = DialogDefinition {
            content: Some("Body".to_string()),
            modal: Some(false),
            ..DialogDefinition::default()
        };

        let config = definition.merge_into(defaults);
        assert_eq!(config.content, Content::from("Body"));
        assert!(config.title.is_empty());
        assert_eq!(config.priority, 2);
        assert!(!config.modal);
    }

    #[test]
    fn test_button_defaults() {
        let button = ButtonDefinition::default().into_config();

        assert_eq!(button.label, "OK");
        assert_eq!(button.style, "btn");
        assert!(button.close_dialog);
        assert!(!button.auto_clicks());
    }

    #[test]
    fn test_countdown_relabels_button() {
        let button = ButtonDefinition {
            label: Some("Continue".to_string()),
            auto_click_after_ms: Some(3000),
            ..ButtonDefinition::default()
        }
        .into_config();
        assert!(button.auto_clicks());

        let on_tick = button.on_tick.unwrap();
        let mut cx = DialogCx::new(DialogId::new(1), Some(0));
        on_tick(&mut cx, 1);

        assert_eq!(
            cx.into_requests(),
            vec![crate::dialogs::types::Request::SetButtonLabel(
                DialogId::new(1),
                0,
                "Continue (2)".to_string()
            )]
        );
    }

    #[test]
    fn test_summary() {
        let config = DialogDefinition {
            title: Some("Update".to_string()),
            buttons: vec![ButtonDefinition {
                auto_click_after_ms: Some(1500),
                ..ButtonDefinition::default()
            }],
            ..DialogDefinition::default()
        }
        .merge_into(DialogConfig::default());

        let summary = DialogSummary::from(&config);
        assert_eq!(summary.title, "Update");
        assert_eq!(summary.buttons[0].auto_click_after_ms, Some(1500));
    }
}
