//! Core dialog types
//!
//! This module defines identifiers, content, configuration, callbacks, events and
//! errors for the dialog queue. Configuration is plain data with builder methods;
//! the [`DialogManager`](super::DialogManager) owns every instance built from it.

use ratatui::text::Text;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;
use std::time::Duration;

/// Unique identifier for dialog instances
///
/// Issued by the manager on construction and never reused, so it doubles as the
/// dialog's identity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct DialogId(pub u64);

impl DialogId {
    pub fn new(raw: u64) -> Self {
        Self(raw)
    }

    pub fn as_u64(self) -> u64 {
        self.0
    }
}

impl fmt::Display for DialogId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "dialog-{}", self.0)
    }
}

/// Title or body content of a dialog
///
/// Markup is handed to the surface as raw text; rich content is embedded as-is.
#[derive(Debug, Clone, PartialEq)]
pub enum Content {
    Markup(String),
    Rich(Text<'static>),
}

impl Content {
    pub fn is_empty(&self) -> bool {
        match self {
            Self::Markup(markup) => markup.is_empty(),
            Self::Rich(text) => text.lines.iter().all(|line| line.width() == 0),
        }
    }

    /// Flatten to plain text, one line per rendered line
    pub fn to_plain(&self) -> String {
        match self {
            Self::Markup(markup) => markup.clone(),
            Self::Rich(text) => text
                .lines
                .iter()
                .map(|line| {
                    line.spans
                        .iter()
                        .map(|span| span.content.as_ref())
                        .collect::<String>()
                })
                .collect::<Vec<_>>()
                .join("\n"),
        }
    }
}

impl Default for Content {
    fn default() -> Self {
        Self::Markup(String::new())
    }
}

impl From<&str> for Content {
    fn from(markup: &str) -> Self {
        Self::Markup(markup.to_string())
    }
}

impl From<String> for Content {
    fn from(markup: String) -> Self {
        Self::Markup(markup)
    }
}

impl From<Text<'static>> for Content {
    fn from(text: Text<'static>) -> Self {
        Self::Rich(text)
    }
}

/// Lifecycle and caller callback
pub type Callback = Arc<dyn Fn(&mut DialogCx) + Send + Sync>;

/// Button click callback; its outcome may keep the dialog open
pub type ClickCallback = Arc<dyn Fn(&mut DialogCx) -> ClickOutcome + Send + Sync>;

/// Countdown callback, invoked with a 1-based counter once per second
pub type TickCallback = Arc<dyn Fn(&mut DialogCx, u32) + Send + Sync>;

/// What a click handler wants to happen after it returns
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ClickOutcome {
    /// Continue with the button's default behaviour
    #[default]
    Proceed,
    /// Veto the automatic close
    KeepOpen,
}

impl From<()> for ClickOutcome {
    fn from(_: ()) -> Self {
        Self::Proceed
    }
}

impl From<bool> for ClickOutcome {
    fn from(proceed: bool) -> Self {
        if proceed {
            Self::Proceed
        } else {
            Self::KeepOpen
        }
    }
}

/// Follow-up operations requested from inside a callback
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Request {
    SetTitle(DialogId, Content),
    SetContent(DialogId, Content),
    SetButtonLabel(DialogId, usize, String),
    Show(DialogId),
    Hide(DialogId),
    Close(DialogId),
}

/// Context handed to every callback
///
/// Callbacks run while the manager is mid-transition, so instead of mutating it
/// directly they queue requests here. The manager applies them in order once
/// the current operation has finished.
#[derive(Debug)]
pub struct DialogCx {
    id: DialogId,
    button: Option<usize>,
    requests: Vec<Request>,
}

impl DialogCx {
    pub(crate) fn new(id: DialogId, button: Option<usize>) -> Self {
        Self {
            id,
            button,
            requests: Vec::new(),
        }
    }

    /// The dialog this callback belongs to
    pub fn id(&self) -> DialogId {
        self.id
    }

    /// Index of the button that triggered the callback, if any
    pub fn button(&self) -> Option<usize> {
        self.button
    }

    pub fn set_title(&mut self, title: impl Into<Content>) -> &mut Self {
        self.requests.push(Request::SetTitle(self.id, title.into()));
        self
    }

    pub fn set_content(&mut self, content: impl Into<Content>) -> &mut Self {
        self.requests.push(Request::SetContent(self.id, content.into()));
        self
    }

    /// Relabel the button that triggered the callback
    pub fn set_label(&mut self, label: impl Into<String>) -> &mut Self {
        if let Some(index) = self.button {
            self.requests
                .push(Request::SetButtonLabel(self.id, index, label.into()));
        }
        self
    }

    pub fn show(&mut self, id: DialogId) -> &mut Self {
        self.requests.push(Request::Show(id));
        self
    }

    pub fn hide(&mut self, id: DialogId) -> &mut Self {
        self.requests.push(Request::Hide(id));
        self
    }

    pub fn close(&mut self, id: DialogId) -> &mut Self {
        self.requests.push(Request::Close(id));
        self
    }

    pub(crate) fn into_requests(self) -> Vec<Request> {
        self.requests
    }
}

/// Button configuration
#[derive(Clone)]
pub struct ButtonConfig {
    pub label: String,
    /// Style tag, interpreted by the surface
    pub style: String,
    pub on_click: Option<ClickCallback>,
    /// Delay before the button clicks itself
    pub auto_click_after: Option<Duration>,
    pub on_tick: Option<TickCallback>,
    /// Whether clicking removes the dialog
    pub close_dialog: bool,
}

impl Default for ButtonConfig {
    fn default() -> Self {
        Self {
            label: "OK".to_string(),
            style: "btn".to_string(),
            on_click: None,
            auto_click_after: None,
            on_tick: None,
            close_dialog: true,
        }
    }
}

impl ButtonConfig {
    pub fn new(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            ..Self::default()
        }
    }

    pub fn with_style(mut self, style: impl Into<String>) -> Self {
        self.style = style.into();
        self
    }

    pub fn on_click<F, R>(mut self, on_click: F) -> Self
    where
        F: Fn(&mut DialogCx) -> R + Send + Sync + 'static,
        R: Into<ClickOutcome>,
    {
        self.on_click = Some(Arc::new(move |cx: &mut DialogCx| -> ClickOutcome {
            on_click(cx).into()
        }));
        self
    }

    pub fn auto_click_after(mut self, delay: Duration) -> Self {
        self.auto_click_after = Some(delay);
        self
    }

    pub fn on_tick<F>(mut self, on_tick: F) -> Self
    where
        F: Fn(&mut DialogCx, u32) + Send + Sync + 'static,
    {
        self.on_tick = Some(Arc::new(on_tick));
        self
    }

    pub fn close_dialog(mut self, close_dialog: bool) -> Self {
        self.close_dialog = close_dialog;
        self
    }

    /// A countdown is armed only for a positive delay with a tick handler
    pub fn auto_clicks(&self) -> bool {
        self.on_tick.is_some() && self.auto_click_after.is_some_and(|delay| !delay.is_zero())
    }
}

impl fmt::Debug for ButtonConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ButtonConfig")
            .field("label", &self.label)
            .field("style", &self.style)
            .field("on_click", &self.on_click.is_some())
            .field("auto_click_after", &self.auto_click_after)
            .field("on_tick", &self.on_tick.is_some())
            .field("close_dialog", &self.close_dialog)
            .finish()
    }
}

/// Dialog configuration options
#[derive(Clone)]
pub struct DialogConfig {
    pub title: Content,
    pub content: Content,
    pub buttons: Vec<ButtonConfig>,
    pub on_add: Option<Callback>,
    pub on_show: Option<Callback>,
    pub on_hide: Option<Callback>,
    pub on_remove: Option<Callback>,
    /// Render the close control in the title bar
    pub show_close: bool,
    pub show_title: bool,
    pub show_buttons: bool,
    /// Dim the rest of the surface with an overlay while shown
    pub modal: bool,
    /// Show on construction when nothing of higher or equal priority is active
    pub auto_show: bool,
    pub priority: i32,
}

impl Default for DialogConfig {
    fn default() -> Self {
        Self {
            title: Content::default(),
            content: Content::default(),
            buttons: Vec::new(),
            on_add: None,
            on_show: None,
            on_hide: None,
            on_remove: None,
            show_close: true,
            show_title: true,
            show_buttons: true,
            modal: false,
            auto_show: true,
            priority: 1,
        }
    }
}

impl DialogConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_title(mut self, title: impl Into<Content>) -> Self {
        self.title = title.into();
        self
    }

    pub fn with_content(mut self, content: impl Into<Content>) -> Self {
        self.content = content.into();
        self
    }

    pub fn with_button(mut self, button: ButtonConfig) -> Self {
        self.buttons.push(button);
        self
    }

    pub fn with_buttons(mut self, buttons: impl IntoIterator<Item = ButtonConfig>) -> Self {
        self.buttons.extend(buttons);
        self
    }

    pub fn on_add(mut self, callback: impl Fn(&mut DialogCx) + Send + Sync + 'static) -> Self {
        self.on_add = Some(Arc::new(callback));
        self
    }

    pub fn on_show(mut self, callback: impl Fn(&mut DialogCx) + Send + Sync + 'static) -> Self {
        self.on_show = Some(Arc::new(callback));
        self
    }

    pub fn on_hide(mut self, callback: impl Fn(&mut DialogCx) + Send + Sync + 'static) -> Self {
        self.on_hide = Some(Arc::new(callback));
        self
    }

    pub fn on_remove(mut self, callback: impl Fn(&mut DialogCx) + Send + Sync + 'static) -> Self {
        self.on_remove = Some(Arc::new(callback));
        self
    }

    pub fn show_close(mut self, show_close: bool) -> Self {
        self.show_close = show_close;
        self
    }

    pub fn show_title(mut self, show_title: bool) -> Self {
        self.show_title = show_title;
        self
    }

    pub fn show_buttons(mut self, show_buttons: bool) -> Self {
        self.show_buttons = show_buttons;
        self
    }

    pub fn modal(mut self, modal: bool) -> Self {
        self.modal = modal;
        self
    }

    pub fn auto_show(mut self, auto_show: bool) -> Self {
        self.auto_show = auto_show;
        self
    }

    pub fn with_priority(mut self, priority: i32) -> Self {
        self.priority = priority;
        self
    }

    /// Whether the button bar is rendered at all
    pub fn has_button_bar(&self) -> bool {
        self.show_buttons && !self.buttons.is_empty()
    }
}

impl fmt::Debug for DialogConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DialogConfig")
            .field("title", &self.title)
            .field("content", &self.content)
            .field("buttons", &self.buttons)
            .field("show_close", &self.show_close)
            .field("show_title", &self.show_title)
            .field("show_buttons", &self.show_buttons)
            .field("modal", &self.modal)
            .field("auto_show", &self.auto_show)
            .field("priority", &self.priority)
            .finish_non_exhaustive()
    }
}

/// Events emitted by the manager
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum DialogEvent {
    Queued { id: DialogId },
    Added { id: DialogId },
    Shown { id: DialogId },
    Hidden { id: DialogId },
    Removed { id: DialogId },
    ButtonClicked { id: DialogId, button: usize, auto: bool },
    Ticked { id: DialogId, button: usize, counter: u32 },
}

/// Result type for dialog operations
pub type DialogResult<T> = std::result::Result<T, DialogError>;

/// Dialog-specific error types
#[derive(Debug, thiserror::Error)]
pub enum DialogError {
    #[error("Dialog '{0}' not found")]
    NotFound(DialogId),

    #[error("Dialog '{0}' has no button {1}")]
    ButtonNotFound(DialogId, usize),

    #[error("Invalid dialog definition: {0}")]
    InvalidDefinition(String),

    #[error("Surface operation failed: {0}")]
    Surface(#[from] anyhow::Error),
}

#[cfg(test)]
mod tests {
    use super::*;
    use ratatui::text::Line;

    #[test]
    fn test_dialog_defaults() {
        let config = DialogConfig::default();

        assert!(config.title.is_empty());
        assert!(config.content.is_empty());
        assert!(config.show_close);
        assert!(config.show_title);
        assert!(config.show_buttons);
        assert!(config.auto_show);
        assert!(!config.modal);
        assert_eq!(config.priority, 1);
        assert!(!config.has_button_bar());
    }

    #[test]
    fn test_button_defaults() {
        let button = ButtonConfig::default();

        assert_eq!(button.label, "OK");
        assert_eq!(button.style, "btn");
        assert!(button.close_dialog);
        assert!(!button.auto_clicks());
    }

    #[test]
    fn test_auto_click_requires_tick_handler_and_delay() {
        let no_tick = ButtonConfig::new("Go").auto_click_after(Duration::from_secs(2));
        assert!(!no_tick.auto_clicks());

        let zero = ButtonConfig::new("Go")
            .auto_click_after(Duration::ZERO)
            .on_tick(|_, _| {});
        assert!(!zero.auto_clicks());

        let armed = ButtonConfig::new("Go")
            .auto_click_after(Duration::from_secs(2))
            .on_tick(|_, _| {});
        assert!(armed.auto_clicks());
    }

    #[test]
    fn test_click_outcome_conversions() {
        assert_eq!(ClickOutcome::from(()), ClickOutcome::Proceed);
        assert_eq!(ClickOutcome::from(true), ClickOutcome::Proceed);
        assert_eq!(ClickOutcome::from(false), ClickOutcome::KeepOpen);
    }

    #[test]
    fn test_context_collects_requests() {
        let id = DialogId::new(7);
        let mut cx = DialogCx::new(id, Some(1));
        cx.set_label("Wait (2)").close(id);

        assert_eq!(
            cx.into_requests(),
            vec![
                Request::SetButtonLabel(id, 1, "Wait (2)".to_string()),
                Request::Close(id),
            ]
        );
    }

    #[test]
    fn test_set_label_without_button_is_ignored() {
        let mut cx = DialogCx::new(DialogId::new(1), None);
        cx.set_label("nothing");
        assert!(cx.into_requests().is_empty());
    }

    #[test]
    fn test_rich_content_to_plain() {
        let content = Content::from(Text::from(vec![Line::from("first"), Line::from("second")]));
        assert_eq!(content.to_plain(), "first\nsecond");
        assert!(!content.is_empty());
    }

    #[test]
    fn test_event_serialization() {
        let event = DialogEvent::ButtonClicked {
            id: DialogId::new(3),
            button: 0,
            auto: true,
        };
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(
            json,
            serde_json::json!({"event": "button_clicked", "id": 3, "button": 0, "auto": true})
        );
    }
}
