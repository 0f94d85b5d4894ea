//! Rendering surfaces for dialogs
//!
//! The manager never draws anything itself. It drives a [`Surface`], which owns
//! the rendered elements, the shared overlay and the fade transitions. Fades are
//! asynchronous: the surface starts them and later reports completion, either
//! through [`Surface::finished_transitions`] during
//! [`DialogManager::tick`](crate::dialogs::DialogManager::tick) or by the host
//! calling [`DialogManager::transition_finished`](crate::dialogs::DialogManager::transition_finished).

pub mod headless;
pub mod terminal;

pub use headless::{ElementState, HeadlessSurface, SurfaceOp};
pub use terminal::{Hit, TerminalSurface};

use crate::dialogs::{Content, DialogConfig, DialogId};
use anyhow::Result;
use tokio::time::Instant;
use unicode_width::UnicodeWidthStr;

/// Which region of the dialog template to fill
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Region {
    Title,
    Content,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FadeDirection {
    In,
    Out,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FadeTarget {
    Overlay,
    Element(DialogId),
}

/// Template variant flags for a dialog element
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Chrome {
    pub show_close: bool,
    pub show_title: bool,
    /// False renders the `no-buttons` variant
    pub show_buttons: bool,
}

impl Chrome {
    pub fn for_config(config: &DialogConfig) -> Self {
        Self {
            show_close: config.show_close,
            show_title: config.show_title,
            show_buttons: config.has_button_bar(),
        }
    }
}

/// Rendering collaborator driven by the dialog manager
pub trait Surface {
    /// Instantiate the dialog template for `id`, detached and hidden
    fn build(&mut self, id: DialogId, chrome: Chrome) -> Result<()>;

    /// Replace the rendered contents of a region
    fn set_region(&mut self, id: DialogId, region: Region, content: &Content) -> Result<()>;

    /// Append a button to the button bar
    fn add_button(&mut self, id: DialogId, index: usize, label: &str, style: &str) -> Result<()>;

    fn set_button_label(&mut self, id: DialogId, index: usize, label: &str) -> Result<()>;

    /// Append the overlay and the element to the display, both hidden
    fn attach(&mut self, id: DialogId) -> Result<()>;

    /// Remove the element and the overlay from the display and drop the element
    fn detach(&mut self, id: DialogId) -> Result<()>;

    /// Start a fade; element fades must eventually report completion
    fn fade(&mut self, target: FadeTarget, direction: FadeDirection) -> Result<()>;

    fn overlay_visible(&self) -> bool;

    /// Rendered (width, height) of the element
    fn measure(&self, id: DialogId) -> (u16, u16);

    /// Offset the element from the centre of the display
    fn set_offset(&mut self, id: DialogId, dx: i32, dy: i32) -> Result<()>;

    /// Element fades that have completed by `now`
    fn finished_transitions(&mut self, now: Instant) -> Vec<(DialogId, FadeDirection)> {
        let _ = now;
        Vec::new()
    }
}

/// Size of a dialog laid out from plain text: a bordered box around the title,
/// content and button bar.
pub(crate) fn measure_text(title: &str, content: &str, buttons: &[String], chrome: Chrome) -> (u16, u16) {
    let content_width = content.lines().map(UnicodeWidthStr::width).max().unwrap_or(0);
    let title_width = if chrome.show_title {
        title.width() + if chrome.show_close { 4 } else { 0 }
    } else {
        0
    };
    let bar_width = if chrome.show_buttons {
        buttons.iter().map(|label| label.width() + 4).sum::<usize>() + buttons.len().saturating_sub(1)
    } else {
        0
    };

    let width = content_width.max(title_width).max(bar_width) + 4;
    let height = content.lines().count().max(1) + 2 + usize::from(chrome.show_buttons);

    (
        u16::try_from(width).unwrap_or(u16::MAX),
        u16::try_from(height).unwrap_or(u16::MAX),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_measure_text() {
        let chrome = Chrome {
            show_close: true,
            show_title: true,
            show_buttons: true,
        };
        let buttons = vec!["OK".to_string(), "Cancel".to_string()];

        let (width, height) = measure_text("Title", "one\nlonger line", &buttons, chrome);
        assert_eq!(width, 21);
        assert_eq!(height, 5);
    }

    #[test]
    fn test_measure_counts_columns_not_bytes() {
        let chrome = Chrome {
            show_close: false,
            show_title: true,
            show_buttons: true,
        };
        let content = "é".repeat(21);
        let buttons = vec!["Übernehmen".to_string()];

        assert_eq!(measure_text("Größe", &content, &buttons, chrome), (25, 4));
        assert_eq!(measure_text("", "日本語", &[], Chrome { show_buttons: false, ..chrome }), (10, 3));
    }

    #[test]
    fn test_measure_without_buttons() {
        let chrome = Chrome {
            show_close: false,
            show_title: false,
            show_buttons: false,
        };

        assert_eq!(measure_text("ignored", "", &[], chrome), (4, 3));
    }

    #[test]
    fn test_chrome_for_config() {
        let config = DialogConfig::default().show_close(false);
        let chrome = Chrome::for_config(&config);

        assert!(!chrome.show_close);
        assert!(chrome.show_title);
        assert!(!chrome.show_buttons);
    }
}
