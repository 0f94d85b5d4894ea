use crossterm::event::{Event as CrosstermEvent, KeyEvent, KeyEventKind, MouseEvent};
use std::time::Duration;
use tokio::sync::mpsc;
use tracing::warn;

/// How long the reader waits for input before checking for shutdown
const POLL_INTERVAL: Duration = Duration::from_millis(100);

/// Terminal input events
#[derive(Debug, Clone)]
pub enum Event {
    /// Keyboard input event
    Key(KeyEvent),

    /// Mouse input event
    Mouse(MouseEvent),

    /// Terminal resize event
    Resize(u16, u16),
}

/// Reads crossterm input on a blocking task and forwards it over a channel
pub struct EventHandler {
    receiver: mpsc::UnboundedReceiver<Event>,
}

impl EventHandler {
    pub fn new() -> Self {
        let (sender, receiver) = mpsc::unbounded_channel();

        tokio::task::spawn_blocking(move || {
            while !sender.is_closed() {
                match crossterm::event::poll(POLL_INTERVAL) {
                    Ok(false) => continue,
                    Ok(true) => {}
                    Err(e) => {
                        warn!("Terminal poll failed: {}", e);
                        break;
                    }
                }
                match crossterm::event::read() {
                    Ok(event) => {
                        if let Some(event) = convert_crossterm_event(event) {
                            let _ = sender.send(event);
                        }
                    }
                    Err(e) => {
                        warn!("Terminal read failed: {}", e);
                        break;
                    }
                }
            }
        });

        Self { receiver }
    }

    /// Get the next event; `None` once the reader has stopped
    pub async fn next(&mut self) -> Option<Event> {
        self.receiver.recv().await
    }
}

impl Default for EventHandler {
    fn default() -> Self {
        Self::new()
    }
}

/// Convert crossterm events to application events
fn convert_crossterm_event(event: CrosstermEvent) -> Option<Event> {
    match event {
        // Windows reports both press and release
        CrosstermEvent::Key(key_event) if key_event.kind == KeyEventKind::Press => {
            Some(Event::Key(key_event))
        }
        CrosstermEvent::Mouse(mouse_event) => Some(Event::Mouse(mouse_event)),
        CrosstermEvent::Resize(width, height) => Some(Event::Resize(width, height)),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossterm::event::{KeyCode, KeyEventState, KeyModifiers};

    #[test]
    fn test_key_release_is_dropped() {
        let press = KeyEvent::new(KeyCode::Enter, KeyModifiers::NONE);
        let release = KeyEvent {
            kind: KeyEventKind::Release,
            state: KeyEventState::NONE,
            ..press
        };

        assert!(matches!(
            convert_crossterm_event(CrosstermEvent::Key(press)),
            Some(Event::Key(_))
        ));
        assert!(convert_crossterm_event(CrosstermEvent::Key(release)).is_none());
        assert!(convert_crossterm_event(CrosstermEvent::FocusGained).is_none());
    }
}
