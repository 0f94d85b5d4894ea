//! Terminal demo driving a [`DialogManager`](dialogq::DialogManager) with ratatui

mod app;
mod events;

pub use app::App;
pub use events::EventHandler;

use anyhow::Result;
use crossterm::event::{DisableMouseCapture, EnableMouseCapture};
use crossterm::execute;
use crossterm::terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen};
use dialogq::dialogs::{DialogDefinition, DialogEvent};
use dialogq::Settings;
use ratatui::backend::CrosstermBackend;
use ratatui::Terminal;
use std::io;
use tokio::sync::mpsc;

pub type Backend = CrosstermBackend<io::Stdout>;

/// Initialize the terminal for TUI mode
pub fn init_terminal(mouse: bool) -> Result<Terminal<Backend>> {
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    if mouse {
        execute!(stdout, EnableMouseCapture)?;
    }
    let backend = CrosstermBackend::new(stdout);
    let terminal = Terminal::new(backend)?;
    Ok(terminal)
}

/// Restore the terminal to normal mode
pub fn restore_terminal(terminal: &mut Terminal<Backend>) -> Result<()> {
    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;
    Ok(())
}

/// Main TUI entry point
pub async fn run(settings: Settings, definitions: Vec<DialogDefinition>) -> Result<()> {
    let (event_sender, mut dialog_events) = mpsc::unbounded_channel();
    let mut app = App::new(settings, definitions, event_sender)?;

    let mut terminal = init_terminal(app.mouse_enabled())?;
    let mut event_handler = EventHandler::new();

    let result = run_app(&mut terminal, &mut app, &mut event_handler, &mut dialog_events).await;

    restore_terminal(&mut terminal)?;
    result
}

/// Main application loop
async fn run_app(
    terminal: &mut Terminal<Backend>,
    app: &mut App,
    event_handler: &mut EventHandler,
    dialog_events: &mut mpsc::UnboundedReceiver<DialogEvent>,
) -> Result<()> {
    let mut ticker = tokio::time::interval(app.tick_interval());

    while !app.should_quit() {
        terminal.draw(|frame| app.render(frame))?;

        tokio::select! {
            Some(event) = event_handler.next() => app.handle_event(event),
            Some(event) = dialog_events.recv() => app.record(&event),
            _ = ticker.tick() => app.tick(),
        }
    }
    Ok(())
}
