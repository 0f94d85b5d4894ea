use super::events::Event;
use anyhow::Result;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers, MouseButton, MouseEvent, MouseEventKind};
use dialogq::dialogs::{DialogConfig, DialogDefinition, DialogEvent, DialogId, DialogManager};
use dialogq::surface::{Hit, TerminalSurface};
use dialogq::Settings;
use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, List, ListItem, Paragraph};
use ratatui::Frame;
use std::collections::VecDeque;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::time::Instant;
use tracing::{debug, warn};

/// Maximum number of event log lines kept in memory
const MAX_LOG_LINES: usize = 200;

const HELP_TEXT: &str =
    "Tab/←/→ focus • Enter click • Esc close • 1-9 create • s show next • h hide • x close all • q quit";

/// Demo application state
pub struct App {
    manager: DialogManager<TerminalSurface>,

    /// Resolved dialog templates, created on demand with the number keys
    templates: Vec<DialogConfig>,

    /// Dialog events, newest last
    log: VecDeque<String>,

    /// Status message to display
    status_message: Option<String>,

    should_quit: bool,
}

impl App {
    /// Create the application and the dialogs that show on startup
    pub fn new(
        settings: Settings,
        definitions: Vec<DialogDefinition>,
        event_sender: mpsc::UnboundedSender<DialogEvent>,
    ) -> Result<Self> {
        let surface = TerminalSurface::new(settings.fade_in(), settings.fade_out());
        let mut manager = DialogManager::with_settings(surface, settings);
        manager.set_event_sender(event_sender);

        let templates: Vec<DialogConfig> = definitions
            .into_iter()
            .map(|definition| definition.merge_into(manager.new_config()))
            .collect();

        let mut app = Self {
            manager,
            templates,
            log: VecDeque::new(),
            status_message: None,
            should_quit: false,
        };
        for index in 0..app.templates.len() {
            app.create(index)?;
        }
        Ok(app)
    }

    pub fn should_quit(&self) -> bool {
        self.should_quit
    }

    pub fn mouse_enabled(&self) -> bool {
        self.manager.settings().mouse_enabled
    }

    pub fn tick_interval(&self) -> Duration {
        self.manager.settings().tick_interval()
    }

    pub fn manager(&self) -> &DialogManager<TerminalSurface> {
        &self.manager
    }

    /// Create a dialog from the template at `index`
    fn create(&mut self, index: usize) -> Result<Option<DialogId>> {
        let Some(config) = self.templates.get(index).cloned() else {
            return Ok(None);
        };
        let id = self.manager.create(config)?;
        debug!(%id, template = index, "Created dialog from template");
        Ok(Some(id))
    }

    /// Deliver finished fades and advance countdowns
    pub fn tick(&mut self) {
        if let Err(e) = self.manager.tick(Instant::now()) {
            self.report(format!("Tick failed: {}", e));
        }
    }

    /// Append a dialog event to the log
    pub fn record(&mut self, event: &DialogEvent) {
        let line = serde_json::to_string(event).unwrap_or_else(|_| format!("{:?}", event));
        self.log.push_back(line);
        while self.log.len() > MAX_LOG_LINES {
            self.log.pop_front();
        }
    }

    pub fn handle_event(&mut self, event: Event) {
        let result = match event {
            Event::Key(key) => self.handle_key(key),
            Event::Mouse(mouse) if self.mouse_enabled() => self.handle_mouse(mouse),
            Event::Mouse(_) | Event::Resize(_, _) => Ok(()),
        };
        if let Err(e) = result {
            self.report(format!("{}", e));
        }
    }

    fn handle_key(&mut self, key: KeyEvent) -> Result<()> {
        match (key.code, key.modifiers) {
            (KeyCode::Char('c'), KeyModifiers::CONTROL) | (KeyCode::Char('q'), _) => {
                self.should_quit = true;
            }
            (KeyCode::Tab | KeyCode::Right, _) => self.manager.surface_mut().focus_next(),
            (KeyCode::BackTab | KeyCode::Left, _) => self.manager.surface_mut().focus_prev(),
            (KeyCode::Enter | KeyCode::Char(' '), _) => {
                if let Some((id, button)) = self.manager.surface().focused_button() {
                    self.manager.click(id, button)?;
                }
            }
            (KeyCode::Esc, _) => {
                if let Some(id) = self.manager.surface().displayed() {
                    self.manager.close_requested(id)?;
                }
            }
            (KeyCode::Char(digit @ '1'..='9'), _) => {
                let index = digit as usize - '1' as usize;
                if self.create(index)?.is_none() {
                    self.report(format!("No dialog template {}", digit));
                }
            }
            (KeyCode::Char('s'), _) => {
                if let Some(id) = self.manager.prioritized() {
                    self.manager.show(id)?;
                }
            }
            (KeyCode::Char('h'), _) => {
                if let Some(id) = self.manager.active() {
                    self.manager.hide(id)?;
                }
            }
            (KeyCode::Char('x'), _) => self.manager.close_all(false)?,
            _ => {}
        }
        Ok(())
    }

    fn handle_mouse(&mut self, mouse: MouseEvent) -> Result<()> {
        if mouse.kind != MouseEventKind::Down(MouseButton::Left) {
            return Ok(());
        }
        match self.manager.surface().hit_at(mouse.column, mouse.row) {
            Some(Hit::Button(id, button)) => self.manager.click(id, button)?,
            Some(Hit::Close(id)) => self.manager.close_requested(id)?,
            None => {}
        }
        Ok(())
    }

    fn report(&mut self, message: String) {
        warn!("{}", message);
        self.status_message = Some(message);
    }

    /// Render the application UI
    pub fn render(&mut self, frame: &mut Frame) {
        let area = frame.size();
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(3), // Queue
                Constraint::Min(1),    // Event log
                Constraint::Length(1), // Status bar
            ])
            .split(area);

        self.render_queue(frame, chunks[0]);
        self.render_log(frame, chunks[1]);
        self.render_status_bar(frame, chunks[2]);

        self.manager.surface_mut().render(frame, area, Instant::now());
    }

    fn render_queue(&self, frame: &mut Frame, area: Rect) {
        let active = self.manager.active();
        let queue = self
            .manager
            .all()
            .into_iter()
            .map(|id| {
                let priority = self.manager.priority(id).unwrap_or_default();
                if Some(id) == active {
                    format!("*{}({})", id, priority)
                } else {
                    format!("{}({})", id, priority)
                }
            })
            .collect::<Vec<_>>()
            .join("  ");

        let text = format!("{:?}  {}", self.manager.phase(), queue);
        let paragraph = Paragraph::new(text).block(Block::default().borders(Borders::ALL).title("Queue"));
        frame.render_widget(paragraph, area);
    }

    fn render_log(&self, frame: &mut Frame, area: Rect) {
        let visible = usize::from(area.height.saturating_sub(2));
        let items: Vec<ListItem> = self
            .log
            .iter()
            .skip(self.log.len().saturating_sub(visible))
            .map(|line| ListItem::new(line.as_str()))
            .collect();

        let list = List::new(items).block(Block::default().borders(Borders::ALL).title("Events"));
        frame.render_widget(list, area);
    }

    fn render_status_bar(&self, frame: &mut Frame, area: Rect) {
        let line = match &self.status_message {
            Some(message) => Line::from(Span::styled(message.clone(), Style::default().fg(Color::Yellow))),
            None => Line::from(Span::styled(HELP_TEXT, Style::default().add_modifier(Modifier::DIM))),
        };
        frame.render_widget(Paragraph::new(line), area);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use dialogq::dialogs::{parse_definitions, LifecyclePhase};

    fn app(json: &str) -> (App, mpsc::UnboundedReceiver<DialogEvent>) {
        let settings = Settings {
            fade_in_ms: 0,
            fade_out_ms: 0,
            ..Settings::default()
        };
        let (sender, receiver) = mpsc::unbounded_channel();
        let app = App::new(settings, parse_definitions(json).unwrap(), sender).unwrap();
        (app, receiver)
    }

    fn settle(app: &mut App) {
        for _ in 0..16 {
            app.tick();
        }
    }

    fn key(code: KeyCode) -> Event {
        Event::Key(KeyEvent::new(code, KeyModifiers::NONE))
    }

    #[test]
    fn test_startup_creates_templates() {
        let (mut app, _events) = app(r#"[{"title": "A"}, {"title": "B", "auto_show": false}]"#);
        settle(&mut app);

        assert_eq!(app.manager().all().len(), 2);
        assert!(matches!(app.manager().phase(), LifecyclePhase::Shown(_)));
    }

    #[test]
    fn test_enter_clicks_focused_button() {
        let (mut app, _events) = app(r#"[{"buttons": [{"label": "Keep", "close_dialog": false}, {"label": "Close"}]}]"#);
        settle(&mut app);

        app.handle_event(key(KeyCode::Enter));
        settle(&mut app);
        assert_eq!(app.manager().all().len(), 1);

        app.handle_event(key(KeyCode::Tab));
        app.handle_event(key(KeyCode::Enter));
        settle(&mut app);
        assert!(app.manager().all().is_empty());
    }

    #[test]
    fn test_escape_closes_displayed_dialog() {
        let (mut app, _events) = app(r#"[{"title": "A"}]"#);
        settle(&mut app);

        app.handle_event(key(KeyCode::Esc));
        settle(&mut app);
        assert!(app.manager().all().is_empty());
    }

    #[test]
    fn test_number_keys_create_from_templates() {
        let (mut app, _events) = app(r#"[{"title": "A", "auto_show": false}]"#);

        app.handle_event(key(KeyCode::Char('1')));
        assert_eq!(app.manager().all().len(), 2);

        app.handle_event(key(KeyCode::Char('5')));
        assert_eq!(app.manager().all().len(), 2);
        assert_eq!(app.status_message.as_deref(), Some("No dialog template 5"));
    }

    #[test]
    fn test_events_are_logged() {
        let (mut app, mut events) = app(r#"[{"title": "A"}]"#);
        settle(&mut app);

        while let Ok(event) = events.try_recv() {
            app.record(&event);
        }
        assert_eq!(app.log.front().map(String::as_str), Some(r#"{"event":"queued","id":1}"#));
    }

    #[test]
    fn test_quit_keys() {
        let (mut app, _events) = app("[]");
        app.handle_event(Event::Key(KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL)));
        assert!(app.should_quit());
    }
}
