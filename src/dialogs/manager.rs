//! Dialog manager for the dialog queue and show/hide lifecycle
//!
//! The dialog manager is responsible for:
//! - Owning every live dialog and the insertion-ordered queue
//! - Enforcing a single active dialog through the [`Lifecycle`] state machine
//! - Driving the [`Surface`] (attach, fade, detach, reposition)
//! - Running button clicks and auto-click countdowns
//! - Promoting the highest-priority queued dialog when one is removed

use super::{
    lifecycle::{Continuation, Lifecycle, LifecyclePhase, Step},
    queue::DialogQueue,
    ticker::Ticker,
    types::*,
};
use crate::config::Settings;
use crate::surface::{Chrome, FadeDirection, FadeTarget, Region, Surface};
use std::collections::{BTreeMap, HashMap, VecDeque};
use tokio::sync::mpsc;
use tokio::time::Instant;
use tracing::{debug, info, warn};

/// A live dialog
struct DialogEntry {
    config: DialogConfig,
    /// The element exists on the surface
    attached: bool,
    /// Running countdowns keyed by button index
    tickers: BTreeMap<usize, Ticker>,
}

pub struct DialogManager<S: Surface> {
    surface: S,
    settings: Settings,
    dialogs: HashMap<DialogId, DialogEntry>,
    queue: DialogQueue,
    lifecycle: Lifecycle,
    next_id: u64,
    /// Requests queued by callbacks, applied after the current operation
    pending: VecDeque<Request>,
    event_sender: Option<mpsc::UnboundedSender<DialogEvent>>,
}

impl<S: Surface> DialogManager<S> {
    /// Create a manager with default settings
    pub fn new(surface: S) -> Self {
        Self::with_settings(surface, Settings::default())
    }

    pub fn with_settings(surface: S, settings: Settings) -> Self {
        Self {
            surface,
            settings,
            dialogs: HashMap::new(),
            queue: DialogQueue::new(),
            lifecycle: Lifecycle::default(),
            next_id: 1,
            pending: VecDeque::new(),
            event_sender: None,
        }
    }

    /// Set the event sender for dialog events
    pub fn set_event_sender(&mut self, sender: mpsc::UnboundedSender<DialogEvent>) {
        self.event_sender = Some(sender);
    }

    pub fn surface(&self) -> &S {
        &self.surface
    }

    pub fn surface_mut(&mut self) -> &mut S {
        &mut self.surface
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// A configuration seeded with this manager's default flags
    pub fn new_config(&self) -> DialogConfig {
        self.settings.dialog_defaults()
    }

    // Construction

    /// Create a dialog from a full configuration
    pub fn create(&mut self, config: DialogConfig) -> DialogResult<DialogId> {
        let id = DialogId::new(self.next_id);
        self.next_id += 1;

        let priority = config.priority;
        let auto_show = config.auto_show;
        self.dialogs.insert(
            id,
            DialogEntry {
                config,
                attached: false,
                tickers: BTreeMap::new(),
            },
        );
        self.queue.queue(id, priority);
        self.emit(DialogEvent::Queued { id });
        debug!(%id, priority, "Queued dialog");

        let outranks_active = match self.lifecycle.active() {
            None => true,
            Some(active) => priority > self.priority(active).unwrap_or(i32::MIN),
        };

        let result = if auto_show && outranks_active {
            self.show_inner(id, None)
        } else {
            Ok(())
        };
        self.finish(result).map(|()| id)
    }

    /// Create a dialog whose title and content override those in `config`
    pub fn create_from_fields(
        &mut self,
        title: impl Into<Content>,
        content: impl Into<Content>,
        config: DialogConfig,
    ) -> DialogResult<DialogId> {
        self.create(config.with_title(title).with_content(content))
    }

    /// Alias of [`create_from_fields`](Self::create_from_fields)
    pub fn make(
        &mut self,
        title: impl Into<Content>,
        content: impl Into<Content>,
        config: DialogConfig,
    ) -> DialogResult<DialogId> {
        self.create_from_fields(title, content, config)
    }

    // Queries

    /// The dialog holding the active slot
    pub fn active(&self) -> Option<DialogId> {
        self.lifecycle.active()
    }

    pub fn phase(&self) -> LifecyclePhase {
        self.lifecycle.phase()
    }

    /// Every queued dialog in insertion order
    pub fn all(&self) -> Vec<DialogId> {
        self.queue.all()
    }

    pub fn newest(&self) -> Option<DialogId> {
        self.queue.newest()
    }

    pub fn oldest(&self) -> Option<DialogId> {
        self.queue.oldest()
    }

    pub fn prioritized(&self) -> Option<DialogId> {
        self.queue.prioritized()
    }

    pub fn config(&self, id: DialogId) -> Option<&DialogConfig> {
        self.dialogs.get(&id).map(|entry| &entry.config)
    }

    pub fn priority(&self, id: DialogId) -> Option<i32> {
        self.config(id).map(|config| config.priority)
    }

    pub fn is_attached(&self, id: DialogId) -> bool {
        self.dialogs.get(&id).is_some_and(|entry| entry.attached)
    }

    /// Whether a countdown is running for the given button
    pub fn is_ticking(&self, id: DialogId, button: usize) -> bool {
        self.dialogs
            .get(&id)
            .is_some_and(|entry| entry.tickers.contains_key(&button))
    }

    // Queue mutation

    /// Put a live dialog back in the queue; returns `false` if already queued
    pub fn queue(&mut self, id: DialogId) -> DialogResult<bool> {
        let priority = self.priority(id).ok_or(DialogError::NotFound(id))?;
        Ok(self.queue.queue(id, priority))
    }

    /// Take a dialog out of the queue without removing it
    pub fn unqueue(&mut self, id: DialogId) -> bool {
        self.queue.unqueue(id)
    }

    // Content

    pub fn set_title(&mut self, id: DialogId, title: impl Into<Content>) -> DialogResult<&mut Self> {
        let result = self.set_region(id, Region::Title, title.into());
        self.finish(result)?;
        Ok(self)
    }

    pub fn set_content(&mut self, id: DialogId, content: impl Into<Content>) -> DialogResult<&mut Self> {
        let result = self.set_region(id, Region::Content, content.into());
        self.finish(result)?;
        Ok(self)
    }

    /// Add a button labelled `label`, otherwise configured by `config`
    pub fn add_button(
        &mut self,
        id: DialogId,
        label: impl Into<String>,
        config: ButtonConfig,
    ) -> DialogResult<&mut Self> {
        let label = label.into();
        self.add_button_config(
            id,
            ButtonConfig {
                label,
                ..config
            },
        )
    }

    pub fn add_button_config(&mut self, id: DialogId, button: ButtonConfig) -> DialogResult<&mut Self> {
        let entry = self.entry_mut(id)?;
        entry.config.buttons.push(button.clone());
        let index = entry.config.buttons.len() - 1;
        let render = entry.attached && entry.config.show_buttons;

        if render {
            self.surface.add_button(id, index, &button.label, &button.style)?;
            self.reposition_inner(id)?;
        }
        Ok(self)
    }

    pub fn set_button_label(
        &mut self,
        id: DialogId,
        index: usize,
        label: impl Into<String>,
    ) -> DialogResult<&mut Self> {
        let result = self.set_button_label_inner(id, index, label.into());
        self.finish(result)?;
        Ok(self)
    }

    /// Re-centre the element after its size changed
    pub fn reposition(&mut self, id: DialogId) -> DialogResult<&mut Self> {
        self.reposition_inner(id)?;
        Ok(self)
    }

    // Lifecycle

    pub fn show(&mut self, id: DialogId) -> DialogResult<()> {
        self.show_with_callback(id, None)
    }

    /// Show `id` and run `callback` once its fade-in has completed
    pub fn show_with(
        &mut self,
        id: DialogId,
        callback: impl Fn(&mut DialogCx) + Send + Sync + 'static,
    ) -> DialogResult<()> {
        self.show_with_callback(id, Some(std::sync::Arc::new(callback)))
    }

    pub fn hide(&mut self, id: DialogId) -> DialogResult<()> {
        self.hide_with_callback(id, None)
    }

    /// Hide `id` and run `callback` once it has been detached
    pub fn hide_with(
        &mut self,
        id: DialogId,
        callback: impl Fn(&mut DialogCx) + Send + Sync + 'static,
    ) -> DialogResult<()> {
        self.hide_with_callback(id, Some(std::sync::Arc::new(callback)))
    }

    pub fn remove(&mut self, id: DialogId) -> DialogResult<()> {
        self.remove_with_callback(id, None)
    }

    /// Remove `id` and run `callback` once it has left the queue
    pub fn remove_with(
        &mut self,
        id: DialogId,
        callback: impl Fn(&mut DialogCx) + Send + Sync + 'static,
    ) -> DialogResult<()> {
        self.remove_with_callback(id, Some(std::sync::Arc::new(callback)))
    }

    /// Alias of [`show`](Self::show)
    pub fn open(&mut self, id: DialogId) -> DialogResult<()> {
        self.show(id)
    }

    /// Alias of [`remove`](Self::remove)
    pub fn close(&mut self, id: DialogId) -> DialogResult<()> {
        self.remove(id)
    }

    /// The close control of `id` was activated
    pub fn close_requested(&mut self, id: DialogId) -> DialogResult<()> {
        self.remove(id)
    }

    /// Close every queued dialog
    ///
    /// `suppress_close_event` is reserved and currently has no effect.
    pub fn close_all(&mut self, suppress_close_event: bool) -> DialogResult<()> {
        let ids = self.queue.all();
        debug!(suppress_close_event, count = ids.len(), "Closing all dialogs");

        let mut result = Ok(());
        for id in ids {
            if !self.dialogs.contains_key(&id) {
                continue;
            }
            if let Err(err) = self.hide_inner(id, Continuation::Remove { id, callback: None }) {
                result = Err(err);
            }
        }
        self.finish(result)
    }

    /// Click a button
    pub fn click(&mut self, id: DialogId, button: usize) -> DialogResult<()> {
        let result = self.click_inner(id, button, false);
        self.finish(result)
    }

    /// Completion signal for an element fade, for hosts that report it directly
    pub fn transition_finished(&mut self, id: DialogId, direction: FadeDirection) -> DialogResult<()> {
        let result = self.on_transition(id, direction, Instant::now());
        self.finish(result)
    }

    /// Deliver finished transitions and advance countdowns
    pub fn tick(&mut self, now: Instant) -> DialogResult<()> {
        let mut result = Ok(());
        for (id, direction) in self.surface.finished_transitions(now) {
            if let Err(err) = self.on_transition(id, direction, now) {
                result = Err(err);
            }
        }
        if result.is_ok() {
            result = self.advance_tickers(now);
        }
        self.finish(result)
    }

    // Internals

    fn show_with_callback(&mut self, id: DialogId, callback: Option<Callback>) -> DialogResult<()> {
        self.entry(id)?;
        let result = self.show_inner(id, callback);
        self.finish(result)
    }

    fn hide_with_callback(&mut self, id: DialogId, callback: Option<Callback>) -> DialogResult<()> {
        self.entry(id)?;
        let result = self.hide_inner(id, Continuation::Notify { id, callback });
        self.finish(result)
    }

    fn remove_with_callback(&mut self, id: DialogId, callback: Option<Callback>) -> DialogResult<()> {
        self.entry(id)?;
        let result = self.hide_inner(id, Continuation::Remove { id, callback });
        self.finish(result)
    }

    fn show_inner(&mut self, id: DialogId, callback: Option<Callback>) -> DialogResult<()> {
        let step = self.lifecycle.request_show(id, callback);
        self.run_step(step)
    }

    fn hide_inner(&mut self, id: DialogId, continuation: Continuation) -> DialogResult<()> {
        let step = self.lifecycle.request_hide(id, continuation);
        self.run_step(step)
    }

    fn run_step(&mut self, step: Step) -> DialogResult<()> {
        match step {
            Step::BeginShow(id) => self.begin_show(id),
            Step::BeginHide(id) => self.begin_hide(id),
            Step::Run(continuation) => self.run_continuation(continuation),
            Step::Wait => Ok(()),
        }
    }

    fn begin_show(&mut self, id: DialogId) -> DialogResult<()> {
        info!(%id, "Showing dialog");
        self.attach(id)?;

        if self.entry(id)?.config.modal {
            self.surface.fade(FadeTarget::Overlay, FadeDirection::In)?;
        }
        self.surface.fade(FadeTarget::Element(id), FadeDirection::In)?;
        self.reposition_inner(id)
    }

    fn begin_hide(&mut self, id: DialogId) -> DialogResult<()> {
        info!(%id, "Hiding dialog");
        let entry = self.entry_mut(id)?;
        entry.tickers.clear();
        let modal = entry.config.modal;

        if modal && self.surface.overlay_visible() {
            self.surface.fade(FadeTarget::Overlay, FadeDirection::Out)?;
        }
        self.surface.fade(FadeTarget::Element(id), FadeDirection::Out)?;
        Ok(())
    }

    /// Build the element from the current configuration and put it on the surface
    fn attach(&mut self, id: DialogId) -> DialogResult<()> {
        let config = self.entry(id)?.config.clone();

        self.surface.build(id, Chrome::for_config(&config))?;
        self.surface.set_region(id, Region::Title, &config.title)?;
        self.surface.set_region(id, Region::Content, &config.content)?;
        if config.has_button_bar() {
            for (index, button) in config.buttons.iter().enumerate() {
                self.surface.add_button(id, index, &button.label, &button.style)?;
            }
        }
        self.surface.attach(id)?;
        self.entry_mut(id)?.attached = true;

        self.fire(id, None, config.on_add.as_ref());
        self.emit(DialogEvent::Added { id });
        Ok(())
    }

    fn detach(&mut self, id: DialogId) -> DialogResult<()> {
        if let Some(entry) = self.dialogs.get_mut(&id) {
            if entry.attached {
                entry.attached = false;
                self.surface.detach(id)?;
            }
        }
        Ok(())
    }

    fn on_transition(&mut self, id: DialogId, direction: FadeDirection, now: Instant) -> DialogResult<()> {
        match direction {
            FadeDirection::In => self.on_shown(id, now),
            FadeDirection::Out => self.on_hidden(id),
        }
    }

    fn on_shown(&mut self, id: DialogId, now: Instant) -> DialogResult<()> {
        let Some(completed) = self.lifecycle.fade_in_finished(id) else {
            debug!(%id, "Ignoring stray fade-in completion");
            return Ok(());
        };

        let entry = self.entry_mut(id)?;
        let on_show = entry.config.on_show.clone();
        for (index, button) in entry.config.buttons.iter().enumerate() {
            if let Some(delay) = button.auto_click_after.filter(|_| button.auto_clicks()) {
                entry.tickers.insert(index, Ticker::start(now, delay));
            }
        }

        info!(%id, "Dialog shown");
        self.fire(id, None, on_show.as_ref());
        for callback in &completed.callbacks {
            self.fire(id, None, Some(callback));
        }
        self.emit(DialogEvent::Shown { id });

        if completed.hide_next {
            self.begin_hide(id)?;
        }
        Ok(())
    }

    fn on_hidden(&mut self, id: DialogId) -> DialogResult<()> {
        let Some(continuations) = self.lifecycle.fade_out_finished(id) else {
            debug!(%id, "Ignoring stray fade-out completion");
            return Ok(());
        };

        info!(%id, "Dialog hidden");
        let on_hide = self.dialogs.get(&id).and_then(|entry| entry.config.on_hide.clone());
        self.fire(id, None, on_hide.as_ref());
        self.detach(id)?;
        self.emit(DialogEvent::Hidden { id });

        let mut result = Ok(());
        for continuation in continuations {
            if let Err(err) = self.run_continuation(continuation) {
                result = Err(err);
            }
        }
        result
    }

    fn run_continuation(&mut self, continuation: Continuation) -> DialogResult<()> {
        match continuation {
            Continuation::Notify { id, callback } => {
                self.fire(id, None, callback.as_ref());
                Ok(())
            }
            Continuation::Show { id, callback } => {
                if self.dialogs.contains_key(&id) {
                    self.show_inner(id, callback)
                } else {
                    debug!(%id, "Skipping show of removed dialog");
                    Ok(())
                }
            }
            Continuation::Remove { id, callback } => self.finish_remove(id, callback),
        }
    }

    fn finish_remove(&mut self, id: DialogId, callback: Option<Callback>) -> DialogResult<()> {
        let Some(entry) = self.dialogs.remove(&id) else {
            debug!(%id, "Dialog already removed");
            return Ok(());
        };
        if entry.attached {
            self.surface.detach(id)?;
        }
        self.queue.unqueue(id);
        info!(%id, remaining = self.queue.len(), "Removed dialog");

        self.fire(id, None, entry.config.on_remove.as_ref());
        self.fire(id, None, callback.as_ref());
        self.emit(DialogEvent::Removed { id });

        match self.queue.prioritized() {
            Some(next) => self.show_inner(next, None),
            None => Ok(()),
        }
    }

    fn click_inner(&mut self, id: DialogId, index: usize, auto: bool) -> DialogResult<()> {
        let entry = self.entry_mut(id)?;
        let button = entry
            .config
            .buttons
            .get(index)
            .cloned()
            .ok_or(DialogError::ButtonNotFound(id, index))?;
        if !entry.attached {
            debug!(%id, button = index, "Ignoring click on a detached dialog");
            return Ok(());
        }
        entry.tickers.remove(&index);

        debug!(%id, button = index, auto, "Button clicked");
        self.emit(DialogEvent::ButtonClicked {
            id,
            button: index,
            auto,
        });

        let outcome = match &button.on_click {
            Some(on_click) => {
                let mut cx = DialogCx::new(id, Some(index));
                let outcome = on_click(&mut cx);
                self.pending.extend(cx.into_requests());
                outcome
            }
            None => ClickOutcome::Proceed,
        };

        if !button.close_dialog || outcome == ClickOutcome::KeepOpen {
            return Ok(());
        }
        self.hide_inner(id, Continuation::Remove { id, callback: None })
    }

    fn advance_tickers(&mut self, now: Instant) -> DialogResult<()> {
        let Some(id) = self.lifecycle.shown() else {
            return Ok(());
        };
        let indices: Vec<usize> = match self.dialogs.get(&id) {
            Some(entry) => entry.tickers.keys().copied().collect(),
            None => return Ok(()),
        };

        for index in indices {
            if self.lifecycle.shown() != Some(id) {
                break;
            }
            let Some(entry) = self.dialogs.get_mut(&id) else {
                break;
            };
            let Some(ticker) = entry.tickers.get_mut(&index) else {
                continue;
            };
            let step = ticker.advance(now);
            let on_tick = entry.config.buttons.get(index).and_then(|button| button.on_tick.clone());

            if let Some(on_tick) = on_tick {
                for counter in step.ticks {
                    let mut cx = DialogCx::new(id, Some(index));
                    on_tick(&mut cx, counter);
                    self.pending.extend(cx.into_requests());
                    self.emit(DialogEvent::Ticked {
                        id,
                        button: index,
                        counter,
                    });
                }
            }

            if step.fire {
                self.click_inner(id, index, true)?;
            }
        }
        Ok(())
    }

    fn set_region(&mut self, id: DialogId, region: Region, content: Content) -> DialogResult<()> {
        let entry = self.entry_mut(id)?;
        let attached = entry.attached;
        match region {
            Region::Title => entry.config.title = content.clone(),
            Region::Content => entry.config.content = content.clone(),
        }

        if attached {
            self.surface.set_region(id, region, &content)?;
            self.reposition_inner(id)?;
        }
        Ok(())
    }

    fn set_button_label_inner(&mut self, id: DialogId, index: usize, label: String) -> DialogResult<()> {
        let entry = self.entry_mut(id)?;
        let button = entry
            .config
            .buttons
            .get_mut(index)
            .ok_or(DialogError::ButtonNotFound(id, index))?;
        button.label = label.clone();

        if entry.attached && entry.config.has_button_bar() {
            self.surface.set_button_label(id, index, &label)?;
        }
        Ok(())
    }

    fn reposition_inner(&mut self, id: DialogId) -> DialogResult<()> {
        if !self.entry(id)?.attached {
            return Ok(());
        }
        let (width, height) = self.surface.measure(id);
        self.surface
            .set_offset(id, -i32::from(width) / 2, -i32::from(height) / 2)?;
        Ok(())
    }

    fn fire(&mut self, id: DialogId, button: Option<usize>, callback: Option<&Callback>) {
        if let Some(callback) = callback {
            let mut cx = DialogCx::new(id, button);
            callback(&mut cx);
            self.pending.extend(cx.into_requests());
        }
    }

    /// Apply callback requests queued during an operation, then return its result
    fn finish(&mut self, result: DialogResult<()>) -> DialogResult<()> {
        while let Some(request) = self.pending.pop_front() {
            if let Err(err) = self.apply(request) {
                warn!("Dialog request failed: {}", err);
            }
        }
        result
    }

    fn apply(&mut self, request: Request) -> DialogResult<()> {
        match request {
            Request::SetTitle(id, title) => self.set_region(id, Region::Title, title),
            Request::SetContent(id, content) => self.set_region(id, Region::Content, content),
            Request::SetButtonLabel(id, index, label) => self.set_button_label_inner(id, index, label),
            Request::Show(id) => {
                self.entry(id)?;
                self.show_inner(id, None)
            }
            Request::Hide(id) => {
                self.entry(id)?;
                self.hide_inner(id, Continuation::Notify { id, callback: None })
            }
            Request::Close(id) => {
                self.entry(id)?;
                self.hide_inner(id, Continuation::Remove { id, callback: None })
            }
        }
    }

    fn entry(&self, id: DialogId) -> DialogResult<&DialogEntry> {
        self.dialogs.get(&id).ok_or(DialogError::NotFound(id))
    }

    fn entry_mut(&mut self, id: DialogId) -> DialogResult<&mut DialogEntry> {
        self.dialogs.get_mut(&id).ok_or(DialogError::NotFound(id))
    }

    /// Send an event if event sender is configured
    fn emit(&self, event: DialogEvent) {
        if let Some(sender) = &self.event_sender {
            let _ = sender.send(event);
        }
    }
}
