//! Terminal surface rendered with ratatui
//!
//! Elements are laid out as bordered boxes centred on the frame and shifted by
//! the offset the manager sets. A fade is a timed dimmed phase: the element is
//! drawn with `Modifier::DIM` until its duration has elapsed, after which the
//! completion is reported through [`Surface::finished_transitions`].

use super::{measure_text, Chrome, FadeDirection, FadeTarget, Region, Surface};
use crate::dialogs::{Content, DialogId};
use anyhow::{anyhow, Result};
use ratatui::{
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span, Text},
    widgets::{Block, Borders, Clear, Paragraph},
    Frame,
};
use std::collections::HashMap;
use std::time::Duration;
use tokio::time::Instant;
use unicode_width::UnicodeWidthStr;

const CLOSE_LABEL: &str = "[x]";

/// Clickable part of a rendered dialog
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Hit {
    Button(DialogId, usize),
    Close(DialogId),
}

#[derive(Debug, Clone, Copy)]
struct Fade {
    direction: FadeDirection,
    started: Instant,
    duration: Duration,
}

#[derive(Debug, Clone)]
struct Element {
    chrome: Chrome,
    title: Content,
    content: Content,
    /// (label, style) pairs in bar order
    buttons: Vec<(String, String)>,
    attached: bool,
    visible: bool,
    offset: (i32, i32),
    fade: Option<Fade>,
}

impl Element {
    fn size(&self) -> (u16, u16) {
        let labels: Vec<String> = self.buttons.iter().map(|(label, _)| label.clone()).collect();
        measure_text(
            &self.title.to_plain(),
            &self.content.to_plain(),
            &labels,
            self.chrome,
        )
    }
}

pub struct TerminalSurface {
    elements: HashMap<DialogId, Element>,
    overlay_attached: bool,
    overlay_visible: bool,
    fade_in: Duration,
    fade_out: Duration,
    /// Focused button of the displayed element
    focus: usize,
    /// Clickable regions from the last render
    hits: Vec<(Rect, Hit)>,
}

impl TerminalSurface {
    pub fn new(fade_in: Duration, fade_out: Duration) -> Self {
        Self {
            elements: HashMap::new(),
            overlay_attached: false,
            overlay_visible: false,
            fade_in,
            fade_out,
            focus: 0,
            hits: Vec::new(),
        }
    }

    /// The attached, visible element
    pub fn displayed(&self) -> Option<DialogId> {
        self.elements
            .iter()
            .find(|(_, element)| element.attached && element.visible)
            .map(|(id, _)| *id)
    }

    pub fn focused_button(&self) -> Option<(DialogId, usize)> {
        let id = self.displayed()?;
        let element = self.elements.get(&id)?;
        (element.chrome.show_buttons && self.focus < element.buttons.len()).then_some((id, self.focus))
    }

    pub fn focus_next(&mut self) {
        if let Some(count) = self.button_count() {
            self.focus = (self.focus + 1) % count;
        }
    }

    pub fn focus_prev(&mut self) {
        if let Some(count) = self.button_count() {
            self.focus = (self.focus + count - 1) % count;
        }
    }

    fn button_count(&self) -> Option<usize> {
        let element = self.elements.get(&self.displayed()?)?;
        let count = element.buttons.len();
        (element.chrome.show_buttons && count > 0).then_some(count)
    }

    /// What sits under a terminal cell, as of the last render
    pub fn hit_at(&self, column: u16, row: u16) -> Option<Hit> {
        self.hits
            .iter()
            .find(|(rect, _)| {
                column >= rect.x
                    && column < rect.x + rect.width
                    && row >= rect.y
                    && row < rect.y + rect.height
            })
            .map(|(_, hit)| *hit)
    }

    /// Draw the overlay and the displayed element
    pub fn render(&mut self, frame: &mut Frame, area: Rect, now: Instant) {
        self.hits.clear();
        let Some(id) = self.displayed() else {
            return;
        };

        if self.overlay_attached && self.overlay_visible {
            render_overlay(frame, area);
        }

        let Some(element) = self.elements.get(&id) else {
            return;
        };
        let fading = element
            .fade
            .is_some_and(|fade| now < fade.started + fade.duration);
        let rect = placement(element, area);
        let base = if fading {
            Style::default().add_modifier(Modifier::DIM)
        } else {
            Style::default()
        };

        frame.render_widget(Clear, rect);
        let mut block = Block::default().borders(Borders::ALL).style(base);
        if element.chrome.show_title {
            block = block.title(Span::styled(
                format!(" {} ", element.title.to_plain()),
                base.add_modifier(Modifier::BOLD),
            ));
        }
        let inner = block.inner(rect);
        frame.render_widget(block, rect);

        if element.chrome.show_close && rect.width > 6 {
            let close = Rect::new(rect.x + rect.width - 5, rect.y, 3, 1);
            frame.render_widget(Paragraph::new(CLOSE_LABEL).style(base.fg(Color::Red)), close);
            self.hits.push((close, Hit::Close(id)));
        }

        let bar_height = u16::from(element.chrome.show_buttons && inner.height > 1);
        let content_area = Rect {
            height: inner.height.saturating_sub(bar_height),
            ..inner
        };
        frame.render_widget(
            Paragraph::new(to_text(&element.content)).style(base),
            content_area,
        );

        if bar_height == 1 {
            let bar = Rect {
                y: inner.y + inner.height - 1,
                height: 1,
                ..inner
            };
            let mut x = bar.x;
            let mut spans = Vec::new();
            for (index, (label, style)) in element.buttons.iter().enumerate() {
                let text = format!("[ {label} ]");
                let width = u16::try_from(text.width()).unwrap_or(u16::MAX);
                let focused = index == self.focus;
                spans.push(Span::styled(text, button_style(style, focused).patch(base)));
                spans.push(Span::raw(" "));

                let visible = width.min((bar.x + bar.width).saturating_sub(x));
                if visible > 0 {
                    self.hits.push((Rect::new(x, bar.y, visible, 1), Hit::Button(id, index)));
                }
                x = x.saturating_add(width + 1);
            }
            frame.render_widget(Paragraph::new(Line::from(spans)), bar);
        }
    }

    fn element_mut(&mut self, id: DialogId) -> Result<&mut Element> {
        self.elements
            .get_mut(&id)
            .ok_or_else(|| anyhow!("no element built for {id}"))
    }
}

/// Dim everything behind a modal dialog
fn render_overlay(frame: &mut Frame, area: Rect) {
    frame.render_widget(Clear, area);
    let dim = Style::default().bg(Color::Black).add_modifier(Modifier::DIM);
    frame.render_widget(Block::default().style(dim), area);
}

/// Centre of `area` shifted by the element offset, clamped into `area`
fn placement(element: &Element, area: Rect) -> Rect {
    let (width, height) = element.size();
    let width = width.min(area.width);
    let height = height.min(area.height);

    let centre_x = i32::from(area.x) + i32::from(area.width) / 2;
    let centre_y = i32::from(area.y) + i32::from(area.height) / 2;
    let max_x = i32::from(area.x + area.width - width);
    let max_y = i32::from(area.y + area.height - height);
    let x = (centre_x + element.offset.0).clamp(i32::from(area.x), max_x);
    let y = (centre_y + element.offset.1).clamp(i32::from(area.y), max_y);

    Rect::new(
        u16::try_from(x).unwrap_or(area.x),
        u16::try_from(y).unwrap_or(area.y),
        width,
        height,
    )
}

fn to_text(content: &Content) -> Text<'static> {
    match content {
        Content::Markup(markup) => Text::raw(markup.clone()),
        Content::Rich(text) => text.clone(),
    }
}

/// Map a style class such as `btn btn-primary` onto terminal colours
fn button_style(class: &str, focused: bool) -> Style {
    let style = if class.contains("danger") {
        Style::default().fg(Color::Red)
    } else if class.contains("primary") {
        Style::default().fg(Color::Cyan)
    } else {
        Style::default()
    };

    if focused {
        style.add_modifier(Modifier::REVERSED | Modifier::BOLD)
    } else {
        style
    }
}

impl Surface for TerminalSurface {
    fn build(&mut self, id: DialogId, chrome: Chrome) -> Result<()> {
        self.elements.insert(
            id,
            Element {
                chrome,
                title: Content::default(),
                content: Content::default(),
                buttons: Vec::new(),
                attached: false,
                visible: false,
                offset: (0, 0),
                fade: None,
            },
        );
        Ok(())
    }

    fn set_region(&mut self, id: DialogId, region: Region, content: &Content) -> Result<()> {
        let element = self.element_mut(id)?;
        match region {
            Region::Title => element.title = content.clone(),
            Region::Content => element.content = content.clone(),
        }
        Ok(())
    }

    fn add_button(&mut self, id: DialogId, _index: usize, label: &str, style: &str) -> Result<()> {
        let element = self.element_mut(id)?;
        element.buttons.push((label.to_string(), style.to_string()));
        element.chrome.show_buttons = true;
        Ok(())
    }

    fn set_button_label(&mut self, id: DialogId, index: usize, label: &str) -> Result<()> {
        let button = self
            .element_mut(id)?
            .buttons
            .get_mut(index)
            .ok_or_else(|| anyhow!("{id} has no button {index}"))?;
        button.0 = label.to_string();
        Ok(())
    }

    fn attach(&mut self, id: DialogId) -> Result<()> {
        let element = self.element_mut(id)?;
        element.attached = true;
        element.visible = false;
        self.overlay_attached = true;
        self.overlay_visible = false;
        self.focus = 0;
        Ok(())
    }

    fn detach(&mut self, id: DialogId) -> Result<()> {
        self.elements.remove(&id);
        self.hits.retain(|(_, hit)| match hit {
            Hit::Button(owner, _) | Hit::Close(owner) => *owner != id,
        });
        self.overlay_attached = false;
        self.overlay_visible = false;
        Ok(())
    }

    fn fade(&mut self, target: FadeTarget, direction: FadeDirection) -> Result<()> {
        match target {
            FadeTarget::Overlay => {
                self.overlay_visible = direction == FadeDirection::In;
            }
            FadeTarget::Element(id) => {
                let duration = match direction {
                    FadeDirection::In => self.fade_in,
                    FadeDirection::Out => self.fade_out,
                };
                let element = self.element_mut(id)?;
                if direction == FadeDirection::In {
                    element.visible = true;
                }
                element.fade = Some(Fade {
                    direction,
                    started: Instant::now(),
                    duration,
                });
            }
        }
        Ok(())
    }

    fn overlay_visible(&self) -> bool {
        self.overlay_visible
    }

    fn measure(&self, id: DialogId) -> (u16, u16) {
        self.elements.get(&id).map_or((0, 0), Element::size)
    }

    fn set_offset(&mut self, id: DialogId, dx: i32, dy: i32) -> Result<()> {
        self.element_mut(id)?.offset = (dx, dy);
        Ok(())
    }

    fn finished_transitions(&mut self, now: Instant) -> Vec<(DialogId, FadeDirection)> {
        let mut finished = Vec::new();
        for (id, element) in &mut self.elements {
            let Some(fade) = element.fade else {
                continue;
            };
            if now < fade.started + fade.duration {
                continue;
            }
            element.fade = None;
            if fade.direction == FadeDirection::Out {
                element.visible = false;
            }
            finished.push((*id, fade.direction));
        }
        finished
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ratatui::{backend::TestBackend, Terminal};

    fn surface_with_dialog(id: DialogId, buttons: &[&str]) -> TerminalSurface {
        let mut surface = TerminalSurface::new(Duration::from_millis(100), Duration::from_millis(100));
        let chrome = Chrome {
            show_close: true,
            show_title: true,
            show_buttons: false,
        };
        surface.build(id, chrome).unwrap();
        surface.set_region(id, Region::Title, &"Notice".into()).unwrap();
        surface.set_region(id, Region::Content, &"Something happened".into()).unwrap();
        for (index, label) in buttons.iter().enumerate() {
            surface.add_button(id, index, label, "btn").unwrap();
        }
        surface.attach(id).unwrap();
        surface
    }

    fn draw(surface: &mut TerminalSurface) {
        let mut terminal = Terminal::new(TestBackend::new(60, 20)).unwrap();
        terminal
            .draw(|frame| {
                let area = frame.size();
                surface.render(frame, area, Instant::now());
            })
            .unwrap();
    }

    #[tokio::test(start_paused = true)]
    async fn test_fade_reports_completion_after_duration() {
        let id = DialogId::new(1);
        let mut surface = surface_with_dialog(id, &[]);
        surface.fade(FadeTarget::Element(id), FadeDirection::In).unwrap();

        assert!(surface.finished_transitions(Instant::now()).is_empty());
        tokio::time::advance(Duration::from_millis(100)).await;
        assert_eq!(
            surface.finished_transitions(Instant::now()),
            vec![(id, FadeDirection::In)]
        );
        assert_eq!(surface.displayed(), Some(id));

        surface.fade(FadeTarget::Element(id), FadeDirection::Out).unwrap();
        tokio::time::advance(Duration::from_millis(100)).await;
        surface.finished_transitions(Instant::now());
        assert_eq!(surface.displayed(), None);
    }

    #[tokio::test(start_paused = true)]
    async fn test_hit_testing_after_render() {
        let id = DialogId::new(3);
        let mut surface = surface_with_dialog(id, &["Yes", "No"]);
        let (width, height) = surface.measure(id);
        surface
            .set_offset(id, -i32::from(width) / 2, -i32::from(height) / 2)
            .unwrap();
        surface.fade(FadeTarget::Element(id), FadeDirection::In).unwrap();
        draw(&mut surface);

        let left = 30 - width / 2;
        let top = 10 - height / 2;
        let bar_row = top + height - 2;

        assert_eq!(surface.hit_at(left + 1, bar_row), Some(Hit::Button(id, 0)));
        assert_eq!(surface.hit_at(left + 1 + 8, bar_row), Some(Hit::Button(id, 1)));
        assert_eq!(surface.hit_at(left + width - 4, top), Some(Hit::Close(id)));
        assert_eq!(surface.hit_at(0, 0), None);
    }

    #[test]
    fn test_focus_cycles_through_buttons() {
        let id = DialogId::new(2);
        let mut surface = surface_with_dialog(id, &["A", "B", "C"]);
        assert_eq!(surface.focused_button(), None);

        surface.fade(FadeTarget::Element(id), FadeDirection::In).unwrap();
        assert_eq!(surface.focused_button(), Some((id, 0)));

        surface.focus_prev();
        assert_eq!(surface.focused_button(), Some((id, 2)));
        surface.focus_next();
        surface.focus_next();
        assert_eq!(surface.focused_button(), Some((id, 1)));
    }

    #[test]
    fn test_overlay_follows_fades() {
        let id = DialogId::new(1);
        let mut surface = surface_with_dialog(id, &[]);
        surface.fade(FadeTarget::Overlay, FadeDirection::In).unwrap();
        assert!(surface.overlay_visible());

        surface.detach(id).unwrap();
        assert!(!surface.overlay_visible());
        assert_eq!(surface.measure(id), (0, 0));
    }
}
