//! Headless surface that records every operation
//!
//! Useful for tests and for hosts that render dialogs elsewhere but still want
//! the manager's queueing and transition logic. Element fades complete after a
//! configurable duration (zero by default, i.e. on the next tick).

use super::{measure_text, Chrome, FadeDirection, FadeTarget, Region, Surface};
use crate::dialogs::{Content, DialogId};
use anyhow::{anyhow, Result};
use std::collections::HashMap;
use std::time::Duration;
use tokio::time::Instant;

/// A recorded surface call
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SurfaceOp {
    Build(DialogId),
    SetRegion(DialogId, Region, String),
    AddButton(DialogId, usize, String),
    SetButtonLabel(DialogId, usize, String),
    Attach(DialogId),
    Detach(DialogId),
    Fade(FadeTarget, FadeDirection),
    SetOffset(DialogId, i32, i32),
}

/// Rendered state of one element
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ElementState {
    pub chrome: Chrome,
    pub title: String,
    pub content: String,
    /// (label, style) pairs in bar order
    pub buttons: Vec<(String, String)>,
    pub attached: bool,
    pub visible: bool,
    pub offset: (i32, i32),
}

#[derive(Debug, Clone, Copy)]
struct PendingFade {
    id: DialogId,
    direction: FadeDirection,
    started: Instant,
}

#[derive(Debug, Default)]
pub struct HeadlessSurface {
    ops: Vec<SurfaceOp>,
    elements: HashMap<DialogId, ElementState>,
    overlay_attached: bool,
    overlay_visible: bool,
    fade_duration: Duration,
    pending: Vec<PendingFade>,
}

impl HeadlessSurface {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_fade_duration(mut self, duration: Duration) -> Self {
        self.fade_duration = duration;
        self
    }

    pub fn ops(&self) -> &[SurfaceOp] {
        &self.ops
    }

    pub fn clear_ops(&mut self) {
        self.ops.clear();
    }

    pub fn element(&self, id: DialogId) -> Option<&ElementState> {
        self.elements.get(&id)
    }

    /// Ids of elements currently visible
    pub fn visible(&self) -> Vec<DialogId> {
        let mut ids: Vec<_> = self
            .elements
            .iter()
            .filter(|(_, element)| element.visible)
            .map(|(id, _)| *id)
            .collect();
        ids.sort();
        ids
    }

    pub fn overlay_attached(&self) -> bool {
        self.overlay_attached
    }

    pub fn has_pending_transitions(&self) -> bool {
        !self.pending.is_empty()
    }

    fn element_mut(&mut self, id: DialogId) -> Result<&mut ElementState> {
        self.elements
            .get_mut(&id)
            .ok_or_else(|| anyhow!("no element built for {id}"))
    }
}

impl Surface for HeadlessSurface {
    fn build(&mut self, id: DialogId, chrome: Chrome) -> Result<()> {
        self.ops.push(SurfaceOp::Build(id));
        self.elements.insert(
            id,
            ElementState {
                chrome,
                title: String::new(),
                content: String::new(),
                buttons: Vec::new(),
                attached: false,
                visible: false,
                offset: (0, 0),
            },
        );
        Ok(())
    }

    fn set_region(&mut self, id: DialogId, region: Region, content: &Content) -> Result<()> {
        let text = content.to_plain();
        self.ops.push(SurfaceOp::SetRegion(id, region, text.clone()));
        let element = self.element_mut(id)?;
        match region {
            Region::Title => element.title = text,
            Region::Content => element.content = text,
        }
        Ok(())
    }

    fn add_button(&mut self, id: DialogId, index: usize, label: &str, style: &str) -> Result<()> {
        self.ops.push(SurfaceOp::AddButton(id, index, label.to_string()));
        let element = self.element_mut(id)?;
        element.buttons.push((label.to_string(), style.to_string()));
        element.chrome.show_buttons = true;
        Ok(())
    }

    fn set_button_label(&mut self, id: DialogId, index: usize, label: &str) -> Result<()> {
        self.ops
            .push(SurfaceOp::SetButtonLabel(id, index, label.to_string()));
        let button = self
            .element_mut(id)?
            .buttons
            .get_mut(index)
            .ok_or_else(|| anyhow!("{id} has no button {index}"))?;
        button.0 = label.to_string();
        Ok(())
    }

    fn attach(&mut self, id: DialogId) -> Result<()> {
        self.ops.push(SurfaceOp::Attach(id));
        let element = self.element_mut(id)?;
        element.attached = true;
        element.visible = false;
        self.overlay_attached = true;
        self.overlay_visible = false;
        Ok(())
    }

    fn detach(&mut self, id: DialogId) -> Result<()> {
        self.ops.push(SurfaceOp::Detach(id));
        self.elements.remove(&id);
        self.pending.retain(|fade| fade.id != id);
        self.overlay_attached = false;
        self.overlay_visible = false;
        Ok(())
    }

    fn fade(&mut self, target: FadeTarget, direction: FadeDirection) -> Result<()> {
        self.ops.push(SurfaceOp::Fade(target, direction));
        match target {
            FadeTarget::Overlay => {
                self.overlay_visible = direction == FadeDirection::In;
            }
            FadeTarget::Element(id) => {
                if direction == FadeDirection::In {
                    self.element_mut(id)?.visible = true;
                }
                self.pending.push(PendingFade {
                    id,
                    direction,
                    started: Instant::now(),
                });
            }
        }
        Ok(())
    }

    fn overlay_visible(&self) -> bool {
        self.overlay_visible
    }

    fn measure(&self, id: DialogId) -> (u16, u16) {
        self.elements.get(&id).map_or((0, 0), |element| {
            let labels: Vec<String> = element.buttons.iter().map(|(label, _)| label.clone()).collect();
            measure_text(&element.title, &element.content, &labels, element.chrome)
        })
    }

    fn set_offset(&mut self, id: DialogId, dx: i32, dy: i32) -> Result<()> {
        self.ops.push(SurfaceOp::SetOffset(id, dx, dy));
        self.element_mut(id)?.offset = (dx, dy);
        Ok(())
    }

    fn finished_transitions(&mut self, now: Instant) -> Vec<(DialogId, FadeDirection)> {
        let duration = self.fade_duration;
        let (done, pending): (Vec<_>, Vec<_>) = self
            .pending
            .drain(..)
            .partition(|fade| now >= fade.started + duration);
        self.pending = pending;

        done.into_iter()
            .map(|fade| {
                if fade.direction == FadeDirection::Out {
                    if let Some(element) = self.elements.get_mut(&fade.id) {
                        element.visible = false;
                    }
                }
                (fade.id, fade.direction)
            })
            .collect()
    }
}
