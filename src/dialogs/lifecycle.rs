//! Show/hide state machine
//!
//! Only one dialog may occupy the active slot. A show request for another dialog
//! first hides the current one and only proceeds once its fade-out has finished.
//! The machine never touches the surface itself: each request returns a [`Step`]
//! describing what the manager has to do next, and fade completions are fed back
//! through [`Lifecycle::fade_in_finished`] and [`Lifecycle::fade_out_finished`].

use super::types::{Callback, DialogId};

/// Work queued behind a hide transition
pub(crate) enum Continuation {
    /// Invoke a caller callback for `id`
    Notify {
        id: DialogId,
        callback: Option<Callback>,
    },
    /// Re-issue a show request
    Show {
        id: DialogId,
        callback: Option<Callback>,
    },
    /// Finish removing `id` from the queue
    Remove {
        id: DialogId,
        callback: Option<Callback>,
    },
}

/// What the manager must do in response to a request
pub(crate) enum Step {
    /// Attach `id` and start its fade-in
    BeginShow(DialogId),
    /// Start fading out `id`
    BeginHide(DialogId),
    /// Run a continuation right away
    Run(Continuation),
    /// Nothing to do until a transition completes
    Wait,
}

/// Result of a completed fade-in
pub(crate) struct ShowCompleted {
    pub callbacks: Vec<Callback>,
    /// Set when a hide was requested while fading in
    pub hide_next: bool,
}

/// Public view of the current phase
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LifecyclePhase {
    #[default]
    Idle,
    Showing(DialogId),
    Shown(DialogId),
    Hiding(DialogId),
}

enum Phase {
    Idle,
    Showing {
        id: DialogId,
        callbacks: Vec<Callback>,
        hide_after: Option<Vec<Continuation>>,
    },
    Shown(DialogId),
    Hiding {
        id: DialogId,
        continuations: Vec<Continuation>,
    },
}

pub(crate) struct Lifecycle {
    phase: Phase,
}

impl Default for Lifecycle {
    fn default() -> Self {
        Self { phase: Phase::Idle }
    }
}

impl Lifecycle {
    pub fn phase(&self) -> LifecyclePhase {
        match &self.phase {
            Phase::Idle => LifecyclePhase::Idle,
            Phase::Showing { id, .. } => LifecyclePhase::Showing(*id),
            Phase::Shown(id) => LifecyclePhase::Shown(*id),
            Phase::Hiding { id, .. } => LifecyclePhase::Hiding(*id),
        }
    }

    /// The dialog holding the active slot
    pub fn active(&self) -> Option<DialogId> {
        match self.phase() {
            LifecyclePhase::Idle => None,
            LifecyclePhase::Showing(id) | LifecyclePhase::Shown(id) | LifecyclePhase::Hiding(id) => {
                Some(id)
            }
        }
    }

    /// The dialog that is fully shown, if any
    pub fn shown(&self) -> Option<DialogId> {
        match self.phase {
            Phase::Shown(id) => Some(id),
            _ => None,
        }
    }

    pub fn request_show(&mut self, target: DialogId, callback: Option<Callback>) -> Step {
        match &mut self.phase {
            Phase::Idle => {
                self.phase = Phase::Showing {
                    id: target,
                    callbacks: callback.into_iter().collect(),
                    hide_after: None,
                };
                Step::BeginShow(target)
            }
            Phase::Showing {
                id,
                callbacks,
                hide_after,
            } if *id == target => {
                // A hide is already pending, so the show has to come after it
                match hide_after {
                    Some(continuations) => continuations.push(Continuation::Show {
                        id: target,
                        callback,
                    }),
                    None => callbacks.extend(callback),
                }
                Step::Wait
            }
            Phase::Showing { hide_after, .. } => {
                hide_after.get_or_insert_with(Vec::new).push(Continuation::Show {
                    id: target,
                    callback,
                });
                Step::Wait
            }
            Phase::Shown(id) if *id == target => Step::Run(Continuation::Notify {
                id: target,
                callback,
            }),
            Phase::Shown(id) => {
                let active = *id;
                self.phase = Phase::Hiding {
                    id: active,
                    continuations: vec![Continuation::Show {
                        id: target,
                        callback,
                    }],
                };
                Step::BeginHide(active)
            }
            Phase::Hiding { continuations, .. } => {
                continuations.push(Continuation::Show {
                    id: target,
                    callback,
                });
                Step::Wait
            }
        }
    }

    pub fn request_hide(&mut self, target: DialogId, continuation: Continuation) -> Step {
        if self.active() != Some(target) {
            return Step::Run(continuation);
        }

        match &mut self.phase {
            Phase::Showing { hide_after, .. } => {
                hide_after.get_or_insert_with(Vec::new).push(continuation);
                Step::Wait
            }
            Phase::Shown(_) => {
                self.phase = Phase::Hiding {
                    id: target,
                    continuations: vec![continuation],
                };
                Step::BeginHide(target)
            }
            Phase::Hiding { continuations, .. } => {
                continuations.push(continuation);
                Step::Wait
            }
            Phase::Idle => Step::Run(continuation),
        }
    }

    /// Returns `None` for a stray signal
    pub fn fade_in_finished(&mut self, target: DialogId) -> Option<ShowCompleted> {
        if !matches!(self.phase, Phase::Showing { id, .. } if id == target) {
            return None;
        }

        match std::mem::replace(&mut self.phase, Phase::Shown(target)) {
            Phase::Showing {
                callbacks,
                hide_after,
                ..
            } => {
                let hide_next = hide_after.is_some();
                if let Some(continuations) = hide_after {
                    self.phase = Phase::Hiding {
                        id: target,
                        continuations,
                    };
                }
                Some(ShowCompleted {
                    callbacks,
                    hide_next,
                })
            }
            _ => None,
        }
    }

    /// Returns the queued continuations, or `None` for a stray signal
    pub fn fade_out_finished(&mut self, target: DialogId) -> Option<Vec<Continuation>> {
        if !matches!(self.phase, Phase::Hiding { id, .. } if id == target) {
            return None;
        }

        match std::mem::replace(&mut self.phase, Phase::Idle) {
            Phase::Hiding { continuations, .. } => Some(continuations),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn id(raw: u64) -> DialogId {
        DialogId::new(raw)
    }

    fn notify(raw: u64) -> Continuation {
        Continuation::Notify {
            id: id(raw),
            callback: None,
        }
    }

    #[test]
    fn test_show_from_idle() {
        let mut lifecycle = Lifecycle::default();

        assert!(matches!(lifecycle.request_show(id(1), None), Step::BeginShow(d) if d == id(1)));
        assert_eq!(lifecycle.phase(), LifecyclePhase::Showing(id(1)));
        assert_eq!(lifecycle.active(), Some(id(1)));
        assert_eq!(lifecycle.shown(), None);

        let completed = lifecycle.fade_in_finished(id(1)).unwrap();
        assert!(!completed.hide_next);
        assert_eq!(lifecycle.phase(), LifecyclePhase::Shown(id(1)));
    }

    #[test]
    fn test_show_other_while_shown_hides_first() {
        let mut lifecycle = Lifecycle::default();
        lifecycle.request_show(id(1), None);
        lifecycle.fade_in_finished(id(1));

        assert!(matches!(lifecycle.request_show(id(2), None), Step::BeginHide(d) if d == id(1)));
        assert_eq!(lifecycle.phase(), LifecyclePhase::Hiding(id(1)));

        let continuations = lifecycle.fade_out_finished(id(1)).unwrap();
        assert_eq!(lifecycle.phase(), LifecyclePhase::Idle);
        assert!(matches!(continuations.as_slice(), [Continuation::Show { id: d, .. }] if *d == id(2)));
    }

    #[test]
    fn test_show_while_showing_defers_hide() {
        let mut lifecycle = Lifecycle::default();
        lifecycle.request_show(id(1), None);

        assert!(matches!(lifecycle.request_show(id(2), None), Step::Wait));

        let completed = lifecycle.fade_in_finished(id(1)).unwrap();
        assert!(completed.hide_next);
        assert_eq!(lifecycle.phase(), LifecyclePhase::Hiding(id(1)));
    }

    #[test]
    fn test_hide_then_show_while_showing_reshows() {
        let mut lifecycle = Lifecycle::default();
        lifecycle.request_show(id(1), None);

        assert!(matches!(lifecycle.request_hide(id(1), notify(1)), Step::Wait));
        assert!(matches!(lifecycle.request_show(id(1), None), Step::Wait));

        let completed = lifecycle.fade_in_finished(id(1)).unwrap();
        assert!(completed.hide_next);
        assert!(completed.callbacks.is_empty());

        let continuations = lifecycle.fade_out_finished(id(1)).unwrap();
        assert!(matches!(
            continuations.as_slice(),
            [Continuation::Notify { .. }, Continuation::Show { id: d, .. }] if *d == id(1)
        ));
    }

    #[test]
    fn test_show_self_while_shown_notifies() {
        let mut lifecycle = Lifecycle::default();
        lifecycle.request_show(id(1), None);
        lifecycle.fade_in_finished(id(1));

        assert!(matches!(
            lifecycle.request_show(id(1), None),
            Step::Run(Continuation::Notify { .. })
        ));
        assert_eq!(lifecycle.phase(), LifecyclePhase::Shown(id(1)));
    }

    #[test]
    fn test_hide_inactive_runs_immediately() {
        let mut lifecycle = Lifecycle::default();
        lifecycle.request_show(id(1), None);

        assert!(matches!(lifecycle.request_hide(id(2), notify(2)), Step::Run(_)));
        assert_eq!(lifecycle.phase(), LifecyclePhase::Showing(id(1)));
    }

    #[test]
    fn test_hide_requests_accumulate_while_hiding() {
        let mut lifecycle = Lifecycle::default();
        lifecycle.request_show(id(1), None);
        lifecycle.fade_in_finished(id(1));

        assert!(matches!(lifecycle.request_hide(id(1), notify(1)), Step::BeginHide(_)));
        assert!(matches!(lifecycle.request_hide(id(1), notify(1)), Step::Wait));
        assert!(matches!(lifecycle.request_show(id(3), None), Step::Wait));

        let continuations = lifecycle.fade_out_finished(id(1)).unwrap();
        assert_eq!(continuations.len(), 3);
    }

    #[test]
    fn test_stray_signals_are_ignored() {
        let mut lifecycle = Lifecycle::default();
        assert!(lifecycle.fade_in_finished(id(1)).is_none());
        assert!(lifecycle.fade_out_finished(id(1)).is_none());

        lifecycle.request_show(id(1), None);
        assert!(lifecycle.fade_in_finished(id(2)).is_none());
        assert!(lifecycle.fade_out_finished(id(1)).is_none());
        assert_eq!(lifecycle.phase(), LifecyclePhase::Showing(id(1)));
    }
}
