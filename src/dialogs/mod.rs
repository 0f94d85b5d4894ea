//! Dialog queue with a single active dialog
//!
//! Dialogs are created through a [`DialogManager`], which queues them, shows at
//! most one at a time, and promotes the highest-priority queued dialog whenever
//! one is removed. Rendering is delegated to a [`Surface`](crate::surface::Surface).

pub mod definition;
pub mod lifecycle;
pub mod manager;
pub mod queue;
mod ticker;
pub mod types;

pub use definition::{parse_definitions, ButtonDefinition, DialogDefinition, DialogSummary};
pub use lifecycle::LifecyclePhase;
pub use manager::DialogManager;
pub use queue::DialogQueue;
pub use types::*;
