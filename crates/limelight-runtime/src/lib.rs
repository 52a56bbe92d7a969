#![forbid(unsafe_code)]

//! Panel lifecycle, interactions, and host wiring for the Limelight
//! spotlight tracker.
//!
//! The shape of an integration:
//!
//! ```ignore
//! use limelight_core::event::EncounterEvent;
//! use limelight_core::MotionPolicy;
//! use limelight_render::RowTemplate;
//! use limelight_runtime::TrackerController;
//!
//! let mut tracker = TrackerController::new(document, stage, RowTemplate, MotionPolicy::default());
//!
//! // Host boot:
//! tracker.notify(EncounterEvent::Ready);
//!
//! // Host change notifications:
//! tracker.notify(EncounterEvent::EncounterUpdated);
//!
//! // Host frame loop:
//! tracker.frame(now);
//! ```
//!
//! The host supplies the `document` (encounter truth and mutations), the
//! `stage` (token selection/hover/viewport), and optionally a template
//! renderer and a `limelight-motion.toml`; ordering, priority tokens,
//! reconciliation, animation, and action dispatch live in this workspace.

pub mod actions;
pub mod adapter;
pub mod bridge;
pub mod config;
pub mod panel;
pub mod registry;

pub use actions::{ActionOutcome, ActionTable};
pub use adapter::{NAV_SHORTCUT, NavShortcut, PanelMounts, TrackerController};
pub use bridge::{DocumentError, DocumentModel, Stage};
pub use panel::{PanelConfig, PanelError, PanelId, PanelInstance, RenderState};
pub use registry::{BulkOutcome, BulkTicket, PanelRegistry, RenderOptions};
