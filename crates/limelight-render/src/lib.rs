#![forbid(unsafe_code)]

//! Live fragment tree and animated reconciliation.
//!
//! A panel owns exactly one [`Fragment`]: the element tree it last
//! presented. Each update cycle the runtime computes fresh display rows and
//! calls [`reconcile`], which replaces the fragment's children wholesale
//! while capturing enough geometry and auxiliary state that the visual
//! transition is continuous: rows glide to their new slots, entrants fade
//! in, leavers fade out, and spinning request orbits keep their phase.
//!
//! The capture/apply/transition interface in [`flip`] is deliberately
//! independent of any animation backend: it consumes the primitives from
//! `limelight-core::animation` but nothing in the contract names them.

pub mod flip;
pub mod fragment;
pub mod reconcile;
pub mod template;

pub use flip::{LayoutSnapshot, Transition};
pub use fragment::{Fragment, OrbitState, RowNode};
pub use reconcile::{ReconcileError, reconcile};
pub use template::{ROW_TEMPLATE, RowTemplate, TemplateError, TemplateRenderer};
