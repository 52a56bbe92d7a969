#![forbid(unsafe_code)]

//! Motion-as-data: every timing, distance, and easing the tracker animates
//! with, as a single [`MotionPolicy`] loadable from configuration.
//!
//! Every field has a default matching the tracker's built-in feel, so
//! `MotionPolicy::default()` needs no config file. Loading from TOML lives
//! in the runtime crate; this module only defines the data and its
//! validation.

use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::animation::{
    EasingFn, back_in, back_out, ease_in, ease_in_out, ease_out, linear, sine_in_out,
};

/// A named easing curve, resolvable to an [`EasingFn`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum EasingKind {
    Linear,
    EaseIn,
    EaseOut,
    EaseInOut,
    SineInOut,
    BackIn,
    BackOut,
}

impl EasingKind {
    /// The function this name denotes.
    #[must_use]
    pub fn resolve(self) -> EasingFn {
        match self {
            EasingKind::Linear => linear,
            EasingKind::EaseIn => ease_in,
            EasingKind::EaseOut => ease_out,
            EasingKind::EaseInOut => ease_in_out,
            EasingKind::SineInOut => sine_in_out,
            EasingKind::BackIn => back_in,
            EasingKind::BackOut => back_out,
        }
    }
}

/// Row stack metric for a panel's vertical layout.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LayoutPolicy {
    /// Width of one row in scene units. Default: 220.
    pub row_width: f64,
    /// Height of one row in scene units. Default: 64.
    pub row_height: f64,
    /// Vertical gap between rows. Default: 8.
    pub row_gap: f64,
    /// Horizontal slide distance for entrance/exit, in scene units.
    /// Allied panels slide from the left, opposing from the right.
    /// Default: 120.
    pub slide_distance: f64,
}

impl Default for LayoutPolicy {
    fn default() -> Self {
        Self {
            row_width: 220.0,
            row_height: 64.0,
            row_gap: 8.0,
            slide_distance: 120.0,
        }
    }
}

/// First-mount entrance and close exit staggers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MountPolicy {
    /// Per-row slide duration (ms). Default: 1000.
    pub item_ms: u64,
    /// Stagger between successive rows (ms). Default: 200.
    pub stagger_ms: u64,
    /// Easing for the slide. Default: back-out.
    pub easing: EasingKind,
}

impl Default for MountPolicy {
    fn default() -> Self {
        Self {
            item_ms: 1000,
            stagger_ms: 200,
            easing: EasingKind::BackOut,
        }
    }
}

/// Steady-state reconcile transition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReflowPolicy {
    /// Position/scale transition duration (ms). Default: 500.
    pub move_ms: u64,
    /// Enter/exit fade duration (ms). Default: 300.
    pub fade_ms: u64,
    /// Easing for the position transition. Default: ease-in-out.
    pub easing: EasingKind,
}

impl Default for ReflowPolicy {
    fn default() -> Self {
        Self {
            move_ms: 500,
            fade_ms: 300,
            easing: EasingKind::EaseInOut,
        }
    }
}

/// Request-orbit indicator loops and the withdrawal retract.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OrbitPolicy {
    /// One full ring revolution (ms). Default: 3000.
    pub period_ms: u64,
    /// Satellite intro settle (ms). Default: 1500.
    pub satellite_intro_ms: u64,
    /// Satellite yoyo pulse leg (ms). Default: 700.
    pub satellite_pulse_ms: u64,
    /// Shrink-away before a withdrawal write (ms). Default: 400.
    pub retract_ms: u64,
    /// Spotlight gradient sweep leg (ms). Default: 1500.
    pub gradient_ms: u64,
}

impl Default for OrbitPolicy {
    fn default() -> Self {
        Self {
            period_ms: 3000,
            satellite_intro_ms: 1500,
            satellite_pulse_ms: 700,
            retract_ms: 400,
            gradient_ms: 1500,
        }
    }
}

/// Pointer-hover feedback on a row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HoverPolicy {
    /// Row scale-up duration (ms). Default: 200.
    pub scale_ms: u64,
    /// Row scale factor while hovered. Default: 1.2.
    pub scale: f64,
    /// Spotlight-anchor reveal duration (ms). Default: 500.
    pub anchor_ms: u64,
}

impl Default for HoverPolicy {
    fn default() -> Self {
        Self {
            scale_ms: 200,
            scale: 1.2,
            anchor_ms: 500,
        }
    }
}

/// Top-level motion policy for the tracker.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MotionPolicy {
    pub layout: LayoutPolicy,
    pub mount: MountPolicy,
    pub reflow: ReflowPolicy,
    pub orbit: OrbitPolicy,
    pub hover: HoverPolicy,
}

impl MotionPolicy {
    /// Clamp degenerate values so downstream division stays total: zero
    /// durations become 1 ms, non-positive metrics fall back to defaults.
    #[must_use]
    pub fn validated(mut self) -> Self {
        fn at_least_one(ms: &mut u64) {
            if *ms == 0 {
                *ms = 1;
            }
        }
        at_least_one(&mut self.mount.item_ms);
        at_least_one(&mut self.mount.stagger_ms);
        at_least_one(&mut self.reflow.move_ms);
        at_least_one(&mut self.reflow.fade_ms);
        at_least_one(&mut self.orbit.period_ms);
        at_least_one(&mut self.orbit.satellite_intro_ms);
        at_least_one(&mut self.orbit.satellite_pulse_ms);
        at_least_one(&mut self.orbit.retract_ms);
        at_least_one(&mut self.orbit.gradient_ms);
        at_least_one(&mut self.hover.scale_ms);
        at_least_one(&mut self.hover.anchor_ms);

        let layout_defaults = LayoutPolicy::default();
        if self.layout.row_width <= 0.0 {
            self.layout.row_width = layout_defaults.row_width;
        }
        if self.layout.row_height <= 0.0 {
            self.layout.row_height = layout_defaults.row_height;
        }
        if self.layout.row_gap < 0.0 {
            self.layout.row_gap = layout_defaults.row_gap;
        }
        if self.hover.scale < 1.0 {
            self.hover.scale = HoverPolicy::default().scale;
        }
        self
    }

    /// Vertical stack position for the row at `index`.
    #[must_use]
    pub fn row_slot(&self, index: usize) -> f64 {
        index as f64 * (self.layout.row_height + self.layout.row_gap)
    }

    /// Per-row entrance/exit slide duration.
    #[must_use]
    pub fn mount_item(&self) -> Duration {
        Duration::from_millis(self.mount.item_ms)
    }

    /// Stagger between successive rows at mount/close.
    #[must_use]
    pub fn mount_stagger(&self) -> Duration {
        Duration::from_millis(self.mount.stagger_ms)
    }

    /// Reflow position/scale transition duration.
    #[must_use]
    pub fn reflow_move(&self) -> Duration {
        Duration::from_millis(self.reflow.move_ms)
    }

    /// Reflow enter/exit fade duration.
    #[must_use]
    pub fn reflow_fade(&self) -> Duration {
        Duration::from_millis(self.reflow.fade_ms)
    }

    /// One full orbit ring revolution.
    #[must_use]
    pub fn orbit_period(&self) -> Duration {
        Duration::from_millis(self.orbit.period_ms)
    }

    /// Satellite intro settle duration.
    #[must_use]
    pub fn satellite_intro(&self) -> Duration {
        Duration::from_millis(self.orbit.satellite_intro_ms)
    }

    /// Satellite yoyo pulse leg duration.
    #[must_use]
    pub fn satellite_pulse(&self) -> Duration {
        Duration::from_millis(self.orbit.satellite_pulse_ms)
    }

    /// Withdrawal retract duration.
    #[must_use]
    pub fn retract(&self) -> Duration {
        Duration::from_millis(self.orbit.retract_ms)
    }

    /// Spotlight gradient sweep leg duration.
    #[must_use]
    pub fn gradient_sweep(&self) -> Duration {
        Duration::from_millis(self.orbit.gradient_ms)
    }

    /// Row hover scale-up duration.
    #[must_use]
    pub fn hover_scale_time(&self) -> Duration {
        Duration::from_millis(self.hover.scale_ms)
    }

    /// Spotlight-anchor reveal duration.
    #[must_use]
    pub fn anchor_reveal(&self) -> Duration {
        Duration::from_millis(self.hover.anchor_ms)
    }
}
