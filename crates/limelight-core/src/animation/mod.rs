#![forbid(unsafe_code)]

//! Frame-tick animation primitives.
//!
//! Everything visual in Limelight is driven by the cooperative frame pump:
//! the host calls `tick(dt)` once per animation frame and reads back
//! progress values. An [`Animation`] owns no clock; it only accumulates the
//! `Duration` deltas it is handed, which keeps playback deterministic and
//! directly testable with synthetic time.
//!
//! # Invariants
//!
//! 1. `tick` never panics, whatever `dt` is handed in.
//! 2. Raw progress is monotonic and clamps at 1.0; `is_complete()` reports
//!    raw progress, not eased value.
//! 3. Zero durations are clamped to 1 ns so progress division is total.
//! 4. Eased values may overshoot `[0, 1]` for back easings; consumers that
//!    map progress to opacity clamp, consumers that map to position want
//!    the overshoot.

pub mod loops;
pub mod presets;

use std::collections::BTreeMap;
use std::time::Duration;

/// A time-driven animation advanced by the frame pump.
pub trait Animation {
    /// Advance by `dt`.
    fn tick(&mut self, dt: Duration);

    /// Current eased value, nominally in `[0, 1]`.
    fn value(&self) -> f32;

    /// Whether the animation has run to completion. Infinite loops never
    /// complete.
    fn is_complete(&self) -> bool;

    /// Rewind to the initial state.
    fn reset(&mut self);
}

/// An easing function mapping raw progress to eased progress.
pub type EasingFn = fn(f32) -> f32;

/// Identity easing.
#[must_use]
pub fn linear(t: f32) -> f32 {
    t
}

/// Quadratic ease-in.
#[must_use]
pub fn ease_in(t: f32) -> f32 {
    t * t
}

/// Quadratic ease-out.
#[must_use]
pub fn ease_out(t: f32) -> f32 {
    1.0 - (1.0 - t) * (1.0 - t)
}

/// Quadratic ease-in-out.
#[must_use]
pub fn ease_in_out(t: f32) -> f32 {
    if t < 0.5 {
        2.0 * t * t
    } else {
        1.0 - (-2.0 * t + 2.0).powi(2) / 2.0
    }
}

/// Sinusoidal ease-in-out.
#[must_use]
pub fn sine_in_out(t: f32) -> f32 {
    -((std::f32::consts::PI * t).cos() - 1.0) / 2.0
}

const BACK_OVERSHOOT: f32 = 1.70158;

/// Back ease-out: overshoots past 1.0 and settles back.
#[must_use]
pub fn back_out(t: f32) -> f32 {
    let c1 = BACK_OVERSHOOT;
    let c3 = c1 + 1.0;
    let u = t - 1.0;
    1.0 + c3 * u * u * u + c1 * u * u
}

/// Back ease-in: dips below 0.0 before accelerating.
#[must_use]
pub fn back_in(t: f32) -> f32 {
    let c1 = BACK_OVERSHOOT;
    let c3 = c1 + 1.0;
    c3 * t * t * t - c1 * t * t
}

fn clamp_duration(d: Duration) -> Duration {
    if d.is_zero() { Duration::from_nanos(1) } else { d }
}

// ---------------------------------------------------------------------------
// Fade
// ---------------------------------------------------------------------------

/// A single progress ramp over a fixed duration with an easing curve.
///
/// The workhorse primitive: consumers map its value onto whichever visual
/// channel they animate (opacity, offset, scale).
#[derive(Debug, Clone)]
pub struct Fade {
    duration: Duration,
    elapsed: Duration,
    easing: EasingFn,
}

impl Fade {
    /// Create a ramp over `duration` with linear easing.
    #[must_use]
    pub fn new(duration: Duration) -> Self {
        Self {
            duration: clamp_duration(duration),
            elapsed: Duration::ZERO,
            easing: linear,
        }
    }

    /// Set the easing curve (builder pattern).
    #[must_use]
    pub fn easing(mut self, easing: EasingFn) -> Self {
        self.easing = easing;
        self
    }

    /// Raw (un-eased) progress in `[0, 1]`.
    #[must_use]
    pub fn progress(&self) -> f32 {
        (self.elapsed.as_secs_f64() / self.duration.as_secs_f64()).min(1.0) as f32
    }
}

impl Animation for Fade {
    fn tick(&mut self, dt: Duration) {
        self.elapsed = (self.elapsed + dt).min(self.duration);
    }

    fn value(&self) -> f32 {
        (self.easing)(self.progress())
    }

    fn is_complete(&self) -> bool {
        self.elapsed >= self.duration
    }

    fn reset(&mut self) {
        self.elapsed = Duration::ZERO;
    }
}

// ---------------------------------------------------------------------------
// Delayed
// ---------------------------------------------------------------------------

/// Wrap an animation with a start delay.
///
/// The inner animation holds at its initial value until the delay elapses;
/// a tick spanning the boundary feeds the remainder into the inner
/// animation so stagger chains stay exact under coarse frame deltas.
#[derive(Debug, Clone)]
pub struct Delayed<A> {
    delay: Duration,
    waited: Duration,
    inner: A,
}

/// Delay `animation` by `offset`.
#[must_use]
pub fn delay<A: Animation>(offset: Duration, animation: A) -> Delayed<A> {
    Delayed {
        delay: offset,
        waited: Duration::ZERO,
        inner: animation,
    }
}

impl<A: Animation> Animation for Delayed<A> {
    fn tick(&mut self, dt: Duration) {
        if self.waited < self.delay {
            let remaining = self.delay - self.waited;
            if dt <= remaining {
                self.waited += dt;
                return;
            }
            self.waited = self.delay;
            self.inner.tick(dt - remaining);
        } else {
            self.inner.tick(dt);
        }
    }

    fn value(&self) -> f32 {
        if self.waited < self.delay {
            // Holding: report the inner animation's initial value.
            0.0
        } else {
            self.inner.value()
        }
    }

    fn is_complete(&self) -> bool {
        self.waited >= self.delay && self.inner.is_complete()
    }

    fn reset(&mut self) {
        self.waited = Duration::ZERO;
        self.inner.reset();
    }
}

// ---------------------------------------------------------------------------
// Group
// ---------------------------------------------------------------------------

/// A labeled set of animations ticked together.
///
/// Complete only when every member is complete; an empty group is
/// immediately complete. Iteration order is the label's sort order, which
/// keeps behavior deterministic.
#[derive(Default)]
pub struct AnimationGroup {
    members: BTreeMap<String, Box<dyn Animation>>,
}

impl std::fmt::Debug for AnimationGroup {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AnimationGroup")
            .field("member_count", &self.members.len())
            .finish()
    }
}

impl AnimationGroup {
    /// Create an empty group.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a member under `label`, replacing any previous holder.
    pub fn insert(&mut self, label: &str, animation: Box<dyn Animation>) {
        self.members.insert(label.to_string(), animation);
    }

    /// Eased value of the member under `label`.
    #[must_use]
    pub fn value_of(&self, label: &str) -> Option<f32> {
        self.members.get(label).map(|a| a.value())
    }

    /// Number of members.
    #[must_use]
    pub fn len(&self) -> usize {
        self.members.len()
    }

    /// Whether the group has no members.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }
}

impl Animation for AnimationGroup {
    fn tick(&mut self, dt: Duration) {
        for member in self.members.values_mut() {
            member.tick(dt);
        }
    }

    fn value(&self) -> f32 {
        // Group value is the minimum member progress: 1.0 only when all done.
        self.members
            .values()
            .map(|a| a.value())
            .fold(1.0_f32, f32::min)
    }

    fn is_complete(&self) -> bool {
        self.members.values().all(|a| a.is_complete())
    }

    fn reset(&mut self) {
        for member in self.members.values_mut() {
            member.reset();
        }
    }
}

// ---------------------------------------------------------------------------
// Stagger
// ---------------------------------------------------------------------------

/// Direction of a stagger sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StaggerMode {
    /// First item starts first.
    Forward,
    /// Last item starts first (exit animations run back up the list).
    Reverse,
}

/// Start offsets for `count` items spaced `step` apart.
#[must_use]
pub fn stagger_offsets(count: usize, step: Duration, mode: StaggerMode) -> Vec<Duration> {
    (0..count)
        .map(|i| {
            let slot = match mode {
                StaggerMode::Forward => i,
                StaggerMode::Reverse => count - 1 - i,
            };
            step.saturating_mul(slot as u32)
        })
        .collect()
}
