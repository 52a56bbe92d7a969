#![forbid(unsafe_code)]

//! Continuously running visual state: rotations, yoyo pulses, and
//! hover-driven reveals.
//!
//! Unlike the one-shot primitives in the parent module, these never
//! complete on their own. The request-orbit rotation in particular is the
//! auxiliary state a reconcile must carry across a wholesale content
//! replace, so its phase is exposed for capture and restore.

use std::time::Duration;

use super::{Animation, EasingFn, linear};

/// A wrapping rotation with a fixed period.
///
/// Phase is in degrees `[0, 360)`. The reconciler captures and restores the
/// phase by orbit id so a spinning indicator does not snap on re-render.
#[derive(Debug, Clone)]
pub struct Rotation {
    period: Duration,
    degrees: f64,
}

impl Rotation {
    /// A rotation completing one revolution per `period`.
    #[must_use]
    pub fn new(period: Duration) -> Self {
        Self {
            period: if period.is_zero() {
                Duration::from_nanos(1)
            } else {
                period
            },
            degrees: 0.0,
        }
    }

    /// Current phase in degrees.
    #[must_use]
    pub fn degrees(&self) -> f64 {
        self.degrees
    }

    /// Restore a captured phase. Wrapped into `[0, 360)`.
    pub fn set_degrees(&mut self, degrees: f64) {
        self.degrees = degrees.rem_euclid(360.0);
    }
}

impl Animation for Rotation {
    fn tick(&mut self, dt: Duration) {
        let advance = 360.0 * dt.as_secs_f64() / self.period.as_secs_f64();
        self.degrees = (self.degrees + advance).rem_euclid(360.0);
    }

    fn value(&self) -> f32 {
        (self.degrees / 360.0) as f32
    }

    fn is_complete(&self) -> bool {
        false
    }

    fn reset(&mut self) {
        self.degrees = 0.0;
    }
}

/// An infinite yoyo oscillation between 0 and 1.
///
/// One `period` covers a single leg (0 to 1 or back), matching a tween with
/// `repeat: -1, yoyo: true`.
#[derive(Debug, Clone)]
pub struct Pulse {
    period: Duration,
    easing: EasingFn,
    position: f32,
    ascending: bool,
}

impl Pulse {
    /// A yoyo pulse with the given leg duration and linear easing.
    #[must_use]
    pub fn new(period: Duration) -> Self {
        Self {
            period: if period.is_zero() {
                Duration::from_nanos(1)
            } else {
                period
            },
            easing: linear,
            position: 0.0,
            ascending: true,
        }
    }

    /// Set the easing curve (builder pattern).
    #[must_use]
    pub fn easing(mut self, easing: EasingFn) -> Self {
        self.easing = easing;
        self
    }
}

impl Animation for Pulse {
    fn tick(&mut self, dt: Duration) {
        let mut step = (dt.as_secs_f64() / self.period.as_secs_f64()) as f32;
        // Fold whole back-and-forth cycles out of very coarse deltas.
        step %= 2.0;
        let mut pos = self.position;
        let mut ascending = self.ascending;
        while step > 0.0 {
            if ascending {
                let room = 1.0 - pos;
                if step < room {
                    pos += step;
                    break;
                }
                step -= room;
                pos = 1.0;
                ascending = false;
            } else {
                if step < pos {
                    pos -= step;
                    break;
                }
                step -= pos;
                pos = 0.0;
                ascending = true;
            }
        }
        self.position = pos;
        self.ascending = ascending;
    }

    fn value(&self) -> f32 {
        (self.easing)(self.position)
    }

    fn is_complete(&self) -> bool {
        false
    }

    fn reset(&mut self) {
        self.position = 0.0;
        self.ascending = true;
    }
}

/// A bidirectional ramp steered by hover state.
///
/// `set_forward(true)` plays toward 1.0, `set_forward(false)` plays back
/// toward 0.0, from wherever the ramp currently is. This mirrors a paused
/// tween timeline driven by `play()`/`reverse()`.
#[derive(Debug, Clone)]
pub struct Reveal {
    duration: Duration,
    easing: EasingFn,
    position: f32,
    forward: bool,
}

impl Reveal {
    /// A reveal taking `duration` for a full sweep, starting hidden.
    #[must_use]
    pub fn new(duration: Duration) -> Self {
        Self {
            duration: if duration.is_zero() {
                Duration::from_nanos(1)
            } else {
                duration
            },
            easing: linear,
            position: 0.0,
            forward: false,
        }
    }

    /// Set the easing curve (builder pattern).
    #[must_use]
    pub fn easing(mut self, easing: EasingFn) -> Self {
        self.easing = easing;
        self
    }

    /// Steer the ramp: `true` plays, `false` reverses.
    pub fn set_forward(&mut self, forward: bool) {
        self.forward = forward;
    }

    /// Whether the ramp currently plays toward 1.0.
    #[must_use]
    pub fn is_forward(&self) -> bool {
        self.forward
    }
}

impl Animation for Reveal {
    fn tick(&mut self, dt: Duration) {
        let step = (dt.as_secs_f64() / self.duration.as_secs_f64()) as f32;
        self.position = if self.forward {
            (self.position + step).min(1.0)
        } else {
            (self.position - step).max(0.0)
        };
    }

    fn value(&self) -> f32 {
        (self.easing)(self.position)
    }

    fn is_complete(&self) -> bool {
        if self.forward {
            self.position >= 1.0
        } else {
            self.position <= 0.0
        }
    }

    fn reset(&mut self) {
        self.position = 0.0;
        self.forward = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const MS: fn(u64) -> Duration = Duration::from_millis;

    #[test]
    fn rotation_wraps_at_360() {
        let mut rot = Rotation::new(MS(1000));
        rot.tick(MS(1500));
        assert!((rot.degrees() - 180.0).abs() < 1e-6);
        assert!(!rot.is_complete());
    }

    #[test]
    fn rotation_phase_restore_wraps() {
        let mut rot = Rotation::new(MS(3000));
        rot.set_degrees(725.0);
        assert!((rot.degrees() - 5.0).abs() < 1e-6);
        rot.set_degrees(-90.0);
        assert!((rot.degrees() - 270.0).abs() < 1e-6);
    }

    #[test]
    fn pulse_yoyos() {
        let mut pulse = Pulse::new(MS(100));
        pulse.tick(MS(50));
        assert!((pulse.value() - 0.5).abs() < 1e-5);
        pulse.tick(MS(100));
        // 150ms in: one full leg up, half a leg back down.
        assert!((pulse.value() - 0.5).abs() < 1e-5);
        pulse.tick(MS(50));
        assert!(pulse.value() < 1e-5);
    }

    #[test]
    fn reveal_plays_and_reverses_midway() {
        let mut reveal = Reveal::new(MS(100));
        reveal.set_forward(true);
        reveal.tick(MS(60));
        assert!((reveal.value() - 0.6).abs() < 1e-5);

        reveal.set_forward(false);
        reveal.tick(MS(30));
        assert!((reveal.value() - 0.3).abs() < 1e-5);
        reveal.tick(MS(50));
        assert!(reveal.is_complete());
        assert_eq!(reveal.value(), 0.0);
    }
}
