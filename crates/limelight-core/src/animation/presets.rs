#![forbid(unsafe_code)]

//! Ready-made animation groups for panel lifecycle moments.
//!
//! Each preset composes [`Fade`], [`delay`], [`AnimationGroup`], and
//! [`stagger_offsets`] into the motions a panel plays at mount, close, and
//! request withdrawal. Members are labeled `"item_0"`, `"item_1"`, … in
//! display order; consumers map each member's progress onto the matching
//! row's offset and opacity.

use std::time::Duration;

use super::{AnimationGroup, EasingFn, Fade, StaggerMode, back_in, delay, stagger_offsets};

/// Label for the `i`-th row's member animation.
#[must_use]
pub fn item_label(i: usize) -> String {
    format!("item_{i}")
}

/// Staggered slide-in for a first mount: rows enter top to bottom, each
/// following `easing` (typically back-out, overshooting the resting
/// position).
#[must_use]
pub fn entrance(
    count: usize,
    item_duration: Duration,
    step: Duration,
    easing: EasingFn,
) -> AnimationGroup {
    slide_group(count, item_duration, step, easing, StaggerMode::Forward)
}

/// Reversed-stagger slide-out for closing: the bottom row leaves first,
/// mirroring the entrance. Consumers map `1 - value` onto opacity.
#[must_use]
pub fn exit(
    count: usize,
    item_duration: Duration,
    step: Duration,
    easing: EasingFn,
) -> AnimationGroup {
    slide_group(count, item_duration, step, easing, StaggerMode::Reverse)
}

fn slide_group(
    count: usize,
    item_duration: Duration,
    step: Duration,
    easing: EasingFn,
    mode: StaggerMode,
) -> AnimationGroup {
    let mut group = AnimationGroup::new();
    for (i, offset) in stagger_offsets(count, step, mode).into_iter().enumerate() {
        let anim = delay(offset, Fade::new(item_duration).easing(easing));
        group.insert(&item_label(i), Box::new(anim));
    }
    group
}

/// The brief shrink-away played on a request orbit before the withdrawal
/// write is sent. Consumers map `1 - value` onto scale and opacity.
#[must_use]
pub fn retract(duration: Duration) -> Fade {
    Fade::new(duration).easing(back_in)
}
