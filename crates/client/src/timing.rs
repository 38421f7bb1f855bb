// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Wall-clock budget arithmetic for the wait loops.
//!
//! A `None` deadline or budget means unbounded throughout.

use std::time::{Duration, Instant};

pub(crate) fn deadline_after(timeout: Option<Duration>) -> Option<Instant> {
    timeout.map(|t| Instant::now() + t)
}

/// Budget left before `deadline`; saturates at zero once passed.
pub(crate) fn time_left(deadline: Option<Instant>) -> Option<Duration> {
    deadline.map(|d| d.saturating_duration_since(Instant::now()))
}

pub(crate) fn expired(deadline: Option<Instant>) -> bool {
    matches!(time_left(deadline), Some(left) if left.is_zero())
}

/// How long one blocking notification wait may run.
///
/// Bounded by half the keepalive interval so the foreground wait never
/// starves the heartbeat cadence, and by the remaining budget so the
/// caller's deadline holds. Unbounded only when neither applies.
pub(crate) fn notification_wait_slice(
    remaining: Option<Duration>,
    keepalive: Option<Duration>,
) -> Option<Duration> {
    match (remaining, keepalive) {
        (None, None) => None,
        (Some(left), None) => Some(left),
        (None, Some(interval)) => Some(interval / 2),
        (Some(left), Some(interval)) => Some(left.min(interval / 2)),
    }
}

#[cfg(test)]
#[path = "timing_tests.rs"]
mod tests;
