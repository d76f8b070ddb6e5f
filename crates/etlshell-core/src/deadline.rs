//! Task deadline planning fields
//!
//! Deadline time and duration are stored as decimal hours (`9.5` is 09:30,
//! `1.25` is one hour fifteen). Every create or write of a task runs its
//! change through `apply_deadline_change` so that stored values are always
//! normalised and the derived display fields stay in step.

use serde::{Deserialize, Serialize};

/// Deadline fields of a task as stored
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DeadlinePlan {
    /// Time of day the deadline falls on, 24h decimal hours
    pub time_deadline: Option<f64>,
    /// Lead or follow time around the deadline, decimal hours
    pub duration_deadline: Option<f64>,
    /// `H:MM` rendering of `time_deadline`
    pub time_deadline_display: Option<String>,
    pub duration_deadline_minutes: Option<i64>,
}

/// Fields being written; `None` leaves the stored value alone
///
/// `Some(0.0)` clears the field.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct DeadlineChange {
    pub time_deadline: Option<f64>,
    pub duration_deadline: Option<f64>,
}

const MAX_HOURS: f64 = (i64::MAX / 60) as f64;

/// A validated deadline value
#[derive(Debug, Clone, PartialEq)]
pub struct Normalised {
    pub hours: f64,
    /// `H:MM`, set for a time of day
    pub display: Option<String>,
    /// Whole minutes, set for a duration
    pub minutes: Option<i64>,
}

/// Validate a decimal-hours value
///
/// Returns `None` for zero, non-finite, or out-of-range values (a time of
/// day past 23:59, or a duration whose minutes do not fit an `i64`).
/// Minutes are truncated, not rounded.
pub fn check(value: f64, as_duration: bool) -> Option<Normalised> {
    if value == 0.0 || !value.is_finite() || value.abs() >= MAX_HOURS {
        return None;
    }

    let minutes = (value.fract().abs() * 60.0) as i64;
    let hours = value.trunc().abs() as i64;
    if minutes > 59 {
        return None;
    }

    let (display, total_minutes) = if as_duration {
        (None, Some(hours.checked_mul(60)?.checked_add(minutes)?))
    } else {
        if hours > 23 {
            return None;
        }
        (Some(format!("{}:{:02}", hours, minutes)), None)
    };

    let fraction = ((minutes as f64 / 60.0) * 100.0).round() / 100.0;
    Some(Normalised {
        hours: hours as f64 + fraction,
        display,
        minutes: total_minutes,
    })
}

/// Apply a write to a task's deadline fields
///
/// - a changed time is normalised; an invalid or zero time clears the time
///   and its display
/// - a changed duration is normalised only while a deadline time is in
///   effect (the new one if it is being changed, else the stored one);
///   otherwise the duration and its minutes are cleared
pub fn apply_deadline_change(current: &DeadlinePlan, change: &DeadlineChange) -> DeadlinePlan {
    let mut next = current.clone();

    if let Some(time) = change.time_deadline {
        match check(time, false) {
            Some(n) => {
                next.time_deadline = Some(n.hours);
                next.time_deadline_display = n.display;
            }
            None => {
                next.time_deadline = None;
                next.time_deadline_display = None;
            }
        }
    }

    if let Some(duration) = change.duration_deadline {
        let normalised = next
            .time_deadline
            .and_then(|_| check(duration, true));
        match normalised {
            Some(n) => {
                next.duration_deadline = Some(n.hours);
                next.duration_deadline_minutes = n.minutes;
            }
            None => {
                next.duration_deadline = None;
                next.duration_deadline_minutes = None;
            }
        }
    }

    next
}
