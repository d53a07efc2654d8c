// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Half-open UTC interval algebra.
//!
//! Every interval is `[start, end)`. Two intervals that merely touch
//! (`a.end == b.start`) do not intersect, so subtracting a touching
//! interval leaves the original unchanged.

use crate::civil_time::{CivilTimezone, local_day_to_utc_window};
use crate::error::DomainError;
use chrono::{DateTime, Duration, NaiveDate, Utc};
use serde::Serialize;

/// A half-open range of UTC instants.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct Interval {
    start: DateTime<Utc>,
    end: DateTime<Utc>,
}

impl Interval {
    /// Creates a new interval.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::InvalidInterval` if `end` is before `start`.
    pub fn new(start: DateTime<Utc>, end: DateTime<Utc>) -> Result<Self, DomainError> {
        if end < start {
            return Err(DomainError::InvalidInterval {
                start: start.to_rfc3339(),
                end: end.to_rfc3339(),
            });
        }
        Ok(Self { start, end })
    }

    /// Creates the interval spanning two instants, ordering them first.
    #[must_use]
    pub fn spanning(a: DateTime<Utc>, b: DateTime<Utc>) -> Self {
        if a <= b {
            Self { start: a, end: b }
        } else {
            Self { start: b, end: a }
        }
    }

    /// Creates an interval of `duration` starting at `start`.
    ///
    /// # Errors
    ///
    /// Returns an error if the duration is negative or the end overflows.
    pub fn starting_at(start: DateTime<Utc>, duration: Duration) -> Result<Self, DomainError> {
        let end = start
            .checked_add_signed(duration)
            .ok_or_else(|| DomainError::DateArithmeticOverflow {
                operation: format!("adding {duration} to {start}"),
            })?;
        Self::new(start, end)
    }

    #[must_use]
    pub const fn start(&self) -> DateTime<Utc> {
        self.start
    }

    #[must_use]
    pub const fn end(&self) -> DateTime<Utc> {
        self.end
    }

    #[must_use]
    pub fn duration(&self) -> Duration {
        self.end - self.start
    }

    /// Returns true if the interval contains no instants.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.start >= self.end
    }

    /// Returns true if the two intervals share at least one instant.
    ///
    /// Empty intervals never overlap anything.
    #[must_use]
    pub fn overlaps(&self, other: &Self) -> bool {
        !self.is_empty() && !other.is_empty() && self.start < other.end && other.start < self.end
    }

    /// Returns true if `other` lies entirely inside this interval.
    ///
    /// An empty `other` is contained when its instant is inside `[start, end)`.
    #[must_use]
    pub fn contains(&self, other: &Self) -> bool {
        if other.is_empty() {
            return self.start <= other.start && other.start < self.end;
        }
        self.start <= other.start && other.end <= self.end
    }

    /// Returns the common part of two intervals, if any.
    #[must_use]
    pub fn intersection(&self, other: &Self) -> Option<Self> {
        let start = self.start.max(other.start);
        let end = self.end.min(other.end);
        (start < end).then_some(Self { start, end })
    }
}

/// Merges a list of intervals into sorted, disjoint, non-touching intervals.
///
/// Empty intervals are discarded.
#[must_use]
pub fn union(intervals: &[Interval]) -> Vec<Interval> {
    let mut sorted: Vec<Interval> = intervals.iter().copied().filter(|i| !i.is_empty()).collect();
    sorted.sort();

    let mut merged: Vec<Interval> = Vec::with_capacity(sorted.len());
    for interval in sorted {
        if let Some(last) = merged.last_mut()
            && interval.start <= last.end
        {
            last.end = last.end.max(interval.end);
            continue;
        }
        merged.push(interval);
    }
    merged
}

/// Removes every `busy` instant from the `available` intervals.
///
/// Each available interval is processed independently so branch or template
/// boundaries between adjacent available intervals are preserved. The result
/// is ordered by start.
#[must_use]
pub fn subtract(available: &[Interval], busy: &[Interval]) -> Vec<Interval> {
    let busy = union(busy);
    let mut base: Vec<Interval> = available
        .iter()
        .copied()
        .filter(|i| !i.is_empty())
        .collect();
    base.sort();

    let mut result = Vec::new();
    for b in base {
        let mut current_start = b.start;
        for r in busy.iter().skip_while(|r| r.end <= b.start) {
            if r.start >= b.end {
                break;
            }
            if r.start > current_start {
                result.push(Interval {
                    start: current_start,
                    end: r.start,
                });
            }
            current_start = current_start.max(r.end);
        }
        if current_start < b.end {
            result.push(Interval {
                start: current_start,
                end: b.end,
            });
        }
    }
    result
}

/// Returns the parts of `a` that are also covered by `b`.
///
/// Intervals of `a` stay separate; the result is ordered by start.
#[must_use]
pub fn intersect(a: &[Interval], b: &[Interval]) -> Vec<Interval> {
    let b = union(b);
    let mut result: Vec<Interval> = a
        .iter()
        .flat_map(|x| b.iter().filter_map(move |y| x.intersection(y)))
        .collect();
    result.sort();
    result
}

/// Clips an interval to the UTC window of a local civil date.
///
/// Returns `None` when nothing of the interval falls on that date, or the
/// date is out of range.
#[must_use]
pub fn clamp_to_day(interval: &Interval, date: NaiveDate, tz: &CivilTimezone) -> Option<Interval> {
    let day = local_day_to_utc_window(date, tz).ok()?;
    interval.intersection(&day)
}
