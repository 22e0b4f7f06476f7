// Copyright (c) 2025 Felix Kahle.
//
// Permission is hereby granted, free of charge, to any person obtaining
// a copy of this software and associated documentation files (the
// "Software"), to deal in the Software without restriction, including
// without limitation the rights to use, copy, modify, merge, publish,
// distribute, sublicense, and/or sell copies of the Software, and to
// permit persons to whom the Software is furnished to do so, subject to
// the following conditions:
//
// The above copyright notice and this permission notice shall be
// included in all copies or substantial portions of the Software.
//
// THE SOFTWARE IS PROVIDED "AS IS", WITHOUT WARRANTY OF ANY KIND,
// EXPRESS OR IMPLIED, INCLUDING BUT NOT LIMITED TO THE WARRANTIES OF
// MERCHANTABILITY, FITNESS FOR A PARTICULAR PURPOSE AND
// NONINFRINGEMENT. IN NO EVENT SHALL THE AUTHORS OR COPYRIGHT HOLDERS BE
// LIABLE FOR ANY CLAIM, DAMAGES OR OTHER LIABILITY, WHETHER IN AN ACTION
// OF CONTRACT, TORT OR OTHERWISE, ARISING FROM, OUT OF OR IN CONNECTION
// WITH THE SOFTWARE OR THE USE OR OTHER DEALINGS IN THE SOFTWARE.

//! Minute based time primitives.
//!
//! All times in the planning model are integer minutes relative to the
//! start of the planning horizon (Monday 00:00 of the planned week).

use serde::{Deserialize, Serialize};

pub type Minutes = i32;

pub const MINUTES_PER_HOUR: Minutes = 60;
pub const MINUTES_PER_DAY: Minutes = 24 * MINUTES_PER_HOUR;
pub const MINUTES_PER_WEEK: Minutes = 7 * MINUTES_PER_DAY;

/// Half-open interval `[start, end)` in minutes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TimeRange {
    start: Minutes,
    end: Minutes,
}

impl TimeRange {
    /// Creates a range, swapping the bounds if they are given in reverse.
    #[inline]
    pub fn new(start: Minutes, end: Minutes) -> Self {
        if end < start {
            Self {
                start: end,
                end: start,
            }
        } else {
            Self { start, end }
        }
    }

    #[inline]
    pub fn start(&self) -> Minutes {
        self.start
    }

    #[inline]
    pub fn end(&self) -> Minutes {
        self.end
    }

    #[inline]
    pub fn len(&self) -> Minutes {
        self.end - self.start
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.end == self.start
    }

    #[inline]
    pub fn contains(&self, time: Minutes) -> bool {
        self.start <= time && time < self.end
    }

    #[inline]
    pub fn overlaps(&self, other: &TimeRange) -> bool {
        self.start < other.end && other.start < self.end
    }

    /// Length of the intersection with `[start, end)`, never negative.
    #[inline]
    pub fn overlap_len(&self, start: Minutes, end: Minutes) -> Minutes {
        (self.end.min(end) - self.start.max(start)).max(0)
    }

    #[inline]
    pub fn shifted(&self, offset: Minutes) -> Self {
        Self {
            start: self.start + offset,
            end: self.end + offset,
        }
    }
}

impl std::fmt::Display for TimeRange {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}, {})", self.start, self.end)
    }
}

/// Boundary of a partition of the horizon.
///
/// A sorted slice of parts partitions time: part `i` covers
/// `[parts[i].start, parts[i + 1].start)`. The last entry only marks the end
/// of the partition and its flag is ignored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TimePart {
    pub start: Minutes,
    pub selected: bool,
}

impl TimePart {
    #[inline]
    pub const fn new(start: Minutes, selected: bool) -> Self {
        Self { start, selected }
    }
}

/// Minutes of `[start, end)` that fall into selected parts.
pub fn time_in_selected_parts(start: Minutes, end: Minutes, parts: &[TimePart]) -> Minutes {
    let range = TimeRange::new(start, end);
    parts
        .windows(2)
        .filter(|w| w[0].selected)
        .map(|w| range.overlap_len(w[0].start, w[1].start))
        .sum()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_orders_bounds() {
        let r = TimeRange::new(50, 10);
        assert_eq!(r.start(), 10);
        assert_eq!(r.end(), 50);
        assert_eq!(r.len(), 40);
    }

    #[test]
    fn test_overlap_len() {
        let r = TimeRange::new(100, 200);
        assert_eq!(r.overlap_len(150, 300), 50);
        assert_eq!(r.overlap_len(0, 100), 0);
        assert_eq!(r.overlap_len(300, 400), 0);
        assert_eq!(r.overlap_len(0, 1000), 100);
    }

    #[test]
    fn test_contains_and_overlaps_are_half_open() {
        let a = TimeRange::new(0, 10);
        let b = TimeRange::new(10, 20);
        assert!(a.contains(0));
        assert!(!a.contains(10));
        assert!(!a.overlaps(&b));
        assert!(a.overlaps(&TimeRange::new(9, 11)));
    }

    #[test]
    fn test_time_in_selected_parts() {
        // Night from 0 to 6h and from 22h to 24h.
        let parts = [
            TimePart::new(0, true),
            TimePart::new(6 * 60, false),
            TimePart::new(22 * 60, true),
            TimePart::new(MINUTES_PER_DAY, false),
        ];
        assert_eq!(time_in_selected_parts(5 * 60, 7 * 60, &parts), 60);
        assert_eq!(time_in_selected_parts(21 * 60, 24 * 60, &parts), 120);
        assert_eq!(time_in_selected_parts(8 * 60, 20 * 60, &parts), 0);
    }

    #[test]
    fn test_display() {
        assert_eq!(TimeRange::new(1, 2).to_string(), "[1, 2)");
    }
}
