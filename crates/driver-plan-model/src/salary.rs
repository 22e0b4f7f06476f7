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

use driver_plan_core::time::{MINUTES_PER_DAY, MINUTES_PER_HOUR, Minutes, TimePart, TimeRange};
use serde::{Deserialize, Serialize};

/// A salary rate that applies from `start` until the next block starts.
///
/// Rates are money per minute. A shift that starts inside a block keeps at
/// least that block's `continuing_rate` for its whole length.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SalaryRateBlock {
    pub start: Minutes,
    pub rate: f64,
    pub continuing_rate: f64,
}

impl SalaryRateBlock {
    pub const fn new(start: Minutes, rate: f64, continuing_rate: f64) -> Self {
        Self {
            start,
            rate,
            continuing_rate,
        }
    }
}

/// Salary settings of one driver type.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SalarySettings {
    /// Blocks of a weekday, `start` relative to midnight.
    pub weekday_blocks: Vec<SalaryRateBlock>,
    pub weekend_rate: f64,
    pub min_paid_shift_time: Minutes,
}

impl SalarySettings {
    pub fn new(
        weekday_blocks: Vec<SalaryRateBlock>,
        weekend_rate: f64,
        min_paid_shift_time: Minutes,
    ) -> Self {
        Self {
            weekday_blocks,
            weekend_rate,
            min_paid_shift_time,
        }
    }

    /// Flat rate for every minute of the week.
    pub fn flat(rate: f64, min_paid_shift_time: Minutes) -> Self {
        Self::new(vec![SalaryRateBlock::new(0, rate, 0.0)], rate, min_paid_shift_time)
    }

    /// Day rate with evening and night surcharges.
    pub fn standard() -> Self {
        let h = MINUTES_PER_HOUR;
        Self::new(
            vec![
                SalaryRateBlock::new(0, 0.7, 0.0),
                SalaryRateBlock::new(6 * h, 0.5, 0.0),
                SalaryRateBlock::new(19 * h, 0.6, 0.0),
                SalaryRateBlock::new(22 * h, 0.7, 0.7),
            ],
            0.8,
            4 * h,
        )
    }

    /// Expands the weekday blocks over `horizon` plus one spare day, using
    /// the weekend rate inside selected `weekend` parts. The returned blocks
    /// are absolute and end with a zero-rate sentinel.
    pub fn processed_blocks(&self, horizon: Minutes, weekend: &[TimePart]) -> Vec<SalaryRateBlock> {
        let mut weekday = self.weekday_blocks.clone();
        weekday.sort_by_key(|b| b.start);
        let Some(last_weekday) = weekday.last().copied() else {
            return Vec::new();
        };

        let days = horizon.max(0) / MINUTES_PER_DAY + 2;
        let end = days * MINUTES_PER_DAY;

        let mut boundaries: Vec<Minutes> = (0..days)
            .flat_map(|d| weekday.iter().map(move |b| d * MINUTES_PER_DAY + b.start))
            .chain(weekend.iter().map(|p| p.start))
            .filter(|t| (0..end).contains(t))
            .collect();
        boundaries.push(0);
        boundaries.sort_unstable();
        boundaries.dedup();

        let mut blocks: Vec<SalaryRateBlock> = boundaries
            .into_iter()
            .map(|t| {
                let time_of_day = t.rem_euclid(MINUTES_PER_DAY);
                let active = weekday
                    .iter()
                    .rev()
                    .find(|b| b.start <= time_of_day)
                    .copied()
                    .unwrap_or(last_weekday);
                let in_weekend = weekend
                    .iter()
                    .rev()
                    .find(|p| p.start <= t)
                    .is_some_and(|p| p.selected);
                let rate = if in_weekend {
                    self.weekend_rate
                } else {
                    active.rate
                };
                SalaryRateBlock::new(t, rate, active.continuing_rate)
            })
            .collect();
        blocks.push(SalaryRateBlock::new(end, 0.0, 0.0));
        blocks
    }
}

impl Default for SalarySettings {
    fn default() -> Self {
        Self::standard()
    }
}

/// Salary for working `[start, end)` given processed blocks.
pub fn salary_in_range(blocks: &[SalaryRateBlock], start: Minutes, end: Minutes) -> f64 {
    let shift = TimeRange::new(start, end);
    let mut continuing: Option<f64> = None;
    let mut cost = 0.0;
    for pair in blocks.windows(2) {
        let minutes = shift.overlap_len(pair[0].start, pair[1].start);
        if minutes == 0 {
            continue;
        }
        let floor = *continuing.get_or_insert(pair[0].continuing_rate);
        cost += minutes as f64 * pair[0].rate.max(floor);
    }
    cost
}
