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

//! Precomputed facts about every possible main shift.
//!
//! A main shift is the part of a shift between the start of its first
//! activity and the end of its last one (hotel travel included, own-car
//! travel from and to home excluded). Start and end are rounded to the
//! table's step so that lookups during the search are plain indexing.

use crate::common::SalaryIndex;
use crate::rules::RulesConfig;
use crate::salary::{SalarySettings, salary_in_range};
use driver_plan_core::time::{MINUTES_PER_DAY, Minutes, time_in_selected_parts};

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct DriverTypeShiftInfo {
    /// Paid length, at least the salary's minimum paid shift time.
    pub paid_length: Minutes,
    pub cost: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct MainShiftInfo {
    pub length: Minutes,
    pub max_full_length: Minutes,
    pub min_rest_after: Minutes,
    pub main_length_violation: Minutes,
    pub night_by_law: bool,
    pub night_by_company: bool,
    pub weekend_by_company: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ShiftTable {
    step: Minutes,
    size: usize,
    type_count: usize,
    infos: Vec<MainShiftInfo>,
    by_type: Vec<DriverTypeShiftInfo>,
}

impl ShiftTable {
    /// Builds the table for all rounded `(start, end)` pairs with
    /// `start <= end` inside the horizon plus one spare day.
    pub fn build(rules: &RulesConfig, salaries: &[SalarySettings]) -> Self {
        let step = rules.rounding_step.max(1);
        let size = ((rules.horizon.max(0) + MINUTES_PER_DAY) / step) as usize + 1;
        let type_count = salaries.len();

        let night_parts = rules.expanded_night_parts();
        let salary_blocks: Vec<_> = salaries
            .iter()
            .map(|s| s.processed_blocks(rules.horizon, &rules.weekend_parts))
            .collect();

        let mut infos = vec![MainShiftInfo::default(); size * size];
        let mut by_type = vec![DriverTypeShiftInfo::default(); size * size * type_count];

        for s in 0..size {
            let start = s as Minutes * step;
            for e in s..size {
                let end = e as Minutes * step;
                let length = end - start;

                let night_minutes = time_in_selected_parts(start, end, &night_parts);
                let night_by_law = rules.is_night_by_law(night_minutes, length);
                let (max_main, max_full, min_rest) = if night_by_law {
                    (
                        rules.max_main_night_shift_length,
                        rules.max_full_night_shift_length,
                        rules.min_rest_after_night_shift,
                    )
                } else {
                    (
                        rules.max_main_day_shift_length,
                        rules.max_full_day_shift_length,
                        rules.min_rest_after_day_shift,
                    )
                };

                let slot = s * size + e;
                infos[slot] = MainShiftInfo {
                    length,
                    max_full_length: max_full,
                    min_rest_after: min_rest,
                    main_length_violation: (length - max_main).max(0),
                    night_by_law,
                    night_by_company: rules.is_night_by_company(night_minutes, length),
                    weekend_by_company: rules.is_weekend_by_company(start, end),
                };

                for (t, (settings, blocks)) in salaries.iter().zip(&salary_blocks).enumerate() {
                    let paid_length = length.max(settings.min_paid_shift_time);
                    by_type[slot * type_count + t] = DriverTypeShiftInfo {
                        paid_length,
                        cost: salary_in_range(blocks, start, start + paid_length),
                    };
                }
            }
        }

        Self {
            step,
            size,
            type_count,
            infos,
            by_type,
        }
    }

    #[inline]
    pub fn step(&self) -> Minutes {
        self.step
    }

    /// Number of rounded time points per axis.
    #[inline]
    pub fn size(&self) -> usize {
        self.size
    }

    #[inline]
    fn rounded(&self, time: Minutes) -> usize {
        let slot = (time + self.step / 2).div_euclid(self.step);
        slot.clamp(0, self.size as Minutes - 1) as usize
    }

    #[inline]
    fn slot(&self, start: Minutes, end: Minutes) -> usize {
        let s = self.rounded(start);
        let e = self.rounded(end).max(s);
        s * self.size + e
    }

    #[inline]
    pub fn main_info(&self, start: Minutes, end: Minutes) -> &MainShiftInfo {
        &self.infos[self.slot(start, end)]
    }

    #[inline]
    pub fn type_info(&self, start: Minutes, end: Minutes, salary: SalaryIndex) -> &DriverTypeShiftInfo {
        &self.by_type[self.slot(start, end) * self.type_count + salary.index()]
    }

    #[inline]
    pub fn lookup(
        &self,
        start: Minutes,
        end: Minutes,
        salary: SalaryIndex,
    ) -> (&MainShiftInfo, &DriverTypeShiftInfo) {
        let slot = self.slot(start, end);
        (
            &self.infos[slot],
            &self.by_type[slot * self.type_count + salary.index()],
        )
    }
}
