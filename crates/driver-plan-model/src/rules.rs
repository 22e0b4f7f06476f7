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

//! Labour rules and company rules the planning has to respect.

use driver_plan_core::time::{
    MINUTES_PER_DAY, MINUTES_PER_HOUR, MINUTES_PER_WEEK, Minutes, TimePart, time_in_selected_parts,
};
use serde::{Deserialize, Serialize};

/// Decides whether a shift counts as a night or weekend shift from the time
/// it spends in the relevant parts of the day or week.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum ShiftTypeRule {
    /// At least this many minutes inside the parts.
    MinMinutes(Minutes),
    /// At least this fraction of the shift inside the parts.
    MinFraction(f64),
}

impl ShiftTypeRule {
    #[inline]
    pub fn applies(&self, time_in_parts: Minutes, shift_length: Minutes) -> bool {
        if time_in_parts <= 0 {
            return false;
        }
        match *self {
            ShiftTypeRule::MinMinutes(min) => time_in_parts >= min,
            ShiftTypeRule::MinFraction(fraction) => {
                shift_length > 0 && time_in_parts as f64 >= fraction * shift_length as f64
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RulesConfig {
    /// Length of the planning horizon.
    pub horizon: Minutes,
    /// Granularity of the precomputed shift table.
    pub rounding_step: Minutes,
    /// Expected waiting time up to which two activities form one shift.
    pub shift_waiting_threshold: Minutes,
    pub driver_max_shift_count: u32,

    pub max_main_day_shift_length: Minutes,
    pub max_full_day_shift_length: Minutes,
    pub max_main_night_shift_length: Minutes,
    pub max_full_night_shift_length: Minutes,
    pub min_rest_after_day_shift: Minutes,
    pub min_rest_after_night_shift: Minutes,

    pub hotel_costs: f64,
    pub hotel_max_rest: Minutes,
    /// Extra travel when staying at a hotel, split between both shifts.
    pub hotel_extra_travel_time: Minutes,
    pub hotel_extra_travel_distance: f64,
    pub shared_car_cost_per_km: f64,

    pub single_free_day_min_rest: Minutes,
    pub double_free_day_min_rest: Minutes,

    /// Main shift length above which drivers grow less satisfied.
    pub ideal_shift_length: Minutes,
    /// Rest between shifts below which drivers grow less satisfied.
    pub ideal_rest_time: Minutes,

    /// Default contract range of internal drivers as fractions of their
    /// contract time, used when a driver does not specify one.
    pub min_contract_fraction: f64,
    pub max_contract_fraction: f64,

    /// Parts of a single day, repeated over the horizon.
    pub night_day_parts: Vec<TimePart>,
    pub night_by_law: ShiftTypeRule,
    pub night_by_company: ShiftTypeRule,
    /// Parts of the whole horizon.
    pub weekend_parts: Vec<TimePart>,
    pub weekend_by_company: ShiftTypeRule,
}

impl Default for RulesConfig {
    fn default() -> Self {
        let h = MINUTES_PER_HOUR;
        Self {
            horizon: MINUTES_PER_WEEK,
            rounding_step: 15,
            shift_waiting_threshold: 6 * h,
            driver_max_shift_count: 6,
            max_main_day_shift_length: 10 * h,
            max_full_day_shift_length: 12 * h,
            max_main_night_shift_length: 9 * h,
            max_full_night_shift_length: 10 * h,
            min_rest_after_day_shift: 11 * h,
            min_rest_after_night_shift: 14 * h,
            hotel_costs: 120.0,
            hotel_max_rest: 16 * h,
            hotel_extra_travel_time: 30,
            hotel_extra_travel_distance: 20.0,
            shared_car_cost_per_km: 0.3,
            single_free_day_min_rest: 32 * h,
            double_free_day_min_rest: 56 * h,
            ideal_shift_length: 8 * h,
            ideal_rest_time: 14 * h,
            min_contract_fraction: 0.6,
            max_contract_fraction: 1.4,
            night_day_parts: vec![
                TimePart::new(0, true),
                TimePart::new(6 * h, false),
                TimePart::new(23 * h, true),
                TimePart::new(MINUTES_PER_DAY, false),
            ],
            night_by_law: ShiftTypeRule::MinMinutes(h),
            night_by_company: ShiftTypeRule::MinFraction(0.5),
            weekend_parts: vec![
                TimePart::new(0, false),
                TimePart::new(5 * MINUTES_PER_DAY, true),
                TimePart::new(MINUTES_PER_WEEK, false),
            ],
            weekend_by_company: ShiftTypeRule::MinMinutes(h),
        }
    }
}

impl RulesConfig {
    #[inline]
    pub fn with_horizon(mut self, horizon: Minutes) -> Self {
        self.horizon = horizon;
        self
    }

    #[inline]
    pub fn with_rounding_step(mut self, step: Minutes) -> Self {
        self.rounding_step = step;
        self
    }

    #[inline]
    pub fn with_shift_waiting_threshold(mut self, threshold: Minutes) -> Self {
        self.shift_waiting_threshold = threshold;
        self
    }

    #[inline]
    pub fn with_driver_max_shift_count(mut self, count: u32) -> Self {
        self.driver_max_shift_count = count;
        self
    }

    #[inline]
    pub fn with_ideal_shift_length(mut self, length: Minutes) -> Self {
        self.ideal_shift_length = length;
        self
    }

    #[inline]
    pub fn with_ideal_rest_time(mut self, rest: Minutes) -> Self {
        self.ideal_rest_time = rest;
        self
    }

    #[inline]
    pub fn with_weekend_parts(mut self, parts: Vec<TimePart>) -> Self {
        self.weekend_parts = parts;
        self
    }

    /// Repeats the night day parts over every day touched by `horizon` plus
    /// one spare day for shifts that run past the end.
    pub fn expanded_night_parts(&self) -> Vec<TimePart> {
        let days = self.horizon.max(0) / MINUTES_PER_DAY + 2;
        let mut parts: Vec<TimePart> = (0..days)
            .flat_map(|d| {
                self.night_day_parts
                    .iter()
                    .filter(|p| p.start < MINUTES_PER_DAY)
                    .map(move |p| TimePart::new(d * MINUTES_PER_DAY + p.start, p.selected))
            })
            .collect();
        parts.push(TimePart::new(days * MINUTES_PER_DAY, false));
        parts
    }

    pub fn is_night_by_law(&self, night_minutes: Minutes, length: Minutes) -> bool {
        self.night_by_law.applies(night_minutes, length)
    }

    pub fn is_night_by_company(&self, night_minutes: Minutes, length: Minutes) -> bool {
        self.night_by_company.applies(night_minutes, length)
    }

    pub fn is_weekend_by_company(&self, start: Minutes, end: Minutes) -> bool {
        let weekend_minutes = time_in_selected_parts(start, end, &self.weekend_parts);
        self.weekend_by_company.applies(weekend_minutes, end - start)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_min_minutes_rule() {
        let rule = ShiftTypeRule::MinMinutes(60);
        assert!(rule.applies(60, 480));
        assert!(!rule.applies(59, 480));
        assert!(!ShiftTypeRule::MinMinutes(0).applies(0, 480));
    }

    #[test]
    fn test_min_fraction_rule() {
        let rule = ShiftTypeRule::MinFraction(0.5);
        assert!(rule.applies(240, 480));
        assert!(!rule.applies(239, 480));
        assert!(!rule.applies(10, 0));
    }

    #[test]
    fn test_expanded_night_parts_cover_every_day() {
        let rules = RulesConfig::default().with_horizon(MINUTES_PER_DAY);
        let parts = rules.expanded_night_parts();
        // One day of horizon plus two spare days, each with seven night hours.
        let night = time_in_selected_parts(0, 3 * MINUTES_PER_DAY, &parts);
        assert_eq!(night, 3 * 7 * 60);
    }

    #[test]
    fn test_weekend_detection() {
        let rules = RulesConfig::default();
        let saturday = 5 * MINUTES_PER_DAY;
        assert!(rules.is_weekend_by_company(saturday + 60, saturday + 600));
        assert!(!rules.is_weekend_by_company(60, 600));
    }
}
