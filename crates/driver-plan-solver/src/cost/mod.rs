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

//! Cost evaluation of driver paths.
//!
//! A path is walked shift by shift. Only the part of a path an operation
//! can influence (its relevant range) is walked again to compute the
//! operation's effect; values that depend on the whole path (contract time,
//! shift count excess, satisfaction) are then derived from the stored full
//! values of the path.

mod diff;
mod full;
mod range;
mod walker;

pub use full::Evaluation;
pub(crate) use range::relevant_range;
pub(crate) use walker::PathWalker;

use crate::config::PenaltyConfig;
use crate::satisfaction::driver_satisfaction;
use crate::state::info::DriverInfo;
use driver_plan_model::driver::Driver;
use driver_plan_model::instance::Instance;

/// Values of a range that can only be computed from the whole path.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct PathValues {
    shift_count_amount: i64,
    contract_time_count: i64,
    contract_time_amount: i64,
    satisfaction: f64,
}

/// Evaluates paths of an instance under a set of penalty weights.
#[derive(Debug, Clone, Copy)]
pub struct CostModel<'a> {
    instance: &'a Instance,
    penalties: &'a PenaltyConfig,
}

impl<'a> CostModel<'a> {
    #[inline]
    pub fn new(instance: &'a Instance, penalties: &'a PenaltyConfig) -> Self {
        Self {
            instance,
            penalties,
        }
    }

    #[inline]
    pub fn instance(&self) -> &'a Instance {
        self.instance
    }

    #[inline]
    pub fn penalties(&self) -> &'a PenaltyConfig {
        self.penalties
    }

    pub(crate) fn path_values(&self, driver: &Driver, full: &DriverInfo) -> PathValues {
        let max_shifts = self.instance.rules().driver_max_shift_count as i64;
        let contract = driver
            .as_internal()
            .map_or(0, |d| d.contract_time_violation(full.worked_time));
        PathValues {
            shift_count_amount: (full.shift_count - max_shifts).max(0),
            contract_time_count: i64::from(contract > 0),
            contract_time_amount: contract,
            satisfaction: driver_satisfaction(driver, full),
        }
    }

    /// Stores the whole-path values on `info` and derives penalty and cost.
    pub(crate) fn finish(&self, info: &mut DriverInfo, values: PathValues, penalty_factor: f64) {
        info.penalty.shift_count_amount = values.shift_count_amount;
        info.penalty.contract_time_count = values.contract_time_count;
        info.penalty.contract_time_amount = values.contract_time_amount;
        info.stats.satisfaction = values.satisfaction;
        info.stats.penalty = info.penalty.penalty(self.penalties);
        info.stats.cost = info.stats.raw_cost + info.stats.robustness + penalty_factor * info.stats.penalty;
    }
}
