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

use driver_plan_core::time::MINUTES_PER_HOUR;
use serde::{Deserialize, Serialize};

/// Weights turning constraint violations into a penalty.
///
/// `*_per_minute` weights apply to the violated amount, the others to the
/// number of violations.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PenaltyConfig {
    pub precedence: f64,
    pub shift_length: f64,
    pub shift_length_per_minute: f64,
    pub rest_time: f64,
    pub rest_time_per_minute: f64,
    pub contract_time: f64,
    pub contract_time_per_minute: f64,
    pub internal_shift_count_per_shift: f64,
    pub external_shift_count_per_shift: f64,
    pub invalid_hotel: f64,
    pub availability: f64,
    pub qualification: f64,
}

impl Default for PenaltyConfig {
    fn default() -> Self {
        let per_hour = 200.0 / MINUTES_PER_HOUR as f64;
        Self {
            precedence: 5000.0,
            shift_length: 1000.0,
            shift_length_per_minute: per_hour,
            rest_time: 1000.0,
            rest_time_per_minute: per_hour,
            contract_time: 1000.0,
            contract_time_per_minute: per_hour,
            internal_shift_count_per_shift: 1000.0,
            external_shift_count_per_shift: 1000.0,
            invalid_hotel: 2000.0,
            availability: 5000.0,
            qualification: 5000.0,
        }
    }
}

/// Relative frequency of each operation kind.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct OperationWeights {
    pub assign_internal: f64,
    pub assign_external: f64,
    pub swap: f64,
    pub toggle_hotel: f64,
}

impl Default for OperationWeights {
    fn default() -> Self {
        Self {
            assign_internal: 0.5,
            assign_external: 0.1,
            swap: 0.25,
            toggle_hotel: 0.15,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum InitialAssignment {
    /// Every activity to a uniformly drawn driver.
    #[default]
    Uniform,
    /// Every activity to the first shuffled internal driver whose previous
    /// activity it can follow, then external drivers, else a random driver.
    Greedy,
}

/// Restarts the cooling schedule once the temperature has dropped far enough.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CycleConfig {
    pub end_temperature: f64,
    /// A cycle that has not reached a feasible plan ends once the
    /// temperature drops below this.
    #[serde(default)]
    pub early_end_temperature: f64,
    pub min_restart_temperature: f64,
    pub max_restart_temperature: f64,
    /// Probability of also starting over from a fresh initial assignment.
    pub full_reset_probability: f64,
}

impl Default for CycleConfig {
    fn default() -> Self {
        Self {
            end_temperature: 1.0,
            early_end_temperature: 50.0,
            min_restart_temperature: 300.0,
            max_restart_temperature: 1500.0,
            full_reset_probability: 0.05,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AnnealingConfig {
    pub initial_temperature: f64,
    pub temperature_reduction: f64,
    /// Iterations between temperature and penalty factor updates.
    pub schedule_interval: u64,
    pub initial_penalty_factor: f64,
    pub penalty_increment: f64,
    /// Iterations between full re-evaluations of the current state.
    pub resync_interval: u64,
    /// Iterations between progress callbacks to the coordinator.
    pub callback_interval: u64,
    /// Penalty below which a state counts as feasible.
    pub feasibility_threshold: f64,
    pub operation_weights: OperationWeights,
    /// Range the per-cycle satisfaction factor is drawn from.
    pub min_satisfaction_factor: f64,
    pub max_satisfaction_factor: f64,
    pub cycle: Option<CycleConfig>,
    pub initial_assignment: InitialAssignment,
}

impl Default for AnnealingConfig {
    fn default() -> Self {
        Self {
            initial_temperature: 1500.0,
            temperature_reduction: 0.997,
            schedule_interval: 50_000,
            initial_penalty_factor: 0.001,
            penalty_increment: 0.001,
            resync_interval: 100_000,
            callback_interval: 10_000,
            feasibility_threshold: 0.01,
            operation_weights: OperationWeights::default(),
            min_satisfaction_factor: 0.0,
            max_satisfaction_factor: 0.0,
            cycle: None,
            initial_assignment: InitialAssignment::Uniform,
        }
    }
}

impl AnnealingConfig {
    #[inline]
    pub fn with_initial_temperature(mut self, temperature: f64) -> Self {
        self.initial_temperature = temperature;
        self
    }

    #[inline]
    pub fn with_schedule(mut self, interval: u64, reduction: f64) -> Self {
        self.schedule_interval = interval;
        self.temperature_reduction = reduction;
        self
    }

    #[inline]
    pub fn with_penalty_schedule(mut self, initial: f64, increment: f64) -> Self {
        self.initial_penalty_factor = initial;
        self.penalty_increment = increment;
        self
    }

    #[inline]
    pub fn with_resync_interval(mut self, interval: u64) -> Self {
        self.resync_interval = interval;
        self
    }

    #[inline]
    pub fn with_callback_interval(mut self, interval: u64) -> Self {
        self.callback_interval = interval;
        self
    }

    #[inline]
    pub fn with_satisfaction_factor_range(mut self, min: f64, max: f64) -> Self {
        self.min_satisfaction_factor = min;
        self.max_satisfaction_factor = max;
        self
    }

    #[inline]
    pub fn with_cycle(mut self, cycle: CycleConfig) -> Self {
        self.cycle = Some(cycle);
        self
    }

    #[inline]
    pub fn with_initial_assignment(mut self, initial: InitialAssignment) -> Self {
        self.initial_assignment = initial;
        self
    }

    #[inline]
    pub fn with_operation_weights(mut self, weights: OperationWeights) -> Self {
        self.operation_weights = weights;
        self
    }
}
