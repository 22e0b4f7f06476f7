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

//! Local moves of the search and their incremental effect.

use crate::config::OperationWeights;
use crate::cost::CostModel;
use crate::state::assignment::Assignment;
use crate::state::info::{DriverInfo, ExternalTypeInfo, TotalInfo};
use crate::state::search_state::SearchState;
use driver_plan_model::common::{ActivityIndex, DriverIndex, ExternalTypeIndex};
use driver_plan_model::instance::Instance;
use rand::Rng;
use smallvec::SmallVec;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    /// Moves an activity to a driver, taking it from its current one.
    Assign {
        activity: ActivityIndex,
        driver: DriverIndex,
    },
    Unassign {
        activity: ActivityIndex,
    },
    /// Exchanges the drivers of two activities.
    Swap {
        first: ActivityIndex,
        second: ActivityIndex,
    },
    /// Flips whether the driver stays at a hotel after the activity.
    ToggleHotel {
        activity: ActivityIndex,
    },
}

impl Operation {
    /// Effect of the operation on `state`, without changing it.
    pub fn cost_diff(&self, model: &CostModel<'_>, state: &SearchState) -> OperationDiff {
        match *self {
            Operation::Assign { activity, driver } => model.assign_diff(state, activity, driver),
            Operation::Unassign { activity } => model.unassign_diff(state, activity),
            Operation::Swap { first, second } => model.swap_diff(state, first, second),
            Operation::ToggleHotel { activity } => model.toggle_hotel_diff(state, activity),
        }
    }

    /// Performs the operation; `diff` must be its cost diff on `state`.
    pub fn execute(&self, state: &mut SearchState, diff: &OperationDiff) {
        let assignment = state.assignment_mut();
        match *self {
            Operation::Assign { activity, driver } => assignment.assign(activity, driver),
            Operation::Unassign { activity } => assignment.unassign(activity),
            Operation::Swap { first, second } => assignment.swap(first, second),
            Operation::ToggleHotel { activity } => assignment.toggle_hotel_after(activity),
        }
        state.apply_diff(diff);
    }

    /// Whether the operation leaves every driver path unchanged.
    pub fn is_noop(&self, assignment: &Assignment) -> bool {
        match *self {
            Operation::Assign { activity, driver } => assignment.driver_of(activity) == Some(driver),
            Operation::Unassign { activity } | Operation::ToggleHotel { activity } => {
                assignment.driver_of(activity).is_none()
            }
            Operation::Swap { first, second } => {
                assignment.driver_of(first) == assignment.driver_of(second)
            }
        }
    }
}

impl std::fmt::Display for Operation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Operation::Assign { activity, driver } => write!(f, "Assign({activity} -> {driver})"),
            Operation::Unassign { activity } => write!(f, "Unassign({activity})"),
            Operation::Swap { first, second } => write!(f, "Swap({first} <-> {second})"),
            Operation::ToggleHotel { activity } => write!(f, "ToggleHotel({activity})"),
        }
    }
}

/// Change of every aggregate caused by one operation.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct OperationDiff {
    drivers: SmallVec<[(DriverIndex, DriverInfo); 2]>,
    external_types: SmallVec<[(ExternalTypeIndex, ExternalTypeInfo); 2]>,
    total: TotalInfo,
    satisfaction: f64,
}

impl OperationDiff {
    pub(crate) fn new(
        drivers: SmallVec<[(DriverIndex, DriverInfo); 2]>,
        external_types: SmallVec<[(ExternalTypeIndex, ExternalTypeInfo); 2]>,
        total: TotalInfo,
        satisfaction: f64,
    ) -> Self {
        Self {
            drivers,
            external_types,
            total,
            satisfaction,
        }
    }

    #[inline]
    pub fn drivers(&self) -> &[(DriverIndex, DriverInfo)] {
        &self.drivers
    }

    #[inline]
    pub fn external_types(&self) -> &[(ExternalTypeIndex, ExternalTypeInfo)] {
        &self.external_types
    }

    #[inline]
    pub fn total(&self) -> &TotalInfo {
        &self.total
    }

    #[inline]
    pub fn cost(&self) -> f64 {
        self.total.stats.cost
    }

    #[inline]
    pub fn raw_cost(&self) -> f64 {
        self.total.stats.raw_cost
    }

    #[inline]
    pub fn robustness(&self) -> f64 {
        self.total.stats.robustness
    }

    #[inline]
    pub fn penalty(&self) -> f64 {
        self.total.stats.penalty
    }

    /// Change of the fleet satisfaction.
    #[inline]
    pub fn satisfaction(&self) -> f64 {
        self.satisfaction
    }

    #[inline]
    pub fn worked_time(&self) -> i64 {
        self.total.worked_time
    }

    #[inline]
    pub fn shift_count(&self) -> i64 {
        self.total.shift_count
    }

    #[inline]
    pub fn is_zero(&self) -> bool {
        self.drivers.is_empty() && self.external_types.is_empty()
    }
}

/// Attempts to find a swap partner with a different driver.
const SWAP_ATTEMPTS: usize = 8;

/// Draws random operations according to [`OperationWeights`].
#[derive(Debug, Clone)]
pub struct OperationGenerator {
    /// Cumulative, normalised weights of assign internal, assign external
    /// and swap; the rest is hotel toggling.
    thresholds: [f64; 3],
    internal: std::ops::Range<usize>,
    external: std::ops::Range<usize>,
    activity_count: usize,
}

impl OperationGenerator {
    pub fn new(instance: &Instance, weights: &OperationWeights) -> Self {
        let internal_count = instance.internal_driver_count();
        let driver_count = instance.driver_count();
        let w = [
            weights.assign_internal.max(0.0),
            weights.assign_external.max(0.0),
            weights.swap.max(0.0),
            weights.toggle_hotel.max(0.0),
        ];
        let sum: f64 = w.iter().sum();
        let thresholds = if sum > 0.0 {
            [w[0] / sum, (w[0] + w[1]) / sum, (w[0] + w[1] + w[2]) / sum]
        } else {
            [1.0, 1.0, 1.0]
        };
        // An empty pool falls back to all drivers.
        let pool = |range: std::ops::Range<usize>| {
            if range.is_empty() { 0..driver_count } else { range }
        };
        Self {
            thresholds,
            internal: pool(0..internal_count),
            external: pool(internal_count..driver_count),
            activity_count: instance.activity_count(),
        }
    }

    pub fn generate<R: Rng>(&self, assignment: &Assignment, rng: &mut R) -> Operation {
        let activity = ActivityIndex::new(rng.random_range(0..self.activity_count));
        let current = assignment.driver_of(activity);
        let r: f64 = rng.random();
        if r < self.thresholds[0] {
            Operation::Assign {
                activity,
                driver: DriverIndex::new(draw_other(rng, self.internal.clone(), current.map(|d| d.index()))),
            }
        } else if r < self.thresholds[1] {
            Operation::Assign {
                activity,
                driver: DriverIndex::new(draw_other(rng, self.external.clone(), current.map(|d| d.index()))),
            }
        } else if r < self.thresholds[2] && self.activity_count > 1 {
            let mut second = ActivityIndex::new(0);
            for _ in 0..SWAP_ATTEMPTS {
                second = ActivityIndex::new(draw_other(rng, 0..self.activity_count, Some(activity.index())));
                if assignment.driver_of(second) != current {
                    break;
                }
            }
            Operation::Swap {
                first: activity,
                second,
            }
        } else {
            Operation::ToggleHotel { activity }
        }
    }
}

/// Uniform draw from `range` that avoids `exclude` when it lies inside and
/// the range has another element, by remapping instead of rejecting.
fn draw_other<R: Rng>(rng: &mut R, range: std::ops::Range<usize>, exclude: Option<usize>) -> usize {
    match exclude {
        Some(x) if range.contains(&x) && range.len() > 1 => {
            let k = rng.random_range(range.start..range.end - 1);
            if k >= x { k + 1 } else { k }
        }
        _ => rng.random_range(range),
    }
}
