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

use crate::cost::CostModel;
use crate::operation::OperationDiff;
use crate::state::assignment::Assignment;
use crate::state::info::{DriverInfo, ExternalTypeInfo, TotalInfo};
use driver_plan_model::common::{DriverIndex, ExternalTypeIndex};

/// An assignment together with its incrementally maintained evaluation.
#[derive(Debug, Clone, PartialEq)]
pub struct SearchState {
    assignment: Assignment,
    drivers: Vec<DriverInfo>,
    external_types: Vec<ExternalTypeInfo>,
    total: TotalInfo,
    satisfaction: f64,
    penalty_factor: f64,
}

impl SearchState {
    pub fn new(model: &CostModel<'_>, assignment: Assignment, penalty_factor: f64) -> Self {
        let eval = model.evaluate(&assignment, penalty_factor);
        Self {
            assignment,
            drivers: eval.drivers,
            external_types: eval.external_types,
            total: eval.total,
            satisfaction: eval.satisfaction,
            penalty_factor,
        }
    }

    #[inline]
    pub fn assignment(&self) -> &Assignment {
        &self.assignment
    }

    #[inline]
    pub(crate) fn assignment_mut(&mut self) -> &mut Assignment {
        &mut self.assignment
    }

    #[inline]
    pub fn driver_info(&self, driver: DriverIndex) -> &DriverInfo {
        &self.drivers[driver.index()]
    }

    #[inline]
    pub fn driver_infos(&self) -> &[DriverInfo] {
        &self.drivers
    }

    #[inline]
    pub fn external_type_info(&self, driver_type: ExternalTypeIndex) -> &ExternalTypeInfo {
        &self.external_types[driver_type.index()]
    }

    #[inline]
    pub fn external_type_infos(&self) -> &[ExternalTypeInfo] {
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

    /// Fleet satisfaction.
    #[inline]
    pub fn satisfaction(&self) -> f64 {
        self.satisfaction
    }

    #[inline]
    pub fn penalty_factor(&self) -> f64 {
        self.penalty_factor
    }

    /// Cost raised in proportion to the fleet's dissatisfaction.
    #[inline]
    pub fn adjusted_cost(&self, satisfaction_factor: f64) -> f64 {
        adjusted_cost(self.cost(), self.satisfaction, satisfaction_factor)
    }

    /// Changes the penalty factor and re-evaluates everything under it.
    pub fn set_penalty_factor(&mut self, model: &CostModel<'_>, penalty_factor: f64) {
        self.penalty_factor = penalty_factor;
        self.resync(model);
    }

    /// Replaces the incrementally maintained values by a full evaluation.
    /// Returns how far the stored cost had drifted.
    pub fn resync(&mut self, model: &CostModel<'_>) -> f64 {
        let eval = model.evaluate(&self.assignment, self.penalty_factor);
        let drift = (eval.total.stats.cost - self.total.stats.cost).abs();
        self.drivers = eval.drivers;
        self.external_types = eval.external_types;
        self.total = eval.total;
        self.satisfaction = eval.satisfaction;
        drift
    }

    /// Adds a diff to the stored values. The assignment is not touched.
    pub(crate) fn apply_diff(&mut self, diff: &OperationDiff) {
        for (driver, delta) in diff.drivers() {
            self.drivers[driver.index()] += delta;
        }
        for (driver_type, delta) in diff.external_types() {
            self.external_types[driver_type.index()] += delta;
        }
        self.total += diff.total();
        self.satisfaction += diff.satisfaction();
    }
}

/// `cost * (1 + (1 - satisfaction) * factor)`.
#[inline]
pub fn adjusted_cost(cost: f64, satisfaction: f64, satisfaction_factor: f64) -> f64 {
    cost * (1.0 + (1.0 - satisfaction) * satisfaction_factor)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::PenaltyConfig;
    use crate::test_support::{day_instance, drv, idx};

    #[test]
    fn test_resync_is_idempotent() {
        let instance = day_instance();
        let penalties = PenaltyConfig::default();
        let model = CostModel::new(&instance, &penalties);
        let mut asg = Assignment::unassigned(instance.activity_count(), instance.driver_count());
        for a in 0..instance.activity_count() {
            asg.assign(idx(a), drv(a % 3));
        }
        let mut state = SearchState::new(&model, asg, 0.3);
        let before = state.clone();
        assert_eq!(state.resync(&model), 0.0);
        assert_eq!(state.resync(&model), 0.0);
        assert_eq!(state, before);
    }

    #[test]
    fn test_penalty_factor_change_reprices() {
        let instance = day_instance();
        let penalties = PenaltyConfig::default();
        let model = CostModel::new(&instance, &penalties);
        let asg = Assignment::unassigned(instance.activity_count(), instance.driver_count());
        let mut state = SearchState::new(&model, asg, 0.0);
        assert_eq!(state.cost(), 0.0);
        assert!(state.penalty() > 0.0);
        state.set_penalty_factor(&model, 1.0);
        assert!((state.cost() - state.penalty()).abs() < 1e-9);
    }

    #[test]
    fn test_adjusted_cost() {
        assert_eq!(adjusted_cost(100.0, 0.5, 0.0), 100.0);
        assert_eq!(adjusted_cost(100.0, 0.5, 1.0), 150.0);
        assert_eq!(adjusted_cost(100.0, 1.0, 3.0), 100.0);
    }
}
