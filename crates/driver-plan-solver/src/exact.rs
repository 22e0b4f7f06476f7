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

//! Exhaustive search for small instances, used as a baseline for the
//! annealer.

use crate::cost::CostModel;
use crate::state::assignment::Assignment;
use driver_plan_model::common::{ActivityIndex, DriverIndex};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SearchSpaceTooLargeError {
    activities: usize,
    drivers: usize,
    limit: u64,
}

impl SearchSpaceTooLargeError {
    pub fn new(activities: usize, drivers: usize, limit: u64) -> Self {
        Self {
            activities,
            drivers,
            limit,
        }
    }

    pub fn activities(&self) -> usize {
        self.activities
    }

    pub fn drivers(&self) -> usize {
        self.drivers
    }

    pub fn limit(&self) -> u64 {
        self.limit
    }
}

impl std::fmt::Display for SearchSpaceTooLargeError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} drivers over {} activities exceed the search space limit of {}",
            self.drivers, self.activities, self.limit
        )
    }
}

impl std::error::Error for SearchSpaceTooLargeError {}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ExactSolverError {
    SearchSpaceTooLarge(SearchSpaceTooLargeError),
    NoDrivers,
}

impl From<SearchSpaceTooLargeError> for ExactSolverError {
    #[inline]
    fn from(err: SearchSpaceTooLargeError) -> Self {
        ExactSolverError::SearchSpaceTooLarge(err)
    }
}

impl std::fmt::Display for ExactSolverError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ExactSolverError::SearchSpaceTooLarge(e) => write!(f, "{}", e),
            ExactSolverError::NoDrivers => write!(f, "The instance contains no drivers."),
        }
    }
}

impl std::error::Error for ExactSolverError {}

/// Cheapest feasible plan found by [`ExactSolver`].
#[derive(Debug, Clone, PartialEq)]
pub struct ExactSolution {
    pub assignment: Assignment,
    pub cost: f64,
    pub raw_cost: f64,
    pub robustness: f64,
    pub satisfaction: f64,
    /// Complete assignments that were evaluated.
    pub leaves: u64,
}

/// Depth-first enumeration of every assignment in which each driver's
/// consecutive activities are successors. Hotels are never used.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ExactSolver {
    max_search_space: u64,
    feasibility_threshold: f64,
}

impl Default for ExactSolver {
    fn default() -> Self {
        Self::new(1_000_000)
    }
}

impl ExactSolver {
    pub fn new(max_search_space: u64) -> Self {
        Self {
            max_search_space,
            feasibility_threshold: 0.01,
        }
    }

    #[inline]
    pub fn with_feasibility_threshold(mut self, threshold: f64) -> Self {
        self.feasibility_threshold = threshold;
        self
    }

    /// Returns `None` when no assignment is feasible.
    #[tracing::instrument(level = "debug", skip_all)]
    pub fn solve(&self, model: &CostModel<'_>) -> Result<Option<ExactSolution>, ExactSolverError> {
        let instance = model.instance();
        let activities = instance.activity_count();
        let drivers = instance.driver_count();
        if drivers == 0 {
            return Err(ExactSolverError::NoDrivers);
        }
        let size = u32::try_from(activities)
            .ok()
            .and_then(|n| (drivers as u64).checked_pow(n));
        if size.is_none_or(|s| s > self.max_search_space) {
            return Err(SearchSpaceTooLargeError::new(activities, drivers, self.max_search_space).into());
        }

        let mut search = Search {
            model,
            threshold: self.feasibility_threshold,
            assignment: Assignment::unassigned(activities, drivers),
            best: None,
            leaves: 0,
        };
        search.descend(0);

        let leaves = search.leaves;
        tracing::debug!(leaves, found = search.best.is_some(), "Exact search finished");
        Ok(search.best.map(|mut best| {
            best.leaves = leaves;
            best
        }))
    }
}

struct Search<'m, 'a> {
    model: &'m CostModel<'a>,
    threshold: f64,
    assignment: Assignment,
    best: Option<ExactSolution>,
    leaves: u64,
}

impl Search<'_, '_> {
    fn descend(&mut self, next: usize) {
        let instance = self.model.instance();
        if next == instance.activity_count() {
            self.evaluate_leaf();
            return;
        }

        let activity = ActivityIndex::new(next);
        for d in 0..instance.driver_count() {
            let driver = DriverIndex::new(d);
            let follows = self
                .assignment
                .path(driver)
                .last()
                .is_none_or(|&last| instance.is_successor(last, activity));
            if !follows {
                continue;
            }
            self.assignment.assign(activity, driver);
            self.descend(next + 1);
            self.assignment.unassign(activity);
        }
    }

    fn evaluate_leaf(&mut self) {
        self.leaves += 1;
        let eval = self.model.evaluate(&self.assignment, 1.0);
        let stats = &eval.total.stats;
        if stats.penalty >= self.threshold {
            return;
        }
        if self.best.as_ref().is_some_and(|b| b.cost <= stats.cost) {
            return;
        }
        self.best = Some(ExactSolution {
            assignment: self.assignment.clone(),
            cost: stats.cost,
            raw_cost: stats.raw_cost,
            robustness: stats.robustness,
            satisfaction: eval.satisfaction,
            leaves: 0,
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::PenaltyConfig;
    use crate::test_support::{day_instance, drv, generated_instance, idx};

    fn without_contract_penalty() -> PenaltyConfig {
        PenaltyConfig {
            contract_time: 0.0,
            contract_time_per_minute: 0.0,
            ..PenaltyConfig::default()
        }
    }

    #[test]
    fn test_refuses_large_instances() {
        let instance = generated_instance(1);
        let penalties = PenaltyConfig::default();
        let model = CostModel::new(&instance, &penalties);
        let err = ExactSolver::new(1_000).solve(&model).unwrap_err();
        match err {
            ExactSolverError::SearchSpaceTooLarge(e) => {
                assert_eq!(e.drivers(), instance.driver_count());
                assert_eq!(e.limit(), 1_000);
            }
            other => panic!("unexpected error {other}"),
        }
    }

    #[test]
    fn test_finds_cheapest_feasible_plan() {
        let instance = day_instance();
        let penalties = without_contract_penalty();
        let model = CostModel::new(&instance, &penalties);
        let solution = ExactSolver::default()
            .solve(&model)
            .expect("small enough")
            .expect("a feasible plan exists");

        assert!(solution.leaves > 0);
        assert!(solution.leaves <= 4u64.pow(7));
        assert_eq!(solution.assignment.unassigned_count(), 0);
        let eval = model.evaluate(&solution.assignment, 1.0);
        assert!(eval.total.stats.penalty < 0.01);
        assert!((eval.total.stats.cost - solution.cost).abs() < 1e-9);
        // The overlapping activities of the last day need two drivers.
        assert_ne!(
            solution.assignment.driver_of(idx(5)),
            solution.assignment.driver_of(idx(6))
        );

        let mut manual = Assignment::unassigned(instance.activity_count(), instance.driver_count());
        for (a, d) in [(0, 0), (1, 0), (2, 0), (3, 1), (4, 1), (5, 2), (6, 3)] {
            manual.assign(idx(a), drv(d));
        }
        let reference = model.evaluate(&manual, 1.0);
        if reference.total.stats.penalty < 0.01 {
            assert!(solution.cost <= reference.total.stats.cost + 1e-9);
        }
    }
}
