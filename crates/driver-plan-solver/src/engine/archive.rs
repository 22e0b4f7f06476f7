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

use crate::satisfaction::{SATISFACTION_LEVELS, satisfaction_level};
use crate::state::search_state::SearchState;
use driver_plan_model::common::{ActivityIndex, DriverIndex};
use serde::Serialize;
use std::sync::Arc;

/// Frozen copy of a feasible plan.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SolutionSnapshot {
    pub cost: f64,
    pub raw_cost: f64,
    pub robustness: f64,
    pub penalty: f64,
    pub satisfaction: f64,
    pub worker: usize,
    pub iteration: u64,
    /// Driver of every activity, by index.
    pub drivers: Vec<Option<usize>>,
    pub hotels: Vec<bool>,
}

impl SolutionSnapshot {
    pub fn capture(state: &SearchState, worker: usize, iteration: u64) -> Self {
        let assignment = state.assignment();
        Self {
            cost: state.cost(),
            raw_cost: state.raw_cost(),
            robustness: state.robustness(),
            penalty: state.penalty(),
            satisfaction: state.satisfaction(),
            worker,
            iteration,
            drivers: assignment.drivers().iter().map(|d| d.map(|d| d.index())).collect(),
            hotels: assignment.hotels().to_vec(),
        }
    }

    #[inline]
    pub fn level(&self) -> usize {
        satisfaction_level(self.satisfaction)
    }

    #[inline]
    pub fn driver_of(&self, activity: ActivityIndex) -> Option<DriverIndex> {
        self.drivers[activity.index()].map(DriverIndex::new)
    }
}

/// Cheapest known feasible plan per satisfaction level.
///
/// A plan stored for level `l` has a satisfaction of at least `l / 100`,
/// so it also serves every lower level it is cheaper for.
#[derive(Debug, Clone, PartialEq)]
pub struct BestArchive {
    levels: Vec<Option<Arc<SolutionSnapshot>>>,
}

impl Default for BestArchive {
    fn default() -> Self {
        Self::new()
    }
}

impl BestArchive {
    pub fn new() -> Self {
        Self {
            levels: vec![None; SATISFACTION_LEVELS],
        }
    }

    #[inline]
    pub fn best(&self, level: usize) -> Option<&Arc<SolutionSnapshot>> {
        self.levels[level].as_ref()
    }

    /// Cost of the best plan of a level, infinite when there is none.
    #[inline]
    pub fn best_cost(&self, level: usize) -> f64 {
        self.levels[level].as_ref().map_or(f64::INFINITY, |s| s.cost)
    }

    /// Stores `snapshot` at its level and every lower level it improves.
    /// Returns the levels that changed, highest first.
    pub fn insert(&mut self, snapshot: SolutionSnapshot) -> Vec<usize> {
        let snapshot = Arc::new(snapshot);
        let mut improved = Vec::new();
        for level in (0..=snapshot.level()).rev() {
            if snapshot.cost < self.best_cost(level) {
                self.levels[level] = Some(Arc::clone(&snapshot));
                improved.push(level);
            }
        }
        improved
    }

    pub fn len(&self) -> usize {
        self.levels.iter().filter(|l| l.is_some()).count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn snapshot(cost: f64, satisfaction: f64) -> SolutionSnapshot {
        SolutionSnapshot {
            cost,
            raw_cost: cost,
            robustness: 0.0,
            penalty: 0.0,
            satisfaction,
            worker: 0,
            iteration: 0,
            drivers: Vec::new(),
            hotels: Vec::new(),
        }
    }

    #[test]
    fn test_insert_propagates_to_lower_levels() {
        let mut archive = BestArchive::new();
        let improved = archive.insert(snapshot(100.0, 0.42));
        assert_eq!(improved.len(), 43);
        assert_eq!(improved[0], 42);
        assert_eq!(archive.best_cost(0), 100.0);
        assert_eq!(archive.best_cost(42), 100.0);
        assert!(archive.best_cost(43).is_infinite());
    }

    #[test]
    fn test_more_expensive_plans_only_fill_gaps() {
        let mut archive = BestArchive::new();
        archive.insert(snapshot(100.0, 0.3));
        let improved = archive.insert(snapshot(150.0, 0.6));
        assert_eq!(improved, (31..=60).rev().collect::<Vec<_>>());
        assert_eq!(archive.best_cost(30), 100.0);
        assert_eq!(archive.best_cost(45), 150.0);
        assert_eq!(archive.len(), 61);
    }
}
