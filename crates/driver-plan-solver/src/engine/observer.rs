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
use crate::operation::{Operation, OperationDiff};
use crate::state::search_state::SearchState;

/// Hooks into the annealing loop.
pub trait SearchObserver {
    /// Called after an accepted operation has been executed.
    fn on_accepted(
        &mut self,
        _model: &CostModel<'_>,
        _state: &SearchState,
        _operation: &Operation,
        _diff: &OperationDiff,
    ) {
    }

    /// Called after a periodic full re-evaluation with the cost drift found.
    fn on_resync(&mut self, _iteration: u64, _drift: f64) {}
}

#[derive(Debug, Clone, Copy, Default)]
pub struct NoopObserver;

impl SearchObserver for NoopObserver {}

/// A disagreement between incremental and full evaluation.
#[derive(Debug, Clone, PartialEq)]
pub struct Mismatch {
    pub operation: Operation,
    pub stored_cost: f64,
    pub evaluated_cost: f64,
}

/// Re-evaluates the whole plan after every accepted operation and records
/// where the incrementally maintained values disagree.
#[derive(Debug, Clone)]
pub struct CrossCheckObserver {
    tolerance: f64,
    checked: u64,
    max_drift: f64,
    mismatches: Vec<Mismatch>,
}

impl CrossCheckObserver {
    pub fn new(tolerance: f64) -> Self {
        Self {
            tolerance,
            checked: 0,
            max_drift: 0.0,
            mismatches: Vec::new(),
        }
    }

    #[inline]
    pub fn checked(&self) -> u64 {
        self.checked
    }

    #[inline]
    pub fn mismatches(&self) -> &[Mismatch] {
        &self.mismatches
    }

    /// Largest drift reported by a periodic re-evaluation.
    #[inline]
    pub fn max_drift(&self) -> f64 {
        self.max_drift
    }
}

impl SearchObserver for CrossCheckObserver {
    fn on_accepted(
        &mut self,
        model: &CostModel<'_>,
        state: &SearchState,
        operation: &Operation,
        _diff: &OperationDiff,
    ) {
        self.checked += 1;
        let eval = model.evaluate(state.assignment(), state.penalty_factor());
        let drivers_match = state
            .driver_infos()
            .iter()
            .zip(&eval.drivers)
            .all(|(stored, fresh)| stored.approx_eq(fresh, self.tolerance));
        let satisfaction_match = (state.satisfaction() - eval.satisfaction).abs() <= self.tolerance;
        if !drivers_match || !satisfaction_match || !state.total().approx_eq(&eval.total, self.tolerance) {
            tracing::warn!(%operation, stored = state.cost(), evaluated = eval.total.stats.cost, "Incremental cost mismatch");
            self.mismatches.push(Mismatch {
                operation: *operation,
                stored_cost: state.cost(),
                evaluated_cost: eval.total.stats.cost,
            });
        }
    }

    fn on_resync(&mut self, _iteration: u64, drift: f64) {
        self.max_drift = self.max_drift.max(drift);
    }
}
