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

pub mod config;
pub mod cost;
pub mod engine;
pub mod exact;
pub mod monitor;
pub mod operation;
pub mod pareto;
pub mod satisfaction;
pub mod state;

#[cfg(test)]
pub(crate) mod test_support;

pub mod prelude {
    pub use crate::config::{
        AnnealingConfig, CycleConfig, InitialAssignment, OperationWeights, PenaltyConfig,
    };
    pub use crate::cost::CostModel;
    pub use crate::engine::annealer::{Annealer, WorkerSlot, WorkerStatus, initial_assignment};
    pub use crate::engine::archive::{BestArchive, SolutionSnapshot};
    pub use crate::engine::coordinator::{Coordinator, CoordinatorConfig, CoordinatorError, RunOutcome};
    pub use crate::engine::observer::{CrossCheckObserver, NoopObserver, SearchObserver};
    pub use crate::exact::{ExactSolution, ExactSolver, ExactSolverError};
    pub use crate::monitor::stop::{StopGroup, StopToken};
    pub use crate::operation::{Operation, OperationDiff, OperationGenerator};
    pub use crate::pareto::ParetoFront;
    pub use crate::state::assignment::Assignment;
    pub use crate::state::info::{DriverInfo, ExternalTypeInfo, PenaltyInfo, Stats, TotalInfo};
    pub use crate::state::search_state::SearchState;
}
