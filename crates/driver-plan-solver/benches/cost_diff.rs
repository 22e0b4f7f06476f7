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

use criterion::{Criterion, criterion_group, criterion_main};
use driver_plan_model::prelude::*;
use driver_plan_solver::config::{InitialAssignment, OperationWeights, PenaltyConfig};
use driver_plan_solver::cost::CostModel;
use driver_plan_solver::engine::annealer::initial_assignment;
use driver_plan_solver::operation::{Operation, OperationGenerator};
use driver_plan_solver::state::search_state::SearchState;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use std::hint::black_box;

const OPERATIONS: usize = 256;

fn build_instance() -> Instance {
    InstanceGenerator::new(
        GeneratorConfig::default()
            .with_seed(17)
            .with_duty_count(80)
            .with_driver_counts(20, 2, 6),
    )
    .generate()
    .expect("generated instance is valid")
}

fn sample_operations(instance: &Instance, state: &SearchState) -> Vec<Operation> {
    let generator = OperationGenerator::new(instance, &OperationWeights::default());
    let mut rng = ChaCha8Rng::seed_from_u64(3);
    (0..OPERATIONS)
        .map(|_| generator.generate(state.assignment(), &mut rng))
        .collect()
}

fn bench_cost_diff(c: &mut Criterion) {
    let instance = build_instance();
    let penalties = PenaltyConfig::default();
    let model = CostModel::new(&instance, &penalties);
    let mut rng = ChaCha8Rng::seed_from_u64(1);
    let assignment = initial_assignment(&instance, InitialAssignment::Greedy, &mut rng);
    let state = SearchState::new(&model, assignment, 0.5);
    let operations = sample_operations(&instance, &state);

    let mut group = c.benchmark_group("cost_diff");

    group.bench_function("range_diff", |b| {
        b.iter(|| {
            let mut acc = 0.0;
            for op in &operations {
                acc += op.cost_diff(&model, black_box(&state)).cost();
            }
            black_box(acc)
        })
    });

    group.bench_function("full_evaluation", |b| {
        b.iter(|| {
            let mut acc = 0.0;
            for op in &operations {
                let mut next = state.assignment().clone();
                match *op {
                    Operation::Assign { activity, driver } => next.assign(activity, driver),
                    Operation::Unassign { activity } => next.unassign(activity),
                    Operation::Swap { first, second } => next.swap(first, second),
                    Operation::ToggleHotel { activity } => next.toggle_hotel_after(activity),
                }
                acc += model.evaluate(black_box(&next), 0.5).total.stats.cost - state.cost();
            }
            black_box(acc)
        })
    });

    group.finish();
}

criterion_group!(benches, bench_cost_diff);
criterion_main!(benches);
