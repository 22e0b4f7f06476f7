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

use crate::config::{AnnealingConfig, CycleConfig, InitialAssignment};
use crate::cost::CostModel;
use crate::engine::archive::{BestArchive, SolutionSnapshot};
use crate::engine::observer::SearchObserver;
use crate::monitor::stop::StopToken;
use crate::operation::OperationGenerator;
use crate::satisfaction::{SATISFACTION_LEVELS, satisfaction_level};
use crate::state::assignment::Assignment;
use crate::state::search_state::{SearchState, adjusted_cost};
use driver_plan_model::common::{ActivityIndex, DriverIndex};
use driver_plan_model::instance::Instance;
use parking_lot::Mutex;
use rand::Rng;
use rand::seq::SliceRandom;
use serde::Serialize;

/// Slack for float noise when asserting non-negative totals.
const NEGATIVE_TOLERANCE: f64 = 1e-3;

/// Progress of one worker as seen by the coordinator.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct WorkerStatus {
    pub iteration: u64,
    pub cycle: u32,
    pub temperature: f64,
    pub penalty_factor: f64,
    pub cost: f64,
    pub penalty: f64,
    pub satisfaction: f64,
    /// Satisfaction levels with a feasible plan.
    pub feasible_levels: usize,
}

impl std::fmt::Display for WorkerStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "it={} cycle={} T={:.2} pf={:.3} cost={:.2} penalty={:.2} sat={:.3} levels={}",
            self.iteration,
            self.cycle,
            self.temperature,
            self.penalty_factor,
            self.cost,
            self.penalty,
            self.satisfaction,
            self.feasible_levels
        )
    }
}

/// What a worker shares with the coordinator. Only the owning worker
/// writes; the coordinator reads under the same locks.
#[derive(Debug, Default)]
pub struct WorkerSlot {
    archive: Mutex<BestArchive>,
    status: Mutex<WorkerStatus>,
}

impl WorkerSlot {
    pub fn new() -> Self {
        Self::default()
    }

    /// Copy of the worker's best plans. Snapshots are shared, not cloned.
    pub fn archive(&self) -> BestArchive {
        self.archive.lock().clone()
    }

    pub fn status(&self) -> WorkerStatus {
        *self.status.lock()
    }

    fn publish(&self, status: WorkerStatus) {
        *self.status.lock() = status;
    }
}

/// Builds a starting assignment where every activity has a driver.
pub fn initial_assignment<R: Rng>(
    instance: &Instance,
    strategy: InitialAssignment,
    rng: &mut R,
) -> Assignment {
    let activity_count = instance.activity_count();
    let driver_count = instance.driver_count();
    let mut assignment = Assignment::unassigned(activity_count, driver_count);
    match strategy {
        InitialAssignment::Uniform => {
            for a in 0..activity_count {
                let driver = DriverIndex::new(rng.random_range(0..driver_count));
                assignment.assign(ActivityIndex::new(a), driver);
            }
        }
        InitialAssignment::Greedy => {
            let internal_count = instance.internal_driver_count();
            let mut internal: Vec<usize> = (0..internal_count).collect();
            for a in 0..activity_count {
                let activity = ActivityIndex::new(a);
                internal.shuffle(rng);
                let chosen = internal
                    .iter()
                    .copied()
                    .chain(internal_count..driver_count)
                    .find(|&d| can_take(instance, &assignment, DriverIndex::new(d), activity));
                let driver = match chosen {
                    Some(d) => d,
                    None => rng.random_range(0..driver_count),
                };
                assignment.assign(activity, DriverIndex::new(driver));
            }
        }
    }
    assignment
}

/// Whether `activity` may be appended to the current path of `driver`.
fn can_take(instance: &Instance, assignment: &Assignment, driver: DriverIndex, activity: ActivityIndex) -> bool {
    let candidate = instance.activity(activity);
    let d = instance.driver(driver);
    d.is_qualified(candidate)
        && d.is_available(candidate.start_time(), candidate.end_time())
        && assignment
            .path(driver)
            .last()
            .is_none_or(|&last| instance.is_successor(last, activity))
}

#[inline]
fn draw_between<R: Rng>(rng: &mut R, min: f64, max: f64) -> f64 {
    if max > min { rng.random_range(min..=max) } else { min }
}

/// One simulated annealing search over a private [`SearchState`].
pub struct Annealer<'a, R> {
    worker: usize,
    model: CostModel<'a>,
    config: &'a AnnealingConfig,
    slot: &'a WorkerSlot,
    rng: R,
    generator: OperationGenerator,
    state: SearchState,
    /// Mirror of the archive's best costs, read without locking.
    best_costs: Vec<f64>,
    iteration: u64,
    cycle: u32,
    /// Whether an accepted move reached a feasible plan in this cycle.
    feasible_in_cycle: bool,
    temperature: f64,
    satisfaction_factor: f64,
}

impl<'a, R: Rng> Annealer<'a, R> {
    pub fn new(
        worker: usize,
        model: CostModel<'a>,
        config: &'a AnnealingConfig,
        slot: &'a WorkerSlot,
        mut rng: R,
    ) -> Self {
        let instance = model.instance();
        let assignment = initial_assignment(instance, config.initial_assignment, &mut rng);
        let state = SearchState::new(&model, assignment, config.initial_penalty_factor);
        let satisfaction_factor = draw_between(
            &mut rng,
            config.min_satisfaction_factor,
            config.max_satisfaction_factor,
        );
        let best_costs = {
            let archive = slot.archive.lock();
            (0..SATISFACTION_LEVELS).map(|l| archive.best_cost(l)).collect()
        };
        Self {
            worker,
            model,
            config,
            slot,
            rng,
            generator: OperationGenerator::new(instance, &config.operation_weights),
            state,
            best_costs,
            iteration: 0,
            cycle: 0,
            feasible_in_cycle: false,
            temperature: config.initial_temperature,
            satisfaction_factor,
        }
    }

    #[inline]
    pub fn state(&self) -> &SearchState {
        &self.state
    }

    #[inline]
    pub fn iteration(&self) -> u64 {
        self.iteration
    }

    #[inline]
    pub fn temperature(&self) -> f64 {
        self.temperature
    }

    #[inline]
    pub fn cycle(&self) -> u32 {
        self.cycle
    }

    #[inline]
    pub fn satisfaction_factor(&self) -> f64 {
        self.satisfaction_factor
    }

    pub fn status(&self) -> WorkerStatus {
        WorkerStatus {
            iteration: self.iteration,
            cycle: self.cycle,
            temperature: self.temperature,
            penalty_factor: self.state.penalty_factor(),
            cost: self.state.cost(),
            penalty: self.state.penalty(),
            satisfaction: self.state.satisfaction(),
            feasible_levels: self.best_costs.iter().filter(|c| c.is_finite()).count(),
        }
    }

    /// One Metropolis step followed by the periodic resync and schedule work.
    pub fn step<O: SearchObserver + ?Sized>(&mut self, observer: &mut O) {
        self.iteration += 1;

        let operation = self.generator.generate(self.state.assignment(), &mut self.rng);
        if !operation.is_noop(self.state.assignment()) {
            let diff = operation.cost_diff(&self.model, &self.state);
            let current = self.state.adjusted_cost(self.satisfaction_factor);
            let candidate = adjusted_cost(
                self.state.cost() + diff.cost(),
                self.state.satisfaction() + diff.satisfaction(),
                self.satisfaction_factor,
            );
            let delta = candidate - current;
            if delta < 0.0 || self.rng.random::<f64>() < (-delta / self.temperature).exp() {
                operation.execute(&mut self.state, &diff);
                debug_assert!(
                    self.state.cost() > -NEGATIVE_TOLERANCE,
                    "negative cost {} after {}",
                    self.state.cost(),
                    operation
                );
                debug_assert!(
                    self.state.penalty() > -NEGATIVE_TOLERANCE,
                    "negative penalty {} after {}",
                    self.state.penalty(),
                    operation
                );
                observer.on_accepted(&self.model, &self.state, &operation, &diff);
                self.track_best();
            }
        }

        if self.config.resync_interval > 0 && self.iteration % self.config.resync_interval == 0 {
            let drift = self.state.resync(&self.model);
            tracing::trace!(worker = self.worker, iteration = self.iteration, drift, "Resynced cost");
            observer.on_resync(self.iteration, drift);
        }

        if self.config.schedule_interval > 0 && self.iteration % self.config.schedule_interval == 0 {
            self.advance_schedule();
        }
    }

    /// Stores the current plan if it is feasible and beats the best plan of
    /// its satisfaction level, after confirming both with a full evaluation.
    fn track_best(&mut self) {
        let threshold = self.config.feasibility_threshold;
        if self.state.penalty() >= threshold {
            return;
        }
        self.feasible_in_cycle = true;
        if self.state.cost() >= self.best_costs[satisfaction_level(self.state.satisfaction())] {
            return;
        }

        self.state.resync(&self.model);
        let level = satisfaction_level(self.state.satisfaction());
        if self.state.penalty() >= threshold || self.state.cost() >= self.best_costs[level] {
            return;
        }

        let snapshot = SolutionSnapshot::capture(&self.state, self.worker, self.iteration);
        let cost = snapshot.cost;
        let improved = self.slot.archive.lock().insert(snapshot);
        for &l in &improved {
            self.best_costs[l] = cost;
        }
        tracing::debug!(
            worker = self.worker,
            iteration = self.iteration,
            level,
            cost,
            satisfaction = self.state.satisfaction(),
            levels = improved.len(),
            "New best plan"
        );
    }

    fn advance_schedule(&mut self) {
        self.temperature *= self.config.temperature_reduction;
        let penalty_factor = (self.state.penalty_factor() + self.config.penalty_increment).min(1.0);
        self.state.set_penalty_factor(&self.model, penalty_factor);

        if let Some(cycle) = self.config.cycle
            && (self.temperature < cycle.end_temperature
                || (!self.feasible_in_cycle && self.temperature < cycle.early_end_temperature))
        {
            self.restart_cycle(&cycle);
        }
    }

    fn restart_cycle(&mut self, cycle: &CycleConfig) {
        self.cycle += 1;
        self.feasible_in_cycle = false;
        self.temperature = draw_between(
            &mut self.rng,
            cycle.min_restart_temperature,
            cycle.max_restart_temperature,
        );
        self.satisfaction_factor = draw_between(
            &mut self.rng,
            self.config.min_satisfaction_factor,
            self.config.max_satisfaction_factor,
        );

        let full_reset = self.rng.random::<f64>() < cycle.full_reset_probability;
        if full_reset {
            let assignment = initial_assignment(
                self.model.instance(),
                self.config.initial_assignment,
                &mut self.rng,
            );
            self.state = SearchState::new(&self.model, assignment, self.config.initial_penalty_factor);
        } else {
            self.state
                .set_penalty_factor(&self.model, self.config.initial_penalty_factor);
        }

        tracing::debug!(
            worker = self.worker,
            cycle = self.cycle,
            temperature = self.temperature,
            satisfaction_factor = self.satisfaction_factor,
            full_reset,
            "Cycle restart"
        );
    }

    /// Steps until `stop` is set. Every `callback_interval` iterations the
    /// status is published and `on_progress` receives the batch size.
    /// Returns the number of iterations performed.
    #[tracing::instrument(level = "debug", name = "Annealing", skip_all)]
    pub fn run<F, O>(&mut self, stop: &StopToken, mut on_progress: F, observer: &mut O) -> u64
    where
        F: FnMut(u64),
        O: SearchObserver + ?Sized,
    {
        tracing::debug!(worker = self.worker, cost = self.state.cost(), "Worker started");
        let interval = self.config.callback_interval.max(1);
        let start = self.iteration;
        let mut batch = 0u64;

        while !stop.is_set() {
            self.step(observer);
            batch += 1;
            if batch == interval {
                self.slot.publish(self.status());
                on_progress(batch);
                batch = 0;
            }
        }

        self.slot.publish(self.status());
        if batch > 0 {
            on_progress(batch);
        }

        let iterations = self.iteration - start;
        tracing::debug!(
            worker = self.worker,
            iterations,
            cycles = self.cycle,
            cost = self.state.cost(),
            "Worker stopped"
        );
        iterations
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::PenaltyConfig;
    use crate::engine::observer::{CrossCheckObserver, NoopObserver};
    use crate::test_support::{day_instance, generated_instance};
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    fn without_contract_penalty() -> PenaltyConfig {
        PenaltyConfig {
            contract_time: 0.0,
            contract_time_per_minute: 0.0,
            ..PenaltyConfig::default()
        }
    }

    #[test]
    fn test_initial_assignments_cover_every_activity() {
        let instance = generated_instance(4);
        let mut rng = ChaCha8Rng::seed_from_u64(4);
        for strategy in [InitialAssignment::Uniform, InitialAssignment::Greedy] {
            let assignment = initial_assignment(&instance, strategy, &mut rng);
            assert_eq!(assignment.unassigned_count(), 0);
            assert!(assignment.is_consistent());
        }
    }

    #[test]
    fn test_greedy_keeps_internal_paths_in_succession() {
        let instance = day_instance();
        let mut rng = ChaCha8Rng::seed_from_u64(11);
        let assignment = initial_assignment(&instance, InitialAssignment::Greedy, &mut rng);
        // Two internal drivers can cover the overlap on the last day.
        for d in 0..instance.internal_driver_count() {
            let path = assignment.path(DriverIndex::new(d));
            for pair in path.windows(2) {
                assert!(instance.is_successor(pair[0], pair[1]));
            }
        }
    }

    #[test]
    fn test_schedule_cools_and_raises_penalty_factor() {
        let instance = day_instance();
        let penalties = PenaltyConfig::default();
        let model = CostModel::new(&instance, &penalties);
        let config = AnnealingConfig::default()
            .with_initial_temperature(100.0)
            .with_schedule(10, 0.5)
            .with_penalty_schedule(0.1, 0.2);
        let slot = WorkerSlot::new();
        let mut annealer = Annealer::new(0, model, &config, &slot, ChaCha8Rng::seed_from_u64(1));
        for _ in 0..10 {
            annealer.step(&mut NoopObserver);
        }
        assert_eq!(annealer.temperature(), 50.0);
        assert!((annealer.state().penalty_factor() - 0.3).abs() < 1e-12);
        for _ in 0..40 {
            annealer.step(&mut NoopObserver);
        }
        assert_eq!(annealer.state().penalty_factor(), 1.0);
    }

    #[test]
    fn test_cycle_restart_redraws_temperature() {
        let instance = day_instance();
        let penalties = PenaltyConfig::default();
        let model = CostModel::new(&instance, &penalties);
        let config = AnnealingConfig::default()
            .with_initial_temperature(1.5)
            .with_schedule(1, 0.5)
            .with_penalty_schedule(0.01, 0.5)
            .with_cycle(CycleConfig::default());
        let slot = WorkerSlot::new();
        let mut annealer = Annealer::new(0, model, &config, &slot, ChaCha8Rng::seed_from_u64(2));
        annealer.step(&mut NoopObserver);
        assert_eq!(annealer.cycle(), 1);
        assert!((300.0..=1500.0).contains(&annealer.temperature()));
        assert_eq!(annealer.state().penalty_factor(), 0.01);
    }

    #[test]
    fn test_cycle_without_feasible_plan_ends_early() {
        // Contract penalties leave a random plan infeasible after one step.
        let instance = day_instance();
        let penalties = PenaltyConfig::default();
        let model = CostModel::new(&instance, &penalties);
        let config = AnnealingConfig::default()
            .with_initial_temperature(100.0)
            .with_schedule(1, 0.5)
            .with_penalty_schedule(0.01, 0.5)
            .with_cycle(CycleConfig {
                end_temperature: 1.0,
                early_end_temperature: 60.0,
                ..CycleConfig::default()
            });
        let slot = WorkerSlot::new();
        let mut annealer = Annealer::new(0, model, &config, &slot, ChaCha8Rng::seed_from_u64(4));
        annealer.step(&mut NoopObserver);
        assert_eq!(annealer.cycle(), 1);
        assert!((300.0..=1500.0).contains(&annealer.temperature()));
        assert_eq!(annealer.state().penalty_factor(), 0.01);
    }

    #[test]
    fn test_cycle_with_feasible_plan_runs_to_the_end() {
        let instance = day_instance();
        let penalties = PenaltyConfig {
            precedence: 0.0,
            shift_length: 0.0,
            shift_length_per_minute: 0.0,
            rest_time: 0.0,
            rest_time_per_minute: 0.0,
            contract_time: 0.0,
            contract_time_per_minute: 0.0,
            internal_shift_count_per_shift: 0.0,
            external_shift_count_per_shift: 0.0,
            invalid_hotel: 0.0,
            availability: 0.0,
            qualification: 0.0,
        };
        let model = CostModel::new(&instance, &penalties);
        // Every move is accepted while the temperature is huge, and every
        // plan is feasible without penalties.
        let config = AnnealingConfig::default()
            .with_initial_temperature(1e9)
            .with_schedule(10, 1e-9)
            .with_penalty_schedule(0.01, 0.5)
            .with_cycle(CycleConfig {
                end_temperature: 0.5,
                early_end_temperature: 60.0,
                ..CycleConfig::default()
            });
        let slot = WorkerSlot::new();
        let mut annealer = Annealer::new(0, model, &config, &slot, ChaCha8Rng::seed_from_u64(4));
        for _ in 0..10 {
            annealer.step(&mut NoopObserver);
        }
        assert_eq!(annealer.cycle(), 0);
        assert!(annealer.temperature() < 60.0);
        assert!(!slot.archive().is_empty());
    }

    #[test]
    fn test_run_finds_feasible_plan() {
        let instance = day_instance();
        let penalties = without_contract_penalty();
        let model = CostModel::new(&instance, &penalties);
        let config = AnnealingConfig::default()
            .with_initial_temperature(200.0)
            .with_schedule(500, 0.95)
            .with_penalty_schedule(1.0, 0.0)
            .with_callback_interval(1000);
        let slot = WorkerSlot::new();
        let stop = StopToken::new();
        let mut annealer = Annealer::new(0, model, &config, &slot, ChaCha8Rng::seed_from_u64(3));

        let mut seen = 0;
        let iterations = annealer.run(
            &stop,
            |n| {
                seen += n;
                if seen >= 20_000 {
                    stop.request_stop();
                }
            },
            &mut NoopObserver,
        );
        assert_eq!(iterations, 20_000);

        let archive = slot.archive();
        assert!(!archive.is_empty());
        let best = archive.best(0).expect("level 0 holds the cheapest plan");
        let drivers: Vec<_> = best.drivers.iter().map(|d| d.map(DriverIndex::new)).collect();
        let assignment = Assignment::from_parts(drivers, best.hotels.clone(), instance.driver_count());
        let eval = model.evaluate(&assignment, 1.0);
        assert!(eval.total.stats.penalty < config.feasibility_threshold);
        assert!((eval.total.stats.cost - best.cost).abs() < 1e-6);

        let status = slot.status();
        assert_eq!(status.iteration, 20_000);
        assert!(status.feasible_levels > 0);
    }

    #[test]
    fn test_incremental_state_tracks_full_evaluation() {
        for seed in [5, 6] {
            let instance = generated_instance(seed);
            let penalties = PenaltyConfig::default();
            let model = CostModel::new(&instance, &penalties);
            let config = AnnealingConfig::default()
                .with_initial_temperature(500.0)
                .with_schedule(200, 0.98)
                .with_penalty_schedule(0.05, 0.05)
                .with_resync_interval(500)
                .with_satisfaction_factor_range(0.0, 2.0)
                .with_cycle(CycleConfig {
                    end_temperature: 450.0,
                    ..CycleConfig::default()
                });
            let slot = WorkerSlot::new();
            let mut annealer =
                Annealer::new(0, model, &config, &slot, ChaCha8Rng::seed_from_u64(seed));
            let mut observer = CrossCheckObserver::new(1e-6);
            for _ in 0..3000 {
                annealer.step(&mut observer);
            }
            assert!(observer.checked() > 0);
            assert!(observer.mismatches().is_empty(), "{:?}", observer.mismatches().first());
            assert!(observer.max_drift() < 1e-6);
        }
    }

    #[test]
    fn test_same_seed_replays_same_search() {
        let instance = generated_instance(8);
        let penalties = PenaltyConfig::default();
        let model = CostModel::new(&instance, &penalties);
        let config = AnnealingConfig::default();
        let (a, b) = (WorkerSlot::new(), WorkerSlot::new());
        let mut first = Annealer::new(0, model, &config, &a, ChaCha8Rng::seed_from_u64(9));
        let mut second = Annealer::new(1, model, &config, &b, ChaCha8Rng::seed_from_u64(9));
        for _ in 0..2000 {
            first.step(&mut NoopObserver);
            second.step(&mut NoopObserver);
        }
        assert_eq!(first.state().assignment(), second.state().assignment());
        assert_eq!(first.state().cost(), second.state().cost());
    }
}
