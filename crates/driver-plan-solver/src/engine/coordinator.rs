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

use crate::config::{AnnealingConfig, PenaltyConfig};
use crate::cost::CostModel;
use crate::engine::annealer::{Annealer, WorkerSlot, WorkerStatus};
use crate::engine::archive::BestArchive;
use crate::engine::observer::NoopObserver;
use crate::monitor::stop::{StopGroup, StopToken};
use crate::pareto::ParetoFront;
use driver_plan_core::math::ewma::{Ewma, InvalidAlphaError};
use driver_plan_model::instance::Instance;
use parking_lot::Mutex;
use rand::{RngCore, SeedableRng};
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};

static_assertions::assert_impl_all!(WorkerSlot: Send, Sync);
static_assertions::assert_impl_all!(StopGroup: Send, Sync);
static_assertions::assert_impl_all!(StopToken: Send, Sync);
static_assertions::assert_impl_all!(BestArchive: Send, Sync);

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CoordinatorConfig {
    pub num_workers: usize,
    /// Iterations over all workers after which the search stops.
    pub iteration_budget: u64,
    /// Master seed; a fixed seed makes runs replayable.
    pub seed: Option<u64>,
    /// Iterations over all workers between progress logs.
    pub log_interval: u64,
    /// Smallest cost decrease between neighbouring front points.
    pub min_front_gap: f64,
    /// Smoothing factor of the reported iteration speed.
    pub speed_smoothing: f64,
    /// Runs a single worker on the calling thread.
    pub single_threaded: bool,
}

impl Default for CoordinatorConfig {
    #[inline]
    fn default() -> Self {
        Self {
            num_workers: std::thread::available_parallelism()
                .map(|n| n.get())
                .unwrap_or(1),
            iteration_budget: 50_000_000,
            seed: None,
            log_interval: 5_000_000,
            min_front_gap: 100.0,
            speed_smoothing: 0.3,
            single_threaded: false,
        }
    }
}

impl CoordinatorConfig {
    #[inline]
    pub fn with_num_workers(mut self, num_workers: usize) -> Self {
        self.num_workers = num_workers;
        self
    }

    #[inline]
    pub fn with_iteration_budget(mut self, budget: u64) -> Self {
        self.iteration_budget = budget;
        self
    }

    #[inline]
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    #[inline]
    pub fn with_log_interval(mut self, interval: u64) -> Self {
        self.log_interval = interval;
        self
    }

    #[inline]
    pub fn with_min_front_gap(mut self, gap: f64) -> Self {
        self.min_front_gap = gap;
        self
    }

    #[inline]
    pub fn with_single_threaded(mut self, single_threaded: bool) -> Self {
        self.single_threaded = single_threaded;
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum CoordinatorError {
    NoWorkers,
    ZeroIterationBudget,
    ZeroCallbackInterval,
    SpeedSmoothing(InvalidAlphaError<f64>),
}

impl From<InvalidAlphaError<f64>> for CoordinatorError {
    #[inline]
    fn from(err: InvalidAlphaError<f64>) -> Self {
        CoordinatorError::SpeedSmoothing(err)
    }
}

impl std::fmt::Display for CoordinatorError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CoordinatorError::NoWorkers => write!(f, "At least one worker is required"),
            CoordinatorError::ZeroIterationBudget => write!(f, "Iteration budget must be positive"),
            CoordinatorError::ZeroCallbackInterval => {
                write!(f, "Callback interval must be positive")
            }
            CoordinatorError::SpeedSmoothing(err) => write!(f, "Speed smoothing: {}", err),
        }
    }
}

impl std::error::Error for CoordinatorError {}

/// Result of a finished search.
#[derive(Debug, Clone)]
pub struct RunOutcome {
    pub front: ParetoFront,
    pub total_iterations: u64,
    pub elapsed: Duration,
    pub seed: u64,
    pub workers: Vec<WorkerStatus>,
}

/// Bookkeeping of the periodic progress log.
struct Progress {
    speed: Ewma<f64>,
    last_time: Instant,
    last_iterations: u64,
}

/// Runs independent annealing workers until the shared iteration budget
/// is spent and merges their archives into one front.
#[derive(Debug, Clone)]
pub struct Coordinator {
    config: CoordinatorConfig,
    annealing: AnnealingConfig,
    penalties: PenaltyConfig,
}

impl Coordinator {
    pub fn new(config: CoordinatorConfig, annealing: AnnealingConfig, penalties: PenaltyConfig) -> Self {
        Self {
            config,
            annealing,
            penalties,
        }
    }

    #[inline]
    pub fn config(&self) -> &CoordinatorConfig {
        &self.config
    }

    #[tracing::instrument(level = "info", skip(self, instance))]
    pub fn run(&self, instance: &Instance) -> Result<RunOutcome, CoordinatorError> {
        if self.config.num_workers == 0 && !self.config.single_threaded {
            return Err(CoordinatorError::NoWorkers);
        }
        if self.config.iteration_budget == 0 {
            return Err(CoordinatorError::ZeroIterationBudget);
        }
        if self.annealing.callback_interval == 0 {
            return Err(CoordinatorError::ZeroCallbackInterval);
        }

        let workers = if self.config.single_threaded {
            1
        } else {
            self.config.num_workers
        };
        let seed = self.config.seed.unwrap_or_else(|| rand::rng().next_u64());
        let mut seeder = ChaCha8Rng::seed_from_u64(seed);
        let worker_seeds: Vec<u64> = (0..workers).map(|_| seeder.next_u64()).collect();

        let model = CostModel::new(instance, &self.penalties);
        let slots: Vec<WorkerSlot> = (0..workers).map(|_| WorkerSlot::new()).collect();
        let stops = StopGroup::new();
        let tokens: Vec<StopToken> = (0..workers).map(|_| stops.register()).collect();
        let counter = AtomicU64::new(0);
        let next_log = AtomicU64::new(self.config.log_interval);
        let start = Instant::now();
        let progress = Mutex::new(Progress {
            speed: Ewma::new(self.config.speed_smoothing)?,
            last_time: start,
            last_iterations: 0,
        });

        tracing::info!(workers, seed, budget = self.config.iteration_budget, "Starting search");

        let report = |iterations: u64| {
            let total = counter.fetch_add(iterations, Ordering::Relaxed) + iterations;
            if total >= self.config.iteration_budget {
                stops.cancel_all();
            }
            let interval = self.config.log_interval;
            if interval == 0 {
                return;
            }
            let due = next_log.load(Ordering::Relaxed);
            if total >= due
                && next_log
                    .compare_exchange(due, total - total % interval + interval, Ordering::Relaxed, Ordering::Relaxed)
                    .is_ok()
            {
                self.log_progress(&slots, total, &progress);
            }
        };

        if self.config.single_threaded {
            let mut annealer = Annealer::new(
                0,
                model,
                &self.annealing,
                &slots[0],
                ChaCha8Rng::seed_from_u64(worker_seeds[0]),
            );
            annealer.run(&tokens[0], report, &mut NoopObserver);
        } else {
            let report = &report;
            let annealing = &self.annealing;
            std::thread::scope(|scope| {
                for (worker, ((slot, token), &worker_seed)) in
                    slots.iter().zip(&tokens).zip(&worker_seeds).enumerate()
                {
                    scope.spawn(move || {
                        let rng = ChaCha8Rng::seed_from_u64(worker_seed);
                        let mut annealer = Annealer::new(worker, model, annealing, slot, rng);
                        annealer.run(token, report, &mut NoopObserver);
                    });
                }
            });
        }

        let elapsed = start.elapsed();
        let total_iterations = counter.load(Ordering::Relaxed);
        let archives: Vec<BestArchive> = slots.iter().map(WorkerSlot::archive).collect();
        let front = ParetoFront::from_archives(&archives, self.config.min_front_gap);
        tracing::info!(
            iterations = total_iterations,
            elapsed_ms = elapsed.as_millis() as u64,
            front = %front,
            "Search finished"
        );

        Ok(RunOutcome {
            front,
            total_iterations,
            elapsed,
            seed,
            workers: slots.iter().map(WorkerSlot::status).collect(),
        })
    }

    fn log_progress(&self, slots: &[WorkerSlot], total: u64, progress: &Mutex<Progress>) {
        let speed = {
            let mut progress = progress.lock();
            let now = Instant::now();
            let seconds = now.duration_since(progress.last_time).as_secs_f64();
            let done = total.saturating_sub(progress.last_iterations);
            progress.last_time = now;
            progress.last_iterations = total;
            if seconds > 0.0 {
                progress.speed.observe(done as f64 / seconds)
            } else {
                progress.speed.value().unwrap_or(0.0)
            }
        };

        let archives: Vec<BestArchive> = slots.iter().map(WorkerSlot::archive).collect();
        let front = ParetoFront::from_archives(&archives, self.config.min_front_gap);
        tracing::info!(iterations = total, speed = speed as u64, front = %front, "Search progress");

        for (worker, slot) in slots.iter().enumerate() {
            tracing::debug!(worker, status = %slot.status(), "Worker status");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::generated_instance;

    fn small_annealing() -> AnnealingConfig {
        AnnealingConfig::default()
            .with_schedule(500, 0.95)
            .with_callback_interval(250)
    }

    #[test]
    fn test_rejects_invalid_configs() {
        let instance = generated_instance(1);
        let annealing = small_annealing();
        let penalties = PenaltyConfig::default();

        let coordinator = Coordinator::new(CoordinatorConfig::default().with_num_workers(0), annealing, penalties);
        assert_eq!(coordinator.run(&instance).err(), Some(CoordinatorError::NoWorkers));

        let coordinator = Coordinator::new(CoordinatorConfig::default().with_iteration_budget(0), annealing, penalties);
        assert_eq!(coordinator.run(&instance).err(), Some(CoordinatorError::ZeroIterationBudget));

        let coordinator = Coordinator::new(
            CoordinatorConfig::default(),
            annealing.with_callback_interval(0),
            penalties,
        );
        assert_eq!(coordinator.run(&instance).err(), Some(CoordinatorError::ZeroCallbackInterval));
    }

    #[test]
    fn test_stops_all_workers_at_budget() {
        let instance = generated_instance(2);
        let config = CoordinatorConfig::default()
            .with_num_workers(3)
            .with_iteration_budget(6_000)
            .with_log_interval(2_000)
            .with_seed(42);
        let coordinator = Coordinator::new(config, small_annealing(), PenaltyConfig::default());
        let outcome = coordinator.run(&instance).expect("valid config");

        assert!(outcome.total_iterations >= 6_000);
        assert_eq!(outcome.workers.len(), 3);
        assert_eq!(outcome.seed, 42);
        let counted: u64 = outcome.workers.iter().map(|w| w.iteration).sum();
        assert_eq!(counted, outcome.total_iterations);
        for pair in outcome.front.points().windows(2) {
            assert!(pair[0].satisfaction < pair[1].satisfaction);
            assert!(pair[0].cost < pair[1].cost);
        }
    }

    #[test]
    fn test_single_threaded_run_is_replayable() {
        let instance = generated_instance(3);
        let config = CoordinatorConfig::default()
            .with_single_threaded(true)
            .with_iteration_budget(3_000)
            .with_seed(7);
        let coordinator = Coordinator::new(config, small_annealing(), PenaltyConfig::default());
        let first = coordinator.run(&instance).expect("valid config");
        let second = coordinator.run(&instance).expect("valid config");

        assert_eq!(first.total_iterations, 3_000);
        assert_eq!(first.workers, second.workers);
        assert_eq!(first.front, second.front);
    }
}
