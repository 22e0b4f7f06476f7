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

use chrono::{DateTime, Utc};
use driver_plan_model::prelude::*;
use driver_plan_solver::prelude::*;
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fs::File;
use std::io::{BufReader, Write};
use std::path::{Path, PathBuf};
use std::time::Instant;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::fmt::format::FmtSpan;

/// Everything a run needs. Missing sections fall back to their defaults.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
struct RunSettings {
    generator: GeneratorConfig,
    rules: RulesConfig,
    robustness: RobustnessConfig,
    penalties: PenaltyConfig,
    annealing: AnnealingConfig,
    coordinator: CoordinatorConfig,
}

impl RunSettings {
    fn load(path: &Path) -> Result<Self, Box<dyn Error>> {
        let reader = BufReader::new(File::open(path)?);
        Ok(serde_json::from_reader(reader)?)
    }
}

#[derive(Serialize)]
struct RunRecord<'a> {
    seed: u64,
    generator_seed: u64,
    activities: usize,
    internal_drivers: usize,
    drivers: usize,
    start_ts: DateTime<Utc>,
    end_ts: DateTime<Utc>,
    runtime_ms: u128,
    iterations: u64,
    workers: &'a [WorkerStatus],
    front: Vec<&'a SolutionSnapshot>,
}

fn enable_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_span_events(FmtSpan::CLOSE)
        .with_writer(std::io::stderr)
        .init();
}

fn run(settings_path: Option<PathBuf>, output_path: Option<PathBuf>) -> Result<(), Box<dyn Error>> {
    let settings = match &settings_path {
        Some(path) => {
            tracing::info!("Loading settings from {}", path.display());
            RunSettings::load(path)?
        }
        None => RunSettings::default(),
    };

    let instance = InstanceGenerator::new(settings.generator.clone())
        .with_rules(settings.rules.clone())
        .with_robustness(settings.robustness)
        .generate()?;
    tracing::info!(
        activities = instance.activity_count(),
        internal = instance.internal_driver_count(),
        drivers = instance.driver_count(),
        "Generated instance"
    );

    let start_ts = Utc::now();
    let t0 = Instant::now();
    let coordinator = Coordinator::new(settings.coordinator, settings.annealing, settings.penalties);
    let outcome = coordinator.run(&instance)?;
    let runtime = t0.elapsed();
    let end_ts = Utc::now();

    for point in outcome.front.points() {
        tracing::info!(
            satisfaction = point.satisfaction,
            cost = point.cost,
            raw_cost = point.raw_cost,
            robustness = point.robustness,
            worker = point.worker,
            "Front point"
        );
    }
    if outcome.front.is_empty() {
        tracing::warn!("No feasible plan was found");
    }

    let record = RunRecord {
        seed: outcome.seed,
        generator_seed: settings.generator.seed,
        activities: instance.activity_count(),
        internal_drivers: instance.internal_driver_count(),
        drivers: instance.driver_count(),
        start_ts,
        end_ts,
        runtime_ms: runtime.as_millis(),
        iterations: outcome.total_iterations,
        workers: &outcome.workers,
        front: outcome.front.points().iter().map(|p| p.as_ref()).collect(),
    };
    let json = serde_json::to_string_pretty(&record)?;

    match output_path {
        Some(path) => {
            File::create(&path)?.write_all(json.as_bytes())?;
            tracing::info!("Wrote run record to {}", path.display());
        }
        None => {
            let mut stdout = std::io::stdout().lock();
            stdout.write_all(json.as_bytes())?;
            writeln!(stdout)?;
        }
    }
    Ok(())
}

fn main() {
    enable_tracing();

    let mut args = std::env::args_os().skip(1).map(PathBuf::from);
    let settings_path = args.next();
    let output_path = args.next();

    if let Err(e) = run(settings_path, output_path) {
        tracing::error!("Run failed: {}", e);
        std::process::exit(1);
    }
}
