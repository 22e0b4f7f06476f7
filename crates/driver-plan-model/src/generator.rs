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

//! Seeded synthetic instances for experiments, benchmarks and tests.

use crate::activity::ActivityRequest;
use crate::builder::InstanceBuilder;
use crate::driver::{ExternalDriverType, HomeTravel, InternalDriverRequest};
use crate::err::InstanceError;
use crate::instance::Instance;
use crate::robustness::RobustnessConfig;
use crate::rules::RulesConfig;
use crate::salary::SalarySettings;
use driver_plan_core::time::{MINUTES_PER_DAY, MINUTES_PER_HOUR, Minutes};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeneratorConfig {
    pub seed: u64,
    pub horizon: Minutes,
    pub station_count: usize,
    pub duty_count: usize,
    pub max_activities_per_duty: usize,
    pub min_station_travel_time: Minutes,
    pub max_station_travel_time: Minutes,
    pub internal_driver_count: usize,
    /// The last this many internal drivers are optional.
    #[serde(default)]
    pub optional_driver_count: usize,
    pub external_type_count: usize,
    pub external_drivers_per_type: usize,
    pub min_contract_time: Minutes,
    pub max_contract_time: Minutes,
    pub qualification_count: usize,
    pub qualification_probability: f64,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        let horizon = 2 * MINUTES_PER_DAY;
        Self {
            seed: 42,
            horizon,
            station_count: 10,
            duty_count: 15,
            max_activities_per_duty: 4,
            min_station_travel_time: 30,
            max_station_travel_time: 2 * MINUTES_PER_HOUR,
            internal_driver_count: 10,
            optional_driver_count: 0,
            external_type_count: 1,
            external_drivers_per_type: 3,
            min_contract_time: horizon / 6,
            max_contract_time: horizon / 3,
            qualification_count: 0,
            qualification_probability: 0.9,
        }
    }
}

impl GeneratorConfig {
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    pub fn with_duty_count(mut self, count: usize) -> Self {
        self.duty_count = count;
        self
    }

    pub fn with_optional_driver_count(mut self, count: usize) -> Self {
        self.optional_driver_count = count;
        self
    }

    pub fn with_driver_counts(mut self, internal: usize, external_types: usize, per_type: usize) -> Self {
        self.internal_driver_count = internal;
        self.external_type_count = external_types;
        self.external_drivers_per_type = per_type;
        self
    }
}

#[derive(Debug, Clone)]
pub struct InstanceGenerator {
    config: GeneratorConfig,
    rules: RulesConfig,
    robustness: RobustnessConfig,
}

impl InstanceGenerator {
    pub fn new(config: GeneratorConfig) -> Self {
        let rules = RulesConfig::default().with_horizon(config.horizon);
        Self {
            config,
            rules,
            robustness: RobustnessConfig::default(),
        }
    }

    pub fn with_rules(mut self, rules: RulesConfig) -> Self {
        self.rules = rules.with_horizon(self.config.horizon);
        self
    }

    pub fn with_robustness(mut self, robustness: RobustnessConfig) -> Self {
        self.robustness = robustness;
        self
    }

    #[inline]
    pub fn config(&self) -> &GeneratorConfig {
        &self.config
    }

    fn travel_matrix<R: Rng>(&self, rng: &mut R) -> (Vec<Minutes>, Vec<f64>) {
        let n = self.config.station_count;
        let lo = self.config.min_station_travel_time.max(0);
        let hi = self.config.max_station_travel_time.max(lo);
        let mut times = vec![0; n * n];
        for i in 0..n {
            for j in (i + 1)..n {
                let t = rng.random_range(lo..=hi);
                times[i * n + j] = t;
                times[j * n + i] = t;
            }
        }
        let distances = times.iter().map(|&t| t as f64 * 0.9).collect();
        (times, distances)
    }

    fn home<R: Rng>(&self, rng: &mut R) -> HomeTravel {
        let times: Vec<Minutes> = (0..self.config.station_count)
            .map(|_| rng.random_range(10..=90))
            .collect();
        let distances = times.iter().map(|&t| t as f64 * 0.8).collect();
        HomeTravel::new(times, distances)
    }

    fn other_station<R: Rng>(&self, rng: &mut R, station: usize) -> usize {
        let n = self.config.station_count;
        if n < 2 {
            return station;
        }
        let r = rng.random_range(0..n - 1);
        if r >= station { r + 1 } else { r }
    }

    fn duties<R: Rng>(&self, rng: &mut R) -> Vec<ActivityRequest> {
        let cfg = &self.config;
        let latest_start = (cfg.horizon - 12 * MINUTES_PER_HOUR).max(1);
        let mut activities = Vec::new();
        for duty in 0..cfg.duty_count {
            let count = rng.random_range(1..=cfg.max_activities_per_duty.max(1));
            let mut station = rng.random_range(0..cfg.station_count);
            let mut time = rng.random_range(0..latest_start);
            for _ in 0..count {
                let duration = rng.random_range(MINUTES_PER_HOUR..=3 * MINUTES_PER_HOUR);
                let end_station = self.other_station(rng, station);
                let mut request = ActivityRequest::new(station, end_station, time, time + duration)
                    .with_duty(duty as u32)
                    .with_project((duty % 3) as u32)
                    .with_driving(rng.random_bool(0.8));
                if cfg.qualification_count > 0 {
                    request = request.with_qualification(rng.random_range(0..cfg.qualification_count));
                }
                activities.push(request);
                station = end_station;
                time += duration + rng.random_range(0..=MINUTES_PER_HOUR);
            }
        }
        activities
    }

    #[tracing::instrument(level = "debug", skip(self))]
    pub fn generate(&self) -> Result<Instance, InstanceError> {
        let cfg = &self.config;
        let mut rng = ChaCha8Rng::seed_from_u64(cfg.seed);

        let (times, distances) = self.travel_matrix(&mut rng);
        let mut builder = InstanceBuilder::new(self.rules.clone())
            .with_robustness(self.robustness)
            .with_travel_matrices(cfg.station_count, times, distances)
            .with_qualification_count(cfg.qualification_count);

        let internal_salary = builder.add_salary_settings(SalarySettings::standard());
        let external_salary = builder.add_salary_settings(SalarySettings::flat(0.9, 4 * MINUTES_PER_HOUR));

        builder.extend_activities(self.duties(&mut rng));

        let first_optional = cfg.internal_driver_count.saturating_sub(cfg.optional_driver_count);
        for i in 0..cfg.internal_driver_count {
            let lo = cfg.min_contract_time.min(cfg.max_contract_time);
            let contract = rng.random_range(lo..=cfg.max_contract_time.max(lo));
            let mut request = InternalDriverRequest::new(format!("Driver {}", i + 1), internal_salary, contract, self.home(&mut rng))
                .with_hotel_allowed(rng.random_bool(0.5))
                .with_optional(i >= first_optional);
            if cfg.qualification_count > 0 {
                let qualifications = (0..cfg.qualification_count)
                    .filter(|_| rng.random_bool(cfg.qualification_probability))
                    .collect();
                request = request.with_qualifications(qualifications);
            }
            builder.add_internal_driver(request);
        }

        for t in 0..cfg.external_type_count {
            let driver_type = ExternalDriverType::new(format!("Company {}", t + 1), external_salary, self.home(&mut rng))
                .with_shift_bounds(0, (cfg.external_drivers_per_type * 5) as u32);
            builder.add_external_type(driver_type, cfg.external_drivers_per_type);
        }

        builder.build()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn small() -> GeneratorConfig {
        GeneratorConfig::default()
            .with_duty_count(6)
            .with_driver_counts(4, 1, 2)
    }

    #[test]
    fn test_same_seed_same_instance() {
        let a = InstanceGenerator::new(small()).generate().unwrap();
        let b = InstanceGenerator::new(small()).generate().unwrap();
        assert_eq!(a.activities(), b.activities());
        assert_eq!(a.driver_count(), b.driver_count());
    }

    #[test]
    fn test_generated_counts() {
        let instance = InstanceGenerator::new(small()).generate().unwrap();
        assert_eq!(instance.internal_driver_count(), 4);
        assert_eq!(instance.driver_count(), 6);
        assert!(instance.activity_count() >= 6);
        assert!(instance.activity_count() <= 6 * 4);
        assert_eq!(instance.required_internal_driver_count(), 4);
    }

    #[test]
    fn test_optional_drivers_come_last() {
        let instance = InstanceGenerator::new(small().with_optional_driver_count(1))
            .generate()
            .unwrap();
        assert_eq!(instance.required_internal_driver_count(), 3);
        let optional: Vec<_> = instance
            .internal_drivers()
            .iter()
            .map(|d| d.as_internal().is_some_and(|d| d.is_optional()))
            .collect();
        assert_eq!(optional, vec![false, false, false, true]);
    }

    #[test]
    fn test_activities_within_a_duty_chain() {
        let instance = InstanceGenerator::new(small().with_seed(7)).generate().unwrap();
        for a in instance.activities() {
            assert!(a.end_time() > a.start_time());
            assert_ne!(a.start_station(), a.end_station());
        }
    }
}
