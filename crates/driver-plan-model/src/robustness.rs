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

//! Expected cost of delays propagating between consecutive activities.

use crate::activity::Activity;
use driver_plan_core::time::Minutes;
use serde::{Deserialize, Serialize};
use statrs::distribution::{ContinuousCDF, Gamma};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RobustnessConfig {
    pub driving_delay_probability: f64,
    pub non_driving_delay_probability: f64,
    /// Mean delay in minutes as `a * d^2 + b * d + c` of the planned duration `d`.
    pub mean_delay_quadratic: f64,
    pub mean_delay_linear: f64,
    pub mean_delay_constant: f64,
    /// Delay follows a gamma distribution with shape `k * mean^2` and rate `k * mean`.
    pub gamma_coefficient: f64,
    pub cost_same_duty: f64,
    pub cost_same_project: f64,
    pub cost_different_project: f64,
}

impl Default for RobustnessConfig {
    fn default() -> Self {
        Self {
            driving_delay_probability: 0.25,
            non_driving_delay_probability: 0.05,
            mean_delay_quadratic: 0.0,
            mean_delay_linear: 0.02,
            mean_delay_constant: 3.0,
            gamma_coefficient: 0.5,
            cost_same_duty: 0.0,
            cost_same_project: 20.0,
            cost_different_project: 50.0,
        }
    }
}

impl RobustnessConfig {
    /// Configuration under which no succession carries a robustness cost.
    pub fn disabled() -> Self {
        Self {
            cost_same_duty: 0.0,
            cost_same_project: 0.0,
            cost_different_project: 0.0,
            ..Self::default()
        }
    }

    #[inline]
    pub fn mean_delay(&self, planned_duration: Minutes) -> f64 {
        let d = planned_duration as f64;
        self.mean_delay_quadratic * d * d + self.mean_delay_linear * d + self.mean_delay_constant
    }

    /// Probability that a delay of `first` exceeds `waiting` minutes.
    pub fn conflict_probability(&self, first: &Activity, waiting: Minutes) -> f64 {
        let delay_probability = if first.is_driving() {
            self.driving_delay_probability
        } else {
            self.non_driving_delay_probability
        };
        let mean = self.mean_delay(first.duration());
        if mean <= 0.0 || delay_probability <= 0.0 {
            return 0.0;
        }
        let shape = self.gamma_coefficient * mean * mean;
        let rate = self.gamma_coefficient * mean;
        match Gamma::new(shape, rate) {
            Ok(gamma) => delay_probability * (1.0 - gamma.cdf(waiting.max(0) as f64)),
            Err(_) => 0.0,
        }
    }

    /// Expected conflict cost of doing `second` right after `first`.
    pub fn succession_cost(&self, first: &Activity, second: &Activity, waiting: Minutes) -> f64 {
        let factor = match (first.duty(), second.duty(), first.project(), second.project()) {
            (Some(a), Some(b), _, _) if a == b => self.cost_same_duty,
            (_, _, Some(a), Some(b)) if a == b => self.cost_same_project,
            _ => self.cost_different_project,
        };
        if factor == 0.0 {
            return 0.0;
        }
        self.conflict_probability(first, waiting) * factor
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::activity::ActivityRequest;

    fn act(index: usize, request: ActivityRequest) -> Activity {
        Activity::from_request(index, index, &request)
    }

    #[test]
    fn test_longer_waiting_reduces_conflict() {
        let config = RobustnessConfig::default();
        let a = act(0, ActivityRequest::new(0, 1, 0, 120));
        let short = config.conflict_probability(&a, 0);
        let long = config.conflict_probability(&a, 60);
        assert!((short - config.driving_delay_probability).abs() < 1e-9);
        assert!(long < short);
        assert!(long >= 0.0);
    }

    #[test]
    fn test_cost_factor_depends_on_relation() {
        let config = RobustnessConfig::default();
        let a = act(0, ActivityRequest::new(0, 1, 0, 120).with_duty(1).with_project(7));
        let same_duty = act(1, ActivityRequest::new(1, 2, 130, 200).with_duty(1).with_project(7));
        let same_project = act(2, ActivityRequest::new(1, 2, 130, 200).with_duty(2).with_project(7));
        let other = act(3, ActivityRequest::new(1, 2, 130, 200).with_duty(3));
        assert_eq!(config.succession_cost(&a, &same_duty, 10), 0.0);
        let p = config.conflict_probability(&a, 10);
        assert!((config.succession_cost(&a, &same_project, 10) - 20.0 * p).abs() < 1e-9);
        assert!((config.succession_cost(&a, &other, 10) - 50.0 * p).abs() < 1e-9);
    }

    #[test]
    fn test_disabled_has_no_cost() {
        let config = RobustnessConfig::disabled();
        let a = act(0, ActivityRequest::new(0, 1, 0, 120));
        let b = act(1, ActivityRequest::new(1, 2, 121, 200));
        assert_eq!(config.succession_cost(&a, &b, 1), 0.0);
    }
}
