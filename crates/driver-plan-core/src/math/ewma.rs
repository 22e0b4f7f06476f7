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

use num_traits::Float;
use std::fmt::Debug;

/// Exponentially weighted moving average over a float series.
///
/// Used to smooth noisy per-interval measurements such as iterations per
/// second. Observations may be weighted by the number of steps they span.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Ewma<F> {
    alpha: F,
    value: Option<F>,
}

/// Smoothing factor outside of `(0, 1]`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct InvalidAlphaError<F> {
    value: F,
}

impl<F: Float + Debug> InvalidAlphaError<F> {
    pub fn new(value: F) -> Self {
        Self { value }
    }

    pub fn value(&self) -> F {
        self.value
    }
}

impl<F: Float + Debug> std::fmt::Display for InvalidAlphaError<F> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Invalid smoothing factor {:?}, expected a value in (0, 1]",
            self.value
        )
    }
}

impl<F: Float + Debug> std::error::Error for InvalidAlphaError<F> {}

impl<F: Float + Debug> Ewma<F> {
    #[inline]
    pub fn new(alpha: F) -> Result<Self, InvalidAlphaError<F>> {
        if !alpha.is_finite() || alpha <= F::zero() || alpha > F::one() {
            return Err(InvalidAlphaError::new(alpha));
        }
        Ok(Self { alpha, value: None })
    }

    /// Smoothing factor such that an observation loses half of its weight
    /// after `half_life` further observations.
    pub fn from_half_life(half_life: F) -> Result<Self, InvalidAlphaError<F>> {
        if !half_life.is_finite() || half_life <= F::zero() {
            return Err(InvalidAlphaError::new(half_life));
        }
        let one = F::one();
        let half = (one + one).recip();
        Self::new(one - half.powf(one / half_life))
    }

    #[inline]
    pub fn alpha(&self) -> F {
        self.alpha
    }

    #[inline]
    pub fn value(&self) -> Option<F> {
        self.value
    }

    #[inline]
    pub fn is_initialized(&self) -> bool {
        self.value.is_some()
    }

    #[inline]
    pub fn reset(&mut self) {
        self.value = None;
    }

    pub fn observe(&mut self, x: F) -> F {
        self.observe_n(x, 1)
    }

    /// Observes `x` as if it had been seen `steps` times in a row.
    pub fn observe_n(&mut self, x: F, steps: u32) -> F {
        let next = match self.value {
            None => x,
            Some(current) if steps == 0 => return current,
            Some(current) => {
                let keep = (F::one() - self.alpha).powi(steps as i32);
                x * (F::one() - keep) + current * keep
            }
        };
        self.value = Some(next);
        next
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rejects_out_of_range_alpha() {
        assert!(Ewma::new(0.0).is_err());
        assert!(Ewma::new(1.5).is_err());
        assert!(Ewma::new(f64::NAN).is_err());
        assert!(Ewma::new(1.0).is_ok());
    }

    #[test]
    fn test_first_observation_initializes() {
        let mut ewma = Ewma::new(0.5).unwrap();
        assert_eq!(ewma.value(), None);
        assert_eq!(ewma.observe(100.0), 100.0);
        assert!((ewma.observe(200.0) - 150.0).abs() < 1e-12);
    }

    #[test]
    fn test_observe_n_matches_repeated_observe() {
        let mut a = Ewma::new(0.3).unwrap();
        let mut b = Ewma::new(0.3).unwrap();
        a.observe(10.0);
        b.observe(10.0);
        for _ in 0..4 {
            a.observe(2.0);
        }
        b.observe_n(2.0, 4);
        assert!((a.value().unwrap() - b.value().unwrap()).abs() < 1e-12);
    }

    #[test]
    fn test_zero_steps_keeps_value() {
        let mut ewma = Ewma::new(0.3).unwrap();
        ewma.observe(7.0);
        assert_eq!(ewma.observe_n(100.0, 0), 7.0);
    }

    #[test]
    fn test_half_life() {
        let ewma = Ewma::from_half_life(1.0).unwrap();
        assert!((ewma.alpha() - 0.5).abs() < 1e-12);
        assert!(Ewma::from_half_life(0.0).is_err());
        assert!(Ewma::<f64>::from_half_life(f64::INFINITY).is_err());
    }

    #[test]
    fn test_reset() {
        let mut ewma = Ewma::new(0.2).unwrap();
        ewma.observe(3.0);
        ewma.reset();
        assert!(!ewma.is_initialized());
    }
}
