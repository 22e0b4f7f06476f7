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

pub const DEFAULT_EPSILON: f64 = 1e-6;

#[inline]
pub fn approx_eq(a: f64, b: f64, epsilon: f64) -> bool {
    let scale = a.abs().max(b.abs()).max(1.0);
    (a - b).abs() <= epsilon * scale
}

#[inline]
pub fn approx_zero(value: f64, epsilon: f64) -> bool {
    value.abs() <= epsilon
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_relative_comparison_for_large_values() {
        assert!(approx_eq(1.0e9, 1.0e9 + 1.0, DEFAULT_EPSILON));
        assert!(!approx_eq(1.0, 1.1, DEFAULT_EPSILON));
    }

    #[test]
    fn test_absolute_comparison_near_zero() {
        assert!(approx_zero(1e-9, DEFAULT_EPSILON));
        assert!(!approx_zero(-0.01, DEFAULT_EPSILON));
    }
}
