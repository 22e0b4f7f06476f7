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

use driver_plan_model::common::ActivityIndex;
use driver_plan_model::instance::Instance;

/// Positions `(first, last)` of the part of a path whose cost can change
/// when the activity at `at` is edited.
///
/// The range covers the activity's shift plus the neighbouring shift on
/// every side the edit touches, and is widened over hotel stays so it
/// neither starts after one nor ends before one. `get` reads the path;
/// `hotel_after` reads the current hotel flags.
pub(crate) fn relevant_range<G, H>(
    instance: &Instance,
    len: usize,
    at: usize,
    get: G,
    hotel_after: H,
) -> (usize, usize)
where
    G: Fn(usize) -> ActivityIndex,
    H: Fn(ActivityIndex) -> bool,
{
    debug_assert!(at < len);
    let joined = |i: usize| instance.is_same_shift(get(i), get(i + 1));
    let shift_start = |mut i: usize| {
        while i > 0 && joined(i - 1) {
            i -= 1;
        }
        i
    };
    let shift_end = |mut i: usize| {
        while i + 1 < len && joined(i) {
            i += 1;
        }
        i
    };

    let mut first = shift_start(at);
    let mut last = shift_end(at);
    let at_edge = first == at || last == at;

    if first == at && first > 0 {
        first = shift_start(first - 1);
    }
    while first > 0 && hotel_after(get(first - 1)) {
        first = shift_start(first - 1);
    }
    if at_edge && last + 1 < len {
        last = shift_end(last + 1);
    }
    while last + 1 < len && hotel_after(get(last)) {
        last = shift_end(last + 1);
    }
    (first, last)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{day_instance, idx};

    // Activities of `day_instance`: 0, 1 and 2 form one shift, 3 and 4 one
    // the next day, 5 one the day after.
    fn range(at: usize, hotels: &[usize]) -> (usize, usize) {
        let instance = day_instance();
        let path: Vec<ActivityIndex> = (0..6).map(idx).collect();
        relevant_range(&instance, path.len(), at, |i| path[i], |a| {
            hotels.contains(&a.index())
        })
    }

    #[test]
    fn test_middle_of_shift_stays_in_shift() {
        assert_eq!(range(1, &[]), (0, 2));
    }

    #[test]
    fn test_shift_edges_reach_the_neighbouring_shifts() {
        assert_eq!(range(0, &[]), (0, 4));
        assert_eq!(range(2, &[]), (0, 4));
        assert_eq!(range(3, &[]), (0, 5));
        assert_eq!(range(5, &[]), (3, 5));
    }

    #[test]
    fn test_hotel_stays_widen_the_range() {
        assert_eq!(range(5, &[2]), (0, 5));
        assert_eq!(range(1, &[2]), (0, 4));
        assert_eq!(range(1, &[4]), (0, 2));
    }

    #[test]
    fn test_single_activity() {
        let instance = day_instance();
        assert_eq!(relevant_range(&instance, 1, 0, |_| idx(3), |_| false), (0, 0));
    }
}
