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

use fixedbitset::FixedBitSet;

/// Dense boolean relation over pairs of activities.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PairMask {
    rows: Vec<FixedBitSet>,
}

impl PairMask {
    #[inline]
    pub fn new(len: usize) -> Self {
        Self {
            rows: (0..len).map(|_| FixedBitSet::with_capacity(len)).collect(),
        }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    #[inline]
    pub fn set(&mut self, first: usize, second: usize, value: bool) {
        self.rows[first].set(second, value);
    }

    #[inline]
    pub fn contains(&self, first: usize, second: usize) -> bool {
        self.rows[first].contains(second)
    }

    #[inline]
    pub fn row(&self, first: usize) -> &FixedBitSet {
        &self.rows[first]
    }

    pub fn count_ones(&self) -> usize {
        self.rows.iter().map(|r| r.count_ones(..)).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_set_and_contains_are_directed() {
        let mut mask = PairMask::new(3);
        mask.set(0, 2, true);
        assert!(mask.contains(0, 2));
        assert!(!mask.contains(2, 0));
        assert_eq!(mask.count_ones(), 1);
        mask.set(0, 2, false);
        assert_eq!(mask.count_ones(), 0);
    }

    #[test]
    fn test_row_lists_successors() {
        let mut mask = PairMask::new(4);
        mask.set(1, 2, true);
        mask.set(1, 3, true);
        let row: Vec<usize> = mask.row(1).ones().collect();
        assert_eq!(row, vec![2, 3]);
    }
}
