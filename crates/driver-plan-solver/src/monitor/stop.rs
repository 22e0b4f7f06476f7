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

use parking_lot::Mutex;
use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering::Relaxed};

/// Cheap cooperative stop token shared across threads.
#[derive(Clone, Default, Debug)]
pub struct StopToken(Arc<AtomicBool>);

impl StopToken {
    #[inline]
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn is_set(&self) -> bool {
        self.0.load(Relaxed)
    }

    #[inline]
    pub fn request_stop(&self) {
        self.0.store(true, Relaxed)
    }
}

impl PartialEq for StopToken {
    /// Equality is based on identity, not on the current value.
    #[inline]
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }
}

impl Eq for StopToken {}

impl fmt::Display for StopToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "StopToken(set: {})", self.is_set())
    }
}

/// Tokens of all running workers, cancelled together.
///
/// Registration and cancellation share one lock, so a worker registered
/// after [`StopGroup::cancel_all`] starts out stopped.
#[derive(Debug, Default)]
pub struct StopGroup {
    inner: Mutex<StopGroupInner>,
}

#[derive(Debug, Default)]
struct StopGroupInner {
    tokens: Vec<StopToken>,
    cancelled: bool,
}

impl StopGroup {
    #[inline]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a token belonging to the group.
    pub fn register(&self) -> StopToken {
        let token = StopToken::new();
        let mut inner = self.inner.lock();
        if inner.cancelled {
            token.request_stop();
        }
        inner.tokens.push(token.clone());
        token
    }

    pub fn cancel_all(&self) {
        let mut inner = self.inner.lock();
        inner.cancelled = true;
        for token in &inner.tokens {
            token.request_stop();
        }
    }

    #[inline]
    pub fn is_cancelled(&self) -> bool {
        self.inner.lock().cancelled
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.inner.lock().tokens.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stop_token_identity_and_behavior() {
        let a = StopToken::new();
        let b = a.clone();
        let c = StopToken::new();

        assert_eq!(a, b);
        assert_ne!(a, c);
        assert!(!a.is_set());

        b.request_stop();
        assert!(a.is_set());
        assert!(!c.is_set());
        assert!(a.to_string().contains("set: true"));
    }

    #[test]
    fn test_cancel_all_reaches_every_token() {
        let group = StopGroup::new();
        let tokens: Vec<StopToken> = (0..4).map(|_| group.register()).collect();
        assert_eq!(group.len(), 4);
        assert!(tokens.iter().all(|t| !t.is_set()));
        group.cancel_all();
        assert!(tokens.iter().all(StopToken::is_set));
        assert!(group.is_cancelled());
    }

    #[test]
    fn test_late_registration_starts_stopped() {
        let group = StopGroup::new();
        group.cancel_all();
        assert!(group.register().is_set());
    }
}
