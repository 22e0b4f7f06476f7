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

pub trait IdentifierMarkerName: Copy {
    const NAME: &'static str;
}

#[repr(transparent)]
#[must_use]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Identifier<I, U>(I, core::marker::PhantomData<U>);

impl<I, U> Identifier<I, U> {
    #[inline]
    pub const fn new(id: I) -> Self {
        Self(id, core::marker::PhantomData)
    }

    #[inline]
    pub fn value(&self) -> &I {
        &self.0
    }

    #[inline]
    pub fn into_inner(self) -> I {
        self.0
    }
}

impl<U> Identifier<usize, U> {
    /// Position of the identified item in its owning table.
    #[inline]
    pub const fn index(self) -> usize {
        self.0
    }
}

impl<U> From<usize> for Identifier<usize, U> {
    #[inline]
    fn from(value: usize) -> Self {
        Self::new(value)
    }
}

impl<I, U> std::fmt::Display for Identifier<I, U>
where
    I: std::fmt::Display,
    U: IdentifierMarkerName,
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}({})", U::NAME, self.0)
    }
}

macro_rules! identifier_marker {
    ($marker:ident, $name:literal, $alias:ident) => {
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
        pub struct $marker;

        impl IdentifierMarkerName for $marker {
            const NAME: &'static str = $name;
        }

        pub type $alias = Identifier<usize, $marker>;
    };
}

identifier_marker!(ActivityIdentifierMarker, "ActivityIndex", ActivityIndex);
identifier_marker!(DriverIdentifierMarker, "DriverIndex", DriverIndex);
identifier_marker!(StationIdentifierMarker, "StationIndex", StationIndex);
identifier_marker!(ExternalTypeIdentifierMarker, "ExternalTypeIndex", ExternalTypeIndex);
identifier_marker!(SalaryIdentifierMarker, "SalaryIndex", SalaryIndex);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_uses_marker_name() {
        assert_eq!(ActivityIndex::new(3).to_string(), "ActivityIndex(3)");
        assert_eq!(DriverIndex::new(0).to_string(), "DriverIndex(0)");
    }

    #[test]
    fn test_ordering_follows_inner_value() {
        let a = DriverIndex::new(1);
        let b = DriverIndex::new(2);
        assert!(a < b);
        assert_eq!(b.index(), 2);
        assert_eq!(DriverIndex::from(2), b);
    }
}
