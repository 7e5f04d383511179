use std::fmt;

/// Character offset into the source.
#[derive(
    Debug, Copy, Clone, Default, PartialEq, Eq, PartialOrd, Ord, derive_more::Deref, derive_more::From,
)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct BytePos(pub usize);

impl std::ops::Add<usize> for BytePos {
    type Output = Self;
    fn add(self, rhs: usize) -> Self::Output {
        Self(self.0 + rhs)
    }
}

/// Half open range `[start, end)` of the source.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Span {
    pub start: BytePos,
    pub end: BytePos,
}

impl Span {
    pub fn new(start: impl Into<BytePos>, end: impl Into<BytePos>) -> Self {
        Self {
            start: start.into(),
            end: end.into(),
        }
    }

    /// Span a single position.
    pub fn at(position: impl Into<BytePos>) -> Self {
        let pos = position.into();
        Self {
            start: pos,
            end: pos + 1,
        }
    }

    /// Zero width span at a position.
    pub fn empty(position: impl Into<BytePos>) -> Self {
        let pos = position.into();
        Self {
            start: pos,
            end: pos,
        }
    }
}

impl fmt::Display for Span {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}..{}", self.start.0, self.end.0)
    }
}

/// Value with its location in the source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WithSpan<T> {
    pub value: T,
    pub span: Span,
}

impl<T: fmt::Display> fmt::Display for WithSpan<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.value.fmt(f)
    }
}
