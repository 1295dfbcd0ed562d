use std::fmt;

/// Index into the mark catalogue. Index 0 is the "unset" mark.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct MarkId(usize);

impl MarkId {
    /// The mark every lesson starts with.
    pub const UNSET: Self = Self(0);

    /// Creates a new `MarkId`
    #[must_use]
    pub fn new(id: usize) -> Self {
        Self(id)
    }

    /// Returns the underlying index
    #[must_use]
    pub fn value(&self) -> usize {
        self.0
    }

    #[must_use]
    pub fn is_unset(&self) -> bool {
        self.0 == 0
    }
}

impl fmt::Debug for MarkId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "MarkId({})", self.0)
    }
}

impl fmt::Display for MarkId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<usize> for MarkId {
    fn from(value: usize) -> Self {
        Self(value)
    }
}
