
use std::{ops, fmt};

use derive_more::{From, Deref, Display};
use internment::Intern;

#[derive(Debug, Clone, Copy, Hash, PartialEq, Eq)]
pub struct Symbol(Intern<String>);

impl From<&str> for Symbol {
    fn from(s: &str) -> Self { Symbol(Intern::new(s.to_string())) }
}

impl AsRef<str> for Symbol {
    fn as_ref(&self) -> &str { self.0.as_str() }
}

impl ops::Deref for Symbol {
    type Target = String;
    fn deref(&self) -> &Self::Target { &self.0 }
}

impl Default for Symbol {
    fn default() -> Self { Self::from("_") }
}

impl fmt::Display for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_ref())
    }
}

const RED_ZONE: usize = 64 * 1024;
const STACK_GROWTH: usize = 1024 * 1024;

/// Runs a recursive step, growing the stack first when it is close to the limit.
#[inline]
pub fn with_stack<R>(f: impl FnOnce() -> R) -> R {
    stacker::maybe_grow(RED_ZONE, STACK_GROWTH, f)
}

/// Which side of the staging boundary a definition lives on.
#[derive(Debug, Hash, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Object,
    Meta
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Phase::Object => write!(f, "object"),
            Phase::Meta => write!(f, "meta")
        }
    }
}

/// A de Bruijn index, counted from the innermost binder outward.
#[derive(Debug, Clone, Copy, Hash, PartialEq, Eq, PartialOrd, Ord, From, Deref, Display)]
pub struct Index(usize);

impl ops::Add<usize> for Index {
    type Output = Self;

    fn add(self, rhs: usize) -> Self::Output {
        (*self + rhs).into()
    }
}

impl Index {
    /// Position in a context of length `len`, or `None` when the index escapes it.
    pub fn to_level(self, len: usize) -> Option<Level> {
        if *self < len { Some((len - *self - 1).into()) }
        else { None }
    }

    pub fn pred(self) -> Index {
        (*self).saturating_sub(1).into()
    }
}

/// A position in a context counted from the outermost binder.
#[derive(Debug, Clone, Copy, Hash, PartialEq, Eq, PartialOrd, Ord, From, Deref, Display)]
pub struct Level(usize);
