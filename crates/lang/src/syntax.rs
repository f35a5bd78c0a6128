
use std::fmt;

use derive_more::Display;

use hyle_core::utility::*;

/// Where a form starts in its source text, used only for diagnostics.
#[derive(Debug, Display, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[display(fmt = "{}:{}", line, column)]
pub struct Location {
    pub line: usize,
    pub column: usize,
    pub size: usize
}

impl Location {
    pub fn new(line: usize, column: usize, size: usize) -> Location {
        Location { line, column, size }
    }
}

/// The symbolic expression tree handed over by the reader.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Sexp {
    pub kind: SexpKind,
    pub loc: Location
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SexpKind {
    Num(i64),
    Str(String),
    Sym(Symbol),
    List(Vec<Sexp>),
    Vector(Vec<Sexp>),
    /// Entries in source order.
    Dict(Vec<(Sexp, Sexp)>),
    Quote(Box<Sexp>),
    Splice(Box<Sexp>),
}

impl Sexp {
    pub fn new(kind: SexpKind) -> Sexp {
        Sexp { kind, loc: Location::default() }
    }

    pub fn at(mut self, loc: Location) -> Sexp {
        self.loc = loc;
        self
    }

    pub fn num(value: i64) -> Sexp { Sexp::new(SexpKind::Num(value)) }

    pub fn str(value: &str) -> Sexp { Sexp::new(SexpKind::Str(value.to_string())) }

    pub fn sym(name: &str) -> Sexp { Sexp::new(SexpKind::Sym(name.into())) }

    pub fn list(items: Vec<Sexp>) -> Sexp { Sexp::new(SexpKind::List(items)) }

    pub fn vector(items: Vec<Sexp>) -> Sexp { Sexp::new(SexpKind::Vector(items)) }

    pub fn dict(entries: Vec<(Sexp, Sexp)>) -> Sexp { Sexp::new(SexpKind::Dict(entries)) }

    pub fn quote(body: Sexp) -> Sexp { Sexp::new(SexpKind::Quote(Box::new(body))) }

    pub fn splice(body: Sexp) -> Sexp { Sexp::new(SexpKind::Splice(Box::new(body))) }

    pub fn as_sym(&self) -> Option<Symbol> {
        match &self.kind {
            SexpKind::Sym(name) => Some(*name),
            _ => None
        }
    }

    pub fn as_list(&self) -> Option<&[Sexp]> {
        match &self.kind {
            SexpKind::List(items) => Some(items),
            _ => None
        }
    }

    /// The leading symbol of a list form, like `defn` in `(defn x 1)`.
    pub fn head_sym(&self) -> Option<Symbol> {
        self.as_list()
            .and_then(|items| items.first())
            .and_then(Sexp::as_sym)
    }
}

impl From<i64> for Sexp {
    fn from(value: i64) -> Self { Sexp::num(value) }
}

impl From<i32> for Sexp {
    fn from(value: i32) -> Self { Sexp::num(value.into()) }
}

impl From<&str> for Sexp {
    fn from(value: &str) -> Self { Sexp::str(value) }
}

/// Builds a `Sexp` from Rust tokens, for hosts without a reader.
///
/// ```
/// use hyle_lang::sexp;
/// let form = sexp!((defn id (fn {x: number} x)));
/// assert_eq!(form.to_string(), "(defn id (fn {x number} x))");
/// ```
#[macro_export]
macro_rules! sexp {
    (($($item:tt)*)) => {
        $crate::syntax::Sexp::list(vec![$($crate::sexp!($item)),*])
    };
    ([$($item:tt)*]) => {
        $crate::syntax::Sexp::vector(vec![$($crate::sexp!($item)),*])
    };
    ({$($key:tt : $value:tt),* $(,)?}) => {
        $crate::syntax::Sexp::dict(vec![
            $(($crate::syntax::Sexp::sym(stringify!($key)), $crate::sexp!($value))),*
        ])
    };
    ($value:literal) => { $crate::syntax::Sexp::from($value) };
    ($name:tt) => { $crate::syntax::Sexp::sym(stringify!($name)) };
}

fn write_seq(f: &mut fmt::Formatter<'_>, open: &str, items: &[Sexp], close: &str) -> fmt::Result {
    f.write_str(open)?;
    for (i, item) in items.iter().enumerate() {
        if i > 0 { f.write_str(" ")?; }
        write!(f, "{}", item)?;
    }
    f.write_str(close)
}

impl fmt::Display for Sexp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.kind {
            SexpKind::Num(value) => write!(f, "{}", value),
            SexpKind::Str(value) => write!(f, "\"{}\"", value.escape_debug()),
            SexpKind::Sym(name) => write!(f, "{}", name),
            SexpKind::List(items) => write_seq(f, "(", items, ")"),
            SexpKind::Vector(items) => write_seq(f, "[", items, "]"),
            SexpKind::Dict(entries) => {
                f.write_str("{")?;
                for (i, (key, value)) in entries.iter().enumerate() {
                    if i > 0 { f.write_str(", ")?; }
                    write!(f, "{} {}", key, value)?;
                }
                f.write_str("}")
            }
            SexpKind::Quote(body) => write!(f, "'{}", body),
            SexpKind::Splice(body) => write!(f, "~{}", body),
        }
    }
}
