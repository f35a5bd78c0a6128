
use crate::utility::*;
use crate::term::*;
use crate::database::Database;

impl Database {
    pub fn sort(&mut self, level: usize) -> Term {
        self.make_term(TermData::Sort { level })
    }

    pub fn constant(&mut self, name: impl Into<Symbol>) -> Term {
        let name = name.into();
        self.make_term(TermData::Const { name })
    }

    pub fn num(&mut self, value: i64) -> Term {
        self.make_term(TermData::Num { value })
    }

    pub fn str(&mut self, value: &str) -> Term {
        let value = value.to_string();
        self.make_term(TermData::Str { value })
    }

    pub fn bound(&mut self, index: usize) -> Term {
        let index = index.into();
        self.make_term(TermData::Bound { index })
    }

    pub fn pi(&mut self, domain: Term, body: Term) -> Term {
        self.make_term(TermData::Pi { domain, body })
    }

    pub fn lambda(&mut self, domain: Term, body: Term) -> Term {
        self.make_term(TermData::Lambda { domain, body })
    }

    pub fn apply(&mut self, fun: Term, arg: Term) -> Term {
        self.make_term(TermData::Apply { fun, arg })
    }

    /// `head a b c` as `((head a) b) c`.
    pub fn apply_spine(&mut self, head: Term, args: impl IntoIterator<Item = Term>) -> Term {
        args.into_iter().fold(head, |fun, arg| self.apply(fun, arg))
    }

    pub fn quote(&mut self, body: Term) -> Term {
        self.make_term(TermData::Quote { body })
    }

    pub fn splice(&mut self, body: Term) -> Term {
        self.make_term(TermData::Splice { body })
    }

    pub fn expand(&mut self, head: Term, args: Vec<Term>) -> Term {
        self.make_term(TermData::Expand { head, args })
    }
}
