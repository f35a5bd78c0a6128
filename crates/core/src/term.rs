
use std::fmt;

use crate::hc::*;
use crate::utility::*;
use crate::database::Database;

pub type Term = Hc<TermData>;

#[derive(Debug, Hash, Clone, PartialEq, Eq)]
pub enum TermData {
    Sort {
        level: usize
    },
    Const {
        name: Symbol
    },
    Num {
        value: i64
    },
    Str {
        value: String
    },
    Bound {
        index: Index
    },
    Pi {
        domain: Term,
        body: Term
    },
    Lambda {
        domain: Term,
        body: Term
    },
    Apply {
        fun: Term,
        arg: Term
    },
    Quote {
        body: Term
    },
    Splice {
        body: Term
    },
    /// A macro application that has not been expanded yet.
    Expand {
        head: Term,
        args: Vec<Term>
    },
}

impl TermData {
    pub fn as_sort(&self) -> Option<usize> {
        match self {
            TermData::Sort { level } => Some(*level),
            _ => None
        }
    }

    /// Splits `f a b c` into `f` and `[a, b, c]`.
    pub fn spine(&self) -> (&TermData, Vec<&Term>) {
        let mut head = self;
        let mut args = vec![];
        while let TermData::Apply { fun, arg } = head {
            args.push(arg);
            head = fun.as_ref();
        }
        args.reverse();
        (head, args)
    }
}

impl fmt::Display for TermData {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TermData::Sort { level } => write!(f, "(sort {})", level),
            TermData::Const { name } => write!(f, "{}", name),
            TermData::Num { value } => write!(f, "{}", value),
            TermData::Str { value } => write!(f, "\"{}\"", value.escape_debug()),
            TermData::Bound { index } => write!(f, "#{}", index),
            TermData::Pi { domain, body } => write!(f, "(pi {{_: {}}} {})", domain, body),
            TermData::Lambda { domain, body } => write!(f, "(fn {{_: {}}} {})", domain, body),
            TermData::Apply { .. } => {
                let (head, args) = self.spine();
                write!(f, "({}", head)?;
                for arg in args {
                    write!(f, " {}", arg)?;
                }
                write!(f, ")")
            }
            TermData::Quote { body } => write!(f, "(quote {})", body),
            TermData::Splice { body } => write!(f, "(splice {})", body),
            TermData::Expand { head, args } => {
                write!(f, "(expand {}", head)?;
                for arg in args {
                    write!(f, " {}", arg)?;
                }
                write!(f, ")")
            }
        }
    }
}

pub trait TermExt {
    /// Adds `amount` to every free index at or above `cutoff`.
    fn shift(&self, db: &mut Database, amount: usize, cutoff: usize) -> Self;
    /// Replaces the variable `index` by `replacement`, removing that binder from scope.
    fn subst(&self, db: &mut Database, index: Index, replacement: &Self) -> Self;
}

impl TermExt for Term {
    fn shift(&self, db: &mut Database, amount: usize, cutoff: usize) -> Self {
        if amount == 0 { return self.clone() }
        with_stack(|| match self.cloned() {
            TermData::Pi { domain, body } => {
                let domain = domain.shift(db, amount, cutoff);
                let body = body.shift(db, amount, cutoff + 1);
                db.make_term(TermData::Pi { domain, body })
            }
            TermData::Lambda { domain, body } => {
                let domain = domain.shift(db, amount, cutoff);
                let body = body.shift(db, amount, cutoff + 1);
                db.make_term(TermData::Lambda { domain, body })
            }
            TermData::Apply { fun, arg } => {
                let fun = fun.shift(db, amount, cutoff);
                let arg = arg.shift(db, amount, cutoff);
                db.make_term(TermData::Apply { fun, arg })
            }
            TermData::Quote { body } => {
                let body = body.shift(db, amount, cutoff);
                db.make_term(TermData::Quote { body })
            }
            TermData::Splice { body } => {
                let body = body.shift(db, amount, cutoff);
                db.make_term(TermData::Splice { body })
            }
            TermData::Expand { head, args } => {
                let head = head.shift(db, amount, cutoff);
                let args = args.iter()
                    .map(|arg| arg.shift(db, amount, cutoff))
                    .collect();
                db.make_term(TermData::Expand { head, args })
            }
            TermData::Bound { index } => {
                let index = if *index < cutoff { index } else { index + amount };
                db.make_term(TermData::Bound { index })
            }
            TermData::Sort { .. }
            | TermData::Const { .. }
            | TermData::Num { .. }
            | TermData::Str { .. } => self.clone(),
        })
    }

    fn subst(&self, db: &mut Database, index: Index, replacement: &Self) -> Self {
        with_stack(|| match self.cloned() {
            TermData::Pi { domain, body } => {
                let domain = domain.subst(db, index, replacement);
                let lifted = replacement.shift(db, 1, 0);
                let body = body.subst(db, index + 1, &lifted);
                db.make_term(TermData::Pi { domain, body })
            }
            TermData::Lambda { domain, body } => {
                let domain = domain.subst(db, index, replacement);
                let lifted = replacement.shift(db, 1, 0);
                let body = body.subst(db, index + 1, &lifted);
                db.make_term(TermData::Lambda { domain, body })
            }
            TermData::Apply { fun, arg } => {
                let fun = fun.subst(db, index, replacement);
                let arg = arg.subst(db, index, replacement);
                db.make_term(TermData::Apply { fun, arg })
            }
            TermData::Quote { body } => {
                let body = body.subst(db, index, replacement);
                db.make_term(TermData::Quote { body })
            }
            TermData::Splice { body } => {
                let body = body.subst(db, index, replacement);
                db.make_term(TermData::Splice { body })
            }
            TermData::Expand { head, args } => {
                let head = head.subst(db, index, replacement);
                let args = args.iter()
                    .map(|arg| arg.subst(db, index, replacement))
                    .collect();
                db.make_term(TermData::Expand { head, args })
            }
            TermData::Bound { index: var } => {
                if var == index { replacement.clone() }
                else if var > index { db.make_term(TermData::Bound { index: var.pred() }) }
                else { self.clone() }
            }
            TermData::Sort { .. }
            | TermData::Const { .. }
            | TermData::Num { .. }
            | TermData::Str { .. } => self.clone(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn samples(db: &mut Database) -> Vec<Term> {
        let number = db.constant("number");
        let v0 = db.bound(0);
        let v1 = db.bound(1);
        let v2 = db.bound(2);
        let s0 = db.sort(0);
        let id = db.lambda(v0.clone(), v0.clone());
        let poly = db.lambda(s0.clone(), id.clone());
        let open = db.apply(v1.clone(), v2.clone());
        let open_pi = db.pi(v0.clone(), open.clone());
        let seven = db.num(7);
        let quoted = db.quote(open.clone());
        let expand = db.expand(number.clone(), vec![v0.clone(), seven]);
        vec![number, v0, v1, v2, s0, id, poly, open, open_pi, quoted, expand]
    }

    #[test]
    fn shift_by_zero_is_identity() {
        let mut db = Database::new();
        for t in samples(&mut db) {
            for cutoff in 0..3 {
                assert_eq!(t.shift(&mut db, 0, cutoff), t);
            }
        }
    }

    #[test]
    fn subst_cancels_shift() {
        let mut db = Database::new();
        let replacement = db.str("s");
        for t in samples(&mut db) {
            let shifted = t.shift(&mut db, 1, 0);
            assert_eq!(shifted.subst(&mut db, 0.into(), &replacement), t);
        }
    }

    #[test]
    fn shift_respects_cutoff() {
        let mut db = Database::new();
        let v0 = db.bound(0);
        let v1 = db.bound(1);
        let v3 = db.bound(3);
        // Under the binder, #0 is bound and #1 is free.
        let body = db.apply(v0.clone(), v1.clone());
        let t = db.lambda(v1, body);
        let expected_body = db.apply(v0, v3.clone());
        let expected = db.lambda(v3, expected_body);
        assert_eq!(t.shift(&mut db, 2, 0), expected);
    }

    #[test]
    fn shift_commutes_with_subst() {
        let mut db = Database::new();
        let replacements = vec![db.bound(0), db.bound(2), db.str("s")];
        for t in samples(&mut db) {
            for s in replacements.iter() {
                for j in 0..3 {
                    for c in 0..=j {
                        for d in 1..3 {
                            let lhs = t.subst(&mut db, j.into(), s).shift(&mut db, d, c);
                            let shifted = t.shift(&mut db, d, c);
                            let lifted = s.shift(&mut db, d, c);
                            let rhs = shifted.subst(&mut db, (j + d).into(), &lifted);
                            assert_eq!(lhs, rhs, "{} [#{} := {}] shifted by {} from {}", t, j, s, d, c);
                        }
                    }
                }
            }
        }
    }

    #[test]
    fn subst_replaces_and_lowers() {
        let mut db = Database::new();
        let v0 = db.bound(0);
        let v1 = db.bound(1);
        let v2 = db.bound(2);
        let x = db.constant("x");
        // #0 #2  [#0 := x]  ==>  x #1
        let t = db.apply(v0, v2);
        let expected = db.apply(x.clone(), v1.clone());
        assert_eq!(t.subst(&mut db, 0.into(), &x), expected);
    }

    #[test]
    fn subst_lifts_replacement_under_binders() {
        let mut db = Database::new();
        let v0 = db.bound(0);
        let v1 = db.bound(1);
        let s0 = db.sort(0);
        // (fn {_: *} #1) [#0 := #0]  ==>  (fn {_: *} #1)
        let t = db.lambda(s0.clone(), v1.clone());
        assert_eq!(t.subst(&mut db, 0.into(), &v0), t);
        // (fn {_: *} #1) [#0 := #5]  ==>  (fn {_: *} #6)
        let v5 = db.bound(5);
        let v6 = db.bound(6);
        let expected = db.lambda(s0, v6);
        assert_eq!(t.subst(&mut db, 0.into(), &v5), expected);
    }

    #[test]
    fn display_renders_spines_flat() {
        let mut db = Database::new();
        let f = db.constant("f");
        let a = db.num(1);
        let b = db.str("two");
        let t = db.apply_spine(f, [a, b]);
        assert_eq!(t.to_string(), "(f 1 \"two\")");
    }
}
