
use colored::Colorize;

use crate::utility::*;
use crate::database::*;
use crate::term::*;
use crate::error::KernelError;

/// Step budget shared by every delta and beta step of one query.
#[derive(Debug, Clone, Copy)]
pub struct Fuel {
    budget: usize,
    used: usize
}

impl Fuel {
    pub fn new(budget: usize) -> Fuel {
        Fuel { budget, used: 0 }
    }

    pub fn burn(&mut self) -> Result<(), KernelError> {
        if self.used >= self.budget {
            Err(KernelError::NonTermination { steps: self.used })
        } else {
            self.used += 1;
            Ok(())
        }
    }
}

/// Contracts `(fn {_: A} body) arg`.
pub fn beta(db: &mut Database, body: &Term, arg: &Term) -> Term {
    body.subst(db, 0.into(), arg)
}

pub fn whnf(db: &mut Database, term: Term) -> Result<Term, KernelError> {
    let mut fuel = Fuel::new(db.options.fuel);
    whnf_with(db, &mut fuel, term)
}

pub fn whnf_with(db: &mut Database, fuel: &mut Fuel, term: Term) -> Result<Term, KernelError> {
    let mut head = term;
    // Arguments of the head, the last element is applied first.
    let mut spine = vec![];
    loop {
        match head.cloned() {
            TermData::Apply { fun, arg } => {
                spine.push(arg);
                head = fun;
            }
            TermData::Lambda { body, .. } => match spine.pop() {
                Some(arg) => {
                    fuel.burn()?;
                    log::trace!("{} {} with {}", "beta".bright_blue(), head, arg);
                    head = beta(db, &body, &arg);
                }
                None => break
            },
            TermData::Const { name } => match db.lookup_def(name) {
                Some(value) => {
                    fuel.burn()?;
                    log::trace!("{} {}", "delta".bright_blue(), name);
                    head = value;
                }
                None => break
            },
            _ => break
        }
    }
    Ok(db.apply_spine(head, spine.into_iter().rev()))
}

pub fn normalize(db: &mut Database, term: Term) -> Result<Term, KernelError> {
    let mut fuel = Fuel::new(db.options.fuel);
    normalize_with(db, &mut fuel, term)
}

pub fn normalize_with(db: &mut Database, fuel: &mut Fuel, term: Term) -> Result<Term, KernelError> {
    with_stack(|| match term.cloned() {
        TermData::Apply { .. } | TermData::Const { .. } => {
            let reduced = whnf_with(db, fuel, term.clone())?;
            match reduced.cloned() {
                // Stuck on a variable or an opaque constant.
                TermData::Apply { fun, arg } => {
                    let fun = normalize_with(db, fuel, fun)?;
                    let arg = normalize_with(db, fuel, arg)?;
                    Ok(db.apply(fun, arg))
                }
                TermData::Const { .. } => Ok(reduced),
                _ => normalize_with(db, fuel, reduced)
            }
        }
        TermData::Pi { domain, body } => {
            let domain = normalize_with(db, fuel, domain)?;
            let body = normalize_with(db, fuel, body)?;
            Ok(db.pi(domain, body))
        }
        TermData::Lambda { domain, body } => {
            let domain = normalize_with(db, fuel, domain)?;
            let body = normalize_with(db, fuel, body)?;
            Ok(db.lambda(domain, body))
        }
        TermData::Quote { body } => {
            let body = normalize_with(db, fuel, body)?;
            Ok(db.quote(body))
        }
        TermData::Splice { body } => {
            let body = normalize_with(db, fuel, body)?;
            Ok(db.splice(body))
        }
        // The head names the macro and has to survive until expansion.
        TermData::Expand { head, args } => {
            let args = args.into_iter()
                .map(|arg| normalize_with(db, fuel, arg))
                .collect::<Result<Vec<_>, _>>()?;
            Ok(db.expand(head, args))
        }
        TermData::Sort { .. }
        | TermData::Num { .. }
        | TermData::Str { .. }
        | TermData::Bound { .. } => Ok(term.clone()),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn define(db: &mut Database, name: &str, ty: Term, value: Option<Term>) {
        let entry = Entry { phase: Phase::Object, ty, value };
        db.insert(name.into(), entry).unwrap();
    }

    #[test]
    fn whnf_beta_reduces_the_head() {
        let mut db = Database::with_base_types();
        let number = db.constant("number");
        let v0 = db.bound(0);
        let id = db.lambda(number, v0);
        let seven = db.num(7);
        let t = db.apply(id, seven.clone());
        assert_eq!(whnf(&mut db, t).unwrap(), seven);
    }

    #[test]
    fn whnf_leaves_stuck_applications() {
        let mut db = Database::with_base_types();
        let f = db.bound(0);
        let one = db.num(1);
        let two = db.num(2);
        let t = db.apply_spine(f, [one, two]);
        assert_eq!(whnf(&mut db, t.clone()).unwrap(), t);
    }

    #[test]
    fn whnf_does_not_reduce_under_binders() {
        let mut db = Database::new();
        let s0 = db.sort(0);
        let v0 = db.bound(0);
        let id = db.lambda(s0.clone(), v0);
        let redex = db.apply(id, s0.clone());
        let t = db.lambda(s0, redex);
        assert_eq!(whnf(&mut db, t.clone()).unwrap(), t);
    }

    #[test]
    fn constants_unfold_to_their_value() {
        let mut db = Database::with_base_types();
        let number = db.constant("number");
        let v0 = db.bound(0);
        let id = db.lambda(number.clone(), v0);
        let ty = db.pi(number.clone(), number.clone());
        define(&mut db, "id", ty, Some(id.clone()));
        let c = db.constant("id");
        assert_eq!(whnf(&mut db, c.clone()).unwrap(), id);
        let five = db.num(5);
        let t = db.apply(c, five.clone());
        assert_eq!(normalize(&mut db, t).unwrap(), five);
        // Opaque constants stay put.
        assert_eq!(normalize(&mut db, number.clone()).unwrap(), number);
    }

    #[test]
    fn normalize_reduces_everywhere() {
        let mut db = Database::new();
        let s0 = db.sort(0);
        let v0 = db.bound(0);
        let v1 = db.bound(1);
        let id = db.lambda(s0.clone(), v0.clone());
        // fn {_: *} (id #0)  ==>  fn {_: *} #0
        let inner = db.apply(id.clone(), v0.clone());
        let t = db.lambda(s0.clone(), inner);
        let expected = db.lambda(s0.clone(), v0.clone());
        assert_eq!(normalize(&mut db, t).unwrap(), expected);
        // #1 (id #0) normalises the stuck argument
        let arg = db.apply(id, v0.clone());
        let stuck = db.apply(v1.clone(), arg);
        let expected = db.apply(v1, v0);
        assert_eq!(normalize(&mut db, stuck).unwrap(), expected);
    }

    #[test]
    fn normalize_is_idempotent() {
        let mut db = Database::with_base_types();
        let s0 = db.sort(0);
        let v0 = db.bound(0);
        let v1 = db.bound(1);
        let id = db.lambda(s0.clone(), v0.clone());
        let k_body = db.lambda(s0.clone(), v1.clone());
        let k = db.lambda(s0.clone(), k_body);
        let number = db.constant("number");
        let string = db.constant("string");
        let t = db.apply_spine(k, [number, string]);
        let t = db.apply(id, t);
        let once = normalize(&mut db, t).unwrap();
        let twice = normalize(&mut db, once.clone()).unwrap();
        assert_eq!(once, twice);
    }

    #[test]
    fn discarded_arguments_are_not_evaluated() {
        let mut db = Database::new();
        let s0 = db.sort(0);
        let v0 = db.bound(0);
        let v1 = db.bound(1);
        // omega = (fn x. x x) (fn x. x x)
        let self_apply = db.apply(v0.clone(), v0.clone());
        let delta = db.lambda(s0.clone(), self_apply);
        let omega = db.apply(delta.clone(), delta);
        let k_body = db.lambda(s0.clone(), v1);
        let k = db.lambda(s0.clone(), k_body);
        let three = db.num(3);
        let t = db.apply_spine(k, [three.clone(), omega]);
        assert_eq!(normalize(&mut db, t).unwrap(), three);
    }

    #[test]
    fn divergence_runs_out_of_fuel() {
        let mut db = Database::with_options(Options::default().with_fuel(50));
        let s0 = db.sort(0);
        let v0 = db.bound(0);
        let self_apply = db.apply(v0.clone(), v0);
        let delta = db.lambda(s0.clone(), self_apply);
        let omega = db.apply(delta.clone(), delta);
        assert_eq!(
            normalize(&mut db, omega),
            Err(KernelError::NonTermination { steps: 50 })
        );
        // A constant defined as itself.
        let looping = db.constant("loop");
        define(&mut db, "loop", s0, Some(looping.clone()));
        assert!(matches!(whnf(&mut db, looping), Err(KernelError::NonTermination { .. })));
    }

    #[test]
    fn expand_heads_are_not_unfolded() {
        let mut db = Database::with_base_types();
        let number = db.constant("number");
        let seven = db.num(7);
        let quoted = db.quote(seven);
        define(&mut db, "m", number, Some(quoted));
        let head = db.constant("m");
        let s0 = db.sort(0);
        let v0 = db.bound(0);
        let id = db.lambda(s0, v0);
        let one = db.num(1);
        let arg = db.apply(id, one.clone());
        let t = db.expand(head.clone(), vec![arg]);
        let expected = db.expand(head, vec![one]);
        assert_eq!(normalize(&mut db, t).unwrap(), expected);
    }
}
