
use colored::Colorize;
use imbl::Vector;

use crate::utility::*;
use crate::database::*;
use crate::term::*;
use crate::eval::*;
use crate::conversion::*;
use crate::error::KernelError;

/// Types of the enclosing binders, innermost last, and the phase being checked.
#[derive(Debug, Clone)]
pub struct Context {
    pub phase: Phase,
    pub types: Vector<Term>
}

impl Context {
    pub fn new(phase: Phase) -> Context {
        Context { phase, types: Vector::new() }
    }

    pub fn with_types(phase: Phase, types: impl IntoIterator<Item = Term>) -> Context {
        Context { phase, types: types.into_iter().collect() }
    }

    pub fn phase_shift(mut self, phase: Phase) -> Context {
        self.phase = phase;
        self
    }

    pub fn bind(&self, ty: Term) -> Context {
        let mut result = self.clone();
        result.types.push_back(ty);
        result
    }

    pub fn len(&self) -> usize { self.types.len() }

    pub fn is_empty(&self) -> bool { self.types.is_empty() }

    /// The type of `#index`, moved under the binders between its scope and here.
    pub fn lookup(&self, db: &mut Database, index: Index) -> Result<Term, KernelError> {
        let depth = self.len();
        let escaped = || KernelError::UnboundIndex { index: *index, depth };
        let level = index.to_level(depth).ok_or_else(escaped)?;
        let ty = self.types.get(*level).cloned().ok_or_else(escaped)?;
        Ok(ty.shift(db, *index + 1, 0))
    }
}

pub fn infer(db: &mut Database, ctx: &Context, term: Term) -> Result<Term, KernelError> {
    let ty = with_stack(|| match term.cloned() {
        TermData::Sort { level } => level.checked_add(1)
            .map(|level| db.sort(level))
            .ok_or(KernelError::UniverseOverflow { level }),
        TermData::Const { name } => match db.entry(name) {
            // Macros only exist at expansion time.
            Some(Entry { phase: Phase::Meta, .. }) if ctx.phase == Phase::Object =>
                Err(KernelError::StagedTerm { term: term.to_string() }),
            Some(entry) => Ok(entry.ty.clone()),
            None => Err(KernelError::UnknownConstant { name: name.to_string() })
        },
        TermData::Num { .. } => Ok(db.constant("number")),
        TermData::Str { .. } => Ok(db.constant("string")),
        TermData::Bound { index } => ctx.lookup(db, index),
        TermData::Pi { domain, body } => {
            let domain_level = infer_sort(db, ctx, &domain, "Pi parameter")?;
            let body_level = infer_sort(db, &ctx.bind(domain), &body, "Pi body")?;
            Ok(db.sort(domain_level.max(body_level)))
        }
        TermData::Lambda { domain, body } => {
            infer_sort(db, ctx, &domain, "Lambda parameter")?;
            let body_ty = infer(db, &ctx.bind(domain.clone()), body)?;
            Ok(db.pi(domain, body_ty))
        }
        TermData::Apply { fun, arg } => infer_apply(db, ctx, fun, arg),
        TermData::Quote { body }
        | TermData::Splice { body } => match ctx.phase {
            Phase::Meta => infer(db, ctx, body),
            Phase::Object => Err(KernelError::StagedTerm { term: term.to_string() })
        },
        TermData::Expand { head, args } => match ctx.phase {
            Phase::Meta => {
                let application = db.apply_spine(head, args);
                infer(db, ctx, application)
            }
            Phase::Object => Err(KernelError::StagedTerm { term: term.to_string() })
        },
    })?;
    log::trace!("{} {} {} {}", "infer".bright_blue(), term, ":".bright_blue(), ty);
    Ok(ty)
}

pub fn check(db: &mut Database, ctx: &Context, term: Term, expected: Term) -> Result<(), KernelError> {
    let ty = infer(db, ctx, term)?;
    if convertible(db, ty.clone(), expected.clone())? { Ok(()) }
    else {
        let expected = normalize(db, expected)?;
        let found = normalize(db, ty)?;
        Err(KernelError::TypeMismatch { expected: expected.to_string(), found: found.to_string() })
    }
}

/// Infers the type of `term` and requires it to be a universe, returning its level.
pub fn infer_sort(db: &mut Database, ctx: &Context, term: &Term, position: &'static str) -> Result<usize, KernelError> {
    let ty = infer(db, ctx, term.clone())?;
    let ty = normalize(db, ty)?;
    ty.as_sort().ok_or_else(|| KernelError::NotAType {
        position,
        term: term.to_string(),
        found: ty.to_string()
    })
}

fn infer_apply(db: &mut Database, ctx: &Context, fun: Term, arg: Term) -> Result<Term, KernelError> {
    let fun_ty = infer(db, ctx, fun.clone())?;
    let fun_ty = normalize(db, fun_ty)?;
    match fun_ty.cloned() {
        TermData::Pi { domain, body } => {
            let arg_ty = infer(db, ctx, arg.clone())?;
            if !convertible(db, arg_ty.clone(), domain.clone())? {
                let found = normalize(db, arg_ty)?;
                return Err(KernelError::ArgumentMismatch {
                    expected: domain.to_string(),
                    found: found.to_string()
                })
            }
            let result = beta(db, &body, &arg);
            normalize(db, result)
        }
        _ => Err(KernelError::NotAFunction { term: fun.to_string(), found: fun_ty.to_string() })
    }
}
