
use std::time;

use colored::Colorize;
use if_chain::if_chain;

use hyle_core::utility::*;
use hyle_core::term::*;
use hyle_core::database::{Database, DatabaseError, Entry};
use hyle_core::eval::{self, Fuel};
use hyle_core::infer::{self, Context};
use crate::syntax::*;
use crate::resolver::*;
use crate::error::ElabError;

/// A checked top-level definition, as installed into the database.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Installed {
    pub name: Symbol,
    pub phase: Phase,
    pub ty: Term,
    pub value: Option<Term>
}

/// Lowers a surface expression to a kernel term. Macro calls stay suspended as `Expand`.
pub fn lower(db: &mut Database, res: &Resolver, sexp: &Sexp) -> Result<Term, ElabError> {
    with_stack(|| match &sexp.kind {
        SexpKind::Num(value) => Ok(db.num(*value)),
        SexpKind::Str(value) => Ok(db.str(value)),
        SexpKind::Sym(name) => lower_symbol(db, res, *name, sexp.loc),
        SexpKind::Quote(body) => {
            let body = lower(db, res, body)?;
            Ok(db.quote(body))
        }
        SexpKind::Splice(body) => {
            let body = lower(db, res, body)?;
            Ok(db.splice(body))
        }
        SexpKind::List(items) => lower_list(db, res, items, sexp.loc),
        SexpKind::Vector(_) => Err(ElabError::malformed(sexp, "vectors are not terms", sexp.loc)),
        SexpKind::Dict(_) => Err(ElabError::malformed(sexp, "dictionaries are only allowed as binder lists", sexp.loc)),
    })
}

fn lower_symbol(db: &mut Database, res: &Resolver, name: Symbol, loc: Location) -> Result<Term, ElabError> {
    match res.lookup(name) {
        Some(Resolved::Local(index)) => Ok(db.bound(*index)),
        Some(Resolved::Definition(_)) => Ok(db.constant(name)),
        None => Err(ElabError::UnknownIdentifier { name: name.to_string(), loc })
    }
}

fn lower_list(db: &mut Database, res: &Resolver, items: &[Sexp], loc: Location) -> Result<Term, ElabError> {
    let (head, args) = items.split_first()
        .ok_or_else(|| ElabError::malformed("()", "empty application", loc))?;
    let keyword = head.as_sym();
    match (keyword.as_ref().map(|name| name.as_str()), args) {
        (Some("fn"), [params, body]) => lower_binders(db, res, params, body, Database::lambda),
        (Some("fn"), _) => Err(ElabError::malformed("fn", "expected (fn {x: A, ...} body)", loc)),
        (Some("pi"), [params, body]) => lower_binders(db, res, params, body, Database::pi),
        (Some("pi"), _) => Err(ElabError::malformed("pi", "expected (pi {x: A, ...} B)", loc)),
        (Some("sort"), [level]) => match level.kind {
            SexpKind::Num(level) if level >= 0 => Ok(db.sort(level as usize)),
            _ => Err(ElabError::malformed("sort", "the level must be a non-negative number", level.loc))
        },
        (Some("sort"), _) => Err(ElabError::malformed("sort", "expected (sort n)", loc)),
        (Some("quote"), [body]) => {
            let body = lower(db, res, body)?;
            Ok(db.quote(body))
        }
        (Some("quote"), _) => Err(ElabError::malformed("quote", "expected exactly one argument", loc)),
        (Some("splice"), [body]) => {
            let body = lower(db, res, body)?;
            Ok(db.splice(body))
        }
        (Some("splice"), _) => Err(ElabError::malformed("splice", "expected exactly one argument", loc)),
        _ => lower_application(db, res, head, args)
    }
}

fn lower_application(db: &mut Database, res: &Resolver, head: &Sexp, args: &[Sexp]) -> Result<Term, ElabError> {
    let is_macro = head.as_sym()
        .and_then(|name| res.lookup(name))
        .map_or(false, |resolved| resolved == Resolved::Definition(Phase::Meta));
    let fun = lower(db, res, head)?;
    let args = args.iter()
        .map(|arg| lower(db, res, arg))
        .collect::<Result<Vec<_>, _>>()?;
    if is_macro {
        Ok(db.expand(fun, args))
    } else {
        Ok(db.apply_spine(fun, args))
    }
}

/// `{x: A, y: B} body` as `binder(A, binder(B, body))`, each name scoping over what follows it.
fn lower_binders(
    db: &mut Database,
    res: &Resolver,
    params: &Sexp,
    body: &Sexp,
    binder: fn(&mut Database, Term, Term) -> Term
) -> Result<Term, ElabError> {
    let entries = match &params.kind {
        SexpKind::Dict(entries) if !entries.is_empty() => entries,
        _ => return Err(ElabError::malformed(params, "expected a non-empty binder dictionary", params.loc))
    };
    let mut res = res.clone();
    let mut domains = Vec::with_capacity(entries.len());
    for (key, ty) in entries.iter() {
        let name = binder_name(key)?;
        domains.push(lower(db, &res, ty)?);
        res = res.with_local(name);
    }
    let mut result = lower(db, &res, body)?;
    for domain in domains.into_iter().rev() {
        result = binder(db, domain, result);
    }
    Ok(result)
}

/// Binder keys may be written `x`, `:x` or `x:`.
fn binder_name(key: &Sexp) -> Result<Symbol, ElabError> {
    let name = key.as_sym()
        .ok_or_else(|| ElabError::malformed(key, "binder names must be symbols", key.loc))?;
    let trimmed = name.trim_start_matches(':').trim_end_matches(':');
    if trimmed.is_empty() {
        return Err(ElabError::malformed(key, "empty binder name", key.loc))
    }
    Ok(Symbol::from(trimmed))
}

/// Rewrites every macro call reachable in object code until none is left.
pub fn expand(db: &mut Database, term: Term, loc: Location) -> Result<Term, ElabError> {
    let mut fuel = Fuel::new(db.options.expansion_limit);
    expand_with(db, &mut fuel, term, loc)
}

pub fn expand_with(db: &mut Database, fuel: &mut Fuel, term: Term, loc: Location) -> Result<Term, ElabError> {
    with_stack(|| match term.cloned() {
        TermData::Expand { head, args } => {
            let value = macro_value(db, &head, loc)?;
            fuel.burn().map_err(ElabError::kernel(loc))?;
            let call = db.apply_spine(value, args);
            let result = eval::normalize(db, call).map_err(ElabError::kernel(loc))?;
            let result = unquote(result);
            log::debug!("{} {} {} {}", "expand".bright_green(), term, "=>".bright_green(), result);
            expand_with(db, fuel, result, loc)
        }
        TermData::Splice { body } => {
            let body = expand_with(db, fuel, body, loc)?;
            Ok(unquote(body))
        }
        TermData::Pi { domain, body } => {
            let domain = expand_with(db, fuel, domain, loc)?;
            let body = expand_with(db, fuel, body, loc)?;
            Ok(db.pi(domain, body))
        }
        TermData::Lambda { domain, body } => {
            let domain = expand_with(db, fuel, domain, loc)?;
            let body = expand_with(db, fuel, body, loc)?;
            Ok(db.lambda(domain, body))
        }
        TermData::Apply { fun, arg } => {
            let fun = expand_with(db, fuel, fun, loc)?;
            let arg = expand_with(db, fuel, arg, loc)?;
            Ok(db.apply(fun, arg))
        }
        // Left for the checker to reject in object code.
        TermData::Quote { .. } => Ok(term.clone()),
        TermData::Sort { .. }
        | TermData::Const { .. }
        | TermData::Num { .. }
        | TermData::Str { .. }
        | TermData::Bound { .. } => Ok(term.clone()),
    })
}

fn macro_value(db: &Database, head: &Term, loc: Location) -> Result<Term, ElabError> {
    if_chain! {
        if let TermData::Const { name } = head.cloned();
        if let Some(Entry { phase: Phase::Meta, value: Some(value), .. }) = db.entry(name);
        then { Ok(value.clone()) }
        else { Err(ElabError::UnknownMacro { name: head.to_string(), loc }) }
    }
}

fn unquote(term: Term) -> Term {
    match term.cloned() {
        TermData::Quote { body } => body,
        _ => term
    }
}

/// Lowers, checks and installs one top-level form.
pub fn elaborate_form(db: &mut Database, res: &Resolver, form: &Sexp) -> Result<Installed, ElabError> {
    let loc = form.loc;
    let items = form.as_list()
        .ok_or_else(|| ElabError::malformed(form, "top-level forms must be lists", loc))?;
    let keyword = form.head_sym();
    let now = time::Instant::now();
    let installed = match (keyword.as_ref().map(|name| name.as_str()), items) {
        (Some("defn"), [_, name, body]) => define_object(db, res, name, None, body, loc),
        (Some("defn"), [_, name, ty, body]) => define_object(db, res, name, Some(ty), body, loc),
        (Some("defn"), _) => Err(ElabError::malformed("defn", "expected (defn name [type] body)", loc)),
        (Some("defmeta"), [_, name, body]) => define_meta(db, res, name, body, loc),
        (Some("defmeta"), _) => Err(ElabError::malformed("defmeta", "expected (defmeta name body)", loc)),
        (Some("axiom"), [_, name, ty]) => declare_axiom(db, res, name, ty, loc),
        (Some("axiom"), _) => Err(ElabError::malformed("axiom", "expected (axiom name type)", loc)),
        _ => Err(ElabError::malformed(form, "expected defn, defmeta or axiom", loc))
    }?;
    log::info!("{} {} {} {} in {}ms",
        "elaborated".green(),
        installed.name,
        ":".green(),
        installed.ty,
        now.elapsed().as_millis());
    Ok(installed)
}

fn define_object(
    db: &mut Database,
    res: &Resolver,
    name: &Sexp,
    annotation: Option<&Sexp>,
    body: &Sexp,
    loc: Location
) -> Result<Installed, ElabError> {
    let name = definition_name(db, name)?;
    let ctx = Context::new(Phase::Object);
    let term = lower(db, res, body)?;
    let term = expand(db, term, loc)?;
    let ty = match annotation {
        Some(annotation) => {
            let ty = lower(db, res, annotation)?;
            let ty = expand(db, ty, loc)?;
            infer::infer_sort(db, &ctx, &ty, "definition annotation").map_err(ElabError::kernel(loc))?;
            infer::check(db, &ctx, term.clone(), ty.clone()).map_err(ElabError::kernel(loc))?;
            ty
        }
        None => infer::infer(db, &ctx, term.clone()).map_err(ElabError::kernel(loc))?
    };
    let value = eval::normalize(db, term).map_err(ElabError::kernel(loc))?;
    install(db, name, Phase::Object, ty, Some(value), loc)
}

fn define_meta(db: &mut Database, res: &Resolver, name: &Sexp, body: &Sexp, loc: Location) -> Result<Installed, ElabError> {
    let name = definition_name(db, name)?;
    let ctx = Context::new(Phase::Meta);
    let term = lower(db, res, body)?;
    let ty = infer::infer(db, &ctx, term.clone()).map_err(ElabError::kernel(loc))?;
    let value = eval::normalize(db, term).map_err(ElabError::kernel(loc))?;
    install(db, name, Phase::Meta, ty, Some(value), loc)
}

fn declare_axiom(db: &mut Database, res: &Resolver, name: &Sexp, ty: &Sexp, loc: Location) -> Result<Installed, ElabError> {
    let name = definition_name(db, name)?;
    let ctx = Context::new(Phase::Object);
    let ty = lower(db, res, ty)?;
    let ty = expand(db, ty, loc)?;
    infer::infer_sort(db, &ctx, &ty, "axiom type").map_err(ElabError::kernel(loc))?;
    install(db, name, Phase::Object, ty, None, loc)
}

fn definition_name(db: &Database, name: &Sexp) -> Result<Symbol, ElabError> {
    let symbol = name.as_sym()
        .ok_or_else(|| ElabError::malformed(name, "definition names must be symbols", name.loc))?;
    if db.contains(symbol) {
        let error = DatabaseError::Redefinition { name: symbol.to_string() };
        return Err(ElabError::Database { error, loc: name.loc })
    }
    Ok(symbol)
}

fn install(db: &mut Database, name: Symbol, phase: Phase, ty: Term, value: Option<Term>, loc: Location) -> Result<Installed, ElabError> {
    let entry = Entry { phase, ty: ty.clone(), value: value.clone() };
    db.insert(name, entry).map_err(|error| ElabError::Database { error, loc })?;
    Ok(Installed { name, phase, ty, value })
}
