
use colored::Colorize;

use hyle_core::utility::*;
use hyle_core::term::Term;
use hyle_core::database::{Database, Entry, Options};
use hyle_core::eval;
use hyle_core::infer::{self, Context};
use hyle_core::error::KernelError;
use crate::syntax::Sexp;
use crate::resolver::Resolver;
use crate::elaborator::{self, Installed};
use crate::error::{ElabError, HyleError};

/// What `Session::load` does after a form fails.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ErrorPolicy {
    #[default]
    FailFast,
    CollectAll
}

/// Elaborates top-level forms in order against one growing database.
#[derive(Debug)]
pub struct Session {
    db: Database,
    resolver: Resolver,
    policy: ErrorPolicy
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}

impl Session {
    pub fn new() -> Session {
        Session::with_options(Options::default())
    }

    pub fn with_options(options: Options) -> Session {
        let mut db = Database::with_options(options);
        db.install_base_types();
        let resolver = Resolver::from_database(&db);
        Session { db, resolver, policy: ErrorPolicy::default() }
    }

    pub fn with_policy(mut self, policy: ErrorPolicy) -> Session {
        self.policy = policy;
        self
    }

    pub fn database(&self) -> &Database { &self.db }

    pub fn database_mut(&mut self) -> &mut Database { &mut self.db }

    pub fn resolver(&self) -> &Resolver { &self.resolver }

    pub fn lookup(&self, name: &str) -> Option<&Entry> {
        self.db.entry(name.into())
    }

    /// Elaborates a single top-level form. Nothing is installed when it fails.
    pub fn define(&mut self, form: &Sexp) -> Result<Installed, ElabError> {
        let result = elaborator::elaborate_form(&mut self.db, &self.resolver, form);
        // Intermediate terms of the form are dead now.
        self.db.term_data.purge();
        let installed = result?;
        self.resolver.define(installed.name, installed.phase);
        Ok(installed)
    }

    pub fn load(&mut self, forms: &[Sexp]) -> Result<Vec<Installed>, HyleError> {
        let mut installed = vec![];
        let mut errors = vec![];
        for form in forms.iter() {
            match self.define(form) {
                Ok(result) => installed.push(result),
                Err(error) => {
                    log::warn!("{} {}", "failed".red(), error);
                    match self.policy {
                        ErrorPolicy::FailFast => return Err(error.into()),
                        ErrorPolicy::CollectAll => errors.push(error.into())
                    }
                }
            }
        }
        if errors.is_empty() { Ok(installed) }
        else { Err(HyleError::Collection(errors)) }
    }

    /// Lowers and expands an expression as object code without installing anything.
    pub fn elaborate(&mut self, sexp: &Sexp) -> Result<Term, ElabError> {
        let term = elaborator::lower(&mut self.db, &self.resolver, sexp)?;
        elaborator::expand(&mut self.db, term, sexp.loc)
    }

    pub fn infer(&mut self, sexp: &Sexp) -> Result<Term, ElabError> {
        let term = self.elaborate(sexp)?;
        self.infer_term(term).map_err(ElabError::kernel(sexp.loc))
    }

    pub fn normalize(&mut self, sexp: &Sexp) -> Result<Term, ElabError> {
        let term = self.elaborate(sexp)?;
        self.normalize_term(term).map_err(ElabError::kernel(sexp.loc))
    }

    pub fn infer_term(&mut self, term: Term) -> Result<Term, KernelError> {
        let ctx = Context::new(Phase::Object);
        infer::infer(&mut self.db, &ctx, term)
    }

    pub fn normalize_term(&mut self, term: Term) -> Result<Term, KernelError> {
        eval::normalize(&mut self.db, term)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::syntax::Location;

    fn sym(name: &str) -> Sexp { Sexp::sym(name) }

    fn list(items: Vec<Sexp>) -> Sexp { Sexp::list(items) }

    fn defn(name: &str, body: Sexp) -> Sexp {
        list(vec![sym("defn"), sym(name), body])
    }

    #[test]
    fn forms_see_earlier_definitions() -> anyhow::Result<()> {
        let mut session = Session::new();
        let installed = session.load(&[
            defn("one", Sexp::num(1)),
            defn("also_one", sym("one")),
        ])?;
        assert_eq!(installed.len(), 2);
        let one = session.database_mut().num(1);
        assert_eq!(session.lookup("also_one").and_then(|e| e.value.clone()), Some(one));
        assert_eq!(session.resolver().phase("also_one".into()), Some(Phase::Object));
        Ok(())
    }

    #[test]
    fn fail_fast_stops_at_the_first_error() {
        let mut session = Session::new();
        let result = session.load(&[
            defn("a", Sexp::num(1)),
            defn("b", sym("missing").at(Location::new(2, 9, 7))).at(Location::new(2, 1, 16)),
            defn("c", Sexp::num(3)),
        ]);
        let error = result.unwrap_err();
        let errors = error.errors();
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].loc(), Location::new(2, 9, 7));
        assert!(session.lookup("a").is_some());
        assert!(session.lookup("b").is_none());
        assert!(session.lookup("c").is_none());
    }

    #[test]
    fn collect_all_keeps_going() {
        let mut session = Session::new().with_policy(ErrorPolicy::CollectAll);
        let result = session.load(&[
            defn("a", sym("missing")),
            defn("b", Sexp::num(2)),
            defn("c", list(vec![Sexp::num(1), Sexp::num(2)])).at(Location::new(3, 1, 11)),
            defn("d", sym("a")),
        ]);
        let error = result.unwrap_err();
        let errors = error.errors();
        assert_eq!(errors.len(), 3);
        assert!(matches!(errors[1], ElabError::Kernel { error: KernelError::NotAFunction { .. }, .. }));
        assert_eq!(errors[1].loc(), Location::new(3, 1, 11));
        assert!(session.lookup("b").is_some());
        assert!(session.lookup("a").is_none());
        assert!(session.lookup("c").is_none());
    }

    #[test]
    fn queries_do_not_install() -> anyhow::Result<()> {
        let mut session = Session::new();
        let before = session.database().len();
        let id = list(vec![
            sym("fn"),
            Sexp::dict(vec![(sym("x"), sym("string"))]),
            sym("x"),
        ]);
        let call = list(vec![id, Sexp::str("hi")]);
        let ty = session.infer(&call)?;
        let value = session.normalize(&call)?;
        let string = session.database_mut().constant("string");
        let hi = session.database_mut().str("hi");
        assert_eq!(ty, string);
        assert_eq!(value, hi);
        assert_eq!(session.database().len(), before);
        Ok(())
    }

    #[test]
    fn define_forgets_dead_terms() -> anyhow::Result<()> {
        let mut session = Session::new();
        drop(session.database_mut().str("scratch"));
        session.define(&defn("one", Sexp::num(1)))?;
        let live = session.database().term_data.len();
        let _scratch = session.database_mut().str("scratch");
        assert_eq!(session.database().term_data.len(), live + 1);
        Ok(())
    }

    #[test]
    fn kernel_queries() -> anyhow::Result<()> {
        let mut session = Session::new();
        let db = session.database_mut();
        let s0 = db.sort(0);
        let s1 = db.sort(1);
        assert_eq!(session.infer_term(s0.clone())?, s1);
        assert_eq!(session.normalize_term(s0.clone())?, s0);
        Ok(())
    }
}
