
use ahash::AHashMap;
use thiserror::Error;

use crate::hc::*;
use crate::utility::*;
use crate::term::*;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DatabaseError {
    #[error("The name {name} is already defined")]
    Redefinition { name: String },
}

/// Bounds on the work a single kernel query may do.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Options {
    /// Delta and beta steps allowed per reduction query.
    pub fuel: usize,
    /// Macro rewrites allowed per expansion of one definition.
    pub expansion_limit: usize,
}

impl Default for Options {
    fn default() -> Self {
        Options {
            fuel: 100_000,
            expansion_limit: 1_000
        }
    }
}

impl Options {
    pub fn with_fuel(mut self, fuel: usize) -> Self {
        self.fuel = fuel;
        self
    }

    pub fn with_expansion_limit(mut self, limit: usize) -> Self {
        self.expansion_limit = limit;
        self
    }
}

#[derive(Debug, Clone)]
pub struct Entry {
    pub phase: Phase,
    pub ty: Term,
    /// Normal form of the body, `None` for opaque constants.
    pub value: Option<Term>,
}

/// The global environment: every checked definition plus the term factory.
///
/// Entries are append-only; a name can be installed once and is never updated.
#[derive(Debug)]
pub struct Database {
    pub term_data: HcFactory<TermData>,
    pub options: Options,
    entries: AHashMap<Symbol, Entry>,
    order: Vec<Symbol>,
}

impl Default for Database {
    fn default() -> Self {
        Self::new()
    }
}

impl Database {
    pub fn new() -> Database {
        Database::with_options(Options::default())
    }

    pub fn with_options(options: Options) -> Database {
        Database {
            term_data: HcFactory::with_capacity(128),
            options,
            entries: AHashMap::new(),
            order: Vec::new()
        }
    }

    /// A database holding the opaque literal types `number` and `string`.
    pub fn with_base_types() -> Database {
        let mut db = Database::new();
        db.install_base_types();
        db
    }

    pub fn install_base_types(&mut self) {
        for name in ["number", "string"] {
            let name = Symbol::from(name);
            if self.contains(name) { continue }
            let ty = self.sort(0);
            let entry = Entry { phase: Phase::Object, ty, value: None };
            self.entries.insert(name, entry);
            self.order.push(name);
        }
    }

    pub fn make_term(&mut self, t: TermData) -> Term {
        self.term_data.make(t)
    }

    pub fn insert(&mut self, name: Symbol, entry: Entry) -> Result<(), DatabaseError> {
        if self.contains(name) {
            return Err(DatabaseError::Redefinition { name: name.to_string() })
        }
        log::debug!("installed {} {} : {}", entry.phase, name, entry.ty);
        self.entries.insert(name, entry);
        self.order.push(name);
        Ok(())
    }

    pub fn contains(&self, name: Symbol) -> bool {
        self.entries.contains_key(&name)
    }

    pub fn entry(&self, name: Symbol) -> Option<&Entry> {
        self.entries.get(&name)
    }

    pub fn lookup_type(&self, name: Symbol) -> Option<Term> {
        self.entry(name).map(|e| e.ty.clone())
    }

    pub fn lookup_def(&self, name: Symbol) -> Option<Term> {
        self.entry(name).and_then(|e| e.value.clone())
    }

    pub fn lookup_phase(&self, name: Symbol) -> Option<Phase> {
        self.entry(name).map(|e| e.phase)
    }

    /// Entries in the order they were installed.
    pub fn entries(&self) -> impl Iterator<Item = (Symbol, &Entry)> + '_ {
        self.order.iter()
            .filter_map(move |name| self.entries.get(name).map(|e| (*name, e)))
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }
}
