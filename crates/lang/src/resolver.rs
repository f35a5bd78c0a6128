
use imbl::{Vector, HashMap};

use hyle_core::utility::*;
use hyle_core::database::Database;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resolved {
    Local(Index),
    Definition(Phase)
}

/// Names visible while lowering: enclosing binders shadow top-level definitions.
#[derive(Debug, Clone, Default)]
pub struct Resolver {
    locals: Vector<Symbol>,
    definitions: HashMap<Symbol, Phase>
}

impl Resolver {
    pub fn new() -> Resolver {
        Resolver::default()
    }

    /// Every definition already installed in `db`.
    pub fn from_database(db: &Database) -> Resolver {
        let mut result = Resolver::new();
        for (name, entry) in db.entries() {
            result.define(name, entry.phase);
        }
        result
    }

    pub fn with_local(&self, name: Symbol) -> Resolver {
        let mut result = self.clone();
        result.locals.push_back(name);
        result
    }

    pub fn with_definition(&self, name: Symbol, phase: Phase) -> Resolver {
        let mut result = self.clone();
        result.define(name, phase);
        result
    }

    pub fn define(&mut self, name: Symbol, phase: Phase) {
        self.definitions.insert(name, phase);
    }

    pub fn lookup(&self, name: Symbol) -> Option<Resolved> {
        let local = self.locals.iter()
            .rev()
            .position(|local| *local == name);
        match local {
            Some(index) => Some(Resolved::Local(index.into())),
            None => self.phase(name).map(Resolved::Definition)
        }
    }

    pub fn phase(&self, name: Symbol) -> Option<Phase> {
        self.definitions.get(&name).copied()
    }

    pub fn depth(&self) -> usize { self.locals.len() }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn innermost_binder_wins() {
        let x = Symbol::from("x");
        let y = Symbol::from("y");
        let res = Resolver::new()
            .with_local(x)
            .with_local(y)
            .with_local(x);
        assert_eq!(res.lookup(x), Some(Resolved::Local(0.into())));
        assert_eq!(res.lookup(y), Some(Resolved::Local(1.into())));
        assert_eq!(res.depth(), 3);
    }

    #[test]
    fn locals_shadow_definitions() {
        let f = Symbol::from("f");
        let res = Resolver::new().with_definition(f, Phase::Meta);
        assert_eq!(res.lookup(f), Some(Resolved::Definition(Phase::Meta)));
        assert_eq!(res.with_local(f).lookup(f), Some(Resolved::Local(0.into())));
        assert_eq!(res.lookup("g".into()), None);
    }

    #[test]
    fn database_definitions_are_visible() {
        let db = Database::with_base_types();
        let res = Resolver::from_database(&db);
        assert_eq!(res.phase("number".into()), Some(Phase::Object));
        assert_eq!(res.phase("string".into()), Some(Phase::Object));
    }
}
