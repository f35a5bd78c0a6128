
pub mod syntax;
pub mod resolver;
pub mod error;
pub mod elaborator;
pub mod session;

pub mod prelude {
    pub use crate::{
        syntax::*,
        resolver::*,
        error::*,
        elaborator::*,
        session::*,
    };
}
