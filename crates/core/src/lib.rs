
pub mod hc;
pub mod utility;
pub mod term;
pub mod factory;
pub mod error;
pub mod database;
pub mod eval;
pub mod conversion;
pub mod infer;

pub mod prelude {
    pub use crate::{
        hc::*,
        utility::*,
        term::*,
        error::*,
        database::*,
        eval::*,
        conversion::*,
    };

    pub mod core {
        pub use crate::infer::*;
    }
}
