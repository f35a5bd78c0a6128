
pub use hyle_core;
pub use hyle_lang;
pub use hyle_lang::sexp;

pub mod prelude {
    pub use hyle_core::prelude::*;
    pub use hyle_lang::prelude::*;
}
