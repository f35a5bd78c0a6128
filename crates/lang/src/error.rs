
use std::fmt;

use miette::{Diagnostic, GraphicalReportHandler, GraphicalTheme};
use thiserror::Error;

use hyle_core::error::KernelError;
use hyle_core::database::DatabaseError;
use crate::syntax::Location;

#[derive(Debug, Clone, PartialEq, Eq, Error, Diagnostic)]
pub enum ElabError {
    #[error("unknown identifier `{name}` at {loc}")]
    #[diagnostic(
        code(hyle::unknown_identifier),
        help("names are bound by an enclosing fn or pi, or defined by an earlier form")
    )]
    UnknownIdentifier { name: String, loc: Location },
    #[error("malformed {form} at {loc}: {reason}")]
    #[diagnostic(code(hyle::malformed_form))]
    MalformedForm {
        form: String,
        reason: &'static str,
        loc: Location
    },
    #[error("`{name}` is not a macro at {loc}")]
    #[diagnostic(
        code(hyle::unknown_macro),
        help("only definitions introduced with defmeta and carrying a body can be expanded")
    )]
    UnknownMacro { name: String, loc: Location },
    #[error("{error} at {loc}")]
    #[diagnostic(code(hyle::kernel))]
    Kernel { error: KernelError, loc: Location },
    #[error("{error} at {loc}")]
    #[diagnostic(code(hyle::database))]
    Database { error: DatabaseError, loc: Location },
}

impl ElabError {
    pub fn loc(&self) -> Location {
        match self {
            ElabError::UnknownIdentifier { loc, .. }
            | ElabError::MalformedForm { loc, .. }
            | ElabError::UnknownMacro { loc, .. }
            | ElabError::Kernel { loc, .. }
            | ElabError::Database { loc, .. } => *loc
        }
    }

    pub fn malformed(form: impl fmt::Display, reason: &'static str, loc: Location) -> ElabError {
        ElabError::MalformedForm { form: form.to_string(), reason, loc }
    }

    pub fn kernel(loc: Location) -> impl Fn(KernelError) -> ElabError {
        move |error| ElabError::Kernel { error, loc }
    }
}

#[derive(Debug)]
pub enum HyleError {
    Elaborator(ElabError),
    Collection(Vec<HyleError>)
}

impl HyleError {
    /// Every elaboration failure carried by this error, in form order.
    pub fn errors(&self) -> Vec<&ElabError> {
        match self {
            HyleError::Elaborator(e) => vec![e],
            HyleError::Collection(list) => list.iter()
                .flat_map(HyleError::errors)
                .collect()
        }
    }
}

impl fmt::Display for HyleError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HyleError::Elaborator(e) => {
                let mut out = String::new();
                GraphicalReportHandler::new_themed(GraphicalTheme::unicode_nocolor())
                    .with_width(80)
                    .render_report(&mut out, e)?;
                f.write_str(&out)
            }
            HyleError::Collection(list) => {
                for e in list.iter() {
                    writeln!(f, "{}", e)?;
                }
                Ok(())
            }
        }
    }
}

impl std::error::Error for HyleError { }

impl From<ElabError> for HyleError {
    fn from(error: ElabError) -> Self { HyleError::Elaborator(error) }
}
