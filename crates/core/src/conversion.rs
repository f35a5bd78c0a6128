
use crate::database::Database;
use crate::term::*;
use crate::eval::*;
use crate::error::KernelError;

/// Definitional equality: both sides reduce to the same normal form.
///
/// Terms are hash-consed and use de Bruijn indices, so comparing normal forms
/// is a pointer comparison and alpha-equivalence comes for free.
pub fn convertible(db: &mut Database, left: Term, right: Term) -> Result<bool, KernelError> {
    if left == right { return Ok(true) }
    let left = normalize(db, left)?;
    let right = normalize(db, right)?;
    Ok(left == right)
}
