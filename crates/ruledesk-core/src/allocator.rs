//! Core identifier allocation
//!
//! Allocation is a linearized fetch-and-increment against state shared by
//! every publisher. Implementations never derive the next identifier from a
//! snapshot taken outside their critical section.

use crate::errors::ExResult;
use crate::model::CoreId;
use std::sync::Arc;

/// Hands out `Core.Id` values
///
/// For N concurrent calls against a sequence whose current maximum is `m`,
/// the results are exactly `m+1 ..= m+N` in some order. Identifiers handed
/// out are never handed out again, even if the caller fails to persist them.
pub trait IdentifierAllocator: Send + Sync {
    /// # Errors
    ///
    /// `ExErrorKind::Allocation` when the sequence cannot be read or
    /// committed, or is exhausted.
    fn allocate(&self) -> ExResult<CoreId>;
}

impl<T: IdentifierAllocator + ?Sized> IdentifierAllocator for Arc<T> {
    fn allocate(&self) -> ExResult<CoreId> {
        (**self).allocate()
    }
}

impl<T: IdentifierAllocator + ?Sized> IdentifierAllocator for &T {
    fn allocate(&self) -> ExResult<CoreId> {
        (**self).allocate()
    }
}
