//! Live, two-way handles over persisted entities.
//!
//! # Responsibility
//! - Expose person/dog fields and the dog collection as handles that always
//!   read the latest committed state.
//! - Turn every field write or list gesture into exactly one store
//!   transaction.
//!
//! # Invariants
//! - Handles hold ids only; no field value is cached.
//! - `Invalidated` is terminal: ids are never reused and a closed store
//!   never reopens.
//! - Access through an invalidated handle yields `StoreError::StaleReference`.

use crate::model::EntityKind;
use crate::repo::RepoError;
use crate::store::StoreError;
use uuid::Uuid;

pub mod diff;
pub mod dog;
pub mod person;
pub mod results;

/// Lifecycle of a binding between a view and an entity.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HandleState {
    /// No entity has been bound yet.
    Unbound,
    /// Bound to an entity that still exists in an open store.
    Bound,
    /// The entity was deleted or the store closed.
    Invalidated,
}

/// Rewrites "entity missing" and "store closed" failures for `id` into a
/// stale-reference error; every other error passes through.
pub(crate) fn stale_if_gone(err: StoreError, entity: EntityKind, id: Uuid) -> StoreError {
    let gone = match (&err, entity) {
        (StoreError::Closed, _) => true,
        (StoreError::Repo(RepoError::PersonNotFound(missing)), EntityKind::Person) => {
            *missing == id
        }
        (StoreError::Repo(RepoError::DogNotFound(missing)), EntityKind::Dog) => *missing == id,
        _ => false,
    };
    if gone {
        StoreError::StaleReference { entity, id }
    } else {
        err
    }
}

/// Maps a lookup outcome onto `Bound` / `Invalidated`.
pub(crate) fn state_from_lookup(
    found: Result<bool, StoreError>,
) -> Result<HandleState, StoreError> {
    match found {
        Ok(true) => Ok(HandleState::Bound),
        Ok(false) | Err(StoreError::Closed) => Ok(HandleState::Invalidated),
        Err(err) => Err(err),
    }
}
