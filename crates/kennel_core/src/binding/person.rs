//! Handle bound to one person.

use crate::binding::dog::DogListHandle;
use crate::binding::{stale_if_gone, state_from_lookup, HandleState};
use crate::model::person::{Person, PersonId};
use crate::model::EntityKind;
use crate::repo::person_repo::{PersonRepository, SqlitePersonRepository};
use crate::store::{Store, StoreChange, StoreError, StoreResult};

/// Live reference to a persisted person.
///
/// Two handles are equal when they name the same row of the same store.
#[derive(Debug, Clone)]
pub struct PersonHandle {
    store: Store,
    id: PersonId,
}

impl PersonHandle {
    pub(crate) fn new(store: Store, id: PersonId) -> Self {
        Self { store, id }
    }

    pub fn id(&self) -> PersonId {
        self.id
    }

    pub fn store(&self) -> &Store {
        &self.store
    }

    /// `Bound` while the row exists in an open store, `Invalidated` after.
    pub fn state(&self) -> StoreResult<HandleState> {
        state_from_lookup(
            self.store
                .read(|conn| SqlitePersonRepository::new(conn).person_exists(self.id)),
        )
    }

    /// Latest committed name.
    pub fn name(&self) -> StoreResult<String> {
        self.store
            .read(|conn| SqlitePersonRepository::new(conn).person_name(self.id))
            .map_err(|err| self.stale(err))?
            .ok_or_else(|| self.gone())
    }

    /// Writes the name in its own transaction.
    pub fn set_name(&self, name: impl Into<String>) -> StoreResult<()> {
        let name = name.into();
        let id = self.id;
        self.store
            .write(|txn| {
                txn.persons().rename_person(id, &name)?;
                txn.record(StoreChange::PersonUpdated(id));
                Ok(())
            })
            .map_err(|err| self.stale(err))
    }

    /// Full person with dogs, as of the latest commit.
    pub fn snapshot(&self) -> StoreResult<Person> {
        self.store
            .read(|conn| SqlitePersonRepository::new(conn).get_person(self.id))
            .map_err(|err| self.stale(err))?
            .ok_or_else(|| self.gone())
    }

    /// Live view of this person's dog collection.
    pub fn dogs(&self) -> DogListHandle {
        DogListHandle::new(self.store.clone(), self.id)
    }

    /// Deletes the person and their dogs; this handle becomes invalidated.
    pub fn delete(&self) -> StoreResult<()> {
        self.store
            .delete_person(self.id)
            .map_err(|err| self.stale(err))
    }

    fn stale(&self, err: StoreError) -> StoreError {
        stale_if_gone(err, EntityKind::Person, self.id)
    }

    fn gone(&self) -> StoreError {
        StoreError::StaleReference {
            entity: EntityKind::Person,
            id: self.id,
        }
    }
}

impl PartialEq for PersonHandle {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id && self.store.same_store(&other.store)
    }
}

impl Eq for PersonHandle {}
