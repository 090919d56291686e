//! Live result set of every person in the store.

use crate::binding::person::PersonHandle;
use crate::model::person::{Person, PersonId};
use crate::repo::person_repo::{PersonRepository, SqlitePersonRepository};
use crate::repo::RepoError;
use crate::store::{ChangeSubscription, Store, StoreResult};

/// All persons, in insertion order.
///
/// Reads always hit the store, so the set is current without a manual
/// refresh; `subscribe` tells observers when to read again.
#[derive(Debug, Clone)]
pub struct PersonResults {
    store: Store,
}

impl PersonResults {
    pub(crate) fn new(store: Store) -> Self {
        Self { store }
    }

    pub fn len(&self) -> StoreResult<usize> {
        self.store
            .read(|conn| SqlitePersonRepository::new(conn).count_persons())
    }

    pub fn is_empty(&self) -> StoreResult<bool> {
        Ok(self.len()? == 0)
    }

    pub fn snapshot(&self) -> StoreResult<Vec<Person>> {
        self.store
            .read(|conn| SqlitePersonRepository::new(conn).list_persons())
    }

    /// Person ids in insertion order.
    pub fn ids(&self) -> StoreResult<Vec<PersonId>> {
        self.store
            .read(|conn| SqlitePersonRepository::new(conn).list_person_ids())
    }

    pub fn handles(&self) -> StoreResult<Vec<PersonHandle>> {
        Ok(self
            .ids()?
            .into_iter()
            .map(|id| PersonHandle::new(self.store.clone(), id))
            .collect())
    }

    /// Handle for the person currently at `index`.
    pub fn get(&self, index: usize) -> StoreResult<PersonHandle> {
        let ids = self.ids()?;
        let id = ids.get(index).copied().ok_or(RepoError::OffsetOutOfBounds {
            offset: index,
            len: ids.len(),
        })?;
        Ok(PersonHandle::new(self.store.clone(), id))
    }

    /// Inserts `person` into the store in one transaction.
    pub fn add(&self, person: Person) -> StoreResult<PersonHandle> {
        self.store.add_person(person)
    }

    pub fn subscribe(&self) -> StoreResult<ChangeSubscription> {
        self.store.subscribe()
    }

    pub fn store(&self) -> &Store {
        &self.store
    }
}
