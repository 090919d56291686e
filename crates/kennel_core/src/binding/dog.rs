//! Handles for a single dog and for a person's ordered dog collection.

use crate::binding::{stale_if_gone, state_from_lookup, HandleState};
use crate::model::dog::{Dog, DogId};
use crate::model::person::PersonId;
use crate::model::EntityKind;
use crate::repo::dog_repo::{DogRepository, SqliteDogRepository};
use crate::repo::RepoError;
use crate::store::{Store, StoreChange, StoreError, StoreResult};
use std::collections::BTreeSet;

/// Live reference to a persisted dog.
#[derive(Debug, Clone)]
pub struct DogHandle {
    store: Store,
    id: DogId,
}

impl DogHandle {
    pub(crate) fn new(store: Store, id: DogId) -> Self {
        Self { store, id }
    }

    pub fn id(&self) -> DogId {
        self.id
    }

    pub fn state(&self) -> StoreResult<HandleState> {
        state_from_lookup(self.store.read(|conn| {
            SqliteDogRepository::new(conn)
                .get_dog(self.id)
                .map(|dog| dog.is_some())
        }))
    }

    pub fn name(&self) -> StoreResult<String> {
        Ok(self.snapshot()?.name)
    }

    /// Writes the name in its own transaction.
    pub fn set_name(&self, name: impl Into<String>) -> StoreResult<()> {
        let name = name.into();
        let id = self.id;
        self.store
            .write(|txn| {
                let dogs = txn.dogs();
                let owner = dogs.dog_owner(id)?;
                dogs.rename_dog(id, &name)?;
                if let Some(person) = owner {
                    txn.record(StoreChange::DogUpdated { person, dog: id });
                }
                Ok(())
            })
            .map_err(|err| stale_if_gone(err, EntityKind::Dog, self.id))
    }

    pub fn snapshot(&self) -> StoreResult<Dog> {
        self.store
            .read(|conn| SqliteDogRepository::new(conn).get_dog(self.id))
            .map_err(|err| stale_if_gone(err, EntityKind::Dog, self.id))?
            .ok_or(StoreError::StaleReference {
                entity: EntityKind::Dog,
                id: self.id,
            })
    }
}

impl PartialEq for DogHandle {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id && self.store.same_store(&other.store)
    }
}

impl Eq for DogHandle {}

/// Live, editable view of one person's dogs.
///
/// Every gesture (`append`, `remove`, `move_item`) is one transaction and
/// publishes one `DogListChanged` for the owner.
#[derive(Debug, Clone)]
pub struct DogListHandle {
    store: Store,
    person: PersonId,
}

impl DogListHandle {
    pub(crate) fn new(store: Store, person: PersonId) -> Self {
        Self { store, person }
    }

    pub fn person_id(&self) -> PersonId {
        self.person
    }

    pub fn len(&self) -> StoreResult<usize> {
        Ok(self.ids()?.len())
    }

    pub fn is_empty(&self) -> StoreResult<bool> {
        Ok(self.len()? == 0)
    }

    /// Dog ids in collection order.
    pub fn ids(&self) -> StoreResult<Vec<DogId>> {
        self.store
            .read(|conn| SqliteDogRepository::new(conn).list_dog_ids(self.person))
            .map_err(|err| self.stale(err))
    }

    /// Dogs in collection order.
    pub fn items(&self) -> StoreResult<Vec<Dog>> {
        self.store
            .read(|conn| SqliteDogRepository::new(conn).list_dogs(self.person))
            .map_err(|err| self.stale(err))
    }

    /// Handle to the dog currently at `offset`.
    pub fn get(&self, offset: usize) -> StoreResult<DogHandle> {
        let ids = self.ids()?;
        let id = ids.get(offset).copied().ok_or(RepoError::OffsetOutOfBounds {
            offset,
            len: ids.len(),
        })?;
        Ok(DogHandle::new(self.store.clone(), id))
    }

    pub fn handles(&self) -> StoreResult<Vec<DogHandle>> {
        Ok(self
            .ids()?
            .into_iter()
            .map(|id| DogHandle::new(self.store.clone(), id))
            .collect())
    }

    /// Persists `dog` and places it last.
    pub fn append(&self, dog: Dog) -> StoreResult<DogHandle> {
        let person = self.person;
        let id = self
            .store
            .write(|txn| {
                txn.dogs().append_dog(person, &dog)?;
                txn.record(StoreChange::DogListChanged(person));
                Ok(dog.id)
            })
            .map_err(|err| self.stale(err))?;
        Ok(DogHandle::new(self.store.clone(), id))
    }

    /// Deletes the dog at `offset`.
    pub fn remove_at(&self, offset: usize) -> StoreResult<DogId> {
        let removed = self.remove([offset])?;
        removed.into_iter().next().ok_or(
            RepoError::OffsetOutOfBounds {
                offset,
                len: 0,
            }
            .into(),
        )
    }

    /// Deletes the dogs at every offset in one transaction.
    ///
    /// Offsets refer to positions before the gesture; duplicates are ignored.
    /// Returns the removed ids in ascending offset order; an empty offset set
    /// opens no transaction.
    pub fn remove(&self, offsets: impl IntoIterator<Item = usize>) -> StoreResult<Vec<DogId>> {
        let offsets = offsets.into_iter().collect::<BTreeSet<_>>();
        if offsets.is_empty() {
            self.ids()?;
            return Ok(Vec::new());
        }
        let person = self.person;
        self.store
            .write(|txn| {
                let removed = txn.dogs().remove_dogs_at(person, &offsets)?;
                txn.record(StoreChange::DogListChanged(person));
                Ok(removed)
            })
            .map_err(|err| self.stale(err))
    }

    /// Moves the dog at `from` so that it sits at `to` afterwards.
    ///
    /// `from == to` is bounds-checked but opens no transaction.
    pub fn move_item(&self, from: usize, to: usize) -> StoreResult<()> {
        if from == to {
            let len = self.len()?;
            if from >= len {
                return Err(RepoError::OffsetOutOfBounds { offset: from, len }.into());
            }
            return Ok(());
        }
        let person = self.person;
        self.store
            .write(|txn| {
                txn.dogs().move_dog(person, from, to)?;
                txn.record(StoreChange::DogListChanged(person));
                Ok(())
            })
            .map_err(|err| self.stale(err))
    }

    fn stale(&self, err: StoreError) -> StoreError {
        stale_if_gone(err, EntityKind::Person, self.person)
    }
}
