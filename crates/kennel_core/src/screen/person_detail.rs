//! Person detail / edit screen.

use crate::binding::diff::{diff_keyed, CollectionChanges};
use crate::binding::dog::DogHandle;
use crate::binding::person::PersonHandle;
use crate::binding::HandleState;
use crate::model::dog::Dog;
use crate::model::names::NameSource;
use crate::repo::RepoError;
use crate::screen::DogRow;
use crate::store::{ChangeSubscription, StoreError, StoreResult};
use std::fmt::{Debug, Formatter};
use std::sync::Arc;

/// Editable view of one person: a name field and a reorderable dog list.
///
/// Starts `Unbound` until a person is bound; gestures on an unbound screen
/// return `StoreError::Unbound`.
pub struct PersonDetailScreen {
    person: Option<PersonHandle>,
    subscription: Option<ChangeSubscription>,
    title: String,
    dog_rows: Vec<DogRow>,
    names: Arc<dyn NameSource>,
}

impl PersonDetailScreen {
    pub fn unbound(names: Arc<dyn NameSource>) -> Self {
        Self {
            person: None,
            subscription: None,
            title: String::new(),
            dog_rows: Vec::new(),
            names,
        }
    }

    pub fn bound(person: PersonHandle, names: Arc<dyn NameSource>) -> StoreResult<Self> {
        let mut screen = Self::unbound(names);
        screen.bind(person)?;
        Ok(screen)
    }

    /// Binds (or rebinds) the screen to `person` and renders it.
    pub fn bind(&mut self, person: PersonHandle) -> StoreResult<()> {
        let subscription = person.store().subscribe()?;
        let snapshot = person.snapshot()?;
        self.title = snapshot.name;
        self.dog_rows = snapshot.dogs.into_iter().map(DogRow::from).collect();
        self.subscription = Some(subscription);
        self.person = Some(person);
        Ok(())
    }

    pub fn handle_state(&self) -> StoreResult<HandleState> {
        match &self.person {
            None => Ok(HandleState::Unbound),
            Some(person) => person.state(),
        }
    }

    pub fn person(&self) -> Option<&PersonHandle> {
        self.person.as_ref()
    }

    /// Name as of the last render.
    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn dog_rows(&self) -> &[DogRow] {
        &self.dog_rows
    }

    /// Name text field edit; one transaction per call.
    pub fn edit_name(&self, text: impl Into<String>) -> StoreResult<()> {
        self.handle()?.set_name(text)
    }

    /// Dog row text field edit, addressed by rendered row.
    pub fn edit_dog_name(&self, offset: usize, text: impl Into<String>) -> StoreResult<()> {
        let person = self.handle()?;
        let row = self.dog_rows.get(offset).ok_or(RepoError::OffsetOutOfBounds {
            offset,
            len: self.dog_rows.len(),
        })?;
        DogHandle::new(person.store().clone(), row.id).set_name(text)
    }

    /// Swipe-to-delete over one or more offsets.
    pub fn delete_dogs(&self, offsets: impl IntoIterator<Item = usize>) -> StoreResult<()> {
        self.handle()?.dogs().remove(offsets).map(|_| ())
    }

    /// Drag-to-reorder.
    pub fn move_dog(&self, from: usize, to: usize) -> StoreResult<()> {
        self.handle()?.dogs().move_item(from, to)
    }

    /// "Add Dog": appends a dog with a default name.
    pub fn add_dog(&self) -> StoreResult<DogHandle> {
        self.handle()?.dogs().append(Dog::new(self.names.dog_name()))
    }

    /// Applies pending change notifications for the bound person.
    ///
    /// Returns the dog row diff when anything about this person changed
    /// (an empty diff means only the name changed).
    ///
    /// # Errors
    /// - `StoreError::StaleReference` once the person has been deleted.
    /// - `StoreError::Closed` once the store has closed.
    pub fn refresh(&mut self) -> StoreResult<Option<CollectionChanges>> {
        let (Some(person), Some(subscription)) = (&self.person, &self.subscription) else {
            return Err(StoreError::Unbound);
        };

        let drained = subscription.drain();
        if drained.disconnected {
            return Err(StoreError::Closed);
        }
        let id = person.id();
        if !drained.sets.iter().any(|set| set.touches_person(id)) {
            return Ok(None);
        }

        let snapshot = person.snapshot()?;
        let rows = snapshot
            .dogs
            .into_iter()
            .map(DogRow::from)
            .collect::<Vec<_>>();
        let changes = diff_keyed(&self.dog_rows, &rows);
        self.title = snapshot.name;
        self.dog_rows = rows;
        Ok(Some(changes))
    }

    fn handle(&self) -> StoreResult<&PersonHandle> {
        self.person.as_ref().ok_or(StoreError::Unbound)
    }
}

impl Debug for PersonDetailScreen {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PersonDetailScreen")
            .field("person", &self.person.as_ref().map(PersonHandle::id))
            .field("title", &self.title)
            .field("dog_rows", &self.dog_rows)
            .finish_non_exhaustive()
    }
}
