//! People list screen.

use crate::binding::diff::{diff_keyed, CollectionChanges};
use crate::binding::person::PersonHandle;
use crate::binding::results::PersonResults;
use crate::binding::stale_if_gone;
use crate::model::names::NameSource;
use crate::model::person::Person;
use crate::model::EntityKind;
use crate::repo::RepoError;
use crate::screen::person_detail::PersonDetailScreen;
use crate::screen::PersonRow;
use crate::store::{ChangeSet, ChangeSubscription, Store, StoreError, StoreResult};
use std::fmt::{Debug, Formatter};
use std::sync::Arc;

/// Navigable list of every person.
pub struct PeopleListScreen {
    results: PersonResults,
    subscription: ChangeSubscription,
    rows: Vec<PersonRow>,
    names: Arc<dyn NameSource>,
}

impl PeopleListScreen {
    pub const TITLE: &'static str = "People";

    /// Subscribes to `store` and renders the current people.
    pub fn new(store: &Store, names: Arc<dyn NameSource>) -> StoreResult<Self> {
        let results = store.persons();
        let subscription = results.subscribe()?;
        let rows = load_rows(&results)?;
        Ok(Self {
            results,
            subscription,
            rows,
            names,
        })
    }

    pub fn title(&self) -> &'static str {
        Self::TITLE
    }

    pub fn rows(&self) -> &[PersonRow] {
        &self.rows
    }

    pub fn results(&self) -> &PersonResults {
        &self.results
    }

    /// "Add": inserts a person with a default name.
    pub fn add_person(&self) -> StoreResult<PersonHandle> {
        self.results.add(Person::new(self.names.person_name()))
    }

    /// Pushes the detail screen for the rendered row at `index`.
    pub fn open(&self, index: usize) -> StoreResult<PersonDetailScreen> {
        let row = self.row(index)?;
        let handle = self
            .results
            .store()
            .person(row.id)
            .map_err(|err| stale_if_gone(err, EntityKind::Person, row.id))?;
        PersonDetailScreen::bound(handle, Arc::clone(&self.names))
    }

    /// Deletes the person rendered at `index`, with their dogs.
    pub fn delete_person(&self, index: usize) -> StoreResult<()> {
        let row = self.row(index)?;
        self.results
            .store()
            .delete_person(row.id)
            .map_err(|err| stale_if_gone(err, EntityKind::Person, row.id))
    }

    /// Applies pending change notifications.
    ///
    /// Returns `Ok(None)` when nothing affecting the list was published, and
    /// the row diff otherwise.
    ///
    /// # Errors
    /// - `StoreError::Closed` once the store has closed.
    pub fn refresh(&mut self) -> StoreResult<Option<CollectionChanges>> {
        let drained = self.subscription.drain();
        if drained.disconnected {
            return Err(StoreError::Closed);
        }
        if !drained.sets.iter().any(ChangeSet::alters_person_list) {
            return Ok(None);
        }

        let rows = load_rows(&self.results)?;
        let changes = diff_keyed(&self.rows, &rows);
        self.rows = rows;
        Ok(Some(changes))
    }

    fn row(&self, index: usize) -> StoreResult<&PersonRow> {
        self.rows.get(index).ok_or_else(|| {
            RepoError::OffsetOutOfBounds {
                offset: index,
                len: self.rows.len(),
            }
            .into()
        })
    }
}

impl Debug for PeopleListScreen {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PeopleListScreen")
            .field("rows", &self.rows)
            .finish_non_exhaustive()
    }
}

fn load_rows(results: &PersonResults) -> StoreResult<Vec<PersonRow>> {
    Ok(results
        .snapshot()?
        .into_iter()
        .map(PersonRow::from)
        .collect())
}
