//! Headless view-models for the two screens.
//!
//! # Responsibility
//! - Hold the rows a UI renders and forward gestures to live handles.
//! - Re-read rows when the store publishes a relevant change set.
//!
//! # Invariants
//! - Screens never write rows directly; every edit goes through a handle
//!   and therefore through exactly one transaction.
//! - Rows are replaced only by `refresh`, which returns the index-level diff.

use crate::binding::diff::Keyed;
use crate::model::dog::{Dog, DogId};
use crate::model::person::{Person, PersonId};

pub mod people_list;
pub mod person_detail;

pub use people_list::PeopleListScreen;
pub use person_detail::PersonDetailScreen;

/// One navigable row of the people list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PersonRow {
    pub id: PersonId,
    pub name: String,
}

impl From<Person> for PersonRow {
    fn from(person: Person) -> Self {
        Self {
            id: person.id,
            name: person.name,
        }
    }
}

impl Keyed for PersonRow {
    type Key = PersonId;

    fn key(&self) -> PersonId {
        self.id
    }
}

/// One editable dog row on the detail screen.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DogRow {
    pub id: DogId,
    pub name: String,
}

impl From<Dog> for DogRow {
    fn from(dog: Dog) -> Self {
        Self {
            id: dog.id,
            name: dog.name,
        }
    }
}

impl Keyed for DogRow {
    type Key = DogId;

    fn key(&self) -> DogId {
        self.id
    }
}
