//! Core of the kennel app: people, their dogs, and live bindings for UIs.
//! All persistence rules and transaction boundaries live in this crate.

pub mod binding;
pub mod config;
pub mod db;
pub mod logging;
pub mod model;
pub mod repo;
pub mod screen;
pub mod store;

pub use binding::diff::{diff_keyed, CollectionChanges, Keyed};
pub use binding::dog::{DogHandle, DogListHandle};
pub use binding::person::PersonHandle;
pub use binding::results::PersonResults;
pub use binding::HandleState;
pub use config::{ConfigError, KennelConfig};
pub use logging::{default_log_level, init_logging, init_logging_from_config, logging_status};
pub use model::dog::{Dog, DogId};
pub use model::names::{CyclingNames, NameSource, RandomNames, DOG_NAMES, PERSON_NAMES};
pub use model::person::{Person, PersonId};
pub use model::validation::{ModelValidationError, MAX_NAME_CHARS};
pub use model::EntityKind;
pub use repo::dog_repo::{DogRepository, SqliteDogRepository};
pub use repo::person_repo::{PersonRepository, SqlitePersonRepository};
pub use repo::{RepoError, RepoResult};
pub use screen::{DogRow, PeopleListScreen, PersonDetailScreen, PersonRow};
pub use store::{
    ChangeSet, ChangeSubscription, Drained, Store, StoreChange, StoreError, StoreResult, WriteTxn,
};

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
