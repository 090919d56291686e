//! Repository contracts and SQLite implementations.
//!
//! # Responsibility
//! - Keep SQL for `persons`, `dogs` and `person_dogs` behind traits.
//! - Translate storage failures into semantic errors (`PersonNotFound`,
//!   `OffsetOutOfBounds`, ...).
//!
//! # Invariants
//! - Write paths validate records before issuing SQL.
//! - Multi-statement writes expect the caller to hold a transaction; the
//!   store's unit of work always does.
//! - Deleted ids are recorded in `retired_ids` and rejected on insert, so a
//!   handle that went stale never sees a new record under its id.

use crate::db::DbError;
use crate::model::dog::DogId;
use crate::model::person::PersonId;
use crate::model::validation::ModelValidationError;
use crate::model::EntityKind;
use rusqlite::{params, Connection};
use std::error::Error;
use std::fmt::{Display, Formatter};
use uuid::Uuid;

pub mod dog_repo;
pub mod person_repo;

pub type RepoResult<T> = Result<T, RepoError>;

/// Persistence-level failure for person/dog operations.
#[derive(Debug)]
pub enum RepoError {
    Validation(ModelValidationError),
    Db(DbError),
    PersonNotFound(PersonId),
    DogNotFound(DogId),
    /// The dog id is already persisted; collections only accept new dogs.
    DuplicateDog(DogId),
    /// The id belonged to a deleted entity and cannot be used again.
    RetiredId { entity: EntityKind, id: Uuid },
    /// A list gesture referenced an offset past the end of the collection.
    OffsetOutOfBounds {
        offset: usize,
        len: usize,
    },
    InvalidData(String),
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(err) => write!(f, "{err}"),
            Self::Db(err) => write!(f, "{err}"),
            Self::PersonNotFound(id) => write!(f, "person not found: {id}"),
            Self::DogNotFound(id) => write!(f, "dog not found: {id}"),
            Self::DuplicateDog(id) => write!(f, "dog already persisted: {id}"),
            Self::RetiredId { entity, id } => {
                write!(f, "{entity} id {id} belonged to a deleted {entity}")
            }
            Self::OffsetOutOfBounds { offset, len } => {
                write!(f, "offset {offset} out of bounds for collection of {len}")
            }
            Self::InvalidData(message) => write!(f, "invalid persisted data: {message}"),
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::Db(err) => Some(err),
            _ => None,
        }
    }
}

impl From<ModelValidationError> for RepoError {
    fn from(value: ModelValidationError) -> Self {
        Self::Validation(value)
    }
}

impl From<DbError> for RepoError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for RepoError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

/// Marks `id` as deleted so it can never be inserted again.
pub(crate) fn retire_id(conn: &Connection, entity: EntityKind, id: Uuid) -> RepoResult<()> {
    conn.execute(
        "INSERT OR IGNORE INTO retired_ids (uuid, kind) VALUES (?1, ?2);",
        params![id.to_string(), entity.to_string()],
    )?;
    Ok(())
}

pub(crate) fn ensure_not_retired(
    conn: &Connection,
    entity: EntityKind,
    id: Uuid,
) -> RepoResult<()> {
    let retired: i64 = conn.query_row(
        "SELECT EXISTS(SELECT 1 FROM retired_ids WHERE uuid = ?1);",
        [id.to_string()],
        |row| row.get(0),
    )?;
    if retired == 1 {
        return Err(RepoError::RetiredId { entity, id });
    }
    Ok(())
}

pub(crate) fn parse_uuid(value: &str, column: &'static str) -> RepoResult<Uuid> {
    Uuid::parse_str(value)
        .map_err(|_| RepoError::InvalidData(format!("invalid uuid `{value}` in {column}")))
}
