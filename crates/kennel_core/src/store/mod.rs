//! Shared store: one SQLite connection behind a unit of work.
//!
//! # Responsibility
//! - Serialize every read and write through a single lock.
//! - Run each mutation in its own transaction: commit on `Ok`, roll back on
//!   every other exit path.
//! - Publish one `ChangeSet` per committed write to live subscribers.
//!
//! # Invariants
//! - Nothing is published for a rolled-back transaction.
//! - After `close()` every operation returns `StoreError::Closed` and all
//!   subscriptions are disconnected.
//! - `write` closures must not call back into the same `Store`; the lock is
//!   not reentrant.

use crate::binding::dog::DogHandle;
use crate::binding::person::PersonHandle;
use crate::binding::results::PersonResults;
use crate::config::KennelConfig;
use crate::db::{open_db, open_db_in_memory, DbError};
use crate::model::dog::DogId;
use crate::model::person::{Person, PersonId};
use crate::model::EntityKind;
use crate::repo::dog_repo::{DogRepository, SqliteDogRepository};
use crate::repo::person_repo::{PersonRepository, SqlitePersonRepository};
use crate::repo::{RepoError, RepoResult};
use crossbeam::channel::Sender;
use log::{debug, error, info, warn};
use rusqlite::{Connection, TransactionBehavior};
use std::collections::BTreeMap;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::Path;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Instant;
use uuid::Uuid;

pub mod change;
mod txn;

pub use change::{ChangeSet, ChangeSubscription, Drained, StoreChange};
pub use txn::WriteTxn;

pub type StoreResult<T> = Result<T, StoreError>;

/// Failure surfaced by the store, its handles and the screens above them.
#[derive(Debug)]
pub enum StoreError {
    /// Validation, lookup or SQLite failure from the repository layer.
    Repo(RepoError),
    /// The handle's entity was deleted or its store closed.
    StaleReference { entity: EntityKind, id: Uuid },
    /// A screen gesture arrived before any entity was bound.
    Unbound,
    Closed,
    /// A writer panicked while holding the store lock.
    Poisoned,
}

impl Display for StoreError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Repo(err) => write!(f, "{err}"),
            Self::StaleReference { entity, id } => {
                write!(f, "stale reference: {entity} {id} is no longer available")
            }
            Self::Unbound => write!(f, "no entity is bound to this view"),
            Self::Closed => write!(f, "store is closed"),
            Self::Poisoned => write!(f, "store lock poisoned"),
        }
    }
}

impl Error for StoreError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Repo(err) => Some(err),
            _ => None,
        }
    }
}

impl From<RepoError> for StoreError {
    fn from(value: RepoError) -> Self {
        Self::Repo(value)
    }
}

impl From<DbError> for StoreError {
    fn from(value: DbError) -> Self {
        Self::Repo(RepoError::Db(value))
    }
}

/// Process-wide handle to the persisted object graph.
///
/// Cloning is cheap and every clone refers to the same connection.
#[derive(Clone)]
pub struct Store {
    inner: Arc<Mutex<StoreState>>,
}

struct StoreState {
    conn: Option<Connection>,
    subscribers: BTreeMap<u64, Sender<ChangeSet>>,
    next_subscriber_id: u64,
    revision: u64,
}

impl StoreState {
    fn publish(&mut self, set: ChangeSet) {
        let mut dropped = Vec::new();
        for (id, sender) in &self.subscribers {
            if sender.send(set.clone()).is_err() {
                dropped.push(*id);
            }
        }
        for id in dropped {
            self.subscribers.remove(&id);
            debug!("event=subscriber_drop module=store status=ok subscriber_id={id}");
        }
    }
}

impl Store {
    /// Opens the database file at `path`.
    pub fn open(path: impl AsRef<Path>) -> StoreResult<Self> {
        Ok(Self::from_connection(open_db(path)?))
    }

    /// Opens a private in-memory store.
    pub fn open_in_memory() -> StoreResult<Self> {
        Ok(Self::from_connection(open_db_in_memory()?))
    }

    /// Opens the database named by `config.db_path`.
    pub fn open_configured(config: &KennelConfig) -> StoreResult<Self> {
        Self::open(&config.db_path)
    }

    /// Wraps an already migrated connection.
    pub fn from_connection(conn: Connection) -> Self {
        Self {
            inner: Arc::new(Mutex::new(StoreState {
                conn: Some(conn),
                subscribers: BTreeMap::new(),
                next_subscriber_id: 0,
                revision: 0,
            })),
        }
    }

    /// Runs a read against the latest committed state.
    pub fn read<T>(&self, f: impl FnOnce(&Connection) -> RepoResult<T>) -> StoreResult<T> {
        let state = self.lock_state()?;
        let conn = state.conn.as_ref().ok_or(StoreError::Closed)?;
        f(conn).map_err(Into::into)
    }

    /// Runs `f` inside one write transaction.
    ///
    /// The transaction commits only when `f` returns `Ok`; an error from `f`
    /// or from the commit itself rolls everything back and is returned as is.
    /// Changes recorded through [`WriteTxn::record`] are published after the
    /// commit.
    pub fn write<T>(
        &self,
        f: impl FnOnce(&mut WriteTxn<'_>) -> StoreResult<T>,
    ) -> StoreResult<T> {
        let mut guard = self.lock_state()?;
        let state = &mut *guard;
        let conn = state.conn.as_mut().ok_or(StoreError::Closed)?;
        let started_at = Instant::now();

        let tx = conn
            .transaction_with_behavior(TransactionBehavior::Immediate)
            .map_err(RepoError::from)?;

        let (value, changes) = {
            let mut txn = WriteTxn::new(&tx);
            match f(&mut txn) {
                Ok(value) => (value, txn.into_changes()),
                Err(err) => {
                    warn!(
                        "event=txn_rollback module=store status=ok duration_us={} reason={}",
                        started_at.elapsed().as_micros(),
                        err
                    );
                    return Err(err);
                }
            }
        };

        if let Err(err) = tx.commit() {
            error!(
                "event=txn_commit module=store status=error duration_us={} error={}",
                started_at.elapsed().as_micros(),
                err
            );
            return Err(RepoError::from(err).into());
        }

        debug!(
            "event=txn_commit module=store status=ok duration_us={} changes={}",
            started_at.elapsed().as_micros(),
            changes.len()
        );

        if !changes.is_empty() {
            state.revision += 1;
            let set = ChangeSet {
                revision: state.revision,
                changes,
            };
            state.publish(set);
        }

        Ok(value)
    }

    /// Registers a new change listener.
    pub fn subscribe(&self) -> StoreResult<ChangeSubscription> {
        let mut state = self.lock_state()?;
        if state.conn.is_none() {
            return Err(StoreError::Closed);
        }
        let (sender, receiver) = crossbeam::channel::unbounded();
        let id = state.next_subscriber_id;
        state.next_subscriber_id = state.next_subscriber_id.saturating_add(1);
        state.subscribers.insert(id, sender);
        Ok(ChangeSubscription::new(receiver))
    }

    /// Closes the connection and disconnects every subscriber.
    ///
    /// Idempotent. Handles created earlier report `Invalidated` afterwards.
    pub fn close(&self) -> StoreResult<()> {
        let mut state = self.lock_state()?;
        let Some(conn) = state.conn.take() else {
            return Ok(());
        };
        let subscribers = state.subscribers.len();
        state.subscribers.clear();
        conn.close().map_err(|(_, err)| RepoError::from(err))?;
        info!("event=store_close module=store status=ok subscribers={subscribers}");
        Ok(())
    }

    pub fn is_closed(&self) -> bool {
        self.lock_state()
            .map(|state| state.conn.is_none())
            .unwrap_or(true)
    }

    /// Whether both values refer to the same store instance.
    pub fn same_store(&self, other: &Store) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }

    /// Live result set of every person.
    pub fn persons(&self) -> PersonResults {
        PersonResults::new(self.clone())
    }

    /// Persists `person` (and any dogs it carries) in one transaction.
    pub fn add_person(&self, person: Person) -> StoreResult<PersonHandle> {
        let id = self.write(|txn| {
            let id = txn.persons().insert_person(&person)?;
            txn.record(StoreChange::PersonInserted(id));
            Ok(id)
        })?;
        Ok(PersonHandle::new(self.clone(), id))
    }

    /// Deletes a person and their dogs in one transaction.
    pub fn delete_person(&self, id: PersonId) -> StoreResult<()> {
        self.write(|txn| {
            txn.persons().delete_person(id)?;
            txn.record(StoreChange::PersonDeleted(id));
            Ok(())
        })
    }

    /// Binds a handle to an existing person.
    pub fn person(&self, id: PersonId) -> StoreResult<PersonHandle> {
        let exists = self.read(|conn| SqlitePersonRepository::new(conn).person_exists(id))?;
        if !exists {
            return Err(RepoError::PersonNotFound(id).into());
        }
        Ok(PersonHandle::new(self.clone(), id))
    }

    /// Binds a handle to an existing dog.
    pub fn dog(&self, id: DogId) -> StoreResult<DogHandle> {
        let dog = self.read(|conn| SqliteDogRepository::new(conn).get_dog(id))?;
        if dog.is_none() {
            return Err(RepoError::DogNotFound(id).into());
        }
        Ok(DogHandle::new(self.clone(), id))
    }

    fn lock_state(&self) -> StoreResult<MutexGuard<'_, StoreState>> {
        self.inner.lock().map_err(|_| StoreError::Poisoned)
    }
}

impl std::fmt::Debug for Store {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Store").finish_non_exhaustive()
    }
}
