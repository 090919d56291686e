//! Change notifications published after each committed write.

use crate::model::dog::DogId;
use crate::model::person::PersonId;
use crossbeam::channel::{Receiver, RecvTimeoutError, TryRecvError};
use std::fmt::{Debug, Formatter};
use std::time::Duration;

/// One entity-level effect of a committed transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreChange {
    PersonInserted(PersonId),
    /// A person field (currently only `name`) changed.
    PersonUpdated(PersonId),
    PersonDeleted(PersonId),
    /// Dogs were appended, removed or reordered in this person's collection.
    DogListChanged(PersonId),
    /// A dog field changed; `person` is the collection owner.
    DogUpdated { person: PersonId, dog: DogId },
}

impl StoreChange {
    /// The person whose rendered state this change affects.
    pub fn person(&self) -> PersonId {
        match self {
            Self::PersonInserted(id)
            | Self::PersonUpdated(id)
            | Self::PersonDeleted(id)
            | Self::DogListChanged(id) => *id,
            Self::DogUpdated { person, .. } => *person,
        }
    }

    /// Whether the all-persons result set (ids or names) changed.
    pub fn alters_person_list(&self) -> bool {
        matches!(
            self,
            Self::PersonInserted(_) | Self::PersonUpdated(_) | Self::PersonDeleted(_)
        )
    }
}

/// Every change made by one committed transaction.
///
/// `revision` increases by one per published set and never repeats for a
/// store instance.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChangeSet {
    pub revision: u64,
    pub changes: Vec<StoreChange>,
}

impl ChangeSet {
    pub fn touches_person(&self, id: PersonId) -> bool {
        self.changes.iter().any(|change| change.person() == id)
    }

    pub fn alters_person_list(&self) -> bool {
        self.changes.iter().any(StoreChange::alters_person_list)
    }
}

/// Result of draining a subscription without blocking.
#[derive(Debug, Default)]
pub struct Drained {
    pub sets: Vec<ChangeSet>,
    /// The store closed; no further sets will arrive.
    pub disconnected: bool,
}

/// Receiving end of store change notifications.
///
/// Dropping the subscription unregisters it lazily on the next publish.
pub struct ChangeSubscription {
    receiver: Receiver<ChangeSet>,
}

impl Debug for ChangeSubscription {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChangeSubscription")
            .field("pending", &self.receiver.len())
            .finish_non_exhaustive()
    }
}

impl ChangeSubscription {
    pub(crate) fn new(receiver: Receiver<ChangeSet>) -> Self {
        Self { receiver }
    }

    pub fn try_recv(&self) -> Result<ChangeSet, TryRecvError> {
        self.receiver.try_recv()
    }

    pub fn recv_timeout(&self, timeout: Duration) -> Result<ChangeSet, RecvTimeoutError> {
        self.receiver.recv_timeout(timeout)
    }

    /// Collects every pending set.
    pub fn drain(&self) -> Drained {
        let mut drained = Drained::default();
        loop {
            match self.receiver.try_recv() {
                Ok(set) => drained.sets.push(set),
                Err(TryRecvError::Empty) => break,
                Err(TryRecvError::Disconnected) => {
                    drained.disconnected = true;
                    break;
                }
            }
        }
        drained
    }
}
