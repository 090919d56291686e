//! Write-transaction scope handed to `Store::write` closures.

use crate::repo::dog_repo::SqliteDogRepository;
use crate::repo::person_repo::SqlitePersonRepository;
use crate::store::change::StoreChange;
use rusqlite::Connection;

/// Open write transaction plus the changes it will publish on commit.
///
/// Repositories obtained here run inside the transaction; nothing they do is
/// visible to readers until the closure returns `Ok` and the commit succeeds.
pub struct WriteTxn<'t> {
    conn: &'t Connection,
    changes: Vec<StoreChange>,
}

impl<'t> WriteTxn<'t> {
    pub(crate) fn new(conn: &'t Connection) -> Self {
        Self {
            conn,
            changes: Vec::new(),
        }
    }

    pub fn persons(&self) -> SqlitePersonRepository<'t> {
        SqlitePersonRepository::new(self.conn)
    }

    pub fn dogs(&self) -> SqliteDogRepository<'t> {
        SqliteDogRepository::new(self.conn)
    }

    /// Queues a change notification for publication after commit.
    pub fn record(&mut self, change: StoreChange) {
        if !self.changes.contains(&change) {
            self.changes.push(change);
        }
    }

    pub(crate) fn into_changes(self) -> Vec<StoreChange> {
        self.changes
    }
}
