//! Dog rows and the ordered `person_dogs` membership table.
//!
//! # Invariants
//! - Positions within one person are dense: `0..len` after every write.
//! - Removing a dog from a collection deletes the dog row as well and
//!   retires its id.
//! - Offsets are validated against the current collection length before any
//!   row is touched.

use crate::model::dog::{Dog, DogId};
use crate::model::person::PersonId;
use crate::model::EntityKind;
use crate::repo::{ensure_not_retired, parse_uuid, retire_id, RepoError, RepoResult};
use rusqlite::{params, Connection, OptionalExtension};
use std::collections::BTreeSet;

/// Repository interface for dogs and their collection order.
pub trait DogRepository {
    /// Loads one dog by id.
    fn get_dog(&self, id: DogId) -> RepoResult<Option<Dog>>;
    /// Returns the person whose collection holds this dog.
    fn dog_owner(&self, id: DogId) -> RepoResult<Option<PersonId>>;
    /// Replaces the dog name.
    fn rename_dog(&self, id: DogId, name: &str) -> RepoResult<()>;
    /// Lists a person's dogs in collection order.
    fn list_dogs(&self, person_id: PersonId) -> RepoResult<Vec<Dog>>;
    /// Lists a person's dog ids in collection order.
    fn list_dog_ids(&self, person_id: PersonId) -> RepoResult<Vec<DogId>>;
    /// Persists a new dog at the end of the collection; returns its offset.
    fn append_dog(&self, person_id: PersonId, dog: &Dog) -> RepoResult<usize>;
    /// Deletes the dogs at `offsets`; returns the removed ids in offset order.
    fn remove_dogs_at(
        &self,
        person_id: PersonId,
        offsets: &BTreeSet<usize>,
    ) -> RepoResult<Vec<DogId>>;
    /// Relocates the dog at `from` so that it ends up at offset `to`.
    fn move_dog(&self, person_id: PersonId, from: usize, to: usize) -> RepoResult<()>;
}

/// SQLite-backed dog repository.
pub struct SqliteDogRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteDogRepository<'conn> {
    pub fn new(conn: &'conn Connection) -> Self {
        Self { conn }
    }

    fn ensure_person_exists(&self, person_id: PersonId) -> RepoResult<()> {
        let exists: i64 = self.conn.query_row(
            "SELECT EXISTS(SELECT 1 FROM persons WHERE uuid = ?1);",
            [person_id.to_string()],
            |row| row.get(0),
        )?;
        if exists == 1 {
            Ok(())
        } else {
            Err(RepoError::PersonNotFound(person_id))
        }
    }

    fn write_positions(&self, ids: &[DogId]) -> RepoResult<()> {
        let mut stmt = self.conn.prepare(
            "UPDATE person_dogs
             SET position = ?2
             WHERE dog_uuid = ?1;",
        )?;
        for (index, id) in ids.iter().enumerate() {
            stmt.execute(params![id.to_string(), index as i64])?;
        }
        Ok(())
    }
}

impl DogRepository for SqliteDogRepository<'_> {
    fn get_dog(&self, id: DogId) -> RepoResult<Option<Dog>> {
        let name: Option<String> = self
            .conn
            .query_row(
                "SELECT name FROM dogs WHERE uuid = ?1;",
                [id.to_string()],
                |row| row.get(0),
            )
            .optional()?;
        Ok(name.map(|name| Dog::with_id(id, name)))
    }

    fn dog_owner(&self, id: DogId) -> RepoResult<Option<PersonId>> {
        let owner: Option<String> = self
            .conn
            .query_row(
                "SELECT person_uuid FROM person_dogs WHERE dog_uuid = ?1;",
                [id.to_string()],
                |row| row.get(0),
            )
            .optional()?;
        owner
            .map(|value| parse_uuid(&value, "person_dogs.person_uuid"))
            .transpose()
    }

    fn rename_dog(&self, id: DogId, name: &str) -> RepoResult<()> {
        Dog::with_id(id, name).validate()?;
        let changed = self.conn.execute(
            "UPDATE dogs
             SET name = ?2,
                 updated_at = (strftime('%s', 'now') * 1000)
             WHERE uuid = ?1;",
            params![id.to_string(), name],
        )?;
        if changed == 0 {
            return Err(RepoError::DogNotFound(id));
        }
        Ok(())
    }

    fn list_dogs(&self, person_id: PersonId) -> RepoResult<Vec<Dog>> {
        self.ensure_person_exists(person_id)?;
        let mut stmt = self.conn.prepare(
            "SELECT d.uuid, d.name
             FROM person_dogs m
             INNER JOIN dogs d ON d.uuid = m.dog_uuid
             WHERE m.person_uuid = ?1
             ORDER BY m.position ASC;",
        )?;
        let mut rows = stmt.query([person_id.to_string()])?;
        let mut dogs = Vec::new();
        while let Some(row) = rows.next()? {
            let uuid: String = row.get(0)?;
            dogs.push(Dog::with_id(parse_uuid(&uuid, "dogs.uuid")?, row.get::<_, String>(1)?));
        }
        Ok(dogs)
    }

    fn list_dog_ids(&self, person_id: PersonId) -> RepoResult<Vec<DogId>> {
        self.ensure_person_exists(person_id)?;
        let mut stmt = self.conn.prepare(
            "SELECT dog_uuid
             FROM person_dogs
             WHERE person_uuid = ?1
             ORDER BY position ASC;",
        )?;
        let mut rows = stmt.query([person_id.to_string()])?;
        let mut ids = Vec::new();
        while let Some(row) = rows.next()? {
            let value: String = row.get(0)?;
            ids.push(parse_uuid(&value, "person_dogs.dog_uuid")?);
        }
        Ok(ids)
    }

    fn append_dog(&self, person_id: PersonId, dog: &Dog) -> RepoResult<usize> {
        dog.validate()?;
        self.ensure_person_exists(person_id)?;
        if self.get_dog(dog.id)?.is_some() {
            return Err(RepoError::DuplicateDog(dog.id));
        }
        ensure_not_retired(self.conn, EntityKind::Dog, dog.id)?;

        let position: i64 = self.conn.query_row(
            "SELECT COALESCE(MAX(position), -1) + 1
             FROM person_dogs
             WHERE person_uuid = ?1;",
            [person_id.to_string()],
            |row| row.get(0),
        )?;

        self.conn.execute(
            "INSERT INTO dogs (uuid, name) VALUES (?1, ?2);",
            params![dog.id.to_string(), dog.name.as_str()],
        )?;
        self.conn.execute(
            "INSERT INTO person_dogs (person_uuid, dog_uuid, position) VALUES (?1, ?2, ?3);",
            params![person_id.to_string(), dog.id.to_string(), position],
        )?;

        Ok(position as usize)
    }

    fn remove_dogs_at(
        &self,
        person_id: PersonId,
        offsets: &BTreeSet<usize>,
    ) -> RepoResult<Vec<DogId>> {
        let mut ids = self.list_dog_ids(person_id)?;
        if let Some(&offset) = offsets.last() {
            if offset >= ids.len() {
                return Err(RepoError::OffsetOutOfBounds {
                    offset,
                    len: ids.len(),
                });
            }
        } else {
            return Ok(Vec::new());
        }

        let removed = offsets.iter().map(|&offset| ids[offset]).collect::<Vec<_>>();
        for id in &removed {
            self.conn
                .execute("DELETE FROM dogs WHERE uuid = ?1;", [id.to_string()])?;
            retire_id(self.conn, EntityKind::Dog, *id)?;
        }

        ids.retain(|id| !removed.contains(id));
        self.write_positions(&ids)?;
        Ok(removed)
    }

    fn move_dog(&self, person_id: PersonId, from: usize, to: usize) -> RepoResult<()> {
        let mut ids = self.list_dog_ids(person_id)?;
        for offset in [from, to] {
            if offset >= ids.len() {
                return Err(RepoError::OffsetOutOfBounds {
                    offset,
                    len: ids.len(),
                });
            }
        }
        if from == to {
            return Ok(());
        }

        let moved = ids.remove(from);
        ids.insert(to, moved);
        self.write_positions(&ids)
    }
}
