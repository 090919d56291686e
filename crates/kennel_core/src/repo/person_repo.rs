//! Person rows and whole-person reads.
//!
//! # Invariants
//! - Listing order is insertion order (`persons.seq`), which is the order the
//!   live result set exposes.
//! - Deleting a person deletes every dog in their collection and retires
//!   all of their ids.

use crate::model::dog::{Dog, DogId};
use crate::model::person::{Person, PersonId};
use crate::repo::dog_repo::{DogRepository, SqliteDogRepository};
use crate::model::EntityKind;
use crate::repo::{ensure_not_retired, parse_uuid, retire_id, RepoError, RepoResult};
use rusqlite::{params, Connection, OptionalExtension};

/// Repository interface for person records.
pub trait PersonRepository {
    /// Inserts a person and, in order, every dog they carry.
    fn insert_person(&self, person: &Person) -> RepoResult<PersonId>;
    /// Loads one person including their dogs.
    fn get_person(&self, id: PersonId) -> RepoResult<Option<Person>>;
    /// Loads only the name column.
    fn person_name(&self, id: PersonId) -> RepoResult<Option<String>>;
    fn person_exists(&self, id: PersonId) -> RepoResult<bool>;
    /// Lists every person with dogs, in insertion order.
    fn list_persons(&self) -> RepoResult<Vec<Person>>;
    /// Lists person ids in insertion order without loading dogs.
    fn list_person_ids(&self) -> RepoResult<Vec<PersonId>>;
    fn count_persons(&self) -> RepoResult<usize>;
    /// Replaces the person name.
    fn rename_person(&self, id: PersonId, name: &str) -> RepoResult<()>;
    /// Deletes a person and their dogs; returns the deleted dog ids.
    fn delete_person(&self, id: PersonId) -> RepoResult<Vec<DogId>>;
}

/// SQLite-backed person repository.
pub struct SqlitePersonRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqlitePersonRepository<'conn> {
    pub fn new(conn: &'conn Connection) -> Self {
        Self { conn }
    }

    fn dogs(&self) -> SqliteDogRepository<'conn> {
        SqliteDogRepository::new(self.conn)
    }
}

impl PersonRepository for SqlitePersonRepository<'_> {
    fn insert_person(&self, person: &Person) -> RepoResult<PersonId> {
        person.validate()?;
        ensure_not_retired(self.conn, EntityKind::Person, person.id)?;

        self.conn.execute(
            "INSERT INTO persons (uuid, name) VALUES (?1, ?2);",
            params![person.id.to_string(), person.name.as_str()],
        )?;

        let dogs = self.dogs();
        for dog in &person.dogs {
            dogs.append_dog(person.id, dog)?;
        }

        Ok(person.id)
    }

    fn get_person(&self, id: PersonId) -> RepoResult<Option<Person>> {
        let Some(name) = self.person_name(id)? else {
            return Ok(None);
        };
        let dogs = self.dogs().list_dogs(id)?;
        Ok(Some(Person { id, name, dogs }))
    }

    fn person_name(&self, id: PersonId) -> RepoResult<Option<String>> {
        let name = self
            .conn
            .query_row(
                "SELECT name FROM persons WHERE uuid = ?1;",
                [id.to_string()],
                |row| row.get(0),
            )
            .optional()?;
        Ok(name)
    }

    fn person_exists(&self, id: PersonId) -> RepoResult<bool> {
        Ok(self.person_name(id)?.is_some())
    }

    fn list_persons(&self) -> RepoResult<Vec<Person>> {
        let mut stmt = self.conn.prepare(
            "SELECT p.uuid, p.name, d.uuid, d.name
             FROM persons p
             LEFT JOIN person_dogs m ON m.person_uuid = p.uuid
             LEFT JOIN dogs d ON d.uuid = m.dog_uuid
             ORDER BY p.seq ASC, m.position ASC;",
        )?;
        let mut rows = stmt.query([])?;
        let mut persons: Vec<Person> = Vec::new();

        while let Some(row) = rows.next()? {
            let person_uuid: String = row.get(0)?;
            let person_id = parse_uuid(&person_uuid, "persons.uuid")?;
            if persons.last().map(|person| person.id) != Some(person_id) {
                persons.push(Person::with_id(person_id, row.get::<_, String>(1)?));
            }

            let dog_uuid: Option<String> = row.get(2)?;
            if let Some(dog_uuid) = dog_uuid {
                let dog = Dog::with_id(parse_uuid(&dog_uuid, "dogs.uuid")?, row.get::<_, String>(3)?);
                if let Some(person) = persons.last_mut() {
                    person.dogs.push(dog);
                }
            }
        }

        Ok(persons)
    }

    fn list_person_ids(&self) -> RepoResult<Vec<PersonId>> {
        let mut stmt = self
            .conn
            .prepare("SELECT uuid FROM persons ORDER BY seq ASC;")?;
        let mut rows = stmt.query([])?;
        let mut ids = Vec::new();
        while let Some(row) = rows.next()? {
            let value: String = row.get(0)?;
            ids.push(parse_uuid(&value, "persons.uuid")?);
        }
        Ok(ids)
    }

    fn count_persons(&self) -> RepoResult<usize> {
        let count: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM persons;", [], |row| row.get(0))?;
        usize::try_from(count)
            .map_err(|_| RepoError::InvalidData(format!("negative person count {count}")))
    }

    fn rename_person(&self, id: PersonId, name: &str) -> RepoResult<()> {
        Person::with_id(id, name).validate()?;
        let changed = self.conn.execute(
            "UPDATE persons
             SET name = ?2,
                 updated_at = (strftime('%s', 'now') * 1000)
             WHERE uuid = ?1;",
            params![id.to_string(), name],
        )?;
        if changed == 0 {
            return Err(RepoError::PersonNotFound(id));
        }
        Ok(())
    }

    fn delete_person(&self, id: PersonId) -> RepoResult<Vec<DogId>> {
        let dog_ids = self.dogs().list_dog_ids(id)?;
        self.conn.execute(
            "DELETE FROM dogs
             WHERE uuid IN (SELECT dog_uuid FROM person_dogs WHERE person_uuid = ?1);",
            [id.to_string()],
        )?;
        let changed = self
            .conn
            .execute("DELETE FROM persons WHERE uuid = ?1;", [id.to_string()])?;
        if changed == 0 {
            return Err(RepoError::PersonNotFound(id));
        }

        retire_id(self.conn, EntityKind::Person, id)?;
        for dog_id in &dog_ids {
            retire_id(self.conn, EntityKind::Dog, *dog_id)?;
        }
        Ok(dog_ids)
    }
}
