use kennel_core::db::open_db_in_memory;
use kennel_core::{
    Dog, DogRepository, ModelValidationError, Person, PersonRepository, RepoError,
    SqliteDogRepository, SqlitePersonRepository,
};
use std::collections::BTreeSet;
use uuid::Uuid;

#[test]
fn insert_and_get_roundtrip_keeps_dog_order() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqlitePersonRepository::new(&conn);

    let mut person = Person::new("Aoife");
    person.dogs = vec![Dog::new("Bella"), Dog::new("Max"), Dog::new("Daisy")];
    let id = repo.insert_person(&person).unwrap();

    let loaded = repo.get_person(id).unwrap().unwrap();
    assert_eq!(loaded, person);
}

#[test]
fn get_missing_person_returns_none() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqlitePersonRepository::new(&conn);

    assert!(repo.get_person(Uuid::new_v4()).unwrap().is_none());
    assert!(!repo.person_exists(Uuid::new_v4()).unwrap());
}

#[test]
fn list_persons_follows_insertion_order() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqlitePersonRepository::new(&conn);

    let names = ["Conor", "Aoife", "Seán"];
    let mut ids = Vec::new();
    for name in names {
        ids.push(repo.insert_person(&Person::new(name)).unwrap());
    }
    assert_eq!(repo.list_person_ids().unwrap(), ids);

    let listed = repo
        .list_persons()
        .unwrap()
        .into_iter()
        .map(|person| person.name)
        .collect::<Vec<_>>();
    assert_eq!(listed, names);
    assert_eq!(repo.count_persons().unwrap(), 3);
}

#[test]
fn list_persons_groups_dogs_under_their_owner() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqlitePersonRepository::new(&conn);

    let mut first = Person::new("Ciara");
    first.dogs = vec![Dog::new("Lucy"), Dog::new("Cooper")];
    let second = Person::new("Cian");
    let mut third = Person::new("Oisín");
    third.dogs = vec![Dog::new("Sadie")];
    for person in [&first, &second, &third] {
        repo.insert_person(person).unwrap();
    }

    assert_eq!(repo.list_persons().unwrap(), vec![first, second, third]);
}

#[test]
fn rename_validates_and_reports_missing_rows() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqlitePersonRepository::new(&conn);
    let id = repo.insert_person(&Person::new("Patrick")).unwrap();

    repo.rename_person(id, "Pádraig").unwrap();
    assert_eq!(repo.person_name(id).unwrap().as_deref(), Some("Pádraig"));

    let err = repo.rename_person(id, "two\nlines").unwrap_err();
    assert!(matches!(
        err,
        RepoError::Validation(ModelValidationError::NameHasControlChar)
    ));

    let missing = Uuid::new_v4();
    let err = repo.rename_person(missing, "ghost").unwrap_err();
    assert!(matches!(err, RepoError::PersonNotFound(id) if id == missing));
}

#[test]
fn delete_person_removes_their_dogs() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqlitePersonRepository::new(&conn);
    let dogs = SqliteDogRepository::new(&conn);

    let mut person = Person::new("Saoirse");
    person.dogs = vec![Dog::new("Molly"), Dog::new("Bailey")];
    repo.insert_person(&person).unwrap();

    let removed = repo.delete_person(person.id).unwrap();
    assert_eq!(removed, person.dog_ids());
    for dog_id in removed {
        assert!(dogs.get_dog(dog_id).unwrap().is_none());
    }
    assert!(matches!(
        repo.delete_person(person.id).unwrap_err(),
        RepoError::PersonNotFound(_)
    ));
}

#[test]
fn append_rejects_already_persisted_dog() {
    let conn = open_db_in_memory().unwrap();
    let persons = SqlitePersonRepository::new(&conn);
    let dogs = SqliteDogRepository::new(&conn);

    let owner = persons.insert_person(&Person::new("Niamh")).unwrap();
    let other = persons.insert_person(&Person::new("Conor")).unwrap();
    let dog = Dog::new("Charlie");
    assert_eq!(dogs.append_dog(owner, &dog).unwrap(), 0);

    let err = dogs.append_dog(other, &dog).unwrap_err();
    assert!(matches!(err, RepoError::DuplicateDog(id) if id == dog.id));
    assert_eq!(dogs.dog_owner(dog.id).unwrap(), Some(owner));
}

#[test]
fn collection_gestures_on_missing_person_fail() {
    let conn = open_db_in_memory().unwrap();
    let dogs = SqliteDogRepository::new(&conn);
    let missing = Uuid::new_v4();

    assert!(matches!(
        dogs.append_dog(missing, &Dog::new("Max")).unwrap_err(),
        RepoError::PersonNotFound(_)
    ));
    assert!(matches!(
        dogs.remove_dogs_at(missing, &BTreeSet::from([0])).unwrap_err(),
        RepoError::PersonNotFound(_)
    ));
    assert!(matches!(
        dogs.move_dog(missing, 0, 0).unwrap_err(),
        RepoError::PersonNotFound(_)
    ));
}

#[test]
fn positions_stay_dense_after_remove_and_move() {
    let conn = open_db_in_memory().unwrap();
    let persons = SqlitePersonRepository::new(&conn);
    let dogs = SqliteDogRepository::new(&conn);

    let mut person = Person::new("Cian");
    person.dogs = (0..5).map(|i| Dog::new(format!("dog-{i}"))).collect();
    persons.insert_person(&person).unwrap();

    dogs.remove_dogs_at(person.id, &BTreeSet::from([1, 3])).unwrap();
    dogs.move_dog(person.id, 2, 0).unwrap();

    let mut stmt = conn
        .prepare("SELECT position FROM person_dogs WHERE person_uuid = ?1 ORDER BY position;")
        .unwrap();
    let positions = stmt
        .query_map([person.id.to_string()], |row| row.get::<_, i64>(0))
        .unwrap()
        .collect::<Result<Vec<_>, _>>()
        .unwrap();
    assert_eq!(positions, vec![0, 1, 2]);

    let names = dogs
        .list_dogs(person.id)
        .unwrap()
        .into_iter()
        .map(|dog| dog.name)
        .collect::<Vec<_>>();
    assert_eq!(names, vec!["dog-4", "dog-0", "dog-2"]);
}

#[test]
fn deletes_are_recorded_as_retired_ids() {
    let conn = open_db_in_memory().unwrap();
    let persons = SqlitePersonRepository::new(&conn);
    let dogs = SqliteDogRepository::new(&conn);

    let mut person = Person::new("Oisín");
    person.dogs = vec![Dog::new("Cooper"), Dog::new("Daisy")];
    persons.insert_person(&person).unwrap();
    dogs.remove_dogs_at(person.id, &BTreeSet::from([0])).unwrap();
    persons.delete_person(person.id).unwrap();

    let retired: i64 = conn
        .query_row("SELECT COUNT(*) FROM retired_ids;", [], |row| row.get(0))
        .unwrap();
    assert_eq!(retired, 3);

    let err = persons.insert_person(&person).unwrap_err();
    assert!(matches!(err, RepoError::RetiredId { id, .. } if id == person.id));
}
