use kennel_core::{
    Dog, EntityKind, HandleState, ModelValidationError, Person, PersonRepository, RepoError,
    Store, StoreChange, StoreError, MAX_NAME_CHARS,
};
use std::time::Duration;
use uuid::Uuid;

#[test]
fn committed_write_publishes_exactly_one_change_set() {
    let store = Store::open_in_memory().unwrap();
    let subscription = store.subscribe().unwrap();

    let person = store.add_person(Person::new("Ciara")).unwrap();
    person.set_name("Ciara Óg").unwrap();

    let drained = subscription.drain();
    assert!(!drained.disconnected);
    assert_eq!(drained.sets.len(), 2);
    assert_eq!(
        drained.sets[0].changes,
        vec![StoreChange::PersonInserted(person.id())]
    );
    assert_eq!(
        drained.sets[1].changes,
        vec![StoreChange::PersonUpdated(person.id())]
    );
    assert!(drained.sets[0].revision < drained.sets[1].revision);
}

#[test]
fn failed_closure_rolls_back_and_publishes_nothing() {
    let store = Store::open_in_memory().unwrap();
    let person = store.add_person(Person::new("Niamh")).unwrap();
    let subscription = store.subscribe().unwrap();

    let err = store
        .write(|txn| {
            txn.persons().rename_person(person.id(), "renamed")?;
            txn.record(StoreChange::PersonUpdated(person.id()));
            Err::<(), _>(StoreError::Unbound)
        })
        .unwrap_err();

    assert!(matches!(err, StoreError::Unbound));
    assert_eq!(person.name().unwrap(), "Niamh");
    assert!(subscription.drain().sets.is_empty());
}

#[test]
fn invalid_name_leaves_state_unchanged() {
    let store = Store::open_in_memory().unwrap();
    let person = store.add_person(Person::new("Conor")).unwrap();
    let subscription = store.subscribe().unwrap();

    let err = person.set_name("x".repeat(MAX_NAME_CHARS + 1)).unwrap_err();
    assert!(matches!(
        err,
        StoreError::Repo(RepoError::Validation(ModelValidationError::NameTooLong { .. }))
    ));
    assert_eq!(person.name().unwrap(), "Conor");
    assert!(subscription.drain().sets.is_empty());
}

#[test]
fn invalid_dog_in_new_person_rejects_the_whole_insert() {
    let store = Store::open_in_memory().unwrap();
    let mut person = Person::new("Cian");
    person.dogs = vec![Dog::new("Max"), Dog::new("bad\tname")];

    assert!(store.add_person(person).is_err());
    assert!(store.persons().is_empty().unwrap());
}

#[test]
fn empty_names_are_allowed() {
    let store = Store::open_in_memory().unwrap();
    let person = store.add_person(Person::new("Oisín")).unwrap();

    person.set_name("").unwrap();
    assert_eq!(person.name().unwrap(), "");
}

#[test]
fn second_handle_observes_edits_without_refresh() {
    let store = Store::open_in_memory().unwrap();
    let writer = store.add_person(Person::new("Saoirse")).unwrap();
    let reader = store.person(writer.id()).unwrap();
    assert_eq!(writer, reader);

    writer.set_name("Sorcha").unwrap();
    writer.dogs().append(Dog::new("Daisy")).unwrap();

    assert_eq!(reader.name().unwrap(), "Sorcha");
    assert_eq!(reader.dogs().len().unwrap(), 1);
    assert_eq!(store.persons().snapshot().unwrap()[0].name, "Sorcha");
}

#[test]
fn change_set_names_the_owner_of_an_edited_dog() {
    let store = Store::open_in_memory().unwrap();
    let person = store.add_person(Person::new("Patrick")).unwrap();
    let dog = person.dogs().append(Dog::new("Bailey")).unwrap();
    let subscription = store.subscribe().unwrap();

    dog.set_name("Bailey Two").unwrap();

    let set = subscription
        .recv_timeout(Duration::from_millis(100))
        .unwrap();
    assert_eq!(
        set.changes,
        vec![StoreChange::DogUpdated {
            person: person.id(),
            dog: dog.id(),
        }]
    );
    assert!(set.touches_person(person.id()));
    assert!(!set.alters_person_list());
}

#[test]
fn deleted_person_handles_report_stale_reference() {
    let store = Store::open_in_memory().unwrap();
    let person = store.add_person(Person::new("Caoimhe")).unwrap();
    let dog = person.dogs().append(Dog::new("Sadie")).unwrap();
    let other = store.person(person.id()).unwrap();

    person.delete().unwrap();

    assert_eq!(other.state().unwrap(), HandleState::Invalidated);
    assert_eq!(dog.state().unwrap(), HandleState::Invalidated);
    for err in [
        other.name().unwrap_err(),
        other.set_name("ghost").unwrap_err(),
        other.dogs().append(Dog::new("Molly")).unwrap_err(),
        other.delete().unwrap_err(),
    ] {
        assert!(matches!(
            err,
            StoreError::StaleReference {
                entity: EntityKind::Person,
                id,
            } if id == person.id()
        ));
    }
    assert!(matches!(
        dog.set_name("ghost").unwrap_err(),
        StoreError::StaleReference {
            entity: EntityKind::Dog,
            ..
        }
    ));
}

#[test]
fn deleted_person_id_cannot_be_reused() {
    let store = Store::open_in_memory().unwrap();
    let person = store.add_person(Person::new("Aoife")).unwrap();
    let id = person.id();
    person.delete().unwrap();
    let subscription = store.subscribe().unwrap();

    let err = store
        .add_person(Person::with_id(id, "Impostor"))
        .unwrap_err();
    assert!(matches!(
        err,
        StoreError::Repo(RepoError::RetiredId {
            entity: EntityKind::Person,
            id: retired,
        }) if retired == id
    ));

    assert_eq!(person.state().unwrap(), HandleState::Invalidated);
    assert!(matches!(
        person.name().unwrap_err(),
        StoreError::StaleReference { .. }
    ));
    assert!(store.persons().is_empty().unwrap());
    assert!(subscription.drain().sets.is_empty());
}

#[test]
fn removed_dog_id_cannot_be_reused() {
    let store = Store::open_in_memory().unwrap();
    let person = store.add_person(Person::new("Conor")).unwrap();
    let dog = person.dogs().append(Dog::new("Rex")).unwrap();
    person.dogs().remove_at(0).unwrap();

    let err = person
        .dogs()
        .append(Dog::with_id(dog.id(), "Rex"))
        .unwrap_err();
    assert!(matches!(
        err,
        StoreError::Repo(RepoError::RetiredId {
            entity: EntityKind::Dog,
            ..
        })
    ));
    assert_eq!(dog.state().unwrap(), HandleState::Invalidated);
    assert!(person.dogs().is_empty().unwrap());
}

#[test]
fn dogs_of_a_deleted_person_stay_retired() {
    let store = Store::open_in_memory().unwrap();
    let owner = store.add_person(Person::new("Niamh")).unwrap();
    let dog = owner.dogs().append(Dog::new("Luna")).unwrap();
    owner.delete().unwrap();

    let mut newcomer = Person::new("Cian");
    newcomer.dogs.push(Dog::with_id(dog.id(), "Luna"));
    assert!(matches!(
        store.add_person(newcomer).unwrap_err(),
        StoreError::Repo(RepoError::RetiredId { .. })
    ));
    assert_eq!(dog.state().unwrap(), HandleState::Invalidated);
}

#[test]
fn results_get_reports_out_of_range_like_dog_lists() {
    let store = Store::open_in_memory().unwrap();
    let first = store.add_person(Person::new("Ciara")).unwrap();
    let second = store.add_person(Person::new("Seán")).unwrap();
    let results = store.persons();

    assert_eq!(results.ids().unwrap(), vec![first.id(), second.id()]);
    assert_eq!(results.get(1).unwrap().id(), second.id());
    assert!(matches!(
        results.get(2).unwrap_err(),
        StoreError::Repo(RepoError::OffsetOutOfBounds { offset: 2, len: 2 })
    ));
}

#[test]
fn unknown_ids_are_not_found_rather_than_stale() {
    let store = Store::open_in_memory().unwrap();
    let id = Uuid::new_v4();

    assert!(matches!(
        store.person(id).unwrap_err(),
        StoreError::Repo(RepoError::PersonNotFound(missing)) if missing == id
    ));
    assert!(matches!(
        store.delete_person(id).unwrap_err(),
        StoreError::Repo(RepoError::PersonNotFound(_))
    ));
}

#[test]
fn close_invalidates_handles_and_disconnects_subscribers() {
    let store = Store::open_in_memory().unwrap();
    let person = store.add_person(Person::new("Aoife")).unwrap();
    let subscription = store.subscribe().unwrap();

    store.close().unwrap();
    store.close().unwrap();

    assert!(store.is_closed());
    assert!(subscription.drain().disconnected);
    assert_eq!(person.state().unwrap(), HandleState::Invalidated);
    assert!(matches!(
        person.name().unwrap_err(),
        StoreError::StaleReference { .. }
    ));
    assert!(matches!(store.subscribe().unwrap_err(), StoreError::Closed));
    assert!(matches!(
        store.persons().len().unwrap_err(),
        StoreError::Closed
    ));
}

#[test]
fn dropped_subscription_does_not_block_publishing() {
    let store = Store::open_in_memory().unwrap();
    let kept = store.subscribe().unwrap();
    drop(store.subscribe().unwrap());

    store.add_person(Person::new("Seán")).unwrap();
    store.add_person(Person::new("Cian")).unwrap();

    assert_eq!(kept.drain().sets.len(), 2);
}

#[test]
fn handles_from_different_stores_are_not_equal() {
    let first = Store::open_in_memory().unwrap();
    let second = Store::open_in_memory().unwrap();
    let person = Person::new("Ciara");
    let id = person.id;

    let a = first.add_person(person.clone()).unwrap();
    let b = second.add_person(person).unwrap();

    assert_eq!(a.id(), id);
    assert_eq!(b.id(), id);
    assert_ne!(a, b);
    assert!(!first.same_store(&second));
}

#[test]
fn concurrent_writers_serialize_through_the_store() {
    let store = Store::open_in_memory().unwrap();
    let person = store.add_person(Person::new("Conor")).unwrap();

    let workers = (0..4)
        .map(|worker| {
            let dogs = person.dogs();
            std::thread::spawn(move || {
                for i in 0..5 {
                    dogs.append(Dog::new(format!("dog-{worker}-{i}"))).unwrap();
                }
            })
        })
        .collect::<Vec<_>>();
    for worker in workers {
        worker.join().unwrap();
    }

    assert_eq!(person.dogs().len().unwrap(), 20);
    let mut names = person
        .dogs()
        .items()
        .unwrap()
        .into_iter()
        .map(|dog| dog.name)
        .collect::<Vec<_>>();
    names.sort();
    names.dedup();
    assert_eq!(names.len(), 20);
}
