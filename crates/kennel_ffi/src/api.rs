//! FFI use-case API for Flutter-facing calls.
//!
//! # Responsibility
//! - Expose the people list and person detail gestures to Dart via FRB.
//! - Own the process-wide store opened from `KENNEL_*` configuration.
//!
//! # Invariants
//! - Exported functions must not panic across FFI boundary.
//! - Every mutating call runs exactly one store transaction.
//! - Ids cross the boundary as hyphenated UUID strings.

use kennel_core::{
    core_version as core_version_inner, init_logging as init_logging_inner, Dog, DogHandle,
    EntityKind, KennelConfig, NameSource, Person, PersonHandle, RandomNames, RepoError, Store,
    StoreError,
};
use log::{info, warn};
use once_cell::sync::OnceCell;
use uuid::Uuid;

static STORE: OnceCell<Store> = OnceCell::new();

/// Expose core crate version through FFI.
///
/// # FFI contract
/// - Sync call, non-blocking.
/// - Never throws; always returns a UTF-8 string.
#[flutter_rust_bridge::frb(sync)]
pub fn core_version() -> String {
    core_version_inner().to_owned()
}

/// Initializes Rust core logging once per process.
///
/// Input semantics:
/// - `level`: one of `trace|debug|info|warn|error` (case-insensitive).
/// - `log_dir`: absolute directory path where rolling logs are written.
///
/// # FFI contract
/// - Safe to call repeatedly with the same `level + log_dir` (idempotent).
/// - Never panics; returns empty string on success and error message on failure.
#[flutter_rust_bridge::frb(sync)]
pub fn init_logging(level: String, log_dir: String) -> String {
    match init_logging_inner(level.as_str(), log_dir.as_str()) {
        Ok(()) => String::new(),
        Err(err) => err,
    }
}

/// One row of the people list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PersonItem {
    pub id: String,
    pub name: String,
    pub dog_count: u32,
}

/// One row of a person's dog list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DogItem {
    pub id: String,
    pub name: String,
}

/// People list envelope.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PeopleListResponse {
    pub ok: bool,
    /// Every person in insertion order (empty on failure).
    pub items: Vec<PersonItem>,
    pub message: String,
}

/// Person detail envelope.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PersonDetailResponse {
    pub ok: bool,
    pub id: String,
    pub name: String,
    /// Dogs in collection order.
    pub dogs: Vec<DogItem>,
    /// `true` when the person no longer exists; the UI should pop the screen.
    pub stale: bool,
    pub message: String,
}

/// Generic action envelope for gestures.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActionResponse {
    pub ok: bool,
    /// Id of the created entity, when the gesture creates one.
    pub id: Option<String>,
    pub stale: bool,
    pub message: String,
}

impl ActionResponse {
    fn success(message: impl Into<String>, id: Option<String>) -> Self {
        Self {
            ok: true,
            id,
            stale: false,
            message: message.into(),
        }
    }

    fn failure(operation: &str, err: &ApiError) -> Self {
        Self {
            ok: false,
            id: None,
            stale: err.is_stale(),
            message: format!("{operation} failed: {err}"),
        }
    }
}

/// Lists every person with their dog counts.
///
/// # FFI contract
/// - Sync call, DB-backed execution.
/// - Never panics.
#[flutter_rust_bridge::frb(sync)]
pub fn people_list() -> PeopleListResponse {
    let result = shared_store().and_then(|store| Ok(store.persons().snapshot()?));
    match result {
        Ok(persons) => {
            let items = persons
                .into_iter()
                .map(|person| PersonItem {
                    id: person.id.to_string(),
                    dog_count: u32::try_from(person.dogs.len()).unwrap_or(u32::MAX),
                    name: person.name,
                })
                .collect::<Vec<_>>();
            PeopleListResponse {
                ok: true,
                message: format!("{} person(s).", items.len()),
                items,
            }
        }
        Err(err) => PeopleListResponse {
            ok: false,
            items: Vec::new(),
            message: format!("people_list failed: {err}"),
        },
    }
}

/// Adds a person with a randomly picked default name.
#[flutter_rust_bridge::frb(sync)]
pub fn people_add() -> ActionResponse {
    let result = shared_store()
        .and_then(|store| Ok(store.add_person(Person::new(RandomNames.person_name()))?));
    match result {
        Ok(handle) => ActionResponse::success("Person added.", Some(handle.id().to_string())),
        Err(err) => ActionResponse::failure("people_add", &err),
    }
}

/// Deletes a person and their dogs.
#[flutter_rust_bridge::frb(sync)]
pub fn people_delete(person_id: String) -> ActionResponse {
    run_action("people_delete", "Person deleted.", || {
        person_handle(&person_id)?.delete()?;
        Ok(None)
    })
}

/// Loads one person for the detail screen.
///
/// # FFI contract
/// - Never panics.
/// - Reports `stale = true` once the person has been deleted.
#[flutter_rust_bridge::frb(sync)]
pub fn person_detail(person_id: String) -> PersonDetailResponse {
    let result = person_handle(&person_id).and_then(|handle| Ok(handle.snapshot()?));
    match result {
        Ok(person) => PersonDetailResponse {
            ok: true,
            id: person.id.to_string(),
            name: person.name,
            dogs: person
                .dogs
                .into_iter()
                .map(|dog| DogItem {
                    id: dog.id.to_string(),
                    name: dog.name,
                })
                .collect(),
            stale: false,
            message: String::new(),
        },
        Err(err) => PersonDetailResponse {
            ok: false,
            id: person_id,
            name: String::new(),
            dogs: Vec::new(),
            stale: err.is_stale(),
            message: format!("person_detail failed: {err}"),
        },
    }
}

/// Writes the person name field.
#[flutter_rust_bridge::frb(sync)]
pub fn person_rename(person_id: String, name: String) -> ActionResponse {
    run_action("person_rename", "Person renamed.", || {
        person_handle(&person_id)?.set_name(name)?;
        Ok(None)
    })
}

/// Appends a dog with a randomly picked default name.
#[flutter_rust_bridge::frb(sync)]
pub fn dog_add(person_id: String) -> ActionResponse {
    run_action("dog_add", "Dog added.", || {
        let dog = person_handle(&person_id)?
            .dogs()
            .append(Dog::new(RandomNames.dog_name()))?;
        Ok(Some(dog.id().to_string()))
    })
}

/// Writes a dog name field.
#[flutter_rust_bridge::frb(sync)]
pub fn dog_rename(dog_id: String, name: String) -> ActionResponse {
    run_action("dog_rename", "Dog renamed.", || {
        dog_handle(&dog_id)?.set_name(name)?;
        Ok(None)
    })
}

/// Removes the dogs at `offsets` (positions before the gesture).
#[flutter_rust_bridge::frb(sync)]
pub fn dogs_remove(person_id: String, offsets: Vec<u32>) -> ActionResponse {
    run_action("dogs_remove", "Dog(s) removed.", || {
        person_handle(&person_id)?
            .dogs()
            .remove(offsets.into_iter().map(|offset| offset as usize))?;
        Ok(None)
    })
}

/// Moves the dog at `from` so that it ends up at `to`.
#[flutter_rust_bridge::frb(sync)]
pub fn dogs_move(person_id: String, from: u32, to: u32) -> ActionResponse {
    run_action("dogs_move", "Dog moved.", || {
        person_handle(&person_id)?
            .dogs()
            .move_item(from as usize, to as usize)?;
        Ok(None)
    })
}

#[derive(Debug)]
enum ApiError {
    InvalidId(String),
    Config(String),
    Store(StoreError),
}

impl ApiError {
    fn is_stale(&self) -> bool {
        matches!(self, Self::Store(StoreError::StaleReference { .. }))
    }
}

impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidId(value) => write!(f, "invalid id `{value}`"),
            Self::Config(message) => write!(f, "configuration error: {message}"),
            Self::Store(err) => write!(f, "{err}"),
        }
    }
}

impl From<StoreError> for ApiError {
    fn from(value: StoreError) -> Self {
        Self::Store(value)
    }
}

fn run_action(
    operation: &str,
    message: &str,
    f: impl FnOnce() -> Result<Option<String>, ApiError>,
) -> ActionResponse {
    match f() {
        Ok(id) => ActionResponse::success(message, id),
        Err(err) => ActionResponse::failure(operation, &err),
    }
}

fn shared_store() -> Result<&'static Store, ApiError> {
    STORE.get_or_try_init(|| {
        let config = KennelConfig::from_env().map_err(|err| ApiError::Config(err.to_string()))?;
        match Store::open_configured(&config) {
            Ok(store) => {
                info!(
                    "event=ffi_store_open module=ffi status=ok db_path={}",
                    config.db_path.display()
                );
                Ok(store)
            }
            Err(err) => {
                warn!("event=ffi_store_open module=ffi status=error error={err}");
                Err(err.into())
            }
        }
    })
}

fn person_handle(person_id: &str) -> Result<PersonHandle, ApiError> {
    let id = parse_id(person_id)?;
    let store = shared_store()?;
    store.person(id).map_err(|err| match err {
        StoreError::Repo(RepoError::PersonNotFound(missing)) => {
            ApiError::Store(StoreError::StaleReference {
                entity: EntityKind::Person,
                id: missing,
            })
        }
        other => other.into(),
    })
}

fn dog_handle(dog_id: &str) -> Result<DogHandle, ApiError> {
    let id = parse_id(dog_id)?;
    let store = shared_store()?;
    store.dog(id).map_err(|err| match err {
        StoreError::Repo(RepoError::DogNotFound(missing)) => {
            ApiError::Store(StoreError::StaleReference {
                entity: EntityKind::Dog,
                id: missing,
            })
        }
        other => other.into(),
    })
}

fn parse_id(value: &str) -> Result<Uuid, ApiError> {
    Uuid::parse_str(value.trim()).map_err(|_| ApiError::InvalidId(value.to_string()))
}
