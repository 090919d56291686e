//! Person record.

use crate::model::dog::{Dog, DogId};
use crate::model::validation::{validate_name, ModelValidationError};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Stable identifier of a person.
pub type PersonId = Uuid;

/// A person and their ordered dogs.
///
/// Read paths return the full collection in stored order; write paths insert
/// `dogs` in vector order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Person {
    pub id: PersonId,
    pub name: String,
    #[serde(default)]
    pub dogs: Vec<Dog>,
}

impl Person {
    /// Creates an unsaved person without dogs.
    pub fn new(name: impl Into<String>) -> Self {
        Self::with_id(Uuid::new_v4(), name)
    }

    /// Creates an unsaved person with a caller-provided id.
    pub fn with_id(id: PersonId, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            dogs: Vec::new(),
        }
    }

    /// Validates this person and every owned dog.
    ///
    /// # Errors
    /// - Returns the first failing field, person name first.
    pub fn validate(&self) -> Result<(), ModelValidationError> {
        validate_name(&self.name)?;
        self.dogs.iter().try_for_each(Dog::validate)
    }

    /// Ids of owned dogs in collection order.
    pub fn dog_ids(&self) -> Vec<DogId> {
        self.dogs.iter().map(|dog| dog.id).collect()
    }
}
