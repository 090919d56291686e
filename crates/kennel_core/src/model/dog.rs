//! Dog record.

use crate::model::validation::{validate_name, ModelValidationError};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Stable identifier of a dog.
pub type DogId = Uuid;

/// A dog owned through exactly one person's collection.
///
/// Carries no reference to its owner; membership lives in the owner's list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Dog {
    pub id: DogId,
    pub name: String,
}

impl Dog {
    /// Creates an unsaved dog with a freshly generated id.
    pub fn new(name: impl Into<String>) -> Self {
        Self::with_id(Uuid::new_v4(), name)
    }

    /// Creates a dog with a caller-provided id.
    pub fn with_id(id: DogId, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
        }
    }

    /// Checks field constraints enforced before persistence.
    pub fn validate(&self) -> Result<(), ModelValidationError> {
        validate_name(&self.name)
    }
}
