//! Entity model for people and the dogs they own.
//!
//! # Responsibility
//! - Define the two persisted record shapes (`Person`, `Dog`).
//! - Own field validation shared by every write path.
//! - Provide default-name pools for newly created records.
//!
//! # Invariants
//! - Every entity is identified by a UUID that is never reused.
//! - A person's dogs are ordered; order is user-controlled.

pub mod dog;
pub mod names;
pub mod person;
pub mod validation;

use std::fmt::{Display, Formatter};

/// Persisted record type, used when reporting which entity a handle lost.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntityKind {
    Person,
    Dog,
}

impl Display for EntityKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Person => write!(f, "person"),
            Self::Dog => write!(f, "dog"),
        }
    }
}
