//! Field validation shared by person and dog records.

use std::error::Error;
use std::fmt::{Display, Formatter};

/// Upper bound for a display name, counted in chars.
pub const MAX_NAME_CHARS: usize = 200;

/// A record field failed validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ModelValidationError {
    /// Name longer than [`MAX_NAME_CHARS`].
    NameTooLong { chars: usize, max: usize },
    /// Name contains a control character such as a newline.
    NameHasControlChar,
}

impl Display for ModelValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NameTooLong { chars, max } => {
                write!(f, "name has {chars} characters; at most {max} allowed")
            }
            Self::NameHasControlChar => write!(f, "name must not contain control characters"),
        }
    }
}

impl Error for ModelValidationError {}

/// Validates a single-line display name.
///
/// Empty names pass: a text field may be cleared between keystrokes.
pub fn validate_name(name: &str) -> Result<(), ModelValidationError> {
    if name.chars().any(char::is_control) {
        return Err(ModelValidationError::NameHasControlChar);
    }
    let chars = name.chars().count();
    if chars > MAX_NAME_CHARS {
        return Err(ModelValidationError::NameTooLong {
            chars,
            max: MAX_NAME_CHARS,
        });
    }
    Ok(())
}
