use derive_more::{AsRef, Display};

/// Display name of a profile or a timer protocol.
#[derive(AsRef, Debug, Display, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub struct Name(String);

impl Name {
    pub const MAX_LENGTH: usize = 64;

    pub fn new(name: &str) -> Result<Self, NameError> {
        let trimmed_name = name.trim();

        if trimmed_name.is_empty() {
            return Err(NameError::Empty);
        }

        if let Some(c) = trimmed_name.chars().find(|c| c.is_control()) {
            return Err(NameError::InvalidCharacter(c));
        }

        // Length is counted in characters.
        let len = trimmed_name.chars().count();

        if len > Self::MAX_LENGTH {
            return Err(NameError::TooLong(len));
        }

        Ok(Name(trimmed_name.to_string()))
    }
}

#[derive(thiserror::Error, Debug, PartialEq)]
pub enum NameError {
    #[error("Name must not be empty")]
    Empty,
    #[error("Name must not contain control characters ({0:?})")]
    InvalidCharacter(char),
    #[error("Name must be {max} characters or fewer ({0} > {max})", max = Name::MAX_LENGTH)]
    TooLong(usize),
}
