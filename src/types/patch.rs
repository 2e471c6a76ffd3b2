use crate::error::{Error, Result};

/// A single field of a partial update.
///
/// Multipart forms cannot express `null`, so an absent part means [`Patch::Keep`]
/// and a part sent with an empty value means [`Patch::Clear`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum Patch<T> {
    #[default]
    Keep,
    Clear,
    Set(T),
}

impl<T> Patch<T> {
    /// Builds a patch from a raw form value, parsing non-empty values with `parse`.
    pub fn from_form<F>(raw: Option<String>, parse: F) -> Result<Self>
    where
        F: FnOnce(&str) -> Result<T>,
    {
        match raw {
            None => Ok(Self::Keep),
            Some(value) if value.trim().is_empty() => Ok(Self::Clear),
            Some(value) => parse(value.trim()).map(Self::Set),
        }
    }

    /// The value for a create, where there is nothing to keep or clear.
    #[must_use]
    pub fn into_value(self) -> Option<T> {
        match self {
            Self::Set(value) => Some(value),
            Self::Keep | Self::Clear => None,
        }
    }
}

impl<T: PartialEq> Patch<T> {
    /// Applies the patch to a nullable column. Returns true if the value changed.
    pub fn apply_to(self, current: &mut Option<T>) -> bool {
        match self {
            Self::Keep => false,
            Self::Clear => current.take().is_some(),
            Self::Set(value) => {
                if current.as_ref() == Some(&value) {
                    return false;
                }
                *current = Some(value);
                true
            }
        }
    }

    /// Applies the patch to a required column; clearing it is rejected.
    pub fn apply_required(self, current: &mut T, field: &str) -> Result<bool> {
        match self {
            Self::Keep => Ok(false),
            Self::Clear => Err(Error::BadRequest(format!("{field} cannot be cleared"))),
            Self::Set(value) => {
                if *current == value {
                    return Ok(false);
                }
                *current = value;
                Ok(true)
            }
        }
    }
}
