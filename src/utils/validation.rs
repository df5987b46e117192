use crate::utils::error::{Error, Field, Result};

/// Characters that may never appear in a first or last name.
pub const INVALID_NAME_CHARACTERS: &str = "`~!@#$%^&*()_+=0123456789<>,.?/\\|{}[]'\"";

pub const MIN_NAME_LENGTH: usize = 2;

pub trait Validate {
    fn validate(&self) -> Result<()>;
}

/// A name is valid when it has at least two characters and none of
/// [`INVALID_NAME_CHARACTERS`]. Letters outside ASCII are allowed.
pub fn is_valid_name(name: &str) -> bool {
    let only_correct_characters = !name.chars().any(|c| INVALID_NAME_CHARACTERS.contains(c));
    let correct_length = name.chars().count() >= MIN_NAME_LENGTH;

    only_correct_characters && correct_length
}

pub fn validate_name(field: Field, name: &str) -> Result<()> {
    if !is_valid_name(name) {
        tracing::warn!("Rejected {}: {:?}", field, name);
        return Err(Error::invalid_argument(field));
    }
    Ok(())
}

pub fn validate_path(field_name: &str, path: &str) -> Result<()> {
    if path.is_empty() {
        return Err(Error::ConfigError {
            field: field_name.to_string(),
            message: "Path cannot be empty".to_string(),
        });
    }

    if path.contains('\0') {
        return Err(Error::ConfigError {
            field: field_name.to_string(),
            message: "Path contains null bytes".to_string(),
        });
    }

    Ok(())
}

pub fn validate_one_of(field_name: &str, value: &str, allowed: &[&str]) -> Result<()> {
    if !allowed.contains(&value) {
        return Err(Error::ConfigError {
            field: field_name.to_string(),
            message: format!(
                "Unsupported value '{}'. Valid values: {}",
                value,
                allowed.join(", ")
            ),
        });
    }
    Ok(())
}

pub fn validate_required_field<'a, T>(field_name: &str, value: &'a Option<T>) -> Result<&'a T> {
    value.as_ref().ok_or_else(|| Error::ConfigError {
        field: field_name.to_string(),
        message: "Value is required".to_string(),
    })
}
