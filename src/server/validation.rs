use crate::error::{Error, Result};

const MAX_USERNAME_LEN: usize = 50;
const MAX_DISPLAY_NAME_LEN: usize = 50;
const MAX_GUARDIAN_KEY_LEN: usize = 255;
const MAX_PASSWORD_LEN: usize = 1024;
const MAX_ENTITY_NAME_LEN: usize = 50;

fn validate_length(value: &str, entity: &str, max_len: usize) -> Result<()> {
    if value.is_empty() {
        return Err(Error::BadRequest(format!("{entity} cannot be empty")));
    }
    if value.chars().count() > max_len {
        return Err(Error::BadRequest(format!(
            "{entity} cannot exceed {max_len} characters"
        )));
    }
    Ok(())
}

pub fn validate_username(username: &str) -> Result<()> {
    validate_length(username, "Username", MAX_USERNAME_LEN)?;
    if username.contains(char::is_whitespace) {
        return Err(Error::BadRequest(
            "Username cannot contain whitespace".to_string(),
        ));
    }
    Ok(())
}

pub fn validate_password(password: &str) -> Result<()> {
    validate_length(password, "Password", MAX_PASSWORD_LEN)
}

pub fn validate_display_name(name: &str) -> Result<()> {
    validate_length(name.trim(), "Name", MAX_DISPLAY_NAME_LEN)
}

pub fn validate_guardian_key(key: &str) -> Result<()> {
    if key.chars().count() > MAX_GUARDIAN_KEY_LEN {
        return Err(Error::BadRequest(format!(
            "Guardian key cannot exceed {MAX_GUARDIAN_KEY_LEN} characters"
        )));
    }
    Ok(())
}

/// Parses a category or artefact name from a form value.
pub fn parse_entity_name(value: &str) -> Result<String> {
    validate_length(value, "Name", MAX_ENTITY_NAME_LEN)?;
    Ok(value.to_string())
}

pub fn parse_category_index(value: &str) -> Result<u8> {
    value
        .parse()
        .map_err(|_| Error::BadRequest("CategoryIndex must be between 0 and 255".to_string()))
}

pub fn parse_artefact_index(value: &str) -> Result<u16> {
    value
        .parse()
        .map_err(|_| Error::BadRequest("ArtefactIndex must be between 0 and 65535".to_string()))
}

/// Entity ids arrive as form text; anything that is not a plain id cannot exist.
pub fn parse_entity_id(value: &str) -> Result<String> {
    if value.is_empty()
        || value.len() > 64
        || !value.chars().all(|c| c.is_ascii_alphanumeric() || c == '-')
    {
        return Err(Error::BadRequest("Invalid id".to_string()));
    }
    Ok(value.to_string())
}
