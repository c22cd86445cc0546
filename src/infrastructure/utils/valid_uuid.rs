use uuid::Uuid;

use crate::errors::AppError;

/// Parses a document id taken from a path or form field.
pub fn valid_uuid(id: &str) -> Result<Uuid, AppError> {
    Uuid::parse_str(id.trim())
        .map_err(|_| AppError::InvalidInput(format!("'{}' is not a valid document id", id)))
}

/// Same as [`valid_uuid`] but treats a missing or blank id as "no id".
pub fn optional_uuid(id: Option<&str>) -> Result<Option<Uuid>, AppError> {
    match id.map(str::trim).filter(|id| !id.is_empty()) {
        Some(id) => valid_uuid(id).map(Some),
        None => Ok(None),
    }
}
