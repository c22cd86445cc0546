use std::collections::HashMap;

use actix_multipart::Multipart;
use futures_util::TryStreamExt;

use crate::{entities::upload::UploadedFile, errors::AppError};

/// Name of the multipart field carrying the file.
pub const FILE_FIELD: &str = "file";

/// Text fields above this size are rejected outright.
const MAX_TEXT_FIELD_BYTES: usize = 64 * 1024;

#[derive(Debug, Default)]
pub struct UploadForm {
    pub file: Option<UploadedFile>,
    pub fields: HashMap<String, String>,
}

/// Collects the `file` part and any text parts of an admin upload.
/// Stops reading as soon as the file grows past `max_file_bytes`.
pub async fn read_upload_form(mut payload: Multipart, max_file_bytes: usize) -> Result<UploadForm, AppError> {
    let mut form = UploadForm::default();

    while let Some(mut field) = payload.try_next().await? {
        let Some(disposition) = field.content_disposition() else { continue };
        let Some(name) = disposition.get_name().map(str::to_string) else { continue };
        let file_name = disposition.get_filename().map(str::to_string);

        let limit = if name == FILE_FIELD { max_file_bytes } else { MAX_TEXT_FIELD_BYTES };
        let mut bytes = Vec::new();
        while let Some(chunk) = field.try_next().await? {
            if bytes.len() + chunk.len() > limit {
                return Err(AppError::PayloadTooLarge(format!(
                    "Field '{}' exceeds the {} byte limit",
                    name, limit
                )));
            }
            bytes.extend_from_slice(&chunk);
        }

        if name == FILE_FIELD {
            form.file = Some(UploadedFile {
                file_name: file_name.unwrap_or_else(|| "upload".to_string()),
                bytes,
            });
        } else {
            let text = String::from_utf8(bytes)
                .map_err(|_| AppError::InvalidInput(format!("Field '{}' is not valid UTF-8", name)))?;
            form.fields.insert(name, text);
        }
    }

    Ok(form)
}
