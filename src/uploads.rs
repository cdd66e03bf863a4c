//! Request body intake for record create/update: multipart forms with
//! optional proof files, or plain JSON objects.

use actix_multipart::{Field, Multipart};
use actix_web::{HttpRequest, http::header::CONTENT_TYPE, web};
use futures_util::StreamExt;
use serde_json::{Map, Value};
use std::path::{Path, PathBuf};
use tokio::io::AsyncWriteExt;
use uuid::Uuid;

use crate::errors::AppError;
use crate::models::record::{RecordKind, Submission};

/// URL prefix under which the upload root is served read-only.
pub const UPLOAD_URL_PREFIX: &str = "/uploads";

const MAX_TEXT_FIELD_BYTES: usize = 64 * 1024;
const MAX_JSON_BODY_BYTES: usize = 1024 * 1024;

/// Local directory holding uploaded proof files, one sub-directory per kind.
#[derive(Debug, Clone)]
pub struct UploadStore {
    root: PathBuf,
    max_file_bytes: usize,
}

impl UploadStore {
    pub fn new(root: impl Into<PathBuf>, max_file_bytes: usize) -> Self {
        Self { root: root.into(), max_file_bytes }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn url_prefix(&self) -> &'static str {
        UPLOAD_URL_PREFIX
    }

    /// Remove files written by a request that did not complete. Failures
    /// are logged; the caller's original error wins.
    pub async fn discard(&self, paths: &[String]) {
        for rel in paths {
            if let Err(e) = tokio::fs::remove_file(self.root.join(rel)).await {
                log::warn!("Could not remove orphaned upload {rel}: {e}");
            }
        }
    }

    /// Stream one file part to `<root>/<kind dir>/<uuid><ext>`. The relative
    /// path is pushed to `written` before any byte hits the disk so a failed
    /// write is still cleaned up.
    async fn save_file(
        &self,
        kind: RecordKind,
        original_name: &str,
        field: &mut Field,
        written: &mut Vec<String>,
    ) -> Result<(), AppError> {
        let dir = self.root.join(kind.upload_dir());
        tokio::fs::create_dir_all(&dir).await?;

        let name = format!("{}{}", Uuid::new_v4(), safe_extension(original_name));
        let rel = format!("{}/{}", kind.upload_dir(), name);
        written.push(rel);

        let mut file = tokio::fs::File::create(dir.join(&name)).await?;
        let mut size = 0usize;
        while let Some(chunk) = field.next().await {
            let chunk = chunk.map_err(|e| AppError::Validation(format!("Upload interrupted: {e}")))?;
            size += chunk.len();
            if size > self.max_file_bytes {
                return Err(AppError::Validation(format!(
                    "File '{original_name}' exceeds the {} byte limit",
                    self.max_file_bytes
                )));
            }
            file.write_all(&chunk).await?;
        }
        file.flush().await?;
        Ok(())
    }
}

/// Lowercased extension of an uploaded file name, or nothing when the
/// extension is missing or unusual.
fn safe_extension(original_name: &str) -> String {
    Path::new(original_name)
        .extension()
        .and_then(|e| e.to_str())
        .filter(|e| !e.is_empty() && e.len() <= 10 && e.chars().all(|c| c.is_ascii_alphanumeric()))
        .map(|e| format!(".{}", e.to_ascii_lowercase()))
        .unwrap_or_default()
}

async fn read_text(field: &mut Field, name: &str) -> Result<String, AppError> {
    let mut bytes = Vec::new();
    while let Some(chunk) = field.next().await {
        let chunk = chunk.map_err(|e| AppError::Validation(format!("Malformed field {name}: {e}")))?;
        if bytes.len() + chunk.len() > MAX_TEXT_FIELD_BYTES {
            return Err(AppError::Validation(format!("Field {name} is too large")));
        }
        bytes.extend_from_slice(&chunk);
    }
    String::from_utf8(bytes).map_err(|_| AppError::Validation(format!("Field {name} is not valid UTF-8")))
}

async fn skip_field(field: &mut Field) -> Result<(), AppError> {
    while let Some(chunk) = field.next().await {
        chunk.map_err(|e| AppError::Validation(format!("Malformed multipart body: {e}")))?;
    }
    Ok(())
}

async fn read_multipart(
    kind: RecordKind,
    uploads: &UploadStore,
    mut multipart: Multipart,
    fields: &mut Map<String, Value>,
    written: &mut Vec<String>,
) -> Result<(), AppError> {
    while let Some(item) = multipart.next().await {
        let mut field = item.map_err(|e| AppError::Validation(format!("Malformed multipart body: {e}")))?;
        let (name, filename) = match field.content_disposition() {
            Some(cd) => (
                cd.get_name().unwrap_or_default().to_string(),
                cd.get_filename().map(str::to_string),
            ),
            None => continue,
        };

        match filename.as_deref() {
            // File input left empty by the browser
            Some("") => skip_field(&mut field).await?,
            Some(filename) => {
                let slot = kind
                    .file_slot()
                    .filter(|slot| slot.field == name)
                    .ok_or_else(|| {
                        AppError::Validation(format!("{} does not accept a file named '{name}'", kind.label()))
                    })?;
                if written.len() >= slot.max_files {
                    return Err(AppError::Validation(format!(
                        "At most {} file(s) may be attached as {}",
                        slot.max_files, slot.field
                    )));
                }
                uploads.save_file(kind, filename, &mut field, written).await?;
            }
            None => {
                let value = read_text(&mut field, &name).await?;
                fields.insert(name, Value::String(value));
            }
        }
    }
    Ok(())
}

async fn read_json(mut payload: web::Payload) -> Result<Map<String, Value>, AppError> {
    let mut body = web::BytesMut::new();
    while let Some(chunk) = payload.next().await {
        let chunk = chunk.map_err(|e| AppError::Validation(format!("Could not read body: {e}")))?;
        if body.len() + chunk.len() > MAX_JSON_BODY_BYTES {
            return Err(AppError::Validation("Request body is too large".to_string()));
        }
        body.extend_from_slice(&chunk);
    }
    match serde_json::from_slice::<Value>(&body) {
        Ok(Value::Object(map)) => Ok(map),
        Ok(_) => Err(AppError::Validation("Request body must be a JSON object".to_string())),
        Err(e) => Err(AppError::Validation(format!("Invalid JSON body: {e}"))),
    }
}

/// Read a create/update body for `kind`. Files are on disk by the time this
/// returns; on error they have already been discarded.
pub async fn read_submission(
    req: &HttpRequest,
    payload: web::Payload,
    kind: RecordKind,
    uploads: &UploadStore,
) -> Result<Submission, AppError> {
    let content_type = req
        .headers()
        .get(CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("")
        .to_ascii_lowercase();

    if content_type.starts_with("multipart/form-data") {
        let multipart = Multipart::new(req.headers(), payload);
        let mut fields = Map::new();
        let mut written = Vec::new();
        match read_multipart(kind, uploads, multipart, &mut fields, &mut written).await {
            Ok(()) => Ok(Submission { fields, files: written }),
            Err(e) => {
                uploads.discard(&written).await;
                Err(e)
            }
        }
    } else if content_type.starts_with("application/json") {
        Ok(Submission { fields: read_json(payload).await?, files: Vec::new() })
    } else {
        Err(AppError::Validation(
            "Content-Type must be multipart/form-data or application/json".to_string(),
        ))
    }
}
