use actix_session::Session;
use actix_web::{HttpRequest, HttpResponse, web};
use serde_json::{Value, json};
use uuid::Uuid;

use crate::auth::session;
use crate::errors::AppError;
use crate::models::record::{Record, RecordKind, Submission};
use crate::store::DocumentStore;
use crate::uploads::{UploadStore, read_submission};

fn not_found(kind: RecordKind) -> AppError {
    AppError::NotFound(format!("{} not found", kind.label()))
}

async fn insert_submission(
    store: &dyn DocumentStore,
    kind: RecordKind,
    faculty_id: &str,
    submission: Submission,
) -> Result<Record, AppError> {
    match submission.owner_id() {
        None => return Err(AppError::Validation("Faculty ID is required".to_string())),
        Some(owner) if owner != faculty_id => {
            return Err(AppError::PermissionDenied(
                "Records can only be added for the signed-in faculty member".to_string(),
            ));
        }
        Some(_) => {}
    }

    let faculty = store
        .find_faculty(faculty_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Faculty not found".to_string()))?;

    let record = submission.into_new_record(kind, Uuid::new_v4().to_string(), faculty.department)?;
    store.insert_record(record).await
}

async fn apply_submission(
    store: &dyn DocumentStore,
    kind: RecordKind,
    id: &str,
    faculty_id: &str,
    submission: Submission,
) -> Result<Record, AppError> {
    let existing = store.find_record(kind, id).await?.ok_or_else(|| not_found(kind))?;
    if existing.owner_id != faculty_id {
        return Err(AppError::PermissionDenied(format!(
            "{} belongs to another faculty member",
            kind.label()
        )));
    }

    let patch = submission.into_patch(kind)?;
    store
        .update_record(kind, id, patch)
        .await?
        .ok_or_else(|| not_found(kind))
}

/// POST /add{Kind}
pub async fn create(
    req: HttpRequest,
    payload: web::Payload,
    kind: web::Data<RecordKind>,
    store: web::Data<dyn DocumentStore>,
    uploads: web::Data<UploadStore>,
    session: Session,
) -> Result<HttpResponse, AppError> {
    let kind = *kind.get_ref();
    let faculty_id = session::require_faculty(&session)?;

    let submission = read_submission(&req, payload, kind, &uploads).await?;
    let written = submission.files.clone();

    let record = match insert_submission(store.get_ref(), kind, &faculty_id, submission).await {
        Ok(record) => record,
        Err(e) => {
            uploads.discard(&written).await;
            return Err(e);
        }
    };

    log::info!("{} {} added by {}", kind.label(), record.id, record.owner_id);
    let mut body = json!({
        "message": format!("{} added successfully", kind.label()),
        "id": record.id.clone(),
    });
    body[kind.id_field()] = Value::from(record.id);
    Ok(HttpResponse::Created().json(body))
}

/// GET /get{Kinds}/{owner}
pub async fn list_by_owner(
    path: web::Path<String>,
    kind: web::Data<RecordKind>,
    store: web::Data<dyn DocumentStore>,
    uploads: web::Data<UploadStore>,
    session: Session,
) -> Result<HttpResponse, AppError> {
    let kind = *kind.get_ref();
    let owner_id = path.into_inner();
    session::require_owner(&session, &owner_id)?;

    let records = store.find_records_by_owner(kind, &owner_id).await?;
    if records.is_empty() {
        return Err(AppError::NotFound(format!(
            "No {} records found for this faculty",
            kind.as_str()
        )));
    }

    let body: Vec<Value> = records.iter().map(|r| r.to_json(uploads.url_prefix())).collect();
    Ok(HttpResponse::Ok().json(body))
}

/// PUT /update-{kind}/{id}
pub async fn update(
    req: HttpRequest,
    payload: web::Payload,
    path: web::Path<String>,
    kind: web::Data<RecordKind>,
    store: web::Data<dyn DocumentStore>,
    uploads: web::Data<UploadStore>,
    session: Session,
) -> Result<HttpResponse, AppError> {
    let kind = *kind.get_ref();
    let id = path.into_inner();
    let faculty_id = session::require_faculty(&session)?;

    let submission = read_submission(&req, payload, kind, &uploads).await?;
    let written = submission.files.clone();

    // Replaced files stay on disk; only this request's files are discarded on failure
    let record = match apply_submission(store.get_ref(), kind, &id, &faculty_id, submission).await {
        Ok(record) => record,
        Err(e) => {
            uploads.discard(&written).await;
            return Err(e);
        }
    };

    log::info!("{} {} updated by {}", kind.label(), record.id, faculty_id);
    Ok(HttpResponse::Ok().json(json!({
        "message": format!("{} updated successfully", kind.label()),
        "record": record.to_json(uploads.url_prefix()),
    })))
}
