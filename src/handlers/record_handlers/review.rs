use actix_session::Session;
use actix_web::{HttpResponse, web};
use serde::Deserialize;
use serde_json::{Value, json};

use crate::auth::session;
use crate::errors::AppError;
use crate::models::record::{Record, RecordKind, ReviewStatus};
use crate::store::{DocumentStore, PendingFilter};
use crate::uploads::UploadStore;

#[derive(Debug, Deserialize)]
pub struct RejectRequest {
    #[serde(default, rename = "rejectionReason", alias = "rejection_reason")]
    pub rejection_reason: Option<String>,
}

/// The signed-in coordinator and the department they review.
struct Reviewer {
    id: String,
    department: String,
}

async fn reviewer(session: &Session, store: &dyn DocumentStore) -> Result<Reviewer, AppError> {
    let id = session::require_coordinator(session)?;
    let coordinator = store
        .find_coordinator(&id)
        .await?
        .ok_or_else(|| AppError::NotFound("Coordinator not found".to_string()))?;
    Ok(Reviewer { id, department: coordinator.department })
}

/// Move one record to `to`, refusing records outside the reviewer's
/// department and crossings between terminal states.
async fn decide(
    store: &dyn DocumentStore,
    reviewer: &Reviewer,
    kind: RecordKind,
    id: &str,
    to: ReviewStatus,
    reason: Option<&str>,
) -> Result<Record, AppError> {
    let record = store
        .find_record(kind, id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("{} not found", kind.label())))?;
    if record.department != reviewer.department {
        return Err(AppError::PermissionDenied(format!(
            "{} belongs to another department",
            kind.label()
        )));
    }

    // The transition is checked by the store in the same write
    let from = record.status;
    let updated = store
        .set_review(kind, id, to, reason)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("{} not found", kind.label())))?;

    log::info!(
        "{} {} {} -> {} by coordinator {} ({})",
        kind.label(),
        id,
        from,
        to,
        reviewer.id,
        reviewer.department
    );
    Ok(updated)
}

/// GET review queue for the coordinator's department.
pub async fn pending(
    kind: web::Data<RecordKind>,
    store: web::Data<dyn DocumentStore>,
    uploads: web::Data<UploadStore>,
    session: Session,
) -> Result<HttpResponse, AppError> {
    let kind = *kind.get_ref();
    let reviewer = reviewer(&session, store.get_ref()).await?;

    let filter = PendingFilter {
        department: &reviewer.department,
        stages: kind.pending_stages(),
    };
    let records = store.find_pending_records(kind, filter).await?;

    let body: Vec<Value> = records.iter().map(|r| r.to_json(uploads.url_prefix())).collect();
    Ok(HttpResponse::Ok().json(body))
}

/// PUT approve{Kind}/{id}
pub async fn approve(
    path: web::Path<String>,
    kind: web::Data<RecordKind>,
    store: web::Data<dyn DocumentStore>,
    uploads: web::Data<UploadStore>,
    session: Session,
) -> Result<HttpResponse, AppError> {
    let kind = *kind.get_ref();
    let id = path.into_inner();
    let reviewer = reviewer(&session, store.get_ref()).await?;

    let record = decide(store.get_ref(), &reviewer, kind, &id, ReviewStatus::Approved, None).await?;

    Ok(HttpResponse::Ok().json(json!({
        "message": format!("{} approved successfully", kind.label()),
        "record": record.to_json(uploads.url_prefix()),
    })))
}

/// PUT reject{Kind}/{id}
pub async fn reject(
    path: web::Path<String>,
    kind: web::Data<RecordKind>,
    store: web::Data<dyn DocumentStore>,
    uploads: web::Data<UploadStore>,
    session: Session,
    body: web::Json<RejectRequest>,
) -> Result<HttpResponse, AppError> {
    let kind = *kind.get_ref();
    let id = path.into_inner();
    let reviewer = reviewer(&session, store.get_ref()).await?;

    let reason = body
        .rejection_reason
        .as_deref()
        .map(str::trim)
        .filter(|r| !r.is_empty())
        .ok_or_else(|| AppError::Validation("Rejection reason is required".to_string()))?;

    let record = decide(
        store.get_ref(),
        &reviewer,
        kind,
        &id,
        ReviewStatus::Rejected,
        Some(reason),
    )
    .await?;

    Ok(HttpResponse::Ok().json(json!({
        "message": format!("{} rejected successfully", kind.label()),
        "record": record.to_json(uploads.url_prefix()),
    })))
}
