use actix_session::Session;
use actix_web::{HttpResponse, web};
use serde::Serialize;

use crate::auth::session;
use crate::errors::AppError;
use crate::models::record::RecordKind;
use crate::store::DocumentStore;

#[derive(Debug, Serialize)]
pub struct OwnerStats {
    pub total_faculty: i64,
    pub total_publications: i64,
    pub total_patents: i64,
    pub total_seed_money: i64,
    pub total_funded_projects: i64,
}

/// GET /api/stats/{ownerId}
///
/// Each count is an independent query; they run concurrently and the first
/// failure aborts the whole response.
pub async fn owner_stats(
    path: web::Path<String>,
    store: web::Data<dyn DocumentStore>,
    session: Session,
) -> Result<HttpResponse, AppError> {
    session::require_account(&session)?;
    let owner_id = path.into_inner();
    let store = store.get_ref();

    let (faculty, publications, patents, seed_money, funded_projects) = tokio::try_join!(
        store.find_faculty(&owner_id),
        store.count_records(RecordKind::Publication, &owner_id),
        store.count_records(RecordKind::Patent, &owner_id),
        store.count_records(RecordKind::SeedMoney, &owner_id),
        store.count_records(RecordKind::FundedProject, &owner_id),
    )?;

    Ok(HttpResponse::Ok().json(OwnerStats {
        total_faculty: i64::from(faculty.is_some()),
        total_publications: publications,
        total_patents: patents,
        total_seed_money: seed_money,
        total_funded_projects: funded_projects,
    }))
}
