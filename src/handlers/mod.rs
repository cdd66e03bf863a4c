pub mod account_handlers;
pub mod record_handlers;
pub mod stats_handlers;

use actix_web::{HttpResponse, middleware::from_fn, web};

use crate::auth::middleware::require_auth;
use crate::errors::AppError;
use crate::models::record::RecordKind;
use crate::uploads::UploadStore;

async fn liveness() -> HttpResponse {
    HttpResponse::Ok()
        .content_type("text/plain; charset=utf-8")
        .body("Faculty research records service is running")
}

async fn not_found() -> Result<HttpResponse, AppError> {
    Err(AppError::NotFound("Route not found".to_string()))
}

/// Register every route. Public routes come first; every other resource is
/// wrapped in `require_auth`. Unmatched paths get a JSON 404 whether or not
/// the caller is signed in.
pub fn configure(cfg: &mut web::ServiceConfig, uploads: &UploadStore) {
    // Malformed JSON bodies get the same error shape as everything else
    cfg.app_data(web::JsonConfig::default().error_handler(|err, _req| {
        AppError::Validation(format!("Invalid JSON body: {err}")).into()
    }));

    cfg.route("/", web::get().to(liveness))
        .route("/signup", web::post().to(account_handlers::signup))
        .route("/login", web::post().to(account_handlers::login))
        .route("/coordinatorlogin", web::post().to(account_handlers::coordinator_login))
        .service(actix_files::Files::new(uploads.url_prefix(), uploads.root()));

    cfg.service(
        web::resource("/logout")
            .route(web::post().to(account_handlers::logout))
            .wrap(from_fn(require_auth)),
    )
    .service(
        web::resource("/getCoordinatorDepartment")
            .route(web::get().to(account_handlers::coordinator_department))
            .wrap(from_fn(require_auth)),
    )
    .service(
        web::resource("/api/stats/{owner_id}")
            .route(web::get().to(stats_handlers::owner_stats))
            .wrap(from_fn(require_auth)),
    );
    for kind in RecordKind::ALL {
        record_handlers::configure_kind(cfg, kind);
    }

    cfg.default_service(web::to(not_found));
}
