pub mod crud;
pub mod review;

use actix_web::{middleware::from_fn, web};

use crate::auth::middleware::require_auth;
use crate::models::record::RecordKind;

/// Register the create/list/update/review routes of one record kind. Each
/// resource carries the kind as app data so the handlers stay generic, and
/// each requires a signed-in session.
pub fn configure_kind(cfg: &mut web::ServiceConfig, kind: RecordKind) {
    let routes = kind.routes();
    let kind_data = web::Data::new(kind);

    cfg.service(
        web::resource(routes.create)
            .app_data(kind_data.clone())
            .route(web::post().to(crud::create))
            .wrap(from_fn(require_auth)),
    )
    .service(
        web::resource(routes.list)
            .app_data(kind_data.clone())
            .route(web::get().to(crud::list_by_owner))
            .wrap(from_fn(require_auth)),
    )
    .service(
        web::resource(routes.update)
            .app_data(kind_data.clone())
            .route(web::put().to(crud::update))
            .wrap(from_fn(require_auth)),
    )
    .service(
        web::resource(routes.review)
            .app_data(kind_data.clone())
            .route(web::get().to(review::pending))
            .wrap(from_fn(require_auth)),
    )
    .service(
        web::resource(routes.approve)
            .app_data(kind_data.clone())
            .route(web::put().to(review::approve))
            .wrap(from_fn(require_auth)),
    )
    .service(
        web::resource(routes.reject)
            .app_data(kind_data)
            .route(web::put().to(review::reject))
            .wrap(from_fn(require_auth)),
    );
}
