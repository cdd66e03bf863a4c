use actix_session::SessionExt;
use actix_web::{
    Error, HttpResponse,
    body::MessageBody,
    dev::{ServiceRequest, ServiceResponse},
    middleware::Next,
};

use crate::errors::ApiErrorResponse;

/// Reject requests without a signed-in account before they reach a handler.
/// Role and ownership checks stay in the handlers.
pub async fn require_auth(
    req: ServiceRequest,
    next: Next<impl MessageBody + 'static>,
) -> Result<ServiceResponse<impl MessageBody>, Error> {
    let session = req.get_session();
    let signed_in = session
        .get::<String>("account_id")
        .unwrap_or(None)
        .is_some();

    if !signed_in {
        let response = HttpResponse::Unauthorized().json(ApiErrorResponse {
            error: "Login required".to_string(),
        });
        return Ok(req.into_response(response).map_into_right_body());
    }

    next.call(req).await.map(|res| res.map_into_left_body())
}
