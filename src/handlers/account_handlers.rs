use std::net::{IpAddr, Ipv4Addr};

use actix_session::Session;
use actix_web::{HttpRequest, HttpResponse, web};
use serde_json::json;

use crate::auth::password;
use crate::auth::rate_limit::LoginThrottle;
use crate::auth::session::{self, Role};
use crate::auth::validate;
use crate::errors::AppError;
use crate::models::coordinator::CoordinatorLoginRequest;
use crate::models::faculty::{LoginRequest, NewFaculty, SignupRequest, profile_from};
use crate::store::DocumentStore;

fn client_ip(req: &HttpRequest) -> IpAddr {
    req.peer_addr()
        .map(|addr| addr.ip())
        .unwrap_or(IpAddr::V4(Ipv4Addr::UNSPECIFIED))
}

/// POST /signup
pub async fn signup(
    store: web::Data<dyn DocumentStore>,
    body: web::Json<SignupRequest>,
) -> Result<HttpResponse, AppError> {
    let req = body.into_inner();

    let errors: Vec<String> = [
        validate::validate_account_id(&req.faculty_id, "Faculty ID"),
        validate::validate_required(&req.faculty_name, "Faculty name", 200),
        validate::validate_required(&req.department, "Department", 100),
        validate::validate_email(&req.official_mail_id),
        validate::validate_password(&req.password),
    ]
    .into_iter()
    .flatten()
    .collect();
    if !errors.is_empty() {
        return Err(AppError::Validation(errors.join("; ")));
    }

    let new_faculty = NewFaculty {
        faculty_id: req.faculty_id.trim().to_string(),
        faculty_name: req.faculty_name.trim().to_string(),
        department: req.department.trim().to_string(),
        official_mail_id: req.official_mail_id.trim().to_string(),
        password_hash: password::hash_password(&req.password)?,
        profile: profile_from(&req.extra),
    };
    let faculty_id = new_faculty.faculty_id.clone();
    let faculty_name = new_faculty.faculty_name.clone();

    if !store.insert_faculty(new_faculty).await? {
        return Err(AppError::Conflict("Faculty ID already exists.".to_string()));
    }

    log::info!("Faculty {faculty_id} signed up");
    Ok(HttpResponse::Created().json(json!({
        "message": "Signup successful!",
        "faculty_name": faculty_name,
        "faculty_id": faculty_id,
    })))
}

/// POST /login
pub async fn login(
    req: HttpRequest,
    store: web::Data<dyn DocumentStore>,
    throttle: web::Data<LoginThrottle>,
    session: Session,
    body: web::Json<LoginRequest>,
) -> Result<HttpResponse, AppError> {
    let faculty_id = body.faculty_id.trim();
    if faculty_id.is_empty() || body.password.is_empty() {
        return Err(AppError::Validation(
            "Faculty ID and password are required.".to_string(),
        ));
    }

    // Throttle before touching the store
    let ip = client_ip(&req);
    if throttle.is_blocked(ip, faculty_id) {
        return Err(AppError::RateLimited);
    }

    let Some(faculty) = store.find_faculty(faculty_id).await? else {
        throttle.record_failure(ip, faculty_id);
        return Err(AppError::InvalidCredentials(
            "Faculty ID not found. You must register to login.".to_string(),
        ));
    };

    if !password::verify_password(&body.password, &faculty.password_hash)? {
        throttle.record_failure(ip, faculty_id);
        return Err(AppError::InvalidCredentials("Incorrect password.".to_string()));
    }

    throttle.clear(ip, faculty_id);
    session::sign_in(&session, &faculty.faculty_id, Role::Faculty)?;
    log::info!("Faculty {} logged in", faculty.faculty_id);

    Ok(HttpResponse::Ok().json(json!({
        "message": "Login successful.",
        "faculty_name": faculty.faculty_name,
        "faculty_id": faculty.faculty_id,
    })))
}

/// POST /coordinatorlogin
pub async fn coordinator_login(
    req: HttpRequest,
    store: web::Data<dyn DocumentStore>,
    throttle: web::Data<LoginThrottle>,
    session: Session,
    body: web::Json<CoordinatorLoginRequest>,
) -> Result<HttpResponse, AppError> {
    let coordinator_id = body.coordinatorid.trim();
    let department = body.department.trim();
    if coordinator_id.is_empty() || department.is_empty() || body.password.is_empty() {
        return Err(AppError::Validation("All fields are required".to_string()));
    }

    let ip = client_ip(&req);
    if throttle.is_blocked(ip, coordinator_id) {
        return Err(AppError::RateLimited);
    }

    let invalid = || AppError::Unauthorized("Invalid credentials".to_string());

    let coordinator = match store.find_coordinator(coordinator_id).await? {
        Some(c) if c.department == department => c,
        _ => {
            throttle.record_failure(ip, coordinator_id);
            return Err(invalid());
        }
    };
    if !password::verify_password(&body.password, &coordinator.password_hash)? {
        throttle.record_failure(ip, coordinator_id);
        return Err(invalid());
    }

    throttle.clear(ip, coordinator_id);
    session::sign_in(&session, &coordinator.coordinator_id, Role::Coordinator)?;
    log::info!(
        "Coordinator {} logged in for {}",
        coordinator.coordinator_id,
        coordinator.department
    );

    Ok(HttpResponse::Ok().json(json!({
        "success": true,
        "coordinatorid": coordinator.coordinator_id,
    })))
}

/// POST /logout
pub async fn logout(session: Session) -> HttpResponse {
    session.purge();
    HttpResponse::Ok().json(json!({ "message": "Logged out" }))
}

/// GET /getCoordinatorDepartment
pub async fn coordinator_department(
    store: web::Data<dyn DocumentStore>,
    session: Session,
) -> Result<HttpResponse, AppError> {
    let coordinator_id = session::require_coordinator(&session)?;
    let coordinator = store
        .find_coordinator(&coordinator_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Coordinator not found".to_string()))?;
    Ok(HttpResponse::Ok().json(json!({ "department": coordinator.department })))
}
