//! Shared test infrastructure for the HTTP integration tests.
//!
//! Every test gets its own in-memory store and temporary upload directory.
//! `test_app!` builds the full actix application on top of a [`TestContext`].

#![allow(dead_code)]

use std::sync::Arc;

use actix_web::cookie::Cookie;
use actix_web::dev::ServiceResponse;
use actix_web::test::TestRequest;
use actix_web::web;
use serde_json::{Value, json};
use tempfile::TempDir;

use facultyrec::auth::rate_limit::LoginThrottle;
use facultyrec::db;
use facultyrec::models::coordinator::CoordinatorSeed;
use facultyrec::store::{DocumentStore, MemoryStore};
use facultyrec::uploads::UploadStore;

// ============================================================================
// TEST CONSTANTS
// ============================================================================

pub const PASSWORD: &str = "correct-horse";
pub const COORD_PASSWORD: &str = "coord-secret";
pub const BOUNDARY: &str = "----facultyrec-test-boundary";
pub const MAX_UPLOAD_BYTES: usize = 64 * 1024;

// ============================================================================
// CONTEXT
// ============================================================================

pub struct TestContext {
    pub store: Arc<MemoryStore>,
    pub uploads: UploadStore,
    pub throttle: LoginThrottle,
    _dir: TempDir,
}

impl TestContext {
    pub fn new() -> Self {
        let dir = TempDir::new().expect("Failed to create temp dir");
        let uploads = UploadStore::new(dir.path().join("uploads"), MAX_UPLOAD_BYTES);
        std::fs::create_dir_all(uploads.root()).expect("Failed to create upload root");
        Self {
            store: Arc::new(MemoryStore::new()),
            uploads,
            throttle: LoginThrottle::default(),
            _dir: dir,
        }
    }

    pub fn store_data(&self) -> web::Data<dyn DocumentStore> {
        let store: Arc<dyn DocumentStore> = self.store.clone();
        web::Data::from(store)
    }

    /// Provision coordinators the way startup seeding does.
    pub async fn seed_coordinator(&self, id: &str, department: &str) {
        let seed = CoordinatorSeed {
            coordinator_id: id.to_string(),
            department: department.to_string(),
            password: COORD_PASSWORD.to_string(),
        };
        db::seed_coordinators(self.store.as_ref(), vec![seed])
            .await
            .expect("Failed to seed coordinator");
    }

    /// Number of files currently stored under the upload root.
    pub fn stored_file_count(&self) -> usize {
        fn count(dir: &std::path::Path) -> usize {
            std::fs::read_dir(dir)
                .map(|entries| {
                    entries
                        .flatten()
                        .map(|e| {
                            let path = e.path();
                            if path.is_dir() { count(&path) } else { 1 }
                        })
                        .sum::<usize>()
                })
                .unwrap_or(0)
        }
        count(self.uploads.root())
    }
}

/// Build the full application service for a [`TestContext`].
#[macro_export]
macro_rules! test_app {
    ($ctx:expr) => {{
        let ctx: &$crate::common::TestContext = &$ctx;
        let uploads = ctx.uploads.clone();
        actix_web::test::init_service(
            actix_web::App::new()
                .wrap(
                    actix_session::SessionMiddleware::builder(
                        actix_session::storage::CookieSessionStore::default(),
                        actix_web::cookie::Key::from(&[7u8; 64][..]),
                    )
                    .cookie_secure(false)
                    .build(),
                )
                .app_data(ctx.store_data())
                .app_data(actix_web::web::Data::new(ctx.throttle.clone()))
                .app_data(actix_web::web::Data::new(ctx.uploads.clone()))
                .configure(move |cfg| facultyrec::handlers::configure(cfg, &uploads)),
        )
        .await
    }};
}

/// Sign up a faculty member and log them in. Evaluates to the session cookie.
#[macro_export]
macro_rules! faculty_session {
    ($app:expr, $id:expr, $dept:expr) => {{
        let resp = actix_web::test::call_service(
            &$app,
            $crate::common::signup_request($id, $dept).to_request(),
        )
        .await;
        assert_eq!(resp.status(), actix_web::http::StatusCode::CREATED, "signup {}", $id);
        let resp = actix_web::test::call_service(
            &$app,
            $crate::common::login_request($id, $crate::common::PASSWORD).to_request(),
        )
        .await;
        assert_eq!(resp.status(), actix_web::http::StatusCode::OK, "login {}", $id);
        $crate::common::session_cookie(&resp)
    }};
}

/// Log in an already seeded coordinator. Evaluates to the session cookie.
#[macro_export]
macro_rules! coordinator_session {
    ($app:expr, $id:expr, $dept:expr) => {{
        let resp = actix_web::test::call_service(
            &$app,
            $crate::common::coordinator_login_request($id, $dept, $crate::common::COORD_PASSWORD)
                .to_request(),
        )
        .await;
        assert_eq!(resp.status(), actix_web::http::StatusCode::OK, "coordinator login {}", $id);
        $crate::common::session_cookie(&resp)
    }};
}

// ============================================================================
// REQUEST BUILDERS
// ============================================================================

pub fn signup_body(id: &str, department: &str) -> Value {
    json!({
        "faculty_id": id,
        "faculty_name": format!("Faculty {id}"),
        "official_mail_id": format!("{}@college.edu", id.to_lowercase()),
        "department": department,
        "password1": PASSWORD,
        "designation": "Assistant Professor",
        "orcid": "0000-0002-1825-0097",
    })
}

pub fn signup_request(id: &str, department: &str) -> TestRequest {
    TestRequest::post().uri("/signup").set_json(signup_body(id, department))
}

pub fn login_request(id: &str, password: &str) -> TestRequest {
    TestRequest::post()
        .uri("/login")
        .set_json(json!({ "faculty_id": id, "password": password }))
}

pub fn coordinator_login_request(id: &str, department: &str, password: &str) -> TestRequest {
    TestRequest::post().uri("/coordinatorlogin").set_json(json!({
        "coordinatorid": id,
        "password": password,
        "department": department,
    }))
}

/// Encode text fields and file parts as `multipart/form-data`.
/// Returns the content type header value and the body.
pub fn multipart_body(fields: &[(&str, &str)], files: &[(&str, &str, &[u8])]) -> (String, Vec<u8>) {
    let mut body = Vec::new();
    for (name, value) in fields {
        body.extend_from_slice(
            format!(
                "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"{name}\"\r\n\r\n{value}\r\n"
            )
            .as_bytes(),
        );
    }
    for (name, filename, bytes) in files {
        body.extend_from_slice(
            format!(
                "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"{name}\"; filename=\"{filename}\"\r\nContent-Type: application/pdf\r\n\r\n"
            )
            .as_bytes(),
        );
        body.extend_from_slice(bytes);
        body.extend_from_slice(b"\r\n");
    }
    body.extend_from_slice(format!("--{BOUNDARY}--\r\n").as_bytes());
    (format!("multipart/form-data; boundary={BOUNDARY}"), body)
}

pub fn multipart_request(
    method: TestRequest,
    uri: &str,
    fields: &[(&str, &str)],
    files: &[(&str, &str, &[u8])],
) -> TestRequest {
    let (content_type, body) = multipart_body(fields, files);
    method
        .uri(uri)
        .insert_header(("content-type", content_type))
        .set_payload(body)
}

// ============================================================================
// RESPONSE HELPERS
// ============================================================================

/// The session cookie set by a login response.
pub fn session_cookie<B>(resp: &ServiceResponse<B>) -> Cookie<'static> {
    resp.response()
        .cookies()
        .find(|c| c.name() == "id")
        .expect("Response did not set a session cookie")
        .into_owned()
}
