//! Coordinator review workflow and statistics tests.

#[macro_use]
mod common;

use actix_web::http::StatusCode;
use actix_web::test::{self, TestRequest};
use serde_json::{Value, json};

use common::*;
use facultyrec::models::record::{RecordKind, ReviewStatus};
use facultyrec::store::DocumentStore;

const PDF: &[u8] = b"%PDF-1.4 proof";

/// Create a patent at the given stage and evaluate to its id.
macro_rules! add_patent {
    ($app:expr, $cookie:expr, $owner:expr, $stage:expr) => {{
        let req = multipart_request(
            TestRequest::post(),
            "/addPatent",
            &[("faculty_id", $owner), ("inventionTitle", "Widget"), ("status", $stage)],
            &[("proofOfPatent", "proof.pdf", PDF)],
        )
        .cookie($cookie.clone())
        .to_request();
        let body: Value = test::call_and_read_body_json(&$app, req).await;
        body["id"].as_str().expect("id").to_string()
    }};
}

macro_rules! add_publication {
    ($app:expr, $cookie:expr, $owner:expr) => {{
        let req = TestRequest::post()
            .uri("/addPublication")
            .cookie($cookie.clone())
            .set_json(json!({"faculty_id": $owner, "titleOfPaper": "On Widgets"}))
            .to_request();
        let body: Value = test::call_and_read_body_json(&$app, req).await;
        body["id"].as_str().expect("id").to_string()
    }};
}

fn ids(list: &[Value]) -> Vec<String> {
    let mut ids: Vec<String> = list
        .iter()
        .map(|r| r["id"].as_str().expect("id").to_string())
        .collect();
    ids.sort();
    ids
}

// ---------------------------------------------------------------------------
// Review queue
// ---------------------------------------------------------------------------

#[actix_rt::test]
async fn test_patent_queue_is_scoped_to_department_and_stage() {
    let ctx = TestContext::new();
    ctx.seed_coordinator("cse_coord", "CSE").await;
    let app = test_app!(ctx);
    let cse = faculty_session!(app, "F1", "CSE");
    let ece = faculty_session!(app, "F2", "ECE");

    let filed = add_patent!(app, cse, "F1", "filed");
    let granted = add_patent!(app, cse, "F1", "granted");
    let _draft = add_patent!(app, cse, "F1", "draft");
    let _other_dept = add_patent!(app, ece, "F2", "filed");

    let coord = coordinator_session!(app, "cse_coord", "CSE");
    let req = TestRequest::get().uri("/getAllPatents").cookie(coord).to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let list: Vec<Value> = test::read_body_json(resp).await;

    let mut expected = vec![filed, granted];
    expected.sort();
    assert_eq!(ids(&list), expected);
}

#[actix_rt::test]
async fn test_submitted_department_cannot_override_owner_department() {
    let ctx = TestContext::new();
    ctx.seed_coordinator("cse_coord", "CSE").await;
    ctx.seed_coordinator("ece_coord", "ECE").await;
    let app = test_app!(ctx);
    let faculty = faculty_session!(app, "F1", "CSE");

    let req = multipart_request(
        TestRequest::post(),
        "/addPatent",
        &[("faculty_id", "F1"), ("department", "ECE"), ("status", "filed")],
        &[("proofOfPatent", "proof.pdf", PDF)],
    )
    .cookie(faculty.clone())
    .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    let id = body["id"].as_str().expect("id").to_string();

    let req = TestRequest::get().uri("/getPatents/F1").cookie(faculty).to_request();
    let list: Vec<Value> = test::call_and_read_body_json(&app, req).await;
    assert_eq!(list[0]["department"], json!("CSE"));

    let cse = coordinator_session!(app, "cse_coord", "CSE");
    let req = TestRequest::get().uri("/getAllPatents").cookie(cse).to_request();
    let list: Vec<Value> = test::call_and_read_body_json(&app, req).await;
    assert_eq!(ids(&list), vec![id]);
    assert_eq!(list[0]["department"], json!("CSE"));

    let ece = coordinator_session!(app, "ece_coord", "ECE");
    let req = TestRequest::get().uri("/getAllPatents").cookie(ece).to_request();
    let list: Vec<Value> = test::call_and_read_body_json(&app, req).await;
    assert!(list.is_empty());
}

#[actix_rt::test]
async fn test_empty_queue_is_ok() {
    let ctx = TestContext::new();
    ctx.seed_coordinator("cse_coord", "CSE").await;
    let app = test_app!(ctx);
    let coord = coordinator_session!(app, "cse_coord", "CSE");

    for uri in [
        "/getAllPatents",
        "/getPublicationsByDepartment",
        "/getSeedMoneyByDepartment",
        "/getFundedProjectsByDepartment",
    ] {
        let req = TestRequest::get().uri(uri).cookie(coord.clone()).to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::OK, "{uri}");
        let list: Vec<Value> = test::read_body_json(resp).await;
        assert!(list.is_empty(), "{uri}");
    }
}

#[actix_rt::test]
async fn test_faculty_cannot_use_review_routes() {
    let ctx = TestContext::new();
    let app = test_app!(ctx);
    let faculty = faculty_session!(app, "F1", "CSE");
    let id = add_publication!(app, faculty, "F1");

    let req = TestRequest::get()
        .uri("/getPublicationsByDepartment")
        .cookie(faculty.clone())
        .to_request();
    assert_eq!(test::call_service(&app, req).await.status(), StatusCode::FORBIDDEN);

    let req = TestRequest::put()
        .uri(&format!("/approvePublication/{id}"))
        .cookie(faculty)
        .to_request();
    assert_eq!(test::call_service(&app, req).await.status(), StatusCode::FORBIDDEN);
}

// ---------------------------------------------------------------------------
// Approve / reject
// ---------------------------------------------------------------------------

#[actix_rt::test]
async fn test_approve_is_idempotent_and_leaves_queue() {
    let ctx = TestContext::new();
    ctx.seed_coordinator("cse_coord", "CSE").await;
    let app = test_app!(ctx);
    let faculty = faculty_session!(app, "F1", "CSE");
    let id = add_publication!(app, faculty, "F1");
    let coord = coordinator_session!(app, "cse_coord", "CSE");

    for _ in 0..2 {
        let req = TestRequest::put()
            .uri(&format!("/approvePublication/{id}"))
            .cookie(coord.clone())
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::OK);
        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body["record"]["reviewStatus"], json!("approved"));
        assert_eq!(
            body["record"]["reviewStatusLabel"],
            json!("Approved by department RandD Coordinator")
        );
    }

    let req = TestRequest::get()
        .uri("/getPublicationsByDepartment")
        .cookie(coord)
        .to_request();
    let list: Vec<Value> = test::call_and_read_body_json(&app, req).await;
    assert!(list.is_empty());

    // The owner sees the decision
    let req = TestRequest::get().uri("/getPublications/F1").cookie(faculty).to_request();
    let list: Vec<Value> = test::call_and_read_body_json(&app, req).await;
    assert_eq!(list[0]["reviewStatus"], json!("approved"));
}

#[actix_rt::test]
async fn test_reject_requires_reason_and_trims_it() {
    let ctx = TestContext::new();
    ctx.seed_coordinator("cse_coord", "CSE").await;
    let app = test_app!(ctx);
    let faculty = faculty_session!(app, "F1", "CSE");
    let id = add_patent!(app, faculty, "F1", "filed");
    let coord = coordinator_session!(app, "cse_coord", "CSE");

    for body in [json!({"rejectionReason": "   "}), json!({})] {
        let req = TestRequest::put()
            .uri(&format!("/rejectPatent/{id}"))
            .cookie(coord.clone())
            .set_json(body)
            .to_request();
        assert_eq!(test::call_service(&app, req).await.status(), StatusCode::BAD_REQUEST);
    }
    let stored = ctx
        .store
        .find_record(RecordKind::Patent, &id)
        .await
        .expect("query")
        .expect("record");
    assert_eq!(stored.status, ReviewStatus::Applied);
    assert!(stored.rejection_reason.is_none());

    let req = TestRequest::put()
        .uri(&format!("/rejectPatent/{id}"))
        .cookie(coord.clone())
        .set_json(json!({"rejectionReason": "  Proof is illegible "}))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["record"]["rejectionReason"], json!("Proof is illegible"));
    assert_eq!(
        body["record"]["reviewStatusLabel"],
        json!("Rejected by Department R&D Coordinator")
    );

    // Re-rejecting replaces the reason
    let req = TestRequest::put()
        .uri(&format!("/rejectPatent/{id}"))
        .cookie(coord)
        .set_json(json!({"rejection_reason": "Wrong application number"}))
        .to_request();
    assert_eq!(test::call_service(&app, req).await.status(), StatusCode::OK);
    let stored = ctx
        .store
        .find_record(RecordKind::Patent, &id)
        .await
        .expect("query")
        .expect("record");
    assert_eq!(stored.status, ReviewStatus::Rejected);
    assert_eq!(stored.rejection_reason.as_deref(), Some("Wrong application number"));
}

#[actix_rt::test]
async fn test_terminal_states_do_not_cross() {
    let ctx = TestContext::new();
    ctx.seed_coordinator("cse_coord", "CSE").await;
    let app = test_app!(ctx);
    let faculty = faculty_session!(app, "F1", "CSE");
    let id = add_publication!(app, faculty, "F1");
    let coord = coordinator_session!(app, "cse_coord", "CSE");

    let req = TestRequest::put()
        .uri(&format!("/rejectPublication/{id}"))
        .cookie(coord.clone())
        .set_json(json!({"rejectionReason": "Out of scope"}))
        .to_request();
    assert_eq!(test::call_service(&app, req).await.status(), StatusCode::OK);

    let req = TestRequest::put()
        .uri(&format!("/approvePublication/{id}"))
        .cookie(coord)
        .to_request();
    assert_eq!(test::call_service(&app, req).await.status(), StatusCode::CONFLICT);

    let stored = ctx
        .store
        .find_record(RecordKind::Publication, &id)
        .await
        .expect("query")
        .expect("record");
    assert_eq!(stored.status, ReviewStatus::Rejected);
}

#[actix_rt::test]
async fn test_decisions_are_scoped_to_department() {
    let ctx = TestContext::new();
    ctx.seed_coordinator("ece_coord", "ECE").await;
    let app = test_app!(ctx);
    let faculty = faculty_session!(app, "F1", "CSE");
    let id = add_publication!(app, faculty, "F1");
    let coord = coordinator_session!(app, "ece_coord", "ECE");

    let req = TestRequest::put()
        .uri(&format!("/approvePublication/{id}"))
        .cookie(coord.clone())
        .to_request();
    assert_eq!(test::call_service(&app, req).await.status(), StatusCode::FORBIDDEN);

    let req = TestRequest::put()
        .uri("/approvePublication/missing")
        .cookie(coord)
        .to_request();
    assert_eq!(test::call_service(&app, req).await.status(), StatusCode::NOT_FOUND);
}

// ---------------------------------------------------------------------------
// Statistics
// ---------------------------------------------------------------------------

#[actix_rt::test]
async fn test_stats_count_each_kind() {
    let ctx = TestContext::new();
    let app = test_app!(ctx);
    let faculty = faculty_session!(app, "F1", "CSE");

    add_publication!(app, faculty, "F1");
    add_publication!(app, faculty, "F1");
    add_patent!(app, faculty, "F1", "filed");

    let req = TestRequest::get().uri("/api/stats/F1").cookie(faculty.clone()).to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(
        body,
        json!({
            "total_faculty": 1,
            "total_publications": 2,
            "total_patents": 1,
            "total_seed_money": 0,
            "total_funded_projects": 0,
        })
    );

    let req = TestRequest::get().uri("/api/stats/NOBODY").cookie(faculty).to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["total_faculty"], json!(0));
    assert_eq!(body["total_publications"], json!(0));
}
