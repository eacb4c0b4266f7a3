//! HTTP-level integration tests for issue reporting, citizen views, and the
//! lifecycle state machine.
//!
//! The full pothole scenario runs end to end: a citizen reports, an admin
//! assigns a technician, the technician resolves, and the audit trail
//! reads back in order. Terminal states must then reject further updates.

mod common;

use axum::http::StatusCode;
use cityline_core::geo::FALLBACK_COORDINATES;
use common::{
    body_json, get_auth, login_token, multipart_body, post_multipart_auth, put_json_auth,
    put_multipart_auth, seed_admin, seed_citizen, seed_technician,
};
use sqlx::PgPool;

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Multipart fields for a valid pothole report; tests override entries.
fn report_fields() -> Vec<(&'static str, &'static str)> {
    vec![
        ("title", "Large pothole"),
        ("description", "Deep pothole near the railway crossing"),
        ("category", "Roads"),
        ("severity", "Critical"),
        ("city", "Ahmedabad"),
        ("latitude", "23.0225"),
        ("longitude", "72.5714"),
    ]
}

/// Report a default issue via the API and return its id.
async fn report_issue(pool: &PgPool, token: &str) -> i64 {
    let body = multipart_body(&report_fields(), None);
    let response = post_multipart_auth(
        common::build_test_app(pool.clone()),
        "/api/v1/issues",
        body,
        token,
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let json = body_json(response).await;
    json["data"]["id"].as_i64().expect("created issue id")
}

// ---------------------------------------------------------------------------
// Reporting tests
// ---------------------------------------------------------------------------

/// A valid multipart report returns 201 with a Pending, unassigned issue.
#[sqlx::test(migrations = "../../db/migrations")]
async fn test_report_issue_created(pool: PgPool) {
    seed_citizen(&pool, "Asha Patel", "asha@example.com", "Ahmedabad").await;
    let token = login_token(&pool, "/api/v1/auth/login/citizen", "asha@example.com").await;

    let body = multipart_body(&report_fields(), None);
    let response = post_multipart_auth(
        common::build_test_app(pool),
        "/api/v1/issues",
        body,
        &token,
    )
    .await;

    assert_eq!(response.status(), StatusCode::CREATED);
    let json = body_json(response).await;
    assert_eq!(json["data"]["title"], "Large pothole");
    assert_eq!(json["data"]["severity"], "Critical");
    assert_eq!(json["data"]["status"], "Pending");
    assert_eq!(json["data"]["city"], "Ahmedabad");
    assert!(json["data"]["technician_id"].is_null());
    assert!(json["data"]["image_path"].is_null());
    assert_eq!(json["data"]["upvotes"], 0);
}

/// A report with a photo stores the file and records its stored name.
#[sqlx::test(migrations = "../../db/migrations")]
async fn test_report_with_image_stores_file(pool: PgPool) {
    seed_citizen(&pool, "Asha Patel", "asha@example.com", "Ahmedabad").await;
    let token = login_token(&pool, "/api/v1/auth/login/citizen", "asha@example.com").await;

    let body = multipart_body(&report_fields(), Some(("pothole.jpg", b"fake image bytes")));
    let response = post_multipart_auth(
        common::build_test_app(pool),
        "/api/v1/issues",
        body,
        &token,
    )
    .await;

    assert_eq!(response.status(), StatusCode::CREATED);
    let json = body_json(response).await;
    let image_path = json["data"]["image_path"].as_str().expect("stored name");
    assert!(
        image_path.ends_with("_pothole.jpg"),
        "got stored name {image_path}"
    );
}

/// A report without a title is rejected with 400.
#[sqlx::test(migrations = "../../db/migrations")]
async fn test_report_missing_title_rejected(pool: PgPool) {
    seed_citizen(&pool, "Asha Patel", "asha@example.com", "Ahmedabad").await;
    let token = login_token(&pool, "/api/v1/auth/login/citizen", "asha@example.com").await;

    let fields: Vec<_> = report_fields()
        .into_iter()
        .filter(|(name, _)| *name != "title")
        .collect();
    let body = multipart_body(&fields, None);
    let response = post_multipart_auth(
        common::build_test_app(pool),
        "/api/v1/issues",
        body,
        &token,
    )
    .await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let json = body_json(response).await;
    assert_eq!(json["error"], "Title is required");
}

/// An unknown severity tier is rejected with 400.
#[sqlx::test(migrations = "../../db/migrations")]
async fn test_report_invalid_severity_rejected(pool: PgPool) {
    seed_citizen(&pool, "Asha Patel", "asha@example.com", "Ahmedabad").await;
    let token = login_token(&pool, "/api/v1/auth/login/citizen", "asha@example.com").await;

    let fields: Vec<_> = report_fields()
        .into_iter()
        .map(|(name, value)| if name == "severity" { (name, "Urgent") } else { (name, value) })
        .collect();
    let body = multipart_body(&fields, None);
    let response = post_multipart_auth(
        common::build_test_app(pool),
        "/api/v1/issues",
        body,
        &token,
    )
    .await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

/// Coordinates outside the valid ranges are rejected with 400.
#[sqlx::test(migrations = "../../db/migrations")]
async fn test_report_out_of_range_coordinates_rejected(pool: PgPool) {
    seed_citizen(&pool, "Asha Patel", "asha@example.com", "Ahmedabad").await;
    let token = login_token(&pool, "/api/v1/auth/login/citizen", "asha@example.com").await;

    let fields: Vec<_> = report_fields()
        .into_iter()
        .map(|(name, value)| if name == "latitude" { (name, "123.0") } else { (name, value) })
        .collect();
    let body = multipart_body(&fields, None);
    let response = post_multipart_auth(
        common::build_test_app(pool),
        "/api/v1/issues",
        body,
        &token,
    )
    .await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

/// Only citizens report issues; an admin token is forbidden.
#[sqlx::test(migrations = "../../db/migrations")]
async fn test_report_requires_citizen_role(pool: PgPool) {
    seed_admin(&pool, "Ravi Shah", "ravi@city.gov", "Ahmedabad", "Roads").await;
    let token = login_token(&pool, "/api/v1/auth/login/admin", "ravi@city.gov").await;

    let body = multipart_body(&report_fields(), None);
    let response = post_multipart_auth(
        common::build_test_app(pool),
        "/api/v1/issues",
        body,
        &token,
    )
    .await;

    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

// ---------------------------------------------------------------------------
// Citizen view tests
// ---------------------------------------------------------------------------

/// The dashboard lists open issues in the caller's city only, with the
/// resolved count and a map center (fallback when geocoding is unreachable).
#[sqlx::test(migrations = "../../db/migrations")]
async fn test_dashboard_shows_open_city_issues(pool: PgPool) {
    seed_citizen(&pool, "Asha Patel", "asha@example.com", "Ahmedabad").await;
    let asha = login_token(&pool, "/api/v1/auth/login/citizen", "asha@example.com").await;
    report_issue(&pool, &asha).await;
    report_issue(&pool, &asha).await;

    // A report in another city must not appear on Asha's dashboard.
    seed_citizen(&pool, "Binod Kumar", "binod@example.com", "Surat").await;
    let binod = login_token(&pool, "/api/v1/auth/login/citizen", "binod@example.com").await;
    let fields: Vec<_> = report_fields()
        .into_iter()
        .map(|(name, value)| if name == "city" { (name, "Surat") } else { (name, value) })
        .collect();
    let body = multipart_body(&fields, None);
    let response = post_multipart_auth(
        common::build_test_app(pool.clone()),
        "/api/v1/issues",
        body,
        &binod,
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);

    let response = get_auth(
        common::build_test_app(pool),
        "/api/v1/issues/dashboard",
        &asha,
    )
    .await;

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["name"], "Asha Patel");
    assert_eq!(json["city"], "Ahmedabad");
    assert_eq!(json["resolved_count"], 0);
    assert_eq!(json["issues"].as_array().unwrap().len(), 2);

    // The test geocoder points at the discard port, so the map center is
    // the fallback.
    let (lat, lon) = FALLBACK_COORDINATES;
    assert!((json["map_center"]["latitude"].as_f64().unwrap() - lat).abs() < 1e-9);
    assert!((json["map_center"]["longitude"].as_f64().unwrap() - lon).abs() < 1e-9);
}

/// Dashboard issues rank by upvotes, and the caller's own vote is flagged.
#[sqlx::test(migrations = "../../db/migrations")]
async fn test_dashboard_ranks_by_upvotes(pool: PgPool) {
    seed_citizen(&pool, "Asha Patel", "asha@example.com", "Ahmedabad").await;
    seed_citizen(&pool, "Chirag Mehta", "chirag@example.com", "Ahmedabad").await;
    let asha = login_token(&pool, "/api/v1/auth/login/citizen", "asha@example.com").await;
    let chirag = login_token(&pool, "/api/v1/auth/login/citizen", "chirag@example.com").await;

    let first = report_issue(&pool, &asha).await;
    let second = report_issue(&pool, &asha).await;

    // Chirag upvotes the second report, which must rank it first.
    let response = common::post_json_auth(
        common::build_test_app(pool.clone()),
        &format!("/api/v1/issues/{second}/upvote"),
        serde_json::json!({}),
        &chirag,
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);

    let response = get_auth(
        common::build_test_app(pool),
        "/api/v1/issues/dashboard",
        &chirag,
    )
    .await;
    let json = body_json(response).await;
    let issues = json["issues"].as_array().unwrap();

    assert_eq!(issues[0]["id"].as_i64().unwrap(), second);
    assert_eq!(issues[0]["upvotes"], 1);
    assert_eq!(issues[0]["caller_voted"], true);
    assert_eq!(issues[1]["id"].as_i64().unwrap(), first);
    assert_eq!(issues[1]["caller_voted"], false);
}

/// The feed shows same-city reports by other citizens, not the caller's own.
#[sqlx::test(migrations = "../../db/migrations")]
async fn test_feed_excludes_own_posts(pool: PgPool) {
    seed_citizen(&pool, "Asha Patel", "asha@example.com", "Ahmedabad").await;
    seed_citizen(&pool, "Chirag Mehta", "chirag@example.com", "Ahmedabad").await;
    let asha = login_token(&pool, "/api/v1/auth/login/citizen", "asha@example.com").await;
    let chirag = login_token(&pool, "/api/v1/auth/login/citizen", "chirag@example.com").await;

    report_issue(&pool, &asha).await;
    report_issue(&pool, &chirag).await;

    let response = get_auth(common::build_test_app(pool), "/api/v1/issues/feed", &asha).await;

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    let posts = json["data"].as_array().unwrap();
    assert_eq!(posts.len(), 1);
    assert_eq!(posts[0]["author_name"], "Chirag Mehta");
    assert_eq!(posts[0]["like_count"], 0);
    assert_eq!(posts[0]["caller_liked"], false);
}

/// `/issues/mine` returns the caller's reports with ascending history.
#[sqlx::test(migrations = "../../db/migrations")]
async fn test_my_issues_includes_history(pool: PgPool) {
    seed_citizen(&pool, "Asha Patel", "asha@example.com", "Ahmedabad").await;
    seed_admin(&pool, "Ravi Shah", "ravi@city.gov", "Ahmedabad", "Roads").await;
    let asha = login_token(&pool, "/api/v1/auth/login/citizen", "asha@example.com").await;
    let admin = login_token(&pool, "/api/v1/auth/login/admin", "ravi@city.gov").await;

    let issue_id = report_issue(&pool, &asha).await;

    let body = serde_json::json!({ "status": "In Progress", "comment": "Crew dispatched" });
    let response = put_json_auth(
        common::build_test_app(pool.clone()),
        &format!("/api/v1/admin/issues/{issue_id}"),
        body,
        &admin,
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);

    let response = get_auth(common::build_test_app(pool), "/api/v1/issues/mine", &asha).await;

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    let mine = json["data"].as_array().unwrap();
    assert_eq!(mine.len(), 1);
    assert_eq!(mine[0]["status"], "In Progress");
    let updates = mine[0]["updates"].as_array().unwrap();
    assert_eq!(updates.len(), 1);
    assert_eq!(updates[0]["comment"], "Crew dispatched");
    assert_eq!(updates[0]["updated_by"], "Admin");
}

// ---------------------------------------------------------------------------
// Lifecycle tests
// ---------------------------------------------------------------------------

/// Report -> admin assigns In Progress -> technician resolves. The history
/// ascends by default and descends on request, and each row carries its
/// author attribution.
#[sqlx::test(migrations = "../../db/migrations")]
async fn test_full_lifecycle_history(pool: PgPool) {
    seed_citizen(&pool, "Asha Patel", "asha@example.com", "Ahmedabad").await;
    seed_admin(&pool, "Ravi Shah", "ravi@city.gov", "Ahmedabad", "Roads").await;
    let tech = seed_technician(&pool, "Kiran Dave", "kiran@city.gov", "Ahmedabad", "Roads").await;

    let asha = login_token(&pool, "/api/v1/auth/login/citizen", "asha@example.com").await;
    let admin = login_token(&pool, "/api/v1/auth/login/admin", "ravi@city.gov").await;
    let kiran = login_token(&pool, "/api/v1/auth/login/technician", "kiran@city.gov").await;

    let issue_id = report_issue(&pool, &asha).await;

    // Admin moves the issue to In Progress and assigns Kiran.
    let body = serde_json::json!({
        "status": "In Progress",
        "technician_id": tech.id,
        "comment": "Crew dispatched"
    });
    let response = put_json_auth(
        common::build_test_app(pool.clone()),
        &format!("/api/v1/admin/issues/{issue_id}"),
        body,
        &admin,
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["data"]["status"], "In Progress");
    assert_eq!(json["data"]["technician_id"], tech.id);

    // The assigned technician resolves it from the field.
    let body = multipart_body(
        &[("status", "Resolved"), ("comment", "Patched this morning")],
        None,
    );
    let response = put_multipart_auth(
        common::build_test_app(pool.clone()),
        &format!("/api/v1/technician/issues/{issue_id}"),
        body,
        &kiran,
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["data"]["status"], "Resolved");

    // Default history order is ascending (citizen timeline).
    let response = get_auth(
        common::build_test_app(pool.clone()),
        &format!("/api/v1/issues/{issue_id}/updates"),
        &asha,
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    let updates = json["data"].as_array().unwrap();
    assert_eq!(updates.len(), 2);
    assert_eq!(updates[0]["status"], "In Progress");
    assert_eq!(updates[0]["updated_by"], "Admin");
    assert_eq!(updates[1]["status"], "Resolved");
    assert_eq!(updates[1]["updated_by"], "Technician");

    // Staff views read the same trail descending.
    let response = get_auth(
        common::build_test_app(pool),
        &format!("/api/v1/issues/{issue_id}/updates?order=desc"),
        &admin,
    )
    .await;
    let json = body_json(response).await;
    let updates = json["data"].as_array().unwrap();
    assert_eq!(updates[0]["status"], "Resolved");
    assert_eq!(updates[1]["status"], "In Progress");
}

/// History for a missing issue returns 404, not an empty list.
#[sqlx::test(migrations = "../../db/migrations")]
async fn test_history_unknown_issue_404(pool: PgPool) {
    seed_citizen(&pool, "Asha Patel", "asha@example.com", "Ahmedabad").await;
    let token = login_token(&pool, "/api/v1/auth/login/citizen", "asha@example.com").await;

    let response = get_auth(
        common::build_test_app(pool),
        "/api/v1/issues/99999/updates",
        &token,
    )
    .await;

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

/// Resolved is terminal: any further status change conflicts with 409 and
/// appends nothing to the trail.
#[sqlx::test(migrations = "../../db/migrations")]
async fn test_terminal_state_blocks_updates(pool: PgPool) {
    seed_citizen(&pool, "Asha Patel", "asha@example.com", "Ahmedabad").await;
    seed_admin(&pool, "Ravi Shah", "ravi@city.gov", "Ahmedabad", "Roads").await;
    let asha = login_token(&pool, "/api/v1/auth/login/citizen", "asha@example.com").await;
    let admin = login_token(&pool, "/api/v1/auth/login/admin", "ravi@city.gov").await;

    let issue_id = report_issue(&pool, &asha).await;

    let body = serde_json::json!({ "status": "Resolved", "comment": "Fixed by contractor" });
    let response = put_json_auth(
        common::build_test_app(pool.clone()),
        &format!("/api/v1/admin/issues/{issue_id}"),
        body,
        &admin,
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);

    let body = serde_json::json!({ "status": "Pending", "comment": "Reopening" });
    let response = put_json_auth(
        common::build_test_app(pool.clone()),
        &format!("/api/v1/admin/issues/{issue_id}"),
        body,
        &admin,
    )
    .await;
    assert_eq!(response.status(), StatusCode::CONFLICT);

    // The failed transition must not have appended an audit row.
    let response = get_auth(
        common::build_test_app(pool),
        &format!("/api/v1/issues/{issue_id}/updates"),
        &asha,
    )
    .await;
    let json = body_json(response).await;
    assert_eq!(json["data"].as_array().unwrap().len(), 1);
}

/// An admin update against an unknown issue returns 404.
#[sqlx::test(migrations = "../../db/migrations")]
async fn test_admin_update_unknown_issue_404(pool: PgPool) {
    seed_admin(&pool, "Ravi Shah", "ravi@city.gov", "Ahmedabad", "Roads").await;
    let admin = login_token(&pool, "/api/v1/auth/login/admin", "ravi@city.gov").await;

    let body = serde_json::json!({ "status": "In Progress", "comment": "" });
    let response = put_json_auth(
        common::build_test_app(pool),
        "/api/v1/admin/issues/99999",
        body,
        &admin,
    )
    .await;

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}
