//! HTTP-level integration tests for the technician API: the worklist, the
//! by-status filter, assigned-issue detail, and field updates.
//!
//! Assignment is the visibility boundary: issues assigned to anyone else
//! must read as not found, and updates to them are forbidden.

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

/// Report a Roads issue at the given coordinates; returns its id.
async fn report_at(pool: &PgPool, token: &str, latitude: &str, longitude: &str) -> i64 {
    let fields = [
        ("title", "Cracked road surface"),
        ("description", "Wide crack across both lanes"),
        ("category", "Roads"),
        ("severity", "Moderate"),
        ("city", "Ahmedabad"),
        ("latitude", latitude),
        ("longitude", longitude),
    ];
    let body = multipart_body(&fields, None);
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

/// Assign an issue to a technician (admin action) with the given status.
async fn assign(pool: &PgPool, admin_token: &str, issue_id: i64, technician_id: i64, status: &str) {
    let body = serde_json::json!({
        "status": status,
        "technician_id": technician_id,
        "comment": "Assigned"
    });
    let response = put_json_auth(
        common::build_test_app(pool.clone()),
        &format!("/api/v1/admin/issues/{issue_id}"),
        body,
        admin_token,
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
}

/// Seed a citizen, an admin, and a technician in the Ahmedabad Roads scope;
/// returns (citizen_token, admin_token, technician_token, technician_id).
async fn seed_crew(pool: &PgPool) -> (String, String, String, i64) {
    seed_citizen(pool, "Asha Patel", "asha@example.com", "Ahmedabad").await;
    seed_admin(pool, "Ravi Shah", "ravi@city.gov", "Ahmedabad", "Roads").await;
    let tech = seed_technician(pool, "Kiran Dave", "kiran@city.gov", "Ahmedabad", "Roads").await;

    let citizen = login_token(pool, "/api/v1/auth/login/citizen", "asha@example.com").await;
    let admin = login_token(pool, "/api/v1/auth/login/admin", "ravi@city.gov").await;
    let technician = login_token(pool, "/api/v1/auth/login/technician", "kiran@city.gov").await;
    (citizen, admin, technician, tech.id)
}

// ---------------------------------------------------------------------------
// Worklist tests
// ---------------------------------------------------------------------------

/// The default worklist drops resolved issues, but the tallies still count
/// them; `include_resolved` brings them back after open work.
#[sqlx::test(migrations = "../../db/migrations")]
async fn test_worklist_excludes_resolved_by_default(pool: PgPool) {
    let (citizen, admin, technician, tech_id) = seed_crew(&pool).await;

    let open = report_at(&pool, &citizen, "23.02", "72.57").await;
    let done = report_at(&pool, &citizen, "23.04", "72.59").await;
    assign(&pool, &admin, open, tech_id, "In Progress").await;
    assign(&pool, &admin, done, tech_id, "Resolved").await;

    let response = get_auth(
        common::build_test_app(pool.clone()),
        "/api/v1/technician/worklist",
        &technician,
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["name"], "Kiran Dave");
    assert_eq!(json["city"], "Ahmedabad");

    let issues = json["issues"].as_array().unwrap();
    assert_eq!(issues.len(), 1);
    assert_eq!(issues[0]["id"].as_i64().unwrap(), open);
    // Tallies cover every assignment, resolved included.
    assert_eq!(json["tallies"]["in_progress"], 1);
    assert_eq!(json["tallies"]["resolved"], 1);

    let response = get_auth(
        common::build_test_app(pool),
        "/api/v1/technician/worklist?include_resolved=true",
        &technician,
    )
    .await;
    let json = body_json(response).await;
    let issues = json["issues"].as_array().unwrap();
    assert_eq!(issues.len(), 2);
    // Open work sorts ahead of resolved rows.
    assert_eq!(issues[0]["id"].as_i64().unwrap(), open);
    assert_eq!(issues[1]["id"].as_i64().unwrap(), done);
}

/// Pending assignments sort ahead of in-progress ones.
#[sqlx::test(migrations = "../../db/migrations")]
async fn test_worklist_orders_by_status_priority(pool: PgPool) {
    let (citizen, admin, technician, tech_id) = seed_crew(&pool).await;

    let started = report_at(&pool, &citizen, "23.02", "72.57").await;
    let fresh = report_at(&pool, &citizen, "23.04", "72.59").await;
    assign(&pool, &admin, started, tech_id, "In Progress").await;
    // Re-setting Pending keeps the status while recording the assignment.
    assign(&pool, &admin, fresh, tech_id, "Pending").await;

    let response = get_auth(
        common::build_test_app(pool),
        "/api/v1/technician/worklist",
        &technician,
    )
    .await;
    let json = body_json(response).await;
    let issues = json["issues"].as_array().unwrap();

    assert_eq!(issues[0]["id"].as_i64().unwrap(), fresh);
    assert_eq!(issues[0]["status"], "Pending");
    assert_eq!(issues[1]["id"].as_i64().unwrap(), started);
}

/// The map centers on the mean coordinate of the assignments.
#[sqlx::test(migrations = "../../db/migrations")]
async fn test_worklist_map_center_averages_assignments(pool: PgPool) {
    let (citizen, admin, technician, tech_id) = seed_crew(&pool).await;

    let a = report_at(&pool, &citizen, "23.0", "72.0").await;
    let b = report_at(&pool, &citizen, "25.0", "74.0").await;
    assign(&pool, &admin, a, tech_id, "Pending").await;
    assign(&pool, &admin, b, tech_id, "Pending").await;

    let response = get_auth(
        common::build_test_app(pool),
        "/api/v1/technician/worklist",
        &technician,
    )
    .await;
    let json = body_json(response).await;

    assert!((json["map_center"]["latitude"].as_f64().unwrap() - 24.0).abs() < 1e-9);
    assert!((json["map_center"]["longitude"].as_f64().unwrap() - 73.0).abs() < 1e-9);
}

/// With nothing assigned the map falls back to the default city center.
#[sqlx::test(migrations = "../../db/migrations")]
async fn test_worklist_empty_uses_fallback_center(pool: PgPool) {
    let (_citizen, _admin, technician, _tech_id) = seed_crew(&pool).await;

    let response = get_auth(
        common::build_test_app(pool),
        "/api/v1/technician/worklist",
        &technician,
    )
    .await;
    let json = body_json(response).await;

    assert_eq!(json["issues"].as_array().unwrap().len(), 0);
    let (lat, lon) = FALLBACK_COORDINATES;
    assert!((json["map_center"]["latitude"].as_f64().unwrap() - lat).abs() < 1e-9);
    assert!((json["map_center"]["longitude"].as_f64().unwrap() - lon).abs() < 1e-9);
}

// ---------------------------------------------------------------------------
// By-status filter tests
// ---------------------------------------------------------------------------

/// The status filter returns only matching assignments.
#[sqlx::test(migrations = "../../db/migrations")]
async fn test_issues_by_status_filter(pool: PgPool) {
    let (citizen, admin, technician, tech_id) = seed_crew(&pool).await;

    let started = report_at(&pool, &citizen, "23.02", "72.57").await;
    let fresh = report_at(&pool, &citizen, "23.04", "72.59").await;
    assign(&pool, &admin, started, tech_id, "In Progress").await;
    assign(&pool, &admin, fresh, tech_id, "Pending").await;

    let response = get_auth(
        common::build_test_app(pool),
        "/api/v1/technician/issues?status=In%20Progress",
        &technician,
    )
    .await;

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    let issues = json["data"].as_array().unwrap();
    assert_eq!(issues.len(), 1);
    assert_eq!(issues[0]["id"].as_i64().unwrap(), started);
}

/// An unknown status value in the filter is rejected with 400.
#[sqlx::test(migrations = "../../db/migrations")]
async fn test_issues_by_status_requires_valid_status(pool: PgPool) {
    let (_citizen, _admin, technician, _tech_id) = seed_crew(&pool).await;

    let response = get_auth(
        common::build_test_app(pool.clone()),
        "/api/v1/technician/issues?status=Bogus",
        &technician,
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    // A missing status parameter fails query extraction.
    let response = get_auth(
        common::build_test_app(pool),
        "/api/v1/technician/issues",
        &technician,
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

// ---------------------------------------------------------------------------
// Detail tests
// ---------------------------------------------------------------------------

/// Detail works for own assignments and reads 404 for anyone else's.
#[sqlx::test(migrations = "../../db/migrations")]
async fn test_issue_detail_scoped_to_assignee(pool: PgPool) {
    let (citizen, admin, technician, tech_id) = seed_crew(&pool).await;
    let other = seed_technician(&pool, "Zubin Shroff", "zubin@city.gov", "Ahmedabad", "Roads").await;

    let mine = report_at(&pool, &citizen, "23.02", "72.57").await;
    let foreign = report_at(&pool, &citizen, "23.04", "72.59").await;
    let unassigned = report_at(&pool, &citizen, "23.06", "72.61").await;
    assign(&pool, &admin, mine, tech_id, "In Progress").await;
    assign(&pool, &admin, foreign, other.id, "In Progress").await;

    let response = get_auth(
        common::build_test_app(pool.clone()),
        &format!("/api/v1/technician/issues/{mine}"),
        &technician,
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["issue"]["reported_by"], "Asha Patel");
    // Newest first: the assignment update is on top.
    assert_eq!(json["updates"][0]["status"], "In Progress");

    for id in [foreign, unassigned] {
        let response = get_auth(
            common::build_test_app(pool.clone()),
            &format!("/api/v1/technician/issues/{id}"),
            &technician,
        )
        .await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }
}

// ---------------------------------------------------------------------------
// Field update tests
// ---------------------------------------------------------------------------

/// A technician resolves an assigned issue with a comment and an evidence
/// photo; the photo replaces the stored one and the trail gains a row.
#[sqlx::test(migrations = "../../db/migrations")]
async fn test_update_resolves_with_photo(pool: PgPool) {
    let (citizen, admin, technician, tech_id) = seed_crew(&pool).await;
    let issue_id = report_at(&pool, &citizen, "23.02", "72.57").await;
    assign(&pool, &admin, issue_id, tech_id, "In Progress").await;

    let body = multipart_body(
        &[("status", "Resolved"), ("comment", "Patched and sealed")],
        Some(("evidence.jpg", b"fake photo bytes")),
    );
    let response = put_multipart_auth(
        common::build_test_app(pool.clone()),
        &format!("/api/v1/technician/issues/{issue_id}"),
        body,
        &technician,
    )
    .await;

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["data"]["status"], "Resolved");
    let image_path = json["data"]["image_path"].as_str().expect("stored name");
    assert!(
        image_path.ends_with("_evidence.jpg"),
        "got stored name {image_path}"
    );

    let response = get_auth(
        common::build_test_app(pool),
        &format!("/api/v1/technician/issues/{issue_id}"),
        &technician,
    )
    .await;
    let json = body_json(response).await;
    assert_eq!(json["updates"][0]["status"], "Resolved");
    assert_eq!(json["updates"][0]["comment"], "Patched and sealed");
    assert_eq!(json["updates"][0]["updated_by"], "Technician");
}

/// An update without a photo keeps the existing image.
#[sqlx::test(migrations = "../../db/migrations")]
async fn test_update_without_photo_keeps_image(pool: PgPool) {
    let (citizen, admin, technician, tech_id) = seed_crew(&pool).await;
    let issue_id = report_at(&pool, &citizen, "23.02", "72.57").await;
    assign(&pool, &admin, issue_id, tech_id, "In Progress").await;

    // First update attaches a photo.
    let body = multipart_body(
        &[("status", "In Progress"), ("comment", "Crew on site")],
        Some(("before.jpg", b"before bytes")),
    );
    let response = put_multipart_auth(
        common::build_test_app(pool.clone()),
        &format!("/api/v1/technician/issues/{issue_id}"),
        body,
        &technician,
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    let stored = json["data"]["image_path"].as_str().unwrap().to_string();

    // A later update without a photo must not clear it.
    let body = multipart_body(&[("status", "In Progress"), ("comment", "Still working")], None);
    let response = put_multipart_auth(
        common::build_test_app(pool),
        &format!("/api/v1/technician/issues/{issue_id}"),
        body,
        &technician,
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["data"]["image_path"].as_str().unwrap(), stored);
}

/// Updating an issue assigned to someone else is forbidden.
#[sqlx::test(migrations = "../../db/migrations")]
async fn test_update_unassigned_forbidden(pool: PgPool) {
    let (citizen, admin, technician, _tech_id) = seed_crew(&pool).await;
    let other = seed_technician(&pool, "Zubin Shroff", "zubin@city.gov", "Ahmedabad", "Roads").await;

    let issue_id = report_at(&pool, &citizen, "23.02", "72.57").await;
    assign(&pool, &admin, issue_id, other.id, "In Progress").await;

    let body = multipart_body(&[("status", "Resolved"), ("comment", "Done")], None);
    let response = put_multipart_auth(
        common::build_test_app(pool),
        &format!("/api/v1/technician/issues/{issue_id}"),
        body,
        &technician,
    )
    .await;

    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

/// A resolved assignment admits no further field updates.
#[sqlx::test(migrations = "../../db/migrations")]
async fn test_update_terminal_conflict(pool: PgPool) {
    let (citizen, admin, technician, tech_id) = seed_crew(&pool).await;
    let issue_id = report_at(&pool, &citizen, "23.02", "72.57").await;
    assign(&pool, &admin, issue_id, tech_id, "Resolved").await;

    let body = multipart_body(&[("status", "In Progress"), ("comment", "Reopening")], None);
    let response = put_multipart_auth(
        common::build_test_app(pool),
        &format!("/api/v1/technician/issues/{issue_id}"),
        body,
        &technician,
    )
    .await;

    assert_eq!(response.status(), StatusCode::CONFLICT);
}

/// Technician routes reject citizen tokens.
#[sqlx::test(migrations = "../../db/migrations")]
async fn test_worklist_requires_technician_role(pool: PgPool) {
    let (citizen, _admin, _technician, _tech_id) = seed_crew(&pool).await;

    let response = get_auth(
        common::build_test_app(pool),
        "/api/v1/technician/worklist",
        &citizen,
    )
    .await;

    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}
