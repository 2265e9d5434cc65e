//! Tender API integration tests
//!
//! Exercises the tender lifecycle end to end: creation authorization,
//! listing and pagination, partial edits, and status handling.

use serde_json::json;
use uuid::Uuid;

use crate::common::{
    count_rows, seed_employee, seed_org_with_responsible, TestApp,
};
use procura::config::PolicyConfig;

async fn create_tender(
    app: &TestApp,
    organization_id: Uuid,
    username: &str,
    name: &str,
    service_type: &str,
) -> serde_json::Value {
    let response = app
        .post_json(
            "/api/tenders/new",
            json!({
                "name": name,
                "description": "as described",
                "serviceType": service_type,
                "organizationId": organization_id,
                "creatorUsername": username,
            }),
        )
        .await;
    response.assert_ok();
    response.json()
}

async fn tender_version(app: &TestApp, id: &str) -> i64 {
    sqlx::query_scalar("SELECT version FROM tender WHERE id = ?")
        .bind(id)
        .fetch_one(&app.state.db)
        .await
        .expect("tender row should exist")
}

async fn tender_updated_at(app: &TestApp, id: &str) -> String {
    sqlx::query_scalar("SELECT updated_at FROM tender WHERE id = ?")
        .bind(id)
        .fetch_one(&app.state.db)
        .await
        .expect("tender row should exist")
}

#[tokio::test]
async fn test_create_tender_starts_in_created_status() {
    let app = TestApp::new().await;
    let (org, user) = seed_org_with_responsible(&app.state.db, "Acme", "alice").await;

    let tender = create_tender(&app, org, &user, "Office refurbishment", "Construction").await;

    assert_eq!(tender["name"], "Office refurbishment");
    assert_eq!(tender["serviceType"], "Construction");
    assert_eq!(tender["status"], "Created");
    assert_eq!(tender["version"], 1);
    assert!(tender.get("id").is_some());
}

#[tokio::test]
async fn test_create_tender_by_non_responsible_is_forbidden() {
    let app = TestApp::new().await;
    let (org, _) = seed_org_with_responsible(&app.state.db, "Acme", "alice").await;
    seed_employee(&app.state.db, "mallory").await;

    let response = app
        .post_json(
            "/api/tenders/new",
            json!({
                "name": "Office refurbishment",
                "description": "",
                "serviceType": "Construction",
                "organizationId": org,
                "creatorUsername": "mallory",
            }),
        )
        .await;

    response.assert_forbidden();
    assert_eq!(count_rows(&app.state.db, "tender").await, 0);
}

#[tokio::test]
async fn test_duplicate_tender_title_conflicts() {
    let app = TestApp::new().await;
    let (org, user) = seed_org_with_responsible(&app.state.db, "Acme", "alice").await;

    create_tender(&app, org, &user, "Office refurbishment", "Construction").await;

    let response = app
        .post_json(
            "/api/tenders/new",
            json!({
                "name": "Office refurbishment",
                "description": "second attempt",
                "serviceType": "Construction",
                "organizationId": org,
                "creatorUsername": user,
            }),
        )
        .await;

    response.assert_conflict();
    assert_eq!(count_rows(&app.state.db, "tender").await, 1);
}

#[tokio::test]
async fn test_empty_listing_is_not_found() {
    let app = TestApp::new().await;

    app.get("/api/tenders").await.assert_not_found();
    app.get("/api/tenders/my?username=alice")
        .await
        .assert_not_found();
    app.get("/api/tenders/my").await.assert_not_found();
}

#[tokio::test]
async fn test_listing_filters_by_service_type() {
    let app = TestApp::new().await;
    let (org, user) = seed_org_with_responsible(&app.state.db, "Acme", "alice").await;
    create_tender(&app, org, &user, "Office refurbishment", "Construction").await;
    create_tender(&app, org, &user, "Parcel routes", "Delivery").await;

    let body: serde_json::Value = app
        .get("/api/tenders?serviceTypes=Construction")
        .await
        .json();
    let tenders = body["tenders"].as_array().unwrap();
    assert_eq!(tenders.len(), 1);
    assert_eq!(tenders[0]["serviceType"], "Construction");

    let body: serde_json::Value = app
        .get("/api/tenders?serviceTypes=Construction,Delivery")
        .await
        .json();
    assert_eq!(body["tenders"].as_array().unwrap().len(), 2);

    // No tender carries this service type
    app.get("/api/tenders?serviceTypes=Catering")
        .await
        .assert_not_found();
}

#[tokio::test]
async fn test_listing_is_newest_first() {
    let app = TestApp::new().await;
    let (org, user) = seed_org_with_responsible(&app.state.db, "Acme", "alice").await;
    create_tender(&app, org, &user, "First", "General").await;
    let second = create_tender(&app, org, &user, "Second", "General").await;

    let body: serde_json::Value = app.get("/api/tenders").await.json();
    let tenders = body["tenders"].as_array().unwrap();
    assert_eq!(tenders.len(), 2);
    assert_eq!(tenders[0]["id"], second["id"]);
}

#[tokio::test]
async fn test_pagination_pages_are_disjoint_and_complete() {
    let app = TestApp::new().await;
    let (org, user) = seed_org_with_responsible(&app.state.db, "Acme", "alice").await;

    let mut all_ids = Vec::new();
    for name in ["One", "Two", "Three", "Four"] {
        let tender = create_tender(&app, org, &user, name, "General").await;
        all_ids.push(tender["id"].as_str().unwrap().to_string());
    }

    let page = |body: serde_json::Value| -> Vec<String> {
        body["tenders"]
            .as_array()
            .unwrap()
            .iter()
            .map(|t| t["id"].as_str().unwrap().to_string())
            .collect()
    };

    let first = page(app.get("/api/tenders?limit=2&offset=0").await.json());
    let second = page(app.get("/api/tenders?limit=2&offset=2").await.json());

    assert_eq!(first.len(), 2);
    assert_eq!(second.len(), 2);
    assert!(first.iter().all(|id| !second.contains(id)));

    let mut combined: Vec<String> = first.into_iter().chain(second).collect();
    combined.sort();
    all_ids.sort();
    assert_eq!(combined, all_ids);
}

#[tokio::test]
async fn test_default_page_size_is_five() {
    let app = TestApp::new().await;
    let (org, user) = seed_org_with_responsible(&app.state.db, "Acme", "alice").await;
    for i in 0..7 {
        create_tender(&app, org, &user, &format!("Tender {i}"), "General").await;
    }

    let body: serde_json::Value = app.get("/api/tenders").await.json();
    assert_eq!(body["tenders"].as_array().unwrap().len(), 5);
}

#[tokio::test]
async fn test_malformed_pagination_is_bad_request() {
    let app = TestApp::new().await;

    app.get("/api/tenders?limit=abc").await.assert_bad_request();
    app.get("/api/tenders?offset=-1").await.assert_bad_request();
    app.get("/api/tenders?limit=-5").await.assert_bad_request();
}

#[tokio::test]
async fn test_my_tenders_sees_only_own() {
    let app = TestApp::new().await;
    let (org_a, alice) = seed_org_with_responsible(&app.state.db, "Acme", "alice").await;
    let (org_b, bob) = seed_org_with_responsible(&app.state.db, "Birchwood", "bob").await;
    create_tender(&app, org_a, &alice, "Office refurbishment", "Construction").await;
    create_tender(&app, org_b, &bob, "Parcel routes", "Delivery").await;

    let body: serde_json::Value = app.get("/api/tenders/my?username=alice").await.json();
    let tenders = body["tenders"].as_array().unwrap();
    assert_eq!(tenders.len(), 1);
    assert_eq!(tenders[0]["name"], "Office refurbishment");
}

#[tokio::test]
async fn test_edit_bumps_version_even_with_empty_patch() {
    let app = TestApp::new().await;
    let (org, user) = seed_org_with_responsible(&app.state.db, "Acme", "alice").await;
    let tender = create_tender(&app, org, &user, "Office refurbishment", "Construction").await;
    let id = tender["id"].as_str().unwrap();
    let before = tender_updated_at(&app, id).await;

    let response = app
        .patch_json(
            &format!("/api/tenders/{id}/edit?username=alice"),
            json!({ "description": "restated scope" }),
        )
        .await;
    response.assert_ok();
    let edited: serde_json::Value = response.json();
    assert_eq!(edited["version"], 2);
    assert_eq!(edited["description"], "restated scope");
    assert_eq!(edited["name"], "Office refurbishment");

    let response = app
        .patch_json(&format!("/api/tenders/{id}/edit?username=alice"), json!({}))
        .await;
    response.assert_ok();
    let edited: serde_json::Value = response.json();
    assert_eq!(edited["version"], 3);

    let after = tender_updated_at(&app, id).await;
    assert!(after >= before);
}

#[tokio::test]
async fn test_edit_by_non_creator_is_forbidden() {
    let app = TestApp::new().await;
    let (org, user) = seed_org_with_responsible(&app.state.db, "Acme", "alice").await;
    let tender = create_tender(&app, org, &user, "Office refurbishment", "Construction").await;
    let id = tender["id"].as_str().unwrap();

    app.patch_json(
        &format!("/api/tenders/{id}/edit?username=mallory"),
        json!({ "description": "hijacked" }),
    )
    .await
    .assert_forbidden();

    assert_eq!(tender_version(&app, id).await, 1);
}

#[tokio::test]
async fn test_edit_rejects_missing_username_and_bad_ids() {
    let app = TestApp::new().await;
    let id = Uuid::new_v4();

    app.patch_json(&format!("/api/tenders/{id}/edit"), json!({}))
        .await
        .assert_bad_request();
    app.patch_json(&format!("/api/tenders/{id}/edit?username="), json!({}))
        .await
        .assert_bad_request();
    app.patch_json("/api/tenders/not-a-uuid/edit?username=alice", json!({}))
        .await
        .assert_bad_request();
}

#[tokio::test]
async fn test_edit_unknown_tender_is_not_found() {
    let app = TestApp::new().await;

    app.patch_json(
        &format!("/api/tenders/{}/edit?username=alice", Uuid::new_v4()),
        json!({ "description": "nothing here" }),
    )
    .await
    .assert_not_found();
}

#[tokio::test]
async fn test_edit_rejects_status_outside_tender_set() {
    let app = TestApp::new().await;
    let (org, user) = seed_org_with_responsible(&app.state.db, "Acme", "alice").await;
    let tender = create_tender(&app, org, &user, "Office refurbishment", "Construction").await;
    let id = tender["id"].as_str().unwrap();

    // Canceled belongs to bids, not tenders
    app.patch_json(
        &format!("/api/tenders/{id}/edit?username=alice"),
        json!({ "status": "Canceled" }),
    )
    .await
    .assert_unprocessable();

    assert_eq!(tender_version(&app, id).await, 1);
}

#[tokio::test]
async fn test_edit_can_move_status_within_the_set() {
    let app = TestApp::new().await;
    let (org, user) = seed_org_with_responsible(&app.state.db, "Acme", "alice").await;
    let tender = create_tender(&app, org, &user, "Office refurbishment", "Construction").await;
    let id = tender["id"].as_str().unwrap();

    let response = app
        .patch_json(
            &format!("/api/tenders/{id}/edit?username=alice"),
            json!({ "status": "Published" }),
        )
        .await;
    response.assert_ok();
    let edited: serde_json::Value = response.json();
    assert_eq!(edited["status"], "Published");
    assert_eq!(edited["version"], 2);
}

#[tokio::test]
async fn test_status_read_returns_bare_string() {
    let app = TestApp::new().await;
    let (org, user) = seed_org_with_responsible(&app.state.db, "Acme", "alice").await;
    let tender = create_tender(&app, org, &user, "Office refurbishment", "Construction").await;
    let id = tender["id"].as_str().unwrap();

    let response = app.get(&format!("/api/tenders/{id}/status")).await;
    response.assert_ok();
    assert_eq!(response.json::<String>(), "Created");
}

#[tokio::test]
async fn test_status_read_unknown_tender_is_not_found() {
    let app = TestApp::new().await;

    app.get(&format!("/api/tenders/{}/status", Uuid::new_v4()))
        .await
        .assert_not_found();
    app.get("/api/tenders/not-a-uuid/status")
        .await
        .assert_bad_request();
}

#[tokio::test]
async fn test_status_update_bumps_version() {
    let app = TestApp::new().await;
    let (org, user) = seed_org_with_responsible(&app.state.db, "Acme", "alice").await;
    let tender = create_tender(&app, org, &user, "Office refurbishment", "Construction").await;
    let id = tender["id"].as_str().unwrap();

    let response = app
        .put(&format!(
            "/api/tenders/{id}/status?username=alice&status=Published"
        ))
        .await;
    response.assert_ok();
    let updated: serde_json::Value = response.json();
    assert_eq!(updated["status"], "Published");
    assert_eq!(updated["version"], 2);

    let response = app.get(&format!("/api/tenders/{id}/status")).await;
    assert_eq!(response.json::<String>(), "Published");
}

#[tokio::test]
async fn test_status_update_requires_username_and_status() {
    let app = TestApp::new().await;
    let id = Uuid::new_v4();

    app.put(&format!("/api/tenders/{id}/status?status=Published"))
        .await
        .assert_bad_request();
    app.put(&format!("/api/tenders/{id}/status?username=alice"))
        .await
        .assert_bad_request();
}

#[tokio::test]
async fn test_status_update_rejects_unknown_value() {
    let app = TestApp::new().await;
    let (org, user) = seed_org_with_responsible(&app.state.db, "Acme", "alice").await;
    let tender = create_tender(&app, org, &user, "Office refurbishment", "Construction").await;
    let id = tender["id"].as_str().unwrap();

    app.put(&format!(
        "/api/tenders/{id}/status?username=alice&status=Archived"
    ))
    .await
    .assert_unprocessable();
}

#[tokio::test]
async fn test_status_update_by_non_creator_is_forbidden() {
    let app = TestApp::new().await;
    let (org, user) = seed_org_with_responsible(&app.state.db, "Acme", "alice").await;
    let tender = create_tender(&app, org, &user, "Office refurbishment", "Construction").await;
    let id = tender["id"].as_str().unwrap();

    app.put(&format!(
        "/api/tenders/{id}/status?username=mallory&status=Published"
    ))
    .await
    .assert_forbidden();

    assert_eq!(tender_version(&app, id).await, 1);
}

#[tokio::test]
async fn test_default_policy_allows_skipping_transitions() {
    let app = TestApp::new().await;
    let (org, user) = seed_org_with_responsible(&app.state.db, "Acme", "alice").await;
    let tender = create_tender(&app, org, &user, "Office refurbishment", "Construction").await;
    let id = tender["id"].as_str().unwrap();

    // Created -> Closed skips Published, allowed by default
    app.put(&format!(
        "/api/tenders/{id}/status?username=alice&status=Closed"
    ))
    .await
    .assert_ok();
}

#[tokio::test]
async fn test_enforced_policy_walks_the_state_machine() {
    let policy = PolicyConfig {
        enforce_status_transitions: true,
        ..PolicyConfig::default()
    };
    let app = TestApp::with_policy(policy).await;
    let (org, user) = seed_org_with_responsible(&app.state.db, "Acme", "alice").await;
    let tender = create_tender(&app, org, &user, "Office refurbishment", "Construction").await;
    let id = tender["id"].as_str().unwrap();

    app.put(&format!(
        "/api/tenders/{id}/status?username=alice&status=Closed"
    ))
    .await
    .assert_unprocessable();

    app.put(&format!(
        "/api/tenders/{id}/status?username=alice&status=Published"
    ))
    .await
    .assert_ok();

    app.put(&format!(
        "/api/tenders/{id}/status?username=alice&status=Closed"
    ))
    .await
    .assert_ok();
}
