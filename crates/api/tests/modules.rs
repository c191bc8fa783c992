//! HTTP-level tests for the `/modules` endpoints against the seeded catalog.

mod common;

use axum::http::StatusCode;
use common::{body_json, delete, get, patch, post_json, put_json};
use sqlx::PgPool;

fn keys(json: &serde_json::Value) -> Vec<String> {
    json["data"]
        .as_array()
        .unwrap()
        .iter()
        .map(|m| m["key"].as_str().unwrap().to_string())
        .collect()
}

async fn create_module(pool: &PgPool, body: serde_json::Value) -> serde_json::Value {
    let app = common::build_test_app(pool.clone());
    let response = post_json(app, "/api/v1/modules", body).await;
    assert_eq!(response.status(), StatusCode::CREATED);
    body_json(response).await["data"].clone()
}

#[sqlx::test(migrations = false)]
async fn list_returns_seeded_modules_in_display_order(pool: PgPool) {
    let app = common::migrated_app(pool).await;
    let response = get(app, "/api/v1/modules").await;

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    let keys = keys(&json);
    assert_eq!(keys.len(), 9);
    assert_eq!(keys[0], "dashboard");
}

#[sqlx::test(migrations = false)]
async fn create_applies_defaults_and_returns_201(pool: PgPool) {
    common::migrate(&pool).await;
    let module = create_module(
        &pool,
        serde_json::json!({"name": "Reports", "key": "reports", "route": "/reports"}),
    )
    .await;

    assert_eq!(module["key"], "reports");
    assert_eq!(module["display_order"], 0);
    assert_eq!(module["is_active"], true);
    assert!(module["parent_module_id"].is_null());
    assert_eq!(module["id"], 10);
}

#[sqlx::test(migrations = false)]
async fn create_with_duplicate_key_returns_409(pool: PgPool) {
    let app = common::migrated_app(pool).await;
    let response = post_json(
        app,
        "/api/v1/modules",
        serde_json::json!({"name": "Dashboard Two", "key": "dashboard"}),
    )
    .await;

    assert_eq!(response.status(), StatusCode::CONFLICT);
    let json = body_json(response).await;
    assert_eq!(json["code"], "CONFLICT");
}

#[sqlx::test(migrations = false)]
async fn create_with_invalid_key_returns_400(pool: PgPool) {
    let app = common::migrated_app(pool).await;
    let response = post_json(
        app,
        "/api/v1/modules",
        serde_json::json!({"name": "Bad", "key": "Has Spaces"}),
    )
    .await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(response).await["code"], "VALIDATION_ERROR");
}

#[sqlx::test(migrations = false)]
async fn create_with_unknown_parent_returns_404(pool: PgPool) {
    let app = common::migrated_app(pool).await;
    let response = post_json(
        app,
        "/api/v1/modules",
        serde_json::json!({"name": "Orphan", "key": "orphan", "parent_module_id": 999}),
    )
    .await;

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[sqlx::test(migrations = false)]
async fn overlong_description_is_a_check_violation(pool: PgPool) {
    let app = common::migrated_app(pool).await;
    let response = post_json(
        app,
        "/api/v1/modules",
        serde_json::json!({"name": "Wordy", "key": "wordy", "description": "x".repeat(201)}),
    )
    .await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let json = body_json(response).await;
    assert_eq!(json["code"], "CHECK_VIOLATION");
    assert!(json["error"]
        .as_str()
        .unwrap()
        .contains("ck_modules_description"));
}

#[sqlx::test(migrations = false)]
async fn tree_nests_administration_children(pool: PgPool) {
    let app = common::migrated_app(pool).await;
    let response = get(app, "/api/v1/modules/tree").await;

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    let roots = json["data"].as_array().unwrap();
    assert_eq!(roots.len(), 6);

    let admin = roots
        .iter()
        .find(|n| n["key"] == "administration")
        .unwrap();
    let children: Vec<&str> = admin["children"]
        .as_array()
        .unwrap()
        .iter()
        .map(|c| c["key"].as_str().unwrap())
        .collect();
    assert_eq!(children, vec!["roles", "permissions", "countries"]);
}

#[sqlx::test(migrations = false)]
async fn roots_and_children_only_list_active_modules(pool: PgPool) {
    common::migrate(&pool).await;

    let app = common::build_test_app(pool.clone());
    let response = patch(app, "/api/v1/modules/9/toggle-active").await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await["data"]["is_active"], false);

    let app = common::build_test_app(pool.clone());
    let json = body_json(get(app, "/api/v1/modules/6/children").await).await;
    assert_eq!(keys(&json), vec!["roles", "permissions"]);

    let app = common::build_test_app(pool.clone());
    let json = body_json(get(app, "/api/v1/modules/roots").await).await;
    assert_eq!(keys(&json).len(), 6);

    let app = common::build_test_app(pool.clone());
    let json = body_json(get(app, "/api/v1/modules").await).await;
    assert_eq!(keys(&json).len(), 8);

    let app = common::build_test_app(pool);
    let json = body_json(get(app, "/api/v1/modules?include_inactive=true").await).await;
    assert_eq!(keys(&json).len(), 9);
}

#[sqlx::test(migrations = false)]
async fn get_by_key_and_by_id(pool: PgPool) {
    common::migrate(&pool).await;

    let app = common::build_test_app(pool.clone());
    let response = get(app, "/api/v1/modules/by-key/licenses").await;
    assert_eq!(response.status(), StatusCode::OK);
    let id = body_json(response).await["data"]["id"].as_i64().unwrap();

    let app = common::build_test_app(pool.clone());
    let response = get(app, &format!("/api/v1/modules/{id}")).await;
    assert_eq!(body_json(response).await["data"]["key"], "licenses");

    let app = common::build_test_app(pool.clone());
    let response = get(app, "/api/v1/modules/by-key/payroll").await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let app = common::build_test_app(pool);
    let response = get(app, "/api/v1/modules/999999").await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[sqlx::test(migrations = false)]
async fn update_applies_only_given_fields(pool: PgPool) {
    let app = common::migrated_app(pool).await;
    let response = put_json(
        app,
        "/api/v1/modules/5",
        serde_json::json!({"name": "Software Licenses", "display_order": 12}),
    )
    .await;

    assert_eq!(response.status(), StatusCode::OK);
    let module = body_json(response).await["data"].clone();
    assert_eq!(module["name"], "Software Licenses");
    assert_eq!(module["display_order"], 12);
    assert_eq!(module["key"], "licenses");
}

#[sqlx::test(migrations = false)]
async fn moving_a_module_under_its_descendant_returns_400(pool: PgPool) {
    let app = common::migrated_app(pool).await;
    let response = put_json(
        app,
        "/api/v1/modules/6",
        serde_json::json!({"parent_module_id": 7}),
    )
    .await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(response).await["code"], "VALIDATION_ERROR");
}

#[sqlx::test(migrations = false)]
async fn null_parent_moves_module_to_top_level(pool: PgPool) {
    common::migrate(&pool).await;

    let app = common::build_test_app(pool.clone());
    let response = put_json(
        app,
        "/api/v1/modules/7",
        serde_json::json!({"parent_module_id": null}),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    let module = body_json(response).await["data"].clone();
    assert!(module["parent_module_id"].is_null());
    assert_eq!(module["key"], "roles");

    let app = common::build_test_app(pool.clone());
    let json = body_json(get(app, "/api/v1/modules/roots").await).await;
    assert_eq!(keys(&json).len(), 7);
    assert!(keys(&json).contains(&"roles".to_string()));

    let app = common::build_test_app(pool);
    let json = body_json(get(app, "/api/v1/modules/6/children").await).await;
    assert_eq!(keys(&json), vec!["permissions", "countries"]);
}

#[sqlx::test(migrations = false)]
async fn update_unknown_module_returns_404(pool: PgPool) {
    let app = common::migrated_app(pool).await;
    let response = put_json(
        app,
        "/api/v1/modules/999999",
        serde_json::json!({"name": "Ghost"}),
    )
    .await;

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[sqlx::test(migrations = false)]
async fn delete_refuses_parent_then_removes_leaf(pool: PgPool) {
    common::migrate(&pool).await;

    let app = common::build_test_app(pool.clone());
    let response = delete(app, "/api/v1/modules/6").await;
    assert_eq!(response.status(), StatusCode::CONFLICT);

    let app = common::build_test_app(pool.clone());
    let response = delete(app, "/api/v1/modules/9").await;
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    let app = common::build_test_app(pool.clone());
    let response = delete(app, "/api/v1/modules/9").await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let remaining: i64 =
        sqlx::query_scalar("SELECT COUNT(*) FROM role_modules WHERE module_id = 9")
            .fetch_one(&pool)
            .await
            .unwrap();
    assert_eq!(remaining, 0);
}
