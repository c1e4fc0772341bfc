//! Integration tests for pushing shared attributes across a variant group.

mod common;

use axum::http::{Method, StatusCode};
use common::{chair_with_variants, TestApp};
use serde_json::{json, Value};

async fn chair_group(app: &TestApp) -> (String, Vec<Value>) {
    let products = app.create_with_variants(chair_with_variants()).await;
    let group_id = products[0]["group_id"].as_str().unwrap().to_string();
    (group_id, products)
}

#[tokio::test]
async fn weight_is_written_to_every_member_and_nothing_else_changes() {
    let app = TestApp::new().await;
    let (group_id, before) = chair_group(&app).await;

    let (status, after) = app
        .send(
            Method::PUT,
            &format!("/api/v1/products/sync-group/{group_id}"),
            Some(json!({ "sync_fields": { "weight": 5 } })),
        )
        .await;
    assert_eq!(status, StatusCode::OK);

    let after = after.as_array().unwrap();
    assert_eq!(after.len(), 3);
    for (old, new) in before.iter().zip(after) {
        assert_eq!(new["id"], old["id"]);
        assert_eq!(new["weight"], 5.0);
        for field in [
            "name",
            "sku",
            "colors",
            "primary_color",
            "dimensions",
            "category",
        ] {
            assert_eq!(new[field], old[field], "{field} must not change");
        }
    }
}

#[tokio::test]
async fn several_fields_and_camel_case_keys_sync_together() {
    let app = TestApp::new().await;
    let (group_id, _) = chair_group(&app).await;

    let (status, after) = app
        .send(
            Method::PUT,
            &format!("/api/v1/products/sync-group/{group_id}"),
            Some(json!({
                "syncFields": {
                    "inStock": false,
                    "material": "hdpe",
                    "description": "Stackable",
                    "dimensions": { "width": 50, "height": 85, "depth": 55 }
                }
            })),
        )
        .await;
    assert_eq!(status, StatusCode::OK);

    for product in after.as_array().unwrap() {
        assert_eq!(product["in_stock"], false);
        assert_eq!(product["material"], "hdpe");
        assert_eq!(product["description"], "Stackable");
        assert_eq!(product["dimensions"]["width"], 50.0);
    }
}

#[tokio::test]
async fn unknown_group_is_not_found() {
    let app = TestApp::new().await;
    let (status, _) = app
        .send(
            Method::PUT,
            "/api/v1/products/sync-group/does-not-exist",
            Some(json!({ "sync_fields": { "weight": 5 } })),
        )
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn per_variant_field_is_rejected_without_writes() {
    let app = TestApp::new().await;
    let (group_id, before) = chair_group(&app).await;

    let (status, error) = app
        .send(
            Method::PUT,
            &format!("/api/v1/products/sync-group/{group_id}"),
            Some(json!({ "sync_fields": { "weight": 9, "colors": ["black"] } })),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(error["message"].as_str().unwrap().contains("colors"));

    let (_, group) = app
        .get_json(&format!("/api/v1/products/group/{group_id}"))
        .await;
    for (old, new) in before.iter().zip(group.as_array().unwrap()) {
        assert_eq!(new["weight"], old["weight"]);
    }
}

#[tokio::test]
async fn missing_sync_fields_is_a_bad_request() {
    let app = TestApp::new().await;
    let (group_id, _) = chair_group(&app).await;

    let (status, _) = app
        .send(
            Method::PUT,
            &format!("/api/v1/products/sync-group/{group_id}"),
            Some(json!({ "weight": 5 })),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn unknown_material_is_rejected() {
    let app = TestApp::new().await;
    let (group_id, _) = chair_group(&app).await;

    let (status, _) = app
        .send(
            Method::PUT,
            &format!("/api/v1/products/sync-group/{group_id}"),
            Some(json!({ "sync_fields": { "material": "unobtanium" } })),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn empty_sync_returns_group_unchanged() {
    let app = TestApp::new().await;
    let (group_id, before) = chair_group(&app).await;

    let (status, after) = app
        .send(
            Method::PUT,
            &format!("/api/v1/products/sync-group/{group_id}"),
            Some(json!({ "sync_fields": {} })),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    let after = after.as_array().unwrap();
    assert_eq!(common::ids(after), common::ids(&before));
    assert!(after.iter().all(|p| p["weight"] == 2.5));
}

#[tokio::test]
async fn synced_reference_ids_are_stored_trimmed() {
    let app = TestApp::new().await;
    let (group_id, _) = chair_group(&app).await;

    let (status, after) = app
        .send(
            Method::PUT,
            &format!("/api/v1/products/sync-group/{group_id}"),
            Some(json!({ "sync_fields": { "category": " storage ", "material": "hdpe " } })),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    let after = after.as_array().unwrap();
    assert!(after
        .iter()
        .all(|p| p["category"] == "storage" && p["material"] == "hdpe"));

    let (_, storage) = app.get_json("/api/v1/products?category=storage").await;
    assert_eq!(storage.as_array().unwrap().len(), 3);
}
