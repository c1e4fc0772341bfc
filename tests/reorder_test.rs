//! Integration tests for manual ranking of products, reference rows and showroom nodes.

mod common;

use axum::http::{Method, StatusCode};
use common::{ids, TestApp};
use rstest::rstest;
use serde_json::{json, Value};

async fn ranked_products(app: &TestApp) -> (String, String, String) {
    let a = app.create_product(json!({ "name": "A", "order": 1 })).await;
    let b = app.create_product(json!({ "name": "B", "order": 2 })).await;
    let c = app.create_product(json!({ "name": "C", "order": 3 })).await;
    let id = |p: &Value| p["id"].as_str().unwrap().to_string();
    (id(&a), id(&b), id(&c))
}

#[tokio::test]
async fn reorder_assigns_ranks_in_submitted_order() {
    let app = TestApp::new().await;
    let (a, b, c) = ranked_products(&app).await;

    let (status, listed) = app
        .send(
            Method::PUT,
            "/api/v1/products/reorder/bulk",
            Some(json!({ "ordered_ids": [c, a, b] })),
        )
        .await;
    assert_eq!(status, StatusCode::OK);

    let listed = listed.as_array().unwrap();
    assert_eq!(ids(listed), vec![c.clone(), a.clone(), b.clone()]);
    let orders: Vec<i64> = listed
        .iter()
        .map(|p| p["order"].as_i64().unwrap())
        .collect();
    assert_eq!(orders, vec![1, 2, 3]);

    // The public listing agrees.
    assert_eq!(ids(&app.list_products().await), vec![c, a, b]);
}

#[tokio::test]
async fn products_left_out_keep_their_rank() {
    let app = TestApp::new().await;
    let (a, b, c) = ranked_products(&app).await;

    let (status, _) = app
        .send(
            Method::PUT,
            "/api/v1/products/reorder/bulk",
            Some(json!({ "orderedIds": [c] })),
        )
        .await;
    assert_eq!(status, StatusCode::OK);

    let listed = app.list_products().await;
    // c takes rank 1 alongside a, which is older, so c (newer) sorts first.
    assert_eq!(ids(&listed), vec![c, a, b]);
    assert_eq!(listed[2]["order"], 2);
}

#[tokio::test]
async fn empty_list_is_a_no_op() {
    let app = TestApp::new().await;
    let (a, b, c) = ranked_products(&app).await;

    let (status, listed) = app
        .send(
            Method::PUT,
            "/api/v1/products/reorder/bulk",
            Some(json!({ "ordered_ids": [] })),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(ids(listed.as_array().unwrap()), vec![a, b, c]);
}

#[rstest]
#[case(json!({}))]
#[case(json!({ "ordered_ids": "a,b" }))]
#[case(json!({ "ordered_ids": ["not-a-uuid"] }))]
#[tokio::test]
async fn malformed_product_reorder_is_a_bad_request(#[case] body: Value) {
    let app = TestApp::new().await;
    let (status, _) = app
        .send(Method::PUT, "/api/v1/products/reorder/bulk", Some(body))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn categories_reorder_by_string_id() {
    let app = TestApp::new().await;
    let (status, rows) = app
        .send(
            Method::PUT,
            "/api/v1/categories/reorder/bulk",
            Some(json!({ "ordered_ids": ["kids", "furniture"] })),
        )
        .await;
    assert_eq!(status, StatusCode::OK);

    let rows = rows.as_array().unwrap();
    assert_eq!(rows[0]["id"], "kids");
    assert_eq!(rows[0]["order"], 1);
    assert_eq!(rows[1]["id"], "furniture");
    assert_eq!(rows[1]["order"], 2);
}

#[tokio::test]
async fn unknown_ids_are_ignored() {
    let app = TestApp::new().await;
    let (status, rows) = app
        .send(
            Method::PUT,
            "/api/v1/materials/reorder/bulk",
            Some(json!({ "ordered_ids": ["nylon", "pvc"] })),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    let rows = rows.as_array().unwrap();
    assert_eq!(rows.len(), 5);
    assert_eq!(rows[0]["id"], "pp");
    assert!(rows.iter().any(|r| r["id"] == "pvc" && r["order"] == 2));
}

#[tokio::test]
async fn showroom_nodes_reorder() {
    let app = TestApp::new().await;
    let mut created = Vec::new();
    for title in ["Entrance", "Garden corner", "Kids area"] {
        let (status, node) = app
            .send(
                Method::POST,
                "/api/v1/showroom/nodes",
                Some(json!({ "title": title })),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED);
        created.push(node["id"].as_str().unwrap().to_string());
    }

    let reversed: Vec<String> = created.iter().rev().cloned().collect();
    let (status, nodes) = app
        .send(
            Method::PUT,
            "/api/v1/showroom/nodes/reorder/bulk",
            Some(json!({ "ordered_ids": reversed })),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(ids(nodes.as_array().unwrap()), reversed);
}
