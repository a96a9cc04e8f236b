#![allow(clippy::unwrap_used, clippy::expect_used)]
//! Integration tests for the toy catalogue API.
//!
//! These drive the REAL router over a file store seeded per test.

use axum::body::Body;
use axum::http::{Request, StatusCode};
use serde_json::{Value, json};

use toystore_test_utils::assert::{all_have_labels, has_key, page_names};
use toystore_test_utils::{TestToy, test_toy};

mod common;
use common::{TestApp, body_json, toy_list_uri};

/// Ten toys, newest first by creation time: Toy 9 .. Toy 0.
fn catalogue() -> Vec<TestToy> {
    (0..10)
        .map(|i| {
            let labels: &[&str] = match i % 3 {
                0 => &["Baby", "Doll"],
                1 => &["Baby"],
                _ => &["Outdoor"],
            };
            let toy = test_toy(&format!("Toy {i}"), f64::from(i) * 10.0)
                .with_id(&format!("t{i}"))
                .with_labels(labels)
                .created_at(1_700_000_000_000 + i64::from(i));
            if i % 2 == 0 { toy } else { toy.out_of_stock() }
        })
        .collect()
}

fn bear_and_ant() -> Vec<TestToy> {
    vec![
        test_toy("Bear", 10.0)
            .with_id("bear")
            .with_labels(&["Baby", "Doll"])
            .created_at(2),
        test_toy("Ant", 5.0)
            .with_id("ant")
            .with_labels(&["Baby"])
            .out_of_stock()
            .created_at(1),
    ]
}

// =============================================================================
// Listing
// =============================================================================

#[tokio::test]
async fn list_defaults_to_newest_first_page() {
    let app = TestApp::with_toys(&catalogue()).await;

    let (status, page) = app.get_json("/api/toy").await;

    assert_eq!(status, StatusCode::OK);
    has_key(&page, "totalPages");
    assert_eq!(page["totalPages"], 2);
    assert_eq!(
        page_names(&page),
        vec!["Toy 9", "Toy 8", "Toy 7", "Toy 6", "Toy 5", "Toy 4"]
    );
}

#[tokio::test]
async fn bear_and_ant_filter_and_sort() {
    let app = TestApp::with_toys(&bear_and_ant()).await;

    let in_stock = json!({ "inStock": true });
    let (_, page) = app
        .get_json(&toy_list_uri(Some(&in_stock), None, None))
        .await;
    assert_eq!(page_names(&page), vec!["Bear"]);
    assert_eq!(page["totalPages"], 1);

    let by_price = json!({ "type": "price", "desc": false });
    let (_, page) = app
        .get_json(&toy_list_uri(None, Some(&by_price), None))
        .await;
    assert_eq!(page_names(&page), vec!["Ant", "Bear"]);

    let by_price_desc = json!({ "type": "price", "desc": true });
    let (_, page) = app
        .get_json(&toy_list_uri(None, Some(&by_price_desc), None))
        .await;
    assert_eq!(page_names(&page), vec!["Bear", "Ant"]);
}

#[tokio::test]
async fn in_stock_accepts_string_form() {
    let app = TestApp::with_toys(&bear_and_ant()).await;

    let filter = json!({ "inStock": "false" });
    let (_, page) = app.get_json(&toy_list_uri(Some(&filter), None, None)).await;
    assert_eq!(page_names(&page), vec!["Ant"]);

    let unset = json!({ "inStock": "" });
    let (_, page) = app.get_json(&toy_list_uri(Some(&unset), None, None)).await;
    assert_eq!(page_names(&page).len(), 2);
}

#[tokio::test]
async fn label_filter_requires_every_label() {
    let app = TestApp::with_toys(&catalogue()).await;

    let filter = json!({ "labels": ["Baby", "Doll"] });
    let (status, page) = app.get_json(&toy_list_uri(Some(&filter), None, None)).await;

    assert_eq!(status, StatusCode::OK);
    all_have_labels(&page, &["Baby", "Doll"]);
    assert_eq!(page_names(&page), vec!["Toy 9", "Toy 6", "Toy 3", "Toy 0"]);
}

#[tokio::test]
async fn text_filter_is_case_insensitive() {
    let app = TestApp::with_toys(&bear_and_ant()).await;

    let filter = json!({ "txt": "bEa" });
    let (_, page) = app.get_json(&toy_list_uri(Some(&filter), None, None)).await;
    assert_eq!(page_names(&page), vec!["Bear"]);
}

#[tokio::test]
async fn pages_cover_the_filtered_set() {
    let app = TestApp::with_toys(&catalogue()).await;

    let filter = json!({ "labels": ["Baby"] });
    let (_, first) = app.get_json(&toy_list_uri(Some(&filter), None, None)).await;
    let total_pages = first["totalPages"].as_u64().unwrap();
    assert_eq!(total_pages, 2);

    let mut seen = Vec::new();
    for idx in 0..total_pages {
        let (_, page) = app
            .get_json(&toy_list_uri(Some(&filter), None, Some(&idx.to_string())))
            .await;
        seen.extend(page_names(&page));
    }

    seen.sort();
    seen.dedup();
    assert_eq!(seen.len(), 7);
}

#[tokio::test]
async fn page_idx_param_wins_over_filter() {
    let app = TestApp::with_toys(&catalogue()).await;

    let filter = json!({ "pageIdx": 0 });
    let (_, page) = app
        .get_json(&toy_list_uri(Some(&filter), None, Some("1")))
        .await;
    assert_eq!(page_names(&page), vec!["Toy 3", "Toy 2", "Toy 1", "Toy 0"]);

    let filter = json!({ "pageIdx": 1 });
    let (_, page) = app.get_json(&toy_list_uri(Some(&filter), None, None)).await;
    assert_eq!(page_names(&page).len(), 4);
}

#[tokio::test]
async fn repeated_parameters_use_first_value() {
    let app = TestApp::with_toys(&catalogue()).await;

    let (status, page) = app.get_json("/api/toy?pageIdx=0&pageIdx=1").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        page_names(&page),
        vec!["Toy 9", "Toy 8", "Toy 7", "Toy 6", "Toy 5", "Toy 4"]
    );

    let uri = format!(
        "/api/toy?sortBy={}&sortBy={}&pageIdx=1&pageIdx=0",
        urlencoding::encode(r#"{"type":"price"}"#),
        urlencoding::encode(r#"{"type":"name","desc":true}"#),
    );
    let (status, page) = app.get_json(&uri).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(page_names(&page), vec!["Toy 6", "Toy 7", "Toy 8", "Toy 9"]);
}

#[tokio::test]
async fn out_of_range_page_is_empty() {
    let app = TestApp::with_toys(&catalogue()).await;

    let (status, page) = app.get_json(&toy_list_uri(None, None, Some("9"))).await;
    assert_eq!(status, StatusCode::OK);
    assert!(page_names(&page).is_empty());
    assert_eq!(page["totalPages"], 2);
}

#[tokio::test]
async fn malformed_parameters_fall_back_to_defaults() {
    let app = TestApp::with_toys(&catalogue()).await;

    let (status, page) = app
        .get_json("/api/toy?filterBy=%7Bnot-json&sortBy=oops&pageIdx=-3")
        .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(page["totalPages"], 2);
    assert_eq!(page_names(&page)[0], "Toy 9");
}

#[tokio::test]
async fn empty_catalogue_has_no_pages() {
    let app = TestApp::new().await;

    let (status, page) = app.get_json("/api/toy").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(page["totalPages"], 0);
    assert!(page_names(&page).is_empty());
}

// =============================================================================
// Labels
// =============================================================================

#[tokio::test]
async fn label_catalogue() {
    let app = TestApp::new().await;

    let (status, labels) = app.get_json("/api/toy/labels").await;
    assert_eq!(status, StatusCode::OK);
    let labels = labels.as_array().unwrap();
    assert_eq!(labels.len(), 8);
    assert_eq!(labels[0], "On wheels");
}

#[tokio::test]
async fn label_counts() {
    let app = TestApp::with_toys(&bear_and_ant()).await;

    let (status, counts) = app.get_json("/api/toy/labels/count").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(counts["Baby"], json!({ "total": 2, "inStock": 1 }));
    assert_eq!(counts["Doll"], json!({ "total": 1, "inStock": 1 }));
}

// =============================================================================
// Single toy and admin CRUD
// =============================================================================

#[tokio::test]
async fn get_toy_by_id() {
    let app = TestApp::with_toys(&bear_and_ant()).await;

    let (status, toy) = app.get_json("/api/toy/bear").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(toy["name"], "Bear");
    assert_eq!(toy["inStock"], true);

    let (status, body) = app.get_json("/api/toy/missing").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    has_key(&body, "err");
}

#[tokio::test]
async fn mutations_require_admin() {
    let app = TestApp::with_toys(&bear_and_ant()).await;
    let new_toy = json!({ "name": "Kite", "price": 12 });

    let response = app.send_json("POST", "/api/toy", new_toy.clone(), "").await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let user = app.create_and_login_user("puki", "secret").await;
    let response = app.send_json("POST", "/api/toy", new_toy.clone(), &user).await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    let response = app
        .request_with_cookies(
            Request::delete("/api/toy/bear").body(Body::empty()).unwrap(),
            &user,
        )
        .await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    let response = app
        .send_json("PUT", "/api/toy", json!({ "_id": "bear", "price": 1 }), "")
        .await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn admin_adds_updates_and_removes() {
    let app = TestApp::with_toys(&bear_and_ant()).await;
    let admin = app.create_and_login_admin("admin", "admin").await;

    let response = app
        .send_json(
            "POST",
            "/api/toy",
            json!({ "name": "Kite", "price": "12.5", "labels": ["Outdoor"] }),
            &admin,
        )
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    let kite = body_json(response).await;
    assert_eq!(kite["price"], 12.5);
    assert_eq!(kite["inStock"], true);
    assert_eq!(kite["msgs"], json!([]));
    let kite_id = kite["_id"].as_str().unwrap().to_string();

    let (_, page) = app.get_json("/api/toy").await;
    assert_eq!(page_names(&page)[0], "Kite");

    let response = app
        .send_json(
            "PUT",
            "/api/toy",
            json!({ "_id": kite_id, "price": 20, "inStock": false }),
            &admin,
        )
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    let updated = body_json(response).await;
    assert_eq!(updated["price"], 20.0);
    assert_eq!(updated["inStock"], false);
    assert_eq!(updated["name"], "Kite");
    assert_eq!(updated["createdAt"], kite["createdAt"]);

    let response = app
        .request_with_cookies(
            Request::delete(format!("/api/toy/{kite_id}"))
                .body(Body::empty())
                .unwrap(),
            &admin,
        )
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await, json!({ "msg": "Deleted successfully" }));

    let (status, _) = app.get_json(&format!("/api/toy/{kite_id}")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn admin_errors_map_to_status() {
    let app = TestApp::with_toys(&bear_and_ant()).await;
    let admin = app.create_and_login_admin("admin", "admin").await;

    let response = app
        .send_json("POST", "/api/toy", json!({ "name": "", "price": 3 }), &admin)
        .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    has_key(&body_json(response).await, "err");

    let response = app
        .send_json("PUT", "/api/toy", json!({ "_id": "nope", "price": 3 }), &admin)
        .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let response = app
        .request_with_cookies(
            Request::delete("/api/toy/nope").body(Body::empty()).unwrap(),
            &admin,
        )
        .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn malformed_bodies_are_json_bad_requests() {
    let app = TestApp::with_toys(&bear_and_ant()).await;
    let admin = app.create_and_login_admin("admin", "admin").await;

    let response = app
        .send_raw_json("POST", "/api/toy", "{\"name\": \"Kite\",", &admin)
        .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    has_key(&body_json(response).await, "err");

    let response = app
        .send_json("PUT", "/api/toy", json!({ "price": 3 }), &admin)
        .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    has_key(&body_json(response).await, "err");

    let response = app
        .request_with_cookies(
            Request::post("/api/toy")
                .body(Body::from(r#"{"name":"Kite","price":1}"#))
                .unwrap(),
            &admin,
        )
        .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    has_key(&body_json(response).await, "err");

    let response = app
        .send_raw_json("POST", "/api/toy/bear/msg", "not json", &admin)
        .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    has_key(&body_json(response).await, "err");
}

#[tokio::test]
async fn login_precedes_body_validation() {
    let app = TestApp::with_toys(&bear_and_ant()).await;

    let response = app.send_raw_json("POST", "/api/toy", "{", "").await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn added_toys_are_persisted() {
    let app = TestApp::new().await;
    let admin = app.create_and_login_admin("admin", "admin").await;

    app.send_json("POST", "/api/toy", json!({ "name": "Kite", "price": 3 }), &admin)
        .await;

    let body = std::fs::read_to_string(app.data_dir.path().join("toy.json")).unwrap();
    let stored: Vec<Value> = serde_json::from_str(&body).unwrap();
    assert_eq!(stored.len(), 1);
    assert_eq!(stored[0]["name"], "Kite");
}

// =============================================================================
// Messages
// =============================================================================

#[tokio::test]
async fn logged_in_users_post_and_remove_messages() {
    let app = TestApp::with_toys(&bear_and_ant()).await;

    let response = app
        .send_json("POST", "/api/toy/bear/msg", json!({ "txt": "Cute" }), "")
        .await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let user = app.create_and_login_user("puki", "secret").await;
    let response = app
        .send_json("POST", "/api/toy/bear/msg", json!({ "txt": "Cute" }), &user)
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    let msg = body_json(response).await;
    assert_eq!(msg["txt"], "Cute");
    assert_eq!(msg["by"]["fullname"], "puki Tester");
    let msg_id = msg["id"].as_str().unwrap().to_string();

    let (_, toy) = app.get_json("/api/toy/bear").await;
    assert_eq!(toy["msgs"][0]["id"], msg_id.as_str());

    let uri = format!("/api/toy/bear/msg/{msg_id}");
    let response = app
        .request_with_cookies(Request::delete(&uri).body(Body::empty()).unwrap(), &user)
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await, json!(msg_id));

    let response = app
        .request_with_cookies(Request::delete(&uri).body(Body::empty()).unwrap(), &user)
        .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn message_on_missing_toy_is_not_found() {
    let app = TestApp::new().await;
    let user = app.create_and_login_user("puki", "secret").await;

    let response = app
        .send_json("POST", "/api/toy/nope/msg", json!({ "txt": "Hi" }), &user)
        .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

// =============================================================================
// Health and fallback
// =============================================================================

#[tokio::test]
async fn health_reports_file_backend() {
    let app = TestApp::new().await;

    let (status, body) = app.get_json("/health").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "healthy");
    assert_eq!(body["backend"], "file");
}

#[tokio::test]
async fn unknown_api_path_is_json_not_found() {
    let app = TestApp::new().await;

    let (status, body) = app.get_json("/api/nope").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    has_key(&body, "err");
}

#[tokio::test]
async fn frontend_routes_fall_back_to_index() {
    let app = TestApp::new().await;
    let public = app.data_dir.path().join("public");
    std::fs::create_dir_all(&public).unwrap();
    std::fs::write(public.join("index.html"), "<html>toys</html>").unwrap();

    let response = app
        .request(Request::get("/toy/edit/123").body(Body::empty()).unwrap())
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers()["content-type"],
        "text/html; charset=utf-8"
    );
}
