//! End-to-end API tests: real router, temp database, JWT auth.

use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use tower::ServiceExt;

use funko_server::auth::hash_password;
use funko_server::core::{build_router, ServerState};
use funko_server::db::repository::user as user_repo;
use shared::models::Role;

struct TestServer {
    _dir: tempfile::TempDir,
    state: ServerState,
    router: Router,
}

async fn test_server() -> TestServer {
    let dir = tempfile::tempdir().unwrap();
    let state = ServerState::for_tests(dir.path()).await.unwrap();

    // Seed one admin account; sign-up only ever creates plain users
    let admin_hash = hash_password("admin-pass").unwrap();
    user_repo::create(state.db.pool(), "admin", &admin_hash, &[Role::Admin])
        .await
        .unwrap();

    let router = build_router(state.clone());
    TestServer {
        _dir: dir,
        state,
        router,
    }
}

fn request(
    method: &str,
    uri: &str,
    token: Option<&str>,
    body: Option<serde_json::Value>,
) -> Request<Body> {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
    }
    match body {
        Some(value) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(value.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    }
}

async fn send(router: &Router, req: Request<Body>) -> (StatusCode, serde_json::Value) {
    let response = router.clone().oneshot(req).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let value = serde_json::from_slice(&bytes).unwrap_or(serde_json::Value::Null);
    (status, value)
}

async fn sign_up(router: &Router, username: &str, password: &str) -> i64 {
    let (status, body) = send(
        router,
        request(
            "POST",
            "/auth/signup",
            None,
            Some(serde_json::json!({ "username": username, "password": password })),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "signup failed: {body}");
    body["id"].as_i64().unwrap()
}

async fn sign_in(router: &Router, username: &str, password: &str) -> String {
    let (status, body) = send(
        router,
        request(
            "POST",
            "/auth/signin",
            None,
            Some(serde_json::json!({ "username": username, "password": password })),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "signin failed: {body}");
    body["access_token"].as_str().unwrap().to_string()
}

fn client_json() -> serde_json::Value {
    serde_json::json!({
        "name": "Jane Doe",
        "email": "jane@example.com",
        "phone": "555-0100",
        "address": { "street": "1 Main St", "city": "Springfield", "zip": "12345" }
    })
}

fn order_json(user_id: i64, funko_id: i64, quantity: i64, price: f64) -> serde_json::Value {
    serde_json::json!({
        "user_id": user_id,
        "client": client_json(),
        "order_lines": [{
            "funko_id": funko_id,
            "quantity": quantity,
            "price": price,
            "total": quantity as f64 * price
        }]
    })
}

async fn seed_catalog(router: &Router, admin_token: &str) -> (i64, i64) {
    let (status, category) = send(
        router,
        request(
            "POST",
            "/categories",
            Some(admin_token),
            Some(serde_json::json!({ "name": "Disney" })),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let category_id = category["id"].as_i64().unwrap();

    let (status, funko) = send(
        router,
        request(
            "POST",
            "/funkos",
            Some(admin_token),
            Some(serde_json::json!({
                "name": "Mickey",
                "price": 5.0,
                "stock": 10,
                "category_id": category_id,
            })),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    (category_id, funko["id"].as_i64().unwrap())
}

#[tokio::test]
async fn health_is_public() {
    let server = test_server().await;
    let (status, body) = send(&server.router, request("GET", "/health", None, None)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
}

#[tokio::test]
async fn orders_require_authentication() {
    let server = test_server().await;
    let (status, _) = send(&server.router, request("GET", "/orders", None, None)).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn catalog_mutations_require_admin() {
    let server = test_server().await;
    sign_up(&server.router, "alice", "password").await;
    let alice = sign_in(&server.router, "alice", "password").await;

    let (status, _) = send(
        &server.router,
        request(
            "POST",
            "/categories",
            Some(&alice),
            Some(serde_json::json!({ "name": "Disney" })),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn catalog_rejects_duplicates_and_unknown_categories() {
    let server = test_server().await;
    let router = &server.router;
    let admin = sign_in(router, "admin", "admin-pass").await;
    let (category_id, _) = seed_catalog(router, &admin).await;

    let (status, _) = send(
        router,
        request(
            "POST",
            "/categories",
            Some(&admin),
            Some(serde_json::json!({ "name": "Disney" })),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);

    let (status, _) = send(
        router,
        request(
            "POST",
            "/funkos",
            Some(&admin),
            Some(serde_json::json!({
                "name": "Mickey",
                "price": 5.0,
                "stock": 10,
                "category_id": category_id,
            })),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);

    let (status, _) = send(
        router,
        request(
            "POST",
            "/funkos",
            Some(&admin),
            Some(serde_json::json!({
                "name": "Donald",
                "price": 5.0,
                "stock": 10,
                "category_id": 424242,
            })),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn sign_in_failures_are_uniform() {
    let server = test_server().await;
    sign_up(&server.router, "alice", "password").await;

    let wrong_password = send(
        &server.router,
        request(
            "POST",
            "/auth/signin",
            None,
            Some(serde_json::json!({ "username": "alice", "password": "nope" })),
        ),
    )
    .await;
    let unknown_user = send(
        &server.router,
        request(
            "POST",
            "/auth/signin",
            None,
            Some(serde_json::json!({ "username": "nobody", "password": "nope" })),
        ),
    )
    .await;

    // Same status and same message: no username enumeration
    assert_eq!(wrong_password.0, StatusCode::BAD_REQUEST);
    assert_eq!(unknown_user.0, StatusCode::BAD_REQUEST);
    assert_eq!(wrong_password.1["message"], unknown_user.1["message"]);
}

#[tokio::test]
async fn duplicate_username_conflicts() {
    let server = test_server().await;
    sign_up(&server.router, "alice", "password").await;
    let (status, _) = send(
        &server.router,
        request(
            "POST",
            "/auth/signup",
            None,
            Some(serde_json::json!({ "username": "alice", "password": "password" })),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
}

#[tokio::test]
async fn order_lifecycle_over_http() {
    let server = test_server().await;
    let router = &server.router;

    let alice_id = sign_up(router, "alice", "password").await;
    let alice = sign_in(router, "alice", "password").await;
    let admin = sign_in(router, "admin", "admin-pass").await;
    sign_up(router, "bob", "password").await;
    let bob = sign_in(router, "bob", "password").await;

    let (_, funko_id) = seed_catalog(router, &admin).await;

    // Alice orders two Mickeys
    let (status, order) = send(
        router,
        request(
            "POST",
            "/orders",
            Some(&alice),
            Some(order_json(alice_id, funko_id, 2, 5.0)),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "order create failed: {order}");
    assert_eq!(order["total"], 10.0);
    assert_eq!(order["total_items"], 2);
    let order_id = order["id"].as_i64().unwrap();

    // Stock went down
    let (status, funko) = send(
        router,
        request("GET", &format!("/funkos/{funko_id}"), None, None),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(funko["stock"], 8);

    // Bob cannot see Alice's order; the response does not confirm it exists
    let (status, _) = send(
        router,
        request("GET", &format!("/orders/{order_id}"), Some(&bob), None),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    // Alice and the admin can
    let (status, _) = send(
        router,
        request("GET", &format!("/orders/{order_id}"), Some(&alice), None),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let (status, page) = send(router, request("GET", "/orders", Some(&admin), None)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(page["total"], 1);

    // Bob's listing is scoped to himself
    let (_, page) = send(router, request("GET", "/orders", Some(&bob), None)).await;
    assert_eq!(page["total"], 0);

    // Bob cannot order in Alice's name
    let (status, _) = send(
        router,
        request(
            "POST",
            "/orders",
            Some(&bob),
            Some(order_json(alice_id, funko_id, 1, 5.0)),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    // A stale price is a validation failure and leaves stock alone
    let (status, _) = send(
        router,
        request(
            "POST",
            "/orders",
            Some(&alice),
            Some(order_json(alice_id, funko_id, 1, 4.0)),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    // Deleting the order releases the reservation
    let (status, _) = send(
        router,
        request("DELETE", &format!("/orders/{order_id}"), Some(&alice), None),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let (_, funko) = send(
        router,
        request("GET", &format!("/funkos/{funko_id}"), None, None),
    )
    .await;
    assert_eq!(funko["stock"], 10);
}

#[tokio::test]
async fn funko_cache_is_invalidated_on_update() {
    let server = test_server().await;
    let router = &server.router;
    let admin = sign_in(router, "admin", "admin-pass").await;
    let (_, funko_id) = seed_catalog(router, &admin).await;

    // Prime the cache
    let (_, funko) = send(
        router,
        request("GET", &format!("/funkos/{funko_id}"), None, None),
    )
    .await;
    assert_eq!(funko["price"], 5.0);

    // Mutate, then read again: must not be served stale
    let (status, _) = send(
        router,
        request(
            "PUT",
            &format!("/funkos/{funko_id}"),
            Some(&admin),
            Some(serde_json::json!({ "price": 7.5 })),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (_, funko) = send(
        router,
        request("GET", &format!("/funkos/{funko_id}"), None, None),
    )
    .await;
    assert_eq!(funko["price"], 7.5);
}

#[tokio::test]
async fn image_upload_and_retrieval() {
    let server = test_server().await;
    let router = &server.router;
    let admin = sign_in(router, "admin", "admin-pass").await;
    let (_, funko_id) = seed_catalog(router, &admin).await;

    let boundary = "test-boundary-7f3a";
    let payload = [
        format!("--{boundary}\r\n"),
        "Content-Disposition: form-data; name=\"file\"; filename=\"mickey.png\"\r\n".to_string(),
        "Content-Type: image/png\r\n\r\n".to_string(),
        "fake-png-bytes".to_string(),
        format!("\r\n--{boundary}--\r\n"),
    ]
    .concat();

    let req = Request::builder()
        .method("PATCH")
        .uri(format!("/funkos/{funko_id}/image"))
        .header(header::AUTHORIZATION, format!("Bearer {admin}"))
        .header(
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={boundary}"),
        )
        .body(Body::from(payload))
        .unwrap();
    let (status, funko) = send(router, req).await;
    assert_eq!(status, StatusCode::OK, "upload failed: {funko}");

    let image = funko["image"].as_str().unwrap();
    assert!(image.ends_with(".png"));

    // Served back with the right content type
    let response = router
        .clone()
        .oneshot(request("GET", &format!("/storage/{image}"), None, None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers().get(header::CONTENT_TYPE).unwrap(),
        "image/png"
    );
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    assert_eq!(&bytes[..], b"fake-png-bytes");

    // The file really lives in the store's upload dir
    assert!(server.state.images.dir().join(image).exists());
}
