mod common;

use axum::http::{Request, StatusCode};
use axum::body::Body;
use serde_json::json;
use tempfile::TempDir;
use uuid::Uuid;

use common::{delete, get, json_request, multipart_request, offline_app, send};

const PNG_BYTES: &[u8] = b"\x89PNG\r\n\x1a\nfake-image-bytes";

#[tokio::test]
async fn test_health_and_index() {
    let dir = TempDir::new().unwrap();
    let app = offline_app(dir.path());

    let (status, body) = send(&app, get("/health")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");

    let (status, body) = send(&app, get("/")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
    assert_eq!(body["endpoints"]["cart"], "/api/cart");
}

#[tokio::test]
async fn test_unknown_route_uses_envelope() {
    let dir = TempDir::new().unwrap();
    let app = offline_app(dir.path());

    let (status, body) = send(&app, get("/api/does-not-exist")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["success"], false);
    assert_eq!(body["message"], "API route not found");
}

#[tokio::test]
async fn test_register_rejects_invalid_input() {
    let dir = TempDir::new().unwrap();
    let app = offline_app(dir.path());

    let (status, body) = send(
        &app,
        json_request(
            "POST",
            "/api/auth/register",
            json!({
                "firstName": "Ama",
                "lastName": "Owusu",
                "email": "not-an-email",
                "password": "secret1"
            }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["success"], false);
    assert_eq!(body["message"], "Invalid email address");

    let (status, body) = send(
        &app,
        json_request(
            "POST",
            "/api/auth/register",
            json!({
                "firstName": "Ama",
                "lastName": "Owusu",
                "email": "ama@example.com",
                "password": "123"
            }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "Password must be at least 6 characters");
}

#[tokio::test]
async fn test_current_user_requires_token() {
    let dir = TempDir::new().unwrap();
    let app = offline_app(dir.path());

    let (status, body) = send(&app, get("/api/auth/me")).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["success"], false);

    let request = Request::builder()
        .uri("/api/auth/me")
        .header("authorization", "Bearer not-a-jwt")
        .body(Body::empty())
        .unwrap();
    let (status, _) = send(&app, request).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let request = Request::builder()
        .uri("/api/auth/me")
        .header("authorization", "Token abc")
        .body(Body::empty())
        .unwrap();
    let (status, body) = send(&app, request).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["message"], "Invalid token format");
}

#[tokio::test]
async fn test_request_validation_happens_before_storage() {
    let dir = TempDir::new().unwrap();
    let app = offline_app(dir.path());
    let user = Uuid::new_v4();

    let (status, body) = send(
        &app,
        json_request(
            "POST",
            &format!("/api/cart/{}/add", user),
            json!({ "productId": Uuid::new_v4(), "quantity": 0 }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["success"], false);

    let (status, _) = send(
        &app,
        json_request(
            "PUT",
            &format!("/api/orders/{}/status", Uuid::new_v4()),
            json!({ "status": "lost" }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, body) = send(
        &app,
        json_request(
            "POST",
            "/api/orders/create",
            json!({ "userId": user, "location": { "coordinates": [200.0, 10.0] } }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "Longitude must be between -180 and 180");

    let (status, body) = send(
        &app,
        json_request(
            "POST",
            "/api/products",
            json!({
                "title": "Kente cloth",
                "price": "-1.00",
                "quantity": 3,
                "categoryId": Uuid::new_v4(),
                "userId": user
            }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "Price cannot be negative");
}

#[tokio::test]
async fn test_upload_fetch_and_delete_image() {
    let dir = TempDir::new().unwrap();
    let app = offline_app(dir.path());

    let (status, body) = send(
        &app,
        multipart_request(
            "/api/upload/image",
            &[("image", "photo.png", "image/png", PNG_BYTES)],
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
    assert_eq!(body["data"]["originalName"], "photo.png");
    assert_eq!(body["data"]["size"], PNG_BYTES.len());

    let filename = body["data"]["filename"].as_str().unwrap().to_string();
    assert!(filename.ends_with(".png"));
    assert_eq!(
        body["data"]["url"],
        format!("http://localhost:5000/uploads/{}", filename)
    );
    assert!(dir.path().join(&filename).exists());

    let response = tower::ServiceExt::oneshot(
        app.clone(),
        get(&format!("/api/upload/{}", filename)),
    )
    .await
    .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.headers()["content-type"], "image/png");

    let response = tower::ServiceExt::oneshot(app.clone(), get(&format!("/uploads/{}", filename)))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let (status, body) = send(&app, delete(&format!("/api/upload/{}", filename))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "File deleted successfully");
    assert!(!dir.path().join(&filename).exists());

    let (status, body) = send(&app, get(&format!("/api/upload/{}", filename))).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["message"], "File not found");

    let (status, _) = send(&app, delete(&format!("/api/upload/{}", filename))).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_upload_many_images() {
    let dir = TempDir::new().unwrap();
    let app = offline_app(dir.path());

    let (status, body) = send(
        &app,
        multipart_request(
            "/api/upload/images",
            &[
                ("images", "a.png", "image/png", PNG_BYTES),
                ("images", "b.jpg", "image/jpeg", &b"jpeg-bytes"[..]),
            ],
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["count"], 2);
    assert_eq!(body["data"].as_array().unwrap().len(), 2);
    assert!(body["data"][1]["filename"].as_str().unwrap().ends_with(".jpg"));

    let too_many: Vec<_> = (0..4)
        .map(|_| ("images", "x.png", "image/png", PNG_BYTES))
        .collect();
    let (status, _) = send(&app, multipart_request("/api/upload/images", &too_many)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_upload_rejections() {
    let dir = TempDir::new().unwrap();
    let app = offline_app(dir.path());

    let (status, body) = send(
        &app,
        multipart_request(
            "/api/upload/image",
            &[("image", "notes.txt", "text/plain", &b"hello"[..])],
        ),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "Only image files are allowed");

    let (status, body) = send(
        &app,
        multipart_request(
            "/api/upload/image",
            &[("other", "photo.png", "image/png", PNG_BYTES)],
        ),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "No file uploaded");

    let oversized = vec![0u8; 1024 * 1024 + 1];
    let (status, _) = send(
        &app,
        multipart_request(
            "/api/upload/image",
            &[("image", "big.png", "image/png", oversized.as_slice())],
        ),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, body) = send(&app, get("/api/upload/..%2Fsecret.txt")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "Invalid file name");

    assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
}

#[tokio::test]
async fn test_extractor_rejections_use_envelope() {
    let dir = TempDir::new().unwrap();
    let app = offline_app(dir.path());

    let (status, body) = send(&app, get("/api/cart/not-a-uuid")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["success"], false);
    assert!(body["message"].as_str().unwrap().contains("not-a-uuid"));

    let malformed = Request::builder()
        .method("POST")
        .uri("/api/auth/login")
        .header("content-type", "application/json")
        .body(Body::from("{not json"))
        .unwrap();
    let (status, body) = send(&app, malformed).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["success"], false);

    let (status, body) = send(
        &app,
        json_request(
            "POST",
            &format!("/api/cart/{}/add", Uuid::new_v4()),
            json!({ "productId": "x", "quantity": 1 }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["success"], false);

    let plain_text = Request::builder()
        .method("POST")
        .uri("/api/auth/register")
        .header("content-type", "text/plain")
        .body(Body::from("hello"))
        .unwrap();
    let (status, body) = send(&app, plain_text).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["success"], false);

    let (status, body) = send(&app, get("/api/products?active=maybe")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["success"], false);

    let (status, body) = send(
        &app,
        json_request("POST", "/api/upload/image", json!({ "image": "x" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["success"], false);
}
