//! End-to-end HTTP flow against an in-memory database

use axum::Router;
use axum::body::Body;
use http::{Method, Request, StatusCode, header};
use http_body_util::BodyExt;
use order_server::core::Config;
use order_server::db::DbService;
use order_server::{ErrorCode, ServerState};
use serde_json::{Value, json};
use sqlx::SqlitePool;
use tower::ServiceExt;

const USER: i64 = 1;
const ADMIN: i64 = 900;

struct TestApp {
    app: Router,
    state: ServerState,
    pool: SqlitePool,
    _dir: tempfile::TempDir,
}

impl TestApp {
    async fn new() -> Self {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::with_overrides(dir.path(), 0);
        let db = DbService::memory().await.unwrap();
        let state = ServerState::from_parts(config, db.pool.clone());
        let app = order_server::api::build_app(&state);

        sqlx::query(
            "INSERT INTO dish (id, name, price) VALUES (1, 'Beef Noodles', 22.0), (2, 'Cola', 3.5)",
        )
        .execute(&db.pool)
        .await
        .unwrap();
        sqlx::query(
            "INSERT INTO address_book \
             (id, user_id, consignee, phone, province_name, city_name, district_name, detail) \
             VALUES (10, 1, 'Han Meimei', '13900000000', 'Shanghai', 'Shanghai', 'Pudong', \
             'Century Ave 1')",
        )
        .execute(&db.pool)
        .await
        .unwrap();

        Self {
            app,
            state,
            pool: db.pool,
            _dir: dir,
        }
    }

    fn token(&self, user_id: i64, role: &str) -> String {
        self.state.jwt_service.generate_token(user_id, role).unwrap()
    }

    async fn call(
        &self,
        method: Method,
        uri: &str,
        as_user: Option<(i64, &str)>,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let mut req = Request::builder().method(method).uri(uri);
        if let Some((id, role)) = as_user {
            req = req.header(header::AUTHORIZATION, format!("Bearer {}", self.token(id, role)));
        }
        let req = match body {
            Some(b) => req
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(b.to_string()))
                .unwrap(),
            None => req.body(Body::empty()).unwrap(),
        };

        let resp = self.app.clone().oneshot(req).await.unwrap();
        let status = resp.status();
        let bytes = resp.into_body().collect().await.unwrap().to_bytes();
        let value = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap_or_else(|_| {
                Value::String(String::from_utf8_lossy(&bytes).into_owned())
            })
        };
        (status, value)
    }

    async fn user(&self, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
        self.call(method, uri, Some((USER, "user")), body).await
    }

    async fn admin(&self, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
        self.call(method, uri, Some((ADMIN, "admin")), body).await
    }
}

#[tokio::test]
async fn health_is_public() {
    let app = TestApp::new().await;
    let (status, body) = app.call(Method::GET, "/health", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "healthy");

    let (status, body) = app.call(Method::GET, "/health/detailed", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["checks"]["database"]["status"], "ok");
}

#[tokio::test]
async fn api_requires_token() {
    let app = TestApp::new().await;
    let (status, body) = app.call(Method::GET, "/api/cart", None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["code"], ErrorCode::NotAuthenticated.code());
}

#[tokio::test]
async fn reports_require_admin() {
    let app = TestApp::new().await;
    let (status, body) = app
        .user(Method::GET, "/api/reports/turnover?begin=2024-01-01&end=2024-01-02", None)
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["code"], ErrorCode::AdminRequired.code());

    let (status, _) = app.user(Method::POST, "/api/orders/1/pay", None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn cart_to_completed_order() {
    let app = TestApp::new().await;

    for _ in 0..2 {
        let (status, _) = app
            .user(
                Method::POST,
                "/api/cart/add",
                Some(json!({ "dish_id": 1, "flavor": "extra spicy" })),
            )
            .await;
        assert_eq!(status, StatusCode::OK);
    }
    app.user(Method::POST, "/api/cart/add", Some(json!({ "dish_id": 2 }))).await;

    let (_, cart) = app.user(Method::GET, "/api/cart", None).await;
    let lines = cart.as_array().unwrap();
    assert_eq!(lines.len(), 2);

    let (status, submitted) = app
        .user(
            Method::POST,
            "/api/orders/submit",
            Some(json!({ "address_book_id": 10, "expected_amount": 47.5 })),
        )
        .await;
    assert_eq!(status, StatusCode::OK, "{submitted}");
    assert_eq!(submitted["amount"], 47.5);
    let id = submitted["id"].as_i64().unwrap();

    let (_, cart) = app.user(Method::GET, "/api/cart", None).await;
    assert!(cart.as_array().unwrap().is_empty());

    let (status, detail) = app.user(Method::GET, &format!("/api/orders/{id}"), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(detail["status"], "PENDING_PAYMENT");
    assert_eq!(detail["details"].as_array().unwrap().len(), 2);

    for step in ["pay", "confirm", "dispatch", "complete"] {
        let (status, body) = app
            .admin(Method::POST, &format!("/api/orders/{id}/{step}"), None)
            .await;
        assert_eq!(status, StatusCode::OK, "{step}: {body}");
    }

    let (_, detail) = app.user(Method::GET, &format!("/api/orders/{id}"), None).await;
    assert_eq!(detail["status"], "COMPLETED");
    assert_eq!(detail["pay_status"], "PAID");

    // Terminal: nothing moves it any more
    let (status, body) = app
        .admin(Method::POST, &format!("/api/orders/{id}/cancel"), Some(json!({ "reason": "late" })))
        .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["code"], ErrorCode::IllegalTransition.code());

    let (_, list) = app.user(Method::GET, "/api/orders?page=1&page_size=10", None).await;
    assert_eq!(list.as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn submit_failures_leave_no_order() {
    let app = TestApp::new().await;

    let (status, body) = app
        .user(Method::POST, "/api/orders/submit", Some(json!({ "address_book_id": 10 })))
        .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["code"], ErrorCode::CartEmpty.code());

    app.user(Method::POST, "/api/cart/add", Some(json!({ "dish_id": 1 }))).await;
    let (status, body) = app
        .user(Method::POST, "/api/orders/submit", Some(json!({ "address_book_id": 99 })))
        .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["code"], ErrorCode::AddressMissing.code());

    let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM orders")
        .fetch_one(&app.pool)
        .await
        .unwrap();
    assert_eq!(count, 0);
}

#[tokio::test]
async fn cart_sub_removes_line() {
    let app = TestApp::new().await;
    app.user(Method::POST, "/api/cart/add", Some(json!({ "dish_id": 2 }))).await;

    let (status, body) = app
        .user(Method::POST, "/api/cart/sub", Some(json!({ "dish_id": 2 })))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert!(body.is_null());

    let (status, body) = app
        .user(Method::POST, "/api/cart/sub", Some(json!({ "dish_id": 2 })))
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["code"], ErrorCode::CartItemNotFound.code());

    let (status, body) = app
        .user(Method::POST, "/api/cart/add", Some(json!({ "dish_id": 1, "combo_id": 1 })))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], ErrorCode::InvalidItemRef.code());

    let (status, body) = app.user(Method::DELETE, "/api/cart", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["removed"], 0);
}

#[tokio::test]
async fn manual_sweep_cancels_stale_order() {
    let app = TestApp::new().await;
    app.user(Method::POST, "/api/cart/add", Some(json!({ "dish_id": 1 }))).await;
    let (_, submitted) = app
        .user(Method::POST, "/api/orders/submit", Some(json!({ "address_book_id": 10 })))
        .await;
    let id = submitted["id"].as_i64().unwrap();

    // Backdate past the payment timeout
    sqlx::query("UPDATE orders SET order_time = order_time - 20 * 60 * 1000 WHERE id = ?")
        .bind(id)
        .execute(&app.pool)
        .await
        .unwrap();

    let (status, outcome) = app
        .admin(Method::POST, "/api/reports/sweeps/payment_timeout", None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(outcome["transitioned"], 1);

    let (_, detail) = app.user(Method::GET, &format!("/api/orders/{id}"), None).await;
    assert_eq!(detail["status"], "CANCELLED");
    assert_eq!(detail["cancel_reason"], "Order timed out");

    let (status, _) = app.admin(Method::POST, "/api/reports/sweeps/nightly", None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn report_endpoints() {
    let app = TestApp::new().await;

    let (status, body) = app
        .admin(Method::GET, "/api/reports/turnover?begin=2024-01-01&end=2024-01-03", None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["turnovers"], json!([0.0, 0.0, 0.0]));
    assert_eq!(body["dates"][0], "2024-01-01");

    let (status, body) = app
        .admin(Method::GET, "/api/reports/orders?begin=2024-01-01&end=2024-01-01", None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["order_completion_rate"], 0.0);

    let (status, body) = app
        .admin(Method::GET, "/api/reports/users?begin=2024-01-03&end=2024-01-01", None)
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], ErrorCode::InvalidDateRange.code());

    let (status, _) = app
        .admin(Method::GET, "/api/reports/top10?begin=2024-13-01&end=2024-01-01", None)
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, body) = app.admin(Method::GET, "/api/reports/business-today", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["valid_order_count"], 0);
}

#[tokio::test]
async fn export_returns_csv_attachment() {
    let app = TestApp::new().await;
    let req = Request::builder()
        .uri("/api/reports/export")
        .header(header::AUTHORIZATION, format!("Bearer {}", app.token(ADMIN, "admin")))
        .body(Body::empty())
        .unwrap();

    let resp = app.app.clone().oneshot(req).await.unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let disposition = resp.headers()[header::CONTENT_DISPOSITION].to_str().unwrap().to_string();
    assert!(disposition.starts_with("attachment"));

    let bytes = resp.into_body().collect().await.unwrap().to_bytes();
    let text = String::from_utf8(bytes.to_vec()).unwrap();
    // Range header, column header, overview, 30 days
    assert_eq!(text.lines().count(), 33);
}
