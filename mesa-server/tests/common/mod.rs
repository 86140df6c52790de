//! Shared harness for the HTTP tests
//!
//! Each [`TestApp`] owns a fresh SQLite file in a temp dir, the bootstrap
//! admin, and a [`FakeGateway`] in place of EuPago.

#![allow(dead_code)]

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};

use async_trait::async_trait;
use axum::Router;
use axum::body::Body;
use chrono::{Duration, Utc};
use http::{Method, Request, StatusCode, header};
use http_body_util::BodyExt;
use serde_json::{Value, json};
use tempfile::TempDir;
use tower::ServiceExt;

use mesa_server::auth::JwtConfig;
use mesa_server::core::AdminBootstrap;
use mesa_server::db::DbService;
use mesa_server::eupago::{
    GatewayError, MbwayRequest, MultibancoReference, PaymentGateway, ReferenceState,
};
use mesa_server::services::build_router;
use mesa_server::{Config, ServerState};

pub const GATEWAY_KEY: &str = "test-key";
pub const ADMIN_LOGIN: &str = "admin";
pub const ADMIN_PASSWORD: &str = "admin12345";

/// In-process stand-in for EuPago
#[derive(Default)]
pub struct FakeGateway {
    pub fail: AtomicBool,
    pub reference_paid: AtomicBool,
    issued: AtomicU32,
}

#[async_trait]
impl PaymentGateway for FakeGateway {
    async fn create_multibanco(
        &self,
        _identifier: &str,
        amount: f64,
    ) -> Result<MultibancoReference, GatewayError> {
        if self.fail.load(Ordering::SeqCst) {
            return Err(GatewayError::Rejected("Chave invalida".into()));
        }
        let n = self.issued.fetch_add(1, Ordering::SeqCst) + 1;
        Ok(MultibancoReference {
            entity: "11249".into(),
            reference: format!("{:09}", 100_000_000 + n),
            amount,
        })
    }

    async fn create_mbway(
        &self,
        _identifier: &str,
        amount: f64,
        _phone: &str,
        _description: &str,
    ) -> Result<MbwayRequest, GatewayError> {
        if self.fail.load(Ordering::SeqCst) {
            return Err(GatewayError::Transport("connection refused".into()));
        }
        let n = self.issued.fetch_add(1, Ordering::SeqCst) + 1;
        Ok(MbwayRequest {
            reference: format!("MW{n:07}"),
            amount,
        })
    }

    async fn multibanco_status(
        &self,
        _reference: &str,
        _entity: &str,
    ) -> Result<ReferenceState, GatewayError> {
        if self.reference_paid.load(Ordering::SeqCst) {
            Ok(ReferenceState::Paid)
        } else {
            Ok(ReferenceState::Pending)
        }
    }

    fn api_key(&self) -> &str {
        GATEWAY_KEY
    }
}

pub struct TestApp {
    pub router: Router,
    pub state: ServerState,
    pub gateway: Arc<FakeGateway>,
    _dir: TempDir,
}

/// Response status plus parsed JSON body (`Null` when empty)
pub struct TestResponse {
    pub status: StatusCode,
    pub body: Value,
    pub headers: http::HeaderMap,
}

impl TestApp {
    pub async fn spawn() -> Self {
        let dir = tempfile::tempdir().unwrap();
        let db_path = dir.path().join("mesa.db");
        let db_path = db_path.to_str().unwrap().to_string();

        let db = DbService::new(&db_path).await.unwrap();
        db.bootstrap_admin(&AdminBootstrap::default()).await.unwrap();

        let config = Config::for_database(
            db_path,
            JwtConfig::with_secret("integration-test-secret-0123456789abcdef"),
        );
        let gateway = Arc::new(FakeGateway::default());
        let state = ServerState::new(config, db.pool.clone(), gateway.clone());
        let router = build_router(state.clone());

        Self {
            router,
            state,
            gateway,
            _dir: dir,
        }
    }

    pub async fn request(
        &self,
        method: Method,
        uri: &str,
        token: Option<&str>,
        body: Option<Value>,
    ) -> TestResponse {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
        }
        let request = match body {
            Some(body) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };

        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let headers = response.headers().clone();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let body = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap_or(Value::Null)
        };
        TestResponse {
            status,
            body,
            headers,
        }
    }

    pub async fn get(&self, uri: &str, token: Option<&str>) -> TestResponse {
        self.request(Method::GET, uri, token, None).await
    }

    pub async fn post(&self, uri: &str, token: Option<&str>, body: Value) -> TestResponse {
        self.request(Method::POST, uri, token, Some(body)).await
    }

    pub async fn put(&self, uri: &str, token: Option<&str>, body: Value) -> TestResponse {
        self.request(Method::PUT, uri, token, Some(body)).await
    }

    pub async fn delete(&self, uri: &str, token: Option<&str>) -> TestResponse {
        self.request(Method::DELETE, uri, token, None).await
    }

    pub async fn login(&self, login: &str, password: &str) -> String {
        let res = self
            .post(
                "/api/auth/login",
                None,
                json!({ "login": login, "password": password }),
            )
            .await;
        assert_eq!(res.status, StatusCode::OK, "login failed: {}", res.body);
        res.body["token"].as_str().unwrap().to_string()
    }

    pub async fn admin_token(&self) -> String {
        self.login(ADMIN_LOGIN, ADMIN_PASSWORD).await
    }

    /// Register a customer and return `(user_id, token)`
    pub async fn register_customer(&self, username: &str) -> (i64, String) {
        let res = self
            .post(
                "/api/auth/register",
                None,
                json!({
                    "username": username,
                    "email": format!("{username}@example.com"),
                    "password": "correct-horse",
                    "full_name": format!("Customer {username}"),
                }),
            )
            .await;
        assert_eq!(res.status, StatusCode::CREATED, "register failed: {}", res.body);
        (
            res.body["user"]["id"].as_i64().unwrap(),
            res.body["token"].as_str().unwrap().to_string(),
        )
    }

    pub async fn create_table(&self, admin: &str, number: i32, capacity: i32) -> i64 {
        let res = self
            .post(
                "/api/tables",
                Some(admin),
                json!({ "number": number, "capacity": capacity }),
            )
            .await;
        assert_eq!(res.status, StatusCode::CREATED, "table: {}", res.body);
        res.body["id"].as_i64().unwrap()
    }

    pub async fn create_category(&self, admin: &str, name: &str) -> i64 {
        let res = self
            .post("/api/menu/categories", Some(admin), json!({ "name": name }))
            .await;
        assert_eq!(res.status, StatusCode::CREATED, "category: {}", res.body);
        res.body["id"].as_i64().unwrap()
    }

    pub async fn create_item(&self, admin: &str, category_id: i64, name: &str, price: f64) -> i64 {
        let res = self
            .post(
                "/api/menu/items",
                Some(admin),
                json!({ "category_id": category_id, "name": name, "price": price }),
            )
            .await;
        assert_eq!(res.status, StatusCode::CREATED, "item: {}", res.body);
        res.body["id"].as_i64().unwrap()
    }

    pub async fn book(
        &self,
        token: &str,
        table_id: i64,
        date: &str,
        time: &str,
        party_size: i32,
        items: Value,
    ) -> TestResponse {
        self.post(
            "/api/reservations",
            Some(token),
            json!({
                "table_id": table_id,
                "date": date,
                "time": time,
                "party_size": party_size,
                "items": items,
            }),
        )
        .await
    }
}

/// A business date safely in the future
pub fn future_date(days: i64) -> String {
    let lisbon = Utc::now().with_timezone(&chrono_tz::Europe::Lisbon);
    (lisbon.date_naive() + Duration::days(days))
        .format("%Y-%m-%d")
        .to_string()
}
