#![allow(dead_code)]

use std::sync::Arc;

use agrimarket_backend::{
    app::build_router,
    types::{
        AppConfig, AppEnvironment, AuthConfig, Config, Context, DatabaseConfig, OtpConfig,
        PaymentConfig, ToContext,
    },
};
use axum::{
    body::Body,
    http::{header, Method, Request, StatusCode},
    Router,
};
use serde_json::Value;
use tower::ServiceExt;

pub const FARMER_PHONE: &str = "9876543210";
pub const PROVIDER_PHONE: &str = "9876543211";
pub const SUPPLIER_PHONE: &str = "9876543212";
pub const TRANSPORTER_PHONE: &str = "9876543213";
pub const CONSUMER_PHONE: &str = "9876543214";
pub const ADMIN_PHONE: &str = "9999999999";

pub struct TestApp {
    pub ctx: Arc<Context>,
    pub router: Router,
}

fn test_config(seed_demo_data: bool) -> Config {
    Config {
        database: DatabaseConfig {
            url: String::from("sqlite::memory:"),
            max_connections: 1,
            seed_demo_data,
        },
        app: AppConfig {
            host: String::from("127.0.0.1"),
            environment: AppEnvironment::Development,
            port: 0,
        },
        auth: AuthConfig {
            jwt_secret: String::from("test-secret"),
            token_ttl_days: 7,
        },
        otp: OtpConfig { ttl_seconds: 300 },
        payment: PaymentConfig {
            currency: String::from("INR"),
        },
    }
}

impl TestApp {
    pub async fn new() -> Self {
        Self::with_seed(true).await
    }

    pub async fn empty() -> Self {
        Self::with_seed(false).await
    }

    async fn with_seed(seed_demo_data: bool) -> Self {
        let ctx = Arc::new(test_config(seed_demo_data).to_context().await.unwrap());
        let router = build_router(ctx.clone());
        Self { ctx, router }
    }

    pub async fn send(
        &self,
        method: Method,
        uri: &str,
        token: Option<&str>,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let mut request = Request::builder().method(method).uri(uri);

        if let Some(token) = token {
            request = request.header(header::AUTHORIZATION, format!("Bearer {}", token));
        }

        let request = match body {
            Some(body) => request
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
            None => request.body(Body::empty()).unwrap(),
        };

        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);

        (status, body)
    }

    pub async fn get(&self, uri: &str, token: Option<&str>) -> (StatusCode, Value) {
        self.send(Method::GET, uri, token, None).await
    }

    pub async fn post(&self, uri: &str, token: Option<&str>, body: Value) -> (StatusCode, Value) {
        self.send(Method::POST, uri, token, Some(body)).await
    }

    pub async fn put(&self, uri: &str, token: Option<&str>, body: Value) -> (StatusCode, Value) {
        self.send(Method::PUT, uri, token, Some(body)).await
    }

    /// Code currently outstanding for `phone`, read straight from the store.
    pub async fn outstanding_code(&self, phone: &str) -> Option<String> {
        self.ctx.otp.store.get(phone).await.map(|record| record.code)
    }

    /// Runs the request-otp / verify-otp exchange for an existing user.
    pub async fn sign_in(&self, phone: &str) -> String {
        let (status, _) = self
            .post(
                "/api/v1/auth/request-otp",
                None,
                serde_json::json!({ "phone": phone }),
            )
            .await;
        assert_eq!(status, StatusCode::OK);

        let code = self.outstanding_code(phone).await.unwrap();
        let (status, body) = self
            .post(
                "/api/v1/auth/verify-otp",
                None,
                serde_json::json!({ "phone": phone, "otp": code }),
            )
            .await;
        assert_eq!(status, StatusCode::OK);

        body["token"].as_str().unwrap().to_string()
    }

    pub async fn scalar(&self, query: &str) -> i64 {
        sqlx::query_scalar(query)
            .fetch_one(&self.ctx.db_conn.pool)
            .await
            .unwrap()
    }

    pub async fn execute(&self, statement: &str) {
        sqlx::query(statement)
            .execute(&self.ctx.db_conn.pool)
            .await
            .unwrap();
    }

    pub async fn id_of(&self, query: &str) -> String {
        sqlx::query_scalar(query)
            .fetch_one(&self.ctx.db_conn.pool)
            .await
            .unwrap()
    }
}
