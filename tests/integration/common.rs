use axum::{
    Router,
    body::{Body, to_bytes},
    http::{HeaderMap, Method, Request, StatusCode, header},
};
use labdesk::{
    api::{AppState, create_router},
    config::{AppConfig, JwtConfig},
    repositories::MemoryStore,
    services::TokenService,
};
use serde_json::Value;
use std::sync::Arc;
use tower::ServiceExt;

pub const ADMIN_USER: &str = "admin";
pub const ADMIN_PASSWORD: &str = "lab-admin-pass";

pub fn jwt_config() -> JwtConfig {
    JwtConfig {
        key: "integration-test-signing-key-0123456789".to_string(),
        issuer: "labdesk".to_string(),
        audience: "labdesk-clients".to_string(),
    }
}

pub struct Response {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: Value,
}

pub struct TestApp {
    pub router: Router,
    pub state: AppState,
    pub token: String,
}

impl TestApp {
    /// Router over a fresh in-memory store with a logged-in administrator.
    pub async fn spawn() -> Self {
        let store = MemoryStore::new();
        let tokens = Arc::new(TokenService::new(&jwt_config()).expect("valid test key"));
        let state = AppState::new(
            Arc::new(store.clone()),
            Arc::new(store.clone()),
            Arc::new(store),
            tokens,
            AppConfig::default(),
        );

        state
            .auth_service
            .register(
                ADMIN_USER,
                "admin@lab.example",
                ADMIN_PASSWORD,
                vec!["Admin".to_string(), "Lab".to_string()],
            )
            .await
            .expect("register admin");

        let token = state
            .auth_service
            .login(ADMIN_USER, ADMIN_PASSWORD)
            .await
            .expect("login admin")
            .access_token;

        let router = create_router(state.clone());

        TestApp {
            router,
            state,
            token,
        }
    }

    pub async fn send(&self, method: Method, uri: &str, body: Option<Value>) -> Response {
        let auth = format!("Bearer {}", self.token);
        self.send_with_auth(method, uri, body, Some(&auth)).await
    }

    pub async fn send_with_auth(
        &self,
        method: Method,
        uri: &str,
        body: Option<Value>,
        authorization: Option<&str>,
    ) -> Response {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(value) = authorization {
            builder = builder.header(header::AUTHORIZATION, value);
        }

        let request = match body {
            Some(json) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(json.to_string())),
            None => builder.body(Body::empty()),
        }
        .expect("build request");

        self.dispatch(request).await
    }

    /// Send an unparsed body, for requests that are not valid JSON.
    pub async fn send_raw(&self, method: Method, uri: &str, body: &str) -> Response {
        let request = Request::builder()
            .method(method)
            .uri(uri)
            .header(header::AUTHORIZATION, format!("Bearer {}", self.token))
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .expect("build request");

        self.dispatch(request).await
    }

    async fn dispatch(&self, request: Request<Body>) -> Response {
        let response = self
            .router
            .clone()
            .oneshot(request)
            .await
            .expect("router is infallible");

        let status = response.status();
        let headers = response.headers().clone();
        let bytes = to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("read body");
        let body = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap_or(Value::Null)
        };

        Response {
            status,
            headers,
            body,
        }
    }

    pub async fn create_patient(&self, full_name: &str, document_id: &str) -> String {
        let response = self
            .send(
                Method::POST,
                "/api/patients",
                Some(serde_json::json!({
                    "fullName": full_name,
                    "documentId": document_id,
                    "birthDate": "1990-05-17",
                })),
            )
            .await;
        assert_eq!(response.status, StatusCode::CREATED);

        response.body["id"].as_str().expect("patient id").to_string()
    }

    pub async fn create_invoice(&self, patient_id: &str, number: &str, amount: &str) -> Response {
        self.send(
            Method::POST,
            "/api/invoices",
            Some(serde_json::json!({
                "patientId": patient_id,
                "number": number,
                "amount": amount,
                "paid": false,
            })),
        )
        .await
    }
}
