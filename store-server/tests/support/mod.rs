//! Shared helpers for the HTTP integration tests
//!
//! Every test boots the full server state against a throwaway work
//! directory and pushes requests through the real middleware stack
//! with oneshot calls; no port is ever bound.

#![allow(dead_code)]

use axum::Router;
use axum::body::Body;
use http::{Method, Request, Response, header};
use serde_json::Value;
use tempfile::TempDir;

use store_server::db::models::{ProductCreate, UserCreate, UserRole};
use store_server::db::repository::{OrderRepository, ProductRepository, UserRepository};
use store_server::routes::{OneshotRouter, build_app};
use store_server::{Config, ServerState};

/// Multipart boundary used by every [`MultipartForm`]
const BOUNDARY: &str = "bloom-integration-test-boundary";

/// A seeded account with a freshly minted token
pub struct TestUser {
    pub id: String,
    pub token: String,
}

/// A booted server: throwaway work dir, full state, routed app
pub struct TestServer {
    pub state: ServerState,
    app: Router<ServerState>,
    // Keeps the work dir alive for the lifetime of the server
    _work_dir: TempDir,
}

impl TestServer {
    /// Initialize state and middleware against a fresh temp directory
    pub async fn start() -> Self {
        let work_dir = tempfile::tempdir().expect("create work dir");
        let config = Config::with_overrides(work_dir.path().to_string_lossy(), 0);
        let state = ServerState::initialize(&config).await;
        let app = build_app(&state);
        Self {
            state,
            app,
            _work_dir: work_dir,
        }
    }

    /// Create an account directly in the repository and mint a token for it
    pub async fn seed_user(&self, name: &str, email: &str, role: UserRole) -> TestUser {
        let repo = UserRepository::new(self.state.get_db());
        let user = repo
            .create(
                UserCreate {
                    name: name.to_string(),
                    email: email.to_string(),
                    password: "secret123".to_string(),
                },
                role,
            )
            .await
            .expect("seed user");
        let id = user.id.expect("seeded user has an id").to_string();
        let token = self
            .state
            .jwt_service
            .generate_token(&id, email, role.as_str())
            .expect("mint token");
        TestUser { id, token }
    }

    /// Put a product on the shelf and return its record id as a string
    pub async fn seed_product(&self, name: &str, price: f64, stock: i64) -> String {
        let repo = ProductRepository::new(self.state.get_db());
        let product = repo
            .create(ProductCreate {
                name: name.to_string(),
                theme: Some("roses".to_string()),
                price,
                stock,
                status: None,
                cod_available: Some(true),
                description: None,
                image_url: None,
            })
            .await
            .expect("seed product");
        product.id.expect("seeded product has an id").to_string()
    }

    /// Current stock level of a product
    pub async fn product_stock(&self, id: &str) -> i64 {
        ProductRepository::new(self.state.get_db())
            .find_by_id(id)
            .await
            .expect("read product")
            .expect("product exists")
            .stock
    }

    /// Total number of persisted orders
    pub async fn order_count(&self) -> i64 {
        OrderRepository::new(self.state.get_db())
            .count_all()
            .await
            .expect("count orders")
    }

    /// Push a request through the full middleware stack
    pub async fn request(&self, request: Request<Body>) -> Response<Body> {
        let mut app = self.app.clone();
        app.oneshot(&self.state, request)
            .await
            .expect("oneshot call")
    }

    pub async fn get(&self, path: &str, token: Option<&str>) -> Response<Body> {
        let request = builder(Method::GET, path, token)
            .body(Body::empty())
            .expect("build request");
        self.request(request).await
    }

    pub async fn delete(&self, path: &str, token: Option<&str>) -> Response<Body> {
        let request = builder(Method::DELETE, path, token)
            .body(Body::empty())
            .expect("build request");
        self.request(request).await
    }

    pub async fn send_json(
        &self,
        method: Method,
        path: &str,
        token: Option<&str>,
        body: Value,
    ) -> Response<Body> {
        let request = builder(method, path, token)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .expect("build request");
        self.request(request).await
    }

    pub async fn send_multipart(
        &self,
        method: Method,
        path: &str,
        token: Option<&str>,
        form: MultipartForm,
    ) -> Response<Body> {
        let request = builder(method, path, token)
            .header(header::CONTENT_TYPE, form.content_type())
            .body(form.into_body())
            .expect("build request");
        self.request(request).await
    }

    /// Submit a checkout form to POST /api/orders
    pub async fn checkout(&self, token: Option<&str>, form: MultipartForm) -> Response<Body> {
        self.send_multipart(Method::POST, "/api/orders", token, form)
            .await
    }
}

fn builder(method: Method, path: &str, token: Option<&str>) -> http::request::Builder {
    let mut builder = Request::builder().method(method).uri(path);
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
    }
    builder
}

/// Read and parse a JSON response body
pub async fn body_json(response: Response<Body>) -> Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("read response body");
    serde_json::from_slice(&bytes).expect("response body is JSON")
}

/// Hand-rolled multipart/form-data body
#[derive(Default)]
pub struct MultipartForm {
    parts: Vec<u8>,
}

impl MultipartForm {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn text(mut self, name: &str, value: &str) -> Self {
        self.parts
            .extend_from_slice(format!("--{}\r\n", BOUNDARY).as_bytes());
        self.parts.extend_from_slice(
            format!("Content-Disposition: form-data; name=\"{}\"\r\n\r\n", name).as_bytes(),
        );
        self.parts.extend_from_slice(value.as_bytes());
        self.parts.extend_from_slice(b"\r\n");
        self
    }

    pub fn file(mut self, name: &str, filename: &str, content_type: &str, data: &[u8]) -> Self {
        self.parts
            .extend_from_slice(format!("--{}\r\n", BOUNDARY).as_bytes());
        self.parts.extend_from_slice(
            format!(
                "Content-Disposition: form-data; name=\"{}\"; filename=\"{}\"\r\nContent-Type: {}\r\n\r\n",
                name, filename, content_type
            )
            .as_bytes(),
        );
        self.parts.extend_from_slice(data);
        self.parts.extend_from_slice(b"\r\n");
        self
    }

    fn content_type(&self) -> String {
        format!("multipart/form-data; boundary={}", BOUNDARY)
    }

    fn into_body(mut self) -> Body {
        self.parts
            .extend_from_slice(format!("--{}--\r\n", BOUNDARY).as_bytes());
        Body::from(self.parts)
    }
}

/// A checkout form with the standard shipping fields filled in
pub fn checkout_form(payment_method: &str, items_json: &str) -> MultipartForm {
    MultipartForm::new()
        .text("name", "Jane Doe")
        .text("email", "jane@example.com")
        .text("address", "Calle 12 #3-45")
        .text("city", "Bogota")
        .text("postalCode", "110111")
        .text("phone", "3001234567")
        .text("paymentMethod", payment_method)
        .text("items", items_json)
}

/// Cart JSON for a single product line
pub fn one_line_cart(product_id: &str, quantity: i64) -> String {
    format!(
        r#"[{{"product":"{}","quantity":{}}}]"#,
        product_id, quantity
    )
}
