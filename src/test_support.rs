use std::sync::Arc;

use axum::{
    body::{to_bytes, Body},
    http::Request,
    response::Response,
    Router,
};
use serde_json::Value;

use crate::{
    app::build_app,
    profiles::repo::memory::MemoryProfileRepo,
    state::AppState,
    storage::fake::FakeImageHost,
    users::repo::memory::MemoryUserRepo,
};

/// `AppState` over in-memory stores, with handles on the concrete fakes.
pub struct TestContext {
    pub state: AppState,
    pub users: Arc<MemoryUserRepo>,
    pub profiles: Arc<MemoryProfileRepo>,
    pub images: Arc<FakeImageHost>,
}

impl TestContext {
    pub fn new() -> Self {
        let users = Arc::new(MemoryUserRepo::default());
        let profiles = Arc::new(MemoryProfileRepo::default());
        let images = Arc::new(FakeImageHost::default());
        let state = AppState::from_parts(
            Arc::new(AppState::fake_config()),
            users.clone(),
            profiles.clone(),
            images.clone(),
        );
        Self {
            state,
            users,
            profiles,
            images,
        }
    }

    pub fn app(&self) -> Router {
        build_app(self.state.clone())
    }
}

pub async fn json_body(res: Response) -> Value {
    let bytes = to_bytes(res.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

pub fn json_request(method: &str, uri: &str, token: Option<&str>, body: Value) -> Request<Body> {
    let mut builder = Request::builder()
        .method(method)
        .uri(uri)
        .header("content-type", "application/json");
    if let Some(token) = token {
        builder = builder.header("authorization", format!("Bearer {token}"));
    }
    builder.body(Body::from(body.to_string())).unwrap()
}

pub fn get(uri: &str, token: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder().method("GET").uri(uri);
    if let Some(token) = token {
        builder = builder.header("authorization", format!("Bearer {token}"));
    }
    builder.body(Body::empty()).unwrap()
}

pub const BOUNDARY: &str = "folio-test-boundary";

/// Multipart body with a single file part named `field`.
pub fn multipart_request(uri: &str, token: &str, field: &str, bytes: &[u8]) -> Request<Body> {
    let mut body = Vec::new();
    body.extend_from_slice(format!("--{BOUNDARY}\r\n").as_bytes());
    body.extend_from_slice(
        format!(
            "Content-Disposition: form-data; name=\"{field}\"; filename=\"me.png\"\r\n\
             Content-Type: image/png\r\n\r\n"
        )
        .as_bytes(),
    );
    body.extend_from_slice(bytes);
    body.extend_from_slice(format!("\r\n--{BOUNDARY}--\r\n").as_bytes());

    Request::builder()
        .method("POST")
        .uri(uri)
        .header("authorization", format!("Bearer {token}"))
        .header(
            "content-type",
            format!("multipart/form-data; boundary={BOUNDARY}"),
        )
        .body(Body::from(body))
        .unwrap()
}
