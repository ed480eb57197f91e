use super::handlers::AppState;
use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Extension, Router,
};
use std::sync::Arc;
use tower_http::cors::CorsLayer;

pub fn api_routes() -> Router {
    Router::new()
        .route("/sample", post(super::handlers::sample))
        .route("/sample/upload", post(super::handlers::sample_upload))
        .route("/health", get(super::handlers::health_check))
}

pub fn app(state: Arc<AppState>) -> Router {
    let body_limit = state.config.body_limit();

    Router::new()
        .nest("/api", api_routes())
        .layer(Extension(state))
        .layer(CorsLayer::permissive())
        .layer(DefaultBodyLimit::max(body_limit))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::protocol::SamplingResponse;
    use axum::{
        body::{to_bytes, Body},
        http::{header, Request, StatusCode},
    };
    use base64::Engine;
    use serde_json::json;
    use tower::ServiceExt;

    fn app_with_limit(max_file_size: usize) -> Router {
        let config = Config {
            sample_seed: Some(17),
            max_file_size,
            ..Config::default()
        };
        app(Arc::new(AppState::new(config)))
    }

    fn test_app() -> Router {
        app_with_limit(4096)
    }

    fn multipart_body(boundary: &str, file: &str) -> String {
        let mut body = String::new();
        for (name, value) in [
            ("hasHeader", "true"),
            ("sizePolicyKind", "percentage"),
            ("sizePolicyValue", "50"),
        ] {
            body.push_str(&format!(
                "--{boundary}\r\nContent-Disposition: form-data; name=\"{name}\"\r\n\r\n{value}\r\n"
            ));
        }
        body.push_str(&format!(
            "--{boundary}\r\nContent-Disposition: form-data; name=\"file\"; filename=\"rows.csv\"\r\nContent-Type: text/csv\r\n\r\n{file}\r\n--{boundary}--\r\n"
        ));
        body
    }

    fn multipart_request(boundary: &str, body: String) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri("/api/sample/upload")
            .header(
                header::CONTENT_TYPE,
                format!("multipart/form-data; boundary={boundary}"),
            )
            .body(Body::from(body))
            .unwrap()
    }

    async fn call(app: Router, request: Request<Body>) -> (StatusCode, SamplingResponse) {
        let response = app.oneshot(request).await.unwrap();
        let status = response.status();
        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&body).unwrap())
    }

    fn json_request(body: serde_json::Value) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri("/api/sample")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    fn encode(text: &str) -> String {
        base64::engine::general_purpose::STANDARD.encode(text)
    }

    #[tokio::test]
    async fn json_sampling_succeeds() {
        let body = json!({
            "fileBytesBase64": encode("h1,h2\n1,a\n2,b\n3,c\n4,d"),
            "fileName": "data.csv",
            "hasHeader": true,
            "sizePolicyKind": "number",
            "sizePolicyValue": 2,
        });

        let (status, response) = call(test_app(), json_request(body)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(response.error, "");
        assert_eq!(response.array.len(), 2);
        assert_eq!(response.headers, vec!["h1", "h2"]);
        assert!(!response.csv_content_base64.is_empty());
    }

    #[tokio::test]
    async fn errors_use_the_response_shape() {
        let body = json!({
            "fileBytesBase64": encode("h1,h2\n1\n2,b"),
            "fileName": "data.csv",
            "hasHeader": true,
            "sizePolicyKind": "percentage",
            "sizePolicyValue": 50,
        });

        let (status, response) = call(test_app(), json_request(body)).await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert!(response.error.starts_with("Malformed"));
        assert!(response.array.is_empty());
    }

    #[tokio::test]
    async fn unparsable_body_is_invalid_input() {
        let request = Request::builder()
            .method("POST")
            .uri("/api/sample")
            .body(Body::from("{not json"))
            .unwrap();

        let (status, response) = call(test_app(), request).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(response.error.starts_with("Invalid input"));
    }

    #[tokio::test]
    async fn oversized_file_is_rejected() {
        let big = "x\n".repeat(4000);
        let body = json!({
            "fileBytesBase64": encode(&big),
            "fileName": "big.csv",
            "hasHeader": false,
            "sizePolicyKind": "number",
            "sizePolicyValue": 1,
        });

        let (status, response) = call(test_app(), json_request(body)).await;
        assert_eq!(status, StatusCode::PAYLOAD_TOO_LARGE);
        assert!(response.error.starts_with("File too large"));
    }

    #[tokio::test]
    async fn multipart_upload_samples_raw_bytes() {
        let boundary = "XBOUNDARYX";
        let request = multipart_request(boundary, multipart_body(boundary, "id\n1\n2\n3\n4"));

        let (status, response) = call(test_app(), request).await;
        assert_eq!(status, StatusCode::OK, "error: {}", response.error);
        assert_eq!(response.headers, vec!["id"]);
        assert_eq!(response.array.len(), 2);
    }

    #[tokio::test]
    async fn body_over_transport_limit_is_too_large() {
        let body = json!({
            "fileBytesBase64": "A".repeat(200 * 1024),
            "fileName": "big.csv",
            "hasHeader": false,
            "sizePolicyKind": "number",
            "sizePolicyValue": 1,
        });

        let (status, response) = call(app_with_limit(16), json_request(body)).await;
        assert_eq!(status, StatusCode::PAYLOAD_TOO_LARGE);
        assert!(response.error.starts_with("File too large"));
        assert!(response.array.is_empty());
    }

    #[tokio::test]
    async fn oversized_multipart_file_is_too_large() {
        let boundary = "XBOUNDARYX";
        let file = "x\n".repeat(100 * 1024);
        let request = multipart_request(boundary, multipart_body(boundary, &file));

        let (status, response) = call(app_with_limit(16), request).await;
        assert_eq!(status, StatusCode::PAYLOAD_TOO_LARGE);
        assert!(response.error.starts_with("File too large"));
    }

    #[tokio::test]
    async fn upload_without_multipart_body_is_invalid_input() {
        let request = Request::builder()
            .method("POST")
            .uri("/api/sample/upload")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from("{}"))
            .unwrap();

        let (status, response) = call(test_app(), request).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(response.error.starts_with("Invalid input"));
        assert!(response.array.is_empty());
    }

    #[tokio::test]
    async fn unknown_format_tag_is_unsupported_media_type() {
        let body = json!({
            "fileBytesBase64": encode("h1,h2\n1,a"),
            "fileName": "data.csv",
            "hasHeader": true,
            "sizePolicyKind": "number",
            "sizePolicyValue": 1,
            "format": "pdf",
        });

        let (status, response) = call(test_app(), json_request(body)).await;
        assert_eq!(status, StatusCode::UNSUPPORTED_MEDIA_TYPE);
        assert!(response.error.starts_with("Unsupported format"));
    }

    #[tokio::test]
    async fn health_reports_status() {
        let request = Request::builder()
            .uri("/api/health")
            .body(Body::empty())
            .unwrap();
        let response = test_app().oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let value: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(value["status"], "healthy");
    }
}
