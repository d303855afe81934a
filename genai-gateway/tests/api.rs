//! Router-level tests over the in-memory store and a mock image provider.
//!
//! No MongoDB needed; the video provider is faked with wiremock.

use axum::body::{to_bytes, Body};
use axum::http::{header, Request, StatusCode};
use axum::response::Response;
use axum::Router;
use base64::Engine;
use genai_gateway::config::{ApiyiConfig, GatewayConfig, HttpConfig, MongoConfig};
use genai_gateway::services::providers::{MockImageProvider, ProviderError};
use genai_gateway::services::InMemoryImageStore;
use genai_gateway::{build_router, AppState};
use image::{DynamicImage, ImageFormat, Rgba, RgbaImage};
use serde_json::{json, Value};
use std::io::Cursor;
use std::sync::Arc;
use tower::ServiceExt;
use wiremock::matchers::{body_json as match_body_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn test_config(apiyi_base_url: &str) -> GatewayConfig {
    GatewayConfig {
        common: service_core::config::Config { port: 0 },
        mongodb: MongoConfig {
            uri: "mongodb://unused".to_string(),
            database: "unused".to_string(),
        },
        apiyi: ApiyiConfig {
            api_key: "test-key".to_string(),
            base_url: apiyi_base_url.to_string(),
            image_path: "v1/chat/completions".to_string(),
            image_timeout_secs: 5,
            video_submit_path: "veo/v1/api/video/submit".to_string(),
            video_timeout_secs: 5,
        },
        http: HttpConfig {
            cors_allow_origins: None,
            public_base_url: None,
        },
    }
}

fn png_bytes() -> Vec<u8> {
    let image = RgbaImage::from_fn(24, 16, |x, y| Rgba([x as u8 * 10, y as u8 * 10, 90, 100]));
    let mut buffer = Cursor::new(Vec::new());
    DynamicImage::ImageRgba8(image)
        .write_to(&mut buffer, ImageFormat::Png)
        .expect("Failed to encode PNG");
    buffer.into_inner()
}

fn app_with(provider: MockImageProvider, apiyi_base_url: &str) -> Router {
    let state = AppState::new(
        test_config(apiyi_base_url),
        None,
        Arc::new(provider),
        Arc::new(InMemoryImageStore::new()),
    )
    .expect("Failed to build state");
    build_router(state)
}

fn app(provider: MockImageProvider) -> Router {
    app_with(provider, "http://127.0.0.1:9")
}

fn post_json(uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .expect("Failed to build request")
}

fn get(uri: &str) -> Request<Body> {
    Request::builder()
        .uri(uri)
        .body(Body::empty())
        .expect("Failed to build request")
}

async fn body_bytes(response: Response) -> Vec<u8> {
    to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("Failed to read body")
        .to_vec()
}

async fn body_json(response: Response) -> Value {
    serde_json::from_slice(&body_bytes(response).await).expect("Body is not JSON")
}

#[tokio::test]
async fn health_returns_ok() {
    let response = app(MockImageProvider::returning(Vec::new()))
        .oneshot(get("/api/v1/health"))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await, json!({ "status": "ok" }));
}

#[tokio::test]
async fn generate_then_view_round_trip() {
    let app = app(MockImageProvider::returning(png_bytes()));

    let response = app
        .clone()
        .oneshot(post_json(
            "/api/v1/generateImage/generate",
            json!({ "prompt": "a red apple", "model": "nano-banana-pro" }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = body_json(response).await;
    assert_eq!(body["success"], true);
    let image_id = body["image_id"].as_str().unwrap().to_string();
    assert_eq!(
        body["message"],
        format!("Image saved. View at: /api/v1/generateImage/view/{}", image_id)
    );

    let view = app
        .oneshot(get(&format!("/api/v1/generateImage/view/{}", image_id)))
        .await
        .unwrap();

    assert_eq!(view.status(), StatusCode::OK);
    assert_eq!(view.headers()[header::CONTENT_TYPE], "image/jpeg");
    assert_eq!(
        view.headers()[header::CACHE_CONTROL],
        "public, max-age=31536000, immutable"
    );
    let content_length: usize = view.headers()[header::CONTENT_LENGTH]
        .to_str()
        .unwrap()
        .parse()
        .unwrap();

    let bytes = body_bytes(view).await;
    assert_eq!(bytes.len(), content_length);
    let decoded = image::load_from_memory_with_format(&bytes, ImageFormat::Jpeg).unwrap();
    assert!(!decoded.color().has_alpha());
    assert_eq!((decoded.width(), decoded.height()), (24, 16));
}

#[tokio::test]
async fn model_defaults_to_nano_banana_pro() {
    let app = app(MockImageProvider::returning(png_bytes()));

    let response = app
        .clone()
        .oneshot(post_json(
            "/api/v1/generateImage/generate",
            json!({ "prompt": "a cat" }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let listed = body_json(app.oneshot(get("/api/v1/generateImage")).await.unwrap()).await;
    assert_eq!(listed["count"], 1);
    assert_eq!(listed["images"][0]["model"], "nano-banana-pro");
    assert_eq!(listed["images"][0]["prompt"], "a cat");
}

#[tokio::test]
async fn view_unknown_or_malformed_id_is_404() {
    let app = app(MockImageProvider::returning(png_bytes()));

    for id in ["not-an-id", "65f0c0ffee0000000000beef"] {
        let response = app
            .clone()
            .oneshot(get(&format!("/api/v1/generateImage/view/{}", id)))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }
}

#[tokio::test]
async fn empty_prompt_is_rejected() {
    let provider = MockImageProvider::returning(png_bytes());
    let response = app(provider)
        .oneshot(post_json(
            "/api/v1/generateImage/generate",
            json!({ "prompt": "" }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn provider_api_error_is_502_with_detail() {
    let app = app(MockImageProvider::failing(ProviderError::Api(
        "model overloaded".to_string(),
    )));

    let response = app
        .clone()
        .oneshot(post_json(
            "/api/v1/generateImage/generate",
            json!({ "prompt": "x" }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
    let body = body_json(response).await;
    assert!(body["error"]
        .as_str()
        .unwrap()
        .contains("API error: model overloaded"));

    let listed = body_json(app.oneshot(get("/api/v1/generateImage")).await.unwrap()).await;
    assert_eq!(listed["count"], 0);
}

#[tokio::test]
async fn no_image_in_response_is_502() {
    let response = app(MockImageProvider::failing(ProviderError::NoImageFound))
        .oneshot(post_json(
            "/api/v1/generateImage/generate",
            json!({ "prompt": "x" }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
    let body = body_json(response).await;
    assert!(body["error"]
        .as_str()
        .unwrap()
        .contains("No image found in response"));
}

#[tokio::test]
async fn provider_timeout_is_502() {
    let response = app(MockImageProvider::failing(ProviderError::Timeout(
        "deadline elapsed".to_string(),
    )))
    .oneshot(post_json(
        "/api/v1/generateImage/generate",
        json!({ "prompt": "x" }),
    ))
    .await
    .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
    let body = body_json(response).await;
    assert!(body["error"]
        .as_str()
        .unwrap()
        .contains("deadline elapsed"));
}

#[tokio::test]
async fn undecodable_provider_bytes_are_500_without_detail() {
    let response = app(MockImageProvider::returning(b"definitely not an image".to_vec()))
        .oneshot(post_json(
            "/api/v1/generateImage/generate",
            json!({ "prompt": "x" }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(
        body_json(response).await,
        json!({ "error": "Internal server error" })
    );
}

#[tokio::test]
async fn save_stores_caller_image() {
    let app = app(MockImageProvider::returning(Vec::new()));
    let data_uri = format!(
        "data:image/png;base64,{}",
        base64::engine::general_purpose::STANDARD.encode(png_bytes())
    );

    let response = app
        .clone()
        .oneshot(post_json(
            "/api/v1/generateImage/save",
            json!({ "prompt": "uploaded", "model": "custom", "image_data": data_uri }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = body_json(response).await;
    let image_id = body["image_id"].as_str().unwrap();
    assert_eq!(
        body["view_url"],
        format!("/api/v1/generateImage/view/{}", image_id)
    );

    let view = app
        .oneshot(get(&format!("/api/v1/generateImage/view/{}", image_id)))
        .await
        .unwrap();
    assert_eq!(view.status(), StatusCode::OK);
    assert_eq!(view.headers()[header::CONTENT_TYPE], "image/jpeg");
}

#[tokio::test]
async fn save_with_invalid_base64_is_400() {
    let response = app(MockImageProvider::returning(Vec::new()))
        .oneshot(post_json(
            "/api/v1/generateImage/save",
            json!({ "prompt": "p", "image_data": "%%%not base64%%%" }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn list_respects_limit_and_order() {
    let app = app(MockImageProvider::returning(png_bytes()));

    for prompt in ["first", "second", "third"] {
        let response = app
            .clone()
            .oneshot(post_json(
                "/api/v1/generateImage/generate",
                json!({ "prompt": prompt }),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        tokio::time::sleep(std::time::Duration::from_millis(5)).await;
    }

    let listed = body_json(
        app.oneshot(get("/api/v1/generateImage?limit=2"))
            .await
            .unwrap(),
    )
    .await;

    assert_eq!(listed["success"], true);
    assert_eq!(listed["count"], 2);
    assert_eq!(listed["images"][0]["prompt"], "third");
    assert_eq!(listed["images"][1]["prompt"], "second");
    assert!(listed["images"][0].get("image_data").is_none());
}

#[tokio::test]
async fn responses_carry_request_id() {
    let response = app(MockImageProvider::returning(Vec::new()))
        .oneshot(
            Request::builder()
                .uri("/api/v1/health")
                .header("x-request-id", "req-123")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.headers()["x-request-id"], "req-123");
}

#[tokio::test]
async fn video_submission_forwards_payload_and_status() {
    let provider = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/veo/v1/api/video/submit"))
        .and(match_body_json(json!({
            "prompt": "ocean waves",
            "model": "veo3",
            "images": [],
            "enhance_prompt": true,
            "aspect_ratio": "16:9"
        })))
        .respond_with(ResponseTemplate::new(202).set_body_json(json!({ "task_id": "t-42" })))
        .expect(1)
        .mount(&provider)
        .await;

    let response = app_with(MockImageProvider::returning(Vec::new()), &provider.uri())
        .oneshot(post_json(
            "/api/v1/videos/easy-mode",
            json!({ "prompt": "ocean waves", "aspect_ratio": "16:9", "seed": null }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::ACCEPTED);
    assert_eq!(
        body_json(response).await,
        json!({ "provider": "apiyi", "status_code": 202, "data": { "task_id": "t-42" } })
    );
}

#[tokio::test]
async fn video_null_images_is_rejected_without_forwarding() {
    let provider = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
        .expect(0)
        .mount(&provider)
        .await;

    let response = app_with(MockImageProvider::returning(Vec::new()), &provider.uri())
        .oneshot(post_json(
            "/api/v1/videos/easy-mode",
            json!({ "prompt": "x", "images": null }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn video_upstream_error_is_502_with_provider_status() {
    let provider = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(500).set_body_json(json!({ "error": "boom" })))
        .mount(&provider)
        .await;

    let response = app_with(MockImageProvider::returning(Vec::new()), &provider.uri())
        .oneshot(post_json(
            "/api/v1/videos/easy-mode",
            json!({ "prompt": "x" }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
    let body = body_json(response).await;
    assert_eq!(body["details"]["provider_status"], 500);
    assert_eq!(body["details"]["provider_response"]["error"], "boom");
}

#[tokio::test]
async fn video_html_response_is_502_with_body_prefix() {
    let provider = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(
            ResponseTemplate::new(200).set_body_raw("<html>login</html>", "text/html"),
        )
        .mount(&provider)
        .await;

    let response = app_with(MockImageProvider::returning(Vec::new()), &provider.uri())
        .oneshot(post_json(
            "/api/v1/videos/easy-mode",
            json!({ "prompt": "x" }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
    let body = body_json(response).await;
    assert_eq!(body["details"]["provider_body_prefix"], "<html>login</html>");
    assert_eq!(body["details"]["provider_content_type"], "text/html");
}

#[tokio::test]
async fn metrics_endpoint_serves_prometheus_text() {
    genai_gateway::services::metrics::init_metrics();

    let app = app(MockImageProvider::returning(png_bytes()));
    let _ = app
        .clone()
        .oneshot(post_json(
            "/api/v1/generateImage/generate",
            json!({ "prompt": "metered" }),
        ))
        .await
        .unwrap();

    let response = app.oneshot(get("/metrics")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let text = String::from_utf8(body_bytes(response).await).unwrap();
    assert!(text.contains("image_generations_total"));
    assert!(text.contains("http_requests_total"));
}
