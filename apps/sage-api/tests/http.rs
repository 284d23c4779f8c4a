use axum::{
	Router,
	body::{self, Body},
	http::{Request, StatusCode, header::CONTENT_TYPE},
};
use serde_json::{Map, Value};
use tower::util::ServiceExt;

use sage_api::{routes, state::AppState};
use sage_config::{
	ArticleStoreConfig, Config, GenerationProviderConfig, Search, Service, Stream,
};

fn test_config(enabled: bool) -> Config {
	Config {
		service: Service {
			http_bind: "127.0.0.1:0".to_string(),
			log_level: "info".to_string(),
			enabled,
			debug: false,
		},
		// Nothing listens on port 1, so provider calls fail fast and the
		// service exercises its fallback paths without any network.
		generation: GenerationProviderConfig {
			provider_id: "test".to_string(),
			api_base: "http://127.0.0.1:1".to_string(),
			api_key: "test-key".to_string(),
			path: "/chat/completions".to_string(),
			model: "test-model".to_string(),
			max_tokens: 256,
			temperature: 0.7,
			timeout_ms: 1_000,
			default_headers: Map::new(),
		},
		articles: ArticleStoreConfig {
			api_base: "http://127.0.0.1:1".to_string(),
			path: "/api/articles/all".to_string(),
			timeout_ms: 1_000,
			cache_ttl_secs: 300,
		},
		search: Search { relevance_threshold: 0.05, default_limit: 3 },
		stream: Stream { delay_min_ms: 0, delay_max_ms: 0 },
	}
}

fn test_app(enabled: bool) -> Router {
	routes::router(AppState::new(test_config(enabled)))
}

fn json_request(uri: &str, method: &str, payload: Value) -> Request<Body> {
	Request::builder()
		.method(method)
		.uri(uri)
		.header(CONTENT_TYPE, "application/json")
		.body(Body::from(payload.to_string()))
		.expect("Failed to build request.")
}

async fn json_body(response: axum::response::Response) -> Value {
	let bytes = body::to_bytes(response.into_body(), usize::MAX)
		.await
		.expect("Failed to read response body.");

	serde_json::from_slice(&bytes).expect("Failed to parse response body.")
}

#[tokio::test]
async fn health_ok() {
	let app = test_app(true);
	let response = app
		.oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
		.await
		.expect("Failed to call /health.");

	assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn missing_query_is_bad_request() {
	let app = test_app(true);
	let response = app
		.oneshot(json_request("/api/chat", "POST", serde_json::json!({})))
		.await
		.expect("Failed to call /api/chat.");

	assert_eq!(response.status(), StatusCode::BAD_REQUEST);

	let json = json_body(response).await;

	assert_eq!(json["error"], "Query is required");
	assert!(json["reply"].as_str().is_some_and(|reply| !reply.is_empty()));
}

#[tokio::test]
async fn disabled_service_returns_503() {
	let app = test_app(false);
	let response = app
		.oneshot(json_request("/api/chat", "POST", serde_json::json!({ "query": "你好" })))
		.await
		.expect("Failed to call /api/chat.");

	assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);

	let json = json_body(response).await;

	assert!(json["reply"].as_str().is_some_and(|reply| reply.contains("禁用")));
}

#[tokio::test]
async fn chat_degrades_to_fallback_reply() {
	let app = test_app(true);
	let response = app
		.oneshot(json_request("/api/chat", "POST", serde_json::json!({ "query": "你好" })))
		.await
		.expect("Failed to call /api/chat.");

	assert_eq!(response.status(), StatusCode::OK);

	let json = json_body(response).await;

	assert_eq!(json["topic"], "general");
	assert!(json["reply"].as_str().is_some_and(|reply| !reply.is_empty()));

	let confidence = json["confidence"].as_f64().expect("confidence missing");

	assert!((0.3..0.31).contains(&confidence));
	assert!(json["processingTime"].as_u64().is_some());
}

#[tokio::test]
async fn history_tracks_and_clears() {
	let app = test_app(true);

	app.clone()
		.oneshot(json_request("/api/chat", "POST", serde_json::json!({ "query": "你好" })))
		.await
		.expect("Failed to call /api/chat.");

	let response = app
		.clone()
		.oneshot(Request::builder().uri("/api/chat/history").body(Body::empty()).unwrap())
		.await
		.expect("Failed to call history.");
	let json = json_body(response).await;

	assert_eq!(json["count"], 1);
	assert_eq!(json["stats"]["conversationCount"], 1);
	assert_eq!(json["history"][0]["query"], "你好");

	let response = app
		.clone()
		.oneshot(
			Request::builder()
				.method("DELETE")
				.uri("/api/chat/history")
				.body(Body::empty())
				.unwrap(),
		)
		.await
		.expect("Failed to clear history.");

	assert_eq!(response.status(), StatusCode::OK);

	let response = app
		.oneshot(Request::builder().uri("/api/chat/history").body(Body::empty()).unwrap())
		.await
		.expect("Failed to call history.");
	let json = json_body(response).await;

	assert_eq!(json["count"], 0);
}

#[tokio::test]
async fn status_echoes_config_without_secrets() {
	let app = test_app(true);
	let response = app
		.oneshot(Request::builder().uri("/api/chat/status").body(Body::empty()).unwrap())
		.await
		.expect("Failed to call status.");

	assert_eq!(response.status(), StatusCode::OK);

	let json = json_body(response).await;

	assert_eq!(json["status"], "online");
	assert_eq!(json["config"]["maxTokens"], 256);
	assert!(json["config"].get("apiKey").is_none());
	assert!(json["statistics"]["conversationCount"].is_number());
}

#[tokio::test]
async fn stream_frames_are_ordered_and_reassemble_the_reply() {
	let app = test_app(true);
	let response = app
		.clone()
		.oneshot(json_request(
			"/api/chat/stream",
			"POST",
			serde_json::json!({ "query": "如何学习 React？" }),
		))
		.await
		.expect("Failed to call /api/chat/stream.");

	assert_eq!(response.status(), StatusCode::OK);
	assert!(
		response
			.headers()
			.get(CONTENT_TYPE)
			.is_some_and(|value| value.to_str().unwrap_or("").starts_with("text/event-stream"))
	);

	let bytes = body::to_bytes(response.into_body(), usize::MAX)
		.await
		.expect("Failed to read stream body.");
	let body_text = String::from_utf8(bytes.to_vec()).expect("Stream body must be UTF-8.");
	let frames: Vec<Value> = body_text
		.split("\n\n")
		.filter(|frame| !frame.trim().is_empty())
		.map(|frame| {
			let data = frame
				.lines()
				.filter_map(|line| line.strip_prefix("data: "))
				.collect::<Vec<_>>()
				.join("\n");

			serde_json::from_str(&data).expect("Frame must be JSON.")
		})
		.collect();

	assert!(frames.len() >= 2, "expected start + terminal frames, got {frames:?}");
	assert_eq!(frames.first().map(|f| f["type"].as_str()), Some(Some("start")));
	assert_eq!(frames.last().map(|f| f["type"].as_str()), Some(Some("end")));

	let reassembled: String = frames
		.iter()
		.filter(|frame| frame["type"] == "chunk")
		.filter_map(|frame| frame["content"].as_str())
		.collect();

	// Interior frames are all chunks.
	for frame in &frames[1..frames.len() - 1] {
		assert_eq!(frame["type"], "chunk");
	}

	let history = app
		.oneshot(Request::builder().uri("/api/chat/history").body(Body::empty()).unwrap())
		.await
		.expect("Failed to call history.");
	let json = json_body(history).await;
	let recorded_reply =
		json["history"][0]["reply"].as_str().expect("history reply missing").to_string();

	assert_eq!(reassembled, recorded_reply);
	assert_eq!(frames.last().unwrap()["metadata"]["topic"], "programming");
}

#[tokio::test]
async fn stream_rejects_missing_query_as_json() {
	let app = test_app(true);
	let response = app
		.oneshot(json_request("/api/chat/stream", "POST", serde_json::json!({})))
		.await
		.expect("Failed to call /api/chat/stream.");

	assert_eq!(response.status(), StatusCode::BAD_REQUEST);

	let json = json_body(response).await;

	assert_eq!(json["error"], "Query is required");
}
