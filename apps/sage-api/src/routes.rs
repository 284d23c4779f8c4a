use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use sage_service::{ConversationEntry, ConversationStats, ServiceError};

use crate::{selftest, state::AppState, stream};

pub fn router(state: AppState) -> Router {
	Router::new()
		.route("/health", get(health))
		.route("/api/chat", post(chat))
		.route("/api/chat/stream", post(stream::chat_stream))
		.route("/api/chat/history", get(history).delete(clear_history))
		.route("/api/chat/status", get(status))
		.route("/api/chat/test", get(selftest::run_suite).post(selftest::run_single))
		.with_state(state)
}

async fn health() -> StatusCode {
	StatusCode::OK
}

#[derive(Debug, Deserialize)]
pub struct ChatRequest {
	pub query: Option<String>,
	#[serde(default)]
	pub context: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ChatResponse {
	reply: String,
	#[serde(with = "sage_service::time_serde")]
	timestamp: OffsetDateTime,
	topic: String,
	confidence: f32,
	processing_time: u64,
}

async fn chat(
	State(state): State<AppState>,
	Json(payload): Json<ChatRequest>,
) -> Result<Json<ChatResponse>, ApiError> {
	let Some(query) = payload.query else {
		return Err(ApiError::missing_query());
	};
	let outcome = state.service.process_query(&query).await?;

	Ok(Json(ChatResponse {
		reply: outcome.reply,
		timestamp: OffsetDateTime::now_utc(),
		topic: outcome.topic.as_str().to_string(),
		confidence: outcome.confidence,
		processing_time: outcome.processing_time,
	}))
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct HistoryResponse {
	history: Vec<ConversationEntry>,
	stats: ConversationStats,
	count: usize,
	#[serde(with = "sage_service::time_serde")]
	timestamp: OffsetDateTime,
}

async fn history(State(state): State<AppState>) -> Json<HistoryResponse> {
	let history = state.service.history();
	let stats = state.service.stats();
	let count = history.len();

	Json(HistoryResponse { history, stats, count, timestamp: OffsetDateTime::now_utc() })
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ClearHistoryResponse {
	message: &'static str,
	#[serde(with = "sage_service::time_serde")]
	timestamp: OffsetDateTime,
}

async fn clear_history(State(state): State<AppState>) -> Json<ClearHistoryResponse> {
	state.service.clear_history();

	Json(ClearHistoryResponse {
		message: "Conversation history cleared successfully",
		timestamp: OffsetDateTime::now_utc(),
	})
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct StatusResponse {
	service: &'static str,
	status: &'static str,
	version: &'static str,
	config: ConfigEcho,
	features: &'static [&'static str],
	statistics: ConversationStats,
	uptime: u64,
	#[serde(with = "sage_service::time_serde")]
	timestamp: OffsetDateTime,
}

/// Read-only config echo. The API key never appears here.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ConfigEcho {
	enabled: bool,
	model: String,
	max_tokens: u32,
	temperature: f32,
	debug: bool,
}

const FEATURES: &[&str] = &[
	"Multi-topic conversation",
	"Keyword-based article recommendations",
	"Conversation history with statistics",
	"Incremental SSE delivery",
	"Topic detection and confidence scoring",
	"Template fallback on provider failure",
];

async fn status(State(state): State<AppState>) -> Json<StatusResponse> {
	let cfg = &state.service.cfg;

	Json(StatusResponse {
		service: "Sage Chat Service",
		status: if cfg.service.enabled { "online" } else { "disabled" },
		version: sage_cli::VERSION,
		config: ConfigEcho {
			enabled: cfg.service.enabled,
			model: cfg.generation.model.clone(),
			max_tokens: cfg.generation.max_tokens,
			temperature: cfg.generation.temperature,
			debug: cfg.service.debug,
		},
		features: FEATURES,
		statistics: state.service.stats(),
		uptime: state.service.uptime_secs(),
		timestamp: OffsetDateTime::now_utc(),
	})
}

#[derive(Debug, Serialize)]
struct ErrorBody {
	error: String,
	reply: String,
	#[serde(with = "sage_service::time_serde")]
	timestamp: OffsetDateTime,
}

#[derive(Debug)]
pub struct ApiError {
	status: StatusCode,
	error: String,
	reply: String,
}

impl ApiError {
	fn new(status: StatusCode, error: impl Into<String>, reply: impl Into<String>) -> Self {
		Self { status, error: error.into(), reply: reply.into() }
	}

	pub fn missing_query() -> Self {
		Self::new(
			StatusCode::BAD_REQUEST,
			"Query is required",
			"请在请求中提供 query 字段，我才能为你解答。",
		)
	}
}

impl From<ServiceError> for ApiError {
	fn from(err: ServiceError) -> Self {
		match err {
			ServiceError::Disabled => Self::new(
				StatusCode::SERVICE_UNAVAILABLE,
				"Service disabled",
				"智能助手服务当前已禁用。请联系管理员启用服务。",
			),
			ServiceError::MissingApiKey => Self::new(
				StatusCode::SERVICE_UNAVAILABLE,
				"Provider credential missing",
				"生成服务尚未配置访问密钥。请联系管理员完成配置。",
			),
		}
	}
}

impl IntoResponse for ApiError {
	fn into_response(self) -> Response {
		let body = ErrorBody {
			error: self.error,
			reply: self.reply,
			timestamp: OffsetDateTime::now_utc(),
		};
		(self.status, Json(body)).into_response()
	}
}
