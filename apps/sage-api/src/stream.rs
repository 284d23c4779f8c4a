use std::convert::Infallible;

use axum::Json;
use axum::extract::State;
use axum::response::{
	IntoResponse, Response,
	sse::{Event, Sse},
};
use rand::Rng;
use tokio::sync::mpsc;
use tokio_stream::wrappers::UnboundedReceiverStream;

use sage_stream::{StreamMessage, StreamMetadata, chunk_reply};

use crate::{
	routes::{ApiError, ChatRequest},
	state::AppState,
};

const THINKING_PLACEHOLDER: &str = "正在思考中...";
const STREAM_APOLOGY: &str = "抱歉，服务暂时不可用。请稍后再试。";

/// SSE variant of the chat endpoint: one `start` frame, paced `chunk`
/// frames in chunker order, then a terminal `end` or `error` frame.
/// Configuration problems are rejected up front as plain JSON, before any
/// stream is opened.
pub async fn chat_stream(
	State(state): State<AppState>,
	Json(payload): Json<ChatRequest>,
) -> Result<Response, ApiError> {
	if !state.service.cfg.service.enabled {
		return Err(sage_service::ServiceError::Disabled.into());
	}
	if state.service.cfg.generation.api_key.is_empty() {
		return Err(sage_service::ServiceError::MissingApiKey.into());
	}
	let Some(query) = payload.query else {
		return Err(ApiError::missing_query());
	};

	let (tx, rx) = mpsc::unbounded_channel::<Result<Event, Infallible>>();
	let service = state.service.clone();
	let (delay_min, delay_max) =
		(state.service.cfg.stream.delay_min_ms, state.service.cfg.stream.delay_max_ms);

	tokio::spawn(async move {
		send_frame(&tx, &StreamMessage::Start { content: THINKING_PLACEHOLDER.to_string() });

		match service.process_query(&query).await {
			Ok(outcome) => {
				let chunks = chunk_reply(&outcome.reply);

				tracing::debug!(
					chunk_count = chunks.len(),
					reply_chars = outcome.reply.chars().count(),
					"Streaming chunked reply."
				);

				for chunk in chunks {
					if !send_frame(&tx, &StreamMessage::Chunk { content: chunk }) {
						// Receiver gone: the client went away. Stop quietly.
						tracing::debug!("Stream receiver dropped; ending early.");

						return;
					}

					pace(delay_min, delay_max).await;
				}

				send_frame(&tx, &StreamMessage::End {
					metadata: StreamMetadata {
						topic: outcome.topic.as_str().to_string(),
						confidence: outcome.confidence,
						processing_time: outcome.processing_time,
					},
				});
			},
			Err(err) => {
				tracing::error!(error = %err, "Chat stream failed before any chunk.");

				send_frame(&tx, &StreamMessage::Error { content: STREAM_APOLOGY.to_string() });
			},
		}
	});

	Ok(Sse::new(UnboundedReceiverStream::new(rx)).into_response())
}

/// Encodes and sends one frame. An encoding failure skips the frame and
/// keeps the stream alive; only a closed channel stops it. Returns whether
/// the receiver is still listening.
fn send_frame(
	tx: &mpsc::UnboundedSender<Result<Event, Infallible>>,
	message: &StreamMessage,
) -> bool {
	let payload = match serde_json::to_string(message) {
		Ok(payload) => payload,
		Err(err) => {
			tracing::warn!(error = %err, "Skipping unencodable stream frame.");

			return true;
		},
	};

	tx.send(Ok(Event::default().data(payload))).is_ok()
}

async fn pace(delay_min: u64, delay_max: u64) {
	if delay_max == 0 {
		return;
	}

	let delay = rand::thread_rng().gen_range(delay_min..=delay_max);

	tokio::time::sleep(std::time::Duration::from_millis(delay)).await;
}
