use axum::Json;
use axum::extract::State;
use serde::Serialize;
use time::OffsetDateTime;

use crate::{
	routes::{ApiError, ChatRequest},
	state::AppState,
};

/// Canned queries with their expected classifications, kept in sync with
/// the topic trigger tables.
const SUITE: &[(&str, &str)] = &[
	("你好", "general"),
	("如何学习 React？", "programming"),
	("什么是人工智能？", "ai"),
	("帮我分析一下 Next.js 的优势", "programming"),
	// "开发" and "算法" are programming triggers and the table is walked
	// top to bottom, so these land on programming rather than web/ai.
	("Web 开发的最佳实践有哪些？", "programming"),
	("JavaScript 和 TypeScript 的区别", "programming"),
	("机器学习算法有哪些？", "programming"),
	("如何优化网站性能？", "web"),
];

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct CaseResult {
	query: &'static str,
	expected_topic: &'static str,
	#[serde(skip_serializing_if = "Option::is_none")]
	actual_topic: Option<String>,
	#[serde(skip_serializing_if = "Option::is_none")]
	topic_match: Option<bool>,
	#[serde(skip_serializing_if = "Option::is_none")]
	confidence: Option<f32>,
	#[serde(skip_serializing_if = "Option::is_none")]
	reply_chars: Option<usize>,
	#[serde(skip_serializing_if = "Option::is_none")]
	processing_time: Option<u64>,
	success: bool,
	#[serde(skip_serializing_if = "Option::is_none")]
	error: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct SuitePerformance {
	total_tests: usize,
	successful_tests: usize,
	failed_tests: usize,
	success_rate: String,
	topic_accuracy: String,
	average_confidence: f32,
	average_processing_time: u64,
	total_test_time: u64,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SuiteResponse {
	message: &'static str,
	performance: SuitePerformance,
	results: Vec<CaseResult>,
	#[serde(with = "sage_service::time_serde")]
	timestamp: OffsetDateTime,
}

/// Runs the canned suite through the full pipeline and reports per-query
/// and aggregate outcomes. Diagnostics only; it still writes history.
pub async fn run_suite(State(state): State<AppState>) -> Json<SuiteResponse> {
	let started = std::time::Instant::now();
	let mut results = Vec::with_capacity(SUITE.len());

	for &(query, expected_topic) in SUITE {
		match state.service.process_query(query).await {
			Ok(outcome) => results.push(CaseResult {
				query,
				expected_topic,
				actual_topic: Some(outcome.topic.as_str().to_string()),
				topic_match: Some(outcome.topic.as_str() == expected_topic),
				confidence: Some(outcome.confidence),
				reply_chars: Some(outcome.reply.chars().count()),
				processing_time: Some(outcome.processing_time),
				success: true,
				error: None,
			}),
			Err(err) => results.push(CaseResult {
				query,
				expected_topic,
				actual_topic: None,
				topic_match: None,
				confidence: None,
				reply_chars: None,
				processing_time: None,
				success: false,
				error: Some(err.to_string()),
			}),
		}
	}

	let successful: Vec<&CaseResult> = results.iter().filter(|case| case.success).collect();
	let matches = successful.iter().filter(|case| case.topic_match == Some(true)).count();
	let average_confidence = if successful.is_empty() {
		0.0
	} else {
		let sum: f32 = successful.iter().filter_map(|case| case.confidence).sum();

		(sum / successful.len() as f32 * 1_000.0).round() / 1_000.0
	};
	let average_processing_time = if successful.is_empty() {
		0
	} else {
		successful.iter().filter_map(|case| case.processing_time).sum::<u64>()
			/ successful.len() as u64
	};
	let performance = SuitePerformance {
		total_tests: results.len(),
		successful_tests: successful.len(),
		failed_tests: results.len() - successful.len(),
		success_rate: percentage(successful.len(), results.len()),
		topic_accuracy: percentage(matches, successful.len()),
		average_confidence,
		average_processing_time,
		total_test_time: started.elapsed().as_millis() as u64,
	};

	Json(SuiteResponse {
		message: "Chat service self-test results",
		performance,
		results,
		timestamp: OffsetDateTime::now_utc(),
	})
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SingleTestResponse {
	message: &'static str,
	query: String,
	reply: String,
	topic: String,
	confidence: f32,
	processing_time: u64,
	#[serde(with = "sage_service::time_serde")]
	timestamp: OffsetDateTime,
}

/// Runs one ad-hoc query through the pipeline.
pub async fn run_single(
	State(state): State<AppState>,
	Json(payload): Json<ChatRequest>,
) -> Result<Json<SingleTestResponse>, ApiError> {
	let Some(query) = payload.query else {
		return Err(ApiError::missing_query());
	};
	let outcome = state.service.process_query(&query).await?;

	Ok(Json(SingleTestResponse {
		message: "Single query test completed",
		query,
		reply: outcome.reply,
		topic: outcome.topic.as_str().to_string(),
		confidence: outcome.confidence,
		processing_time: outcome.processing_time,
		timestamp: OffsetDateTime::now_utc(),
	}))
}

fn percentage(numerator: usize, denominator: usize) -> String {
	if denominator == 0 {
		return "0%".to_string();
	}

	format!("{:.1}%", numerator as f64 / denominator as f64 * 100.0)
}
