use std::time::Duration;

use color_eyre::{Result, eyre};
use reqwest::Client;
use serde_json::Value;

use crate::ChatMessage;

#[derive(Clone, Debug)]
pub struct GenerationReply {
	pub content: String,
	pub usage: Option<TokenUsage>,
	pub model: String,
	pub finish_reason: Option<String>,
}

#[derive(Clone, Copy, Debug)]
pub struct TokenUsage {
	pub prompt_tokens: u64,
	pub completion_tokens: u64,
	pub total_tokens: u64,
}

/// Calls the OpenAI-compatible chat-completion endpoint. Any transport,
/// status, or empty-content condition surfaces as an error; the caller
/// decides how to degrade.
pub async fn generate(
	cfg: &sage_config::GenerationProviderConfig,
	messages: &[ChatMessage],
) -> Result<GenerationReply> {
	let client = Client::builder().timeout(Duration::from_millis(cfg.timeout_ms)).build()?;
	let url = format!("{}{}", cfg.api_base, cfg.path);
	let body = serde_json::json!({
		"model": cfg.model,
		"messages": messages,
		"max_tokens": cfg.max_tokens,
		"temperature": cfg.temperature,
	});

	tracing::debug!(
		model = %cfg.model,
		message_count = messages.len(),
		max_tokens = cfg.max_tokens,
		"Requesting completion from generation provider."
	);

	let res = client
		.post(&url)
		.headers(crate::auth_headers(&cfg.api_key, &cfg.default_headers)?)
		.json(&body)
		.send()
		.await?;
	let json: Value = res.error_for_status()?.json().await?;

	parse_completion(json)
}

fn parse_completion(json: Value) -> Result<GenerationReply> {
	let choice = json
		.get("choices")
		.and_then(|v| v.as_array())
		.and_then(|arr| arr.first())
		.ok_or_else(|| eyre::eyre!("Completion response has no choices."))?;
	let content = choice
		.get("message")
		.and_then(|msg| msg.get("content"))
		.and_then(|c| c.as_str())
		.ok_or_else(|| eyre::eyre!("Completion choice has no message content."))?;

	if content.trim().is_empty() {
		return Err(eyre::eyre!("Completion content is empty."));
	}

	let usage = json.get("usage").and_then(parse_usage);
	let model = json.get("model").and_then(|m| m.as_str()).unwrap_or_default().to_string();
	let finish_reason =
		choice.get("finish_reason").and_then(|r| r.as_str()).map(|r| r.to_string());

	Ok(GenerationReply { content: content.to_string(), usage, model, finish_reason })
}

fn parse_usage(value: &Value) -> Option<TokenUsage> {
	Some(TokenUsage {
		prompt_tokens: value.get("prompt_tokens")?.as_u64()?,
		completion_tokens: value.get("completion_tokens")?.as_u64()?,
		total_tokens: value.get("total_tokens")?.as_u64()?,
	})
}
