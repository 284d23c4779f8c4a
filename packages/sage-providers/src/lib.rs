pub mod articles;
pub mod generation;

pub use generation::{GenerationReply, TokenUsage};

use color_eyre::{Result, eyre};
use reqwest::header::{AUTHORIZATION, HeaderMap, HeaderName};
use serde::Serialize;
use serde_json::{Map, Value};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
	System,
	User,
	Assistant,
}

/// One turn of the provider conversation, OpenAI chat-completion shape.
#[derive(Clone, Debug, Serialize)]
pub struct ChatMessage {
	pub role: Role,
	pub content: String,
}

impl ChatMessage {
	pub fn system(content: impl Into<String>) -> Self {
		Self { role: Role::System, content: content.into() }
	}

	pub fn user(content: impl Into<String>) -> Self {
		Self { role: Role::User, content: content.into() }
	}

	pub fn assistant(content: impl Into<String>) -> Self {
		Self { role: Role::Assistant, content: content.into() }
	}
}

pub fn auth_headers(api_key: &str, default_headers: &Map<String, Value>) -> Result<HeaderMap> {
	let mut headers = HeaderMap::new();
	headers.insert(AUTHORIZATION, format!("Bearer {api_key}").parse()?);
	for (key, value) in default_headers {
		let Some(raw) = value.as_str() else {
			return Err(eyre::eyre!("Default header values must be strings."));
		};
		headers.insert(HeaderName::from_bytes(key.as_bytes())?, raw.parse()?);
	}
	Ok(headers)
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn roles_serialize_lowercase() {
		let message = ChatMessage::system("hello");
		let json = serde_json::to_value(&message).unwrap();

		assert_eq!(json["role"], "system");
		assert_eq!(json["content"], "hello");
	}

	#[test]
	fn rejects_non_string_default_headers() {
		let mut headers = Map::new();
		headers.insert("X-Test".to_string(), Value::from(1));

		assert!(auth_headers("key", &headers).is_err());
	}
}
