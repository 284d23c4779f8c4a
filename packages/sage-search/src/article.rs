use serde::{Deserialize, Serialize};

/// Article as served by the external article store. The engine holds a
/// transient copy and never writes one back.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ArticleRecord {
	pub id: String,
	pub title: String,
	pub introduction: ArticleIntro,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub cover: Option<String>,
	pub content: String,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ArticleIntro {
	pub author: String,
	/// Human-readable publication date, kept as the store formats it.
	pub data: String,
	pub label: String,
	pub like_number: i64,
	pub comment_number: i64,
}
