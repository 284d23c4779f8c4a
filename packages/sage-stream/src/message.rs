use serde::{Deserialize, Serialize};

/// Wire envelope for incremental delivery. Exactly one `start`, zero or
/// more `chunk`, then one terminal `end` or `error`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum StreamMessage {
	Start { content: String },
	Chunk { content: String },
	End { metadata: StreamMetadata },
	Error { content: String },
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StreamMetadata {
	pub topic: String,
	pub confidence: f32,
	pub processing_time: u64,
}
