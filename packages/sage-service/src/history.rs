use std::{
	collections::BTreeMap,
	sync::{
		Mutex,
		atomic::{AtomicU64, Ordering},
	},
};

use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use sage_domain::topic::Topic;

/// Hard cap on retained exchanges.
pub const MAX_HISTORY: usize = 100;
/// When the cap is exceeded the store cuts back to this many most-recent
/// entries in one batch, rather than evicting one at a time.
pub const TRUNCATED_LEN: usize = 50;

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ConversationEntry {
	pub id: String,
	pub query: String,
	pub reply: String,
	pub topic: Topic,
	pub confidence: f32,
	#[serde(with = "crate::time_serde")]
	pub timestamp: OffsetDateTime,
}

#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConversationStats {
	pub total_requests: u64,
	pub conversation_count: usize,
	pub topic_distribution: BTreeMap<String, usize>,
	pub average_confidence: f32,
	#[serde(with = "crate::time_serde::option")]
	pub last_activity: Option<OffsetDateTime>,
}

/// Bounded chronological ledger of past exchanges. The mutex serializes
/// appends so append-then-read-back is atomic under concurrent requests.
#[derive(Debug, Default)]
pub struct ConversationStore {
	entries: Mutex<Vec<ConversationEntry>>,
	request_count: AtomicU64,
}

impl ConversationStore {
	pub fn record_request(&self) -> u64 {
		self.request_count.fetch_add(1, Ordering::Relaxed) + 1
	}

	pub fn append(&self, entry: ConversationEntry) {
		let mut entries = self.lock_entries();

		entries.push(entry);

		if entries.len() > MAX_HISTORY {
			let cut = entries.len() - TRUNCATED_LEN;

			entries.drain(..cut);

			tracing::debug!(retained = TRUNCATED_LEN, "Conversation history truncated.");
		}
	}

	/// Defensive copy in chronological order.
	pub fn history(&self) -> Vec<ConversationEntry> {
		self.lock_entries().clone()
	}

	/// The `count` most recent entries, still chronological.
	pub fn recent(&self, count: usize) -> Vec<ConversationEntry> {
		let entries = self.lock_entries();
		let skip = entries.len().saturating_sub(count);

		entries[skip..].to_vec()
	}

	pub fn clear(&self) {
		self.lock_entries().clear();

		tracing::debug!("Conversation history cleared.");
	}

	pub fn stats(&self) -> ConversationStats {
		let entries = self.lock_entries();
		let mut topic_distribution = BTreeMap::new();

		for entry in entries.iter() {
			*topic_distribution.entry(entry.topic.as_str().to_string()).or_insert(0) += 1;
		}

		let average_confidence = if entries.is_empty() {
			0.0
		} else {
			let sum: f32 = entries.iter().map(|entry| entry.confidence).sum();

			(sum / entries.len() as f32 * 100.0).round() / 100.0
		};

		ConversationStats {
			total_requests: self.request_count.load(Ordering::Relaxed),
			conversation_count: entries.len(),
			topic_distribution,
			average_confidence,
			last_activity: entries.last().map(|entry| entry.timestamp),
		}
	}

	fn lock_entries(&self) -> std::sync::MutexGuard<'_, Vec<ConversationEntry>> {
		self.entries.lock().unwrap_or_else(|err| err.into_inner())
	}
}
