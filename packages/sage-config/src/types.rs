use serde::Deserialize;
use serde_json::{Map, Value};

#[derive(Debug, Deserialize)]
pub struct Config {
	pub service: Service,
	pub generation: GenerationProviderConfig,
	pub articles: ArticleStoreConfig,
	pub search: Search,
	pub stream: Stream,
}

#[derive(Debug, Deserialize)]
pub struct Service {
	pub http_bind: String,
	pub log_level: String,
	pub enabled: bool,
	#[serde(default)]
	pub debug: bool,
}

#[derive(Debug, Deserialize)]
pub struct GenerationProviderConfig {
	pub provider_id: String,
	pub api_base: String,
	pub api_key: String,
	pub path: String,
	pub model: String,
	pub max_tokens: u32,
	pub temperature: f32,
	pub timeout_ms: u64,
	#[serde(default)]
	pub default_headers: Map<String, Value>,
}

#[derive(Debug, Deserialize)]
pub struct ArticleStoreConfig {
	pub api_base: String,
	pub path: String,
	pub timeout_ms: u64,
	#[serde(default = "default_cache_ttl_secs")]
	pub cache_ttl_secs: u64,
}

#[derive(Debug, Deserialize)]
pub struct Search {
	#[serde(default = "default_relevance_threshold")]
	pub relevance_threshold: f32,
	#[serde(default = "default_result_limit")]
	pub default_limit: u32,
}

#[derive(Debug, Deserialize)]
pub struct Stream {
	#[serde(default = "default_delay_min_ms")]
	pub delay_min_ms: u64,
	#[serde(default = "default_delay_max_ms")]
	pub delay_max_ms: u64,
}

fn default_cache_ttl_secs() -> u64 {
	300
}

fn default_relevance_threshold() -> f32 {
	0.05
}

fn default_result_limit() -> u32 {
	3
}

fn default_delay_min_ms() -> u64 {
	50
}

fn default_delay_max_ms() -> u64 {
	150
}
