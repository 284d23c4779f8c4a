pub mod generate;
pub mod history;
pub mod template;
pub mod time_serde;

use std::{
	future::Future,
	pin::Pin,
	sync::{Arc, Mutex},
	time::Instant,
};

pub use history::{ConversationEntry, ConversationStats, ConversationStore};

use sage_config::{ArticleStoreConfig, Config, GenerationProviderConfig};
use sage_domain::topic::Topic;
use sage_providers::{ChatMessage, GenerationReply, articles, generation};
use sage_search::{ArticleRecord, ArticleSearchEngine};

pub type ServiceResult<T> = Result<T, ServiceError>;

pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

pub trait GenerationProvider
where
	Self: Send + Sync,
{
	fn generate<'a>(
		&'a self,
		cfg: &'a GenerationProviderConfig,
		messages: &'a [ChatMessage],
	) -> BoxFuture<'a, color_eyre::Result<GenerationReply>>;
}

pub trait ArticleStore
where
	Self: Send + Sync,
{
	fn fetch_all<'a>(
		&'a self,
		cfg: &'a ArticleStoreConfig,
	) -> BoxFuture<'a, color_eyre::Result<Vec<ArticleRecord>>>;
}

#[derive(Debug)]
pub enum ServiceError {
	Disabled,
	MissingApiKey,
}

impl std::fmt::Display for ServiceError {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		match self {
			Self::Disabled => write!(f, "Generation service is disabled."),
			Self::MissingApiKey => write!(f, "Generation provider API key is not configured."),
		}
	}
}

impl std::error::Error for ServiceError {}

/// Result of one processed query, before any transport framing.
#[derive(Clone, Debug)]
pub struct QueryOutcome {
	pub reply: String,
	pub topic: Topic,
	pub confidence: f32,
	pub processing_time: u64,
}

#[derive(Clone)]
pub struct Providers {
	pub generation: Arc<dyn GenerationProvider>,
	pub articles: Arc<dyn ArticleStore>,
}

struct DefaultProviders;

impl GenerationProvider for DefaultProviders {
	fn generate<'a>(
		&'a self,
		cfg: &'a GenerationProviderConfig,
		messages: &'a [ChatMessage],
	) -> BoxFuture<'a, color_eyre::Result<GenerationReply>> {
		Box::pin(generation::generate(cfg, messages))
	}
}

impl ArticleStore for DefaultProviders {
	fn fetch_all<'a>(
		&'a self,
		cfg: &'a ArticleStoreConfig,
	) -> BoxFuture<'a, color_eyre::Result<Vec<ArticleRecord>>> {
		Box::pin(articles::fetch_all(cfg))
	}
}

impl Providers {
	pub fn new(generation: Arc<dyn GenerationProvider>, articles: Arc<dyn ArticleStore>) -> Self {
		Self { generation, articles }
	}
}

impl Default for Providers {
	fn default() -> Self {
		let provider = Arc::new(DefaultProviders);
		Self { generation: provider.clone(), articles: provider }
	}
}

pub(crate) struct ArticleCache {
	pub(crate) articles: Vec<ArticleRecord>,
	pub(crate) fetched_at: Option<Instant>,
}

pub struct ChatService {
	pub cfg: Config,
	pub(crate) providers: Providers,
	pub(crate) store: ConversationStore,
	pub(crate) engine: Mutex<ArticleSearchEngine>,
	pub(crate) article_cache: Mutex<ArticleCache>,
	started_at: Instant,
}

impl ChatService {
	pub fn new(cfg: Config) -> Self {
		Self::with_providers(cfg, Providers::default())
	}

	pub fn with_providers(cfg: Config, providers: Providers) -> Self {
		let engine = ArticleSearchEngine::new(cfg.search.relevance_threshold);

		Self {
			cfg,
			providers,
			store: ConversationStore::default(),
			engine: Mutex::new(engine),
			article_cache: Mutex::new(ArticleCache { articles: Vec::new(), fetched_at: None }),
			started_at: Instant::now(),
		}
	}

	pub fn history(&self) -> Vec<ConversationEntry> {
		self.store.history()
	}

	pub fn clear_history(&self) {
		self.store.clear();
	}

	pub fn stats(&self) -> ConversationStats {
		self.store.stats()
	}

	pub fn uptime_secs(&self) -> u64 {
		self.started_at.elapsed().as_secs()
	}
}
