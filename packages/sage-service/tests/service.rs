use std::sync::Arc;

use color_eyre::eyre;
use serde_json::Map;

use sage_config::{
	ArticleStoreConfig, Config, GenerationProviderConfig, Search, Service, Stream,
};
use sage_domain::topic::Topic;
use sage_providers::{ChatMessage, GenerationReply};
use sage_search::{ArticleIntro, ArticleRecord};
use sage_service::{
	ArticleStore, BoxFuture, ChatService, GenerationProvider, Providers, ServiceError,
	template,
};

fn test_config(enabled: bool) -> Config {
	Config {
		service: Service {
			http_bind: "127.0.0.1:0".to_string(),
			log_level: "info".to_string(),
			enabled,
			debug: false,
		},
		generation: GenerationProviderConfig {
			provider_id: "test".to_string(),
			api_base: "http://127.0.0.1:1".to_string(),
			api_key: "test-key".to_string(),
			path: "/chat/completions".to_string(),
			model: "test-model".to_string(),
			max_tokens: 256,
			temperature: 0.7,
			timeout_ms: 1_000,
			default_headers: Map::new(),
		},
		articles: ArticleStoreConfig {
			api_base: "http://127.0.0.1:1".to_string(),
			path: "/api/articles/all".to_string(),
			timeout_ms: 1_000,
			cache_ttl_secs: 300,
		},
		search: Search { relevance_threshold: 0.05, default_limit: 3 },
		stream: Stream { delay_min_ms: 0, delay_max_ms: 0 },
	}
}

struct StaticGeneration(&'static str);

impl GenerationProvider for StaticGeneration {
	fn generate<'a>(
		&'a self,
		_cfg: &'a GenerationProviderConfig,
		_messages: &'a [ChatMessage],
	) -> BoxFuture<'a, color_eyre::Result<GenerationReply>> {
		Box::pin(async move {
			Ok(GenerationReply {
				content: self.0.to_string(),
				usage: None,
				model: "test-model".to_string(),
				finish_reason: Some("stop".to_string()),
			})
		})
	}
}

struct FailingGeneration;

impl GenerationProvider for FailingGeneration {
	fn generate<'a>(
		&'a self,
		_cfg: &'a GenerationProviderConfig,
		_messages: &'a [ChatMessage],
	) -> BoxFuture<'a, color_eyre::Result<GenerationReply>> {
		Box::pin(async move { Err(eyre::eyre!("Provider unreachable.")) })
	}
}

struct StaticArticles(Vec<ArticleRecord>);

impl ArticleStore for StaticArticles {
	fn fetch_all<'a>(
		&'a self,
		_cfg: &'a ArticleStoreConfig,
	) -> BoxFuture<'a, color_eyre::Result<Vec<ArticleRecord>>> {
		Box::pin(async move { Ok(self.0.clone()) })
	}
}

struct FailingArticles;

impl ArticleStore for FailingArticles {
	fn fetch_all<'a>(
		&'a self,
		_cfg: &'a ArticleStoreConfig,
	) -> BoxFuture<'a, color_eyre::Result<Vec<ArticleRecord>>> {
		Box::pin(async move { Err(eyre::eyre!("Article store unreachable.")) })
	}
}

fn math_notes_article() -> ArticleRecord {
	ArticleRecord {
		id: "math-notes-1".to_string(),
		title: "高等数学复习笔记".to_string(),
		introduction: ArticleIntro {
			author: "张老师".to_string(),
			data: "2024年3月".to_string(),
			label: "数学".to_string(),
			like_number: 42,
			comment_number: 7,
		},
		cover: None,
		content: "极限、导数、微积分与级数的期末复习整理。".to_string(),
	}
}

fn service_with(
	generation: impl GenerationProvider + 'static,
	articles: impl ArticleStore + 'static,
) -> ChatService {
	ChatService::with_providers(
		test_config(true),
		Providers::new(Arc::new(generation), Arc::new(articles)),
	)
}

#[tokio::test]
async fn greeting_classifies_general_with_floor_confidence() {
	let service = service_with(FailingGeneration, FailingArticles);
	let outcome = service.process_query("你好").await.expect("query must succeed");

	assert_eq!(outcome.topic, Topic::General);
	assert!(outcome.confidence > 0.3 && outcome.confidence < 0.31);
	assert!(!outcome.reply.is_empty());
	assert_eq!(service.history().len(), 1);
}

#[tokio::test]
async fn how_to_query_gets_programming_topic_and_step_plan() {
	let service = service_with(FailingGeneration, FailingArticles);
	let outcome =
		service.process_query("如何学习 React？").await.expect("query must succeed");

	assert_eq!(outcome.topic, Topic::Programming);
	assert!((0.3..=0.95).contains(&outcome.confidence));
	assert!(outcome.reply.contains("1. **分析需求**"));
	assert!(outcome.reply.contains("4. **优化改进**"));
	// The article store is down, so no recommendation block may appear.
	assert!(!outcome.reply.contains("相关文章推荐"));
}

#[tokio::test]
async fn retrieval_query_appends_recommendations() {
	let service =
		service_with(StaticGeneration("我找到了一些相关资料。"), StaticArticles(vec![
			math_notes_article(),
		]));
	let outcome = service
		.process_query("请你为我检索一下所有可能的高等数学学习笔记")
		.await
		.expect("query must succeed");

	assert!(outcome.reply.starts_with("我找到了一些相关资料。"));
	assert!(outcome.reply.contains("📚 **相关文章推荐**"));
	assert!(outcome.reply.contains("高等数学复习笔记"));
	assert!(outcome.reply.contains("/articles/math-notes-1"));
}

#[tokio::test]
async fn recommendations_survive_provider_failure() {
	let service =
		service_with(FailingGeneration, StaticArticles(vec![math_notes_article()]));
	let outcome = service
		.process_query("请你为我检索一下所有可能的高等数学学习笔记")
		.await
		.expect("query must succeed");

	assert!(outcome.reply.contains("📚 **相关文章推荐**"));
	assert!(outcome.reply.contains("/articles/math-notes-1"));
}

#[tokio::test]
async fn provider_failure_falls_back_to_a_fixed_candidate() {
	let service = service_with(FailingGeneration, FailingArticles);
	let outcome = service.process_query("你好").await.expect("query must succeed");

	assert!(
		template::openers(Topic::General)
			.iter()
			.any(|opener| outcome.reply.starts_with(opener)),
		"reply not from the fixed candidate set: {}",
		outcome.reply
	);
}

#[tokio::test]
async fn one_hundred_one_queries_leave_fifty_entries() {
	let service = service_with(StaticGeneration("好的。"), FailingArticles);

	for _ in 0..101 {
		// No search triggers, no question markers: the search gate stays shut.
		service.process_query("早上好呀").await.expect("query must succeed");
	}

	let stats = service.stats();

	assert_eq!(stats.conversation_count, 50);
	assert_eq!(stats.total_requests, 101);
}

#[tokio::test]
async fn whitespace_query_returns_guidance_without_history() {
	let service = service_with(StaticGeneration("不该被调用"), FailingArticles);
	let outcome = service.process_query("   ").await.expect("query must succeed");

	assert_eq!(outcome.topic, Topic::General);
	assert_eq!(outcome.confidence, 1.0);
	assert!(outcome.reply.contains("请输入你的问题"));
	assert!(service.history().is_empty());
	assert_eq!(service.stats().total_requests, 1);
}

#[tokio::test]
async fn disabled_service_rejects_queries() {
	let service = ChatService::with_providers(
		test_config(false),
		Providers::new(Arc::new(StaticGeneration("不可达")), Arc::new(FailingArticles)),
	);
	let err = service.process_query("你好").await.expect_err("must be rejected");

	assert!(matches!(err, ServiceError::Disabled));
	assert!(service.history().is_empty());
}

#[tokio::test]
async fn missing_api_key_rejects_queries() {
	let mut cfg = test_config(true);
	cfg.generation.api_key = String::new();

	let service = ChatService::with_providers(
		cfg,
		Providers::new(Arc::new(StaticGeneration("不可达")), Arc::new(FailingArticles)),
	);
	let err = service.process_query("你好").await.expect_err("must be rejected");

	assert!(matches!(err, ServiceError::MissingApiKey));
}

#[tokio::test]
async fn successful_generation_uses_provider_content() {
	let service = service_with(StaticGeneration("这是模型的回答。"), FailingArticles);
	let outcome = service.process_query("早上好呀").await.expect("query must succeed");

	assert_eq!(outcome.reply, "这是模型的回答。");

	let history = service.history();

	assert_eq!(history.len(), 1);
	assert_eq!(history[0].reply, outcome.reply);
	assert_eq!(history[0].query, "早上好呀");
}

#[tokio::test]
async fn stats_track_topics_across_queries() {
	let service = service_with(StaticGeneration("好的。"), FailingArticles);

	service.process_query("早上好呀").await.expect("query must succeed");
	service.process_query("帮我改一段代码").await.expect("query must succeed");

	let stats = service.stats();

	assert_eq!(stats.conversation_count, 2);
	assert_eq!(stats.topic_distribution.get("programming"), Some(&1));
	assert!(stats.last_activity.is_some());
	assert!(stats.average_confidence > 0.0);
}
