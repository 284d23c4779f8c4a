use std::time::{Duration, Instant};

use time::OffsetDateTime;
use uuid::Uuid;

use sage_domain::topic::{self, Topic};
use sage_providers::ChatMessage;
use sage_search::{SearchResult, format_recommendations, should_search};

use crate::{ChatService, ConversationEntry, QueryOutcome, ServiceError, ServiceResult, template};

/// How many past exchanges prime the provider conversation.
const RECENT_TURNS: usize = 5;

const EMPTY_QUERY_REPLY: &str =
	"请输入你的问题，我会尽力为你解答。你可以问我关于编程、AI、Web开发或其他任何你感兴趣的话题。";

const SYSTEM_PROMPT_BASE: &str =
	"你是智慧校园平台的智能助手，请用友好、准确的中文回答用户的问题。";

const RECOMMEND_INSTRUCTION: &str =
	"站内检索命中了相关文章，请在回答中自然地引用它们的要点，不要生硬地罗列。";

impl ChatService {
	/// Runs the full pipeline for one query: classify, optionally search
	/// articles, generate (or fall back to a template), merge
	/// recommendations, and record the exchange.
	///
	/// Provider and search failures degrade gracefully; a well-formed
	/// non-empty query on an enabled service never produces an error.
	pub async fn process_query(&self, query: &str) -> ServiceResult<QueryOutcome> {
		let started = Instant::now();

		if !self.cfg.service.enabled {
			return Err(ServiceError::Disabled);
		}
		if self.cfg.generation.api_key.is_empty() {
			return Err(ServiceError::MissingApiKey);
		}

		let request_id = self.store.record_request();

		tracing::debug!(
			request_id,
			query_chars = query.chars().count(),
			"Processing chat query."
		);

		if query.trim().is_empty() {
			// Vacuous input gets the fixed guidance reply and no history entry.
			return Ok(QueryOutcome {
				reply: EMPTY_QUERY_REPLY.to_string(),
				topic: Topic::General,
				confidence: 1.0,
				processing_time: elapsed_ms(started),
			});
		}

		let topic = topic::classify(query);
		let confidence = topic::confidence(query, topic);

		let results = if should_search(query) { self.search_articles(query).await } else { Vec::new() };
		let recommendations = format_recommendations(&results);

		let messages = self.build_messages(query, topic, &results);
		let mut reply = match self.providers.generation.generate(&self.cfg.generation, &messages).await
		{
			Ok(generated) => {
				tracing::debug!(
					request_id,
					model = %generated.model,
					finish_reason = generated.finish_reason.as_deref().unwrap_or(""),
					"Generation provider replied."
				);

				generated.content
			},
			Err(err) => {
				tracing::warn!(
					request_id,
					error = %err,
					"Generation provider failed; using template fallback."
				);

				template::render(query, topic)
			},
		};

		// Recommendations survive the fallback path too.
		reply.push_str(&recommendations);

		self.store.append(ConversationEntry {
			id: Uuid::new_v4().to_string(),
			query: query.to_string(),
			reply: reply.clone(),
			topic,
			confidence,
			timestamp: OffsetDateTime::now_utc(),
		});

		let processing_time = elapsed_ms(started);

		tracing::debug!(
			request_id,
			topic = topic.as_str(),
			confidence,
			reply_chars = reply.chars().count(),
			processing_time,
			"Chat query processed."
		);

		Ok(QueryOutcome { reply, topic, confidence, processing_time })
	}

	/// Refreshes the engine from the article store (best effort, cached)
	/// and runs the lexical search. Failures mean zero results, never an
	/// error for the caller.
	async fn search_articles(&self, query: &str) -> Vec<SearchResult> {
		let articles = self.current_articles().await;

		let engine = {
			let mut engine = self.engine.lock().unwrap_or_else(|err| err.into_inner());

			engine.update_articles(articles);

			engine.clone()
		};

		engine.search(query, self.cfg.search.default_limit as usize)
	}

	/// The current article snapshot: the cache while it is fresh, otherwise
	/// a new fetch, otherwise stale cache contents over nothing at all.
	async fn current_articles(&self) -> Vec<sage_search::ArticleRecord> {
		let ttl = Duration::from_secs(self.cfg.articles.cache_ttl_secs);
		{
			let cache = self.article_cache.lock().unwrap_or_else(|err| err.into_inner());

			if let Some(fetched_at) = cache.fetched_at
				&& fetched_at.elapsed() < ttl
				&& !cache.articles.is_empty()
			{
				return cache.articles.clone();
			}
		}

		match self.providers.articles.fetch_all(&self.cfg.articles).await {
			Ok(articles) => {
				let mut cache =
					self.article_cache.lock().unwrap_or_else(|err| err.into_inner());

				cache.articles = articles.clone();
				cache.fetched_at = Some(Instant::now());

				articles
			},
			Err(err) => {
				let cache = self.article_cache.lock().unwrap_or_else(|err| err.into_inner());

				if cache.articles.is_empty() {
					tracing::warn!(error = %err, "Article fetch failed; searching nothing.");
				} else {
					tracing::warn!(
						error = %err,
						cached = cache.articles.len(),
						"Article fetch failed; using stale cache."
					);
				}

				cache.articles.clone()
			},
		}
	}

	fn build_messages(
		&self,
		query: &str,
		topic: Topic,
		results: &[SearchResult],
	) -> Vec<ChatMessage> {
		let mut system_prompt =
			format!("{SYSTEM_PROMPT_BASE}\n\n{}", template::context(topic));

		if !results.is_empty() {
			system_prompt.push_str("\n\n");
			system_prompt.push_str(RECOMMEND_INSTRUCTION);
		}

		let mut messages = vec![ChatMessage::system(system_prompt)];

		for entry in self.store.recent(RECENT_TURNS) {
			messages.push(ChatMessage::user(entry.query));
			messages.push(ChatMessage::assistant(entry.reply));
		}

		messages.push(ChatMessage::user(user_prompt(query, results)));

		messages
	}
}

fn user_prompt(query: &str, results: &[SearchResult]) -> String {
	if results.is_empty() {
		return query.to_string();
	}

	let mut prompt = format!("{query}\n\n以下是站内检索到的相关文章，请结合它们回答：\n");

	for result in results {
		prompt.push_str(&format!(
			"- 《{}》（{}，作者：{}，相关度 {}%）\n",
			result.article.title,
			result.article.introduction.label,
			result.article.introduction.author,
			(result.relevance_score * 100.0).round(),
		));
	}

	prompt
}

fn elapsed_ms(started: Instant) -> u64 {
	started.elapsed().as_millis() as u64
}
