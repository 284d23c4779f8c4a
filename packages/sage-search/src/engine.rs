use serde::Serialize;

use sage_domain::keywords;

use crate::{article::ArticleRecord, synonyms::is_similar};

/// Terms whose presence in a query justifies running the article search.
/// Action words, subject words, and content words from the curated corpus.
const SEARCH_TRIGGERS: &[&str] = &[
	"推荐", "文章", "学习", "复习", "教程", "指南", "方法", "查询", "检索", "搜索", "找", "寻找",
	"如何", "怎么", "什么是", "告诉我", "介绍", "解释", "有关", "关于", "相关", "高数", "数学",
	"编程", "算法", "前端", "后端", "高等数学", "微积分", "线性代数", "笔记", "资料", "材料",
	"内容",
];

const QUESTION_MARKERS: &[&str] = &["?", "？", "什么", "如何", "怎么"];

/// A query is "long enough to be a real question" past this many chars.
const QUESTION_MIN_CHARS: usize = 10;

const TITLE_WEIGHT: u32 = 3;
const LABEL_WEIGHT: u32 = 2;
const CONTENT_WEIGHT: u32 = 1;

#[derive(Clone, Debug, Serialize)]
pub struct SearchResult {
	pub article: ArticleRecord,
	pub relevance_score: f32,
	pub matched_keywords: Vec<String>,
}

/// In-memory lexical search over the current article snapshot. The snapshot
/// is replaced in full by `update_articles`; there is no incremental diffing.
#[derive(Clone, Debug)]
pub struct ArticleSearchEngine {
	articles: Vec<ArticleRecord>,
	threshold: f32,
}

impl ArticleSearchEngine {
	pub fn new(threshold: f32) -> Self {
		Self { articles: Vec::new(), threshold }
	}

	pub fn with_articles(articles: Vec<ArticleRecord>, threshold: f32) -> Self {
		Self { articles, threshold }
	}

	pub fn update_articles(&mut self, articles: Vec<ArticleRecord>) {
		self.articles = articles;
	}

	pub fn article_count(&self) -> usize {
		self.articles.len()
	}

	/// Ranks articles by weighted keyword overlap with the query. Results
	/// scoring at or below the threshold are discarded; ties keep the
	/// original collection order.
	pub fn search(&self, query: &str, limit: usize) -> Vec<SearchResult> {
		if query.trim().is_empty() || self.articles.is_empty() {
			return Vec::new();
		}

		let query_keywords = keywords::extract(query);

		tracing::debug!(
			query_chars = query.chars().count(),
			keyword_count = query_keywords.len(),
			article_count = self.articles.len(),
			"Scoring articles against query keywords."
		);

		if query_keywords.is_empty() {
			return Vec::new();
		}

		let mut results: Vec<SearchResult> = self
			.articles
			.iter()
			.filter_map(|article| {
				let (score, matched_keywords) = similarity(&query_keywords, article);

				(score > self.threshold).then(|| SearchResult {
					article: article.clone(),
					relevance_score: score,
					matched_keywords,
				})
			})
			.collect();

		results.sort_by(|a, b| {
			b.relevance_score
				.partial_cmp(&a.relevance_score)
				.unwrap_or(std::cmp::Ordering::Equal)
		});
		results.truncate(limit);

		tracing::debug!(result_count = results.len(), "Article search finished.");

		results
	}
}

/// True when the query looks like it wants article material: it carries a
/// trigger term, or it is a long-enough question.
pub fn should_search(query: &str) -> bool {
	let lower = query.to_lowercase();

	if SEARCH_TRIGGERS.iter().any(|trigger| lower.contains(trigger)) {
		return true;
	}

	let is_question = QUESTION_MARKERS.iter().any(|marker| lower.contains(marker));

	is_question && lower.chars().count() > QUESTION_MIN_CHARS
}

/// Renders the ranked recommendation block, or an empty string for no
/// results (callers treat that as "no recommendation section").
pub fn format_recommendations(results: &[SearchResult]) -> String {
	if results.is_empty() {
		return String::new();
	}

	let mut out = String::from("\n\n📚 **相关文章推荐**：\n\n");

	for (index, result) in results.iter().enumerate() {
		let article = &result.article;

		out.push_str(&format!("{}. **{}**\n", index + 1, article.title));
		out.push_str(&format!("   📝 {}\n", article.introduction.label));
		out.push_str(&format!("   👤 作者：{}\n", article.introduction.author));
		out.push_str(&format!("   🎯 匹配关键词：{}\n", result.matched_keywords.join(", ")));
		out.push_str(&format!("   📊 相关度：{}%\n", (result.relevance_score * 100.0).round()));
		out.push_str(&format!("   🔗 [点击查看文章](/articles/{})\n\n", article.id));
	}

	out
}

/// Weighted containment match of query keywords against one article.
/// First matching field wins per keyword, title > label > content; a
/// keyword contributes at most once.
fn similarity(query_keywords: &[String], article: &ArticleRecord) -> (f32, Vec<String>) {
	let title_keywords = keywords::extract(&article.title);
	let label_keywords = keywords::extract(&article.introduction.label);
	let content_keywords = keywords::extract(&article.content);

	let mut score = 0_u32;
	let mut matched_keywords = Vec::new();

	for query_word in query_keywords {
		let weight = if matches_any(query_word, &title_keywords) {
			TITLE_WEIGHT
		} else if matches_any(query_word, &label_keywords) {
			LABEL_WEIGHT
		} else if matches_any(query_word, &content_keywords) {
			CONTENT_WEIGHT
		} else {
			continue;
		};

		score += weight;
		matched_keywords.push(query_word.clone());
	}

	let max_possible = (query_keywords.len() as u32 * TITLE_WEIGHT) as f32;
	let normalized = if max_possible > 0.0 { (score as f32 / max_possible).clamp(0.0, 1.0) } else { 0.0 };

	(normalized, matched_keywords)
}

fn matches_any(query_word: &str, field_keywords: &[String]) -> bool {
	field_keywords.iter().any(|field_word| {
		field_word.contains(query_word)
			|| query_word.contains(field_word.as_str())
			|| is_similar(query_word, field_word)
	})
}
