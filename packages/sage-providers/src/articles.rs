use std::time::Duration;

use color_eyre::Result;
use reqwest::Client;

use sage_search::ArticleRecord;

/// Fetches the full article collection from the external store. One
/// best-effort attempt; callers fall back to their cache or an empty set.
pub async fn fetch_all(cfg: &sage_config::ArticleStoreConfig) -> Result<Vec<ArticleRecord>> {
	let client = Client::builder().timeout(Duration::from_millis(cfg.timeout_ms)).build()?;
	let url = format!("{}{}", cfg.api_base, cfg.path);
	let res = client.get(&url).send().await?;
	let articles: Vec<ArticleRecord> = res.error_for_status()?.json().await?;

	tracing::debug!(article_count = articles.len(), "Fetched article collection.");

	Ok(articles)
}
