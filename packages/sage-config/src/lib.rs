mod error;
mod types;

pub use error::{Error, Result};
pub use types::{ArticleStoreConfig, Config, GenerationProviderConfig, Search, Service, Stream};

use std::{fs, path::Path};

pub fn load(path: &Path) -> Result<Config> {
	let raw = fs::read_to_string(path)
		.map_err(|err| Error::ReadConfig { path: path.to_path_buf(), source: err })?;

	let mut cfg: Config = toml::from_str(&raw)
		.map_err(|err| Error::ParseConfig { path: path.to_path_buf(), source: err })?;

	normalize(&mut cfg);

	validate(&cfg)?;

	Ok(cfg)
}

pub fn validate(cfg: &Config) -> Result<()> {
	if cfg.service.http_bind.trim().is_empty() {
		return Err(Error::Validation {
			message: "service.http_bind must be non-empty.".to_string(),
		});
	}
	if cfg.generation.api_base.trim().is_empty() {
		return Err(Error::Validation {
			message: "generation.api_base must be non-empty.".to_string(),
		});
	}
	if cfg.generation.model.trim().is_empty() {
		return Err(Error::Validation {
			message: "generation.model must be non-empty.".to_string(),
		});
	}
	if cfg.generation.max_tokens == 0 {
		return Err(Error::Validation {
			message: "generation.max_tokens must be greater than zero.".to_string(),
		});
	}
	if !cfg.generation.temperature.is_finite() {
		return Err(Error::Validation {
			message: "generation.temperature must be a finite number.".to_string(),
		});
	}
	if !(0.0..=2.0).contains(&cfg.generation.temperature) {
		return Err(Error::Validation {
			message: "generation.temperature must be in the range 0.0-2.0.".to_string(),
		});
	}
	if cfg.generation.timeout_ms == 0 {
		return Err(Error::Validation {
			message: "generation.timeout_ms must be greater than zero.".to_string(),
		});
	}
	if cfg.articles.api_base.trim().is_empty() {
		return Err(Error::Validation {
			message: "articles.api_base must be non-empty.".to_string(),
		});
	}
	if cfg.articles.timeout_ms == 0 {
		return Err(Error::Validation {
			message: "articles.timeout_ms must be greater than zero.".to_string(),
		});
	}
	if !cfg.search.relevance_threshold.is_finite() {
		return Err(Error::Validation {
			message: "search.relevance_threshold must be a finite number.".to_string(),
		});
	}
	if !(0.0..1.0).contains(&cfg.search.relevance_threshold) {
		return Err(Error::Validation {
			message: "search.relevance_threshold must be in the range 0.0-1.0.".to_string(),
		});
	}
	if cfg.search.default_limit == 0 {
		return Err(Error::Validation {
			message: "search.default_limit must be greater than zero.".to_string(),
		});
	}
	if cfg.stream.delay_min_ms > cfg.stream.delay_max_ms {
		return Err(Error::Validation {
			message: "stream.delay_min_ms must not exceed stream.delay_max_ms.".to_string(),
		});
	}

	Ok(())
}

fn normalize(cfg: &mut Config) {
	// An all-whitespace key is indistinguishable from a missing one downstream.
	cfg.generation.api_key = cfg.generation.api_key.trim().to_string();

	if let Some(stripped) = cfg.generation.api_base.strip_suffix('/') {
		cfg.generation.api_base = stripped.to_string();
	}
	if let Some(stripped) = cfg.articles.api_base.strip_suffix('/') {
		cfg.articles.api_base = stripped.to_string();
	}
}
