mod article;
mod engine;
mod synonyms;

pub use article::{ArticleIntro, ArticleRecord};
pub use engine::{ArticleSearchEngine, SearchResult, format_recommendations, should_search};
pub use synonyms::is_similar;
