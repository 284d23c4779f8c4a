use serde::{Deserialize, Serialize};

/// Coarse query categories used for prompt shaping and confidence scoring.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Topic {
	Programming,
	Ai,
	Web,
	General,
}

impl Topic {
	pub fn as_str(self) -> &'static str {
		match self {
			Self::Programming => "programming",
			Self::Ai => "ai",
			Self::Web => "web",
			Self::General => "general",
		}
	}
}

/// Trigger terms per topic, all lowercase. Classification walks this table
/// top to bottom and the first containment hit wins, so the declaration
/// order is part of the contract: a query mentioning both "编程" and "学习"
/// classifies as programming, never general.
pub const TOPIC_KEYWORDS: &[(Topic, &[&str])] = &[
	(Topic::Programming, &[
		"编程",
		"代码",
		"开发",
		"程序",
		"软件",
		"算法",
		"数据结构",
		"javascript",
		"typescript",
		"react",
		"next.js",
		"node.js",
	]),
	(Topic::Ai, &["人工智能", "ai", "机器学习", "深度学习", "神经网络", "llm", "gpt"]),
	(Topic::Web, &["网站", "前端", "后端", "全栈", "html", "css", "数据库", "api"]),
	(Topic::General, &["学习", "工作", "生活", "建议", "帮助", "问题", "解决"]),
];

pub fn keywords(topic: Topic) -> &'static [&'static str] {
	TOPIC_KEYWORDS
		.iter()
		.find(|(candidate, _)| *candidate == topic)
		.map(|(_, keywords)| *keywords)
		.unwrap_or(&[])
}

pub fn classify(query: &str) -> Topic {
	let lower = query.to_lowercase();

	for (topic, keywords) in TOPIC_KEYWORDS {
		if keywords.iter().any(|keyword| lower.contains(keyword)) {
			return *topic;
		}
	}

	Topic::General
}

/// Confidence for a (query, topic) pair: a 0.3 floor, 0.15 per trigger-term
/// hit, and a length bonus capped at 0.2, clamped to 0.95. Non-empty input
/// always lands in [0.3, 0.95]; the empty-query sentinel of 1.0 is the
/// caller's business.
pub fn confidence(query: &str, topic: Topic) -> f32 {
	let lower = query.to_lowercase();
	let match_count =
		keywords(topic).iter().filter(|keyword| lower.contains(*keyword)).count() as f32;
	let length_bonus = (query.chars().count() as f32 / 500.0).min(0.2);

	(0.3 + 0.15 * match_count + length_bonus).min(0.95)
}
