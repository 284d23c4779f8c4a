use std::collections::HashSet;

use unicode_normalization::UnicodeNormalization;

use crate::cjk::{han_runs, is_han};

/// Compound subject terms matched verbatim before the sliding-window pass.
/// A two-pass match keeps "高等数学" intact instead of only its bigrams.
const DOMAIN_TERMS: &[&str] = &[
	"高等数学",
	"高数",
	"数学",
	"微积分",
	"线性代数",
	"概率论",
	"统计学",
	"前端开发",
	"后端开发",
	"编程",
	"算法",
	"数据结构",
	"学习",
	"复习",
	"笔记",
	"教程",
	"指南",
	"方法",
	"文章",
	"资料",
	"材料",
	"内容",
];

/// Extracts deduplicated lowercase candidate terms from mixed CJK/Latin text.
///
/// Over-generation is intentional: the scoring stage matches by containment
/// and tolerates noisy bigrams/trigrams.
pub fn extract(text: &str) -> Vec<String> {
	let cleaned = clean(text);
	let mut out = Vec::new();
	let mut seen = HashSet::new();

	for term in DOMAIN_TERMS {
		if cleaned.contains(term) {
			push_unique(&mut out, &mut seen, term);
		}
	}

	for run in han_runs(&cleaned) {
		let chars: Vec<char> = run.chars().collect();

		for width in [2_usize, 3] {
			if chars.len() < width {
				continue;
			}
			for window in chars.windows(width) {
				push_unique(&mut out, &mut seen, &window.iter().collect::<String>());
			}
		}
	}

	for token in cleaned.split_whitespace() {
		if token.chars().count() > 1 && token.chars().all(|c| c.is_ascii_alphabetic()) {
			push_unique(&mut out, &mut seen, token);
		}
	}

	out
}

/// NFKC-normalize, lowercase, and blank out everything that is neither a
/// word character, whitespace, nor a Han ideograph.
fn clean(text: &str) -> String {
	text.nfkc()
		.flat_map(char::to_lowercase)
		.map(|c| {
			if c.is_ascii_alphanumeric() || c == '_' || c.is_whitespace() || is_han(c) {
				c
			} else {
				' '
			}
		})
		.collect()
}

fn push_unique(out: &mut Vec<String>, seen: &mut HashSet<String>, value: &str) {
	if seen.insert(value.to_string()) {
		out.push(value.to_string());
	}
}
