use unicode_script::{Script, UnicodeScript};

/// Han ideographs are the unit the keyword extractor windows over;
/// kana/hangul and CJK punctuation are deliberately excluded.
pub fn is_han(c: char) -> bool {
	c.script() == Script::Han
}

pub fn contains_han(input: &str) -> bool {
	input.chars().any(is_han)
}

/// Maximal contiguous Han runs of `input`, in order.
pub fn han_runs(input: &str) -> Vec<&str> {
	let mut runs = Vec::new();
	let mut start = None;

	for (idx, c) in input.char_indices() {
		if is_han(c) {
			if start.is_none() {
				start = Some(idx);
			}
		} else if let Some(begin) = start.take() {
			runs.push(&input[begin..idx]);
		}
	}
	if let Some(begin) = start {
		runs.push(&input[begin..]);
	}

	runs
}
