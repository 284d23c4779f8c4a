mod line;
mod message;

pub use line::{LineKind, classify_line};
pub use message::{StreamMessage, StreamMetadata};

use unicode_segmentation::UnicodeSegmentation;

/// Flush bound for plain-text fragments, in grapheme clusters. Structural
/// lines and unsplittable CJK/punctuation runs may exceed it.
pub const CHUNK_BOUND: usize = 12;

/// CJK and Latin punctuation that may act as a fragment boundary inside a
/// plain line. Whitespace counts as a separator too.
const SEPARATORS: &[char] = &[
	'，', '。', '！', '？', '；', '：', '“', '”', '‘', '’', '（', '）', '【', '】', '《', '》',
	'、',
];

/// Splits a finished reply into ordered transmission-safe fragments.
///
/// Stateless and restartable: the same input always yields the same
/// fragments, and their concatenation reconstructs the input exactly.
/// Structural lines (Markdown, marker glyphs) are never subdivided; plain
/// lines break at punctuation/whitespace and are buffered up to
/// `CHUNK_BOUND` so CJK runs are never cut mid-character.
pub fn chunk_reply(text: &str) -> Vec<String> {
	let lines: Vec<&str> = text.split('\n').collect();
	let last = lines.len() - 1;
	let mut chunks = Vec::new();

	for (index, line) in lines.iter().enumerate() {
		// Interior lines own the newline that followed them in the input.
		let newline = if index < last { "\n" } else { "" };
		let kind = classify_line(line);

		if kind == LineKind::Plain {
			chunk_plain_line(line, newline, &mut chunks);
		} else {
			// Blank lines and structural lines travel whole.
			let fragment = format!("{line}{newline}");

			if !fragment.is_empty() {
				chunks.push(fragment);
			}
		}
	}

	chunks
}

fn chunk_plain_line(line: &str, newline: &str, chunks: &mut Vec<String>) {
	let mut fragments: Vec<String> = Vec::new();
	let mut buffer = String::new();
	let mut buffer_len = 0_usize;

	for (segment, is_sep) in split_segments(line) {
		let segment_len = segment.graphemes(true).count();

		// Separator runs always ride along with the current buffer.
		if !is_sep && buffer_len > 0 && buffer_len + segment_len > CHUNK_BOUND {
			fragments.push(std::mem::take(&mut buffer));

			buffer_len = 0;
		}

		buffer.push_str(segment);

		buffer_len += segment_len;
	}

	if !buffer.is_empty() {
		fragments.push(buffer);
	}

	match fragments.last_mut() {
		Some(last) => last.push_str(newline),
		None if !newline.is_empty() => fragments.push(newline.to_string()),
		None => {},
	}

	chunks.extend(fragments.into_iter().filter(|fragment| !fragment.is_empty()));
}

/// Alternating (run, is_separator) slices covering the whole line.
fn split_segments(line: &str) -> Vec<(&str, bool)> {
	let mut segments = Vec::new();
	let mut start = 0_usize;
	let mut current: Option<bool> = None;

	for (idx, c) in line.char_indices() {
		let kind = is_separator(c);

		match current {
			None => current = Some(kind),
			Some(previous) if previous != kind => {
				segments.push((&line[start..idx], previous));

				start = idx;
				current = Some(kind);
			},
			Some(_) => {},
		}
	}
	if let Some(kind) = current {
		segments.push((&line[start..], kind));
	}

	segments
}

fn is_separator(c: char) -> bool {
	c.is_whitespace() || SEPARATORS.contains(&c)
}
