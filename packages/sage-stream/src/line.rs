/// Marker glyphs the recommendation block opens its lines with; those lines
/// must survive chunking intact.
const MARKER_GLYPHS: &[char] = &['📚', '🎯', '📝', '📊', '🔗'];

/// Structural classification of a single reply line. Structural lines are
/// emitted as whole fragments; only `Plain` lines are subdivided.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LineKind {
	Blank,
	Heading,
	ListItem,
	Quote,
	CodeFence,
	TableRow,
	Rule,
	Marker,
	Plain,
}

impl LineKind {
	pub fn is_structural(self) -> bool {
		!matches!(self, Self::Blank | Self::Plain)
	}
}

pub fn classify_line(line: &str) -> LineKind {
	if line.trim().is_empty() {
		return LineKind::Blank;
	}
	if is_heading(line) {
		return LineKind::Heading;
	}
	if is_list_item(line) {
		return LineKind::ListItem;
	}
	if is_quote(line) {
		return LineKind::Quote;
	}
	if line.starts_with("```") {
		return LineKind::CodeFence;
	}
	if is_table_row(line) {
		return LineKind::TableRow;
	}
	if is_rule(line) {
		return LineKind::Rule;
	}
	if line.starts_with(MARKER_GLYPHS) {
		return LineKind::Marker;
	}

	LineKind::Plain
}

fn is_heading(line: &str) -> bool {
	let hashes = line.chars().take_while(|c| *c == '#').count();

	(1..=6).contains(&hashes) && line.chars().nth(hashes).is_some_and(char::is_whitespace)
}

fn is_list_item(line: &str) -> bool {
	let rest = line.trim_start();

	if let Some(next) = rest.strip_prefix(['-', '*', '+']) {
		return next.starts_with(char::is_whitespace);
	}

	let digits = rest.chars().take_while(char::is_ascii_digit).count();

	digits > 0
		&& rest[digits..].starts_with('.')
		&& rest[digits + 1..].starts_with(char::is_whitespace)
}

fn is_quote(line: &str) -> bool {
	line.trim_start().strip_prefix('>').is_some_and(|rest| rest.starts_with(char::is_whitespace))
}

fn is_table_row(line: &str) -> bool {
	line.starts_with('|') && line[1..].contains('|')
}

fn is_rule(line: &str) -> bool {
	line.len() >= 3 && line.chars().all(|c| c == '-')
}
