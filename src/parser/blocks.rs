use std::sync::LazyLock;

use regex::Regex;

static HEADING_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^(#{1,6})\s+(.*)").unwrap());
static CLOSING_HASHES_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\s+#*$").unwrap());
static RESOURCE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\s*[-*+]\s+\[(.+?)\]\((.+?)\)\s*(?:[-–—]\s*(.*))?$").unwrap()
});

const DASHES: &[char] = &['-', '–', '—'];

/// A list-item link: `- [title](url) - description`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resource {
    pub title: String,
    pub url: String,
    pub description: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Block {
    Heading { level: usize, text: String },
    Resource(Resource),
    Other,
}

/// Classify one physical line. Headings win over list items.
pub fn classify_line(line: &str) -> Block {
    if let Some((level, text)) = parse_heading(line) {
        return Block::Heading { level, text };
    }
    match extract_resource(line) {
        Some(resource) => Block::Resource(resource),
        None => Block::Other,
    }
}

/// ATX heading: 1–6 `#` at column 0, whitespace, then the (cleaned) text.
pub fn parse_heading(line: &str) -> Option<(usize, String)> {
    let caps = HEADING_RE.captures(line)?;
    Some((caps[1].len(), normalize_heading(&caps[2])))
}

/// Strip surrounding whitespace and a closing `##` sequence.
pub fn normalize_heading(text: &str) -> String {
    let cleaned = text.trim();
    CLOSING_HASHES_RE.replace(cleaned, "").trim().to_string()
}

/// Match a list item whose first content is a `[text](url)` link.
pub fn extract_resource(line: &str) -> Option<Resource> {
    let caps = RESOURCE_RE.captures(line)?;
    let description = caps
        .get(3)
        .map(|m| m.as_str().trim().trim_start_matches(DASHES).trim())
        .unwrap_or("");

    Some(Resource {
        title: caps[1].trim().to_string(),
        url: caps[2].trim().to_string(),
        description: description.to_string(),
    })
}

// ── Tests ──
