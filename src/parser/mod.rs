pub mod blocks;
pub mod headings;

use std::path::{Component, Path};
use std::sync::LazyLock;

use anyhow::{Context, Result};
use regex::Regex;
use tracing::{debug, warn};

use crate::record::ResourceRecord;
use blocks::Block;
use headings::HeadingStack;

static LINE_BREAK_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\r\n|[\n\r\x0b\x0c\x1c-\x1e\x{85}\x{2028}\x{2029}]").unwrap()
});

/// A Markdown file read from disk, ready to scan.
pub struct SourceFile {
    pub rel_path: String,
    pub text: String,
}

/// Read `path` and decode it, dropping invalid UTF-8 if strict decoding fails.
pub fn load(path: &Path, root: &Path) -> Result<SourceFile> {
    let bytes = std::fs::read(path).with_context(|| format!("Failed to read {}", path.display()))?;
    let text = match String::from_utf8(bytes) {
        Ok(text) => text,
        Err(e) => {
            warn!("{} is not valid UTF-8, dropping undecodable bytes", path.display());
            decode_lossy(e.as_bytes())
        }
    };
    Ok(SourceFile {
        rel_path: relative_path(path, root),
        text,
    })
}

/// Keep every valid UTF-8 run, skip the rest.
pub fn decode_lossy(bytes: &[u8]) -> String {
    let mut out = String::with_capacity(bytes.len());
    for chunk in bytes.utf8_chunks() {
        out.push_str(chunk.valid());
    }
    out
}

/// Path of `path` under `root`, `/`-separated on every platform.
pub fn relative_path(path: &Path, root: &Path) -> String {
    let rel = path.strip_prefix(root).unwrap_or(path);
    rel.components()
        .filter_map(|c| match c {
            Component::Normal(part) => Some(part.to_string_lossy()),
            _ => None,
        })
        .collect::<Vec<_>>()
        .join("/")
}

/// Split on every line boundary (lone `\r`, form feed, U+2028 and the like,
/// not only `\n`). Terminators are dropped and a trailing one does not yield
/// an empty last line.
pub fn split_lines(text: &str) -> Vec<&str> {
    let mut lines: Vec<&str> = LINE_BREAK_RE.split(text).collect();
    if lines.last() == Some(&"") {
        lines.pop();
    }
    lines
}

/// Two-pass scan: lines → blocks → records.
///
/// Headings update the stack and take effect for every following line of the
/// same file. Records are numbered from `start_id`; the returned id is the one
/// the next file should start from.
pub fn scan_file(text: &str, rel_path: &str, start_id: u64) -> (Vec<ResourceRecord>, u64) {
    let mut records = Vec::new();
    let mut stack: HeadingStack = Vec::new();
    let mut next_id = start_id;

    for line in split_lines(text) {
        match blocks::classify_line(line) {
            Block::Heading { level, text } => {
                stack = headings::update(&stack, level, &text);
            }
            Block::Resource(resource) => {
                records.push(ResourceRecord {
                    id: next_id,
                    title: resource.title,
                    url: resource.url,
                    description: resource.description,
                    category_h1: headings::category(&stack, 1).to_string(),
                    category_h2: headings::category(&stack, 2).to_string(),
                    category_h3: headings::category(&stack, 3).to_string(),
                    category_path: headings::category_path(&stack),
                    file_path: rel_path.to_string(),
                    raw_line: line.to_string(),
                });
                next_id += 1;
            }
            Block::Other => {}
        }
    }

    debug!("{}: {} resources", rel_path, records.len());
    (records, next_id)
}

// ── Tests ──
