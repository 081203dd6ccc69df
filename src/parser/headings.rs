/// Open headings by nesting level: index 0 is level 1.
pub type HeadingStack = Vec<String>;

const PATH_SEPARATOR: &str = " / ";

/// Apply a heading at `level` to `stack`.
///
/// The stack is cut to its first `level - 1` entries and the heading is
/// appended. Skipped levels are not padded: an h3 directly under an h1 takes
/// the second slot.
pub fn update(stack: &[String], level: usize, heading: &str) -> HeadingStack {
    let depth = level.max(1) - 1;
    let mut next: HeadingStack = stack.iter().take(depth).cloned().collect();
    next.push(heading.to_string());
    next
}

/// Heading at `level` (1-based), or "" if that level is not open.
pub fn category(stack: &[String], level: usize) -> &str {
    level
        .checked_sub(1)
        .and_then(|i| stack.get(i))
        .map(String::as_str)
        .unwrap_or("")
}

/// All non-empty open headings joined with " / ".
pub fn category_path(stack: &[String]) -> String {
    stack
        .iter()
        .filter(|h| !h.is_empty())
        .map(String::as_str)
        .collect::<Vec<_>>()
        .join(PATH_SEPARATOR)
}

// ── Tests ──
