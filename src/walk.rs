use std::path::{Path, PathBuf};

use anyhow::{bail, Result};
use tracing::warn;
use walkdir::{DirEntry, WalkDir};

/// Lazily walk `root` for `.md` files (any case), never descending into
/// directories whose name starts with `.`. Calling again restarts the walk.
pub fn iter_markdown_files(root: &Path) -> impl Iterator<Item = PathBuf> {
    WalkDir::new(root)
        .into_iter()
        .filter_entry(|e| e.depth() == 0 || !is_hidden_dir(e))
        .filter_map(|entry| match entry {
            Ok(e) => Some(e),
            Err(err) => {
                warn!("Skipping unreadable entry: {}", err);
                None
            }
        })
        .filter(is_markdown_file)
        .map(DirEntry::into_path)
}

/// All Markdown files under `root`, sorted so id assignment is reproducible.
pub fn markdown_files(root: &Path) -> Result<Vec<PathBuf>> {
    if !root.exists() {
        bail!("Repo directory not found: {}", root.display());
    }
    // A file root is rejected rather than walked as an empty tree.
    if !root.is_dir() {
        bail!("Repo path is not a directory: {}", root.display());
    }
    let mut files: Vec<PathBuf> = iter_markdown_files(root).collect();
    files.sort();
    Ok(files)
}

fn is_hidden_dir(entry: &DirEntry) -> bool {
    entry.file_type().is_dir() && entry.file_name().to_string_lossy().starts_with('.')
}

fn is_markdown_file(entry: &DirEntry) -> bool {
    let is_file = entry.file_type().is_file() || (entry.path_is_symlink() && entry.path().is_file());
    is_file && entry.file_name().to_string_lossy().to_lowercase().ends_with(".md")
}

// ── Tests ──

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn touch(root: &Path, rel: &str) {
        let path = root.join(rel);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, "# x\n").unwrap();
    }

    fn names(root: &Path) -> Vec<String> {
        markdown_files(root)
            .unwrap()
            .iter()
            .map(|p| crate::parser::relative_path(p, root))
            .collect()
    }

    #[test]
    fn finds_nested_markdown_sorted() {
        let dir = tempfile::tempdir().unwrap();
        touch(dir.path(), "z.md");
        touch(dir.path(), "a/b/deep.md");
        touch(dir.path(), "a/first.md");
        touch(dir.path(), "notes.txt");
        assert_eq!(names(dir.path()), vec!["a/b/deep.md", "a/first.md", "z.md"]);
    }

    #[test]
    fn extension_is_case_insensitive() {
        let dir = tempfile::tempdir().unwrap();
        touch(dir.path(), "README.MD");
        touch(dir.path(), "guide.Md");
        touch(dir.path(), "markdown.mdx");
        assert_eq!(names(dir.path()), vec!["README.MD", "guide.Md"]);
    }

    #[test]
    fn hidden_directories_pruned_at_any_depth() {
        let dir = tempfile::tempdir().unwrap();
        touch(dir.path(), ".git/notes.md");
        touch(dir.path(), "docs/.cache/deeper/page.md");
        touch(dir.path(), "docs/.hidden/x.md");
        touch(dir.path(), "docs/visible.md");
        assert_eq!(names(dir.path()), vec!["docs/visible.md"]);
    }

    #[test]
    fn hidden_files_are_not_pruned() {
        let dir = tempfile::tempdir().unwrap();
        touch(dir.path(), ".notes.md");
        assert_eq!(names(dir.path()), vec![".notes.md"]);
    }

    #[test]
    fn dotted_root_is_walked() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path().join(".repo");
        touch(&root, "inside.md");
        assert_eq!(names(&root), vec!["inside.md"]);
    }

    #[test]
    fn walk_is_restartable() {
        let dir = tempfile::tempdir().unwrap();
        touch(dir.path(), "one.md");
        touch(dir.path(), "two.md");
        assert_eq!(iter_markdown_files(dir.path()).count(), 2);
        assert_eq!(iter_markdown_files(dir.path()).count(), 2);
    }

    #[test]
    fn missing_root() {
        let dir = tempfile::tempdir().unwrap();
        let err = markdown_files(&dir.path().join("absent")).unwrap_err();
        assert!(err.to_string().starts_with("Repo directory not found"));
    }

    #[test]
    fn root_is_a_file() {
        let dir = tempfile::tempdir().unwrap();
        touch(dir.path(), "file.md");
        let err = markdown_files(&dir.path().join("file.md")).unwrap_err();
        assert!(err.to_string().starts_with("Repo path is not a directory"));
    }
}
