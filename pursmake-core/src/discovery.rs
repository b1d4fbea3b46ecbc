//! Filesystem discovery: expanding pattern sets into file lists.

use std::path::{Path, PathBuf};

use anyhow::{anyhow, Result};
use walkdir::{DirEntry, WalkDir};

use crate::pattern::PatternSet;

/// Recursive walker rooted at a project directory.
///
/// Hidden files and directories are skipped during the walk; patterns
/// could not match them anyway, and it keeps `.git` and friends out of
/// the traversal entirely.
#[derive(Debug, Clone)]
pub struct ProjectWalker {
    root: PathBuf,
    follow_symlinks: bool,
}

impl ProjectWalker {
    pub fn new<P: Into<PathBuf>>(root: P) -> Self {
        Self {
            root: root.into(),
            follow_symlinks: false,
        }
    }

    pub fn follow_symlinks(mut self, follow: bool) -> Self {
        self.follow_symlinks = follow;
        self
    }

    /// Collect root-relative paths of all files matching the set,
    /// sorted and deduplicated.
    pub fn matching(&self, patterns: &PatternSet) -> Result<Vec<PathBuf>> {
        if !self.root.exists() {
            return Err(anyhow!(
                "project root does not exist: {}",
                self.root.display()
            ));
        }

        let mut found = Vec::new();
        let walk = WalkDir::new(&self.root)
            .follow_links(self.follow_symlinks)
            .into_iter()
            .filter_entry(|entry| entry.depth() == 0 || !is_hidden(entry));

        for entry in walk {
            let entry = entry?;
            if !entry.file_type().is_file() {
                continue;
            }
            let rel = match entry.path().strip_prefix(&self.root) {
                Ok(rel) => rel,
                Err(_) => continue,
            };
            if patterns.matches(rel) {
                found.push(rel.to_path_buf());
            }
        }

        found.sort();
        found.dedup();
        Ok(found)
    }
}

fn is_hidden(entry: &DirEntry) -> bool {
    entry
        .file_name()
        .to_str()
        .map(|name| name.starts_with('.'))
        .unwrap_or(false)
}
