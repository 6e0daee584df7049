//! Most-recently-used document list kept by the host.

use std::path::{Path, PathBuf};

pub const DEFAULT_RECENT_CAPACITY: usize = 10;

/// Newest-first list of opened files without duplicates.
#[derive(Debug, Clone)]
pub struct RecentDocuments {
    entries: Vec<PathBuf>,
    capacity: usize,
}

impl Default for RecentDocuments {
    fn default() -> Self {
        Self::new(DEFAULT_RECENT_CAPACITY)
    }
}

impl RecentDocuments {
    pub fn new(capacity: usize) -> Self {
        Self {
            entries: Vec::new(),
            capacity: capacity.max(1),
        }
    }

    /// Move `path` to the front, evicting the oldest entry when full.
    pub fn record(&mut self, path: &Path) {
        self.entries.retain(|entry| entry != path);
        self.entries.insert(0, path.to_path_buf());
        self.entries.truncate(self.capacity);
    }

    pub fn entries(&self) -> &[PathBuf] {
        &self.entries
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
