//! Drag-and-drop of files onto the window.
//!
//! Only markdown and plain-text files may be dropped. Native drags rarely
//! carry a MIME type, so when none is declared one is inferred from the file
//! extension before classifying the item.

use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DragState {
    #[default]
    Idle,
    OverValid,
    OverInvalid,
}

/// What the application should do after a drop.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DropOutcome {
    Open(PathBuf),
    /// Show the blocking "unsupported file type" notice.
    Unsupported { name: String },
    /// Nothing usable was dropped (for example no filesystem path).
    Ignored,
}

#[derive(Debug, Default)]
pub struct DropZone {
    state: DragState,
}

impl DropZone {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> DragState {
        self.state
    }

    /// An item is hovering over the window. Only the first hover after
    /// `Idle` classifies it.
    pub fn drag_over(&mut self, mime: &str, path: Option<&Path>) {
        if self.state == DragState::Idle {
            self.state = classify(mime, path);
        }
    }

    pub fn drag_leave(&mut self) {
        self.state = DragState::Idle;
    }

    /// The item was released over the window.
    pub fn drop_item(&mut self, mime: &str, path: Option<PathBuf>) -> DropOutcome {
        let state = match self.state {
            // Hover and drop can land in the same frame.
            DragState::Idle => classify(mime, path.as_deref()),
            over => over,
        };
        self.state = DragState::Idle;

        match state {
            DragState::OverValid => match path {
                Some(path) => DropOutcome::Open(path),
                None => {
                    log::warn!("Dropped item has no filesystem path; ignoring");
                    DropOutcome::Ignored
                }
            },
            _ => DropOutcome::Unsupported {
                name: path
                    .as_deref()
                    .and_then(Path::file_name)
                    .map(|name| name.to_string_lossy().into_owned())
                    .unwrap_or_else(|| mime.to_string()),
            },
        }
    }
}

fn classify(mime: &str, path: Option<&Path>) -> DragState {
    if is_supported_mime(&declared_mime(mime, path)) {
        DragState::OverValid
    } else {
        DragState::OverInvalid
    }
}

/// The item's MIME type, falling back to one inferred from its extension.
pub fn declared_mime(mime: &str, path: Option<&Path>) -> String {
    let mime = mime.trim();
    if !mime.is_empty() {
        return mime.to_string();
    }
    let extension = path
        .and_then(Path::extension)
        .and_then(|ext| ext.to_str())
        .map(str::to_ascii_lowercase);
    match extension.as_deref() {
        Some("md" | "mdown" | "markdown") => "text/markdown".to_string(),
        Some("txt" | "text") => "text/plain".to_string(),
        _ => String::new(),
    }
}

pub fn is_supported_mime(mime: &str) -> bool {
    let essence = mime.split(';').next().unwrap_or_default().trim();
    matches!(
        essence.to_ascii_lowercase().as_str(),
        "text/plain" | "text/markdown" | "text/x-markdown"
    )
}
