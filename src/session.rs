//! In-memory state of the document shown in one window.
//!
//! A `DocumentSession` is owned by the application struct and handed to the
//! event handlers that need it. It never touches the filesystem: saves are
//! turned into [`HostRequest`]s and the session only learns the outcome when
//! the host answers with a `FileOpened` notification.

use crate::host::HostRequest;
use crate::html_export;
use std::path::{Path, PathBuf};

/// Application name used in window titles.
pub const APP_NAME: &str = "Markdown Viewer";

/// Enablement of the document controls, derived from the session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct UiState {
    pub save: bool,
    pub revert: bool,
    pub save_html: bool,
    pub show_file: bool,
    pub open_in_default: bool,
    /// Platform "document edited" indicator.
    pub document_edited: bool,
}

/// Path, last-saved snapshot and live buffer of the current document.
#[derive(Debug, Clone, Default)]
pub struct DocumentSession {
    file_path: Option<PathBuf>,
    original_content: String,
    current_content: String,
    rendered_html: String,
}

impl DocumentSession {
    /// Empty, unsaved buffer.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn file_path(&self) -> Option<&Path> {
        self.file_path.as_deref()
    }

    pub fn original_content(&self) -> &str {
        &self.original_content
    }

    pub fn current_content(&self) -> &str {
        &self.current_content
    }

    pub fn rendered_html(&self) -> &str {
        &self.rendered_html
    }

    pub fn is_edited(&self) -> bool {
        self.current_content != self.original_content
    }

    /// Adopt a file delivered by the host, either freshly opened or
    /// re-read after a save.
    pub fn on_file_opened(&mut self, path: PathBuf, content: String) {
        self.file_path = Some(path);
        self.original_content = content.clone();
        self.set_content(content);
    }

    /// Adopt the path and on-disk text of a save while keeping the live
    /// buffer, which may have moved on since the save was requested.
    pub fn on_file_saved(&mut self, path: PathBuf, content: String) {
        self.file_path = Some(path);
        self.original_content = content;
    }

    /// Replace the live buffer with the editor's contents.
    pub fn on_edit(&mut self, new_content: impl Into<String>) {
        let new_content = new_content.into();
        if new_content == self.current_content {
            return;
        }
        self.set_content(new_content);
    }

    /// Discard edits and return to the last loaded or saved text.
    pub fn revert(&mut self) {
        let original = self.original_content.clone();
        self.on_edit(original);
    }

    /// Start over with an empty, pathless buffer.
    pub fn reset(&mut self) {
        *self = Self::new();
    }

    pub fn on_save_requested(&self) -> HostRequest {
        HostRequest::SaveMarkdown {
            path: self.file_path.clone(),
            content: self.current_content.clone(),
        }
    }

    pub fn on_save_html_requested(&self) -> HostRequest {
        HostRequest::SaveHtml {
            content: self.rendered_html.clone(),
        }
    }

    pub fn refresh_ui_state(&self) -> UiState {
        let edited = self.is_edited();
        let has_path = self.file_path.is_some();
        UiState {
            save: edited,
            revert: edited,
            save_html: !self.rendered_html.is_empty(),
            show_file: has_path,
            open_in_default: has_path,
            document_edited: edited,
        }
    }

    /// `"<basename> - Markdown Viewer (Edited)"`, dropping the parts that
    /// do not apply.
    pub fn window_title(&self) -> String {
        let mut title = match self.file_path.as_deref().and_then(Path::file_name) {
            Some(name) => format!("{} - {APP_NAME}", name.to_string_lossy()),
            None => APP_NAME.to_string(),
        };
        if self.is_edited() {
            title.push_str(" (Edited)");
        }
        title
    }

    fn set_content(&mut self, content: String) {
        self.rendered_html = html_export::render(&content);
        self.current_content = content;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn opened(path: &str, content: &str) -> DocumentSession {
        let mut session = DocumentSession::new();
        session.on_file_opened(PathBuf::from(path), content.to_string());
        session
    }

    #[test]
    fn test_new_session_is_empty_and_clean() {
        let session = DocumentSession::new();
        assert!(session.file_path().is_none());
        assert_eq!(session.current_content(), "");
        assert!(!session.is_edited());
        assert_eq!(session.rendered_html(), "");
        assert_eq!(session.window_title(), "Markdown Viewer");
    }

    #[test]
    fn test_file_opened_sets_all_fields() {
        let session = opened("notes.md", "# Hi");
        assert_eq!(session.file_path(), Some(Path::new("notes.md")));
        assert_eq!(session.original_content(), "# Hi");
        assert_eq!(session.current_content(), "# Hi");
        assert!(!session.is_edited());
        assert!(session.rendered_html().contains("<h1>Hi</h1>"));
    }

    #[test]
    fn test_edit_marks_session_edited() {
        let mut session = opened("notes.md", "# Hi");
        session.on_edit("# Hi!");
        assert!(session.is_edited());

        let ui = session.refresh_ui_state();
        assert!(ui.save);
        assert!(ui.revert);
        assert!(ui.document_edited);
        assert_eq!(session.window_title(), "notes.md - Markdown Viewer (Edited)");
    }

    #[test]
    fn test_repeated_edit_is_idempotent() {
        for content in ["", "# Hi", "# Hi!", "plain text\n"] {
            let mut session = opened("a.md", "# Hi");
            session.on_edit(content);
            let first = session.is_edited();
            session.on_edit(content);
            assert_eq!(session.is_edited(), first, "content {content:?}");
        }
    }

    #[test]
    fn test_editing_back_to_original_clears_edited() {
        let mut session = opened("a.md", "one");
        session.on_edit("two");
        session.on_edit("one");
        assert!(!session.is_edited());
    }

    #[test]
    fn test_save_html_enabled_only_with_html() {
        let mut session = DocumentSession::new();
        assert!(!session.refresh_ui_state().save_html);
        session.on_edit("text");
        assert!(session.refresh_ui_state().save_html);
        session.on_edit("");
        assert!(!session.refresh_ui_state().save_html);
    }

    #[test]
    fn test_path_dependent_controls() {
        let mut session = DocumentSession::new();
        session.on_edit("draft");
        let ui = session.refresh_ui_state();
        assert!(!ui.show_file);
        assert!(!ui.open_in_default);
        assert_eq!(session.window_title(), "Markdown Viewer (Edited)");

        let session = opened("/tmp/docs/readme.md", "x");
        let ui = session.refresh_ui_state();
        assert!(ui.show_file);
        assert!(ui.open_in_default);
        assert!(!ui.save);
        assert_eq!(session.window_title(), "readme.md - Markdown Viewer");
    }

    #[test]
    fn test_save_request_carries_path_and_buffer() {
        let mut session = opened("notes.md", "# Hi");
        session.on_edit("# Hi!");
        assert_eq!(
            session.on_save_requested(),
            HostRequest::SaveMarkdown {
                path: Some(PathBuf::from("notes.md")),
                content: "# Hi!".to_string(),
            }
        );

        let mut untitled = DocumentSession::new();
        untitled.on_edit("draft");
        assert_eq!(
            untitled.on_save_requested(),
            HostRequest::SaveMarkdown {
                path: None,
                content: "draft".to_string(),
            }
        );
    }

    #[test]
    fn test_save_html_request_carries_rendered_html() {
        let session = opened("notes.md", "# Hi");
        match session.on_save_html_requested() {
            HostRequest::SaveHtml { content } => assert!(content.contains("<h1>Hi</h1>")),
            other => panic!("unexpected request {other:?}"),
        }
    }

    #[test]
    fn test_revert_and_reset() {
        let mut session = opened("notes.md", "# Hi");
        session.on_edit("changed");
        session.revert();
        assert_eq!(session.current_content(), "# Hi");
        assert!(!session.is_edited());
        assert!(session.rendered_html().contains("<h1>"));

        session.reset();
        assert!(session.file_path().is_none());
        assert_eq!(session.original_content(), "");
        assert!(!session.refresh_ui_state().save_html);
    }

    #[test]
    fn test_reopen_after_save_resets_edited() {
        let mut session = opened("notes.md", "# Hi");
        session.on_edit("# Hi!");
        session.on_file_opened(PathBuf::from("notes.md"), "# Hi!".to_string());
        assert!(!session.is_edited());
        assert_eq!(session.original_content(), "# Hi!");
    }

    #[test]
    fn test_file_saved_keeps_later_edits() {
        let mut session = DocumentSession::new();
        session.on_edit("# Draft");
        session.on_edit("# Draft, continued");
        session.on_file_saved(PathBuf::from("out.md"), "# Draft".to_string());

        assert_eq!(session.file_path(), Some(Path::new("out.md")));
        assert_eq!(session.original_content(), "# Draft");
        assert_eq!(session.current_content(), "# Draft, continued");
        assert!(session.rendered_html().contains("continued"));
        assert!(session.is_edited());

        session.on_file_saved(PathBuf::from("out.md"), "# Draft, continued".to_string());
        assert!(!session.is_edited());
    }
}
