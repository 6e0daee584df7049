//! Native file dialogs.
//!
//! Every method returns `None` when the user cancels; cancellation is a
//! normal outcome, not an error.

use rfd::FileDialog;
use std::path::{Path, PathBuf};

pub const OPEN_MARKDOWN_EXTENSIONS: &[&str] = &["md", "mdown", "markdown"];
pub const OPEN_TEXT_EXTENSIONS: &[&str] = &["txt", "text"];
pub const SAVE_MARKDOWN_EXTENSIONS: &[&str] = &["md", "markdown", "mdown"];
pub const SAVE_HTML_EXTENSIONS: &[&str] = &["htm", "html"];

/// Dialog surface the host needs. Implemented natively with `rfd` and by
/// scripted fakes in tests.
pub trait FileDialogs: Send {
    /// Ask for a markdown or text file to open.
    fn pick_markdown_file(&mut self) -> Option<PathBuf>;

    /// Ask where to save markdown, starting in `directory`.
    fn save_markdown_file(&mut self, directory: Option<&Path>) -> Option<PathBuf>;

    /// Ask where to save exported HTML, starting in `directory`.
    fn save_html_file(&mut self, directory: Option<&Path>) -> Option<PathBuf>;
}

#[derive(Debug, Default, Clone, Copy)]
pub struct NativeDialogs;

impl NativeDialogs {
    fn in_directory(dialog: FileDialog, directory: Option<&Path>) -> FileDialog {
        match directory {
            Some(dir) => dialog.set_directory(dir),
            None => dialog,
        }
    }
}

impl FileDialogs for NativeDialogs {
    fn pick_markdown_file(&mut self) -> Option<PathBuf> {
        FileDialog::new()
            .set_title("Open Markdown File")
            .add_filter("Markdown Files", OPEN_MARKDOWN_EXTENSIONS)
            .add_filter("Text Files", OPEN_TEXT_EXTENSIONS)
            .pick_file()
    }

    fn save_markdown_file(&mut self, directory: Option<&Path>) -> Option<PathBuf> {
        let dialog = FileDialog::new()
            .set_title("Save Markdown")
            .set_file_name("untitled.md")
            .add_filter("Markdown Files", SAVE_MARKDOWN_EXTENSIONS);
        Self::in_directory(dialog, directory).save_file()
    }

    fn save_html_file(&mut self, directory: Option<&Path>) -> Option<PathBuf> {
        let dialog = FileDialog::new()
            .set_title("Save HTML")
            .set_file_name("untitled.html")
            .add_filter("HTML Files", SAVE_HTML_EXTENSIONS);
        Self::in_directory(dialog, directory).save_file()
    }
}
