//! Markdown to HTML conversion.
//!
//! The HTML produced here is what Save HTML writes to disk and what decides
//! whether that action is available. pulldown-cmark is permissive, so any
//! input (including broken markdown) yields best-effort HTML.

use pulldown_cmark::{html, Options, Parser};

/// Extensions enabled for both the HTML export and the on-screen preview.
pub fn markdown_options() -> Options {
    let mut options = Options::empty();
    options.insert(Options::ENABLE_STRIKETHROUGH);
    options.insert(Options::ENABLE_TABLES);
    options.insert(Options::ENABLE_FOOTNOTES);
    options.insert(Options::ENABLE_TASKLISTS);
    options
}

/// Render markdown text to an HTML fragment.
pub fn render(markdown: &str) -> String {
    let parser = Parser::new_ext(markdown, markdown_options());
    let mut out = String::with_capacity(markdown.len() * 3 / 2);
    html::push_html(&mut out, parser);
    out
}
