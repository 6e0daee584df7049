//! Native preview of the markdown buffer.
//!
//! The buffer is parsed into a flat list of [`PreviewBlock`]s with the same
//! pulldown-cmark options used for HTML export, then laid out with egui.
//! Nested lists are flattened with a depth, nested quotes are merged into
//! their outermost quote.

use crate::html_export::markdown_options;
use egui::{Color32, RichText, Stroke};
use pulldown_cmark::{CodeBlockKind, Event, Parser, Tag};

/// Font size configuration
#[derive(Debug, Clone)]
pub struct FontSizes {
    pub body: f32,
    pub headings: [f32; 6],
    pub code: f32,
}

impl Default for FontSizes {
    fn default() -> Self {
        Self {
            body: 14.0,
            headings: [28.0, 24.0, 20.0, 18.0, 16.0, 14.0],
            code: 13.0,
        }
    }
}

impl FontSizes {
    pub fn heading(&self, level: u8) -> f32 {
        let index = usize::from(level.clamp(1, 6)) - 1;
        self.headings[index]
    }
}

/// Inline text span with formatting
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InlineSpan {
    Text(String),
    Code(String),
    Strong(String),
    Emphasis(String),
    Strikethrough(String),
    Link { text: String, url: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListItem {
    pub depth: usize,
    /// Item number for ordered lists.
    pub number: Option<u64>,
    /// Task list state, if the item is a task.
    pub checked: Option<bool>,
    pub spans: Vec<InlineSpan>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PreviewBlock {
    Paragraph(Vec<InlineSpan>),
    Heading {
        level: u8,
        spans: Vec<InlineSpan>,
    },
    CodeBlock {
        language: Option<String>,
        text: String,
    },
    List(Vec<ListItem>),
    Quote(Vec<Vec<InlineSpan>>),
    Table {
        headers: Vec<Vec<InlineSpan>>,
        rows: Vec<Vec<Vec<InlineSpan>>>,
    },
    Html(String),
    Rule,
}

/// Parse markdown into preview blocks. Never fails; unknown events are
/// skipped.
pub fn parse(markdown: &str) -> Vec<PreviewBlock> {
    let events: Vec<Event> = Parser::new_ext(markdown, markdown_options()).collect();
    let mut blocks = Vec::new();
    let mut i = 0;
    while i < events.len() {
        i = parse_block(&events, i, &mut blocks);
    }
    blocks
}

fn same_tag(a: &Tag, b: &Tag) -> bool {
    std::mem::discriminant(a) == std::mem::discriminant(b)
}

fn parse_block(events: &[Event], start: usize, blocks: &mut Vec<PreviewBlock>) -> usize {
    match &events[start] {
        Event::Start(tag @ Tag::Paragraph) => {
            let (spans, next) = parse_inline(events, start + 1, tag);
            if !spans.is_empty() {
                blocks.push(PreviewBlock::Paragraph(spans));
            }
            next
        }
        Event::Start(tag @ Tag::Heading(level, _, _)) => {
            let (spans, next) = parse_inline(events, start + 1, tag);
            blocks.push(PreviewBlock::Heading {
                level: *level as u8,
                spans,
            });
            next
        }
        Event::Start(Tag::CodeBlock(kind)) => {
            let language = match kind {
                CodeBlockKind::Fenced(lang) if !lang.is_empty() => Some(lang.to_string()),
                _ => None,
            };
            let mut text = String::new();
            let mut i = start + 1;
            while i < events.len() {
                match &events[i] {
                    Event::End(Tag::CodeBlock(_)) => {
                        i += 1;
                        break;
                    }
                    Event::Text(t) => text.push_str(t),
                    _ => {}
                }
                i += 1;
            }
            blocks.push(PreviewBlock::CodeBlock { language, text });
            i
        }
        Event::Start(Tag::List(first)) => {
            let mut items = Vec::new();
            let next = parse_list(events, start + 1, *first, 0, &mut items);
            blocks.push(PreviewBlock::List(items));
            next
        }
        Event::Start(Tag::BlockQuote) => {
            let (lines, next) = parse_quote(events, start + 1);
            if !lines.is_empty() {
                blocks.push(PreviewBlock::Quote(lines));
            }
            next
        }
        Event::Start(Tag::Table(_)) => {
            let (headers, rows, next) = parse_table(events, start + 1);
            blocks.push(PreviewBlock::Table { headers, rows });
            next
        }
        Event::Html(html) => {
            let mut text = html.to_string();
            let mut i = start + 1;
            while let Some(Event::Html(more)) = events.get(i) {
                text.push_str(more);
                i += 1;
            }
            blocks.push(PreviewBlock::Html(text.trim_end().to_string()));
            i
        }
        Event::Rule => {
            blocks.push(PreviewBlock::Rule);
            start + 1
        }
        // Stray inline content outside a paragraph (e.g. footnote bodies).
        Event::Text(_) | Event::Code(_) => {
            let mut inline = InlineCollector::default();
            let mut i = start;
            while let Some(next) = inline.step(events, i) {
                i = next;
            }
            let spans = inline.finish();
            if !spans.is_empty() {
                blocks.push(PreviewBlock::Paragraph(spans));
            }
            i
        }
        _ => start + 1,
    }
}

/// Accumulates inline events into spans.
#[derive(Default)]
struct InlineCollector {
    spans: Vec<InlineSpan>,
    text: String,
}

impl InlineCollector {
    fn flush(&mut self) {
        if !self.text.is_empty() {
            self.spans.push(InlineSpan::Text(std::mem::take(&mut self.text)));
        }
    }

    fn push(&mut self, span: InlineSpan) {
        self.flush();
        self.spans.push(span);
    }

    /// Consume one inline construct at `i`, returning the next index, or
    /// `None` when `events[i]` is not inline content.
    fn step(&mut self, events: &[Event], i: usize) -> Option<usize> {
        match events.get(i)? {
            Event::Text(t) => self.text.push_str(t),
            Event::Code(code) => self.push(InlineSpan::Code(code.to_string())),
            Event::SoftBreak => self.text.push(' '),
            Event::HardBreak => self.text.push('\n'),
            Event::FootnoteReference(name) => self.text.push_str(&format!("[^{name}]")),
            Event::Start(tag @ Tag::Strong) => {
                let (text, next) = collect_text(events, i + 1, tag);
                self.push(InlineSpan::Strong(text));
                return Some(next);
            }
            Event::Start(tag @ Tag::Emphasis) => {
                let (text, next) = collect_text(events, i + 1, tag);
                self.push(InlineSpan::Emphasis(text));
                return Some(next);
            }
            Event::Start(tag @ Tag::Strikethrough) => {
                let (text, next) = collect_text(events, i + 1, tag);
                self.push(InlineSpan::Strikethrough(text));
                return Some(next);
            }
            Event::Start(tag @ (Tag::Link(_, url, _) | Tag::Image(_, url, _))) => {
                let url = url.to_string();
                let (text, next) = collect_text(events, i + 1, tag);
                let text = if text.is_empty() { url.clone() } else { text };
                self.push(InlineSpan::Link { text, url });
                return Some(next);
            }
            _ => return None,
        }
        Some(i + 1)
    }

    fn finish(mut self) -> Vec<InlineSpan> {
        self.flush();
        self.spans
    }
}

/// Parse inline spans until the end of `end_tag`.
fn parse_inline(events: &[Event], start: usize, end_tag: &Tag) -> (Vec<InlineSpan>, usize) {
    let mut inline = InlineCollector::default();
    let mut i = start;
    while i < events.len() {
        if let Event::End(tag) = &events[i] {
            if same_tag(tag, end_tag) {
                return (inline.finish(), i + 1);
            }
        }
        i = inline.step(events, i).unwrap_or(i + 1);
    }
    (inline.finish(), i)
}

/// Collect plain text until the matching end tag, flattening nested styles.
fn collect_text(events: &[Event], start: usize, end_tag: &Tag) -> (String, usize) {
    let mut text = String::new();
    let mut depth = 0usize;
    let mut i = start;
    while i < events.len() {
        match &events[i] {
            Event::Start(tag) if same_tag(tag, end_tag) => depth += 1,
            Event::End(tag) if same_tag(tag, end_tag) => {
                if depth == 0 {
                    return (text, i + 1);
                }
                depth -= 1;
            }
            Event::Text(t) | Event::Code(t) => text.push_str(t),
            Event::SoftBreak | Event::HardBreak => text.push(' '),
            _ => {}
        }
        i += 1;
    }
    (text, i)
}

/// Parse list items after `Start(List)`, pushing nested lists as deeper
/// items directly after their parent.
fn parse_list(
    events: &[Event],
    start: usize,
    first_number: Option<u64>,
    depth: usize,
    items: &mut Vec<ListItem>,
) -> usize {
    let mut number = first_number;
    let mut i = start;
    while i < events.len() {
        match &events[i] {
            Event::Start(Tag::Item) => {
                let mut inline = InlineCollector::default();
                let mut checked = None;
                let mut nested = Vec::new();
                i += 1;
                while i < events.len() {
                    match &events[i] {
                        Event::End(Tag::Item) => {
                            i += 1;
                            break;
                        }
                        Event::TaskListMarker(done) => {
                            checked = Some(*done);
                            i += 1;
                        }
                        Event::Start(Tag::List(first)) => {
                            i = parse_list(events, i + 1, *first, depth + 1, &mut nested);
                        }
                        Event::Start(Tag::Paragraph) => {
                            if !inline.spans.is_empty() || !inline.text.is_empty() {
                                inline.text.push('\n');
                            }
                            i += 1;
                        }
                        _ => i = inline.step(events, i).unwrap_or(i + 1),
                    }
                }
                items.push(ListItem {
                    depth,
                    number,
                    checked,
                    spans: inline.finish(),
                });
                items.append(&mut nested);
                number = number.map(|n| n + 1);
            }
            Event::End(Tag::List(_)) => return i + 1,
            _ => i += 1,
        }
    }
    i
}

/// Collect quote paragraphs as lines until the matching end.
fn parse_quote(events: &[Event], start: usize) -> (Vec<Vec<InlineSpan>>, usize) {
    let mut lines = Vec::new();
    let mut depth = 0usize;
    let mut i = start;
    while i < events.len() {
        match &events[i] {
            Event::Start(Tag::BlockQuote) => {
                depth += 1;
                i += 1;
            }
            Event::End(Tag::BlockQuote) => {
                if depth == 0 {
                    return (lines, i + 1);
                }
                depth -= 1;
                i += 1;
            }
            Event::Start(tag @ (Tag::Paragraph | Tag::Heading(..))) => {
                let (spans, next) = parse_inline(events, i + 1, tag);
                if !spans.is_empty() {
                    lines.push(spans);
                }
                i = next;
            }
            _ => i += 1,
        }
    }
    (lines, i)
}

type TableCells = (Vec<Vec<InlineSpan>>, Vec<Vec<Vec<InlineSpan>>>, usize);

fn parse_table(events: &[Event], start: usize) -> TableCells {
    let mut headers = Vec::new();
    let mut rows = Vec::new();
    let mut row = Vec::new();
    let mut i = start;
    while i < events.len() {
        match &events[i] {
            Event::Start(tag @ Tag::TableCell) => {
                let (spans, next) = parse_inline(events, i + 1, tag);
                row.push(spans);
                i = next;
            }
            Event::End(Tag::TableHead) => {
                headers = std::mem::take(&mut row);
                i += 1;
            }
            Event::End(Tag::TableRow) => {
                rows.push(std::mem::take(&mut row));
                i += 1;
            }
            Event::End(Tag::Table(_)) => return (headers, rows, i + 1),
            _ => i += 1,
        }
    }
    (headers, rows, i)
}

/// Lay out parsed blocks in `ui`.
pub fn render(ui: &mut egui::Ui, blocks: &[PreviewBlock], sizes: &FontSizes) {
    for block in blocks {
        match block {
            PreviewBlock::Paragraph(spans) => {
                render_spans(ui, spans, sizes.body, false);
                ui.add_space(4.0);
            }
            PreviewBlock::Heading { level, spans } => {
                ui.add_space(8.0);
                render_spans(ui, spans, sizes.heading(*level), true);
                if *level <= 2 {
                    ui.separator();
                }
                ui.add_space(4.0);
            }
            PreviewBlock::CodeBlock { language, text } => {
                render_code_block(ui, language.as_deref(), text, sizes);
            }
            PreviewBlock::List(items) => render_list(ui, items, sizes),
            PreviewBlock::Quote(lines) => render_quote(ui, lines, sizes),
            PreviewBlock::Table { headers, rows } => render_table(ui, headers, rows, sizes),
            PreviewBlock::Html(html) => {
                ui.label(
                    RichText::new(html)
                        .monospace()
                        .size(sizes.code)
                        .color(ui.visuals().weak_text_color()),
                );
            }
            PreviewBlock::Rule => {
                ui.add_space(6.0);
                ui.separator();
                ui.add_space(6.0);
            }
        }
    }
}

fn render_spans(ui: &mut egui::Ui, spans: &[InlineSpan], size: f32, strong: bool) {
    ui.horizontal_wrapped(|ui| {
        // Avoid artificial gaps between inline fragments
        ui.spacing_mut().item_spacing.x = 0.0;
        for span in spans {
            render_span(ui, span, size, strong);
        }
    });
}

fn render_span(ui: &mut egui::Ui, span: &InlineSpan, size: f32, strong: bool) {
    let styled = |text: &str| {
        let rich = RichText::new(text).size(size);
        if strong {
            rich.strong()
        } else {
            rich
        }
    };
    match span {
        InlineSpan::Text(text) => {
            ui.label(styled(text));
        }
        InlineSpan::Strong(text) => {
            ui.label(styled(text).strong());
        }
        InlineSpan::Emphasis(text) => {
            ui.label(styled(text).italics());
        }
        InlineSpan::Strikethrough(text) => {
            ui.label(styled(text).strikethrough());
        }
        InlineSpan::Code(code) => {
            ui.label(
                RichText::new(code)
                    .monospace()
                    .size(size * 0.9)
                    .background_color(ui.visuals().code_bg_color),
            );
        }
        InlineSpan::Link { text, url } => {
            ui.hyperlink_to(styled(text), url);
        }
    }
}

fn render_code_block(ui: &mut egui::Ui, language: Option<&str>, code: &str, sizes: &FontSizes) {
    ui.add_space(4.0);
    egui::Frame::none()
        .fill(ui.visuals().extreme_bg_color)
        .stroke(Stroke::new(1.0, ui.visuals().widgets.noninteractive.bg_stroke.color))
        .rounding(egui::Rounding::same(4.0))
        .inner_margin(8.0)
        .show(ui, |ui| {
            ui.set_width(ui.available_width());
            if let Some(lang) = language {
                ui.label(
                    RichText::new(lang)
                        .monospace()
                        .size(sizes.code - 1.0)
                        .color(ui.visuals().weak_text_color()),
                );
            }
            ui.label(
                RichText::new(code.trim_end_matches('\n'))
                    .monospace()
                    .size(sizes.code),
            );
        });
    ui.add_space(4.0);
}

fn render_list(ui: &mut egui::Ui, items: &[ListItem], sizes: &FontSizes) {
    for item in items {
        ui.horizontal_wrapped(|ui| {
            ui.add_space(18.0 * item.depth as f32);
            let marker = match (item.checked, item.number) {
                (Some(true), _) => "☑".to_string(),
                (Some(false), _) => "☐".to_string(),
                (None, Some(n)) => format!("{n}."),
                (None, None) => "•".to_string(),
            };
            ui.label(
                RichText::new(format!("{marker} "))
                    .size(sizes.body)
                    .color(ui.visuals().weak_text_color()),
            );
            ui.spacing_mut().item_spacing.x = 0.0;
            for span in &item.spans {
                render_span(ui, span, sizes.body, false);
            }
        });
    }
    ui.add_space(4.0);
}

fn render_quote(ui: &mut egui::Ui, lines: &[Vec<InlineSpan>], sizes: &FontSizes) {
    let bar_color = Color32::from_rgb(255, 103, 25);
    let resp = egui::Frame::none()
        .fill(ui.visuals().faint_bg_color)
        .inner_margin(egui::Margin {
            left: 14.0,
            right: 8.0,
            top: 6.0,
            bottom: 6.0,
        })
        .show(ui, |ui| {
            ui.set_width(ui.available_width());
            for line in lines {
                render_spans(ui, line, sizes.body, false);
            }
        });
    let rect = resp.response.rect;
    let bar = egui::Rect::from_min_max(
        egui::pos2(rect.left() + 4.0, rect.top() + 4.0),
        egui::pos2(rect.left() + 7.0, rect.bottom() - 4.0),
    );
    ui.painter().rect_filled(bar, 1.5, bar_color);
    ui.add_space(4.0);
}

fn render_table(
    ui: &mut egui::Ui,
    headers: &[Vec<InlineSpan>],
    rows: &[Vec<Vec<InlineSpan>>],
    sizes: &FontSizes,
) {
    // Each table needs a distinct grid id within the preview.
    let id = ui.next_auto_id();
    egui::Grid::new(id)
        .striped(true)
        .spacing([12.0, 4.0])
        .show(ui, |ui| {
            for header in headers {
                render_spans(ui, header, sizes.body, true);
            }
            ui.end_row();
            for row in rows {
                for cell in row {
                    render_spans(ui, cell, sizes.body, false);
                }
                ui.end_row();
            }
        });
    ui.add_space(4.0);
}
