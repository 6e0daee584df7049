//! Main application logic for the markdown editor
//!
//! The app owns the window's [`DocumentSession`] and talks to the host
//! controller only through requests and notifications. All egui drawing
//! lives here; the session, host and drop handling are plain state machines
//! in their own modules.

use crate::drop_zone::{DragState, DropOutcome, DropZone};
use crate::host::{
    HostController, HostHandle, HostRequest, NativeDialogs, NativeShell, Notification, Notifier,
    OpenReason,
};
use crate::menu::{self, MenuCommand};
use crate::preview::{self, FontSizes, PreviewBlock};
use crate::session::{DocumentSession, UiState, APP_NAME};
use crossbeam_channel::Receiver;
use egui::{CentralPanel, Color32, Context, RichText, SidePanel, TopBottomPanel};
use std::path::PathBuf;

/// Action waiting for the user to confirm that unsaved edits may be lost.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DiscardAction {
    New,
    Open(HostRequest),
    /// A file that finished loading after the buffer was edited.
    Replace { path: PathBuf, content: String },
    Quit,
}

fn editor_id() -> egui::Id {
    egui::Id::new("markdown_editor")
}

pub struct MarkdownEditorApp {
    session: DocumentSession,
    /// Text edited by the markdown pane; mirrored into the session on change.
    editor_text: String,
    preview_blocks: Vec<PreviewBlock>,
    font_sizes: FontSizes,
    host: HostHandle,
    notifier: Notifier,
    notifications: Receiver<Notification>,
    drop_zone: DropZone,
    recent: Vec<PathBuf>,
    error_message: Option<String>,
    unsupported_drop: Option<String>,
    pending_discard: Option<DiscardAction>,
    /// Buffer the user agreed to lose when confirming an open.
    approved_discard: Option<String>,
    show_about: bool,
    applied_title: String,
    allow_close: bool,
}

/// Start the host with native dialogs: on a worker thread, or inline where
/// dialogs must stay on the main thread.
fn start_native_host(notifier: Notifier) -> HostHandle {
    let controller = HostController::new(NativeDialogs, NativeShell, notifier.clone());
    if cfg!(target_os = "macos") {
        return HostHandle::inline(controller);
    }
    HostHandle::spawn(controller).unwrap_or_else(|e| {
        log::error!("Failed to start host thread, running inline: {e}");
        HostHandle::inline(HostController::new(NativeDialogs, NativeShell, notifier))
    })
}

impl MarkdownEditorApp {
    pub fn new(ctx: &Context) -> Self {
        Self::with_host(ctx, start_native_host)
    }

    /// Build the app around a host created by `start_host`, which receives
    /// the notifier it must report through.
    pub fn with_host(ctx: &Context, start_host: impl FnOnce(Notifier) -> HostHandle) -> Self {
        let (notifier, notifications) = Notifier::channel();
        let repaint_ctx = ctx.clone();
        let notifier = notifier.with_waker(move || repaint_ctx.request_repaint());
        let host = start_host(notifier.clone());
        Self {
            session: DocumentSession::new(),
            editor_text: String::new(),
            preview_blocks: Vec::new(),
            font_sizes: FontSizes::default(),
            host,
            notifier,
            notifications,
            drop_zone: DropZone::new(),
            recent: Vec::new(),
            error_message: None,
            unsupported_drop: None,
            pending_discard: None,
            approved_discard: None,
            show_about: false,
            applied_title: String::new(),
            allow_close: false,
        }
    }

    pub fn session(&self) -> &DocumentSession {
        &self.session
    }

    pub fn editor_text(&self) -> &str {
        &self.editor_text
    }

    pub fn error_message(&self) -> Option<&str> {
        self.error_message.as_deref()
    }

    pub fn unsupported_drop(&self) -> Option<&str> {
        self.unsupported_drop.as_deref()
    }

    pub fn pending_discard(&self) -> Option<&DiscardAction> {
        self.pending_discard.as_ref()
    }

    pub fn recent_documents(&self) -> &[PathBuf] {
        &self.recent
    }

    pub fn drag_state(&self) -> DragState {
        self.drop_zone.state()
    }

    /// Load `path` through the host, e.g. from the command line.
    pub fn open_path(&mut self, path: PathBuf) {
        self.request_open(HostRequest::OpenFile(path));
    }

    /// Replace the editor buffer as if the user had typed it.
    pub fn set_editor_text(&mut self, text: impl Into<String>) {
        self.editor_text = text.into();
        self.on_editor_changed();
    }

    pub fn handle_notification(&mut self, notification: Notification) {
        match notification {
            Notification::FileOpened {
                path,
                content,
                reason: OpenReason::Saved,
            } => {
                // Typing may have continued while the save was in flight.
                self.session.on_file_saved(path, content);
                self.error_message = None;
            }
            Notification::FileOpened {
                path,
                content,
                reason: OpenReason::Loaded,
            } => self.offer_loaded(path, content),
            Notification::SaveMarkdownRequested => {
                if self.session.refresh_ui_state().save {
                    self.host.submit(self.session.on_save_requested());
                }
            }
            Notification::SaveHtmlRequested => {
                if self.session.refresh_ui_state().save_html {
                    self.host.submit(self.session.on_save_html_requested());
                }
            }
            Notification::RecentDocuments(recent) => self.recent = recent,
            Notification::Failed(err) => self.error_message = Some(err.to_string()),
        }
    }

    /// Run inline host work and apply every pending notification.
    pub fn poll_host(&mut self) {
        loop {
            let pumped = self.host.pump();
            let mut drained = 0;
            while let Ok(notification) = self.notifications.try_recv() {
                self.handle_notification(notification);
                drained += 1;
            }
            if pumped == 0 && drained == 0 {
                break;
            }
        }
    }

    pub fn run_command(&mut self, ctx: &Context, command: MenuCommand) {
        let ui_state = self.session.refresh_ui_state();
        match command {
            MenuCommand::New => {
                if self.session.is_edited() {
                    self.pending_discard = Some(DiscardAction::New);
                } else {
                    self.reset_document();
                }
            }
            MenuCommand::Open => self.request_open(HostRequest::OpenDialog),
            // Accelerators and menu items share the notification path.
            MenuCommand::Save => self.notifier.notify(Notification::SaveMarkdownRequested),
            MenuCommand::SaveHtml => self.notifier.notify(Notification::SaveHtmlRequested),
            MenuCommand::Revert => {
                if ui_state.revert {
                    self.session.revert();
                    self.editor_text = self.session.current_content().to_string();
                    self.refresh_preview();
                }
            }
            MenuCommand::ShowFile => {
                if let Some(path) = self.session.file_path() {
                    self.host.submit(HostRequest::ShowFile(path.to_path_buf()));
                }
            }
            MenuCommand::OpenInDefault => {
                if let Some(path) = self.session.file_path() {
                    self.host
                        .submit(HostRequest::OpenInDefault(path.to_path_buf()));
                }
            }
            MenuCommand::Copy => self.copy_selection(ctx),
            MenuCommand::About => self.show_about = true,
            MenuCommand::Quit => ctx.send_viewport_cmd(egui::ViewportCommand::Close),
        }
    }

    /// Answer the "discard unsaved changes?" prompt.
    pub fn resolve_discard(&mut self, ctx: &Context, discard: bool) {
        let Some(action) = self.pending_discard.take() else {
            return;
        };
        if !discard {
            return;
        }
        match action {
            DiscardAction::New => self.reset_document(),
            DiscardAction::Open(request) => {
                self.approved_discard = Some(self.session.current_content().to_string());
                self.host.submit(request);
            }
            DiscardAction::Replace { path, content } => self.load_document(path, content),
            DiscardAction::Quit => {
                self.allow_close = true;
                ctx.send_viewport_cmd(egui::ViewportCommand::Close);
            }
        }
    }

    fn request_open(&mut self, request: HostRequest) {
        if self.session.is_edited() {
            self.pending_discard = Some(DiscardAction::Open(request));
        } else {
            self.host.submit(request);
        }
    }

    /// Load a file the host read for the user, unless that would silently
    /// drop edits made after the open was requested.
    fn offer_loaded(&mut self, path: PathBuf, content: String) {
        let approved = self.approved_discard.as_deref() == Some(self.session.current_content());
        if !self.session.is_edited() || approved {
            self.load_document(path, content);
            return;
        }
        if self.pending_discard.is_some() {
            log::warn!("Dropping {}: another prompt is open", path.display());
            return;
        }
        log::info!("Holding {} until unsaved edits are resolved", path.display());
        self.pending_discard = Some(DiscardAction::Replace { path, content });
    }

    fn load_document(&mut self, path: PathBuf, content: String) {
        self.approved_discard = None;
        self.session.on_file_opened(path, content);
        self.editor_text = self.session.current_content().to_string();
        self.refresh_preview();
        self.error_message = None;
    }

    /// Put the editor's current selection on the clipboard.
    fn copy_selection(&self, ctx: &Context) {
        let range = egui::TextEdit::load_state(ctx, editor_id())
            .and_then(|state| state.cursor.char_range());
        let Some(range) = range else {
            return;
        };
        let text = selected_text(&self.editor_text, range);
        if !text.is_empty() {
            ctx.output_mut(|o| o.copied_text = text);
        }
    }

    fn reset_document(&mut self) {
        self.approved_discard = None;
        self.session.reset();
        self.editor_text.clear();
        self.refresh_preview();
    }

    fn on_editor_changed(&mut self) {
        self.session.on_edit(self.editor_text.as_str());
        self.refresh_preview();
    }

    fn refresh_preview(&mut self) {
        self.preview_blocks = preview::parse(self.session.current_content());
    }

    fn has_modal(&self) -> bool {
        self.unsupported_drop.is_some() || self.pending_discard.is_some() || self.show_about
    }

    /// Handle hovered and dropped files. Drops are consumed so nothing
    /// else reacts to them.
    fn handle_file_drops(&mut self, ctx: &Context) {
        let (hovered, dropped) = ctx.input_mut(|i| {
            (
                i.raw.hovered_files.first().cloned(),
                std::mem::take(&mut i.raw.dropped_files),
            )
        });

        match &hovered {
            Some(file) => self.drop_zone.drag_over(&file.mime, file.path.as_deref()),
            None if dropped.is_empty() => self.drop_zone.drag_leave(),
            None => {}
        }

        for file in dropped {
            match self.drop_zone.drop_item(&file.mime, file.path.clone()) {
                DropOutcome::Open(path) => self.request_open(HostRequest::OpenFile(path)),
                DropOutcome::Unsupported { name } => self.unsupported_drop = Some(name),
                DropOutcome::Ignored => {}
            }
        }
    }

    fn handle_close_request(&mut self, ctx: &Context) {
        let close_requested = ctx.input(|i| i.viewport().close_requested());
        if close_requested && self.session.is_edited() && !self.allow_close {
            ctx.send_viewport_cmd(egui::ViewportCommand::CancelClose);
            self.pending_discard = Some(DiscardAction::Quit);
        }
    }

    fn sync_title(&mut self, ctx: &Context) {
        let title = self.session.window_title();
        if title != self.applied_title {
            ctx.send_viewport_cmd(egui::ViewportCommand::Title(title.clone()));
            self.applied_title = title;
        }
    }

    /// Render the menu bar
    fn render_menu_bar(
        &self,
        ctx: &Context,
        ui_state: UiState,
        enabled: bool,
        commands: &mut Vec<MenuCommand>,
    ) -> Option<PathBuf> {
        let mut recent_choice = None;
        TopBottomPanel::top("menu_bar").show(ctx, |ui| {
            ui.set_enabled(enabled);
            egui::menu::bar(ui, |ui| {
                ui.menu_button("File", |ui| {
                    menu_item(ui, commands, MenuCommand::New, "New", Some(&menu::NEW), true);
                    menu_item(ui, commands, MenuCommand::Open, "Open…", Some(&menu::OPEN), true);
                    ui.add_enabled_ui(!self.recent.is_empty(), |ui| {
                        ui.menu_button("Open Recent", |ui| {
                            for path in &self.recent {
                                if ui.button(path.display().to_string()).clicked() {
                                    recent_choice = Some(path.clone());
                                    ui.close_menu();
                                }
                            }
                        });
                    });
                    ui.separator();
                    let save = Some(&menu::SAVE);
                    menu_item(ui, commands, MenuCommand::Save, "Save", save, ui_state.save);
                    menu_item(
                        ui,
                        commands,
                        MenuCommand::SaveHtml,
                        "Save HTML",
                        Some(&menu::SAVE_HTML),
                        ui_state.save_html,
                    );
                    menu_item(ui, commands, MenuCommand::Revert, "Revert", None, ui_state.revert);
                    ui.separator();
                    let show = ui_state.show_file;
                    menu_item(ui, commands, MenuCommand::ShowFile, "Show File", None, show);
                    menu_item(
                        ui,
                        commands,
                        MenuCommand::OpenInDefault,
                        "Open in Default Application",
                        None,
                        ui_state.open_in_default,
                    );
                    ui.separator();
                    menu_item(ui, commands, MenuCommand::Quit, "Quit", Some(&menu::QUIT), true);
                });

                ui.menu_button("Edit", |ui| {
                    menu_item(ui, commands, MenuCommand::Copy, "Copy", None, true);
                });

                ui.menu_button("Help", |ui| {
                    let about = format!("About {APP_NAME}");
                    menu_item(ui, commands, MenuCommand::About, about, None, true);
                });
            });
        });
        recent_choice
    }

    fn render_toolbar(
        &self,
        ctx: &Context,
        ui_state: UiState,
        enabled: bool,
        commands: &mut Vec<MenuCommand>,
    ) {
        TopBottomPanel::top("toolbar").show(ctx, |ui| {
            ui.set_enabled(enabled);
            ui.horizontal(|ui| {
                let buttons = [
                    (MenuCommand::New, "New File", true),
                    (MenuCommand::Open, "Open File", true),
                    (MenuCommand::Save, "Save File", ui_state.save),
                    (MenuCommand::Revert, "Revert", ui_state.revert),
                    (MenuCommand::SaveHtml, "Save HTML", ui_state.save_html),
                    (MenuCommand::ShowFile, "Show File", ui_state.show_file),
                    (
                        MenuCommand::OpenInDefault,
                        "Open in Default Application",
                        ui_state.open_in_default,
                    ),
                ];
                for (command, label, enabled) in buttons {
                    if ui.add_enabled(enabled, egui::Button::new(label)).clicked() {
                        commands.push(command);
                    }
                }
            });
        });
    }

    /// Render the status bar
    fn render_status_bar(&self, ctx: &Context, ui_state: UiState) {
        TopBottomPanel::bottom("status_bar").show(ctx, |ui| {
            ui.horizontal(|ui| {
                match self.session.file_path() {
                    Some(path) => ui.label(path.display().to_string()),
                    None => ui.label("Untitled"),
                };
                if ui_state.document_edited {
                    ui.label(RichText::new("● Edited").color(Color32::from_rgb(255, 160, 60)));
                }
                ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                    ui.label(format!(
                        "Characters: {} | HTML: {} bytes",
                        self.session.current_content().chars().count(),
                        self.session.rendered_html().len()
                    ));
                });
            });
        });
    }

    fn render_error_banner(&mut self, ctx: &Context) {
        let Some(error) = self.error_message.clone() else {
            return;
        };
        TopBottomPanel::top("error_banner").show(ctx, |ui| {
            ui.horizontal(|ui| {
                ui.colored_label(Color32::RED, format!("⚠ {error}"));
                if ui.small_button("Dismiss").clicked() {
                    self.error_message = None;
                }
            });
        });
    }

    fn render_panes(&mut self, ctx: &Context, enabled: bool) {
        let mut changed = false;
        SidePanel::left("markdown_pane")
            .resizable(true)
            .default_width(ctx.screen_rect().width() / 2.0)
            .min_width(200.0)
            .show(ctx, |ui| {
                ui.add_enabled_ui(enabled, |ui| {
                    // Fill the pane even when the buffer is short.
                    let row_height = ui.text_style_height(&egui::TextStyle::Monospace);
                    let rows = (ui.available_height() / row_height).max(1.0) as usize;
                    egui::ScrollArea::vertical()
                        .id_source("markdown_scroll")
                        .auto_shrink([false, false])
                        .show(ui, |ui| {
                            let editor = egui::TextEdit::multiline(&mut self.editor_text)
                                .id(editor_id())
                                .code_editor()
                                .hint_text("Write markdown here, or drop a .md file")
                                .desired_width(f32::INFINITY)
                                .desired_rows(rows);
                            changed = ui.add(editor).changed();
                        });
                });
            });
        if changed {
            self.on_editor_changed();
        }

        CentralPanel::default().show(ctx, |ui| {
            egui::ScrollArea::vertical()
                .id_source("preview_scroll")
                .auto_shrink([false, false])
                .show(ui, |ui| {
                    if self.preview_blocks.is_empty() {
                        ui.label(RichText::new("The preview appears here.").weak());
                    } else {
                        preview::render(ui, &self.preview_blocks, &self.font_sizes);
                    }
                });
        });
    }

    fn render_drop_overlay(&self, ctx: &Context) {
        let (message, color) = match self.drop_zone.state() {
            DragState::Idle => return,
            DragState::OverValid => (
                "Drop to open",
                Color32::from_rgba_unmultiplied(40, 120, 40, 180),
            ),
            DragState::OverInvalid => (
                "Unsupported file type",
                Color32::from_rgba_unmultiplied(140, 30, 30, 180),
            ),
        };
        let painter = ctx.layer_painter(egui::LayerId::new(
            egui::Order::Foreground,
            egui::Id::new("drop_overlay"),
        ));
        let rect = ctx.screen_rect();
        painter.rect_filled(rect, 0.0, color);
        painter.text(
            rect.center(),
            egui::Align2::CENTER_CENTER,
            message,
            egui::FontId::proportional(24.0),
            Color32::WHITE,
        );
    }

    fn render_dialogs(&mut self, ctx: &Context) {
        if let Some(name) = self.unsupported_drop.clone() {
            modal_window("Unsupported file type").show(ctx, |ui| {
                ui.label(format!(
                    "{name} cannot be opened. Drop a markdown (.md) or text (.txt) file."
                ));
                if ui.button("OK").clicked() {
                    self.unsupported_drop = None;
                }
            });
        }

        if self.pending_discard.is_some() {
            let mut answer = None;
            modal_window("Unsaved changes").show(ctx, |ui| {
                ui.label("The document has unsaved changes. Discard them?");
                ui.horizontal(|ui| {
                    if ui.button("Discard").clicked() {
                        answer = Some(true);
                    }
                    if ui.button("Cancel").clicked() {
                        answer = Some(false);
                    }
                });
            });
            if let Some(discard) = answer {
                self.resolve_discard(ctx, discard);
            }
        }

        if self.show_about {
            modal_window("About").show(ctx, |ui| {
                ui.label(RichText::new(APP_NAME).strong().size(18.0));
                ui.label(format!("Version {}", env!("CARGO_PKG_VERSION")));
                ui.label("Edit markdown on the left, see it rendered on the right.");
                if ui.button("Close").clicked() {
                    self.show_about = false;
                }
            });
        }
    }

    /// Draw one frame and handle its input.
    pub fn show(&mut self, ctx: &Context) {
        self.poll_host();
        self.handle_close_request(ctx);

        // Notices and prompts block every other input until answered.
        let modal = self.has_modal();
        let mut commands = if modal {
            self.drop_zone.drag_leave();
            Vec::new()
        } else {
            self.handle_file_drops(ctx);
            ctx.input_mut(menu::consume_shortcuts)
        };

        let ui_state = self.session.refresh_ui_state();
        let recent_choice = self.render_menu_bar(ctx, ui_state, !modal, &mut commands);
        self.render_toolbar(ctx, ui_state, !modal, &mut commands);
        self.render_error_banner(ctx);
        self.render_status_bar(ctx, ui_state);
        self.render_panes(ctx, !modal);
        self.render_drop_overlay(ctx);
        self.render_dialogs(ctx);

        if let Some(path) = recent_choice {
            self.open_path(path);
        }
        for command in commands {
            self.run_command(ctx, command);
        }
        self.sync_title(ctx);
    }
}

fn menu_item(
    ui: &mut egui::Ui,
    commands: &mut Vec<MenuCommand>,
    command: MenuCommand,
    label: impl Into<egui::WidgetText>,
    shortcut: Option<&egui::KeyboardShortcut>,
    enabled: bool,
) {
    let mut button = egui::Button::new(label);
    if let Some(shortcut) = shortcut {
        button = button.shortcut_text(ui.ctx().format_shortcut(shortcut));
    }
    if ui.add_enabled(enabled, button).clicked() {
        commands.push(command);
        ui.close_menu();
    }
}

/// Text between the two ends of a character-indexed selection.
fn selected_text(text: &str, range: egui::text::CCursorRange) -> String {
    let (a, b) = (range.primary.index, range.secondary.index);
    let (start, end) = (a.min(b), a.max(b));
    text.chars().skip(start).take(end - start).collect()
}

fn modal_window(title: &str) -> egui::Window<'static> {
    egui::Window::new(title.to_string())
        .collapsible(false)
        .resizable(false)
        .anchor(egui::Align2::CENTER_CENTER, [0.0, 0.0])
}

impl eframe::App for MarkdownEditorApp {
    fn update(&mut self, ctx: &Context, _frame: &mut eframe::Frame) {
        self.show(ctx);
    }
}
