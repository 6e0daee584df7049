//! Menu commands and their keyboard accelerators.

use egui::{Key, KeyboardShortcut, Modifiers};

pub const NEW: KeyboardShortcut = KeyboardShortcut::new(Modifiers::COMMAND, Key::N);
pub const OPEN: KeyboardShortcut = KeyboardShortcut::new(Modifiers::COMMAND, Key::O);
pub const SAVE: KeyboardShortcut = KeyboardShortcut::new(Modifiers::COMMAND, Key::S);
pub const SAVE_HTML: KeyboardShortcut = KeyboardShortcut::new(
    Modifiers {
        alt: false,
        ctrl: false,
        shift: true,
        mac_cmd: false,
        command: true,
    },
    Key::S,
);
pub const QUIT: KeyboardShortcut = KeyboardShortcut::new(Modifiers::COMMAND, Key::Q);

/// Everything the menu bar and toolbar can trigger.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MenuCommand {
    New,
    Open,
    Save,
    SaveHtml,
    Revert,
    ShowFile,
    OpenInDefault,
    Copy,
    About,
    Quit,
}

/// Consume any accelerators pressed this frame.
///
/// Save HTML is checked before Save: egui ignores extra Shift when matching,
/// so Cmd+Shift+S would otherwise also trigger Save.
pub fn consume_shortcuts(input: &mut egui::InputState) -> Vec<MenuCommand> {
    let bindings = [
        (SAVE_HTML, MenuCommand::SaveHtml),
        (SAVE, MenuCommand::Save),
        (OPEN, MenuCommand::Open),
        (NEW, MenuCommand::New),
        (QUIT, MenuCommand::Quit),
    ];
    bindings
        .into_iter()
        .filter(|(shortcut, _)| input.consume_shortcut(shortcut))
        .map(|(_, command)| command)
        .collect()
}
