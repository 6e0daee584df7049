//! Markdown editor with a live preview, built with Rust and egui.
//!
//! The window's document state lives in [`DocumentSession`]; everything that
//! needs the OS (dialogs, files, the file manager) goes through the host
//! controller in [`host`], which answers with [`host::Notification`]s.

pub mod app;
pub mod drop_zone;
pub mod error;
pub mod host;
pub mod html_export;
pub mod menu;
pub mod paths;
pub mod preview;
pub mod recent;
pub mod session;

pub use app::MarkdownEditorApp;
pub use error::HostError;
pub use host::{HostController, HostHandle, HostRequest, Notification, Notifier, OpenReason};
pub use session::{DocumentSession, UiState, APP_NAME};
