//! Failures reported by the host controller.
//!
//! Dialog cancellation is not represented here: the dialog layer returns
//! `None` and the host simply does nothing.

use std::path::PathBuf;

/// A privileged operation that failed. Every variant is logged by the host
/// and forwarded to the UI as [`crate::host::Notification::Failed`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum HostError {
    #[error("Failed to read {}: {reason}", path.display())]
    Read { path: PathBuf, reason: String },

    #[error("Failed to write {}: {reason}", path.display())]
    Write { path: PathBuf, reason: String },

    #[error("Failed to show {} in the file manager: {reason}", path.display())]
    Reveal { path: PathBuf, reason: String },

    #[error("Failed to open {} with the default application: {reason}", path.display())]
    Launch { path: PathBuf, reason: String },
}

impl HostError {
    pub fn path(&self) -> &std::path::Path {
        match self {
            HostError::Read { path, .. }
            | HostError::Write { path, .. }
            | HostError::Reveal { path, .. }
            | HostError::Launch { path, .. } => path,
        }
    }
}
