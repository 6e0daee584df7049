// Shell integration for the currently open file.
//
// - `reveal_in_file_manager`: opens Explorer, Finder or the Linux file
//   manager at the file's location.
// - `open_with_default_app`: hands the file to whatever application the OS
//   associates with it.
//
// Both spawn a platform command and return as soon as it has started.

use std::path::Path;
use std::process::Command;

/// Shell actions the host performs on behalf of the UI.
pub trait Shell: Send {
    fn reveal(&mut self, path: &Path) -> anyhow::Result<()>;
    fn open_default(&mut self, path: &Path) -> anyhow::Result<()>;
}

#[derive(Debug, Default, Clone, Copy)]
pub struct NativeShell;

impl Shell for NativeShell {
    fn reveal(&mut self, path: &Path) -> anyhow::Result<()> {
        reveal_in_file_manager(path)
    }

    fn open_default(&mut self, path: &Path) -> anyhow::Result<()> {
        open_with_default_app(path)
    }
}

/// Open the native file manager with the file selected.
///
/// Windows runs `explorer /select,<path>`, macOS `open -R <path>` and Linux
/// `xdg-open <parent-dir>`, since most Linux file managers cannot select a
/// single file.
pub fn reveal_in_file_manager(path: &Path) -> anyhow::Result<()> {
    let abs_path = path.canonicalize()?;

    #[cfg(target_os = "windows")]
    {
        Command::new("explorer")
            .arg(format!("/select,{}", abs_path.display()))
            .spawn()?;
    }

    #[cfg(target_os = "macos")]
    {
        Command::new("open").arg("-R").arg(&abs_path).spawn()?;
    }

    #[cfg(not(any(target_os = "windows", target_os = "macos")))]
    {
        let parent = abs_path
            .parent()
            .ok_or_else(|| anyhow::anyhow!("Cannot determine parent directory"))?;
        Command::new("xdg-open").arg(parent).spawn()?;
    }

    Ok(())
}

/// Open the file with the application the OS associates with it.
pub fn open_with_default_app(path: &Path) -> anyhow::Result<()> {
    let abs_path = path.canonicalize()?;

    #[cfg(target_os = "windows")]
    {
        // The empty string is the window title `start` expects first.
        Command::new("cmd")
            .args(["/C", "start", ""])
            .arg(&abs_path)
            .spawn()?;
    }

    #[cfg(target_os = "macos")]
    {
        Command::new("open").arg(&abs_path).spawn()?;
    }

    #[cfg(not(any(target_os = "windows", target_os = "macos")))]
    {
        Command::new("xdg-open").arg(&abs_path).spawn()?;
    }

    Ok(())
}
