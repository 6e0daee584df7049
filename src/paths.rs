use std::path::PathBuf;

/// Directory the save dialogs open in: the user's desktop, or the home
/// directory when no desktop folder exists.
pub fn desktop_dir() -> Option<PathBuf> {
    #[cfg(target_os = "windows")]
    {
        if let Ok(profile) = std::env::var("USERPROFILE") {
            return Some(prefer_desktop(PathBuf::from(profile)));
        }
    }

    #[cfg(not(target_os = "windows"))]
    {
        if let Ok(xdg) = std::env::var("XDG_DESKTOP_DIR") {
            let dir = PathBuf::from(xdg);
            if dir.is_dir() {
                return Some(dir);
            }
        }
    }

    if let Ok(home) = std::env::var("HOME") {
        return Some(prefer_desktop(PathBuf::from(home)));
    }
    None
}

fn prefer_desktop(home: PathBuf) -> PathBuf {
    let desktop = home.join("Desktop");
    if desktop.is_dir() {
        desktop
    } else {
        home
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Mutex, OnceLock};
    use tempfile::TempDir;

    fn env_lock() -> std::sync::MutexGuard<'static, ()> {
        static ENV_LOCK: OnceLock<Mutex<()>> = OnceLock::new();
        ENV_LOCK
            .get_or_init(|| Mutex::new(()))
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    struct EnvGuard {
        key: &'static str,
        original: Option<String>,
    }

    impl EnvGuard {
        fn set(key: &'static str, value: &str) -> Self {
            let original = std::env::var(key).ok();
            std::env::set_var(key, value);
            Self { key, original }
        }

        fn unset(key: &'static str) -> Self {
            let original = std::env::var(key).ok();
            std::env::remove_var(key);
            Self { key, original }
        }
    }

    impl Drop for EnvGuard {
        fn drop(&mut self) {
            if let Some(value) = &self.original {
                std::env::set_var(self.key, value);
            } else {
                std::env::remove_var(self.key);
            }
        }
    }

    #[cfg(not(target_os = "windows"))]
    #[test]
    fn test_desktop_dir_uses_home_desktop() {
        let _lock = env_lock();
        let temp = TempDir::new().expect("temp dir");
        std::fs::create_dir(temp.path().join("Desktop")).expect("create desktop");
        let _xdg = EnvGuard::unset("XDG_DESKTOP_DIR");
        let _home = EnvGuard::set("HOME", temp.path().to_string_lossy().as_ref());

        assert_eq!(desktop_dir(), Some(temp.path().join("Desktop")));
    }

    #[cfg(not(target_os = "windows"))]
    #[test]
    fn test_desktop_dir_falls_back_to_home() {
        let _lock = env_lock();
        let temp = TempDir::new().expect("temp dir");
        let _xdg = EnvGuard::unset("XDG_DESKTOP_DIR");
        let _home = EnvGuard::set("HOME", temp.path().to_string_lossy().as_ref());

        assert_eq!(desktop_dir(), Some(temp.path().to_path_buf()));
    }

    #[cfg(not(target_os = "windows"))]
    #[test]
    fn test_desktop_dir_prefers_xdg_when_present() {
        let _lock = env_lock();
        let home = TempDir::new().expect("home dir");
        let xdg = TempDir::new().expect("xdg dir");
        let _home = EnvGuard::set("HOME", home.path().to_string_lossy().as_ref());
        let _xdg = EnvGuard::set("XDG_DESKTOP_DIR", xdg.path().to_string_lossy().as_ref());

        assert_eq!(desktop_dir(), Some(xdg.path().to_path_buf()));
    }

    #[cfg(not(target_os = "windows"))]
    #[test]
    fn test_desktop_dir_ignores_missing_xdg_dir() {
        let _lock = env_lock();
        let home = TempDir::new().expect("home dir");
        let _home = EnvGuard::set("HOME", home.path().to_string_lossy().as_ref());
        let _xdg = EnvGuard::set("XDG_DESKTOP_DIR", "/nonexistent/desktop/dir");

        assert_eq!(desktop_dir(), Some(home.path().to_path_buf()));
    }

    #[cfg(not(target_os = "windows"))]
    #[test]
    fn test_desktop_dir_none_without_env() {
        let _lock = env_lock();
        let _xdg = EnvGuard::unset("XDG_DESKTOP_DIR");
        let _home = EnvGuard::unset("HOME");

        assert!(desktop_dir().is_none());
    }

    #[cfg(target_os = "windows")]
    #[test]
    fn test_desktop_dir_uses_user_profile() {
        let _lock = env_lock();
        let temp = TempDir::new().expect("temp dir");
        std::fs::create_dir(temp.path().join("Desktop")).expect("create desktop");
        let _profile = EnvGuard::set("USERPROFILE", temp.path().to_string_lossy().as_ref());

        assert_eq!(desktop_dir(), Some(temp.path().join("Desktop")));
    }
}
