//! The privileged side of the application.
//!
//! The UI never opens dialogs or touches the filesystem itself. It sends a
//! [`HostRequest`] and, some time later, may receive one or more
//! [`Notification`]s back. A request that ends in a cancelled dialog produces
//! nothing at all, so callers must never wait for an answer.

pub mod dialogs;
pub mod runtime;
pub mod shell;

pub use dialogs::{FileDialogs, NativeDialogs};
pub use runtime::{HostHandle, RequestHandler};
pub use shell::{NativeShell, Shell};

use crate::error::HostError;
use crate::paths;
use crate::recent::RecentDocuments;
use crossbeam_channel::{unbounded, Receiver, Sender};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Operations the UI asks the host to perform.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HostRequest {
    /// Show the open dialog and load the chosen file.
    OpenDialog,
    /// Load a known path (drag-and-drop, recent documents, command line).
    OpenFile(PathBuf),
    /// Write markdown to `path`, asking for a location when it is `None`.
    SaveMarkdown {
        path: Option<PathBuf>,
        content: String,
    },
    /// Ask for a location and write rendered HTML there.
    SaveHtml { content: String },
    ShowFile(PathBuf),
    OpenInDefault(PathBuf),
}

impl HostRequest {
    /// Short name for log lines; the payload may be a whole document.
    pub fn name(&self) -> &'static str {
        match self {
            HostRequest::OpenDialog => "open-dialog",
            HostRequest::OpenFile(_) => "open-file",
            HostRequest::SaveMarkdown { .. } => "save-markdown",
            HostRequest::SaveHtml { .. } => "save-html",
            HostRequest::ShowFile(_) => "show-file",
            HostRequest::OpenInDefault(_) => "open-in-default",
        }
    }
}

/// Why the host read a file and sent it to the UI.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OpenReason {
    /// The user picked, dropped or named the file.
    Loaded,
    /// The file was just written by a markdown save and re-read from disk.
    Saved,
}

/// One-way messages delivered to the UI.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notification {
    FileOpened {
        path: PathBuf,
        content: String,
        reason: OpenReason,
    },
    SaveMarkdownRequested,
    SaveHtmlRequested,
    RecentDocuments(Vec<PathBuf>),
    Failed(HostError),
}

/// Sending half of the notification channel. Each send also wakes the UI so
/// a notification produced off the UI thread is handled promptly.
#[derive(Clone)]
pub struct Notifier {
    tx: Sender<Notification>,
    wake: Arc<dyn Fn() + Send + Sync>,
}

impl Notifier {
    pub fn channel() -> (Notifier, Receiver<Notification>) {
        let (tx, rx) = unbounded();
        let notifier = Notifier {
            tx,
            wake: Arc::new(|| {}),
        };
        (notifier, rx)
    }

    pub fn with_waker(mut self, wake: impl Fn() + Send + Sync + 'static) -> Self {
        self.wake = Arc::new(wake);
        self
    }

    pub fn notify(&self, notification: Notification) {
        if self.tx.send(notification).is_err() {
            log::debug!("UI has shut down; dropping notification");
            return;
        }
        (self.wake)();
    }
}

/// Performs host requests one at a time and reports the results.
pub struct HostController<D, S> {
    dialogs: D,
    shell: S,
    notifier: Notifier,
    recent: RecentDocuments,
    save_directory: Option<PathBuf>,
}

impl<D: FileDialogs, S: Shell> HostController<D, S> {
    pub fn new(dialogs: D, shell: S, notifier: Notifier) -> Self {
        Self {
            dialogs,
            shell,
            notifier,
            recent: RecentDocuments::default(),
            save_directory: paths::desktop_dir(),
        }
    }

    /// Override where save dialogs start.
    pub fn with_save_directory(mut self, directory: Option<PathBuf>) -> Self {
        self.save_directory = directory;
        self
    }

    pub fn recent(&self) -> &RecentDocuments {
        &self.recent
    }

    pub fn handle(&mut self, request: HostRequest) {
        log::debug!("Host handling {}", request.name());
        match request {
            HostRequest::OpenDialog => match self.dialogs.pick_markdown_file() {
                Some(path) => self.open_file(path, OpenReason::Loaded),
                None => log::debug!("Open dialog cancelled"),
            },
            HostRequest::OpenFile(path) => self.open_file(path, OpenReason::Loaded),
            HostRequest::SaveMarkdown { path, content } => self.save_markdown(path, &content),
            HostRequest::SaveHtml { content } => self.save_html(&content),
            HostRequest::ShowFile(path) => {
                if let Err(e) = self.shell.reveal(&path) {
                    self.fail(HostError::Reveal {
                        path,
                        reason: format!("{e:#}"),
                    });
                }
            }
            HostRequest::OpenInDefault(path) => {
                if let Err(e) = self.shell.open_default(&path) {
                    self.fail(HostError::Launch {
                        path,
                        reason: format!("{e:#}"),
                    });
                }
            }
        }
    }

    fn open_file(&mut self, path: PathBuf, reason: OpenReason) {
        let content = match fs::read_to_string(&path) {
            Ok(content) => content,
            Err(e) => {
                return self.fail(HostError::Read {
                    path,
                    reason: e.to_string(),
                })
            }
        };
        log::info!("Opened {}", path.display());
        self.recent.record(&path);
        self.notifier
            .notify(Notification::FileOpened {
                path,
                content,
                reason,
            });
        self.notifier.notify(Notification::RecentDocuments(
            self.recent.entries().to_vec(),
        ));
    }

    fn save_markdown(&mut self, path: Option<PathBuf>, content: &str) {
        let target = match path {
            Some(path) => path,
            None => match self
                .dialogs
                .save_markdown_file(self.save_directory.as_deref())
            {
                Some(path) => path,
                None => return log::debug!("Save dialog cancelled"),
            },
        };
        if let Err(err) = write_file(&target, content) {
            return self.fail(err);
        }
        log::info!("Saved markdown to {}", target.display());
        // Re-read from disk so the UI adopts exactly what was written.
        self.open_file(target, OpenReason::Saved);
    }

    fn save_html(&mut self, content: &str) {
        let Some(target) = self.dialogs.save_html_file(self.save_directory.as_deref()) else {
            return log::debug!("Save HTML dialog cancelled");
        };
        match write_file(&target, content) {
            Ok(()) => log::info!("Saved HTML to {}", target.display()),
            Err(err) => self.fail(err),
        }
    }

    fn fail(&self, err: HostError) {
        log::error!("{err}");
        self.notifier.notify(Notification::Failed(err));
    }
}

impl<D, S> RequestHandler for HostController<D, S>
where
    D: FileDialogs,
    S: Shell,
{
    fn handle(&mut self, request: HostRequest) {
        HostController::handle(self, request);
    }
}

fn write_file(path: &Path, content: &str) -> Result<(), HostError> {
    fs::write(path, content).map_err(|e| HostError::Write {
        path: path.to_path_buf(),
        reason: e.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::VecDeque;
    use std::sync::Mutex;
    use tempfile::TempDir;

    /// Dialog fake answering from queues; an empty queue means "cancel".
    #[derive(Default, Clone)]
    struct ScriptedDialogs {
        opens: Arc<Mutex<VecDeque<PathBuf>>>,
        saves: Arc<Mutex<VecDeque<PathBuf>>>,
        save_dirs: Arc<Mutex<Vec<Option<PathBuf>>>>,
    }

    impl ScriptedDialogs {
        fn answer_open(&self, path: PathBuf) {
            self.opens.lock().expect("lock").push_back(path);
        }

        fn answer_save(&self, path: PathBuf) {
            self.saves.lock().expect("lock").push_back(path);
        }

        fn next_save(&self, directory: Option<&Path>) -> Option<PathBuf> {
            self.save_dirs
                .lock()
                .expect("lock")
                .push(directory.map(Path::to_path_buf));
            self.saves.lock().expect("lock").pop_front()
        }
    }

    impl FileDialogs for ScriptedDialogs {
        fn pick_markdown_file(&mut self) -> Option<PathBuf> {
            self.opens.lock().expect("lock").pop_front()
        }

        fn save_markdown_file(&mut self, directory: Option<&Path>) -> Option<PathBuf> {
            self.next_save(directory)
        }

        fn save_html_file(&mut self, directory: Option<&Path>) -> Option<PathBuf> {
            self.next_save(directory)
        }
    }

    #[derive(Default, Clone)]
    struct RecordingShell {
        calls: Arc<Mutex<Vec<String>>>,
        fail: bool,
    }

    impl Shell for RecordingShell {
        fn reveal(&mut self, path: &Path) -> anyhow::Result<()> {
            self.calls
                .lock()
                .expect("lock")
                .push(format!("reveal {}", path.display()));
            if self.fail {
                anyhow::bail!("no file manager");
            }
            Ok(())
        }

        fn open_default(&mut self, path: &Path) -> anyhow::Result<()> {
            self.calls
                .lock()
                .expect("lock")
                .push(format!("open {}", path.display()));
            if self.fail {
                anyhow::bail!("no handler");
            }
            Ok(())
        }
    }

    fn controller(
        dialogs: &ScriptedDialogs,
        shell: &RecordingShell,
        save_dir: Option<PathBuf>,
    ) -> (
        HostController<ScriptedDialogs, RecordingShell>,
        Receiver<Notification>,
    ) {
        let (notifier, rx) = Notifier::channel();
        let host = HostController::new(dialogs.clone(), shell.clone(), notifier)
            .with_save_directory(save_dir);
        (host, rx)
    }

    fn drain(rx: &Receiver<Notification>) -> Vec<Notification> {
        rx.try_iter().collect()
    }

    #[test]
    fn test_open_file_notifies_content_and_recent() {
        let temp = TempDir::new().expect("temp dir");
        let path = temp.path().join("notes.md");
        fs::write(&path, "# Hi").expect("write");
        let (mut host, rx) = controller(&Default::default(), &Default::default(), None);

        host.handle(HostRequest::OpenFile(path.clone()));

        assert_eq!(
            drain(&rx),
            vec![
                Notification::FileOpened {
                    path: path.clone(),
                    content: "# Hi".to_string(),
                    reason: OpenReason::Loaded,
                },
                Notification::RecentDocuments(vec![path]),
            ]
        );
    }

    #[test]
    fn test_open_missing_file_reports_read_failure() {
        let (mut host, rx) = controller(&Default::default(), &Default::default(), None);
        let path = PathBuf::from("/nonexistent/notes.md");

        host.handle(HostRequest::OpenFile(path.clone()));

        let notes = drain(&rx);
        assert_eq!(notes.len(), 1);
        match &notes[0] {
            Notification::Failed(HostError::Read { path: failed, .. }) => {
                assert_eq!(failed, &path)
            }
            other => panic!("unexpected notification {other:?}"),
        }
        assert!(host.recent().is_empty());
    }

    #[test]
    fn test_open_non_utf8_file_reports_read_failure() {
        let temp = TempDir::new().expect("temp dir");
        let path = temp.path().join("binary.md");
        fs::write(&path, [0xff, 0xfe, 0x00, 0x80]).expect("write");
        let (mut host, rx) = controller(&Default::default(), &Default::default(), None);

        host.handle(HostRequest::OpenFile(path));

        assert!(matches!(
            drain(&rx).as_slice(),
            [Notification::Failed(HostError::Read { .. })]
        ));
    }

    #[test]
    fn test_open_dialog_cancel_is_silent() {
        let (mut host, rx) = controller(&Default::default(), &Default::default(), None);
        host.handle(HostRequest::OpenDialog);
        assert!(drain(&rx).is_empty());
    }

    #[test]
    fn test_open_dialog_selection_loads_file() {
        let temp = TempDir::new().expect("temp dir");
        let path = temp.path().join("picked.txt");
        fs::write(&path, "plain").expect("write");
        let dialogs = ScriptedDialogs::default();
        dialogs.answer_open(path.clone());
        let (mut host, rx) = controller(&dialogs, &Default::default(), None);

        host.handle(HostRequest::OpenDialog);

        assert_eq!(
            drain(&rx).first(),
            Some(&Notification::FileOpened {
                path,
                content: "plain".to_string(),
                reason: OpenReason::Loaded,
            })
        );
    }

    #[test]
    fn test_save_existing_path_writes_and_reopens() {
        let temp = TempDir::new().expect("temp dir");
        let path = temp.path().join("notes.md");
        fs::write(&path, "# Hi").expect("write");
        let (mut host, rx) = controller(&Default::default(), &Default::default(), None);

        host.handle(HostRequest::SaveMarkdown {
            path: Some(path.clone()),
            content: "# Hi!".to_string(),
        });

        assert_eq!(fs::read_to_string(&path).expect("read"), "# Hi!");
        assert_eq!(
            drain(&rx).first(),
            Some(&Notification::FileOpened {
                path,
                content: "# Hi!".to_string(),
                reason: OpenReason::Saved,
            })
        );
    }

    #[test]
    fn test_save_without_path_asks_in_save_directory() {
        let temp = TempDir::new().expect("temp dir");
        let target = temp.path().join("out.md");
        let dialogs = ScriptedDialogs::default();
        dialogs.answer_save(target.clone());
        let (mut host, rx) = controller(
            &dialogs,
            &Default::default(),
            Some(temp.path().to_path_buf()),
        );

        host.handle(HostRequest::SaveMarkdown {
            path: None,
            content: "draft\r\nbytes".to_string(),
        });

        assert_eq!(fs::read(&target).expect("read"), b"draft\r\nbytes");
        assert_eq!(
            dialogs.save_dirs.lock().expect("lock").as_slice(),
            &[Some(temp.path().to_path_buf())]
        );
        assert!(matches!(
            drain(&rx).first(),
            Some(Notification::FileOpened {
                path,
                reason: OpenReason::Saved,
                ..
            }) if path == &target
        ));
    }

    #[test]
    fn test_save_dialog_cancel_writes_nothing() {
        let temp = TempDir::new().expect("temp dir");
        let (mut host, rx) = controller(
            &Default::default(),
            &Default::default(),
            Some(temp.path().to_path_buf()),
        );

        host.handle(HostRequest::SaveMarkdown {
            path: None,
            content: "draft".to_string(),
        });

        assert!(drain(&rx).is_empty());
        assert_eq!(fs::read_dir(temp.path()).expect("read dir").count(), 0);
    }

    #[test]
    fn test_save_write_failure_is_reported() {
        let (mut host, rx) = controller(&Default::default(), &Default::default(), None);
        let path = PathBuf::from("/nonexistent/dir/notes.md");

        host.handle(HostRequest::SaveMarkdown {
            path: Some(path.clone()),
            content: "x".to_string(),
        });

        assert_eq!(
            drain(&rx)
                .into_iter()
                .map(|n| match n {
                    Notification::Failed(err) => err.path().to_path_buf(),
                    other => panic!("unexpected {other:?}"),
                })
                .collect::<Vec<_>>(),
            vec![path]
        );
    }

    #[test]
    fn test_save_html_writes_verbatim_without_reopen() {
        let temp = TempDir::new().expect("temp dir");
        let target = temp.path().join("page.html");
        let dialogs = ScriptedDialogs::default();
        dialogs.answer_save(target.clone());
        let (mut host, rx) = controller(&dialogs, &Default::default(), None);

        host.handle(HostRequest::SaveHtml {
            content: "<h1>Hi</h1>\n".to_string(),
        });

        assert_eq!(fs::read_to_string(&target).expect("read"), "<h1>Hi</h1>\n");
        assert!(drain(&rx).is_empty());
    }

    #[test]
    fn test_save_html_cancel_is_silent() {
        let (mut host, rx) = controller(&Default::default(), &Default::default(), None);
        host.handle(HostRequest::SaveHtml {
            content: "<p>x</p>".to_string(),
        });
        assert!(drain(&rx).is_empty());
    }

    #[test]
    fn test_shell_requests_delegate_and_report_failures() {
        let shell = RecordingShell::default();
        let (mut host, rx) = controller(&Default::default(), &shell, None);
        host.handle(HostRequest::ShowFile(PathBuf::from("a.md")));
        host.handle(HostRequest::OpenInDefault(PathBuf::from("a.md")));
        assert!(drain(&rx).is_empty());
        assert_eq!(
            shell.calls.lock().expect("lock").as_slice(),
            &["reveal a.md".to_string(), "open a.md".to_string()]
        );

        let failing = RecordingShell {
            fail: true,
            ..Default::default()
        };
        let (mut host, rx) = controller(&Default::default(), &failing, None);
        host.handle(HostRequest::ShowFile(PathBuf::from("a.md")));
        host.handle(HostRequest::OpenInDefault(PathBuf::from("a.md")));
        let notes = drain(&rx);
        assert!(matches!(
            notes.as_slice(),
            [
                Notification::Failed(HostError::Reveal { .. }),
                Notification::Failed(HostError::Launch { .. })
            ]
        ));
    }

    #[test]
    fn test_notifier_wakes_on_every_send() {
        let count = Arc::new(Mutex::new(0));
        let seen = count.clone();
        let (notifier, rx) = Notifier::channel();
        let notifier = notifier.with_waker(move || *seen.lock().expect("lock") += 1);

        notifier.notify(Notification::SaveHtmlRequested);
        notifier.notify(Notification::SaveMarkdownRequested);

        assert_eq!(*count.lock().expect("lock"), 2);
        assert_eq!(rx.len(), 2);
    }

    #[test]
    fn test_notifier_after_receiver_dropped_does_not_panic() {
        let (notifier, rx) = Notifier::channel();
        drop(rx);
        notifier.notify(Notification::SaveHtmlRequested);
    }

    #[test]
    fn test_request_names() {
        assert_eq!(HostRequest::OpenDialog.name(), "open-dialog");
        assert_eq!(
            HostRequest::SaveHtml {
                content: String::new()
            }
            .name(),
            "save-html"
        );
    }
}
