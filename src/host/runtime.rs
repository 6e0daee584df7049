//! Where host requests actually run.
//!
//! On most platforms a dedicated worker thread owns the controller so file
//! I/O and modal dialogs never stall the UI thread. macOS requires native
//! dialogs on the main thread, so there the controller runs inline and the
//! UI pumps queued requests between frames. Both modes process requests in
//! submission order.

use super::HostRequest;
use crossbeam_channel::{unbounded, Receiver, Sender};
use std::thread::JoinHandle;

/// Anything that can service host requests.
pub trait RequestHandler: Send {
    fn handle(&mut self, request: HostRequest);
}

enum Mode {
    Worker(Option<JoinHandle<()>>),
    Inline {
        queue: Receiver<HostRequest>,
        handler: Box<dyn RequestHandler>,
    },
}

/// UI-side handle to the host controller.
pub struct HostHandle {
    requests: Option<Sender<HostRequest>>,
    mode: Mode,
}

impl HostHandle {
    /// Run `handler` on its own thread until the handle is dropped.
    pub fn spawn<H: RequestHandler + 'static>(mut handler: H) -> std::io::Result<Self> {
        let (tx, rx) = unbounded::<HostRequest>();
        let worker = std::thread::Builder::new()
            .name("host-controller".to_string())
            .spawn(move || {
                for request in rx.iter() {
                    handler.handle(request);
                }
                log::debug!("Host controller stopped");
            })?;
        Ok(Self {
            requests: Some(tx),
            mode: Mode::Worker(Some(worker)),
        })
    }

    /// Queue requests and run them on the calling thread from [`Self::pump`].
    pub fn inline<H: RequestHandler + 'static>(handler: H) -> Self {
        let (tx, rx) = unbounded();
        Self {
            requests: Some(tx),
            mode: Mode::Inline {
                queue: rx,
                handler: Box::new(handler),
            },
        }
    }

    pub fn is_inline(&self) -> bool {
        matches!(self.mode, Mode::Inline { .. })
    }

    /// Hand a request to the host. Never blocks and never waits for a reply.
    pub fn submit(&self, request: HostRequest) {
        let Some(tx) = &self.requests else {
            return;
        };
        if let Err(err) = tx.send(request) {
            log::warn!("Host controller is gone; dropping {}", err.0.name());
        }
    }

    /// Run queued requests when inline. Returns how many were handled.
    pub fn pump(&mut self) -> usize {
        match &mut self.mode {
            Mode::Worker(_) => 0,
            Mode::Inline { queue, handler } => {
                let mut handled = 0;
                while let Ok(request) = queue.try_recv() {
                    handler.handle(request);
                    handled += 1;
                }
                handled
            }
        }
    }
}

impl Drop for HostHandle {
    fn drop(&mut self) {
        // Closing the channel ends the worker loop.
        drop(self.requests.take());
        if let Mode::Worker(worker) = &mut self.mode {
            if let Some(worker) = worker.take() {
                if worker.join().is_err() {
                    log::error!("Host controller thread panicked");
                }
            }
        }
    }
}
