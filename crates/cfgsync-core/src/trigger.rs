//! Reload trigger: a worker thread that reloads every document on SIGHUP or
//! on request, and publishes the outcome through a [`Notifier`]
//!
//! The worker owns a current-thread tokio runtime. The signal handler is
//! installed before the thread starts, so a process that spawned a trigger
//! is never terminated by SIGHUP.

use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, LazyLock, Mutex, PoisonError};
use std::thread::JoinHandle;

use tokio::sync::mpsc;
use tracing::{debug, error, info, warn};

use crate::{Directory, Error, Result};

/// Capacity of the reload notice channel.
pub const NOTIFY_CAPACITY: usize = 100;

static GLOBAL_NOTIFIER: LazyLock<Arc<Notifier>> = LazyLock::new(|| Arc::new(Notifier::new()));

static INSTALLED: Mutex<Option<ReloadTrigger>> = Mutex::new(None);

/// What started a reload.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReloadSource {
    /// The process received SIGHUP
    Signal,
    /// [`ReloadTrigger::request`] was called
    Request,
}

impl fmt::Display for ReloadSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Signal => write!(f, "signal"),
            Self::Request => write!(f, "request"),
        }
    }
}

/// Outcome of one reload of every document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReloadNotice {
    pub source: ReloadSource,
    /// Error text when at least one document failed
    pub error: Option<String>,
}

impl ReloadNotice {
    pub fn is_ok(&self) -> bool {
        self.error.is_none()
    }
}

impl fmt::Display for ReloadNotice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.error {
            None => write!(f, "reload ({}) succeeded", self.source),
            Some(e) => write!(f, "reload ({}) failed: {e}", self.source),
        }
    }
}

/// Bounded channel of reload notices with a single subscriber.
///
/// Until somebody subscribes, notices are written to the log instead.
#[derive(Debug)]
pub struct Notifier {
    sender: mpsc::Sender<ReloadNotice>,
    receiver: Mutex<Option<mpsc::Receiver<ReloadNotice>>>,
    subscribed: AtomicBool,
}

impl Notifier {
    pub fn new() -> Self {
        Self::with_capacity(NOTIFY_CAPACITY)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        let (sender, receiver) = mpsc::channel(capacity);
        Self {
            sender,
            receiver: Mutex::new(Some(receiver)),
            subscribed: AtomicBool::new(false),
        }
    }

    /// The process-wide notifier used by [`install_signal_reload`].
    pub fn global() -> &'static Arc<Notifier> {
        &GLOBAL_NOTIFIER
    }

    /// Take the receiving end. Only the first call gets it.
    pub fn subscribe(&self) -> Option<mpsc::Receiver<ReloadNotice>> {
        let receiver = self
            .receiver
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
        if receiver.is_some() {
            self.subscribed.store(true, Ordering::Release);
        }
        receiver
    }

    /// Deliver a notice without blocking.
    pub fn publish(&self, notice: ReloadNotice) {
        if !self.subscribed.load(Ordering::Acquire) {
            log_notice(&notice);
            return;
        }

        match self.sender.try_send(notice) {
            Ok(()) => {}
            Err(mpsc::error::TrySendError::Full(notice)) => {
                warn!(source = %notice.source, "reload notice channel is full, dropping notice");
            }
            Err(mpsc::error::TrySendError::Closed(notice)) => log_notice(&notice),
        }
    }
}

impl Default for Notifier {
    fn default() -> Self {
        Self::new()
    }
}

fn log_notice(notice: &ReloadNotice) {
    match &notice.error {
        None => info!(source = %notice.source, "config documents reloaded"),
        Some(e) => error!(source = %notice.source, error = %e, "config reload failed"),
    }
}

#[derive(Debug)]
enum Command {
    Reload,
    Shutdown,
}

/// Handle to the reload worker thread.
///
/// Dropping the handle stops the worker and waits for it.
#[derive(Debug)]
pub struct ReloadTrigger {
    commands: mpsc::UnboundedSender<Command>,
    worker: Option<JoinHandle<()>>,
}

impl ReloadTrigger {
    /// Start the worker over `directory`, publishing outcomes to `notifier`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Trigger`] if the runtime, the signal handler or the
    /// thread could not be created.
    pub fn spawn(directory: Arc<Directory>, notifier: Arc<Notifier>) -> Result<Self> {
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .map_err(Error::Trigger)?;

        let hangup = {
            let _guard = runtime.enter();
            Hangup::install().map_err(Error::Trigger)?
        };

        let (commands, receiver) = mpsc::unbounded_channel();
        let worker = std::thread::Builder::new()
            .name("cfgsync-reload".to_string())
            .spawn(move || runtime.block_on(run(directory, notifier, receiver, hangup)))
            .map_err(Error::Trigger)?;

        debug!("reload trigger started");
        Ok(Self {
            commands,
            worker: Some(worker),
        })
    }

    /// Ask the worker for a reload of every document.
    ///
    /// Returns `false` if the worker has already stopped.
    pub fn request(&self) -> bool {
        self.commands.send(Command::Reload).is_ok()
    }

    /// Stop the worker and wait for it to finish.
    pub fn shutdown(mut self) {
        self.stop();
    }

    fn stop(&mut self) {
        let Some(worker) = self.worker.take() else {
            return;
        };
        let _ = self.commands.send(Command::Shutdown);
        if worker.join().is_err() {
            error!("reload worker panicked");
        }
        debug!("reload trigger stopped");
    }
}

impl Drop for ReloadTrigger {
    fn drop(&mut self) {
        self.stop();
    }
}

async fn run(
    directory: Arc<Directory>,
    notifier: Arc<Notifier>,
    mut commands: mpsc::UnboundedReceiver<Command>,
    mut hangup: Hangup,
) {
    loop {
        let source = tokio::select! {
            command = commands.recv() => match command {
                Some(Command::Reload) => ReloadSource::Request,
                Some(Command::Shutdown) | None => break,
            },
            Some(()) = hangup.recv() => ReloadSource::Signal,
        };

        debug!(%source, "reloading every config document");
        let error = directory.reload_all().err().map(|e| e.to_string());
        notifier.publish(ReloadNotice { source, error });
    }
}

#[cfg(unix)]
struct Hangup(tokio::signal::unix::Signal);

#[cfg(unix)]
impl Hangup {
    fn install() -> std::io::Result<Self> {
        use tokio::signal::unix::{SignalKind, signal};
        Ok(Self(signal(SignalKind::hangup())?))
    }

    async fn recv(&mut self) -> Option<()> {
        self.0.recv().await
    }
}

#[cfg(not(unix))]
struct Hangup;

#[cfg(not(unix))]
impl Hangup {
    fn install() -> std::io::Result<Self> {
        Ok(Self)
    }

    async fn recv(&mut self) -> Option<()> {
        std::future::pending().await
    }
}

/// Reload every document of the global directory on SIGHUP.
///
/// Starts one worker per process; later calls do nothing. Outcomes go to
/// [`Notifier::global`].
pub fn install_signal_reload() -> Result<()> {
    let mut installed = INSTALLED.lock().unwrap_or_else(PoisonError::into_inner);
    if installed.is_none() {
        *installed = Some(ReloadTrigger::spawn(
            Arc::clone(Directory::global()),
            Arc::clone(Notifier::global()),
        )?);
    }
    Ok(())
}
