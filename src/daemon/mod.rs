// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Request-driven control daemon.
//!
//! The daemon owns the [`Device`] and the [`StatusStore`]. Everything that
//! touches either runs on the daemon's loop, one task at a time:
//!
//! 1. [`Daemon::start`] writes the pid file, publishes an initial status and
//!    starts the [`DirectoryWatcher`].
//! 2. The watcher callback only enqueues a [`Task::ProcessRequest`] for each
//!    request file moved into the requests directory.
//! 3. [`Daemon::step`] dequeues the next task, waiting at most the idle
//!    timeout. A request is applied to the plug and followed by a status
//!    refresh; an idle timeout refreshes the status on its own.
//!
//! Failures while handling a task are logged and the loop keeps going.
//!
//! # Examples
//!
//! ```no_run
//! use hs100::Device;
//! use hs100::daemon::{Daemon, Task};
//!
//! # async fn example() -> Result<(), hs100::DaemonError> {
//! let device = Device::tcp("192.168.0.20").build();
//! let daemon = Daemon::new(device, "/var/lib/hs100/requests", "/var/lib/hs100/status.json")
//!     .with_pid_file("/run/hs100.pid");
//!
//! let handle = daemon.handle();
//! tokio::spawn(async move {
//!     let _ = tokio::signal::ctrl_c().await;
//!     handle.enqueue(Task::Shutdown);
//! });
//!
//! daemon.run().await
//! # }
//! ```

mod queue;
mod request;
mod status;
mod watcher;

pub use queue::{Dequeued, QueueSender, RequestQueue};
pub use request::{DesiredState, REQUEST_PREFIX, RequestFile, is_request_file, parse_timestamp};
pub use status::{STAGING_SUFFIX, StatusSnapshot, StatusStore};
pub use watcher::{DirectoryWatcher, arrived_paths, arrived_requests};

use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::config::{DEFAULT_IDLE_TIMEOUT, DaemonSettings};
use crate::device::Device;
use crate::error::{DaemonError, Error, io_err};
use crate::protocol::{Protocol, TcpClient};

/// Work item processed by the daemon loop.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Task {
    /// Apply the request file at this path.
    ProcessRequest(PathBuf),
    /// Leave the loop.
    Shutdown,
}

/// Whether the loop should keep running after a step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    /// Keep running.
    Continue,
    /// Leave the loop.
    Stop,
}

/// The control daemon.
#[derive(Debug)]
pub struct Daemon<P: Protocol> {
    device: Device<P>,
    status: StatusStore,
    sender: QueueSender<Task>,
    queue: RequestQueue<Task>,
    requests_dir: PathBuf,
    pid_file: Option<PathBuf>,
    idle_timeout: Duration,
    last_request: i64,
}

impl Daemon<TcpClient> {
    /// Creates a daemon for a plug reached over TCP.
    #[must_use]
    pub fn from_settings(settings: &DaemonSettings) -> Self {
        let device = Device::tcp_config(settings.device.to_tcp_config()).build();
        let daemon = Self::new(device, &settings.requests_dir, &settings.status_file)
            .with_idle_timeout(settings.idle_timeout);
        match &settings.pid_file {
            Some(pid_file) => daemon.with_pid_file(pid_file),
            None => daemon,
        }
    }
}

impl<P: Protocol> Daemon<P> {
    /// Creates a daemon.
    #[must_use]
    pub fn new(
        device: Device<P>,
        requests_dir: impl Into<PathBuf>,
        status_file: impl Into<PathBuf>,
    ) -> Self {
        let (sender, queue) = RequestQueue::channel();
        Self {
            device,
            status: StatusStore::new(status_file),
            sender,
            queue,
            requests_dir: requests_dir.into(),
            pid_file: None,
            idle_timeout: DEFAULT_IDLE_TIMEOUT,
            last_request: 0,
        }
    }

    /// Sets the file the process ID is written to.
    #[must_use]
    pub fn with_pid_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.pid_file = Some(path.into());
        self
    }

    /// Sets the interval of the idle status refresh.
    #[must_use]
    pub fn with_idle_timeout(mut self, timeout: Duration) -> Self {
        self.idle_timeout = timeout;
        self
    }

    /// Returns a handle for enqueueing tasks from outside the loop.
    #[must_use]
    pub fn handle(&self) -> QueueSender<Task> {
        self.sender.clone()
    }

    /// Returns the timestamp of the last applied request.
    #[must_use]
    pub fn last_request(&self) -> i64 {
        self.last_request
    }

    /// Returns the device.
    #[must_use]
    pub fn device(&self) -> &Device<P> {
        &self.device
    }

    /// Returns the status store.
    #[must_use]
    pub fn status(&self) -> &StatusStore {
        &self.status
    }

    /// Writes the pid file, publishes the initial status and starts the
    /// directory watcher.
    ///
    /// Events are only delivered while the returned watcher is alive.
    ///
    /// # Errors
    ///
    /// Returns error if the pid file cannot be written or the watcher cannot
    /// be started. A failed status refresh is only logged.
    pub async fn start(&mut self) -> Result<DirectoryWatcher, DaemonError> {
        if let Some(pid_file) = &self.pid_file {
            let pid = std::process::id();
            tokio::fs::write(pid_file, format!("{pid}\n"))
                .await
                .map_err(|e| io_err(pid_file, e))?;
            tracing::debug!(pid, path = %pid_file.display(), "Wrote pid file");
        }

        self.status.refresh(&self.device, self.last_request).await;

        let sender = self.sender.clone();
        let watcher = DirectoryWatcher::start(&self.requests_dir, move |path| {
            tracing::debug!(path = %path.display(), "Request arrived");
            sender.enqueue(Task::ProcessRequest(path));
        })?;

        tracing::info!(
            requests_dir = %self.requests_dir.display(),
            status_file = %self.status.path().display(),
            idle_timeout_secs = self.idle_timeout.as_secs(),
            "Daemon started"
        );
        Ok(watcher)
    }

    /// Handles the next task, or refreshes the status if none arrives within
    /// the idle timeout.
    pub async fn step(&mut self) -> Flow {
        match self.queue.dequeue(self.idle_timeout).await {
            Dequeued::Item(Task::ProcessRequest(path)) => {
                if let Err(e) = self.process_request(&path).await {
                    tracing::warn!(error = %e, path = %path.display(), "Request failed");
                }
                Flow::Continue
            }
            Dequeued::Timeout => {
                self.status.refresh(&self.device, self.last_request).await;
                Flow::Continue
            }
            Dequeued::Item(Task::Shutdown) | Dequeued::Closed => Flow::Stop,
        }
    }

    /// Applies a request file to the plug and publishes the new status.
    ///
    /// Files without the `request.` prefix are skipped. The file name and
    /// body are validated before the plug is contacted, so a non-numeric
    /// timestamp or a malformed body causes no device traffic.
    ///
    /// # Errors
    ///
    /// Returns error if the file is not a valid request or a device call
    /// fails. The last request timestamp is only updated once both the relay
    /// and the LED were set.
    pub async fn process_request(&mut self, path: &Path) -> Result<(), Error> {
        if !is_request_file(path) {
            tracing::debug!(path = %path.display(), "Skipping non-request file");
            return Ok(());
        }

        let request = RequestFile::read(path).await?;
        tracing::info!(
            timestamp = request.timestamp,
            relay_on = request.state.relay_on,
            led_on = request.state.led_on,
            "Applying request"
        );

        self.device.set_relay(request.state.relay_on).await?;
        self.device.set_led(request.state.led_on).await?;
        self.last_request = request.timestamp;

        self.status.refresh(&self.device, self.last_request).await;
        Ok(())
    }

    /// Runs the daemon until a [`Task::Shutdown`] is dequeued.
    ///
    /// The pid file is removed on the way out.
    ///
    /// # Errors
    ///
    /// Returns error if startup fails.
    pub async fn run(mut self) -> Result<(), DaemonError> {
        let _watcher = self.start().await?;

        while self.step().await == Flow::Continue {}

        tracing::info!("Daemon stopping");
        if let Some(pid_file) = &self.pid_file
            && let Err(e) = tokio::fs::remove_file(pid_file).await
        {
            tracing::warn!(error = %e, path = %pid_file.display(), "Failed to remove pid file");
        }
        Ok(())
    }
}
