// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Requests directory watcher.
//!
//! Request files are expected to be written elsewhere and then moved into
//! the watched directory, so only moved-in events are reported. Files
//! created in place are ignored.

use std::path::{Path, PathBuf};

use notify::event::{ModifyKind, RenameMode};
use notify::{Event, EventKind, RecommendedWatcher, RecursiveMode, Watcher, recommended_watcher};

use crate::daemon::request::is_request_file;
use crate::error::DaemonError;

/// A running directory watcher.
///
/// Events are delivered on the watcher's own thread for as long as this
/// handle is alive.
pub struct DirectoryWatcher {
    dir: PathBuf,
    _watcher: RecommendedWatcher,
}

impl std::fmt::Debug for DirectoryWatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DirectoryWatcher")
            .field("dir", &self.dir)
            .finish_non_exhaustive()
    }
}

impl DirectoryWatcher {
    /// Starts watching `dir` and calls `on_arrived` for every request file
    /// moved into it.
    ///
    /// The callback runs on the watcher thread and must not block.
    ///
    /// # Errors
    ///
    /// Returns error if the watch cannot be registered.
    pub fn start<F>(dir: &Path, on_arrived: F) -> Result<Self, DaemonError>
    where
        F: Fn(PathBuf) + Send + 'static,
    {
        let mut watcher = recommended_watcher(move |event: notify::Result<Event>| match event {
            Ok(event) => {
                for path in arrived_requests(&event) {
                    on_arrived(path);
                }
            }
            Err(err) => tracing::warn!(error = %err, "Watcher event error"),
        })?;
        watcher.watch(dir, RecursiveMode::NonRecursive)?;
        tracing::info!(dir = %dir.display(), "Watching for requests");

        Ok(Self {
            dir: dir.to_path_buf(),
            _watcher: watcher,
        })
    }

    /// Returns the watched directory.
    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dir
    }
}

/// Returns the paths an event moved into the watched directory.
///
/// A rename is reported once, through its `RenameMode::To` event. Backends
/// that pair both sides also emit a `RenameMode::Both` event for the same
/// rename, which is ignored. Backends that cannot tell the two sides apart
/// report `RenameMode::Any`; for those the path is kept only if it exists.
#[must_use]
pub fn arrived_paths(event: &Event) -> Vec<PathBuf> {
    match event.kind {
        EventKind::Modify(ModifyKind::Name(RenameMode::To)) => event.paths.clone(),
        EventKind::Modify(ModifyKind::Name(RenameMode::Any)) => event
            .paths
            .iter()
            .filter(|path| path.exists())
            .cloned()
            .collect(),
        _ => Vec::new(),
    }
}

/// Returns the request files an event moved into the watched directory.
#[must_use]
pub fn arrived_requests(event: &Event) -> Vec<PathBuf> {
    arrived_paths(event)
        .into_iter()
        .filter(|path| is_request_file(path))
        .collect()
}

#[cfg(test)]
mod tests {
    use std::sync::mpsc;
    use std::time::Duration;

    use notify::event::{CreateKind, RemoveKind};

    use super::*;

    fn event(kind: EventKind, paths: &[&str]) -> Event {
        paths
            .iter()
            .fold(Event::new(kind), |event, path| event.add_path(PathBuf::from(path)))
    }

    #[test]
    fn moved_in_request_is_reported() {
        let moved = event(
            EventKind::Modify(ModifyKind::Name(RenameMode::To)),
            &["/req/request.1700000000000"],
        );
        assert_eq!(
            arrived_requests(&moved),
            vec![PathBuf::from("/req/request.1700000000000")]
        );
    }

    #[test]
    fn moved_in_other_file_is_ignored() {
        let moved = event(
            EventKind::Modify(ModifyKind::Name(RenameMode::To)),
            &["/req/ignore.1700000000000"],
        );
        assert!(arrived_requests(&moved).is_empty());
    }

    #[test]
    fn rename_pair_is_left_to_destination_event() {
        let both = event(
            EventKind::Modify(ModifyKind::Name(RenameMode::Both)),
            &["/req/tmp.request.1", "/req/request.1"],
        );
        let to = event(
            EventKind::Modify(ModifyKind::Name(RenameMode::To)),
            &["/req/request.1"],
        );
        let reported: Vec<PathBuf> = [both, to].iter().flat_map(arrived_paths).collect();
        assert_eq!(reported, vec![PathBuf::from("/req/request.1")]);
    }

    #[test]
    fn created_moved_out_and_removed_are_ignored() {
        for kind in [
            EventKind::Create(CreateKind::File),
            EventKind::Modify(ModifyKind::Name(RenameMode::From)),
            EventKind::Remove(RemoveKind::File),
        ] {
            assert!(arrived_paths(&event(kind, &["/req/request.1"])).is_empty());
        }
    }

    #[test]
    fn real_rename_into_directory() {
        let watched = tempfile::tempdir().unwrap();
        let outside = tempfile::tempdir().unwrap();
        let (tx, rx) = mpsc::channel();

        let watcher = DirectoryWatcher::start(watched.path(), move |path| {
            let _ = tx.send(path);
        })
        .unwrap();
        assert_eq!(watcher.dir(), watched.path());

        // Created in place: not a delivery
        std::fs::write(watched.path().join("request.1"), b"{}").unwrap();

        let staged = outside.path().join("staged");
        std::fs::write(&staged, br#"{"relayOn": true, "ledOn": true}"#).unwrap();
        let ignored = outside.path().join("ignored");
        std::fs::write(&ignored, b"{}").unwrap();
        std::fs::rename(&ignored, watched.path().join("ignore.2")).unwrap();
        std::fs::rename(&staged, watched.path().join("request.3")).unwrap();

        let arrived = rx.recv_timeout(Duration::from_secs(5)).unwrap();
        assert_eq!(arrived.file_name().unwrap(), "request.3");
        assert!(rx.recv_timeout(Duration::from_millis(200)).is_err());
    }

    #[test]
    fn rename_within_directory_is_delivered_once() {
        let watched = tempfile::tempdir().unwrap();
        let (tx, rx) = mpsc::channel();

        let _watcher = DirectoryWatcher::start(watched.path(), move |path| {
            let _ = tx.send(path);
        })
        .unwrap();

        let staged = watched.path().join("tmp.request.1700000000000");
        let target = watched.path().join("request.1700000000000");
        std::fs::write(&staged, br#"{"relayOn": true, "ledOn": false}"#).unwrap();
        std::fs::rename(&staged, &target).unwrap();

        let arrived = rx.recv_timeout(Duration::from_secs(5)).unwrap();
        assert_eq!(arrived.file_name(), target.file_name());
        let extra: Vec<PathBuf> = std::iter::from_fn(|| {
            rx.recv_timeout(Duration::from_millis(500)).ok()
        })
        .collect();
        assert!(extra.is_empty(), "delivered again: {extra:?}");
    }
}
