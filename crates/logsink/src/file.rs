//! Asynchronous file-backed sink
//!
//! A [`FileSink`] owns its file handle exclusively: every entry goes through
//! a bounded queue to a single background drain task, so producers never
//! touch the file and never wait on disk I/O beyond queue capacity.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use bytes::Bytes;
use tokio::fs::{self, File};
use tokio::io::AsyncWriteExt;
use tokio::sync::Mutex;
use tokio::sync::mpsc::{self, Receiver, Sender};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tokio_util::task::TaskTracker;

use crate::diag::Diagnostics;
use crate::sink::Sink;
use crate::{Error, Result};

/// Upper bound on queued entries; producers wait once the queue is full.
pub const QUEUE_CAPACITY: usize = 100;

#[cfg(unix)]
const DIR_MODE: u32 = 0o755;
#[cfg(unix)]
const FILE_MODE: u32 = 0o600;

/// Asynchronous file sink.
///
/// Writes are queued and persisted by a dedicated drain task; [`close`] is
/// idempotent and safe to call concurrently from any task.
///
/// [`close`]: Sink::close
pub struct FileSink {
    path: PathBuf,
    sender: Sender<Bytes>,
    done: CancellationToken,
    tasks: TaskTracker,
    drain: Mutex<Option<JoinHandle<std::io::Result<()>>>>,
    diagnostics: Diagnostics,
}

impl FileSink {
    /// Opens `path` and starts the drain task.
    ///
    /// Missing parent directories are created mode `0755`; the file itself
    /// is created mode `0600`, or opened for appending when it already
    /// exists. The standard library opens descriptors close-on-exec, so
    /// child processes never inherit the handle.
    ///
    /// # Errors
    ///
    /// Returns an error when the directory or file cannot be created or
    /// opened.
    pub async fn new(path: impl AsRef<Path>, diagnostics: Diagnostics) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let file = open_log_file(&path).await?;

        let (sender, receiver) = mpsc::channel(QUEUE_CAPACITY);
        let done = CancellationToken::new();
        let tasks = TaskTracker::new();

        let drain = tasks.spawn(drain_loop(
            file,
            receiver,
            done.clone(),
            diagnostics.clone(),
        ));
        tasks.close();

        Ok(Self {
            path,
            sender,
            done,
            tasks,
            drain: Mutex::new(Some(drain)),
            diagnostics,
        })
    }

    /// The file this sink writes to.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[async_trait]
impl Sink for FileSink {
    async fn write(&self, data: Bytes) -> Result<usize> {
        // The shutdown branch is polled first so a write issued after close
        // can never sneak into a queue nobody will drain.
        tokio::select! {
            biased;
            () = self.done.cancelled() => {
                self.diagnostics.emit(&data);
                Err(Error::SinkClosed)
            }
            permit = self.sender.reserve() => match permit {
                Ok(permit) => {
                    let len = data.len();
                    permit.send(data);
                    Ok(len)
                }
                Err(_) => {
                    self.diagnostics.emit(&data);
                    Err(Error::SinkClosed)
                }
            },
        }
    }

    async fn close(&self) -> Result<()> {
        self.done.cancel();

        let drain = self.drain.lock().await.take();
        self.tasks.wait().await;

        // Only the call that detached the drain task surfaces its flush
        // result; later and concurrent closers return success.
        match drain {
            Some(handle) => handle.await.map_err(Error::from)?.map_err(Error::from),
            None => Ok(()),
        }
    }
}

async fn open_log_file(path: &Path) -> Result<File> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() && fs::metadata(parent).await.is_err() {
            let mut dirs = fs::DirBuilder::new();
            dirs.recursive(true);
            #[cfg(unix)]
            dirs.mode(DIR_MODE);
            dirs.create(parent)
                .await
                .map_err(|source| Error::CreateDirectory {
                    path: parent.to_path_buf(),
                    source,
                })?;
        }
    }

    let mut options = fs::OpenOptions::new();
    options.append(true).create(true);
    #[cfg(unix)]
    options.mode(FILE_MODE);
    Ok(options.open(path).await?)
}

/// Sole writer of the file handle.
///
/// Exits when the done token fires or every sender is gone, persisting
/// whatever is still queued before flushing to stable storage.
async fn drain_loop(
    mut file: File,
    mut receiver: Receiver<Bytes>,
    done: CancellationToken,
    diagnostics: Diagnostics,
) -> std::io::Result<()> {
    loop {
        tokio::select! {
            entry = receiver.recv() => match entry {
                Some(entry) => write_entry(&mut file, &entry, &diagnostics).await,
                None => break,
            },
            () = done.cancelled() => break,
        }
    }

    // Refuse new entries, then drain the ones that made it into the queue
    // before shutdown; outstanding reservations resolve before `recv`
    // yields `None`, so an acknowledged write is never lost.
    receiver.close();
    while let Some(entry) = receiver.recv().await {
        write_entry(&mut file, &entry, &diagnostics).await;
    }

    file.flush().await?;
    file.sync_all().await
}

/// Best-effort write; failures go to diagnostics, never to producers.
async fn write_entry(file: &mut File, entry: &Bytes, diagnostics: &Diagnostics) {
    if let Err(error) = file.write_all(entry).await {
        diagnostics.emit_str(&format!("log write failed: {error}"));
    }
}
