//! Bookkeeping for temp output files that outlive their invocation.
//!
//! Every invocation registers its output base path before spawning the binary
//! and unregisters it once the output has been read. Whatever is still listed
//! at teardown is removed on a best-effort basis by [`TempFileRegistry::dispose`],
//! which runs at most once no matter which trigger reaches it first:
//!
//! - dropping the [`ExitGuard`] returned by [`TempFileRegistry::exit_guard`]
//! - the panic hook installed by [`TempFileRegistry::install_panic_hook`], for
//!   panics on the `main` thread only
//! - an explicit call, e.g. after a shutdown signal
//!
//! Only `<base>.txt` is removed at teardown, whatever format the invocation asked for.

use std::ffi::OsString;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};

use tracing::{debug, info, warn};

/// The only extension removed during teardown.
pub const DRAIN_EXTENSION: &str = "txt";

const MAIN_THREAD_NAME: &str = "main";

/// Appends `.ext` to `base` without touching dots already in the file name.
pub fn output_path(base: &Path, ext: &str) -> PathBuf {
    let mut raw: OsString = base.as_os_str().to_owned();
    raw.push(".");
    raw.push(ext);
    PathBuf::from(raw)
}

#[derive(Debug, Default)]
struct Inner {
    pending: Mutex<Vec<PathBuf>>,
    disposed: AtomicBool,
}

impl Inner {
    fn lock(&self) -> MutexGuard<'_, Vec<PathBuf>> {
        // A panic while holding the lock leaves the list itself intact.
        self.pending.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn drain(&self) -> Vec<PathBuf> {
        let mut pending = std::mem::take(&mut *self.lock());
        pending.reverse();

        for base in &pending {
            let path = output_path(base, DRAIN_EXTENSION);
            match std::fs::remove_file(&path) {
                Ok(()) => debug!(path = %path.display(), "Removed leftover OCR output"),
                Err(e) if e.kind() == io::ErrorKind::NotFound => {
                    debug!(path = %path.display(), "Leftover OCR output already gone")
                }
                Err(e) => warn!(path = %path.display(), error = %e, "Failed to remove leftover OCR output"),
            }
        }

        pending
    }

    fn dispose(&self) -> bool {
        if self.disposed.swap(true, Ordering::SeqCst) {
            return false;
        }
        let drained = self.drain();
        if !drained.is_empty() {
            info!(count = drained.len(), "Drained pending OCR temp files");
        }
        true
    }
}

/// Shared list of output base paths whose files have not been cleaned up yet.
///
/// Clones share the same list.
#[derive(Debug, Clone, Default)]
pub struct TempFileRegistry {
    inner: Arc<Inner>,
}

impl TempFileRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&self, base: impl Into<PathBuf>) {
        self.inner.lock().push(base.into());
    }

    /// Removes the first entry equal to `base`. Returns whether one was found.
    pub fn unregister(&self, base: &Path) -> bool {
        let mut pending = self.inner.lock();
        match pending.iter().position(|p| p == base) {
            Some(index) => {
                pending.remove(index);
                true
            }
            None => false,
        }
    }

    pub fn contains(&self, base: &Path) -> bool {
        self.inner.lock().iter().any(|p| p == base)
    }

    /// Snapshot of pending entries in insertion order.
    pub fn pending(&self) -> Vec<PathBuf> {
        self.inner.lock().clone()
    }

    pub fn len(&self) -> usize {
        self.inner.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.lock().is_empty()
    }

    /// Removes `<base>.txt` for every pending entry, newest first, and empties the list.
    ///
    /// Failures are logged, never returned. Returns the drained base paths in
    /// the order they were processed.
    pub fn drain(&self) -> Vec<PathBuf> {
        self.inner.drain()
    }

    /// Drains the registry the first time it is called; later calls do nothing.
    ///
    /// Returns `true` for the call that performed the drain.
    pub fn dispose(&self) -> bool {
        self.inner.dispose()
    }

    pub fn is_disposed(&self) -> bool {
        self.inner.disposed.load(Ordering::SeqCst)
    }

    /// Guard that disposes the registry when dropped, typically held for the
    /// lifetime of `main`.
    pub fn exit_guard(&self) -> ExitGuard {
        ExitGuard {
            registry: self.clone(),
        }
    }

    /// Chains a panic hook that disposes the registry before the previous hook runs.
    ///
    /// With `panic = "abort"` no destructor runs after a panic, so this is the
    /// only teardown path left in that configuration. The hook holds a weak
    /// reference and does nothing once the registry is gone.
    ///
    /// Only panics on the thread named `main` dispose the registry. Panics on
    /// runtime workers or blocking-pool threads are caught by tokio and do not
    /// end the process, so in-flight outputs are left alone. Under
    /// `panic = "abort"` a worker panic still ends the process without a drain.
    pub fn install_panic_hook(&self) {
        let weak: Weak<Inner> = Arc::downgrade(&self.inner);
        let previous = std::panic::take_hook();
        std::panic::set_hook(Box::new(move |panic_info| {
            if std::thread::current().name() == Some(MAIN_THREAD_NAME) {
                if let Some(inner) = weak.upgrade() {
                    inner.dispose();
                }
            }
            previous(panic_info);
        }));
    }
}

/// Disposes its registry on drop.
#[must_use = "the registry is disposed as soon as the guard is dropped"]
#[derive(Debug)]
pub struct ExitGuard {
    registry: TempFileRegistry,
}

impl Drop for ExitGuard {
    fn drop(&mut self) {
        self.registry.dispose();
    }
}
