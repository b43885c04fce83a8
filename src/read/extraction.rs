//! Bulk extraction to the filesystem.
//!
//! Workers share an atomic cursor over the entry list: each one claims the
//! next index, skips it if the selector rejects it, and otherwise decodes
//! the payload and writes the file. The calling thread coordinates: it
//! polls the workers, reports the cursor to the progress callback, and
//! stops everyone on cancellation or on the first error.
//!
//! No ordering among extracted files is guaranteed.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use log::debug;

use crate::name::SEPARATOR;
use crate::progress::ProgressReporter;
use crate::{Error, Result};

use super::{Archive, Entry, EntrySelector, ExtractOptions};

/// Maps an entry name onto a path below `dest`.
///
/// # Errors
///
/// Returns [`Error::UnsafePath`] if a component is `.`, `..` or empty, or
/// if the first component names a drive (`C:`).
pub fn output_path(dest: &Path, name: &str) -> Result<PathBuf> {
    let unsafe_path = || Error::UnsafePath {
        name: name.to_string(),
    };
    let mut path = dest.to_path_buf();
    for (i, part) in name.split(SEPARATOR).enumerate() {
        if part.is_empty() || part == "." || part == ".." || part.contains('/') {
            return Err(unsafe_path());
        }
        if i == 0 && part.ends_with(':') {
            return Err(unsafe_path());
        }
        path.push(part);
    }
    Ok(path)
}

/// State shared between the coordinator and the workers.
#[derive(Debug, Default)]
struct SharedState {
    cursor: AtomicUsize,
    matched: AtomicUsize,
    stop: AtomicBool,
    first_error: Mutex<Option<Error>>,
}

impl SharedState {
    fn record_error(&self, error: Error) {
        let mut slot = self
            .first_error
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner);
        if slot.is_none() {
            *slot = Some(error);
        }
        self.stop.store(true, Ordering::Release);
    }

    fn has_error(&self) -> bool {
        self.first_error
            .lock()
            .map(|slot| slot.is_some())
            .unwrap_or(true)
    }

    fn take_error(&self) -> Option<Error> {
        self.first_error
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .take()
    }
}

impl Archive {
    /// Extracts every entry below `dest`.
    ///
    /// Returns the number of files written.
    pub fn extract_all(
        &self,
        dest: impl AsRef<Path>,
        options: &ExtractOptions,
        progress: &mut dyn ProgressReporter,
    ) -> Result<usize> {
        self.extract_where(dest, (), options, progress)
    }

    /// Extracts the entries accepted by `selector` below `dest`.
    ///
    /// Progress is reported as `(cursor, total)` where `cursor` is the next
    /// entry index to be claimed. Returning `false` from the callback stops
    /// all workers after the file each is currently writing, then fails with
    /// [`Error::Cancelled`]. If any worker fails, the others stop claiming
    /// work and the first error is returned once all have finished.
    ///
    /// Returns the number of matched files written.
    ///
    /// # Examples
    ///
    /// ```rust,no_run
    /// use pck::progress::NoProgress;
    /// use pck::{Archive, Entry, ExtractOptions};
    ///
    /// let archive = Archive::open("models.pck")?;
    /// let count = archive.extract_where(
    ///     "./out",
    ///     |e: &Entry| e.name().ends_with(".dds"),
    ///     &ExtractOptions::default(),
    ///     &mut NoProgress,
    /// )?;
    /// println!("{} textures", count);
    /// # Ok::<(), pck::Error>(())
    /// ```
    pub fn extract_where<S: EntrySelector + Sync>(
        &self,
        dest: impl AsRef<Path>,
        selector: S,
        options: &ExtractOptions,
        progress: &mut dyn ProgressReporter,
    ) -> Result<usize> {
        let dest = dest.as_ref();
        fs::create_dir_all(dest)?;

        let total = self.entries.len();
        let workers = options.threads.count().min(total).max(1);
        debug!(
            "Extracting {} entries from {} with {} workers",
            total,
            self.path().display(),
            workers
        );

        let state = SharedState::default();
        let cancelled = self.run_extraction(dest, &selector, options, progress, &state, workers)?;

        if let Some(error) = state.take_error() {
            return Err(error);
        }
        if cancelled {
            return Err(Error::Cancelled);
        }

        progress.on_progress(total as u64, total as u64);
        Ok(state.matched.load(Ordering::Acquire))
    }

    /// Extracts a single entry below `dest`, returning the written path.
    pub fn extract_entry(&self, entry: &Entry, dest: impl AsRef<Path>) -> Result<PathBuf> {
        let path = output_path(dest.as_ref(), entry.name())?;
        let data = self.read(entry)?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&path, data)?;
        Ok(path)
    }

    /// Claims and extracts entries until the list is exhausted or a stop is requested.
    fn extraction_worker<S: EntrySelector>(&self, dest: &Path, selector: &S, state: &SharedState) {
        loop {
            if state.stop.load(Ordering::Acquire) {
                break;
            }
            let index = state.cursor.fetch_add(1, Ordering::AcqRel);
            let Some(entry) = self.entries.get(index) else {
                break;
            };
            if !selector.select(entry) {
                continue;
            }
            match self.extract_entry(entry, dest) {
                Ok(_) => {
                    state.matched.fetch_add(1, Ordering::AcqRel);
                }
                Err(e) => {
                    state.record_error(e);
                    break;
                }
            }
        }
    }

    /// Runs the workers on a rayon pool and coordinates them from this thread.
    ///
    /// Returns whether the progress callback cancelled the run.
    #[cfg(feature = "parallel")]
    fn run_extraction<S: EntrySelector + Sync>(
        &self,
        dest: &Path,
        selector: &S,
        options: &ExtractOptions,
        progress: &mut dyn ProgressReporter,
        state: &SharedState,
        workers: usize,
    ) -> Result<bool> {
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(workers)
            .thread_name(|i| format!("pck-extract-{}", i))
            .build()
            .map_err(|e| Error::Io(std::io::Error::other(e)))?;

        let total = self.entries.len();
        let finished = AtomicUsize::new(0);
        let mut cancelled = false;

        pool.in_place_scope(|scope| {
            for _ in 0..workers {
                scope.spawn(|_| {
                    self.extraction_worker(dest, selector, state);
                    finished.fetch_add(1, Ordering::AcqRel);
                });
            }

            while finished.load(Ordering::Acquire) < workers {
                if state.has_error() {
                    break;
                }
                let current = state.cursor.load(Ordering::Acquire).min(total);
                if !progress.on_progress(current as u64, total as u64) {
                    state.stop.store(true, Ordering::Release);
                    cancelled = true;
                    break;
                }
                std::thread::sleep(options.poll_interval);
            }
        });

        Ok(cancelled)
    }

    /// Runs the worker loop on the calling thread, reporting progress per entry.
    #[cfg(not(feature = "parallel"))]
    fn run_extraction<S: EntrySelector + Sync>(
        &self,
        dest: &Path,
        selector: &S,
        _options: &ExtractOptions,
        progress: &mut dyn ProgressReporter,
        state: &SharedState,
        _workers: usize,
    ) -> Result<bool> {
        let total = self.entries.len();
        while state.cursor.load(Ordering::Acquire) < total {
            let current = state.cursor.load(Ordering::Acquire);
            if !progress.on_progress(current as u64, total as u64) {
                return Ok(true);
            }
            // Claim exactly one entry per progress tick.
            let index = state.cursor.fetch_add(1, Ordering::AcqRel);
            let entry = &self.entries[index];
            if !selector.select(entry) {
                continue;
            }
            match self.extract_entry(entry, dest) {
                Ok(_) => {
                    state.matched.fetch_add(1, Ordering::AcqRel);
                }
                Err(e) => {
                    state.record_error(e);
                    break;
                }
            }
        }
        Ok(false)
    }
}
