//! Progress reporting and cancellation for long-running archive operations.
//!
//! Commits report one step per pending operation and extraction reports the
//! index cursor. Returning `false` from [`ProgressReporter::on_progress`]
//! cancels the operation, which then fails with
//! [`Error::Cancelled`](crate::Error::Cancelled).
//!
//! # Example
//!
//! ```rust,no_run
//! use pck::progress::progress_fn;
//! use pck::{Archive, ExtractOptions};
//!
//! let archive = Archive::open("models.pck")?;
//! let mut progress = progress_fn(|done, total| {
//!     println!("{}/{}", done, total);
//!     true
//! });
//! archive.extract_all("./out", &ExtractOptions::default(), &mut progress)?;
//! # Ok::<(), pck::Error>(())
//! ```

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};

/// Receives `(done, total)` step counts from commits and extractions.
pub trait ProgressReporter: Send {
    /// Called after each step, and once more when the operation ends.
    ///
    /// Returns `false` to stop the operation at the next step boundary.
    fn on_progress(&mut self, done: u64, total: u64) -> bool {
        let _ = (done, total);
        true
    }
}

/// Ignores every update and never cancels.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoProgress;

impl ProgressReporter for NoProgress {}

/// Step counters that other threads can watch and cancel through.
///
/// The CLI shares one of these between the progress bar and its Ctrl-C
/// handler; a cancelled counter makes the next report return `false`.
#[derive(Debug, Default)]
pub struct AtomicProgress {
    done: AtomicU64,
    total: AtomicU64,
    cancelled: AtomicBool,
}

impl AtomicProgress {
    /// Creates zeroed counters.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates zeroed counters behind an `Arc`.
    pub fn shared() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Steps completed at the last report.
    pub fn current(&self) -> u64 {
        self.done.load(Ordering::Relaxed)
    }

    /// Step total at the last report.
    pub fn total(&self) -> u64 {
        self.total.load(Ordering::Relaxed)
    }

    /// `true` once the last report covered every step.
    pub fn is_finished(&self) -> bool {
        let total = self.total();
        total > 0 && self.current() >= total
    }

    /// `true` once [`cancel`](Self::cancel) was called.
    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::Relaxed)
    }

    /// Makes the next report return `false`.
    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::Relaxed);
    }

    fn store(&self, done: u64, total: u64) -> bool {
        self.done.store(done, Ordering::Relaxed);
        self.total.store(total, Ordering::Relaxed);
        !self.is_cancelled()
    }
}

impl ProgressReporter for AtomicProgress {
    fn on_progress(&mut self, done: u64, total: u64) -> bool {
        self.store(done, total)
    }
}

impl ProgressReporter for Arc<AtomicProgress> {
    fn on_progress(&mut self, done: u64, total: u64) -> bool {
        self.store(done, total)
    }
}

/// Adapter returned by [`progress_fn`].
pub struct FnProgress<F>(F);

impl<F> ProgressReporter for FnProgress<F>
where
    F: FnMut(u64, u64) -> bool + Send,
{
    fn on_progress(&mut self, done: u64, total: u64) -> bool {
        (self.0)(done, total)
    }
}

/// Wraps a `(done, total) -> keep_going` closure as a reporter.
pub fn progress_fn<F>(f: F) -> FnProgress<F>
where
    F: FnMut(u64, u64) -> bool + Send,
{
    FnProgress(f)
}

/// Formats a byte count with binary units, one decimal above bytes.
///
/// ```rust
/// use pck::progress::format_bytes_iec;
///
/// assert_eq!(format_bytes_iec(0), "0 B");
/// assert_eq!(format_bytes_iec(1536), "1.5 KiB");
/// assert_eq!(format_bytes_iec(0x7FFF_FF00), "2.0 GiB");
/// ```
pub fn format_bytes_iec(bytes: u64) -> String {
    const UNITS: [&str; 4] = ["KiB", "MiB", "GiB", "TiB"];
    if bytes < 1024 {
        return format!("{} B", bytes);
    }
    let mut value = bytes as f64 / 1024.0;
    let mut unit = 0;
    while value >= 1024.0 && unit + 1 < UNITS.len() {
        value /= 1024.0;
        unit += 1;
    }
    format!("{:.1} {}", value, UNITS[unit])
}
