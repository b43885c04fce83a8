//! Extraction options.

use std::num::NonZeroUsize;
use std::time::Duration;

/// How many workers bulk extraction spreads entries across.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Threads {
    /// One worker per available CPU.
    #[default]
    Auto,
    /// A fixed worker count. Counts above the entry count are clamped.
    Count(NonZeroUsize),
    /// Extract on the calling thread.
    Single,
}

impl Threads {
    /// `Count(n)`, or `Single` when `n` is zero.
    ///
    /// ```rust
    /// use pck::read::Threads;
    ///
    /// assert_eq!(Threads::count_or_single(0), Threads::Single);
    /// assert_eq!(Threads::count_or_single(4).count(), 4);
    /// ```
    pub fn count_or_single(n: usize) -> Self {
        NonZeroUsize::new(n).map_or(Self::Single, Self::Count)
    }

    /// Resolves to a concrete worker count, never zero.
    pub fn count(&self) -> usize {
        match *self {
            Self::Auto => std::thread::available_parallelism().map_or(1, NonZeroUsize::get),
            Self::Count(n) => n.get(),
            Self::Single => 1,
        }
    }
}

/// Sleep between cursor polls while workers run.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(1);

/// Options for [`Archive::extract_where`](crate::Archive::extract_where) and
/// its wrappers.
#[derive(Debug, Clone)]
pub struct ExtractOptions {
    /// Number of extraction workers.
    pub threads: Threads,
    /// How often the coordinating thread reports the shared cursor.
    pub poll_interval: Duration,
}

impl Default for ExtractOptions {
    fn default() -> Self {
        Self {
            threads: Threads::Auto,
            poll_interval: DEFAULT_POLL_INTERVAL,
        }
    }
}

impl ExtractOptions {
    /// Auto worker count, polled every [`DEFAULT_POLL_INTERVAL`].
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the worker count.
    pub fn threads(self, threads: Threads) -> Self {
        Self { threads, ..self }
    }

    /// Sets how often progress is reported.
    pub fn poll_interval(self, poll_interval: Duration) -> Self {
        Self {
            poll_interval,
            ..self
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_thread_resolution() {
        assert!(Threads::Auto.count() >= 1);
        assert_eq!(Threads::Single.count(), 1);
        assert_eq!(Threads::count_or_single(64), Threads::Count(NonZeroUsize::new(64).unwrap()));
    }

    #[test]
    fn test_extract_options_builder() {
        let opts = ExtractOptions::new()
            .threads(Threads::Single)
            .poll_interval(Duration::from_millis(5));
        assert_eq!(opts.threads, Threads::Single);
        assert_eq!(opts.poll_interval, Duration::from_millis(5));
        assert_eq!(ExtractOptions::default().threads, Threads::Auto);
    }
}
