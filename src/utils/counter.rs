//! A simple counter for tracking extraction results.
use std::sync::atomic::AtomicUsize;
use std::sync::atomic::Ordering::SeqCst;

#[derive(Debug, Default)]
/// A counter shared between extraction workers.
pub struct Counter {
    ok: AtomicUsize,
    error: AtomicUsize,
}

impl Counter {
    /// Creates a new Counter instance.
    pub fn new() -> Self {
        Self::default()
    }

    /// Increments the count of extracted entries.
    pub fn inc_ok(&self) {
        self.ok.fetch_add(1, SeqCst);
    }

    /// Increments the count of failed entries.
    pub fn inc_error(&self) {
        self.error.fetch_add(1, SeqCst);
    }

    pub fn ok(&self) -> usize {
        self.ok.load(SeqCst)
    }

    pub fn error(&self) -> usize {
        self.error.load(SeqCst)
    }
}

impl std::fmt::Display for Counter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "OK: {}, Error: {}", self.ok(), self.error())
    }
}
