use std::sync::{
    atomic::{AtomicBool, Ordering},
    Arc,
};

/// Shared, one-way cancellation flag.
///
/// Clones observe the same flag, so a handle can be moved to whichever thread
/// needs to request cancellation while a search is in flight. Once set, the
/// flag stays set.
#[derive(Clone, Debug, Default)]
pub struct CancelFlag(Arc<AtomicBool>);

impl CancelFlag {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn request_cancel(&self) {
        self.0.store(true, Ordering::Release);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Acquire)
    }
}
