use std::sync::{
    Arc,
    atomic::{AtomicBool, Ordering},
};

///
/// CancelFlag
///
/// Shared cancellation signal checked at every step of the lattice walk.
/// Clones observe the same flag.
///

#[derive(Clone, Debug, Default)]
pub struct CancelFlag(Arc<AtomicBool>);

impl CancelFlag {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::Relaxed);
    }

    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }
}
