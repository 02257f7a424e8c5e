use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// A process-wide cooperative cancellation signal.
///
/// Checked between scanner tuples, between blocks in the splitter, and
/// between partitions during resync, so a long pipeline pass can be
/// interrupted promptly without leaving persisted state half-written.
#[derive(Clone, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    pub fn new() -> Self {
        CancelToken(Arc::new(AtomicBool::new(false)))
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }

    /// Returns `Err(AbortError)` if cancellation has been requested.
    pub fn check(&self) -> Result<(), crate::error::AbortError> {
        if self.is_cancelled() {
            Err(crate::error::AbortError)
        } else {
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn starts_uncancelled_and_latches_once_cancelled() {
        let token = CancelToken::new();
        assert!(token.check().is_ok());
        token.cancel();
        assert!(token.check().is_err());
        assert!(token.is_cancelled());
    }

    #[test]
    fn clones_share_the_same_signal() {
        let token = CancelToken::new();
        let clone = token.clone();
        clone.cancel();
        assert!(token.is_cancelled());
    }
}
