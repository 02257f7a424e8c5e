/// One of the four operator-confirmation classes raised during resync
/// (spec.md §4.5): shrunk-as-missing, expand-exclude, expand-submit, and the
/// generic added/missing confirmations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PromptKind {
    TreatShrunkAsMissing,
    ExcludeExpandedFromProcessing,
    SubmitExpandedPartitions,
    SubmitAddedBlocks,
    SubmitMissingRetirement,
    NameCollisionContinue,
}

/// Capability for interactive confirmation, injected through config rather
/// than called directly (Design Note §9), so a non-interactive run can
/// supply a deterministic sink instead of blocking on a terminal.
pub trait PromptSink: Send + Sync {
    fn confirm(&self, kind: PromptKind, message: &str) -> bool;
}

/// Always answers `false` ("no-op"/conservative), per spec.md §4.5's
/// non-interactive default and §7's "never left half-decided" stance.
pub struct NonInteractiveSink;

impl PromptSink for NonInteractiveSink {
    fn confirm(&self, _kind: PromptKind, _message: &str) -> bool {
        false
    }
}
