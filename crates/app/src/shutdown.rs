//! Process-wide cancellation signal.
//!
//! A single token is created at startup and handed to every background loop
//! and to the message bus. All loops observe it cooperatively between units
//! of work; nothing is killed mid-write.

use tokio_util::sync::CancellationToken;

/// Clonable handle to the process-wide shutdown signal.
#[derive(Debug, Clone, Default)]
pub struct SystemCancellationToken {
    token: CancellationToken,
}

impl SystemCancellationToken {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Signal shutdown. Idempotent.
    pub fn cancel(&self) {
        self.token.cancel();
    }

    /// Whether shutdown has been signalled.
    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.token.is_cancelled()
    }

    /// Resolves once shutdown is signalled.
    pub async fn cancelled(&self) {
        self.token.cancelled().await;
    }
}
