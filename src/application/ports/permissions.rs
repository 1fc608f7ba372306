//! Permission probe port interface

use async_trait::async_trait;

/// Outcome of a permission check
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PermissionStatus {
    Granted,
    Denied,
}

impl PermissionStatus {
    pub fn is_granted(&self) -> bool {
        matches!(self, Self::Granted)
    }
}

/// Port for the one-shot startup permission check.
///
/// Denial is surfaced as a warning only; recording proceeds and fails at
/// the transport layer.
#[async_trait]
pub trait PermissionProbe: Send + Sync {
    /// Check microphone access.
    async fn microphone(&self) -> PermissionStatus;
}
