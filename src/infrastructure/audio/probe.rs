//! Microphone availability probe using cpal

use async_trait::async_trait;
use cpal::traits::HostTrait;

use crate::application::ports::{PermissionProbe, PermissionStatus};

/// Startup microphone check: access is considered granted when the host
/// exposes a default input device.
pub struct CpalPermissionProbe;

impl CpalPermissionProbe {
    pub fn new() -> Self {
        Self
    }
}

impl Default for CpalPermissionProbe {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl PermissionProbe for CpalPermissionProbe {
    async fn microphone(&self) -> PermissionStatus {
        let available =
            tokio::task::spawn_blocking(|| cpal::default_host().default_input_device().is_some())
                .await
                .unwrap_or(false);

        if available {
            PermissionStatus::Granted
        } else {
            PermissionStatus::Denied
        }
    }
}
