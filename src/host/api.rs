use async_trait::async_trait;

use crate::error::SpotiqError;

/// Calls back into the launcher host. The stdio bridge is the production
/// implementation; tests substitute recording or null handles.
#[async_trait]
pub trait HostHandle: Send + Sync {
    /// Replace the text in the launcher query box and re-run it.
    async fn change_query(&self, query: &str) -> Result<(), SpotiqError>;

    /// Bring the launcher window to the foreground.
    async fn show_app(&self) -> Result<(), SpotiqError>;

    /// Persist a value in the host's key-value settings store.
    async fn store_setting(&self, key: &str, value: &str) -> Result<(), SpotiqError>;
}

/// Host handle that drops every call. Used by tests and by CLI commands
/// that run without a host attached.
pub struct NullHost;

#[async_trait]
impl HostHandle for NullHost {
    async fn change_query(&self, _query: &str) -> Result<(), SpotiqError> {
        Ok(())
    }

    async fn show_app(&self) -> Result<(), SpotiqError> {
        Ok(())
    }

    async fn store_setting(&self, _key: &str, _value: &str) -> Result<(), SpotiqError> {
        Ok(())
    }
}
