//! Status enum for remote fetch state.

use serde::{Deserialize, Serialize};

/// Lifecycle of a remote fetch.
///
/// Transitions are `Idle → Loading → {Succeeded | Failed}`. A `Failed`
/// fetch stays failed until a new login event re-triggers it; there is no
/// automatic retry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum SyncStatus {
    #[default]
    Idle,
    Loading,
    Succeeded,
    Failed,
}

impl SyncStatus {
    /// Whether a fetch has completed successfully.
    #[must_use]
    pub const fn is_succeeded(&self) -> bool {
        matches!(self, Self::Succeeded)
    }

    /// Whether a fetch is currently in flight.
    #[must_use]
    pub const fn is_loading(&self) -> bool {
        matches!(self, Self::Loading)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_idle() {
        assert_eq!(SyncStatus::default(), SyncStatus::Idle);
        assert!(!SyncStatus::default().is_succeeded());
    }

    #[test]
    fn test_serde_lowercase() {
        let json = serde_json::to_string(&SyncStatus::Succeeded).expect("serialize");
        assert_eq!(json, "\"succeeded\"");
    }
}
