//! Timed notification banner for sync results.

use sfscon_admin_client::{AdminClientError, SyncResponse};
use std::time::{Duration, Instant};

/// How long a banner stays up.
pub const BANNER_TTL: Duration = Duration::from_secs(5);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BannerKind {
    Success,
    Info,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Banner {
    pub kind: BannerKind,
    pub message: &'static str,
    pub description: &'static str,
    shown_at: Instant,
}

impl Banner {
    pub fn new(kind: BannerKind, message: &'static str, description: &'static str) -> Self {
        Self {
            kind,
            message,
            description,
            shown_at: Instant::now(),
        }
    }

    /// Banner describing the outcome of a sync request.
    pub fn for_sync(outcome: &Result<Option<SyncResponse>, AdminClientError>) -> Self {
        match outcome {
            Ok(Some(response)) if response.has_changes() => Self::new(
                BannerKind::Success,
                "Data synced successfully!",
                "Your data has been updated.",
            ),
            Ok(Some(_)) => Self::new(
                BannerKind::Info,
                "No changes detected during sync.",
                "The data was already up-to-date.",
            ),
            Ok(None) => Self::new(
                BannerKind::Info,
                "Sync operation completed.",
                "No data returned from sync.",
            ),
            Err(_) => Self::new(
                BannerKind::Error,
                "Error syncing data",
                "An error occurred while syncing your data.",
            ),
        }
    }

    pub fn expires_at(&self) -> Instant {
        self.shown_at + BANNER_TTL
    }

    pub fn is_visible_at(&self, now: Instant) -> bool {
        now < self.expires_at()
    }
}
