//! Types for SFSCON admin API requests and responses.

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Configuration for connecting to the admin API.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Base URL of the API host (e.g., "https://admin.sfscon.it")
    pub url: String,
    /// Overall request timeout
    pub timeout: Duration,
    /// TCP connect timeout
    pub connect_timeout: Duration,
}

impl ClientConfig {
    /// Create a config with default timeouts.
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            timeout: Duration::from_secs(30),
            connect_timeout: Duration::from_secs(10),
        }
    }

    /// Override the overall request timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Override the connect timeout.
    pub fn with_connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = timeout;
        self
    }
}

// =============================================================================
// Authentication Types
// =============================================================================

/// Request body for the login endpoint.
#[derive(Debug, Clone, Serialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

impl LoginRequest {
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
        }
    }
}

/// Response from a successful login.
#[derive(Debug, Clone, Deserialize)]
pub struct LoginResponse {
    pub token: String,
}

// =============================================================================
// Dashboard Types
// =============================================================================

/// Aggregate counters shown on the dashboard landing page.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct Summary {
    #[serde(default)]
    pub all_users: u64,
    #[serde(default)]
    pub total_sessions: u64,
    #[serde(default)]
    pub total_bookmarks: u64,
    #[serde(default)]
    pub total_rates: u64,
}

/// When the server last imported conference data.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct LastSyncTime {
    #[serde(default)]
    pub last_sync_time: Option<String>,
}

/// Result of triggering a server-side import.
///
/// `changes` is whatever the importer reports; its shape is not interpreted
/// beyond "empty or not". Importers report an object or an array.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct SyncResponse {
    #[serde(default)]
    pub changes: Option<serde_json::Value>,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

impl SyncResponse {
    /// True when the importer reported at least one change.
    pub fn has_changes(&self) -> bool {
        match &self.changes {
            Some(serde_json::Value::Object(map)) => !map.is_empty(),
            Some(serde_json::Value::Array(items)) => !items.is_empty(),
            Some(serde_json::Value::String(text)) => !text.is_empty(),
            Some(_) | None => false,
        }
    }
}

// =============================================================================
// Listing Types
// =============================================================================

/// Envelope around list endpoints.
#[derive(Debug, Clone, Deserialize)]
pub struct ListResponse<T> {
    #[serde(default = "Vec::new")]
    pub data: Vec<T>,
}

/// A registered attendee as returned by `/api/admin/users`.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct AttendeeRow {
    pub id: String,
    #[serde(default)]
    pub bookmarks: u64,
    #[serde(default)]
    pub nr_ratings: u64,
    #[serde(default)]
    pub register_at: String,
}

/// A talk as returned by `/api/admin/sessions`.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct TalkRow {
    pub title: String,
    /// Speaker names, already flattened by the server
    #[serde(default)]
    pub speakers: String,
    #[serde(default)]
    pub bookmarks: u64,
    #[serde(default)]
    pub rates: u64,
    /// Absent when nobody rated the talk yet
    #[serde(default)]
    pub avg_rate: Option<f64>,
}
