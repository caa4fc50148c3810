//! SFSCON Admin Client
//!
//! HTTP client library for the SFSCON conference admin API.
//!
//! # Features
//!
//! - **Session**: bearer token persisted across runs, observable login state
//! - **Dashboard**: summary counters, last sync time, data import trigger
//! - **Listings**: attendee and talk rows, sorted server-side
//! - **Export**: server-rendered CSV files saved to disk
//!
//! # Example
//!
//! ```ignore
//! use sfscon_admin_client::{AdminClient, ClientConfig, FileTokenStorage, Session, SortSpec};
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let session = Arc::new(Session::hydrate(Arc::new(FileTokenStorage::new(".sfscon-admin"))).await);
//!     let client = AdminClient::new(ClientConfig::new("https://admin.example.org"), session)?;
//!
//!     if !client.session().is_logged_in() {
//!         client.login("admin", "secret").await;
//!     }
//!
//!     let attendees = client.attendees(Some(&SortSpec::descend("bookmarks"))).await?;
//!     println!("Found {} attendees", attendees.len());
//!
//!     Ok(())
//! }
//! ```

mod auth;
mod client;
mod download;
mod error;
mod listing;
pub mod session;
pub mod sort;
mod types;

// Re-export main types
pub use client::AdminClient;
pub use download::filename_from_content_disposition;
pub use error::{AdminClientError, Result};
pub use listing::{ListQuery, ListResource, ListRow};
pub use session::{FileTokenStorage, MemoryTokenStorage, NoTokenStorage, Session, TokenStorage};
pub use sort::{SortOrder, SortSpec};
pub use types::{
    AttendeeRow, ClientConfig, LastSyncTime, LoginRequest, LoginResponse, Summary, SyncResponse,
    TalkRow,
};

// Re-export sub-clients for direct use if needed
pub use auth::AuthClient;
pub use download::DownloadClient;
pub use listing::ListingClient;
