//! SFSCON Admin Views
//!
//! View state for the SFSCON admin dashboard, independent of how it is drawn.
//!
//! - [`ListViewController`]: sort, search and rows of the attendee and talk lists
//! - [`ViewQuery`] / [`Link`]: view state as a shareable link
//! - [`AuthGuard`]: keeps logged-out users on `/login`
//! - [`Banner`]: timed sync notifications
//! - [`Dashboard`]: the shell tying these together

pub mod banner;
pub mod columns;
pub mod controller;
pub mod dashboard;
pub mod datefmt;
pub mod entity;
mod error;
pub mod guard;
pub mod query;
pub mod route;

pub use banner::{Banner, BannerKind, BANNER_TTL};
pub use columns::{ColumnDescriptor, ATTENDEE_COLUMNS, TALK_COLUMNS};
pub use controller::{ExportPolicy, FetchRequest, ListViewController, LoadFailure, SortState};
pub use dashboard::Dashboard;
pub use entity::{filter_rows, EntityKind, ListEntity};
pub use error::{Result, ViewError};
pub use guard::{AuthGuard, Navigation};
pub use query::ViewQuery;
pub use route::{Link, Route};
