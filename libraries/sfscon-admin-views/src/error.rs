//! Error types for the dashboard views.

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ViewError {
    #[error("Unknown route: {0}")]
    UnknownRoute(String),

    #[error("Invalid link: {0}")]
    InvalidLink(String),

    #[error("Column {index} does not exist (view has {count} columns)")]
    NoSuchColumn { index: usize, count: usize },

    #[error("No column sorts by {0:?}")]
    UnknownSortField(String),
}

pub type Result<T> = std::result::Result<T, ViewError>;
