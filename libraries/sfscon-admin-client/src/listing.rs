//! Attendee and talk listings.

use crate::error::{AdminClientError, Result};
use crate::sort::SortSpec;
use crate::types::{AttendeeRow, ListResponse, TalkRow};
use reqwest::{Client, RequestBuilder};
use serde::de::DeserializeOwned;
use tracing::debug;

/// The two list endpoints of the admin API.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ListResource {
    /// `/api/admin/users`, attendee rows
    Users,
    /// `/api/admin/sessions`, talk rows
    Sessions,
}

impl ListResource {
    pub fn path(self) -> &'static str {
        match self {
            ListResource::Users => "/api/admin/users",
            ListResource::Sessions => "/api/admin/sessions",
        }
    }

    /// File name used when the server does not suggest one.
    pub fn default_export_filename(self) -> &'static str {
        match self {
            ListResource::Users => "attendees.csv",
            ListResource::Sessions => "sessions.csv",
        }
    }
}

/// A row type served by one of the list endpoints.
pub trait ListRow: DeserializeOwned + Send + 'static {
    const RESOURCE: ListResource;
}

impl ListRow for AttendeeRow {
    const RESOURCE: ListResource = ListResource::Users;
}

impl ListRow for TalkRow {
    const RESOURCE: ListResource = ListResource::Sessions;
}

/// Query parameters accepted by the list endpoints.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ListQuery {
    pub sort: Option<SortSpec>,
    /// Ask the server to render a CSV file instead of JSON
    pub csv: bool,
    /// Only ever sent when exports are configured to carry the search term
    pub search: Option<String>,
}

impl ListQuery {
    pub fn sorted(sort: Option<SortSpec>) -> Self {
        Self {
            sort,
            ..Self::default()
        }
    }

    pub fn csv(mut self) -> Self {
        self.csv = true;
        self
    }

    /// Attach a search term. Blank terms are dropped.
    pub fn with_search(mut self, term: impl Into<String>) -> Self {
        let term = term.into();
        self.search = (!term.is_empty()).then_some(term);
        self
    }

    /// Query pairs in the order the server documents them.
    pub fn params(&self) -> Vec<(&'static str, String)> {
        let mut params = Vec::new();
        if let Some(order) = crate::sort::encode_param(self.sort.as_ref()) {
            params.push(("order", order));
        }
        if self.csv {
            params.push(("csv", "true".to_string()));
        }
        if let Some(search) = &self.search {
            params.push(("search", search.clone()));
        }
        params
    }
}

/// Listing client for the admin API.
pub struct ListingClient<'a> {
    http: &'a Client,
    base_url: &'a str,
    access_token: &'a str,
}

impl<'a> ListingClient<'a> {
    pub(crate) fn new(http: &'a Client, base_url: &'a str, access_token: &'a str) -> Self {
        Self {
            http,
            base_url,
            access_token,
        }
    }

    pub(crate) fn request(&self, resource: ListResource, query: &ListQuery) -> RequestBuilder {
        let url = format!("{}{}", self.base_url, resource.path());
        self.http
            .get(url)
            .bearer_auth(self.access_token)
            .query(&query.params())
    }

    /// Fetch rows, sorted server-side.
    pub async fn fetch<T: ListRow>(&self, sort: Option<&SortSpec>) -> Result<Vec<T>> {
        let query = ListQuery::sorted(sort.cloned());
        debug!(
            resource = ?T::RESOURCE,
            order = ?crate::sort::encode_param(sort),
            "Fetching rows"
        );

        let response = self
            .request(T::RESOURCE, &query)
            .send()
            .await
            .map_err(AdminClientError::from_send)?;

        let status = response.status();

        if status.is_success() {
            let list: ListResponse<T> = response.json().await.map_err(|e| {
                AdminClientError::ParseError(format!("Failed to parse list response: {}", e))
            })?;

            debug!(resource = ?T::RESOURCE, rows = list.data.len(), "Fetched rows");
            Ok(list.data)
        } else if status.as_u16() == 401 {
            Err(AdminClientError::AuthRequired)
        } else {
            let error_text = response.text().await.unwrap_or_default();
            Err(AdminClientError::ServerError {
                status: status.as_u16(),
                message: error_text,
            })
        }
    }
}
