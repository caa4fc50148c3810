//! Main SFSCON admin API client.

use crate::auth::AuthClient;
use crate::download::DownloadClient;
use crate::error::{AdminClientError, Result};
use crate::listing::{ListQuery, ListResource, ListRow, ListingClient};
use crate::session::Session;
use crate::sort::SortSpec;
use crate::types::{
    AttendeeRow, ClientConfig, LastSyncTime, LoginRequest, Summary, SyncResponse, TalkRow,
};
use reqwest::{Client, Response};
use serde::de::DeserializeOwned;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, error, info, warn};

/// Main client for the SFSCON admin API.
///
/// Every authenticated call reads the bearer token from the injected
/// [`Session`] when the call is made.
///
/// # Example
///
/// ```ignore
/// use sfscon_admin_client::{AdminClient, ClientConfig, Session};
/// use std::sync::Arc;
///
/// let session = Arc::new(Session::in_memory());
/// let client = AdminClient::new(ClientConfig::new("https://admin.example.org"), session)?;
///
/// if client.login("admin", "secret").await.is_some() {
///     let summary = client.summary().await?;
///     println!("{} attendees", summary.all_users);
/// }
/// ```
#[derive(Debug, Clone)]
pub struct AdminClient {
    http: Client,
    base_url: String,
    session: Arc<Session>,
}

impl AdminClient {
    /// Create a new client with the given configuration.
    pub fn new(config: ClientConfig, session: Arc<Session>) -> Result<Self> {
        if config.url.is_empty() {
            return Err(AdminClientError::InvalidUrl("URL cannot be empty".into()));
        }

        let base_url = config.url.trim_end_matches('/').to_string();
        if !base_url.starts_with("http://") && !base_url.starts_with("https://") {
            return Err(AdminClientError::InvalidUrl(
                "URL must start with http:// or https://".into(),
            ));
        }

        let http = Client::builder()
            .timeout(config.timeout)
            .connect_timeout(config.connect_timeout)
            .user_agent(format!("sfscon-admin/{}", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(AdminClientError::Request)?;

        Ok(Self {
            http,
            base_url,
            session,
        })
    }

    /// The normalized base URL.
    pub fn url(&self) -> &str {
        &self.base_url
    }

    pub fn session(&self) -> &Arc<Session> {
        &self.session
    }

    fn access_token(&self) -> Result<String> {
        self.session.token().ok_or(AdminClientError::AuthRequired)
    }

    // -------------------------------------------------------------------------
    // Authentication
    // -------------------------------------------------------------------------

    /// Login and store the issued token in the session.
    pub async fn try_login(&self, username: &str, password: &str) -> Result<String> {
        let request = LoginRequest::new(username, password);
        let response = AuthClient::new(&self.http, &self.base_url)
            .login(&request)
            .await?;

        if let Err(e) = self.session.store_token(response.token.clone()).await {
            warn!(error = %e, "Token could not be persisted, it is kept for this process only");
        }

        Ok(response.token)
    }

    /// Login, treating every failure as "no token issued".
    ///
    /// The cause is only logged; callers handle `None` like wrong credentials.
    pub async fn login(&self, username: &str, password: &str) -> Option<String> {
        match self.try_login(username, password).await {
            Ok(token) => Some(token),
            Err(e) => {
                error!(error = %e, "Login failed");
                None
            }
        }
    }

    /// Clear the stored token.
    pub async fn logout(&self) {
        if let Err(e) = self.session.clear().await {
            warn!(error = %e, "Failed to remove stored token");
        }
    }

    // -------------------------------------------------------------------------
    // Dashboard
    // -------------------------------------------------------------------------

    /// Aggregate counters for the landing page.
    pub async fn summary(&self) -> Result<Summary> {
        self.get_json("/api/admin/summary").await
    }

    /// When conference data was last imported.
    pub async fn last_sync_time(&self) -> Result<LastSyncTime> {
        self.get_json("/api/admin/last-sync-time").await
    }

    /// Trigger a server-side re-import.
    ///
    /// Returns `None` when the server answers with an empty body.
    pub async fn sync(&self) -> Result<Option<SyncResponse>> {
        let token = self.access_token()?;
        let url = format!("{}/api/admin/import-xml", self.base_url);
        debug!(url = %url, "Triggering data import");

        let response = self
            .http
            .post(&url)
            .bearer_auth(token)
            .json(&serde_json::json!({}))
            .send()
            .await
            .map_err(AdminClientError::from_send)?;

        let response = check_status(response).await?;
        let body = response.text().await?;
        let body = body.trim();

        if body.is_empty() || body == "null" {
            info!("Import finished without a response body");
            return Ok(None);
        }

        let sync: SyncResponse = serde_json::from_str(body).map_err(|e| {
            AdminClientError::ParseError(format!("Failed to parse sync response: {}", e))
        })?;

        info!(changed = sync.has_changes(), "Import finished");
        Ok(Some(sync))
    }

    // -------------------------------------------------------------------------
    // Listings
    // -------------------------------------------------------------------------

    /// Fetch rows of any list endpoint, sorted server-side.
    pub async fn list<T: ListRow>(&self, sort: Option<&SortSpec>) -> Result<Vec<T>> {
        let token = self.access_token()?;
        ListingClient::new(&self.http, &self.base_url, &token)
            .fetch(sort)
            .await
    }

    pub async fn attendees(&self, sort: Option<&SortSpec>) -> Result<Vec<AttendeeRow>> {
        self.list(sort).await
    }

    pub async fn talks(&self, sort: Option<&SortSpec>) -> Result<Vec<TalkRow>> {
        self.list(sort).await
    }

    /// Download a server-rendered CSV into `dest_dir` and return its path.
    pub async fn export_csv(
        &self,
        resource: ListResource,
        query: &ListQuery,
        dest_dir: &Path,
    ) -> Result<PathBuf> {
        let token = self.access_token()?;
        DownloadClient::new(&self.http, &self.base_url, &token)
            .export_csv(resource, query, dest_dir)
            .await
    }

    // -------------------------------------------------------------------------
    // Lenient variants: failures become absent data plus a log line
    // -------------------------------------------------------------------------

    pub async fn list_or_empty<T: ListRow>(&self, sort: Option<&SortSpec>) -> Vec<T> {
        self.list(sort).await.unwrap_or_else(|e| {
            error!(resource = ?T::RESOURCE, error = %e, "Error fetching rows");
            Vec::new()
        })
    }

    pub async fn summary_or_none(&self) -> Option<Summary> {
        self.summary()
            .await
            .map_err(|e| error!(error = %e, "Error fetching summary"))
            .ok()
    }

    pub async fn last_sync_time_or_none(&self) -> Option<LastSyncTime> {
        self.last_sync_time()
            .await
            .map_err(|e| error!(error = %e, "Error fetching last sync time"))
            .ok()
    }

    async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        let token = self.access_token()?;
        let url = format!("{}{}", self.base_url, path);
        debug!(url = %url, "GET");

        let response = self
            .http
            .get(&url)
            .bearer_auth(token)
            .send()
            .await
            .map_err(AdminClientError::from_send)?;

        check_status(response)
            .await?
            .json()
            .await
            .map_err(|e| AdminClientError::ParseError(format!("{}: {}", path, e)))
    }
}

async fn check_status(response: Response) -> Result<Response> {
    let status = response.status();

    if status.is_success() {
        Ok(response)
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

#[cfg(test)]
mod tests {
    use super::*;

    fn session() -> Arc<Session> {
        Arc::new(Session::in_memory())
    }

    #[test]
    fn test_url_validation() {
        assert!(AdminClient::new(ClientConfig::new("https://example.com"), session()).is_ok());
        assert!(AdminClient::new(ClientConfig::new("http://localhost:8000"), session()).is_ok());

        assert!(AdminClient::new(ClientConfig::new(""), session()).is_err());
        assert!(AdminClient::new(ClientConfig::new("not-a-url"), session()).is_err());
        assert!(AdminClient::new(ClientConfig::new("ftp://example.com"), session()).is_err());
    }

    #[test]
    fn test_url_normalization() {
        let client = AdminClient::new(ClientConfig::new("https://example.com//"), session())
            .expect("valid url");
        assert_eq!(client.url(), "https://example.com");
    }

    #[tokio::test]
    async fn test_requests_without_token_fail_fast() {
        let client =
            AdminClient::new(ClientConfig::new("http://127.0.0.1:9"), session()).unwrap();

        assert!(matches!(
            client.summary().await,
            Err(AdminClientError::AuthRequired)
        ));
        assert!(matches!(
            client.attendees(None).await,
            Err(AdminClientError::AuthRequired)
        ));
        assert!(client.list_or_empty::<TalkRow>(None).await.is_empty());
    }
}
