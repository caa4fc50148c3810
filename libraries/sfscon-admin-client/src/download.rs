//! CSV exports rendered by the admin API.

use crate::error::{AdminClientError, Result};
use crate::listing::{ListQuery, ListResource, ListingClient};
use futures_util::StreamExt;
use reqwest::header::CONTENT_DISPOSITION;
use reqwest::Client;
use std::path::{Path, PathBuf};
use tokio::fs::File;
use tokio::io::AsyncWriteExt;
use tracing::{debug, info, warn};

/// Download client for server-rendered CSV files.
pub struct DownloadClient<'a> {
    http: &'a Client,
    base_url: &'a str,
    access_token: &'a str,
}

impl<'a> DownloadClient<'a> {
    pub(crate) fn new(http: &'a Client, base_url: &'a str, access_token: &'a str) -> Self {
        Self {
            http,
            base_url,
            access_token,
        }
    }

    /// Download a CSV export into `dest_dir`.
    ///
    /// The file name comes from the response's `Content-Disposition` header,
    /// falling back to the resource's default name. The body is written to a
    /// temporary `.part` file that is renamed once complete.
    ///
    /// # Returns
    /// The path of the saved file.
    pub async fn export_csv(
        &self,
        resource: ListResource,
        query: &ListQuery,
        dest_dir: &Path,
    ) -> Result<PathBuf> {
        let query = query.clone().csv();
        debug!(resource = ?resource, params = ?query.params(), dest = %dest_dir.display(), "Downloading CSV export");

        let response = ListingClient::new(self.http, self.base_url, self.access_token)
            .request(resource, &query)
            .send()
            .await
            .map_err(AdminClientError::from_send)?;

        let status = response.status();

        if !status.is_success() {
            if status.as_u16() == 401 {
                return Err(AdminClientError::AuthRequired);
            }
            let error_text = response.text().await.unwrap_or_default();
            return Err(AdminClientError::ServerError {
                status: status.as_u16(),
                message: error_text,
            });
        }

        let filename = response
            .headers()
            .get(CONTENT_DISPOSITION)
            .and_then(|value| value.to_str().ok())
            .and_then(filename_from_content_disposition)
            .unwrap_or_else(|| resource.default_export_filename().to_string());

        tokio::fs::create_dir_all(dest_dir).await?;
        let dest_path = dest_dir.join(&filename);
        let part_path = dest_dir.join(format!("{}.part", filename));

        let written = match write_body(response, &part_path).await {
            Ok(written) => written,
            Err(e) => {
                if let Err(cleanup) = tokio::fs::remove_file(&part_path).await {
                    warn!(path = %part_path.display(), error = %cleanup, "Failed to remove partial export");
                }
                return Err(e);
            }
        };

        tokio::fs::rename(&part_path, &dest_path).await?;

        info!(
            resource = ?resource,
            dest = %dest_path.display(),
            size = written,
            "CSV export saved"
        );

        Ok(dest_path)
    }
}

async fn write_body(response: reqwest::Response, path: &Path) -> Result<u64> {
    let mut file = File::create(path).await?;
    let mut written: u64 = 0;

    let mut stream = response.bytes_stream();
    while let Some(chunk_result) = stream.next().await {
        let chunk = chunk_result?;
        file.write_all(&chunk).await?;
        written += chunk.len() as u64;
    }

    file.flush().await?;
    Ok(written)
}

/// Extract the suggested file name from a `Content-Disposition` value.
///
/// Only the plain `filename=` parameter is honoured. Quotes are stripped and
/// any directory components are discarded, so the result is always a bare
/// file name.
pub fn filename_from_content_disposition(value: &str) -> Option<String> {
    let raw = value.split(';').find_map(|part| {
        let (key, val) = part.split_once('=')?;
        key.trim()
            .eq_ignore_ascii_case("filename")
            .then_some(val.trim())
    })?;

    let unquoted: String = raw.chars().filter(|c| *c != '"' && *c != '\'').collect();
    let name = unquoted
        .rsplit(['/', '\\'])
        .next()
        .unwrap_or_default()
        .trim();

    if name.is_empty() || name == "." || name == ".." {
        None
    } else {
        Some(name.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_quoted_filename() {
        assert_eq!(
            filename_from_content_disposition(r#"attachment; filename="users_2024.csv""#)
                .as_deref(),
            Some("users_2024.csv")
        );
    }

    #[test]
    fn test_bare_filename() {
        assert_eq!(
            filename_from_content_disposition("attachment; filename=sessions.csv").as_deref(),
            Some("sessions.csv")
        );
    }

    #[test]
    fn test_filename_star_is_ignored() {
        assert_eq!(
            filename_from_content_disposition("attachment; filename*=UTF-8''x.csv"),
            None
        );
    }

    #[test]
    fn test_missing_or_empty_filename() {
        assert_eq!(filename_from_content_disposition("attachment"), None);
        assert_eq!(filename_from_content_disposition(r#"attachment; filename="""#), None);
    }

    #[test]
    fn test_path_components_are_dropped() {
        assert_eq!(
            filename_from_content_disposition(r#"attachment; filename="../../etc/passwd""#)
                .as_deref(),
            Some("passwd")
        );
        assert_eq!(
            filename_from_content_disposition(r#"attachment; filename="..""#),
            None
        );
    }
}
