//! Authentication against the admin API.

use crate::error::{AdminClientError, Result};
use crate::types::{LoginRequest, LoginResponse};
use reqwest::Client;
use tracing::{debug, info, warn};

/// Authentication client for the admin API.
pub struct AuthClient<'a> {
    http: &'a Client,
    base_url: &'a str,
}

impl<'a> AuthClient<'a> {
    pub(crate) fn new(http: &'a Client, base_url: &'a str) -> Self {
        Self { http, base_url }
    }

    /// Exchange username and password for a bearer token.
    pub async fn login(&self, request: &LoginRequest) -> Result<LoginResponse> {
        let url = format!("{}/api/admin/login", self.base_url);
        debug!(url = %url, username = %request.username, "Attempting login");

        let response = self
            .http
            .post(&url)
            .json(request)
            .send()
            .await
            .map_err(AdminClientError::from_send)?;

        let status = response.status();

        if status.is_success() {
            let login_response: LoginResponse = response.json().await.map_err(|e| {
                AdminClientError::ParseError(format!("Failed to parse login response: {}", e))
            })?;

            if login_response.token.is_empty() {
                return Err(AdminClientError::AuthFailed(
                    "Server issued an empty token".to_string(),
                ));
            }

            info!(username = %request.username, "Login successful");
            Ok(login_response)
        } else if status.as_u16() == 401 || status.as_u16() == 403 {
            let error_text = response.text().await.unwrap_or_default();
            warn!(status = %status, error = %error_text, "Login failed: invalid credentials");
            Err(AdminClientError::AuthFailed(
                "Invalid username or password".to_string(),
            ))
        } else {
            let error_text = response.text().await.unwrap_or_default();
            Err(AdminClientError::ServerError {
                status: status.as_u16(),
                message: error_text,
            })
        }
    }
}
