//! Authenticated session against the registry management API

use crate::error::handlers::HttpErrorHandler;
use crate::error::{PrunerError, Result};
use crate::logging::Logger;
use crate::registry::models::{LoginRequest, LoginResponse};
use crate::registry::transport::{ApiResponse, RegistryTransport};

/// Username plus password or personal access token
#[derive(Clone)]
pub struct Credentials {
    pub username: String,
    pub secret: String,
}

impl Credentials {
    pub fn new(username: impl Into<String>, secret: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            secret: secret.into(),
        }
    }
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("secret", &"<redacted>")
            .finish()
    }
}

/// Transport plus the single bearer token obtained at login.
///
/// A session only exists after a successful login, and its token is never
/// refreshed or rotated for the rest of the run.
pub struct RegistrySession<T> {
    transport: T,
    token: String,
}

impl<T: RegistryTransport> RegistrySession<T> {
    /// `POST users/login`; any non-success status is an authentication failure
    pub async fn login(transport: T, credentials: &Credentials, output: &Logger) -> Result<Self> {
        output.debug(&format!("Logging in as {}...", credentials.username));

        let request = LoginRequest {
            username: &credentials.username,
            password: &credentials.secret,
        };
        let response = transport
            .post_json("users/login", None, &serde_json::to_value(&request)?)
            .await
            .map_err(|e| PrunerError::Authentication(format!("Login request failed: {}", e)))?;

        if !response.is_success() {
            return Err(HttpErrorHandler::handle_auth_error(
                response.status,
                &response.body,
            ));
        }

        let token = response
            .json::<LoginResponse>()
            .ok()
            .and_then(|login| login.token)
            .filter(|token| !token.is_empty())
            .ok_or_else(|| {
                PrunerError::Authentication("Login response did not contain a token".to_string())
            })?;

        output.debug(&format!("Token obtained (length: {} chars)", token.len()));
        Ok(Self { transport, token })
    }

    /// Build a session around an already issued token
    pub fn with_token(transport: T, token: impl Into<String>) -> Self {
        Self {
            transport,
            token: token.into(),
        }
    }

    pub async fn get(&self, path: &str) -> Result<ApiResponse> {
        self.transport.get(path, Some(&self.token)).await
    }

    pub async fn post_json(&self, path: &str, body: &serde_json::Value) -> Result<ApiResponse> {
        self.transport.post_json(path, Some(&self.token), body).await
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }
}
