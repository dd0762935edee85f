//! Standardized error handling patterns for registry responses

use crate::error::PrunerError;

/// Standard error handler for HTTP responses
pub struct HttpErrorHandler;

impl HttpErrorHandler {
    /// Handle login-related HTTP errors
    pub fn handle_auth_error(status: u16, error_text: &str) -> PrunerError {
        let error_msg = match status {
            400 => "Invalid login request".to_string(),
            401 => "Invalid credentials provided".to_string(),
            403 => "Access denied - account locked or token lacks permissions".to_string(),
            404 => "Login endpoint not found - check the API URL".to_string(),
            429 => "Too many login attempts - rate limited".to_string(),
            500..=599 => format!("Registry unavailable during login (status {})", status),
            _ => format!("Login failed (status {}): {}", status, error_text),
        };

        PrunerError::Authentication(error_msg)
    }

    /// Handle registry-related HTTP errors
    pub fn handle_registry_error(status: u16, error_text: &str, operation: &str) -> PrunerError {
        let error_msg = match status {
            401 => format!(
                "Unauthorized to perform {} operation: {}",
                operation, error_text
            ),
            403 => format!(
                "Forbidden: insufficient permissions for {}: {}",
                operation, error_text
            ),
            404 => format!("Resource not found for {}: {}", operation, error_text),
            429 => format!("Rate limited during {}: {}", operation, error_text),
            500 => format!("Registry server error during {}: {}", operation, error_text),
            502 | 503 => format!("Registry unavailable for {}: {}", operation, error_text),
            _ => format!("{} failed (status {}): {}", operation, status, error_text),
        };

        PrunerError::Registry(error_msg)
    }
}

/// Network error categorization and handling
pub struct NetworkErrorHandler;

impl NetworkErrorHandler {
    /// Categorize and format network errors with helpful context
    pub fn handle_network_error(error: &reqwest::Error, context: &str) -> PrunerError {
        if error.is_timeout() {
            PrunerError::Network(format!("{} timeout: {}", context, error))
        } else if error.is_connect() {
            PrunerError::Network(format!("Connection error during {}: {}", context, error))
        } else if error.is_decode() {
            PrunerError::Parse(format!("Undecodable response during {}: {}", context, error))
        } else if error.to_string().contains("certificate") {
            PrunerError::Network(format!(
                "TLS certificate error during {}: {}",
                context, error
            ))
        } else {
            PrunerError::Network(format!("{} network error: {}", context, error))
        }
    }
}
