//! Centralized error types for Pendelwetter.
//!
//! Errors that reach the presentation layer are data, not exceptions: each
//! variant carries a `user_message()` suitable for direct display.

use thiserror::Error;

/// Top-level application error type.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Network error: {0}")]
    Network(#[from] NetworkError),

    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("{0}")]
    Other(#[from] anyhow::Error),
}

impl AppError {
    /// Returns a user-friendly message suitable for display in the UI.
    pub fn user_message(&self) -> &'static str {
        match self {
            AppError::Network(e) => e.user_message(),
            AppError::Storage(e) => e.user_message(),
            AppError::Config(e) => e.user_message(),
            AppError::Io(_) => "Ein Dateizugriff ist fehlgeschlagen.",
            AppError::Other(_) => "Ein unerwarteter Fehler ist aufgetreten.",
        }
    }
}

/// Network-related errors (HTTP, connectivity).
#[derive(Debug, Error)]
pub enum NetworkError {
    #[error("Connection failed: {0}")]
    ConnectionFailed(String),

    #[error("Request timed out")]
    Timeout,

    #[error("Server error: {status} - {message}")]
    ServerError { status: u16, message: String },

    #[error("Invalid response: {0}")]
    InvalidResponse(String),
}

impl NetworkError {
    pub fn user_message(&self) -> &'static str {
        match self {
            NetworkError::ConnectionFailed(_) => {
                "Keine Verbindung. Bitte Internetverbindung prüfen."
            }
            NetworkError::Timeout => "Die Anfrage hat zu lange gedauert.",
            NetworkError::ServerError { status, .. } if *status >= 500 => {
                "Der Dienst ist momentan gestört. Bitte später erneut versuchen."
            }
            NetworkError::ServerError { .. } => "Die Anfrage ist fehlgeschlagen.",
            NetworkError::InvalidResponse(_) => "Unerwartete Antwort vom Dienst.",
        }
    }
}

/// Durable-storage errors. These are always logged and swallowed at the call
/// site; state falls back to in-memory defaults.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Storage open failed: {0}")]
    OpenFailed(String),

    #[error("Read failed: {0}")]
    ReadFailed(String),

    #[error("Write failed: {0}")]
    WriteFailed(String),

    #[error("Stored record is malformed: {0}")]
    Malformed(String),
}

impl StorageError {
    pub fn user_message(&self) -> &'static str {
        "Lokale Daten konnten nicht gespeichert werden."
    }
}

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Configuration file not found: {0}")]
    NotFound(String),

    #[error("Invalid configuration: {0}")]
    Invalid(String),

    #[error("Configuration parse error: {0}")]
    ParseError(String),
}

impl ConfigError {
    pub fn user_message(&self) -> &'static str {
        match self {
            ConfigError::NotFound(_) => "Konfiguration nicht gefunden, Standardwerte aktiv.",
            ConfigError::Invalid(_) => "Ungültige Konfiguration, bitte Einstellungen prüfen.",
            ConfigError::ParseError(_) => "Konfigurationsdatei ist fehlerhaft.",
        }
    }
}

/// Extension trait for converting reqwest errors to our error types.
pub trait ReqwestErrorExt {
    fn into_network_error(self) -> NetworkError;
}

impl ReqwestErrorExt for reqwest::Error {
    fn into_network_error(self) -> NetworkError {
        if self.is_timeout() {
            NetworkError::Timeout
        } else if self.is_connect() {
            NetworkError::ConnectionFailed(self.to_string())
        } else if let Some(status) = self.status() {
            NetworkError::ServerError {
                status: status.as_u16(),
                message: self.to_string(),
            }
        } else {
            NetworkError::ConnectionFailed(self.to_string())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_app_error_conversion() {
        let net = NetworkError::Timeout;
        let app: AppError = net.into();
        assert!(matches!(app, AppError::Network(NetworkError::Timeout)));
    }

    #[test]
    fn test_user_message_propagation() {
        let app = AppError::Network(NetworkError::Timeout);
        assert_eq!(app.user_message(), "Die Anfrage hat zu lange gedauert.");
    }

    #[test]
    fn test_server_error_message_distinguishes_5xx() {
        let err = NetworkError::ServerError {
            status: 503,
            message: "unavailable".into(),
        };
        assert!(err.user_message().contains("gestört"));
    }
}
