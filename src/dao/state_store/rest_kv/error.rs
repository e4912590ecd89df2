//! Error types shared by the REST key-value storage implementation.

use reqwest::StatusCode;
use thiserror::Error;

/// Convenient result alias returning [`KvDaoError`] failures.
pub type KvResult<T> = Result<T, KvDaoError>;

/// Failures that can occur while talking to the REST key-value service.
#[derive(Debug, Error)]
pub enum KvDaoError {
    /// Required environment variable is missing.
    #[error("missing key-value store environment variable `{var}`")]
    MissingEnvVar { var: &'static str },
    /// The configured endpoint cannot carry command path segments.
    #[error("invalid key-value endpoint `{url}`: {message}")]
    InvalidBaseUrl { url: String, message: String },
    /// Building the HTTP client failed (invalid TLS setup, etc).
    #[error("failed to build key-value store client")]
    ClientBuilder {
        #[source]
        source: reqwest::Error,
    },
    /// A command request could not be sent.
    #[error("failed to send key-value request to `{path}`")]
    RequestSend {
        path: String,
        #[source]
        source: reqwest::Error,
    },
    /// The service answered with an error envelope or an unexpected status.
    #[error("key-value service rejected `{path}` with status {status}: {message}")]
    Rejected {
        path: String,
        status: StatusCode,
        message: String,
    },
    /// Response payload could not be parsed into the result envelope.
    #[error("failed to decode key-value response for `{path}`")]
    DecodeResponse {
        path: String,
        #[source]
        source: reqwest::Error,
    },
    /// Serialising the value before upload failed.
    #[error("failed to serialize value for `{path}`")]
    SerializeValue {
        path: String,
        #[source]
        source: serde_json::Error,
    },
}
