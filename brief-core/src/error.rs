use std::path::PathBuf;

use thiserror::Error;

/// Outcome of a failed dashboard fetch.
///
/// Every client converts transport and parse failures into one of these at
/// its boundary, so callers only ever match on a closed set of cases.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FetchError {
    /// Transient upstream failure: network, timeout, bad status, bad payload.
    #[error("service unavailable: {reason}")]
    Unavailable { reason: String },

    /// The source needs a credential that is not configured.
    #[error("missing credential: {hint}")]
    MissingCredential { hint: String },

    /// The source answered successfully but had nothing to show.
    #[error("no data: {0}")]
    NoData(String),
}

impl FetchError {
    pub fn unavailable(reason: impl Into<String>) -> Self {
        Self::Unavailable { reason: reason.into() }
    }

    /// Message suitable for rendering in place of a failed section.
    pub fn user_message(&self) -> String {
        match self {
            Self::Unavailable { reason } => {
                format!("Currently unavailable ({reason}). Please try again shortly.")
            }
            Self::MissingCredential { hint } => format!("Not configured. {hint}"),
            Self::NoData(what) => format!("Nothing to show: {what}."),
        }
    }
}

impl From<reqwest::Error> for FetchError {
    fn from(err: reqwest::Error) -> Self {
        let reason = if err.is_timeout() {
            "request timed out".to_string()
        } else if err.is_connect() {
            "could not connect".to_string()
        } else if err.is_decode() {
            format!("malformed response: {err}")
        } else {
            err.to_string()
        };
        Self::Unavailable { reason }
    }
}

/// Failure reading or writing a persisted list.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The file exists but does not hold a valid collection.
    #[error("list file {} is corrupt: {source}", path.display())]
    Corrupt {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("I/O error on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl StoreError {
    pub fn user_message(&self) -> String {
        match self {
            Self::Corrupt { path, .. } => format!(
                "The list file {} could not be read. Fix or remove it; it was left untouched.",
                path.display()
            ),
            Self::Io { path, source } => {
                format!("Could not access {}: {source}", path.display())
            }
        }
    }
}
