//! Error types for vercomp-jira.

use thiserror::Error;

/// Failures talking to the Jira server.
#[derive(Debug, Error)]
pub enum JiraError {
    /// The server answered with a non-success status.
    #[error("{method} {url} returned HTTP {status}: {body}")]
    Status {
        method: &'static str,
        url: String,
        status: u16,
        body: String,
    },

    /// No usable response (connection refused, timeout, TLS, ...).
    #[error("{method} {url} failed: {message}")]
    Transport {
        method: &'static str,
        url: String,
        message: String,
    },

    /// The response body was not the JSON we expected.
    #[error("could not decode response of {method} {url}: {source}")]
    Decode {
        method: &'static str,
        url: String,
        #[source]
        source: std::io::Error,
    },
}

impl JiraError {
    pub(crate) fn from_ureq(method: &'static str, url: &str, err: ureq::Error) -> Self {
        match err {
            ureq::Error::Status(status, response) => JiraError::Status {
                method,
                url: url.to_string(),
                status,
                body: response.into_string().unwrap_or_default(),
            },
            ureq::Error::Transport(transport) => JiraError::Transport {
                method,
                url: url.to_string(),
                message: transport.to_string(),
            },
        }
    }
}
