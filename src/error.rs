//! Error types for the federated sign-in flow.

use thiserror::Error;

/// Result type alias using [`FedSessionError`].
pub type Result<T> = std::result::Result<T, FedSessionError>;

/// Errors that can occur while acquiring or refreshing a session.
///
/// All errors implement `std::error::Error` and can be chained with `source()`.
/// No component recovers from a failure locally; every error surfaces to the
/// caller of the session accessor, and a failed refresh leaves the cached
/// cookie set exactly as it was.
#[derive(Debug, Error)]
pub enum FedSessionError {
    /// Transport-level failure reaching the STS or the sign-in endpoint.
    #[error("network failure reaching {endpoint}: {source}")]
    Network {
        /// Endpoint that could not be reached
        endpoint: String,
        /// Underlying transport error
        #[source]
        source: reqwest::Error,
    },

    /// The identity provider or the sign-in endpoint rejected the request,
    /// typically because of bad credentials or a token the site does not trust.
    #[error("{endpoint} rejected the request: {reason}")]
    Auth {
        /// Endpoint that rejected the request
        endpoint: String,
        /// Rejection detail (SOAP fault reason or HTTP status)
        reason: String,
    },

    /// The token response is missing a required element or carries an
    /// expiry that cannot be parsed.
    #[error("malformed token response: {0}")]
    Protocol(String),

    /// The sign-in response did not set an expected session cookie.
    #[error("sign-in response did not set the {0} cookie")]
    CookieMissing(&'static str),

    /// The target site URL could not be parsed or lacks a host.
    #[error("invalid site URL: {0}")]
    InvalidSiteUrl(String),

    /// The underlying HTTP client could not be constructed.
    #[error("failed to build HTTP client: {0}")]
    Client(#[source] reqwest::Error),
}

impl FedSessionError {
    /// Creates a [`FedSessionError::Network`] for the given endpoint.
    pub(crate) fn network(endpoint: impl Into<String>, source: reqwest::Error) -> Self {
        Self::Network {
            endpoint: endpoint.into(),
            source,
        }
    }

    /// Creates a [`FedSessionError::Auth`] for the given endpoint.
    pub(crate) fn auth(endpoint: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Auth {
            endpoint: endpoint.into(),
            reason: reason.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error;

    #[test]
    fn test_error_display() {
        let err = FedSessionError::CookieMissing("FedAuth");
        assert_eq!(
            err.to_string(),
            "sign-in response did not set the FedAuth cookie"
        );

        let err = FedSessionError::Protocol("response contains no Expires element".to_string());
        assert_eq!(
            err.to_string(),
            "malformed token response: response contains no Expires element"
        );
    }

    #[test]
    fn test_auth_error_carries_endpoint_and_reason() {
        let err = FedSessionError::auth("security token service", "Authentication Failure");
        let rendered = err.to_string();

        assert!(rendered.contains("security token service"));
        assert!(rendered.contains("Authentication Failure"));
    }

    #[test]
    fn test_network_error_source_chain() {
        // A request built from a relative URL fails without touching the network.
        let source = reqwest::Client::new()
            .get("notaurl")
            .build()
            .expect_err("relative URL must not build");

        let err = FedSessionError::network("https://login.example/extSTS.srf", source);
        assert!(err.source().is_some());
    }
}
