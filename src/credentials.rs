//! Credential configuration for the federated sign-in handshake.

use secrecy::{ExposeSecret, SecretString};
use std::time::Duration;
use url::Url;

use crate::{FedSessionError, Result};

/// Default security token service endpoint (worldwide cloud).
pub const DEFAULT_STS_ENDPOINT: &str = "https://login.microsoftonline.com/extSTS.srf";

/// Fixed path suffix of the relying party's passive sign-in endpoint.
pub(crate) const SIGN_IN_SUFFIX: &str = "_forms/default.aspx?wa=wsignin1.0";

const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Immutable sign-in configuration for one target site.
///
/// Holds the principal name, its secret, and the site the session is for.
/// Created once and never mutated for the lifetime of the owning
/// [`SessionManager`](crate::SessionManager).
///
/// The secret is held in a [`SecretString`] so it is redacted from `Debug`
/// output and wiped from memory on drop.
///
/// # Example
///
/// ```
/// use fedsession::Credentials;
/// use std::time::Duration;
///
/// let credentials = Credentials::new(
///     "user@tenant.example",
///     "secret",
///     "https://tenant.example/sites/team/",
/// )
/// .unwrap()
/// .with_rtfa(false)
/// .with_timeout(Duration::from_secs(10));
///
/// assert_eq!(credentials.host(), "tenant.example");
/// ```
#[derive(Debug, Clone)]
pub struct Credentials {
    username: String,
    password: SecretString,
    site_url: Url,
    sign_in_url: Url,
    domain: String,
    use_rtfa: bool,
    timeout: Duration,
    sts_endpoint: Url,
}

/// Relying-party endpoints involved in one token exchange.
///
/// For the passive flow both fields carry the site's sign-in URL: it is the
/// audience the token is issued for and the place the token is posted back to.
#[derive(Debug, Clone)]
pub struct SignInTarget {
    /// Token audience, placed in the request's `AppliesTo` element.
    pub audience: Url,
    /// Where the issued token is posted to redeem the session cookies.
    pub callback_url: Url,
}

impl Credentials {
    /// Creates credentials for signing in to `site_url`.
    ///
    /// The site URL path is normalized to end with `/` so the sign-in
    /// endpoint resolves under the site, not its parent.
    ///
    /// # Errors
    ///
    /// Returns [`FedSessionError::InvalidSiteUrl`] if the URL cannot be
    /// parsed or has no host.
    pub fn new(
        username: impl Into<String>,
        password: impl Into<String>,
        site_url: impl AsRef<str>,
    ) -> Result<Self> {
        let mut site_url = Url::parse(site_url.as_ref())
            .map_err(|e| FedSessionError::InvalidSiteUrl(e.to_string()))?;

        let domain = site_url
            .host_str()
            .ok_or_else(|| FedSessionError::InvalidSiteUrl("URL has no host".to_string()))?
            .to_string();

        if !site_url.path().ends_with('/') {
            let path = format!("{}/", site_url.path());
            site_url.set_path(&path);
        }

        let sign_in_url = site_url
            .join(SIGN_IN_SUFFIX)
            .map_err(|e| FedSessionError::InvalidSiteUrl(e.to_string()))?;

        let sts_endpoint = Url::parse(DEFAULT_STS_ENDPOINT)
            .map_err(|e| FedSessionError::InvalidSiteUrl(e.to_string()))?;

        Ok(Self {
            username: username.into(),
            password: SecretString::new(password.into()),
            site_url,
            sign_in_url,
            domain,
            use_rtfa: true,
            timeout: DEFAULT_TIMEOUT,
            sts_endpoint,
        })
    }

    /// Sets whether the long-lived `rtFA` cookie is kept alongside `FedAuth`.
    ///
    /// Enabled by default. When enabled, a sign-in response without the
    /// cookie is an error; when disabled, the cookie is dropped even if the
    /// server sends it.
    pub fn with_rtfa(mut self, use_rtfa: bool) -> Self {
        self.use_rtfa = use_rtfa;
        self
    }

    /// Sets the connect and total-request timeout for both round trips.
    ///
    /// Defaults to 30 seconds.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Overrides the security token service endpoint.
    ///
    /// The default is [`DEFAULT_STS_ENDPOINT`]. Sovereign-cloud deployments
    /// use a different login host; tests point this at a mock server.
    pub fn with_sts_endpoint(mut self, endpoint: Url) -> Self {
        self.sts_endpoint = endpoint;
        self
    }

    /// Principal name presented to the STS.
    pub fn username(&self) -> &str {
        &self.username
    }

    /// Target site URL, slash-terminated.
    pub fn site_url(&self) -> &Url {
        &self.site_url
    }

    /// Host of the target site, used as the cookie domain.
    pub fn host(&self) -> &str {
        &self.domain
    }

    /// Whether the long-lived `rtFA` cookie is requested.
    pub fn use_rtfa(&self) -> bool {
        self.use_rtfa
    }

    /// Timeout applied to each network round trip.
    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// STS endpoint tokens are requested from.
    pub fn sts_endpoint(&self) -> &Url {
        &self.sts_endpoint
    }

    /// Relying-party endpoints for one token exchange.
    pub fn sign_in_target(&self) -> SignInTarget {
        SignInTarget {
            audience: self.sign_in_url.clone(),
            callback_url: self.sign_in_url.clone(),
        }
    }

    pub(crate) fn password(&self) -> &str {
        self.password.expose_secret()
    }
}
