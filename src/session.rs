//! Expiry-aware caching of federated session cookies.
//!
//! [`SessionManager`] owns the credentials, the shared HTTP client, and the
//! cached cookie set. A cache miss or an expired set drives the full
//! three-step refresh (token request, token parse, cookie exchange) in
//! strict sequence.

use async_trait::async_trait;
use chrono::Utc;
use reqwest::header::{HeaderValue, COOKIE};
use tokio::sync::Mutex;
use tracing::debug;

use crate::{exchange, sts, token};
use crate::{CookieSet, Credentials, FedSessionError, Result};

/// Source of session cookies for an HTTP request pipeline.
///
/// [`SessionManager`] is the production implementation; consumers written
/// against this seam can substitute a canned one in tests.
#[async_trait]
pub trait CookieSource: Send + Sync {
    /// Returns the currently valid cookie set, refreshing it if needed.
    async fn cookies(&self) -> Result<CookieSet>;
}

/// Manages one authenticated session against one target site.
///
/// The cached cookie set is process-local and lives for the lifetime of the
/// manager. It starts absent, is populated by the first successful refresh,
/// and is treated as stale once wall-clock time reaches its expiry. A failed
/// refresh propagates the error and leaves the cache untouched, so the next
/// access retries.
///
/// Refreshes are serialized per manager: callers that race on an expired
/// cache queue on an internal lock and receive the one in-flight refresh's
/// result instead of issuing duplicate STS traffic.
///
/// # Example
///
/// ```no_run
/// use fedsession::{Credentials, SessionManager};
///
/// #[tokio::main]
/// async fn main() -> fedsession::Result<()> {
///     let credentials = Credentials::new(
///         "user@tenant.example",
///         "secret",
///         "https://tenant.example/sites/team/",
///     )?;
///     let manager = SessionManager::new(credentials)?;
///
///     let cookies = manager.cookies().await?;
///     println!("session valid until {}", cookies.expires_at());
///
///     // Or decorate an outgoing request directly:
///     let client = reqwest::Client::new();
///     let mut request = client
///         .get("https://tenant.example/sites/team/_api/web")
///         .build()
///         .expect("valid request");
///     manager.authorize(&mut request).await?;
///
///     Ok(())
/// }
/// ```
pub struct SessionManager {
    credentials: Credentials,
    http: reqwest::Client,
    cache: Mutex<Option<CookieSet>>,
}

impl SessionManager {
    /// Creates a manager for the given credentials.
    ///
    /// Builds the shared HTTP client with redirects disabled (the sign-in
    /// exchange reads cookies off the redirect response), no cookie store,
    /// and the credentials' timeouts applied to both round trips.
    ///
    /// # Errors
    ///
    /// Returns [`FedSessionError::Client`] if the HTTP client cannot be
    /// constructed.
    pub fn new(credentials: Credentials) -> Result<Self> {
        let http = reqwest::Client::builder()
            .redirect(reqwest::redirect::Policy::none())
            .connect_timeout(credentials.timeout())
            .timeout(credentials.timeout())
            .build()
            .map_err(FedSessionError::Client)?;

        Ok(Self {
            credentials,
            http,
            cache: Mutex::new(None),
        })
    }

    /// Returns the currently valid cookie set.
    ///
    /// Serves the cached set with no network activity while it is valid.
    /// On a miss or at/after expiry, performs the full refresh and stores
    /// the result before returning it.
    ///
    /// # Errors
    ///
    /// Propagates whatever the failing refresh step produced; see
    /// [`FedSessionError`]. The cache keeps its prior state on failure.
    pub async fn cookies(&self) -> Result<CookieSet> {
        let mut cache = self.cache.lock().await;

        if let Some(set) = cache.as_ref() {
            if set.is_valid_at(Utc::now()) {
                debug!(site = %self.credentials.site_url(), "serving cached session cookies");
                return Ok(set.clone());
            }
        }

        // Refresh under the lock. Callers that raced on the stale set queue
        // here and find the fresh cookies once they acquire it, instead of
        // each running their own handshake.
        debug!(site = %self.credentials.site_url(), "refreshing session cookies");
        let fresh = self.refresh().await?;
        *cache = Some(fresh.clone());

        Ok(fresh)
    }

    /// Attaches the current cookie set to an outgoing request.
    ///
    /// Calls [`cookies`](Self::cookies) internally, so an expired session is
    /// refreshed transparently before the request is decorated.
    pub async fn authorize(&self, request: &mut reqwest::Request) -> Result<()> {
        let set = self.cookies().await?;
        let value = HeaderValue::from_str(&set.header_value()).map_err(|_| {
            FedSessionError::Protocol(
                "session cookies are not representable as a Cookie header".to_string(),
            )
        })?;
        request.headers_mut().insert(COOKIE, value);
        Ok(())
    }

    /// Drops the cached cookie set, forcing the next access to refresh.
    pub async fn invalidate(&self) {
        *self.cache.lock().await = None;
    }

    /// Credentials this manager signs in with.
    pub fn credentials(&self) -> &Credentials {
        &self.credentials
    }

    /// One full refresh: STS round trip, then parse, then cookie exchange.
    /// The second round trip never starts before the first completes and
    /// its response parses cleanly.
    async fn refresh(&self) -> Result<CookieSet> {
        let target = self.credentials.sign_in_target();
        let envelope = sts::request_token(&self.http, &self.credentials, &target.audience).await?;
        let extracted = token::parse_token_response(&envelope)?;
        exchange::redeem_token(&self.http, &self.credentials, &target.callback_url, &extracted)
            .await
    }
}

#[async_trait]
impl CookieSource for SessionManager {
    async fn cookies(&self) -> Result<CookieSet> {
        SessionManager::cookies(self).await
    }
}
