//! Fedsession - browser-less federated sign-in for SharePoint Online-style
//! sites.
//!
//! Fedsession performs the passive federation handshake a browser would do
//! interactively: it requests a SAML bearer token from a WS-Trust security
//! token service, exchanges the token at the target site's sign-in endpoint,
//! and caches the resulting `FedAuth`/`rtFA` session cookies for an HTTP
//! request pipeline. Headless tools get an authenticated session without a
//! sign-in page.
//!
//! # Features
//!
//! - **Cookie session caching**: the cookie set is served from memory until
//!   the STS-declared expiry, then refreshed on demand
//! - **Single-flight refresh**: concurrent callers share one in-flight
//!   handshake instead of issuing duplicate STS traffic
//! - **Request decoration**: attach the session to any outgoing
//!   `reqwest::Request` with one call
//! - **Secret hygiene**: passwords are redacted from `Debug` output and
//!   wiped from memory on drop
//!
//! # Quick Start
//!
//! ```no_run
//! use fedsession::{Credentials, SessionManager};
//!
//! #[tokio::main]
//! async fn main() -> fedsession::Result<()> {
//!     let credentials = Credentials::new(
//!         "user@tenant.example",
//!         "secret",
//!         "https://tenant.example/sites/team/",
//!     )?;
//!
//!     let manager = SessionManager::new(credentials)?;
//!     let cookies = manager.cookies().await?;
//!
//!     println!("signed in, session valid until {}", cookies.expires_at());
//!     Ok(())
//! }
//! ```
//!
//! # How the handshake works
//!
//! 1. A WS-Trust RST "Issue" request is posted to the STS with the
//!    username/password carried as a message-level `UsernameToken`. The
//!    requested token is a SAML bearer assertion whose audience is the
//!    site's sign-in URL.
//! 2. The response envelope is parsed for the opaque security token and the
//!    STS-declared expiry. Both are required.
//! 3. The raw token is posted to the site's sign-in endpoint with redirects
//!    disabled; the `Set-Cookie` headers on the redirect response carry the
//!    session cookies.
//!
//! Failures are never retried internally and never partially update the
//! cache; retry policy belongs to the caller.

pub mod cookies;
pub mod credentials;
pub mod error;
pub mod exchange;
pub mod session;
pub mod sts;
pub mod token;

pub use cookies::{CookieSet, SessionCookie, FEDAUTH_COOKIE, RTFA_COOKIE};
pub use credentials::{Credentials, SignInTarget, DEFAULT_STS_ENDPOINT};
pub use error::{FedSessionError, Result};
pub use session::{CookieSource, SessionManager};
pub use token::ExtractedToken;
