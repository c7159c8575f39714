//! Exchange of the security token for the site's session cookies.

use reqwest::header::{CONTENT_TYPE, SET_COOKIE};
use tracing::debug;
use url::Url;

use crate::cookies::{CookieSet, SessionCookie, FEDAUTH_COOKIE, RTFA_COOKIE};
use crate::token::ExtractedToken;
use crate::{Credentials, FedSessionError, Result};

/// Content type the sign-in endpoint requires for the token POST. The token
/// is XML, but the endpoint only accepts it declared as form data.
const FORM_CONTENT_TYPE: &str = "application/x-www-form-urlencoded";

/// Posts the extracted token to the sign-in endpoint and reads the session
/// cookies off the response.
///
/// The client must have redirects disabled: the cookies ride on the redirect
/// response itself and following it would lose them to a request the jar was
/// never attached to. The client carries no cookie store, so no previously
/// cached cookies are sent.
///
/// # Errors
///
/// - [`FedSessionError::Network`]: the endpoint could not be reached
/// - [`FedSessionError::Auth`]: the endpoint rejected the token (4xx/5xx)
/// - [`FedSessionError::CookieMissing`]: `FedAuth` is absent, or `rtFA` is
///   absent while requested
pub async fn redeem_token(
    http: &reqwest::Client,
    credentials: &Credentials,
    callback_url: &Url,
    token: &ExtractedToken,
) -> Result<CookieSet> {
    debug!(url = %callback_url, "posting security token to sign-in endpoint");

    let response = http
        .post(callback_url.clone())
        .header(CONTENT_TYPE, FORM_CONTENT_TYPE)
        .body(token.token.clone())
        .send()
        .await
        .map_err(|e| FedSessionError::network(callback_url.as_str(), e))?;

    let status = response.status();
    if status.is_client_error() || status.is_server_error() {
        return Err(FedSessionError::auth(
            callback_url.as_str(),
            format!("sign-in returned {status}"),
        ));
    }

    let mut fed_auth: Option<String> = None;
    let mut rtfa: Option<String> = None;
    for header in response.headers().get_all(SET_COOKIE) {
        let Ok(raw) = header.to_str() else { continue };
        let Some((name, value)) = split_set_cookie(raw) else {
            continue;
        };
        // The live endpoint spells the secondary cookie "rtFa"; match names
        // case-insensitively and keep the first occurrence.
        if name.eq_ignore_ascii_case(FEDAUTH_COOKIE) {
            fed_auth.get_or_insert_with(|| value.to_string());
        } else if name.eq_ignore_ascii_case(RTFA_COOKIE) {
            rtfa.get_or_insert_with(|| value.to_string());
        }
    }

    let domain = credentials.host();
    let fed_auth = fed_auth.ok_or(FedSessionError::CookieMissing(FEDAUTH_COOKIE))?;
    let fed_auth = SessionCookie::session(FEDAUTH_COOKIE, fed_auth, domain, token.expires);

    let rtfa = if credentials.use_rtfa() {
        let value = rtfa.ok_or(FedSessionError::CookieMissing(RTFA_COOKIE))?;
        Some(SessionCookie::session(
            RTFA_COOKIE,
            value,
            domain,
            token.expires,
        ))
    } else {
        None
    };

    Ok(CookieSet::new(fed_auth, rtfa))
}

/// Splits the `name=value` pair off a `Set-Cookie` header, ignoring
/// attributes such as `Path` and `HttpOnly`.
fn split_set_cookie(raw: &str) -> Option<(&str, &str)> {
    let pair = raw.split(';').next()?;
    let (name, value) = pair.split_once('=')?;
    Some((name.trim(), value.trim()))
}
