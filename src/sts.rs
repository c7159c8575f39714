//! WS-Trust token acquisition from the security token service.
//!
//! Sends a WS-Trust Feb-2005 RST "Issue" request to the STS. The
//! username/password credential travels as a `UsernameToken` inside the
//! message's WS-Security header, not as transport authentication; the
//! channel itself is protected by TLS.

use quick_xml::escape::escape;
use reqwest::header::CONTENT_TYPE;
use tracing::debug;
use url::Url;

use crate::{Credentials, FedSessionError, Result};

/// SOAP action of the WS-Trust RST "Issue" request.
pub const ISSUE_ACTION: &str = "http://schemas.xmlsoap.org/ws/2005/02/trust/RST/Issue";

/// WS-Security extension namespace (`UsernameToken`, `BinarySecurityToken`).
pub(crate) const WSSE_NS: &str =
    "http://docs.oasis-open.org/wss/2004/01/oasis-200401-wss-wssecurity-secext-1.0.xsd";

/// WS-Security utility namespace (timestamps).
pub(crate) const WSU_NS: &str =
    "http://docs.oasis-open.org/wss/2004/01/oasis-200401-wss-wssecurity-utility-1.0.xsd";

const SOAP_CONTENT_TYPE: &str = "application/soap+xml; charset=utf-8";

/// WS-Trust Feb-2005 key type selecting a bearer token.
const BEARER_KEY_TYPE: &str = "http://schemas.xmlsoap.org/ws/2005/05/identity/NoProofKey";
const ISSUE_REQUEST_TYPE: &str = "http://schemas.xmlsoap.org/ws/2005/02/trust/Issue";
const SAML_TOKEN_TYPE: &str = "urn:oasis:names:tc:SAML:1.0:assertion";

/// Requests a security token for `realm` and returns the raw response
/// envelope.
///
/// One synchronous round trip, no retries. The realm is the relying party's
/// sign-in URL; the STS issues the token with that audience.
///
/// # Errors
///
/// - [`FedSessionError::Network`]: the STS could not be reached
/// - [`FedSessionError::Auth`]: the STS answered with a non-success status
///
/// A SOAP fault arrives with a success status and is detected by the parser,
/// see [`parse_token_response`](crate::token::parse_token_response).
pub async fn request_token(
    http: &reqwest::Client,
    credentials: &Credentials,
    realm: &Url,
) -> Result<String> {
    let endpoint = credentials.sts_endpoint();
    let envelope = issue_envelope(credentials, realm);

    debug!(endpoint = %endpoint, realm = %realm, "requesting security token");

    let response = http
        .post(endpoint.clone())
        .header(CONTENT_TYPE, SOAP_CONTENT_TYPE)
        .header("SOAPAction", ISSUE_ACTION)
        .body(envelope)
        .send()
        .await
        .map_err(|e| FedSessionError::network(endpoint.as_str(), e))?;

    let status = response.status();
    if !status.is_success() {
        return Err(FedSessionError::auth(
            endpoint.as_str(),
            format!("token request returned {status}"),
        ));
    }

    response
        .text()
        .await
        .map_err(|e| FedSessionError::network(endpoint.as_str(), e))
}

/// Builds the RST "Issue" envelope for `realm`.
///
/// SOAP 1.2 with WS-Addressing headers. All interpolated values are
/// XML-escaped.
fn issue_envelope(credentials: &Credentials, realm: &Url) -> String {
    format!(
        r#"<s:Envelope xmlns:s="http://www.w3.org/2003/05/soap-envelope" xmlns:a="http://www.w3.org/2005/08/addressing" xmlns:u="{wsu}">
  <s:Header>
    <a:Action s:mustUnderstand="1">{action}</a:Action>
    <a:ReplyTo>
      <a:Address>http://www.w3.org/2005/08/addressing/anonymous</a:Address>
    </a:ReplyTo>
    <a:To s:mustUnderstand="1">{endpoint}</a:To>
    <o:Security s:mustUnderstand="1" xmlns:o="{wsse}">
      <o:UsernameToken>
        <o:Username>{username}</o:Username>
        <o:Password>{password}</o:Password>
      </o:UsernameToken>
    </o:Security>
  </s:Header>
  <s:Body>
    <t:RequestSecurityToken xmlns:t="http://schemas.xmlsoap.org/ws/2005/02/trust">
      <wsp:AppliesTo xmlns:wsp="http://schemas.xmlsoap.org/ws/2004/09/policy">
        <a:EndpointReference>
          <a:Address>{realm}</a:Address>
        </a:EndpointReference>
      </wsp:AppliesTo>
      <t:KeyType>{key_type}</t:KeyType>
      <t:RequestType>{request_type}</t:RequestType>
      <t:TokenType>{token_type}</t:TokenType>
    </t:RequestSecurityToken>
  </s:Body>
</s:Envelope>"#,
        wsu = WSU_NS,
        action = ISSUE_ACTION,
        endpoint = escape(credentials.sts_endpoint().as_str()),
        wsse = WSSE_NS,
        username = escape(credentials.username()),
        password = escape(credentials.password()),
        realm = escape(realm.as_str()),
        key_type = BEARER_KEY_TYPE,
        request_type = ISSUE_REQUEST_TYPE,
        token_type = SAML_TOKEN_TYPE,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn credentials(username: &str, password: &str) -> Credentials {
        Credentials::new(username, password, "https://tenant.example/sites/team/").unwrap()
    }

    fn realm(credentials: &Credentials) -> Url {
        credentials.sign_in_target().audience
    }

    #[test]
    fn test_envelope_carries_credentials_and_realm() {
        let credentials = credentials("user@tenant.example", "secret");
        let envelope = issue_envelope(&credentials, &realm(&credentials));

        assert!(envelope.contains("<o:Username>user@tenant.example</o:Username>"));
        assert!(envelope.contains("<o:Password>secret</o:Password>"));
        assert!(envelope.contains(
            "<a:Address>https://tenant.example/sites/team/_forms/default.aspx?wa=wsignin1.0</a:Address>"
        ));
    }

    #[test]
    fn test_envelope_requests_bearer_saml_issue() {
        let credentials = credentials("user@tenant.example", "secret");
        let envelope = issue_envelope(&credentials, &realm(&credentials));

        assert!(envelope.contains(&format!("<t:KeyType>{BEARER_KEY_TYPE}</t:KeyType>")));
        assert!(envelope.contains(&format!(
            "<t:RequestType>{ISSUE_REQUEST_TYPE}</t:RequestType>"
        )));
        assert!(envelope.contains(&format!("<t:TokenType>{SAML_TOKEN_TYPE}</t:TokenType>")));
        assert!(envelope.contains(&format!(
            "<a:Action s:mustUnderstand=\"1\">{ISSUE_ACTION}</a:Action>"
        )));
    }

    #[test]
    fn test_envelope_escapes_credential_characters() {
        let credentials = credentials("user&co@tenant.example", "a<b>&\"c\"");
        let envelope = issue_envelope(&credentials, &realm(&credentials));

        assert!(envelope.contains("<o:Username>user&amp;co@tenant.example</o:Username>"));
        assert!(envelope.contains("<o:Password>a&lt;b&gt;&amp;&quot;c&quot;</o:Password>"));
        assert!(!envelope.contains("a<b>"));
    }

    #[test]
    fn test_envelope_addresses_configured_sts() {
        let credentials = credentials("user@tenant.example", "secret")
            .with_sts_endpoint("https://login.partner.example/extSTS.srf".parse().unwrap());
        let envelope = issue_envelope(&credentials, &realm(&credentials));

        assert!(envelope.contains(
            "<a:To s:mustUnderstand=\"1\">https://login.partner.example/extSTS.srf</a:To>"
        ));
    }
}
