//! Extraction of the security token and its expiry from the STS response.

use chrono::{DateTime, Utc};
use quick_xml::events::Event;
use quick_xml::name::{Namespace, ResolveResult};
use quick_xml::NsReader;

use crate::sts::{WSSE_NS, WSU_NS};
use crate::{FedSessionError, Result};

const SOAP_ENVELOPE_NS: &str = "http://www.w3.org/2003/05/soap-envelope";

/// Security token extracted from an RSTR envelope.
#[derive(Debug, Clone)]
pub struct ExtractedToken {
    /// Opaque token payload, re-posted to the sign-in endpoint unmodified.
    pub token: String,
    /// Expiry declared by the STS. Taken verbatim, never derived locally.
    pub expires: DateTime<Utc>,
}

/// Element whose text content is being collected.
enum Capture {
    None,
    Token,
    Expires,
    FaultReason,
}

/// Parses the raw RSTR envelope returned by the STS.
///
/// Locates the `BinarySecurityToken` element in the WS-Security extension
/// namespace and the first `Expires` element in the WS-Security utility
/// namespace. Both are required; a missing element or an unparsable expiry
/// is a hard failure, no default expiry is substituted.
///
/// Parsing runs to completion before any cookie exchange is attempted, so a
/// response with a usable token but a broken expiry fails here and never
/// reaches the sign-in endpoint.
///
/// # Errors
///
/// - [`FedSessionError::Auth`]: the envelope is a SOAP fault (the STS
///   rejected the credentials)
/// - [`FedSessionError::Protocol`]: a required element is absent or the
///   expiry cannot be parsed
pub fn parse_token_response(xml: &str) -> Result<ExtractedToken> {
    let mut reader = NsReader::from_str(xml);
    reader.config_mut().trim_text(true);

    let mut token: Option<String> = None;
    let mut expires_text: Option<String> = None;
    let mut fault_reason: Option<String> = None;
    let mut in_fault = false;
    let mut capture = Capture::None;

    loop {
        let event = reader
            .read_resolved_event()
            .map_err(|e| FedSessionError::Protocol(format!("invalid XML in token response: {e}")))?;

        match event {
            (ResolveResult::Bound(Namespace(ns)), Event::Start(e)) => {
                let local = e.local_name();
                if ns == WSSE_NS.as_bytes()
                    && local.as_ref() == b"BinarySecurityToken"
                    && token.is_none()
                {
                    capture = Capture::Token;
                } else if ns == WSU_NS.as_bytes()
                    && local.as_ref() == b"Expires"
                    && expires_text.is_none()
                {
                    capture = Capture::Expires;
                } else if ns == SOAP_ENVELOPE_NS.as_bytes() && local.as_ref() == b"Fault" {
                    in_fault = true;
                } else if in_fault
                    && ns == SOAP_ENVELOPE_NS.as_bytes()
                    && local.as_ref() == b"Text"
                    && fault_reason.is_none()
                {
                    capture = Capture::FaultReason;
                }
            }
            (_, Event::Text(t)) => {
                let text = t.unescape().map_err(|e| {
                    FedSessionError::Protocol(format!("invalid XML in token response: {e}"))
                })?;
                match capture {
                    Capture::Token => token.get_or_insert_with(String::new).push_str(&text),
                    Capture::Expires => {
                        expires_text.get_or_insert_with(String::new).push_str(&text)
                    }
                    Capture::FaultReason => {
                        fault_reason.get_or_insert_with(String::new).push_str(&text)
                    }
                    Capture::None => {}
                }
            }
            (_, Event::End(e)) => {
                if e.local_name().as_ref() == b"Fault" {
                    in_fault = false;
                }
                capture = Capture::None;
            }
            (_, Event::Eof) => break,
            _ => {}
        }
    }

    if in_fault || fault_reason.is_some() {
        let reason =
            fault_reason.unwrap_or_else(|| "security token service returned a fault".to_string());
        return Err(FedSessionError::auth("security token service", reason));
    }

    let token = token.ok_or_else(|| {
        FedSessionError::Protocol("response contains no BinarySecurityToken element".to_string())
    })?;
    let expires_text = expires_text.ok_or_else(|| {
        FedSessionError::Protocol("response contains no Expires element".to_string())
    })?;

    let expires = DateTime::parse_from_rfc3339(&expires_text)
        .map_err(|e| {
            FedSessionError::Protocol(format!("unparsable token expiry {expires_text:?}: {e}"))
        })?
        .with_timezone(&Utc);

    Ok(ExtractedToken { token, expires })
}
