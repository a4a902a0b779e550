//! SOAP username + password + security-token login.
//!
//! Salesforce's REST API accepts a session id obtained from the partner SOAP
//! `login` call. The response also carries the org's instance URL, which all
//! subsequent REST requests are issued against.

use secrecy::{ExposeSecret, SecretString};
use tracing::instrument;
use url::Url;

use crate::error::SalesforceError;

/// Partner API version used for login and REST calls.
pub const API_VERSION: &str = "59.0";

/// An authenticated Salesforce session.
#[derive(Debug, Clone)]
pub struct Session {
    /// Session id, sent as a bearer token on REST requests.
    pub session_id: SecretString,
    /// Base URL of the org instance, e.g. `https://na139.salesforce.com`.
    pub instance_url: String,
}

/// Log in to the org and return a fresh session.
///
/// `login_url` is the SOAP endpoint host, e.g. `https://login.salesforce.com`
/// or `https://mydomain.my.salesforce.com`.
///
/// # Errors
///
/// Returns [`SalesforceError::AuthenticationFailed`] when the org rejects the
/// credentials, and [`SalesforceError::UnexpectedResponse`] when the SOAP
/// body cannot be interpreted.
#[instrument(skip(http, password, security_token), fields(username = %username))]
pub async fn login(
    http: &reqwest::Client,
    login_url: &str,
    username: &str,
    password: &SecretString,
    security_token: &SecretString,
) -> Result<Session, SalesforceError> {
    let endpoint = format!("{login_url}/services/Soap/u/{API_VERSION}");
    let body = login_envelope(
        username,
        password.expose_secret(),
        security_token.expose_secret(),
    );

    let response = http
        .post(&endpoint)
        .header("Content-Type", "text/xml; charset=UTF-8")
        .header("SOAPAction", "login")
        .body(body)
        .send()
        .await?;

    let status = response.status();
    let text = response.text().await?;

    if !status.is_success() {
        let fault = extract_tag(&text, "faultstring")
            .unwrap_or_else(|| format!("HTTP {status}"));
        return Err(SalesforceError::AuthenticationFailed(fault));
    }

    let session_id = extract_tag(&text, "sessionId").ok_or_else(|| {
        SalesforceError::UnexpectedResponse("login response has no sessionId".into())
    })?;
    let server_url = extract_tag(&text, "serverUrl").ok_or_else(|| {
        SalesforceError::UnexpectedResponse("login response has no serverUrl".into())
    })?;

    let instance_url = instance_url_from(&server_url)?;
    tracing::debug!(instance = %instance_url, "Salesforce login succeeded");

    Ok(Session {
        session_id: SecretString::from(session_id),
        instance_url,
    })
}

/// Build the SOAP login envelope with credentials XML-escaped.
fn login_envelope(username: &str, password: &str, security_token: &str) -> String {
    format!(
        r#"<?xml version="1.0" encoding="utf-8" ?>
<env:Envelope xmlns:env="http://schemas.xmlsoap.org/soap/envelope/"
    xmlns:urn="urn:partner.soap.sforce.com">
  <env:Body>
    <urn:login>
      <urn:username>{}</urn:username>
      <urn:password>{}{}</urn:password>
    </urn:login>
  </env:Body>
</env:Envelope>"#,
        xml_escape(username),
        xml_escape(password),
        xml_escape(security_token),
    )
}

/// Escape the five XML special characters in credential text.
fn xml_escape(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for c in raw.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            other => out.push(other),
        }
    }
    out
}

/// Pull the text content of the first `<tag>...</tag>` pair out of the body.
///
/// The login response is a fixed, flat document, so tag scanning is enough
/// here; no XML parser dependency is warranted for two fields.
fn extract_tag(xml: &str, tag: &str) -> Option<String> {
    let open = format!("<{tag}>");
    let close = format!("</{tag}>");
    let start = xml.find(&open)? + open.len();
    let end = xml[start..].find(&close)? + start;
    Some(xml[start..end].to_string())
}

/// Reduce the SOAP `serverUrl` to the instance origin used for REST calls.
fn instance_url_from(server_url: &str) -> Result<String, SalesforceError> {
    let parsed = Url::parse(server_url).map_err(|e| {
        SalesforceError::UnexpectedResponse(format!("invalid serverUrl {server_url}: {e}"))
    })?;
    let host = parsed.host_str().ok_or_else(|| {
        SalesforceError::UnexpectedResponse(format!("serverUrl {server_url} has no host"))
    })?;
    let mut origin = format!("{}://{host}", parsed.scheme());
    if let Some(port) = parsed.port() {
        use std::fmt::Write as _;
        let _ = write!(origin, ":{port}");
    }
    Ok(origin)
}
