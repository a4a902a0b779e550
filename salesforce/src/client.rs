//! Salesforce REST client with in-memory session caching.

use std::sync::Arc;
use std::time::Duration;

use reqwest::{Method, StatusCode};
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use serde_json::{json, Value};
use tokio::sync::RwLock;
use tracing::instrument;

use crate::auth::{login, Session, API_VERSION};
use crate::error::SalesforceError;
use crate::request::SalesforceRequest;

/// Credentials and endpoint for one Salesforce org.
#[derive(Debug, Clone)]
pub struct SalesforceConfig {
    /// SOAP login host, e.g. `https://login.salesforce.com`.
    pub login_url: String,
    /// Org username.
    pub username: String,
    /// Org password.
    pub password: SecretString,
    /// Security token appended to the password at login.
    pub security_token: SecretString,
}

impl SalesforceConfig {
    /// Read the configuration from `SALESFORCE_DOMAIN`, `SALESFORCE_USERNAME`,
    /// `SALESFORCE_PASSWORD` and `SALESFORCE_SECURITY_TOKEN`.
    ///
    /// The domain is the host prefix, e.g. `login`, `test` or
    /// `mydomain.my` for a My Domain org.
    ///
    /// # Errors
    ///
    /// Returns [`SalesforceError::MissingConfig`] naming the first variable
    /// that is missing or empty.
    pub fn from_env() -> Result<Self, SalesforceError> {
        let domain = require_env("SALESFORCE_DOMAIN")?;
        Ok(Self {
            login_url: format!("https://{domain}.salesforce.com"),
            username: require_env("SALESFORCE_USERNAME")?,
            password: SecretString::from(require_env("SALESFORCE_PASSWORD")?),
            security_token: SecretString::from(require_env("SALESFORCE_SECURITY_TOKEN")?),
        })
    }
}

fn require_env(name: &'static str) -> Result<String, SalesforceError> {
    match std::env::var(name) {
        Ok(value) if !value.trim().is_empty() => Ok(value),
        _ => Err(SalesforceError::MissingConfig(name)),
    }
}

/// Shared handle to one org.
///
/// Cloning is cheap; all clones share the HTTP connection pool and the
/// cached session. Login happens lazily on the first request, and the
/// client re-authenticates once when the org reports an invalid session.
#[derive(Clone)]
pub struct SalesforceClient {
    inner: Arc<ClientInner>,
}

struct ClientInner {
    http: reqwest::Client,
    config: SalesforceConfig,
    session: RwLock<Option<Session>>,
}

/// One entry of a Salesforce REST error body.
#[derive(Debug, Deserialize)]
struct ApiErrorEntry {
    message: String,
    #[serde(rename = "errorCode")]
    error_code: String,
}

impl SalesforceClient {
    /// Create a client for the given org configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying HTTP client cannot be constructed.
    pub fn new(config: SalesforceConfig) -> Result<Self, SalesforceError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(30))
            .build()?;
        Ok(Self {
            inner: Arc::new(ClientInner {
                http,
                config,
                session: RwLock::new(None),
            }),
        })
    }

    /// Create a client with a pre-established session, bypassing login.
    ///
    /// Intended for tests and for callers that obtained a session through
    /// another channel.
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying HTTP client cannot be constructed.
    pub fn with_session(
        instance_url: impl Into<String>,
        session_id: impl Into<String>,
    ) -> Result<Self, SalesforceError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(30))
            .build()?;
        let config = SalesforceConfig {
            login_url: instance_url.into(),
            username: String::new(),
            password: SecretString::from(String::new()),
            security_token: SecretString::from(String::new()),
        };
        let session = Session {
            session_id: SecretString::from(session_id.into()),
            instance_url: config.login_url.clone(),
        };
        Ok(Self {
            inner: Arc::new(ClientInner {
                http,
                config,
                session: RwLock::new(Some(session)),
            }),
        })
    }

    /// Execute one request against the org and return the raw JSON response.
    ///
    /// `update` and `delete` succeed with an empty body; for those the HTTP
    /// status code is returned as a JSON number, matching the value the
    /// wrapped SDK hands back.
    ///
    /// # Errors
    ///
    /// Returns [`SalesforceError::Api`] for structured org errors,
    /// [`SalesforceError::AuthenticationFailed`] when login is rejected and
    /// [`SalesforceError::Http`] for transport failures.
    #[instrument(skip(self, request), fields(operation = request_operation(&request)))]
    pub async fn invoke(&self, request: SalesforceRequest) -> Result<Value, SalesforceError> {
        match self.execute(&request).await {
            Err(e) if e.is_invalid_session() => {
                tracing::info!("session rejected by org, re-authenticating");
                self.drop_session().await;
                self.execute(&request).await
            }
            other => other,
        }
    }

    async fn execute(&self, request: &SalesforceRequest) -> Result<Value, SalesforceError> {
        let session = self.session().await?;
        let base = format!("{}/services/data/v{API_VERSION}", session.instance_url);

        let req = match request {
            SalesforceRequest::ListObjects => {
                self.inner.http.get(format!("{base}/sobjects"))
            }
            SalesforceRequest::Describe { object_name } => self
                .inner
                .http
                .get(format!("{base}/sobjects/{object_name}/describe")),
            SalesforceRequest::Query { query } => self
                .inner
                .http
                .get(format!("{base}/query"))
                .query(&[("q", query)]),
            SalesforceRequest::Create {
                object_name,
                record_data,
            } => self
                .inner
                .http
                .post(format!("{base}/sobjects/{object_name}"))
                .json(record_data),
            SalesforceRequest::Update {
                object_name,
                record_id,
                record_data,
            } => self
                .inner
                .http
                .request(
                    Method::PATCH,
                    format!("{base}/sobjects/{object_name}/{record_id}"),
                )
                .json(record_data),
            SalesforceRequest::Delete {
                object_name,
                record_id,
            } => self
                .inner
                .http
                .delete(format!("{base}/sobjects/{object_name}/{record_id}")),
        };

        let response = req
            .bearer_auth(session.session_id.expose_secret())
            .send()
            .await?;

        Self::interpret(response).await
    }

    /// Map an org response to JSON, converting error bodies to typed errors.
    async fn interpret(response: reqwest::Response) -> Result<Value, SalesforceError> {
        let status = response.status();

        if status.is_success() {
            if status == StatusCode::NO_CONTENT {
                return Ok(json!(status.as_u16()));
            }
            return Ok(response.json().await?);
        }

        let body = response.text().await?;
        if let Ok(entries) = serde_json::from_str::<Vec<ApiErrorEntry>>(&body) {
            if let Some(first) = entries.into_iter().next() {
                return Err(SalesforceError::Api {
                    error_code: first.error_code,
                    message: first.message,
                });
            }
        }
        Err(SalesforceError::UnexpectedResponse(format!(
            "HTTP {status}: {body}"
        )))
    }

    /// Return the cached session, logging in first if there is none.
    async fn session(&self) -> Result<Session, SalesforceError> {
        if let Some(session) = self.inner.session.read().await.clone() {
            return Ok(session);
        }

        let mut guard = self.inner.session.write().await;
        // Another caller may have logged in while we waited for the lock.
        if let Some(session) = guard.clone() {
            return Ok(session);
        }

        let config = &self.inner.config;
        let session = login(
            &self.inner.http,
            &config.login_url,
            &config.username,
            &config.password,
            &config.security_token,
        )
        .await?;
        *guard = Some(session.clone());
        Ok(session)
    }

    async fn drop_session(&self) {
        *self.inner.session.write().await = None;
    }
}

/// Operation name for tracing spans.
const fn request_operation(request: &SalesforceRequest) -> &'static str {
    match request {
        SalesforceRequest::ListObjects => "list_objects",
        SalesforceRequest::Describe { .. } => "describe",
        SalesforceRequest::Query { .. } => "query",
        SalesforceRequest::Create { .. } => "create",
        SalesforceRequest::Update { .. } => "update",
        SalesforceRequest::Delete { .. } => "delete",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_env_names_the_variable() {
        std::env::remove_var("SALESFORCE_DOMAIN");
        let err = SalesforceConfig::from_env().unwrap_err();
        assert!(matches!(
            err,
            SalesforceError::MissingConfig("SALESFORCE_DOMAIN")
        ));
    }

    #[test]
    fn api_error_body_parses_to_typed_error() {
        let body = r#"[{"message":"Session expired or invalid","errorCode":"INVALID_SESSION_ID"}]"#;
        let entries: Vec<ApiErrorEntry> = serde_json::from_str(body).unwrap();
        let err = SalesforceError::Api {
            error_code: entries[0].error_code.clone(),
            message: entries[0].message.clone(),
        };
        assert!(err.is_invalid_session());
        assert!(err.to_string().contains("Session expired"));
    }

    #[test]
    fn non_session_errors_are_not_retried() {
        let err = SalesforceError::Api {
            error_code: "MALFORMED_QUERY".into(),
            message: "unexpected token".into(),
        };
        assert!(!err.is_invalid_session());
    }
}
