use crate::domain::error::{AveoError, ApiError};
use crate::infrastructure::config::Config;
use crate::infrastructure::network::http::create_client;
use reqwest::{header, Client, Method, Url};
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::sync::RwLock;

/// JSON REST client for the marketplace backend.
///
/// Owns the bearer token so that login and logout are visible to every service
/// sharing the client.
pub struct ApiClient {
    http: Client,
    base_url: String,
    token: RwLock<Option<String>>,
}

impl ApiClient {
    pub fn new(http: Client, base_url: impl Into<String>) -> Self {
        Self {
            http,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            token: RwLock::new(None),
        }
    }

    pub fn from_config(config: &Config) -> Result<Self, AveoError> {
        let http = create_client(&config.http)?;
        Ok(Self::new(http, config.base_url()))
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn token(&self) -> Option<String> {
        self.token
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }

    pub fn set_token(&self, token: Option<String>) {
        let mut guard = self
            .token
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        *guard = token.filter(|t| !t.is_empty());
    }

    /// Token or `AuthRequired`, checked before any network call.
    pub fn require_token(&self) -> Result<String, AveoError> {
        self.token().ok_or(AveoError::AuthRequired)
    }

    fn url(&self, path: &str) -> Result<Url, AveoError> {
        Ok(Url::parse(&format!("{}{}", self.base_url, path))?)
    }

    /// Perform one request and decode the body.
    ///
    /// A body that is empty or not JSON decodes to `null` on success and to
    /// `data: None` on failure.
    pub async fn request(
        &self,
        method: Method,
        path: &str,
        query: &[(String, String)],
        body: Option<&Value>,
        token: Option<&str>,
    ) -> Result<Value, AveoError> {
        let url = self.url(path)?;
        tracing::debug!(%method, %url, "api request");

        let mut builder = self
            .http
            .request(method.clone(), url)
            .header(header::CONTENT_TYPE, "application/json");

        if !query.is_empty() {
            builder = builder.query(query);
        }
        if let Some(token) = token {
            builder = builder.bearer_auth(token);
        }
        if let Some(body) = body {
            builder = builder.body(serde_json::to_vec(body)?);
        }

        let response = builder.send().await?;
        let status = response.status();
        let bytes = response.bytes().await?;
        let data: Option<Value> = if bytes.is_empty() {
            None
        } else {
            serde_json::from_slice(&bytes).ok()
        };

        if !status.is_success() {
            let err = ApiError::from_response(status.as_u16(), data);
            tracing::debug!(%method, path, status = status.as_u16(), error = %err, "api request failed");
            return Err(err.into());
        }

        Ok(data.unwrap_or(Value::Null))
    }

    pub async fn request_as<T: DeserializeOwned>(
        &self,
        method: Method,
        path: &str,
        query: &[(String, String)],
        body: Option<&Value>,
        token: Option<&str>,
    ) -> Result<T, AveoError> {
        let value = self.request(method, path, query, body, token).await?;
        Ok(serde_json::from_value(value)?)
    }

    /// Request using the client's own token, if any.
    pub async fn send<T: DeserializeOwned>(
        &self,
        method: Method,
        path: &str,
        query: &[(String, String)],
        body: Option<&Value>,
    ) -> Result<T, AveoError> {
        let token = self.token();
        self.request_as(method, path, query, body, token.as_deref())
            .await
    }
}
