//! HTTP client for the v2 REST API

use super::user_agent::{accept_json, authorization, sdk_user_agent};
use crate::config::ApiSettings;
use crate::error::{Error, Result};
use crate::models::Status;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use reqwest::{Client, RequestBuilder};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::debug;

/// Owner and app a request is scoped to
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserAppId {
    pub user_id: String,
    pub app_id: String,
}

impl UserAppId {
    /// Ids of an app owned by `user_id`
    pub fn new(user_id: impl Into<String>, app_id: impl Into<String>) -> Self {
        Self {
            user_id: user_id.into(),
            app_id: app_id.into(),
        }
    }

    /// API path under this app, e.g. `path("inputs/searches")`
    pub fn path(&self, suffix: &str) -> String {
        let base = format!(
            "{}/apps/{}",
            user_path(&self.user_id),
            urlencoding::encode(&self.app_id)
        );
        if suffix.is_empty() {
            base
        } else {
            format!("{}/{}", base, suffix.trim_start_matches('/'))
        }
    }
}

/// API path of a user account
pub fn user_path(user_id: &str) -> String {
    format!("/v2/users/{}", urlencoding::encode(user_id))
}

#[derive(Deserialize)]
struct StatusEnvelope {
    status: Option<Status>,
}

/// HTTP client wrapper with auth and status handling
#[derive(Clone)]
pub struct ApiClient {
    client: Client,
    base_url: String,
}

impl ApiClient {
    /// Create a client for `base_url` authenticated with `pat`
    pub fn new(base_url: impl Into<String>, pat: impl Into<String>) -> Result<Self> {
        let settings = ApiSettings {
            base_url: base_url.into(),
            pat: Some(pat.into()),
            ..Default::default()
        };
        Self::with_settings(&settings)
    }

    /// Create a client with custom settings
    pub fn with_settings(settings: &ApiSettings) -> Result<Self> {
        let pat = settings
            .pat
            .as_deref()
            .filter(|p| !p.is_empty())
            .ok_or_else(|| Error::user("A personal access token is required (set CLARIFAI_PAT)"))?;

        let mut headers = HeaderMap::new();
        headers.insert(
            reqwest::header::AUTHORIZATION,
            header_value(&authorization(pat))?,
        );
        headers.insert(reqwest::header::ACCEPT, HeaderValue::from_static(accept_json()));
        for (key, value) in &settings.extra_headers {
            let name = HeaderName::from_bytes(key.as_bytes())
                .map_err(|e| Error::user(format!("Invalid header name '{}': {}", key, e)))?;
            headers.insert(name, header_value(value)?);
        }

        let timeout = Duration::try_from_secs_f64(settings.request_timeout).map_err(|e| {
            Error::user(format!(
                "Invalid request_timeout {}: {}",
                settings.request_timeout, e
            ))
        })?;

        let mut builder = Client::builder()
            .timeout(timeout)
            .user_agent(sdk_user_agent(settings.useragent_suffix.as_deref()))
            .default_headers(headers)
            .gzip(true)
            .brotli(true);

        // SSL verification
        if !settings.verify_ssl {
            builder = builder.danger_accept_invalid_certs(true);
        }

        // Proxy settings
        if let Some(ref proxy_url) = settings.proxies.all {
            builder = builder.proxy(reqwest::Proxy::all(proxy_url)?);
        } else {
            if let Some(ref http) = settings.proxies.http {
                builder = builder.proxy(reqwest::Proxy::http(http)?);
            }
            if let Some(ref https) = settings.proxies.https {
                builder = builder.proxy(reqwest::Proxy::https(https)?);
            }
        }

        Ok(Self {
            client: builder.build()?,
            base_url: settings.base_url.trim_end_matches('/').to_string(),
        })
    }

    /// API root without a trailing slash
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// GET with query parameters
    pub async fn get<T: DeserializeOwned>(&self, path: &str, params: &[(&str, String)]) -> Result<T> {
        let mut request = self.client.get(self.url(path));
        if !params.is_empty() {
            request = request.query(params);
        }
        self.send(request).await
    }

    /// POST with a JSON body
    pub async fn post<B, T>(&self, path: &str, body: &B) -> Result<T>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        self.send(self.client.post(self.url(path)).json(body)).await
    }

    /// DELETE, optionally with a JSON body
    pub async fn delete<B, T>(&self, path: &str, body: Option<&B>) -> Result<T>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let mut request = self.client.delete(self.url(path));
        if let Some(body) = body {
            request = request.json(body);
        }
        self.send(request).await
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    /// Send a request and decode the body, turning non-success statuses into errors
    async fn send<T: DeserializeOwned>(&self, request: RequestBuilder) -> Result<T> {
        let response = request.send().await?;
        let http_status = response.status();
        let url = response.url().to_string();
        let text = response.text().await?;

        debug!("{} -> HTTP {}", url, http_status.as_u16());

        let value: serde_json::Value = match serde_json::from_str(&text) {
            Ok(v) => v,
            Err(_) if !http_status.is_success() => {
                return Err(Error::HttpStatus {
                    status: http_status.as_u16(),
                    body: text,
                })
            }
            Err(e) => return Err(e.into()),
        };

        let envelope: StatusEnvelope = serde_json::from_value(value.clone())?;
        match envelope.status {
            Some(status) if !status.is_success() => {
                return Err(Error::Api {
                    code: status.code,
                    description: status.description,
                    details: status.details,
                })
            }
            None if !http_status.is_success() => {
                return Err(Error::HttpStatus {
                    status: http_status.as_u16(),
                    body: text,
                })
            }
            _ => {}
        }

        Ok(serde_json::from_value(value)?)
    }
}

fn header_value(value: &str) -> Result<HeaderValue> {
    HeaderValue::from_str(value).map_err(|e| Error::user(format!("Invalid header value: {}", e)))
}
