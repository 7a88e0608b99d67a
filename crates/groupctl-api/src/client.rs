// Group service HTTP client
//
// Wraps `reqwest::Client` with project-scoped URL construction and
// `{result}` / `{error}` envelope unwrapping. Endpoint methods live in
// `groups.rs` as inherent methods so this module stays focused on
// transport mechanics.

use reqwest::header::{AUTHORIZATION, HeaderMap, HeaderValue};
use secrecy::{ExposeSecret, SecretString};
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::debug;
use url::Url;

use crate::error::Error;
use crate::transport::TransportConfig;
use crate::types::{Envelope, GroupCollection};

/// Fragments the service uses in auth-failure messages delivered inside a
/// 200 error envelope.
const AUTH_FAILURE_MARKERS: &[&str] = &["not authorized", "not authorised", "re-login"];

/// Raw HTTP client for the remote group service.
///
/// Every call is a `POST` to
/// `{server}/api/v1/projects/{project}/{collection}/{operation}` with a JSON
/// body. Methods return the unwrapped `result` payload.
#[derive(Debug, Clone)]
pub struct GroupServiceClient {
    http: reqwest::Client,
    base_url: Url,
}

impl GroupServiceClient {
    /// Build a client that sends `Authorization: Bearer <token>` on every
    /// request.
    pub fn from_token(
        base_url: &str,
        token: &SecretString,
        transport: &TransportConfig,
    ) -> Result<Self, Error> {
        let mut headers = HeaderMap::new();
        let mut value = HeaderValue::from_str(&format!("Bearer {}", token.expose_secret()))
            .map_err(|e| Error::Authentication {
                message: format!("invalid API token header value: {e}"),
            })?;
        value.set_sensitive(true);
        headers.insert(AUTHORIZATION, value);

        let http = transport.build_client_with_headers(headers)?;
        let base_url = Self::normalize_base_url(base_url)?;
        Ok(Self { http, base_url })
    }

    /// Wrap an existing `reqwest::Client` (caller manages auth headers).
    pub fn from_reqwest(base_url: &str, http: reqwest::Client) -> Result<Self, Error> {
        let base_url = Self::normalize_base_url(base_url)?;
        Ok(Self { http, base_url })
    }

    /// The server base URL.
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    fn normalize_base_url(raw: &str) -> Result<Url, Error> {
        let url = Url::parse(raw)?;
        if url.cannot_be_a_base() {
            return Err(Error::UnsupportedBaseUrl { url: raw.to_owned() });
        }
        Ok(url)
    }

    // ── URL builder ──────────────────────────────────────────────────

    /// `{base}/api/v1/projects/{project}/{collection}/{operation}`
    ///
    /// Segments are pushed individually so a project id containing `/` or
    /// `?` is percent-encoded instead of changing the path.
    pub(crate) fn endpoint(
        &self,
        project: &str,
        collection: GroupCollection,
        operation: &str,
    ) -> Result<Url, Error> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|()| Error::UnsupportedBaseUrl {
                url: self.base_url.to_string(),
            })?
            .pop_if_empty()
            .extend(["api", "v1", "projects", project, collection.path(), operation]);
        Ok(url)
    }

    // ── Request helpers ──────────────────────────────────────────────

    /// POST a JSON body and unwrap the `{result}` envelope.
    pub(crate) async fn call<T, B>(&self, url: Url, body: &B) -> Result<T, Error>
    where
        T: DeserializeOwned,
        B: Serialize + Sync + ?Sized,
    {
        debug!("POST {url}");

        let resp = self.http.post(url).json(body).send().await?;
        Self::parse_envelope(resp).await
    }

    /// Map the HTTP status and envelope onto `T` or an [`Error`].
    async fn parse_envelope<T: DeserializeOwned>(resp: reqwest::Response) -> Result<T, Error> {
        let status = resp.status();

        if status == reqwest::StatusCode::UNAUTHORIZED {
            return Err(Error::Authentication {
                message: "API token rejected".into(),
            });
        }

        let body = resp.text().await?;

        let envelope: Envelope<T> = match serde_json::from_str(&body) {
            Ok(env) => env,
            Err(_) if !status.is_success() => {
                return Err(Error::Remote {
                    status: status.as_u16(),
                    code: None,
                    message: if body.is_empty() {
                        status.to_string()
                    } else {
                        body
                    },
                });
            }
            Err(e) => {
                let preview: String = body.chars().take(200).collect();
                return Err(Error::Deserialization {
                    message: format!("{e} (body preview: {preview:?})"),
                    body,
                });
            }
        };

        if let Some(err) = envelope.error {
            let message = err.describe();
            let lowered = message.to_lowercase();
            if AUTH_FAILURE_MARKERS.iter().any(|m| lowered.contains(m)) {
                return Err(Error::Authentication { message });
            }
            return Err(Error::Remote {
                status: status.as_u16(),
                code: Some(err.code),
                message,
            });
        }

        if !status.is_success() {
            return Err(Error::Remote {
                status: status.as_u16(),
                code: None,
                message: status.to_string(),
            });
        }

        envelope.result.ok_or_else(|| Error::Deserialization {
            message: "response envelope has neither `result` nor `error`".into(),
            body,
        })
    }
}
