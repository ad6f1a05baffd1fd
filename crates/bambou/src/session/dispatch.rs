// Request dispatch: authentication headers, pagination headers, and
// status-driven classification of the response.

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;
use reqwest::header::{AUTHORIZATION, CONTENT_TYPE, HeaderMap, HeaderValue};
use reqwest::{Method, StatusCode};
use secrecy::ExposeSecret;
use serde::Deserialize;
use tracing::debug;
use url::Url;

use super::Session;
use crate::config::Credentials;
use crate::error::Error;
use crate::fetching::{FetchingInfo, HEADER_PAGE_SIZE};
use crate::identity::Rootable;

const HEADER_ORGANIZATION: &str = "X-Nuage-Organization";

// ── Error response shape (404 / 409) ─────────────────────────────────

#[derive(Debug, Deserialize)]
struct ErrorList {
    #[serde(default)]
    errors: Vec<ErrorEntry>,
}

#[derive(Debug, Deserialize)]
struct ErrorEntry {
    #[serde(default)]
    descriptions: Vec<ErrorDescription>,
}

#[derive(Debug, Deserialize)]
struct ErrorDescription {
    #[serde(default)]
    title: String,
    #[serde(default)]
    description: String,
}

/// A successful response, body already read.
#[derive(Debug)]
pub(crate) struct Reply {
    pub status: StatusCode,
    pub body: String,
}

impl Reply {
    /// `true` for 204 or a blank body.
    pub fn is_empty(&self) -> bool {
        self.status == StatusCode::NO_CONTENT || self.body.trim().is_empty()
    }
}

impl<R: Rootable> Session<R> {
    /// Send one request and classify the response.
    ///
    /// A 300 is resubmitted once to the same URL with `responseChoice=1`;
    /// a second 300 is returned as a status error. On success, `info` is
    /// refreshed from the response headers.
    pub(crate) async fn send(
        &self,
        method: Method,
        mut url: Url,
        body: Option<Vec<u8>>,
        mut info: Option<&mut FetchingInfo>,
    ) -> Result<Reply, Error> {
        let headers = self.prepare_headers(info.as_deref()).await?;
        let mut resubmitted = false;

        loop {
            debug!("{method} {url}");

            let mut request = self
                .http
                .request(method.clone(), url.clone())
                .headers(headers.clone());
            if let Some(ref body) = body {
                request = request.body(body.clone());
            }

            let resp = request.send().await?;
            let status = resp.status();
            debug!(status = %status, headers = ?resp.headers(), "response");

            match status {
                StatusCode::OK | StatusCode::CREATED | StatusCode::NO_CONTENT => {
                    if let Some(info) = info.as_deref_mut() {
                        info.update_from(resp.headers());
                    }
                    let body = resp.text().await?;
                    debug!(body = %body, "response body");
                    return Ok(Reply { status, body });
                }
                StatusCode::MULTIPLE_CHOICES if !resubmitted => {
                    url.query_pairs_mut().append_pair("responseChoice", "1");
                    resubmitted = true;
                    debug!("multiple choices, resubmitting with responseChoice=1");
                }
                StatusCode::NOT_FOUND | StatusCode::CONFLICT => {
                    let body = resp.text().await?;
                    debug!(body = %body, "error body");
                    return Err(parse_error_list(status, body));
                }
                _ => {
                    return Err(Error::Status {
                        status: status.as_u16(),
                        text: status.to_string(),
                    });
                }
            }
        }
    }

    /// Headers common to every request, plus auth and pagination.
    async fn prepare_headers(&self, info: Option<&FetchingInfo>) -> Result<HeaderMap, Error> {
        let mut headers = HeaderMap::new();

        if let Credentials::Password {
            username,
            password,
            organization,
        } = &self.credentials
        {
            let api_key = self.api_key().await;
            let secret = if api_key.is_empty() {
                password.expose_secret()
            } else {
                api_key.as_str()
            };

            headers.insert(AUTHORIZATION, authorization_header(username, secret)?);
            headers.insert(
                HEADER_ORGANIZATION,
                HeaderValue::from_str(organization).map_err(|e| Error::Authentication {
                    message: format!("invalid organization header value: {e}"),
                })?,
            );
        }

        headers.insert(HEADER_PAGE_SIZE, HeaderValue::from(self.page_size));
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

        if let Some(info) = info {
            info.apply_to(&mut headers)?;
        }

        Ok(headers)
    }
}

/// `XREST base64(username:secret)`, marked sensitive.
pub(crate) fn authorization_header(username: &str, secret: &str) -> Result<HeaderValue, Error> {
    if username.is_empty() {
        return Err(Error::Authentication {
            message: "No username given".into(),
        });
    }

    if secret.is_empty() {
        return Err(Error::Authentication {
            message: "No password or authentication token given".into(),
        });
    }

    let token = STANDARD.encode(format!("{username}:{secret}"));
    let mut value =
        HeaderValue::from_str(&format!("XREST {token}")).map_err(|e| Error::Authentication {
            message: format!("invalid authorization header value: {e}"),
        })?;
    value.set_sensitive(true);
    Ok(value)
}

/// Surface the first description of the first error in a VSD error list.
fn parse_error_list(status: StatusCode, body: String) -> Error {
    let list: ErrorList = match serde_json::from_str(&body) {
        Ok(list) => list,
        Err(e) => {
            return Error::Deserialization {
                message: e.to_string(),
                body,
            };
        }
    };

    match list
        .errors
        .into_iter()
        .next()
        .and_then(|entry| entry.descriptions.into_iter().next())
    {
        Some(desc) => Error::Api {
            status: status.as_u16(),
            title: desc.title,
            description: desc.description,
        },
        None => Error::Status {
            status: status.as_u16(),
            text: status.to_string(),
        },
    }
}
