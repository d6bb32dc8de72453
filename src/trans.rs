use std::collections::VecDeque;

use parking_lot::Mutex;
use reqwest::header::{HeaderMap, LOCATION};
use serde::{de::DeserializeOwned, Serialize};

use crate::{
    acc::AcmeKey,
    api,
    error::{Error, Result},
    jws,
    req::{
        find_link, is_json_content_type, HttpClient, HttpRequest, HttpResponse, Method,
        JOSE_CONTENT_TYPE,
    },
};

const REPLAY_NONCE: &str = "replay-nonce";

/// Most nonces kept around; the oldest are dropped first.
const MAX_POOLED_NONCES: usize = 10;

/// Most consumed nonces remembered for rejecting replays.
const MAX_CONSUMED_NONCES: usize = 64;

/// Body of a response after classification by content type.
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Payload {
    Empty,
    Json(serde_json::Value),
    Raw(Vec<u8>),
}

/// A classified response.
///
/// Status interpretation is left to the caller.
#[derive(Debug, Clone)]
pub(crate) struct Response {
    pub(crate) url: String,
    pub(crate) status: u16,
    pub(crate) headers: HeaderMap,
    pub(crate) content_type: Option<String>,
    pub(crate) payload: Payload,
}

impl Response {
    fn classify(url: &str, res: HttpResponse) -> Result<Self> {
        let content_type = res.content_type().map(ToOwned::to_owned);

        let payload = if res.body.is_empty() {
            Payload::Empty
        } else if content_type.as_deref().is_some_and(is_json_content_type) {
            match serde_json::from_slice(&res.body) {
                Ok(json) => Payload::Json(json),
                Err(err) => {
                    return Err(Error::MalformedResponse {
                        message: format!("invalid JSON body from {url}: {err}"),
                        body: Some(String::from_utf8_lossy(&res.body).into_owned()),
                    })
                }
            }
        } else {
            Payload::Raw(res.body)
        };

        Ok(Response {
            url: url.to_owned(),
            status: res.status,
            headers: res.headers,
            content_type,
            payload,
        })
    }

    pub(crate) fn is_success(&self) -> bool {
        (200..=299).contains(&self.status)
    }

    pub(crate) fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|val| val.to_str().ok())
    }

    pub(crate) fn location(&self) -> Option<&str> {
        self.header(LOCATION.as_str())
    }

    pub(crate) fn link(&self, rel: &str) -> Option<String> {
        find_link(&self.headers, rel)
    }

    /// Deserializes a JSON payload into one of the [`api`] types.
    pub(crate) fn json<T: DeserializeOwned>(&self) -> Result<T> {
        match &self.payload {
            Payload::Json(json) => serde_json::from_value(json.clone()).map_err(|err| {
                Error::MalformedResponse {
                    message: format!("unexpected JSON from {}: {err}", self.url),
                    body: Some(json.to_string()),
                }
            }),
            _ => Err(Error::malformed(format!(
                "expected a JSON body from {}",
                self.url
            ))),
        }
    }

    /// Problem document attached to an error response, if any.
    pub(crate) fn problem(&self) -> Option<api::Problem> {
        match &self.payload {
            Payload::Json(json) if !self.is_success() => {
                serde_json::from_value(json.clone()).ok()
            }
            _ => None,
        }
    }

    /// Fails with a protocol error unless the status is one of `expected`.
    pub(crate) fn expect_status(self, resource: &str, expected: &[u16]) -> Result<Self> {
        if expected.contains(&self.status) {
            Ok(self)
        } else {
            Err(Error::unexpected_status(
                resource,
                self.status,
                self.problem().as_ref(),
            ))
        }
    }
}

/// Pool of single-use anti-replay nonces.
#[derive(Debug, Default)]
pub(crate) struct NoncePool {
    inner: Mutex<NoncePoolInner>,
}

#[derive(Debug, Default)]
struct NoncePoolInner {
    pool: VecDeque<String>,
    used: VecDeque<String>,
}

impl NoncePool {
    /// Adds a nonce observed on a response.
    ///
    /// Values that are already pooled or were handed out before are ignored.
    pub(crate) fn deposit(&self, nonce: &str) {
        let mut inner = self.inner.lock();

        if inner.used.iter().chain(&inner.pool).any(|seen| seen == nonce) {
            log::trace!("Ignoring repeated nonce");
            return;
        }

        log::trace!("Extracting new nonce");
        inner.pool.push_back(nonce.to_owned());

        if inner.pool.len() > MAX_POOLED_NONCES {
            inner.pool.pop_front();
        }
    }

    /// Removes and returns the oldest pooled nonce.
    pub(crate) fn pop(&self) -> Option<String> {
        let mut inner = self.inner.lock();

        let nonce = inner.pool.pop_front()?;
        inner.used.push_back(nonce.clone());

        if inner.used.len() > MAX_CONSUMED_NONCES {
            inner.used.pop_front();
        }

        Some(nonce)
    }

    #[cfg(test)]
    pub(crate) fn len(&self) -> usize {
        self.inner.lock().pool.len()
    }

    #[cfg(test)]
    pub(crate) fn consumed_len(&self) -> usize {
        self.inner.lock().used.len()
    }
}

/// Dispatches signed and unsigned requests and keeps the nonce pool topped up.
#[derive(Debug)]
pub(crate) struct Transport<C> {
    client: C,
    acme_key: AcmeKey,
    nonce_pool: NoncePool,
}

impl<C: HttpClient> Transport<C> {
    pub(crate) fn new(client: C, acme_key: AcmeKey) -> Self {
        Transport {
            client,
            acme_key,
            nonce_pool: NoncePool::default(),
        }
    }

    /// The key used in the transport
    pub(crate) fn acme_key(&self) -> &AcmeKey {
        &self.acme_key
    }

    pub(crate) async fn get(&self, url: &str) -> Result<Response> {
        self.send(HttpRequest::new(Method::GET, url)).await
    }

    pub(crate) async fn head(&self, url: &str) -> Result<Response> {
        self.send(HttpRequest::new(Method::HEAD, url)).await
    }

    /// Signs `payload` with a fresh nonce and POSTs it to `url`.
    pub(crate) async fn post<T>(&self, url: &str, payload: &T) -> Result<Response>
    where
        T: Serialize + ?Sized,
    {
        let nonce = self.take_nonce(url).await?;

        let jws = jws::sign(&self.acme_key, nonce, payload)?;
        let body = serde_json::to_vec(&jws).map_err(Error::signing)?;

        let req = HttpRequest::new(Method::POST, url).with_body(JOSE_CONTENT_TYPE, body);
        self.send(req).await
    }

    /// Takes a pooled nonce, or asks `url` for one with a HEAD request when the pool is empty.
    pub(crate) async fn take_nonce(&self, url: &str) -> Result<String> {
        if let Some(nonce) = self.nonce_pool.pop() {
            log::trace!("Use previous nonce");
            return Ok(nonce);
        }

        log::debug!("Request new nonce");
        // any Replay-Nonce on the response lands in the pool
        self.head(url).await?;

        self.nonce_pool
            .pop()
            .ok_or_else(|| Error::protocol(url, "no nonce available"))
    }

    async fn send(&self, req: HttpRequest) -> Result<Response> {
        let method = req.method.clone();
        let url = req.url.clone();

        log::debug!("Call endpoint: {method} {url}");

        let res = self.client.send(req).await.map_err(Error::Transport)?;

        log::debug!("Response code: {}", res.status);

        // Regardless of the request being a success or not, there might be a nonce in the
        // response.
        if let Some(nonce) = res.header(REPLAY_NONCE) {
            self.nonce_pool.deposit(nonce);
        }

        let res = Response::classify(&url, res)?;
        log::trace!("Response body: {:?}", res.payload);

        Ok(res)
    }
}
