//! HTTP transport seam.

use std::{future::Future, time::Duration};

use reqwest::header::{HeaderMap, CONTENT_TYPE};

pub use reqwest::Method;

pub(crate) const JOSE_CONTENT_TYPE: &str = "application/jose+json";

/// A request to be performed against the ACME provider.
#[derive(Debug, Clone)]
pub struct HttpRequest {
    /// The HTTP method to use.
    pub method: Method,

    /// The complete URL to send the request to.
    pub url: String,

    /// The `Content-Type` header to pass along with `body`.
    pub content_type: Option<&'static str>,

    /// Request body, if any.
    pub body: Option<Vec<u8>>,
}

impl HttpRequest {
    pub(crate) fn new(method: Method, url: &str) -> Self {
        HttpRequest {
            method,
            url: url.to_owned(),
            content_type: None,
            body: None,
        }
    }

    pub(crate) fn with_body(mut self, content_type: &'static str, body: Vec<u8>) -> Self {
        self.content_type = Some(content_type);
        self.body = Some(body);
        self
    }
}

/// A response as received from the transport, before any classification.
#[derive(Debug, Clone, Default)]
pub struct HttpResponse {
    pub status: u16,

    /// Response headers, looked up case-insensitively.
    pub headers: HeaderMap,

    pub body: Vec<u8>,
}

impl HttpResponse {
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|val| val.to_str().ok())
    }

    pub fn content_type(&self) -> Option<&str> {
        self.headers
            .get(CONTENT_TYPE)
            .and_then(|val| val.to_str().ok())
    }
}

/// Performs HTTP exchanges on behalf of the client.
///
/// Implementations must support arbitrary methods, headers and bodies. Timeouts are the
/// responsibility of the implementation.
pub trait HttpClient: Send + Sync {
    fn send(
        &self,
        req: HttpRequest,
    ) -> impl Future<Output = eyre::Result<HttpResponse>> + Send;
}

/// Default [`HttpClient`] backed by `reqwest`.
#[derive(Debug, Clone)]
pub struct ReqwestClient {
    client: reqwest::Client,
}

impl ReqwestClient {
    const USER_AGENT: &'static str = concat!("acme-draft-client/", env!("CARGO_PKG_VERSION"));

    /// Constructs a client with 30 second connect and request timeouts.
    pub fn new() -> eyre::Result<Self> {
        Self::with_timeout(Duration::from_secs(30))
    }

    pub fn with_timeout(timeout: Duration) -> eyre::Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent(Self::USER_AGENT)
            .connect_timeout(timeout)
            .timeout(timeout)
            .build()?;

        Ok(Self { client })
    }

    /// Wraps an already configured `reqwest` client.
    pub fn from_client(client: reqwest::Client) -> Self {
        Self { client }
    }
}

impl HttpClient for ReqwestClient {
    async fn send(&self, req: HttpRequest) -> eyre::Result<HttpResponse> {
        let mut builder = self.client.request(req.method, &req.url);

        if let Some(content_type) = req.content_type {
            builder = builder.header(CONTENT_TYPE, content_type);
        }

        if let Some(body) = req.body {
            builder = builder.body(body);
        }

        let res = builder.send().await?;

        let status = res.status().as_u16();
        let headers = res.headers().clone();
        let body = res.bytes().await?.to_vec();

        Ok(HttpResponse {
            status,
            headers,
            body,
        })
    }
}

/// Returns true for `application/json`, `application/problem+json` and other JSON variants.
pub(crate) fn is_json_content_type(content_type: &str) -> bool {
    let essence = content_type
        .split(';')
        .next()
        .unwrap_or_default()
        .trim()
        .to_ascii_lowercase();

    match essence.strip_prefix("application/") {
        Some(subtype) => subtype.ends_with("json"),
        None => false,
    }
}

/// Finds the target of the first `Link` header entry with relation `rel`.
///
/// Accepts `<url>;rel="name"` and `<url>; rel=name`, several comma separated entries per header
/// and repeated headers.
pub(crate) fn find_link(headers: &HeaderMap, rel: &str) -> Option<String> {
    headers
        .get_all(reqwest::header::LINK)
        .iter()
        .filter_map(|val| val.to_str().ok())
        .flat_map(parse_link_header)
        .find(|(_, link_rel)| link_rel.split_whitespace().any(|r| r == rel))
        .map(|(url, _)| url)
}

fn parse_link_header(value: &str) -> Vec<(String, String)> {
    let mut links = Vec::new();
    let mut rest = value;

    while let Some(start) = rest.find('<') {
        let Some(end) = rest[start..].find('>') else {
            break;
        };

        let url = &rest[start + 1..start + end];
        rest = &rest[start + end + 1..];

        // params run until the next entry
        let params_end = rest.find('<').unwrap_or(rest.len());
        let params = &rest[..params_end];

        let rel = params
            .split(';')
            .filter_map(|param| param.split_once('='))
            .find(|(name, _)| name.trim().eq_ignore_ascii_case("rel"))
            .map(|(_, val)| val.trim().trim_end_matches(',').trim().trim_matches('"'));

        if let Some(rel) = rel {
            links.push((url.to_owned(), rel.to_owned()));
        }

        rest = &rest[params_end..];
    }

    links
}

#[cfg(test)]
mod tests {
    use reqwest::header::{HeaderValue, LINK};

    use super::*;

    #[test]
    fn test_json_content_types() {
        assert!(is_json_content_type("application/json"));
        assert!(is_json_content_type("application/problem+json"));
        assert!(is_json_content_type("application/json; charset=utf-8"));
        assert!(is_json_content_type("Application/JSON"));
        assert!(!is_json_content_type("application/pkix-cert"));
        assert!(!is_json_content_type("text/json"));
        assert!(!is_json_content_type("application/pem-certificate-chain"));
    }

    #[test]
    fn test_find_link() {
        let mut headers = HeaderMap::new();
        headers.append(
            LINK,
            HeaderValue::from_static(r#"<https://x/acme/new-authz>;rel="next""#),
        );
        headers.append(
            LINK,
            HeaderValue::from_static(
                r#"<https://x/issuer>; rel=up, <https://x/terms>; rel="terms-of-service""#,
            ),
        );

        assert_eq!(
            find_link(&headers, "terms-of-service").as_deref(),
            Some("https://x/terms")
        );
        assert_eq!(find_link(&headers, "up").as_deref(), Some("https://x/issuer"));
        assert_eq!(
            find_link(&headers, "next").as_deref(),
            Some("https://x/acme/new-authz")
        );
        assert_eq!(find_link(&headers, "alternate"), None);
    }

    #[test]
    fn test_find_link_without_space() {
        let mut headers = HeaderMap::new();
        headers.insert(
            LINK,
            HeaderValue::from_static(r#"<https://x/terms/v1.pdf>;rel="terms-of-service""#),
        );

        assert_eq!(
            find_link(&headers, "terms-of-service").as_deref(),
            Some("https://x/terms/v1.pdf")
        );
    }
}
