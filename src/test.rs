#![allow(clippy::trivial_regex)]

use std::{
    collections::VecDeque,
    convert::Infallible,
    future::ready,
    net::TcpListener,
    sync::{
        atomic::{AtomicUsize, Ordering},
        Arc, OnceLock,
    },
};

use actix_http::{
    body::BoxBody,
    header::{HeaderName, HeaderValue, CONTENT_TYPE, LINK, LOCATION},
    HttpService, Method, Request, Response, StatusCode,
};
use actix_server::{Server, ServerHandle};
use parking_lot::Mutex;
use regex::Regex;

use crate::{
    acc::AcmeKey,
    req::{HttpClient, HttpRequest, HttpResponse},
};

static RE_URL: OnceLock<Regex> = OnceLock::new();

fn re_url() -> &'static Regex {
    RE_URL.get_or_init(|| regex::Regex::new("<URL>").unwrap())
}

/// Account key shared by the tests; generating RSA keys is slow.
pub fn test_key() -> AcmeKey {
    AcmeKey::from_pem(include_str!("../testdata/account-key.pem")).unwrap()
}

/// DER bytes served as the issued certificate.
pub const CERT_DER: &[u8] = &[0x30, 0x82, 0x01, 0x0a];

#[derive(Debug, Default)]
struct ServerState {
    nonces: AtomicUsize,
    requests: Mutex<Vec<String>>,
}

pub struct TestServer {
    pub url: String,
    pub dir_url: String,
    state: Arc<ServerState>,
    handle: ServerHandle,
}

impl TestServer {
    /// Directory URL variant served under `/<name>`.
    pub fn dir_url_named(&self, name: &str) -> String {
        format!("{}/{name}", self.url)
    }

    /// Requests received so far, as `"<METHOD> <path>"`.
    pub fn requests(&self) -> Vec<String> {
        self.state.requests.lock().clone()
    }

    pub fn count_requests(&self, req: &str) -> usize {
        self.requests().iter().filter(|seen| *seen == req).count()
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        drop(self.handle.stop(false));
    }
}

fn json_response(status: StatusCode, body: &str, url: &str) -> Response<BoxBody> {
    Response::build(status)
        .insert_header((CONTENT_TYPE, "application/json"))
        .body(re_url().replace_all(body, url).into_owned())
        .map_into_boxed_body()
}

fn with_header(
    mut res: Response<BoxBody>,
    name: HeaderName,
    value: &str,
    url: &str,
) -> Response<BoxBody> {
    let value = re_url().replace_all(value, url);
    res.headers_mut()
        .append(name, HeaderValue::from_str(&value).unwrap());
    res
}

fn get_directory(url: &str) -> Response<BoxBody> {
    const BODY: &str = r#"{
    "key-change": "<URL>/acme/key-change",
    "new-authz": "<URL>/acme/new-authz",
    "new-cert": "<URL>/acme/new-cert",
    "new-reg": "<URL>/acme/new-reg",
    "revoke-cert": "<URL>/acme/revoke-cert",
    "meta": {
        "terms-of-service": "<URL>/terms",
        "caa-identities": ["testdir.org"]
    }
    }"#;

    json_response(StatusCode::OK, BODY, url)
}

fn get_directory_long(url: &str) -> Response<BoxBody> {
    const BODY: &str = r#"{
    "new-authorization": "<URL>/acme/new-authz",
    "new-certificate": "<URL>/acme/new-cert",
    "new-registration": "<URL>/acme/new-reg",
    "revoke-certificate": "<URL>/acme/revoke-cert"
    }"#;

    json_response(StatusCode::OK, BODY, url)
}

fn get_directory_existing(url: &str) -> Response<BoxBody> {
    const BODY: &str = r#"{
    "new-authz": "<URL>/acme/new-authz",
    "new-cert": "<URL>/acme/new-cert",
    "new-reg": "<URL>/acme/new-reg-existing",
    "revoke-cert": "<URL>/acme/revoke-cert"
    }"#;

    json_response(StatusCode::OK, BODY, url)
}

fn post_new_reg(url: &str) -> Response<BoxBody> {
    const BODY: &str = r#"{
    "id": 1,
    "contact": [
        "mailto:foo@bar.com"
    ],
    "initialIp": "90.171.37.12",
    "createdAt": "2016-01-01T17:15:40Z"
    }"#;

    let res = json_response(StatusCode::CREATED, BODY, url);
    let res = with_header(res, LOCATION, "<URL>/acme/reg/1", url);
    with_header(res, LINK, r#"<<URL>/terms>;rel="terms-of-service""#, url)
}

fn post_new_reg_existing(url: &str) -> Response<BoxBody> {
    const BODY: &str = r#"{
    "type": "urn:acme:error:malformed",
    "detail": "Registration key is already in use",
    "status": 409
    }"#;

    let res = Response::build(StatusCode::CONFLICT)
        .insert_header((CONTENT_TYPE, "application/problem+json"))
        .body(BODY)
        .map_into_boxed_body();

    with_header(res, LOCATION, "<URL>/acme/reg/1", url)
}

fn post_reg(url: &str) -> Response<BoxBody> {
    const BODY: &str = r#"{
    "id": 1,
    "contact": [
        "mailto:foo@bar.com"
    ],
    "agreement": "<URL>/terms",
    "createdAt": "2016-01-01T17:15:40Z"
    }"#;

    json_response(StatusCode::ACCEPTED, BODY, url)
}

const AUTHZ_BODY: &str = r#"{
    "identifier": {
        "type": "dns",
        "value": "example.org"
    },
    "status": "<STATUS>",
    "expires": "2016-01-09T08:26:43Z",
    "challenges": [
    {
        "type": "http-01",
        "status": "<STATUS>",
        "uri": "<URL>/acme/challenge/abc/1",
        "token": "MUi-gqeOJdRkSb_YR2eaMxQBqf6al8dgt_dOttSWb0w"
    },
    {
        "type": "dns-01",
        "status": "pending",
        "uri": "<URL>/acme/challenge/abc/2",
        "token": "RRo2ZcXAEqxKvMH8RGcATjSK1KknLEUmauwfQ5i3gG8"
    }
    ],
    "combinations": [[0], [1]]
}"#;

fn post_new_authz(url: &str) -> Response<BoxBody> {
    let body = AUTHZ_BODY.replace("<STATUS>", "pending");
    let res = json_response(StatusCode::CREATED, &body, url);
    with_header(res, LOCATION, "<URL>/acme/authz/abc", url)
}

fn get_authz(url: &str) -> Response<BoxBody> {
    let body = AUTHZ_BODY.replace("<STATUS>", "valid");
    json_response(StatusCode::OK, &body, url)
}

const CHALLENGE_BODY: &str = r#"{
    "type": "http-01",
    "status": "<STATUS>",
    "uri": "<URL>/acme/challenge/abc/1",
    "token": "MUi-gqeOJdRkSb_YR2eaMxQBqf6al8dgt_dOttSWb0w"
}"#;

fn post_challenge(url: &str) -> Response<BoxBody> {
    let body = CHALLENGE_BODY.replace("<STATUS>", "pending");
    json_response(StatusCode::ACCEPTED, &body, url)
}

fn get_challenge(url: &str) -> Response<BoxBody> {
    let body = CHALLENGE_BODY.replace("<STATUS>", "valid");
    json_response(StatusCode::OK, &body, url)
}

fn certificate(status: StatusCode, url: &str) -> Response<BoxBody> {
    let res = Response::build(status)
        .insert_header((CONTENT_TYPE, "application/pkix-cert"))
        .body(CERT_DER)
        .map_into_boxed_body();

    with_header(res, LINK, r#"<<URL>/acme/issuer-cert>;rel="up""#, url)
}

fn post_new_cert(url: &str) -> Response<BoxBody> {
    let res = certificate(StatusCode::CREATED, url);
    with_header(res, LOCATION, "<URL>/acme/cert/1", url)
}

fn route_request(req: Request, url: &str, state: &ServerState) -> Response<BoxBody> {
    state
        .requests
        .lock()
        .push(format!("{} {}", req.method(), req.path()));

    let mut res = match (req.method(), req.path()) {
        (&Method::HEAD, _) => Response::build(StatusCode::NO_CONTENT)
            .finish()
            .map_into_boxed_body(),

        (&Method::GET, "/directory") => get_directory(url),
        (&Method::GET, "/directory-long") => get_directory_long(url),
        (&Method::GET, "/directory-existing") => get_directory_existing(url),
        (&Method::GET, "/directory-empty") => json_response(StatusCode::OK, "{}", url),

        (&Method::POST, "/acme/new-reg") => post_new_reg(url),
        (&Method::POST, "/acme/new-reg-existing") => post_new_reg_existing(url),
        (&Method::POST, "/acme/reg/1") => post_reg(url),
        (&Method::POST, "/acme/new-authz") => post_new_authz(url),
        (&Method::GET, "/acme/authz/abc") => get_authz(url),
        (&Method::POST, "/acme/challenge/abc/1") => post_challenge(url),
        (&Method::GET, "/acme/challenge/abc/1") => get_challenge(url),
        (&Method::POST, "/acme/new-cert") => post_new_cert(url),
        (&Method::GET, "/acme/cert/1") => certificate(StatusCode::OK, url),
        (&Method::POST, "/acme/revoke-cert") => Response::ok().map_into_boxed_body(),

        (_, _) => Response::build(StatusCode::NOT_FOUND)
            .finish()
            .map_into_boxed_body(),
    };

    let nonce = state.nonces.fetch_add(1, Ordering::SeqCst);
    res.headers_mut().insert(
        HeaderName::from_static("replay-nonce"),
        HeaderValue::from_str(&format!("nonce-{nonce}")).unwrap(),
    );

    res
}

pub fn with_directory_server() -> TestServer {
    let lst = TcpListener::bind("127.0.0.1:0").unwrap();
    let port = lst.local_addr().unwrap().port();

    let url = format!("http://127.0.0.1:{port}");
    let dir_url = format!("{url}/directory");

    let state = Arc::new(ServerState::default());

    let server = Server::build()
        .listen("acme", lst, {
            let url = url.clone();
            let state = Arc::clone(&state);

            move || {
                let url = url.clone();
                let state = Arc::clone(&state);

                HttpService::build()
                    .finish(move |req| {
                        ready(Ok::<_, Infallible>(route_request(req, &url, &state)))
                    })
                    .tcp()
            }
        })
        .unwrap()
        .workers(1)
        .run();

    let handle = server.handle();

    tokio::spawn(server);

    TestServer {
        url,
        dir_url,
        state,
        handle,
    }
}

/// [`HttpClient`] answering from a script of canned responses and keeping every request.
///
/// Clones share the script and the request log.
#[derive(Debug, Clone, Default)]
pub struct ScriptedClient {
    responses: Arc<Mutex<VecDeque<HttpResponse>>>,
    requests: Arc<Mutex<Vec<HttpRequest>>>,
}

impl ScriptedClient {
    pub fn respond(self, status: u16, headers: &[(&str, &str)], body: &str) -> Self {
        let headers = headers
            .iter()
            .map(|(name, val)| {
                (
                    reqwest::header::HeaderName::from_bytes(name.as_bytes()).unwrap(),
                    reqwest::header::HeaderValue::from_str(val).unwrap(),
                )
            })
            .collect();

        self.responses.lock().push_back(HttpResponse {
            status,
            headers,
            body: body.as_bytes().to_vec(),
        });

        self
    }

    pub fn requests(&self) -> Vec<HttpRequest> {
        self.requests.lock().clone()
    }
}

/// Decoded payload of a signed request.
pub fn jws_payload(req: &HttpRequest) -> serde_json::Value {
    use base64::prelude::*;

    let jws: serde_json::Value = serde_json::from_slice(req.body.as_deref().unwrap()).unwrap();
    let payload = BASE64_URL_SAFE_NO_PAD
        .decode(jws["payload"].as_str().unwrap())
        .unwrap();

    serde_json::from_slice(&payload).unwrap()
}

impl HttpClient for ScriptedClient {
    async fn send(&self, req: HttpRequest) -> eyre::Result<HttpResponse> {
        self.requests.lock().push(req);

        self.responses
            .lock()
            .pop_front()
            .ok_or_else(|| eyre::eyre!("no response scripted"))
    }
}

#[tokio::test]
pub async fn test_make_directory() {
    let server = with_directory_server();
    let res = reqwest::get(&server.dir_url).await.unwrap();
    assert!(res.status().is_success());
    assert!(res.headers().contains_key("replay-nonce"));
    assert_eq!(server.requests(), ["GET /directory"]);
}
