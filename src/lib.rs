//! Provisioning certificates from draft-era ACME (Automatic Certificate Management Environment)
//! providers, such as the Let's Encrypt v1 API.
//!
//! It speaks the resource-based protocol of the early ACME drafts: a directory of `new-reg`,
//! `new-authz`, `new-cert` and `revoke-cert` resources, with every request signed by an RSA
//! account key (RS256 JWS).
//!
//! # Usage
//!
//! 1. Create an [`AcmeClient`] for a [`DirectoryUrl`] and an [`AcmeKey`].
//! 2. [`register`] the key (or let the client do it on first use) and [`agree_to_terms`].
//! 3. [`authorize`] each identifier and prove control over it using one of the offered
//!    challenges, then [`accept_challenge`] and [`poll_authorization`].
//! 4. [`issue_certificate`] for a CSR covering the authorized identifiers.
//!
//! ## Examples
//!
//! Complete usage examples are provided in the source repository:
//!
//! - [`account-management` &rarr;](https://github.com/x52dev/acme-rfc8555/blob/main/demos/account-management.rs)
//! - [`http-01` &rarr;](https://github.com/x52dev/acme-rfc8555/blob/main/demos/http-01.rs)
//!
//! # Domain Ownership
//!
//! Most website TLS certificates tries to prove ownership/control over the domain they are issued
//! for. For ACME, this means proving you control either:
//!
//! - a server answering HTTP requests for that domain;
//! - the DNS server answering name lookups against the domain.
//!
//! To use this library, there are points in the flow where you would need to modify either the web
//! server or DNS server before progressing to get the certificate.
//!
//! See [`http_challenge`] and [`dns_challenge`].
//!
//! # Rate Limits
//!
//! The ACME API provider Let's Encrypt uses [rate limits] to ensure the API is not being abused. It
//! might be tempting to put the `delay` really low in [`poll_authorization`], but balance this
//! against the real risk of having access cut off.
//!
//! ## Use Staging For Development!
//!
//! Especially take care to use the Let's Encrypt staging environment for development where the rate
//! limits are more relaxed. See [`DirectoryUrl::LetsEncryptStaging`].
//!
//! [`register`]: AcmeClient::register()
//! [`agree_to_terms`]: AcmeClient::agree_to_terms()
//! [`authorize`]: AcmeClient::authorize()
//! [`accept_challenge`]: AcmeClient::accept_challenge()
//! [`poll_authorization`]: AcmeClient::poll_authorization()
//! [`issue_certificate`]: AcmeClient::issue_certificate()
//! [`http_challenge`]: Authorization::http_challenge()
//! [`dns_challenge`]: Authorization::dns_challenge()
//! [rate limits]: https://letsencrypt.org/docs/rate-limits

#![deny(rust_2018_idioms, nonstandard_style, future_incompatible)]

mod acc;
mod authz;
mod cert;
mod client;
mod dir;
mod error;
mod identifier;
mod jws;
mod req;
mod trans;
mod util;

pub mod api;

#[cfg(test)]
mod test;

pub use crate::{
    acc::{Account, AcmeKey, RevocationReason, DEFAULT_RSA_BITS},
    authz::{Authorization, AuthorizationStatus, Challenge, ChallengeStatus},
    cert::Certificate,
    client::{AccountUpdate, AcmeClient, Registration},
    dir::{Directory, DirectoryUrl, Resource},
    error::{Error, Result},
    identifier::Identifier,
    jws::Jwk,
    req::{HttpClient, HttpRequest, HttpResponse, Method, ReqwestClient},
};
