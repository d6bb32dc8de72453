//! JSON API payloads.
//!
//! Not intended to be used directly. Provided to aid debugging.

use std::fmt;

use serde::{Deserialize, Serialize};

mod account;
mod authorization;
mod certificate;
mod challenge;
mod directory;
mod identifier;
mod revocation;

pub use self::{
    account::{Account, Registration},
    authorization::{Authorization, AuthorizationStatus, NewAuthorization},
    certificate::NewCertificate,
    challenge::{Challenge, ChallengeResponse, ChallengeStatus},
    directory::DirectoryMeta,
    identifier::Identifier,
    revocation::Revocation,
};

/// Problem document returned by the provider alongside error status codes.
///
/// See [draft-ietf-acme-acme-01 §5.4].
///
/// [draft-ietf-acme-acme-01 §5.4]: https://datatracker.ietf.org/doc/html/draft-ietf-acme-acme-01#section-5.4
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Problem {
    #[serde(rename = "type")]
    pub _type: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
}

impl fmt::Display for Problem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.detail {
            Some(detail) => write!(f, "{}: {detail}", self._type),
            _ => write!(f, "{}", self._type),
        }
    }
}
