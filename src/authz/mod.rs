//! Authorizations and their challenges.

use crate::{
    api,
    error::{Error, Result},
    identifier::Identifier,
    trans::Response,
};

mod challenge;

pub use self::challenge::{Challenge, ChallengeStatus};
pub use crate::api::AuthorizationStatus;

/// The provider's record of progress toward proving control of one [`Identifier`].
///
/// Authorizations are never changed locally; fetch them again with
/// [`AcmeClient::fetch_authorization()`] to observe status changes.
///
/// [`AcmeClient::fetch_authorization()`]: crate::AcmeClient::fetch_authorization()
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Authorization {
    url: String,
    identifier: Identifier,
    status: AuthorizationStatus,
    expires: Option<String>,
    challenges: Vec<Challenge>,
    combinations: Option<Vec<Vec<usize>>>,
}

impl Authorization {
    /// Builds an authorization from a `new-authz` response or a fetch by URL.
    ///
    /// Direct fetches carry no `Location` header, so the request URL is used instead.
    pub(crate) fn from_response(res: &Response) -> Result<Self> {
        let api_auth = res.json::<api::Authorization>()?;

        let url = res.location().unwrap_or(&res.url).to_owned();

        let challenges: Vec<Challenge> = api_auth
            .challenges
            .into_iter()
            .map(|chall| Challenge::new(chall, None))
            .collect();

        if let Some(combinations) = &api_auth.combinations {
            if combinations
                .iter()
                .flatten()
                .any(|&idx| idx >= challenges.len())
            {
                return Err(Error::malformed(format!(
                    "authorization {url} combines challenges it doesn't offer"
                )));
            }
        }

        Ok(Authorization {
            url,
            identifier: Identifier::from(api_auth.identifier),
            status: api_auth.status,
            expires: api_auth.expires,
            challenges,
            combinations: api_auth.combinations,
        })
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn identifier(&self) -> &Identifier {
        &self.identifier
    }

    pub fn status(&self) -> AuthorizationStatus {
        self.status
    }

    /// Whether we actually need to do the authorization. This might not be needed if we have
    /// proven ownership of the identifier recently.
    pub fn need_challenge(&self) -> bool {
        !matches!(self.status, AuthorizationStatus::Valid)
    }

    /// The timestamp after which the server will consider this authorization invalid.
    pub fn expires(&self) -> Option<&str> {
        self.expires.as_deref()
    }

    pub fn challenges(&self) -> &[Challenge] {
        &self.challenges
    }

    /// Sets of challenges (by index) that together satisfy this authorization.
    ///
    /// When the provider sends no combinations, any single challenge is sufficient.
    pub fn combinations(&self) -> Option<&[Vec<usize>]> {
        self.combinations.as_deref()
    }

    /// Returns the first challenge of the given type.
    pub fn challenge(&self, kind: &str) -> Option<&Challenge> {
        self.challenges.iter().find(|c| c.kind() == kind)
    }

    /// Returns an `http-01` challenge, if one is present.
    pub fn http_challenge(&self) -> Option<&Challenge> {
        self.challenge("http-01")
    }

    /// Returns a `dns-01` challenge, if one is present.
    pub fn dns_challenge(&self) -> Option<&Challenge> {
        self.challenge("dns-01")
    }
}
