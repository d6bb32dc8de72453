use crate::{
    acc::Account,
    api,
    error::{Error, Result},
    trans::Response,
    util::sha256_base64url,
};

pub use crate::api::ChallengeStatus;

/// One way of proving control over an identifier, as offered in an [`Authorization`].
///
/// [`Authorization`]: crate::Authorization
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Challenge {
    url: Option<String>,
    api_challenge: api::Challenge,
}

impl Challenge {
    pub(crate) fn new(api_challenge: api::Challenge, fallback_url: Option<&str>) -> Self {
        let url = api_challenge
            .uri
            .clone()
            .or_else(|| fallback_url.map(ToOwned::to_owned));

        Challenge { url, api_challenge }
    }

    /// Builds a challenge from a challenge response, falling back to the request URL when the
    /// body doesn't name one.
    pub(crate) fn from_response(res: &Response) -> Result<Self> {
        let api_challenge = res.json::<api::Challenge>()?;
        Ok(Self::new(api_challenge, Some(&res.url)))
    }

    /// Challenge type, e.g. `http-01` or `dns-01`.
    pub fn kind(&self) -> &str {
        &self.api_challenge._type
    }

    /// URL the challenge response is posted to.
    pub fn url(&self) -> Option<&str> {
        self.url.as_deref()
    }

    pub fn status(&self) -> ChallengeStatus {
        self.api_challenge.status
    }

    /// Returns true if this challenge still needs a response.
    pub fn need_validate(&self) -> bool {
        matches!(self.api_challenge.status, ChallengeStatus::Pending)
    }

    /// Returns the token, a unique identifier of the challenge.
    pub fn token(&self) -> Option<&str> {
        self.api_challenge.token.as_deref()
    }

    /// Validation error reported by the provider, if any.
    pub fn error(&self) -> Option<&api::Problem> {
        self.api_challenge.error.as_ref()
    }

    /// Key authorization for an account key with the given thumbprint.
    ///
    /// A key authorization already echoed by the provider is returned unchanged; otherwise it is
    /// derived as `<token>.<thumbprint>`. Either way the same inputs always give the same value.
    pub fn key_authorization_for(&self, thumbprint: &str) -> Result<String> {
        if let Some(key_authorization) = &self.api_challenge.key_authorization {
            return Ok(key_authorization.clone());
        }

        let token = self.token().ok_or_else(|| {
            Error::Precondition(format!("{} challenge has no token", self.kind()))
        })?;

        Ok(format!("{token}.{thumbprint}"))
    }

    /// Key authorization proving `account` controls this challenge.
    pub fn key_authorization(&self, account: &Account) -> Result<String> {
        self.key_authorization_for(&account.thumbprint()?)
    }

    /// Path the `http-01` proof must be served under.
    ///
    /// ```text
    /// http://<domain-to-be-proven>/.well-known/acme-challenge/<token>
    /// ```
    pub fn http_path(&self) -> Option<String> {
        self.token()
            .map(|token| format!("/.well-known/acme-challenge/{token}"))
    }

    /// Value of the `TXT` record proving a `dns-01` challenge.
    ///
    /// ```text
    /// _acme-challenge.<domain-to-be-proven>.  TXT  <proof>
    /// ```
    pub fn dns_proof(&self, account: &Account) -> Result<String> {
        let key_authorization = self.key_authorization(account)?;
        Ok(sha256_base64url(&key_authorization))
    }

    /// Returns a reference to the challenge's API object.
    ///
    /// Useful for debugging.
    pub fn api_challenge(&self) -> &api::Challenge {
        &self.api_challenge
    }
}
