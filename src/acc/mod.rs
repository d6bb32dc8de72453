use crate::{
    api,
    error::{Error, Result},
    jws::Jwk,
    trans::{Payload, Response},
};

mod acme_key;

pub use self::acme_key::{AcmeKey, DEFAULT_RSA_BITS};

/// Registration with an ACME provider.
///
/// Accounts are returned by [`AcmeClient::register()`] and [`AcmeClient::account()`]. They are
/// plain values: updating the registration returns a new `Account`.
///
/// [`AcmeClient::register()`]: crate::AcmeClient::register()
/// [`AcmeClient::account()`]: crate::AcmeClient::account()
#[derive(Debug, Clone, PartialEq)]
pub struct Account {
    url: String,
    terms_of_service: Option<String>,
    key: Jwk,
    api_account: api::Account,
}

impl Account {
    /// Builds an account from a `new-reg` or `reg` response.
    ///
    /// The account URL comes from the `Location` header. Responses to updates may omit it, in
    /// which case `fallback_url` (the registration URL the update was sent to) is used.
    pub(crate) fn from_response(
        res: &Response,
        fallback_url: Option<&str>,
        local_key: &Jwk,
    ) -> Result<Self> {
        let url = res
            .location()
            .or(fallback_url)
            .ok_or_else(|| Error::malformed("registration response without Location header"))?
            .to_owned();

        let api_account = match &res.payload {
            Payload::Empty => api::Account::default(),
            Payload::Json(_) => res.json::<api::Account>()?,
            Payload::Raw(_) => {
                return Err(Error::malformed(
                    "registration response body is not JSON",
                ))
            }
        };

        // providers echo the registered key; fall back to ours if it is absent or not RSA
        let key = api_account
            .key
            .clone()
            .and_then(|key| serde_json::from_value::<Jwk>(key).ok())
            .unwrap_or_else(|| local_key.clone());

        Ok(Account {
            url,
            terms_of_service: res.link("terms-of-service"),
            key,
            api_account,
        })
    }

    /// Registration URL of this account.
    pub fn url(&self) -> &str {
        &self.url
    }

    /// Terms of service advertised by the provider at registration time.
    pub fn terms_of_service(&self) -> Option<&str> {
        self.terms_of_service.as_deref()
    }

    /// Terms of service the account has agreed to, if any.
    pub fn agreement(&self) -> Option<&str> {
        self.api_account.agreement.as_deref()
    }

    /// Returns true if the account agreed to the terms currently advertised.
    pub fn has_agreed_to_terms(&self) -> bool {
        match (self.agreement(), self.terms_of_service()) {
            (Some(agreement), Some(terms)) => agreement == terms,
            (Some(_), None) => true,
            (None, _) => false,
        }
    }

    pub fn contact(&self) -> &[String] {
        self.api_account.contact.as_deref().unwrap_or_default()
    }

    /// Public key the account is registered with.
    pub fn key(&self) -> &Jwk {
        &self.key
    }

    /// Account key thumbprint, as used in key authorizations.
    pub fn thumbprint(&self) -> Result<String> {
        self.key.thumbprint()
    }

    /// Returns a reference to the account's API object.
    ///
    /// Useful for debugging.
    pub fn api_account(&self) -> &api::Account {
        &self.api_account
    }

    /// Keeps the terms link from an earlier response; `reg` responses don't always repeat it.
    pub(crate) fn inherit_terms(&mut self, previous: &Account) {
        if self.terms_of_service.is_none() {
            self.terms_of_service = previous.terms_of_service.clone();
        }
    }
}

/// Enumeration of reasons for revocation.
///
/// The reason codes are taken from [RFC 5280 §5.3.1].
///
/// [RFC 5280 §5.3.1]: https://tools.ietf.org/html/rfc5280#section-5.3.1
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RevocationReason {
    Unspecified = 0,
    KeyCompromise = 1,
    CACompromise = 2,
    AffiliationChanged = 3,
    Superseded = 4,
    CessationOfOperation = 5,
    CertificateHold = 6,
    // value 7 is not used
    RemoveFromCRL = 8,
    PrivilegeWithdrawn = 9,
    AACompromise = 10,
}

impl RevocationReason {
    /// Reason code to send, if any.
    pub(crate) fn code(self) -> Option<usize> {
        match self {
            // > the reason code CRL entry extension SHOULD be absent instead of
            // > using the unspecified (0) reasonCode value
            // see <https://datatracker.ietf.org/doc/html/rfc5280#section-5.3.1>
            RevocationReason::Unspecified => None,

            reason => Some(reason as usize),
        }
    }
}

#[cfg(test)]
mod tests {
    use reqwest::header::{HeaderMap, HeaderValue, LINK, LOCATION};

    use super::*;

    fn response(headers: HeaderMap, payload: Payload) -> Response {
        Response {
            url: "https://x/acme/new-reg".to_owned(),
            status: 201,
            headers,
            content_type: Some("application/json".to_owned()),
            payload,
        }
    }

    fn local_key() -> Jwk {
        Jwk::new("AQAB".to_owned(), "bG9jYWw".to_owned())
    }

    #[test]
    fn test_account_from_registration() {
        let mut headers = HeaderMap::new();
        headers.insert(LOCATION, HeaderValue::from_static("https://x/acme/reg/1"));
        headers.insert(
            LINK,
            HeaderValue::from_static(r#"<https://x/terms>;rel="terms-of-service""#),
        );

        let payload = Payload::Json(serde_json::json!({
            "id": 1,
            "key": { "kty": "RSA", "n": "c2VydmVy", "e": "AQAB" },
            "contact": ["mailto:foo@bar.com"],
        }));

        let acc = Account::from_response(&response(headers, payload), None, &local_key()).unwrap();

        assert_eq!(acc.url(), "https://x/acme/reg/1");
        assert_eq!(acc.terms_of_service(), Some("https://x/terms"));
        assert_eq!(acc.contact(), ["mailto:foo@bar.com".to_owned()]);
        assert_eq!(acc.key().n, "c2VydmVy");
        assert!(!acc.has_agreed_to_terms());
    }

    #[test]
    fn test_account_update_uses_fallback_url() {
        let payload = Payload::Json(serde_json::json!({
            "agreement": "https://x/terms",
        }));

        let acc = Account::from_response(
            &response(HeaderMap::new(), payload),
            Some("https://x/acme/reg/1"),
            &local_key(),
        )
        .unwrap();

        assert_eq!(acc.url(), "https://x/acme/reg/1");
        assert_eq!(acc.key(), &local_key());
        assert!(acc.has_agreed_to_terms());
    }

    #[test]
    fn test_account_without_location() {
        let err = Account::from_response(
            &response(HeaderMap::new(), Payload::Empty),
            None,
            &local_key(),
        )
        .unwrap_err();

        assert!(matches!(err, Error::MalformedResponse { .. }));
    }
}
