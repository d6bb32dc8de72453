use std::{sync::Arc, time::Duration};

use parking_lot::Mutex;
use time::{format_description::well_known::Rfc3339, OffsetDateTime, UtcOffset};
use zeroize::Zeroizing;

use crate::{
    acc::{Account, AcmeKey, RevocationReason},
    api,
    authz::{Authorization, Challenge},
    cert::Certificate,
    dir::{Directory, DirectoryUrl, Resource},
    error::{Error, Result},
    identifier::Identifier,
    req::{HttpClient, ReqwestClient},
    trans::Transport,
    util::base64url,
};

/// Outcome of [`AcmeClient::register()`].
#[derive(Debug, Clone, PartialEq)]
pub enum Registration {
    /// A new registration was created for the account key.
    Created(Account),

    /// The account key was already registered; holds the existing registration URL.
    Existing(String),
}

impl Registration {
    /// Registration URL, whether new or existing.
    pub fn url(&self) -> &str {
        match self {
            Registration::Created(acc) => acc.url(),
            Registration::Existing(url) => url,
        }
    }
}

/// Changes to apply to a registration with [`AcmeClient::update_account()`].
///
/// Fields left as `None` are not sent.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AccountUpdate {
    pub contact: Option<Vec<String>>,
    pub agreement: Option<String>,
}

#[derive(Debug, Default)]
struct RegistrationState {
    url: Option<String>,
    account: Option<Account>,
}

/// Entry point for accessing an ACME API.
///
/// The client resolves the provider's directory on first use, signs every mutating request with
/// the account key, and registers the key on demand the first time an operation needs a
/// registration.
///
/// Operations are meant to be driven as one sequential flow:
///
/// 1. [`register`] (optional, done implicitly otherwise)
/// 2. [`authorize`] an identifier
/// 3. [`accept_challenge`] once the proof is in place, then [`poll_authorization`]
/// 4. [`issue_certificate`]
///
/// Nothing is retried. Calls that POST to the provider must not be blindly repeated.
///
/// [`register`]: AcmeClient::register()
/// [`authorize`]: AcmeClient::authorize()
/// [`accept_challenge`]: AcmeClient::accept_challenge()
/// [`poll_authorization`]: AcmeClient::poll_authorization()
/// [`issue_certificate`]: AcmeClient::issue_certificate()
#[derive(Debug)]
pub struct AcmeClient<C = ReqwestClient> {
    directory_url: String,
    transport: Transport<C>,
    directory: Mutex<Option<Arc<Directory>>>,
    registration: Mutex<RegistrationState>,
}

impl AcmeClient<ReqwestClient> {
    /// Creates a client for the directory at `url` using the default HTTP transport.
    pub fn new(url: DirectoryUrl<'_>, acme_key: AcmeKey) -> Result<Self> {
        let client = ReqwestClient::new().map_err(Error::Transport)?;
        Ok(Self::with_client(url, acme_key, client))
    }
}

impl<C: HttpClient> AcmeClient<C> {
    /// Creates a client that performs its HTTP exchanges through `client`.
    pub fn with_client(url: DirectoryUrl<'_>, acme_key: AcmeKey, client: C) -> Self {
        AcmeClient {
            directory_url: url.to_url().to_owned(),
            transport: Transport::new(client, acme_key),
            directory: Mutex::new(None),
            registration: Mutex::new(RegistrationState::default()),
        }
    }

    /// Key used to sign requests.
    pub fn acme_key(&self) -> &AcmeKey {
        self.transport.acme_key()
    }

    /// Private key for this client's account, as PEM.
    pub fn acme_private_key_pem(&self) -> Result<Zeroizing<String>> {
        self.transport.acme_key().to_pem()
    }

    /// Registration URL, if one is known already.
    pub fn registration_url_if_known(&self) -> Option<String> {
        self.registration.lock().url.clone()
    }

    /// Resumes a registration made earlier, skipping the implicit `new-reg` call.
    pub fn set_registration_url(&self, url: String) {
        self.registration.lock().url = Some(url);
    }

    /// Returns the provider's directory, fetching it on first use.
    ///
    /// A failed fetch is not cached.
    pub async fn directory(&self) -> Result<Arc<Directory>> {
        let cached = self.directory.lock().clone();
        if let Some(dir) = cached {
            return Ok(dir);
        }

        log::debug!("Fetch directory: {}", self.directory_url);
        let res = self
            .transport
            .get(&self.directory_url)
            .await
            .map_err(|err| match err {
                Error::MalformedResponse { message, body } => Error::protocol(
                    "directory",
                    format!("{message}; body: {}", body.unwrap_or_default()),
                ),
                err => err,
            })?;
        let dir = Arc::new(Directory::from_response(&res)?);

        let mut cached = self.directory.lock();
        Ok(Arc::clone(cached.get_or_insert(dir)))
    }

    /// Registers the account key with the provider.
    ///
    /// If the key is registered already, the provider answers `409 Conflict` and the existing
    /// registration URL is returned as [`Registration::Existing`].
    pub async fn register(&self, contact: Option<Vec<String>>) -> Result<Registration> {
        const RESOURCE: &str = "new-reg";

        let dir = self.directory().await?;
        let url = dir.url(Resource::NewRegistration)?;

        let res = self
            .transport
            .post(url, &api::Registration::new(contact))
            .await?;

        match res.status {
            201 => {
                let acc = Account::from_response(&res, None, self.acme_key().jwk())?;
                log::debug!("Registered account: {}", acc.url());

                let mut state = self.registration.lock();
                state.url = Some(acc.url().to_owned());
                state.account = Some(acc.clone());

                Ok(Registration::Created(acc))
            }

            409 => {
                let location = res.location().ok_or_else(|| {
                    Error::unexpected_status(RESOURCE, res.status, res.problem().as_ref())
                })?;

                reqwest::Url::parse(location).map_err(|err| {
                    Error::malformed(format!(
                        "existing registration location {location:?} is not a URL: {err}"
                    ))
                })?;
                let location = location.to_owned();

                log::debug!("Account already registered: {location}");
                self.registration.lock().url = Some(location.clone());

                Ok(Registration::Existing(location))
            }

            status => Err(Error::unexpected_status(
                RESOURCE,
                status,
                res.problem().as_ref(),
            )),
        }
    }

    /// Returns the registration, fetching it with an empty update when it isn't known yet.
    pub async fn account(&self) -> Result<Account> {
        let cached = self.registration.lock().account.clone();
        if let Some(acc) = cached {
            return Ok(acc);
        }

        self.update_account(AccountUpdate::default()).await
    }

    /// Updates the registration, registering first if necessary.
    pub async fn update_account(&self, update: AccountUpdate) -> Result<Account> {
        let url = self.registration_url().await?;

        let payload = api::Registration::update(update.contact, update.agreement);
        let res = self
            .transport
            .post(&url, &payload)
            .await?
            .expect_status("reg", &[200, 202])?;

        let mut acc = Account::from_response(&res, Some(&url), self.acme_key().jwk())?;

        let mut state = self.registration.lock();
        if let Some(previous) = &state.account {
            acc.inherit_terms(previous);
        }
        state.account = Some(acc.clone());

        Ok(acc)
    }

    /// Agrees to the terms of service advertised at registration or in the directory.
    pub async fn agree_to_terms(&self) -> Result<Account> {
        let acc = self.account().await?;

        let terms = match acc.terms_of_service() {
            Some(terms) => terms.to_owned(),
            None => self
                .directory()
                .await?
                .terms_of_service()
                .ok_or_else(|| {
                    Error::Precondition("provider advertises no terms of service".to_owned())
                })?
                .to_owned(),
        };

        log::debug!("Agreeing to terms: {terms}");
        self.update_account(AccountUpdate {
            agreement: Some(terms),
            ..Default::default()
        })
        .await
    }

    /// Asks the provider for a new authorization of `identifier`.
    pub async fn authorize(&self, identifier: &Identifier) -> Result<Authorization> {
        let dir = self.directory().await?;
        let url = dir.url(Resource::NewAuthorization)?;

        // an unregistered key can't hold authorizations
        self.registration_url().await?;

        let payload = api::NewAuthorization::new(api::Identifier::from(identifier));
        let res = self
            .transport
            .post(url, &payload)
            .await?
            .expect_status("new-authz", &[201])?;

        Authorization::from_response(&res)
    }

    /// Fetches an authorization by URL.
    pub async fn fetch_authorization(&self, url: &str) -> Result<Authorization> {
        let res = self.transport.get(url).await?.expect_status("authz", &[200])?;
        Authorization::from_response(&res)
    }

    /// Fetches the authorization at `url` until it leaves the pending and processing states,
    /// waiting `delay` between attempts.
    pub async fn poll_authorization(&self, url: &str, delay: Duration) -> Result<Authorization> {
        loop {
            let authz = self.fetch_authorization(url).await?;

            if authz.status().is_settled() {
                return Ok(authz);
            }

            log::trace!("Authorization {url} is {:?}", authz.status());
            tokio::time::sleep(delay).await;
        }
    }

    /// Tells the provider to validate `challenge`.
    ///
    /// The proof must be in place before this call.
    pub async fn accept_challenge(&self, challenge: &Challenge) -> Result<Challenge> {
        let url = challenge.url().ok_or_else(|| {
            Error::Precondition(format!("{} challenge has no URL", challenge.kind()))
        })?;

        if challenge.token().is_none() {
            return Err(Error::Precondition(format!(
                "{} challenge has no token",
                challenge.kind()
            )));
        }

        let acc = self.account().await?;
        let key_authorization = challenge.key_authorization(&acc)?;

        let payload = api::ChallengeResponse::new(challenge.kind(), key_authorization);
        let res = self
            .transport
            .post(url, &payload)
            .await?
            .expect_status("challenge", &[202])?;

        Challenge::from_response(&res)
    }

    /// Fetches a challenge by URL.
    pub async fn fetch_challenge(&self, url: &str) -> Result<Challenge> {
        let res = self
            .transport
            .get(url)
            .await?
            .expect_status("challenge", &[200])?;

        Challenge::from_response(&res)
    }

    /// Requests a certificate for a DER encoded CSR, valid from `not_before` until `not_after`.
    ///
    /// Arguments are checked before anything is sent.
    pub async fn issue_certificate(
        &self,
        csr_der: &[u8],
        not_before: OffsetDateTime,
        not_after: OffsetDateTime,
    ) -> Result<Certificate> {
        if csr_der.is_empty() {
            return Err(Error::Precondition("CSR is empty".to_owned()));
        }

        if not_after <= not_before {
            return Err(Error::Precondition(
                "notAfter must be later than notBefore".to_owned(),
            ));
        }

        let payload = api::NewCertificate::new(
            base64url(csr_der),
            format_timestamp(not_before)?,
            format_timestamp(not_after)?,
        );

        let dir = self.directory().await?;
        let url = dir.url(Resource::NewCertificate)?;

        self.registration_url().await?;

        let res = self
            .transport
            .post(url, &payload)
            .await?
            .expect_status("new-cert", &[201])?;

        Certificate::from_response(&res)
    }

    /// Fetches a certificate by URL.
    pub async fn fetch_certificate(&self, url: &str) -> Result<Certificate> {
        let res = self.transport.get(url).await?.expect_status("cert", &[200])?;
        Certificate::from_response(&res)
    }

    /// Revoke a certificate for the reason given.
    pub async fn revoke_certificate(
        &self,
        cert: &Certificate,
        reason: RevocationReason,
    ) -> Result<()> {
        // convert to base64url of the DER (which is not PEM).
        let cert_der = cert
            .certificate_chain()?
            .into_iter()
            .next()
            .filter(|der| !der.is_empty())
            .ok_or_else(|| Error::Precondition("certificate has no content".to_owned()))?;

        let revocation = api::Revocation::new(base64url(&cert_der), reason.code());

        let dir = self.directory().await?;
        let url = dir.url(Resource::RevokeCertificate)?;

        self.registration_url().await?;

        self.transport
            .post(url, &revocation)
            .await?
            .expect_status("revoke-cert", &[200])?;

        Ok(())
    }

    /// Known registration URL, registering the key first if there is none.
    async fn registration_url(&self) -> Result<String> {
        if let Some(url) = self.registration_url_if_known() {
            return Ok(url);
        }

        log::debug!("No registration known, registering account key");
        let reg = self.register(None).await?;

        Ok(reg.url().to_owned())
    }
}

/// RFC 3339 in UTC, e.g. `2016-01-01T00:00:00Z`.
fn format_timestamp(ts: OffsetDateTime) -> Result<String> {
    ts.to_offset(UtcOffset::UTC)
        .format(&Rfc3339)
        .map_err(|err| Error::Precondition(format!("unrepresentable timestamp {ts}: {err}")))
}
