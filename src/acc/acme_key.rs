use pkcs8::{DecodePrivateKey as _, EncodePrivateKey as _, LineEnding};
use rsa::{
    pkcs1::DecodeRsaPrivateKey as _,
    pkcs1v15::SigningKey,
    signature::{SignatureEncoding as _, Signer as _},
    traits::PublicKeyParts as _,
    RsaPrivateKey,
};
use sha2::Sha256;
use zeroize::Zeroizing;

use crate::{
    error::{Error, Result},
    jws::Jwk,
    util::base64url,
};

/// Default modulus size used by [`AcmeKey::generate_default`].
pub const DEFAULT_RSA_BITS: usize = 2048;

/// RSA account key used to sign every request made to the ACME API.
#[derive(Clone, Debug)]
pub struct AcmeKey {
    private_key: RsaPrivateKey,
    signing_key: SigningKey<Sha256>,
    jwk: Jwk,
}

impl AcmeKey {
    /// Generates a fresh RSA key with a modulus of `bits` bits.
    pub fn generate(bits: usize) -> Result<AcmeKey> {
        let csprng = &mut rand::thread_rng();
        let private_key = RsaPrivateKey::new(csprng, bits).map_err(Error::signing)?;
        Ok(Self::from_key(private_key))
    }

    pub fn generate_default() -> Result<AcmeKey> {
        Self::generate(DEFAULT_RSA_BITS)
    }

    /// Reads a private key from PEM, either PKCS#8 (`BEGIN PRIVATE KEY`) or PKCS#1
    /// (`BEGIN RSA PRIVATE KEY`).
    pub fn from_pem(pem: &str) -> Result<AcmeKey> {
        let private_key = RsaPrivateKey::from_pkcs8_pem(pem)
            .or_else(|_| RsaPrivateKey::from_pkcs1_pem(pem))
            .map_err(|err| Error::signing(format!("failed to read RSA private key PEM: {err}")))?;

        private_key
            .validate()
            .map_err(|err| Error::signing(format!("invalid RSA private key: {err}")))?;

        Ok(Self::from_key(private_key))
    }

    fn from_key(private_key: RsaPrivateKey) -> AcmeKey {
        let jwk = Jwk::new(
            base64url(&private_key.e().to_bytes_be()),
            base64url(&private_key.n().to_bytes_be()),
        );

        AcmeKey {
            signing_key: SigningKey::<Sha256>::new(private_key.clone()),
            private_key,
            jwk,
        }
    }

    /// The private key as PKCS#8 PEM.
    pub fn to_pem(&self) -> Result<Zeroizing<String>> {
        self.private_key
            .to_pkcs8_pem(LineEnding::LF)
            .map_err(|err| Error::signing(format!("private_key_to_pem: {err}")))
    }

    /// Public half of the key in its canonical JWK form.
    pub fn jwk(&self) -> &Jwk {
        &self.jwk
    }

    /// Base64url SHA-256 digest of the canonical JWK.
    pub fn thumbprint(&self) -> Result<String> {
        self.jwk.thumbprint()
    }

    #[cfg(test)]
    pub(crate) fn private_key(&self) -> &RsaPrivateKey {
        &self.private_key
    }

    /// RS256 signature over `msg`.
    pub(crate) fn sign(&self, msg: &[u8]) -> Result<Vec<u8>> {
        let signature = self
            .signing_key
            .try_sign(msg)
            .map_err(|err| Error::signing(format!("RS256 signing failed: {err}")))?;

        Ok(signature.to_vec())
    }
}
