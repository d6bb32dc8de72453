//! Flattened JWS construction for signed requests.

use serde::{Deserialize, Serialize};

use crate::{
    acc::AcmeKey,
    error::{Error, Result},
    util::{base64url, sha256_base64url},
};

/// JWS protected header sent with every signed request.
///
/// > The JWS Protected Header MUST include the "nonce" header parameter and a "jwk" header
/// parameter carrying the public key corresponding to the private key used to sign the JWS.
#[derive(Debug, Serialize, Deserialize)]
pub(crate) struct JwsProtectedHeader {
    typ: String,

    /// Algorithm. Always RS256 since account keys are RSA.
    alg: String,

    /// A unique value that enables the verifier of a JWS to recognize when replay has occurred.
    nonce: String,

    /// JSON Web Key.
    jwk: Jwk,
}

impl JwsProtectedHeader {
    pub(crate) fn new(jwk: Jwk, nonce: String) -> Self {
        JwsProtectedHeader {
            typ: "JWT".to_owned(),
            alg: "RS256".to_owned(),
            nonce,
            jwk,
        }
    }
}

/// Public RSA key in JSON Web Key form.
///
/// The serialized form doubles as the input of the account key thumbprint, so the field order
/// is fixed to the lexical order `e`, `kty`, `n`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
// LEXICAL ORDER OF FIELDS MATTER!
pub struct Jwk {
    pub e: String,
    pub kty: String,
    pub n: String,
}

impl Jwk {
    pub(crate) fn new(e: String, n: String) -> Self {
        Jwk {
            e,
            kty: "RSA".to_owned(),
            n,
        }
    }

    /// Base64url-encoded SHA-256 digest of the canonical serialization.
    pub fn thumbprint(&self) -> Result<String> {
        let jwk_json = serde_json::to_string(self).map_err(Error::signing)?;
        Ok(sha256_base64url(&jwk_json))
    }
}

/// <https://datatracker.ietf.org/doc/html/rfc7515#section-7.2.2>
#[derive(Debug, Serialize, Deserialize)]
pub(crate) struct FlattenedJsonJws {
    pub(crate) protected: String,
    pub(crate) payload: String,
    pub(crate) signature: String,
}

/// Builds the signed envelope for `payload` using `nonce`.
pub(crate) fn sign<T: Serialize + ?Sized>(
    key: &AcmeKey,
    nonce: String,
    payload: &T,
) -> Result<FlattenedJsonJws> {
    let protected = JwsProtectedHeader::new(key.jwk().clone(), nonce);

    let protected = {
        let pro_json = serde_json::to_string(&protected).map_err(Error::signing)?;
        base64url(&pro_json)
    };

    let payload = {
        let payload_json = serde_json::to_string(payload).map_err(Error::signing)?;
        base64url(&payload_json)
    };

    let to_sign = format!("{protected}.{payload}");
    let signature = base64url(&key.sign(to_sign.as_bytes())?);

    Ok(FlattenedJsonJws {
        protected,
        payload,
        signature,
    })
}
