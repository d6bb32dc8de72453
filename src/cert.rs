use std::io::{BufReader, Cursor};

use crate::{
    error::{Error, Result},
    trans::{Payload, Response},
};

/// An issued certificate, exactly as served by the provider.
///
/// Draft-era providers serve DER (`application/pkix-cert`); others may send PEM. The body is kept
/// as received; use [`Certificate::certificate_chain()`] for DER regardless of encoding.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Certificate {
    url: String,
    content_type: Option<String>,
    issuer_url: Option<String>,
    certificate: Vec<u8>,
}

impl Certificate {
    /// Pairs the response body with the `Location` header, or the request URL on direct fetches.
    pub(crate) fn from_response(res: &Response) -> Result<Self> {
        let certificate = match &res.payload {
            Payload::Raw(body) => body.clone(),
            Payload::Empty => Vec::new(),
            Payload::Json(_) => {
                return Err(Error::malformed(format!(
                    "expected a certificate from {}, got JSON",
                    res.url
                )))
            }
        };

        Ok(Certificate {
            url: res.location().unwrap_or(&res.url).to_owned(),
            content_type: res.content_type.clone(),
            issuer_url: res.link("up"),
            certificate,
        })
    }

    /// URL the certificate can be fetched from.
    pub fn url(&self) -> &str {
        &self.url
    }

    /// `Content-Type` the provider served the certificate with.
    pub fn content_type(&self) -> Option<&str> {
        self.content_type.as_deref()
    }

    /// URL of the issuing certificate, from the `up` link relation.
    pub fn issuer_url(&self) -> Option<&str> {
        self.issuer_url.as_deref()
    }

    /// Raw certificate body.
    pub fn certificate(&self) -> &[u8] {
        &self.certificate
    }

    /// Returns true if the provider has not served the certificate body yet.
    pub fn is_empty(&self) -> bool {
        self.certificate.is_empty()
    }

    /// Returns true if the body is PEM rather than DER.
    pub fn is_pem(&self) -> bool {
        self.certificate.starts_with(b"-----BEGIN")
    }

    /// The certificate chain in DER format.
    pub fn certificate_chain(&self) -> Result<Vec<Vec<u8>>> {
        if !self.is_pem() {
            return Ok(vec![self.certificate.clone()]);
        }

        let mut rdr = BufReader::new(Cursor::new(&self.certificate));

        rustls_pemfile::certs(&mut rdr)
            .map(|res| res.map(|cert| cert.to_vec()))
            .collect::<Result<Vec<_>, _>>()
            .map_err(|err| Error::malformed(format!("unreadable PEM certificate: {err}")))
    }
}
