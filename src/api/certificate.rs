use serde::{Deserialize, Serialize};

/// Certificate issuance request.
///
/// See [draft-ietf-acme-acme-01 §6.5].
///
/// [draft-ietf-acme-acme-01 §6.5]: https://datatracker.ietf.org/doc/html/draft-ietf-acme-acme-01#section-6.5
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewCertificate {
    pub resource: String,

    /// Certificate Signing Request (CSR) in base64url-encoded DER.
    ///
    /// Note: not PEM, since headers are omitted.
    pub csr: String,

    /// Requested start of the validity window, RFC 3339.
    pub not_before: String,

    /// Requested end of the validity window, RFC 3339.
    pub not_after: String,
}

impl NewCertificate {
    pub(crate) fn new(csr: String, not_before: String, not_after: String) -> Self {
        Self {
            resource: "new-cert".to_owned(),
            csr,
            not_before,
            not_after,
        }
    }
}
