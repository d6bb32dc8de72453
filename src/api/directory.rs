use serde::{Deserialize, Serialize};

/// Optional `meta` object of the directory.
///
/// # Example JSON
///
/// ```json
/// {
///   "new-authz": "https://example.com/acme/new-authz",
///   "new-cert": "https://example.com/acme/new-cert",
///   "new-reg": "https://example.com/acme/new-reg",
///   "revoke-cert": "https://example.com/acme/revoke-cert",
///   "meta": {
///     "terms-of-service": "https://example.com/acme/terms",
///     "website": "https://www.example.com/",
///     "caa-identities": ["example.com"]
///   }
/// }
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct DirectoryMeta {
    /// URL identifying the current terms of service.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub terms_of_service: Option<String>,

    /// URL locating a website providing more information about the ACME server.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub website: Option<String>,

    /// The hostnames that the ACME server recognizes as referring to itself for the purposes of
    /// CAA record validation.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub caa_identities: Option<Vec<String>>,
}
