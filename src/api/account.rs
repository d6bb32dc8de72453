use serde::{Deserialize, Serialize};

/// Body of `new-reg` and `reg` requests.
///
/// # Example JSON
///
/// ```json
/// {
///   "resource": "new-reg",
///   "contact": ["mailto:cert-admin@example.com"],
///   "agreement": "https://example.com/acme/terms"
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Registration {
    pub resource: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub contact: Option<Vec<String>>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub agreement: Option<String>,
}

impl Registration {
    pub(crate) fn new(contact: Option<Vec<String>>) -> Self {
        Registration {
            resource: "new-reg".to_owned(),
            contact,
            agreement: None,
        }
    }

    pub(crate) fn update(contact: Option<Vec<String>>, agreement: Option<String>) -> Self {
        Registration {
            resource: "reg".to_owned(),
            contact,
            agreement,
        }
    }
}

/// A registration resource as returned by the provider.
///
/// # Example JSON
///
/// ```json
/// {
///   "id": 7728515,
///   "key": { "e": "AQAB", "kty": "RSA", "n": "..." },
///   "contact": ["mailto:foo@bar.com"],
///   "agreement": "https://example.com/acme/terms",
///   "initialIp": "90.171.37.12",
///   "createdAt": "2016-12-31T17:15:40.399104457Z"
/// }
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Account {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<u64>,

    /// The account public key, kept loosely typed since providers echo it back verbatim.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub key: Option<serde_json::Value>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub contact: Option<Vec<String>>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub agreement: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
}
