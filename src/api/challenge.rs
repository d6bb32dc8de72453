use serde::{Deserialize, Serialize};

use crate::api;

/// The status of an [`api::Challenge`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChallengeStatus {
    #[default]
    Pending,
    Processing,
    Valid,
    Invalid,
    #[serde(other)]
    Unknown,
}

/// An ACME challenge object.
///
/// Represents a server's offer to validate a client's possession of an identifier in a specific
/// way.
///
/// # Example JSON
///
/// ```json
/// {
///   "type": "http-01",
///   "status": "pending",
///   "uri": "https://acme-staging.api.letsencrypt.org/acme/challenge/YTqpYUthlVfwBncUufE8/216789597",
///   "token": "MUi-gqeOJdRkSb_YR2eaMxQBqf6al8dgt_dOttSWb0w"
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Challenge {
    /// Type of challenge encoded in the object.
    #[serde(rename = "type")]
    pub _type: String,

    /// URL to which a response can be posted.
    ///
    /// Later protocol revisions call this field `url`; both are accepted.
    #[serde(alias = "url", skip_serializing_if = "Option::is_none")]
    pub uri: Option<String>,

    /// Status of this challenge.
    #[serde(default)]
    pub status: ChallengeStatus,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,

    /// Key authorization echoed back by the provider once a response was posted.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub key_authorization: Option<String>,

    /// Time at which the server validated this challenge.
    ///
    /// Uses RFC 3339 format.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub validated: Option<String>,

    /// Error that occurred while the server was validating the challenge, if any.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<api::Problem>,
}

/// Body posted to a challenge URL to ask the provider to validate it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChallengeResponse {
    pub resource: String,

    #[serde(rename = "type")]
    pub _type: String,

    pub key_authorization: String,
}

impl ChallengeResponse {
    pub(crate) fn new(challenge_type: &str, key_authorization: String) -> Self {
        Self {
            resource: "challenge".to_owned(),
            _type: challenge_type.to_owned(),
            key_authorization,
        }
    }
}
