use serde::{Deserialize, Serialize};

use crate::api;

/// The status of an [`api::Authorization`].
///
/// Providers may report states this client doesn't know about; those map to `Unknown`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AuthorizationStatus {
    Pending,
    Processing,
    Valid,
    Invalid,
    Expired,
    Revoked,
    Deactivated,
    #[serde(other)]
    Unknown,
}

impl AuthorizationStatus {
    /// Returns true once the provider has reached a final decision.
    pub fn is_settled(&self) -> bool {
        !matches!(
            self,
            AuthorizationStatus::Pending | AuthorizationStatus::Processing
        )
    }
}

// {
//   "identifier": {
//     "type": "dns",
//     "value": "example.org"
//   },
//   "status": "pending",
//   "expires": "2016-01-09T08:26:43Z",
//   "challenges": [
//     {
//       "type": "http-01",
//       "status": "pending",
//       "uri": "https://example.com/acme/challenge/YTqpYUthlVfwBncUufE8/216789597",
//       "token": "MUi-gqeOJdRkSb_YR2eaMxQBqf6al8dgt_dOttSWb0w"
//     },
//     {
//       "type": "dns-01",
//       "status": "pending",
//       "uri": "https://example.com/acme/challenge/YTqpYUthlVfwBncUufE8/216789599",
//       "token": "RRo2ZcXAEqxKvMH8RGcATjSK1KknLEUmauwfQ5i3gG8"
//     }
//   ],
//   "combinations": [[0], [1]]
// }
/// An ACME authorization object.
///
/// Represents a server's authorization for an account to represent an identifier.
///
/// See [draft-ietf-acme-acme-01 §5.3].
///
/// [draft-ietf-acme-acme-01 §5.3]: https://datatracker.ietf.org/doc/html/draft-ietf-acme-acme-01#section-5.3
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Authorization {
    /// Authorization identifier.
    pub identifier: api::Identifier,

    /// Authorization status.
    pub status: AuthorizationStatus,

    /// The timestamp after which the server will consider this authorization invalid.
    ///
    /// Uses RFC 3339 format.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expires: Option<String>,

    /// The challenges the client can fulfill in order to prove possession of the identifier.
    #[serde(default)]
    pub challenges: Vec<api::Challenge>,

    /// Sets of indexes into `challenges`; completing every challenge of any one set is
    /// sufficient for the authorization.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub combinations: Option<Vec<Vec<usize>>>,
}

/// Body of a `new-authz` request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewAuthorization {
    pub resource: String,
    pub identifier: api::Identifier,
}

impl NewAuthorization {
    pub(crate) fn new(identifier: api::Identifier) -> Self {
        Self {
            resource: "new-authz".to_owned(),
            identifier,
        }
    }
}
