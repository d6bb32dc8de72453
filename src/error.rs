use std::fmt;

use crate::api::Problem;

pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Errors produced while talking to an ACME provider.
///
/// Nothing in this crate retries on error; a failed call is returned to the caller as-is.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum Error {
    /// The HTTP transport failed before a response was received.
    #[error("transport error: {0}")]
    Transport(eyre::Report),

    /// The provider answered with an unexpected status code, or a required resource, header or
    /// nonce was missing.
    #[error("{resource}: {message}")]
    Protocol {
        resource: String,
        status: Option<u16>,
        message: String,
    },

    /// A response body could not be parsed as declared, or lacks a required field.
    #[error("malformed response: {message}")]
    MalformedResponse {
        message: String,
        body: Option<String>,
    },

    /// The account key is missing, unreadable, or could not produce a signature.
    #[error("signing error: {0}")]
    Signing(String),

    /// Arguments passed by the caller violate a documented requirement.
    #[error("precondition failed: {0}")]
    Precondition(String),
}

impl Error {
    pub(crate) fn protocol(resource: impl Into<String>, message: impl Into<String>) -> Self {
        Error::Protocol {
            resource: resource.into(),
            status: None,
            message: message.into(),
        }
    }

    pub(crate) fn unexpected_status(
        resource: impl Into<String>,
        status: u16,
        problem: Option<&Problem>,
    ) -> Self {
        let message = match problem {
            Some(problem) => format!("unexpected response code {status} ({problem})"),
            None => format!("unexpected response code {status}"),
        };

        Error::Protocol {
            resource: resource.into(),
            status: Some(status),
            message,
        }
    }

    pub(crate) fn malformed(message: impl fmt::Display) -> Self {
        Error::MalformedResponse {
            message: message.to_string(),
            body: None,
        }
    }

    pub(crate) fn signing(message: impl fmt::Display) -> Self {
        Error::Signing(message.to_string())
    }

    /// Status code observed on the response that caused a protocol error, if any.
    pub fn status(&self) -> Option<u16> {
        match self {
            Error::Protocol { status, .. } => *status,
            _ => None,
        }
    }

    pub fn is_precondition(&self) -> bool {
        matches!(self, Error::Precondition(_))
    }

    pub fn is_protocol(&self) -> bool {
        matches!(self, Error::Protocol { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unexpected_status_mentions_problem() {
        let problem = Problem {
            _type: "urn:acme:error:unauthorized".to_owned(),
            detail: Some("No registration exists matching provided key".to_owned()),
        };

        let err = Error::unexpected_status("new-authz", 403, Some(&problem));
        assert_eq!(err.status(), Some(403));
        assert_eq!(
            err.to_string(),
            "new-authz: unexpected response code 403 \
             (urn:acme:error:unauthorized: No registration exists matching provided key)",
        );
    }

    #[test]
    fn protocol_without_status() {
        let err = Error::protocol("new-reg", "no nonce available");
        assert!(err.is_protocol());
        assert_eq!(err.status(), None);
        assert_eq!(err.to_string(), "new-reg: no nonce available");
    }
}
