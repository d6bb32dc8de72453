use std::fmt;

use crate::api;

/// Subject of an authorization.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[non_exhaustive]
pub enum Identifier {
    /// A fully qualified domain name.
    Dns(String),

    /// An identifier type this client has no dedicated variant for, as reported by the provider.
    Other { kind: String, value: String },
}

impl Identifier {
    pub fn dns(domain: impl Into<String>) -> Self {
        Identifier::Dns(domain.into())
    }

    /// Protocol name of the identifier type, e.g. `"dns"`.
    pub fn kind(&self) -> &str {
        match self {
            Identifier::Dns(_) => "dns",
            Identifier::Other { kind, .. } => kind,
        }
    }

    pub fn value(&self) -> &str {
        match self {
            Identifier::Dns(value) | Identifier::Other { value, .. } => value,
        }
    }
}

impl fmt::Display for Identifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.kind(), self.value())
    }
}

impl From<&Identifier> for api::Identifier {
    fn from(identifier: &Identifier) -> Self {
        api::Identifier {
            _type: identifier.kind().to_owned(),
            value: identifier.value().to_owned(),
        }
    }
}

impl From<api::Identifier> for Identifier {
    fn from(identifier: api::Identifier) -> Self {
        if identifier.is_type_dns() {
            Identifier::Dns(identifier.value)
        } else {
            Identifier::Other {
                kind: identifier._type,
                value: identifier.value,
            }
        }
    }
}
