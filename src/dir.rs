use std::{collections::BTreeMap, fmt};

use crate::{
    api,
    error::{Error, Result},
    trans::{Payload, Response},
};

const LETSENCRYPT_URL: &str = "https://acme-v01.api.letsencrypt.org/directory";
const LETSENCRYPT_STAGING_URL: &str = "https://acme-staging.api.letsencrypt.org/directory";

/// Enumeration of known ACME API directories.
#[derive(Debug, Clone)]
pub enum DirectoryUrl<'a> {
    /// The main Let's Encrypt directory.
    ///
    /// Not appropriate for testing / development.
    LetsEncrypt,

    /// The staging Let's Encrypt directory.
    ///
    /// Use for testing and development. Doesn't issue "valid" certificates. The root signing
    /// certificate is not supposed to be in any trust chains.
    LetsEncryptStaging,

    /// Provide an arbitrary director URL to connect to.
    Other(&'a str),
}

impl<'a> DirectoryUrl<'a> {
    pub(crate) fn to_url(&self) -> &str {
        match self {
            DirectoryUrl::LetsEncrypt => LETSENCRYPT_URL,
            DirectoryUrl::LetsEncryptStaging => LETSENCRYPT_STAGING_URL,
            DirectoryUrl::Other(url) => url,
        }
    }
}

/// Resources a directory may publish.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resource {
    NewRegistration,
    NewAuthorization,
    NewCertificate,
    RevokeCertificate,
}

impl Resource {
    /// Directory keys for this resource, preferred name first.
    fn keys(self) -> &'static [&'static str] {
        match self {
            Resource::NewRegistration => &["new-reg", "new-registration"],
            Resource::NewAuthorization => &["new-authz", "new-authorization"],
            Resource::NewCertificate => &["new-cert", "new-certificate"],
            Resource::RevokeCertificate => &["revoke-cert", "revoke-certificate"],
        }
    }

    pub fn name(self) -> &'static str {
        self.keys()[0]
    }
}

impl fmt::Display for Resource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Resource URLs published by an ACME provider.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Directory {
    resources: BTreeMap<String, String>,
    meta: Option<api::DirectoryMeta>,
}

impl Directory {
    /// Reads the directory object from a successful directory response.
    ///
    /// Every string member is taken to be a resource URL.
    pub(crate) fn from_response(res: &Response) -> Result<Self> {
        const RESOURCE: &str = "directory";

        if !res.is_success() {
            return Err(Error::unexpected_status(
                RESOURCE,
                res.status,
                res.problem().as_ref(),
            ));
        }

        let members = match &res.payload {
            Payload::Json(serde_json::Value::Object(members)) => members,
            Payload::Json(_) => {
                return Err(Error::protocol(RESOURCE, "directory is not a JSON object"))
            }
            Payload::Empty => return Err(Error::protocol(RESOURCE, "empty directory response")),
            Payload::Raw(_) => {
                return Err(Error::protocol(RESOURCE, "directory response is not JSON"))
            }
        };

        let resources = members
            .iter()
            .filter_map(|(name, val)| Some((name.clone(), val.as_str()?.to_owned())))
            .collect::<BTreeMap<_, _>>();

        if resources.is_empty() {
            return Err(Error::protocol(RESOURCE, "directory lists no resources"));
        }

        let meta = members
            .get("meta")
            .and_then(|meta| serde_json::from_value(meta.clone()).ok());

        Ok(Directory { resources, meta })
    }

    /// URL of `resource`, failing if the provider doesn't publish it.
    pub fn url(&self, resource: Resource) -> Result<&str> {
        resource
            .keys()
            .iter()
            .find_map(|key| self.resources.get(*key))
            .map(String::as_str)
            .ok_or_else(|| {
                Error::protocol(
                    resource.name(),
                    format!("directory has no {resource} resource"),
                )
            })
    }

    /// All published resources, by directory key.
    pub fn resources(&self) -> &BTreeMap<String, String> {
        &self.resources
    }

    pub fn meta(&self) -> Option<&api::DirectoryMeta> {
        self.meta.as_ref()
    }

    /// Terms of service URL advertised in the directory metadata.
    pub fn terms_of_service(&self) -> Option<&str> {
        self.meta.as_ref()?.terms_of_service.as_deref()
    }
}
