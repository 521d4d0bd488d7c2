#![forbid(unsafe_code)]

//! TOML configuration.
//!
//! ```toml
//! [credentials]
//! private_key = "/etc/paysig/signing.key"
//! certificate = "/etc/paysig/signing.crt"
//!
//! [signature]
//! reference_id = "xml-data"
//! origin = "gateway-eu"
//! ```
//!
//! Every table and field is optional in the file; a certificate path must
//! be known (from the file, the environment or the command line) before
//! a context can be built.

use paysig_core::Error;
use paysig_dsig::{DsigContext, SignatureConfig, Signer, Verifier};
use paysig_keys::FileCredentialProvider;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::sync::Arc;

pub const ENV_PRIVATE_KEY: &str = "PAYSIG_PRIVATE_KEY";
pub const ENV_CERTIFICATE: &str = "PAYSIG_CERTIFICATE";
pub const ENV_ORIGIN: &str = "PAYSIG_ORIGIN";

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CredentialsConfig {
    /// Only needed for signing.
    pub private_key: Option<PathBuf>,
    pub certificate: Option<PathBuf>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    pub credentials: CredentialsConfig,
    pub signature: SignatureConfig,
}

impl Config {
    pub fn from_toml(text: &str) -> Result<Self, Error> {
        toml::from_str(text).map_err(|e| Error::Config(e.to_string()))
    }

    pub fn load(path: &Path) -> Result<Self, Error> {
        let text = std::fs::read_to_string(path)
            .map_err(|e| Error::Config(format!("{}: {e}", path.display())))?;
        Self::from_toml(&text)
    }

    /// Apply `PAYSIG_*` overrides from the process environment.
    pub fn apply_env(&mut self) {
        self.apply_overrides(|name| std::env::var(name).ok());
    }

    /// Apply overrides looked up by environment variable name. Empty
    /// values are ignored.
    pub fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        let lookup = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());
        if let Some(key) = lookup(ENV_PRIVATE_KEY) {
            self.credentials.private_key = Some(PathBuf::from(key));
        }
        if let Some(cert) = lookup(ENV_CERTIFICATE) {
            self.credentials.certificate = Some(PathBuf::from(cert));
        }
        if let Some(origin) = lookup(ENV_ORIGIN) {
            self.signature.origin = origin;
        }
    }

    /// File-backed credentials for this configuration. Nothing is read
    /// until first use.
    pub fn credential_provider(&self) -> Result<FileCredentialProvider, Error> {
        let certificate = self
            .credentials
            .certificate
            .clone()
            .ok_or_else(|| Error::Config("no certificate path configured".into()))?;
        Ok(FileCredentialProvider::new(
            self.credentials.private_key.clone(),
            certificate,
        ))
    }

    /// Validate the signature settings and build a context.
    pub fn context(&self) -> Result<DsigContext, Error> {
        let provider = self.credential_provider()?;
        DsigContext::new(Arc::new(provider), self.signature.clone())
    }

    pub fn signer(&self) -> Result<Signer, Error> {
        if self.credentials.private_key.is_none() {
            return Err(Error::Config("no private key path configured".into()));
        }
        Ok(Signer::new(self.context()?))
    }

    pub fn verifier(&self) -> Result<Verifier, Error> {
        Ok(Verifier::new(self.context()?))
    }
}
