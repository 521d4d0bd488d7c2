#![forbid(unsafe_code)]

//! Credential providers.
//!
//! A provider is created once at startup and shared by the signer and
//! the verifier. File-backed material is read at most once per process:
//! the first successful load is cached, failures are returned to the
//! caller and not cached.

use crate::credentials::{CredentialSet, PemMaterial};
use paysig_core::Error;
use std::path::{Path, PathBuf};
use std::sync::{Arc, OnceLock};

/// Source of signing and verification credentials.
pub trait CredentialProvider: Send + Sync {
    /// Private key and certificate for producing signatures.
    fn signing_credentials(&self) -> Result<Arc<CredentialSet>, Error>;

    /// Certificate (or public key) signatures are checked against.
    fn verification_certificate(&self) -> Result<Arc<PemMaterial>, Error>;
}

/// Read a PEM file, mapping I/O failures to [`Error::CredentialRead`].
pub fn read_pem(path: &Path) -> Result<PemMaterial, Error> {
    let text = std::fs::read_to_string(path).map_err(|source| Error::CredentialRead {
        path: path.to_path_buf(),
        source,
    })?;
    PemMaterial::new(path.display().to_string(), text)
}

/// Credentials read from the filesystem on first use.
#[derive(Debug)]
pub struct FileCredentialProvider {
    private_key_path: Option<PathBuf>,
    certificate_path: PathBuf,
    signing: OnceLock<Arc<CredentialSet>>,
    verification: OnceLock<Arc<PemMaterial>>,
}

impl FileCredentialProvider {
    pub fn new(private_key_path: Option<PathBuf>, certificate_path: PathBuf) -> Self {
        Self {
            private_key_path,
            certificate_path,
            signing: OnceLock::new(),
            verification: OnceLock::new(),
        }
    }

    /// A provider that can only verify.
    pub fn verification_only(certificate_path: PathBuf) -> Self {
        Self::new(None, certificate_path)
    }

    /// Load everything configured now instead of on first use.
    pub fn preload(&self) -> Result<(), Error> {
        self.verification_certificate()?;
        if self.private_key_path.is_some() {
            self.signing_credentials()?;
        }
        Ok(())
    }

    fn load_certificate(&self) -> Result<Arc<PemMaterial>, Error> {
        if let Some(cached) = self.verification.get() {
            return Ok(Arc::clone(cached));
        }
        let pem = read_pem(&self.certificate_path)?;
        tracing::debug!(path = %self.certificate_path.display(), "certificate loaded");
        Ok(Arc::clone(self.verification.get_or_init(|| Arc::new(pem))))
    }
}

impl CredentialProvider for FileCredentialProvider {
    fn signing_credentials(&self) -> Result<Arc<CredentialSet>, Error> {
        if let Some(cached) = self.signing.get() {
            return Ok(Arc::clone(cached));
        }
        let key_path = self
            .private_key_path
            .as_deref()
            .ok_or_else(|| Error::Config("no private key path configured".into()))?;
        let private_key = read_pem(key_path)?;
        let certificate = self.load_certificate()?;
        tracing::debug!(path = %key_path.display(), "private key loaded");

        let set = CredentialSet {
            private_key: Some(private_key),
            certificate: (*certificate).clone(),
        };
        Ok(Arc::clone(self.signing.get_or_init(|| Arc::new(set))))
    }

    fn verification_certificate(&self) -> Result<Arc<PemMaterial>, Error> {
        self.load_certificate()
    }
}

/// Credentials supplied in memory, e.g. from a secret store.
#[derive(Debug, Clone)]
pub struct StaticCredentialProvider {
    signing: Option<Arc<CredentialSet>>,
    certificate: Arc<PemMaterial>,
}

impl StaticCredentialProvider {
    pub fn new(private_key_pem: &str, certificate_pem: &str) -> Result<Self, Error> {
        let certificate = PemMaterial::new("certificate", certificate_pem)?;
        let private_key = PemMaterial::new("private key", private_key_pem)?;
        Ok(Self {
            signing: Some(Arc::new(CredentialSet {
                private_key: Some(private_key),
                certificate: certificate.clone(),
            })),
            certificate: Arc::new(certificate),
        })
    }

    pub fn verification_only(certificate_pem: &str) -> Result<Self, Error> {
        Ok(Self {
            signing: None,
            certificate: Arc::new(PemMaterial::new("certificate", certificate_pem)?),
        })
    }
}

impl CredentialProvider for StaticCredentialProvider {
    fn signing_credentials(&self) -> Result<Arc<CredentialSet>, Error> {
        self.signing
            .clone()
            .ok_or_else(|| Error::Config("provider holds no signing credentials".into()))
    }

    fn verification_certificate(&self) -> Result<Arc<PemMaterial>, Error> {
        Ok(Arc::clone(&self.certificate))
    }
}
