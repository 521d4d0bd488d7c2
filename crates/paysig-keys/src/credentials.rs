#![forbid(unsafe_code)]

//! Loaded credential material.

use paysig_core::Error;
use std::fmt;

/// PEM text together with where it came from.
///
/// Construction rejects empty or whitespace-only content; whether the
/// text is a usable key or certificate is decided by [`crate::loader`].
#[derive(Clone, PartialEq, Eq)]
pub struct PemMaterial {
    source: String,
    text: String,
}

impl PemMaterial {
    pub fn new(source: impl Into<String>, text: impl Into<String>) -> Result<Self, Error> {
        let source = source.into();
        let text = text.into();
        if text.trim().is_empty() {
            return Err(Error::EmptyCredential(source));
        }
        Ok(Self { source, text })
    }

    /// File path or other label the material was loaded from.
    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn text(&self) -> &str {
        &self.text
    }
}

// Never print key material.
impl fmt::Debug for PemMaterial {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PemMaterial")
            .field("source", &self.source)
            .field("len", &self.text.len())
            .finish()
    }
}

/// Signing-side credentials: the private key and the certificate that is
/// embedded in `KeyInfo`.
#[derive(Debug, Clone)]
pub struct CredentialSet {
    pub private_key: Option<PemMaterial>,
    pub certificate: PemMaterial,
}

impl CredentialSet {
    /// The private key, or an error for verification-only sets.
    pub fn require_private_key(&self) -> Result<&PemMaterial, Error> {
        self.private_key
            .as_ref()
            .ok_or_else(|| Error::Key("no private key available for signing".into()))
    }
}
