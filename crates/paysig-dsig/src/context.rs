#![forbid(unsafe_code)]

//! Signature settings and the context shared by signer and verifier.

use paysig_c14n::C14nMode;
use paysig_core::{algorithm, Error};
use paysig_crypto::{DigestMethod, SignatureMethod};
use paysig_keys::CredentialProvider;
use paysig_transforms::TransformSpec;
use paysig_xml::edit::is_ncname;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

pub const DEFAULT_REFERENCE_ID: &str = "xml-data";
pub const DEFAULT_ORIGIN: &str = "paysig";

/// How signatures are produced. Every field has a default, so an empty
/// `[signature]` table is valid.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SignatureConfig {
    /// Value of the `Id` attribute put on the root element.
    pub reference_id: String,
    pub canonicalization: String,
    pub signature_method: String,
    pub digest_method: String,
    /// Transform chain of the single `Reference`, in order.
    pub transforms: Vec<String>,
    /// Written to `AdditionalInfo/Origin`.
    pub origin: String,
}

impl Default for SignatureConfig {
    fn default() -> Self {
        Self {
            reference_id: DEFAULT_REFERENCE_ID.to_owned(),
            canonicalization: algorithm::DEFAULT_CANONICALIZATION.to_owned(),
            signature_method: algorithm::DEFAULT_SIGNATURE_METHOD.to_owned(),
            digest_method: algorithm::DEFAULT_DIGEST_METHOD.to_owned(),
            transforms: algorithm::DEFAULT_TRANSFORMS.iter().map(|t| t.to_string()).collect(),
            origin: DEFAULT_ORIGIN.to_owned(),
        }
    }
}

impl SignatureConfig {
    /// Reject algorithm URIs this engine does not implement, a chain
    /// without the enveloped-signature transform, and unusable ids.
    pub fn validate(&self) -> Result<(), Error> {
        C14nMode::require(&self.canonicalization)?;
        SignatureMethod::from_uri(&self.signature_method)?;
        DigestMethod::from_uri(&self.digest_method)?;
        if let Some(unknown) = self.transforms.iter().find(|t| !TransformSpec::is_supported(t)) {
            return Err(Error::UnsupportedAlgorithm(format!("transform {unknown}")));
        }
        if !self.transforms.iter().any(|t| t == algorithm::ENVELOPED_SIGNATURE) {
            return Err(Error::Config(
                "transform chain must contain the enveloped-signature transform".into(),
            ));
        }
        validate_reference_id(&self.reference_id)
    }

    pub fn c14n_mode(&self) -> Result<C14nMode, Error> {
        C14nMode::require(&self.canonicalization)
    }

    pub fn signature_method(&self) -> Result<SignatureMethod, Error> {
        SignatureMethod::from_uri(&self.signature_method)
    }

    pub fn digest_method(&self) -> Result<DigestMethod, Error> {
        DigestMethod::from_uri(&self.digest_method)
    }

    pub fn transform_specs(&self) -> Vec<TransformSpec> {
        self.transforms.iter().map(TransformSpec::new).collect()
    }
}

/// A reference id becomes both an attribute value and the fragment of
/// `URI="#id"`, so it must be a plain name.
pub fn validate_reference_id(id: &str) -> Result<(), Error> {
    if is_ncname(id) {
        Ok(())
    } else {
        Err(Error::Config(format!("invalid reference id {id:?}")))
    }
}

/// Credentials and settings for signature operations.
#[derive(Clone)]
pub struct DsigContext {
    pub credentials: Arc<dyn CredentialProvider>,
    pub config: SignatureConfig,
}

impl DsigContext {
    /// Build a context, validating `config`.
    pub fn new(credentials: Arc<dyn CredentialProvider>, config: SignatureConfig) -> Result<Self, Error> {
        config.validate()?;
        Ok(Self {
            credentials,
            config,
        })
    }

    pub fn with_defaults(credentials: Arc<dyn CredentialProvider>) -> Self {
        Self {
            credentials,
            config: SignatureConfig::default(),
        }
    }
}

impl fmt::Debug for DsigContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DsigContext")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}
