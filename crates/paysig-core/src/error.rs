#![forbid(unsafe_code)]

use std::path::PathBuf;

/// Broad failure class, used by callers to decide how to report a failure.
///
/// A cryptographically invalid signature is not an error at all; it is
/// reported through the verifier's result type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// An outside resource (credential files) could not be read.
    Adapter,
    /// The input or the key material is unusable.
    Technical,
}

/// Errors produced by the paysig crates.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("XML parsing error: {0}")]
    XmlParse(String),

    #[error("invalid XML structure: {0}")]
    XmlStructure(String),

    #[error("signature element not found: {0}")]
    SignatureMissing(String),

    #[error("missing required element: {0}")]
    MissingElement(String),

    #[error("missing required attribute: {0}")]
    MissingAttribute(String),

    #[error("unsupported algorithm: {0}")]
    UnsupportedAlgorithm(String),

    #[error("unresolved reference: {0}")]
    ReferenceUnresolved(String),

    #[error("canonicalization error: {0}")]
    Canonicalization(String),

    #[error("transform error: {0}")]
    Transform(String),

    #[error("cryptographic error: {0}")]
    Crypto(String),

    #[error("signature computation failed: {0}")]
    SignatureCompute(#[source] Box<Error>),

    #[error("key error: {0}")]
    Key(String),

    #[error("credential material is empty: {0}")]
    EmptyCredential(String),

    #[error("cannot read credential file {}", path.display())]
    CredentialRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("configuration error: {0}")]
    Config(String),
}

impl Error {
    /// Stable machine-readable code for this failure.
    pub fn code(&self) -> &'static str {
        match self {
            Self::XmlParse(_) => "XML_PARSING",
            Self::XmlStructure(_) => "XML_STRUCTURE",
            Self::SignatureMissing(_) => "SIGNATURE_MISSING",
            Self::MissingElement(_) | Self::MissingAttribute(_) => "SIGNATURE_MALFORMED",
            Self::UnsupportedAlgorithm(_) => "UNSUPPORTED_ALGORITHM",
            Self::ReferenceUnresolved(_) => "REFERENCE_UNRESOLVED",
            Self::Canonicalization(_) => "CANONICALIZATION_ERROR",
            Self::Transform(_) => "TRANSFORM_ERROR",
            Self::Crypto(_) => "CRYPTO_ERROR",
            Self::SignatureCompute(_) => "SIGNATURE_COMPUTE_ERROR",
            Self::Key(_) => "KEY_MATERIAL_INVALID",
            Self::EmptyCredential(_) => "CREDENTIAL_EMPTY",
            Self::CredentialRead { .. } => "CREDENTIAL_READ",
            Self::Config(_) => "CONFIG_ERROR",
        }
    }

    /// Failure class of this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::CredentialRead { .. } => ErrorKind::Adapter,
            _ => ErrorKind::Technical,
        }
    }

    /// Wrap a failure that happened while producing a signature value.
    pub fn signature_compute(cause: Error) -> Self {
        match cause {
            already @ Self::SignatureCompute(_) => already,
            other => Self::SignatureCompute(Box::new(other)),
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error as _;

    #[test]
    fn test_credential_read_is_adapter() {
        let err = Error::CredentialRead {
            path: PathBuf::from("/nonexistent/key.pem"),
            source: std::io::Error::new(std::io::ErrorKind::NotFound, "gone"),
        };
        assert_eq!(err.kind(), ErrorKind::Adapter);
        assert_eq!(err.code(), "CREDENTIAL_READ");
        assert!(err.source().is_some());
        assert!(err.to_string().contains("/nonexistent/key.pem"));
    }

    #[test]
    fn test_everything_else_is_technical() {
        for err in [
            Error::XmlParse("x".into()),
            Error::SignatureMissing("x".into()),
            Error::EmptyCredential("x".into()),
            Error::Key("x".into()),
        ] {
            assert_eq!(err.kind(), ErrorKind::Technical);
        }
    }

    #[test]
    fn test_signature_compute_keeps_cause() {
        let err = Error::signature_compute(Error::Crypto("modulus too small".into()));
        assert_eq!(err.code(), "SIGNATURE_COMPUTE_ERROR");
        let cause = err.source().map(|c| c.to_string()).unwrap_or_default();
        assert!(cause.contains("modulus too small"));

        // Wrapping twice does not nest.
        let twice = Error::signature_compute(err);
        assert!(matches!(&twice, Error::SignatureCompute(inner) if matches!(**inner, Error::Crypto(_))));
    }
}
