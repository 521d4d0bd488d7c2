#![forbid(unsafe_code)]

//! RSA PKCS#1 v1.5 signatures for `SignatureMethod`.

use crate::digest::DigestMethod;
use paysig_core::{algorithm, Error};
use rsa::{RsaPrivateKey, RsaPublicKey};
use signature::SignatureEncoding;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SignatureMethod {
    RsaSha1,
    RsaSha256,
    RsaSha384,
    RsaSha512,
}

impl SignatureMethod {
    pub const ALL: [SignatureMethod; 4] = [
        Self::RsaSha1,
        Self::RsaSha256,
        Self::RsaSha384,
        Self::RsaSha512,
    ];

    pub fn uri(&self) -> &'static str {
        match self {
            Self::RsaSha1 => algorithm::RSA_SHA1,
            Self::RsaSha256 => algorithm::RSA_SHA256,
            Self::RsaSha384 => algorithm::RSA_SHA384,
            Self::RsaSha512 => algorithm::RSA_SHA512,
        }
    }

    pub fn from_uri(uri: &str) -> Result<Self, Error> {
        Self::ALL
            .into_iter()
            .find(|m| m.uri() == uri)
            .ok_or_else(|| Error::UnsupportedAlgorithm(format!("signature algorithm: {uri}")))
    }

    /// Hash applied to the signed bytes.
    pub fn digest_method(&self) -> DigestMethod {
        match self {
            Self::RsaSha1 => DigestMethod::Sha1,
            Self::RsaSha256 => DigestMethod::Sha256,
            Self::RsaSha384 => DigestMethod::Sha384,
            Self::RsaSha512 => DigestMethod::Sha512,
        }
    }

    /// Sign `data` (hashing it first) with `key`.
    pub fn sign(&self, key: &RsaPrivateKey, data: &[u8]) -> Result<Vec<u8>, Error> {
        use signature::Signer;
        macro_rules! sign_with {
            ($hasher:ty) => {
                rsa::pkcs1v15::SigningKey::<$hasher>::new(key.clone())
                    .try_sign(data)
                    .map(|sig| sig.to_vec())
            };
        }
        let signed = match self {
            Self::RsaSha1 => sign_with!(sha1::Sha1),
            Self::RsaSha256 => sign_with!(sha2::Sha256),
            Self::RsaSha384 => sign_with!(sha2::Sha384),
            Self::RsaSha512 => sign_with!(sha2::Sha512),
        };
        signed.map_err(|e| Error::Crypto(format!("RSA signing failed: {e}")))
    }

    /// Check `signature` over `data` against `key`.
    ///
    /// Malformed or wrong-length signature bytes simply do not verify.
    pub fn verify(&self, key: &RsaPublicKey, data: &[u8], signature: &[u8]) -> bool {
        use signature::Verifier;
        let Ok(sig) = rsa::pkcs1v15::Signature::try_from(signature) else {
            return false;
        };
        macro_rules! verify_with {
            ($hasher:ty) => {
                rsa::pkcs1v15::VerifyingKey::<$hasher>::new(key.clone())
                    .verify(data, &sig)
                    .is_ok()
            };
        }
        match self {
            Self::RsaSha1 => verify_with!(sha1::Sha1),
            Self::RsaSha256 => verify_with!(sha2::Sha256),
            Self::RsaSha384 => verify_with!(sha2::Sha384),
            Self::RsaSha512 => verify_with!(sha2::Sha512),
        }
    }
}
