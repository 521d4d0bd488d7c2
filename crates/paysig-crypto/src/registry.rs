#![forbid(unsafe_code)]

//! Lookup of supported algorithms by URI.

use crate::digest::DigestMethod;
use crate::sign::SignatureMethod;
use paysig_core::Error;

pub struct AlgorithmRegistry;

impl AlgorithmRegistry {
    pub fn digest(uri: &str) -> Result<DigestMethod, Error> {
        DigestMethod::from_uri(uri)
    }

    pub fn signature(uri: &str) -> Result<SignatureMethod, Error> {
        SignatureMethod::from_uri(uri)
    }

    pub fn digest_uris() -> impl Iterator<Item = &'static str> {
        DigestMethod::ALL.into_iter().map(|m| m.uri())
    }

    pub fn signature_uris() -> impl Iterator<Item = &'static str> {
        SignatureMethod::ALL.into_iter().map(|m| m.uri())
    }
}
