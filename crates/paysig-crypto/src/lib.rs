#![forbid(unsafe_code)]

//! Cryptographic primitives used by paysig signatures.
//!
//! Digests (SHA-1 and SHA-2) and RSA PKCS#1 v1.5 signatures, each
//! selected by its XML-DSig algorithm URI.

pub mod digest;
pub mod registry;
pub mod sign;

pub use digest::DigestMethod;
pub use registry::AlgorithmRegistry;
pub use sign::SignatureMethod;
