#![forbid(unsafe_code)]

//! Credential store for paysig.
//!
//! Reads PEM key and certificate material from disk (or takes it from
//! memory), checks that it is non-empty, and hands it out behind `Arc`s
//! for the lifetime of the process. Turning PEM into RSA keys happens in
//! [`loader`], at the point of use.

pub mod credentials;
pub mod loader;
pub mod provider;

pub use credentials::{CredentialSet, PemMaterial};
pub use provider::{CredentialProvider, FileCredentialProvider, StaticCredentialProvider};
