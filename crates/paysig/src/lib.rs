#![forbid(unsafe_code)]

//! paysig: enveloped XML signatures over payment records.
//!
//! Re-exports the workspace crates and adds the TOML [`config`] layer
//! used by the `paysig` binary and by services embedding the engine.

pub use paysig_c14n as c14n;
pub use paysig_core as core;
pub use paysig_crypto as crypto;
pub use paysig_dsig as dsig;
pub use paysig_keys as keys;
pub use paysig_transforms as transforms;
pub use paysig_xml as xml;

pub mod config;

pub use config::Config;
pub use paysig_core::{Error, ErrorKind};
pub use paysig_dsig::{
    DsigContext, SignatureConfig, SignatureMetadata, Signer, ValidationDetails, ValidationResult,
    Verifier,
};
