#![forbid(unsafe_code)]

//! Enveloped XML digital signatures over payment records.
//!
//! [`Signer`] serializes a record, anchors a `Reference` on its root
//! element and appends a `<Signature>`; [`Verifier`] checks such a
//! document against the configured certificate and, when it holds,
//! reports the unsigned metadata carried next to the signature.

pub mod annotate;
pub mod context;
pub mod record;
pub mod sign;
pub mod verify;

pub use annotate::{Annotation, SignatureMetadata};
pub use context::{DsigContext, SignatureConfig};
pub use record::{Reference, SignatureRecord, SignedInfo};
pub use sign::Signer;
pub use verify::{ValidationDetails, ValidationResult, Verifier};
