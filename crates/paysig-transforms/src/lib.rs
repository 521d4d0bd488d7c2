#![forbid(unsafe_code)]

//! Transform chain for XML-DSig references.
//!
//! A reference selects a node set of the document (see [`uri`]), the
//! transforms listed in its `Transforms` element run over it in order,
//! and the final octets are what gets digested.

pub mod enveloped;
pub mod pipeline;
pub mod uri;

pub use enveloped::EnvelopedSignatureTransform;
pub use pipeline::{C14nTransform, Transform, TransformData, TransformPipeline, TransformSpec};
