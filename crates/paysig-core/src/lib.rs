#![forbid(unsafe_code)]

//! Shared building blocks for the paysig XML signature engine: the error
//! taxonomy, algorithm URIs and the XML-DSig element vocabulary.

pub mod algorithm;
pub mod error;
pub mod ns;

pub use error::{Error, ErrorKind, Result};
