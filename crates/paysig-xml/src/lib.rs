#![forbid(unsafe_code)]

//! XML document layer for paysig.
//!
//! Parsing goes through `roxmltree`, which is read-only; documents are
//! modified by splicing their source text at node boundaries (see
//! [`edit`]). Also hosts the record serializer and the whitespace
//! normalizer that both sit in front of signing and verification.

pub mod document;
pub mod edit;
pub mod nodeset;
pub mod normalize;
pub mod record;

pub use document::IdMap;
pub use nodeset::NodeSet;
pub use normalize::normalize;
pub use record::to_xml;

use paysig_core::Error;

/// Parsing options used for every document the engine touches.
///
/// DTDs are rejected: signed payment documents never need them, and
/// node ids must be identical every time the same text is parsed.
pub fn parsing_options() -> roxmltree::ParsingOptions {
    roxmltree::ParsingOptions {
        allow_dtd: false,
        ..roxmltree::ParsingOptions::default()
    }
}

/// Parse XML text, mapping parser failures to [`Error::XmlParse`].
pub fn parse(text: &str) -> Result<roxmltree::Document<'_>, Error> {
    roxmltree::Document::parse_with_options(text, parsing_options())
        .map_err(|e| Error::XmlParse(e.to_string()))
}
