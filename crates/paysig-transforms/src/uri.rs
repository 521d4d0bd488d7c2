#![forbid(unsafe_code)]

//! Reference URI resolution.
//!
//! - `""`: the whole document without comments;
//! - `"#id"`: the element carrying that identifier and its descendants,
//!   without comments. The identifier must occur exactly once.
//!
//! Anything else would be an external resource and is refused.

use crate::pipeline::TransformData;
use paysig_core::Error;
use paysig_xml::document::parse_same_document_ref;
use paysig_xml::{IdMap, NodeSet};

/// Select the node set a `Reference` URI points at.
pub fn resolve_uri(
    uri: &str,
    doc: &roxmltree::Document<'_>,
    ids: &IdMap,
) -> Result<NodeSet, Error> {
    if uri.is_empty() {
        return Ok(NodeSet::all_without_comments(doc));
    }
    match parse_same_document_ref(uri) {
        Some(id) => Ok(NodeSet::tree_without_comments(ids.resolve(doc, id)?)),
        None => Err(Error::ReferenceUnresolved(format!(
            "only same-document references are supported: {uri}"
        ))),
    }
}

/// Pipeline input for a reference over `xml_text`.
pub fn reference_input(
    uri: &str,
    xml_text: &str,
    doc: &roxmltree::Document<'_>,
    ids: &IdMap,
) -> Result<TransformData, Error> {
    let node_set = resolve_uri(uri, doc, ids)?;
    Ok(TransformData::Xml {
        xml_text: xml_text.to_owned(),
        node_set: Some(node_set),
    })
}
