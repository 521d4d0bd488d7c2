#![forbid(unsafe_code)]

//! Element lookup helpers and `Id` attribute resolution.

use paysig_core::{ns, Error};
use std::collections::HashMap;

fn is_named(node: &roxmltree::Node<'_, '_>, ns_uri: &str, local_name: &str) -> bool {
    node.is_element()
        && node.tag_name().name() == local_name
        && node.tag_name().namespace().unwrap_or("") == ns_uri
}

/// Find the first descendant element with the given namespace and local name.
pub fn find_element<'a, 'input>(
    doc: &'a roxmltree::Document<'input>,
    ns_uri: &str,
    local_name: &str,
) -> Option<roxmltree::Node<'a, 'input>> {
    doc.descendants().find(|n| is_named(n, ns_uri, local_name))
}

/// Find all descendant elements with the given namespace and local name.
pub fn find_elements<'a, 'input>(
    doc: &'a roxmltree::Document<'input>,
    ns_uri: &str,
    local_name: &str,
) -> Vec<roxmltree::Node<'a, 'input>> {
    doc.descendants()
        .filter(|n| is_named(n, ns_uri, local_name))
        .collect()
}

pub fn find_child_element<'a, 'input>(
    parent: roxmltree::Node<'a, 'input>,
    ns_uri: &str,
    local_name: &str,
) -> Option<roxmltree::Node<'a, 'input>> {
    parent.children().find(|n| is_named(n, ns_uri, local_name))
}

pub fn find_child_elements<'a, 'input>(
    parent: roxmltree::Node<'a, 'input>,
    ns_uri: &str,
    local_name: &str,
) -> Vec<roxmltree::Node<'a, 'input>> {
    parent
        .children()
        .filter(|n| is_named(n, ns_uri, local_name))
        .collect()
}

/// Like [`find_child_element`] but fails with [`Error::MissingElement`].
pub fn require_child_element<'a, 'input>(
    parent: roxmltree::Node<'a, 'input>,
    ns_uri: &str,
    local_name: &str,
) -> Result<roxmltree::Node<'a, 'input>, Error> {
    find_child_element(parent, ns_uri, local_name)
        .ok_or_else(|| Error::MissingElement(local_name.to_owned()))
}

/// Read a required attribute, failing with [`Error::MissingAttribute`].
pub fn require_attribute<'a>(
    node: roxmltree::Node<'a, '_>,
    name: &str,
) -> Result<&'a str, Error> {
    node.attribute(name).ok_or_else(|| {
        Error::MissingAttribute(format!("{name} on {}", node.tag_name().name()))
    })
}

/// Index of every element carrying an identifier attribute (`Id`, `ID`,
/// `id`), keyed by the attribute value.
///
/// Values that appear on more than one element are kept so that
/// resolution can refuse ambiguous references.
#[derive(Debug, Default)]
pub struct IdMap {
    ids: HashMap<String, Vec<roxmltree::NodeId>>,
}

impl IdMap {
    pub fn build(doc: &roxmltree::Document<'_>) -> Self {
        let mut ids: HashMap<String, Vec<roxmltree::NodeId>> = HashMap::new();
        for node in doc.descendants().filter(|n| n.is_element()) {
            for attr_name in ns::ID_ATTRS {
                if let Some(value) = node.attribute(attr_name) {
                    let entry = ids.entry(value.to_owned()).or_default();
                    if !entry.contains(&node.id()) {
                        entry.push(node.id());
                    }
                }
            }
        }
        Self { ids }
    }

    /// Resolve `id` to the single element that carries it.
    pub fn resolve<'a, 'input>(
        &self,
        doc: &'a roxmltree::Document<'input>,
        id: &str,
    ) -> Result<roxmltree::Node<'a, 'input>, Error> {
        match self.ids.get(id).map(Vec::as_slice) {
            Some([node_id]) => doc
                .get_node(*node_id)
                .ok_or_else(|| Error::ReferenceUnresolved(format!("ID not found: {id}"))),
            Some(many) if many.len() > 1 => Err(Error::ReferenceUnresolved(format!(
                "ID {id} is carried by {} elements",
                many.len()
            ))),
            _ => Err(Error::ReferenceUnresolved(format!("ID not found: {id}"))),
        }
    }
}

/// Parse a same-document reference (`#foo` -> `foo`).
pub fn parse_same_document_ref(uri: &str) -> Option<&str> {
    uri.strip_prefix('#').filter(|id| !id.is_empty())
}
