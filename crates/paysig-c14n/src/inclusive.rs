#![forbid(unsafe_code)]

//! Canonical XML 1.0 (inclusive).
//!
//! Every namespace binding in scope is rendered on the first visible
//! element where it differs from what the nearest visible ancestor
//! already rendered. For document subsets, `xml:*` attributes of
//! invisible ancestors are carried onto the top-most visible elements.

use crate::escape::{escape_into, Context};
use crate::render::{self, Attr, NsDecl, NsMap};
use paysig_core::{ns, Error};
use paysig_xml::edit::element_qname;
use paysig_xml::NodeSet;
use std::collections::BTreeMap;

pub fn canonicalize(
    doc: &roxmltree::Document<'_>,
    with_comments: bool,
    node_set: Option<&NodeSet>,
) -> Result<Vec<u8>, Error> {
    let mut out = String::new();
    let serializer = Inclusive {
        with_comments,
        node_set,
    };
    serializer.node(doc.root(), &mut out, &NsMap::new());
    Ok(out.into_bytes())
}

struct Inclusive<'a> {
    with_comments: bool,
    node_set: Option<&'a NodeSet>,
}

impl Inclusive<'_> {
    fn visible(&self, node: &roxmltree::Node<'_, '_>) -> bool {
        self.node_set.map_or(true, |set| set.contains(node))
    }

    fn node(&self, node: roxmltree::Node<'_, '_>, out: &mut String, rendered: &NsMap) {
        match node.node_type() {
            roxmltree::NodeType::Root => {
                for child in node.children() {
                    self.node(child, out, rendered);
                }
            }
            roxmltree::NodeType::Element => self.element(node, out, rendered),
            roxmltree::NodeType::Text => {
                if self.visible(&node) {
                    escape_into(out, node.text().unwrap_or(""), Context::Text);
                }
            }
            roxmltree::NodeType::Comment => {
                if self.with_comments && self.visible(&node) {
                    render::write_comment(out, node);
                }
            }
            roxmltree::NodeType::PI => {
                if self.visible(&node) {
                    render::write_pi(out, node);
                }
            }
        }
    }

    fn element(&self, node: roxmltree::Node<'_, '_>, out: &mut String, rendered: &NsMap) {
        if !self.visible(&node) {
            for child in node.children() {
                self.node(child, out, rendered);
            }
            return;
        }

        let mut in_scope = render::inscope_namespaces(node);
        in_scope.remove("xml");

        let mut decls: Vec<NsDecl> = in_scope
            .iter()
            .filter(|(prefix, uri)| rendered.get(*prefix) != Some(*uri))
            .map(|(prefix, uri)| NsDecl::new(prefix, uri))
            .collect();
        if !in_scope.contains_key("") && rendered.get("").is_some_and(|uri| !uri.is_empty()) {
            decls.push(NsDecl::new("", ""));
        }
        decls.sort();

        let mut attrs = render::collect_attrs(node);
        if self.node_set.is_some() && !self.parent_visible(node) {
            let inherited = inherited_xml_attrs(node, &attrs);
            attrs.extend(inherited);
        }
        attrs.sort();

        let qname = element_qname(node);
        render::write_start_tag(out, qname, &decls, &attrs);
        for child in node.children() {
            self.node(child, out, &in_scope);
        }
        render::write_end_tag(out, qname);
    }

    fn parent_visible(&self, node: roxmltree::Node<'_, '_>) -> bool {
        node.parent()
            .is_some_and(|p| p.is_element() && self.visible(&p))
    }
}

/// `xml:*` attributes of all ancestors (nearest wins) not already present
/// on `node`.
fn inherited_xml_attrs(node: roxmltree::Node<'_, '_>, own: &[Attr]) -> Vec<Attr> {
    let mut inherited: BTreeMap<&str, &str> = BTreeMap::new();
    for ancestor in node.ancestors().skip(1).filter(|n| n.is_element()) {
        for attr in ancestor.attributes().filter(|a| a.namespace() == Some(ns::XML)) {
            inherited.entry(attr.name()).or_insert(attr.value());
        }
    }
    inherited
        .into_iter()
        .filter(|(name, _)| !own.iter().any(|a| a.ns_uri == ns::XML && a.local_name == *name))
        .map(|(name, value)| Attr {
            ns_uri: ns::XML.to_owned(),
            local_name: name.to_owned(),
            qname: format!("xml:{name}"),
            value: value.to_owned(),
        })
        .collect()
}
