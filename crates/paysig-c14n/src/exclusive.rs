#![forbid(unsafe_code)]

//! Exclusive Canonical XML 1.0.
//!
//! Only visibly utilized namespace bindings are rendered: the prefix of
//! the element name (the default namespace for unprefixed names), the
//! prefixes of qualified attributes, and any prefix listed in the
//! `InclusiveNamespaces` `PrefixList` (`#default` naming the default
//! namespace). A binding is emitted when the nearest output ancestor did
//! not already emit the same one.

use crate::escape::{escape_into, Context};
use crate::render::{self, NsDecl, NsMap};
use paysig_core::Error;
use paysig_xml::edit::element_qname;
use paysig_xml::NodeSet;
use std::collections::BTreeSet;

pub fn canonicalize(
    doc: &roxmltree::Document<'_>,
    with_comments: bool,
    node_set: Option<&NodeSet>,
    inclusive_prefixes: &[String],
) -> Result<Vec<u8>, Error> {
    let inclusive_prefixes = inclusive_prefixes
        .iter()
        .map(|p| if p == "#default" { String::new() } else { p.clone() })
        .collect();
    let serializer = Exclusive {
        with_comments,
        node_set,
        inclusive_prefixes,
    };
    let mut out = String::new();
    serializer.node(doc.root(), &mut out, &NsMap::new());
    Ok(out.into_bytes())
}

struct Exclusive<'a> {
    with_comments: bool,
    node_set: Option<&'a NodeSet>,
    inclusive_prefixes: BTreeSet<String>,
}

impl Exclusive<'_> {
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

        let mut attrs = render::collect_attrs(node);
        attrs.sort();

        let mut utilized: BTreeSet<&str> = BTreeSet::new();
        utilized.insert(render::element_prefix(node));
        utilized.extend(attrs.iter().filter_map(|a| a.prefix()));
        utilized.extend(self.inclusive_prefixes.iter().map(String::as_str));
        utilized.remove("xml");

        let in_scope = render::inscope_namespaces(node);
        let mut decls = Vec::new();
        for prefix in utilized {
            match in_scope.get(prefix) {
                Some(uri) if rendered.get(prefix) != Some(uri) => {
                    decls.push(NsDecl::new(prefix, uri));
                }
                Some(_) => {}
                None if prefix.is_empty()
                    && rendered.get("").is_some_and(|uri| !uri.is_empty()) =>
                {
                    decls.push(NsDecl::new("", ""));
                }
                None => {}
            }
        }
        decls.sort();

        let mut child_rendered = rendered.clone();
        for decl in &decls {
            child_rendered.insert(decl.prefix.clone(), decl.uri.clone());
        }

        let qname = element_qname(node);
        render::write_start_tag(out, qname, &decls, &attrs);
        for child in node.children() {
            self.node(child, out, &child_rendered);
        }
        render::write_end_tag(out, qname);
    }
}
