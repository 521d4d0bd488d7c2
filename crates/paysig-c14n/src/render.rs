#![forbid(unsafe_code)]

//! Output pieces shared by the inclusive and exclusive serializers.

use crate::escape::{escape_into, Context};
use paysig_core::ns;
use paysig_xml::edit::{attribute_qname, element_qname};
use std::cmp::Ordering;
use std::collections::BTreeMap;

/// Prefix to URI bindings; the default namespace uses the empty prefix.
pub(crate) type NsMap = BTreeMap<String, String>;

/// A namespace declaration emitted on a start tag.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NsDecl {
    pub prefix: String,
    pub uri: String,
}

impl NsDecl {
    pub fn new(prefix: &str, uri: &str) -> Self {
        Self {
            prefix: prefix.to_owned(),
            uri: uri.to_owned(),
        }
    }

    pub fn render_into(&self, out: &mut String) {
        out.push_str(" xmlns");
        if !self.prefix.is_empty() {
            out.push(':');
            out.push_str(&self.prefix);
        }
        out.push_str("=\"");
        escape_into(out, &self.uri, Context::Attribute);
        out.push('"');
    }
}

// Default namespace first, then by prefix.
impl Ord for NsDecl {
    fn cmp(&self, other: &Self) -> Ordering {
        (!self.prefix.is_empty(), &self.prefix).cmp(&(!other.prefix.is_empty(), &other.prefix))
    }
}

impl PartialOrd for NsDecl {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// An attribute emitted on a start tag.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attr {
    /// Namespace URI, empty for unqualified attributes.
    pub ns_uri: String,
    pub local_name: String,
    /// Name as written, `prefix:local` or `local`.
    pub qname: String,
    pub value: String,
}

impl Attr {
    pub fn render_into(&self, out: &mut String) {
        out.push(' ');
        out.push_str(&self.qname);
        out.push_str("=\"");
        escape_into(out, &self.value, Context::Attribute);
        out.push('"');
    }

    /// Prefix of a namespaced attribute, `None` for unqualified ones.
    pub fn prefix(&self) -> Option<&str> {
        if self.ns_uri.is_empty() {
            return None;
        }
        if self.ns_uri == ns::XML {
            return Some("xml");
        }
        self.qname.split_once(':').map(|(p, _)| p)
    }
}

// Unqualified attributes first, then by (namespace URI, local name).
impl Ord for Attr {
    fn cmp(&self, other: &Self) -> Ordering {
        (!self.ns_uri.is_empty(), &self.ns_uri, &self.local_name).cmp(&(
            !other.ns_uri.is_empty(),
            &other.ns_uri,
            &other.local_name,
        ))
    }
}

impl PartialOrd for Attr {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Namespace bindings in scope at `node`, without `xmlns=""` entries.
pub(crate) fn inscope_namespaces(node: roxmltree::Node<'_, '_>) -> NsMap {
    node.namespaces()
        .filter(|n| !n.uri().is_empty())
        .map(|n| (n.name().unwrap_or("").to_owned(), n.uri().to_owned()))
        .collect()
}

/// Prefix of the element name as written in the source.
pub(crate) fn element_prefix<'input>(node: roxmltree::Node<'_, 'input>) -> &'input str {
    paysig_xml::edit::split_qname(element_qname(node)).0
}

/// The element's own attributes, unsorted.
pub(crate) fn collect_attrs(node: roxmltree::Node<'_, '_>) -> Vec<Attr> {
    node.attributes()
        .map(|attr| Attr {
            ns_uri: attr.namespace().unwrap_or("").to_owned(),
            local_name: attr.name().to_owned(),
            qname: attribute_qname(node, &attr).to_owned(),
            value: attr.value().to_owned(),
        })
        .collect()
}

pub(crate) fn write_start_tag(out: &mut String, qname: &str, decls: &[NsDecl], attrs: &[Attr]) {
    out.push('<');
    out.push_str(qname);
    for decl in decls {
        decl.render_into(out);
    }
    for attr in attrs {
        attr.render_into(out);
    }
    out.push('>');
}

pub(crate) fn write_end_tag(out: &mut String, qname: &str) {
    out.push_str("</");
    out.push_str(qname);
    out.push('>');
}

/// Comments and PIs outside the document element are separated from it
/// by a line feed.
fn write_top_level<F>(out: &mut String, node: roxmltree::Node<'_, '_>, body: F)
where
    F: FnOnce(&mut String),
{
    let top_level = node.parent().is_some_and(|p| p.is_root());
    if top_level && node.prev_siblings().any(|s| s.is_element()) {
        out.push('\n');
    }
    body(out);
    if top_level && node.next_siblings().any(|s| s.is_element()) {
        out.push('\n');
    }
}

pub(crate) fn write_comment(out: &mut String, node: roxmltree::Node<'_, '_>) {
    write_top_level(out, node, |out| {
        out.push_str("<!--");
        out.push_str(node.text().unwrap_or(""));
        out.push_str("-->");
    });
}

pub(crate) fn write_pi(out: &mut String, node: roxmltree::Node<'_, '_>) {
    let Some(pi) = node.pi() else { return };
    write_top_level(out, node, |out| {
        out.push_str("<?");
        out.push_str(pi.target);
        if let Some(value) = pi.value.filter(|v| !v.is_empty()) {
            out.push(' ');
            escape_into(out, value, Context::ProcessingInstruction);
        }
        out.push_str("?>");
    });
}
