#![forbid(unsafe_code)]

//! XML canonicalization for paysig.
//!
//! Canonical XML 1.0 and Exclusive Canonical XML 1.0, each with and
//! without comments. Exclusive without comments is what signed payment
//! documents use for both `SignedInfo` and the referenced record.

pub mod escape;
pub mod exclusive;
pub mod inclusive;
pub mod render;

use paysig_core::{algorithm, Error};
use paysig_xml::NodeSet;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum C14nMode {
    Inclusive,
    InclusiveWithComments,
    Exclusive,
    ExclusiveWithComments,
}

impl C14nMode {
    pub const ALL: [C14nMode; 4] = [
        Self::Inclusive,
        Self::InclusiveWithComments,
        Self::Exclusive,
        Self::ExclusiveWithComments,
    ];

    pub fn uri(&self) -> &'static str {
        match self {
            Self::Inclusive => algorithm::C14N,
            Self::InclusiveWithComments => algorithm::C14N_WITH_COMMENTS,
            Self::Exclusive => algorithm::EXC_C14N,
            Self::ExclusiveWithComments => algorithm::EXC_C14N_WITH_COMMENTS,
        }
    }

    pub fn from_uri(uri: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|mode| mode.uri() == uri)
    }

    /// Like [`C14nMode::from_uri`] but fails with
    /// [`Error::UnsupportedAlgorithm`].
    pub fn require(uri: &str) -> Result<Self, Error> {
        Self::from_uri(uri)
            .ok_or_else(|| Error::UnsupportedAlgorithm(format!("canonicalization {uri}")))
    }

    pub fn with_comments(&self) -> bool {
        matches!(self, Self::InclusiveWithComments | Self::ExclusiveWithComments)
    }

    pub fn is_exclusive(&self) -> bool {
        matches!(self, Self::Exclusive | Self::ExclusiveWithComments)
    }
}

/// Parse XML text and canonicalize it.
///
/// `node_set` restricts output to a document subset; `inclusive_prefixes`
/// is the `PrefixList` of an exclusive transform and is ignored otherwise.
pub fn canonicalize(
    xml: &str,
    mode: C14nMode,
    node_set: Option<&NodeSet>,
    inclusive_prefixes: &[String],
) -> Result<Vec<u8>, Error> {
    let doc = paysig_xml::parse(xml)?;
    canonicalize_doc(&doc, mode, node_set, inclusive_prefixes)
}

/// Canonicalize an already parsed document.
pub fn canonicalize_doc(
    doc: &roxmltree::Document<'_>,
    mode: C14nMode,
    node_set: Option<&NodeSet>,
    inclusive_prefixes: &[String],
) -> Result<Vec<u8>, Error> {
    if mode.is_exclusive() {
        exclusive::canonicalize(doc, mode.with_comments(), node_set, inclusive_prefixes)
    } else {
        inclusive::canonicalize(doc, mode.with_comments(), node_set)
    }
}

/// Canonicalize the subtree rooted at `node` (comments removed unless the
/// mode keeps them).
pub fn canonicalize_subtree(
    node: roxmltree::Node<'_, '_>,
    mode: C14nMode,
    inclusive_prefixes: &[String],
) -> Result<Vec<u8>, Error> {
    let subset = if mode.with_comments() {
        let mut set = NodeSet::tree_without_comments(node);
        for comment in node.descendants().filter(|n| n.is_comment()) {
            set.insert(&comment);
        }
        set
    } else {
        NodeSet::tree_without_comments(node)
    };
    canonicalize_doc(node.document(), mode, Some(&subset), inclusive_prefixes)
}

/// Split an `InclusiveNamespaces` `PrefixList` attribute value.
pub fn parse_prefix_list(value: &str) -> Vec<String> {
    value.split_whitespace().map(str::to_owned).collect()
}
