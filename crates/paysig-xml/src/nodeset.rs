#![forbid(unsafe_code)]

//! Document subsets for canonicalization and transforms.
//!
//! A `NodeSet` holds node ids of one parsed document. Ids are stable for
//! a given text and [`crate::parsing_options`], so a set computed on one
//! parse may be applied to a re-parse of the same text.

use std::collections::HashSet;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NodeSet {
    nodes: HashSet<roxmltree::NodeId>,
}

impl NodeSet {
    /// Every node of the document, including comments.
    pub fn all(doc: &roxmltree::Document<'_>) -> Self {
        Self {
            nodes: doc.root().descendants().map(|n| n.id()).collect(),
        }
    }

    /// Every node of the document except comments (the `URI=""` selection).
    pub fn all_without_comments(doc: &roxmltree::Document<'_>) -> Self {
        Self::tree_without_comments(doc.root())
    }

    /// The subtree rooted at `root`, without comment nodes (the `#id`
    /// selection).
    pub fn tree_without_comments(root: roxmltree::Node<'_, '_>) -> Self {
        Self {
            nodes: root
                .descendants()
                .filter(|n| !n.is_comment())
                .map(|n| n.id())
                .collect(),
        }
    }

    pub fn contains(&self, node: &roxmltree::Node<'_, '_>) -> bool {
        self.nodes.contains(&node.id())
    }

    pub fn insert(&mut self, node: &roxmltree::Node<'_, '_>) {
        self.nodes.insert(node.id());
    }

    /// Remove `root` and all of its descendants.
    pub fn remove_subtree(&mut self, root: roxmltree::Node<'_, '_>) {
        for node in root.descendants() {
            self.nodes.remove(&node.id());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tree_skips_comments() {
        let doc = crate::parse("<a><!-- note --><b>t</b></a>").unwrap();
        let a = doc.root_element();
        let set = NodeSet::tree_without_comments(a);
        for node in a.descendants() {
            assert_eq!(set.contains(&node), !node.is_comment());
        }
        assert!(!set.contains(&doc.root()));
    }

    #[test]
    fn test_remove_subtree() {
        let doc = crate::parse("<a><b><c/></b><d/></a>").unwrap();
        let mut set = NodeSet::all(&doc);
        let b = doc.descendants().find(|n| n.has_tag_name("b")).unwrap();
        set.remove_subtree(b);
        assert!(!set.contains(&b));
        let c = doc.descendants().find(|n| n.has_tag_name("c")).unwrap();
        assert!(!set.contains(&c));
        let d = doc.descendants().find(|n| n.has_tag_name("d")).unwrap();
        assert!(set.contains(&d));
    }
}
