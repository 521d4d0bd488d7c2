#![forbid(unsafe_code)]

//! Enveloped signature transform: drops the `<Signature>` subtree from
//! the node set being digested.

use crate::pipeline::{Transform, TransformData};
use paysig_core::{algorithm, Error};
use paysig_xml::NodeSet;

pub struct EnvelopedSignatureTransform {
    signature: Option<roxmltree::NodeId>,
}

impl EnvelopedSignatureTransform {
    /// `None` makes the transform a no-op, which is what it amounts to
    /// before the signature has been inserted.
    pub fn new(signature: Option<roxmltree::NodeId>) -> Self {
        Self { signature }
    }
}

impl Transform for EnvelopedSignatureTransform {
    fn uri(&self) -> &str {
        algorithm::ENVELOPED_SIGNATURE
    }

    fn execute(&self, input: TransformData) -> Result<TransformData, Error> {
        let TransformData::Xml { xml_text, node_set } = input else {
            return Err(Error::Transform(
                "enveloped-signature transform requires a node set".into(),
            ));
        };
        let Some(signature_id) = self.signature else {
            return Ok(TransformData::Xml { xml_text, node_set });
        };

        let doc = paysig_xml::parse(&xml_text)?;
        let signature = doc
            .get_node(signature_id)
            .filter(|n| n.is_element())
            .ok_or_else(|| Error::Transform("signature element not found in document".into()))?;
        let mut set = node_set.unwrap_or_else(|| NodeSet::all(&doc));
        set.remove_subtree(signature);
        drop(doc);

        Ok(TransformData::Xml {
            xml_text,
            node_set: Some(set),
        })
    }
}
