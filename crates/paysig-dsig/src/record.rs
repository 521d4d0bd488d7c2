#![forbid(unsafe_code)]

//! The signed part of a `<Signature>`: `SignedInfo`, `SignatureValue`
//! and `KeyInfo`.
//!
//! Rendering is compact (no whitespace between elements) and uses the
//! XML-DSig namespace as default namespace on `<Signature>`. A record
//! rendered with an empty value and again with the computed value differs
//! only inside `SignatureValue`, so `SignedInfo` canonicalizes to the
//! same octets both times.

use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use paysig_core::ns::{self, node};
use paysig_xml::edit::{escape_attribute_value, escape_text};

/// One `<Reference>` element.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reference {
    /// Target element id, without the leading `#`.
    pub target_id: String,
    pub transforms: Vec<String>,
    pub digest_method: String,
    pub digest_value: Vec<u8>,
}

impl Reference {
    pub fn uri(&self) -> String {
        format!("#{}", self.target_id)
    }

    fn render_into(&self, out: &mut String) {
        open_with_attr(out, node::REFERENCE, ns::attr::URI, &self.uri());
        out.push('>');
        if !self.transforms.is_empty() {
            open(out, node::TRANSFORMS);
            for transform in &self.transforms {
                algorithm_element(out, node::TRANSFORM, transform);
            }
            close(out, node::TRANSFORMS);
        }
        algorithm_element(out, node::DIGEST_METHOD, &self.digest_method);
        text_element(out, node::DIGEST_VALUE, &STANDARD.encode(&self.digest_value));
        close(out, node::REFERENCE);
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignedInfo {
    pub canonicalization: String,
    pub signature_method: String,
    pub references: Vec<Reference>,
}

impl SignedInfo {
    fn render_into(&self, out: &mut String) {
        open(out, node::SIGNED_INFO);
        algorithm_element(out, node::CANONICALIZATION_METHOD, &self.canonicalization);
        algorithm_element(out, node::SIGNATURE_METHOD, &self.signature_method);
        for reference in &self.references {
            reference.render_into(out);
        }
        close(out, node::SIGNED_INFO);
    }
}

/// Everything in `<Signature>` that the signature value depends on or
/// carries. Unsigned metadata lives in [`crate::Annotation`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignatureRecord {
    pub signed_info: SignedInfo,
    /// Empty until computed.
    pub signature_value: Vec<u8>,
    /// DER of the signer certificate, embedded in `KeyInfo`.
    pub certificate: Option<Vec<u8>>,
}

impl SignatureRecord {
    /// A record whose value has not been computed yet.
    pub fn template(signed_info: SignedInfo, certificate: Option<Vec<u8>>) -> Self {
        Self {
            signed_info,
            signature_value: Vec::new(),
            certificate,
        }
    }

    pub fn with_value(self, signature_value: Vec<u8>) -> Self {
        Self {
            signature_value,
            ..self
        }
    }

    pub fn render(&self) -> String {
        let mut out = String::with_capacity(2048);
        open_with_attr(&mut out, node::SIGNATURE, "xmlns", ns::DSIG);
        out.push('>');
        self.signed_info.render_into(&mut out);
        text_element(&mut out, node::SIGNATURE_VALUE, &STANDARD.encode(&self.signature_value));
        if let Some(der) = &self.certificate {
            open(&mut out, node::KEY_INFO);
            open(&mut out, node::X509_DATA);
            text_element(&mut out, node::X509_CERTIFICATE, &STANDARD.encode(der));
            close(&mut out, node::X509_DATA);
            close(&mut out, node::KEY_INFO);
        }
        close(&mut out, node::SIGNATURE);
        out
    }
}

fn open(out: &mut String, name: &str) {
    out.push('<');
    out.push_str(name);
    out.push('>');
}

fn open_with_attr(out: &mut String, name: &str, attr: &str, value: &str) {
    out.push('<');
    out.push_str(name);
    out.push(' ');
    out.push_str(attr);
    out.push_str("=\"");
    out.push_str(&escape_attribute_value(value));
    out.push('"');
}

fn close(out: &mut String, name: &str) {
    out.push_str("</");
    out.push_str(name);
    out.push('>');
}

fn algorithm_element(out: &mut String, name: &str, uri: &str) {
    open_with_attr(out, name, ns::attr::ALGORITHM, uri);
    out.push_str("/>");
}

fn text_element(out: &mut String, name: &str, text: &str) {
    open(out, name);
    out.push_str(&escape_text(text));
    close(out, name);
}

#[cfg(test)]
mod tests {
    use super::*;
    use paysig_core::algorithm;

    fn signed_info() -> SignedInfo {
        SignedInfo {
            canonicalization: algorithm::EXC_C14N.into(),
            signature_method: algorithm::RSA_SHA256.into(),
            references: vec![Reference {
                target_id: "xml-data".into(),
                transforms: algorithm::DEFAULT_TRANSFORMS.iter().map(|t| t.to_string()).collect(),
                digest_method: algorithm::SHA256.into(),
                digest_value: vec![0u8; 32],
            }],
        }
    }

    #[test]
    fn test_render_layout() {
        let xml = SignatureRecord::template(signed_info(), Some(vec![0x30, 0x82])).render();
        assert!(xml.starts_with(
            r#"<Signature xmlns="http://www.w3.org/2000/09/xmldsig#"><SignedInfo><CanonicalizationMethod Algorithm="http://www.w3.org/2001/10/xml-exc-c14n#"/>"#
        ));
        assert!(xml.contains(r##"<Reference URI="#xml-data"><Transforms><Transform Algorithm="http://www.w3.org/2000/09/xmldsig#enveloped-signature"/>"##));
        assert!(xml.contains("<DigestValue>AAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAA=</DigestValue>"));
        assert!(xml.contains("<SignatureValue></SignatureValue>"));
        assert!(xml.ends_with("<KeyInfo><X509Data><X509Certificate>MII=</X509Certificate></X509Data></KeyInfo></Signature>"));
        paysig_xml::parse(&xml).unwrap();
    }

    #[test]
    fn test_value_only_changes_signature_value() {
        let template = SignatureRecord::template(signed_info(), None);
        let empty = template.render();
        let filled = template.with_value(vec![1, 2, 3]).render();
        assert_eq!(
            empty.replace("<SignatureValue></SignatureValue>", "<SignatureValue>AQID</SignatureValue>"),
            filled
        );
        assert!(!filled.contains(node::KEY_INFO));
    }
}
