#![forbid(unsafe_code)]

//! Unsigned metadata carried inside `<Signature>`.
//!
//! An [`Annotation`] is layered onto a document after its signature value
//! exists: a `signingDate` attribute on `<Signature>` and an
//! `<AdditionalInfo>` child placed after `KeyInfo`. Neither is covered by
//! the digest (the enveloped transform drops the whole `<Signature>`) nor
//! by the signature value (only `SignedInfo` is signed), so adding,
//! altering or removing them leaves verification unchanged.

use chrono::{DateTime, SecondsFormat, Utc};
use paysig_core::ns::{self, attr, node};
use paysig_core::Error;
use paysig_xml::document::find_elements;
use paysig_xml::edit::{self, escape_text};
use serde::Serialize;
use std::collections::BTreeMap;

/// Signing timestamp and origin tag.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Annotation {
    pub signing_date: String,
    pub origin: String,
}

impl Annotation {
    pub fn new(signing_date: DateTime<Utc>, origin: impl Into<String>) -> Self {
        Self {
            signing_date: signing_date.to_rfc3339_opts(SecondsFormat::Millis, true),
            origin: origin.into(),
        }
    }

    /// Attach this annotation to the single `<Signature>` of `xml`.
    pub fn apply(&self, xml: &str) -> Result<String, Error> {
        let doc = paysig_xml::parse(xml)?;
        let signature = single_signature(&doc)?;
        let fragment = format!(
            "<{info}><{date}>{}</{date}><{origin}>{}</{origin}></{info}>",
            escape_text(&self.signing_date),
            escape_text(&self.origin),
            info = node::ADDITIONAL_INFO,
            date = node::SIGNING_DATE,
            origin = node::ORIGIN,
        );
        let with_info = edit::append_child(signature, &fragment)?;

        // Node ids are stable across parses of the same text.
        let doc = paysig_xml::parse(&with_info)?;
        let signature = doc
            .get_node(signature.id())
            .ok_or_else(|| Error::SignatureMissing("signature vanished while annotating".into()))?;
        edit::set_attribute(signature, attr::SIGNING_DATE, &self.signing_date)
    }
}

/// The only `<Signature>` element of `doc`.
pub(crate) fn single_signature<'a, 'input>(
    doc: &'a roxmltree::Document<'input>,
) -> Result<roxmltree::Node<'a, 'input>, Error> {
    match find_elements(doc, ns::DSIG, node::SIGNATURE).as_slice() {
        [] => Err(Error::SignatureMissing(format!(
            "no {} element in the {} namespace",
            node::SIGNATURE,
            ns::DSIG
        ))),
        [one] => Ok(*one),
        many => Err(Error::XmlStructure(format!(
            "document carries {} signatures, expected one",
            many.len()
        ))),
    }
}

/// Descriptive content of a verified `<Signature>`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SignatureMetadata {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub signing_date: Option<String>,
    /// Children of `<AdditionalInfo>`, by local name.
    pub additional_info: BTreeMap<String, String>,
    /// Other attributes of `<Signature>`, by qualified name.
    pub attributes: BTreeMap<String, String>,
}

impl SignatureMetadata {
    pub fn extract(signature: roxmltree::Node<'_, '_>) -> Self {
        let mut metadata = Self::default();
        for a in signature.attributes() {
            if a.namespace().is_none() && a.name() == attr::SIGNING_DATE {
                metadata.signing_date = Some(a.value().to_owned());
            } else {
                let qname = edit::attribute_qname(signature, &a);
                metadata.attributes.insert(qname.to_owned(), a.value().to_owned());
            }
        }

        let infos = signature
            .children()
            .filter(|n| n.is_element() && n.tag_name().name() == node::ADDITIONAL_INFO);
        for info in infos {
            for item in info.children().filter(|n| n.is_element()) {
                let text: String = item
                    .descendants()
                    .filter(|n| n.is_text())
                    .filter_map(|n| n.text())
                    .collect();
                metadata
                    .additional_info
                    .insert(item.tag_name().name().to_owned(), text);
            }
        }
        metadata
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    const SIGNED: &str = concat!(
        r#"<Payment Id="xml-data"><amount>1</amount>"#,
        r#"<Signature xmlns="http://www.w3.org/2000/09/xmldsig#"><SignedInfo/><SignatureValue/></Signature>"#,
        "</Payment>"
    );

    fn annotation() -> Annotation {
        let at = Utc.with_ymd_and_hms(2026, 3, 1, 12, 30, 0).unwrap();
        Annotation::new(at, "gateway & co")
    }

    #[test]
    fn test_timestamp_format() {
        assert_eq!(annotation().signing_date, "2026-03-01T12:30:00.000Z");
    }

    #[test]
    fn test_apply_places_metadata_after_signed_parts() {
        let out = annotation().apply(SIGNED).unwrap();
        assert!(out.contains(
            r#"<Signature xmlns="http://www.w3.org/2000/09/xmldsig#" signingDate="2026-03-01T12:30:00.000Z">"#
        ));
        assert!(out.contains(concat!(
            "<SignatureValue/><AdditionalInfo><SigningDate>2026-03-01T12:30:00.000Z</SigningDate>",
            "<Origin>gateway &amp; co</Origin></AdditionalInfo></Signature></Payment>"
        )));
    }

    #[test]
    fn test_extract_round_trips_annotation() {
        let out = annotation().apply(SIGNED).unwrap();
        let doc = paysig_xml::parse(&out).unwrap();
        let metadata = SignatureMetadata::extract(single_signature(&doc).unwrap());
        assert_eq!(metadata.signing_date.as_deref(), Some("2026-03-01T12:30:00.000Z"));
        assert_eq!(metadata.additional_info["Origin"], "gateway & co");
        assert_eq!(metadata.additional_info["SigningDate"], "2026-03-01T12:30:00.000Z");
        assert!(metadata.attributes.is_empty());
    }

    #[test]
    fn test_extract_other_attributes_and_json_shape() {
        let xml = r#"<r><Signature xmlns="http://www.w3.org/2000/09/xmldsig#" Id="sig-1"/></r>"#;
        let doc = paysig_xml::parse(xml).unwrap();
        let metadata = SignatureMetadata::extract(single_signature(&doc).unwrap());
        assert_eq!(metadata.attributes["Id"], "sig-1");
        let json = serde_json::to_value(&metadata).unwrap();
        assert_eq!(
            json,
            serde_json::json!({"additionalInfo": {}, "attributes": {"Id": "sig-1"}})
        );
    }

    #[test]
    fn test_signature_lookup() {
        let doc = paysig_xml::parse("<Root>no signature here</Root>").unwrap();
        assert_eq!(single_signature(&doc).unwrap_err().code(), "SIGNATURE_MISSING");

        // Same local name, wrong namespace.
        let doc = paysig_xml::parse("<Root><Signature/></Root>").unwrap();
        assert_eq!(single_signature(&doc).unwrap_err().code(), "SIGNATURE_MISSING");

        let two = r#"<R xmlns:ds="http://www.w3.org/2000/09/xmldsig#"><ds:Signature/><ds:Signature/></R>"#;
        let doc = paysig_xml::parse(two).unwrap();
        assert_eq!(single_signature(&doc).unwrap_err().code(), "XML_STRUCTURE");
    }

    #[test]
    fn test_apply_without_signature_fails() {
        let err = annotation().apply("<Payment/>").unwrap_err();
        assert_eq!(err.code(), "SIGNATURE_MISSING");
    }
}
