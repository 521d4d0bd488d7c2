#![forbid(unsafe_code)]

//! Enveloped signature verification.
//!
//! Processing order:
//! 1. Normalize and parse the document, load the verification key
//! 2. Locate the single `<Signature>` and read `SignedInfo`
//! 3. Resolve the `Reference`, check that it covers the document element
//!    enclosing the signature, run its transforms, compare the digest
//! 4. Canonicalize `SignedInfo` and check `SignatureValue`
//! 5. Collect the unsigned metadata of `<Signature>`
//!
//! A signature that is well-formed but does not hold is not an error: it
//! is reported as `is_valid: false` with the failed check in `details`.

use crate::annotate::{single_signature, SignatureMetadata};
use crate::context::DsigContext;
use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use paysig_c14n::C14nMode;
use paysig_core::ns::{self, attr, node};
use paysig_core::Error;
use paysig_crypto::{DigestMethod, SignatureMethod};
use paysig_keys::loader;
use paysig_transforms::{uri, TransformPipeline, TransformSpec};
use paysig_xml::document::{
    find_child_element, find_child_elements, parse_same_document_ref, require_attribute,
    require_child_element,
};
use paysig_xml::IdMap;
use serde::Serialize;
use tracing::{debug, info, warn};

/// Outcome of a verification that ran to completion.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidationResult {
    pub is_valid: bool,
    pub details: ValidationDetails,
}

/// Why a signature failed, or what a valid one carries.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum ValidationDetails {
    Failure(String),
    Metadata(SignatureMetadata),
}

impl ValidationResult {
    fn valid(metadata: SignatureMetadata) -> Self {
        Self {
            is_valid: true,
            details: ValidationDetails::Metadata(metadata),
        }
    }

    fn invalid(reason: impl Into<String>) -> Self {
        Self {
            is_valid: false,
            details: ValidationDetails::Failure(reason.into()),
        }
    }

    pub fn metadata(&self) -> Option<&SignatureMetadata> {
        match &self.details {
            ValidationDetails::Metadata(metadata) => Some(metadata),
            ValidationDetails::Failure(_) => None,
        }
    }

    pub fn failure(&self) -> Option<&str> {
        match &self.details {
            ValidationDetails::Failure(reason) => Some(reason),
            ValidationDetails::Metadata(_) => None,
        }
    }
}

/// `SignedInfo` as read from a document.
struct ParsedSignedInfo<'a, 'input> {
    node: roxmltree::Node<'a, 'input>,
    c14n_mode: C14nMode,
    inclusive_prefixes: Vec<String>,
    signature_method: SignatureMethod,
    reference: ParsedReference,
}

struct ParsedReference {
    uri: String,
    transforms: Vec<TransformSpec>,
    digest_method: DigestMethod,
    digest_value: String,
}

/// Checks signed documents against the verification credential of a
/// [`DsigContext`].
#[derive(Debug, Clone)]
pub struct Verifier {
    context: DsigContext,
}

impl Verifier {
    pub fn new(context: DsigContext) -> Self {
        Self { context }
    }

    pub fn context(&self) -> &DsigContext {
        &self.context
    }

    #[tracing::instrument(skip(self, xml), fields(len = xml.len()))]
    pub fn verify(&self, xml: &str) -> Result<ValidationResult, Error> {
        let normalized = paysig_xml::normalize(xml);
        debug!("normalized");

        let doc = paysig_xml::parse(&normalized)?;
        debug!("parsed");

        let certificate = self.context.credentials.verification_certificate()?;
        let public_key = loader::verifying_key(&certificate)?;
        debug!(source = certificate.source(), "credentials loaded");

        let signature = single_signature(&doc)?;
        let signed_info = read_signed_info(signature)?;

        // Reference digest
        let ids = IdMap::build(&doc);
        let reference = &signed_info.reference;
        let input = match uri::reference_input(&reference.uri, &normalized, &doc, &ids) {
            Ok(input) => input,
            Err(Error::ReferenceUnresolved(reason)) => {
                return Ok(rejected(format!("reference {} not resolved: {reason}", reference.uri)));
            }
            Err(e) => return Err(e),
        };
        if let Some(reason) = enveloping_mismatch(&reference.uri, &doc, &ids, signature)? {
            return Ok(rejected(reason));
        }
        let pipeline = TransformPipeline::from_specs(&reference.transforms, Some(signature.id()))?;
        debug!(transforms = ?pipeline.uris().collect::<Vec<_>>(), "running reference transforms");
        let canonical = pipeline.execute(input)?.into_binary()?;
        let computed = reference.digest_method.digest(&canonical);
        match decode_base64(&reference.digest_value) {
            Some(expected) if expected == computed => {}
            Some(_) => return Ok(rejected(format!("digest mismatch for reference {}", reference.uri))),
            None => return Ok(rejected("DigestValue is not valid base64")),
        }
        debug!(reference = %reference.uri, "reference digest matches");

        // Signature value
        let value_node = require_child_element(signature, ns::DSIG, node::SIGNATURE_VALUE)?;
        let Some(value) = decode_base64(value_node.text().unwrap_or("")) else {
            return Ok(rejected("SignatureValue is not valid base64"));
        };
        let canonical_signed_info = paysig_c14n::canonicalize_subtree(
            signed_info.node,
            signed_info.c14n_mode,
            &signed_info.inclusive_prefixes,
        )?;
        if !signed_info
            .signature_method
            .verify(&public_key, &canonical_signed_info, &value)
        {
            return Ok(rejected("signature value does not match SignedInfo"));
        }

        info!(reference = %reference.uri, "signature valid");
        Ok(ValidationResult::valid(SignatureMetadata::extract(signature)))
    }
}

fn rejected(reason: impl Into<String>) -> ValidationResult {
    let result = ValidationResult::invalid(reason);
    warn!(reason = result.failure().unwrap_or_default(), "signature invalid");
    result
}

/// The referenced element must be the document element and the signature
/// one of its children.
fn enveloping_mismatch(
    uri: &str,
    doc: &roxmltree::Document<'_>,
    ids: &IdMap,
    signature: roxmltree::Node<'_, '_>,
) -> Result<Option<String>, Error> {
    let root = doc.root_element();
    let target = match parse_same_document_ref(uri) {
        Some(id) => ids.resolve(doc, id)?,
        None => root,
    };
    if target.id() != root.id() {
        return Ok(Some(format!("reference {uri} does not cover the document element")));
    }
    if signature.parent().map(|p| p.id()) != Some(root.id()) {
        return Ok(Some("signature is not enclosed by the referenced element".into()));
    }
    Ok(None)
}

/// Base64 with any embedded whitespace removed.
fn decode_base64(text: &str) -> Option<Vec<u8>> {
    let compact: String = text.chars().filter(|c| !c.is_whitespace()).collect();
    STANDARD.decode(compact).ok()
}

fn read_prefix_list(method: roxmltree::Node<'_, '_>) -> Vec<String> {
    method
        .children()
        .find(|n| n.is_element() && n.tag_name().name() == node::INCLUSIVE_NAMESPACES)
        .and_then(|n| n.attribute(attr::PREFIX_LIST))
        .map(paysig_c14n::parse_prefix_list)
        .unwrap_or_default()
}

fn read_signed_info<'a, 'input>(
    signature: roxmltree::Node<'a, 'input>,
) -> Result<ParsedSignedInfo<'a, 'input>, Error> {
    let signed_info = require_child_element(signature, ns::DSIG, node::SIGNED_INFO)?;

    let c14n_method = require_child_element(signed_info, ns::DSIG, node::CANONICALIZATION_METHOD)?;
    let c14n_mode = C14nMode::require(require_attribute(c14n_method, attr::ALGORITHM)?)?;
    let inclusive_prefixes = read_prefix_list(c14n_method);

    let signature_method = require_child_element(signed_info, ns::DSIG, node::SIGNATURE_METHOD)?;
    let signature_method = SignatureMethod::from_uri(require_attribute(signature_method, attr::ALGORITHM)?)?;

    let reference = match find_child_elements(signed_info, ns::DSIG, node::REFERENCE).as_slice() {
        [] => return Err(Error::MissingElement(node::REFERENCE.into())),
        [one] => read_reference(*one)?,
        many => {
            return Err(Error::XmlStructure(format!(
                "SignedInfo carries {} references, expected one",
                many.len()
            )))
        }
    };

    Ok(ParsedSignedInfo {
        node: signed_info,
        c14n_mode,
        inclusive_prefixes,
        signature_method,
        reference,
    })
}

fn read_reference(reference: roxmltree::Node<'_, '_>) -> Result<ParsedReference, Error> {
    let uri = reference.attribute(attr::URI).unwrap_or("").to_owned();

    let mut transforms = Vec::new();
    if let Some(list) = find_child_element(reference, ns::DSIG, node::TRANSFORMS) {
        for transform in find_child_elements(list, ns::DSIG, node::TRANSFORM) {
            let mut spec = TransformSpec::new(require_attribute(transform, attr::ALGORITHM)?);
            spec.inclusive_prefixes = read_prefix_list(transform);
            transforms.push(spec);
        }
    }

    let digest_method = require_child_element(reference, ns::DSIG, node::DIGEST_METHOD)?;
    let digest_method = DigestMethod::from_uri(require_attribute(digest_method, attr::ALGORITHM)?)?;
    let digest_value = require_child_element(reference, ns::DSIG, node::DIGEST_VALUE)?
        .text()
        .unwrap_or("")
        .to_owned();

    Ok(ParsedReference {
        uri,
        transforms,
        digest_method,
        digest_value,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sign::Signer;
    use chrono::{TimeZone, Utc};
    use paysig_keys::StaticCredentialProvider;
    use serde_json::json;
    use std::sync::Arc;

    const SIGNING_KEY: &str = include_str!("../tests/data/signing.key");
    const SIGNING_CERT: &str = include_str!("../tests/data/signing.crt");
    const SIGNING_PUB: &str = include_str!("../tests/data/signing.pub");

    fn signed_payment() -> String {
        let provider = StaticCredentialProvider::new(SIGNING_KEY, SIGNING_CERT).unwrap();
        let signer = Signer::new(DsigContext::with_defaults(Arc::new(provider)));
        let at = Utc.with_ymd_and_hms(2026, 2, 2, 8, 15, 30).unwrap();
        signer
            .sign_at(&json!({"amount": 42, "currency": "EUR"}), "Payment", None, at)
            .unwrap()
    }

    fn verifier_for(pem: &str) -> Verifier {
        let provider = StaticCredentialProvider::verification_only(pem).unwrap();
        Verifier::new(DsigContext::with_defaults(Arc::new(provider)))
    }

    #[test]
    fn test_valid_signature_reports_metadata() {
        let result = verifier_for(SIGNING_CERT).verify(&signed_payment()).unwrap();
        assert!(result.is_valid);
        let metadata = result.metadata().unwrap();
        assert_eq!(metadata.signing_date.as_deref(), Some("2026-02-02T08:15:30.000Z"));
        assert_eq!(metadata.additional_info["Origin"], "paysig");
    }

    #[test]
    fn test_public_key_pem_verifies() {
        let result = verifier_for(SIGNING_PUB).verify(&signed_payment()).unwrap();
        assert!(result.is_valid);
    }

    #[test]
    fn test_result_json_shape() {
        let invalid = ValidationResult::invalid("digest mismatch for reference #xml-data");
        assert_eq!(
            serde_json::to_value(&invalid).unwrap(),
            json!({"isValid": false, "details": "digest mismatch for reference #xml-data"})
        );

        let valid = verifier_for(SIGNING_CERT).verify(&signed_payment()).unwrap();
        let json = serde_json::to_value(&valid).unwrap();
        assert_eq!(json["isValid"], true);
        assert_eq!(json["details"]["signingDate"], "2026-02-02T08:15:30.000Z");
        assert_eq!(json["details"]["additionalInfo"]["SigningDate"], "2026-02-02T08:15:30.000Z");
    }

    #[test]
    fn test_reformatted_document_still_verifies() {
        let pretty = signed_payment().replace("><", ">\n  <");
        let result = verifier_for(SIGNING_CERT).verify(&pretty).unwrap();
        assert!(result.is_valid, "{:?}", result.details);
    }

    #[test]
    fn test_bad_base64_is_invalid_not_error() {
        let signed = signed_payment();
        let start = signed.find("<DigestValue>").unwrap() + "<DigestValue>".len();
        let broken = format!("{}!!!{}", &signed[..start], &signed[start + 3..]);
        let result = verifier_for(SIGNING_CERT).verify(&broken).unwrap();
        assert!(!result.is_valid);
        assert_eq!(result.failure(), Some("DigestValue is not valid base64"));

        let start = signed.find("<SignatureValue>").unwrap() + "<SignatureValue>".len();
        let truncated = format!("{}{}", &signed[..start], &signed[start + 8..]);
        let result = verifier_for(SIGNING_CERT).verify(&truncated).unwrap();
        assert!(!result.is_valid);
    }

    #[test]
    fn test_moved_reference_is_invalid() {
        let signed = signed_payment().replace(r#"Id="xml-data""#, r#"Id="elsewhere""#);
        let result = verifier_for(SIGNING_CERT).verify(&signed).unwrap();
        assert!(!result.is_valid);
        assert!(result.failure().unwrap().contains("not resolved"));
    }

    #[test]
    fn test_signature_outside_referenced_element_is_invalid() {
        let signed = signed_payment();
        let start = signed.find("<Signature ").unwrap();
        let end = signed.find("</Signature>").unwrap() + "</Signature>".len();
        let signature = &signed[start..end];
        let body = signed.replacen(signature, "", 1);
        let root_start = body.find("<Payment").unwrap();
        let moved = format!("<Envelope>{}{signature}</Envelope>", &body[root_start..]);

        let result = verifier_for(SIGNING_CERT).verify(&moved).unwrap();
        assert!(!result.is_valid);
        assert_eq!(
            result.failure(),
            Some("reference #xml-data does not cover the document element")
        );
    }

    #[test]
    fn test_malformed_signed_info() {
        let verifier = verifier_for(SIGNING_CERT);
        let signed = signed_payment();

        let no_method = signed.replace(
            r#"<SignatureMethod Algorithm="http://www.w3.org/2001/04/xmldsig-more#rsa-sha256"/>"#,
            "",
        );
        assert_eq!(verifier.verify(&no_method).unwrap_err().code(), "SIGNATURE_MALFORMED");

        let md5 = signed.replace(
            "http://www.w3.org/2001/04/xmlenc#sha256",
            "http://www.w3.org/2001/04/xmldsig-more#md5",
        );
        assert_eq!(verifier.verify(&md5).unwrap_err().code(), "UNSUPPORTED_ALGORITHM");

        let start = signed.find("<Reference ").unwrap();
        let end = signed.find("</Reference>").unwrap() + "</Reference>".len();
        let reference = &signed[start..end];
        let twice = signed.replace(reference, &format!("{reference}{reference}"));
        assert_eq!(verifier.verify(&twice).unwrap_err().code(), "XML_STRUCTURE");

        let none = signed.replace(reference, "");
        assert_eq!(verifier.verify(&none).unwrap_err().code(), "SIGNATURE_MALFORMED");
    }

    #[test]
    fn test_unusable_certificate_is_key_error() {
        let verifier = verifier_for("-----BEGIN CERTIFICATE-----\nAAAA\n-----END CERTIFICATE-----\n");
        let err = verifier.verify(&signed_payment()).unwrap_err();
        assert_eq!(err.code(), "KEY_MATERIAL_INVALID");
    }
}
