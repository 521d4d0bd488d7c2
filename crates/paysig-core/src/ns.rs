#![forbid(unsafe_code)]

//! Namespace URIs and element/attribute names used by signed documents.

/// XML Digital Signature namespace
pub const DSIG: &str = "http://www.w3.org/2000/09/xmldsig#";

/// XML namespace (bound to the `xml` prefix)
pub const XML: &str = "http://www.w3.org/XML/1998/namespace";

/// Attribute names treated as element identifiers when resolving `#id`
/// references.
pub const ID_ATTRS: [&str; 3] = ["Id", "ID", "id"];

// ── Element names ────────────────────────────────────────────────────

pub mod node {
    pub const SIGNATURE: &str = "Signature";
    pub const SIGNED_INFO: &str = "SignedInfo";
    pub const CANONICALIZATION_METHOD: &str = "CanonicalizationMethod";
    pub const SIGNATURE_METHOD: &str = "SignatureMethod";
    pub const SIGNATURE_VALUE: &str = "SignatureValue";
    pub const REFERENCE: &str = "Reference";
    pub const TRANSFORMS: &str = "Transforms";
    pub const TRANSFORM: &str = "Transform";
    pub const DIGEST_METHOD: &str = "DigestMethod";
    pub const DIGEST_VALUE: &str = "DigestValue";
    pub const KEY_INFO: &str = "KeyInfo";
    pub const X509_DATA: &str = "X509Data";
    pub const X509_CERTIFICATE: &str = "X509Certificate";
    pub const INCLUSIVE_NAMESPACES: &str = "InclusiveNamespaces";

    // Unsigned descriptive metadata appended after signing
    pub const ADDITIONAL_INFO: &str = "AdditionalInfo";
    pub const SIGNING_DATE: &str = "SigningDate";
    pub const ORIGIN: &str = "Origin";
}

// ── Attribute names ──────────────────────────────────────────────────

pub mod attr {
    pub const ID: &str = "Id";
    pub const URI: &str = "URI";
    pub const ALGORITHM: &str = "Algorithm";
    pub const PREFIX_LIST: &str = "PrefixList";
    pub const SIGNING_DATE: &str = "signingDate";
}
