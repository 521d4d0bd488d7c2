#![forbid(unsafe_code)]

//! Enveloped signature creation.
//!
//! A record is serialized and normalized, its root element gets the
//! reference `Id`, and a `<Signature>` is appended to it. The signature
//! value is computed over `SignedInfo` as it is canonicalized inside the
//! finished document, so the template is placed in the tree first and the
//! value filled in afterwards.

use crate::annotate::{single_signature, Annotation};
use crate::context::{validate_reference_id, DsigContext};
use crate::record::{Reference, SignatureRecord, SignedInfo};
use chrono::{DateTime, Utc};
use paysig_core::ns::{self, attr, node};
use paysig_core::Error;
use paysig_keys::{loader, PemMaterial};
use paysig_transforms::{uri, TransformPipeline};
use paysig_xml::document::{find_element, require_child_element};
use paysig_xml::{edit, IdMap};
use serde_json::Value;
use tracing::{debug, info};

/// Produces signed documents with the credentials and settings of a
/// [`DsigContext`].
#[derive(Debug, Clone)]
pub struct Signer {
    context: DsigContext,
}

impl Signer {
    pub fn new(context: DsigContext) -> Self {
        Self { context }
    }

    pub fn context(&self) -> &DsigContext {
        &self.context
    }

    /// Serialize `record` under `root_name` and sign it.
    ///
    /// `reference_id` overrides the configured `Id` value.
    pub fn sign(
        &self,
        record: &Value,
        root_name: &str,
        reference_id: Option<&str>,
    ) -> Result<String, Error> {
        self.sign_at(record, root_name, reference_id, Utc::now())
    }

    /// [`Signer::sign`] with a fixed signing timestamp.
    #[tracing::instrument(skip(self, record))]
    pub fn sign_at(
        &self,
        record: &Value,
        root_name: &str,
        reference_id: Option<&str>,
        signing_date: DateTime<Utc>,
    ) -> Result<String, Error> {
        let xml = paysig_xml::to_xml(record, root_name)?;
        self.sign_xml_at(&xml, reference_id, signing_date)
    }

    /// Sign an already serialized document.
    pub fn sign_xml(&self, xml: &str, reference_id: Option<&str>) -> Result<String, Error> {
        self.sign_xml_at(xml, reference_id, Utc::now())
    }

    #[tracing::instrument(skip(self, xml), fields(len = xml.len()))]
    pub fn sign_xml_at(
        &self,
        xml: &str,
        reference_id: Option<&str>,
        signing_date: DateTime<Utc>,
    ) -> Result<String, Error> {
        let config = &self.context.config;
        let id = match reference_id {
            Some(id) => {
                validate_reference_id(id)?;
                id
            }
            None => config.reference_id.as_str(),
        };

        let normalized = paysig_xml::normalize(xml);
        debug!("normalized");

        let doc = paysig_xml::parse(&normalized)?;
        if find_element(&doc, ns::DSIG, node::SIGNATURE).is_some() {
            return Err(Error::XmlStructure("document is already signed".into()));
        }
        debug!("parsed");

        // The root element is the only Reference anchor.
        let anchored = edit::set_attribute(doc.root_element(), attr::ID, id)?;
        let doc = paysig_xml::parse(&anchored)?;
        let ids = IdMap::build(&doc);
        let target = ids.resolve(&doc, id)?;

        let credentials = self.context.credentials.signing_credentials()?;
        let private_key = credentials.require_private_key()?;
        debug!(source = private_key.source(), "credentials loaded");

        let record = self
            .compute(&anchored, &doc, &ids, id, private_key, &credentials.certificate)
            .map_err(Error::signature_compute)?;
        debug!("signature computed");

        let signed = edit::append_child(target, &record.render())?;
        let annotated = Annotation::new(signing_date, config.origin.as_str()).apply(&signed)?;
        info!(reference_id = id, "document signed");
        Ok(annotated)
    }

    /// Build the signed part of `<Signature>` for the element `id` of
    /// `anchored`.
    fn compute(
        &self,
        anchored: &str,
        doc: &roxmltree::Document<'_>,
        ids: &IdMap,
        id: &str,
        private_key: &PemMaterial,
        certificate: &PemMaterial,
    ) -> Result<SignatureRecord, Error> {
        let config = &self.context.config;
        let c14n_mode = config.c14n_mode()?;
        let signature_method = config.signature_method()?;
        let digest_method = config.digest_method()?;

        let private_key = loader::rsa_private_key(private_key)?;
        let certificate = loader::certificate_der(certificate)?;

        // Digest the referenced element. The Signature does not exist yet,
        // so the enveloped transform has nothing to remove.
        let reference_uri = format!("#{id}");
        let input = uri::reference_input(&reference_uri, anchored, doc, ids)?;
        let pipeline = TransformPipeline::from_specs(&config.transform_specs(), None)?;
        let canonical = pipeline.execute(input)?.into_binary()?;
        let digest_value = digest_method.digest(&canonical);
        debug!(
            digest_method = digest_method.uri(),
            octets = canonical.len(),
            "reference digest computed"
        );

        let signed_info = SignedInfo {
            canonicalization: c14n_mode.uri().to_owned(),
            signature_method: signature_method.uri().to_owned(),
            references: vec![Reference {
                target_id: id.to_owned(),
                transforms: config.transforms.clone(),
                digest_method: digest_method.uri().to_owned(),
                digest_value,
            }],
        };
        let template = SignatureRecord::template(signed_info, Some(certificate));

        // Canonicalize SignedInfo in place so inherited namespaces match
        // what a verifier sees.
        let target = ids.resolve(doc, id)?;
        let with_template = edit::append_child(target, &template.render())?;
        let template_doc = paysig_xml::parse(&with_template)?;
        let signature = single_signature(&template_doc)?;
        let signed_info = require_child_element(signature, ns::DSIG, node::SIGNED_INFO)?;
        let canonical_signed_info = paysig_c14n::canonicalize_subtree(signed_info, c14n_mode, &[])?;

        let value = signature_method.sign(&private_key, &canonical_signed_info)?;
        Ok(template.with_value(value))
    }
}
