#![forbid(unsafe_code)]

//! Transform pipeline and trait definitions.

use crate::enveloped::EnvelopedSignatureTransform;
use paysig_c14n::C14nMode;
use paysig_core::{algorithm, Error};
use paysig_xml::NodeSet;

/// Data flowing through the pipeline.
#[derive(Debug, Clone)]
pub enum TransformData {
    /// A document and the subset of it selected so far (`None` = all).
    Xml {
        xml_text: String,
        node_set: Option<NodeSet>,
    },
    /// Octets, after a canonicalization transform.
    Binary(Vec<u8>),
}

impl TransformData {
    /// Final octets of the chain. A node set left over at the end is
    /// serialized with inclusive C14N without comments.
    pub fn into_binary(self) -> Result<Vec<u8>, Error> {
        match self {
            TransformData::Binary(data) => Ok(data),
            TransformData::Xml { xml_text, node_set } => {
                paysig_c14n::canonicalize(&xml_text, C14nMode::Inclusive, node_set.as_ref(), &[])
            }
        }
    }
}

pub trait Transform: Send + Sync {
    fn uri(&self) -> &str;

    fn execute(&self, input: TransformData) -> Result<TransformData, Error>;
}

/// One `<Transform>` entry: its algorithm and, for exclusive
/// canonicalization, the `InclusiveNamespaces` prefix list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransformSpec {
    pub algorithm: String,
    pub inclusive_prefixes: Vec<String>,
}

impl TransformSpec {
    pub fn new(algorithm: impl Into<String>) -> Self {
        Self {
            algorithm: algorithm.into(),
            inclusive_prefixes: Vec::new(),
        }
    }

    /// Whether `uri` names a transform this crate can run.
    pub fn is_supported(uri: &str) -> bool {
        uri == algorithm::ENVELOPED_SIGNATURE || C14nMode::from_uri(uri).is_some()
    }
}

#[derive(Default)]
pub struct TransformPipeline {
    transforms: Vec<Box<dyn Transform>>,
}

impl TransformPipeline {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build the chain for a reference.
    ///
    /// `signature` is the `<Signature>` element the enveloped transform
    /// removes; `None` while signing, before the element exists.
    pub fn from_specs(
        specs: &[TransformSpec],
        signature: Option<roxmltree::NodeId>,
    ) -> Result<Self, Error> {
        let mut pipeline = Self::new();
        for spec in specs {
            if spec.algorithm == algorithm::ENVELOPED_SIGNATURE {
                pipeline.push(Box::new(EnvelopedSignatureTransform::new(signature)));
            } else if let Some(mode) = C14nMode::from_uri(&spec.algorithm) {
                pipeline.push(Box::new(C14nTransform::new(mode, spec.inclusive_prefixes.clone())));
            } else {
                return Err(Error::UnsupportedAlgorithm(format!(
                    "transform {}",
                    spec.algorithm
                )));
            }
        }
        Ok(pipeline)
    }

    pub fn push(&mut self, transform: Box<dyn Transform>) {
        self.transforms.push(transform);
    }

    pub fn execute(&self, input: TransformData) -> Result<TransformData, Error> {
        self.transforms
            .iter()
            .try_fold(input, |data, transform| transform.execute(data))
    }

    pub fn uris(&self) -> impl Iterator<Item = &str> {
        self.transforms.iter().map(|t| t.uri())
    }
}

// ── Canonicalization ─────────────────────────────────────────────────

pub struct C14nTransform {
    mode: C14nMode,
    inclusive_prefixes: Vec<String>,
}

impl C14nTransform {
    pub fn new(mode: C14nMode, inclusive_prefixes: Vec<String>) -> Self {
        Self {
            mode,
            inclusive_prefixes,
        }
    }
}

impl Transform for C14nTransform {
    fn uri(&self) -> &str {
        self.mode.uri()
    }

    fn execute(&self, input: TransformData) -> Result<TransformData, Error> {
        let bytes = match input {
            TransformData::Xml { xml_text, node_set } => paysig_c14n::canonicalize(
                &xml_text,
                self.mode,
                node_set.as_ref(),
                &self.inclusive_prefixes,
            )?,
            TransformData::Binary(data) => {
                let text = std::str::from_utf8(&data)
                    .map_err(|e| Error::Transform(format!("octet input is not UTF-8: {e}")))?;
                paysig_c14n::canonicalize(text, self.mode, None, &self.inclusive_prefixes)?
            }
        };
        Ok(TransformData::Binary(bytes))
    }
}
