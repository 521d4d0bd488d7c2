#![allow(dead_code)]

use chrono::{DateTime, TimeZone, Utc};
use paysig_dsig::{DsigContext, Signer, Verifier};
use paysig_keys::{FileCredentialProvider, StaticCredentialProvider};
use serde_json::{json, Value};
use std::path::PathBuf;
use std::sync::Arc;

pub fn data_path(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("tests/data").join(name)
}

pub fn read_data(name: &str) -> String {
    std::fs::read_to_string(data_path(name)).unwrap()
}

pub fn signer() -> Signer {
    let provider =
        FileCredentialProvider::new(Some(data_path("signing.key")), data_path("signing.crt"));
    Signer::new(DsigContext::with_defaults(Arc::new(provider)))
}

pub fn verifier() -> Verifier {
    verifier_for("signing.crt")
}

pub fn verifier_for(certificate: &str) -> Verifier {
    let provider = StaticCredentialProvider::verification_only(&read_data(certificate)).unwrap();
    Verifier::new(DsigContext::with_defaults(Arc::new(provider)))
}

pub fn signing_date() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 4, 20, 14, 5, 9).unwrap()
}

pub fn payment() -> Value {
    json!({
        "amount": 100.50,
        "currency": "USD",
        "transaction_id": "txn_1"
    })
}

pub fn signed_payment() -> String {
    signer()
        .sign_at(&payment(), "Payment", None, signing_date())
        .unwrap()
}

/// Text between the first `<name>` start tag and its end tag.
pub fn element_text<'a>(xml: &'a str, name: &str) -> &'a str {
    let open = format!("<{name}>");
    let start = xml.find(&open).unwrap() + open.len();
    let end = start + xml[start..].find(&format!("</{name}>")).unwrap();
    &xml[start..end]
}
