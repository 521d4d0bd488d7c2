#![forbid(unsafe_code)]

//! PEM decoding into RSA keys and certificate DER.

use crate::credentials::PemMaterial;
use der::{Decode, Encode};
use paysig_core::Error;
use rsa::{RsaPrivateKey, RsaPublicKey};

const LABEL_CERTIFICATE: &str = "CERTIFICATE";
const LABEL_PUBLIC_KEY: &str = "PUBLIC KEY";
const LABEL_RSA_PUBLIC_KEY: &str = "RSA PUBLIC KEY";

fn key_error(pem: &PemMaterial, what: &str, err: impl std::fmt::Display) -> Error {
    Error::Key(format!("{}: {what}: {err}", pem.source()))
}

/// Load an RSA private key, PKCS#8 (`PRIVATE KEY`) or PKCS#1
/// (`RSA PRIVATE KEY`).
pub fn rsa_private_key(pem: &PemMaterial) -> Result<RsaPrivateKey, Error> {
    use pkcs1::DecodeRsaPrivateKey;
    use pkcs8::DecodePrivateKey;

    if let Ok(key) = RsaPrivateKey::from_pkcs8_pem(pem.text()) {
        return Ok(key);
    }
    RsaPrivateKey::from_pkcs1_pem(pem.text())
        .map_err(|e| key_error(pem, "not an RSA private key", e))
}

/// Load the RSA public key signatures are checked against.
///
/// Accepts an X.509 certificate, an SPKI `PUBLIC KEY` or a PKCS#1
/// `RSA PUBLIC KEY`.
pub fn verifying_key(pem: &PemMaterial) -> Result<RsaPublicKey, Error> {
    use pkcs1::DecodeRsaPublicKey;
    use spki::DecodePublicKey;

    let label = pem_rfc7468::decode_label(pem.text().trim_start().as_bytes())
        .map_err(|e| key_error(pem, "invalid PEM", e))?;
    match label {
        LABEL_CERTIFICATE => {
            let cert = parse_certificate(pem)?;
            let spki = cert
                .tbs_certificate
                .subject_public_key_info
                .to_der()
                .map_err(|e| key_error(pem, "bad subject public key", e))?;
            RsaPublicKey::from_public_key_der(&spki)
                .map_err(|e| key_error(pem, "certificate key is not RSA", e))
        }
        LABEL_PUBLIC_KEY => RsaPublicKey::from_public_key_pem(pem.text())
            .map_err(|e| key_error(pem, "not an RSA public key", e)),
        LABEL_RSA_PUBLIC_KEY => RsaPublicKey::from_pkcs1_pem(pem.text())
            .map_err(|e| key_error(pem, "not an RSA public key", e)),
        other => Err(key_error(pem, "unexpected PEM label", other)),
    }
}

/// DER bytes of a `CERTIFICATE` PEM, as embedded in `X509Certificate`.
pub fn certificate_der(pem: &PemMaterial) -> Result<Vec<u8>, Error> {
    let (label, der) = pem_rfc7468::decode_vec(pem.text().trim_start().as_bytes())
        .map_err(|e| key_error(pem, "invalid PEM", e))?;
    if label != LABEL_CERTIFICATE {
        return Err(key_error(pem, "expected a certificate", label));
    }
    x509_cert::Certificate::from_der(&der).map_err(|e| key_error(pem, "invalid certificate", e))?;
    Ok(der)
}

fn parse_certificate(pem: &PemMaterial) -> Result<x509_cert::Certificate, Error> {
    let (_, der) = pem_rfc7468::decode_vec(pem.text().trim_start().as_bytes())
        .map_err(|e| key_error(pem, "invalid PEM", e))?;
    x509_cert::Certificate::from_der(&der).map_err(|e| key_error(pem, "invalid certificate", e))
}
