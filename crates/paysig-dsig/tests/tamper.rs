mod common;

use common::*;

#[test]
fn changed_amount_is_invalid() {
    let signed = signed_payment().replace("<amount>100.5</amount>", "<amount>100.6</amount>");
    let result = verifier().verify(&signed).unwrap();
    assert!(!result.is_valid);
    assert!(result.failure().unwrap().contains("digest mismatch"));
}

#[test]
fn every_character_of_the_body_is_covered() {
    let signed = signed_payment();
    let body_start = signed.find("<currency>").unwrap();
    let body_end = signed.find("<Signature ").unwrap();
    let verifier = verifier();
    for pos in body_start..body_end {
        let original = signed.as_bytes()[pos];
        if !original.is_ascii_alphanumeric() {
            continue;
        }
        let flipped = if original == b'x' { 'y' } else { 'x' };
        let mut tampered = signed.clone();
        tampered.replace_range(pos..pos + 1, &flipped.to_string());
        match verifier.verify(&tampered) {
            Ok(result) => assert!(!result.is_valid, "flip at {pos} went unnoticed"),
            // Renaming a start tag without its end tag breaks parsing.
            Err(err) => assert_eq!(err.code(), "XML_PARSING", "flip at {pos}"),
        }
    }
}

#[test]
fn added_element_is_invalid() {
    let signed = signed_payment().replace("<currency>", "<fee>0</fee><currency>");
    assert!(!verifier().verify(&signed).unwrap().is_valid);
}

#[test]
fn changed_signed_info_is_invalid() {
    let signed = signed_payment();
    let tampered = signed.replace(r#"Algorithm="http://www.w3.org/2001/10/xml-exc-c14n#"/></Transforms>"#,
        r#"Algorithm="http://www.w3.org/TR/2001/REC-xml-c14n-20010315"/></Transforms>"#);
    assert_ne!(signed, tampered);
    let result = verifier().verify(&tampered).unwrap();
    assert!(!result.is_valid);
    assert_eq!(result.failure(), Some("signature value does not match SignedInfo"));
}

#[test]
fn changed_signature_value_is_invalid() {
    let signed = signed_payment();
    let value = element_text(&signed, "SignatureValue");
    let mut bytes = value.as_bytes().to_vec();
    bytes[10] = if bytes[10] == b'A' { b'B' } else { b'A' };
    let flipped = String::from_utf8(bytes).unwrap();
    let tampered = signed.replace(value, &flipped);
    let result = verifier().verify(&tampered).unwrap();
    assert!(!result.is_valid);
}

#[test]
fn removing_additional_info_keeps_validity() {
    let signed = signed_payment();
    let start = signed.find("<AdditionalInfo>").unwrap();
    let end = signed.find("</AdditionalInfo>").unwrap() + "</AdditionalInfo>".len();
    let stripped = format!("{}{}", &signed[..start], &signed[end..]);

    let result = verifier().verify(&stripped).unwrap();
    assert!(result.is_valid);
    let metadata = result.metadata().unwrap();
    assert!(metadata.additional_info.is_empty());
    assert_eq!(metadata.signing_date.as_deref(), Some("2026-04-20T14:05:09.000Z"));
}

#[test]
fn altering_metadata_keeps_validity() {
    let signed = signed_payment()
        .replace("<Origin>paysig</Origin>", "<Origin>batch-import</Origin><Channel>sftp</Channel>")
        .replace(r#"signingDate="2026-04-20T14:05:09.000Z""#, r#"signingDate="1999-12-31T23:59:59.000Z" batch="7""#);

    let result = verifier().verify(&signed).unwrap();
    assert!(result.is_valid);
    let metadata = result.metadata().unwrap();
    assert_eq!(metadata.additional_info["Origin"], "batch-import");
    assert_eq!(metadata.additional_info["Channel"], "sftp");
    assert_eq!(metadata.signing_date.as_deref(), Some("1999-12-31T23:59:59.000Z"));
    assert_eq!(metadata.attributes["batch"], "7");
}

#[test]
fn dropping_signing_date_attribute_keeps_validity() {
    let signed = signed_payment().replace(r#" signingDate="2026-04-20T14:05:09.000Z""#, "");
    let result = verifier().verify(&signed).unwrap();
    assert!(result.is_valid);
    assert_eq!(result.metadata().unwrap().signing_date, None);
}

#[test]
fn wrapped_signed_payment_is_invalid() {
    let signed = signed_payment();
    let inner = &signed[signed.find("<Payment").unwrap()..];
    let wrapped = format!("<Payment><amount>999999.00</amount><Original>{inner}</Original></Payment>");

    let result = verifier().verify(&wrapped).unwrap();
    assert!(!result.is_valid);
    assert_eq!(
        result.failure(),
        Some("reference #xml-data does not cover the document element")
    );
}

#[test]
fn signature_moved_out_of_payment_is_invalid() {
    let signed = signed_payment();
    let start = signed.find("<Signature ").unwrap();
    let end = signed.find("</Signature>").unwrap() + "</Signature>".len();
    let signature = &signed[start..end];
    // Keep the Id on the document element but hang the signature under a child.
    let moved = signed
        .replacen(signature, "", 1)
        .replacen("</amount>", &format!("</amount><Meta>{signature}</Meta>"), 1);
    assert!(moved.contains("<Meta><Signature "));

    let result = verifier().verify(&moved).unwrap();
    assert!(!result.is_valid);
    assert_eq!(
        result.failure(),
        Some("signature is not enclosed by the referenced element")
    );
}
