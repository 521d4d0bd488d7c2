#![forbid(unsafe_code)]

//! Record serializer: structured payment records to indented XML.
//!
//! Mapping rules:
//! - object members become child elements, in insertion order;
//! - scalars become text content (`true`, `100.5`, strings escaped);
//! - arrays become one repeated element per item, named after the key
//!   (`<item>` inside a top-level or nested array);
//! - `null` and `{}` become an empty element `<key/>`.
//!
//! No attributes are ever produced. Tabs, line feeds and carriage returns
//! inside text are written as character references so that the whitespace
//! normalizer leaves them intact.

use crate::edit::{escape_text, is_ncname};
use paysig_core::Error;
use serde_json::Value;

const INDENT: &str = "  ";
const ARRAY_ITEM: &str = "item";

/// Serialize `record` under a root element named `root_name`.
///
/// Output is deterministic for a given record, including key order.
pub fn to_xml(record: &Value, root_name: &str) -> Result<String, Error> {
    let mut out = String::from("<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n");
    write_element(&mut out, root_name, record, 0)?;
    Ok(out)
}

fn write_element(out: &mut String, name: &str, value: &Value, depth: usize) -> Result<(), Error> {
    check_name(name)?;
    let pad = INDENT.repeat(depth);
    match value {
        Value::Null => empty_element(out, &pad, name),
        Value::Object(map) if map.is_empty() => empty_element(out, &pad, name),
        Value::Array(items) if items.is_empty() => empty_element(out, &pad, name),
        Value::Object(map) => {
            open_line(out, &pad, name);
            for (key, child) in map {
                write_member(out, key, child, depth + 1)?;
            }
            close_line(out, &pad, name);
        }
        Value::Array(items) => {
            open_line(out, &pad, name);
            for item in items {
                write_element(out, ARRAY_ITEM, item, depth + 1)?;
            }
            close_line(out, &pad, name);
        }
        Value::Bool(b) => text_element(out, &pad, name, if *b { "true" } else { "false" }),
        Value::Number(n) => text_element(out, &pad, name, &n.to_string()),
        Value::String(s) => text_element(out, &pad, name, s),
    }
    Ok(())
}

/// An object member: arrays repeat the member's own element name.
fn write_member(out: &mut String, key: &str, value: &Value, depth: usize) -> Result<(), Error> {
    match value {
        Value::Array(items) if !items.is_empty() => {
            for item in items {
                write_element(out, key, item, depth)?;
            }
            Ok(())
        }
        _ => write_element(out, key, value, depth),
    }
}

fn empty_element(out: &mut String, pad: &str, name: &str) {
    out.push_str(pad);
    out.push('<');
    out.push_str(name);
    out.push_str("/>\n");
}

fn open_line(out: &mut String, pad: &str, name: &str) {
    out.push_str(pad);
    out.push('<');
    out.push_str(name);
    out.push_str(">\n");
}

fn close_line(out: &mut String, pad: &str, name: &str) {
    out.push_str(pad);
    out.push_str("</");
    out.push_str(name);
    out.push_str(">\n");
}

fn text_element(out: &mut String, pad: &str, name: &str, text: &str) {
    out.push_str(pad);
    out.push('<');
    out.push_str(name);
    out.push('>');
    out.push_str(&escape_text(text));
    out.push_str("</");
    out.push_str(name);
    out.push_str(">\n");
}

/// Element names must be XML names without a namespace prefix.
fn check_name(name: &str) -> Result<(), Error> {
    if is_ncname(name) {
        Ok(())
    } else {
        Err(Error::XmlStructure(format!(
            "record key {name:?} is not a valid element name"
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use serde_json::json;

    #[test]
    fn test_payment_record() {
        let record = json!({
            "amount": 100.50,
            "currency": "USD",
            "transaction_id": "txn_1"
        });
        let xml = to_xml(&record, "Payment").unwrap();
        assert_eq!(
            xml,
            "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n\
             <Payment>\n  \
               <amount>100.5</amount>\n  \
               <currency>USD</currency>\n  \
               <transaction_id>txn_1</transaction_id>\n\
             </Payment>\n"
        );
    }

    #[test]
    fn test_key_order_is_preserved() {
        let xml = to_xml(&json!({"z": 1, "a": 2}), "R").unwrap();
        let z = xml.find("<z>").unwrap();
        let a = xml.find("<a>").unwrap();
        assert!(z < a);
    }

    #[test]
    fn test_nested_arrays_and_nulls() {
        let record = json!({
            "merchant": {"name": "A & B", "tags": ["x", "y"], "extra": null, "meta": {}},
            "matrix": [[1, 2]]
        });
        let xml = to_xml(&record, "Payment").unwrap();
        assert!(xml.contains("    <name>A &amp; B</name>\n"));
        assert!(xml.contains("    <tags>x</tags>\n    <tags>y</tags>\n"));
        assert!(xml.contains("    <extra/>\n"));
        assert!(xml.contains("    <meta/>\n"));
        assert!(xml.contains("  <matrix>\n    <item>1</item>\n    <item>2</item>\n  </matrix>\n"));
        crate::parse(&xml).unwrap();
    }

    #[test]
    fn test_top_level_array() {
        let xml = to_xml(&json!([true, "s"]), "Batch").unwrap();
        assert!(xml.ends_with("<Batch>\n  <item>true</item>\n  <item>s</item>\n</Batch>\n"));
    }

    #[test]
    fn test_control_characters_survive_normalization() {
        let xml = to_xml(&json!({"memo": "line1\nline2\tend"}), "Payment").unwrap();
        let normalized = crate::normalize(&xml);
        let doc = crate::parse(&normalized).unwrap();
        let memo = doc.descendants().find(|n| n.has_tag_name("memo")).unwrap();
        assert_eq!(memo.text(), Some("line1\nline2\tend"));
    }

    #[test]
    fn test_invalid_names_are_rejected() {
        for key in ["1st", "has space", "", "p:x", "²", "ª"] {
            let record = json!({ key: 1 });
            let err = to_xml(&record, "Payment").unwrap_err();
            assert_eq!(err.code(), "XML_STRUCTURE", "key {key:?}");
        }
        assert!(to_xml(&json!({}), "<bad>").is_err());
        let xml = to_xml(&json!({"Café": 1, "数量": 2}), "Payment").unwrap();
        assert!(xml.contains("<Café>1</Café>"));
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(64))]

        #[test]
        fn prop_deterministic_and_parseable(
            fields in proptest::collection::vec(("[a-z_][a-z0-9_]{0,8}", "\\PC{0,16}"), 0..6)
        ) {
            let mut map = serde_json::Map::new();
            for (k, v) in fields {
                map.insert(k, Value::String(v));
            }
            let record = Value::Object(map);
            let first = to_xml(&record, "Payment").unwrap();
            let second = to_xml(&record, "Payment").unwrap();
            prop_assert_eq!(&first, &second);
            prop_assert!(crate::parse(&first).is_ok());
        }
    }
}
