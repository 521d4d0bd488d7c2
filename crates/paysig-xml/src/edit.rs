#![forbid(unsafe_code)]

//! Source-text edits on parsed documents.
//!
//! `roxmltree` trees are immutable, so adding an attribute or a child
//! element rewrites the original text around the byte ranges the parser
//! recorded. Every function returns a new document text; the node passed
//! in belongs to the old one and must not be reused afterwards.

use paysig_core::Error;

/// Qualified name of an element exactly as written in the source.
pub fn element_qname<'input>(node: roxmltree::Node<'_, 'input>) -> &'input str {
    let text = node.document().input_text();
    let start = node.range().start + 1;
    let len = text[start..]
        .find(|c: char| c.is_whitespace() || c == '>' || c == '/')
        .unwrap_or(text.len() - start);
    &text[start..start + len]
}

/// Qualified name of an attribute exactly as written in the source.
pub fn attribute_qname<'input>(
    node: roxmltree::Node<'_, 'input>,
    attr: &roxmltree::Attribute<'_, 'input>,
) -> &'input str {
    &node.document().input_text()[attr.range_qname()]
}

/// Split `prefix:local` into its prefix (empty when absent) and local part.
pub fn split_qname(qname: &str) -> (&str, &str) {
    qname.split_once(':').unwrap_or(("", qname))
}

/// Whether `name` is an XML name without a namespace prefix (an NCName).
pub fn is_ncname(name: &str) -> bool {
    let mut chars = name.chars();
    chars.next().is_some_and(is_name_start_char) && chars.all(is_name_char)
}

fn is_name_start_char(c: char) -> bool {
    matches!(c,
        'A'..='Z' | '_' | 'a'..='z'
        | '\u{C0}'..='\u{D6}'
        | '\u{D8}'..='\u{F6}'
        | '\u{F8}'..='\u{2FF}'
        | '\u{370}'..='\u{37D}'
        | '\u{37F}'..='\u{1FFF}'
        | '\u{200C}'..='\u{200D}'
        | '\u{2070}'..='\u{218F}'
        | '\u{2C00}'..='\u{2FEF}'
        | '\u{3001}'..='\u{D7FF}'
        | '\u{F900}'..='\u{FDCF}'
        | '\u{FDF0}'..='\u{FFFD}'
        | '\u{10000}'..='\u{EFFFF}')
}

fn is_name_char(c: char) -> bool {
    is_name_start_char(c)
        || matches!(c,
            '-' | '.' | '0'..='9' | '\u{B7}'
            | '\u{300}'..='\u{36F}'
            | '\u{203F}'..='\u{2040}')
}

/// Byte offset of the `>` closing the start tag of `node`, and whether the
/// tag is self-closing (`/>`).
fn start_tag_end(node: roxmltree::Node<'_, '_>) -> Result<(usize, bool), Error> {
    let text = node.document().input_text().as_bytes();
    let range = node.range();
    let mut quote: Option<u8> = None;
    for pos in range.start + 1..range.end {
        let b = text[pos];
        match quote {
            Some(q) if b == q => quote = None,
            Some(_) => {}
            None if b == b'"' || b == b'\'' => quote = Some(b),
            None if b == b'>' => return Ok((pos, text[pos - 1] == b'/')),
            None => {}
        }
    }
    Err(Error::XmlStructure(format!(
        "unterminated start tag for <{}>",
        element_qname(node)
    )))
}

/// Escape a value for use inside a double-quoted attribute.
pub fn escape_attribute_value(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for ch in value.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '"' => out.push_str("&quot;"),
            '\t' => out.push_str("&#x9;"),
            '\n' => out.push_str("&#xA;"),
            '\r' => out.push_str("&#xD;"),
            _ => out.push(ch),
        }
    }
    out
}

/// Escape character data for use as element text.
pub fn escape_text(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for ch in value.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '\t' => out.push_str("&#x9;"),
            '\n' => out.push_str("&#xA;"),
            '\r' => out.push_str("&#xD;"),
            _ => out.push(ch),
        }
    }
    out
}

/// Add `name="value"` as the last attribute of `node`.
///
/// Fails when the element already carries an attribute with that name.
pub fn set_attribute(
    node: roxmltree::Node<'_, '_>,
    name: &str,
    value: &str,
) -> Result<String, Error> {
    if !node.is_element() {
        return Err(Error::XmlStructure("attributes can only be set on elements".into()));
    }
    if node.attributes().any(|a| a.namespace().is_none() && a.name() == name) {
        return Err(Error::XmlStructure(format!(
            "<{}> already has a {name} attribute",
            element_qname(node)
        )));
    }
    let text = node.document().input_text();
    let (gt, self_closing) = start_tag_end(node)?;
    let insert_at = if self_closing { gt - 1 } else { gt };
    let attribute = format!(" {name}=\"{}\"", escape_attribute_value(value));

    let mut out = String::with_capacity(text.len() + attribute.len());
    out.push_str(&text[..insert_at]);
    out.push_str(&attribute);
    out.push_str(&text[insert_at..]);
    Ok(out)
}

/// Insert `fragment` as the last child of `node`.
///
/// A self-closing element is expanded into a start/end tag pair.
pub fn append_child(node: roxmltree::Node<'_, '_>, fragment: &str) -> Result<String, Error> {
    if !node.is_element() {
        return Err(Error::XmlStructure("children can only be appended to elements".into()));
    }
    let text = node.document().input_text();
    let range = node.range();
    let (gt, self_closing) = start_tag_end(node)?;

    let mut out = String::with_capacity(text.len() + fragment.len() + 16);
    if self_closing {
        let qname = element_qname(node);
        out.push_str(&text[..gt - 1]);
        out.push('>');
        out.push_str(fragment);
        out.push_str("</");
        out.push_str(qname);
        out.push('>');
        out.push_str(&text[gt + 1..]);
    } else {
        let end_tag = text[range.clone()].rfind("</").map(|i| range.start + i).ok_or_else(|| {
            Error::XmlStructure(format!("no end tag for <{}>", element_qname(node)))
        })?;
        out.push_str(&text[..end_tag]);
        out.push_str(fragment);
        out.push_str(&text[end_tag..]);
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_element_qname_keeps_prefix() {
        let doc = crate::parse(r#"<p:root xmlns:p="urn:p"><p:child a="1"/></p:root>"#).unwrap();
        let child = doc.root_element().first_child().unwrap();
        assert_eq!(element_qname(doc.root_element()), "p:root");
        assert_eq!(element_qname(child), "p:child");
    }

    #[test]
    fn test_attribute_qname() {
        let doc = crate::parse(r#"<r xmlns:x="urn:x" x:a="1" b="2"/>"#).unwrap();
        let root = doc.root_element();
        let names: Vec<&str> = root.attributes().map(|a| attribute_qname(root, &a)).collect();
        assert_eq!(names, ["x:a", "b"]);
    }

    #[test]
    fn test_ncname() {
        for name in ["Payment", "_x", "txn-1.a", "Café", "数量", "a\u{B7}b"] {
            assert!(is_ncname(name), "{name:?}");
        }
        // U+00B2 and U+00AA are alphanumeric in Unicode but not XML name characters.
        for name in ["", "1st", "-a", ".a", "p:x", "has space", "²", "ª", "a²", "é\u{D7}"] {
            assert!(!is_ncname(name), "{name:?}");
        }
    }

    #[test]
    fn test_set_attribute() {
        let doc = crate::parse(r#"<Payment a="x>y"><amount>1</amount></Payment>"#).unwrap();
        let out = set_attribute(doc.root_element(), "Id", "xml-data").unwrap();
        assert_eq!(out, r#"<Payment a="x>y" Id="xml-data"><amount>1</amount></Payment>"#);
    }

    #[test]
    fn test_set_attribute_self_closing() {
        let doc = crate::parse("<Payment/>").unwrap();
        let out = set_attribute(doc.root_element(), "Id", "a\"b").unwrap();
        assert_eq!(out, r#"<Payment Id="a&quot;b"/>"#);
    }

    #[test]
    fn test_set_attribute_twice_fails() {
        let doc = crate::parse(r#"<Payment Id="one"/>"#).unwrap();
        let err = set_attribute(doc.root_element(), "Id", "two").unwrap_err();
        assert_eq!(err.code(), "XML_STRUCTURE");
    }

    #[test]
    fn test_append_child() {
        let doc = crate::parse("<a><b>1</b></a>").unwrap();
        let out = append_child(doc.root_element(), "<c/>").unwrap();
        assert_eq!(out, "<a><b>1</b><c/></a>");

        let doc = crate::parse("<a><b>1</b></a>").unwrap();
        let b = doc.root_element().first_child().unwrap();
        let out = append_child(b, "<c/>").unwrap();
        assert_eq!(out, "<a><b>1<c/></b></a>");
    }

    #[test]
    fn test_append_child_self_closing() {
        let doc = crate::parse(r#"<?xml version="1.0"?><a x="1" />"#).unwrap();
        let out = append_child(doc.root_element(), "<c/>").unwrap();
        assert_eq!(out, r#"<?xml version="1.0"?><a x="1" ><c/></a>"#);
    }
}
