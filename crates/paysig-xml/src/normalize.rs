#![forbid(unsafe_code)]

//! Whitespace normalization applied before signing and before verifying.
//!
//! This is a textual strip, not canonicalization: every tab, line feed and
//! carriage return is removed, then whitespace sitting directly between a
//! `>` and a `<` is dropped. Both paths run it on the same text so the
//! bytes the signer digests are the bytes the verifier sees. Character
//! data containing raw tabs or newlines is altered by it; the record
//! serializer writes such characters as references so they survive.

/// Normalize insignificant whitespace in `xml`.
///
/// Idempotent: `normalize(&normalize(x)) == normalize(x)`.
pub fn normalize(xml: &str) -> String {
    let stripped: Vec<char> = xml
        .chars()
        .filter(|c| !matches!(c, '\n' | '\r' | '\t'))
        .collect();

    let mut out = String::with_capacity(stripped.len());
    let mut i = 0;
    while i < stripped.len() {
        let ch = stripped[i];
        if !ch.is_whitespace() {
            out.push(ch);
            i += 1;
            continue;
        }
        let run_end = stripped[i..]
            .iter()
            .position(|c| !c.is_whitespace())
            .map_or(stripped.len(), |p| i + p);
        let between_tags =
            i > 0 && stripped[i - 1] == '>' && stripped.get(run_end) == Some(&'<');
        if !between_tags {
            out.extend(&stripped[i..run_end]);
        }
        i = run_end;
    }
    out
}
