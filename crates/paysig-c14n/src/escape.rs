#![forbid(unsafe_code)]

//! Character escaping in canonical output.

/// Where a piece of character data ends up in the canonical form.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Context {
    /// Text node content: `& < >` and carriage return.
    Text,
    /// Attribute or namespace value: `& < "` plus tab, line feed and
    /// carriage return.
    Attribute,
    /// Processing instruction data: carriage return only.
    ProcessingInstruction,
}

pub fn escape_into(out: &mut String, s: &str, ctx: Context) {
    for ch in s.chars() {
        let replacement = match (ch, ctx) {
            ('\r', _) => "&#xD;",
            (_, Context::ProcessingInstruction) => {
                out.push(ch);
                continue;
            }
            ('&', _) => "&amp;",
            ('<', _) => "&lt;",
            ('>', Context::Text) => "&gt;",
            ('"', Context::Attribute) => "&quot;",
            ('\t', Context::Attribute) => "&#x9;",
            ('\n', Context::Attribute) => "&#xA;",
            _ => {
                out.push(ch);
                continue;
            }
        };
        out.push_str(replacement);
    }
}
