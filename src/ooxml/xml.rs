//! XML text helpers shared by the package and presentation writers.

/// Escape a string for use in XML text or attribute values.
///
/// Characters XML 1.0 cannot carry at all (C0 controls other than tab,
/// newline and carriage return, plus U+FFFE and U+FFFF) are dropped.
pub(crate) fn escape_xml(s: &str) -> String {
    let mut out = String::with_capacity(s.len() + s.len() / 8);
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            '\t' | '\n' | '\r' => out.push(c),
            c if is_forbidden(c) => {},
            c => out.push(c),
        }
    }
    out
}

#[inline]
fn is_forbidden(c: char) -> bool {
    c < '\u{20}' || c == '\u{FFFE}' || c == '\u{FFFF}'
}
