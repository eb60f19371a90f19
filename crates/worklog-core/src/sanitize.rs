//! Best-effort markup stripping for narrative fields.
//!
//! Applied to all narrative content before persistence. The pass removes
//! well-formed `<...>` tag spans, entity-encodes any unmatched `<` so it
//! stays inert, and decodes a small fixed set of named character entities.
//!
//! This is a cleanup scanner, not a parser and not a security boundary:
//! adversarially nested or malformed markup may survive. Only the stripping
//! behavior documented here is guaranteed (and tested).

/// Sanitize one narrative field.
pub fn sanitize_content(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    let mut rest = input;
    while let Some(open) = rest.find('<') {
        out.push_str(&rest[..open]);
        match rest[open..].find('>') {
            // Drop the whole <...> span.
            Some(close) => rest = &rest[open + close + 1..],
            // Unmatched bracket: neutralize it and keep scanning.
            None => {
                out.push_str("&lt;");
                rest = &rest[open + 1..];
            }
        }
    }
    out.push_str(rest);
    decode_entities(&out)
}

/// Decode the supported named entities.
///
/// `&lt;` is deliberately not decoded so neutralized brackets stay inert,
/// and `&amp;` is decoded last so it cannot introduce new entities.
fn decode_entities(s: &str) -> String {
    s.replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&#39;", "'")
        .replace("&#x27;", "'")
        .replace("&nbsp;", " ")
        .replace("&amp;", "&")
}
