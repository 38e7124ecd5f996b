//! Minimal XML text helpers for the integrator documents.
//!
//! The processor documents are shallow and schema-fixed, so rendering is
//! string assembly with escaping and reading is element lookup by path.

/// Escapes text for use in element content or a double-quoted attribute.
pub(crate) fn escape(raw: &str) -> String {
    let mut escaped = String::with_capacity(raw.len());
    for ch in raw.chars() {
        match ch {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&apos;"),
            other => escaped.push(other),
        }
    }
    escaped
}

pub(crate) fn unescape(raw: &str) -> String {
    raw.replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&apos;", "'")
        .replace("&amp;", "&")
}

/// Returns the raw inner markup of the first element named `name` in `doc`.
///
/// Matches `<name>` and `<name attr="...">` start tags; a self-closing
/// `<name/>` yields an empty string.
pub(crate) fn inner_xml<'a>(doc: &'a str, name: &str) -> Option<&'a str> {
    let open = format!("<{name}");
    let close = format!("</{name}>");
    let mut search_from = 0;
    while let Some(offset) = doc[search_from..].find(&open) {
        let tag_start = search_from + offset;
        let after_name = tag_start + open.len();
        let rest = &doc[after_name..];
        let tag_end = after_name + rest.find('>')?;
        let boundary = rest.chars().next();
        match boundary {
            Some('>') | Some(' ') | Some('\t') | Some('\r') | Some('\n') | Some('/') => {
                if doc[..tag_end].ends_with('/') {
                    return Some("");
                }
                let body_start = tag_end + 1;
                let body_len = doc[body_start..].find(&close)?;
                return Some(&doc[body_start..body_start + body_len]);
            }
            _ => search_from = after_name,
        }
    }
    None
}

/// Walks `path` element by element and returns the unescaped, trimmed text of
/// the last one.
pub(crate) fn element_text(doc: &str, path: &[&str]) -> Option<String> {
    let mut scope = doc;
    for name in path {
        scope = inner_xml(scope, name)?;
    }
    Some(unescape(scope.trim()))
}
