//! Brace-balancing expression removal.

use std::borrow::Cow;

/// Remove every balanced `{...}` span, including nested braces and spans
/// that cross lines.
///
/// A `{` without a matching `}` is kept and scanning resumes after it, so
/// balanced spans later in the text are still removed. String literals
/// inside expressions are not tracked: a `}` inside quotes closes the span.
///
/// ```
/// use mdx2md::transform::strip_balanced_expressions;
///
/// assert_eq!(strip_balanced_expressions("a {f({b: 1})} c"), "a  c");
/// assert_eq!(strip_balanced_expressions("open { only"), "open { only");
/// ```
pub fn strip_balanced_expressions(text: &str) -> Cow<'_, str> {
    if !text.contains('{') {
        return Cow::Borrowed(text);
    }

    let mut out = String::with_capacity(text.len());
    let mut rest = text;

    while let Some(open) = rest.find('{') {
        out.push_str(&rest[..open]);
        match span_len(&rest[open..]) {
            Some(len) => rest = &rest[open + len..],
            None => {
                out.push('{');
                rest = &rest[open + 1..];
            }
        }
    }
    out.push_str(rest);

    Cow::Owned(out)
}

/// Byte length of the balanced span at the start of `s`, which must begin
/// with `{`.
fn span_len(s: &str) -> Option<usize> {
    let mut depth = 0usize;
    for (i, b) in s.bytes().enumerate() {
        match b {
            b'{' => depth += 1,
            b'}' => {
                depth -= 1;
                if depth == 0 {
                    return Some(i + 1);
                }
            }
            _ => {}
        }
    }
    None
}
