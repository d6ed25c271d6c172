//! Text decoding and path helpers shared by the transformers and the converter.

use std::borrow::Cow;
use std::path::{Component, Path};

/// Decode bytes to a string, handling various encodings.
///
/// This function:
/// 1. First tries UTF-8 (handles BOM automatically via encoding_rs)
/// 2. If malformed, tries the hint encoding (e.g. from `<meta charset>`)
/// 3. Falls back to Windows-1252 (superset of ISO-8859-1)
///
/// Returns `None` when the bytes look binary (contain a NUL byte), since no
/// text encoding gives a meaningful document in that case.
///
/// # Examples
///
/// ```
/// use mdx2md::util::decode_text;
///
/// assert_eq!(decode_text(b"Hello", None).as_deref(), Some("Hello"));
/// assert_eq!(decode_text(b"caf\xe9", None).as_deref(), Some("café"));
/// assert!(decode_text(b"\x89PNG\0\0", None).is_none());
/// ```
pub fn decode_text<'a>(bytes: &'a [u8], hint_encoding: Option<&str>) -> Option<Cow<'a, str>> {
    if looks_binary(bytes) {
        return None;
    }

    // Try UTF-8 first (handles BOM automatically)
    let (result, _encoding, malformed) = encoding_rs::UTF_8.decode(bytes);

    if !malformed {
        return Some(result);
    }

    if let Some(name) = hint_encoding
        && let Some(encoding) = encoding_rs::Encoding::for_label(name.as_bytes())
    {
        let (result, _, _) = encoding.decode(bytes);
        return Some(result);
    }

    let (result, _, _) = encoding_rs::WINDOWS_1252.decode(bytes);
    Some(result)
}

/// True if the buffer contains a NUL byte.
pub fn looks_binary(bytes: &[u8]) -> bool {
    memchr::memchr(0, bytes).is_some()
}

/// Final path segment of a reference as written in a document.
///
/// Both `/` and `\` count as separators, so `img\\win\\a.png` and
/// `../img/a.png` both give `a.png`.
pub fn basename(raw: &str) -> &str {
    raw.rsplit(['/', '\\']).next().unwrap_or(raw)
}

/// Relative link from directory `from` to path `to`, both relative to the
/// same root, using `/` separators.
///
/// A result that does not climb out of `from` is prefixed with `./`.
///
/// ```
/// use std::path::Path;
/// use mdx2md::util::relative_link;
///
/// assert_eq!(relative_link(Path::new(""), Path::new("images")), "./images");
/// assert_eq!(relative_link(Path::new("guide/setup"), Path::new("images")), "../../images");
/// ```
pub fn relative_link(from: &Path, to: &Path) -> String {
    let from: Vec<_> = normal_components(from);
    let to: Vec<_> = normal_components(to);

    let common = from
        .iter()
        .zip(to.iter())
        .take_while(|(a, b)| a == b)
        .count();

    let mut parts: Vec<&str> = Vec::new();
    for _ in common..from.len() {
        parts.push("..");
    }
    parts.extend(to[common..].iter().map(String::as_str));

    if parts.first() == Some(&"..") {
        parts.join("/")
    } else if parts.is_empty() {
        ".".to_string()
    } else {
        format!("./{}", parts.join("/"))
    }
}

fn normal_components(path: &Path) -> Vec<String> {
    path.components()
        .filter_map(|c| match c {
            Component::Normal(s) => Some(s.to_string_lossy().into_owned()),
            _ => None,
        })
        .collect()
}

/// Path as a forward-slash string, for links and index entries.
pub fn to_slash(path: &Path) -> String {
    normal_components(path).join("/")
}
