//! Cached regex patterns for MDX processing.
//!
//! Uses LazyLock to compile patterns once on first use. All patterns are
//! single-line: `.` never crosses a newline.

use regex_lite::Regex;
use std::sync::LazyLock;

/// Matches `<img ...>` tags, capturing the attribute text
pub static IMG_TAG_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"<img\s+([^>]*?)\s*/?>"#).unwrap());

/// Matches a quoted src="..." attribute inside captured attribute text
pub static SRC_ATTR_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"(?:^|\s)src\s*=\s*["']([^"']+)["']"#).unwrap());

/// Matches a quoted alt="..." attribute inside captured attribute text
pub static ALT_ATTR_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"(?:^|\s)alt\s*=\s*["']([^"']*)["']"#).unwrap());

/// Matches any angle-bracket tag construct, shortest first
pub static TAG_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"<.*?>").unwrap());

/// Matches a brace expression up to the first closing brace
pub static EXPRESSION_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\{.*?\}").unwrap());

/// Matches whole `import ...` / `export ...` lines with their terminator
pub static MODULE_LINE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?m)^(?:import|export)\b[^\n]*\n?").unwrap());

/// Matches Markdown images `![alt](path)`
pub static MD_IMAGE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"!\[(.*?)\]\((.*?)\)").unwrap());

/// Matches <meta charset="..."> tags
pub static META_CHARSET_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"<meta\s*charset\s*=\s*["']([^"']+)["']\s*/?\s*>"#).unwrap()
});

/// Matches the first ATX heading line of a Markdown document
pub static ATX_HEADING_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?m)^#{1,6}[ \t]+(.+?)[ \t#]*$").unwrap());
