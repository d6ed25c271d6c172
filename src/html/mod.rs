//! Structural HTML → Markdown conversion.
//!
//! `.html` inputs are parsed with html5ever instead of being regex-stripped.
//! One walk over the tree, in document order, emits:
//!
//! - `h1`..`h6` as ATX headings
//! - `p` as its text content (inline formatting is dropped)
//! - `img` as a Markdown image routed through the [`AssetResolver`]
//! - `a[href]` as a Markdown link
//!
//! Images and links nested inside a heading or paragraph follow that block.
//! Anything else only contributes through its descendants.

mod arena;
mod tree_sink;

use std::path::Path;

use crate::assets::AssetResolver;
use crate::transform::DEFAULT_IMAGE_PREFIX;

pub use arena::{Dom, NodeData, NodeId};
pub use tree_sink::parse_html;

/// Subtrees that never produce output.
const SKIPPED_TAGS: &[&str] = &["head", "script", "style", "template", "noscript"];

/// Configuration for HTML transformation.
#[derive(Debug, Clone)]
pub struct HtmlConfig {
    /// Directory link written in front of each image basename.
    pub image_prefix: String,
}

impl Default for HtmlConfig {
    fn default() -> Self {
        Self {
            image_prefix: DEFAULT_IMAGE_PREFIX.to_string(),
        }
    }
}

/// Transformer for HTML documents.
#[derive(Debug, Clone, Default)]
pub struct HtmlTransformer {
    config: HtmlConfig,
}

impl HtmlTransformer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: HtmlConfig) -> Self {
        Self { config }
    }

    /// Convert `source` into Markdown, resolving images against the parent
    /// directory of `source_path`.
    ///
    /// ```
    /// use std::path::Path;
    /// use mdx2md::AssetResolver;
    /// use mdx2md::html::HtmlTransformer;
    ///
    /// let mut assets = AssetResolver::new("/tmp/never-created/images");
    /// let md = HtmlTransformer::new().transform(
    ///     "<h2>Intro</h2><p>Hello <b>there</b>.</p>",
    ///     Path::new("/site/index.html"),
    ///     &mut assets,
    /// );
    /// assert_eq!(md, "## Intro\n\nHello there.\n");
    /// ```
    pub fn transform(
        &self,
        source: &str,
        source_path: &Path,
        resolver: &mut AssetResolver,
    ) -> String {
        let dom = parse_html(source);
        let mut walker = Walker {
            dom: &dom,
            resolver,
            containing_dir: source_path.parent().unwrap_or(Path::new("")),
            prefix: self.config.image_prefix.trim_end_matches('/'),
            blocks: Vec::new(),
        };
        walker.walk(dom.document(), false);

        if walker.blocks.is_empty() {
            return String::new();
        }
        let mut out = walker.blocks.join("\n\n");
        out.push('\n');
        out
    }
}

struct Walker<'a> {
    dom: &'a Dom,
    resolver: &'a mut AssetResolver,
    containing_dir: &'a Path,
    prefix: &'a str,
    blocks: Vec<String>,
}

impl Walker<'_> {
    /// Visit the children of `id`. Inside a heading or paragraph
    /// (`in_block`), nested headings and paragraphs are plain containers.
    fn walk(&mut self, id: NodeId, in_block: bool) {
        let dom = self.dom;
        for child in dom.children(id) {
            let Some(name) = dom.element_name(child) else {
                continue;
            };
            let tag: &str = name;

            if SKIPPED_TAGS.contains(&tag) {
                continue;
            }

            match tag {
                "h1" | "h2" | "h3" | "h4" | "h5" | "h6" if !in_block => {
                    let level = usize::from(tag.as_bytes()[1] - b'0');
                    let text = self.collect_text(child);
                    if !text.is_empty() {
                        self.blocks.push(format!("{} {text}", "#".repeat(level)));
                    }
                    self.walk(child, true);
                }
                "p" if !in_block => {
                    let text = self.collect_text(child);
                    if !text.is_empty() {
                        self.blocks.push(text);
                    }
                    self.walk(child, true);
                }
                "img" => self.image(child),
                "a" => {
                    self.link(child);
                    self.walk(child, true);
                }
                _ => self.walk(child, in_block),
            }
        }
    }

    fn image(&mut self, id: NodeId) {
        let dom = self.dom;
        let Some(src) = dom.get_attr(id, "src").map(str::trim) else {
            return;
        };
        if src.is_empty() {
            return;
        }
        let alt = dom.get_attr(id, "alt").unwrap_or("");
        let name = self.resolver.resolve(src, self.containing_dir);
        self.blocks.push(format!("![{alt}]({}/{name})", self.prefix));
    }

    fn link(&mut self, id: NodeId) {
        let dom = self.dom;
        let Some(href) = dom.get_attr(id, "href").map(str::trim) else {
            return;
        };
        if href.is_empty() {
            return;
        }
        let text = self.collect_text(id);
        let text = if text.is_empty() { href } else { &text };
        self.blocks.push(format!("[{text}]({href})"));
    }

    /// Text content of `id` with whitespace runs collapsed to one space.
    fn collect_text(&self, id: NodeId) -> String {
        let mut raw = String::new();
        self.collect_text_recursive(id, &mut raw);
        raw.split_whitespace().collect::<Vec<_>>().join(" ")
    }

    fn collect_text_recursive(&self, id: NodeId, out: &mut String) {
        for child in self.dom.children(id) {
            if let Some(text) = self.dom.text_content(child) {
                out.push_str(text);
            } else if let Some(name) = self.dom.element_name(child) {
                let tag: &str = name;
                if SKIPPED_TAGS.contains(&tag) {
                    continue;
                }
                if tag == "br" {
                    out.push(' ');
                }
                self.collect_text_recursive(child, out);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::fs;

    use tempfile::TempDir;

    use super::*;

    fn convert(html: &str) -> String {
        let tmp = TempDir::new().unwrap();
        let mut resolver = AssetResolver::new(tmp.path().join("images"));
        HtmlTransformer::new().transform(html, &tmp.path().join("page.html"), &mut resolver)
    }

    #[test]
    fn test_headings_by_level() {
        assert_eq!(
            convert("<h1>One</h1><h3>Three</h3><h6>Six</h6>"),
            "# One\n\n### Three\n\n###### Six\n"
        );
    }

    #[test]
    fn test_document_order_across_kinds() {
        let html = r#"
            <h1>Title</h1>
            <p>First paragraph.</p>
            <img src="a.png" alt="A">
            <h2>Section</h2>
            <a href="https://example.com">Example</a>
            <p>Second   paragraph
               spans lines.</p>
        "#;
        assert_eq!(
            convert(html),
            "# Title\n\nFirst paragraph.\n\n![A](./images/a.png)\n\n## Section\n\n\
             [Example](https://example.com)\n\nSecond paragraph spans lines.\n"
        );
    }

    #[test]
    fn test_inline_link_follows_paragraph() {
        assert_eq!(
            convert(r#"<p>See <a href="/docs">the docs</a> now.</p>"#),
            "See the docs now.\n\n[the docs](/docs)\n"
        );
    }

    #[test]
    fn test_script_and_style_skipped() {
        let html = "<head><title>T</title><style>p{}</style></head>\
                    <body><script>var x;</script><p>Kept</p></body>";
        assert_eq!(convert(html), "Kept\n");
    }

    #[test]
    fn test_image_link_uses_href_as_text() {
        assert_eq!(
            convert(r#"<a href="big.png"><img src="thumb.png"></a>"#),
            "[big.png](big.png)\n\n![](./images/thumb.png)\n"
        );
    }

    #[test]
    fn test_image_copied_into_assets() {
        let tmp = TempDir::new().unwrap();
        let site = tmp.path().join("site");
        fs::create_dir_all(site.join("media")).unwrap();
        fs::write(site.join("media/photo.jpg"), b"jpg").unwrap();
        let assets = tmp.path().join("out/images");
        let mut resolver = AssetResolver::new(&assets);

        let transformer = HtmlTransformer::with_config(HtmlConfig {
            image_prefix: "../images".to_string(),
        });
        let md = transformer.transform(
            r#"<img src="media/photo.jpg" alt="Photo">"#,
            &site.join("gallery.html"),
            &mut resolver,
        );

        assert_eq!(md, "![Photo](../images/photo.jpg)\n");
        assert!(assets.join("photo.jpg").is_file());
    }

    #[test]
    fn test_empty_document() {
        assert_eq!(convert(""), "");
        assert_eq!(convert("<div><span></span></div>"), "");
    }

    #[test]
    fn test_br_separates_words() {
        assert_eq!(convert("<p>line one<br>line two</p>"), "line one line two\n");
    }
}
