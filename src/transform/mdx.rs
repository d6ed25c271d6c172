//! MDX → Markdown content transformer.
//!
//! Not a parser: the transformer removes component syntax with a fixed
//! sequence of text passes and rewrites image references so they point at
//! the shared assets directory.
//!
//! Pass order:
//! 1. `<img src="...">` tags become `![alt](src)` so they survive step 2
//! 2. every single-line `<...>` tag is removed
//! 3. `{...}` expressions are removed (see [`ExpressionMode`])
//! 4. `import` / `export` lines are removed
//! 5. `![alt](path)` is rewritten to `![alt](<prefix>/<basename>)`, copying
//!    the image through the [`AssetResolver`]

use std::borrow::Cow;
use std::path::Path;

use regex_lite::Captures;

use super::expr::strip_balanced_expressions;
use super::patterns::{
    ALT_ATTR_RE, EXPRESSION_RE, IMG_TAG_RE, MD_IMAGE_RE, MODULE_LINE_RE, SRC_ATTR_RE, TAG_RE,
};
use crate::assets::AssetResolver;

/// Link prefix used when every document sits next to the assets directory.
pub const DEFAULT_IMAGE_PREFIX: &str = "./images";

/// How `{...}` expressions are removed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ExpressionMode {
    /// Shortest match on one line: `{a {b} c}` loses `{a {b}` and keeps
    /// ` c}`. This is what existing converted output looks like.
    #[default]
    FirstClose,
    /// Remove balanced, possibly nested and multi-line spans. An unmatched
    /// `{` is kept as text.
    Balanced,
}

/// Configuration for MDX transformation.
#[derive(Debug, Clone)]
pub struct MdxConfig {
    pub expressions: ExpressionMode,
    /// Directory link written in front of each image basename.
    pub image_prefix: String,
}

impl Default for MdxConfig {
    fn default() -> Self {
        Self {
            expressions: ExpressionMode::default(),
            image_prefix: DEFAULT_IMAGE_PREFIX.to_string(),
        }
    }
}

/// Transformer for MDX (and plain Markdown) documents.
#[derive(Debug, Clone, Default)]
pub struct MdxTransformer {
    config: MdxConfig,
}

impl MdxTransformer {
    /// Create a transformer with default configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a transformer with the specified configuration.
    pub fn with_config(config: MdxConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &MdxConfig {
        &self.config
    }

    /// Transform `source` into Markdown.
    ///
    /// `source_path` is the document's real location; image paths are
    /// resolved against its parent directory.
    pub fn transform(
        &self,
        source: &str,
        source_path: &Path,
        resolver: &mut AssetResolver,
    ) -> String {
        let containing_dir = source_path.parent().unwrap_or(Path::new(""));

        let text = inline_img_tags(source);
        let text = strip_tags(&text);
        let text = strip_expressions(&text, self.config.expressions);
        let text = strip_module_lines(&text);

        let prefix = self.config.image_prefix.trim_end_matches('/');
        rewrite_images(&text, |raw| {
            let name = resolver.resolve(raw, containing_dir);
            format!("{prefix}/{name}")
        })
        .into_owned()
    }
}

/// Transform one document with the default configuration, copying images
/// into `assets_dir` and linking them as `./images/<basename>`.
///
/// # Examples
///
/// ```
/// use std::path::Path;
///
/// let out = mdx2md::transform(
///     "import X from 'x'\n<Note>{props.a}</Note>\n![d](img/diagram.png)",
///     Path::new("/docs/page.mdx"),
///     Path::new("/tmp/out/images"),
/// );
/// assert_eq!(out, "\n![d](./images/diagram.png)");
/// ```
pub fn transform(source_text: &str, source_path: &Path, assets_dir: &Path) -> String {
    let mut resolver = AssetResolver::new(assets_dir);
    MdxTransformer::new().transform(source_text, source_path, &mut resolver)
}

/// Rewrite raw `<img>` tags with a quoted `src` as Markdown images.
///
/// Tags without a literal `src` (e.g. JSX `src={logo}`) are left alone.
pub fn inline_img_tags(text: &str) -> Cow<'_, str> {
    IMG_TAG_RE.replace_all(text, |caps: &Captures| {
        let attrs = &caps[1];
        match SRC_ATTR_RE.captures(attrs) {
            Some(src) => {
                let alt = ALT_ATTR_RE
                    .captures(attrs)
                    .and_then(|c| c.get(1))
                    .map_or("", |m| m.as_str());
                format!("![{alt}]({})", &src[1])
            }
            None => caps[0].to_string(),
        }
    })
}

/// Remove every single-line `<...>` construct.
pub fn strip_tags(text: &str) -> Cow<'_, str> {
    TAG_RE.replace_all(text, "")
}

/// Remove `{...}` expressions according to `mode`.
pub fn strip_expressions(text: &str, mode: ExpressionMode) -> Cow<'_, str> {
    match mode {
        ExpressionMode::FirstClose => EXPRESSION_RE.replace_all(text, ""),
        ExpressionMode::Balanced => strip_balanced_expressions(text),
    }
}

/// Remove whole lines that start with `import` or `export`.
pub fn strip_module_lines(text: &str) -> Cow<'_, str> {
    MODULE_LINE_RE.replace_all(text, "")
}

/// Rewrite the path of every `![alt](path)` through `rewriter`.
///
/// The rewriter receives the path as written (trimmed) and returns the new
/// link target. Alt text is preserved.
pub fn rewrite_images<F>(text: &str, mut rewriter: F) -> Cow<'_, str>
where
    F: FnMut(&str) -> String,
{
    MD_IMAGE_RE.replace_all(text, |caps: &Captures| {
        let new_path = rewriter(caps[2].trim());
        format!("![{}]({new_path})", &caps[1])
    })
}
