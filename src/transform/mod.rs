//! Text transforms for MDX documents
//!
//! - MDX: tag/expression/module stripping, image rewriting
//! - Expressions: balanced `{}` removal
//! - Patterns: shared compiled regexes

mod expr;
mod mdx;
pub(crate) mod patterns;

pub use expr::strip_balanced_expressions;
pub use mdx::{
    DEFAULT_IMAGE_PREFIX, ExpressionMode, MdxConfig, MdxTransformer, inline_img_tags,
    rewrite_images, strip_expressions, strip_module_lines, strip_tags, transform,
};
