//! # mdx2md
//!
//! Converts MDX/HTML documentation trees into plain Markdown.
//!
//! ## Features
//!
//! - Strip JSX tags, `{expressions}` and `import`/`export` lines from MDX
//! - Convert HTML headings, paragraphs, images and links to Markdown
//! - Collect every referenced image into one assets directory and rewrite
//!   the links to point at it
//! - Generate a `summary.md` table of contents
//! - Read repository ZIP archives and write the result as a ZIP
//!
//! ## Quick Start
//!
//! ```no_run
//! use mdx2md::Converter;
//!
//! let report = Converter::new().run("docs".as_ref(), "converted".as_ref())?;
//! for doc in &report.documents {
//!     println!("{} -> {}", doc.source.display(), doc.output.display());
//! }
//! # Ok::<(), mdx2md::Error>(())
//! ```
//!
//! ## Transforming a single document
//!
//! ```
//! use std::path::Path;
//!
//! let markdown = mdx2md::transform(
//!     "import Tabs from '@theme/Tabs'\n\n<Tabs>Install it.</Tabs>\n",
//!     Path::new("/repo/docs/install.mdx"),
//!     Path::new("/tmp/out/images"),
//! );
//! assert_eq!(markdown, "\nInstall it.\n");
//! ```

pub mod archive;
pub mod assets;
pub mod convert;
pub mod error;
pub mod html;
pub mod index;
pub mod transform;
pub mod util;

pub use assets::AssetResolver;
pub use convert::{
    ConversionReport, ConvertConfig, ConvertedDocument, Converter, DocumentKind, FailedDocument,
    ImageLinkStyle, find_documents,
};
pub use error::{Error, Result};
pub use html::HtmlTransformer;
pub use index::{Index, IndexEntry, document_title};
pub use transform::{ExpressionMode, MdxConfig, MdxTransformer, transform};
