//! Batch conversion of a documentation tree.
//!
//! The [`Converter`] walks an input directory, transforms every document it
//! recognizes, mirrors it into the output tree with a `.md` extension,
//! collects images into one assets directory and finally writes the
//! summary index.
//!
//! Processing is sequential. A document that cannot be read, decoded or
//! written is recorded in the [`ConversionReport`] and the batch moves on.
//!
//! # Example
//!
//! ```no_run
//! use mdx2md::{ConvertConfig, Converter, ExpressionMode};
//!
//! let config = ConvertConfig::default().with_expressions(ExpressionMode::Balanced);
//! let report = Converter::with_config(config).run("docs".as_ref(), "out".as_ref())?;
//! println!("converted {} documents", report.documents.len());
//! # Ok::<(), mdx2md::Error>(())
//! ```

use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

use log::{debug, info, warn};
use walkdir::{DirEntry, WalkDir};

use crate::assets::AssetResolver;
use crate::error::{Error, Result};
use crate::html::{HtmlConfig, HtmlTransformer};
use crate::index::{Index, document_title};
use crate::transform::patterns::META_CHARSET_RE;
use crate::transform::{ExpressionMode, MdxConfig, MdxTransformer};
use crate::util::{decode_text, relative_link};

/// Directories never walked, besides hidden ones.
const SKIPPED_DIRS: &[&str] = &["node_modules"];

/// How far into an HTML file to look for `<meta charset>`.
const CHARSET_SNIFF_LEN: usize = 1024;

/// Which transformer a file goes through.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "cli", derive(serde::Serialize))]
#[cfg_attr(feature = "cli", serde(rename_all = "lowercase"))]
pub enum DocumentKind {
    Mdx,
    Html,
}

impl DocumentKind {
    /// Classify by extension, case-insensitively.
    pub fn from_path(path: &Path) -> Option<Self> {
        let ext = path.extension()?.to_str()?.to_ascii_lowercase();
        match ext.as_str() {
            "mdx" | "md" => Some(DocumentKind::Mdx),
            "html" | "htm" => Some(DocumentKind::Html),
            _ => None,
        }
    }
}

/// How image links are written.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ImageLinkStyle {
    /// Relative to each document's output directory (`../images/a.png`
    /// for a document one level down).
    #[default]
    Relative,
    /// `./images/a.png` everywhere, regardless of depth.
    Flat,
}

/// Configuration for a conversion run.
#[derive(Debug, Clone)]
pub struct ConvertConfig {
    pub expressions: ExpressionMode,
    pub image_links: ImageLinkStyle,
    pub write_summary: bool,
    /// File name of the index, written at the output root.
    pub summary_name: String,
    /// Name of the assets directory at the output root.
    pub assets_dir_name: String,
}

impl Default for ConvertConfig {
    fn default() -> Self {
        Self {
            expressions: ExpressionMode::default(),
            image_links: ImageLinkStyle::default(),
            write_summary: true,
            summary_name: "summary.md".to_string(),
            assets_dir_name: "images".to_string(),
        }
    }
}

impl ConvertConfig {
    pub fn with_expressions(mut self, mode: ExpressionMode) -> Self {
        self.expressions = mode;
        self
    }

    pub fn with_image_links(mut self, style: ImageLinkStyle) -> Self {
        self.image_links = style;
        self
    }

    pub fn with_summary(mut self, write_summary: bool) -> Self {
        self.write_summary = write_summary;
        self
    }

    pub fn with_summary_name(mut self, name: impl Into<String>) -> Self {
        self.summary_name = name.into();
        self
    }

    pub fn with_assets_dir_name(mut self, name: impl Into<String>) -> Self {
        self.assets_dir_name = name.into();
        self
    }
}

/// A document that made it to the output tree.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "cli", derive(serde::Serialize))]
pub struct ConvertedDocument {
    /// Source path relative to the input root.
    pub source: PathBuf,
    /// Output path relative to the output root.
    pub output: PathBuf,
    pub title: String,
    pub kind: DocumentKind,
}

/// A document that was skipped because of an error.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "cli", derive(serde::Serialize))]
pub struct FailedDocument {
    pub source: PathBuf,
    pub error: String,
}

/// Outcome of [`Converter::run`].
#[derive(Debug, Clone, Default)]
#[cfg_attr(feature = "cli", derive(serde::Serialize))]
pub struct ConversionReport {
    pub documents: Vec<ConvertedDocument>,
    pub failures: Vec<FailedDocument>,
    pub assets_copied: usize,
    pub missing_assets: Vec<String>,
    /// Path of the written index, if any.
    pub summary: Option<PathBuf>,
}

/// Converts a documentation tree.
#[derive(Debug, Clone, Default)]
pub struct Converter {
    config: ConvertConfig,
}

impl Converter {
    /// Create a converter with default configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a converter with the specified configuration.
    pub fn with_config(config: ConvertConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ConvertConfig {
        &self.config
    }

    /// Convert every document under `input` into `output`.
    ///
    /// Fails only on whole-run problems: `input` not being a directory,
    /// `output` not being creatable, or the index not being writable.
    pub fn run(&self, input: &Path, output: &Path) -> Result<ConversionReport> {
        if !input.is_dir() {
            return Err(Error::InvalidInput(format!(
                "{} is not a directory",
                input.display()
            )));
        }
        fs::create_dir_all(output)?;

        let sources = find_documents(input, Some(output))?;
        info!(
            "found {} documents under {}",
            sources.len(),
            input.display()
        );

        let mut resolver = AssetResolver::new(output.join(&self.config.assets_dir_name));
        let mut index = Index::new();
        let mut report = ConversionReport::default();
        let mut written: HashSet<PathBuf> = HashSet::new();
        let summary_path = Path::new(&self.config.summary_name);

        for source in sources {
            let relative = source.strip_prefix(input).unwrap_or(&source).to_path_buf();

            // The index is written last and would replace this document
            if self.config.write_summary && relative.with_extension("md") == summary_path {
                warn!(
                    "skipping {}: its output collides with the index {}",
                    relative.display(),
                    self.config.summary_name
                );
                report.failures.push(FailedDocument {
                    source: relative,
                    error: format!(
                        "output path collides with the index {}",
                        self.config.summary_name
                    ),
                });
                continue;
            }

            match self.convert_document(&source, &relative, output, &mut resolver) {
                Ok(doc) => {
                    info!("converted {}", relative.display());
                    if !written.insert(doc.output.clone()) {
                        warn!(
                            "{} overwrote an earlier document with the same output path",
                            relative.display()
                        );
                    }
                    index.push(doc.title.clone(), doc.output.clone());
                    report.documents.push(doc);
                }
                Err(e) => {
                    warn!("skipping {}: {e}", relative.display());
                    report.failures.push(FailedDocument {
                        source: relative,
                        error: e.to_string(),
                    });
                }
            }
        }

        if self.config.write_summary {
            let summary = output.join(&self.config.summary_name);
            fs::write(&summary, index.render())?;
            debug!("wrote index {}", summary.display());
            report.summary = Some(summary);
        }

        report.assets_copied = resolver.copied();
        report.missing_assets = resolver.missing().to_vec();
        Ok(report)
    }

    /// Convert one document.
    ///
    /// `source` is the absolute (or cwd-relative) path used for reading and
    /// image resolution; `relative` is its path under the input root, which
    /// is mirrored under `output_root`.
    pub fn convert_document(
        &self,
        source: &Path,
        relative: &Path,
        output_root: &Path,
        resolver: &mut AssetResolver,
    ) -> Result<ConvertedDocument> {
        let kind = DocumentKind::from_path(source).ok_or_else(|| {
            Error::InvalidInput(format!("{} is not a document", source.display()))
        })?;

        let bytes = fs::read(source)?;
        let hint = match kind {
            DocumentKind::Html => sniff_charset(&bytes),
            DocumentKind::Mdx => None,
        };
        let text = decode_text(&bytes, hint.as_deref()).ok_or_else(|| Error::Decode {
            path: source.to_path_buf(),
        })?;

        let output = relative.with_extension("md");
        let output_dir = output.parent().unwrap_or(Path::new(""));
        let image_prefix = self.image_prefix(output_dir);

        let markdown = match kind {
            DocumentKind::Mdx => MdxTransformer::with_config(MdxConfig {
                expressions: self.config.expressions,
                image_prefix,
            })
            .transform(&text, source, resolver),
            DocumentKind::Html => HtmlTransformer::with_config(HtmlConfig { image_prefix })
                .transform(&text, source, resolver),
        };

        let target = output_root.join(&output);
        if let Some(parent) = target.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&target, &markdown)?;

        Ok(ConvertedDocument {
            source: relative.to_path_buf(),
            title: document_title(&markdown, &output),
            output,
            kind,
        })
    }

    fn image_prefix(&self, output_dir: &Path) -> String {
        let assets = &self.config.assets_dir_name;
        match self.config.image_links {
            ImageLinkStyle::Relative => relative_link(output_dir, Path::new(assets)),
            ImageLinkStyle::Flat => format!("./{assets}"),
        }
    }
}

/// Find every document under `root`, sorted by path.
///
/// Hidden directories and `node_modules` are not entered, nor is `exclude`
/// (typically the output directory when it sits inside the input). An
/// unreadable `root` is an error; unreadable entries below it are logged
/// and skipped.
pub fn find_documents(root: &Path, exclude: Option<&Path>) -> Result<Vec<PathBuf>> {
    let exclude = exclude.and_then(|p| p.canonicalize().ok());

    let walker = WalkDir::new(root)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(|e| !is_skipped(e, exclude.as_deref()));

    let mut documents = Vec::new();
    for entry in walker {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) if e.depth() == 0 => return Err(e.into()),
            Err(e) => {
                warn!("cannot read entry: {e}");
                continue;
            }
        };

        if entry.file_type().is_file() && DocumentKind::from_path(entry.path()).is_some() {
            documents.push(entry.into_path());
        }
    }
    Ok(documents)
}

fn is_skipped(entry: &DirEntry, exclude: Option<&Path>) -> bool {
    if entry.depth() == 0 || !entry.file_type().is_dir() {
        return false;
    }

    let name = entry.file_name().to_string_lossy();
    if name.starts_with('.') || SKIPPED_DIRS.contains(&name.as_ref()) {
        return true;
    }

    exclude.is_some_and(|ex| entry.path().canonicalize().is_ok_and(|p| p == ex))
}

/// Charset declared by `<meta charset="...">` near the top of an HTML file.
fn sniff_charset(bytes: &[u8]) -> Option<String> {
    let head = String::from_utf8_lossy(&bytes[..bytes.len().min(CHARSET_SNIFF_LEN)]);
    META_CHARSET_RE
        .captures(&head)
        .map(|caps| caps[1].to_string())
}

#[cfg(test)]
mod tests {
    use tempfile::TempDir;

    use super::*;

    #[test]
    fn test_document_kind_from_path() {
        assert_eq!(
            DocumentKind::from_path(Path::new("a/b.mdx")),
            Some(DocumentKind::Mdx)
        );
        assert_eq!(
            DocumentKind::from_path(Path::new("README.MD")),
            Some(DocumentKind::Mdx)
        );
        assert_eq!(
            DocumentKind::from_path(Path::new("page.htm")),
            Some(DocumentKind::Html)
        );
        assert_eq!(DocumentKind::from_path(Path::new("logo.png")), None);
        assert_eq!(DocumentKind::from_path(Path::new("Makefile")), None);
    }

    #[test]
    fn test_find_documents_skips_hidden_and_vendor_dirs() {
        let tmp = TempDir::new().unwrap();
        let root = tmp.path();
        for dir in [".git", "node_modules/pkg", "docs"] {
            fs::create_dir_all(root.join(dir)).unwrap();
        }
        fs::write(root.join(".git/notes.md"), "x").unwrap();
        fs::write(root.join("node_modules/pkg/README.md"), "x").unwrap();
        fs::write(root.join("docs/b.mdx"), "x").unwrap();
        fs::write(root.join("docs/a.html"), "x").unwrap();
        fs::write(root.join("docs/logo.png"), "x").unwrap();

        let found = find_documents(root, None).unwrap();
        let names: Vec<_> = found
            .iter()
            .map(|p| p.strip_prefix(root).unwrap().to_path_buf())
            .collect();

        assert_eq!(
            names,
            vec![PathBuf::from("docs/a.html"), PathBuf::from("docs/b.mdx")]
        );
    }

    #[test]
    fn test_find_documents_excludes_output_inside_input() {
        let tmp = TempDir::new().unwrap();
        let root = tmp.path();
        fs::create_dir_all(root.join("out")).unwrap();
        fs::write(root.join("index.mdx"), "x").unwrap();
        fs::write(root.join("out/index.md"), "x").unwrap();

        let found = find_documents(root, Some(&root.join("out"))).unwrap();

        assert_eq!(found, vec![root.join("index.mdx")]);
    }

    #[test]
    fn test_find_documents_missing_root_is_error() {
        let tmp = TempDir::new().unwrap();
        assert!(find_documents(&tmp.path().join("absent"), None).is_err());
    }

    #[test]
    fn test_image_prefix_styles() {
        let relative = Converter::new();
        assert_eq!(relative.image_prefix(Path::new("")), "./images");
        assert_eq!(relative.image_prefix(Path::new("guide/api")), "../../images");

        let flat = Converter::with_config(
            ConvertConfig::default()
                .with_image_links(ImageLinkStyle::Flat)
                .with_assets_dir_name("assets"),
        );
        assert_eq!(flat.image_prefix(Path::new("guide/api")), "./assets");
    }

    #[test]
    fn test_sniff_charset() {
        let html = br#"<html><head><meta charset="iso-8859-2"></head>"#;
        assert_eq!(sniff_charset(html).as_deref(), Some("iso-8859-2"));
        assert_eq!(sniff_charset(b"<p>none</p>"), None);
    }

    #[test]
    fn test_convert_document_binary_is_decode_error() {
        let tmp = TempDir::new().unwrap();
        let source = tmp.path().join("blob.mdx");
        fs::write(&source, b"\0\x01\x02").unwrap();
        let mut resolver = AssetResolver::new(tmp.path().join("out/images"));

        let err = Converter::new()
            .convert_document(
                &source,
                Path::new("blob.mdx"),
                &tmp.path().join("out"),
                &mut resolver,
            )
            .unwrap_err();

        assert!(matches!(err, Error::Decode { .. }));
    }
}
