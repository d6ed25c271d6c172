//! Centralized image collection.
//!
//! Every image a document references is copied into one flat assets
//! directory, keyed by file name only. Two different images that share a
//! file name overwrite each other: the last document processed wins.

use std::borrow::Cow;
use std::fs;
use std::path::{Component, Path, PathBuf};

use log::{debug, warn};
use percent_encoding::percent_decode_str;

use crate::util::basename;

/// Copies referenced images into the shared assets directory.
///
/// Resolution never fails. A reference whose file cannot be found (or
/// copied) is recorded in [`AssetResolver::missing`] and the caller still
/// rewrites the link, leaving it dangling.
#[derive(Debug)]
pub struct AssetResolver {
    assets_dir: PathBuf,
    copied: usize,
    missing: Vec<String>,
}

impl AssetResolver {
    /// Create a resolver that copies into `assets_dir`.
    ///
    /// The directory is created lazily, on the first successful copy.
    pub fn new(assets_dir: impl Into<PathBuf>) -> Self {
        Self {
            assets_dir: assets_dir.into(),
            copied: 0,
            missing: Vec::new(),
        }
    }

    pub fn assets_dir(&self) -> &Path {
        &self.assets_dir
    }

    /// Number of files copied so far (overwrites included).
    pub fn copied(&self) -> usize {
        self.copied
    }

    /// References that did not resolve to a readable file, as
    /// `containing_dir/raw_path`.
    pub fn missing(&self) -> &[String] {
        &self.missing
    }

    /// Resolve `raw_path` against `containing_dir` and copy the file into the
    /// assets directory if it exists.
    ///
    /// Root-style paths (`/img/a.png`) are still taken relative to
    /// `containing_dir`; nothing outside the document's tree is read through
    /// them.
    ///
    /// Returns the basename of `raw_path` for the caller to link to, whether
    /// or not a copy happened.
    pub fn resolve(&mut self, raw_path: &str, containing_dir: &Path) -> String {
        let name = basename(raw_path).to_string();

        match locate(raw_path, containing_dir) {
            Some((source, file_name)) => {
                let target = self.assets_dir.join(file_name);
                match self.copy(&source, &target) {
                    Ok(()) => {
                        debug!("copied {} -> {}", source.display(), target.display());
                        self.copied += 1;
                    }
                    Err(e) => {
                        warn!("failed to copy image {}: {e}", source.display());
                        self.record_missing(raw_path, containing_dir);
                    }
                }
            }
            None => {
                debug!(
                    "image {raw_path} not found relative to {}",
                    containing_dir.display()
                );
                self.record_missing(raw_path, containing_dir);
            }
        }

        name
    }

    fn copy(&self, source: &Path, target: &Path) -> std::io::Result<()> {
        fs::create_dir_all(&self.assets_dir)?;
        if target.exists() {
            // Copying a file onto itself would truncate it
            if fs::canonicalize(source)? == fs::canonicalize(target)? {
                return Ok(());
            }
            debug!("overwriting existing asset {}", target.display());
        }
        fs::copy(source, target)?;
        Ok(())
    }

    fn record_missing(&mut self, raw_path: &str, containing_dir: &Path) {
        self.missing.push(
            anchored(containing_dir, raw_path)
                .to_string_lossy()
                .into_owned(),
        );
    }
}

/// Find the file `raw_path` refers to, trying the path as written and then
/// percent-decoded.
///
/// Returns the file and the name it is stored under in the assets
/// directory: the basename of whichever spelling matched, so `img\a.png`
/// is stored as `a.png` and `my%20image.png` as `my image.png`, the names
/// their links point at.
fn locate(raw_path: &str, containing_dir: &Path) -> Option<(PathBuf, String)> {
    let candidate = anchored(containing_dir, raw_path);
    if candidate.is_file() {
        return Some((candidate, basename(raw_path).to_string()));
    }

    // `my%20image.png` is common in Markdown links
    if let Ok(Cow::Owned(decoded)) = percent_decode_str(raw_path).decode_utf8() {
        let candidate = anchored(containing_dir, &decoded);
        if candidate.is_file() {
            let name = basename(&decoded).to_string();
            return Some((candidate, name));
        }
    }

    None
}

/// `raw_path` joined under `dir`, with any root or drive prefix dropped.
fn anchored(dir: &Path, raw_path: &str) -> PathBuf {
    let relative = raw_path.trim_start_matches(['/', '\\']);
    let mut path = dir.to_path_buf();
    for component in Path::new(relative).components() {
        match component {
            Component::Normal(part) => path.push(part),
            Component::ParentDir => path.push(".."),
            Component::CurDir | Component::RootDir | Component::Prefix(_) => {}
        }
    }
    path
}
