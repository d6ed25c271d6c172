//! ZIP input and output.
//!
//! Repository archives are extracted into a scratch directory before
//! conversion, and a converted tree can be packed back into one archive.

use std::fs::{self, File};
use std::io;
use std::path::{Path, PathBuf};

use log::{debug, warn};
use walkdir::WalkDir;
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipArchive, ZipWriter};

use crate::error::Result;
use crate::util::to_slash;

/// Entries some archivers add next to the real content.
const ARCHIVE_NOISE: &[&str] = &["__MACOSX", ".DS_Store"];

/// Configuration for packing a directory.
#[derive(Debug, Clone, Default)]
pub struct PackConfig {
    /// Compression level for deflate (0-9, default 6).
    pub compression_level: Option<u32>,
}

/// Extract `archive` into `dest` and return the directory holding the
/// content.
///
/// Entries whose names would escape `dest` (absolute paths, `..`) are
/// skipped. When the archive wraps everything in one top-level directory,
/// as GitHub's "Download ZIP" does with `repo-main/`, that directory is
/// returned instead of `dest`.
pub fn extract_zip(archive: &Path, dest: &Path) -> Result<PathBuf> {
    let mut zip = ZipArchive::new(File::open(archive)?)?;
    fs::create_dir_all(dest)?;

    for i in 0..zip.len() {
        let mut entry = zip.by_index(i)?;
        let Some(relative) = entry.enclosed_name() else {
            warn!("skipping unsafe archive entry {}", entry.name());
            continue;
        };
        let target = dest.join(relative);

        if entry.is_dir() {
            fs::create_dir_all(&target)?;
            continue;
        }

        if let Some(parent) = target.parent() {
            fs::create_dir_all(parent)?;
        }
        let mut out = File::create(&target)?;
        io::copy(&mut entry, &mut out)?;
    }

    debug!("extracted {} entries from {}", zip.len(), archive.display());
    content_root(dest)
}

/// The single wrapping directory of `dir`, or `dir` itself.
pub fn content_root(dir: &Path) -> Result<PathBuf> {
    let mut dirs = Vec::new();
    let mut has_files = false;

    for entry in fs::read_dir(dir)? {
        let entry = entry?;
        let name = entry.file_name();
        if name.to_str().is_some_and(|n| ARCHIVE_NOISE.contains(&n)) {
            continue;
        }
        if entry.file_type()?.is_dir() {
            dirs.push(entry.path());
        } else {
            has_files = true;
        }
    }

    if !has_files && dirs.len() == 1 {
        Ok(dirs.remove(0))
    } else {
        Ok(dir.to_path_buf())
    }
}

/// Pack every file under `dir` into a new ZIP at `archive`, with paths
/// relative to `dir`. Returns the number of files written.
pub fn pack_dir(dir: &Path, archive: &Path, config: &PackConfig) -> Result<usize> {
    if let Some(parent) = archive.parent() {
        fs::create_dir_all(parent)?;
    }

    let compression_level = config.compression_level.unwrap_or(6);
    let deflated = SimpleFileOptions::default()
        .compression_method(CompressionMethod::Deflated)
        .compression_level(Some(compression_level as i64));

    let mut zip = ZipWriter::new(File::create(archive)?);
    let mut files = 0;

    for entry in WalkDir::new(dir).min_depth(1).sort_by_file_name() {
        let entry = entry?;
        let relative = entry.path().strip_prefix(dir).unwrap_or(entry.path());
        let name = to_slash(relative);

        if entry.file_type().is_dir() {
            zip.add_directory(format!("{name}/"), deflated)?;
        } else {
            zip.start_file(name, deflated)?;
            let mut source = File::open(entry.path())?;
            io::copy(&mut source, &mut zip)?;
            files += 1;
        }
    }

    zip.finish()?;
    debug!("packed {files} files into {}", archive.display());
    Ok(files)
}

#[cfg(test)]
mod tests {
    use std::io::{Read, Write};

    use tempfile::TempDir;

    use super::*;

    fn write_zip(path: &Path, entries: &[(&str, &str)]) {
        let mut zip = ZipWriter::new(File::create(path).unwrap());
        for (name, data) in entries {
            if name.ends_with('/') {
                zip.add_directory(*name, SimpleFileOptions::default()).unwrap();
            } else {
                zip.start_file(*name, SimpleFileOptions::default()).unwrap();
                zip.write_all(data.as_bytes()).unwrap();
            }
        }
        zip.finish().unwrap();
    }

    #[test]
    fn test_extract_descends_into_wrapper_dir() {
        let tmp = TempDir::new().unwrap();
        let archive = tmp.path().join("repo.zip");
        write_zip(
            &archive,
            &[
                ("repo-main/", ""),
                ("repo-main/docs/index.mdx", "# Home"),
                ("__MACOSX/._junk", "x"),
            ],
        );

        let root = extract_zip(&archive, &tmp.path().join("x")).unwrap();

        assert!(root.ends_with("repo-main"));
        assert_eq!(
            fs::read_to_string(root.join("docs/index.mdx")).unwrap(),
            "# Home"
        );
    }

    #[test]
    fn test_extract_flat_archive_uses_dest() {
        let tmp = TempDir::new().unwrap();
        let archive = tmp.path().join("flat.zip");
        write_zip(&archive, &[("a.mdx", "a"), ("guide/b.mdx", "b")]);

        let dest = tmp.path().join("x");
        let root = extract_zip(&archive, &dest).unwrap();

        assert_eq!(root, dest);
    }

    #[test]
    fn test_extract_skips_escaping_entries() {
        let tmp = TempDir::new().unwrap();
        let archive = tmp.path().join("evil.zip");
        write_zip(&archive, &[("../evil.txt", "x"), ("ok.mdx", "ok")]);

        let dest = tmp.path().join("x");
        extract_zip(&archive, &dest).unwrap();

        assert!(!tmp.path().join("evil.txt").exists());
        assert!(dest.join("ok.mdx").is_file());
    }

    #[test]
    fn test_extract_rejects_corrupt_archive() {
        let tmp = TempDir::new().unwrap();
        let archive = tmp.path().join("bad.zip");
        fs::write(&archive, b"not a zip").unwrap();

        assert!(extract_zip(&archive, &tmp.path().join("x")).is_err());
    }

    #[test]
    fn test_pack_dir_roundtrip() {
        let tmp = TempDir::new().unwrap();
        let dir = tmp.path().join("out");
        fs::create_dir_all(dir.join("images")).unwrap();
        fs::write(dir.join("summary.md"), "# Summary\n").unwrap();
        fs::write(dir.join("images/a.png"), b"png").unwrap();

        let archive = tmp.path().join("converted.zip");
        let files = pack_dir(&dir, &archive, &PackConfig::default()).unwrap();
        assert_eq!(files, 2);

        let mut zip = ZipArchive::new(File::open(&archive).unwrap()).unwrap();
        let mut content = String::new();
        zip.by_name("summary.md")
            .unwrap()
            .read_to_string(&mut content)
            .unwrap();
        assert_eq!(content, "# Summary\n");
        assert!(zip.by_name("images/a.png").is_ok());
        assert!(zip.by_name("images/").is_ok());
    }
}
