//! Table of contents for a converted tree.
//!
//! One entry per converted document, grouped by output directory and
//! rendered as a GitBook-style `summary.md`:
//!
//! ```text
//! # Summary
//!
//! * [Introduction](intro.md)
//!
//! ## guide
//!
//! * [Setup](guide/setup.md)
//! ```

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use percent_encoding::{AsciiSet, CONTROLS, utf8_percent_encode};

use crate::transform::patterns::ATX_HEADING_RE;
use crate::util::to_slash;

/// Characters that would break a Markdown link target.
const LINK_TARGET: &AsciiSet = &CONTROLS.add(b' ').add(b'(').add(b')').add(b'<').add(b'>');

/// One converted document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexEntry {
    pub title: String,
    /// Output path relative to the output root.
    pub link: PathBuf,
}

/// Ordered collection of index entries.
#[derive(Debug, Clone, Default)]
pub struct Index {
    entries: Vec<IndexEntry>,
}

impl Index {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, title: impl Into<String>, link: impl Into<PathBuf>) {
        self.entries.push(IndexEntry {
            title: title.into(),
            link: link.into(),
        });
    }

    pub fn entries(&self) -> &[IndexEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Render the summary document.
    ///
    /// Root-level documents come first, then one `##` section per directory
    /// in lexical order. Entries inside a section are sorted by path.
    pub fn render(&self) -> String {
        let mut groups: BTreeMap<String, Vec<&IndexEntry>> = BTreeMap::new();
        for entry in &self.entries {
            let dir = entry.link.parent().map(to_slash).unwrap_or_default();
            groups.entry(dir).or_default().push(entry);
        }

        let mut out = String::from("# Summary\n");
        for (dir, mut entries) in groups {
            entries.sort_by(|a, b| a.link.cmp(&b.link));

            out.push('\n');
            if !dir.is_empty() {
                out.push_str(&format!("## {dir}\n\n"));
            }
            for entry in entries {
                let target = utf8_percent_encode(&to_slash(&entry.link), LINK_TARGET).to_string();
                out.push_str(&format!("* [{}]({target})\n", escape_title(&entry.title)));
            }
        }
        out
    }
}

/// Title for a converted document.
///
/// Uses, in order: a `title:` key in leading `---` front matter, the first
/// ATX heading, the file stem of `path`.
pub fn document_title(markdown: &str, path: &Path) -> String {
    if let Some(title) = front_matter_title(markdown) {
        return title;
    }

    if let Some(caps) = ATX_HEADING_RE.captures(markdown) {
        let title = caps[1].trim();
        if !title.is_empty() {
            return title.to_string();
        }
    }

    path.file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default()
}

fn front_matter_title(markdown: &str) -> Option<String> {
    let mut lines = markdown.lines();
    if lines.next()?.trim_end() != "---" {
        return None;
    }

    for line in lines {
        let line = line.trim_end();
        if line == "---" {
            break;
        }
        if let Some(value) = line.strip_prefix("title:") {
            let value = value.trim().trim_matches(|c| c == '"' || c == '\'');
            if !value.is_empty() {
                return Some(value.to_string());
            }
        }
    }
    None
}

fn escape_title(title: &str) -> String {
    let mut out = String::with_capacity(title.len());
    for c in title.chars() {
        if matches!(c, '[' | ']' | '\\') {
            out.push('\\');
        }
        out.push(c);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_groups_by_directory() {
        let mut index = Index::new();
        index.push("Setup", "guide/setup.md");
        index.push("Intro", "intro.md");
        index.push("Install", "guide/install.md");
        index.push("Deep", "guide/advanced/deep.md");

        assert_eq!(
            index.render(),
            "# Summary\n\
             \n\
             * [Intro](intro.md)\n\
             \n\
             ## guide\n\
             \n\
             * [Install](guide/install.md)\n\
             * [Setup](guide/setup.md)\n\
             \n\
             ## guide/advanced\n\
             \n\
             * [Deep](guide/advanced/deep.md)\n"
        );
    }

    #[test]
    fn test_render_empty() {
        assert_eq!(Index::new().render(), "# Summary\n");
    }

    #[test]
    fn test_render_encodes_spaces_and_escapes_titles() {
        let mut index = Index::new();
        index.push("Arrays [advanced]", "my docs/arrays.md");

        assert!(
            index
                .render()
                .contains("* [Arrays \\[advanced\\]](my%20docs/arrays.md)")
        );
    }

    #[test]
    fn test_title_from_front_matter() {
        let md = "---\nsidebar_position: 2\ntitle: \"Getting Started\"\n---\n# Other\n";
        assert_eq!(document_title(md, Path::new("x.md")), "Getting Started");
    }

    #[test]
    fn test_title_from_first_heading() {
        let md = "Some intro\n\n## Configuring ##\n\n# Later\n";
        assert_eq!(document_title(md, Path::new("x.md")), "Configuring");
    }

    #[test]
    fn test_title_falls_back_to_stem() {
        assert_eq!(
            document_title("no headings here", Path::new("guide/quick-start.md")),
            "quick-start"
        );
    }

    #[test]
    fn test_hash_without_space_is_not_heading() {
        assert_eq!(document_title("#hashtag\n", Path::new("tags.md")), "tags");
    }
}
