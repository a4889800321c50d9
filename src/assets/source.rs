//! Content tree sources
//!
//! The asset store walks trees through [`ContentTree`], so the same traversal
//! serves trees embedded at build time and directories read from disk.

use hyper::body::Bytes;
use include_dir::{Dir, DirEntry};
use std::io;
use std::path::PathBuf;

/// A single child of a tree directory
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TreeEntry {
    pub name: String,
    pub is_dir: bool,
}

/// Read-only hierarchical content source
///
/// Paths are relative to the tree root, `/`-separated, with `""` naming the
/// root itself.
pub trait ContentTree: Send + Sync {
    /// Human readable name used in log messages
    fn label(&self) -> &str;

    /// List the direct children of `dir`
    fn list(&self, dir: &str) -> io::Result<Vec<TreeEntry>>;

    /// Read the full contents of `file`
    fn read(&self, file: &str) -> io::Result<Bytes>;
}

/// Tree compiled into the binary with `include_dir!`
pub struct EmbeddedTree {
    label: &'static str,
    root: &'static Dir<'static>,
}

impl EmbeddedTree {
    pub const fn new(label: &'static str, root: &'static Dir<'static>) -> Self {
        Self { label, root }
    }

    fn dir(&self, dir: &str) -> io::Result<&'static Dir<'static>> {
        if dir.is_empty() {
            return Ok(self.root);
        }
        self.root
            .get_dir(dir)
            .ok_or_else(|| not_found(self.label, dir))
    }
}

impl ContentTree for EmbeddedTree {
    fn label(&self) -> &str {
        self.label
    }

    fn list(&self, dir: &str) -> io::Result<Vec<TreeEntry>> {
        let entries = self
            .dir(dir)?
            .entries()
            .iter()
            .filter_map(|entry| {
                let name = entry.path().file_name()?.to_str()?.to_string();
                let is_dir = matches!(entry, DirEntry::Dir(_));
                Some(TreeEntry { name, is_dir })
            })
            .collect();
        Ok(entries)
    }

    fn read(&self, file: &str) -> io::Result<Bytes> {
        self.root
            .get_file(file)
            .map(|f| Bytes::from_static(f.contents()))
            .ok_or_else(|| not_found(self.label, file))
    }
}

/// Tree rooted at a directory on disk
pub struct DiskTree {
    label: String,
    root: PathBuf,
}

impl DiskTree {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        let root = root.into();
        Self {
            label: root.display().to_string(),
            root,
        }
    }

    fn resolve(&self, relative: &str) -> PathBuf {
        relative
            .split('/')
            .filter(|segment| !segment.is_empty())
            .fold(self.root.clone(), |path, segment| path.join(segment))
    }
}

impl ContentTree for DiskTree {
    fn label(&self) -> &str {
        &self.label
    }

    fn list(&self, dir: &str) -> io::Result<Vec<TreeEntry>> {
        let mut entries = Vec::new();
        for entry in std::fs::read_dir(self.resolve(dir))? {
            let entry = entry?;
            // Non UTF-8 names cannot become URL paths
            let Ok(name) = entry.file_name().into_string() else {
                continue;
            };
            entries.push(TreeEntry {
                name,
                is_dir: entry.file_type()?.is_dir(),
            });
        }
        Ok(entries)
    }

    fn read(&self, file: &str) -> io::Result<Bytes> {
        std::fs::read(self.resolve(file)).map(Bytes::from)
    }
}

fn not_found(label: &str, path: &str) -> io::Error {
    io::Error::new(
        io::ErrorKind::NotFound,
        format!("'{path}' not found in {label}"),
    )
}
