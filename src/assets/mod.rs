//! Asset store module
//!
//! Builds the immutable in-memory store of bundled assets at startup. Two
//! trees are walked: structured data (`json/`) and images (`images/`). Every
//! eligible file becomes an [`Asset`] keyed by its public URL path, with its
//! validation token computed once at insert time.

pub mod source;

use crate::config::AssetsConfig;
use crate::http::{cache, mime};
use crate::logger;
use chrono::{DateTime, SubsecRound, Utc};
use hyper::body::Bytes;
use include_dir::{include_dir, Dir};
use std::collections::HashMap;
use std::io;
use thiserror::Error;

pub use source::{ContentTree, DiskTree, EmbeddedTree, TreeEntry};

static DATA_TREE: Dir<'static> = include_dir!("$CARGO_MANIFEST_DIR/json");
static IMAGE_TREE: Dir<'static> = include_dir!("$CARGO_MANIFEST_DIR/images");

/// Extension that makes a data tree file eligible (case-sensitive)
const DATA_EXTENSION: &str = ".json";

/// Extensions that make an image tree file eligible (case-insensitive)
const IMAGE_EXTENSIONS: [&str; 8] = [
    ".png", ".jpg", ".jpeg", ".gif", ".webp", ".svg", ".bmp", ".ico",
];

/// Fatal errors while building the store
#[derive(Debug, Error)]
pub enum BundleError {
    #[error("failed to list directory '{dir}' in {tree}: {source}")]
    ListDir {
        tree: String,
        dir: String,
        #[source]
        source: io::Error,
    },
}

/// A single bundled file
#[derive(Debug, Clone)]
pub struct Asset {
    /// Public URL path, always starting with `/`
    pub path: String,
    pub content: Bytes,
    /// Quoted validation token derived from `content`
    pub etag: String,
    pub bundled_at: DateTime<Utc>,
    pub content_type: Option<&'static str>,
}

impl Asset {
    fn new(path: String, content: Bytes, bundled_at: DateTime<Utc>) -> Self {
        let etag = cache::generate_etag(&content);
        let content_type = mime::content_type_for_path(&path);
        Self {
            path,
            content,
            etag,
            bundled_at,
            content_type,
        }
    }

    pub fn len(&self) -> usize {
        self.content.len()
    }

    pub fn is_empty(&self) -> bool {
        self.content.is_empty()
    }
}

/// Outcome counters of a store build
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct BuildReport {
    pub loaded: usize,
    /// Eligible files whose contents could not be read
    pub skipped: Vec<String>,
    /// Paths already taken by an earlier tree
    pub shadowed: Vec<String>,
}

/// Immutable mapping from public path to asset
///
/// Each asset carries its own validation token, so the fingerprint index
/// and the store always share one key set.
#[derive(Debug, Default)]
pub struct AssetStore {
    assets: HashMap<String, Asset>,
}

impl AssetStore {
    /// Build from the trees embedded at compile time
    pub fn from_bundle() -> Result<(Self, BuildReport), BundleError> {
        Self::load(&AssetsConfig::default())
    }

    /// Build from configured sources, falling back to the embedded trees
    pub fn load(config: &AssetsConfig) -> Result<(Self, BuildReport), BundleError> {
        let data: Box<dyn ContentTree> = match &config.data_dir {
            Some(dir) => Box::new(DiskTree::new(dir)),
            None => Box::new(EmbeddedTree::new("json", &DATA_TREE)),
        };
        let images: Box<dyn ContentTree> = match &config.images_dir {
            Some(dir) => Box::new(DiskTree::new(dir)),
            None => Box::new(EmbeddedTree::new("images", &IMAGE_TREE)),
        };
        Self::build(data.as_ref(), images.as_ref(), Utc::now())
    }

    /// Walk both trees and load every eligible file
    ///
    /// The data tree is walked first and keeps any public path the image tree
    /// also yields. Entries are visited in name order so logs and reports do
    /// not depend on listing order.
    pub fn build(
        data: &dyn ContentTree,
        images: &dyn ContentTree,
        bundled_at: DateTime<Utc>,
    ) -> Result<(Self, BuildReport), BundleError> {
        let mut builder = StoreBuilder {
            assets: HashMap::new(),
            report: BuildReport::default(),
            // HTTP dates carry whole seconds only
            bundled_at: bundled_at.trunc_subsecs(0),
        };

        builder.walk(data, "", is_data_file)?;
        builder.walk(images, "", is_image_file)?;

        let StoreBuilder { assets, report, .. } = builder;
        Ok((Self { assets }, report))
    }

    pub fn get(&self, path: &str) -> Option<&Asset> {
        self.assets.get(path)
    }

    /// Validation token of the asset at `path`
    pub fn fingerprint(&self, path: &str) -> Option<&str> {
        self.assets.get(path).map(|a| a.etag.as_str())
    }

    pub fn contains(&self, path: &str) -> bool {
        self.assets.contains_key(path)
    }

    pub fn len(&self) -> usize {
        self.assets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.assets.is_empty()
    }

    /// All public paths, sorted
    pub fn paths(&self) -> Vec<&str> {
        let mut paths: Vec<&str> = self.assets.keys().map(String::as_str).collect();
        paths.sort_unstable();
        paths
    }
}

struct StoreBuilder {
    assets: HashMap<String, Asset>,
    report: BuildReport,
    bundled_at: DateTime<Utc>,
}

impl StoreBuilder {
    fn walk(
        &mut self,
        tree: &dyn ContentTree,
        dir: &str,
        eligible: fn(&str) -> bool,
    ) -> Result<(), BundleError> {
        let mut entries = tree.list(dir).map_err(|source| BundleError::ListDir {
            tree: tree.label().to_string(),
            dir: dir.to_string(),
            source,
        })?;
        entries.sort_by(|a, b| a.name.cmp(&b.name));

        for entry in entries {
            let relative = if dir.is_empty() {
                entry.name.clone()
            } else {
                format!("{dir}/{}", entry.name)
            };

            if entry.is_dir {
                self.walk(tree, &relative, eligible)?;
                continue;
            }
            if !eligible(&entry.name) {
                continue;
            }

            let public_path = format!("/{relative}");
            if self.assets.contains_key(&public_path) {
                logger::log_warning(&format!(
                    "Skipping {relative} in {}: {public_path} is already bundled",
                    tree.label()
                ));
                self.report.shadowed.push(public_path);
                continue;
            }

            match tree.read(&relative) {
                Ok(content) => {
                    let asset = Asset::new(public_path.clone(), content, self.bundled_at);
                    self.assets.insert(public_path, asset);
                    self.report.loaded += 1;
                }
                Err(e) => {
                    logger::log_warning(&format!(
                        "Failed to read bundled file {relative} in {}: {e}",
                        tree.label()
                    ));
                    self.report.skipped.push(public_path);
                }
            }
        }

        Ok(())
    }
}

/// Data tree eligibility: exact `.json` suffix
pub fn is_data_file(name: &str) -> bool {
    name.ends_with(DATA_EXTENSION)
}

/// Image tree eligibility: allow-listed extension, any case
pub fn is_image_file(name: &str) -> bool {
    let lower = name.to_ascii_lowercase();
    IMAGE_EXTENSIONS.iter().any(|ext| lower.ends_with(ext))
}
