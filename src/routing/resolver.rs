//! Path resolution
//!
//! Turns a request path into a single terminal outcome.

use super::rules::{RuleAction, PATH_RULES};
use crate::assets::{Asset, AssetStore};

/// Outcome of resolving a request path
#[derive(Debug, Clone, Copy)]
pub enum Resolution<'a> {
    Health,
    /// 302 to the configured default target
    RedirectToDefault,
    /// 301 to an absolute external URL
    PermanentRedirect(&'static str),
    /// Asset to negotiate, possibly reached through an alias
    Asset(&'a Asset),
    /// Nothing matched; answered with the default redirect
    NotFound,
}

/// Resolve `path` against the rule table, then the asset store
pub fn resolve<'a>(path: &str, store: &'a AssetStore) -> Resolution<'a> {
    let mut current = path;

    for rule in PATH_RULES {
        if !rule.matches(current) {
            continue;
        }
        match rule.action {
            RuleAction::RedirectToDefault => return Resolution::RedirectToDefault,
            RuleAction::Health => return Resolution::Health,
            RuleAction::PermanentRedirect(url) => return Resolution::PermanentRedirect(url),
            RuleAction::Rewrite(target) => current = target,
        }
    }

    store
        .get(current)
        .map_or(Resolution::NotFound, Resolution::Asset)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assets::{ContentTree, TreeEntry};
    use chrono::Utc;
    use hyper::body::Bytes;
    use std::io;

    struct FlatTree(&'static [(&'static str, &'static [u8])]);

    impl ContentTree for FlatTree {
        fn label(&self) -> &str {
            "flat"
        }

        fn list(&self, _dir: &str) -> io::Result<Vec<TreeEntry>> {
            Ok(self
                .0
                .iter()
                .map(|(name, _)| TreeEntry {
                    name: (*name).to_string(),
                    is_dir: false,
                })
                .collect())
        }

        fn read(&self, file: &str) -> io::Result<Bytes> {
            self.0
                .iter()
                .find(|(name, _)| *name == file)
                .map(|(_, content)| Bytes::from_static(content))
                .ok_or_else(|| io::Error::from(io::ErrorKind::NotFound))
        }
    }

    fn store() -> AssetStore {
        let data = FlatTree(&[("versions.json", b"{\"v\":4}"), ("health.json", b"{}")]);
        let images = FlatTree(&[("logo.svg", b"<svg/>")]);
        AssetStore::build(&data, &images, Utc::now()).unwrap().0
    }

    #[test]
    fn test_special_paths() {
        let store = store();
        assert!(matches!(resolve("/", &store), Resolution::RedirectToDefault));
        assert!(matches!(resolve("/health", &store), Resolution::Health));
        // Exact match only
        assert!(matches!(resolve("/health/", &store), Resolution::NotFound));
        assert!(matches!(
            resolve("/health.json", &store),
            Resolution::Asset(_)
        ));
    }

    #[test]
    fn test_alias_rewrite() {
        let store = store();
        let Resolution::Asset(asset) = resolve("/coolify/versions.json", &store) else {
            panic!("Expected Asset");
        };
        assert_eq!(asset.path, "/versions.json");
    }

    #[test]
    fn test_alias_to_missing_asset() {
        let store = store();
        assert!(matches!(
            resolve("/coolify/upgrade.sh", &store),
            Resolution::NotFound
        ));
    }

    #[test]
    fn test_external_redirect() {
        let store = store();
        assert!(matches!(
            resolve("/coolify/install.sh", &store),
            Resolution::PermanentRedirect("https://cdn.coolify.io/install.sh")
        ));
    }

    #[test]
    fn test_store_lookup() {
        let store = store();
        assert!(matches!(resolve("/logo.svg", &store), Resolution::Asset(_)));
        assert!(matches!(
            resolve("/this-path-does-not-exist", &store),
            Resolution::NotFound
        ));
        assert!(matches!(resolve("", &store), Resolution::NotFound));
    }
}
