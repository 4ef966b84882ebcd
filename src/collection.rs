//! Ordered, ID-deduplicated package collections

use crate::package::{Package, PackageType};
use serde::{Serialize, Serializer};
use std::collections::{BTreeMap, HashMap};

/// An ordered sequence of packages with unique IDs
///
/// Insertion order is kept for display grouping. Equality compares the ID
/// sets only. Lookups by ID are constant time.
#[derive(Debug, Clone, Default)]
pub struct PackageCollection {
    items: Vec<Package>,
    /// ID -> position in `items`
    index: HashMap<String, usize>,
}

impl PackageCollection {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append every package whose ID is not yet present
    ///
    /// Existing entries keep their description and options. Returns the
    /// number of packages actually added.
    pub fn add_unique<I>(&mut self, packages: I) -> usize
    where
        I: IntoIterator<Item = Package>,
    {
        let mut added = 0;
        for pkg in packages {
            let id = pkg.id();
            if self.index.contains_key(&id) {
                continue;
            }
            self.index.insert(id, self.items.len());
            self.items.push(pkg);
            added += 1;
        }
        added
    }

    /// Combine with another authoritative source; first source wins on metadata
    pub fn merge_unique(&mut self, other: &PackageCollection) -> usize {
        self.add_unique(other.items.iter().cloned())
    }

    /// Group by type, keeping the original order inside each group
    pub fn by_type(&self) -> BTreeMap<PackageType, PackageCollection> {
        let mut groups: BTreeMap<PackageType, PackageCollection> = BTreeMap::new();
        for pkg in &self.items {
            groups
                .entry(pkg.package_type)
                .or_default()
                .add_unique([pkg.clone()]);
        }
        groups
    }

    /// Subsequence whose type is one of `types`
    pub fn filter(&self, types: &[PackageType]) -> PackageCollection {
        self.items
            .iter()
            .filter(|p| types.contains(&p.package_type))
            .cloned()
            .collect()
    }

    /// Keep only the packages matching `keep`
    pub fn retain<F>(&mut self, mut keep: F)
    where
        F: FnMut(&Package) -> bool,
    {
        let before = self.items.len();
        self.items.retain(|p| keep(p));
        if self.items.len() != before {
            self.reindex();
        }
    }

    fn reindex(&mut self) {
        self.index = self
            .items
            .iter()
            .enumerate()
            .map(|(pos, p)| (p.id(), pos))
            .collect();
    }

    /// Fill in missing descriptions, display names and options from `other`,
    /// matched by ID
    ///
    /// Used when re-dumping a manifest so hand-written comments and options
    /// (`link: false`, `args:`, tap clone URLs) survive. Values already set
    /// here win.
    pub fn annotate_from(&mut self, other: &PackageCollection) {
        for pkg in &mut self.items {
            let Some(known) = other.get(&pkg.id()) else {
                continue;
            };
            if pkg.description.is_empty() && !known.description.is_empty() {
                pkg.description = known.description.clone();
            }
            if pkg.full_name.is_none() {
                pkg.full_name = known.full_name.clone();
            }
            for (key, value) in &known.options {
                pkg.options
                    .entry(key.clone())
                    .or_insert_with(|| value.clone());
            }
        }
    }

    pub fn contains(&self, pkg: &Package) -> bool {
        self.index.contains_key(&pkg.id())
    }

    pub fn contains_id(&self, id: &str) -> bool {
        self.index.contains_key(id)
    }

    pub fn get(&self, id: &str) -> Option<&Package> {
        self.index.get(id).map(|&pos| &self.items[pos])
    }

    /// IDs in no particular order
    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.index.keys().map(String::as_str)
    }

    /// Same IDs, regardless of order or metadata
    pub fn set_eq(&self, other: &PackageCollection) -> bool {
        self.index.len() == other.index.len()
            && self.index.keys().all(|id| other.index.contains_key(id))
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Package> {
        self.items.iter()
    }

    pub fn as_slice(&self) -> &[Package] {
        &self.items
    }

    pub fn into_vec(self) -> Vec<Package> {
        self.items
    }
}

impl PartialEq for PackageCollection {
    fn eq(&self, other: &Self) -> bool {
        self.set_eq(other)
    }
}

impl Eq for PackageCollection {}

impl FromIterator<Package> for PackageCollection {
    fn from_iter<I: IntoIterator<Item = Package>>(iter: I) -> Self {
        let mut collection = PackageCollection::new();
        collection.add_unique(iter);
        collection
    }
}

impl Extend<Package> for PackageCollection {
    fn extend<I: IntoIterator<Item = Package>>(&mut self, iter: I) {
        self.add_unique(iter);
    }
}

impl IntoIterator for PackageCollection {
    type Item = Package;
    type IntoIter = std::vec::IntoIter<Package>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.into_iter()
    }
}

impl<'a> IntoIterator for &'a PackageCollection {
    type Item = &'a Package;
    type IntoIter = std::slice::Iter<'a, Package>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.iter()
    }
}

impl Serialize for PackageCollection {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        self.items.serialize(serializer)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pkg(t: PackageType, name: &str) -> Package {
        Package::new(t, name).unwrap()
    }

    #[test]
    fn test_add_unique_skips_duplicates() {
        let mut c = PackageCollection::new();
        let added = c.add_unique([
            pkg(PackageType::Brew, "git"),
            pkg(PackageType::Brew, "git"),
            pkg(PackageType::Cask, "git"),
        ]);
        assert_eq!(added, 2);
        assert_eq!(c.len(), 2);
    }

    #[test]
    fn test_add_unique_keeps_existing_metadata() {
        let mut c = PackageCollection::new();
        c.add_unique([pkg(PackageType::Brew, "fd").with_description("find")]);
        c.add_unique([pkg(PackageType::Brew, "fd").with_description("other")]);
        assert_eq!(c.get("brew:fd").unwrap().description, "find");
    }

    #[test]
    fn test_add_unique_idempotent() {
        let x = pkg(PackageType::Brew, "jq");
        let mut once = PackageCollection::new();
        once.add_unique([x.clone()]);

        let mut twice = once.clone();
        assert_eq!(twice.add_unique([x]), 0);
        assert!(twice.set_eq(&once));
        assert_eq!(twice.len(), once.len());
    }

    #[test]
    fn test_merge_unique_first_source_wins() {
        let mut a: PackageCollection = [pkg(PackageType::Brew, "git").with_description("vcs")]
            .into_iter()
            .collect();
        let b: PackageCollection = [
            pkg(PackageType::Brew, "git").with_description("ignored"),
            pkg(PackageType::Brew, "fzf"),
        ]
        .into_iter()
        .collect();

        assert_eq!(a.merge_unique(&b), 1);
        assert_eq!(a.merge_unique(&b), 0);
        assert_eq!(a.get("brew:git").unwrap().description, "vcs");
        let names: Vec<_> = a.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, ["git", "fzf"]);
    }

    #[test]
    fn test_by_type_preserves_order() {
        let c: PackageCollection = [
            pkg(PackageType::Cask, "wezterm"),
            pkg(PackageType::Brew, "zoxide"),
            pkg(PackageType::Cask, "arc"),
            pkg(PackageType::Brew, "bat"),
        ]
        .into_iter()
        .collect();

        let groups = c.by_type();
        let keys: Vec<_> = groups.keys().copied().collect();
        assert_eq!(keys, [PackageType::Brew, PackageType::Cask]);

        let casks: Vec<_> = groups[&PackageType::Cask]
            .iter()
            .map(|p| p.name.as_str())
            .collect();
        assert_eq!(casks, ["wezterm", "arc"]);
    }

    #[test]
    fn test_filter_and_retain() {
        let mut c: PackageCollection = [
            pkg(PackageType::Tap, "a/b"),
            pkg(PackageType::Brew, "git"),
            pkg(PackageType::Go, "example.com/tool"),
        ]
        .into_iter()
        .collect();

        let homebrew = c.filter(&[PackageType::Tap, PackageType::Brew]);
        assert_eq!(homebrew.len(), 2);

        c.retain(|p| p.package_type != PackageType::Go);
        assert!(!c.contains_id("go:example.com/tool"));
        assert_eq!(c.get("brew:git").unwrap().name, "git");
        // Removed IDs can be added again
        assert_eq!(c.add_unique([pkg(PackageType::Go, "example.com/tool")]), 1);
    }

    #[test]
    fn test_annotate_from_fills_only_missing() {
        let mut fresh: PackageCollection = [
            pkg(PackageType::Brew, "git"),
            pkg(PackageType::Brew, "jq").with_description("json"),
        ]
        .into_iter()
        .collect();
        let old: PackageCollection = [
            pkg(PackageType::Brew, "git").with_description("version control"),
            pkg(PackageType::Brew, "jq").with_description("stale"),
            pkg(PackageType::Brew, "gone").with_description("removed"),
        ]
        .into_iter()
        .collect();

        fresh.annotate_from(&old);
        assert_eq!(fresh.get("brew:git").unwrap().description, "version control");
        assert_eq!(fresh.get("brew:jq").unwrap().description, "json");
        assert!(!fresh.contains_id("brew:gone"));
    }

    #[test]
    fn test_annotate_from_restores_options() {
        let mut fresh: PackageCollection = [
            pkg(PackageType::Brew, "mpv"),
            pkg(PackageType::Tap, "me/private"),
            pkg(PackageType::Cask, "firefox").with_option("args", "[\"no-quarantine\"]"),
        ]
        .into_iter()
        .collect();
        let old: PackageCollection = [
            pkg(PackageType::Brew, "mpv").with_option("link", "false"),
            pkg(PackageType::Tap, "me/private").with_option("url", "git@example.com:me/private.git"),
            pkg(PackageType::Cask, "firefox")
                .with_option("args", "[\"stale\"]")
                .with_option("greedy", "true"),
        ]
        .into_iter()
        .collect();

        fresh.annotate_from(&old);
        assert_eq!(fresh.get("brew:mpv").unwrap().option("link"), Some("false"));
        assert_eq!(
            fresh.get("tap:me/private").unwrap().option("url"),
            Some("git@example.com:me/private.git")
        );
        let firefox = fresh.get("cask:firefox").unwrap();
        assert_eq!(firefox.option("args"), Some("[\"no-quarantine\"]"));
        assert_eq!(firefox.option("greedy"), Some("true"));
    }

    #[test]
    fn test_get_after_retain_from_front() {
        let mut c: PackageCollection = [
            pkg(PackageType::Brew, "a"),
            pkg(PackageType::Brew, "b"),
            pkg(PackageType::Brew, "c"),
        ]
        .into_iter()
        .collect();

        c.retain(|p| p.name != "a");
        assert_eq!(c.get("brew:b").unwrap().name, "b");
        assert_eq!(c.get("brew:c").unwrap().name, "c");
        assert!(c.get("brew:a").is_none());
        let mut ids: Vec<_> = c.ids().collect();
        ids.sort();
        assert_eq!(ids, ["brew:b", "brew:c"]);
    }

    #[test]
    fn test_equality_ignores_order() {
        let a: PackageCollection = [pkg(PackageType::Brew, "a"), pkg(PackageType::Brew, "b")]
            .into_iter()
            .collect();
        let b: PackageCollection = [pkg(PackageType::Brew, "b"), pkg(PackageType::Brew, "a")]
            .into_iter()
            .collect();
        assert_eq!(a, b);
    }
}
