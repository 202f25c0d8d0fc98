//! Partition changed files into scope groups.

use crate::git::ChangedFile;

use super::{ROOT_SCOPE, ScopeResolver};

/// Files sharing one scope, in discovery order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScopeGroup {
    pub key: String,
    pub files: Vec<ChangedFile>,
}

impl ScopeGroup {
    pub fn paths(&self) -> impl Iterator<Item = &str> {
        self.files.iter().map(|f| f.path.as_str())
    }
}

/// Ordered scope → files partition. Groups appear in first-discovery order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScopeGroups {
    groups: Vec<ScopeGroup>,
}

impl ScopeGroups {
    pub fn get(&self, key: &str) -> Option<&ScopeGroup> {
        self.groups.iter().find(|g| g.key == key)
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.groups.iter().map(|g| g.key.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = &ScopeGroup> {
        self.groups.iter()
    }

    pub fn len(&self) -> usize {
        self.groups.len()
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    pub fn total_files(&self) -> usize {
        self.groups.iter().map(|g| g.files.len()).sum()
    }

    fn push(&mut self, key: String, file: ChangedFile) {
        match self.groups.iter_mut().find(|g| g.key == key) {
            Some(group) => group.files.push(file),
            None => self.groups.push(ScopeGroup {
                key,
                files: vec![file],
            }),
        }
    }
}

impl<'a> IntoIterator for &'a ScopeGroups {
    type Item = &'a ScopeGroup;
    type IntoIter = std::slice::Iter<'a, ScopeGroup>;

    fn into_iter(self) -> Self::IntoIter {
        self.groups.iter()
    }
}

/// Group files by resolved scope. Unresolved paths land in [`ROOT_SCOPE`].
pub fn group_files<I>(files: I, resolver: &ScopeResolver) -> ScopeGroups
where
    I: IntoIterator<Item = ChangedFile>,
{
    let mut groups = ScopeGroups::default();
    for file in files {
        let key = resolver
            .resolve(&file.path)
            .unwrap_or_else(|| ROOT_SCOPE.to_string());
        groups.push(key, file);
    }
    groups
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use super::*;
    use crate::git::FileStatus;
    use crate::scope::ScopeConfig;

    fn files(paths: &[&str]) -> Vec<ChangedFile> {
        paths
            .iter()
            .map(|p| ChangedFile::new(*p, FileStatus::Modified))
            .collect()
    }

    fn monorepo() -> ScopeResolver {
        ScopeResolver::from_config(&ScopeConfig::monorepo()).unwrap()
    }

    #[test]
    fn test_group_monorepo_paths() {
        let input = files(&[
            "apps/billing/index.ts",
            "README.md",
            "packages/ui/button.tsx",
            "apps/billing/api.ts",
            "lib/util.ts",
        ]);

        let groups = group_files(input, &monorepo());

        let keys: Vec<&str> = groups.keys().collect();
        assert_eq!(keys, vec!["billing", ".", "ui"]);

        let billing: Vec<&str> = groups.get("billing").unwrap().paths().collect();
        assert_eq!(billing, vec!["apps/billing/index.ts", "apps/billing/api.ts"]);

        let root: Vec<&str> = groups.get(".").unwrap().paths().collect();
        assert_eq!(root, vec!["README.md", "lib/util.ts"]);
    }

    #[test]
    fn test_partition_is_total_and_disjoint() {
        let paths = [
            "apps/a/1.ts",
            "apps/b/2.ts",
            "packages/a/3.ts",
            "x.md",
            "functions/f/4.ts",
            "src/5.ts",
            "apps/a/6.ts",
        ];
        let groups = group_files(files(&paths), &monorepo());

        let mut seen = HashSet::new();
        for group in &groups {
            for path in group.paths() {
                assert!(seen.insert(path.to_string()), "duplicate path {path}");
            }
        }
        let expected: HashSet<String> = paths.iter().map(|p| p.to_string()).collect();
        assert_eq!(seen, expected);
        assert_eq!(groups.total_files(), paths.len());
    }

    #[test]
    fn test_grouping_is_deterministic() {
        let paths = ["src/a/x.rs", "src/b/y.rs", "Cargo.toml", "src/a/z.rs"];
        let resolver = ScopeResolver::from_config(&ScopeConfig::traditional("src")).unwrap();

        let first = group_files(files(&paths), &resolver);
        let second = group_files(files(&paths), &resolver);
        assert_eq!(first, second);
    }

    #[test]
    fn test_group_preserves_status() {
        let input = vec![
            ChangedFile::new("apps/a/new.ts", FileStatus::Untracked),
            ChangedFile::new("apps/a/old.ts", FileStatus::Deleted),
        ];
        let groups = group_files(input, &monorepo());
        let group = groups.get("a").unwrap();
        assert_eq!(group.files[0].status, FileStatus::Untracked);
        assert_eq!(group.files[1].status, FileStatus::Deleted);
    }

    #[test]
    fn test_group_empty_input() {
        let groups = group_files(Vec::new(), &monorepo());
        assert!(groups.is_empty());
        assert_eq!(groups.total_files(), 0);
    }
}
