//! Configuration file handle: load, store and typed path queries.

use std::any::type_name;
use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};

use generational_arena::Index;
use termtree::Tree;
use tracing::{debug, instrument, warn};

use crate::application::parser::{parse_reader, parse_str};
use crate::application::serializer::serialize;
use crate::application::{ApplicationResult, IoResultExt};
use crate::domain::{
    leaf_text, ConfigPath, ConfigTree, ConfigValue, DomainError, NodeKind, TreeNodeConvert,
};

/// Shown in diagnostics for configurations that were never tied to a file.
const UNNAMED: &str = "<unnamed>";

/// A parsed configuration file.
///
/// Paths are anything convertible into [`ConfigPath`]: `"a.b.c"`,
/// `["a", "b.c"]`, or a `Vec<String>` of dotted parts.
#[derive(Debug, Clone, Default)]
pub struct Configuration {
    filename: Option<PathBuf>,
    tree: ConfigTree,
}

impl Configuration {
    /// Empty configuration without a backing file.
    pub fn new() -> Self {
        Self::default()
    }

    /// Reads and parses `path`.
    pub fn open(path: impl AsRef<Path>) -> ApplicationResult<Self> {
        let mut config = Self::new();
        config.load(path)?;
        Ok(config)
    }

    /// Parses in-memory `content`; `filename` is used for diagnostics and `store()`.
    pub fn from_content(filename: impl AsRef<Path>, content: &str) -> ApplicationResult<Self> {
        let mut config = Self::new();
        config.load_str(filename, content)?;
        Ok(config)
    }

    /// Replaces the tree with the contents of `path`.
    ///
    /// On failure the previous tree is kept.
    #[instrument(level = "debug", skip(self, path), fields(path = %path.as_ref().display()))]
    pub fn load(&mut self, path: impl AsRef<Path>) -> ApplicationResult<()> {
        let path = path.as_ref();
        let file = File::open(path).with_path_context("open", path)?;
        let tree = parse_reader(&path.display().to_string(), BufReader::new(file))?;
        self.replace(path, tree);
        Ok(())
    }

    /// Replaces the tree with parsed `content`.
    pub fn load_str(&mut self, filename: impl AsRef<Path>, content: &str) -> ApplicationResult<()> {
        let filename = filename.as_ref();
        let tree = parse_str(&filename.display().to_string(), content)?;
        self.replace(filename, tree);
        Ok(())
    }

    fn replace(&mut self, filename: &Path, tree: ConfigTree) {
        debug!("loaded {} nodes from {}", tree.len(), filename.display());
        self.filename = Some(filename.to_path_buf());
        self.tree = tree;
    }

    /// Writes the serialized tree back to the file it was loaded from.
    pub fn store(&self) -> ApplicationResult<()> {
        match &self.filename {
            Some(path) => self.store_to(path),
            None => {
                warn!("store: configuration has no filename, nothing written");
                Ok(())
            }
        }
    }

    #[instrument(level = "debug", skip(self, path), fields(path = %path.as_ref().display()))]
    pub fn store_to(&self, path: impl AsRef<Path>) -> ApplicationResult<()> {
        let path = path.as_ref();
        std::fs::write(path, self.serialize()).with_path_context("store", path)
    }

    pub fn serialize(&self) -> String {
        serialize(&self.tree)
    }

    pub fn filename(&self) -> Option<&Path> {
        self.filename.as_deref()
    }

    pub fn tree(&self) -> &ConfigTree {
        &self.tree
    }

    /// Tree rendering for terminals.
    pub fn to_tree(&self) -> Tree<String> {
        self.tree.to_tree_string()
    }

    // ------------------------------------------------------------------
    // typed values
    // ------------------------------------------------------------------

    /// First leaf at `path`, converted to `T`.
    pub fn get<T: ConfigValue>(&self, path: impl Into<ConfigPath>) -> ApplicationResult<T> {
        let path = path.into();
        let leaves = self.leaves(&path);
        let first = *leaves.first().ok_or_else(|| self.not_found(&path))?;
        self.convert(&path, first)
    }

    /// Every leaf at `path`, converted to `T`, in tree order.
    pub fn get_all<T: ConfigValue>(&self, path: impl Into<ConfigPath>) -> ApplicationResult<Vec<T>> {
        let path = path.into();
        let leaves = self.leaves(&path);
        if leaves.is_empty() {
            return Err(self.not_found(&path).into());
        }
        leaves.into_iter().map(|idx| self.convert(&path, idx)).collect()
    }

    /// Like [`get`](Self::get), but returns `default` when nothing matches.
    ///
    /// Conversion errors are still reported.
    pub fn try_get<T: ConfigValue>(
        &self,
        default: T,
        path: impl Into<ConfigPath>,
    ) -> ApplicationResult<T> {
        let path = path.into();
        match self.leaves(&path).first() {
            Some(&idx) => self.convert(&path, idx),
            None => Ok(default),
        }
    }

    /// Like [`get_all`](Self::get_all), but returns `[default]` when nothing matches.
    pub fn try_get_all<T: ConfigValue>(
        &self,
        default: T,
        path: impl Into<ConfigPath>,
    ) -> ApplicationResult<Vec<T>> {
        let path = path.into();
        let leaves = self.leaves(&path);
        if leaves.is_empty() {
            return Ok(vec![default]);
        }
        leaves.into_iter().map(|idx| self.convert(&path, idx)).collect()
    }

    /// Overwrites every leaf at `path`. Never creates nodes.
    ///
    /// The value is stored as [`leaf_text`] makes it, so a later
    /// `store` and reload yields the same tree. Returns the number of
    /// leaves updated.
    #[instrument(level = "debug", skip(self, value, path))]
    pub fn set<T: ConfigValue>(&mut self, value: T, path: impl Into<ConfigPath>) -> usize {
        let path = path.into();
        let given = value.to_config_string();
        let raw = leaf_text(&given);
        if raw != given {
            debug!("set: normalized {:?} to {:?}", given, raw);
        }
        let updated = self
            .tree
            .collect(&path)
            .into_iter()
            .filter(|&idx| self.tree.set_value(idx, raw.clone()))
            .count();
        debug!("set {} leaves at '{}'", updated, path);
        updated
    }

    // ------------------------------------------------------------------
    // structure
    // ------------------------------------------------------------------

    /// Names of the sections directly under `path`.
    pub fn sections(&self, path: impl Into<ConfigPath>) -> ApplicationResult<Vec<String>> {
        self.child_names(&path.into(), NodeKind::Section)
    }

    /// Names of the leaves directly under `path`.
    pub fn names(&self, path: impl Into<ConfigPath>) -> ApplicationResult<Vec<String>> {
        self.child_names(&path.into(), NodeKind::Leaf)
    }

    /// Like [`sections`](Self::sections), but returns `[default]` when nothing matches.
    pub fn try_sections(&self, default: &str, path: impl Into<ConfigPath>) -> Vec<String> {
        self.child_names(&path.into(), NodeKind::Section)
            .unwrap_or_else(|_| vec![default.to_string()])
    }

    /// Like [`names`](Self::names), but returns `[default]` when nothing matches.
    pub fn try_names(&self, default: &str, path: impl Into<ConfigPath>) -> Vec<String> {
        self.child_names(&path.into(), NodeKind::Leaf)
            .unwrap_or_else(|_| vec![default.to_string()])
    }

    /// Detached copy of the first section at `path`.
    ///
    /// Queries on the copy are relative to that section. Its filename is
    /// `<file>-<path>`, so `store()` never overwrites this file.
    #[instrument(level = "debug", skip(self, path))]
    pub fn instance(&self, path: impl Into<ConfigPath>) -> ApplicationResult<Configuration> {
        let path = path.into();
        let section = self
            .tree
            .collect(&path)
            .into_iter()
            .find_map(|idx| self.tree.as_section(idx))
            .ok_or_else(|| self.not_found(&path))?;
        let tree = self.tree.subtree(section);
        debug!("instance at '{}' with {} nodes", path, tree.len());
        Ok(Configuration {
            filename: self
                .filename
                .as_ref()
                .map(|f| PathBuf::from(format!("{}-{}", f.display(), path))),
            tree,
        })
    }

    /// Source line of the first node at `path` (`None` for the root).
    pub fn line_of(&self, path: impl Into<ConfigPath>) -> ApplicationResult<Option<usize>> {
        let path = path.into();
        self.tree
            .collect(&path)
            .first()
            .and_then(|&idx| self.tree.get(idx))
            .map(|node| node.line())
            .ok_or_else(|| self.not_found(&path).into())
    }

    // ------------------------------------------------------------------
    // helpers
    // ------------------------------------------------------------------

    fn leaves(&self, path: &ConfigPath) -> Vec<Index> {
        self.tree
            .collect(path)
            .into_iter()
            .filter(|&idx| self.tree.get(idx).is_some_and(|n| n.is_leaf()))
            .collect()
    }

    /// Fails only when `collect_sections` yields nothing before filtering.
    fn child_names(&self, path: &ConfigPath, kind: NodeKind) -> ApplicationResult<Vec<String>> {
        let found = self.tree.collect_sections(path);
        if found.is_empty() {
            return Err(self.not_found(path).into());
        }
        Ok(found
            .into_iter()
            .filter_map(|idx| self.tree.get(idx))
            .filter(|node| node.kind() == kind)
            .map(|node| node.name().to_string())
            .collect())
    }

    fn convert<T: ConfigValue>(&self, path: &ConfigPath, idx: Index) -> ApplicationResult<T> {
        let raw = self
            .tree
            .get(idx)
            .and_then(|node| node.value())
            .ok_or_else(|| self.not_found(path))?;
        T::from_config_str(raw).map_err(|reason| {
            DomainError::Conversion {
                path: path.to_string(),
                value: raw.to_string(),
                target: type_name::<T>(),
                reason,
            }
            .into()
        })
    }

    fn not_found(&self, path: &ConfigPath) -> DomainError {
        DomainError::PathNotFound {
            path: path.to_string(),
            filename: self
                .filename
                .as_ref()
                .map(|p| p.display().to_string())
                .unwrap_or_else(|| UNNAMED.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::ApplicationError;

    const NESTED: &str = "\
[ahoi]
    [bhoi]
        [choi]
            bla = yes
        [!choi]
        [choi]
            bla = no
        [!choi]
    [!bhoi]
    [bhoi]
        [choi]
            bla = 1
        [!choi]
        [choi]
            bla = ok
        [!choi]
    [!bhoi]
[!ahoi]
";

    fn nested() -> Configuration {
        Configuration::from_content("nested.conf", NESTED).unwrap()
    }

    #[test]
    fn given_fan_out_path_when_getting_all_bools_then_returns_every_leaf() {
        let config = nested();
        let values: Vec<bool> = config.get_all(["ahoi", "bhoi.choi", "bla"]).unwrap();
        assert_eq!(values, vec![true, false, true, true]);
    }

    #[test]
    fn given_fan_out_path_when_getting_one_then_returns_first_match() {
        let config = nested();
        assert!(config.get::<bool>("ahoi.bhoi.choi.bla").unwrap());
        assert_eq!(config.get::<String>("ahoi.bhoi.choi.bla").unwrap(), "yes");
    }

    #[test]
    fn given_repeated_sections_when_listing_then_keeps_duplicates() {
        let config = nested();
        assert_eq!(config.sections(["ahoi", "bhoi"]).unwrap(), vec!["choi", "choi", "choi", "choi"]);
        assert_eq!(config.sections("ahoi").unwrap(), vec!["bhoi", "bhoi"]);
    }

    #[test]
    fn given_section_with_only_sections_when_listing_names_then_empty() {
        let config = nested();
        assert!(config.names(["ahoi", "bhoi"]).unwrap().is_empty());
        assert_eq!(
            config.names("ahoi.bhoi.choi").unwrap(),
            vec!["bla", "bla", "bla", "bla"]
        );
    }

    #[test]
    fn given_missing_path_when_getting_then_not_found() {
        let config = nested();
        let err = config.get::<String>(["bla", "blubb", "x", "y.z.h.j"]).unwrap_err();

        assert!(err.is_not_found());
        assert_eq!(
            err.to_string(),
            "path 'bla.blubb.x.y.z.h.j' not found in nested.conf"
        );
    }

    #[test]
    fn given_missing_path_when_using_defaults_then_returns_default() {
        let config = nested();
        assert_eq!(config.try_get(42u32, "missing.path").unwrap(), 42);
        assert_eq!(config.try_get_all(7i64, "missing").unwrap(), vec![7]);
        assert_eq!(config.try_names("default", "missing.path"), vec!["default"]);
        assert_eq!(config.try_sections("none", "missing"), vec!["none"]);
        assert!(config.names("missing.path").unwrap_err().is_not_found());
    }

    #[test]
    fn given_non_numeric_value_when_getting_number_then_conversion_error() {
        let config = nested();
        let err = config.try_get(0i32, "ahoi.bhoi.choi.bla").unwrap_err();

        assert!(matches!(
            err,
            ApplicationError::Domain(DomainError::Conversion { .. })
        ));
        assert!(!err.is_not_found());
    }

    #[test]
    fn given_path_to_section_when_getting_value_then_not_found() {
        let config = nested();
        assert!(config.get::<String>("ahoi.bhoi").unwrap_err().is_not_found());
    }

    #[test]
    fn given_many_matching_leaves_when_setting_then_updates_all_without_creating() {
        let mut config = nested();
        let before = config.tree().len();

        let updated = config.set(false, "ahoi.bhoi.choi.bla");

        assert_eq!(updated, 4);
        assert_eq!(config.tree().len(), before);
        assert_eq!(
            config.get_all::<bool>("ahoi.bhoi.choi.bla").unwrap(),
            vec![false; 4]
        );
    }

    #[test]
    fn given_missing_path_when_setting_then_noop() {
        let mut config = nested();
        let before = config.tree().len();

        assert_eq!(config.set(1, "nope.nothing"), 0);
        assert_eq!(config.set("x".to_string(), "ahoi.bhoi"), 0);
        assert_eq!(config.tree().len(), before);
    }

    #[test]
    fn given_section_path_when_taking_instance_then_queries_are_relative() {
        let config = nested();

        let instance = config.instance("ahoi.bhoi").unwrap();

        assert_eq!(
            instance.get_all::<String>("choi.bla").unwrap(),
            vec!["yes", "no"]
        );
        assert_eq!(instance.sections(ConfigPath::empty()).unwrap(), vec!["choi", "choi"]);
        assert_eq!(instance.filename(), Some(Path::new("nested.conf-ahoi.bhoi")));
        assert_eq!(instance.line_of("choi.bla").unwrap(), Some(4));
    }

    #[test]
    fn given_instance_when_setting_then_parent_unchanged() {
        let config = nested();
        let mut instance = config.instance("ahoi").unwrap();

        assert_eq!(instance.set(false, "bhoi.choi.bla"), 4);

        assert!(config.get::<bool>("ahoi.bhoi.choi.bla").unwrap());
    }

    #[test]
    fn given_leaf_or_missing_path_when_taking_instance_then_not_found() {
        let config = nested();

        assert!(config.instance("ahoi.bhoi.choi.bla").unwrap_err().is_not_found());
        assert!(config.instance("nope").unwrap_err().is_not_found());
    }

    #[test]
    fn given_value_with_line_break_when_setting_then_stored_on_one_line() {
        let mut config = nested();

        config.set("one\n[!choi]\nevil = 2".to_string(), "ahoi.bhoi.choi.bla");

        assert_eq!(
            config.get::<String>("ahoi.bhoi.choi.bla").unwrap(),
            "one [!choi] evil = 2"
        );
    }

    #[test]
    fn given_parsed_node_when_asking_line_then_returns_source_line() {
        let config = nested();
        assert_eq!(config.line_of("ahoi.bhoi.choi.bla").unwrap(), Some(4));
        assert_eq!(config.line_of(ConfigPath::empty()).unwrap(), None);
        assert!(config.line_of("zzz").is_err());
    }

    #[test]
    fn given_unnamed_configuration_when_not_found_then_message_says_unnamed() {
        let config = Configuration::new();
        let err = config.get::<String>("a").unwrap_err();
        assert_eq!(err.to_string(), "path 'a' not found in <unnamed>");
        assert!(config.store().is_ok());
    }

    #[test]
    fn given_failed_reload_when_parsing_then_keeps_previous_tree() {
        let mut config = nested();
        let result = config.load_str("broken.conf", "[x]\n");

        assert!(matches!(result, Err(ApplicationError::Parse(_))));
        assert_eq!(config.filename(), Some(Path::new("nested.conf")));
        assert!(config.get::<bool>("ahoi.bhoi.choi.bla").is_ok());
    }
}
