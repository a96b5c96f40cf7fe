//! Query paths.
//!
//! Callers pass one or more dotted sub-paths (`"a.b"`, `"c"`); they are
//! flattened into a single ordered segment list before matching.

use std::fmt;

/// Ordered list of path segments matched against node names.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct ConfigPath {
    segments: Vec<String>,
}

impl ConfigPath {
    /// Flattens dotted parts into segments: `["a.b", "c"]` -> `a`, `b`, `c`.
    pub fn new<I, S>(parts: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let segments = parts
            .into_iter()
            .flat_map(|part| {
                part.as_ref()
                    .split('.')
                    .map(str::to_string)
                    .collect::<Vec<_>>()
            })
            .collect();
        Self { segments }
    }

    /// Path with no segments; it resolves to the root itself.
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn segments(&self) -> &[String] {
        &self.segments
    }

    pub fn len(&self) -> usize {
        self.segments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }
}

impl fmt::Display for ConfigPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.segments.join("."))
    }
}

impl From<&str> for ConfigPath {
    fn from(path: &str) -> Self {
        Self::new([path])
    }
}

impl From<String> for ConfigPath {
    fn from(path: String) -> Self {
        Self::new([path])
    }
}

impl From<&[&str]> for ConfigPath {
    fn from(parts: &[&str]) -> Self {
        Self::new(parts)
    }
}

impl<const N: usize> From<[&str; N]> for ConfigPath {
    fn from(parts: [&str; N]) -> Self {
        Self::new(parts)
    }
}

impl From<Vec<String>> for ConfigPath {
    fn from(parts: Vec<String>) -> Self {
        Self::new(parts)
    }
}

impl From<&ConfigPath> for ConfigPath {
    fn from(path: &ConfigPath) -> Self {
        path.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn given_dotted_parts_when_flattening_then_keeps_order() {
        let path = ConfigPath::from(["ahoi", "bhoi.choi", "bla"]);
        assert_eq!(path.segments(), &["ahoi", "bhoi", "choi", "bla"]);
        assert_eq!(path.to_string(), "ahoi.bhoi.choi.bla");
    }

    #[test]
    fn given_no_parts_when_building_then_empty() {
        let path = ConfigPath::new(Vec::<String>::new());
        assert!(path.is_empty());
        assert_eq!(path, ConfigPath::empty());
    }

    #[test]
    fn given_trailing_dot_when_flattening_then_keeps_empty_segment() {
        let path = ConfigPath::from("a.");
        assert_eq!(path.segments(), &["a", ""]);
    }
}
