//! Symbol paths and non-owning parent links.
//!
//! Every node in a symbol tree records where it sits (`MyApi.FirstMethod.o`)
//! so that mismatch messages can name their context. The link is plain data:
//! it never owns the parent and never participates in equality or hashing.

use std::fmt;
use std::hash::{Hash, Hasher};

use serde::{Deserialize, Serialize};

/// The category of a symbol, used when rendering messages.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SymbolKind {
    Type,
    Method,
    Property,
    Parameter,
    Attribute,
}

impl fmt::Display for SymbolKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Type => "type",
            Self::Method => "method",
            Self::Property => "property",
            Self::Parameter => "parameter",
            Self::Attribute => "attribute",
        };
        f.write_str(s)
    }
}

/// A dotted path of symbol names from the API root down to a node.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SymbolPath(Vec<String>);

impl SymbolPath {
    /// The empty path.
    pub fn root() -> Self {
        Self::default()
    }

    /// A path with a single segment.
    pub fn single(name: impl Into<String>) -> Self {
        Self(vec![name.into()])
    }

    /// Extend this path by one segment.
    pub fn child(&self, name: impl Into<String>) -> Self {
        let mut segments = self.0.clone();
        segments.push(name.into());
        Self(segments)
    }

    /// The path segments, outermost first.
    pub fn segments(&self) -> &[String] {
        &self.0
    }

    /// The last segment, if any.
    pub fn last(&self) -> Option<&str> {
        self.0.last().map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }
}

impl fmt::Display for SymbolPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0.join("."))
    }
}

impl<S: Into<String>> FromIterator<S> for SymbolPath {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Self(iter.into_iter().map(Into::into).collect())
    }
}

/// Non-owning back-reference to a node's parent.
///
/// Holds the parent's [`SymbolPath`] rather than a pointer, so trees stay
/// acyclic and freely cloneable. Two links always compare equal and hash to
/// nothing: parent context is presentation data, not identity.
#[derive(Clone, Debug, Default)]
pub struct ParentLink(Option<SymbolPath>);

impl ParentLink {
    /// A link to no parent (the API root).
    pub fn none() -> Self {
        Self(None)
    }

    /// A link to the node at `path`.
    pub fn to(path: SymbolPath) -> Self {
        Self(Some(path))
    }

    /// The parent's path, if this node has a parent.
    pub fn path(&self) -> Option<&SymbolPath> {
        self.0.as_ref()
    }

    /// Whether the link has been populated.
    pub fn is_set(&self) -> bool {
        self.0.is_some()
    }
}

impl PartialEq for ParentLink {
    fn eq(&self, _other: &Self) -> bool {
        true
    }
}

impl Eq for ParentLink {}

impl Hash for ParentLink {
    fn hash<H: Hasher>(&self, _state: &mut H) {}
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn child_extends_path() {
        let path = SymbolPath::single("MyApi").child("FirstMethod").child("o");
        assert_eq!(path.to_string(), "MyApi.FirstMethod.o");
        assert_eq!(path.len(), 3);
        assert_eq!(path.last(), Some("o"));
    }

    #[test]
    fn root_renders_empty() {
        assert_eq!(SymbolPath::root().to_string(), "");
        assert!(SymbolPath::root().is_empty());
    }

    #[test]
    fn parent_links_never_affect_equality() {
        let a = ParentLink::to(SymbolPath::single("A"));
        let b = ParentLink::none();
        assert_eq!(a, b);
        assert!(a.is_set());
        assert!(!b.is_set());
    }

    #[test]
    fn path_serializes_as_array() {
        let path: SymbolPath = ["Api", "Run"].into_iter().collect();
        let json = serde_json::to_string(&path).unwrap();
        assert_eq!(json, r#"["Api","Run"]"#);
    }
}
