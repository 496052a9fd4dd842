//! Declaration modifiers and the accessibility they imply.

use std::collections::BTreeSet;
use std::fmt;
use std::hash::{Hash, Hasher};

use serde::{Deserialize, Serialize};

/// Modifier keywords recognized by the normalizer.
pub mod keywords {
    pub const PUBLIC: &str = "public";
    pub const INTERNAL: &str = "internal";
    pub const PROTECTED: &str = "protected";
    pub const PRIVATE: &str = "private";
    pub const ABSTRACT: &str = "abstract";
    pub const SEALED: &str = "sealed";
    pub const STATIC: &str = "static";
    pub const VIRTUAL: &str = "virtual";
    pub const OVERRIDE: &str = "override";

    /// Keywords that express accessibility rather than behavior.
    pub const ACCESSIBILITY: &[&str] = &[PUBLIC, INTERNAL, PROTECTED, PRIVATE];
}

/// Declared accessibility, derived from a modifier set.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Accessibility {
    Public,
    ProtectedInternal,
    Protected,
    Internal,
    PrivateProtected,
    Private,
    /// No accessibility keyword was declared.
    Unspecified,
}

impl Accessibility {
    pub fn is_public(self) -> bool {
        matches!(self, Self::Public)
    }
}

impl fmt::Display for Accessibility {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Public => "public",
            Self::ProtectedInternal => "protected internal",
            Self::Protected => "protected",
            Self::Internal => "internal",
            Self::PrivateProtected => "private protected",
            Self::Private => "private",
            Self::Unspecified => "unspecified",
        };
        f.write_str(s)
    }
}

/// An insertion-ordered set of modifier keywords.
///
/// Order is kept for rendering (`public static`), but equality is set
/// equality: `[static, public]` equals `[public, static]`.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Modifiers(Vec<String>);

impl Modifiers {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a keyword. Duplicates are ignored.
    pub fn insert(&mut self, keyword: impl Into<String>) -> bool {
        let keyword = keyword.into();
        if self.contains(&keyword) {
            return false;
        }
        self.0.push(keyword);
        true
    }

    /// Remove a keyword. Returns `true` if it was present.
    pub fn remove(&mut self, keyword: &str) -> bool {
        let before = self.0.len();
        self.0.retain(|k| k != keyword);
        self.0.len() != before
    }

    pub fn contains(&self, keyword: &str) -> bool {
        self.0.iter().any(|k| k == keyword)
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_abstract(&self) -> bool {
        self.contains(keywords::ABSTRACT)
    }

    pub fn is_static(&self) -> bool {
        self.contains(keywords::STATIC)
    }

    pub fn is_sealed(&self) -> bool {
        self.contains(keywords::SEALED)
    }

    /// The accessibility expressed by the keywords in this set.
    pub fn accessibility(&self) -> Accessibility {
        let public = self.contains(keywords::PUBLIC);
        let protected = self.contains(keywords::PROTECTED);
        let internal = self.contains(keywords::INTERNAL);
        let private = self.contains(keywords::PRIVATE);

        match (public, protected, internal, private) {
            (true, ..) => Accessibility::Public,
            (false, true, true, _) => Accessibility::ProtectedInternal,
            (false, true, false, true) => Accessibility::PrivateProtected,
            (false, true, false, false) => Accessibility::Protected,
            (false, false, true, _) => Accessibility::Internal,
            (false, false, false, true) => Accessibility::Private,
            (false, false, false, false) => Accessibility::Unspecified,
        }
    }

    /// Whether any accessibility keyword is declared.
    pub fn has_accessibility(&self) -> bool {
        keywords::ACCESSIBILITY.iter().any(|k| self.contains(k))
    }

    /// Keywords present here but absent from `other`, in declaration order.
    pub fn missing_from<'a>(&'a self, other: &Modifiers) -> Vec<&'a str> {
        self.iter().filter(|k| !other.contains(k)).collect()
    }

    fn as_set(&self) -> BTreeSet<&str> {
        self.iter().collect()
    }
}

impl PartialEq for Modifiers {
    fn eq(&self, other: &Self) -> bool {
        self.as_set() == other.as_set()
    }
}

impl Eq for Modifiers {}

impl Hash for Modifiers {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.as_set().hash(state);
    }
}

impl<S: Into<String>> FromIterator<S> for Modifiers {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        let mut set = Self::new();
        for keyword in iter {
            set.insert(keyword);
        }
        set
    }
}

impl fmt::Display for Modifiers {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0.join(" "))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn equality_ignores_order() {
        let a: Modifiers = ["public", "static"].into_iter().collect();
        let b: Modifiers = ["static", "public"].into_iter().collect();
        assert_eq!(a, b);
        assert_eq!(a.to_string(), "public static");
    }

    #[test]
    fn duplicates_are_ignored() {
        let mut m = Modifiers::new();
        assert!(m.insert("sealed"));
        assert!(!m.insert("sealed"));
        assert_eq!(m.len(), 1);
    }

    #[test]
    fn accessibility_combinations() {
        let parse = |ks: &[&str]| ks.iter().copied().collect::<Modifiers>().accessibility();
        assert_eq!(parse(&["public", "abstract"]), Accessibility::Public);
        assert_eq!(parse(&["protected", "internal"]), Accessibility::ProtectedInternal);
        assert_eq!(parse(&["private", "protected"]), Accessibility::PrivateProtected);
        assert_eq!(parse(&["protected"]), Accessibility::Protected);
        assert_eq!(parse(&["internal"]), Accessibility::Internal);
        assert_eq!(parse(&["private"]), Accessibility::Private);
        assert_eq!(parse(&["abstract"]), Accessibility::Unspecified);
    }

    #[test]
    fn missing_from_keeps_declaration_order() {
        let a: Modifiers = ["public", "sealed", "static"].into_iter().collect();
        let b: Modifiers = ["public"].into_iter().collect();
        assert_eq!(a.missing_from(&b), vec!["sealed", "static"]);
        assert!(b.missing_from(&a).is_empty());
    }
}
