//! Mismatch taxonomy: one reported structural delta between two trees.

use std::fmt;

use apilock_types::{Symbol, SymbolKind, SymbolPath};
use serde::{Deserialize, Serialize};

/// Why two trees differ at some point.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Reason {
    /// A named element present before is absent now.
    ElementRemoved,
    /// A type's declared name differs.
    TypeNameChanged,
    /// A structural detail (parameter count or ordinal, generic arity) differs.
    DefinitionChanged,
    /// Only a parameter's label differs.
    ParameterNameChanged,
    /// An attribute was added or its values differ.
    AttributeMismatch,
    /// The modifier set of a public symbol differs.
    ModifierChanged,
    /// The declaration kind differs.
    TypeKindChanged,
    /// A member was added to a surface implementors must provide.
    MemberAddedToInterface,
}

impl fmt::Display for Reason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::ElementRemoved => "element removed",
            Self::TypeNameChanged => "type name changed",
            Self::DefinitionChanged => "definition changed",
            Self::ParameterNameChanged => "parameter name changed",
            Self::AttributeMismatch => "attribute mismatch",
            Self::ModifierChanged => "modifier changed",
            Self::TypeKindChanged => "type kind changed",
            Self::MemberAddedToInterface => "member added to interface",
        };
        f.write_str(s)
    }
}

/// Owned description of one side of a mismatch.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SymbolRef {
    pub kind: SymbolKind,
    pub name: String,
    /// Path of the owning symbol, when the tree was linked.
    pub context: Option<SymbolPath>,
    /// Rendered signature (`int FirstMethod(Opts o)`).
    pub display: String,
}

impl SymbolRef {
    /// Capture a symbol's identity and rendering.
    pub fn of<S: Symbol + fmt::Display>(symbol: &S) -> Self {
        Self {
            kind: symbol.kind(),
            name: symbol.name().to_string(),
            context: symbol.parent().cloned(),
            display: symbol.to_string(),
        }
    }

    /// Fully qualified path of the symbol.
    pub fn path(&self) -> SymbolPath {
        match &self.context {
            Some(context) => context.child(self.name.clone()),
            None => SymbolPath::single(self.name.clone()),
        }
    }

    /// Where the symbol lives: its owner's path, or its own name at the root.
    pub fn location(&self) -> String {
        match &self.context {
            Some(context) if !context.is_empty() => context.to_string(),
            _ => self.name.clone(),
        }
    }
}

/// One structural delta, tagged with its [`Reason`].
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Mismatch {
    pub reason: Reason,
    /// The original-side symbol, absent when the original has no counterpart.
    pub expected: Option<SymbolRef>,
    /// The candidate-side symbol, absent when the candidate has no counterpart.
    pub received: Option<SymbolRef>,
    /// Short description of what differs (`1 parameter -> 2 parameters`).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
}

impl Mismatch {
    pub fn new(reason: Reason, expected: Option<SymbolRef>, received: Option<SymbolRef>) -> Self {
        Self {
            reason,
            expected,
            received,
            detail: None,
        }
    }

    /// A mismatch between two counterpart symbols.
    pub fn between<A, B>(reason: Reason, expected: &A, received: &B) -> Self
    where
        A: Symbol + fmt::Display,
        B: Symbol + fmt::Display,
    {
        Self::new(
            reason,
            Some(SymbolRef::of(expected)),
            Some(SymbolRef::of(received)),
        )
    }

    /// `ElementRemoved` for an original symbol with no counterpart.
    pub fn removed<S: Symbol + fmt::Display>(expected: &S) -> Self {
        Self::new(Reason::ElementRemoved, Some(SymbolRef::of(expected)), None)
    }

    /// A candidate-only symbol (an addition).
    pub fn added<S: Symbol + fmt::Display>(reason: Reason, received: &S) -> Self {
        Self::new(reason, None, Some(SymbolRef::of(received)))
    }

    pub fn with_detail(mut self, detail: impl Into<String>) -> Self {
        self.detail = Some(detail.into());
        self
    }

    /// Whether this reports the removal of exactly `symbol`.
    pub fn is_removal_of<S: Symbol>(&self, symbol: &S) -> bool {
        self.reason == Reason::ElementRemoved
            && self.expected.as_ref().is_some_and(|e| {
                e.kind == symbol.kind()
                    && e.name == symbol.name()
                    && e.context.as_ref() == symbol.parent()
            })
    }
}

/// The ordered result of comparing two API types.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiDiff {
    /// Mismatches in traversal order.
    pub mismatches: Vec<Mismatch>,
}

impl ApiDiff {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns `true` if the trees are compatible.
    pub fn is_empty(&self) -> bool {
        self.mismatches.is_empty()
    }

    /// Number of mismatches.
    pub fn len(&self) -> usize {
        self.mismatches.len()
    }

    /// The first mismatch in traversal order.
    pub fn first(&self) -> Option<&Mismatch> {
        self.mismatches.first()
    }

    /// Number of mismatches with the given reason.
    pub fn count(&self, reason: Reason) -> usize {
        self.mismatches.iter().filter(|m| m.reason == reason).count()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Mismatch> {
        self.mismatches.iter()
    }
}

impl IntoIterator for ApiDiff {
    type Item = Mismatch;
    type IntoIter = std::vec::IntoIter<Mismatch>;

    fn into_iter(self) -> Self::IntoIter {
        self.mismatches.into_iter()
    }
}

impl<'a> IntoIterator for &'a ApiDiff {
    type Item = &'a Mismatch;
    type IntoIter = std::slice::Iter<'a, Mismatch>;

    fn into_iter(self) -> Self::IntoIter {
        self.mismatches.iter()
    }
}
