//! Symbol providers: the boundary where symbol trees are produced.
//!
//! The comparison engine never cares how a tree was obtained. Anything that
//! can produce a [`TypeNode`] for a named API type implements
//! [`SymbolProvider`]. [`StaticProvider`] serves trees that were declared up
//! front, for example from a JSON symbol manifest written by an external
//! extractor.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::error::{ProviderError, ProviderResult};
use crate::node::{Element, TypeNode};

/// Source of symbol trees for API types.
pub trait SymbolProvider: Send + Sync {
    /// Build the fully linked symbol tree for the named API type.
    fn build_tree(&self, type_name: &str) -> ProviderResult<TypeNode>;

    /// Names of every API type this provider can build, sorted.
    fn type_names(&self) -> Vec<String>;
}

// ---------------------------------------------------------------------------
// AliasTable
// ---------------------------------------------------------------------------

const CSHARP_ALIASES: &[(&str, &str)] = &[
    ("System.Boolean", "bool"),
    ("System.Byte", "byte"),
    ("System.SByte", "sbyte"),
    ("System.Char", "char"),
    ("System.Decimal", "decimal"),
    ("System.Double", "double"),
    ("System.Single", "float"),
    ("System.Int16", "short"),
    ("System.UInt16", "ushort"),
    ("System.Int32", "int"),
    ("System.UInt32", "uint"),
    ("System.Int64", "long"),
    ("System.UInt64", "ulong"),
    ("System.IntPtr", "nint"),
    ("System.UIntPtr", "nuint"),
    ("System.Object", "object"),
    ("System.String", "string"),
    ("System.Void", "void"),
];

/// Constant mapping from runtime type names to their keyword aliases.
#[derive(Clone, Copy, Debug)]
pub struct AliasTable {
    entries: &'static [(&'static str, &'static str)],
}

impl AliasTable {
    /// The built-in keyword aliases for primitive runtime types.
    pub const CSHARP: Self = Self {
        entries: CSHARP_ALIASES,
    };

    /// A table that maps nothing.
    pub const EMPTY: Self = Self { entries: &[] };

    /// Create a table over custom entries.
    pub const fn new(entries: &'static [(&'static str, &'static str)]) -> Self {
        Self { entries }
    }

    /// The alias for a runtime name, if one exists.
    pub fn resolve(&self, name: &str) -> Option<&'static str> {
        self.entries
            .iter()
            .find(|(runtime, _)| *runtime == name)
            .map(|(_, alias)| *alias)
    }

    /// Whether `name` is one of the keyword aliases.
    pub fn is_keyword(&self, name: &str) -> bool {
        self.entries.iter().any(|(_, alias)| *alias == name)
    }

    /// Rewrite every type name in the tree to its alias.
    pub fn apply(&self, node: &mut TypeNode) {
        if let Some(alias) = self.resolve(&node.name) {
            node.name = alias.to_string();
        }
        for argument in &mut node.generic_arguments {
            self.apply(argument);
        }
        for element in &mut node.nested {
            match element {
                Element::Method(m) => {
                    self.apply(&mut m.return_type);
                    for parameter in &mut m.parameters {
                        self.apply(&mut parameter.param_type);
                    }
                }
                Element::Property(p) => self.apply(&mut p.property_type),
            }
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Default for AliasTable {
    fn default() -> Self {
        Self::CSHARP
    }
}

// ---------------------------------------------------------------------------
// StaticProvider
// ---------------------------------------------------------------------------

/// On-disk shape of a symbol manifest: every API type an extractor found.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SymbolManifest {
    pub types: Vec<TypeNode>,
}

/// A provider over trees declared ahead of time.
#[derive(Clone, Debug, Default)]
pub struct StaticProvider {
    types: BTreeMap<String, TypeNode>,
    aliases: AliasTable,
}

impl StaticProvider {
    /// Create an empty provider using the given alias table.
    pub fn new(aliases: AliasTable) -> Self {
        Self {
            types: BTreeMap::new(),
            aliases,
        }
    }

    /// Create a provider serving every type in a manifest.
    pub fn from_manifest(manifest: SymbolManifest, aliases: AliasTable) -> Self {
        let mut provider = Self::new(aliases);
        for api in manifest.types {
            provider.declare(api);
        }
        provider
    }

    /// Parse a JSON symbol manifest.
    pub fn from_json(json: &str, aliases: AliasTable) -> ProviderResult<Self> {
        let manifest: SymbolManifest =
            serde_json::from_str(json).map_err(|e| ProviderError::Invalid(e.to_string()))?;
        Ok(Self::from_manifest(manifest, aliases))
    }

    /// Declare (or replace) an API type.
    pub fn declare(&mut self, api: TypeNode) {
        self.types.insert(api.name.clone(), api);
    }

    pub fn len(&self) -> usize {
        self.types.len()
    }

    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }
}

impl SymbolProvider for StaticProvider {
    fn build_tree(&self, type_name: &str) -> ProviderResult<TypeNode> {
        let declared = self
            .types
            .get(type_name)
            .ok_or_else(|| ProviderError::TypeNotFound(type_name.to_string()))?;

        if !declared.modifiers.accessibility().is_public() {
            return Err(ProviderError::NotPublic(type_name.to_string()));
        }

        let mut tree = declared.clone();
        self.aliases.apply(&mut tree);
        tree.link();
        tracing::debug!(api = %type_name, members = tree.nested.len(), "built symbol tree");
        Ok(tree)
    }

    fn type_names(&self) -> Vec<String> {
        self.types.keys().cloned().collect()
    }
}
