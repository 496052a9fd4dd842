//! Symbol tree nodes.
//!
//! A [`TypeNode`] exclusively owns its members, generic arguments and
//! attributes; a [`MethodNode`] owns its return type and parameters. Trees are
//! built once per snapshot and treated as read-only afterwards. Parent links
//! are filled in by [`TypeNode::link`] and are used only for messages.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::modifiers::{keywords, Modifiers};
use crate::path::{ParentLink, SymbolKind, SymbolPath};

// ---------------------------------------------------------------------------
// Symbol
// ---------------------------------------------------------------------------

/// Capability shared by every node in a symbol tree.
pub trait Symbol {
    fn name(&self) -> &str;

    fn kind(&self) -> SymbolKind;

    /// Path of the owning node, if the tree has been linked.
    fn parent(&self) -> Option<&SymbolPath>;

    fn attributes(&self) -> &[AttributeNode];

    /// Fully qualified path of this node (`Parent.Path.Name`).
    fn path(&self) -> SymbolPath {
        match self.parent() {
            Some(parent) => parent.child(self.name()),
            None => SymbolPath::single(self.name()),
        }
    }
}

// ---------------------------------------------------------------------------
// TypeKind
// ---------------------------------------------------------------------------

/// Declaration kind of a type.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TypeKind {
    Class,
    AbstractClass,
    Interface,
    Struct,
    /// Not a declared type (e.g. `void`, or a type the provider did not classify).
    #[default]
    None,
}

impl TypeKind {
    /// Interfaces and abstract classes expose a surface implementors must fill.
    pub fn has_required_surface(self) -> bool {
        matches!(self, Self::Interface | Self::AbstractClass)
    }
}

impl fmt::Display for TypeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Class => "class",
            Self::AbstractClass => "abstract class",
            Self::Interface => "interface",
            Self::Struct => "struct",
            Self::None => "none",
        };
        f.write_str(s)
    }
}

// ---------------------------------------------------------------------------
// AttributeNode
// ---------------------------------------------------------------------------

/// An attribute applied to a type or member, with its named arguments
/// rendered as text.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AttributeNode {
    pub name: String,
    #[serde(default)]
    pub values: BTreeMap<String, String>,
    #[serde(skip)]
    pub parent: ParentLink,
}

impl AttributeNode {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            values: BTreeMap::new(),
            parent: ParentLink::none(),
        }
    }

    /// Add a named argument.
    pub fn with_value(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.values.insert(key.into(), value.into());
        self
    }
}

impl Symbol for AttributeNode {
    fn name(&self) -> &str {
        &self.name
    }

    fn kind(&self) -> SymbolKind {
        SymbolKind::Attribute
    }

    fn parent(&self) -> Option<&SymbolPath> {
        self.parent.path()
    }

    fn attributes(&self) -> &[AttributeNode] {
        &[]
    }
}

// ---------------------------------------------------------------------------
// TypeNode
// ---------------------------------------------------------------------------

/// A type: either the API type itself or a type referenced by one of its
/// members. Referenced types carry members only when the provider chose to
/// expand them (types defined alongside the API, not primitives or value types).
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TypeNode {
    pub name: String,
    #[serde(default)]
    pub kind: TypeKind,
    #[serde(default, skip_serializing_if = "Modifiers::is_empty")]
    pub modifiers: Modifiers,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub nested: Vec<Element>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub generic_arguments: Vec<TypeNode>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub attributes: Vec<AttributeNode>,
    #[serde(skip)]
    pub parent: ParentLink,
}

impl TypeNode {
    pub fn new(name: impl Into<String>, kind: TypeKind) -> Self {
        Self {
            name: name.into(),
            kind,
            modifiers: Modifiers::new(),
            nested: Vec::new(),
            generic_arguments: Vec::new(),
            attributes: Vec::new(),
            parent: ParentLink::none(),
        }
    }

    /// A type reference with no declaration kind (`void`, keyword aliases).
    pub fn named(name: impl Into<String>) -> Self {
        Self::new(name, TypeKind::None)
    }

    pub fn class(name: impl Into<String>) -> Self {
        Self::new(name, TypeKind::Class)
    }

    pub fn abstract_class(name: impl Into<String>) -> Self {
        Self::new(name, TypeKind::AbstractClass).with_modifier(keywords::ABSTRACT)
    }

    pub fn interface(name: impl Into<String>) -> Self {
        Self::new(name, TypeKind::Interface)
    }

    pub fn structure(name: impl Into<String>) -> Self {
        Self::new(name, TypeKind::Struct)
    }

    pub fn with_modifier(mut self, keyword: impl Into<String>) -> Self {
        self.modifiers.insert(keyword);
        self
    }

    pub fn public(self) -> Self {
        self.with_modifier(keywords::PUBLIC)
    }

    pub fn with_method(mut self, method: MethodNode) -> Self {
        self.nested.push(Element::Method(method));
        self
    }

    pub fn with_property(mut self, property: PropertyNode) -> Self {
        self.nested.push(Element::Property(property));
        self
    }

    pub fn with_generic(mut self, argument: TypeNode) -> Self {
        self.generic_arguments.push(argument);
        self
    }

    pub fn with_attribute(mut self, attribute: AttributeNode) -> Self {
        self.attributes.push(attribute);
        self
    }

    /// Consume and return the tree with parent links populated.
    pub fn linked(mut self) -> Self {
        self.link();
        self
    }

    /// Populate parent links for this node and every descendant, treating
    /// this node as the root.
    pub fn link(&mut self) {
        self.link_under(None);
    }

    fn link_under(&mut self, parent: Option<&SymbolPath>) {
        self.parent = parent.cloned().map(ParentLink::to).unwrap_or_default();
        let here = self.path();
        for element in &mut self.nested {
            element.link_under(&here);
        }
        for argument in &mut self.generic_arguments {
            argument.link_under(Some(&here));
        }
        link_attributes(&mut self.attributes, &here);
    }

    /// Methods among the nested elements, in declaration order.
    pub fn methods(&self) -> impl Iterator<Item = &MethodNode> {
        self.nested.iter().filter_map(Element::as_method)
    }

    /// Properties among the nested elements, in declaration order.
    pub fn properties(&self) -> impl Iterator<Item = &PropertyNode> {
        self.nested.iter().filter_map(Element::as_property)
    }

    /// Look up a nested element by kind and name.
    pub fn element(&self, kind: ElementKind, name: &str) -> Option<&Element> {
        self.nested
            .iter()
            .find(|e| e.element_kind() == kind && e.name() == name)
    }
}

impl Symbol for TypeNode {
    fn name(&self) -> &str {
        &self.name
    }

    fn kind(&self) -> SymbolKind {
        SymbolKind::Type
    }

    fn parent(&self) -> Option<&SymbolPath> {
        self.parent.path()
    }

    fn attributes(&self) -> &[AttributeNode] {
        &self.attributes
    }
}

fn link_attributes(attributes: &mut [AttributeNode], owner: &SymbolPath) {
    for attribute in attributes {
        attribute.parent = ParentLink::to(owner.clone());
    }
}

// ---------------------------------------------------------------------------
// ParameterNode
// ---------------------------------------------------------------------------

/// A method parameter. Position is part of the method signature.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ParameterNode {
    pub name: String,
    pub ordinal: usize,
    #[serde(rename = "type")]
    pub param_type: TypeNode,
    #[serde(skip)]
    pub parent: ParentLink,
}

impl ParameterNode {
    pub fn new(name: impl Into<String>, ordinal: usize, param_type: TypeNode) -> Self {
        Self {
            name: name.into(),
            ordinal,
            param_type,
            parent: ParentLink::none(),
        }
    }
}

impl Symbol for ParameterNode {
    fn name(&self) -> &str {
        &self.name
    }

    fn kind(&self) -> SymbolKind {
        SymbolKind::Parameter
    }

    fn parent(&self) -> Option<&SymbolPath> {
        self.parent.path()
    }

    fn attributes(&self) -> &[AttributeNode] {
        &[]
    }
}

// ---------------------------------------------------------------------------
// MethodNode
// ---------------------------------------------------------------------------

#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MethodNode {
    pub name: String,
    pub return_type: TypeNode,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub parameters: Vec<ParameterNode>,
    #[serde(default, skip_serializing_if = "Modifiers::is_empty")]
    pub modifiers: Modifiers,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub attributes: Vec<AttributeNode>,
    #[serde(skip)]
    pub parent: ParentLink,
}

impl MethodNode {
    pub fn new(name: impl Into<String>, return_type: TypeNode) -> Self {
        Self {
            name: name.into(),
            return_type,
            parameters: Vec::new(),
            modifiers: Modifiers::new(),
            attributes: Vec::new(),
            parent: ParentLink::none(),
        }
    }

    /// Append a parameter; its ordinal is its position.
    pub fn with_param(mut self, name: impl Into<String>, param_type: TypeNode) -> Self {
        let ordinal = self.parameters.len();
        self.parameters
            .push(ParameterNode::new(name, ordinal, param_type));
        self
    }

    pub fn with_modifier(mut self, keyword: impl Into<String>) -> Self {
        self.modifiers.insert(keyword);
        self
    }

    pub fn public(self) -> Self {
        self.with_modifier(keywords::PUBLIC)
    }

    pub fn with_attribute(mut self, attribute: AttributeNode) -> Self {
        self.attributes.push(attribute);
        self
    }

    fn link_under(&mut self, parent: &SymbolPath) {
        self.parent = ParentLink::to(parent.clone());
        let here = parent.child(self.name.clone());
        self.return_type.link_under(Some(&here));
        for parameter in &mut self.parameters {
            parameter.parent = ParentLink::to(here.clone());
            let param_path = here.child(parameter.name.clone());
            parameter.param_type.link_under(Some(&param_path));
        }
        link_attributes(&mut self.attributes, &here);
    }
}

impl Symbol for MethodNode {
    fn name(&self) -> &str {
        &self.name
    }

    fn kind(&self) -> SymbolKind {
        SymbolKind::Method
    }

    fn parent(&self) -> Option<&SymbolPath> {
        self.parent.path()
    }

    fn attributes(&self) -> &[AttributeNode] {
        &self.attributes
    }
}

// ---------------------------------------------------------------------------
// PropertyNode
// ---------------------------------------------------------------------------

#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PropertyNode {
    pub name: String,
    #[serde(rename = "type")]
    pub property_type: TypeNode,
    #[serde(default, skip_serializing_if = "Modifiers::is_empty")]
    pub modifiers: Modifiers,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub attributes: Vec<AttributeNode>,
    #[serde(skip)]
    pub parent: ParentLink,
}

impl PropertyNode {
    pub fn new(name: impl Into<String>, property_type: TypeNode) -> Self {
        Self {
            name: name.into(),
            property_type,
            modifiers: Modifiers::new(),
            attributes: Vec::new(),
            parent: ParentLink::none(),
        }
    }

    pub fn with_modifier(mut self, keyword: impl Into<String>) -> Self {
        self.modifiers.insert(keyword);
        self
    }

    pub fn public(self) -> Self {
        self.with_modifier(keywords::PUBLIC)
    }

    pub fn with_attribute(mut self, attribute: AttributeNode) -> Self {
        self.attributes.push(attribute);
        self
    }

    fn link_under(&mut self, parent: &SymbolPath) {
        self.parent = ParentLink::to(parent.clone());
        let here = parent.child(self.name.clone());
        self.property_type.link_under(Some(&here));
        link_attributes(&mut self.attributes, &here);
    }
}

impl Symbol for PropertyNode {
    fn name(&self) -> &str {
        &self.name
    }

    fn kind(&self) -> SymbolKind {
        SymbolKind::Property
    }

    fn parent(&self) -> Option<&SymbolPath> {
        self.parent.path()
    }

    fn attributes(&self) -> &[AttributeNode] {
        &self.attributes
    }
}

// ---------------------------------------------------------------------------
// Element
// ---------------------------------------------------------------------------

/// Kind tag of a nested element. Identity for diffing is `(ElementKind, name)`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ElementKind {
    Property,
    Method,
}

impl fmt::Display for ElementKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Property => f.write_str("property"),
            Self::Method => f.write_str("method"),
        }
    }
}

/// A member owned by a type.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "element", rename_all = "snake_case")]
pub enum Element {
    Method(MethodNode),
    Property(PropertyNode),
}

impl Element {
    pub fn element_kind(&self) -> ElementKind {
        match self {
            Self::Method(_) => ElementKind::Method,
            Self::Property(_) => ElementKind::Property,
        }
    }

    pub fn modifiers(&self) -> &Modifiers {
        match self {
            Self::Method(m) => &m.modifiers,
            Self::Property(p) => &p.modifiers,
        }
    }

    pub fn as_method(&self) -> Option<&MethodNode> {
        match self {
            Self::Method(m) => Some(m),
            Self::Property(_) => None,
        }
    }

    pub fn as_property(&self) -> Option<&PropertyNode> {
        match self {
            Self::Property(p) => Some(p),
            Self::Method(_) => None,
        }
    }

    /// `(kind, name)` identity key.
    pub fn key(&self) -> (ElementKind, &str) {
        (self.element_kind(), self.name())
    }

    fn link_under(&mut self, parent: &SymbolPath) {
        match self {
            Self::Method(m) => m.link_under(parent),
            Self::Property(p) => p.link_under(parent),
        }
    }
}

impl Symbol for Element {
    fn name(&self) -> &str {
        match self {
            Self::Method(m) => &m.name,
            Self::Property(p) => &p.name,
        }
    }

    fn kind(&self) -> SymbolKind {
        match self {
            Self::Method(_) => SymbolKind::Method,
            Self::Property(_) => SymbolKind::Property,
        }
    }

    fn parent(&self) -> Option<&SymbolPath> {
        match self {
            Self::Method(m) => m.parent.path(),
            Self::Property(p) => p.parent.path(),
        }
    }

    fn attributes(&self) -> &[AttributeNode] {
        match self {
            Self::Method(m) => &m.attributes,
            Self::Property(p) => &p.attributes,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_api() -> TypeNode {
        TypeNode::class("MyApi")
            .public()
            .with_method(
                MethodNode::new("FirstMethod", TypeNode::structure("int"))
                    .public()
                    .with_param("o", TypeNode::class("Opts"))
                    .with_attribute(AttributeNode::new("Obsolete")),
            )
            .with_property(PropertyNode::new("Count", TypeNode::structure("int")).public())
            .linked()
    }

    #[test]
    fn link_populates_paths() {
        let api = sample_api();
        assert!(api.parent().is_none());
        assert_eq!(api.path().to_string(), "MyApi");

        let method = api.methods().next().unwrap();
        assert_eq!(method.path().to_string(), "MyApi.FirstMethod");
        assert_eq!(
            method.return_type.path().to_string(),
            "MyApi.FirstMethod.int"
        );

        let param = &method.parameters[0];
        assert_eq!(param.path().to_string(), "MyApi.FirstMethod.o");
        assert_eq!(param.param_type.path().to_string(), "MyApi.FirstMethod.o.Opts");
        assert_eq!(
            method.attributes[0].parent().map(ToString::to_string),
            Some("MyApi.FirstMethod".to_string())
        );
    }

    #[test]
    fn ordinals_follow_declaration_order() {
        let m = MethodNode::new("Run", TypeNode::named("void"))
            .with_param("a", TypeNode::structure("int"))
            .with_param("b", TypeNode::class("string"));
        assert_eq!(m.parameters[0].ordinal, 0);
        assert_eq!(m.parameters[1].ordinal, 1);
    }

    #[test]
    fn element_lookup_is_by_kind_and_name() {
        let api = TypeNode::class("Api")
            .with_property(PropertyNode::new("Value", TypeNode::structure("int")))
            .with_method(MethodNode::new("Value", TypeNode::structure("int")));
        assert!(api.element(ElementKind::Property, "Value").is_some());
        assert!(api.element(ElementKind::Method, "Value").is_some());
        assert!(api.element(ElementKind::Method, "Other").is_none());
    }

    #[test]
    fn json_round_trip_preserves_tree() {
        let api = sample_api();
        let json = serde_json::to_string(&api).unwrap();
        let mut back: TypeNode = serde_json::from_str(&json).unwrap();
        assert_eq!(back, api);

        // Parent links are not serialized; relinking restores them.
        assert!(!back.methods().next().unwrap().parent.is_set());
        back.link();
        assert_eq!(
            back.methods().next().unwrap().path().to_string(),
            "MyApi.FirstMethod"
        );
    }

    #[test]
    fn abstract_class_builder_adds_modifier() {
        let t = TypeNode::abstract_class("Base");
        assert_eq!(t.kind, TypeKind::AbstractClass);
        assert!(t.modifiers.is_abstract());
        assert!(TypeKind::AbstractClass.has_required_surface());
        assert!(!TypeKind::Class.has_required_surface());
    }
}
