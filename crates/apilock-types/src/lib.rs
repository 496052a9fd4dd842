//! Symbol tree data model for apilock.
//!
//! A symbol tree is the structural snapshot of one API type's public surface:
//! its members, their signatures, and the attributes that decorate them. Two
//! trees (a recorded original and a live candidate) are what the comparison
//! engine in `apilock-diff` consumes.
//!
//! # Key Types
//!
//! - [`TypeNode`]: A type, owning its members, generic arguments and attributes
//! - [`Element`]: Closed sum of member kinds: [`MethodNode`] or [`PropertyNode`]
//! - [`ParameterNode`] / [`AttributeNode`]: Signature and decoration leaves
//! - [`Symbol`]: Name/parent/attributes capability shared by every node
//! - [`SymbolPath`] / [`ParentLink`]: Non-owning parent context for messages
//! - [`Modifiers`] / [`Accessibility`]: Declared keywords and what they imply
//! - [`SymbolProvider`] / [`StaticProvider`] / [`AliasTable`]: Tree sources

pub mod error;
pub mod modifiers;
pub mod node;
pub mod path;
pub mod provider;
pub mod render;

pub use error::{ProviderError, ProviderResult};
pub use modifiers::{keywords, Accessibility, Modifiers};
pub use node::{
    AttributeNode, Element, ElementKind, MethodNode, ParameterNode, PropertyNode, Symbol,
    TypeKind, TypeNode,
};
pub use path::{ParentLink, SymbolKind, SymbolPath};
pub use provider::{AliasTable, StaticProvider, SymbolManifest, SymbolProvider};
pub use render::render_surface;
