//! Human-readable rendering of symbol tree nodes.
//!
//! Single nodes render as signature fragments (`int FirstMethod(Opts o)`);
//! [`render_surface`] renders a whole API type as declaration text with one
//! member per line, suitable for line diffs.

use std::fmt;

use crate::modifiers::{keywords, Modifiers};
use crate::node::{
    AttributeNode, Element, MethodNode, ParameterNode, PropertyNode, Symbol, TypeKind, TypeNode,
};

impl fmt::Display for TypeNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)?;
        if !self.generic_arguments.is_empty() {
            f.write_str("<")?;
            for (i, argument) in self.generic_arguments.iter().enumerate() {
                if i > 0 {
                    f.write_str(", ")?;
                }
                write!(f, "{argument}")?;
            }
            f.write_str(">")?;
        }
        Ok(())
    }
}

impl fmt::Display for ParameterNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.param_type, self.name)
    }
}

impl fmt::Display for MethodNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}(", self.return_type, self.name)?;
        for (i, parameter) in self.parameters.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{parameter}")?;
        }
        f.write_str(")")
    }
}

impl fmt::Display for PropertyNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.property_type, self.name)
    }
}

impl fmt::Display for Element {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Method(m) => fmt::Display::fmt(m, f),
            Self::Property(p) => fmt::Display::fmt(p, f),
        }
    }
}

impl fmt::Display for AttributeNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}", self.name)?;
        if !self.values.is_empty() {
            f.write_str("(")?;
            for (i, (key, value)) in self.values.iter().enumerate() {
                if i > 0 {
                    f.write_str(", ")?;
                }
                write!(f, "{key}={value}")?;
            }
            f.write_str(")")?;
        }
        f.write_str("]")
    }
}

fn kind_keyword(kind: TypeKind) -> &'static str {
    match kind {
        TypeKind::Class | TypeKind::AbstractClass => "class",
        TypeKind::Interface => "interface",
        TypeKind::Struct => "struct",
        TypeKind::None => "type",
    }
}

fn with_modifiers(modifiers: &Modifiers, rest: &str) -> String {
    if modifiers.is_empty() {
        rest.to_string()
    } else {
        format!("{modifiers} {rest}")
    }
}

/// Render an API type as declaration text.
///
/// The output is deterministic for a given tree: attributes precede the
/// declaration they decorate, members appear in declaration order, and
/// expanded member types are not repeated inline.
pub fn render_surface(api: &TypeNode) -> String {
    let mut out = String::new();
    for attribute in &api.attributes {
        out.push_str(&format!("{attribute}\n"));
    }

    let mut header = with_modifiers(&api.modifiers, kind_keyword(api.kind));
    if api.kind == TypeKind::AbstractClass && !api.modifiers.contains(keywords::ABSTRACT) {
        header = format!("abstract {header}");
    }
    out.push_str(&format!("{header} {api}\n"));
    out.push_str("{\n");

    for element in &api.nested {
        for attribute in Symbol::attributes(element) {
            out.push_str(&format!("    {attribute}\n"));
        }
        let line = match element {
            Element::Method(m) => format!("{};", with_modifiers(&m.modifiers, &m.to_string())),
            Element::Property(p) => {
                format!("{} {{ get; }}", with_modifiers(&p.modifiers, &p.to_string()))
            }
        };
        out.push_str(&format!("    {line}\n"));
    }

    out.push_str("}\n");
    out
}
