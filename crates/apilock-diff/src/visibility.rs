//! Visibility normalization: reduce raw trees to their comparable surface.
//!
//! A member belongs to the surface when its effective accessibility is
//! public. Members outside the surface are dropped before diffing, so changes
//! to them can never produce a mismatch. The candidate side additionally
//! keeps members whose counterpart was on the original surface; that is what
//! makes `public -> internal` visible as a modifier change. Candidate members
//! that were declared but hidden in the original are dropped, so a member
//! that becomes public is never reported as an addition.

use std::collections::HashMap;

use apilock_types::{
    Accessibility, Element, ElementKind, MethodNode, Modifiers, PropertyNode, Symbol, TypeKind,
    TypeNode,
};

/// Effective accessibility of a member declared inside a `container` type.
///
/// Abstract members of abstract classes are public whatever keyword they
/// carry, since every implementor must provide them. Members without an
/// accessibility keyword are public inside interfaces and private elsewhere.
pub fn effective_accessibility(modifiers: &Modifiers, container: TypeKind) -> Accessibility {
    if container == TypeKind::AbstractClass && modifiers.is_abstract() {
        return Accessibility::Public;
    }
    match modifiers.accessibility() {
        Accessibility::Unspecified if container == TypeKind::Interface => Accessibility::Public,
        Accessibility::Unspecified => Accessibility::Private,
        declared => declared,
    }
}

/// Whether a member is part of its container's public contract.
pub fn is_surface_member(element: &Element, container: TypeKind) -> bool {
    effective_accessibility(element.modifiers(), container).is_public()
}

/// The public surface of a single tree.
///
/// Generic arguments and attributes are never filtered.
pub fn public_surface(tree: &TypeNode) -> TypeNode {
    filter_type(tree, None).linked()
}

/// Normalize an original/candidate pair for diffing.
///
/// The original is reduced to its public surface. Per `(kind, name)`, the
/// candidate keeps as many members as were on the original surface (demoted
/// ones included), drops public members standing in for members the original
/// declared but hid, and keeps any public members beyond that.
pub fn normalize_pair(original: &TypeNode, candidate: &TypeNode) -> (TypeNode, TypeNode) {
    let original_surface = filter_type(original, None);
    let candidate_surface = filter_type(candidate, Some(original));
    (original_surface.linked(), candidate_surface.linked())
}

/// Per-key counts of a raw reference type's members.
#[derive(Default)]
struct KeyCounts {
    surface: usize,
    hidden: usize,
}

fn filter_type(node: &TypeNode, reference: Option<&TypeNode>) -> TypeNode {
    let generic_arguments = node
        .generic_arguments
        .iter()
        .enumerate()
        .map(|(i, argument)| {
            filter_type(argument, reference.and_then(|r| r.generic_arguments.get(i)))
        })
        .collect();

    let mut counts: HashMap<(ElementKind, &str), KeyCounts> = HashMap::new();
    if let Some(reference) = reference {
        for element in &reference.nested {
            let entry = counts.entry(element.key()).or_default();
            if is_surface_member(element, reference.kind) {
                entry.surface += 1;
            } else {
                entry.hidden += 1;
            }
        }
    }

    // Non-public candidate members fill the surface slots left open by
    // public ones.
    let mut demoted: HashMap<(ElementKind, &str), usize> = counts
        .iter()
        .map(|(key, c)| (*key, c.surface))
        .collect();
    for element in node.nested.iter().filter(|e| is_surface_member(e, node.kind)) {
        if let Some(slots) = demoted.get_mut(&element.key()) {
            *slots = slots.saturating_sub(1);
        }
    }

    let mut public_seen: HashMap<(ElementKind, &str), usize> = HashMap::new();
    let nested = node
        .nested
        .iter()
        .filter(|element| {
            let key = element.key();
            if !is_surface_member(element, node.kind) {
                return match demoted.get_mut(&key) {
                    Some(slots) if *slots > 0 => {
                        *slots -= 1;
                        true
                    }
                    _ => false,
                };
            }
            let Some(c) = counts.get(&key) else {
                return true;
            };
            let seen = public_seen.entry(key).or_default();
            *seen += 1;
            // Occurrences past the surface count but within the hidden count
            // were declared in the reference already.
            *seen <= c.surface || *seen > c.surface + c.hidden
        })
        .map(|element| {
            let counterpart = reference.and_then(|r| counterpart_in(r, element));
            filter_element(element, counterpart)
        })
        .collect();

    TypeNode {
        name: node.name.clone(),
        kind: node.kind,
        modifiers: node.modifiers.clone(),
        nested,
        generic_arguments,
        attributes: node.attributes.clone(),
        parent: node.parent.clone(),
    }
}

/// The reference member with the same key, preferring one on its surface.
fn counterpart_in<'a>(reference: &'a TypeNode, element: &Element) -> Option<&'a Element> {
    let key = element.key();
    reference
        .nested
        .iter()
        .filter(|e| e.key() == key)
        .find(|e| is_surface_member(e, reference.kind))
        .or_else(|| reference.element(element.element_kind(), element.name()))
}

fn filter_element(element: &Element, counterpart: Option<&Element>) -> Element {
    match element {
        Element::Method(m) => {
            let reference = counterpart.and_then(Element::as_method);
            Element::Method(filter_method(m, reference))
        }
        Element::Property(p) => {
            let reference = counterpart.and_then(Element::as_property);
            Element::Property(PropertyNode {
                property_type: filter_type(&p.property_type, reference.map(|r| &r.property_type)),
                ..p.clone()
            })
        }
    }
}

fn filter_method(method: &MethodNode, reference: Option<&MethodNode>) -> MethodNode {
    let mut filtered = method.clone();
    filtered.return_type = filter_type(&method.return_type, reference.map(|r| &r.return_type));
    for (i, parameter) in filtered.parameters.iter_mut().enumerate() {
        let reference_type = reference
            .and_then(|r| r.parameters.get(i))
            .map(|p| &p.param_type);
        parameter.param_type = filter_type(&method.parameters[i].param_type, reference_type);
    }
    filtered
}
