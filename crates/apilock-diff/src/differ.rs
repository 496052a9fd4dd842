//! Structural differ: walks two normalized trees in lock-step.
//!
//! Every type level is compared in a fixed order: identity (name, kind,
//! generic arguments), then nested elements, then attributes, then
//! modifiers. Each nested element is diffed depth-first before its next
//! sibling, so the first mismatch in the output is deterministic.
//!
//! Nested elements are aligned by `(kind, name)` occurrence: the n-th
//! original `Run` method pairs with the n-th candidate `Run` method. An
//! original element without a counterpart is reported as removed, and a
//! removal suppresses every other comparison and addition for elements of
//! the same kind at that level.

use std::collections::{BTreeSet, HashMap, VecDeque};
use std::fmt;

use apilock_types::{
    Element, ElementKind, MethodNode, Modifiers, PropertyNode, Symbol, TypeKind, TypeNode,
};

use crate::attributes::compare_attributes;
use crate::matcher::best_match;
use crate::mismatch::{Mismatch, Reason};

/// Accumulates mismatches for one comparison.
#[derive(Debug, Default)]
pub(crate) struct Differ {
    out: Vec<Mismatch>,
}

impl Differ {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn finish(self) -> Vec<Mismatch> {
        self.out
    }

    /// Mismatches between two methods compared in isolation.
    pub(crate) fn method_mismatches(
        original: &MethodNode,
        candidate: &MethodNode,
    ) -> Vec<Mismatch> {
        let mut differ = Self::new();
        differ.compare_method(original, candidate);
        differ.finish()
    }

    // -----------------------------------------------------------------------
    // Types
    // -----------------------------------------------------------------------

    /// Compare the top-level API type. Methods are paired by best-guess
    /// matching instead of by name.
    pub(crate) fn compare_api(&mut self, original: &TypeNode, candidate: &TypeNode) {
        self.compare_identity(original, candidate);

        let pairing = align(&original.nested, &candidate.nested);
        let mut blocked = BTreeSet::new();
        for (element, counterpart) in original.nested.iter().zip(&pairing) {
            if counterpart.is_none() && element.element_kind() != ElementKind::Method {
                self.out.push(Mismatch::removed(element));
                blocked.insert(element.element_kind());
            }
        }

        let candidate_methods: Vec<(usize, &MethodNode)> = candidate
            .nested
            .iter()
            .enumerate()
            .filter_map(|(i, e)| e.as_method().map(|m| (i, m)))
            .collect();
        let methods: Vec<&MethodNode> = candidate_methods.iter().map(|(_, m)| *m).collect();

        let mut renamed = BTreeSet::new();
        for (element, counterpart) in original.nested.iter().zip(&pairing) {
            match element {
                Element::Property(_) => {
                    if blocked.contains(&ElementKind::Property) {
                        continue;
                    }
                    if let Some(j) = counterpart {
                        self.compare_element(element, &candidate.nested[*j]);
                    }
                }
                Element::Method(method) => match best_match(method, &methods) {
                    None => self
                        .out
                        .push(Mismatch::removed(method).with_detail("no candidate methods")),
                    Some(best) if best.reports_removal_of(method) => {
                        self.out.push(
                            Mismatch::between(Reason::ElementRemoved, method, best.method)
                                .with_detail(format!("closest candidate: {}", best.method)),
                        );
                        renamed.insert(candidate_methods[best.index].0);
                    }
                    Some(best) => self.out.extend(best.mismatches),
                },
            }
        }

        let mut claimed: BTreeSet<usize> = pairing.iter().flatten().copied().collect();
        claimed.extend(renamed);
        self.report_additions(original.kind, &candidate.nested, &claimed, &blocked);

        compare_attributes(&original.attributes, &candidate.attributes, &mut self.out);
        self.compare_modifiers(original, &original.modifiers, candidate, &candidate.modifiers);
    }

    /// Compare two types with the full recursive algorithm.
    pub(crate) fn compare_type(&mut self, original: &TypeNode, candidate: &TypeNode) {
        self.compare_identity(original, candidate);
        self.compare_members(original, candidate);
        compare_attributes(&original.attributes, &candidate.attributes, &mut self.out);
        self.compare_modifiers(original, &original.modifiers, candidate, &candidate.modifiers);
    }

    fn compare_identity(&mut self, original: &TypeNode, candidate: &TypeNode) {
        if original.name != candidate.name {
            self.out.push(
                Mismatch::between(Reason::TypeNameChanged, original, candidate)
                    .with_detail(format!("{} -> {}", original.name, candidate.name)),
            );
        }
        if original.kind != candidate.kind {
            self.out.push(
                Mismatch::between(Reason::TypeKindChanged, original, candidate)
                    .with_detail(format!("{} -> {}", original.kind, candidate.kind)),
            );
        }
        self.compare_generics(original, candidate);
    }

    fn compare_generics(&mut self, original: &TypeNode, candidate: &TypeNode) {
        let (before, after) = (&original.generic_arguments, &candidate.generic_arguments);
        if before.len() != after.len() {
            self.out.push(
                Mismatch::between(Reason::DefinitionChanged, original, candidate).with_detail(
                    format!(
                        "{} -> {}",
                        counted(before.len(), "generic argument"),
                        counted(after.len(), "generic argument")
                    ),
                ),
            );
            return;
        }
        for (o, c) in before.iter().zip(after) {
            self.compare_type(o, c);
        }
    }

    fn compare_members(&mut self, original: &TypeNode, candidate: &TypeNode) {
        let pairing = align(&original.nested, &candidate.nested);

        let mut blocked = BTreeSet::new();
        for (element, counterpart) in original.nested.iter().zip(&pairing) {
            if counterpart.is_none() {
                self.out.push(Mismatch::removed(element));
                blocked.insert(element.element_kind());
            }
        }

        for (element, counterpart) in original.nested.iter().zip(&pairing) {
            if blocked.contains(&element.element_kind()) {
                continue;
            }
            if let Some(j) = counterpart {
                self.compare_element(element, &candidate.nested[*j]);
            }
        }

        let claimed: BTreeSet<usize> = pairing.iter().flatten().copied().collect();
        self.report_additions(original.kind, &candidate.nested, &claimed, &blocked);
    }

    /// Candidate-only members are breaking only on a surface implementors
    /// must provide: any interface member, or an abstract member of an
    /// abstract class.
    fn report_additions(
        &mut self,
        container: TypeKind,
        candidate: &[Element],
        claimed: &BTreeSet<usize>,
        blocked: &BTreeSet<ElementKind>,
    ) {
        if !container.has_required_surface() {
            return;
        }
        for (i, element) in candidate.iter().enumerate() {
            if claimed.contains(&i) || blocked.contains(&element.element_kind()) {
                continue;
            }
            let required = match container {
                TypeKind::Interface => true,
                _ => element.modifiers().is_abstract(),
            };
            if required {
                self.out.push(
                    Mismatch::added(Reason::MemberAddedToInterface, element)
                        .with_detail(format!("{} added to {container}", element.element_kind())),
                );
            }
        }
    }

    // -----------------------------------------------------------------------
    // Members
    // -----------------------------------------------------------------------

    fn compare_element(&mut self, original: &Element, candidate: &Element) {
        match (original, candidate) {
            (Element::Method(o), Element::Method(c)) => self.compare_method(o, c),
            (Element::Property(o), Element::Property(c)) => self.compare_property(o, c),
            _ => self
                .out
                .push(Mismatch::between(Reason::ElementRemoved, original, candidate)),
        }
    }

    pub(crate) fn compare_method(&mut self, original: &MethodNode, candidate: &MethodNode) {
        if original.name != candidate.name {
            self.out.push(
                Mismatch::between(Reason::ElementRemoved, original, candidate)
                    .with_detail(format!("compared against {}", candidate.name)),
            );
        }
        self.compare_type(&original.return_type, &candidate.return_type);
        self.compare_parameters(original, candidate);
        compare_attributes(&original.attributes, &candidate.attributes, &mut self.out);
        self.compare_modifiers(original, &original.modifiers, candidate, &candidate.modifiers);
    }

    fn compare_property(&mut self, original: &PropertyNode, candidate: &PropertyNode) {
        if original.name != candidate.name {
            self.out.push(
                Mismatch::between(Reason::ElementRemoved, original, candidate)
                    .with_detail(format!("compared against {}", candidate.name)),
            );
        }
        self.compare_type(&original.property_type, &candidate.property_type);
        compare_attributes(&original.attributes, &candidate.attributes, &mut self.out);
        self.compare_modifiers(original, &original.modifiers, candidate, &candidate.modifiers);
    }

    fn compare_parameters(&mut self, original: &MethodNode, candidate: &MethodNode) {
        let (before, after) = (&original.parameters, &candidate.parameters);
        if before.len() != after.len() {
            self.out.push(
                Mismatch::between(Reason::DefinitionChanged, original, candidate).with_detail(
                    format!(
                        "{} -> {}",
                        counted(before.len(), "parameter"),
                        counted(after.len(), "parameter")
                    ),
                ),
            );
            return;
        }

        for (o, c) in before.iter().zip(after) {
            if o.ordinal != c.ordinal {
                self.out.push(
                    Mismatch::between(Reason::DefinitionChanged, o, c)
                        .with_detail(format!("ordinal {} -> {}", o.ordinal, c.ordinal)),
                );
            }
            self.compare_type(&o.param_type, &c.param_type);
            if o.name != c.name {
                self.out.push(
                    Mismatch::between(Reason::ParameterNameChanged, o, c)
                        .with_detail(format!("{} -> {}", o.name, c.name)),
                );
            }
        }
    }

    fn compare_modifiers<S>(
        &mut self,
        original: &S,
        before: &Modifiers,
        candidate: &S,
        after: &Modifiers,
    ) where
        S: Symbol + fmt::Display,
    {
        if before != after {
            self.out.push(
                Mismatch::between(Reason::ModifierChanged, original, candidate)
                    .with_detail(format!(
                        "{} -> {}",
                        keywords_or_none(before),
                        keywords_or_none(after)
                    )),
            );
        }
    }
}

/// Pair each original element with the candidate index holding the same
/// `(kind, name)` occurrence.
fn align(original: &[Element], candidate: &[Element]) -> Vec<Option<usize>> {
    let mut slots: HashMap<(ElementKind, &str), VecDeque<usize>> = HashMap::new();
    for (i, element) in candidate.iter().enumerate() {
        slots.entry(element.key()).or_default().push_back(i);
    }
    original
        .iter()
        .map(|element| slots.get_mut(&element.key()).and_then(VecDeque::pop_front))
        .collect()
}

fn counted(n: usize, noun: &str) -> String {
    if n == 1 {
        format!("1 {noun}")
    } else {
        format!("{n} {noun}s")
    }
}

fn keywords_or_none(modifiers: &Modifiers) -> String {
    if modifiers.is_empty() {
        "(none)".to_string()
    } else {
        modifiers.to_string()
    }
}
