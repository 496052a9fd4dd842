//! Attribute comparison.
//!
//! Attributes are compared as a multiset keyed by name: the n-th attribute
//! named `X` in the original pairs with the n-th one named `X` in the
//! candidate, so declaration order is irrelevant. Removal outranks addition,
//! and addition outranks value changes: only the highest-ranked kind of
//! difference is reported for one attribute list. Adding an attribute is
//! always breaking.

use apilock_types::AttributeNode;

use crate::mismatch::{Mismatch, Reason};

/// The attribute in `attributes` that pairs with the one at `index` in `side`.
fn counterpart<'a>(
    side: &[AttributeNode],
    index: usize,
    attributes: &'a [AttributeNode],
) -> Option<&'a AttributeNode> {
    let name = &side[index].name;
    let occurrence = side[..index].iter().filter(|a| &a.name == name).count();
    attributes
        .iter()
        .filter(|a| &a.name == name)
        .nth(occurrence)
}

/// Compare two attribute lists, appending mismatches to `out`.
pub(crate) fn compare_attributes(
    original: &[AttributeNode],
    candidate: &[AttributeNode],
    out: &mut Vec<Mismatch>,
) {
    let removed: Vec<&AttributeNode> = (0..original.len())
        .filter(|&i| counterpart(original, i, candidate).is_none())
        .map(|i| &original[i])
        .collect();
    if !removed.is_empty() {
        out.extend(removed.into_iter().map(Mismatch::removed));
        return;
    }

    let added: Vec<&AttributeNode> = (0..candidate.len())
        .filter(|&i| counterpart(candidate, i, original).is_none())
        .map(|i| &candidate[i])
        .collect();
    if !added.is_empty() {
        out.extend(
            added.into_iter().map(|a| {
                Mismatch::added(Reason::AttributeMismatch, a).with_detail("attribute added")
            }),
        );
        return;
    }

    for (i, expected) in original.iter().enumerate() {
        if let Some(received) = counterpart(original, i, candidate) {
            compare_values(expected, received, out);
        }
    }
}

fn compare_values(expected: &AttributeNode, received: &AttributeNode, out: &mut Vec<Mismatch>) {
    if expected.values.len() != received.values.len() {
        out.push(
            Mismatch::between(Reason::AttributeMismatch, expected, received).with_detail(format!(
                "{} named values -> {}",
                expected.values.len(),
                received.values.len()
            )),
        );
        return;
    }

    for (key, value) in &expected.values {
        match received.values.get(key) {
            None => out.push(
                Mismatch::between(Reason::AttributeMismatch, expected, received)
                    .with_detail(format!("{key} missing")),
            ),
            Some(other) if other != value => out.push(
                Mismatch::between(Reason::AttributeMismatch, expected, received)
                    .with_detail(format!("{key}: {value} -> {other}")),
            ),
            Some(_) => {}
        }
    }
}
