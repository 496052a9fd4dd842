//! Best-guess endpoint matching for top-level methods.
//!
//! Each original method is diffed against every candidate method and paired
//! with the one producing the fewest mismatches. This is O(n * m) full method
//! diffs per API type, which is fine for the tens of members a typical API
//! exposes. Ties go to the earliest candidate in declaration order.

use apilock_types::{MethodNode, Symbol};

use crate::differ::Differ;
use crate::mismatch::Mismatch;

/// The closest candidate for one original method.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BestMatch<'a> {
    /// Position of the winner in the candidate slice.
    pub index: usize,
    pub method: &'a MethodNode,
    /// Mismatches between the original and the winner.
    pub mismatches: Vec<Mismatch>,
}

impl BestMatch<'_> {
    /// Whether even the best candidate reports the original as removed,
    /// i.e. no candidate shares its name.
    pub fn reports_removal_of(&self, original: &MethodNode) -> bool {
        self.mismatches.iter().any(|m| m.is_removal_of(original))
    }

    pub fn is_exact(&self) -> bool {
        self.mismatches.is_empty()
    }
}

/// Find the candidate method structurally closest to `original`.
///
/// Returns `None` only when `candidates` is empty.
pub fn best_match<'a>(
    original: &MethodNode,
    candidates: &[&'a MethodNode],
) -> Option<BestMatch<'a>> {
    let mut best: Option<BestMatch<'a>> = None;
    for (index, &candidate) in candidates.iter().enumerate() {
        let mismatches = Differ::method_mismatches(original, candidate);
        let closer = match &best {
            Some(current) => mismatches.len() < current.mismatches.len(),
            None => true,
        };
        if closer {
            best = Some(BestMatch {
                index,
                method: candidate,
                mismatches,
            });
        }
    }

    if let Some(found) = &best {
        tracing::debug!(
            original = %original.path(),
            candidate = %found.method,
            distance = found.mismatches.len(),
            "matched endpoint"
        );
    }
    best
}

#[cfg(test)]
mod tests {
    use super::*;
    use apilock_types::TypeNode;

    fn int() -> TypeNode {
        TypeNode::structure("int")
    }

    #[test]
    fn empty_candidates_have_no_match() {
        let original = MethodNode::new("Run", int());
        assert!(best_match(&original, &[]).is_none());
    }

    #[test]
    fn picks_fewest_mismatches() {
        let original = MethodNode::new("Run", int()).with_param("a", int());
        let far = MethodNode::new("Stop", TypeNode::class("string"));
        let near = MethodNode::new("Run", int()).with_param("b", int());
        let best = best_match(&original, &[&far, &near]).unwrap();
        assert_eq!(best.index, 1);
        assert_eq!(best.mismatches.len(), 1);
        assert!(!best.reports_removal_of(&original));
    }

    #[test]
    fn ties_go_to_the_first_candidate() {
        let original = MethodNode::new("Run", int());
        let first = MethodNode::new("Start", int());
        let second = MethodNode::new("Begin", int());
        let best = best_match(&original, &[&first, &second]).unwrap();
        assert_eq!(best.method.name, "Start");
        assert!(best.reports_removal_of(&original));
    }

    #[test]
    fn exact_match_wins_over_earlier_overload() {
        let original = MethodNode::new("Run", int()).with_param("s", TypeNode::class("string"));
        let overload = MethodNode::new("Run", int()).with_param("s", int());
        let exact = MethodNode::new("Run", int()).with_param("s", TypeNode::class("string"));
        let best = best_match(&original, &[&overload, &exact]).unwrap();
        assert_eq!(best.index, 1);
        assert!(best.is_exact());
    }
}
