//! Comparison engine for apilock.
//!
//! Compares two symbol trees of the same API type (a recorded original and a
//! live candidate) and reports breaking changes as data. The pipeline is:
//! visibility normalization, then a structural diff that pairs top-level
//! methods by best-guess matching, then either the full ordered mismatch list
//! or a single first-failure [`Verdict`].
//!
//! # Key Types
//!
//! - [`ApiDiff`] / [`Mismatch`] / [`Reason`] -- Exhaustive, ordered mismatch list
//! - [`Verdict`] -- First breaking change with a rendered message
//! - [`BestMatch`] -- Endpoint matcher result for one original method
//! - [`SurfaceDiff`] -- Line diff of the rendered public surfaces

mod attributes;
mod differ;
pub mod matcher;
pub mod mismatch;
pub mod report;
pub mod surface;
pub mod visibility;

use apilock_types::TypeNode;

pub use matcher::{best_match, BestMatch};
pub use mismatch::{ApiDiff, Mismatch, Reason, SymbolRef};
pub use report::{assert_compatible, render_message, Verdict};
pub use surface::{surface_diff, DiffHunk, DiffLine, SurfaceDiff};
pub use visibility::{effective_accessibility, is_surface_member, normalize_pair, public_surface};

/// Compare two snapshots of an API type and return every mismatch in
/// traversal order. Pure: the inputs are never modified.
pub fn diff(original: &TypeNode, candidate: &TypeNode) -> ApiDiff {
    let (original, candidate) = normalize_pair(original, candidate);
    let mut differ = differ::Differ::new();
    differ.compare_api(&original, &candidate);
    let mismatches = differ.finish();
    tracing::debug!(
        api = %original.name,
        mismatches = mismatches.len(),
        "compared api snapshots"
    );
    ApiDiff { mismatches }
}

#[cfg(test)]
mod tests {
    use super::*;
    use apilock_types::{AttributeNode, MethodNode, PropertyNode};
    use proptest::prelude::*;

    fn int() -> TypeNode {
        TypeNode::structure("int")
    }

    fn string() -> TypeNode {
        TypeNode::class("string")
    }

    fn reasons(diff: &ApiDiff) -> Vec<Reason> {
        diff.iter().map(|m| m.reason).collect()
    }

    // ---- 1. Idempotence ----

    #[test]
    fn identical_trees_have_no_mismatches() {
        let api = TypeNode::class("MyApi")
            .public()
            .with_attribute(AttributeNode::new("ServiceContract"))
            .with_method(
                MethodNode::new("Get", TypeNode::class("List").with_generic(int()))
                    .public()
                    .with_param("id", int()),
            )
            .with_property(PropertyNode::new("Name", string()).public());
        assert!(diff(&api, &api).is_empty());
        assert_eq!(assert_compatible(&api, &api), Ok(()));
    }

    // ---- 2. Reordering ----

    fn opts(key: TypeNode, first_key: bool) -> TypeNode {
        let key = PropertyNode::new("Key", key).public();
        let name = PropertyNode::new("Name", string()).public();
        let (a, b) = if first_key { (key, name) } else { (name, key) };
        TypeNode::class("Opts").public().with_property(a).with_property(b)
    }

    fn with_opts(opts: TypeNode) -> TypeNode {
        TypeNode::class("MyApi").public().with_method(
            MethodNode::new("FirstMethod", int())
                .public()
                .with_param("o", opts),
        )
    }

    #[test]
    fn reordering_members_is_not_a_change() {
        let original = with_opts(opts(int(), true));
        let candidate = with_opts(opts(int(), false));
        assert!(diff(&original, &candidate).is_empty());

        let api = TypeNode::class("MyApi")
            .public()
            .with_method(MethodNode::new("A", int()).public())
            .with_method(MethodNode::new("B", string()).public());
        let reordered = TypeNode::class("MyApi")
            .public()
            .with_method(MethodNode::new("B", string()).public())
            .with_method(MethodNode::new("A", int()).public());
        assert!(diff(&api, &reordered).is_empty());
    }

    #[test]
    fn reordering_with_a_change_reports_only_the_change() {
        let original = with_opts(opts(int(), true));
        let candidate = with_opts(opts(TypeNode::structure("long"), false));
        let result = diff(&original, &candidate);
        assert_eq!(reasons(&result), vec![Reason::TypeNameChanged]);
        let expected = result.first().unwrap().expected.as_ref().unwrap();
        assert_eq!(expected.location(), "MyApi.FirstMethod.o.Opts.Key");
    }

    // ---- 3. Removal short-circuit ----

    #[test]
    fn removal_suppresses_sibling_changes() {
        let inner = |extra: bool| {
            let mut t = TypeNode::class("Inner")
                .public()
                .with_property(PropertyNode::new("Id", int()).public());
            if extra {
                t = t.with_property(PropertyNode::new("Extra", int()).public());
            }
            t
        };
        let original = TypeNode::class("Outer")
            .public()
            .with_property(PropertyNode::new("Gone", int()).public())
            .with_property(PropertyNode::new("Kept", inner(false)).public());
        let candidate = TypeNode::class("Outer")
            .public()
            .with_property(PropertyNode::new("Kept", inner(true)).public());

        let result = diff(&original, &candidate);
        assert_eq!(reasons(&result), vec![Reason::ElementRemoved]);
        assert_eq!(result.first().unwrap().expected.as_ref().unwrap().name, "Gone");
    }

    #[test]
    fn result_scenario_reports_single_removal() {
        let original = TypeNode::class("Result")
            .public()
            .with_property(PropertyNode::new("X", string()).public());
        let candidate = TypeNode::class("Result")
            .public()
            .with_property(PropertyNode::new("NewProp", string()).public())
            .with_property(PropertyNode::new("Y", int()).public());

        let result = diff(&original, &candidate);
        assert_eq!(result.len(), 1);
        let removed = result.first().unwrap();
        assert_eq!(removed.reason, Reason::ElementRemoved);
        assert_eq!(removed.expected.as_ref().unwrap().path().to_string(), "Result.X");
    }

    // ---- 4. Additive changes ----

    #[test]
    fn additions_to_a_class_are_compatible() {
        let original = TypeNode::class("MyApi")
            .public()
            .with_method(MethodNode::new("Run", int()).public());
        let candidate = original
            .clone()
            .with_method(MethodNode::new("Stop", int()).public())
            .with_property(PropertyNode::new("State", string()).public());
        assert!(diff(&original, &candidate).is_empty());
    }

    #[test]
    fn additions_to_an_interface_are_breaking() {
        let original = TypeNode::interface("IApi")
            .public()
            .with_method(MethodNode::new("Run", int()));
        let candidate = original.clone().with_method(MethodNode::new("Stop", int()));

        let result = diff(&original, &candidate);
        assert_eq!(reasons(&result), vec![Reason::MemberAddedToInterface]);
        assert_eq!(result.first().unwrap().received.as_ref().unwrap().name, "Stop");
    }

    #[test]
    fn abstract_additions_to_an_abstract_class_are_breaking() {
        let original = TypeNode::abstract_class("Handler").public();
        let candidate = TypeNode::abstract_class("Handler").public().with_method(
            MethodNode::new("Handle", TypeNode::named("void"))
                .public()
                .with_modifier("abstract"),
        );
        let result = diff(&original, &candidate);
        assert_eq!(reasons(&result), vec![Reason::MemberAddedToInterface]);
    }

    #[test]
    fn protected_abstract_addition_is_breaking() {
        let original = TypeNode::abstract_class("Handler").public();
        let candidate = TypeNode::abstract_class("Handler").public().with_method(
            MethodNode::new("Handle", TypeNode::named("void"))
                .with_modifier("protected")
                .with_modifier("abstract"),
        );
        let result = diff(&original, &candidate);
        assert_eq!(reasons(&result), vec![Reason::MemberAddedToInterface]);
        assert_eq!(
            result.first().unwrap().detail.as_deref(),
            Some("method added to abstract class")
        );
    }

    #[test]
    fn widening_an_abstract_member_is_not_an_addition() {
        let handler = |access: &str| {
            TypeNode::abstract_class("Handler").public().with_method(
                MethodNode::new("Handle", TypeNode::named("void"))
                    .with_modifier(access)
                    .with_modifier("abstract"),
            )
        };
        let result = diff(&handler("protected"), &handler("public"));
        assert_eq!(result.count(Reason::MemberAddedToInterface), 0);
        assert_eq!(reasons(&result), vec![Reason::ModifierChanged]);
        assert_eq!(
            result.first().unwrap().detail.as_deref(),
            Some("protected abstract -> public abstract")
        );
    }

    #[test]
    fn interface_member_made_public_is_not_an_addition() {
        let api = |flush: MethodNode| {
            TypeNode::interface("IApi")
                .public()
                .with_method(MethodNode::new("Run", int()))
                .with_method(flush)
        };
        let original = api(MethodNode::new("Flush", int()).with_modifier("internal"));
        let candidate = api(MethodNode::new("Flush", int()).public());
        assert!(diff(&original, &candidate).is_empty());
    }

    #[test]
    fn renamed_interface_method_is_not_also_an_addition() {
        let original = TypeNode::interface("IApi")
            .public()
            .with_method(MethodNode::new("Run", int()));
        let candidate = TypeNode::interface("IApi")
            .public()
            .with_method(MethodNode::new("Execute", int()));
        let result = diff(&original, &candidate);
        assert_eq!(reasons(&result), vec![Reason::ElementRemoved]);
    }

    // ---- 5. Attributes ----

    #[test]
    fn adding_an_attribute_is_breaking() {
        let original = TypeNode::class("Dto")
            .public()
            .with_property(PropertyNode::new("Id", int()).public());
        let candidate = TypeNode::class("Dto").public().with_property(
            PropertyNode::new("Id", int())
                .public()
                .with_attribute(AttributeNode::new("DataMember").with_value("Order", "1")),
        );
        let result = diff(&original, &candidate);
        assert_eq!(reasons(&result), vec![Reason::AttributeMismatch]);
    }

    #[test]
    fn changed_attribute_value_is_breaking() {
        let dto = |order: &str| {
            TypeNode::class("Dto").public().with_property(
                PropertyNode::new("Id", int())
                    .public()
                    .with_attribute(AttributeNode::new("DataMember").with_value("Order", order)),
            )
        };
        let verdict = assert_compatible(&dto("1"), &dto("2")).unwrap_err();
        assert_eq!(verdict.reason, Reason::AttributeMismatch);
        assert_eq!(
            verdict.message,
            "attribute `[DataMember(Order=1)]` on Dto.Id changed to `[DataMember(Order=2)]` \
             (Order: 1 -> 2)"
        );
    }

    // ---- 6. Best-guess renames ----

    #[test]
    fn rename_is_reported_as_removal() {
        let original = TypeNode::class("MyApi")
            .public()
            .with_method(MethodNode::new("FirstMethod", int()).public());
        let candidate = TypeNode::class("MyApi")
            .public()
            .with_method(MethodNode::new("NewFirstMethod", int()).public());

        let result = diff(&original, &candidate);
        assert_eq!(reasons(&result), vec![Reason::ElementRemoved]);
        assert_eq!(result.first().unwrap().expected.as_ref().unwrap().name, "FirstMethod");
    }

    #[test]
    fn rename_is_not_confused_by_a_decoy() {
        let decoy = || {
            MethodNode::new("Decoy", string())
                .public()
                .with_param("flag", TypeNode::structure("bool"))
        };
        let original = TypeNode::class("MyApi")
            .public()
            .with_method(MethodNode::new("FirstMethod", int()).public())
            .with_method(decoy());
        let candidate = TypeNode::class("MyApi")
            .public()
            .with_method(decoy())
            .with_method(MethodNode::new("NewFirstMethod", int()).public());

        let result = diff(&original, &candidate);
        assert_eq!(reasons(&result), vec![Reason::ElementRemoved]);
        let removed = result.first().unwrap();
        assert_eq!(removed.expected.as_ref().unwrap().name, "FirstMethod");
        assert_eq!(removed.received.as_ref().unwrap().name, "NewFirstMethod");
    }

    #[test]
    fn removed_method_with_no_candidates() {
        let original = TypeNode::class("MyApi")
            .public()
            .with_method(MethodNode::new("Run", int()).public());
        let candidate = TypeNode::class("MyApi").public();
        let result = diff(&original, &candidate);
        assert_eq!(reasons(&result), vec![Reason::ElementRemoved]);
        assert!(result.first().unwrap().received.is_none());
    }

    // ---- 7. Visibility ----

    #[test]
    fn non_public_changes_are_invisible() {
        let api = |helper: MethodNode| {
            TypeNode::class("MyApi")
                .public()
                .with_method(MethodNode::new("Run", int()).public())
                .with_method(helper)
        };
        let original = api(MethodNode::new("Helper", int()).with_modifier("private"));
        let candidate = api(
            MethodNode::new("Helper", string())
                .with_modifier("private")
                .with_param("x", int()),
        );
        assert!(diff(&original, &candidate).is_empty());

        let internal = api(MethodNode::new("Helper", int()).with_modifier("internal"));
        let now_public = api(MethodNode::new("Helper", int()).public());
        assert!(diff(&internal, &now_public).is_empty());
    }

    #[test]
    fn public_to_internal_is_one_mismatch() {
        let original = TypeNode::class("MyApi")
            .public()
            .with_method(MethodNode::new("Run", int()).public());
        let candidate = TypeNode::class("MyApi")
            .public()
            .with_method(MethodNode::new("Run", int()).with_modifier("internal"));
        let result = diff(&original, &candidate);
        assert_eq!(reasons(&result), vec![Reason::ModifierChanged]);
        assert_eq!(result.first().unwrap().detail.as_deref(), Some("public -> internal"));
    }

    // ---- 8. Nested type scenario ----

    #[test]
    fn nested_type_changes_are_all_reported() {
        let original_opts = TypeNode::class("Opts")
            .public()
            .with_property(PropertyNode::new("Key", int()).public())
            .with_method(MethodNode::new("DoSomething", string()).public());
        let candidate_opts = TypeNode::class("Opts").public().with_method(
            MethodNode::new("DoSomething", TypeNode::named("void"))
                .public()
                .with_param("state", TypeNode::class("object")),
        );

        let result = diff(&with_opts(original_opts), &with_opts(candidate_opts));
        assert_eq!(result.len(), 4);
        assert_eq!(
            reasons(&result),
            vec![
                Reason::ElementRemoved,
                Reason::TypeNameChanged,
                Reason::TypeKindChanged,
                Reason::DefinitionChanged,
            ]
        );
        let removed = result.first().unwrap().expected.as_ref().unwrap();
        assert_eq!(removed.path().to_string(), "MyApi.FirstMethod.o.Opts.Key");
    }

    // ---- 9. Type identity ----

    #[test]
    fn type_kind_change_is_reported_first() {
        let original = TypeNode::class("MyApi")
            .public()
            .with_method(MethodNode::new("Run", int()).public());
        let candidate = TypeNode::interface("MyApi")
            .public()
            .with_method(MethodNode::new("Run", int()).public());
        let verdict = assert_compatible(&original, &candidate).unwrap_err();
        assert_eq!(verdict.reason, Reason::TypeKindChanged);
    }

    #[test]
    fn type_rename_still_reports_member_changes() {
        let original = TypeNode::class("MyApi")
            .public()
            .with_method(MethodNode::new("Run", int()).public());
        let candidate = TypeNode::class("MyNewApi")
            .public()
            .with_method(MethodNode::new("Run", string()).public());
        let result = diff(&original, &candidate);
        assert_eq!(
            reasons(&result),
            vec![Reason::TypeNameChanged, Reason::TypeNameChanged, Reason::TypeKindChanged]
        );
    }

    // ---- 10. Properties ----

    fn arb_type(depth: u32) -> impl Strategy<Value = TypeNode> {
        let leaf = prop_oneof![
            Just(int()),
            Just(string()),
            Just(TypeNode::named("void")),
            Just(TypeNode::class("Opts").public()),
        ];
        leaf.prop_recursive(depth, 16, 3, |inner| {
            (
                "[A-C][a-c]{0,2}",
                prop::collection::vec(inner.clone(), 0..2),
                prop::collection::vec(
                    (
                        "[A-C]",
                        prop::option::of(Just("public")),
                        inner.clone(),
                        prop::collection::vec(("[a-c]", inner), 0..3),
                    ),
                    0..4,
                ),
                prop::collection::vec(("[D-F]", prop::option::of("[0-2]")), 0..3),
            )
                .prop_map(|(name, generics, methods, attrs)| {
                    let mut t = TypeNode::class(name).public();
                    for g in generics {
                        t = t.with_generic(g);
                    }
                    for (method, access, ret, params) in methods {
                        let mut m = MethodNode::new(method, ret);
                        if let Some(access) = access {
                            m = m.with_modifier(access);
                        }
                        for (p, ty) in params {
                            m = m.with_param(p, ty);
                        }
                        t = t.with_method(m);
                    }
                    for (attr, value) in attrs {
                        let mut a = AttributeNode::new(attr);
                        if let Some(value) = value {
                            a = a.with_value("Order", value);
                        }
                        t = t.with_attribute(a);
                    }
                    t
                })
        })
    }

    proptest! {
        #[test]
        fn diff_of_a_tree_with_itself_is_empty(tree in arb_type(3)) {
            prop_assert!(diff(&tree, &tree).is_empty());
        }

        #[test]
        fn diff_is_deterministic(a in arb_type(2), b in arb_type(2)) {
            prop_assert_eq!(diff(&a, &b), diff(&a, &b));
        }
    }
}
