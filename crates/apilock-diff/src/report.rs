//! First-failure reporting: turn a mismatch into a user-facing verdict.

use apilock_types::TypeNode;
use serde::Serialize;
use thiserror::Error;

use crate::diff;
use crate::mismatch::{ApiDiff, Mismatch, Reason, SymbolRef};

/// The first breaking change between two API snapshots.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Error)]
#[error("{message}")]
pub struct Verdict {
    pub reason: Reason,
    pub expected: Option<SymbolRef>,
    pub received: Option<SymbolRef>,
    /// Human-readable explanation.
    pub message: String,
}

impl Verdict {
    pub fn from_mismatch(mismatch: &Mismatch) -> Self {
        Self {
            reason: mismatch.reason,
            expected: mismatch.expected.clone(),
            received: mismatch.received.clone(),
            message: render_message(mismatch),
        }
    }
}

impl ApiDiff {
    /// `Ok` when compatible, otherwise the verdict for the first mismatch.
    pub fn verdict(&self) -> Result<(), Verdict> {
        match self.first() {
            None => Ok(()),
            Some(first) => Err(Verdict::from_mismatch(first)),
        }
    }
}

/// Compare two snapshots and fail on the first breaking change.
pub fn assert_compatible(original: &TypeNode, candidate: &TypeNode) -> Result<(), Verdict> {
    diff(original, candidate).verdict()
}

/// Render one mismatch as a sentence.
pub fn render_message(mismatch: &Mismatch) -> String {
    let (expected, received) = (mismatch.expected.as_ref(), mismatch.received.as_ref());
    let mut message = match (mismatch.reason, expected, received) {
        (Reason::ElementRemoved, Some(e), _) => {
            format!("{} `{}` was removed from {}", e.kind, e.display, e.location())
        }
        (Reason::TypeNameChanged, Some(e), Some(r)) => format!(
            "type at {} changed from `{}` to `{}`",
            e.location(),
            e.display,
            r.display
        ),
        (Reason::TypeKindChanged, Some(e), Some(_)) => {
            format!("declaration kind of `{}` at {} changed", e.display, e.location())
        }
        (Reason::DefinitionChanged, Some(e), Some(_)) => {
            format!("definition of {} `{}` in {} changed", e.kind, e.display, e.location())
        }
        (Reason::ParameterNameChanged, Some(e), Some(r)) => format!(
            "parameter `{}` of {} was renamed to `{}`",
            e.name,
            e.location(),
            r.name
        ),
        (Reason::AttributeMismatch, None, Some(r)) => {
            format!("attribute `{}` was added to {}", r.display, r.location())
        }
        (Reason::AttributeMismatch, Some(e), Some(r)) => format!(
            "attribute `{}` on {} changed to `{}`",
            e.display,
            e.location(),
            r.display
        ),
        (Reason::ModifierChanged, Some(e), Some(_)) => {
            format!("modifiers of {} `{}` in {} changed", e.kind, e.display, e.location())
        }
        (Reason::MemberAddedToInterface, _, Some(r)) => format!(
            "{} `{}` was added to {}, which implementors must provide",
            r.kind,
            r.display,
            r.location()
        ),
        (reason, _, _) => {
            let subject = expected.or(received).map(|s| s.path().to_string());
            match subject {
                Some(path) => format!("{reason} at {path}"),
                None => reason.to_string(),
            }
        }
    };
    if let Some(detail) = &mismatch.detail {
        message.push_str(" (");
        message.push_str(detail);
        message.push(')');
    }
    message
}

#[cfg(test)]
mod tests {
    use super::*;
    use apilock_types::{AttributeNode, MethodNode, PropertyNode};

    fn int() -> TypeNode {
        TypeNode::structure("int")
    }

    fn api(method: MethodNode) -> TypeNode {
        TypeNode::class("MyApi").public().with_method(method.public())
    }

    #[test]
    fn compatible_snapshots_pass() {
        let original = api(MethodNode::new("Run", int()));
        assert_eq!(assert_compatible(&original, &original), Ok(()));
    }

    #[test]
    fn removal_message_names_the_owner() {
        let original = api(MethodNode::new("FirstMethod", int()));
        let candidate = api(MethodNode::new("NewFirstMethod", int()));
        let verdict = assert_compatible(&original, &candidate).unwrap_err();
        assert_eq!(verdict.reason, Reason::ElementRemoved);
        assert_eq!(
            verdict.to_string(),
            "method `int FirstMethod()` was removed from MyApi \
             (closest candidate: int NewFirstMethod())"
        );
    }

    #[test]
    fn parameter_rename_message() {
        let original = api(MethodNode::new("Set", int()).with_param("initial", int()));
        let candidate = api(MethodNode::new("Set", int()).with_param("newValue", int()));
        let verdict = assert_compatible(&original, &candidate).unwrap_err();
        assert_eq!(verdict.reason, Reason::ParameterNameChanged);
        assert_eq!(
            verdict.message,
            "parameter `initial` of MyApi.Set was renamed to `newValue` (initial -> newValue)"
        );
    }

    #[test]
    fn added_attribute_message() {
        let original = TypeNode::class("Dto")
            .public()
            .with_property(PropertyNode::new("Id", int()).public());
        let candidate = TypeNode::class("Dto").public().with_property(
            PropertyNode::new("Id", int())
                .public()
                .with_attribute(AttributeNode::new("DataMember").with_value("Order", "1")),
        );
        let verdict = assert_compatible(&original, &candidate).unwrap_err();
        assert_eq!(
            verdict.message,
            "attribute `[DataMember(Order=1)]` was added to Dto.Id (attribute added)"
        );
    }

    #[test]
    fn verdict_serializes_reason() {
        let original = api(MethodNode::new("Run", int()));
        let candidate = api(MethodNode::new("Run", TypeNode::named("void")));
        let verdict = assert_compatible(&original, &candidate).unwrap_err();
        let json = serde_json::to_value(&verdict).unwrap();
        assert_eq!(json["reason"], "type_name_changed");
        assert_eq!(json["expected"]["context"], serde_json::json!(["MyApi", "Run"]));
    }
}
