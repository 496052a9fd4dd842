//! Line-level diff of two rendered API surfaces.
//!
//! Complements the structural diff with a reviewer-friendly view: both trees
//! are reduced to their public surface, rendered as declaration text, and
//! compared with the `similar` crate (Myers algorithm) into hunks with
//! context lines.

use apilock_types::{render_surface, TypeNode};
use similar::{ChangeTag, TextDiff};

use crate::visibility::public_surface;

/// Lines of unchanged context kept around each change.
const CONTEXT_LINES: usize = 3;

/// The result of diffing two rendered surfaces.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SurfaceDiff {
    pub hunks: Vec<DiffHunk>,
    /// Total number of lines in the original rendering.
    pub old_lines: usize,
    /// Total number of lines in the candidate rendering.
    pub new_lines: usize,
}

impl SurfaceDiff {
    /// Returns `true` if both surfaces render identically.
    pub fn is_empty(&self) -> bool {
        self.hunks.is_empty()
    }

    pub fn additions(&self) -> usize {
        self.lines()
            .filter(|l| matches!(l, DiffLine::Added(_)))
            .count()
    }

    pub fn deletions(&self) -> usize {
        self.lines()
            .filter(|l| matches!(l, DiffLine::Removed(_)))
            .count()
    }

    fn lines(&self) -> impl Iterator<Item = &DiffLine> {
        self.hunks.iter().flat_map(|h| &h.lines)
    }

    /// Render as unified diff text with `@@` hunk headers.
    pub fn to_unified(&self, old_label: &str, new_label: &str) -> String {
        let mut out = String::new();
        if self.is_empty() {
            return out;
        }
        out.push_str(&format!("--- {old_label}\n"));
        out.push_str(&format!("+++ {new_label}\n"));
        for hunk in &self.hunks {
            out.push_str(&format!(
                "@@ -{},{} +{},{} @@\n",
                hunk.old_start, hunk.old_count, hunk.new_start, hunk.new_count
            ));
            for line in &hunk.lines {
                let (sign, text) = match line {
                    DiffLine::Context(text) => (' ', text),
                    DiffLine::Added(text) => ('+', text),
                    DiffLine::Removed(text) => ('-', text),
                };
                out.push(sign);
                out.push_str(text);
                out.push('\n');
            }
        }
        out
    }
}

/// A contiguous region of changes.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DiffHunk {
    /// Line number in the original rendering where this hunk starts (1-based).
    pub old_start: usize,
    pub old_count: usize,
    /// Line number in the candidate rendering where this hunk starts (1-based).
    pub new_start: usize,
    pub new_count: usize,
    pub lines: Vec<DiffLine>,
}

/// A single line in a diff hunk.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum DiffLine {
    Context(String),
    Added(String),
    Removed(String),
}

/// Diff the rendered public surfaces of two API types.
pub fn surface_diff(original: &TypeNode, candidate: &TypeNode) -> SurfaceDiff {
    let old_text = render_surface(&public_surface(original));
    let new_text = render_surface(&public_surface(candidate));
    diff_text(&old_text, &new_text)
}

fn diff_text(old_text: &str, new_text: &str) -> SurfaceDiff {
    let old_lines = old_text.lines().count();
    let new_lines = new_text.lines().count();
    if old_text == new_text {
        return SurfaceDiff {
            hunks: Vec::new(),
            old_lines,
            new_lines,
        };
    }

    let text_diff = TextDiff::from_lines(old_text, new_text);
    let mut hunks = Vec::new();

    for group in text_diff.grouped_ops(CONTEXT_LINES) {
        let (Some(first), Some(last)) = (group.first(), group.last()) else {
            continue;
        };
        let old_start = first.old_range().start + 1;
        let new_start = first.new_range().start + 1;
        let old_count = last.old_range().end - first.old_range().start;
        let new_count = last.new_range().end - first.new_range().start;

        let mut lines = Vec::new();
        for op in &group {
            for change in text_diff.iter_changes(op) {
                let text = change.value().trim_end_matches('\n').to_string();
                lines.push(match change.tag() {
                    ChangeTag::Equal => DiffLine::Context(text),
                    ChangeTag::Delete => DiffLine::Removed(text),
                    ChangeTag::Insert => DiffLine::Added(text),
                });
            }
        }

        hunks.push(DiffHunk {
            old_start,
            old_count,
            new_start,
            new_count,
            lines,
        });
    }

    SurfaceDiff {
        hunks,
        old_lines,
        new_lines,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use apilock_types::{MethodNode, PropertyNode};

    fn api() -> TypeNode {
        TypeNode::class("Result")
            .public()
            .with_property(PropertyNode::new("X", TypeNode::class("string")).public())
            .with_method(MethodNode::new("Reset", TypeNode::named("void")).public())
    }

    #[test]
    fn identical_surfaces_have_no_hunks() {
        let diff = surface_diff(&api(), &api());
        assert!(diff.is_empty());
        assert_eq!(diff.old_lines, 5);
        assert_eq!(diff.to_unified("a", "b"), "");
    }

    #[test]
    fn private_members_do_not_render() {
        let candidate = api().with_method(MethodNode::new("Helper", TypeNode::named("void")));
        assert!(surface_diff(&api(), &candidate).is_empty());
    }

    #[test]
    fn changed_member_shows_remove_and_add() {
        let candidate = TypeNode::class("Result")
            .public()
            .with_property(PropertyNode::new("NewProp", TypeNode::class("string")).public())
            .with_method(MethodNode::new("Reset", TypeNode::named("void")).public());
        let diff = surface_diff(&api(), &candidate);
        assert_eq!(diff.additions(), 1);
        assert_eq!(diff.deletions(), 1);

        let unified = diff.to_unified("Result.api.json", "candidate");
        assert!(unified.starts_with("--- Result.api.json\n+++ candidate\n@@ -1,5 +1,5 @@\n"));
        assert!(unified.contains("-    public string X { get; }\n"));
        assert!(unified.contains("+    public string NewProp { get; }\n"));
    }

    #[test]
    fn unified_text_prefixes_every_line() {
        let candidate = TypeNode::class("Result")
            .public()
            .with_property(PropertyNode::new("NewProp", TypeNode::class("string")).public())
            .with_method(MethodNode::new("Reset", TypeNode::named("void")).public());

        let expected = "\
--- old
+++ new
@@ -1,5 +1,5 @@
 public class Result
 {
-    public string X { get; }
+    public string NewProp { get; }
     public void Reset();
 }
";
        assert_eq!(surface_diff(&api(), &candidate).to_unified("old", "new"), expected);
    }
}
