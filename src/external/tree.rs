//! Constituency tree value type.
//!
//! The engine never interprets grammar patterns itself; parsers hand it a
//! tree, and the compression search only needs three capabilities from it:
//! enumerate removable sub-trees as opaque handles, prune a handle set, and
//! read the surviving leaves. Handles are preorder indices into the tree, so
//! the power-set search works on plain integer sets regardless of how the
//! parser built the tree.

use serde::{Deserialize, Serialize};

/// Node labels recognized as syntactically optional.
///
/// | Label | Constituent |
/// |-------|-------------|
/// | `APP` | apposition |
/// | `PRN` | parenthetical |
/// | `REL` | relative clause |
/// | `PP`  | prepositional phrase |
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RemovableKind {
    Apposition,
    Parenthetical,
    RelativeClause,
    PrepositionalPhrase,
}

impl RemovableKind {
    fn from_label(label: &str) -> Option<Self> {
        match label {
            "APP" => Some(RemovableKind::Apposition),
            "PRN" => Some(RemovableKind::Parenthetical),
            "REL" => Some(RemovableKind::RelativeClause),
            "PP" => Some(RemovableKind::PrepositionalPhrase),
            _ => None,
        }
    }
}

/// Opaque handle to one sub-tree: its preorder index.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SubTreeId(usize);

impl SubTreeId {
    pub fn index(&self) -> usize {
        self.0
    }
}

/// One constituency tree node. Leaves carry a surface word.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TreeNode {
    pub label: String,
    pub word: Option<String>,
    pub children: Vec<TreeNode>,
}

impl TreeNode {
    pub fn leaf(label: &str, word: &str) -> Self {
        TreeNode {
            label: label.to_string(),
            word: Some(word.to_string()),
            children: Vec::new(),
        }
    }

    pub fn branch(label: &str, children: Vec<TreeNode>) -> Self {
        TreeNode {
            label: label.to_string(),
            word: None,
            children,
        }
    }
}

/// A parsed sentence as returned by the external parser.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConstituencyTree {
    pub root: TreeNode,
}

impl ConstituencyTree {
    pub fn new(root: TreeNode) -> Self {
        ConstituencyTree { root }
    }

    /// Surface words at the leaves, left to right.
    pub fn leaves(&self) -> Vec<&str> {
        let mut out = Vec::new();
        collect_leaves(&self.root, &mut out);
        out
    }

    /// All removable sub-trees in preorder. The root is never removable.
    pub fn removable(&self) -> Vec<(SubTreeId, RemovableKind)> {
        let mut out = Vec::new();
        let mut next = 0usize;
        walk_removable(&self.root, &mut next, &mut out);
        out.retain(|(id, _)| id.index() != 0);
        out
    }

    /// Rebuild the tree with every sub-tree in `remove` pruned.
    ///
    /// Returns `None` when the root itself would be removed or no leaves
    /// survive, matching the parser contract for a failed prune.
    pub fn prune(&self, remove: &[SubTreeId]) -> Option<ConstituencyTree> {
        let mut next = 0usize;
        let root = prune_node(&self.root, remove, &mut next)?;
        let tree = ConstituencyTree { root };
        if tree.leaves().is_empty() {
            return None;
        }
        Some(tree)
    }
}

fn collect_leaves<'a>(node: &'a TreeNode, out: &mut Vec<&'a str>) {
    if let Some(word) = &node.word {
        out.push(word.as_str());
    }
    for child in &node.children {
        collect_leaves(child, out);
    }
}

fn walk_removable(node: &TreeNode, next: &mut usize, out: &mut Vec<(SubTreeId, RemovableKind)>) {
    let id = SubTreeId(*next);
    *next += 1;
    if let Some(kind) = RemovableKind::from_label(&node.label) {
        out.push((id, kind));
    }
    for child in &node.children {
        walk_removable(child, next, out);
    }
}

fn prune_node(node: &TreeNode, remove: &[SubTreeId], next: &mut usize) -> Option<TreeNode> {
    let id = SubTreeId(*next);
    *next += 1;
    let mut kept_children = Vec::with_capacity(node.children.len());
    for child in &node.children {
        // The preorder counter must advance through pruned sub-trees too, so
        // ids stay aligned with the original tree.
        if let Some(kept) = prune_node(child, remove, next) {
            kept_children.push(kept);
        }
    }
    if remove.contains(&id) {
        return None;
    }
    Some(TreeNode {
        label: node.label.clone(),
        word: node.word.clone(),
        children: kept_children,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    // "O presidente , um economista , discursou em Lisboa"
    // with an appositive "um economista" and a PP "em Lisboa".
    fn sample_tree() -> ConstituencyTree {
        ConstituencyTree::new(TreeNode::branch(
            "S",
            vec![
                TreeNode::branch(
                    "NP",
                    vec![
                        TreeNode::leaf("DET", "O"),
                        TreeNode::leaf("N", "presidente"),
                        TreeNode::branch(
                            "APP",
                            vec![TreeNode::leaf("DET", "um"), TreeNode::leaf("N", "economista")],
                        ),
                    ],
                ),
                TreeNode::branch(
                    "VP",
                    vec![
                        TreeNode::leaf("V", "discursou"),
                        TreeNode::branch(
                            "PP",
                            vec![TreeNode::leaf("P", "em"), TreeNode::leaf("N", "Lisboa")],
                        ),
                    ],
                ),
            ],
        ))
    }

    #[test]
    fn test_leaves_in_order() {
        let tree = sample_tree();
        assert_eq!(
            tree.leaves(),
            vec!["O", "presidente", "um", "economista", "discursou", "em", "Lisboa"]
        );
    }

    #[test]
    fn test_removable_finds_apposition_and_pp() {
        let tree = sample_tree();
        let kinds: Vec<RemovableKind> = tree.removable().iter().map(|(_, k)| *k).collect();
        assert_eq!(
            kinds,
            vec![RemovableKind::Apposition, RemovableKind::PrepositionalPhrase]
        );
    }

    #[test]
    fn test_prune_one_subtree() {
        let tree = sample_tree();
        let removable = tree.removable();
        let (app_id, _) = removable[0];
        let pruned = tree.prune(&[app_id]).unwrap();
        assert_eq!(
            pruned.leaves(),
            vec!["O", "presidente", "discursou", "em", "Lisboa"]
        );
    }

    #[test]
    fn test_prune_all_subtrees() {
        let tree = sample_tree();
        let ids: Vec<SubTreeId> = tree.removable().iter().map(|(id, _)| *id).collect();
        let pruned = tree.prune(&ids).unwrap();
        assert_eq!(pruned.leaves(), vec!["O", "presidente", "discursou"]);
    }

    #[test]
    fn test_prune_preserves_original() {
        let tree = sample_tree();
        let ids: Vec<SubTreeId> = tree.removable().iter().map(|(id, _)| *id).collect();
        let _ = tree.prune(&ids);
        assert_eq!(tree.leaves().len(), 7);
    }

    #[test]
    fn test_prune_everything_returns_none() {
        let tree = ConstituencyTree::new(TreeNode::branch(
            "S",
            vec![TreeNode::branch("PP", vec![TreeNode::leaf("P", "em")])],
        ));
        let ids: Vec<SubTreeId> = tree.removable().iter().map(|(id, _)| *id).collect();
        assert!(tree.prune(&ids).is_none());
    }

    #[test]
    fn test_root_is_never_removable() {
        let tree = ConstituencyTree::new(TreeNode::branch(
            "PP",
            vec![TreeNode::leaf("P", "em"), TreeNode::leaf("N", "Lisboa")],
        ));
        assert!(tree.removable().is_empty());
    }
}
