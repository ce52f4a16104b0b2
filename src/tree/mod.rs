//! The world tree: an in-memory forest of folders and files.
//!
//! There are no parent pointers. Parent discovery is a recursive search, which
//! is fine at the sizes a hand-curated library reaches.

mod render;
pub mod seed;

pub use render::*;

use serde::{Deserialize, Serialize};

use crate::models::Node;

/// Suffix appended to a file's stem to name its memo.
pub const MEMO_SUFFIX: &str = "_메모.txt";

/// Returned by [`NodeTree::find_paired_note_content`] when the parent folder
/// holds no memo for the file.
pub const MEMO_NOT_FOUND: &str = "이 지식에 대한 메모를 찾을 수 없습니다.";

/// Derive the memo name for a file: everything before the first `.`, plus
/// [`MEMO_SUFFIX`].
///
/// The same rule is used when memos are created, looked up and archived, so a
/// file and its memo can never drift apart.
pub fn memo_name_for(file_name: &str) -> String {
    let stem = file_name.split('.').next().unwrap_or(file_name);
    format!("{}{}", stem, MEMO_SUFFIX)
}

/// The root list of the world tree.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(transparent)]
pub struct NodeTree {
    roots: Vec<Node>,
}

impl NodeTree {
    pub fn new(roots: Vec<Node>) -> Self {
        Self { roots }
    }

    pub fn roots(&self) -> &[Node] {
        &self.roots
    }

    pub fn into_roots(self) -> Vec<Node> {
        self.roots
    }

    /// Find any node by id. Depth-first, first match wins.
    pub fn find(&self, id: &str) -> Option<&Node> {
        fn walk<'a>(nodes: &'a [Node], id: &str) -> Option<&'a Node> {
            for node in nodes {
                if node.id == id {
                    return Some(node);
                }
                if let Some(found) = walk(node.children(), id) {
                    return Some(found);
                }
            }
            None
        }
        walk(&self.roots, id)
    }

    /// Find the folder that directly contains `id`.
    ///
    /// Root-level nodes have no container and yield `None`.
    pub fn find_container_of(&self, id: &str) -> Option<&Node> {
        fn walk<'a>(nodes: &'a [Node], id: &str) -> Option<&'a Node> {
            for node in nodes {
                if node.children().iter().any(|c| c.id == id) {
                    return Some(node);
                }
                if let Some(found) = walk(node.children(), id) {
                    return Some(found);
                }
            }
            None
        }
        walk(&self.roots, id)
    }

    /// Append `node` to the folder `container_id` and re-sort its children by
    /// name.
    ///
    /// Returns `false` and leaves the tree untouched when no folder has that id.
    /// Duplicate names are not checked.
    pub fn insert_under(&mut self, container_id: &str, node: Node) -> bool {
        fn walk(nodes: &mut [Node], container_id: &str, node: &mut Option<Node>) -> bool {
            for candidate in nodes.iter_mut() {
                if candidate.id == container_id && candidate.is_folder() {
                    if let Some(node) = node.take() {
                        let children = candidate.children.get_or_insert_with(Vec::new);
                        children.push(node);
                        children.sort_by(|a, b| a.name.cmp(&b.name));
                    }
                    return true;
                }
                if let Some(children) = candidate.children.as_mut() {
                    if walk(children, container_id, node) {
                        return true;
                    }
                }
            }
            false
        }
        let mut node = Some(node);
        walk(&mut self.roots, container_id, &mut node)
    }

    /// Return a copy of the tree where `leaf` and its memo carry `archived`.
    ///
    /// Both are matched among the leaf's siblings: the leaf by id, the memo by
    /// its derived name. A missing memo is not an error; the leaf alone is
    /// updated. Root-level leaves are matched among the roots. If the leaf is
    /// not in the tree at all the copy is identical to `self`.
    pub fn with_archived(&self, leaf: &Node, archived: bool) -> NodeTree {
        let memo_name = memo_name_for(&leaf.name);
        let mut next = self.clone();

        fn mark(siblings: &mut [Node], leaf_id: &str, memo_name: &str, archived: bool) {
            for sibling in siblings.iter_mut() {
                if sibling.id == leaf_id || sibling.name == memo_name {
                    sibling.is_archived = Some(archived);
                }
            }
        }

        fn walk(nodes: &mut [Node], leaf_id: &str, memo_name: &str, archived: bool) -> bool {
            for node in nodes.iter_mut() {
                let Some(children) = node.children.as_mut() else {
                    continue;
                };
                if children.iter().any(|c| c.id == leaf_id) {
                    mark(children, leaf_id, memo_name, archived);
                    return true;
                }
                if walk(children, leaf_id, memo_name, archived) {
                    return true;
                }
            }
            false
        }

        if next.roots.iter().any(|n| n.id == leaf.id) {
            mark(&mut next.roots, &leaf.id, &memo_name, archived);
        } else {
            walk(&mut next.roots, &leaf.id, &memo_name, archived);
        }
        next
    }

    /// Look up the creator's note for a file.
    ///
    /// - `None` when the file has no parent folder (root-level or unknown).
    /// - The memo's text when the parent holds a memo with the derived name.
    /// - [`MEMO_NOT_FOUND`] otherwise.
    pub fn find_paired_note_content(&self, leaf: &Node) -> Option<String> {
        let parent = self.find_container_of(&leaf.id)?;
        let memo_name = memo_name_for(&leaf.name);
        let content = parent
            .children()
            .iter()
            .find(|c| c.name == memo_name && c.is_memo())
            .and_then(|memo| memo.content.clone());
        Some(content.unwrap_or_else(|| MEMO_NOT_FOUND.to_string()))
    }

    /// Archived files, excluding memos, sorted by name.
    pub fn archived_leaves(&self) -> Vec<&Node> {
        fn walk<'a>(nodes: &'a [Node], out: &mut Vec<&'a Node>) {
            for node in nodes {
                if node.is_archived() && !node.is_folder() && !node.is_memo() {
                    out.push(node);
                }
                walk(node.children(), out);
            }
        }
        let mut archived = Vec::new();
        walk(&self.roots, &mut archived);
        archived.sort_by(|a, b| a.name.cmp(&b.name));
        archived
    }

    /// Every folder with its depth, in document order.
    pub fn folder_options(&self) -> Vec<(usize, &Node)> {
        fn walk<'a>(nodes: &'a [Node], depth: usize, out: &mut Vec<(usize, &'a Node)>) {
            for node in nodes.iter().filter(|n| n.is_folder()) {
                out.push((depth, node));
                walk(node.children(), depth + 1, out);
            }
        }
        let mut options = Vec::new();
        walk(&self.roots, 0, &mut options);
        options
    }
}

impl From<Vec<Node>> for NodeTree {
    fn from(roots: Vec<Node>) -> Self {
        Self::new(roots)
    }
}
