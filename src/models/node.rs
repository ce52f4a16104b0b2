use serde::{Deserialize, Serialize};

/// Whether a node groups other nodes or is a unit of knowledge.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "UPPERCASE")]
pub enum NodeKind {
    Folder,
    File,
}

impl NodeKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Folder => "FOLDER",
            Self::File => "FILE",
        }
    }
}

/// Extra flags carried by file nodes.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct NodeMeta {
    pub is_memo: bool,
}

/// A node of the world tree.
///
/// Folders own an ordered list of children and never carry content or an
/// archived flag. Files may carry `content` when they are memos, and may be
/// archived. A memo shares its parent folder with the file it annotates and is
/// named after it (see [`crate::tree::memo_name_for`]).
///
/// The serialized form is the export format, so optional fields are omitted
/// rather than written as `null`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Node {
    pub id: String,
    pub name: String,
    #[serde(rename = "type")]
    pub kind: NodeKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub children: Option<Vec<Node>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub meta: Option<NodeMeta>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_archived: Option<bool>,
}

impl Node {
    pub fn folder(id: impl Into<String>, name: impl Into<String>, children: Vec<Node>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            kind: NodeKind::Folder,
            children: Some(children),
            content: None,
            meta: None,
            is_archived: None,
        }
    }

    pub fn file(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            kind: NodeKind::File,
            children: None,
            content: None,
            meta: None,
            is_archived: None,
        }
    }

    /// A memo file holding the creator's note for a sibling file.
    pub fn memo(id: impl Into<String>, name: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            content: Some(content.into()),
            meta: Some(NodeMeta { is_memo: true }),
            ..Self::file(id, name)
        }
    }

    pub fn is_folder(&self) -> bool {
        self.kind == NodeKind::Folder
    }

    pub fn is_memo(&self) -> bool {
        self.meta.is_some_and(|m| m.is_memo)
    }

    pub fn is_archived(&self) -> bool {
        self.is_archived.unwrap_or(false)
    }

    /// Children of a folder, or an empty slice for files.
    pub fn children(&self) -> &[Node] {
        self.children.as_deref().unwrap_or(&[])
    }
}
