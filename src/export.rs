//! One-shot JSON export of the whole library. There is no import.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::models::{MemoryCrystal, Node};
use crate::tree::NodeTree;

/// The exported document.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct CoreMemory {
    pub file_system_state: Vec<Node>,
    pub integrated_memories_state: Vec<MemoryCrystal>,
}

impl CoreMemory {
    pub fn snapshot(tree: &NodeTree, history: &[MemoryCrystal]) -> Self {
        Self {
            file_system_state: tree.roots().to_vec(),
            integrated_memories_state: history.to_vec(),
        }
    }

    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string_pretty(self).context("Failed to serialize core memory")
    }
}

/// Write the tree and chronicle to `path`, replacing any existing file.
pub fn write_core_memory(path: &Path, tree: &NodeTree, history: &[MemoryCrystal]) -> Result<()> {
    let json = CoreMemory::snapshot(tree, history).to_json()?;

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).context("Failed to create export directory")?;
    }
    fs::write(path, json).with_context(|| format!("Failed to write {}", path.display()))?;
    Ok(())
}
