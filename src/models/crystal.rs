use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// The three fields produced by one reflection cycle.
///
/// `thought` is always present after a completed cycle. `inquiry` and
/// `creation` only come back from a first-exposure cycle, and only when the
/// reply actually contained them.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct ThoughtReply {
    pub thought: String,
    pub inquiry: Option<String>,
    pub creation: Option<String>,
}

impl ThoughtReply {
    /// A reply consisting of a single reflection.
    pub fn thought_only(thought: impl Into<String>) -> Self {
        Self {
            thought: thought.into(),
            inquiry: None,
            creation: None,
        }
    }
}

/// Identity of the knowledge a crystal was formed from, copied out of the tree.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CrystalKnowledge {
    pub id: String,
    pub name: String,
    pub memo: Option<String>,
}

/// The reflection fields of a crystal.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CrystalProcess {
    pub thought: String,
    pub inquiry: Option<String>,
    pub creation: Option<String>,
}

/// A crystallized experience: one history entry of the chronicle.
///
/// Crystals deep-copy everything they reference, so later edits to the tree
/// (archiving, new memos) never alter recorded history. They are created by
/// crystallization, appended by integration, and never mutated.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct MemoryCrystal {
    pub timestamp: DateTime<Utc>,
    pub knowledge: CrystalKnowledge,
    pub elysia_process: CrystalProcess,
}
