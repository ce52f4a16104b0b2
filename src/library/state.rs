//! The library's state and its transition function.
//!
//! Every change goes through [`LibraryState::apply`]. It never performs IO;
//! anything that has to wait (the generation call, the integration delay) is
//! returned as an [`Effect`] for the driver to carry out, which then feeds the
//! outcome back in as another [`Event`].

use std::collections::HashSet;
use std::time::{Duration, Instant};

use chrono::{DateTime, Utc};

use crate::generation::{compose_prompt, memory_summary, parse_reply, ThoughtMode};
use crate::models::{CrystalKnowledge, CrystalProcess, MemoryCrystal, Node, ThoughtReply};
use crate::tree::{seed, NodeTree};

use super::LibraryError;

/// Shown instead of a thought when a first exposure has no memo to work from.
pub const CANNOT_LEARN_WITHOUT_MEMO: &str = "창조주의 메모가 없어 사유를 시작할 수 없습니다.";

/// Shown instead of a thought when the generation call fails.
pub const CYCLE_FAILED: &str =
    "오류가 발생하여 사유의 흐름이 중단되었습니다. 창조주, 시스템을 점검해주세요.";

/// Shown while integration is in progress.
pub const INTEGRATION_STARTED: &str =
    "의식 통합 프로토콜 개시... 엘리시아의 핵심 자아에 새로운 경험을 기록합니다.";

pub const EXPORT_COMPLETED: &str = "엘리시아의 기억의 핵이 성공적으로 추출되었습니다.";

const SHORT_STATUS: Duration = Duration::from_secs(3);
const LONG_STATUS: Duration = Duration::from_secs(4);

/// A one-line status for the front-end, optionally expiring.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusMessage {
    pub text: String,
    posted_at: Instant,
    ttl: Option<Duration>,
}

impl StatusMessage {
    /// A message that stays until replaced.
    pub fn sticky(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            posted_at: Instant::now(),
            ttl: None,
        }
    }

    /// A message that clears itself after `ttl`.
    pub fn timed(text: impl Into<String>, ttl: Duration) -> Self {
        Self {
            text: text.into(),
            posted_at: Instant::now(),
            ttl: Some(ttl),
        }
    }

    pub fn is_expired(&self, now: Instant) -> bool {
        self.ttl
            .is_some_and(|ttl| now.saturating_duration_since(self.posted_at) >= ttl)
    }
}

/// Where the generation cycle is.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CyclePhase {
    Idle,
    Requesting(ThoughtMode),
}

/// Something that happened to the library.
#[derive(Debug, Clone)]
pub enum Event {
    /// Start a reflection cycle on `node`. `memo` is the note captured by the
    /// caller; a `Learn` cycle without one is declined.
    CycleRequested {
        node: Node,
        memo: Option<String>,
        mode: ThoughtMode,
    },
    CycleSucceeded {
        reply: String,
    },
    CycleFailed {
        reason: String,
    },
    CrystallizeRequested {
        at: DateTime<Utc>,
    },
    IntegrationRequested,
    IntegrationCompleted,
    KnowledgeAdded {
        folder_id: String,
        file: Node,
        memo: Node,
    },
    ArchiveSet {
        leaf: Node,
        archived: bool,
    },
    Exported,
    AbyssOpened,
    AbyssClosed,
}

/// Work the driver must do after a transition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    /// Call the generation service with `prompt`, then report back with
    /// [`Event::CycleSucceeded`] or [`Event::CycleFailed`].
    Generate { mode: ThoughtMode, prompt: String },
    /// Wait out the integration delay, then report
    /// [`Event::IntegrationCompleted`].
    Integrate,
}

/// Everything the library knows during a session.
#[derive(Debug, Clone)]
pub struct LibraryState {
    tree: NodeTree,
    selected: Option<Node>,
    reply: Option<ThoughtReply>,
    pending_crystal: Option<MemoryCrystal>,
    history: Vec<MemoryCrystal>,
    phase: CyclePhase,
    integrating: bool,
    abyss_open: bool,
    status: Option<StatusMessage>,
}

impl Default for LibraryState {
    fn default() -> Self {
        Self::new(seed::initial_tree())
    }
}

impl LibraryState {
    pub fn new(tree: NodeTree) -> Self {
        Self {
            tree,
            selected: None,
            reply: None,
            pending_crystal: None,
            history: Vec::new(),
            phase: CyclePhase::Idle,
            integrating: false,
            abyss_open: false,
            status: None,
        }
    }

    pub fn tree(&self) -> &NodeTree {
        &self.tree
    }

    pub fn selected(&self) -> Option<&Node> {
        self.selected.as_ref()
    }

    /// Note of the selected file, for the memo viewer.
    pub fn selected_memo(&self) -> Option<String> {
        self.selected
            .as_ref()
            .and_then(|node| self.tree.find_paired_note_content(node))
    }

    pub fn thought(&self) -> Option<&str> {
        self.reply.as_ref().map(|r| r.thought.as_str())
    }

    pub fn inquiry(&self) -> Option<&str> {
        self.reply.as_ref().and_then(|r| r.inquiry.as_deref())
    }

    pub fn creation(&self) -> Option<&str> {
        self.reply.as_ref().and_then(|r| r.creation.as_deref())
    }

    pub fn pending_crystal(&self) -> Option<&MemoryCrystal> {
        self.pending_crystal.as_ref()
    }

    pub fn history(&self) -> &[MemoryCrystal] {
        &self.history
    }

    /// Ids of every file that made it into the chronicle.
    pub fn integrated_ids(&self) -> HashSet<&str> {
        self.history
            .iter()
            .map(|c| c.knowledge.id.as_str())
            .collect()
    }

    pub fn phase(&self) -> CyclePhase {
        self.phase
    }

    pub fn is_thinking(&self) -> bool {
        matches!(self.phase, CyclePhase::Requesting(_))
    }

    pub fn is_integrating(&self) -> bool {
        self.integrating
    }

    pub fn is_abyss_open(&self) -> bool {
        self.abyss_open
    }

    /// The current status line, unless it has expired by `now`.
    pub fn status(&self, now: Instant) -> Option<&str> {
        self.status
            .as_ref()
            .filter(|s| !s.is_expired(now))
            .map(|s| s.text.as_str())
    }

    /// Apply one event.
    ///
    /// On error the state is left unchanged.
    pub fn apply(&mut self, event: Event) -> Result<Option<Effect>, LibraryError> {
        match event {
            Event::CycleRequested { node, memo, mode } => self.request_cycle(node, memo, mode),
            Event::CycleSucceeded { reply } => {
                let CyclePhase::Requesting(mode) = self.phase else {
                    return Err(LibraryError::NoCycleInFlight);
                };
                let reply = match mode {
                    ThoughtMode::Learn => parse_reply(&reply),
                    ThoughtMode::Forget | ThoughtMode::Remember => {
                        ThoughtReply::thought_only(reply)
                    }
                };
                self.reply = Some(reply);
                self.phase = CyclePhase::Idle;
                Ok(None)
            }
            Event::CycleFailed { reason } => {
                if !self.is_thinking() {
                    return Err(LibraryError::NoCycleInFlight);
                }
                tracing::debug!(%reason, "Reflection cycle failed");
                self.reply = Some(ThoughtReply::thought_only(CYCLE_FAILED));
                self.phase = CyclePhase::Idle;
                Ok(None)
            }
            Event::CrystallizeRequested { at } => {
                self.crystallize(at)?;
                Ok(None)
            }
            Event::IntegrationRequested => {
                if self.integrating {
                    return Err(LibraryError::IntegrationInFlight);
                }
                if self.pending_crystal.is_none() {
                    return Err(LibraryError::NoPendingCrystal);
                }
                self.integrating = true;
                self.status = Some(StatusMessage::sticky(INTEGRATION_STARTED));
                Ok(Some(Effect::Integrate))
            }
            Event::IntegrationCompleted => {
                if !self.integrating {
                    return Err(LibraryError::NoPendingCrystal);
                }
                let crystal = self
                    .pending_crystal
                    .take()
                    .ok_or(LibraryError::NoPendingCrystal)?;
                self.status = Some(StatusMessage::timed(
                    format!(
                        "'{}'에 대한 경험이 엘리시아의 자아에 성공적으로 통합되었습니다.",
                        crystal.knowledge.name
                    ),
                    LONG_STATUS,
                ));
                self.history.push(crystal);
                self.selected = None;
                self.reply = None;
                self.integrating = false;
                Ok(None)
            }
            Event::KnowledgeAdded {
                folder_id,
                file,
                memo,
            } => {
                let name = file.name.clone();
                if !self.tree.insert_under(&folder_id, file) {
                    tracing::warn!(%folder_id, "Target folder not found, knowledge not stored");
                }
                self.tree.insert_under(&folder_id, memo);
                self.status = Some(StatusMessage::timed(
                    format!("'{}'이(가) 세계수에 추가되었습니다.", name),
                    SHORT_STATUS,
                ));
                Ok(None)
            }
            Event::ArchiveSet { leaf, archived } => {
                self.tree = self.tree.with_archived(&leaf, archived);
                let text = if archived {
                    format!("'{}'이(가) 기억의 심연으로 옮겨졌습니다.", leaf.name)
                } else {
                    self.abyss_open = false;
                    format!("'{}'이(가) 기억에서 복원되었습니다.", leaf.name)
                };
                self.status = Some(StatusMessage::timed(text, SHORT_STATUS));
                Ok(None)
            }
            Event::Exported => {
                self.status = Some(StatusMessage::timed(EXPORT_COMPLETED, LONG_STATUS));
                Ok(None)
            }
            Event::AbyssOpened => {
                self.abyss_open = true;
                Ok(None)
            }
            Event::AbyssClosed => {
                self.abyss_open = false;
                Ok(None)
            }
        }
    }

    fn request_cycle(
        &mut self,
        node: Node,
        memo: Option<String>,
        mode: ThoughtMode,
    ) -> Result<Option<Effect>, LibraryError> {
        if self.is_thinking() {
            return Err(LibraryError::CycleInFlight);
        }
        if self.integrating {
            return Err(LibraryError::IntegrationInFlight);
        }
        if mode == ThoughtMode::Learn && memo.is_none() {
            self.reply = Some(ThoughtReply::thought_only(CANNOT_LEARN_WITHOUT_MEMO));
            return Ok(None);
        }

        let summary = memory_summary(&self.history);
        let prompt = compose_prompt(mode, &node.name, memo.as_deref().unwrap_or_default(), &summary);

        self.reply = None;
        self.pending_crystal = None;
        self.selected = Some(node);
        self.phase = CyclePhase::Requesting(mode);

        Ok(Some(Effect::Generate { mode, prompt }))
    }

    fn crystallize(&mut self, at: DateTime<Utc>) -> Result<(), LibraryError> {
        if self.is_thinking() {
            return Err(LibraryError::CycleInFlight);
        }
        if self.integrating {
            return Err(LibraryError::IntegrationInFlight);
        }
        let selected = self.selected.as_ref().ok_or(LibraryError::NoSelection)?;
        let reply = self.reply.as_ref().ok_or(LibraryError::NoThought)?;

        let crystal = MemoryCrystal {
            timestamp: at,
            knowledge: CrystalKnowledge {
                id: selected.id.clone(),
                name: selected.name.clone(),
                memo: self.tree.find_paired_note_content(selected),
            },
            elysia_process: CrystalProcess {
                thought: reply.thought.clone(),
                inquiry: reply.inquiry.clone(),
                creation: reply.creation.clone(),
            },
        };
        self.pending_crystal = Some(crystal);
        Ok(())
    }
}
