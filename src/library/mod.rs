//! The library session: state machine plus the async driver that runs its
//! effects.
//!
//! # Cycle
//!
//! A reflection cycle moves `Idle → Requesting → Idle`. Entering `Requesting`
//! clears the previous thought, inquiry, creation and pending crystal. Exactly
//! one generation call is made; its failure becomes a fixed apology in place of
//! the thought and is never retried. A second trigger while a cycle is in
//! flight is rejected with [`LibraryError::CycleInFlight`], and so is any new
//! cycle or crystallization while an integration is pending.
//!
//! After a cycle, the result can be crystallized into a [`MemoryCrystal`] and
//! then integrated, which appends it to the chronicle after a configurable
//! delay and resets the cycle state.

mod error;
mod state;

pub use error::*;
pub use state::*;

use std::path::{Path, PathBuf};
use std::time::Duration;

use chrono::Utc;
use uuid::Uuid;

use crate::config::AppConfig;
use crate::export;
use crate::generation::{GenerationRequest, TextGenerator, ThoughtMode};
use crate::models::{MemoryCrystal, Node};
use crate::tree::memo_name_for;

/// Asked before a file is sent to the abyss.
pub const ARCHIVE_QUESTION: &str =
    "이 지식을 엘리시아의 기억 속 깊은 곳으로 보내시겠습니까? 그녀는 이 기억을 쉽게 떠올리지 못하게 됩니다.";

/// A blocking yes/no question put to the user.
pub trait Confirm {
    fn confirm(&self, question: &str) -> bool;
}

impl<F> Confirm for F
where
    F: Fn(&str) -> bool,
{
    fn confirm(&self, question: &str) -> bool {
        self(question)
    }
}

/// A library session bound to one generation service.
pub struct Library<G> {
    state: LibraryState,
    generator: G,
    model: String,
    integration_delay: Duration,
}

impl<G: TextGenerator> Library<G> {
    pub fn new(state: LibraryState, generator: G, config: &AppConfig) -> Self {
        Self {
            state,
            generator,
            model: config.model.clone(),
            integration_delay: config.integration_delay(),
        }
    }

    pub fn state(&self) -> &LibraryState {
        &self.state
    }

    pub fn generator(&self) -> &G {
        &self.generator
    }

    /// Select a file and start a first-exposure cycle with its memo.
    ///
    /// Archived files cannot be selected until they are restored.
    pub async fn select(&mut self, file_id: &str) -> Result<(), LibraryError> {
        let node = self.knowledge_file(file_id)?;
        if node.is_archived() {
            return Err(LibraryError::Archived(file_id.to_string()));
        }
        let memo = self.state.tree().find_paired_note_content(&node);
        self.run_cycle(node, memo, ThoughtMode::Learn).await
    }

    /// Add a new file and its memo under `folder_id`, then learn it.
    ///
    /// All three inputs must be non-blank. The file keeps the name exactly as
    /// given; the memo is named after it.
    pub async fn add_knowledge(
        &mut self,
        folder_id: &str,
        file_name: &str,
        memo: &str,
    ) -> Result<Node, LibraryError> {
        if file_name.trim().is_empty() {
            return Err(LibraryError::EmptyField("file name"));
        }
        if folder_id.trim().is_empty() {
            return Err(LibraryError::EmptyField("folder"));
        }
        if memo.trim().is_empty() {
            return Err(LibraryError::EmptyField("memo"));
        }

        let file = Node::file(Uuid::new_v4().to_string(), file_name);
        let memo_node = Node::memo(Uuid::new_v4().to_string(), memo_name_for(file_name), memo);

        tracing::info!(folder_id, file_name, "Adding knowledge");
        self.state.apply(Event::KnowledgeAdded {
            folder_id: folder_id.to_string(),
            file: file.clone(),
            memo: memo_node,
        })?;

        self.run_cycle(file.clone(), Some(memo.to_string()), ThoughtMode::Learn)
            .await?;
        Ok(file)
    }

    /// Send a file and its memo to the abyss, then reflect on forgetting it.
    ///
    /// Returns `Ok(false)` without touching anything when the user declines.
    pub async fn archive(&mut self, file_id: &str, confirm: &dyn Confirm) -> Result<bool, LibraryError> {
        let node = self.knowledge_file(file_id)?;
        if node.is_archived() {
            return Err(LibraryError::Archived(file_id.to_string()));
        }
        if !confirm.confirm(ARCHIVE_QUESTION) {
            tracing::info!(file_id, "Archive declined");
            return Ok(false);
        }

        let memo = self.state.tree().find_paired_note_content(&node);
        self.state.apply(Event::ArchiveSet {
            leaf: node.clone(),
            archived: true,
        })?;
        self.reflect_on_archive(node, memo, ThoughtMode::Forget).await?;
        Ok(true)
    }

    /// Bring a file and its memo back from the abyss, then reflect on
    /// remembering it. Closes the abyss view.
    pub async fn restore(&mut self, file_id: &str) -> Result<(), LibraryError> {
        let node = self.knowledge_file(file_id)?;
        if !node.is_archived() {
            return Err(LibraryError::NotArchived(file_id.to_string()));
        }
        let memo = self.state.tree().find_paired_note_content(&node);
        self.state.apply(Event::ArchiveSet {
            leaf: node.clone(),
            archived: false,
        })?;
        self.reflect_on_archive(node, memo, ThoughtMode::Remember).await
    }

    /// Snapshot the current result into a pending crystal.
    pub fn crystallize(&mut self) -> Result<&MemoryCrystal, LibraryError> {
        self.state
            .apply(Event::CrystallizeRequested { at: Utc::now() })?;
        self.state
            .pending_crystal()
            .ok_or(LibraryError::NoPendingCrystal)
    }

    /// Integrate the pending crystal into the chronicle.
    ///
    /// The crystal is appended after the configured delay, and the selection
    /// and result fields are cleared with it.
    pub async fn integrate(&mut self) -> Result<(), LibraryError> {
        if let Some(Effect::Integrate) = self.state.apply(Event::IntegrationRequested)? {
            tracing::info!(delay_ms = self.integration_delay.as_millis() as u64, "Integrating memory crystal");
            tokio::time::sleep(self.integration_delay).await;
            self.state.apply(Event::IntegrationCompleted)?;
            tracing::info!(entries = self.state.history().len(), "Integration complete");
        }
        Ok(())
    }

    /// Write the tree and chronicle to `path` as JSON.
    pub fn export(&mut self, path: &Path) -> anyhow::Result<PathBuf> {
        export::write_core_memory(path, self.state.tree(), self.state.history())?;
        self.state.apply(Event::Exported)?;
        tracing::info!(path = %path.display(), "Core memory exported");
        Ok(path.to_path_buf())
    }

    pub fn open_abyss(&mut self) -> Vec<Node> {
        // Neither abyss event can fail.
        let _ = self.state.apply(Event::AbyssOpened);
        self.state
            .tree()
            .archived_leaves()
            .into_iter()
            .cloned()
            .collect()
    }

    pub fn close_abyss(&mut self) {
        let _ = self.state.apply(Event::AbyssClosed);
    }

    /// Look up a non-memo file by id.
    fn knowledge_file(&self, id: &str) -> Result<Node, LibraryError> {
        let node = self
            .state
            .tree()
            .find(id)
            .ok_or_else(|| LibraryError::NodeNotFound(id.to_string()))?;
        if node.is_folder() || node.is_memo() {
            return Err(LibraryError::NotAFile(id.to_string()));
        }
        Ok(node.clone())
    }

    /// Archive changes stand even when their reflection cannot run.
    async fn reflect_on_archive(
        &mut self,
        node: Node,
        memo: Option<String>,
        mode: ThoughtMode,
    ) -> Result<(), LibraryError> {
        match self.run_cycle(node, memo, mode).await {
            Err(e @ (LibraryError::CycleInFlight | LibraryError::IntegrationInFlight)) => {
                tracing::warn!(mode = mode.as_str(), reason = %e, "Reflection skipped");
                Ok(())
            }
            other => other,
        }
    }

    async fn run_cycle(
        &mut self,
        node: Node,
        memo: Option<String>,
        mode: ThoughtMode,
    ) -> Result<(), LibraryError> {
        let name = node.name.clone();
        let effect = self.state.apply(Event::CycleRequested { node, memo, mode })?;
        let Some(Effect::Generate { prompt, .. }) = effect else {
            tracing::warn!(node = %name, "Cannot learn without a memo");
            return Ok(());
        };

        tracing::info!(node = %name, mode = mode.as_str(), "Reflection cycle started");
        let request = GenerationRequest {
            model: self.model.clone(),
            prompt,
        };

        let outcome = match self.generator.generate(&request).await {
            Ok(reply) => Event::CycleSucceeded { reply },
            Err(e) => {
                tracing::error!(error = %e, node = %name, "Error during reflection cycle");
                Event::CycleFailed {
                    reason: e.to_string(),
                }
            }
        };
        self.state.apply(outcome)?;
        tracing::info!(node = %name, "Reflection cycle finished");
        Ok(())
    }
}
