//! Dialogue state machine — tracks which slot a session is waiting on.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::routing::Unit;

/// The stages of the intake conversation.
///
/// Progresses linearly: AwaitingName → AwaitingYear → AwaitingQuery →
/// Complete.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DialogueStage {
    AwaitingName,
    AwaitingYear,
    AwaitingQuery,
    Complete,
}

impl DialogueStage {
    /// Check if a transition from `self` to `target` is valid.
    pub fn can_transition_to(&self, target: DialogueStage) -> bool {
        use DialogueStage::*;
        matches!(
            (self, target),
            (AwaitingName, AwaitingYear) | (AwaitingYear, AwaitingQuery) | (AwaitingQuery, Complete)
        )
    }

    /// Whether this stage is terminal (the form is filled).
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Complete)
    }

    /// Get the next stage in the linear progression, if any.
    pub fn next(&self) -> Option<DialogueStage> {
        use DialogueStage::*;
        match self {
            AwaitingName => Some(AwaitingYear),
            AwaitingYear => Some(AwaitingQuery),
            AwaitingQuery => Some(Complete),
            Complete => None,
        }
    }
}

impl Default for DialogueStage {
    fn default() -> Self {
        Self::AwaitingName
    }
}

impl std::fmt::Display for DialogueStage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::AwaitingName => "awaiting_name",
            Self::AwaitingYear => "awaiting_year",
            Self::AwaitingQuery => "awaiting_query",
            Self::Complete => "complete",
        };
        write!(f, "{s}")
    }
}

/// One student's in-progress intake form.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Session {
    pub id: Uuid,
    pub stage: DialogueStage,
    pub student_name: Option<String>,
    pub academic_year: Option<String>,
    pub student_query: Option<String>,
    /// Assigned exactly once, on the turn that completes the form.
    pub routed_unit: Option<Unit>,
    /// Set when the record has been handed off for persistence; prevents
    /// a second record for the same session.
    pub submitted: bool,
    pub created_at: DateTime<Utc>,
    pub last_active_at: DateTime<Utc>,
}

impl Session {
    pub fn new(id: Uuid) -> Self {
        let now = Utc::now();
        Self {
            id,
            stage: DialogueStage::default(),
            student_name: None,
            academic_year: None,
            student_query: None,
            routed_unit: None,
            submitted: false,
            created_at: now,
            last_active_at: now,
        }
    }

    /// Whether any slot has been filled yet.
    pub fn has_any_field(&self) -> bool {
        self.student_name.is_some() || self.academic_year.is_some() || self.student_query.is_some()
    }

    /// Whether all three slots are filled.
    pub fn is_complete(&self) -> bool {
        self.student_name.is_some() && self.academic_year.is_some() && self.student_query.is_some()
    }

    /// Advance the stage past every slot that is already filled.
    ///
    /// Slots can be filled out of prompt order (a first message may carry
    /// both name and year), so this walks the machine forward until it
    /// lands on the first empty slot, or Complete.
    pub fn advance_stage(&mut self) {
        loop {
            let filled = match self.stage {
                DialogueStage::AwaitingName => self.student_name.is_some(),
                DialogueStage::AwaitingYear => self.academic_year.is_some(),
                DialogueStage::AwaitingQuery => self.student_query.is_some(),
                DialogueStage::Complete => false,
            };
            if !filled {
                break;
            }
            match self.stage.next() {
                Some(next) if self.stage.can_transition_to(next) => self.stage = next,
                _ => break,
            }
        }
    }
}
