//! Per-run state machine.
//!
//! ```text
//! Pending -> Interpreting -> Analyzing -> Scoring -> Synthesizing -> Done
//!                  \____________\____________\___________\-----> Failed(stage)
//! ```

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::stage::Stage;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "state", content = "stage", rename_all = "snake_case")]
pub enum RunState {
    Pending,
    Interpreting,
    Analyzing,
    Scoring,
    Synthesizing,
    Done,
    Failed(Stage),
}

impl RunState {
    pub fn is_terminal(self) -> bool {
        matches!(self, RunState::Done | RunState::Failed(_))
    }

    /// The state that must follow this one on a successful run.
    fn successor(self) -> Option<RunState> {
        match self {
            RunState::Pending => Some(RunState::Interpreting),
            RunState::Interpreting => Some(RunState::Analyzing),
            RunState::Analyzing => Some(RunState::Scoring),
            RunState::Scoring => Some(RunState::Synthesizing),
            RunState::Synthesizing => Some(RunState::Done),
            RunState::Done | RunState::Failed(_) => None,
        }
    }
}

impl fmt::Display for RunState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RunState::Pending => f.write_str("PENDING"),
            RunState::Interpreting => f.write_str("INTERPRETING"),
            RunState::Analyzing => f.write_str("ANALYZING"),
            RunState::Scoring => f.write_str("SCORING"),
            RunState::Synthesizing => f.write_str("SYNTHESIZING"),
            RunState::Done => f.write_str("DONE"),
            RunState::Failed(stage) => write!(f, "FAILED({})", stage),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("invalid run transition {from} -> {to}")]
pub struct InvalidTransition {
    pub from: RunState,
    pub to: RunState,
}

/// Tracks one run's state and every state it passed through.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunStateMachine {
    history: Vec<RunState>,
}

impl Default for RunStateMachine {
    fn default() -> Self {
        Self::new()
    }
}

impl RunStateMachine {
    pub fn new() -> Self {
        Self {
            history: vec![RunState::Pending],
        }
    }

    pub fn state(&self) -> RunState {
        self.history
            .last()
            .copied()
            .unwrap_or(RunState::Pending)
    }

    pub fn history(&self) -> &[RunState] {
        &self.history
    }

    /// Move to `next`. Only the successor state or `Failed` from a
    /// non-terminal state is accepted.
    pub fn transition(&mut self, next: RunState) -> Result<(), InvalidTransition> {
        let current = self.state();
        let allowed = match next {
            RunState::Failed(_) => !current.is_terminal(),
            _ => current.successor() == Some(next),
        };
        if !allowed {
            return Err(InvalidTransition {
                from: current,
                to: next,
            });
        }
        self.history.push(next);
        Ok(())
    }

    pub fn fail(&mut self, stage: Stage) -> Result<(), InvalidTransition> {
        self.transition(RunState::Failed(stage))
    }
}
