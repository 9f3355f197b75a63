use thiserror::Error;

use crate::{
    event::EntityKind,
    types::{EventId, StagedId, StateCode, Tick},
};

#[derive(Error, Debug)]
pub enum SandboxError {
    #[error("State {state} is not allowed for {kind} '{name}' (allowed: {allowed:?})")]
    InvalidState {
        kind:    EntityKind,
        name:    String,
        state:   StateCode,
        allowed: Vec<StateCode>,
    },

    #[error("Empty {kind} name")]
    EmptyName { kind: EntityKind },

    #[error("Event {id} not found")]
    EventNotFound { id: EventId },

    #[error("Staged event {id} not found")]
    StagedEventNotFound { id: StagedId },

    #[error("Step t={t} has no events")]
    EmptyStep { t: Tick },

    #[error("Staged batch is empty")]
    EmptyBatch,

    #[error("Timeline has no steps")]
    EmptyTimeline,

    #[error("No step fits after t={t}")]
    TimeOverflow { t: Tick },

    #[error("Malformed scenario JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Scenario has neither events nor steps")]
    NothingToImport,
}

pub type SandboxResult<T> = Result<T, SandboxError>;
