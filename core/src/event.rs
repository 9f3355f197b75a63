//! Authored state-change events: the sole mutable input of the sandbox.
//!
//! RULE: events are the source of truth. Every projected state is derived
//! from the event list and the topology; nothing else is ever stored.

use crate::{
    names::{IndicatorName, SectionName, SignalName, SwitchName},
    types::{EventId, StagedId, StateCode, Tick},
};
use serde::{Deserialize, Serialize};
use std::fmt;

/// The four kinds of field object an event can target.
/// Declaration order is the order entities are diffed and exported in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityKind {
    Rc,
    Switch,
    Signal,
    Indicator,
}

impl EntityKind {
    pub const ALL: [EntityKind; 4] = [
        EntityKind::Rc,
        EntityKind::Switch,
        EntityKind::Signal,
        EntityKind::Indicator,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Rc        => "rc",
            Self::Switch    => "switch",
            Self::Signal    => "signal",
            Self::Indicator => "indicator",
        }
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A canonical reference to one field object.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum EntityRef {
    Rc(SectionName),
    Switch(SwitchName),
    Signal(SignalName),
    Indicator(IndicatorName),
}

impl EntityRef {
    /// Normalise `raw` with the rule for `kind`.
    pub fn new(kind: EntityKind, raw: &str) -> Self {
        match kind {
            EntityKind::Rc        => Self::Rc(SectionName::new(raw)),
            EntityKind::Switch    => Self::Switch(SwitchName::new(raw)),
            EntityKind::Signal    => Self::Signal(SignalName::new(raw)),
            EntityKind::Indicator => Self::Indicator(IndicatorName::new(raw)),
        }
    }

    pub fn kind(&self) -> EntityKind {
        match self {
            Self::Rc(_)        => EntityKind::Rc,
            Self::Switch(_)    => EntityKind::Switch,
            Self::Signal(_)    => EntityKind::Signal,
            Self::Indicator(_) => EntityKind::Indicator,
        }
    }

    pub fn name(&self) -> &str {
        match self {
            Self::Rc(n)        => n.as_str(),
            Self::Switch(n)    => n.as_str(),
            Self::Signal(n)    => n.as_str(),
            Self::Indicator(n) => n.as_str(),
        }
    }
}

impl fmt::Display for EntityRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.kind(), self.name())
    }
}

/// A committed event. Ordering key is `(t, id)`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScenarioEvent {
    pub id:     EventId,
    pub t:      Tick,
    pub entity: EntityRef,
    pub state:  StateCode,
}

impl ScenarioEvent {
    pub fn order_key(&self) -> (Tick, EventId) {
        (self.t, self.id)
    }

    /// Events sharing this key may not coexist in the store.
    pub fn compaction_key(&self) -> (Tick, &EntityRef) {
        (self.t, &self.entity)
    }
}

/// An entry of the staged batch, not yet part of the timeline.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StagedEvent {
    pub sid:    StagedId,
    pub t:      Tick,
    pub entity: EntityRef,
    pub state:  StateCode,
}

/// An event as it travels between the codec and the store, before it has
/// been assigned an id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EventDraft {
    pub t:      Tick,
    pub entity: EntityRef,
    pub state:  StateCode,
}
