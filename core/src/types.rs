//! Shared primitive types used across the entire sandbox.

/// A timeline tick. Event times and step gaps are whole ticks.
pub type Tick = u64;

/// A stable, unique identifier for a committed event.
pub type EventId = u64;

/// A stable identifier for an entry in the staged batch.
pub type StagedId = u64;

/// A numeric interlocking state code as reported by the field equipment.
pub type StateCode = u16;
