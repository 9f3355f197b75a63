//! The event store: committed timeline plus the staged batch.
//!
//! RULES:
//!   - Only the store mutates events. Everything else reads `events()`.
//!   - Every mutation ends with compaction: at most one event per
//!     `(t, entity)`, the later one wins, order is `(t, id)`.
//!   - A rejected operation leaves the store exactly as it was.
//!   - The staged batch shares one pinned time and reaches the timeline only
//!     through `commit_batch`, all entries at once.

use crate::{
    error::{SandboxError, SandboxResult},
    event::{EntityKind, EntityRef, EventDraft, ScenarioEvent, StagedEvent},
    states::{allowed_states, batch_reset_state, rc_state_from_switch_state, SignalKind},
    topology::TopologyGraph,
    types::{EventId, StagedId, StateCode, Tick},
};
use std::collections::{BTreeSet, HashMap};

/// One distinct timeline time and how long it lasts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StepWindow {
    pub start: Tick,
    pub end:   Tick,
    pub dt:    Tick,
}

#[derive(Debug, Clone)]
pub struct EventStore {
    events:         Vec<ScenarioEvent>,
    staged:         Vec<StagedEvent>,
    staged_t:       Option<Tick>,
    next_event_id:  EventId,
    next_staged_id: StagedId,
}

impl Default for EventStore {
    fn default() -> Self { Self::new() }
}

/// Check `state` against the domain of `entity`.
pub fn validate_state(
    topology: &TopologyGraph,
    entity:   &EntityRef,
    state:    StateCode,
) -> SandboxResult<()> {
    let kind = entity.kind();
    if entity.name().is_empty() {
        return Err(SandboxError::EmptyName { kind });
    }
    let signal_kind = match entity {
        EntityRef::Signal(name) => topology.signal_kind(name),
        _ => SignalKind::Train,
    };
    let allowed = allowed_states(kind, signal_kind);
    if allowed.contains(&state) {
        Ok(())
    } else {
        Err(SandboxError::InvalidState {
            kind,
            name: entity.name().to_string(),
            state,
            allowed: allowed.to_vec(),
        })
    }
}

/// Section entry implied by a switch entry, when the topology knows the
/// switch's section and the code implies a section state.
fn derived_section_entry(
    topology: &TopologyGraph,
    entity:   &EntityRef,
    state:    StateCode,
) -> Option<(EntityRef, StateCode)> {
    let EntityRef::Switch(sw) = entity else { return None };
    let section = topology.section_of(sw)?;
    let rc_state = rc_state_from_switch_state(state)?;
    Some((EntityRef::Rc(section.clone()), rc_state))
}

/// Indices of the entries that survive compaction: the last occurrence of
/// each key.
fn survivors<T, K: std::hash::Hash + Eq>(items: &[T], key: impl Fn(&T) -> K) -> Vec<bool> {
    let mut last: HashMap<K, usize> = HashMap::new();
    for (i, item) in items.iter().enumerate() {
        last.insert(key(item), i);
    }
    items
        .iter()
        .enumerate()
        .map(|(i, item)| last.get(&key(item)) == Some(&i))
        .collect()
}

impl EventStore {
    pub fn new() -> Self {
        Self {
            events:         Vec::new(),
            staged:         Vec::new(),
            staged_t:       None,
            next_event_id:  1,
            next_staged_id: 1,
        }
    }

    // ── Committed events ──────────────────────────────────────────

    /// All committed events in `(t, id)` order.
    pub fn events(&self) -> &[ScenarioEvent] {
        &self.events
    }

    pub fn get(&self, id: EventId) -> Option<&ScenarioEvent> {
        self.events.iter().find(|e| e.id == id)
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn add(
        &mut self,
        topology: &TopologyGraph,
        kind:     EntityKind,
        name:     &str,
        t:        Tick,
        state:    StateCode,
    ) -> SandboxResult<EventId> {
        let entity = EntityRef::new(kind, name);
        validate_state(topology, &entity, state)?;

        let derived = derived_section_entry(topology, &entity, state);
        log::debug!("add {entity}={state} @t={t}");
        let id = self.push(t, entity, state);
        if let Some((section, rc_state)) = derived {
            self.upsert(t, section, rc_state);
        }
        self.compact();
        Ok(id)
    }

    pub fn edit(
        &mut self,
        topology:  &TopologyGraph,
        id:        EventId,
        new_state: StateCode,
    ) -> SandboxResult<()> {
        let event = self.get(id).ok_or(SandboxError::EventNotFound { id })?;
        validate_state(topology, &event.entity, new_state)?;

        let t = event.t;
        let derived = derived_section_entry(topology, &event.entity, new_state);
        if let Some(event) = self.events.iter_mut().find(|e| e.id == id) {
            log::debug!("edit #{id} {}: {} -> {new_state}", event.entity, event.state);
            event.state = new_state;
        }
        if let Some((section, rc_state)) = derived {
            self.upsert(t, section, rc_state);
        }
        self.compact();
        Ok(())
    }

    pub fn delete(&mut self, id: EventId) -> SandboxResult<ScenarioEvent> {
        let index = self
            .events
            .iter()
            .position(|e| e.id == id)
            .ok_or(SandboxError::EventNotFound { id })?;
        let removed = self.events.remove(index);
        log::debug!("delete #{id} {}", removed.entity);
        Ok(removed)
    }

    /// Copy one event to `target_t`. The copy replaces any event for the
    /// same entity already at `target_t`.
    pub fn duplicate(&mut self, id: EventId, target_t: Tick) -> SandboxResult<EventId> {
        let source = self.get(id).ok_or(SandboxError::EventNotFound { id })?;
        let (entity, state) = (source.entity.clone(), source.state);
        let new_id = self.push(target_t, entity, state);
        self.compact();
        Ok(new_id)
    }

    /// Copy every event at `source_t` to `target_t`.
    pub fn duplicate_step(&mut self, source_t: Tick, target_t: Tick) -> SandboxResult<Vec<EventId>> {
        let source: Vec<(EntityRef, StateCode)> = self
            .events_at(source_t)
            .map(|e| (e.entity.clone(), e.state))
            .collect();
        if source.is_empty() {
            return Err(SandboxError::EmptyStep { t: source_t });
        }
        let ids: Vec<EventId> = source
            .into_iter()
            .map(|(entity, state)| self.push(target_t, entity, state))
            .collect();
        self.compact();
        log::debug!("step t={source_t} duplicated to t={target_t}");
        Ok(ids)
    }

    /// Copy step `source_t` to a fresh step after the last one.
    pub fn duplicate_step_to_next(&mut self, source_t: Tick) -> SandboxResult<Tick> {
        let target = self.next_step_time()?;
        self.duplicate_step(source_t, target)?;
        Ok(target)
    }

    /// Replace the whole timeline (used by import). Staging is discarded.
    pub fn replace_all(&mut self, drafts: Vec<EventDraft>) {
        self.events.clear();
        self.discard_batch();
        for draft in drafts {
            self.push(draft.t, draft.entity, draft.state);
        }
        self.compact();
        log::info!("timeline replaced: {} events", self.events.len());
    }

    pub fn clear(&mut self) {
        *self = Self::new();
    }

    // ── Timeline queries ──────────────────────────────────────────

    pub fn events_at(&self, t: Tick) -> impl Iterator<Item = &ScenarioEvent> {
        self.events.iter().filter(move |e| e.t == t)
    }

    pub fn distinct_times(&self) -> Vec<Tick> {
        let times: BTreeSet<Tick> = self.events.iter().map(|e| e.t).collect();
        times.into_iter().collect()
    }

    pub fn max_time(&self) -> Option<Tick> {
        self.events.iter().map(|e| e.t).max()
    }

    /// One window per distinct time; the last lasts one tick.
    pub fn step_windows(&self) -> Vec<StepWindow> {
        let times = self.distinct_times();
        times
            .iter()
            .enumerate()
            .map(|(i, &start)| {
                let end = times.get(i + 1).copied().unwrap_or(start.saturating_add(1));
                StepWindow { start, end, dt: end - start }
            })
            .collect()
    }

    /// Latest event time strictly before `cursor`, else the first time.
    pub fn previous_time_before(&self, cursor: Tick) -> Option<Tick> {
        let times = self.distinct_times();
        let first = *times.first()?;
        Some(times.into_iter().take_while(|&t| t < cursor).last().unwrap_or(first))
    }

    pub fn next_time_after(&self, cursor: Tick) -> Option<Tick> {
        self.distinct_times().into_iter().find(|&t| t > cursor)
    }

    /// Advance the cursor by one tick, never past the last event.
    pub fn step_forward(&self, cursor: Tick) -> Tick {
        cursor.saturating_add(1).min(self.max_time().unwrap_or(0))
    }

    /// The tick right after the last event (1 on an empty timeline).
    pub fn next_step_time(&self) -> SandboxResult<Tick> {
        let last = self.max_time().unwrap_or(0);
        last.checked_add(1).ok_or(SandboxError::TimeOverflow { t: last })
    }

    // ── Staged batch ──────────────────────────────────────────────

    pub fn staged(&self) -> &[StagedEvent] {
        &self.staged
    }

    /// Time the batch is pinned to, if it has entries.
    pub fn staged_time(&self) -> Option<Tick> {
        self.staged_t
    }

    /// Stage one entry. The first entry pins the batch to `requested_t`;
    /// later entries adopt the pinned time. Returns the time used.
    pub fn stage(
        &mut self,
        topology:    &TopologyGraph,
        kind:        EntityKind,
        name:        &str,
        requested_t: Tick,
        state:       StateCode,
    ) -> SandboxResult<Tick> {
        let entity = EntityRef::new(kind, name);
        validate_state(topology, &entity, state)?;

        let t = *self.staged_t.get_or_insert(requested_t);
        if t != requested_t {
            log::debug!("batch already pinned to t={t}; {entity} staged there");
        }
        let derived = derived_section_entry(topology, &entity, state);
        self.push_staged(t, entity, state);
        if let Some((section, rc_state)) = derived {
            self.push_staged(t, section, rc_state);
        }
        self.compact_staged();
        Ok(t)
    }

    pub fn edit_staged(
        &mut self,
        topology: &TopologyGraph,
        sid:      StagedId,
        state:    StateCode,
    ) -> SandboxResult<()> {
        let entry = self
            .staged
            .iter()
            .find(|e| e.sid == sid)
            .ok_or(SandboxError::StagedEventNotFound { id: sid })?;
        validate_state(topology, &entry.entity, state)?;

        let (t, derived) = (entry.t, derived_section_entry(topology, &entry.entity, state));
        if let Some(entry) = self.staged.iter_mut().find(|e| e.sid == sid) {
            entry.state = state;
        }
        if let Some((section, rc_state)) = derived {
            match self.staged.iter_mut().find(|e| e.entity == section) {
                Some(existing) => existing.state = rc_state,
                None => self.push_staged(t, section, rc_state),
            }
        }
        self.compact_staged();
        Ok(())
    }

    pub fn remove_staged(&mut self, sid: StagedId) -> SandboxResult<StagedEvent> {
        let index = self
            .staged
            .iter()
            .position(|e| e.sid == sid)
            .ok_or(SandboxError::StagedEventNotFound { id: sid })?;
        let removed = self.staged.remove(index);
        self.compact_staged();
        Ok(removed)
    }

    /// Move every staged entry into the timeline and clear the batch.
    /// An empty batch is a no-op.
    pub fn commit_batch(&mut self) -> Vec<EventId> {
        if self.staged.is_empty() {
            return Vec::new();
        }
        let staged = std::mem::take(&mut self.staged);
        self.staged_t = None;
        let ids: Vec<EventId> = staged
            .into_iter()
            .map(|e| self.push(e.t, e.entity, e.state))
            .collect();
        self.compact();
        log::info!("batch committed: {} events", ids.len());
        ids
    }

    pub fn discard_batch(&mut self) {
        self.staged.clear();
        self.staged_t = None;
    }

    /// Replace the batch with a copy of step `source_t`, pinned to a fresh
    /// step after the last one.
    pub fn stage_step_copy(&mut self, source_t: Tick) -> SandboxResult<Tick> {
        let source: Vec<(EntityRef, StateCode)> = self
            .events_at(source_t)
            .map(|e| (e.entity.clone(), e.state))
            .collect();
        if source.is_empty() {
            return Err(SandboxError::EmptyStep { t: source_t });
        }
        let target = self.next_step_time()?;
        self.discard_batch();
        self.staged_t = Some(target);
        for (entity, state) in source {
            self.push_staged(target, entity, state);
        }
        self.compact_staged();
        Ok(target)
    }

    /// `stage_step_copy` of the last step.
    pub fn stage_previous_step(&mut self) -> SandboxResult<Tick> {
        let last = self.max_time().ok_or(SandboxError::EmptyTimeline)?;
        self.stage_step_copy(last)
    }

    /// Re-pin the batch to the step after both the timeline and the batch.
    pub fn clone_batch_to_next_step(&mut self) -> SandboxResult<Tick> {
        if self.staged.is_empty() {
            return Err(SandboxError::EmptyBatch);
        }
        let base = self.max_time().unwrap_or(0).max(self.staged_t.unwrap_or(0));
        let target = base.checked_add(1).ok_or(SandboxError::TimeOverflow { t: base })?;
        let entries = std::mem::take(&mut self.staged);
        for entry in entries {
            self.push_staged(target, entry.entity, entry.state);
        }
        self.staged_t = Some(target);
        self.compact_staged();
        Ok(target)
    }

    /// Reset every staged entry to its kind's reset code.
    pub fn reset_batch_states(&mut self) -> SandboxResult<()> {
        if self.staged.is_empty() {
            return Err(SandboxError::EmptyBatch);
        }
        for entry in &mut self.staged {
            entry.state = batch_reset_state(entry.entity.kind());
        }
        Ok(())
    }

    /// Discard the batch and return the time a new step should be authored at.
    pub fn open_next_step(&mut self) -> SandboxResult<Tick> {
        let target = self.next_step_time()?;
        self.discard_batch();
        Ok(target)
    }

    // ── Internals ─────────────────────────────────────────────────

    fn push(&mut self, t: Tick, entity: EntityRef, state: StateCode) -> EventId {
        let id = self.next_event_id;
        self.next_event_id += 1;
        self.events.push(ScenarioEvent { id, t, entity, state });
        id
    }

    fn push_staged(&mut self, t: Tick, entity: EntityRef, state: StateCode) {
        let sid = self.next_staged_id;
        self.next_staged_id += 1;
        self.staged.push(StagedEvent { sid, t, entity, state });
    }

    fn upsert(&mut self, t: Tick, entity: EntityRef, state: StateCode) {
        match self.events.iter_mut().find(|e| e.t == t && e.entity == entity) {
            Some(existing) => existing.state = state,
            None => {
                self.push(t, entity, state);
            }
        }
    }

    fn compact(&mut self) {
        let keep = survivors(&self.events, |e| (e.t, e.entity.clone()));
        let before = self.events.len();
        let mut flags = keep.into_iter();
        self.events.retain(|_| flags.next().unwrap_or(true));
        self.events.sort_by_key(|e| e.order_key());
        if self.events.len() != before {
            log::debug!("compaction dropped {} events", before - self.events.len());
        }
    }

    fn compact_staged(&mut self) {
        let keep = survivors(&self.staged, |e| (e.t, e.entity.clone()));
        let mut flags = keep.into_iter();
        self.staged.retain(|_| flags.next().unwrap_or(true));
        self.staged.sort_by_key(|e| e.sid);
        if self.staged.is_empty() {
            self.staged_t = None;
        }
    }
}
