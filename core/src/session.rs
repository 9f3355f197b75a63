//! The editor session: one immutable topology, one event store, one header.
//!
//! RULES:
//!   - The topology is injected once and never mutated.
//!   - The store is the only mutable member; every read is recomputed.
//!   - Import is all-or-nothing: the text is fully parsed before the store
//!     is touched.

use crate::{
    appearance::{appearance, LayoutAppearance},
    codec::{self, ExportForm, ScenarioDocument, ScenarioHeader},
    error::SandboxResult,
    event::{EntityKind, ScenarioEvent, StagedEvent},
    snapshot::{project, state_maps_at, Projection, StateMaps},
    store::EventStore,
    topology::TopologyGraph,
    types::{EventId, StagedId, StateCode, Tick},
};

pub struct ScenarioSession {
    topology: TopologyGraph,
    store:    EventStore,
    header:   ScenarioHeader,
}

impl ScenarioSession {
    pub fn new(topology: TopologyGraph) -> Self {
        let mut header = ScenarioHeader::default();
        if let Some(station) = topology.station() {
            header.station = station.to_string();
        }
        Self {
            topology,
            store: EventStore::new(),
            header,
        }
    }

    /// Session over an already authored store (e.g. a generated scenario).
    pub fn with_store(topology: TopologyGraph, store: EventStore) -> Self {
        let mut session = Self::new(topology);
        session.store = store;
        session
    }

    pub fn topology(&self) -> &TopologyGraph {
        &self.topology
    }

    pub fn store(&self) -> &EventStore {
        &self.store
    }

    pub fn store_mut(&mut self) -> &mut EventStore {
        &mut self.store
    }

    pub fn header(&self) -> &ScenarioHeader {
        &self.header
    }

    pub fn header_mut(&mut self) -> &mut ScenarioHeader {
        &mut self.header
    }

    pub fn events(&self) -> &[ScenarioEvent] {
        self.store.events()
    }

    // ── Authoring ─────────────────────────────────────────────────

    pub fn add(&mut self, kind: EntityKind, name: &str, t: Tick, state: StateCode) -> SandboxResult<EventId> {
        self.store.add(&self.topology, kind, name, t, state)
    }

    pub fn edit(&mut self, id: EventId, state: StateCode) -> SandboxResult<()> {
        self.store.edit(&self.topology, id, state)
    }

    pub fn delete(&mut self, id: EventId) -> SandboxResult<ScenarioEvent> {
        self.store.delete(id)
    }

    pub fn duplicate(&mut self, id: EventId, target_t: Tick) -> SandboxResult<EventId> {
        self.store.duplicate(id, target_t)
    }

    pub fn duplicate_step(&mut self, source_t: Tick, target_t: Tick) -> SandboxResult<Vec<EventId>> {
        self.store.duplicate_step(source_t, target_t)
    }

    pub fn stage(&mut self, kind: EntityKind, name: &str, t: Tick, state: StateCode) -> SandboxResult<Tick> {
        self.store.stage(&self.topology, kind, name, t, state)
    }

    pub fn edit_staged(&mut self, sid: StagedId, state: StateCode) -> SandboxResult<()> {
        self.store.edit_staged(&self.topology, sid, state)
    }

    pub fn staged(&self) -> &[StagedEvent] {
        self.store.staged()
    }

    pub fn commit_batch(&mut self) -> Vec<EventId> {
        self.store.commit_batch()
    }

    pub fn discard_batch(&mut self) {
        self.store.discard_batch()
    }

    // ── Derived views ─────────────────────────────────────────────

    pub fn state_maps_at(&self, t: Tick) -> StateMaps {
        state_maps_at(&self.topology, self.store.events(), t)
    }

    pub fn project(&self, t: Tick) -> Projection {
        project(&self.topology, self.store.events(), t)
    }

    pub fn appearance_at(&self, t: Tick) -> LayoutAppearance {
        appearance(&self.topology, &self.project(t))
    }

    // ── Exchange ──────────────────────────────────────────────────

    pub fn export(&self, form: ExportForm) -> ScenarioDocument {
        codec::export_document(&self.header, &self.topology, self.store.events(), form)
    }

    pub fn export_json(&self, form: ExportForm) -> SandboxResult<String> {
        Ok(serde_json::to_string_pretty(&self.export(form))?)
    }

    /// Replace header and timeline from scenario text. On error nothing
    /// changes. Returns the number of events after compaction.
    pub fn import_json(&mut self, text: &str) -> SandboxResult<usize> {
        let imported = codec::import(text)?;
        self.header = imported.header;
        self.store.replace_all(imported.drafts);
        Ok(self.store.len())
    }
}
