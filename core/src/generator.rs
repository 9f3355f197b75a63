//! Deterministic random scenarios.
//!
//! RULE: nothing here may call a platform RNG. All randomness flows through
//! one `ScenarioRng` seeded from the caller's seed, so the same
//! `(topology, seed, steps)` always authors the same events.
//!
//! Generated scenarios go through `EventStore::add`, so they obey the same
//! state domains and section derivation as hand-authored ones.

use crate::{
    error::SandboxResult,
    event::EntityKind,
    states::{allowed_states, SignalKind},
    store::EventStore,
    topology::TopologyGraph,
    types::{StateCode, Tick},
};
use rand::{RngCore, SeedableRng};
use rand_pcg::Pcg64Mcg;

/// Upper bound on events authored per generated step.
const MAX_EVENTS_PER_STEP: u64 = 4;

/// A seeded PCG stream.
pub struct ScenarioRng {
    inner: Pcg64Mcg,
}

impl ScenarioRng {
    pub fn new(seed: u64) -> Self {
        Self { inner: Pcg64Mcg::seed_from_u64(seed) }
    }

    /// Roll a u64 in [0, n). `n == 0` yields 0.
    pub fn next_u64_below(&mut self, n: u64) -> u64 {
        if n == 0 {
            return 0;
        }
        self.inner.next_u64() % n
    }

    pub fn pick<'a, T>(&mut self, items: &'a [T]) -> Option<&'a T> {
        let index = self.next_u64_below(items.len() as u64) as usize;
        items.get(index)
    }
}

/// Every authorable entity of a topology with its state domain.
fn candidates(topology: &TopologyGraph) -> Vec<(EntityKind, String, &'static [StateCode])> {
    let mut out = Vec::new();
    for name in topology.sections() {
        out.push((EntityKind::Rc, name.to_string(), allowed_states(EntityKind::Rc, SignalKind::Train)));
    }
    for (name, _) in topology.switches() {
        out.push((EntityKind::Switch, name.to_string(), allowed_states(EntityKind::Switch, SignalKind::Train)));
    }
    for (name, kind) in topology.signals() {
        out.push((EntityKind::Signal, name.to_string(), allowed_states(EntityKind::Signal, kind)));
    }
    for name in topology.linked_indicators() {
        out.push((EntityKind::Indicator, name.to_string(), allowed_states(EntityKind::Indicator, SignalKind::Train)));
    }
    out
}

/// Author `steps` random steps at `t = 1..=steps`.
///
/// Each step touches between one and `MAX_EVENTS_PER_STEP` entities. A
/// topology without entities gives an empty store.
pub fn generate_scenario(topology: &TopologyGraph, seed: u64, steps: Tick) -> SandboxResult<EventStore> {
    let mut rng = ScenarioRng::new(seed);
    let mut store = EventStore::new();
    let pool = candidates(topology);
    if pool.is_empty() {
        log::warn!("generator: topology has no entities, scenario left empty");
        return Ok(store);
    }

    for t in 1..=steps {
        let count = 1 + rng.next_u64_below(MAX_EVENTS_PER_STEP);
        for _ in 0..count {
            let Some((kind, name, domain)) = rng.pick(&pool) else { continue };
            let Some(&state) = rng.pick(*domain) else { continue };
            store.add(topology, *kind, name, t, state)?;
        }
    }

    log::info!(
        "generated scenario: seed={seed}, {steps} steps, {} events",
        store.len()
    );
    Ok(store)
}
