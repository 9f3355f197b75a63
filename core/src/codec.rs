//! Scenario serialization toward the external simulator.
//!
//! Two wire shapes share one document:
//!   - event form: `events: [{t, kind, name, state}]`, lossless;
//!   - step form:  `steps: [{t, rc_states, switch_states, signal_states,
//!     indicator_states}]`, one FULL snapshot per distinct event time with
//!     `t` holding the gap to the previous time (the first step holds its
//!     absolute time). This is the shape the simulator consumes.
//!
//! Export of steps emits snapshots; import of steps diffs consecutive
//! cumulative snapshots back into events. The pair is an inverse in
//! projected state only, not in event granularity or ids.

use crate::{
    error::{SandboxError, SandboxResult},
    event::{EntityKind, EntityRef, EventDraft, ScenarioEvent},
    lenient::parse_lenient,
    names::{IndicatorName, SectionName, SignalName, SwitchName},
    snapshot::state_maps_at,
    topology::TopologyGraph,
    types::{StateCode, Tick},
};
use serde::{de::Error as _, Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};
use std::collections::{BTreeMap, BTreeSet};
use std::str::FromStr;

pub const DEFAULT_STATION: &str = "Visochino";

fn default_station() -> String { DEFAULT_STATION.to_string() }
fn default_dt() -> f64 { 1.0 }

// ── Wire types ────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScenarioDocument {
    #[serde(default = "default_station")]
    pub station: String,
    #[serde(default = "default_dt")]
    pub dt:      f64,
    #[serde(default)]
    pub options: Map<String, Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub events:  Option<Vec<WireEvent>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub steps:   Option<Vec<WireStep>>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WireEvent {
    #[serde(default, deserialize_with = "de_tick")]
    pub t:     Tick,
    pub kind:  EntityKind,
    #[serde(default)]
    pub name:  String,
    #[serde(deserialize_with = "de_state")]
    pub state: StateCode,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WireStep {
    /// Gap to the previous step.
    #[serde(default, deserialize_with = "de_tick")]
    pub t:                Tick,
    #[serde(default)]
    pub rc_states:        BTreeMap<SectionName, StateCode>,
    #[serde(default)]
    pub switch_states:    BTreeMap<SwitchName, StateCode>,
    #[serde(default)]
    pub signal_states:    BTreeMap<SignalName, StateCode>,
    #[serde(default)]
    pub indicator_states: BTreeMap<IndicatorName, StateCode>,
}

/// Scenario-level fields carried alongside the events.
#[derive(Debug, Clone, PartialEq)]
pub struct ScenarioHeader {
    pub station: String,
    pub dt:      f64,
    pub options: Map<String, Value>,
}

impl Default for ScenarioHeader {
    fn default() -> Self {
        Self {
            station: default_station(),
            dt:      default_dt(),
            options: Map::new(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportForm {
    Events,
    Steps,
    Both,
}

impl FromStr for ExportForm {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "events" => Ok(Self::Events),
            "steps"  => Ok(Self::Steps),
            "both"   => Ok(Self::Both),
            other => Err(format!("unknown export form '{other}' (events|steps|both)")),
        }
    }
}

/// Times arrive as JSON numbers; `2` and `2.0` are the same tick.
fn whole_number<'de, D: Deserializer<'de>>(d: D) -> Result<u64, D::Error> {
    let n = serde_json::Number::deserialize(d)?;
    if let Some(v) = n.as_u64() {
        return Ok(v);
    }
    match n.as_f64() {
        // `u64::MAX as f64` rounds up to 2^64, which is already out of range.
        Some(f) if f >= 0.0 && f.fract() == 0.0 && f < u64::MAX as f64 => Ok(f as u64),
        _ => Err(D::Error::custom(format!("expected a non-negative whole number, got {n}"))),
    }
}

fn de_tick<'de, D: Deserializer<'de>>(d: D) -> Result<Tick, D::Error> {
    whole_number(d)
}

fn de_state<'de, D: Deserializer<'de>>(d: D) -> Result<StateCode, D::Error> {
    let v = whole_number(d)?;
    StateCode::try_from(v).map_err(|_| D::Error::custom(format!("state code {v} out of range")))
}

// ── Export ────────────────────────────────────────────────────────

pub fn wire_events(events: &[ScenarioEvent]) -> Vec<WireEvent> {
    let mut ordered: Vec<&ScenarioEvent> = events.iter().collect();
    ordered.sort_by_key(|e| e.order_key());
    ordered
        .into_iter()
        .map(|e| WireEvent {
            t:     e.t,
            kind:  e.entity.kind(),
            name:  e.entity.name().to_string(),
            state: e.state,
        })
        .collect()
}

/// One full snapshot per distinct event time.
pub fn steps_from_events(topology: &TopologyGraph, events: &[ScenarioEvent]) -> Vec<WireStep> {
    let times: BTreeSet<Tick> = events.iter().map(|e| e.t).collect();
    let mut previous: Option<Tick> = None;
    let mut steps = Vec::with_capacity(times.len());

    for t in times {
        let maps = state_maps_at(topology, events, t);
        let dt = previous.map_or(t, |p| t - p);
        steps.push(WireStep {
            t:                dt,
            rc_states:        maps.rc,
            switch_states:    maps.sw,
            signal_states:    maps.sig,
            indicator_states: maps.ind,
        });
        previous = Some(t);
    }
    steps
}

pub fn export_document(
    header:   &ScenarioHeader,
    topology: &TopologyGraph,
    events:   &[ScenarioEvent],
    form:     ExportForm,
) -> ScenarioDocument {
    let with_events = matches!(form, ExportForm::Events | ExportForm::Both);
    let with_steps = matches!(form, ExportForm::Steps | ExportForm::Both);
    ScenarioDocument {
        station: header.station.clone(),
        dt:      header.dt,
        options: header.options.clone(),
        events:  with_events.then(|| wire_events(events)),
        steps:   with_steps.then(|| steps_from_events(topology, events)),
    }
}

// ── Import ────────────────────────────────────────────────────────

/// A fully parsed scenario, ready to replace the store contents.
#[derive(Debug, Clone)]
pub struct ImportedScenario {
    pub header: ScenarioHeader,
    pub drafts: Vec<EventDraft>,
}

/// Lenient pre-pass, then the strict typed parse.
pub fn decode(text: &str) -> SandboxResult<ScenarioDocument> {
    Ok(parse_lenient(text)?)
}

pub fn import(text: &str) -> SandboxResult<ImportedScenario> {
    let doc = decode(text)?;
    let drafts = drafts_from_document(&doc)?;
    Ok(ImportedScenario {
        header: ScenarioHeader {
            station: doc.station,
            dt:      doc.dt,
            options: doc.options,
        },
        drafts,
    })
}

/// Events win over steps when a document carries both.
pub fn drafts_from_document(doc: &ScenarioDocument) -> SandboxResult<Vec<EventDraft>> {
    if let Some(events) = &doc.events {
        return Ok(drafts_from_wire_events(events));
    }
    if let Some(steps) = &doc.steps {
        return events_from_steps(steps);
    }
    Err(SandboxError::NothingToImport)
}

fn drafts_from_wire_events(events: &[WireEvent]) -> Vec<EventDraft> {
    events
        .iter()
        .filter_map(|e| {
            let entity = EntityRef::new(e.kind, &e.name);
            if entity.name().is_empty() {
                log::warn!("import: {} event at t={} without a name skipped", e.kind, e.t);
                return None;
            }
            Some(EventDraft { t: e.t, entity, state: e.state })
        })
        .collect()
}

/// Emit one event per entity whose value differs from the previous
/// cumulative snapshot, at the accumulated absolute time.
fn diff_into<K: Ord + Clone>(
    out:      &mut Vec<EventDraft>,
    t:        Tick,
    previous: &mut BTreeMap<K, StateCode>,
    step:     &BTreeMap<K, StateCode>,
    entity:   impl Fn(&K) -> EntityRef,
) {
    for (name, &state) in step {
        if previous.get(name) == Some(&state) {
            continue;
        }
        out.push(EventDraft { t, entity: entity(name), state });
        previous.insert(name.clone(), state);
    }
}

/// Step gaps accumulate into absolute times; a sum past the last tick is
/// rejected.
pub fn events_from_steps(steps: &[WireStep]) -> SandboxResult<Vec<EventDraft>> {
    let mut out = Vec::new();
    let mut t: Tick = 0;
    let mut rc = BTreeMap::new();
    let mut sw = BTreeMap::new();
    let mut sig = BTreeMap::new();
    let mut ind = BTreeMap::new();

    for step in steps {
        t = t.checked_add(step.t).ok_or(SandboxError::TimeOverflow { t })?;
        diff_into(&mut out, t, &mut rc, &step.rc_states, |n: &SectionName| EntityRef::Rc(n.clone()));
        diff_into(&mut out, t, &mut sw, &step.switch_states, |n: &SwitchName| EntityRef::Switch(n.clone()));
        diff_into(&mut out, t, &mut sig, &step.signal_states, |n: &SignalName| EntityRef::Signal(n.clone()));
        diff_into(&mut out, t, &mut ind, &step.indicator_states, |n: &IndicatorName| {
            EntityRef::Indicator(n.clone())
        });
    }
    out.retain(|d| !d.entity.name().is_empty());
    Ok(out)
}
