//! State projection: the full layout snapshot at a timeline tick.
//!
//! A snapshot is never stored. It is recomputed from the event list and the
//! topology on every query, so identical `(topology, events, t)` always
//! give identical maps.

use crate::{
    event::{EntityRef, ScenarioEvent},
    names::{IndicatorName, SignalName},
    reachability::{reachable_switches, Reachability},
    resolver::{resolve_switch_states, SectionStates, SwitchStates},
    topology::TopologyGraph,
    types::{StateCode, Tick},
};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

pub type SignalStates = BTreeMap<SignalName, StateCode>;
pub type IndicatorStates = BTreeMap<IndicatorName, StateCode>;

/// Every entity's state at one tick.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StateMaps {
    pub rc:  SectionStates,
    pub sw:  SwitchStates,
    pub sig: SignalStates,
    pub ind: IndicatorStates,
}

/// A snapshot plus the route reachability of its resolved switches.
#[derive(Debug, Clone)]
pub struct Projection {
    pub t:            Tick,
    pub maps:         StateMaps,
    pub reachability: Reachability,
}

fn default_maps(topology: &TopologyGraph) -> StateMaps {
    StateMaps {
        rc:  topology.sections().map(|n| (n.clone(), 0)).collect(),
        sw:  topology.switches().map(|(n, _)| (n.clone(), 0)).collect(),
        sig: topology.signals().map(|(n, _)| (n.clone(), 0)).collect(),
        ind: topology.linked_indicators().map(|n| (n.clone(), 0)).collect(),
    }
}

/// Snapshot at `t`: defaults, then every event with `event.t <= t` in
/// `(t, id)` order, then switch resolution.
pub fn state_maps_at(topology: &TopologyGraph, events: &[ScenarioEvent], t: Tick) -> StateMaps {
    let mut maps = default_maps(topology);

    let mut ordered: Vec<&ScenarioEvent> = events.iter().filter(|e| e.t <= t).collect();
    ordered.sort_by_key(|e| e.order_key());

    for event in ordered {
        match &event.entity {
            EntityRef::Rc(name)     => { maps.rc.insert(name.clone(), event.state); }
            EntityRef::Switch(name) => { maps.sw.insert(name.clone(), event.state); }
            EntityRef::Signal(name) => { maps.sig.insert(name.clone(), event.state); }
            EntityRef::Indicator(name) => {
                if topology.is_linked_indicator(name) {
                    maps.ind.insert(name.clone(), event.state);
                }
            }
        }
    }

    maps.sw = resolve_switch_states(topology, &maps.sw, &maps.rc);
    maps
}

pub fn project(topology: &TopologyGraph, events: &[ScenarioEvent], t: Tick) -> Projection {
    let maps = state_maps_at(topology, events, t);
    let reachability = reachable_switches(topology, &maps.sw);
    Projection { t, maps, reachability }
}
