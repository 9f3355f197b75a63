//! Switch state resolution.
//!
//! Input: the raw authored switch codes (last event per switch, possibly
//! stale or inconsistent) and the current section codes.
//! Output: a complete, consistent switch map.
//!
//! Two passes, in this order:
//!   1. Family coupling: every coupled family adopts the position of its
//!      first member (by name) that has one, and each member is recomposed
//!      against its OWN section. Siblings may sit in different sections.
//!   2. Normalisation: every switch with a known section and a position is
//!      recomposed against that section's current code. This is what moves a
//!      switch authored at t=1 into "occupied" when the section becomes
//!      occupied at t=2 without a new switch event.
//!
//! Switches without topology pass through untouched.

use crate::{
    names::{SectionName, SwitchName},
    states::{compose_switch_state, switch_position_by_state},
    topology::TopologyGraph,
    types::StateCode,
};
use std::collections::BTreeMap;

pub type SectionStates = BTreeMap<SectionName, StateCode>;
pub type SwitchStates = BTreeMap<SwitchName, StateCode>;

pub fn resolve_switch_states(
    topology: &TopologyGraph,
    raw: &SwitchStates,
    sections: &SectionStates,
) -> SwitchStates {
    let mut resolved = raw.clone();
    if !topology.has_switches() {
        return resolved;
    }

    let section_state = |sw: &SwitchName| -> Option<StateCode> {
        topology.section_of(sw).and_then(|sec| sections.get(sec).copied())
    };

    for family in topology.coupling().families() {
        let position = family
            .iter()
            .find_map(|sw| resolved.get(sw).copied().and_then(switch_position_by_state));
        let Some(position) = position else {
            continue;
        };
        for sw in family {
            let state = compose_switch_state(position, section_state(sw));
            resolved.insert(sw.clone(), state);
        }
        log::trace!("coupled family {family:?} set to {position:?}");
    }

    for (sw, state) in resolved.iter_mut() {
        if topology.section_of(sw).is_none() {
            continue;
        }
        if let Some(position) = switch_position_by_state(*state) {
            *state = compose_switch_state(position, section_state(sw));
        }
    }

    resolved
}
