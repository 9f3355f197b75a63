//! Route reachability of switches inside one section.
//!
//! A section can hold several switches chained through their plus/minus
//! legs. Only the switches the current route actually passes through should
//! be coloured by the section state; the rest are drawn neutral whatever
//! their own state says.

use crate::{
    names::{SectionName, SwitchName},
    resolver::SwitchStates,
    states::{switch_position_by_state, SwitchPosition},
    topology::TopologyGraph,
};
use std::collections::{BTreeMap, BTreeSet, VecDeque};

/// Reachable switches per section.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Reachability {
    by_section: BTreeMap<SectionName, BTreeSet<SwitchName>>,
}

impl Reachability {
    pub fn section(&self, section: &SectionName) -> Option<&BTreeSet<SwitchName>> {
        self.by_section.get(section)
    }

    pub fn sections(&self) -> impl Iterator<Item = (&SectionName, &BTreeSet<SwitchName>)> {
        self.by_section.iter()
    }

    /// Switches outside any analysed section count as reachable.
    pub fn is_reachable(&self, topology: &TopologyGraph, switch: &SwitchName) -> bool {
        match topology.section_of(switch).and_then(|sec| self.by_section.get(sec)) {
            Some(reached) => reached.contains(switch),
            None => true,
        }
    }
}

pub fn reachable_switches(topology: &TopologyGraph, switch_states: &SwitchStates) -> Reachability {
    let mut members: BTreeMap<&SectionName, BTreeSet<&SwitchName>> = BTreeMap::new();
    for (sw, topo) in topology.switches() {
        if let Some(sec) = &topo.section {
            members.entry(sec).or_default().insert(sw);
        }
    }

    let mut by_section = BTreeMap::new();
    for (section, in_section) in &members {
        let mut incoming: BTreeSet<&SwitchName> = BTreeSet::new();
        for sw in in_section {
            let Some(topo) = topology.switch(sw) else { continue };
            for next in [&topo.next_sw_mi, &topo.next_sw_pl].into_iter().flatten() {
                if in_section.contains(next) {
                    incoming.insert(next);
                }
            }
        }

        let roots: Vec<&SwitchName> = in_section
            .iter()
            .copied()
            .filter(|sw| !incoming.contains(sw))
            .collect();
        let mut queue: VecDeque<&SwitchName> = if roots.is_empty() {
            in_section.iter().copied().collect()
        } else {
            roots.into_iter().collect()
        };

        let mut visited: BTreeSet<SwitchName> = BTreeSet::new();
        while let Some(sw) = queue.pop_front() {
            if !visited.insert(sw.clone()) {
                continue;
            }
            let Some(topo) = topology.switch(sw) else { continue };
            let position = switch_states.get(sw).copied().and_then(switch_position_by_state);
            let next = match position {
                Some(SwitchPosition::Plus)  => topo.next_sw_pl.as_ref(),
                Some(SwitchPosition::Minus) => topo.next_sw_mi.as_ref(),
                _ => None,
            };
            if let Some(next) = next {
                if in_section.contains(next) && !visited.contains(next) {
                    queue.push_back(next);
                }
            }
        }

        by_section.insert((*section).clone(), visited);
    }

    Reachability { by_section }
}
