//! Render classification of a projected snapshot.
//!
//! Pure functions from state codes to tones. Any renderer (the runner's
//! JSON replies, a canvas, a terminal view) draws from these values and
//! never interprets raw codes itself.

use crate::{
    names::{IndicatorName, SectionName, SignalName, SwitchName},
    snapshot::Projection,
    states::{switch_position_by_state, SwitchPosition, INDICATOR_LIT},
    topology::TopologyGraph,
    types::{StateCode, Tick},
};
use serde::Serialize;
use std::collections::BTreeMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Tone {
    Occupied,
    Locked,
    Free,
    NoControl,
    /// Drawn without state colour: off-route legs and unreachable switches.
    Neutral,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SwitchLabel {
    Plus,
    Minus,
    Lost,
    Undefined,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Lamp {
    Red,
    Blue,
    White,
    Green,
    Dark,
}

/// Tones of the three legs meeting at a switch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SwitchLegs {
    pub section: Tone,
    pub plus:    Tone,
    pub minus:   Tone,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SwitchAppearance {
    pub state:     StateCode,
    pub tone:      Tone,
    pub label:     SwitchLabel,
    pub reachable: bool,
    pub legs:      SwitchLegs,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LayoutAppearance {
    pub t:          Tick,
    pub sections:   BTreeMap<SectionName, Tone>,
    pub switches:   BTreeMap<SwitchName, SwitchAppearance>,
    pub signals:    BTreeMap<SignalName, Lamp>,
    /// Linked indicators only; `true` means lit red.
    pub indicators: BTreeMap<IndicatorName, bool>,
}

// ── Classification ────────────────────────────────────────────────

pub fn section_tone(state: StateCode) -> Tone {
    match state {
        6..=8 => Tone::Occupied,
        4 | 5 => Tone::Locked,
        0 | 1 | 2 | 100 => Tone::NoControl,
        _ => Tone::Free,
    }
}

pub fn switch_tone(state: StateCode) -> Tone {
    match state {
        6 | 7 | 8 | 12 | 13 | 14 | 17 | 18 | 20 => Tone::Occupied,
        4 | 5 | 10 | 11 | 16 | 19 => Tone::Locked,
        0 | 1 | 2 | 100 => Tone::NoControl,
        _ => Tone::Free,
    }
}

pub fn switch_label(state: StateCode) -> SwitchLabel {
    match switch_position_by_state(state) {
        Some(SwitchPosition::Plus)      => SwitchLabel::Plus,
        Some(SwitchPosition::Minus)     => SwitchLabel::Minus,
        Some(SwitchPosition::NoControl) => SwitchLabel::Lost,
        None => SwitchLabel::Undefined,
    }
}

pub fn signal_lamp(state: StateCode) -> Lamp {
    match state {
        15 => Lamp::Red,
        3 | 7 => Lamp::Blue,
        4 | 5 => Lamp::White,
        0 | 1 | 2 | 100 => Lamp::Dark,
        _ => Lamp::Green,
    }
}

pub fn indicator_lit(state: StateCode) -> bool {
    state == INDICATOR_LIT
}

/// Leg tones for one switch. The routed leg carries the section tone, the
/// other leg stays neutral; without an end position both legs carry the
/// switch's own tone. A section with no recorded state reads as free.
pub fn switch_legs(
    switch_state:  StateCode,
    section_state: Option<StateCode>,
    reachable:     bool,
) -> SwitchLegs {
    if !reachable {
        return SwitchLegs {
            section: Tone::Neutral,
            plus:    Tone::Neutral,
            minus:   Tone::Neutral,
        };
    }
    let own = switch_tone(switch_state);
    let section = section_state.map_or(Tone::Free, section_tone);
    match switch_position_by_state(switch_state) {
        Some(SwitchPosition::Plus) => SwitchLegs { section, plus: section, minus: Tone::Neutral },
        Some(SwitchPosition::Minus) => SwitchLegs { section, plus: Tone::Neutral, minus: section },
        _ => SwitchLegs { section, plus: own, minus: own },
    }
}

/// Classify every entity of a projection.
pub fn appearance(topology: &TopologyGraph, projection: &Projection) -> LayoutAppearance {
    let maps = &projection.maps;

    let sections = maps.rc.iter().map(|(n, &s)| (n.clone(), section_tone(s))).collect();

    let switches = maps
        .sw
        .iter()
        .map(|(name, &state)| {
            let section_state = topology
                .section_of(name)
                .and_then(|sec| maps.rc.get(sec))
                .copied();
            let reachable = projection.reachability.is_reachable(topology, name);
            let view = SwitchAppearance {
                state,
                tone: switch_tone(state),
                label: switch_label(state),
                reachable,
                legs: switch_legs(state, section_state, reachable),
            };
            (name.clone(), view)
        })
        .collect();

    let signals = maps.sig.iter().map(|(n, &s)| (n.clone(), signal_lamp(s))).collect();
    let indicators = maps.ind.iter().map(|(n, &s)| (n.clone(), indicator_lit(s))).collect();

    LayoutAppearance {
        t: projection.t,
        sections,
        switches,
        signals,
        indicators,
    }
}
