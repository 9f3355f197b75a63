//! Immutable layout facts: which section owns each switch, where each switch
//! leads in either position, which switches are coupled, what kind each
//! signal is and which indicators watch section occupancy.
//!
//! Built once per load from a topology document, never mutated afterwards.

use crate::{
    coupling::CouplingGraph,
    names::{IndicatorName, SectionName, SignalName, SwitchName},
    states::SignalKind,
};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

// ── Document shape ────────────────────────────────────────────────

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TopologyDocument {
    #[serde(default)]
    pub station: Option<String>,
    #[serde(default)]
    pub sections: Vec<SectionName>,
    #[serde(default)]
    pub switches: Vec<SwitchEntry>,
    #[serde(default)]
    pub signals: Vec<SignalEntry>,
    #[serde(default)]
    pub indicators: Vec<IndicatorEntry>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SwitchEntry {
    pub name: SwitchName,
    #[serde(default)]
    pub section: Option<SectionName>,
    #[serde(default)]
    pub next_sw_mi: Option<SwitchName>,
    #[serde(default)]
    pub next_sw_pl: Option<SwitchName>,
    #[serde(default)]
    pub main_switch: Option<SwitchName>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SignalEntry {
    pub name: SignalName,
    /// Missing kinds are inferred from the name.
    #[serde(default)]
    pub kind: Option<SignalKind>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IndicatorEntry {
    pub name: IndicatorName,
    /// True when the object metadata declares a previous/next section watch.
    #[serde(default)]
    pub linked: bool,
}

// ── Graph ─────────────────────────────────────────────────────────

/// Resolved topology of one switch. Empty references are dropped at load.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SwitchTopology {
    pub section:     Option<SectionName>,
    pub next_sw_mi:  Option<SwitchName>,
    pub next_sw_pl:  Option<SwitchName>,
    pub main_switch: Option<SwitchName>,
}

#[derive(Debug, Clone, Default)]
pub struct TopologyGraph {
    station:    Option<String>,
    sections:   BTreeSet<SectionName>,
    switches:   BTreeMap<SwitchName, SwitchTopology>,
    signals:    BTreeMap<SignalName, SignalKind>,
    indicators: BTreeMap<IndicatorName, bool>,
    coupling:   CouplingGraph,
}

/// Maneuver signals carry the Cyrillic `М` prefix in station naming.
pub fn infer_signal_kind(name: &SignalName) -> SignalKind {
    if name.as_str().starts_with('М') {
        SignalKind::Maneuver
    } else {
        SignalKind::Train
    }
}

fn non_empty<T>(name: Option<T>, is_empty: impl Fn(&T) -> bool) -> Option<T> {
    name.filter(|n| !is_empty(n))
}

impl TopologyGraph {
    /// Load a topology document from a JSON file.
    pub fn load(path: &str) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| anyhow::anyhow!("Cannot read {path}: {e}"))?;
        Self::from_json(&content).map_err(|e| anyhow::anyhow!("Invalid topology {path}: {e}"))
    }

    pub fn from_json(json: &str) -> serde_json::Result<Self> {
        let doc: TopologyDocument = serde_json::from_str(json)?;
        Ok(Self::from_document(doc))
    }

    pub fn from_document(doc: TopologyDocument) -> Self {
        let mut sections: BTreeSet<SectionName> =
            doc.sections.into_iter().filter(|s| !s.is_empty()).collect();

        let mut switches = BTreeMap::new();
        for entry in doc.switches {
            if entry.name.is_empty() {
                log::warn!("topology: switch entry without a name skipped");
                continue;
            }
            let topo = SwitchTopology {
                section:     non_empty(entry.section, SectionName::is_empty),
                next_sw_mi:  non_empty(entry.next_sw_mi, SwitchName::is_empty),
                next_sw_pl:  non_empty(entry.next_sw_pl, SwitchName::is_empty),
                main_switch: non_empty(entry.main_switch, SwitchName::is_empty),
            };
            if let Some(section) = &topo.section {
                sections.insert(section.clone());
            }
            switches.insert(entry.name, topo);
        }

        let signals = doc
            .signals
            .into_iter()
            .filter(|s| !s.name.is_empty())
            .map(|s| {
                let kind = s.kind.unwrap_or_else(|| infer_signal_kind(&s.name));
                (s.name, kind)
            })
            .collect();

        let indicators = doc
            .indicators
            .into_iter()
            .filter(|i| !i.name.is_empty())
            .map(|i| (i.name, i.linked))
            .collect();

        let coupling = CouplingGraph::build(
            switches
                .iter()
                .filter_map(|(sw, topo)| topo.main_switch.as_ref().map(|main| (sw, main))),
        );

        let graph = Self {
            station: doc.station,
            sections,
            switches,
            signals,
            indicators,
            coupling,
        };
        log::debug!(
            "topology loaded: {} sections, {} switches ({} coupled families), {} signals, {} indicators",
            graph.sections.len(),
            graph.switches.len(),
            graph.coupling.families().len(),
            graph.signals.len(),
            graph.indicators.len()
        );
        graph
    }

    pub fn station(&self) -> Option<&str> {
        self.station.as_deref()
    }

    pub fn sections(&self) -> impl Iterator<Item = &SectionName> {
        self.sections.iter()
    }

    pub fn switches(&self) -> impl Iterator<Item = (&SwitchName, &SwitchTopology)> {
        self.switches.iter()
    }

    pub fn switch(&self, name: &SwitchName) -> Option<&SwitchTopology> {
        self.switches.get(name)
    }

    pub fn has_switches(&self) -> bool {
        !self.switches.is_empty()
    }

    /// Owning section of a switch, when the topology knows it.
    pub fn section_of(&self, name: &SwitchName) -> Option<&SectionName> {
        self.switches.get(name).and_then(|t| t.section.as_ref())
    }

    pub fn signals(&self) -> impl Iterator<Item = (&SignalName, SignalKind)> {
        self.signals.iter().map(|(n, k)| (n, *k))
    }

    /// Kind from metadata, falling back to name inference for signals the
    /// metadata does not list.
    pub fn signal_kind(&self, name: &SignalName) -> SignalKind {
        self.signals
            .get(name)
            .copied()
            .unwrap_or_else(|| infer_signal_kind(name))
    }

    pub fn indicators(&self) -> impl Iterator<Item = (&IndicatorName, bool)> {
        self.indicators.iter().map(|(n, l)| (n, *l))
    }

    pub fn is_linked_indicator(&self, name: &IndicatorName) -> bool {
        self.indicators.get(name).copied().unwrap_or(false)
    }

    pub fn linked_indicators(&self) -> impl Iterator<Item = &IndicatorName> {
        self.indicators.iter().filter(|(_, l)| **l).map(|(n, _)| n)
    }

    pub fn coupling(&self) -> &CouplingGraph {
        &self.coupling
    }
}
