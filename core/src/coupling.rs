//! Mechanical coupling between switches.
//!
//! Two switches linked through `main_switch` are driven by one machine and
//! always share a position. The relation is symmetric and may chain, so the
//! unit of agreement is a connected component ("family").

use crate::names::SwitchName;
use petgraph::unionfind::UnionFind;
use std::collections::{BTreeMap, BTreeSet};

/// Coupled families, materialised once at topology load.
#[derive(Debug, Clone, Default)]
pub struct CouplingGraph {
    families: Vec<Vec<SwitchName>>,
}

impl CouplingGraph {
    /// Build from directed `(switch, main_switch)` pairs.
    pub fn build<'a>(links: impl IntoIterator<Item = (&'a SwitchName, &'a SwitchName)>) -> Self {
        Self { families: connected_components(links) }
    }

    /// Families in order of their smallest member; members sorted by name.
    pub fn families(&self) -> &[Vec<SwitchName>] {
        &self.families
    }
}

/// Connected components of the undirected coupling relation. Empty names
/// and self-links are ignored.
pub fn connected_components<'a>(
    links: impl IntoIterator<Item = (&'a SwitchName, &'a SwitchName)>,
) -> Vec<Vec<SwitchName>> {
    let pairs: Vec<(&SwitchName, &SwitchName)> = links
        .into_iter()
        .filter(|(a, b)| !a.is_empty() && !b.is_empty() && a != b)
        .collect();

    let names: BTreeSet<&SwitchName> = pairs.iter().flat_map(|(a, b)| [*a, *b]).collect();
    let index: BTreeMap<&SwitchName, usize> = names.into_iter().zip(0..).collect();

    let mut sets = UnionFind::new(index.len());
    for (a, b) in &pairs {
        sets.union(index[a], index[b]);
    }

    // Names are visited in order, so every family comes out sorted.
    let mut by_root: BTreeMap<usize, Vec<SwitchName>> = BTreeMap::new();
    for (name, &i) in &index {
        by_root.entry(sets.find_mut(i)).or_default().push((*name).clone());
    }

    let mut families: Vec<Vec<SwitchName>> = by_root.into_values().collect();
    families.sort();
    families
}
