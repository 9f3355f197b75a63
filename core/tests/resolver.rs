//! Switch state resolution: coupling families first, then normalisation
//! against the owning section.

use sandbox_core::{
    names::{SectionName, SwitchName},
    resolver::{resolve_switch_states, SectionStates, SwitchStates},
    topology::TopologyGraph,
};

const TOPOLOGY: &str = r#"{
  "switches": [
    {"name": "1", "section": "1-3СП", "next_sw_pl": "3"},
    {"name": "3", "section": "1-3СП"},
    {"name": "5", "section": "5СП", "main_switch": "7"},
    {"name": "7", "section": "7СП"},
    {"name": "9", "main_switch": "sw7"}
  ]
}"#;

fn topology() -> TopologyGraph {
    TopologyGraph::from_json(TOPOLOGY).expect("topology")
}

fn switches(entries: &[(&str, u16)]) -> SwitchStates {
    entries.iter().map(|(n, s)| (SwitchName::new(n), *s)).collect()
}

fn sections(entries: &[(&str, u16)]) -> SectionStates {
    entries.iter().map(|(n, s)| (SectionName::new(n), *s)).collect()
}

#[test]
fn coupled_partner_follows_minus_position() {
    let topo = topology();
    let resolved = resolve_switch_states(&topo, &switches(&[("5", 9)]), &SectionStates::new());

    assert_eq!(resolved[&SwitchName::new("5")], 9);
    assert_eq!(resolved[&SwitchName::new("7")], 9);
    assert_eq!(resolved[&SwitchName::new("9")], 9, "chained coupling reaches the whole family");
}

#[test]
fn family_members_recompose_against_their_own_sections() {
    let topo = topology();
    let resolved = resolve_switch_states(
        &topo,
        &switches(&[("5", 3)]),
        &sections(&[("5СП", 7), ("7СП", 6)]),
    );

    assert_eq!(resolved[&SwitchName::new("5")], 7);
    assert_eq!(resolved[&SwitchName::new("7")], 6);
    // No section: composed as free and unlocked.
    assert_eq!(resolved[&SwitchName::new("9")], 3);
}

#[test]
fn family_position_comes_from_first_member_that_has_one() {
    let topo = topology();
    let resolved = resolve_switch_states(
        &topo,
        &switches(&[("5", 21), ("7", 12), ("9", 4)]),
        &SectionStates::new(),
    );
    for name in ["5", "7", "9"] {
        assert_eq!(resolved[&SwitchName::new(name)], 9, "switch {name}");
    }
}

#[test]
fn family_without_any_position_is_left_alone() {
    let topo = topology();
    let raw = switches(&[("5", 21), ("7", 0)]);
    let resolved = resolve_switch_states(&topo, &raw, &sections(&[("5СП", 6)]));
    assert_eq!(resolved, raw);
}

#[test]
fn switch_tracks_later_section_state() {
    let topo = topology();
    let raw = switches(&[("1", 3), ("3", 12), ("7", 15)]);
    let resolved = resolve_switch_states(
        &topo,
        &raw,
        &sections(&[("1-3СП", 6), ("7СП", 7)]),
    );

    assert_eq!(resolved[&SwitchName::new("1")], 6);
    assert_eq!(resolved[&SwitchName::new("3")], 12);
    assert_eq!(resolved[&SwitchName::new("7")], 18, "loss of control maps non-linearly");
}

#[test]
fn indefinite_section_states_compose_as_free() {
    let topo = topology();
    for rc in [0, 1, 2, 100] {
        let resolved = resolve_switch_states(&topo, &switches(&[("1", 13)]), &sections(&[("1-3СП", rc)]));
        assert_eq!(resolved[&SwitchName::new("1")], 9, "section state {rc}");
    }
}

#[test]
fn unknown_and_unpositioned_switches_pass_through() {
    let topo = topology();
    let raw = switches(&[("99", 12), ("1", 21), ("3", 0)]);
    let resolved = resolve_switch_states(&topo, &raw, &sections(&[("1-3СП", 7)]));
    assert_eq!(resolved, raw);
}

#[test]
fn resolution_is_idempotent() {
    let topo = topology();
    let secs = sections(&[("1-3СП", 7), ("5СП", 4), ("7СП", 6)]);
    let once = resolve_switch_states(&topo, &switches(&[("1", 9), ("3", 20), ("7", 3)]), &secs);
    let twice = resolve_switch_states(&topo, &once, &secs);
    assert_eq!(once, twice);
}

#[test]
fn topology_without_switches_returns_input() {
    let topo = TopologyGraph::default();
    let raw = switches(&[("1", 7)]);
    assert_eq!(resolve_switch_states(&topo, &raw, &SectionStates::new()), raw);
}
