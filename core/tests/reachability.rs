//! Route reachability inside multi-switch sections.

use sandbox_core::{
    names::{SectionName, SwitchName},
    reachability::reachable_switches,
    resolver::SwitchStates,
    topology::TopologyGraph,
};

// 11 routes plus to 13 and minus to 15, all inside one section.
// 21 and 23 point at each other, so that section has no root.
const TOPOLOGY: &str = r#"{
  "switches": [
    {"name": "11", "section": "11-15СП", "next_sw_pl": "13", "next_sw_mi": "15"},
    {"name": "13", "section": "11-15СП"},
    {"name": "15", "section": "11-15СП"},
    {"name": "21", "section": "21-23СП", "next_sw_pl": "23"},
    {"name": "23", "section": "21-23СП", "next_sw_pl": "21"},
    {"name": "31"}
  ]
}"#;

fn topology() -> TopologyGraph {
    TopologyGraph::from_json(TOPOLOGY).expect("topology")
}

fn states(entries: &[(&str, u16)]) -> SwitchStates {
    entries.iter().map(|(n, s)| (SwitchName::new(n), *s)).collect()
}

fn sw(name: &str) -> SwitchName {
    SwitchName::new(name)
}

#[test]
fn plus_route_excludes_the_minus_branch() {
    let topo = topology();
    let reach = reachable_switches(&topo, &states(&[("11", 3), ("13", 3), ("15", 9)]));

    assert!(reach.is_reachable(&topo, &sw("11")));
    assert!(reach.is_reachable(&topo, &sw("13")));
    assert!(
        !reach.is_reachable(&topo, &sw("15")),
        "a switch fed by a switch routed away from it is not reachable"
    );
}

#[test]
fn minus_route_excludes_the_plus_branch() {
    let topo = topology();
    let reach = reachable_switches(&topo, &states(&[("11", 12), ("13", 3), ("15", 3)]));

    let reached = reach.section(&SectionName::new("11-15СП")).unwrap();
    assert!(reached.contains(&sw("11")));
    assert!(reached.contains(&sw("15")));
    assert!(!reached.contains(&sw("13")));
}

#[test]
fn unpositioned_root_reaches_only_itself() {
    let topo = topology();
    for code in [0, 21, 17] {
        let reach = reachable_switches(&topo, &states(&[("11", code)]));
        let reached = reach.section(&SectionName::new("11-15СП")).unwrap();
        assert_eq!(reached.len(), 1, "root code {code}");
        assert!(reached.contains(&sw("11")));
    }
}

#[test]
fn section_without_roots_starts_from_every_member() {
    let topo = topology();
    let reach = reachable_switches(&topo, &SwitchStates::new());
    assert!(reach.is_reachable(&topo, &sw("21")));
    assert!(reach.is_reachable(&topo, &sw("23")));
}

#[test]
fn switches_outside_any_section_are_reachable() {
    let topo = topology();
    let reach = reachable_switches(&topo, &SwitchStates::new());
    assert!(reach.is_reachable(&topo, &sw("31")));
    assert!(reach.is_reachable(&topo, &sw("404")));
    assert_eq!(reach.sections().count(), 2);
}
