use sandbox_core::{
    appearance::{
        section_tone, signal_lamp, switch_label, switch_legs, switch_tone, Lamp, SwitchLabel, SwitchLegs, Tone,
    },
    event::EntityKind,
    names::{IndicatorName, SectionName, SignalName, SwitchName},
    session::ScenarioSession,
    topology::TopologyGraph,
};

fn build() -> ScenarioSession {
    let topology = TopologyGraph::from_json(
        r#"{
          "switches": [
            {"name": "1", "section": "1-3СП", "next_sw_pl": "3", "next_sw_mi": "5"},
            {"name": "3", "section": "1-3СП"},
            {"name": "5", "section": "1-3СП"}
          ],
          "signals": [{"name": "Ч1"}, {"name": "М2"}],
          "indicators": [{"name": "КП1", "linked": true}]
        }"#,
    )
    .expect("topology");
    ScenarioSession::new(topology)
}

fn legs(section: Tone, plus: Tone, minus: Tone) -> SwitchLegs {
    SwitchLegs { section, plus, minus }
}

#[test]
fn section_tones() {
    for s in [6, 7, 8] { assert_eq!(section_tone(s), Tone::Occupied); }
    for s in [4, 5] { assert_eq!(section_tone(s), Tone::Locked); }
    for s in [0, 1, 2, 100] { assert_eq!(section_tone(s), Tone::NoControl); }
    assert_eq!(section_tone(3), Tone::Free);
    assert_eq!(section_tone(55), Tone::Free);
}

#[test]
fn switch_tones_and_labels() {
    for s in [6, 7, 8, 12, 13, 14, 17, 18, 20] { assert_eq!(switch_tone(s), Tone::Occupied, "{s}"); }
    for s in [4, 5, 10, 11, 16, 19] { assert_eq!(switch_tone(s), Tone::Locked, "{s}"); }
    for s in [3, 9, 15, 21] { assert_eq!(switch_tone(s), Tone::Free, "{s}"); }
    for s in [0, 1, 2, 100] { assert_eq!(switch_tone(s), Tone::NoControl, "{s}"); }

    assert_eq!(switch_label(5), SwitchLabel::Plus);
    assert_eq!(switch_label(14), SwitchLabel::Minus);
    assert_eq!(switch_label(20), SwitchLabel::Lost);
    assert_eq!(switch_label(21), SwitchLabel::Undefined);
}

#[test]
fn signal_lamps() {
    assert_eq!(signal_lamp(15), Lamp::Red);
    assert_eq!(signal_lamp(3), Lamp::Blue);
    assert_eq!(signal_lamp(7), Lamp::Blue);
    assert_eq!(signal_lamp(4), Lamp::White);
    assert_eq!(signal_lamp(5), Lamp::White);
    assert_eq!(signal_lamp(100), Lamp::Dark);
    assert_eq!(signal_lamp(11), Lamp::Green);
}

#[test]
fn routed_leg_carries_the_section_tone() {
    assert_eq!(switch_legs(6, Some(6), true), legs(Tone::Occupied, Tone::Occupied, Tone::Neutral));
    assert_eq!(switch_legs(13, Some(7), true), legs(Tone::Occupied, Tone::Neutral, Tone::Occupied));
    assert_eq!(switch_legs(4, Some(4), true), legs(Tone::Locked, Tone::Locked, Tone::Neutral));
}

#[test]
fn unpositioned_switch_colours_both_legs() {
    assert_eq!(switch_legs(17, Some(6), true), legs(Tone::Occupied, Tone::Occupied, Tone::Occupied));
    assert_eq!(switch_legs(21, Some(3), true), legs(Tone::Free, Tone::Free, Tone::Free));
    assert_eq!(switch_legs(0, None, true), legs(Tone::Free, Tone::NoControl, Tone::NoControl));
}

#[test]
fn unrecorded_section_reads_as_free() {
    assert_eq!(switch_legs(6, None, true), legs(Tone::Free, Tone::Free, Tone::Neutral));
    assert_eq!(switch_legs(12, None, true), legs(Tone::Free, Tone::Neutral, Tone::Free));
    assert_eq!(switch_legs(17, None, true), legs(Tone::Free, Tone::Occupied, Tone::Occupied));
}

#[test]
fn unreachable_switch_is_neutral() {
    assert_eq!(switch_legs(12, Some(6), false), legs(Tone::Neutral, Tone::Neutral, Tone::Neutral));
}

#[test]
fn layout_appearance_at_a_tick() {
    let mut s = build();
    s.add(EntityKind::Switch, "1", 1, 3).unwrap();
    s.add(EntityKind::Switch, "5", 1, 9).unwrap();
    s.add(EntityKind::Rc, "1-3СП", 2, 7).unwrap();
    s.add(EntityKind::Signal, "Ч1", 2, 15).unwrap();
    s.add(EntityKind::Indicator, "КП1", 2, 4).unwrap();

    let view = s.appearance_at(2);
    assert_eq!(view.t, 2);
    assert_eq!(view.sections[&SectionName::new("1-3СП")], Tone::Occupied);

    let sw1 = &view.switches[&SwitchName::new("1")];
    assert_eq!(sw1.state, 7);
    assert!(sw1.reachable);
    assert_eq!(sw1.legs, legs(Tone::Occupied, Tone::Occupied, Tone::Neutral));

    let sw5 = &view.switches[&SwitchName::new("5")];
    assert!(!sw5.reachable);
    assert_eq!(sw5.legs, legs(Tone::Neutral, Tone::Neutral, Tone::Neutral));

    assert_eq!(view.signals[&SignalName::new("Ч1")], Lamp::Red);
    assert_eq!(view.signals[&SignalName::new("М2")], Lamp::Dark);
    assert!(view.indicators[&IndicatorName::new("КП1")]);
}
