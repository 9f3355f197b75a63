//! Session wiring: topology injection, authoring through the session and
//! the worked two-step scenario.

use sandbox_core::{
    codec::ExportForm,
    event::EntityKind,
    names::{SectionName, SwitchName},
    session::ScenarioSession,
    topology::TopologyGraph,
};

fn build(json: &str) -> ScenarioSession {
    ScenarioSession::new(TopologyGraph::from_json(json).expect("topology"))
}

#[test]
fn header_station_comes_from_topology() {
    assert_eq!(build(r#"{"station": "Kirovo"}"#).header().station, "Kirovo");
    assert_eq!(build("{}").header().station, "Visochino");
    assert_eq!(build("{}").header().dt, 1.0);
}

#[test]
fn two_step_scenario() {
    let mut s = build(r#"{"switches": [{"name": "1", "section": "1-3СП"}]}"#);
    let section = SectionName::new("1-3СП");
    let switch = SwitchName::new("SW1");

    s.add(EntityKind::Switch, "SW1", 1, 3).unwrap();
    let t1 = s.state_maps_at(1);
    assert_eq!(t1.rc[&section], 3);
    assert_eq!(t1.sw[&switch], 3);

    s.add(EntityKind::Rc, "1-3СП", 2, 7).unwrap();
    let t2 = s.state_maps_at(2);
    assert_eq!(t2.rc[&section], 7);
    assert_eq!(t2.sw[&switch], 7);

    assert_eq!(s.state_maps_at(1), t1);
}

#[test]
fn staged_batch_reaches_projection_only_after_commit() {
    let mut s = build(r#"{"sections": ["1П"]}"#);
    let section = SectionName::new("1П");

    s.stage(EntityKind::Rc, "1П", 3, 6).unwrap();
    assert_eq!(s.state_maps_at(3).rc[&section], 0);

    let sid = s.staged()[0].sid;
    s.edit_staged(sid, 7).unwrap();
    assert_eq!(s.commit_batch().len(), 1);
    assert_eq!(s.state_maps_at(3).rc[&section], 7);

    s.stage(EntityKind::Rc, "1П", 4, 3).unwrap();
    s.discard_batch();
    assert!(s.staged().is_empty());
    assert_eq!(s.state_maps_at(4).rc[&section], 7);
}

#[test]
fn edit_delete_and_duplicate_through_the_session() {
    let mut s = build(r#"{"sections": ["1П"]}"#);
    let id = s.add(EntityKind::Rc, "1П", 1, 3).unwrap();
    s.edit(id, 6).unwrap();
    let copy = s.duplicate(id, 4).unwrap();
    assert_eq!(s.duplicate_step(4, 6).unwrap().len(), 1);
    s.delete(copy).unwrap();

    let times: Vec<_> = s.events().iter().map(|e| (e.t, e.state)).collect();
    assert_eq!(times, vec![(1, 6), (6, 6)]);
}

#[test]
fn export_json_is_pretty_and_reimportable() {
    let mut s = build(r#"{"sections": ["1П"]}"#);
    s.add(EntityKind::Rc, "1П", 2, 6).unwrap();
    s.header_mut().options.insert("speed".into(), serde_json::json!(3));

    let text = s.export_json(ExportForm::Both).unwrap();
    assert!(text.contains('\n'));

    let mut other = build(r#"{"sections": ["1П"]}"#);
    assert_eq!(other.import_json(&text).unwrap(), 1);
    assert_eq!(other.header().options["speed"], 3);
    assert_eq!(other.state_maps_at(2), s.state_maps_at(2));
}
