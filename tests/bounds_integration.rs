//! Integration tests for change-only sampling.

mod common;

use common::{sample_match, DemoBuilder, Wire};
use demoreel::bounds::WORLD_CLASS;
use demoreel::error::ErrorKind;
use demoreel::{bounds, Value};

fn ticks_and_entities(records: &[demoreel::Record]) -> Vec<(u32, u32)> {
    records.iter().map(|r| (r.tick, r.entity)).collect()
}

#[test]
fn test_records_only_changed_ticks() {
    let data = sample_match();

    let players = bounds(&data, "players").unwrap();
    assert_eq!(
        ticks_and_entities(&players),
        vec![(100, 1), (100, 2), (101, 1), (103, 2)]
    );
    assert_eq!(players[2].values["health"], Value::Integer(80));
    assert_eq!(players[3].values["alive"], Value::Boolean(false));

    let sentries = bounds(&data, "sentries").unwrap();
    assert_eq!(ticks_and_entities(&sentries), vec![(102, 9)]);
}

#[test]
fn test_unchanged_deltas_are_skipped() {
    let data = DemoBuilder::new()
        .frame(1, |f| {
            f.baseline(
                0,
                WORLD_CLASS,
                &[
                    ("boundary_min", Wire::Vec3(-512.0, -512.0, 0.0)),
                    ("boundary_max", Wire::Vec3(512.0, 512.0, 256.0)),
                ],
            )
        })
        .frame(2, |f| f.delta(0, &[("boundary_min", Wire::Vec3(-512.0, -512.0, 0.0))]))
        .frame(3, |f| f)
        .frame(4, |f| f.delta(0, &[("boundary_max", Wire::Vec3(1024.0, 512.0, 256.0))]))
        .finish();

    let world = bounds(&data, WORLD_CLASS).unwrap();
    assert_eq!(ticks_and_entities(&world), vec![(1, 0), (4, 0)]);
    assert_eq!(world[1].values.len(), 2);
}

#[test]
fn test_reappearing_entity_with_same_state_is_not_repeated() {
    let props = [("health", Wire::Int(100))];
    let data = DemoBuilder::new()
        .frame(1, |f| f.baseline(3, "players", &props))
        .frame(2, |f| f.remove(3))
        .frame(3, |f| f.baseline(3, "players", &props))
        .frame(4, |f| f.delta(3, &[("health", Wire::Int(50))]))
        .finish();

    let records = bounds(&data, "players").unwrap();
    assert_eq!(ticks_and_entities(&records), vec![(1, 3), (4, 3)]);
}

#[test]
fn test_unknown_class_yields_nothing() {
    assert!(bounds(&sample_match(), "dispensers").unwrap().is_empty());
}

#[test]
fn test_corrupt_stream_is_an_error() {
    let data = DemoBuilder::new()
        .frame(1, |f| f.baseline(0, WORLD_CLASS, &[("flag", Wire::Raw(0x03, vec![2]))]))
        .finish();
    let err = bounds(&data, WORLD_CLASS).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::CorruptData);
}
