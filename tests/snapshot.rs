//! Integration tests for snapshots, diffs and reports

use province_chronicle::snapshot::{deserialize_binary, serialize_binary, Change, EntityRef};
use province_chronicle::{diff, generate_world, render, GenerationParams, HistorySimulation, SimulationConfig};

fn simulation(months: u32) -> HistorySimulation {
    let params = GenerationParams {
        seed: 77,
        polygon_count: 64,
        initial_countries: 4,
        ..GenerationParams::default()
    };
    let graph = generate_world(&params).unwrap();
    let mut sim = HistorySimulation::new(graph, SimulationConfig::default()).unwrap();
    sim.run(months);
    sim
}

#[test]
fn test_binary_round_trip_of_simulated_month() {
    let sim = simulation(6);
    let snapshot = sim.latest_snapshot();
    let bytes = serialize_binary(&snapshot).unwrap();
    let decoded = deserialize_binary(&bytes).unwrap();
    assert_eq!(decoded, *snapshot);
}

#[test]
fn test_self_diff_is_empty() {
    let sim = simulation(3);
    let snapshot = sim.latest_snapshot();
    assert!(diff(&snapshot, &snapshot).unwrap().is_empty());
    let report = render(snapshot.date, &[]);
    assert!(report.contains("Nothing of note happened."));
}

#[test]
fn test_archive_months_diff_cleanly() {
    let sim = simulation(12);
    let archive = sim.archive();
    assert_eq!(archive.len(), 12);
    assert_eq!(archive.baseline().date.next(), archive.month(0).unwrap().date);

    for index in 0..archive.len() {
        let next = archive.month(index).unwrap();
        let records = diff(archive.predecessor(index), next).unwrap();
        for record in &records {
            if let EntityRef::Country(id) = record.entity {
                assert!(next.country(id).is_some() || matches!(record.change, Change::Removed));
            }
        }
        let report = render(next.date, &records);
        assert!(report.starts_with(&format!("History of {}", next.date)));
    }
}
