//! Integration tests for the monthly history simulation
//!
//! - Founding a country through an instruction
//! - Wars cannot end before the minimum duration
//! - Same seed, same history

use province_chronicle::core::types::{CountryId, CultureId, ProvinceId, ReligionId};
use province_chronicle::history::{DiplomaticAction, HistoryWorld, Relation};
use province_chronicle::province::InfluenceShares;
use province_chronicle::{generate_world, GenerationParams, HistorySimulation, Instruction, SimulationConfig};

fn quiet_world(seed: u64) -> HistoryWorld {
    let params = GenerationParams {
        seed,
        polygon_count: 64,
        ..GenerationParams::default()
    };
    let mut graph = generate_world(&params).unwrap();
    let ids: Vec<ProvinceId> = graph.land_provinces().map(|p| p.id).collect();
    for id in ids {
        graph.set_cultures(id, InfluenceShares::single(CultureId(0)));
        graph.set_religions(id, InfluenceShares::single(ReligionId(0)));
    }
    HistoryWorld::new(graph)
}

fn player_country(world: &mut HistoryWorld, name: &str, provinces: &[ProvinceId]) -> CountryId {
    let id = world.add_country(name.to_string());
    for &province in provinces {
        world.transfer_province(province, Some(id));
    }
    let country = world.country_mut(id).unwrap();
    country.player = true;
    country.capital = provinces.first().copied();
    id
}

fn quiet_config() -> SimulationConfig {
    SimulationConfig {
        growth_rate: 0.0,
        ..SimulationConfig::default()
    }
}

#[test]
fn test_found_country_splits_provinces() {
    let mut world = quiet_world(8);
    let land: Vec<ProvinceId> = world.graph.land_provinces().map(|p| p.id).collect();
    assert!(land.len() >= 4, "need at least four land provinces");
    let parent = player_country(&mut world, "Parent", &land);
    world.country_mut(parent).unwrap().funds = 100.0;

    let mut sim = HistorySimulation::from_world(world, quiet_config()).unwrap();
    let split: Vec<ProvinceId> = land[land.len() - 3..].to_vec();
    sim.submit(Instruction::FoundCountry {
        parent,
        provinces: split.clone(),
    });
    sim.simulate_month();

    let founded = sim.world.countries.last().unwrap();
    assert_ne!(founded.id, parent);
    assert!(founded.exists);
    assert_eq!(founded.provinces.iter().copied().collect::<Vec<_>>(), split);
    assert_eq!(sim.world.country(parent).unwrap().provinces.len(), land.len() - 3);
    for id in &split {
        assert_eq!(sim.world.graph.provinces[id.index()].owner, Some(founded.id));
    }
}

#[test]
fn test_war_cannot_end_before_minimum_duration() {
    let mut world = quiet_world(9);
    let (a_home, b_home) = world
        .graph
        .land_provinces()
        .find_map(|p| {
            p.neighbors
                .iter()
                .copied()
                .find(|&n| world.graph.provinces[n.index()].is_land())
                .map(|n| (p.id, n))
        })
        .unwrap();
    let a = player_country(&mut world, "A", &[a_home]);
    let b = player_country(&mut world, "B", &[b_home]);
    let since = world.date();
    world.set_relation(a, b, Relation::War { since });

    let config = quiet_config();
    let required = config.min_war_months;
    let mut sim = HistorySimulation::from_world(world, config).unwrap();
    let make_peace = Instruction::Diplomacy {
        actor: a,
        target: b,
        action: DiplomaticAction::MakePeace,
    };

    for _ in 0..required {
        sim.submit(make_peace.clone());
        sim.simulate_month();
        assert!(sim.world.at_war(a, b), "peace at {}", sim.date());
    }

    sim.submit(make_peace);
    sim.simulate_month();
    assert!(!sim.world.at_war(a, b));
    assert_eq!(sim.world.relation(b, a), sim.world.relation(a, b).mirror());
}

#[test]
fn test_same_seed_same_history() {
    let params = GenerationParams {
        seed: 31,
        polygon_count: 64,
        initial_countries: 4,
        ..GenerationParams::default()
    };
    let run = || {
        let graph = generate_world(&params).unwrap();
        let mut sim = HistorySimulation::new(graph, SimulationConfig::default()).unwrap();
        sim.run(24);
        (sim.latest_snapshot(), sim.stats())
    };

    let (first, first_stats) = run();
    let (second, second_stats) = run();
    assert_eq!(first, second);
    assert_eq!(first_stats, second_stats);
    assert_eq!(first_stats.months, 24);
}
