//! Crisis pressure, observable crises and their consequences

use std::collections::BTreeMap;

use tracing::info;

use crate::core::config::SimulationConfig;
use crate::core::types::{CountryId, CrisisId, CultureId, ProvinceId, ReligionId};
use crate::history::crisis::{crisis_state, CrisisKind, CrisisState, HistoryCrisis};
use crate::history::diplomacy::Relation;
use crate::history::systems::planning::outer_provinces;
use crate::history::systems::resolution::found_country;
use crate::history::world::HistoryWorld;

/// Advance every crisis by one month. Returns the crises that triggered.
pub fn update_crises(world: &mut HistoryWorld, config: &SimulationConfig) -> Vec<(CountryId, CrisisKind)> {
    let deltas = crisis_pressure(world, config);

    let mut triggered = Vec::new();
    for ((country, kind), delta) in deltas {
        if world.living(country).is_none() {
            world.latent_crises.remove(&(country, kind));
            continue;
        }
        let progress = {
            let entry = world.latent_crises.entry((country, kind)).or_insert(0.0);
            *entry = (*entry + delta).clamp(0.0, 1.0);
            *entry
        };

        let existing = find_crisis(world, country, kind);
        let state = match existing {
            Some(id) => {
                let state = world
                    .crises
                    .get_mut(&id)
                    .map(|c| c.advance(progress - c.progress))
                    .unwrap_or(CrisisState::Resolved);
                if state != CrisisState::Building {
                    world.crises.remove(&id);
                }
                state
            }
            None if progress >= config.crisis_observable => {
                let id = world.next_crisis_id();
                let crisis = HistoryCrisis::new(id, kind, country, progress);
                let state = crisis_state(crisis.progress);
                if state == CrisisState::Building {
                    world.crises.insert(id, crisis);
                }
                state
            }
            None if progress <= 0.0 => CrisisState::Resolved,
            None => CrisisState::Building,
        };

        match state {
            CrisisState::Building => {}
            CrisisState::Resolved => {
                world.latent_crises.remove(&(country, kind));
            }
            CrisisState::Triggered => {
                world.latent_crises.remove(&(country, kind));
                trigger(world, country, kind);
                triggered.push((country, kind));
            }
        }
    }
    triggered
}

fn find_crisis(world: &HistoryWorld, country: CountryId, kind: CrisisKind) -> Option<CrisisId> {
    world
        .crises
        .values()
        .find(|c| c.country == country && c.kind == kind)
        .map(|c| c.id)
}

/// Monthly progress change for every (country, kind) under pressure or
/// still carrying latent progress
fn crisis_pressure(world: &HistoryWorld, config: &SimulationConfig) -> BTreeMap<(CountryId, CrisisKind), f32> {
    let mut deltas: BTreeMap<(CountryId, CrisisKind), f32> = BTreeMap::new();
    for &key in world.latent_crises.keys() {
        deltas.insert(key, -config.crisis_decay);
    }

    for id in world.existing_ids() {
        let Some(country) = world.living(id) else {
            continue;
        };
        let population = country.stats.population.max(1) as f32;
        let mut cultures: BTreeMap<CultureId, f32> = BTreeMap::new();
        let mut religions: BTreeMap<ReligionId, f32> = BTreeMap::new();
        for &p in &country.provinces {
            let province = &world.graph.provinces[p.index()];
            let pop = province.population as f32;
            for (c, share) in province.cultures.iter() {
                *cultures.entry(c).or_default() += share * pop / population;
            }
            for (r, share) in province.religions.iter() {
                *religions.entry(r).or_default() += share * pop / population;
            }
        }

        let minority_pressure = |share: f32| {
            (share > config.crisis_minority_threshold)
                .then(|| config.crisis_rate * (share - config.crisis_minority_threshold))
        };
        for (culture, share) in cultures {
            if Some(culture) == country.culture {
                continue;
            }
            if let Some(delta) = minority_pressure(share) {
                deltas.insert((id, CrisisKind::CultureConflict(culture)), delta);
            }
        }
        for (religion, share) in religions {
            if Some(religion) == country.religion {
                continue;
            }
            if let Some(delta) = minority_pressure(share) {
                deltas.insert((id, CrisisKind::ReligionConflict(religion)), delta);
            }
        }

        let stability = country.stats.stability;
        if stability < config.civil_war_stability && country.provinces.len() > 1 {
            let delta = config.crisis_rate * (config.civil_war_stability - stability) / config.civil_war_stability;
            deltas.insert((id, CrisisKind::CivilWar), delta);
        }
    }
    deltas
}

fn trigger(world: &mut HistoryWorld, country: CountryId, kind: CrisisKind) {
    let now = world.date();
    match kind {
        CrisisKind::ReligionConflict(religion) => {
            if let Some(c) = world.country_mut(country) {
                c.religion = Some(religion);
            }
            info!(?country, ?religion, %now, "Religious crisis converted the state");
        }
        CrisisKind::CultureConflict(culture) => {
            let provinces: Vec<ProvinceId> = world
                .living(country)
                .map(|c| {
                    c.provinces
                        .iter()
                        .copied()
                        .filter(|&p| world.graph.provinces[p.index()].dominant_culture() == Some(culture))
                        .collect()
                })
                .unwrap_or_default();
            match found_country(world, country, &provinces, Relation::War { since: now }) {
                Ok(rebel) => {
                    if let Some(c) = world.country_mut(rebel) {
                        c.culture = Some(culture);
                    }
                    info!(?country, ?rebel, provinces = provinces.len(), %now, "Cultural secession");
                }
                Err(_) => {
                    // The minority holds every province: the state adopts it
                    if let Some(c) = world.country_mut(country) {
                        c.culture = Some(culture);
                    }
                    info!(?country, ?culture, %now, "Cultural crisis shifted the state culture");
                }
            }
        }
        CrisisKind::CivilWar => {
            let provinces = world
                .living(country)
                .map(|c| outer_provinces(world, c, c.provinces.len() / 2))
                .unwrap_or_default();
            match found_country(world, country, &provinces, Relation::War { since: now }) {
                Ok(rebel) => info!(?country, ?rebel, provinces = provinces.len(), %now, "Civil war broke out"),
                Err(reason) => tracing::debug!(?country, %reason, "Civil war fizzled"),
            }
        }
    }
}
