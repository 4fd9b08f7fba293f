//! Monthly country upkeep and legitimacy

use std::collections::BTreeMap;

use crate::core::config::SimulationConfig;
use crate::core::types::{CountryId, CultureId, ProvinceId, ReligionId};
use crate::history::world::HistoryWorld;
use crate::province::settlement::city_in;

/// Stability lost per ongoing war
const WAR_STABILITY_PENALTY: f32 = 0.1;

/// Stability lost at a fully foreign population
const DIVERSITY_STABILITY_PENALTY: f32 = 0.5;

/// Stability lost while in debt
const DEBT_STABILITY_PENALTY: f32 = 0.2;

/// Recalculate income, funds, population, strength, stability and the
/// dominant culture and religion of every existing country
pub fn run_upkeep(world: &mut HistoryWorld, config: &SimulationConfig) {
    for id in world.existing_ids() {
        let Some(country) = world.country(id) else {
            continue;
        };

        let mut population: u64 = 0;
        let mut cultures: BTreeMap<CultureId, f64> = BTreeMap::new();
        let mut religions: BTreeMap<ReligionId, f64> = BTreeMap::new();
        for &p in &country.provinces {
            let province = &world.graph.provinces[p.index()];
            let pop = province.population as f64;
            population += province.population as u64;
            for (culture, share) in province.cultures.iter() {
                *cultures.entry(culture).or_default() += share as f64 * pop;
            }
            for (religion, share) in province.religions.iter() {
                *religions.entry(religion).or_default() += share as f64 * pop;
            }
        }

        let (soldiers, strength) = country
            .armies
            .iter()
            .filter_map(|a| world.armies.get(a))
            .fold((0u64, 0.0f32), |(n, s), a| (n + a.size as u64, s + a.strength()));

        let income = population as f32 * config.tax_per_capita * country.government.tax_modifier();
        let maintenance = soldiers as f32 * config.maintenance_per_soldier;
        let funds = country.funds + income - maintenance;

        let culture = dominant(&cultures).or(country.culture);
        let religion = dominant(&religions).or(country.religion);
        let state_culture_share = match (culture, population) {
            (Some(c), p) if p > 0 => (cultures.get(&c).copied().unwrap_or(0.0) / p as f64) as f32,
            _ => 1.0,
        };

        let wars = country.enemies().count() as f32;
        let mut stability = country.government.base_stability()
            - wars * WAR_STABILITY_PENALTY
            - (1.0 - state_culture_share) * DIVERSITY_STABILITY_PENALTY;
        if funds < 0.0 {
            stability -= DEBT_STABILITY_PENALTY;
        }

        let capital = match country.capital {
            Some(c) if country.provinces.contains(&c) => Some(c),
            _ => most_populous(world, country.provinces.iter().copied()),
        };
        let capital_city = capital.and_then(|c| city_in(&world.graph, c));

        let Some(country) = world.country_mut(id) else {
            continue;
        };
        country.funds = funds;
        country.culture = culture;
        country.religion = religion;
        country.capital = capital;
        country.capital_city = capital_city;
        country.stats.population = population;
        country.stats.income = income;
        country.stats.military_strength = strength;
        country.stats.stability = stability.clamp(0.0, 1.0);
    }
}

/// Every land province is claimed by its owner and by each existing country
/// of the province's dominant culture that owns a bordering province
pub fn recalculate_legitimacy(world: &mut HistoryWorld) {
    let claimants: Vec<Vec<CountryId>> = world
        .graph
        .provinces
        .iter()
        .map(|province| {
            if province.is_water() {
                return Vec::new();
            }
            let culture = province.dominant_culture();
            let mut claims: Vec<CountryId> = province.owner.into_iter().collect();
            for &n in &province.neighbors {
                let Some(owner) = world.graph.provinces[n.index()].owner else {
                    continue;
                };
                let Some(country) = world.living(owner) else {
                    continue;
                };
                if culture.is_some() && country.culture == culture {
                    claims.push(owner);
                }
            }
            claims.sort();
            claims.dedup();
            claims
        })
        .collect();

    for (province, claims) in world.graph.provinces.iter_mut().zip(claimants) {
        province.legitimate_claimants = claims;
    }
}

fn dominant<K: Copy + Ord>(weights: &BTreeMap<K, f64>) -> Option<K> {
    weights
        .iter()
        .fold(None::<(K, f64)>, |best, (&k, &w)| match best {
            Some((_, bw)) if bw >= w => best,
            _ if w > 0.0 => Some((k, w)),
            _ => best,
        })
        .map(|(k, _)| k)
}

fn most_populous(world: &HistoryWorld, provinces: impl Iterator<Item = ProvinceId>) -> Option<ProvinceId> {
    provinces.max_by(|a, b| {
        world.graph.provinces[a.index()]
            .population
            .cmp(&world.graph.provinces[b.index()].population)
            .then(b.cmp(a))
    })
}
