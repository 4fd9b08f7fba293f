//! Syllable-based names for provinces, cultures, religions, countries and
//! settlements

use rand::Rng;
use rand_chacha::ChaCha8Rng;

use crate::core::seeds::SeedStream;
use crate::province::graph::ProvinceGraph;

const PREFIXES: [&str; 16] = [
    "Alden", "Bran", "Cael", "Dorn", "Eld", "Frey", "Grim", "Hal", "Isen", "Kael", "Lor", "Mar",
    "Nor", "Ost", "Ravel", "Tir",
];

const PLACE_SUFFIXES: [&str; 12] = [
    "mark", "ford", "heim", "dale", "wick", "ton", "bury", "wood", "vale", "gate", "moor", "reach",
];

const PEOPLE_SUFFIXES: [&str; 6] = ["ic", "ish", "an", "ese", "ian", "ene"];

const FAITH_FORMS: [&str; 5] = ["Faith of {}", "{} Creed", "Way of {}", "Church of {}", "{} Mysteries"];

const REALM_FORMS: [&str; 5] = ["Kingdom of {}", "{} Realm", "Duchy of {}", "{} League", "Principality of {}"];

fn syllables(rng: &mut ChaCha8Rng, suffixes: &[&str]) -> String {
    let prefix = PREFIXES[rng.gen_range(0..PREFIXES.len())];
    let suffix = suffixes[rng.gen_range(0..suffixes.len())];
    format!("{}{}", prefix, suffix)
}

pub fn place_name(rng: &mut ChaCha8Rng) -> String {
    syllables(rng, &PLACE_SUFFIXES)
}

pub fn culture_name(rng: &mut ChaCha8Rng) -> String {
    syllables(rng, &PEOPLE_SUFFIXES)
}

pub fn religion_name(rng: &mut ChaCha8Rng) -> String {
    let form = FAITH_FORMS[rng.gen_range(0..FAITH_FORMS.len())];
    form.replace("{}", &syllables(rng, &PLACE_SUFFIXES))
}

/// Country name built around its capital's name
pub fn country_name(rng: &mut ChaCha8Rng, capital: &str) -> String {
    let form = REALM_FORMS[rng.gen_range(0..REALM_FORMS.len())];
    form.replace("{}", capital)
}

/// Name every province on the naming stream
pub fn name_provinces(graph: &mut ProvinceGraph) {
    let mut rng = graph.seeds.rng(SeedStream::Naming);
    for province in &mut graph.provinces {
        province.name = if province.is_water() {
            format!("{} Waters", syllables(&mut rng, &PLACE_SUFFIXES))
        } else {
            place_name(&mut rng)
        };
    }
}
