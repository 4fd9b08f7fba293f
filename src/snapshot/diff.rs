//! Diffing two consecutive snapshots into change records
//!
//! Every entity category is joined by id. Records present only in the newer
//! snapshot are `Created`, records present only in the older one `Removed`,
//! and each differing field yields one `Field` record. Relation sets are
//! compared per relation kind with a sorted merge.

use std::collections::BTreeMap;

use crate::core::calendar::MonthDate;
use crate::core::error::{ChronicleError, Result};
use crate::core::types::{ArmyId, CountryId, CrisisId, ProvinceId, SettlementId};
use crate::history::diplomacy::Relation;
use crate::snapshot::capture::{CountryRecord, HistorySnapshot};

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub enum EntityRef {
    Province(ProvinceId),
    Settlement(SettlementId),
    Country(CountryId),
    Army(ArmyId),
    Crisis(CrisisId),
}

impl EntityRef {
    pub fn kind(&self) -> &'static str {
        match self {
            EntityRef::Province(_) => "province",
            EntityRef::Settlement(_) => "settlement",
            EntityRef::Country(_) => "country",
            EntityRef::Army(_) => "army",
            EntityRef::Crisis(_) => "crisis",
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum Change {
    Created,
    Removed,
    Field {
        field: &'static str,
        from: String,
        to: String,
    },
    RelationsGained {
        relation: &'static str,
        partners: Vec<String>,
    },
    RelationsLost {
        relation: &'static str,
        partners: Vec<String>,
    },
}

#[derive(Clone, Debug, PartialEq)]
pub struct ChangeRecord {
    pub entity: EntityRef,
    /// Display name of the entity in the newer snapshot (older if removed)
    pub name: String,
    pub change: Change,
}

/// Changes from `prev` to `next`, in category order then id order
pub fn diff(prev: &HistorySnapshot, next: &HistorySnapshot) -> Result<Vec<ChangeRecord>> {
    let mut records = Vec::new();
    diff_countries(prev, next, &mut records)?;
    diff_provinces(prev, next, &mut records)?;
    diff_settlements(prev, next, &mut records)?;
    diff_armies(prev, next, &mut records)?;
    diff_crises(prev, next, &mut records)?;
    Ok(records)
}

/// Merge two sorted id lists in O(n + m), returning (gained, lost)
pub fn merge_sorted_ids<T: Copy + Ord>(prev: &[T], next: &[T]) -> (Vec<T>, Vec<T>) {
    let mut gained = Vec::new();
    let mut lost = Vec::new();
    let (mut i, mut j) = (0, 0);
    while i < prev.len() && j < next.len() {
        match prev[i].cmp(&next[j]) {
            std::cmp::Ordering::Less => {
                lost.push(prev[i]);
                i += 1;
            }
            std::cmp::Ordering::Greater => {
                gained.push(next[j]);
                j += 1;
            }
            std::cmp::Ordering::Equal => {
                i += 1;
                j += 1;
            }
        }
    }
    lost.extend_from_slice(&prev[i..]);
    gained.extend_from_slice(&next[j..]);
    (gained, lost)
}

/// Join two id-sorted record lists, calling `each` with both sides
fn join_by_id<'a, R, K: Ord>(
    prev: &'a [R],
    next: &'a [R],
    key: impl Fn(&R) -> K,
    mut each: impl FnMut(Option<&'a R>, Option<&'a R>) -> Result<()>,
) -> Result<()> {
    let (mut i, mut j) = (0, 0);
    while i < prev.len() || j < next.len() {
        let order = match (prev.get(i), next.get(j)) {
            (Some(a), Some(b)) => key(a).cmp(&key(b)),
            (Some(_), None) => std::cmp::Ordering::Less,
            (None, _) => std::cmp::Ordering::Greater,
        };
        match order {
            std::cmp::Ordering::Less => {
                each(prev.get(i), None)?;
                i += 1;
            }
            std::cmp::Ordering::Greater => {
                each(None, next.get(j))?;
                j += 1;
            }
            std::cmp::Ordering::Equal => {
                each(prev.get(i), next.get(j))?;
                i += 1;
                j += 1;
            }
        }
    }
    Ok(())
}

fn country_name(snapshot: &HistorySnapshot, id: CountryId) -> Result<String> {
    snapshot
        .country(id)
        .map(|c| c.name.clone())
        .ok_or_else(|| unknown("country", id.0, snapshot.date))
}

fn unknown(kind: &'static str, id: u32, date: MonthDate) -> ChronicleError {
    ChronicleError::UnknownEntity { kind, id, date }
}

fn owner_name(snapshot: &HistorySnapshot, owner: Option<CountryId>) -> Result<String> {
    match owner {
        Some(id) => country_name(snapshot, id),
        None => Ok("nobody".to_string()),
    }
}

fn optional<T: std::fmt::Debug>(value: Option<T>) -> String {
    value.map(|v| format!("{:?}", v)).unwrap_or_else(|| "none".to_string())
}

fn field(entity: EntityRef, name: &str, field: &'static str, from: String, to: String) -> ChangeRecord {
    ChangeRecord {
        entity,
        name: name.to_string(),
        change: Change::Field { field, from, to },
    }
}

fn lifecycle(entity: EntityRef, name: &str, change: Change) -> ChangeRecord {
    ChangeRecord {
        entity,
        name: name.to_string(),
        change,
    }
}

fn province_name(snapshot: &HistorySnapshot, id: ProvinceId) -> Result<String> {
    snapshot
        .province(id)
        .map(|p| p.name.clone())
        .ok_or_else(|| unknown("province", id.0, snapshot.date))
}

fn optional_province(snapshot: &HistorySnapshot, id: Option<ProvinceId>) -> Result<String> {
    match id {
        Some(id) => province_name(snapshot, id),
        None => Ok("none".to_string()),
    }
}

fn country_list(snapshot: &HistorySnapshot, ids: &[CountryId]) -> Result<String> {
    if ids.is_empty() {
        return Ok("none".to_string());
    }
    let names = ids
        .iter()
        .map(|&id| country_name(snapshot, id))
        .collect::<Result<Vec<_>>>()?;
    Ok(names.join(", "))
}

fn diff_countries(prev: &HistorySnapshot, next: &HistorySnapshot, out: &mut Vec<ChangeRecord>) -> Result<()> {
    join_by_id(&prev.countries, &next.countries, |c| c.id, |a, b| {
        match (a, b) {
            (None, Some(b)) => out.push(lifecycle(EntityRef::Country(b.id), &b.name, Change::Created)),
            (Some(a), None) => out.push(lifecycle(EntityRef::Country(a.id), &a.name, Change::Removed)),
            (Some(a), Some(b)) => {
                let entity = EntityRef::Country(b.id);
                let mut push = |name: &'static str, from: String, to: String| {
                    out.push(field(entity, &b.name, name, from, to));
                };
                if a.name != b.name {
                    push("name", a.name.clone(), b.name.clone());
                }
                if a.government != b.government {
                    push("government", format!("{:?}", a.government), format!("{:?}", b.government));
                }
                if a.culture != b.culture {
                    push("culture", optional(a.culture), optional(b.culture));
                }
                if a.religion != b.religion {
                    push("religion", optional(a.religion), optional(b.religion));
                }
                if a.capital != b.capital {
                    push(
                        "capital",
                        optional_province(prev, a.capital)?,
                        optional_province(next, b.capital)?,
                    );
                }
                if a.province_count != b.province_count {
                    push("provinces", a.province_count.to_string(), b.province_count.to_string());
                }
                if a.population != b.population {
                    push("population", a.population.to_string(), b.population.to_string());
                }
                if a.funds != b.funds {
                    push("funds", a.funds.to_string(), b.funds.to_string());
                }
                if a.stability != b.stability {
                    push("stability", a.stability.to_string(), b.stability.to_string());
                }
                match (a.exists, b.exists) {
                    (true, false) => out.push(lifecycle(entity, &b.name, Change::Removed)),
                    (false, true) => out.push(lifecycle(entity, &b.name, Change::Created)),
                    _ => {}
                }
                diff_relations(prev, next, a, b, out)?;
            }
            (None, None) => {}
        }
        Ok(())
    })
}

fn diff_relations(
    prev: &HistorySnapshot,
    next: &HistorySnapshot,
    a: &CountryRecord,
    b: &CountryRecord,
    out: &mut Vec<ChangeRecord>,
) -> Result<()> {
    // Partners per relation label, each list sorted by id
    let group = |relations: &[(CountryId, Relation)]| {
        let mut groups: BTreeMap<&'static str, Vec<CountryId>> = BTreeMap::new();
        for &(id, relation) in relations {
            groups.entry(relation.label()).or_default().push(id);
        }
        for ids in groups.values_mut() {
            ids.sort();
        }
        groups
    };
    let before = group(&a.relations);
    let after = group(&b.relations);

    let mut labels: Vec<&'static str> = before.keys().chain(after.keys()).copied().collect();
    labels.sort();
    labels.dedup();

    let empty = Vec::new();
    for label in labels {
        let (gained, lost) = merge_sorted_ids(
            before.get(label).unwrap_or(&empty),
            after.get(label).unwrap_or(&empty),
        );
        let entity = EntityRef::Country(b.id);
        if !gained.is_empty() {
            let partners = gained
                .iter()
                .map(|&id| country_name(next, id))
                .collect::<Result<Vec<_>>>()?;
            out.push(lifecycle(
                entity,
                &b.name,
                Change::RelationsGained {
                    relation: label,
                    partners,
                },
            ));
        }
        if !lost.is_empty() {
            let partners = lost
                .iter()
                .map(|&id| country_name(prev, id))
                .collect::<Result<Vec<_>>>()?;
            out.push(lifecycle(
                entity,
                &b.name,
                Change::RelationsLost {
                    relation: label,
                    partners,
                },
            ));
        }
    }
    Ok(())
}

fn diff_provinces(prev: &HistorySnapshot, next: &HistorySnapshot, out: &mut Vec<ChangeRecord>) -> Result<()> {
    join_by_id(&prev.provinces, &next.provinces, |p| p.id, |a, b| {
        let (Some(a), Some(b)) = (a, b) else {
            // Provinces are never created or destroyed after generation
            let id = a.or(b).map(|p| p.id.0).unwrap_or(0);
            return Err(unknown("province", id, next.date));
        };
        let entity = EntityRef::Province(b.id);
        if a.name != b.name {
            out.push(field(entity, &b.name, "name", a.name.clone(), b.name.clone()));
        }
        if a.owner != b.owner {
            out.push(field(
                entity,
                &b.name,
                "owner",
                owner_name(prev, a.owner)?,
                owner_name(next, b.owner)?,
            ));
        } else if let Some(owner) = b.owner {
            // Owner ids must resolve even when unchanged
            country_name(next, owner)?;
        }
        if a.population != b.population {
            out.push(field(entity, &b.name, "population", a.population.to_string(), b.population.to_string()));
        }
        if a.culture != b.culture {
            out.push(field(entity, &b.name, "culture", optional(a.culture), optional(b.culture)));
        }
        if a.religion != b.religion {
            out.push(field(entity, &b.name, "religion", optional(a.religion), optional(b.religion)));
        }
        if a.claimants != b.claimants {
            out.push(field(
                entity,
                &b.name,
                "claimants",
                country_list(prev, &a.claimants)?,
                country_list(next, &b.claimants)?,
            ));
        }
        Ok(())
    })
}

fn diff_settlements(prev: &HistorySnapshot, next: &HistorySnapshot, out: &mut Vec<ChangeRecord>) -> Result<()> {
    join_by_id(&prev.settlements, &next.settlements, |s| s.id, |a, b| {
        match (a, b) {
            (None, Some(b)) => out.push(lifecycle(EntityRef::Settlement(b.id), &b.name, Change::Created)),
            (Some(a), None) => out.push(lifecycle(EntityRef::Settlement(a.id), &a.name, Change::Removed)),
            (Some(a), Some(b)) => {
                let entity = EntityRef::Settlement(b.id);
                if a.name != b.name {
                    out.push(field(entity, &b.name, "name", a.name.clone(), b.name.clone()));
                }
                if a.kind != b.kind {
                    out.push(field(entity, &b.name, "kind", format!("{:?}", a.kind), format!("{:?}", b.kind)));
                }
                if a.province != b.province {
                    out.push(field(
                        entity,
                        &b.name,
                        "province",
                        province_name(prev, a.province)?,
                        province_name(next, b.province)?,
                    ));
                }
                if a.population != b.population {
                    out.push(field(entity, &b.name, "population", a.population.to_string(), b.population.to_string()));
                }
            }
            (None, None) => {}
        }
        Ok(())
    })
}

fn diff_armies(prev: &HistorySnapshot, next: &HistorySnapshot, out: &mut Vec<ChangeRecord>) -> Result<()> {
    join_by_id(&prev.armies, &next.armies, |a| a.id, |a, b| {
        match (a, b) {
            (None, Some(b)) => {
                let name = format!("#{} of {}", b.id.0, country_name(next, b.owner)?);
                out.push(lifecycle(EntityRef::Army(b.id), &name, Change::Created));
            }
            (Some(a), None) => {
                let name = format!("#{} of {}", a.id.0, country_name(prev, a.owner)?);
                out.push(lifecycle(EntityRef::Army(a.id), &name, Change::Removed));
            }
            (Some(a), Some(b)) => {
                let name = format!("#{} of {}", b.id.0, country_name(next, b.owner)?);
                let entity = EntityRef::Army(b.id);
                if a.owner != b.owner {
                    out.push(field(
                        entity,
                        &name,
                        "owner",
                        country_name(prev, a.owner)?,
                        country_name(next, b.owner)?,
                    ));
                }
                if a.size != b.size {
                    out.push(field(entity, &name, "size", a.size.to_string(), b.size.to_string()));
                }
                if a.province != b.province {
                    out.push(field(
                        entity,
                        &name,
                        "location",
                        province_name(prev, a.province)?,
                        province_name(next, b.province)?,
                    ));
                }
                if a.target != b.target {
                    out.push(field(
                        entity,
                        &name,
                        "target",
                        optional_province(prev, a.target)?,
                        optional_province(next, b.target)?,
                    ));
                }
            }
            (None, None) => {}
        }
        Ok(())
    })
}

fn diff_crises(prev: &HistorySnapshot, next: &HistorySnapshot, out: &mut Vec<ChangeRecord>) -> Result<()> {
    join_by_id(&prev.crises, &next.crises, |c| c.id, |a, b| {
        match (a, b) {
            (None, Some(b)) => {
                let name = format!("{} in {}", b.kind.label(), country_name(next, b.country)?);
                out.push(lifecycle(EntityRef::Crisis(b.id), &name, Change::Created));
            }
            (Some(a), None) => {
                let name = format!("{} in {}", a.kind.label(), country_name(prev, a.country)?);
                out.push(lifecycle(EntityRef::Crisis(a.id), &name, Change::Removed));
            }
            (Some(a), Some(b)) => {
                let name = format!("{} in {}", b.kind.label(), country_name(next, b.country)?);
                let entity = EntityRef::Crisis(b.id);
                if a.kind != b.kind {
                    out.push(field(entity, &name, "kind", format!("{:?}", a.kind), format!("{:?}", b.kind)));
                }
                if a.country != b.country {
                    out.push(field(
                        entity,
                        &name,
                        "country",
                        country_name(prev, a.country)?,
                        country_name(next, b.country)?,
                    ));
                }
                if a.progress != b.progress {
                    out.push(field(entity, &name, "progress", a.progress.to_string(), b.progress.to_string()));
                }
            }
            (None, None) => {}
        }
        Ok(())
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::types::{CultureId, ReligionId};
    use crate::history::country::GovernmentType;
    use crate::history::crisis::CrisisKind;
    use crate::history::world::HistoryWorld;
    use crate::province::SettlementKind;
    use crate::snapshot::capture::{ArmyRecord, CrisisRecord, SettlementRecord};
    use crate::province::graph::test_support::square_grid;
    use proptest::prelude::*;

    fn two_country_world() -> HistoryWorld {
        let mut world = HistoryWorld::new(square_grid(3, 1, 1000));
        let a = world.add_country("Aland".into());
        let b = world.add_country("Bland".into());
        world.transfer_province(ProvinceId(0), Some(a));
        world.transfer_province(ProvinceId(2), Some(b));
        world
    }

    #[test]
    fn test_self_diff_is_empty() {
        let world = two_country_world();
        let snapshot = HistorySnapshot::capture(&world);
        assert!(diff(&snapshot, &snapshot).unwrap().is_empty());
    }

    #[test]
    fn test_owner_and_relation_changes() {
        let mut world = two_country_world();
        let prev = HistorySnapshot::capture(&world);
        world.transfer_province(ProvinceId(1), Some(CountryId(0)));
        world.set_relation(CountryId(0), CountryId(1), Relation::War { since: world.date() });
        let next = HistorySnapshot::capture(&world);

        let records = diff(&prev, &next).unwrap();
        assert!(records.iter().any(|r| r.entity == EntityRef::Province(ProvinceId(1))
            && r.change
                == Change::Field {
                    field: "owner",
                    from: "nobody".into(),
                    to: "Aland".into()
                }));
        assert!(records.iter().any(|r| r.entity == EntityRef::Country(CountryId(1))
            && r.change
                == Change::RelationsGained {
                    relation: "war",
                    partners: vec!["Aland".into()]
                }));
    }

    #[test]
    fn test_unknown_owner_is_fatal() {
        let world = two_country_world();
        let prev = HistorySnapshot::capture(&world);
        let mut next = prev.clone();
        next.provinces[1].owner = Some(CountryId(9));
        let err = diff(&prev, &next).unwrap_err();
        assert!(err.is_invariant_violation());
    }

    fn populated_snapshot() -> HistorySnapshot {
        let mut snapshot = HistorySnapshot::capture(&two_country_world());
        snapshot.settlements = vec![SettlementRecord {
            id: SettlementId(0),
            name: "Holm".into(),
            kind: SettlementKind::City,
            province: ProvinceId(0),
            population: 100,
        }];
        snapshot.armies = vec![ArmyRecord {
            id: ArmyId(0),
            owner: CountryId(0),
            size: 500,
            province: ProvinceId(0),
            target: None,
        }];
        snapshot.crises = vec![CrisisRecord {
            id: CrisisId(0),
            kind: CrisisKind::CivilWar,
            country: CountryId(0),
            progress: 0.2,
        }];
        snapshot
    }

    fn label(change: &Change) -> &'static str {
        match change {
            Change::Created => "created",
            Change::Removed => "removed",
            Change::Field { field, .. } => field,
            Change::RelationsGained { .. } => "relations gained",
            Change::RelationsLost { .. } => "relations lost",
        }
    }

    fn check(prev: &HistorySnapshot, entity: EntityRef, expected: &str, edit: impl Fn(&mut HistorySnapshot)) {
        let mut next = prev.clone();
        edit(&mut next);
        let records = diff(prev, &next).unwrap();
        assert_eq!(records.len(), 1, "{:?} {}: {:?}", entity, expected, records);
        assert_eq!(records[0].entity, entity);
        assert_eq!(label(&records[0].change), expected);
    }

    #[test]
    fn test_every_changed_field_yields_one_record() {
        let prev = populated_snapshot();
        check(&prev, EntityRef::Country(CountryId(0)), "name", |s| s.countries[0].name = "Renamed".into());
        check(&prev, EntityRef::Country(CountryId(0)), "government", |s| {
            let current = s.countries[0].government;
            s.countries[0].government = GovernmentType::ALL.iter().copied().find(|&g| g != current).unwrap();
        });
        check(&prev, EntityRef::Country(CountryId(0)), "culture", |s| s.countries[0].culture = Some(CultureId(99)));
        check(&prev, EntityRef::Country(CountryId(0)), "religion", |s| s.countries[0].religion = Some(ReligionId(99)));
        check(&prev, EntityRef::Country(CountryId(0)), "capital", |s| s.countries[0].capital = Some(ProvinceId(1)));
        check(&prev, EntityRef::Country(CountryId(0)), "provinces", |s| s.countries[0].province_count += 1);
        check(&prev, EntityRef::Country(CountryId(0)), "population", |s| s.countries[0].population += 1);
        check(&prev, EntityRef::Country(CountryId(0)), "funds", |s| s.countries[0].funds += 0.5);
        check(&prev, EntityRef::Country(CountryId(0)), "stability", |s| s.countries[0].stability -= 0.01);
        check(&prev, EntityRef::Country(CountryId(0)), "removed", |s| s.countries[0].exists = false);
        check(&prev, EntityRef::Country(CountryId(0)), "relations gained", |s| {
            s.countries[0].relations = vec![(CountryId(1), Relation::Friendly)]
        });
        check(&prev, EntityRef::Province(ProvinceId(1)), "name", |s| s.provinces[1].name = "Renamed".into());
        check(&prev, EntityRef::Province(ProvinceId(1)), "owner", |s| s.provinces[1].owner = Some(CountryId(1)));
        check(&prev, EntityRef::Province(ProvinceId(1)), "population", |s| s.provinces[1].population += 1);
        check(&prev, EntityRef::Province(ProvinceId(1)), "culture", |s| s.provinces[1].culture = Some(CultureId(99)));
        check(&prev, EntityRef::Province(ProvinceId(1)), "religion", |s| s.provinces[1].religion = Some(ReligionId(99)));
        check(&prev, EntityRef::Province(ProvinceId(1)), "claimants", |s| s.provinces[1].claimants = vec![CountryId(0)]);
        check(&prev, EntityRef::Settlement(SettlementId(0)), "name", |s| s.settlements[0].name = "Renamed".into());
        check(&prev, EntityRef::Settlement(SettlementId(0)), "kind", |s| s.settlements[0].kind = SettlementKind::Town);
        check(&prev, EntityRef::Settlement(SettlementId(0)), "province", |s| s.settlements[0].province = ProvinceId(1));
        check(&prev, EntityRef::Settlement(SettlementId(0)), "population", |s| s.settlements[0].population += 1);
        check(&prev, EntityRef::Army(ArmyId(0)), "owner", |s| s.armies[0].owner = CountryId(1));
        check(&prev, EntityRef::Army(ArmyId(0)), "size", |s| s.armies[0].size -= 1);
        check(&prev, EntityRef::Army(ArmyId(0)), "location", |s| s.armies[0].province = ProvinceId(1));
        check(&prev, EntityRef::Army(ArmyId(0)), "target", |s| s.armies[0].target = Some(ProvinceId(2)));
        check(&prev, EntityRef::Crisis(CrisisId(0)), "kind", |s| s.crises[0].kind = CrisisKind::CultureConflict(CultureId(0)));
        check(&prev, EntityRef::Crisis(CrisisId(0)), "country", |s| s.crises[0].country = CountryId(1));
        check(&prev, EntityRef::Crisis(CrisisId(0)), "progress", |s| s.crises[0].progress += 0.001);
    }

    #[test]
    fn test_small_changes_are_still_reported() {
        let prev = populated_snapshot();
        let mut next = prev.clone();
        next.countries[0].funds = 5000.0;
        next.countries[0].stability = 0.1;
        next.provinces[0].claimants = vec![CountryId(0)];
        next.provinces[0].population = 1009;
        let records = diff(&prev, &next).unwrap();
        assert_eq!(records.len(), 4);
    }

    #[test]
    fn test_merge_sorted_ids_example() {
        let (gained, lost) = merge_sorted_ids(&[1, 3, 5, 7], &[2, 3, 7, 8]);
        assert_eq!(gained, vec![2, 8]);
        assert_eq!(lost, vec![1, 5]);
    }

    proptest! {
        #[test]
        fn prop_merge_matches_set_difference(
            prev in proptest::collection::btree_set(0u32..64, 0..20),
            next in proptest::collection::btree_set(0u32..64, 0..20),
        ) {
            let a: Vec<u32> = prev.iter().copied().collect();
            let b: Vec<u32> = next.iter().copied().collect();
            let (gained, lost) = merge_sorted_ids(&a, &b);
            let expected_gained: Vec<u32> = next.difference(&prev).copied().collect();
            let expected_lost: Vec<u32> = prev.difference(&next).copied().collect();
            prop_assert_eq!(gained, expected_gained);
            prop_assert_eq!(lost, expected_lost);
        }
    }
}
