//! Human-readable monthly history reports

use crate::core::calendar::MonthDate;
use crate::snapshot::diff::{Change, ChangeRecord};

/// Relative population change below which a change is left out of reports
pub const POPULATION_REPORT_THRESHOLD: f64 = 0.1;

/// Whether a record belongs in the monthly report. Population drift below
/// the threshold, crisis progress staying within the same tenth, and the
/// monthly churn of funds and stability are left out.
pub fn is_noteworthy(record: &ChangeRecord) -> bool {
    let Change::Field { field, from, to } = &record.change else {
        return true;
    };
    match *field {
        "funds" | "stability" => false,
        "population" => match (from.parse::<f64>(), to.parse::<f64>()) {
            (Ok(a), Ok(b)) => (b - a).abs() / a.max(1.0) >= POPULATION_REPORT_THRESHOLD,
            _ => true,
        },
        "progress" => match (from.parse::<f32>(), to.parse::<f32>()) {
            (Ok(a), Ok(b)) => (a * 10.0).floor() != (b * 10.0).floor(),
            _ => true,
        },
        _ => true,
    }
}

/// Render the noteworthy change records of one month as report text
pub fn render(date: MonthDate, records: &[ChangeRecord]) -> String {
    let title = format!("History of {}", date);
    let mut out = String::new();
    out.push_str(&format!("{}\n", title));
    out.push_str(&format!("{}\n", "=".repeat(title.chars().count())));

    let noteworthy: Vec<&ChangeRecord> = records.iter().filter(|r| is_noteworthy(r)).collect();
    if noteworthy.is_empty() {
        out.push_str("Nothing of note happened.\n");
        return out;
    }

    for record in noteworthy {
        let subject = format!("{} {}", capitalize(record.entity.kind()), record.name);
        let line = match &record.change {
            Change::Created => format!("{} appeared", subject),
            Change::Removed => format!("{} is gone", subject),
            Change::Field {
                field: "progress",
                from,
                to,
            } => format!("{}: progress changed from {} to {}", subject, percent(from), percent(to)),
            Change::Field { field, from, to } => format!("{}: {} changed from {} to {}", subject, field, from, to),
            Change::RelationsGained { relation, partners } => {
                format!("{} now has {} relations with {}", subject, relation, partners.join(", "))
            }
            Change::RelationsLost { relation, partners } => {
                format!("{} no longer has {} relations with {}", subject, relation, partners.join(", "))
            }
        };
        out.push_str(&format!("- {}\n", line));
    }
    out
}

fn percent(value: &str) -> String {
    match value.parse::<f32>() {
        Ok(p) => format!("{}%", (p * 100.0).round() as i32),
        Err(_) => value.to_string(),
    }
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::types::{CountryId, CrisisId, ProvinceId};
    use crate::snapshot::diff::EntityRef;

    #[test]
    fn test_quiet_month() {
        let text = render(MonthDate::new(1000, 3), &[]);
        assert!(text.starts_with("History of March of year 1000\n"));
        assert!(text.contains("Nothing of note happened."));
    }

    #[test]
    fn test_lines_per_record() {
        let records = vec![
            ChangeRecord {
                entity: EntityRef::Province(ProvinceId(4)),
                name: "Varn".into(),
                change: Change::Field {
                    field: "owner",
                    from: "nobody".into(),
                    to: "Kingdom of Osk".into(),
                },
            },
            ChangeRecord {
                entity: EntityRef::Country(CountryId(1)),
                name: "Kingdom of Osk".into(),
                change: Change::RelationsGained {
                    relation: "war",
                    partners: vec!["Teth".into(), "Ul".into()],
                },
            },
        ];
        let text = render(MonthDate::new(1001, 1), &records);
        assert!(text.contains("- Province Varn: owner changed from nobody to Kingdom of Osk\n"));
        assert!(text.contains("- Country Kingdom of Osk now has war relations with Teth, Ul\n"));
    }

    fn change(entity: EntityRef, field: &'static str, from: &str, to: &str) -> ChangeRecord {
        ChangeRecord {
            entity,
            name: "Varn".into(),
            change: Change::Field {
                field,
                from: from.into(),
                to: to.into(),
            },
        }
    }

    #[test]
    fn test_monthly_noise_is_left_out() {
        let province = EntityRef::Province(ProvinceId(0));
        let country = EntityRef::Country(CountryId(0));
        let crisis = EntityRef::Crisis(CrisisId(0));
        let records = vec![
            change(province, "population", "1000", "1010"),
            change(country, "funds", "10", "12.5"),
            change(country, "stability", "0.5", "0.45"),
            change(crisis, "progress", "0.21", "0.28"),
        ];
        assert!(records.iter().all(|r| !is_noteworthy(r)));
        let text = render(MonthDate::new(1000, 5), &records);
        assert!(text.contains("Nothing of note happened."));

        let text = render(
            MonthDate::new(1000, 5),
            &[
                change(province, "population", "1000", "1500"),
                change(crisis, "progress", "0.28", "0.31"),
            ],
        );
        assert!(text.contains("- Province Varn: population changed from 1000 to 1500\n"));
        assert!(text.contains("- Crisis Varn: progress changed from 28% to 31%\n"));
    }
}
