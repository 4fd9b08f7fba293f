//! Diplomatic relations as a mirrored state machine
//!
//! A relation is always stored from the holder's point of view: `Vassal`
//! means "I am their vassal", `Celestial` means "they pay me tribute". The
//! partner always holds the mirrored relation.

use serde::{Deserialize, Serialize};

use crate::core::calendar::MonthDate;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Relation {
    #[default]
    Neutral,
    Friendly,
    Alliance,
    Hostile,
    War { since: MonthDate },
    /// I am their vassal
    Vassal,
    /// They are my vassal
    Suzerain,
    /// I pay them tribute
    Tributary,
    /// They pay me tribute
    Celestial,
}

impl Relation {
    /// The same relation seen from the partner's side
    pub fn mirror(self) -> Self {
        match self {
            Relation::Vassal => Relation::Suzerain,
            Relation::Suzerain => Relation::Vassal,
            Relation::Tributary => Relation::Celestial,
            Relation::Celestial => Relation::Tributary,
            other => other,
        }
    }

    pub fn is_war(&self) -> bool {
        matches!(self, Relation::War { .. })
    }

    /// Short label used in reports and relation diffs
    pub fn label(&self) -> &'static str {
        match self {
            Relation::Neutral => "neutral",
            Relation::Friendly => "friendly",
            Relation::Alliance => "alliance",
            Relation::Hostile => "hostile",
            Relation::War { .. } => "war",
            Relation::Vassal => "overlord",
            Relation::Suzerain => "vassal",
            Relation::Tributary => "tribute receiver",
            Relation::Celestial => "tributary",
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DiplomaticAction {
    Befriend,
    Denounce,
    FormAlliance,
    BreakAlliance,
    DeclareWar,
    MakePeace,
    /// Impose vassalage on a war enemy
    Vassalize,
    /// Free a vassal
    Release,
    DemandTribute,
    EndTribute,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TransitionRejected {
    /// The action makes no sense from the current relation
    NotApplicable,
    /// The war has not yet run for the minimum number of months
    WarTooRecent { months: i64, required: u32 },
}

/// Relation the actor holds toward the target after `action`
pub fn transition(
    current: Relation,
    action: DiplomaticAction,
    now: MonthDate,
    min_war_months: u32,
) -> Result<Relation, TransitionRejected> {
    use DiplomaticAction::*;

    let war_matured = |since: MonthDate| {
        let months = now.months_since(since);
        if months >= min_war_months as i64 {
            Ok(())
        } else {
            Err(TransitionRejected::WarTooRecent {
                months,
                required: min_war_months,
            })
        }
    };

    match (action, current) {
        (Befriend, Relation::Neutral) => Ok(Relation::Friendly),
        (Befriend, Relation::Hostile) => Ok(Relation::Neutral),
        (Denounce, Relation::Neutral | Relation::Friendly) => Ok(Relation::Hostile),
        (FormAlliance, Relation::Friendly) => Ok(Relation::Alliance),
        (BreakAlliance, Relation::Alliance) => Ok(Relation::Neutral),
        (
            DeclareWar,
            Relation::Neutral
            | Relation::Friendly
            | Relation::Hostile
            | Relation::Vassal
            | Relation::Tributary
            | Relation::Celestial,
        ) => Ok(Relation::War { since: now }),
        (MakePeace, Relation::War { since }) => war_matured(since).map(|_| Relation::Neutral),
        (Vassalize, Relation::War { since }) => war_matured(since).map(|_| Relation::Suzerain),
        (Release, Relation::Suzerain) => Ok(Relation::Friendly),
        (DemandTribute, Relation::Neutral | Relation::Hostile | Relation::Friendly) => {
            Ok(Relation::Celestial)
        }
        (EndTribute, Relation::Tributary | Relation::Celestial) => Ok(Relation::Neutral),
        _ => Err(TransitionRejected::NotApplicable),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn at(year: i32, month: u8) -> MonthDate {
        MonthDate::new(year, month)
    }

    #[test]
    fn test_mirror_pairs() {
        assert_eq!(Relation::Vassal.mirror(), Relation::Suzerain);
        assert_eq!(Relation::Celestial.mirror(), Relation::Tributary);
        let war = Relation::War { since: at(1000, 3) };
        assert_eq!(war.mirror(), war);
        for r in [Relation::Vassal, Relation::Tributary, Relation::Alliance] {
            assert_eq!(r.mirror().mirror(), r);
        }
    }

    #[test]
    fn test_peace_waits_for_minimum_war_length() {
        let war = Relation::War { since: at(1000, 1) };
        assert_eq!(
            transition(war, DiplomaticAction::MakePeace, at(1000, 6), 12),
            Err(TransitionRejected::WarTooRecent {
                months: 5,
                required: 12
            })
        );
        assert_eq!(
            transition(war, DiplomaticAction::MakePeace, at(1001, 1), 12),
            Ok(Relation::Neutral)
        );
        assert!(transition(war, DiplomaticAction::Vassalize, at(1000, 2), 12).is_err());
        assert_eq!(
            transition(war, DiplomaticAction::Vassalize, at(1001, 2), 12),
            Ok(Relation::Suzerain)
        );
    }

    #[test]
    fn test_alliance_requires_friendship() {
        let now = at(1000, 1);
        assert_eq!(
            transition(Relation::Neutral, DiplomaticAction::FormAlliance, now, 12),
            Err(TransitionRejected::NotApplicable)
        );
        assert_eq!(
            transition(Relation::Friendly, DiplomaticAction::FormAlliance, now, 12),
            Ok(Relation::Alliance)
        );
        // Allies must break the alliance before fighting
        assert!(transition(Relation::Alliance, DiplomaticAction::DeclareWar, now, 12).is_err());
    }

    #[test]
    fn test_war_records_start_month() {
        let now = at(1003, 7);
        assert_eq!(
            transition(Relation::Hostile, DiplomaticAction::DeclareWar, now, 12),
            Ok(Relation::War { since: now })
        );
        assert!(transition(Relation::War { since: now }, DiplomaticAction::DeclareWar, now, 12).is_err());
    }
}
