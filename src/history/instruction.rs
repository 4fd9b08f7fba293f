//! Instructions queued by the AI or submitted from outside

use std::collections::VecDeque;

use serde::{Deserialize, Serialize};

use crate::core::types::{ArmyId, CountryId, ProvinceId};
use crate::history::diplomacy::DiplomaticAction;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum Instruction {
    Diplomacy {
        actor: CountryId,
        target: CountryId,
        action: DiplomaticAction,
    },
    /// Absorb a vassal
    Annex {
        actor: CountryId,
        target: CountryId,
    },
    /// Split the given provinces off into a new country
    FoundCountry {
        parent: CountryId,
        provinces: Vec<ProvinceId>,
    },
    BuildArmy {
        country: CountryId,
        province: ProvinceId,
    },
    MoveArmy {
        army: ArmyId,
        target: ProvinceId,
    },
    DisbandArmy {
        army: ArmyId,
    },
    /// Settle an unowned land province next to the country's territory
    Colonize {
        country: CountryId,
        province: ProvinceId,
    },
}

impl Instruction {
    pub fn label(&self) -> &'static str {
        match self {
            Instruction::Diplomacy { .. } => "diplomacy",
            Instruction::Annex { .. } => "annex",
            Instruction::FoundCountry { .. } => "found country",
            Instruction::BuildArmy { .. } => "build army",
            Instruction::MoveArmy { .. } => "move army",
            Instruction::DisbandArmy { .. } => "disband army",
            Instruction::Colonize { .. } => "colonize",
        }
    }
}

/// FIFO of instructions drained once per month
#[derive(Clone, Debug, Default)]
pub struct InstructionQueue {
    queue: VecDeque<Instruction>,
}

impl InstructionQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, instruction: Instruction) {
        self.queue.push_back(instruction);
    }

    pub fn pop(&mut self) -> Option<Instruction> {
        self.queue.pop_front()
    }

    pub fn len(&self) -> usize {
        self.queue.len()
    }

    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_queue_is_fifo() {
        let mut queue = InstructionQueue::new();
        queue.push(Instruction::DisbandArmy { army: ArmyId(1) });
        queue.push(Instruction::DisbandArmy { army: ArmyId(2) });
        assert_eq!(queue.pop(), Some(Instruction::DisbandArmy { army: ArmyId(1) }));
        assert_eq!(queue.len(), 1);
    }
}
