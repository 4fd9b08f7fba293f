//! Armies moving across the province graph

use std::collections::VecDeque;

use serde::{Deserialize, Serialize};

use crate::core::types::{ArmyId, CountryId, ProvinceId};

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Army {
    pub id: ArmyId,
    pub owner: CountryId,
    pub size: u32,
    /// Fighting value per soldier
    pub combat_value: f32,
    pub province: ProvinceId,
    pub target: Option<ProvinceId>,
    /// Provinces still to enter, next first
    pub route: VecDeque<ProvinceId>,
}

impl Army {
    pub fn new(id: ArmyId, owner: CountryId, province: ProvinceId, size: u32, combat_value: f32) -> Self {
        Self {
            id,
            owner,
            size,
            combat_value,
            province,
            target: None,
            route: VecDeque::new(),
        }
    }

    pub fn strength(&self) -> f32 {
        self.size as f32 * self.combat_value
    }

    pub fn is_idle(&self) -> bool {
        self.route.is_empty()
    }

    /// Set a new destination with the route leading to it. The route may
    /// start with the army's current province.
    pub fn order_move(&mut self, target: ProvinceId, route: Vec<ProvinceId>) {
        self.route = route.into_iter().skip_while(|&p| p == self.province).collect();
        self.target = if self.route.is_empty() { None } else { Some(target) };
    }

    /// Step one province along the route
    pub fn advance(&mut self) -> Option<ProvinceId> {
        let next = self.route.pop_front()?;
        self.province = next;
        if self.route.is_empty() {
            self.target = None;
        }
        Some(next)
    }

    pub fn halt(&mut self) {
        self.route.clear();
        self.target = None;
    }
}
