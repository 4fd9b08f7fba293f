//! Ordered influence shares (culture or religion) held within one province
//!
//! Shares always sum to 1 within floating point tolerance. Raising one
//! holder's share squeezes every other holder proportionally to its part of
//! the remaining mass; shares that fall below epsilon are folded into the
//! dominant holder instead of lingering as noise.

use serde::{Deserialize, Serialize};

/// Tolerance used when checking that shares sum to 1
pub const SHARE_TOLERANCE: f32 = 1e-3;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct InfluenceShares<K> {
    entries: Vec<(K, f32)>,
}

impl<K> Default for InfluenceShares<K> {
    fn default() -> Self {
        Self { entries: Vec::new() }
    }
}

impl<K: Copy + Ord> InfluenceShares<K> {
    /// A province fully held by one holder
    pub fn single(holder: K) -> Self {
        Self {
            entries: vec![(holder, 1.0)],
        }
    }

    /// Build from raw weights, normalizing them to sum to 1
    pub fn from_weights(weights: impl IntoIterator<Item = (K, f32)>) -> Self {
        let mut shares = Self {
            entries: weights.into_iter().filter(|(_, w)| *w > 0.0).collect(),
        };
        shares.entries.sort_by(|a, b| a.0.cmp(&b.0));
        shares.entries.dedup_by(|a, b| {
            if a.0 == b.0 {
                b.1 += a.1;
                true
            } else {
                false
            }
        });
        shares.normalize();
        shares
    }

    pub fn share(&self, holder: K) -> f32 {
        self.entries
            .iter()
            .find(|(k, _)| *k == holder)
            .map(|(_, s)| *s)
            .unwrap_or(0.0)
    }

    pub fn iter(&self) -> impl Iterator<Item = (K, f32)> + '_ {
        self.entries.iter().copied()
    }

    pub fn as_slice(&self) -> &[(K, f32)] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn total(&self) -> f32 {
        self.entries.iter().map(|(_, s)| s).sum()
    }

    /// Holder with the largest share; ties go to the lower id
    pub fn dominant(&self) -> Option<K> {
        self.entries
            .iter()
            .fold(None::<(K, f32)>, |best, &(k, s)| match best {
                Some((_, bs)) if bs >= s => best,
                _ => Some((k, s)),
            })
            .map(|(k, _)| k)
    }

    /// Rescale so shares sum to 1. Empty shares stay empty.
    pub fn normalize(&mut self) {
        let total = self.total();
        if total <= 0.0 {
            self.entries.clear();
            return;
        }
        for entry in &mut self.entries {
            entry.1 /= total;
        }
    }

    /// Set `target` to `new_share` and squeeze everyone else.
    ///
    /// Each other holder keeps its proportion of the non-target mass, so the
    /// total stays 1. If nobody else holds anything the target keeps it all.
    pub fn set_share_squeezing(&mut self, target: K, new_share: f32, epsilon: f32) {
        let new_share = new_share.clamp(0.0, 1.0);
        let others_mass: f32 = self
            .entries
            .iter()
            .filter(|(k, _)| *k != target)
            .map(|(_, s)| s)
            .sum();

        if others_mass <= 0.0 {
            self.entries = vec![(target, 1.0)];
            return;
        }

        let scale = (1.0 - new_share) / others_mass;
        for entry in &mut self.entries {
            if entry.0 != target {
                entry.1 *= scale;
            }
        }

        match self.entries.iter_mut().find(|(k, _)| *k == target) {
            Some(entry) => entry.1 = new_share,
            None => {
                self.entries.push((target, new_share));
                self.entries.sort_by(|a, b| a.0.cmp(&b.0));
            }
        }

        self.fold_residuals(epsilon);
    }

    /// Fold every share below `epsilon` into the dominant holder
    pub fn fold_residuals(&mut self, epsilon: f32) {
        if self.entries.len() <= 1 {
            if let Some(entry) = self.entries.first_mut() {
                entry.1 = 1.0;
            }
            return;
        }

        let Some(dominant) = self.dominant() else {
            return;
        };

        let residual: f32 = self
            .entries
            .iter()
            .filter(|(k, s)| *k != dominant && *s < epsilon)
            .map(|(_, s)| s)
            .sum();

        self.entries.retain(|(k, s)| *k == dominant || *s >= epsilon);
        if residual > 0.0 {
            if let Some(entry) = self.entries.iter_mut().find(|(k, _)| *k == dominant) {
                entry.1 += residual;
            }
        }
    }

    /// Mix in `amount` population carrying `other` shares into `own_amount`
    /// population carrying these shares.
    pub fn blend(&mut self, own_amount: f32, other: &InfluenceShares<K>, amount: f32) {
        let total = own_amount + amount;
        if total <= 0.0 || amount <= 0.0 {
            return;
        }

        let mut weights: Vec<(K, f32)> = self
            .entries
            .iter()
            .map(|&(k, s)| (k, s * own_amount))
            .collect();
        weights.extend(other.entries.iter().map(|&(k, s)| (k, s * amount)));
        *self = Self::from_weights(weights);
    }

    pub fn is_normalized(&self) -> bool {
        self.entries.is_empty() || (self.total() - 1.0).abs() <= SHARE_TOLERANCE
    }
}
