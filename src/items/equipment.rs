use super::types::{GearItem, GearSet, GearSlot, StatBlock};
use crate::core::stats::CombatEntity;
use std::collections::{BTreeMap, HashMap};

/// Equip-slot assignments plus the catalog of known gear sets. Only item ids
/// are saved, through the progress record's `Loadout`.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct GearLedger {
    pub head: Option<GearItem>,
    pub chest: Option<GearItem>,
    pub legs: Option<GearItem>,
    pub feet: Option<GearItem>,
    pub hands: Option<GearItem>,
    pub main_hand: Option<GearItem>,
    pub off_hand: Option<GearItem>,
    pub accessory: Option<GearItem>,
    sets: HashMap<String, GearSet>,
}

impl GearLedger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_sets(sets: impl IntoIterator<Item = GearSet>) -> Self {
        let mut ledger = Self::new();
        for set in sets {
            ledger.register_set(set);
        }
        ledger
    }

    pub fn register_set(&mut self, set: GearSet) {
        self.sets.insert(set.id.clone(), set);
    }

    pub fn set(&self, id: &str) -> Option<&GearSet> {
        self.sets.get(id)
    }

    pub fn get(&self, slot: GearSlot) -> &Option<GearItem> {
        match slot {
            GearSlot::Head => &self.head,
            GearSlot::Chest => &self.chest,
            GearSlot::Legs => &self.legs,
            GearSlot::Feet => &self.feet,
            GearSlot::Hands => &self.hands,
            GearSlot::MainHand => &self.main_hand,
            GearSlot::OffHand => &self.off_hand,
            GearSlot::Accessory => &self.accessory,
        }
    }

    fn slot_mut(&mut self, slot: GearSlot) -> &mut Option<GearItem> {
        match slot {
            GearSlot::Head => &mut self.head,
            GearSlot::Chest => &mut self.chest,
            GearSlot::Legs => &mut self.legs,
            GearSlot::Feet => &mut self.feet,
            GearSlot::Hands => &mut self.hands,
            GearSlot::MainHand => &mut self.main_hand,
            GearSlot::OffHand => &mut self.off_hand,
            GearSlot::Accessory => &mut self.accessory,
        }
    }

    /// Puts `item` into `slot`, replacing any previous occupant.
    /// Returns false without mutating if the item belongs to another slot.
    pub fn equip(&mut self, item: GearItem, slot: GearSlot) -> bool {
        if item.slot != slot {
            return false;
        }
        *self.slot_mut(slot) = Some(item);
        true
    }

    pub fn unequip(&mut self, slot: GearSlot) -> Option<GearItem> {
        self.slot_mut(slot).take()
    }

    pub fn iter_equipped(&self) -> impl Iterator<Item = &GearItem> {
        [
            &self.head,
            &self.chest,
            &self.legs,
            &self.feet,
            &self.hands,
            &self.main_hand,
            &self.off_hand,
            &self.accessory,
        ]
        .into_iter()
        .filter_map(|item| item.as_ref())
    }

    /// Equipped piece count per set id.
    pub fn set_piece_counts(&self) -> BTreeMap<&str, u32> {
        let mut counts = BTreeMap::new();
        for set_id in self.iter_equipped().filter_map(|i| i.set_id.as_deref()) {
            *counts.entry(set_id).or_insert(0) += 1;
        }
        counts
    }

    /// Base stats of every equipped item plus all reached set-bonus tiers.
    pub fn calculate_total_stats(&self) -> StatBlock {
        let mut total = self
            .iter_equipped()
            .fold(StatBlock::new(), |acc, item| acc + item.stats);

        for (set_id, count) in self.set_piece_counts() {
            if let Some(set) = self.sets.get(set_id) {
                total += set.bonus_for(count);
            }
        }
        total
    }

    /// Folds the gear totals into `entity` once. Returns false if gear was
    /// already applied to this entity.
    pub fn apply_gear_stats(&self, entity: &mut CombatEntity) -> bool {
        if entity.applied.gear {
            return false;
        }
        let total = self.calculate_total_stats();
        let stats = &mut entity.stats;
        stats.attack += total.attack;
        stats.defense += total.defense;
        stats.speed += total.speed;
        stats.add_max_health(total.health);
        stats.add_max_energy(total.energy);
        entity.applied.gear = true;
        true
    }
}
