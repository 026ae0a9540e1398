use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum GearSlot {
    Head,
    Chest,
    Legs,
    Feet,
    Hands,
    MainHand,
    OffHand,
    Accessory,
}

impl GearSlot {
    pub const ALL: [GearSlot; 8] = [
        GearSlot::Head,
        GearSlot::Chest,
        GearSlot::Legs,
        GearSlot::Feet,
        GearSlot::Hands,
        GearSlot::MainHand,
        GearSlot::OffHand,
        GearSlot::Accessory,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            GearSlot::Head => "Head",
            GearSlot::Chest => "Chest",
            GearSlot::Legs => "Legs",
            GearSlot::Feet => "Feet",
            GearSlot::Hands => "Hands",
            GearSlot::MainHand => "Main Hand",
            GearSlot::OffHand => "Off Hand",
            GearSlot::Accessory => "Accessory",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Rarity {
    Common = 0,
    Uncommon = 1,
    Rare = 2,
    Epic = 3,
    Legendary = 4,
}

impl Rarity {
    /// Returns the display name for this rarity tier.
    pub fn name(&self) -> &'static str {
        match self {
            Rarity::Common => "Common",
            Rarity::Uncommon => "Uncommon",
            Rarity::Rare => "Rare",
            Rarity::Epic => "Epic",
            Rarity::Legendary => "Legendary",
        }
    }
}

/// Flat stat deltas contributed by gear and set bonuses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct StatBlock {
    pub attack: u32,
    pub defense: u32,
    pub health: u32,
    pub speed: u32,
    pub energy: u32,
}

impl StatBlock {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

impl std::ops::Add for StatBlock {
    type Output = StatBlock;

    fn add(self, rhs: StatBlock) -> StatBlock {
        StatBlock {
            attack: self.attack + rhs.attack,
            defense: self.defense + rhs.defense,
            health: self.health + rhs.health,
            speed: self.speed + rhs.speed,
            energy: self.energy + rhs.energy,
        }
    }
}

impl std::ops::AddAssign for StatBlock {
    fn add_assign(&mut self, rhs: StatBlock) {
        *self = *self + rhs;
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GearItem {
    pub id: String,
    pub name: String,
    pub slot: GearSlot,
    pub rarity: Rarity,
    pub level: u32,
    pub stats: StatBlock,
    pub set_id: Option<String>,
}

/// Bonus granted once `pieces` items of a set are equipped.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SetBonus {
    pub pieces: u32,
    pub stats: StatBlock,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GearSet {
    pub id: String,
    pub name: String,
    /// Ordered by ascending piece threshold; all reached tiers apply.
    pub bonuses: Vec<SetBonus>,
}

impl GearSet {
    /// Sum of every tier whose threshold is met by `equipped` pieces.
    pub fn bonus_for(&self, equipped: u32) -> StatBlock {
        self.bonuses
            .iter()
            .filter(|b| b.pieces <= equipped)
            .fold(StatBlock::new(), |acc, b| acc + b.stats)
    }
}
