use crate::Rarity;
use serde::{Deserialize, Serialize};

/// Rarities that carry bad-luck protection, highest first.
pub const PITY_TIERS: [Rarity; 4] = [
    Rarity::Mythic,
    Rarity::Legendary,
    Rarity::Epic,
    Rarity::Rare,
];

/// Packs opened since the last pull of each tier or better.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PityCounter {
    pub rare: u32,
    pub epic: u32,
    pub legendary: u32,
    pub mythic: u32,
}

impl PityCounter {
    pub fn get(&self, rarity: Rarity) -> Option<u32> {
        match rarity {
            Rarity::Rare => Some(self.rare),
            Rarity::Epic => Some(self.epic),
            Rarity::Legendary => Some(self.legendary),
            Rarity::Mythic => Some(self.mythic),
            Rarity::Common | Rarity::Uncommon => None,
        }
    }

    fn slot_mut(&mut self, rarity: Rarity) -> Option<&mut u32> {
        match rarity {
            Rarity::Rare => Some(&mut self.rare),
            Rarity::Epic => Some(&mut self.epic),
            Rarity::Legendary => Some(&mut self.legendary),
            Rarity::Mythic => Some(&mut self.mythic),
            Rarity::Common | Rarity::Uncommon => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PityThresholds {
    pub rare: u32,
    pub epic: u32,
    pub legendary: u32,
    pub mythic: u32,
}

impl Default for PityThresholds {
    fn default() -> Self {
        Self {
            rare: 10,
            epic: 30,
            legendary: 60,
            mythic: 100,
        }
    }
}

impl PityThresholds {
    pub fn get(&self, rarity: Rarity) -> Option<u32> {
        match rarity {
            Rarity::Rare => Some(self.rare),
            Rarity::Epic => Some(self.epic),
            Rarity::Legendary => Some(self.legendary),
            Rarity::Mythic => Some(self.mythic),
            Rarity::Common | Rarity::Uncommon => None,
        }
    }

    /// Thresholds must be non-zero and strictly increasing by tier.
    pub fn validate(&self) -> Result<(), String> {
        if self.rare == 0 {
            return Err("rare pity threshold must be non-zero".to_string());
        }
        let ordered = [self.rare, self.epic, self.legendary, self.mythic];
        if ordered.windows(2).any(|pair| pair[0] >= pair[1]) {
            return Err(format!(
                "pity thresholds must increase by tier, got {ordered:?}"
            ));
        }
        Ok(())
    }
}

pub fn should_trigger_pity(
    counter: &PityCounter,
    thresholds: &PityThresholds,
    rarity: Rarity,
) -> bool {
    match (counter.get(rarity), thresholds.get(rarity)) {
        (Some(count), Some(threshold)) => count >= threshold,
        _ => false,
    }
}

/// Highest tier whose pity has triggered. Mythic is checked first so a long
/// drought is paid out with the best tier that is due.
pub fn highest_pity_tier(counter: &PityCounter, thresholds: &PityThresholds) -> Option<Rarity> {
    PITY_TIERS
        .into_iter()
        .find(|tier| should_trigger_pity(counter, thresholds, *tier))
}

/// Applies one opened pack to the counter.
///
/// Tiers at or below the best pulled rarity reset to zero; tiers above it
/// count one more pack, capped at their threshold.
pub fn update_pity_counter(
    counter: &PityCounter,
    thresholds: &PityThresholds,
    pulled: &[Rarity],
) -> PityCounter {
    let best = pulled.iter().copied().max();
    let mut next = *counter;
    for tier in PITY_TIERS {
        let cap = thresholds.get(tier).unwrap_or(u32::MAX);
        let Some(slot) = next.slot_mut(tier) else {
            continue;
        };
        if best.is_some_and(|best| best >= tier) {
            *slot = 0;
        } else {
            *slot = slot.saturating_add(1).min(cap);
        }
    }
    next
}
