use crate::{HoloVariant, Rarity, RngState};
use serde::{Deserialize, Serialize};

const HOLO_STANDARD_FROM: f64 = 0.80;
const HOLO_REVERSE_FROM: f64 = 0.95;
const HOLO_FULL_ART_FROM: f64 = 0.98;
const HOLO_PRISMATIC_FROM: f64 = 0.995;

const DESIGN_HOLIDAY_FROM: f64 = 0.80;
const DESIGN_PREMIUM_FROM: f64 = 0.95;

/// Maps a uniform roll to a holo variant for a card of `rarity`.
///
/// Full art needs legendary or better and prismatic needs mythic. A roll
/// landing on a locked variant degrades to the best variant the card may
/// have, never to `None`.
pub fn holo_variant_for_roll(roll: f64, rarity: Rarity) -> HoloVariant {
    if roll < HOLO_STANDARD_FROM {
        HoloVariant::None
    } else if roll < HOLO_REVERSE_FROM {
        HoloVariant::Standard
    } else if roll < HOLO_FULL_ART_FROM {
        HoloVariant::Reverse
    } else if roll < HOLO_PRISMATIC_FROM {
        if rarity >= Rarity::Legendary {
            HoloVariant::FullArt
        } else {
            HoloVariant::Reverse
        }
    } else {
        match rarity {
            Rarity::Mythic => HoloVariant::Prismatic,
            Rarity::Legendary => HoloVariant::FullArt,
            _ => HoloVariant::Reverse,
        }
    }
}

pub fn roll_holo(rarity: Rarity, rng: &mut RngState) -> HoloVariant {
    holo_variant_for_roll(rng.next_f64(), rarity)
}

/// Single-chance roller: a hit is a standard holo, anything else is plain.
pub fn roll_legacy_holo(holo_chance: f64, rng: &mut RngState) -> HoloVariant {
    if rng.next_f64() < holo_chance {
        HoloVariant::Standard
    } else {
        HoloVariant::None
    }
}

/// Which holo roller a pack config uses.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HoloRoller {
    #[default]
    Tiered,
    Legacy,
}

/// Cosmetic pack skin; has no effect on contents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PackDesign {
    Standard,
    Holiday,
    Premium,
}

impl PackDesign {
    pub const ALL: [PackDesign; 3] = [
        PackDesign::Standard,
        PackDesign::Holiday,
        PackDesign::Premium,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            PackDesign::Standard => "standard",
            PackDesign::Holiday => "holiday",
            PackDesign::Premium => "premium",
        }
    }

    pub fn from_key(key: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|design| design.as_str().eq_ignore_ascii_case(key.trim()))
    }
}

pub fn design_for_roll(roll: f64) -> PackDesign {
    if roll < DESIGN_HOLIDAY_FROM {
        PackDesign::Standard
    } else if roll < DESIGN_PREMIUM_FROM {
        PackDesign::Holiday
    } else {
        PackDesign::Premium
    }
}

pub fn roll_pack_design(rng: &mut RngState) -> PackDesign {
    design_for_roll(rng.next_f64())
}
