use crate::{CardFilter, DadType, HoloRoller, PackDesign, PackError, PityThresholds, Rarity};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RarityWeight {
    pub rarity: Rarity,
    pub weight: f64,
}

impl RarityWeight {
    pub fn new(rarity: Rarity, weight: f64) -> Self {
        Self { rarity, weight }
    }
}

/// One position in the pack layout. Weighted slots keep their entries in
/// declaration order so draws replay identically.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RaritySlot {
    Guaranteed(Rarity),
    Weighted(Vec<RarityWeight>),
}

impl RaritySlot {
    pub fn weighted(entries: &[(Rarity, f64)]) -> Self {
        Self::Weighted(
            entries
                .iter()
                .map(|(rarity, weight)| RarityWeight::new(*rarity, *weight))
                .collect(),
        )
    }

    pub fn weight_of(&self, rarity: Rarity) -> f64 {
        match self {
            RaritySlot::Guaranteed(fixed) if *fixed == rarity => 1.0,
            RaritySlot::Guaranteed(_) => 0.0,
            RaritySlot::Weighted(weights) => weights
                .iter()
                .filter(|entry| entry.rarity == rarity)
                .map(|entry| entry.weight)
                .sum(),
        }
    }
}

/// Resolved pack variant. Themed and seasonal packs narrow the card pool;
/// premium packs only differ by their config.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum PackKind {
    Standard,
    Premium,
    Theme(DadType),
    Season(u32),
}

impl PackKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            PackKind::Standard => "standard",
            PackKind::Premium => "premium",
            PackKind::Theme(_) => "theme",
            PackKind::Season(_) => "season",
        }
    }

    pub fn filter(&self) -> CardFilter {
        match self {
            PackKind::Standard | PackKind::Premium => CardFilter::default(),
            PackKind::Theme(dad_type) => CardFilter {
                dad_type: Some(*dad_type),
                season_id: None,
            },
            PackKind::Season(season) => CardFilter {
                dad_type: None,
                season_id: Some(*season),
            },
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PackConfig {
    pub cards_per_pack: usize,
    pub rarity_slots: Vec<RaritySlot>,
    pub holo_chance: f64,
    #[serde(default)]
    pub holo_roller: HoloRoller,
    #[serde(default)]
    pub pack_type: Option<String>,
    #[serde(default)]
    pub theme_type: Option<DadType>,
    #[serde(default)]
    pub season_id: Option<u32>,
    #[serde(default)]
    pub design_override: Option<PackDesign>,
    #[serde(default)]
    pub pity_thresholds: PityThresholds,
}

impl Default for PackConfig {
    fn default() -> Self {
        default_pack_config()
    }
}

/// Six cards: three guaranteed commons, two uncommon-leaning slots and a
/// rare-or-better slot that pity can raise.
pub fn default_pack_config() -> PackConfig {
    PackConfig {
        cards_per_pack: 6,
        rarity_slots: vec![
            RaritySlot::Guaranteed(Rarity::Common),
            RaritySlot::Guaranteed(Rarity::Common),
            RaritySlot::Guaranteed(Rarity::Common),
            RaritySlot::weighted(&[
                (Rarity::Uncommon, 0.74),
                (Rarity::Rare, 0.20),
                (Rarity::Epic, 0.05),
                (Rarity::Legendary, 0.01),
            ]),
            RaritySlot::weighted(&[
                (Rarity::Uncommon, 0.74),
                (Rarity::Rare, 0.20),
                (Rarity::Epic, 0.05),
                (Rarity::Legendary, 0.01),
            ]),
            RaritySlot::weighted(&[
                (Rarity::Rare, 0.879),
                (Rarity::Epic, 0.10),
                (Rarity::Legendary, 0.02),
                (Rarity::Mythic, 0.001),
            ]),
        ],
        holo_chance: 1.0 / 6.0,
        holo_roller: HoloRoller::Tiered,
        pack_type: None,
        theme_type: None,
        season_id: None,
        design_override: None,
        pity_thresholds: PityThresholds::default(),
    }
}

/// Same layout as the default pack with better odds in every slot.
pub fn premium_pack_config() -> PackConfig {
    PackConfig {
        cards_per_pack: 6,
        rarity_slots: vec![
            RaritySlot::Guaranteed(Rarity::Uncommon),
            RaritySlot::Guaranteed(Rarity::Uncommon),
            RaritySlot::Guaranteed(Rarity::Uncommon),
            RaritySlot::weighted(&[
                (Rarity::Rare, 0.70),
                (Rarity::Epic, 0.25),
                (Rarity::Legendary, 0.05),
            ]),
            RaritySlot::weighted(&[
                (Rarity::Rare, 0.70),
                (Rarity::Epic, 0.25),
                (Rarity::Legendary, 0.05),
            ]),
            RaritySlot::weighted(&[
                (Rarity::Epic, 0.70),
                (Rarity::Legendary, 0.25),
                (Rarity::Mythic, 0.05),
            ]),
        ],
        holo_chance: 0.5,
        pack_type: Some("premium".to_string()),
        ..default_pack_config()
    }
}

impl PackConfig {
    /// Built-in config for a pack kind; theme and season packs reuse the
    /// default odds.
    pub fn for_kind(kind: PackKind) -> Self {
        match kind {
            PackKind::Standard => default_pack_config(),
            PackKind::Premium => premium_pack_config(),
            PackKind::Theme(dad_type) => PackConfig {
                pack_type: Some("theme".to_string()),
                theme_type: Some(dad_type),
                ..default_pack_config()
            },
            PackKind::Season(season) => PackConfig {
                pack_type: Some("season".to_string()),
                season_id: Some(season),
                ..default_pack_config()
            },
        }
    }

    pub fn resolve_kind(&self) -> Result<PackKind, PackError> {
        let Some(raw) = self.pack_type.as_deref() else {
            return Ok(PackKind::Standard);
        };
        match raw.trim().to_ascii_lowercase().as_str() {
            "standard" => Ok(PackKind::Standard),
            "premium" => Ok(PackKind::Premium),
            "theme" => self
                .theme_type
                .map(PackKind::Theme)
                .ok_or(PackError::MissingTheme),
            "season" => self
                .season_id
                .map(PackKind::Season)
                .ok_or(PackError::MissingSeason),
            _ => Err(PackError::UnknownPackType(raw.to_string())),
        }
    }

    /// Index of the last weighted slot, the one pity may raise.
    pub fn pity_slot(&self) -> Option<usize> {
        self.rarity_slots
            .iter()
            .rposition(|slot| matches!(slot, RaritySlot::Weighted(_)))
    }

    pub fn guaranteed_count(&self, rarity: Rarity) -> usize {
        self.rarity_slots
            .iter()
            .filter(|slot| matches!(slot, RaritySlot::Guaranteed(fixed) if *fixed == rarity))
            .count()
    }

    pub fn validate(&self) -> Result<(), PackError> {
        if self.cards_per_pack == 0 {
            return Err(PackError::InvalidConfig(
                "cards_per_pack must be positive".to_string(),
            ));
        }
        if self.rarity_slots.is_empty() {
            return Err(PackError::InvalidConfig("no rarity slots".to_string()));
        }
        if !(0.0..=1.0).contains(&self.holo_chance) {
            return Err(PackError::InvalidConfig(format!(
                "holo_chance {} outside [0, 1]",
                self.holo_chance
            )));
        }
        for (index, slot) in self.rarity_slots.iter().enumerate() {
            let RaritySlot::Weighted(weights) = slot else {
                continue;
            };
            if weights
                .iter()
                .any(|entry| !entry.weight.is_finite() || entry.weight < 0.0)
            {
                return Err(PackError::InvalidConfig(format!(
                    "slot {index} has a negative or non-finite weight"
                )));
            }
            if weights.iter().map(|entry| entry.weight).sum::<f64>() <= 0.0 {
                return Err(PackError::InvalidConfig(format!(
                    "slot {index} has no positive weight"
                )));
            }
        }
        self.pity_thresholds
            .validate()
            .map_err(PackError::InvalidConfig)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builtin_configs_are_valid() {
        default_pack_config().validate().expect("default");
        premium_pack_config().validate().expect("premium");
        assert_eq!(default_pack_config().rarity_slots.len(), 6);
        assert_eq!(default_pack_config().guaranteed_count(Rarity::Common), 3);
        assert_eq!(default_pack_config().pity_slot(), Some(5));
    }

    #[test]
    fn resolves_pack_kinds() {
        assert_eq!(default_pack_config().resolve_kind(), Ok(PackKind::Standard));
        assert_eq!(premium_pack_config().resolve_kind(), Ok(PackKind::Premium));
        let theme = PackConfig::for_kind(PackKind::Theme(DadType::GolfDad));
        assert_eq!(theme.resolve_kind(), Ok(PackKind::Theme(DadType::GolfDad)));
        let season = PackConfig::for_kind(PackKind::Season(3));
        assert_eq!(season.resolve_kind(), Ok(PackKind::Season(3)));
    }

    #[test]
    fn rejects_unknown_or_incomplete_pack_types() {
        let mut config = default_pack_config();
        config.pack_type = Some("mystery".to_string());
        assert_eq!(
            config.resolve_kind(),
            Err(PackError::UnknownPackType("mystery".to_string()))
        );
        config.pack_type = Some("theme".to_string());
        assert_eq!(config.resolve_kind(), Err(PackError::MissingTheme));
        config.pack_type = Some("season".to_string());
        assert_eq!(config.resolve_kind(), Err(PackError::MissingSeason));
    }

    #[test]
    fn rejects_malformed_slots() {
        let mut config = default_pack_config();
        config.rarity_slots[5] = RaritySlot::weighted(&[(Rarity::Rare, 0.0)]);
        assert!(matches!(config.validate(), Err(PackError::InvalidConfig(_))));
        config.rarity_slots[5] = RaritySlot::Weighted(Vec::new());
        assert!(matches!(config.validate(), Err(PackError::InvalidConfig(_))));
        config.rarity_slots[5] = RaritySlot::weighted(&[(Rarity::Rare, -1.0), (Rarity::Epic, 2.0)]);
        assert!(matches!(config.validate(), Err(PackError::InvalidConfig(_))));

        let mut config = default_pack_config();
        config.holo_chance = 1.5;
        assert!(matches!(config.validate(), Err(PackError::InvalidConfig(_))));
    }

    #[test]
    fn slot_config_reads_from_json() {
        let raw = r#"{
            "cards_per_pack": 2,
            "rarity_slots": [
                {"guaranteed": "common"},
                {"weighted": [{"rarity": "rare", "weight": 3}, {"rarity": "epic", "weight": 1}]}
            ],
            "holo_chance": 0.25
        }"#;
        let config: PackConfig = serde_json::from_str(raw).expect("parse");
        assert_eq!(config.rarity_slots[0], RaritySlot::Guaranteed(Rarity::Common));
        assert_eq!(config.rarity_slots[1].weight_of(Rarity::Epic), 1.0);
        assert_eq!(config.holo_roller, HoloRoller::Tiered);
        assert_eq!(config.pity_thresholds, PityThresholds::default());
    }
}
