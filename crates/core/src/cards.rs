use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[serde(rename_all = "lowercase")]
pub enum Rarity {
    Common,
    Uncommon,
    Rare,
    Epic,
    Legendary,
    Mythic,
}

impl Rarity {
    pub const ALL: [Rarity; 6] = [
        Rarity::Common,
        Rarity::Uncommon,
        Rarity::Rare,
        Rarity::Epic,
        Rarity::Legendary,
        Rarity::Mythic,
    ];

    pub fn index(self) -> usize {
        self as usize
    }

    pub fn from_index(index: usize) -> Option<Self> {
        Self::ALL.get(index).copied()
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Rarity::Common => "common",
            Rarity::Uncommon => "uncommon",
            Rarity::Rare => "rare",
            Rarity::Epic => "epic",
            Rarity::Legendary => "legendary",
            Rarity::Mythic => "mythic",
        }
    }

    pub fn from_key(key: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|rarity| rarity.as_str().eq_ignore_ascii_case(key.trim()))
    }

    /// Rarities at increasing distance from `self`, lower neighbour first:
    /// for `Rare` this yields uncommon, epic, common, legendary, mythic.
    pub fn outward(self) -> impl Iterator<Item = Rarity> {
        let center = self.index() as isize;
        (1..Self::ALL.len() as isize).flat_map(move |step| {
            [center - step, center + step]
                .into_iter()
                .filter(|idx| *idx >= 0)
                .filter_map(|idx| Rarity::from_index(idx as usize))
        })
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DadType {
    BbqDad,
    FixItDad,
    GolfDad,
    CouchDad,
    LawnDad,
    CarDad,
    OfficeDad,
    CoolDad,
    CoachDad,
    ChefDad,
    HolidayDad,
    GamerDad,
    PrepperDad,
    Item,
}

impl DadType {
    pub const ALL: [DadType; 14] = [
        DadType::BbqDad,
        DadType::FixItDad,
        DadType::GolfDad,
        DadType::CouchDad,
        DadType::LawnDad,
        DadType::CarDad,
        DadType::OfficeDad,
        DadType::CoolDad,
        DadType::CoachDad,
        DadType::ChefDad,
        DadType::HolidayDad,
        DadType::GamerDad,
        DadType::PrepperDad,
        DadType::Item,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            DadType::BbqDad => "BBQ_DAD",
            DadType::FixItDad => "FIX_IT_DAD",
            DadType::GolfDad => "GOLF_DAD",
            DadType::CouchDad => "COUCH_DAD",
            DadType::LawnDad => "LAWN_DAD",
            DadType::CarDad => "CAR_DAD",
            DadType::OfficeDad => "OFFICE_DAD",
            DadType::CoolDad => "COOL_DAD",
            DadType::CoachDad => "COACH_DAD",
            DadType::ChefDad => "CHEF_DAD",
            DadType::HolidayDad => "HOLIDAY_DAD",
            DadType::GamerDad => "GAMER_DAD",
            DadType::PrepperDad => "PREPPER_DAD",
            DadType::Item => "ITEM",
        }
    }

    pub fn from_key(key: &str) -> Option<Self> {
        let normalized = key.trim().replace('-', "_");
        Self::ALL
            .into_iter()
            .find(|kind| kind.as_str().eq_ignore_ascii_case(&normalized))
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
pub struct CardStats {
    #[serde(default)]
    pub dad_joke: u8,
    #[serde(default)]
    pub grill_skill: u8,
    #[serde(default)]
    pub fix_it: u8,
    #[serde(default)]
    pub nap_power: u8,
    #[serde(default)]
    pub remote_control: u8,
    #[serde(default)]
    pub thermostat: u8,
    #[serde(default)]
    pub sock_sandal: u8,
    #[serde(default)]
    pub beer_snob: u8,
}

impl CardStats {
    pub fn values(&self) -> [u8; 8] {
        [
            self.dad_joke,
            self.grill_skill,
            self.fix_it,
            self.nap_power,
            self.remote_control,
            self.thermostat,
            self.sock_sandal,
            self.beer_snob,
        ]
    }

    pub fn total(&self) -> u32 {
        self.values().iter().map(|value| *value as u32).sum()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct CardAbility {
    pub name: String,
    pub description: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct Card {
    pub id: String,
    pub name: String,
    pub rarity: Rarity,
    pub dad_type: DadType,
    #[serde(default)]
    pub stats: CardStats,
    #[serde(default)]
    pub abilities: Vec<CardAbility>,
    #[serde(default)]
    pub season_id: Option<u32>,
    #[serde(default)]
    pub flavor_text: Option<String>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[serde(rename_all = "snake_case")]
pub enum HoloVariant {
    None,
    Standard,
    Reverse,
    FullArt,
    Prismatic,
}

impl HoloVariant {
    pub const ALL: [HoloVariant; 5] = [
        HoloVariant::None,
        HoloVariant::Standard,
        HoloVariant::Reverse,
        HoloVariant::FullArt,
        HoloVariant::Prismatic,
    ];

    pub fn is_holo(self) -> bool {
        self != HoloVariant::None
    }

    pub fn as_str(self) -> &'static str {
        match self {
            HoloVariant::None => "none",
            HoloVariant::Standard => "standard",
            HoloVariant::Reverse => "reverse",
            HoloVariant::FullArt => "full_art",
            HoloVariant::Prismatic => "prismatic",
        }
    }
}

/// A catalog card as it appears inside one opened pack.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct PackCard {
    #[serde(flatten)]
    pub card: Card,
    pub is_revealed: bool,
    pub is_holo: bool,
    pub holo_type: HoloVariant,
}

impl PackCard {
    pub fn new(card: Card, holo_type: HoloVariant) -> Self {
        Self {
            card,
            is_revealed: false,
            is_holo: holo_type.is_holo(),
            holo_type,
        }
    }

    pub fn id(&self) -> &str {
        &self.card.id
    }

    pub fn rarity(&self) -> Rarity {
        self.card.rarity
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rarity_order_is_total() {
        assert!(Rarity::Common < Rarity::Uncommon);
        assert!(Rarity::Legendary < Rarity::Mythic);
        assert_eq!(Rarity::ALL.iter().max(), Some(&Rarity::Mythic));
    }

    #[test]
    fn outward_search_prefers_lower_neighbour() {
        let order: Vec<Rarity> = Rarity::Rare.outward().collect();
        assert_eq!(
            order,
            vec![
                Rarity::Uncommon,
                Rarity::Epic,
                Rarity::Common,
                Rarity::Legendary,
                Rarity::Mythic,
            ]
        );
        let from_common: Vec<Rarity> = Rarity::Common.outward().collect();
        assert_eq!(from_common.len(), 5);
        assert_eq!(from_common[0], Rarity::Uncommon);
        let from_mythic: Vec<Rarity> = Rarity::Mythic.outward().collect();
        assert_eq!(from_mythic[0], Rarity::Legendary);
        assert_eq!(from_mythic.last(), Some(&Rarity::Common));
    }

    #[test]
    fn keys_parse_case_insensitively() {
        assert_eq!(Rarity::from_key("Legendary"), Some(Rarity::Legendary));
        assert_eq!(Rarity::from_key("shiny"), None);
        assert_eq!(DadType::from_key("bbq-dad"), Some(DadType::BbqDad));
        assert_eq!(DadType::from_key("ITEM"), Some(DadType::Item));
    }

    #[test]
    fn pack_card_holo_flag_tracks_variant() {
        let card = Card {
            id: "c1".to_string(),
            name: "Grill Sergeant".to_string(),
            rarity: Rarity::Common,
            dad_type: DadType::BbqDad,
            stats: CardStats::default(),
            abilities: Vec::new(),
            season_id: None,
            flavor_text: None,
        };
        assert!(!PackCard::new(card.clone(), HoloVariant::None).is_holo);
        let holo = PackCard::new(card, HoloVariant::Reverse);
        assert!(holo.is_holo);
        assert!(!holo.is_revealed);
    }
}
