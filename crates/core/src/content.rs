use crate::{Card, DadType, Rarity};
use serde::{Deserialize, Serialize};

/// Read-only card lookup the pack engine draws from.
pub trait CardCatalog {
    fn cards_by_rarity(&self, rarity: Rarity) -> Vec<&Card>;

    fn cards_by_rarity_and_type(&self, rarity: Rarity, dad_type: DadType) -> Vec<&Card>;

    fn all_cards(&self) -> Vec<&Card>;

    fn cards_matching(&self, rarity: Rarity, filter: &CardFilter) -> Vec<&Card> {
        let cards = match filter.dad_type {
            Some(dad_type) => self.cards_by_rarity_and_type(rarity, dad_type),
            None => self.cards_by_rarity(rarity),
        };
        match filter.season_id {
            Some(season) => cards
                .into_iter()
                .filter(|card| card.season_id == Some(season))
                .collect(),
            None => cards,
        }
    }
}

/// Narrows the pool for themed and seasonal packs.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CardFilter {
    pub dad_type: Option<DadType>,
    pub season_id: Option<u32>,
}

impl CardFilter {
    pub fn is_empty(&self) -> bool {
        self.dad_type.is_none() && self.season_id.is_none()
    }
}

/// In-memory catalog; cards keep their load order so lookups stay
/// deterministic.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Catalog {
    pub cards: Vec<Card>,
}

impl Catalog {
    pub fn new(cards: Vec<Card>) -> Self {
        Self { cards }
    }

    pub fn len(&self) -> usize {
        self.cards.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cards.is_empty()
    }

    pub fn card_by_id(&self, id: &str) -> Option<&Card> {
        self.cards.iter().find(|card| card.id == id)
    }

    pub fn count_by_rarity(&self, rarity: Rarity) -> usize {
        self.cards.iter().filter(|card| card.rarity == rarity).count()
    }
}

impl CardCatalog for Catalog {
    fn cards_by_rarity(&self, rarity: Rarity) -> Vec<&Card> {
        self.cards.iter().filter(|card| card.rarity == rarity).collect()
    }

    fn cards_by_rarity_and_type(&self, rarity: Rarity, dad_type: DadType) -> Vec<&Card> {
        self.cards
            .iter()
            .filter(|card| card.rarity == rarity && card.dad_type == dad_type)
            .collect()
    }

    fn all_cards(&self) -> Vec<&Card> {
        self.cards.iter().collect()
    }
}
