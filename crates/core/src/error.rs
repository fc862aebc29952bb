use crate::Rarity;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum PackError {
    #[error("pack assembled {actual} cards, expected {expected}")]
    CardCountMismatch { expected: usize, actual: usize },
    #[error("no card available for {rarity:?}: catalog is empty")]
    CatalogExhausted { rarity: Rarity },
    #[error("unknown pack type: {0}")]
    UnknownPackType(String),
    #[error("theme pack requires a theme type")]
    MissingTheme,
    #[error("season pack requires a season id")]
    MissingSeason,
    #[error("invalid pack config: {0}")]
    InvalidConfig(String),
    #[error("batch size {0} outside 1..=10")]
    BatchSizeOutOfRange(usize),
}
