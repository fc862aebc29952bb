use crate::{
    highest_pity_tier, pick_weighted, roll_holo, roll_legacy_holo, roll_pack_design, select_card,
    update_pity_counter, CardCatalog, HoloRoller, PackCard, PackConfig, PackDesign, PackError,
    PackKind, PityCounter, Rarity, RaritySlot, RngState, SelectionTier,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};
use tracing::{debug, warn};

pub const MAX_BATCH_SIZE: usize = 10;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Pack {
    pub id: String,
    pub pack_type: PackKind,
    pub seed: u64,
    pub cards: Vec<PackCard>,
    pub opened_at: DateTime<Utc>,
    pub best_rarity: Rarity,
    pub design: PackDesign,
}

impl Pack {
    pub fn rarities(&self) -> Vec<Rarity> {
        self.cards.iter().map(PackCard::rarity).collect()
    }

    pub fn count_rarity(&self, rarity: Rarity) -> usize {
        self.cards.iter().filter(|card| card.rarity() == rarity).count()
    }
}

/// Something off about a pack that still went out to the player.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum DistributionAnomaly {
    /// Fewer cards of a guaranteed rarity than guaranteed slots asked for.
    GuaranteedShortfall {
        rarity: Rarity,
        expected: usize,
        actual: usize,
    },
    /// A weighted slot was served from a rarity outside its own pool.
    PoolMiss {
        slot: usize,
        requested: Rarity,
        served: Rarity,
    },
    DuplicateCard { slot: usize, card_id: String },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PackOutcome {
    pub pack: Pack,
    pub pity_counter: PityCounter,
    /// Tier the pity slot was raised to, if it was raised.
    pub pity_triggered: Option<Rarity>,
    pub anomalies: Vec<DistributionAnomaly>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BatchOutcome {
    pub outcomes: Vec<PackOutcome>,
    pub pity_counter: PityCounter,
}

impl BatchOutcome {
    pub fn packs(&self) -> impl Iterator<Item = &Pack> {
        self.outcomes.iter().map(|outcome| &outcome.pack)
    }
}

#[derive(Debug, Clone)]
struct SlotRecord {
    slot: usize,
    requested: Rarity,
    served: Rarity,
    tier: SelectionTier,
    card_id: String,
}

pub fn generate_pack<C: CardCatalog + ?Sized>(
    config: &PackConfig,
    catalog: &C,
    seed: Option<u64>,
    pity: Option<&PityCounter>,
) -> Result<PackOutcome, PackError> {
    generate_pack_at(config, catalog, seed, pity, Utc::now())
}

/// Opens one pack. Everything except `opened_at` is a function of
/// `(config, catalog, seed, pity)`.
pub fn generate_pack_at<C: CardCatalog + ?Sized>(
    config: &PackConfig,
    catalog: &C,
    seed: Option<u64>,
    pity: Option<&PityCounter>,
    opened_at: DateTime<Utc>,
) -> Result<PackOutcome, PackError> {
    config.validate()?;
    let kind = config.resolve_kind()?;
    let filter = kind.filter();
    let thresholds = &config.pity_thresholds;
    let pity_in = pity.copied().unwrap_or_default();
    let pity_tier = pity.and_then(|counter| highest_pity_tier(counter, thresholds));
    let pity_slot = config.pity_slot();

    let mut rng = RngState::from_optional_seed(seed);
    let mut excluded = HashSet::new();
    let mut cards = Vec::with_capacity(config.cards_per_pack);
    let mut records = Vec::with_capacity(config.rarity_slots.len());
    let mut pity_triggered = None;

    for (index, slot) in config.rarity_slots.iter().enumerate() {
        let requested = match slot {
            RaritySlot::Guaranteed(rarity) => *rarity,
            RaritySlot::Weighted(weights) => {
                let drawn = pick_weighted(
                    weights.iter().map(|entry| (entry.rarity, entry.weight)),
                    &mut rng,
                )
                .ok_or_else(|| {
                    PackError::InvalidConfig(format!("slot {index} has no positive weight"))
                })?;
                match pity_tier {
                    Some(tier) if pity_slot == Some(index) && tier > drawn => {
                        debug!(
                            slot = index,
                            drawn = drawn.as_str(),
                            tier = tier.as_str(),
                            "pity raised slot rarity"
                        );
                        pity_triggered = Some(tier);
                        tier
                    }
                    _ => drawn,
                }
            }
        };

        let selection = select_card(catalog, requested, &filter, &mut excluded, &mut rng)?;
        let holo = match config.holo_roller {
            HoloRoller::Tiered => roll_holo(selection.card.rarity, &mut rng),
            HoloRoller::Legacy => roll_legacy_holo(config.holo_chance, &mut rng),
        };
        records.push(SlotRecord {
            slot: index,
            requested,
            served: selection.card.rarity,
            tier: selection.tier,
            card_id: selection.card.id.clone(),
        });
        cards.push(PackCard::new(selection.card.clone(), holo));
    }

    if cards.len() != config.cards_per_pack {
        return Err(PackError::CardCountMismatch {
            expected: config.cards_per_pack,
            actual: cards.len(),
        });
    }

    let cards = rng.shuffled(&cards);

    let anomalies = validate_distribution(config, &records);
    for anomaly in &anomalies {
        warn!(seed = rng.seed(), ?anomaly, "pack distribution anomaly");
    }

    let rolled = roll_pack_design(&mut rng);
    let design = config.design_override.unwrap_or(rolled);
    let best_rarity = cards
        .iter()
        .map(PackCard::rarity)
        .max()
        .ok_or(PackError::CardCountMismatch {
            expected: config.cards_per_pack,
            actual: 0,
        })?;
    let id = format!("pack-{:016x}", rng.next_u64());

    let pulled: Vec<Rarity> = cards.iter().map(PackCard::rarity).collect();
    let pity_counter = update_pity_counter(&pity_in, thresholds, &pulled);

    Ok(PackOutcome {
        pack: Pack {
            id,
            pack_type: kind,
            seed: rng.seed(),
            cards,
            opened_at,
            best_rarity,
            design,
        },
        pity_counter,
        pity_triggered,
        anomalies,
    })
}

/// Opens `count` packs back to back. Pack `i` uses `seed + i` and the pity
/// counter left behind by pack `i - 1`.
pub fn generate_batch<C: CardCatalog + ?Sized>(
    config: &PackConfig,
    catalog: &C,
    count: usize,
    seed: Option<u64>,
    pity: Option<&PityCounter>,
) -> Result<BatchOutcome, PackError> {
    if count == 0 || count > MAX_BATCH_SIZE {
        return Err(PackError::BatchSizeOutOfRange(count));
    }
    config.validate()?;
    config.resolve_kind()?;

    let base = seed.unwrap_or_else(rand::random);
    let mut counter = pity.copied();
    let mut outcomes = Vec::with_capacity(count);
    for index in 0..count {
        let outcome = generate_pack(
            config,
            catalog,
            Some(base.wrapping_add(index as u64)),
            counter.as_ref(),
        )?;
        counter = Some(outcome.pity_counter);
        outcomes.push(outcome);
    }
    Ok(BatchOutcome {
        outcomes,
        pity_counter: counter.unwrap_or_default(),
    })
}

fn validate_distribution(config: &PackConfig, records: &[SlotRecord]) -> Vec<DistributionAnomaly> {
    let mut anomalies = Vec::new();

    let mut guaranteed: BTreeMap<Rarity, usize> = BTreeMap::new();
    for slot in &config.rarity_slots {
        if let RaritySlot::Guaranteed(rarity) = slot {
            *guaranteed.entry(*rarity).or_insert(0) += 1;
        }
    }
    for (rarity, expected) in guaranteed {
        let actual = records
            .iter()
            .filter(|record| record.served == rarity)
            .count();
        if actual < expected {
            anomalies.push(DistributionAnomaly::GuaranteedShortfall {
                rarity,
                expected,
                actual,
            });
        }
    }

    for record in records {
        let Some(slot) = config.rarity_slots.get(record.slot) else {
            continue;
        };
        if matches!(slot, RaritySlot::Weighted(_))
            && record.served != record.requested
            && slot.weight_of(record.served) <= 0.0
        {
            anomalies.push(DistributionAnomaly::PoolMiss {
                slot: record.slot,
                requested: record.requested,
                served: record.served,
            });
        }
        if record.tier == SelectionTier::Duplicate {
            anomalies.push(DistributionAnomaly::DuplicateCard {
                slot: record.slot,
                card_id: record.card_id.clone(),
            });
        }
    }

    anomalies
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{default_pack_config, Card, CardStats, Catalog, DadType};

    fn card(id: &str, rarity: Rarity, dad_type: DadType) -> Card {
        Card {
            id: id.to_string(),
            name: id.to_string(),
            rarity,
            dad_type,
            stats: CardStats::default(),
            abilities: Vec::new(),
            season_id: None,
            flavor_text: None,
        }
    }

    fn small_catalog() -> Catalog {
        let mut cards = Vec::new();
        for rarity in Rarity::ALL {
            for n in 0..4 {
                cards.push(card(
                    &format!("{}_{n}", rarity.as_str()),
                    rarity,
                    DadType::ALL[n % DadType::ALL.len()],
                ));
            }
        }
        Catalog::new(cards)
    }

    #[test]
    fn pack_has_configured_size_and_true_best_rarity() {
        let catalog = small_catalog();
        for seed in 0..50 {
            let outcome =
                generate_pack(&default_pack_config(), &catalog, Some(seed), None).expect("pack");
            assert_eq!(outcome.pack.cards.len(), 6);
            let max = outcome.pack.rarities().into_iter().max().expect("max");
            assert_eq!(outcome.pack.best_rarity, max);
            assert!(outcome.pack.count_rarity(Rarity::Common) >= 3);
            assert!(outcome.pack.cards.iter().all(|card| !card.is_revealed));
        }
    }

    #[test]
    fn slot_list_shorter_than_card_count_fails_loudly() {
        let mut config = default_pack_config();
        config.cards_per_pack = 7;
        let err = generate_pack(&config, &small_catalog(), Some(1), None).expect_err("short pack");
        assert_eq!(
            err,
            PackError::CardCountMismatch {
                expected: 7,
                actual: 6,
            }
        );
    }

    #[test]
    fn pity_raises_final_weighted_slot() {
        let catalog = small_catalog();
        let counter = PityCounter {
            rare: 0,
            epic: 0,
            legendary: 60,
            mythic: 0,
        };
        for seed in 0..20 {
            let outcome =
                generate_pack(&default_pack_config(), &catalog, Some(seed), Some(&counter))
                    .expect("pack");
            assert!(outcome.pack.best_rarity >= Rarity::Legendary);
            assert_eq!(outcome.pity_counter.legendary, 0);
        }
    }

    #[test]
    fn design_override_wins() {
        let mut config = default_pack_config();
        config.design_override = Some(PackDesign::Holiday);
        let outcome = generate_pack(&config, &small_catalog(), Some(3), None).expect("pack");
        assert_eq!(outcome.pack.design, PackDesign::Holiday);
    }

    #[test]
    fn design_override_leaves_cards_alone() {
        let catalog = small_catalog();
        let plain = generate_pack(&default_pack_config(), &catalog, Some(8), None).expect("plain");
        let mut config = default_pack_config();
        config.design_override = Some(PackDesign::Premium);
        let forced = generate_pack(&config, &catalog, Some(8), None).expect("forced");
        assert_eq!(plain.pack.cards, forced.pack.cards);
        assert_eq!(plain.pack.id, forced.pack.id);
    }

    #[test]
    fn exhausted_guarantee_is_reported_not_fatal() {
        let catalog = Catalog::new(vec![card("only", Rarity::Rare, DadType::Item)]);
        let outcome = generate_pack(&default_pack_config(), &catalog, Some(9), None).expect("pack");
        assert_eq!(outcome.pack.cards.len(), 6);
        assert!(outcome.anomalies.iter().any(|anomaly| matches!(
            anomaly,
            DistributionAnomaly::GuaranteedShortfall {
                rarity: Rarity::Common,
                expected: 3,
                actual: 0,
            }
        )));
        assert!(outcome
            .anomalies
            .iter()
            .any(|anomaly| matches!(anomaly, DistributionAnomaly::DuplicateCard { .. })));
    }

    #[test]
    fn weighted_slot_served_off_pool_is_reported() {
        let catalog = Catalog::new(vec![
            card("c1", Rarity::Common, DadType::LawnDad),
            card("c2", Rarity::Common, DadType::LawnDad),
        ]);
        let config = PackConfig {
            cards_per_pack: 1,
            rarity_slots: vec![RaritySlot::weighted(&[(Rarity::Rare, 1.0)])],
            ..default_pack_config()
        };
        let outcome = generate_pack(&config, &catalog, Some(12), None).expect("pack");
        assert_eq!(outcome.pack.cards.len(), 1);
        assert_eq!(outcome.pack.best_rarity, Rarity::Common);
        assert_eq!(
            outcome.anomalies,
            vec![DistributionAnomaly::PoolMiss {
                slot: 0,
                requested: Rarity::Rare,
                served: Rarity::Common,
            }]
        );
    }

    #[test]
    fn weighted_slot_served_by_another_listed_rarity_is_not_a_miss() {
        let catalog = Catalog::new(vec![card("u", Rarity::Uncommon, DadType::LawnDad)]);
        let config = PackConfig {
            cards_per_pack: 1,
            rarity_slots: vec![RaritySlot::weighted(&[
                (Rarity::Uncommon, 0.5),
                (Rarity::Rare, 0.5),
            ])],
            ..default_pack_config()
        };
        for seed in 0..20 {
            let outcome = generate_pack(&config, &catalog, Some(seed), None).expect("pack");
            assert!(outcome.anomalies.is_empty(), "seed {seed}");
        }
    }

    #[test]
    fn batch_rejects_bad_counts_before_drawing() {
        let catalog = small_catalog();
        assert_eq!(
            generate_batch(&default_pack_config(), &catalog, 0, Some(1), None),
            Err(PackError::BatchSizeOutOfRange(0))
        );
        assert_eq!(
            generate_batch(&default_pack_config(), &catalog, 11, Some(1), None),
            Err(PackError::BatchSizeOutOfRange(11))
        );
    }
}
