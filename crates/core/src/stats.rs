use crate::{
    generate_pack, roll_holo, CardCatalog, DadType, DistributionAnomaly, HoloVariant, PackConfig,
    PackDesign, PackError, PackOutcome, PityCounter, Rarity, RngState,
};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Running totals over many opened packs, for odds audits.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PackStats {
    pub packs: usize,
    pub cards: usize,
    pub by_rarity: BTreeMap<Rarity, usize>,
    pub best_rarity: BTreeMap<Rarity, usize>,
    pub by_holo: BTreeMap<HoloVariant, usize>,
    pub by_design: BTreeMap<PackDesign, usize>,
    pub by_type: BTreeMap<DadType, usize>,
    pub pity_triggers: usize,
    pub duplicates: usize,
    pub anomalies: usize,
}

impl PackStats {
    pub fn record(&mut self, outcome: &PackOutcome) {
        let pack = &outcome.pack;
        self.packs += 1;
        self.cards += pack.cards.len();
        *self.best_rarity.entry(pack.best_rarity).or_insert(0) += 1;
        *self.by_design.entry(pack.design).or_insert(0) += 1;
        for card in &pack.cards {
            *self.by_rarity.entry(card.rarity()).or_insert(0) += 1;
            *self.by_holo.entry(card.holo_type).or_insert(0) += 1;
            *self.by_type.entry(card.card.dad_type).or_insert(0) += 1;
        }
        if outcome.pity_triggered.is_some() {
            self.pity_triggers += 1;
        }
        self.duplicates += outcome
            .anomalies
            .iter()
            .filter(|anomaly| matches!(anomaly, DistributionAnomaly::DuplicateCard { .. }))
            .count();
        self.anomalies += outcome.anomalies.len();
    }

    /// Share of all cards with this rarity.
    pub fn rarity_share(&self, rarity: Rarity) -> f64 {
        share(self.by_rarity.get(&rarity).copied(), self.cards)
    }

    pub fn holo_share(&self, variant: HoloVariant) -> f64 {
        share(self.by_holo.get(&variant).copied(), self.cards)
    }

    pub fn design_share(&self, design: PackDesign) -> f64 {
        share(self.by_design.get(&design).copied(), self.packs)
    }
}

fn share(count: Option<usize>, total: usize) -> f64 {
    if total == 0 {
        return 0.0;
    }
    count.unwrap_or(0) as f64 / total as f64
}

/// Opens `packs` packs in sequence, threading pity the way a player's
/// account would, and tallies the results.
pub fn simulate_packs<C: CardCatalog + ?Sized>(
    config: &PackConfig,
    catalog: &C,
    packs: usize,
    seed: u64,
    pity: Option<&PityCounter>,
) -> Result<(PackStats, PityCounter), PackError> {
    let mut stats = PackStats::default();
    let mut counter = pity.copied().unwrap_or_default();
    for index in 0..packs {
        let outcome = generate_pack(
            config,
            catalog,
            Some(seed.wrapping_add(index as u64)),
            Some(&counter),
        )?;
        counter = outcome.pity_counter;
        stats.record(&outcome);
    }
    Ok((stats, counter))
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HoloDistribution {
    pub rarity: Rarity,
    pub trials: u64,
    pub counts: BTreeMap<HoloVariant, u64>,
}

impl HoloDistribution {
    pub fn share(&self, variant: HoloVariant) -> f64 {
        if self.trials == 0 {
            return 0.0;
        }
        self.counts.get(&variant).copied().unwrap_or(0) as f64 / self.trials as f64
    }
}

/// One holo roll per seed in `base_seed..base_seed + trials`.
pub fn holo_distribution(rarity: Rarity, trials: u64, base_seed: u64) -> HoloDistribution {
    let mut counts = BTreeMap::new();
    for offset in 0..trials {
        let mut rng = RngState::from_seed(base_seed.wrapping_add(offset));
        *counts.entry(roll_holo(rarity, &mut rng)).or_insert(0) += 1;
    }
    HoloDistribution {
        rarity,
        trials,
        counts,
    }
}
