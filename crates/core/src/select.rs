use crate::{Card, CardCatalog, CardFilter, PackError, Rarity, RngState, MAX_BATCH_SIZE};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use tracing::debug;

/// Which rung of the fallback ladder produced a card.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "tier", content = "rarity", rename_all = "snake_case")]
pub enum SelectionTier {
    Exact,
    Adjacent(Rarity),
    Duplicate,
}

#[derive(Debug, Clone, Copy)]
pub struct Selection<'a> {
    pub card: &'a Card,
    pub tier: SelectionTier,
}

/// Picks a card of `target` rarity that is not in `excluded`, then records
/// its id there.
///
/// An empty pool widens the search one rarity step at a time (lower
/// neighbour first). When every rarity is used up, duplicates are allowed
/// from the target pool, else the whole catalog. Filtered requests try the
/// nearest non-empty filtered pool before leaving the filter. Only an empty
/// catalog is an error.
pub fn select_card<'a, C: CardCatalog + ?Sized>(
    catalog: &'a C,
    target: Rarity,
    filter: &CardFilter,
    excluded: &mut HashSet<String>,
    rng: &mut RngState,
) -> Result<Selection<'a>, PackError> {
    let fresh = |rarity: Rarity| -> Vec<&'a Card> {
        catalog
            .cards_matching(rarity, filter)
            .into_iter()
            .filter(|card| !excluded.contains(&card.id))
            .collect()
    };

    let mut found = None;
    let pool = fresh(target);
    if !pool.is_empty() {
        found = Some((pool, SelectionTier::Exact));
    } else {
        for rarity in target.outward() {
            let pool = fresh(rarity);
            if !pool.is_empty() {
                debug!(
                    target = target.as_str(),
                    served = rarity.as_str(),
                    "rarity pool exhausted, using adjacent rarity"
                );
                found = Some((pool, SelectionTier::Adjacent(rarity)));
                break;
            }
        }
    }

    let (pool, tier) = match found {
        Some(found) => found,
        None => {
            let mut pool = catalog.cards_matching(target, filter);
            if pool.is_empty() && !filter.is_empty() {
                pool = target
                    .outward()
                    .map(|rarity| catalog.cards_matching(rarity, filter))
                    .find(|pool| !pool.is_empty())
                    .unwrap_or_default();
            }
            if pool.is_empty() {
                pool = catalog.all_cards();
            }
            debug!(
                target = target.as_str(),
                pool = pool.len(),
                "every rarity exhausted, allowing duplicates"
            );
            (pool, SelectionTier::Duplicate)
        }
    };

    let card = *rng
        .pick(&pool)
        .ok_or(PackError::CatalogExhausted { rarity: target })?;
    excluded.insert(card.id.clone());
    Ok(Selection { card, tier })
}

/// Draws `count` distinct cards for a lookup outside of pack opening.
///
/// With a rarity each draw goes through [`select_card`]. Without one the
/// draw is uniform over every filtered card not yet excluded, and falls back
/// to the common ladder once those run out.
pub fn draw_cards<'a, C: CardCatalog + ?Sized>(
    catalog: &'a C,
    count: usize,
    rarity: Option<Rarity>,
    filter: &CardFilter,
    excluded: &mut HashSet<String>,
    rng: &mut RngState,
) -> Result<Vec<Selection<'a>>, PackError> {
    if count == 0 || count > MAX_BATCH_SIZE {
        return Err(PackError::BatchSizeOutOfRange(count));
    }
    let mut picked = Vec::with_capacity(count);
    for _ in 0..count {
        let selection = match rarity {
            Some(target) => select_card(catalog, target, filter, excluded, rng)?,
            None => {
                let pool: Vec<&'a Card> = Rarity::ALL
                    .into_iter()
                    .flat_map(|rarity| catalog.cards_matching(rarity, filter))
                    .filter(|card| !excluded.contains(&card.id))
                    .collect();
                match rng.pick(&pool) {
                    Some(card) => {
                        excluded.insert(card.id.clone());
                        Selection {
                            card: *card,
                            tier: SelectionTier::Exact,
                        }
                    }
                    None => select_card(catalog, Rarity::Common, filter, excluded, rng)?,
                }
            }
        };
        picked.push(selection);
    }
    Ok(picked)
}
