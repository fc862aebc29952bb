use daddeck_core::{
    default_pack_config, generate_batch, generate_pack, DadType, HoloRoller, HoloVariant,
    PackDesign, PackError, PackKind, PityCounter, Rarity,
};
use daddeck_data::{catalog_signature, load_assets, Assets};
use serde::Deserialize;
use std::collections::HashSet;
use std::path::PathBuf;

fn assets_root() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("..")
        .join("..")
        .join("assets")
}

fn assets() -> Assets {
    load_assets(&assets_root()).expect("load assets")
}

#[derive(Debug, Deserialize)]
struct FixtureCard {
    id: String,
    rarity: Rarity,
    holo_type: HoloVariant,
}

#[derive(Debug, Deserialize)]
struct PackFixture {
    seed: u64,
    id: String,
    design: PackDesign,
    best_rarity: Rarity,
    cards: Vec<FixtureCard>,
}

#[test]
fn shipped_assets_load_and_validate() {
    let assets = assets();
    assert_eq!(assets.catalog.len(), 38);
    for rarity in Rarity::ALL {
        assert!(assets.catalog.count_by_rarity(rarity) > 0, "{rarity:?}");
    }
    assert!(assets.pack_config("standard").is_some());
    assert!(assets.pack_config("premium").is_some());
    let retro = assets.pack_config("retro").expect("retro");
    assert_eq!(retro.holo_roller, HoloRoller::Legacy);
    assert_eq!(retro.cards_per_pack, 5);
}

#[test]
fn shipped_standard_config_matches_builtin() {
    let assets = assets();
    let standard = assets.pack_config("standard").expect("standard");
    assert_eq!(standard.rarity_slots, default_pack_config().rarity_slots);
    assert_eq!(standard.cards_per_pack, default_pack_config().cards_per_pack);
}

#[test]
fn default_pack_seed_42_matches_fixture() {
    let assets = assets();
    let raw = std::fs::read_to_string(assets_root().join("fixtures").join("default_seed_42.json"))
        .expect("read fixture");
    let fixture: PackFixture = serde_json::from_str(&raw).expect("parse fixture");

    let outcome = generate_pack(&default_pack_config(), &assets.catalog, Some(fixture.seed), None)
        .expect("pack");
    let pack = &outcome.pack;
    assert_eq!(pack.id, fixture.id);
    assert_eq!(pack.design, fixture.design);
    assert_eq!(pack.best_rarity, fixture.best_rarity);
    assert_eq!(pack.cards.len(), fixture.cards.len());
    for (card, expected) in pack.cards.iter().zip(&fixture.cards) {
        assert_eq!(card.id(), expected.id);
        assert_eq!(card.rarity(), expected.rarity);
        assert_eq!(card.holo_type, expected.holo_type);
        assert_eq!(card.is_holo, expected.holo_type != HoloVariant::None);
    }
}

#[test]
fn same_inputs_same_pack_across_fresh_loads() {
    let first = generate_pack(&default_pack_config(), &assets().catalog, Some(42), None)
        .expect("first");
    let second = generate_pack(&default_pack_config(), &assets().catalog, Some(42), None)
        .expect("second");
    assert_eq!(first.pack.cards, second.pack.cards);
    assert_eq!(first.pack.id, second.pack.id);
    assert_eq!(first.pack.design, second.pack.design);
    assert_eq!(first.pity_counter, second.pity_counter);
}

#[test]
fn full_catalog_never_repeats_a_card() {
    let assets = assets();
    for name in ["standard", "premium", "retro"] {
        let config = assets.pack_config(name).expect("config");
        for seed in 0..200 {
            let outcome = generate_pack(config, &assets.catalog, Some(seed), None).expect("pack");
            let ids: HashSet<&str> = outcome.pack.cards.iter().map(|card| card.id()).collect();
            assert_eq!(ids.len(), config.cards_per_pack, "{name} seed {seed}");
            assert!(outcome.anomalies.is_empty(), "{name} seed {seed}");
        }
    }
}

#[test]
fn premium_guarantees_uncommons() {
    let assets = assets();
    let config = assets.request_config("premium", None, None);
    for seed in 0..100 {
        let outcome = generate_pack(&config, &assets.catalog, Some(seed), None).expect("pack");
        assert_eq!(outcome.pack.pack_type, PackKind::Premium);
        assert!(outcome.pack.count_rarity(Rarity::Uncommon) >= 3);
        assert!(outcome.pack.best_rarity >= Rarity::Epic);
    }
}

#[test]
fn theme_packs_stay_on_theme() {
    let assets = assets();
    let config = assets.request_config("theme", Some(DadType::GolfDad), None);
    for seed in 0..50 {
        let outcome = generate_pack(&config, &assets.catalog, Some(seed), None).expect("pack");
        assert_eq!(outcome.pack.pack_type, PackKind::Theme(DadType::GolfDad));
        assert_eq!(outcome.pack.cards.len(), 6);
        assert!(outcome
            .pack
            .cards
            .iter()
            .all(|card| card.card.dad_type == DadType::GolfDad));
    }
}

#[test]
fn season_packs_draw_from_the_season() {
    let assets = assets();
    let config = assets.request_config("season", None, Some(1));
    let outcome = generate_pack(&config, &assets.catalog, Some(7), None).expect("pack");
    assert_eq!(outcome.pack.pack_type, PackKind::Season(1));
    assert!(outcome
        .pack
        .cards
        .iter()
        .all(|card| card.card.season_id == Some(1)));
}

#[test]
fn bad_requests_fail_before_generation() {
    let assets = assets();
    let missing_theme = assets.request_config("theme", None, None);
    assert_eq!(
        generate_pack(&missing_theme, &assets.catalog, Some(1), None),
        Err(PackError::MissingTheme)
    );
    let unknown = assets.request_config("booster", None, None);
    assert_eq!(
        generate_pack(&unknown, &assets.catalog, Some(1), None),
        Err(PackError::UnknownPackType("booster".to_string()))
    );
}

#[test]
fn batch_threads_pity_like_sequential_opens() {
    let assets = assets();
    let config = assets.request_config("standard", None, None);
    let start = PityCounter {
        rare: 2,
        epic: 28,
        legendary: 57,
        mythic: 97,
    };
    let batch = generate_batch(&config, &assets.catalog, 5, Some(1_000), Some(&start))
        .expect("batch");

    let mut counter = start;
    for (index, outcome) in batch.outcomes.iter().enumerate() {
        let seed = Some(1_000 + index as u64);
        let manual =
            generate_pack(&config, &assets.catalog, seed, Some(&counter)).expect("manual");
        assert_eq!(manual.pack.cards, outcome.pack.cards);
        counter = manual.pity_counter;
    }
    assert_eq!(batch.pity_counter, counter);
    assert_eq!(batch.packs().count(), 5);
}

#[test]
fn catalog_signature_is_stable_for_shipped_assets() {
    let a = catalog_signature(&assets().catalog);
    let b = catalog_signature(&assets().catalog);
    assert_eq!(a, b);
}
