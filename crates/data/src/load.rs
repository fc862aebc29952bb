use anyhow::{bail, Context};
use daddeck_core::{
    default_pack_config, premium_pack_config, Card, Catalog, DadType, PackConfig, PityThresholds,
};
use serde::de::DeserializeOwned;
use std::collections::{BTreeMap, HashSet};
use std::fs;
use std::path::Path;
use tracing::info;

pub const CARDS_FILE: &str = "cards.json";
pub const PACKS_FILE: &str = "packs.json";
pub const PITY_FILE: &str = "pity.json";

const MAX_STAT: u8 = 100;

/// Everything the engine needs from an assets directory.
#[derive(Debug, Clone)]
pub struct Assets {
    pub catalog: Catalog,
    pub packs: BTreeMap<String, PackConfig>,
    pub pity_thresholds: PityThresholds,
}

impl Assets {
    pub fn pack_config(&self, name: &str) -> Option<&PackConfig> {
        self.packs.get(name)
    }

    /// Config for a pack request as it arrives from a front end.
    ///
    /// The named config is used as is when one exists. Otherwise the
    /// standard slots are used with `pack_type` passed through untouched, so
    /// the engine rejects unknown types and missing theme/season parameters
    /// itself.
    pub fn request_config(
        &self,
        pack_type: &str,
        theme: Option<DadType>,
        season: Option<u32>,
    ) -> PackConfig {
        let key = pack_type.trim().to_ascii_lowercase();
        let mut config = match self.packs.get(&key) {
            Some(config) => config.clone(),
            None if key == "premium" => premium_pack_config(),
            None => {
                let mut config = self
                    .packs
                    .get("standard")
                    .cloned()
                    .unwrap_or_else(default_pack_config);
                config.pack_type = Some(key);
                config
            }
        };
        config.theme_type = theme.or(config.theme_type);
        config.season_id = season.or(config.season_id);
        config.pity_thresholds = self.pity_thresholds;
        config
    }
}

pub fn load_assets(dir: &Path) -> anyhow::Result<Assets> {
    let catalog = load_catalog(&dir.join(CARDS_FILE))?;
    let pity_thresholds = load_pity_thresholds(&dir.join(PITY_FILE))?;
    let packs_path = dir.join(PACKS_FILE);
    let mut packs = if packs_path.exists() {
        load_pack_configs(&packs_path)?
    } else {
        BTreeMap::new()
    };
    packs
        .entry("standard".to_string())
        .or_insert_with(default_pack_config);
    packs
        .entry("premium".to_string())
        .or_insert_with(premium_pack_config);
    for config in packs.values_mut() {
        config.pity_thresholds = pity_thresholds;
    }
    info!(
        cards = catalog.len(),
        packs = packs.len(),
        dir = %dir.display(),
        "loaded assets"
    );
    Ok(Assets {
        catalog,
        packs,
        pity_thresholds,
    })
}

pub fn load_catalog(path: &Path) -> anyhow::Result<Catalog> {
    let cards: Vec<Card> = load_json(path)?;
    validate_cards(&cards).with_context(|| format!("validate {}", path.display()))?;
    Ok(Catalog::new(cards))
}

pub fn validate_cards(cards: &[Card]) -> anyhow::Result<()> {
    let mut seen = HashSet::new();
    for card in cards {
        if card.id.trim().is_empty() {
            bail!("card with empty id ({})", card.name);
        }
        if card.name.trim().is_empty() {
            bail!("card {} has an empty name", card.id);
        }
        if !seen.insert(card.id.as_str()) {
            bail!("duplicate card id {}", card.id);
        }
        if let Some(stat) = card.stats.values().iter().find(|value| **value > MAX_STAT) {
            bail!("card {} has stat {} above {}", card.id, stat, MAX_STAT);
        }
    }
    Ok(())
}

/// Named pack configs. Each one is checked the same way the engine checks
/// it before drawing, so a bad file fails at load time.
pub fn load_pack_configs(path: &Path) -> anyhow::Result<BTreeMap<String, PackConfig>> {
    let packs: BTreeMap<String, PackConfig> = load_json(path)?;
    for (name, config) in &packs {
        config
            .validate()
            .with_context(|| format!("pack config {name} in {}", path.display()))?;
        config
            .resolve_kind()
            .with_context(|| format!("pack config {name} in {}", path.display()))?;
    }
    Ok(packs)
}

pub fn load_pity_thresholds(path: &Path) -> anyhow::Result<PityThresholds> {
    if !path.exists() {
        return Ok(PityThresholds::default());
    }
    let thresholds: PityThresholds = load_json(path)?;
    if let Err(err) = thresholds.validate() {
        bail!("{}: {err}", path.display());
    }
    Ok(thresholds)
}

fn load_json<T: DeserializeOwned>(path: impl AsRef<Path>) -> anyhow::Result<T> {
    let path = path.as_ref();
    let raw = fs::read_to_string(path).with_context(|| format!("read {}", path.display()))?;
    let value = serde_json::from_str(&raw).with_context(|| format!("parse {}", path.display()))?;
    Ok(value)
}
