use anyhow::{bail, Context};
use daddeck_core::{Catalog, PityCounter};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::warn;

const PITY_SCHEMA_VERSION: u32 = 1;

/// A player's pity state as written between sessions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SavedPity {
    pub version: u32,
    pub counter: PityCounter,
    #[serde(default)]
    pub packs_opened: u64,
    #[serde(default)]
    pub catalog_signature: String,
}

impl SavedPity {
    pub fn new(catalog_signature: &str) -> Self {
        Self {
            version: PITY_SCHEMA_VERSION,
            counter: PityCounter::default(),
            packs_opened: 0,
            catalog_signature: catalog_signature.to_string(),
        }
    }
}

pub fn default_pity_path() -> Option<PathBuf> {
    if let Some(path) = std::env::var_os("DADDECK_PITY") {
        return Some(PathBuf::from(path));
    }
    std::env::var_os("HOME").map(|home| PathBuf::from(home).join(".daddeck_pity.json"))
}

/// Reads saved pity, or a fresh record when the file does not exist yet.
pub fn load_pity_file(path: &Path, catalog_signature: &str) -> anyhow::Result<SavedPity> {
    if !path.exists() {
        return Ok(SavedPity::new(catalog_signature));
    }
    let body = fs::read_to_string(path).with_context(|| format!("read {}", path.display()))?;
    let saved: SavedPity =
        serde_json::from_str(&body).with_context(|| format!("parse {}", path.display()))?;
    if saved.version != PITY_SCHEMA_VERSION {
        bail!(
            "unsupported pity file version {} (expected {})",
            saved.version,
            PITY_SCHEMA_VERSION
        );
    }
    if !saved.catalog_signature.is_empty() && saved.catalog_signature != catalog_signature {
        warn!(
            saved = %saved.catalog_signature,
            current = %catalog_signature,
            "pity file was written against a different catalog"
        );
    }
    Ok(saved)
}

pub fn save_pity_file(path: &Path, saved: &SavedPity) -> anyhow::Result<()> {
    let body = serde_json::to_string_pretty(saved)?;
    fs::write(path, body).with_context(|| format!("write {}", path.display()))
}

#[derive(Clone, Copy)]
struct Fnv64(u64);

impl Fnv64 {
    fn new() -> Self {
        Self(0xcbf29ce484222325)
    }

    fn update(&mut self, bytes: &[u8]) {
        for byte in bytes {
            self.0 ^= u64::from(*byte);
            self.0 = self.0.wrapping_mul(0x100000001b3);
        }
    }

    fn finish(self) -> u64 {
        self.0
    }
}

/// Stable fingerprint of the catalog contents that affect pack draws:
/// card order, ids, rarities, types and seasons.
pub fn catalog_signature(catalog: &Catalog) -> String {
    let mut hasher = Fnv64::new();
    hasher.update(b"daddeck-catalog-v1");
    for card in &catalog.cards {
        hasher.update(card.id.as_bytes());
        hasher.update(&[0]);
        hasher.update(card.rarity.as_str().as_bytes());
        hasher.update(&[0]);
        hasher.update(card.dad_type.as_str().as_bytes());
        hasher.update(&card.season_id.unwrap_or(0).to_le_bytes());
    }
    format!("{:016x}", hasher.finish())
}
