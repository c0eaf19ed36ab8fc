//! Seed catalog.
//!
//! Seeds are the static prompt templates a writing session is anchored
//! to. They are loaded from a JSON file at startup; when the file is
//! missing or malformed the caller can fall back to a built-in catalog
//! containing only the free-writing seed.

use std::collections::HashMap;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::chat::SigilData;
use crate::error::CoreError;

/// The free-writing seed. Always present, even in the fallback catalog.
pub const FREE_WRITING_SEED_ID: &str = "sem_99";

/// One seed definition.
///
/// The data file carries more fields than these (intro text, UI copy);
/// unknown fields are ignored.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Seed {
    pub id: String,

    #[serde(rename = "nome")]
    pub name: String,

    /// The sealing phrase used when the model does not provide one.
    #[serde(rename = "frase_finale", default)]
    pub closing_phrase: String,

    /// The seed's canonical sigil, used as a fallback when the model
    /// fails to generate one on the closing turn.
    #[serde(rename = "sigillo", default)]
    pub sigil: Option<SigilData>,
}

/// In-memory seed lookup, keyed by seed id.
#[derive(Debug, Clone)]
pub struct SeedCatalog {
    seeds: HashMap<String, Seed>,
}

impl SeedCatalog {
    /// Build a catalog from a list of seeds. Later duplicates win.
    pub fn from_seeds(seeds: Vec<Seed>) -> Self {
        Self {
            seeds: seeds.into_iter().map(|s| (s.id.clone(), s)).collect(),
        }
    }

    /// Load the catalog from a JSON file containing a seed array.
    pub fn load(path: &Path) -> Result<Self, CoreError> {
        let data = std::fs::read_to_string(path).map_err(|e| {
            CoreError::SeedData(format!("Cannot read {}: {e}", path.display()))
        })?;
        let seeds: Vec<Seed> = serde_json::from_str(&data).map_err(|e| {
            CoreError::SeedData(format!("Cannot parse {}: {e}", path.display()))
        })?;
        Ok(Self::from_seeds(seeds))
    }

    /// Minimal catalog holding only the free-writing seed, so the
    /// service still boots when the data file cannot be loaded.
    pub fn fallback() -> Self {
        let seed = Seed {
            id: FREE_WRITING_SEED_ID.to_string(),
            name: "L'Eco Universale (Fallback)".to_string(),
            closing_phrase: "La verità si manifesta nella scrittura libera (Fallback).".to_string(),
            sigil: Some(SigilData {
                dominant_symbol: "❓".to_string(),
                image: "Un sigillo di fallback dovuto a dati mancanti.".to_string(),
                color: "#AAAAAA".to_string(),
                shape: "quadrato".to_string(),
                sigil_code: "SIG-FB-99".to_string(),
            }),
        };
        Self::from_seeds(vec![seed])
    }

    pub fn get(&self, id: &str) -> Option<&Seed> {
        self.seeds.get(id)
    }

    pub fn len(&self) -> usize {
        self.seeds.len()
    }

    pub fn is_empty(&self) -> bool {
        self.seeds.is_empty()
    }
}
