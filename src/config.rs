use crate::storage::{JsonFileStore, MemoryStore, RosterStore};
use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use tracing::info;

/// Backend de stockage, choisi une fois au démarrage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StoreBackend {
    /// Roster en mémoire, perdu à la sortie du processus
    Memory,
    /// Document JSON partagé, relu et réécrit à chaque opération
    #[default]
    Json,
}

/// Réglages d'exécution
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Settings {
    pub backend: StoreBackend,
    pub roster_path: PathBuf,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            backend: StoreBackend::default(),
            roster_path: PathBuf::from("roster.json"),
        }
    }
}

impl Settings {
    /// Ouvre le store configuré.
    pub fn open_store(&self) -> anyhow::Result<Box<dyn RosterStore>> {
        let store: Box<dyn RosterStore> = match self.backend {
            StoreBackend::Memory => Box::new(MemoryStore::new()),
            StoreBackend::Json => Box::new(JsonFileStore::open(&self.roster_path)?),
        };
        info!(backend = ?self.backend, path = %self.roster_path.display(), "roster store opened");
        Ok(store)
    }
}
