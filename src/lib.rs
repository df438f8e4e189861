#![forbid(unsafe_code)]
//! Turnqueue : bibliothèque de rotation des tours pour techniciens de salon.
//!
//! - File équitable : le prochain tour revient au technicien disponible et pointé
//!   de plus petite position.
//! - Fin de tour ou retour de pause : fond de file, puis recompactage `1..N`.
//! - Stockage abstrait (mémoire ou document JSON partagé), choisi au démarrage.
//! - Ids monotones via un compteur dédié ; tout en UTC.

pub mod config;
pub mod ids;
pub mod io;
pub mod model;
pub mod notification;
pub mod positions;
pub mod storage;
pub mod turns;

pub use config::{Settings, StoreBackend};
pub use model::{FieldUpdate, Roster, TechId, TechStatus, Technician};
pub use notification::{ChangeCounter, LogObserver, RosterObserver};
pub use storage::{JsonFileStore, MemoryStore, RosterStore};
pub use turns::{TurnEngine, TurnError};
