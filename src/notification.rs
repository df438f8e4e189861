use std::sync::atomic::{AtomicU64, Ordering};
use tracing::info;

/// Point d'accroche pour la propagation des changements du roster.
///
/// Appelé après chaque mutation réussie. Aucun contenu n'est poussé :
/// l'observateur relit `list_sorted()` s'il veut diffuser l'état.
pub trait RosterObserver {
    fn roster_changed(&self);
}

/// Observateur par défaut : se contente de tracer l'événement.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogObserver;

impl RosterObserver for LogObserver {
    fn roster_changed(&self) {
        info!("roster changed");
    }
}

/// Compte les notifications ; pratique pour les tests ou un polling simple.
#[derive(Debug, Default)]
pub struct ChangeCounter {
    changes: AtomicU64,
}

impl ChangeCounter {
    pub fn new() -> Self {
        Self::default()
    }
    pub fn count(&self) -> u64 {
        self.changes.load(Ordering::Relaxed)
    }
}

impl RosterObserver for ChangeCounter {
    fn roster_changed(&self) {
        self.changes.fetch_add(1, Ordering::Relaxed);
    }
}
