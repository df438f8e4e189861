//! Moteur de règles de tours : qui passe ensuite, et ce qu'une transition de
//! statut fait à la position et au statut d'un technicien.
//!
//! Le moteur ne garde aucun roster : chaque opération lit et écrit via son
//! [`RosterStore`]. Les appelants n'obtiennent que des copies.
//!
//! Le recompactage n'est pas transactionnel entre fiches : deux recompactages
//! concurrents sur un store partagé peuvent s'entrelacer et laisser des
//! positions non contiguës jusqu'au recompactage suivant.

mod mutate;
mod rotation;
mod types;

pub use types::TurnError;

use crate::model::{TechId, Technician};
use crate::notification::RosterObserver;
use crate::storage::RosterStore;
use tracing::{error, info, warn};

/// TurnEngine : applique les règles de rotation sur un store
pub struct TurnEngine<S> {
    store: S,
    observer: Option<Box<dyn RosterObserver + Send + Sync>>,
}

impl<S: RosterStore> TurnEngine<S> {
    pub fn new(store: S) -> Self {
        Self {
            store,
            observer: None,
        }
    }

    /// Branche l'observateur appelé après chaque mutation réussie.
    pub fn with_observer<O>(mut self, observer: O) -> Self
    where
        O: RosterObserver + Send + Sync + 'static,
    {
        self.observer = Some(Box::new(observer));
        self
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    fn notify(&self) {
        if let Some(observer) = &self.observer {
            observer.roster_changed();
        }
    }

    /// Prochain technicien disponible et pointé (plus petite position).
    pub fn next_available(&self) -> Result<Option<Technician>, TurnError> {
        Ok(self.store.next_available_record()?)
    }

    pub fn lookup(&self, id: TechId) -> Result<Option<Technician>, TurnError> {
        Ok(self.store.load_one(id)?)
    }

    pub fn require(&self, id: TechId) -> Result<Technician, TurnError> {
        self.lookup(id)?.ok_or(TurnError::NotFound(id))
    }

    /// Ajoute un technicien en fond de file, disponible mais non pointé.
    pub fn add(&self, name: &str) -> Result<Technician, TurnError> {
        let tech = mutate::add(self, name)?;
        self.notify();
        Ok(tech)
    }

    pub fn remove(&self, id: TechId) -> Result<(), TurnError> {
        mutate::remove(self, id)?;
        self.notify();
        Ok(())
    }

    /// Passe un technicien précis en BUSY. Sa position ne bouge pas.
    pub fn assign(&self, id: TechId) -> Result<Technician, TurnError> {
        let tech = rotation::assign(self, id)?;
        self.notify();
        Ok(tech)
    }

    pub fn assign_next(&self) -> Result<Technician, TurnError> {
        let tech = rotation::assign_next(self)?;
        self.notify();
        Ok(tech)
    }

    /// Fin de tour : disponible, fond de file, recompactage.
    ///
    /// `is_request` distingue un tour demandé d'un client de passage ; il est
    /// tracé mais ne change rien à la règle pour l'instant.
    pub fn complete_turn(&self, id: TechId, is_request: bool) -> Result<Technician, TurnError> {
        let tech = mutate::move_to_bottom(self, id)?;
        info!(
            tech_id = %id,
            is_request,
            position = tech.queue_position,
            "turn completed"
        );
        self.notify();
        Ok(tech)
    }

    pub fn toggle_active(&self, id: TechId) -> Result<Technician, TurnError> {
        let tech = mutate::toggle_active(self, id)?;
        self.notify();
        Ok(tech)
    }

    pub fn take_break(&self, id: TechId) -> Result<Technician, TurnError> {
        let tech = mutate::take_break(self, id)?;
        self.notify();
        Ok(tech)
    }

    pub fn return_from_break(&self, id: TechId) -> Result<Technician, TurnError> {
        let tech = mutate::move_to_bottom(self, id)?;
        info!(tech_id = %id, position = tech.queue_position, "technician back from break");
        self.notify();
        Ok(tech)
    }

    /// Position = index + 1 pour chaque id listé. Aucune validation de
    /// complétude : une liste partielle peut laisser des positions en double.
    pub fn reorder(&self, ordered: &[TechId]) -> Result<(), TurnError> {
        mutate::reorder(self, ordered)?;
        self.notify();
        Ok(())
    }

    /// Remise à zéro administrative : tout est supprimé, les ids repartent à 1.
    pub fn reset(&self) -> Result<usize, TurnError> {
        let deleted = mutate::reset(self)?;
        self.notify();
        Ok(deleted)
    }

    /// Roster trié par position.
    ///
    /// Si le store échoue, renvoie une liste vide (mode dégradé). Un store
    /// injoignable est tracé en `warn`, un document illisible en `error` ;
    /// les deux portent `degraded = true`. Voir [`Self::try_list_sorted`].
    pub fn list_sorted(&self) -> Vec<Technician> {
        match self.try_list_sorted() {
            Ok(list) => list,
            Err(e) if e.is_store_unreachable() => {
                warn!(
                    degraded = true,
                    cause = "unreachable",
                    error = %e,
                    "roster store unreachable, serving empty roster"
                );
                Vec::new()
            }
            Err(e) => {
                error!(
                    degraded = true,
                    cause = "unreadable",
                    error = %e,
                    "roster document unreadable, serving empty roster"
                );
                Vec::new()
            }
        }
    }

    pub fn try_list_sorted(&self) -> Result<Vec<Technician>, TurnError> {
        let mut list = self.store.load_all()?;
        list.sort_by_key(|t| (t.queue_position, t.id));
        Ok(list)
    }
}
