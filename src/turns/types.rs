use crate::model::{TechId, TechStatus};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum TurnError {
    #[error("technician with id {0} not found")]
    NotFound(TechId),
    #[error("technician {id} is not available (current status: {status})")]
    NotAvailable { id: TechId, status: TechStatus },
    #[error("no available technicians in the queue")]
    NoneAvailable,
    #[error("technician name cannot be empty")]
    InvalidName,
    /// Erreur du store, propagée telle quelle.
    #[error(transparent)]
    Store(#[from] anyhow::Error),
}

impl TurnError {
    /// Id du technicien en cause, quand l'erreur en porte un.
    pub fn tech_id(&self) -> Option<TechId> {
        match self {
            TurnError::NotFound(id) | TurnError::NotAvailable { id, .. } => Some(*id),
            _ => None,
        }
    }

    /// Vrai si l'erreur vient d'une entrée/sortie du store (store injoignable),
    /// faux pour un document illisible ou une erreur métier.
    pub fn is_store_unreachable(&self) -> bool {
        match self {
            TurnError::Store(e) => e.chain().any(|cause| cause.is::<std::io::Error>()),
            _ => false,
        }
    }
}
