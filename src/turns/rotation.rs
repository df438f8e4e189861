use super::{TurnEngine, TurnError};
use crate::model::{FieldUpdate, TechId, TechStatus, Technician};
use crate::storage::RosterStore;
use tracing::info;

pub(super) fn assign<S: RosterStore>(
    engine: &TurnEngine<S>,
    id: TechId,
) -> Result<Technician, TurnError> {
    let tech = engine.require(id)?;
    if tech.status != TechStatus::Available {
        return Err(TurnError::NotAvailable {
            id,
            status: tech.status,
        });
    }

    let busy = engine
        .store
        .update_fields(id, true, FieldUpdate::status(TechStatus::Busy))?
        .ok_or(TurnError::NotFound(id))?;
    info!(tech_id = %id, position = busy.queue_position, "technician assigned");
    Ok(busy)
}

pub(super) fn assign_next<S: RosterStore>(
    engine: &TurnEngine<S>,
) -> Result<Technician, TurnError> {
    let Some(next) = engine.next_available()? else {
        return Err(TurnError::NoneAvailable);
    };
    assign(engine, next.id)
}
