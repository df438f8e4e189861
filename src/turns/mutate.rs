use super::{TurnEngine, TurnError};
use crate::model::{FieldUpdate, TechId, TechStatus, Technician};
use crate::positions;
use crate::storage::RosterStore;
use tracing::{info, warn};

pub(super) fn add<S: RosterStore>(
    engine: &TurnEngine<S>,
    name: &str,
) -> Result<Technician, TurnError> {
    let name = name.trim();
    if name.is_empty() {
        return Err(TurnError::InvalidName);
    }

    let id = engine.store.allocate_next_id()?;
    let position = u32::try_from(engine.store.count()? + 1).unwrap_or(u32::MAX);
    engine.store.save(&Technician::new(id, name, position), true)?;

    let tech = engine.require(id)?;
    info!(tech_id = %id, position, "technician added");
    Ok(tech)
}

pub(super) fn remove<S: RosterStore>(
    engine: &TurnEngine<S>,
    id: TechId,
) -> Result<(), TurnError> {
    engine.require(id)?;
    if !engine.store.delete(id)? {
        return Err(TurnError::NotFound(id));
    }
    let moved = engine.store.repack_positions()?;
    info!(tech_id = %id, repacked = moved, "technician removed");
    Ok(())
}

/// Remet le technicien disponible en fond de file puis recompacte.
pub(super) fn move_to_bottom<S: RosterStore>(
    engine: &TurnEngine<S>,
    id: TechId,
) -> Result<Technician, TurnError> {
    engine.require(id)?;
    let bottom = positions::bottom_position([engine.store.max_position()?]);
    let fields = FieldUpdate {
        status: Some(TechStatus::Available),
        queue_position: Some(bottom),
        ..FieldUpdate::default()
    };
    engine
        .store
        .update_fields(id, true, fields)?
        .ok_or(TurnError::NotFound(id))?;
    engine.store.repack_positions()?;
    engine.require(id)
}

pub(super) fn toggle_active<S: RosterStore>(
    engine: &TurnEngine<S>,
    id: TechId,
) -> Result<Technician, TurnError> {
    let tech = engine.require(id)?;
    let active = !tech.is_active;
    let fields = FieldUpdate {
        is_active: Some(active),
        ..FieldUpdate::default()
    };
    // l'horodatage ne repart qu'au check-in
    let tech = engine
        .store
        .update_fields(id, active, fields)?
        .ok_or(TurnError::NotFound(id))?;
    info!(tech_id = %id, is_active = active, "technician check-in toggled");
    Ok(tech)
}

pub(super) fn take_break<S: RosterStore>(
    engine: &TurnEngine<S>,
    id: TechId,
) -> Result<Technician, TurnError> {
    engine.require(id)?;
    let tech = engine
        .store
        .update_fields(id, true, FieldUpdate::status(TechStatus::OnBreak))?
        .ok_or(TurnError::NotFound(id))?;
    info!(tech_id = %id, position = tech.queue_position, "technician on break");
    Ok(tech)
}

/// Les ids inconnus sont ignorés ; les techniciens absents de la liste gardent
/// leur position, ce qui peut produire des doublons jusqu'au prochain recompactage.
/// Seules les positions sont écrites : statut et check-in ne sont jamais réécrits.
pub(super) fn reorder<S: RosterStore>(
    engine: &TurnEngine<S>,
    ordered: &[TechId],
) -> Result<(), TurnError> {
    let moves = positions::reorder_moves(ordered);
    let placed = if moves.is_empty() {
        0
    } else {
        engine.store.set_positions(&moves)?
    };

    let roster = engine.store.count()?;
    if placed < roster {
        warn!(
            placed,
            roster,
            "partial reorder, unlisted technicians keep their position"
        );
    }
    info!(count = placed, "queue reordered");
    Ok(())
}

pub(super) fn reset<S: RosterStore>(engine: &TurnEngine<S>) -> Result<usize, TurnError> {
    let deleted = engine.store.delete_all()?;
    engine.store.reset_id_sequence()?;
    warn!(deleted, "roster reset, id sequence restarted at 1");
    Ok(deleted)
}
