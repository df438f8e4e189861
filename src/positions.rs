//! Allocation des positions de file : fond de file et recompactage `1..N`.

use crate::model::{TechId, Technician};

/// Position en fond de file : `max + 1` (1 sur un roster vide).
pub fn bottom_position<I>(positions: I) -> u32
where
    I: IntoIterator<Item = u32>,
{
    positions.into_iter().max().unwrap_or(0) + 1
}

/// Calcule le recompactage : tri stable par position (égalités par id),
/// renumérotation `1..N`, et ne renvoie que les enregistrements modifiés.
///
/// Un roster déjà contigu donne un plan vide.
pub fn repack_plan(technicians: &[Technician]) -> Vec<Technician> {
    let mut ordered: Vec<&Technician> = technicians.iter().collect();
    ordered.sort_by_key(|t| (t.queue_position, t.id));

    ordered
        .into_iter()
        .zip(1u32..)
        .filter(|(t, pos)| t.queue_position != *pos)
        .map(|(t, pos)| {
            let mut moved = t.clone();
            moved.queue_position = pos;
            moved
        })
        .collect()
}

/// Déplacements d'un `reorder` : position = index + 1 pour chaque id listé.
///
/// Le store ignore les ids inconnus ; les techniciens non listés gardent leur
/// position, ce qui peut créer des doublons. Aucune validation n'est faite ici.
pub fn reorder_moves(ordered: &[TechId]) -> Vec<(TechId, u32)> {
    ordered.iter().copied().zip(1u32..).collect()
}

/// Vrai si les positions forment exactement `1..N`.
pub fn is_contiguous(technicians: &[Technician]) -> bool {
    let mut positions: Vec<u32> = technicians.iter().map(|t| t.queue_position).collect();
    positions.sort_unstable();
    positions.iter().zip(1u32..).all(|(p, expected)| *p == expected)
}
