//! Allocation d'identifiants via un compteur monotone séparé des fiches.

use crate::model::TechId;

/// Résultat d'une allocation : id attribué et nouvelle valeur du compteur.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Allocation {
    pub id: TechId,
    pub next_counter: u64,
    /// `true` si le compteur était absent et a été reconstruit par scan.
    pub from_scan: bool,
}

/// Alloue un id à partir du compteur stocké.
///
/// Compteur absent (démarrage à froid ou document hérité) : scan unique des
/// ids existants, `max + 1` est attribué et le compteur passe à `max + 2`.
/// L'appelant doit persister `next_counter` dans la même écriture atomique.
pub fn allocate<I>(counter: Option<u64>, existing: I) -> Allocation
where
    I: IntoIterator<Item = TechId>,
{
    match counter {
        Some(value) => Allocation {
            id: TechId::new(value.max(1)),
            next_counter: value.max(1) + 1,
            from_scan: false,
        },
        None => {
            let next = existing.into_iter().map(TechId::get).max().unwrap_or(0) + 1;
            Allocation {
                id: TechId::new(next),
                next_counter: next + 1,
                from_scan: true,
            }
        }
    }
}

/// Valeur du compteur après une remise à zéro complète.
pub const RESET_COUNTER: u64 = 1;
