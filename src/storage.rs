use crate::ids;
use crate::model::{FieldUpdate, Roster, TechId, Technician};
use crate::positions;
use anyhow::Context;
use chrono::Utc;
use parking_lot::Mutex;
use std::collections::HashSet;
use std::fs;
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;
use tracing::debug;

/// Contrat de persistance attendu par le moteur de tours.
///
/// Chaque appel est atomique pour l'enregistrement qu'il touche ; une suite
/// d'appels (lecture, validation, écriture) ne l'est pas.
pub trait RosterStore {
    /// Tous les techniciens, triés par position.
    fn load_all(&self) -> anyhow::Result<Vec<Technician>>;
    fn load_one(&self, id: TechId) -> anyhow::Result<Option<Technician>>;
    /// Upsert. `touch_status_time` horodate le statut côté store.
    fn save(&self, tech: &Technician, touch_status_time: bool) -> anyhow::Result<()>;
    /// Upsert groupé, tout ou rien ; ne touche pas aux horodatages.
    fn save_batch(&self, techs: &[Technician]) -> anyhow::Result<()>;
    /// Renvoie `false` si l'id n'existait pas.
    fn delete(&self, id: TechId) -> anyhow::Result<bool>;
    fn delete_all(&self) -> anyhow::Result<usize>;
    fn next_available_record(&self) -> anyhow::Result<Option<Technician>>;
    fn max_position(&self) -> anyhow::Result<u32>;
    fn count(&self) -> anyhow::Result<usize>;
    /// Mise à jour partielle ; `None` si l'id est inconnu.
    fn update_fields(
        &self,
        id: TechId,
        touch_status_time: bool,
        fields: FieldUpdate,
    ) -> anyhow::Result<Option<Technician>>;
    /// Lecture + incrément du compteur en une seule opération.
    fn allocate_next_id(&self) -> anyhow::Result<TechId>;
    fn reset_id_sequence(&self) -> anyhow::Result<()>;
    /// Affecte les positions données sans toucher aux autres champs, en une
    /// seule écriture. Ids inconnus ignorés ; renvoie le nombre de fiches
    /// distinctes placées.
    fn set_positions(&self, moves: &[(TechId, u32)]) -> anyhow::Result<usize>;
    /// Renumérote `1..N` en une écriture groupée ; renvoie le nombre de fiches déplacées.
    fn repack_positions(&self) -> anyhow::Result<usize>;
}

impl<S: RosterStore + ?Sized> RosterStore for Box<S> {
    fn load_all(&self) -> anyhow::Result<Vec<Technician>> {
        (**self).load_all()
    }
    fn load_one(&self, id: TechId) -> anyhow::Result<Option<Technician>> {
        (**self).load_one(id)
    }
    fn save(&self, tech: &Technician, touch_status_time: bool) -> anyhow::Result<()> {
        (**self).save(tech, touch_status_time)
    }
    fn save_batch(&self, techs: &[Technician]) -> anyhow::Result<()> {
        (**self).save_batch(techs)
    }
    fn delete(&self, id: TechId) -> anyhow::Result<bool> {
        (**self).delete(id)
    }
    fn delete_all(&self) -> anyhow::Result<usize> {
        (**self).delete_all()
    }
    fn next_available_record(&self) -> anyhow::Result<Option<Technician>> {
        (**self).next_available_record()
    }
    fn max_position(&self) -> anyhow::Result<u32> {
        (**self).max_position()
    }
    fn count(&self) -> anyhow::Result<usize> {
        (**self).count()
    }
    fn update_fields(
        &self,
        id: TechId,
        touch_status_time: bool,
        fields: FieldUpdate,
    ) -> anyhow::Result<Option<Technician>> {
        (**self).update_fields(id, touch_status_time, fields)
    }
    fn allocate_next_id(&self) -> anyhow::Result<TechId> {
        (**self).allocate_next_id()
    }
    fn reset_id_sequence(&self) -> anyhow::Result<()> {
        (**self).reset_id_sequence()
    }
    fn set_positions(&self, moves: &[(TechId, u32)]) -> anyhow::Result<usize> {
        (**self).set_positions(moves)
    }
    fn repack_positions(&self) -> anyhow::Result<usize> {
        (**self).repack_positions()
    }
}

// Opérations communes sur un roster déjà chargé.

fn upsert(roster: &mut Roster, tech: &Technician, touch_status_time: bool) {
    let mut record = tech.clone();
    if touch_status_time {
        record.status_start_time = Some(Utc::now());
    }
    match roster.find_mut_by_id(tech.id) {
        Some(existing) => {
            if record.status_start_time.is_none() {
                record.status_start_time = existing.status_start_time;
            }
            *existing = record;
        }
        None => roster.technicians.push(record),
    }
}

fn update(
    roster: &mut Roster,
    id: TechId,
    touch_status_time: bool,
    fields: FieldUpdate,
) -> Option<Technician> {
    let tech = roster.find_mut_by_id(id)?;
    fields.apply(tech);
    if touch_status_time {
        tech.status_start_time = Some(Utc::now());
    }
    Some(tech.clone())
}

fn allocate(roster: &mut Roster) -> TechId {
    let alloc = ids::allocate(roster.next_id, roster.technicians.iter().map(|t| t.id));
    if alloc.from_scan {
        debug!(id = %alloc.id, "id counter missing, rebuilt from roster scan");
    }
    roster.next_id = Some(alloc.next_counter);
    alloc.id
}

fn place(roster: &mut Roster, moves: &[(TechId, u32)]) -> usize {
    let mut placed = HashSet::new();
    for &(id, pos) in moves {
        if let Some(tech) = roster.find_mut_by_id(id) {
            tech.queue_position = pos;
            placed.insert(id);
        }
    }
    placed.len()
}

fn repack(roster: &mut Roster) -> usize {
    let plan = positions::repack_plan(&roster.technicians);
    let moved = plan.len();
    for tech in plan {
        if let Some(existing) = roster.find_mut_by_id(tech.id) {
            existing.queue_position = tech.queue_position;
        }
    }
    moved
}

fn max_position(roster: &Roster) -> u32 {
    roster
        .technicians
        .iter()
        .map(|t| t.queue_position)
        .max()
        .unwrap_or(0)
}

/// Roster en mémoire du processus.
#[derive(Debug, Default)]
pub struct MemoryStore {
    roster: Mutex<Roster>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reprend un roster existant (par ex. chargé depuis un export).
    pub fn from_roster(roster: Roster) -> Self {
        Self {
            roster: Mutex::new(roster),
        }
    }
}

impl RosterStore for MemoryStore {
    fn load_all(&self) -> anyhow::Result<Vec<Technician>> {
        Ok(self.roster.lock().sorted())
    }

    fn load_one(&self, id: TechId) -> anyhow::Result<Option<Technician>> {
        Ok(self.roster.lock().find_by_id(id).cloned())
    }

    fn save(&self, tech: &Technician, touch_status_time: bool) -> anyhow::Result<()> {
        upsert(&mut self.roster.lock(), tech, touch_status_time);
        Ok(())
    }

    fn save_batch(&self, techs: &[Technician]) -> anyhow::Result<()> {
        let mut roster = self.roster.lock();
        for tech in techs {
            upsert(&mut roster, tech, false);
        }
        Ok(())
    }

    fn delete(&self, id: TechId) -> anyhow::Result<bool> {
        let mut roster = self.roster.lock();
        let before = roster.technicians.len();
        roster.technicians.retain(|t| t.id != id);
        Ok(roster.technicians.len() != before)
    }

    fn delete_all(&self) -> anyhow::Result<usize> {
        let mut roster = self.roster.lock();
        let n = roster.technicians.len();
        roster.technicians.clear();
        Ok(n)
    }

    fn next_available_record(&self) -> anyhow::Result<Option<Technician>> {
        Ok(self.roster.lock().next_available().cloned())
    }

    fn max_position(&self) -> anyhow::Result<u32> {
        Ok(max_position(&self.roster.lock()))
    }

    fn count(&self) -> anyhow::Result<usize> {
        Ok(self.roster.lock().technicians.len())
    }

    fn update_fields(
        &self,
        id: TechId,
        touch_status_time: bool,
        fields: FieldUpdate,
    ) -> anyhow::Result<Option<Technician>> {
        Ok(update(&mut self.roster.lock(), id, touch_status_time, fields))
    }

    fn allocate_next_id(&self) -> anyhow::Result<TechId> {
        Ok(allocate(&mut self.roster.lock()))
    }

    fn reset_id_sequence(&self) -> anyhow::Result<()> {
        self.roster.lock().next_id = Some(ids::RESET_COUNTER);
        Ok(())
    }

    fn set_positions(&self, moves: &[(TechId, u32)]) -> anyhow::Result<usize> {
        Ok(place(&mut self.roster.lock(), moves))
    }

    fn repack_positions(&self) -> anyhow::Result<usize> {
        Ok(repack(&mut self.roster.lock()))
    }
}

/// Roster externe : un document JSON relu et réécrit à chaque opération.
///
/// Les écritures passent par un fichier temporaire renommé atomiquement.
/// Le verrou ne sérialise que les appels de ce processus.
pub struct JsonFileStore {
    path: PathBuf,
    lock: Mutex<()>,
}

impl JsonFileStore {
    pub fn open<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        Ok(Self {
            path: path.as_ref().to_path_buf(),
            lock: Mutex::new(()),
        })
    }

    fn read(&self) -> anyhow::Result<Roster> {
        let data = match fs::read(&self.path) {
            Ok(data) => data,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Roster::default()),
            Err(e) => {
                return Err(e).with_context(|| format!("reading {}", self.path.display()));
            }
        };
        let roster: Roster = serde_json::from_slice(&data)
            .with_context(|| format!("parsing {}", self.path.display()))?;
        Ok(roster)
    }

    fn write(&self, roster: &Roster) -> anyhow::Result<()> {
        let json = serde_json::to_vec_pretty(roster)?;
        let dir = match self.path.parent() {
            Some(p) if !p.as_os_str().is_empty() => p,
            _ => Path::new("."),
        };
        let mut tmp = NamedTempFile::new_in(dir).with_context(|| "creating temp file")?;
        tmp.write_all(&json)?;
        tmp.flush()?;
        tmp.as_file().sync_all()?;
        tmp.persist(&self.path)
            .map_err(|e| e.error)
            .with_context(|| "atomic rename")?;
        debug!(path = %self.path.display(), count = roster.technicians.len(), "roster written");
        Ok(())
    }

    fn inspect<T>(&self, f: impl FnOnce(&Roster) -> T) -> anyhow::Result<T> {
        let _guard = self.lock.lock();
        let roster = self.read()?;
        Ok(f(&roster))
    }

    /// Lecture-modification-écriture sous verrou, en une seule écriture.
    fn mutate<T>(&self, f: impl FnOnce(&mut Roster) -> T) -> anyhow::Result<T> {
        let _guard = self.lock.lock();
        let mut roster = self.read()?;
        let out = f(&mut roster);
        self.write(&roster)?;
        Ok(out)
    }
}

impl RosterStore for JsonFileStore {
    fn load_all(&self) -> anyhow::Result<Vec<Technician>> {
        self.inspect(Roster::sorted)
    }

    fn load_one(&self, id: TechId) -> anyhow::Result<Option<Technician>> {
        self.inspect(|r| r.find_by_id(id).cloned())
    }

    fn save(&self, tech: &Technician, touch_status_time: bool) -> anyhow::Result<()> {
        self.mutate(|r| upsert(r, tech, touch_status_time))
    }

    fn save_batch(&self, techs: &[Technician]) -> anyhow::Result<()> {
        self.mutate(|r| {
            for tech in techs {
                upsert(r, tech, false);
            }
        })
    }

    fn delete(&self, id: TechId) -> anyhow::Result<bool> {
        self.mutate(|r| {
            let before = r.technicians.len();
            r.technicians.retain(|t| t.id != id);
            r.technicians.len() != before
        })
    }

    fn delete_all(&self) -> anyhow::Result<usize> {
        self.mutate(|r| {
            let n = r.technicians.len();
            r.technicians.clear();
            n
        })
    }

    fn next_available_record(&self) -> anyhow::Result<Option<Technician>> {
        self.inspect(|r| r.next_available().cloned())
    }

    fn max_position(&self) -> anyhow::Result<u32> {
        self.inspect(max_position)
    }

    fn count(&self) -> anyhow::Result<usize> {
        self.inspect(|r| r.technicians.len())
    }

    fn update_fields(
        &self,
        id: TechId,
        touch_status_time: bool,
        fields: FieldUpdate,
    ) -> anyhow::Result<Option<Technician>> {
        self.mutate(|r| update(r, id, touch_status_time, fields))
    }

    fn allocate_next_id(&self) -> anyhow::Result<TechId> {
        self.mutate(allocate)
    }

    fn reset_id_sequence(&self) -> anyhow::Result<()> {
        self.mutate(|r| r.next_id = Some(ids::RESET_COUNTER))
    }

    fn set_positions(&self, moves: &[(TechId, u32)]) -> anyhow::Result<usize> {
        self.mutate(|r| place(r, moves))
    }

    fn repack_positions(&self) -> anyhow::Result<usize> {
        self.mutate(repack)
    }
}
