use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Identifiant fort pour Technician (entier positif, jamais recyclé)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TechId(u64);

impl TechId {
    pub fn new(raw: u64) -> Self {
        Self(raw)
    }
    pub fn get(self) -> u64 {
        self.0
    }
}

impl fmt::Display for TechId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// État de disponibilité d'un technicien
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TechStatus {
    Available,
    Busy,
    OnBreak,
}

impl TechStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            TechStatus::Available => "AVAILABLE",
            TechStatus::Busy => "BUSY",
            TechStatus::OnBreak => "ON_BREAK",
        }
    }
}

impl fmt::Display for TechStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Technicien (membre du roster)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Technician {
    pub id: TechId,
    pub name: String,
    pub status: TechStatus,
    pub queue_position: u32,
    /// `false` = check-out (hors rotation), `true` = check-in
    #[serde(default)]
    pub is_active: bool,
    /// Début du statut courant ; indicatif, réservé à l'affichage.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status_start_time: Option<DateTime<Utc>>,
}

impl Technician {
    /// Nouveau technicien : disponible, non pointé, en position donnée.
    pub fn new<N: Into<String>>(id: TechId, name: N, queue_position: u32) -> Self {
        Self {
            id,
            name: name.into(),
            status: TechStatus::Available,
            queue_position,
            is_active: false,
            status_start_time: None,
        }
    }

    /// Éligible à la rotation : disponible et pointé.
    pub fn is_eligible(&self) -> bool {
        self.status == TechStatus::Available && self.is_active
    }
}

/// Mise à jour partielle d'un enregistrement (champs absents = inchangés)
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FieldUpdate {
    pub status: Option<TechStatus>,
    pub queue_position: Option<u32>,
    pub is_active: Option<bool>,
}

impl FieldUpdate {
    pub fn status(status: TechStatus) -> Self {
        Self {
            status: Some(status),
            ..Self::default()
        }
    }

    pub fn apply(&self, tech: &mut Technician) {
        if let Some(status) = self.status {
            tech.status = status;
        }
        if let Some(pos) = self.queue_position {
            tech.queue_position = pos;
        }
        if let Some(active) = self.is_active {
            tech.is_active = active;
        }
    }
}

/// Roster complet, tel que persisté par les stores fichier
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Roster {
    /// Compteur d'identifiants ; absent sur un document hérité.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub next_id: Option<u64>,
    #[serde(default)]
    pub technicians: Vec<Technician>,
}

impl Roster {
    pub fn find_by_id(&self, id: TechId) -> Option<&Technician> {
        self.technicians.iter().find(|t| t.id == id)
    }
    pub fn find_mut_by_id(&mut self, id: TechId) -> Option<&mut Technician> {
        self.technicians.iter_mut().find(|t| t.id == id)
    }

    /// Copie triée par position croissante (égalités départagées par id).
    pub fn sorted(&self) -> Vec<Technician> {
        let mut out = self.technicians.clone();
        out.sort_by_key(|t| (t.queue_position, t.id));
        out
    }

    pub fn next_available(&self) -> Option<&Technician> {
        self.technicians
            .iter()
            .filter(|t| t.is_eligible())
            .min_by_key(|t| (t.queue_position, t.id))
    }
}
