//! Rapport de tick avec dégradation gracieuse
//!
//! Chaque tick produit un rapport: résultat par endpoint, durée, statut global.
//! Un échec sur un endpoint n'empêche pas les autres d'être appliqués.

use std::path::Path;
use std::time::Duration;

use anyhow::Result;
use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::feed::Endpoint;

/// Statut global du tick
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum TickStatus {
    /// Tous les endpoints ont répondu
    Success,
    /// Au moins un endpoint en échec, au moins un appliqué
    PartialSuccess,
    /// Aucun endpoint n'a répondu
    Failed,
}

/// Résultat d'un endpoint
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum Outcome {
    /// Nouvelles données appliquées
    Updated {
        /// Features chargées (0 pour les métadonnées)
        features: usize,
        /// Features ignorées au décodage
        skipped: usize,
    },
    /// Même contenu que le tick précédent, rien à remplacer
    Unchanged,
    /// Échec: la dernière valeur valide est conservée
    Failed { message: String },
}

#[derive(Debug, Clone, Serialize)]
pub struct EndpointReport {
    pub endpoint: Endpoint,
    #[serde(flatten)]
    pub outcome: Outcome,
}

/// Rapport complet d'un tick
#[derive(Debug, Clone, Serialize)]
pub struct TickReport {
    /// Numéro de séquence (croissant, à partir de 1)
    pub sequence: u64,
    pub started_at: DateTime<Utc>,
    pub duration_secs: f64,
    pub status: TickStatus,
    pub endpoints: Vec<EndpointReport>,
}

impl TickReport {
    /// Crée un nouveau rapport pour un tick
    pub fn new(sequence: u64) -> Self {
        Self {
            sequence,
            started_at: Utc::now(),
            duration_secs: 0.0,
            status: TickStatus::Success,
            endpoints: Vec::with_capacity(3),
        }
    }

    pub fn record(&mut self, endpoint: Endpoint, outcome: Outcome) {
        self.endpoints.push(EndpointReport { endpoint, outcome });
    }

    pub fn set_duration(&mut self, duration: Duration) {
        self.duration_secs = duration.as_secs_f64();
    }

    pub fn outcome(&self, endpoint: Endpoint) -> Option<&Outcome> {
        self.endpoints
            .iter()
            .find(|r| r.endpoint == endpoint)
            .map(|r| &r.outcome)
    }

    /// Détermine le statut final basé sur les échecs
    pub fn finalize(&mut self) {
        let failed = self
            .endpoints
            .iter()
            .filter(|r| matches!(r.outcome, Outcome::Failed { .. }))
            .count();

        self.status = if failed == 0 {
            TickStatus::Success
        } else if failed < self.endpoints.len() {
            TickStatus::PartialSuccess
        } else {
            TickStatus::Failed
        };
    }

    /// Sauvegarde le rapport en JSON
    pub fn save_to_file(&self, path: &Path) -> Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)?;
        Ok(())
    }

    /// Affichage compact pour les logs
    pub fn summary(&self) -> String {
        let parts = self
            .endpoints
            .iter()
            .map(|r| match &r.outcome {
                Outcome::Updated { features, skipped } if *skipped > 0 => {
                    format!("{} updated ({}, {} skipped)", r.endpoint, features, skipped)
                }
                Outcome::Updated { features, .. } => {
                    format!("{} updated ({})", r.endpoint, features)
                }
                Outcome::Unchanged => format!("{} unchanged", r.endpoint),
                Outcome::Failed { .. } => format!("{} failed", r.endpoint),
            })
            .collect::<Vec<_>>();

        format!(
            "tick #{} {:?} in {:.2}s: {}",
            self.sequence,
            self.status,
            self.duration_secs,
            parts.join(", ")
        )
    }
}
