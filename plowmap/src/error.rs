//! Types d'erreurs pour le crate plowmap

use thiserror::Error;

/// Erreurs pouvant survenir lors du décodage des flux de features
#[derive(Debug, Error)]
pub enum PlowmapError {
    /// Document JSON illisible
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Feature sans géométrie ou avec des coordonnées invalides
    #[error("Invalid feature {feature}: {reason}")]
    InvalidFeature { feature: String, reason: String },

    /// Type de géométrie non affiché par la carte
    #[error("Unsupported geometry type: {0}")]
    UnsupportedGeometry(String),

    /// Payload vinData présent mais illisible
    #[error("Invalid vehicle decode payload: {0}")]
    InvalidVinData(String),
}

impl PlowmapError {
    /// Crée une erreur de feature invalide avec contexte
    pub fn invalid_feature(feature: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidFeature {
            feature: feature.into(),
            reason: reason.into(),
        }
    }
}
