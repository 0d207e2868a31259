//! Configuration du viewer

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use plowmap::{HitTolerance, LngLat, Viewport};

/// Configuration principale
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ViewerConfig {
    /// Endpoints des flux
    pub feeds: FeedConfig,

    /// Cadence de rafraîchissement (ms)
    #[serde(default = "default_refresh_ms")]
    pub refresh_ms: u64,

    /// Vue initiale
    pub view: ViewConfig,

    /// Paramètres d'affichage (icône, tolérances, popup)
    pub style: StyleConfig,
}

/// Endpoints et client HTTP
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct FeedConfig {
    pub routes_url: String,
    pub vehicles_url: String,
    pub metadata_url: String,

    /// Timeout par requête (secondes)
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    #[serde(default = "default_user_agent")]
    pub user_agent: String,
}

/// Vue initiale de la carte
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ViewConfig {
    /// [lng, lat]
    pub center: [f64; 2],
    pub zoom: f64,
    #[serde(default = "default_max_zoom")]
    pub max_zoom: f64,
    pub width: u32,
    pub height: u32,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct StyleConfig {
    /// Image de l'icône des véhicules
    pub icon_path: PathBuf,
    pub icon_name: String,
    #[serde(default = "default_icon_radius")]
    pub icon_radius_px: f64,
    #[serde(default = "default_line_tolerance")]
    pub line_tolerance_px: f64,
    #[serde(default = "default_popup_offset")]
    pub popup_offset_px: f64,
}

fn default_refresh_ms() -> u64 {
    10_000
}

fn default_timeout_secs() -> u64 {
    15
}

fn default_user_agent() -> String {
    format!("plowmap-viewer/{}", env!("CARGO_PKG_VERSION"))
}

fn default_max_zoom() -> f64 {
    20.0
}

fn default_icon_radius() -> f64 {
    16.0
}

fn default_line_tolerance() -> f64 {
    6.0
}

fn default_popup_offset() -> f64 {
    16.0
}

impl ViewerConfig {
    /// Charge une configuration depuis un fichier
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .context(format!("Failed to read config file: {}", path.display()))?;

        serde_json::from_str(&content).context("Failed to parse config JSON")
    }

    /// Charge une configuration depuis un preset embarqué
    pub fn from_preset(preset: &str) -> Result<Self> {
        match preset {
            "chicago" => Self::load_embedded(include_str!("presets/chicago.json")),
            _ => anyhow::bail!("Unknown preset: {}. Use: chicago", preset),
        }
    }

    fn load_embedded(json: &str) -> Result<Self> {
        serde_json::from_str(json).context("Failed to parse embedded config")
    }

    /// Preset si le nom est connu, sinon chemin vers un fichier JSON
    pub fn resolve(name_or_path: &str) -> Result<Self> {
        let path = Path::new(name_or_path);
        if path.extension().map_or(false, |ext| ext == "json") || path.exists() {
            Self::load(path)
        } else {
            Self::from_preset(name_or_path)
        }
    }

    /// Applique les surcharges des variables d'environnement (PLOWMAP_*)
    pub fn apply_env(&mut self) {
        self.apply_overrides(|key| std::env::var(key).ok());
    }

    /// Surcharges depuis une source clé -> valeur quelconque
    pub fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(url) = lookup("PLOWMAP_ROUTES_URL") {
            self.feeds.routes_url = url;
        }
        if let Some(url) = lookup("PLOWMAP_VEHICLES_URL") {
            self.feeds.vehicles_url = url;
        }
        if let Some(url) = lookup("PLOWMAP_META_URL") {
            self.feeds.metadata_url = url;
        }
        if let Some(ms) = lookup("PLOWMAP_REFRESH_MS").and_then(|s| s.parse().ok()) {
            self.refresh_ms = ms;
        }
        if let Some(secs) = lookup("PLOWMAP_HTTP_TIMEOUT_SECS").and_then(|s| s.parse().ok()) {
            self.feeds.timeout_secs = secs;
        }
        if let Some(icon) = lookup("PLOWMAP_ICON") {
            self.style.icon_path = PathBuf::from(icon);
        }
    }

    /// Vérifie les valeurs avant démarrage
    pub fn validate(&self) -> Result<()> {
        if self.refresh_ms == 0 {
            anyhow::bail!("refresh_ms must be greater than 0");
        }
        if self.view.width == 0 || self.view.height == 0 {
            anyhow::bail!(
                "Invalid view size {}x{}",
                self.view.width,
                self.view.height
            );
        }
        if !self.view.max_zoom.is_finite() || self.view.max_zoom < 0.0 {
            anyhow::bail!("Invalid max_zoom {}: must be >= 0", self.view.max_zoom);
        }
        if !self.view.zoom.is_finite() {
            anyhow::bail!("Invalid zoom {}", self.view.zoom);
        }
        let [lng, lat] = self.view.center;
        if !lng.is_finite() || !lat.is_finite() {
            anyhow::bail!("Invalid center [{}, {}]", lng, lat);
        }
        for url in [
            &self.feeds.routes_url,
            &self.feeds.vehicles_url,
            &self.feeds.metadata_url,
        ] {
            reqwest::Url::parse(url).context(format!("Invalid feed URL: {}", url))?;
        }
        Ok(())
    }

    pub fn refresh_interval(&self) -> Duration {
        Duration::from_millis(self.refresh_ms)
    }

    pub fn viewport(&self) -> Viewport {
        let [lng, lat] = self.view.center;
        let mut viewport = Viewport::new(
            LngLat::new(lng, lat),
            self.view.zoom,
            f64::from(self.view.width),
            f64::from(self.view.height),
        );
        viewport.max_zoom = self.view.max_zoom;
        viewport.set_zoom(self.view.zoom);
        viewport
    }

    pub fn hit_tolerance(&self) -> HitTolerance {
        HitTolerance {
            icon_radius_px: self.style.icon_radius_px,
            line_px: self.style.line_tolerance_px,
        }
    }
}
