//! Initialisation de la carte: contrôles, icône, contrôleur, premier tick

use std::sync::Arc;

use anyhow::Result;
use tracing::{info, warn};

use plowmap::{Control, HeadlessMap, MapView, MetadataCell, MetadataReader, PopupController};

use crate::config::ViewerConfig;
use crate::feed::Feed;
use crate::refresh::{RefreshHandle, RefreshLoop};
use crate::report::TickReport;

/// Contrôles ajoutés au chargement de la carte
pub const CONTROLS: [Control; 3] = [Control::Navigation, Control::Fullscreen, Control::Geolocate];

/// Carte prête, avant lancement de la boucle de rafraîchissement
pub struct Viewer<F: Feed> {
    pub map: Arc<HeadlessMap>,
    pub controller: PopupController<HeadlessMap>,
    refresh: RefreshLoop<HeadlessMap, F>,
}

/// Carte dont la boucle tourne en tâche de fond
pub struct RunningViewer {
    pub map: Arc<HeadlessMap>,
    pub controller: PopupController<HeadlessMap>,
    pub refresh: RefreshHandle,
}

impl<F: Feed + 'static> Viewer<F> {
    /// Construit la carte et exécute le tick initial
    ///
    /// Une icône absente ou un premier tick en échec ne bloquent pas le démarrage.
    pub async fn bootstrap(config: &ViewerConfig, feed: F) -> Result<(Self, TickReport)> {
        config.validate()?;

        let map = Arc::new(HeadlessMap::new(config.viewport(), config.hit_tolerance()));
        for control in CONTROLS {
            map.add_control(control);
        }

        match tokio::fs::read(&config.style.icon_path).await {
            Ok(data) => {
                info!(
                    name = %config.style.icon_name,
                    bytes = data.len(),
                    "Vehicle icon loaded"
                );
                map.add_image(&config.style.icon_name, data);
            }
            Err(e) => warn!(
                path = %config.style.icon_path.display(),
                error = %e,
                "Vehicle icon not loaded"
            ),
        }

        let metadata = MetadataCell::new();
        let controller = PopupController::new(Arc::clone(&map), metadata.reader())
            .offset_px(config.style.popup_offset_px);
        let mut refresh = RefreshLoop::new(
            Arc::clone(&map),
            Arc::new(feed),
            metadata,
            config.refresh_interval(),
        );

        let initial = refresh.tick().await;
        let (center, zoom) = map.view();
        info!(center = %center, zoom, "Map ready");

        Ok((
            Self {
                map,
                controller,
                refresh,
            },
            initial,
        ))
    }

    pub fn metadata(&self) -> MetadataReader {
        self.refresh.metadata()
    }

    /// Exécute un tick supplémentaire sans lancer la boucle
    pub async fn refresh_now(&mut self) -> TickReport {
        self.refresh.tick().await
    }

    /// Lance la boucle périodique
    pub fn start(self) -> RunningViewer {
        RunningViewer {
            map: self.map,
            controller: self.controller,
            refresh: self.refresh.spawn(),
        }
    }
}
