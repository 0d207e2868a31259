//! Sélection au clic et affichage des popups
//!
//! Un clic produit exactement un popup, ou aucun. Les véhicules passent
//! devant les tronçons quand les deux sont sous le curseur.

use std::fmt::Display;
use std::sync::Arc;

use chrono::{Local, TimeZone};
use geo::Geometry;
use tracing::{debug, warn};

use crate::map::MapView;
use crate::metadata::MetadataReader;
use crate::popup::{self, Popup, PopupContent, DEFAULT_OFFSET_PX};
use crate::types::{
    Cursor, LayerId, LngLat, RenderedFeature, RouteProperties, ScreenPoint, VehicleProperties,
};

/// Couches interrogées, par ordre de priorité décroissante
pub const LAYER_PRIORITY: [LayerId; 2] = [LayerId::Plows, LayerId::PlowRoutes];

fn priority(layer: LayerId) -> usize {
    LAYER_PRIORITY
        .iter()
        .position(|&l| l == layer)
        .unwrap_or(LAYER_PRIORITY.len())
}

/// Retient la feature gagnante: couche la plus prioritaire, puis ordre du hit-test
pub fn select_winner(hits: Vec<RenderedFeature>) -> Option<RenderedFeature> {
    hits.into_iter()
        .enumerate()
        .min_by_key(|(index, f)| (priority(f.layer), *index))
        .map(|(_, f)| f)
}

/// Contrôleur des interactions pointeur
pub struct PopupController<M: MapView, Tz: TimeZone = Local> {
    map: Arc<M>,
    metadata: MetadataReader,
    tz: Tz,
    offset_px: f64,
}

impl<M: MapView> PopupController<M, Local> {
    /// Contrôleur affichant les dates dans le fuseau local
    pub fn new(map: Arc<M>, metadata: MetadataReader) -> Self {
        Self::with_timezone(map, metadata, Local)
    }
}

impl<M, Tz> PopupController<M, Tz>
where
    M: MapView,
    Tz: TimeZone,
    Tz::Offset: Display,
{
    pub fn with_timezone(map: Arc<M>, metadata: MetadataReader, tz: Tz) -> Self {
        Self {
            map,
            metadata,
            tz,
            offset_px: DEFAULT_OFFSET_PX,
        }
    }

    pub fn offset_px(mut self, offset_px: f64) -> Self {
        self.offset_px = offset_px;
        self
    }

    /// Gère un clic: hit-test, choix de la feature, affichage du popup
    ///
    /// Retourne `None` (sans toucher au popup courant) si rien n'est sous le curseur.
    pub fn on_click(&self, point: ScreenPoint) -> Option<Popup> {
        let hits = self.map.query_rendered_features(point, &LAYER_PRIORITY);
        debug!(x = point.x, y = point.y, hits = hits.len(), "Click");

        let feature = select_winner(hits)?;
        let click = self.map.unproject(point);
        let popup = self.describe(&feature, click);

        self.map.show_popup(popup.clone());
        Some(popup)
    }

    /// Construit le popup d'une feature
    ///
    /// Point: ancre sur la feature elle-même. Ligne: ancre au point cliqué.
    pub fn describe(&self, feature: &RenderedFeature, click: LngLat) -> Popup {
        let (anchor, content) = match &feature.geometry {
            Geometry::Point(p) => (LngLat::new(p.x(), p.y()), self.describe_vehicle(feature)),
            _ => (click, self.describe_route(feature)),
        };

        Popup {
            anchor,
            offset_px: self.offset_px,
            content,
        }
    }

    fn describe_vehicle(&self, feature: &RenderedFeature) -> PopupContent {
        let vehicle = VehicleProperties::from_properties(&feature.properties).unwrap_or_else(|e| {
            warn!(error = %e, "Unreadable vehicle properties");
            VehicleProperties::default()
        });

        let vin = match vehicle.vin() {
            Ok(vin) => vin,
            Err(e) => {
                warn!(vehicle = ?vehicle.vehicle_name, error = %e, "Ignoring vehicle decode payload");
                None
            }
        };

        popup::describe_vehicle(&vehicle, vin.as_ref(), &self.tz)
    }

    fn describe_route(&self, feature: &RenderedFeature) -> PopupContent {
        let route = RouteProperties::from_properties(&feature.properties).unwrap_or_else(|e| {
            warn!(error = %e, "Unreadable route properties");
            RouteProperties::default()
        });
        let metadata = self.metadata.current();
        if metadata.is_none() {
            debug!("No metadata loaded yet, showing raw ids");
        }

        popup::describe_route(&route, metadata.as_deref(), &self.tz)
    }

    /// Survol: curseur pointeur au-dessus d'un véhicule ou d'un tronçon
    pub fn on_pointer_move(&self, point: ScreenPoint) -> Cursor {
        let cursor = if self
            .map
            .query_rendered_features(point, &LAYER_PRIORITY)
            .is_empty()
        {
            Cursor::Default
        } else {
            Cursor::Pointer
        };
        self.map.set_cursor(cursor);
        cursor
    }

    /// Fin de déplacement de la vue (diagnostic uniquement)
    pub fn on_move_end(&self) {
        let (center, zoom) = self.map.view();
        debug!("Map moved to {} with zoom {}", center, zoom);
    }
}
