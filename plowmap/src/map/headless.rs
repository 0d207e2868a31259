//! Carte sans rendu: sources en mémoire, hit-test géométrique en pixels

use std::collections::HashMap;
use std::sync::{PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use geo::{Coord, EuclideanDistance, Geometry, LineString, MapCoords, Point};
use tracing::{debug, trace};

use super::{MapView, Viewport};
use crate::popup::Popup;
use crate::types::{
    Control, Cursor, FeatureSet, LayerId, LngLat, MapFeature, RenderedFeature, ScreenPoint,
    SourceId,
};

/// Tolérances de hit-test (pixels)
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HitTolerance {
    /// Rayon de l'icône d'un véhicule
    pub icon_radius_px: f64,
    /// Demi-largeur de ligne + marge pour les tronçons
    pub line_px: f64,
}

impl Default for HitTolerance {
    fn default() -> Self {
        Self {
            icon_radius_px: 16.0,
            line_px: 6.0,
        }
    }
}

#[derive(Debug, Default)]
struct State {
    sources: HashMap<SourceId, Vec<MapFeature>>,
    images: HashMap<String, Vec<u8>>,
    controls: Vec<Control>,
    cursor: Cursor,
    popup: Option<Popup>,
    popups_shown: usize,
}

/// Implémentation de `MapView` sans moteur de rendu
#[derive(Debug)]
pub struct HeadlessMap {
    viewport: RwLock<Viewport>,
    state: RwLock<State>,
    tolerance: HitTolerance,
}

impl HeadlessMap {
    pub fn new(viewport: Viewport, tolerance: HitTolerance) -> Self {
        Self {
            viewport: RwLock::new(viewport),
            state: RwLock::new(State::default()),
            tolerance,
        }
    }

    pub fn viewport(&self) -> Viewport {
        *self.viewport.read().unwrap_or_else(PoisonError::into_inner)
    }

    /// Déplace la vue (équivalent d'un pan/zoom utilisateur)
    pub fn jump_to(&self, center: LngLat, zoom: f64) {
        let mut viewport = self.viewport.write().unwrap_or_else(PoisonError::into_inner);
        viewport.center = center;
        viewport.set_zoom(zoom);
    }

    /// Popup actuellement ouvert
    pub fn popup(&self) -> Option<Popup> {
        self.read().popup.clone()
    }

    /// Nombre de popups affichés depuis la création
    pub fn popups_shown(&self) -> usize {
        self.read().popups_shown
    }

    pub fn cursor(&self) -> Cursor {
        self.read().cursor
    }

    pub fn controls(&self) -> Vec<Control> {
        self.read().controls.clone()
    }

    pub fn has_image(&self, name: &str) -> bool {
        self.read().images.contains_key(name)
    }

    pub fn source_len(&self, source: SourceId) -> usize {
        self.read().sources.get(&source).map_or(0, Vec::len)
    }

    fn read(&self) -> RwLockReadGuard<'_, State> {
        self.state.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, State> {
        self.state.write().unwrap_or_else(PoisonError::into_inner)
    }

    fn hits(&self, feature: &MapFeature, point: ScreenPoint, viewport: &Viewport) -> bool {
        let click = Point::new(point.x, point.y);
        match &feature.geometry {
            Geometry::Point(p) => {
                let screen = viewport.project(LngLat::new(p.x(), p.y()));
                (screen.x - point.x).hypot(screen.y - point.y) <= self.tolerance.icon_radius_px
            }
            Geometry::LineString(line) => self.line_hits(line, click, viewport),
            Geometry::MultiLineString(lines) => {
                lines.0.iter().any(|line| self.line_hits(line, click, viewport))
            }
            _ => false,
        }
    }

    fn line_hits(&self, line: &LineString<f64>, click: Point<f64>, viewport: &Viewport) -> bool {
        let screen = line.map_coords(|c| {
            let p = viewport.project(LngLat::new(c.x, c.y));
            Coord { x: p.x, y: p.y }
        });
        click.euclidean_distance(&screen) <= self.tolerance.line_px
    }
}

impl MapView for HeadlessMap {
    fn set_source_data(&self, source: SourceId, data: FeatureSet) {
        debug!(
            source = source.name(),
            features = data.len(),
            skipped = data.errors.len(),
            "Source data replaced"
        );
        self.write().sources.insert(source, data.features);
    }

    fn source_features(&self, source: SourceId) -> Vec<MapFeature> {
        self.read().sources.get(&source).cloned().unwrap_or_default()
    }

    fn query_rendered_features(
        &self,
        point: ScreenPoint,
        layers: &[LayerId],
    ) -> Vec<RenderedFeature> {
        let viewport = self.viewport();
        let state = self.read();
        let mut result = Vec::new();

        for &layer in layers {
            let Some(features) = state.sources.get(&layer.source()) else {
                continue;
            };
            // Dernière feature dessinée = au-dessus
            for feature in features.iter().rev() {
                if self.hits(feature, point, &viewport) {
                    result.push(RenderedFeature {
                        layer,
                        geometry: feature.geometry.clone(),
                        properties: feature.properties.clone(),
                    });
                }
            }
        }

        trace!(x = point.x, y = point.y, hits = result.len(), "Hit-test");
        result
    }

    fn project(&self, lnglat: LngLat) -> ScreenPoint {
        self.viewport().project(lnglat)
    }

    fn unproject(&self, point: ScreenPoint) -> LngLat {
        self.viewport().unproject(point)
    }

    fn view(&self) -> (LngLat, f64) {
        let viewport = self.viewport();
        (viewport.center, viewport.zoom)
    }

    fn add_image(&self, name: &str, data: Vec<u8>) {
        self.write().images.insert(name.to_string(), data);
    }

    fn add_control(&self, control: Control) {
        let mut state = self.write();
        if !state.controls.contains(&control) {
            state.controls.push(control);
        }
    }

    fn set_cursor(&self, cursor: Cursor) {
        self.write().cursor = cursor;
    }

    fn show_popup(&self, popup: Popup) {
        let mut state = self.write();
        state.popup = Some(popup);
        state.popups_shown += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use geo::line_string;
    use serde_json::json;

    fn map() -> HeadlessMap {
        HeadlessMap::new(
            Viewport::new(LngLat::new(-87.63, 41.88), 14.0, 800.0, 600.0),
            HitTolerance::default(),
        )
    }

    fn feature(geometry: Geometry<f64>, name: &str) -> MapFeature {
        let properties = match json!({ "name": name }) {
            serde_json::Value::Object(map) => map,
            _ => unreachable!(),
        };
        MapFeature {
            geometry,
            properties,
        }
    }

    fn set(features: Vec<MapFeature>) -> FeatureSet {
        FeatureSet {
            features,
            errors: Vec::new(),
        }
    }

    #[test]
    fn test_point_hit_within_icon_radius() {
        let map = map();
        map.set_source_data(
            SourceId::Plows,
            set(vec![feature(Point::new(-87.63, 41.88).into(), "center")]),
        );

        let center = map.project(LngLat::new(-87.63, 41.88));
        let near = ScreenPoint::new(center.x + 10.0, center.y - 5.0);
        let far = ScreenPoint::new(center.x + 40.0, center.y);

        assert_eq!(map.query_rendered_features(near, &[LayerId::Plows]).len(), 1);
        assert!(map.query_rendered_features(far, &[LayerId::Plows]).is_empty());
    }

    #[test]
    fn test_line_hit_anywhere_along_segment() {
        let map = map();
        let line = line_string![(x: -87.64, y: 41.88), (x: -87.62, y: 41.88)];
        map.set_source_data(SourceId::PlowRoutes, set(vec![feature(line.into(), "street")]));

        let on_line = map.project(LngLat::new(-87.635, 41.88));
        let hits = map.query_rendered_features(on_line, &[LayerId::PlowRoutes]);
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].layer, LayerId::PlowRoutes);

        let off_line = ScreenPoint::new(on_line.x, on_line.y + 30.0);
        assert!(map
            .query_rendered_features(off_line, &[LayerId::PlowRoutes])
            .is_empty());
    }

    #[test]
    fn test_layer_order_and_topmost_first() {
        let map = map();
        map.set_source_data(
            SourceId::Plows,
            set(vec![
                feature(Point::new(-87.63, 41.88).into(), "below"),
                feature(Point::new(-87.63, 41.88).into(), "above"),
            ]),
        );
        let line = line_string![(x: -87.64, y: 41.88), (x: -87.62, y: 41.88)];
        map.set_source_data(SourceId::PlowRoutes, set(vec![feature(line.into(), "street")]));

        let point = map.project(LngLat::new(-87.63, 41.88));
        let hits = map.query_rendered_features(point, &[LayerId::Plows, LayerId::PlowRoutes]);

        assert_eq!(hits.len(), 3);
        assert_eq!(hits[0].properties["name"], "above");
        assert_eq!(hits[1].properties["name"], "below");
        assert_eq!(hits[2].layer, LayerId::PlowRoutes);
    }

    #[test]
    fn test_set_source_replaces_wholesale() {
        let map = map();
        map.set_source_data(
            SourceId::Plows,
            set(vec![
                feature(Point::new(-87.63, 41.88).into(), "a"),
                feature(Point::new(-87.62, 41.88).into(), "b"),
            ]),
        );
        map.set_source_data(
            SourceId::Plows,
            set(vec![feature(Point::new(-87.61, 41.88).into(), "c")]),
        );

        assert_eq!(map.source_len(SourceId::Plows), 1);
        assert_eq!(map.source_features(SourceId::Plows)[0].properties["name"], "c");
    }

    #[test]
    fn test_controls_registered_once() {
        let map = map();
        map.add_control(Control::Navigation);
        map.add_control(Control::Navigation);
        map.add_control(Control::Geolocate);

        assert_eq!(map.controls(), vec![Control::Navigation, Control::Geolocate]);
    }
}
