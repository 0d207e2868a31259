//! Frontière avec le moteur cartographique
//!
//! Le moteur de rendu est un collaborateur externe: on n'en consomme que
//! les primitives décrites par `MapView`. `HeadlessMap` en fournit une
//! implémentation sans rendu (projection + hit-test géométrique).

mod headless;
pub mod viewport;

pub use headless::{HeadlessMap, HitTolerance};
pub use viewport::Viewport;

use crate::popup::Popup;
use crate::types::{
    Control, Cursor, FeatureSet, LayerId, LngLat, MapFeature, RenderedFeature, ScreenPoint,
    SourceId,
};

/// Primitives exposées par une carte
///
/// Les méthodes prennent `&self`: une carte est un handle partagé entre la
/// boucle de rafraîchissement et le contrôleur de popups.
pub trait MapView: Send + Sync {
    /// Remplace entièrement les données d'une source
    fn set_source_data(&self, source: SourceId, data: FeatureSet);

    /// Copie des features actuellement chargées dans une source
    fn source_features(&self, source: SourceId) -> Vec<MapFeature>;

    /// Features rendues sous `point`, couche par couche dans l'ordre de `layers`
    fn query_rendered_features(&self, point: ScreenPoint, layers: &[LayerId])
        -> Vec<RenderedFeature>;

    fn project(&self, lnglat: LngLat) -> ScreenPoint;

    fn unproject(&self, point: ScreenPoint) -> LngLat;

    /// Centre et zoom courants
    fn view(&self) -> (LngLat, f64);

    fn add_image(&self, name: &str, data: Vec<u8>);

    fn add_control(&self, control: Control);

    fn set_cursor(&self, cursor: Cursor);

    /// Affiche un popup, en remplaçant celui déjà ouvert
    fn show_popup(&self, popup: Popup);
}
