//! # plowmap
//!
//! Synchronisation des données et popups d'une carte live de déneigement.
//!
//! ## Features
//!
//! - Décodage des flux GeoJSON (véhicules, tronçons) vers les types `geo`
//! - Cache des métadonnées à écrivain unique (`tokio::sync::watch`)
//! - Hit-test avec priorité de couches (véhicules avant tronçons)
//! - Popups typés, rendus en HTML échappé ou en texte
//! - Carte headless (Web Mercator) pour tests et CLI
//!
//! ## Usage
//!
//! ```rust,ignore
//! use plowmap::{decode_bytes, HeadlessMap, MapView, MetadataCell, PopupController, SourceId};
//! use std::sync::Arc;
//!
//! let map = Arc::new(HeadlessMap::new(viewport, Default::default()));
//! map.set_source_data(SourceId::Plows, decode_bytes(&body)?);
//!
//! let metadata = MetadataCell::new();
//! let controller = PopupController::new(Arc::clone(&map), metadata.reader());
//! if let Some(popup) = controller.on_click(point) {
//!     println!("{}", plowmap::render_text(&popup.content));
//! }
//! ```

pub mod controller;
pub mod decode;
pub mod error;
pub mod map;
pub mod metadata;
pub mod popup;
pub mod time_ago;
pub mod timestamp;
pub mod types;

pub use controller::{select_winner, PopupController, LAYER_PRIORITY};
pub use decode::{decode_bytes, decode_collection};
pub use error::PlowmapError;
pub use map::{HeadlessMap, HitTolerance, MapView, Viewport};
pub use metadata::{MetadataCell, MetadataReader};
pub use popup::{render_html, render_text, Popup, PopupContent};
pub use time_ago::time_ago;
pub use types::{
    Control, Cursor, FeatureSet, LayerId, LngLat, MapFeature, MetadataLookup, RenderedFeature,
    ScreenPoint, SourceId,
};
