//! # plowmap-viewer
//!
//! Viewer de la carte live des chasse-neige.
//!
//! ## Features
//!
//! - Polling des flux véhicules, tronçons et métadonnées (défaut: 10s)
//! - Conservation de la dernière valeur valide en cas d'échec
//! - Inspection d'un point de la carte (popup texte, HTML ou JSON)
//! - Snapshot de l'état courant en GeoJSON
//!
//! ## Usage CLI
//!
//! ```bash
//! # Suivi en continu (Ctrl-C pour arrêter)
//! plowmap-viewer watch
//!
//! # Popup affiché par un clic à une position
//! plowmap-viewer inspect --lng -87.6298 --lat 41.8781 --zoom 15
//!
//! # Export de l'état courant
//! plowmap-viewer snapshot --output ./snapshot/
//! ```

pub mod bootstrap;
pub mod config;
pub mod export;
pub mod feed;
pub mod refresh;
pub mod report;

pub use bootstrap::{RunningViewer, Viewer};
pub use config::ViewerConfig;
pub use feed::{Endpoint, Feed, FeedError, HttpFeed};
pub use refresh::{RefreshHandle, RefreshLoop};
pub use report::{Outcome, TickReport, TickStatus};
