//! Vue carte en Web Mercator (tuiles de 512 px)
//!
//! Projette des coordonnées WGS84 vers des pixels écran et inversement.

use std::f64::consts::PI;

use crate::types::{LngLat, ScreenPoint};

/// Taille de tuile utilisée pour le calcul de la taille du monde
pub const TILE_SIZE: f64 = 512.0;

/// Latitude maximale représentable en Web Mercator
pub const MAX_LATITUDE: f64 = 85.051_128_779_806_59;

/// État de la vue: centre, zoom, taille du canvas
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    pub center: LngLat,
    pub zoom: f64,
    pub max_zoom: f64,
    pub width: f64,
    pub height: f64,
}

impl Viewport {
    pub fn new(center: LngLat, zoom: f64, width: f64, height: f64) -> Self {
        Self {
            center,
            zoom: zoom.clamp(0.0, 20.0),
            max_zoom: 20.0,
            width,
            height,
        }
    }

    /// Change le zoom en respectant le zoom maximal
    pub fn set_zoom(&mut self, zoom: f64) {
        self.zoom = zoom.clamp(0.0, self.max_zoom.max(0.0));
    }

    /// Taille du monde en pixels au zoom courant
    pub fn world_size(&self) -> f64 {
        TILE_SIZE * 2f64.powf(self.zoom)
    }

    /// LngLat -> pixels écran
    pub fn project(&self, lnglat: LngLat) -> ScreenPoint {
        let size = self.world_size();
        let (x, y) = mercator(lnglat);
        let (cx, cy) = mercator(self.center);
        ScreenPoint::new(
            (x - cx) * size + self.width / 2.0,
            (y - cy) * size + self.height / 2.0,
        )
    }

    /// Pixels écran -> LngLat
    pub fn unproject(&self, point: ScreenPoint) -> LngLat {
        let size = self.world_size();
        let (cx, cy) = mercator(self.center);
        let x = cx + (point.x - self.width / 2.0) / size;
        let y = cy + (point.y - self.height / 2.0) / size;

        let lng = x * 360.0 - 180.0;
        // lat = atan(sinh(π(1 - 2y)))
        let lat = (PI * (1.0 - 2.0 * y)).sinh().atan().to_degrees();
        LngLat::new(lng, lat)
    }
}

/// Coordonnées Mercator normalisées (0..1, origine nord-ouest)
fn mercator(lnglat: LngLat) -> (f64, f64) {
    let lat = lnglat
        .lat
        .clamp(-MAX_LATITUDE, MAX_LATITUDE)
        .to_radians();
    let x = (lnglat.lng + 180.0) / 360.0;
    // y = (1 - ln(tan(π/4 + lat/2)) / π) / 2
    let y = (1.0 - (std::f64::consts::FRAC_PI_4 + lat / 2.0).tan().ln() / PI) / 2.0;
    (x, y)
}
