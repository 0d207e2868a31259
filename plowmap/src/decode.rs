//! Décodage des FeatureCollection GeoJSON vers les types `geo`
//!
//! Une feature invalide est ignorée et consignée dans `FeatureSet::errors`;
//! la collection n'est jamais rejetée pour une seule feature.

use geo::{Coord, Geometry, LineString, MultiLineString, Point};
use geojson::{Feature, FeatureCollection, Position, Value};
use tracing::warn;

use crate::types::{FeatureSet, MapFeature};
use crate::PlowmapError;

/// Décode une FeatureCollection déjà parsée
pub fn decode_collection(collection: &FeatureCollection) -> FeatureSet {
    let mut set = FeatureSet::default();

    for (index, feature) in collection.features.iter().enumerate() {
        match decode_feature(feature, index) {
            Ok(f) => set.features.push(f),
            Err(e) => {
                warn!(index, error = %e, "Skipping feature");
                set.errors.push(e);
            }
        }
    }

    set
}

/// Parse puis décode un document FeatureCollection brut
pub fn decode_bytes(bytes: &[u8]) -> Result<FeatureSet, PlowmapError> {
    let collection: FeatureCollection = serde_json::from_slice(bytes)?;
    Ok(decode_collection(&collection))
}

fn decode_feature(feature: &Feature, index: usize) -> Result<MapFeature, PlowmapError> {
    let label = feature_label(feature, index);
    let geometry = feature
        .geometry
        .as_ref()
        .ok_or_else(|| PlowmapError::invalid_feature(&label, "missing geometry"))?;

    Ok(MapFeature {
        geometry: to_geo(&geometry.value, &label)?,
        properties: feature.properties.clone().unwrap_or_default(),
    })
}

/// Convertit une géométrie GeoJSON affichable (Point, LineString, MultiLineString)
fn to_geo(value: &Value, label: &str) -> Result<Geometry<f64>, PlowmapError> {
    match value {
        Value::Point(position) => Ok(Geometry::Point(Point::from(to_coord(position, label)?))),
        Value::LineString(positions) => Ok(Geometry::LineString(to_line(positions, label)?)),
        Value::MultiLineString(lines) => {
            let lines = lines
                .iter()
                .map(|line| to_line(line, label))
                .collect::<Result<Vec<_>, _>>()?;
            Ok(Geometry::MultiLineString(MultiLineString::new(lines)))
        }
        other => Err(PlowmapError::UnsupportedGeometry(geometry_name(other).to_string())),
    }
}

fn to_line(positions: &[Position], label: &str) -> Result<LineString<f64>, PlowmapError> {
    if positions.len() < 2 {
        return Err(PlowmapError::invalid_feature(
            label,
            format!("line with {} position(s)", positions.len()),
        ));
    }
    positions
        .iter()
        .map(|p| to_coord(p, label))
        .collect::<Result<Vec<_>, _>>()
        .map(LineString::new)
}

fn to_coord(position: &[f64], label: &str) -> Result<Coord<f64>, PlowmapError> {
    match position {
        [x, y, ..] if x.is_finite() && y.is_finite() => Ok(Coord { x: *x, y: *y }),
        _ => Err(PlowmapError::invalid_feature(
            label,
            format!("invalid position {:?}", position),
        )),
    }
}

fn feature_label(feature: &Feature, index: usize) -> String {
    match &feature.id {
        Some(geojson::feature::Id::String(s)) => s.clone(),
        Some(geojson::feature::Id::Number(n)) => n.to_string(),
        None => format!("#{}", index),
    }
}

fn geometry_name(value: &Value) -> &'static str {
    match value {
        Value::Point(_) => "Point",
        Value::MultiPoint(_) => "MultiPoint",
        Value::LineString(_) => "LineString",
        Value::MultiLineString(_) => "MultiLineString",
        Value::Polygon(_) => "Polygon",
        Value::MultiPolygon(_) => "MultiPolygon",
        Value::GeometryCollection(_) => "GeometryCollection",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_mixed_collection() {
        let json = br#"{
            "type": "FeatureCollection",
            "features": [
                {"type": "Feature", "geometry": {"type": "Point", "coordinates": [-87.63, 41.88]},
                 "properties": {"vehicleName": "S-101"}},
                {"type": "Feature", "geometry": {"type": "LineString", "coordinates": [[-87.63, 41.88], [-87.62, 41.88]]},
                 "properties": {"roadname": "42"}},
                {"type": "Feature", "id": "poly", "geometry": {"type": "Polygon", "coordinates": [[[0,0],[1,0],[1,1],[0,0]]]},
                 "properties": {}},
                {"type": "Feature", "geometry": null, "properties": {}}
            ]
        }"#;

        let set = decode_bytes(json).unwrap();

        assert_eq!(set.len(), 2);
        assert_eq!(set.errors.len(), 2);
        assert!(matches!(set.features[0].geometry, Geometry::Point(_)));
        assert!(matches!(set.features[1].geometry, Geometry::LineString(_)));
        assert!(matches!(
            set.errors[0],
            PlowmapError::UnsupportedGeometry(ref name) if name == "Polygon"
        ));
    }

    #[test]
    fn test_degenerate_line_is_skipped() {
        let json = br#"{"type": "FeatureCollection", "features": [
            {"type": "Feature", "geometry": {"type": "LineString", "coordinates": [[1, 2]]}, "properties": null}
        ]}"#;

        let set = decode_bytes(json).unwrap();
        assert!(set.is_empty());
        assert!(matches!(set.errors[0], PlowmapError::InvalidFeature { .. }));
    }

    #[test]
    fn test_not_a_collection() {
        assert!(matches!(decode_bytes(b"[]"), Err(PlowmapError::Json(_))));
    }
}
