//! Export de l'état courant de la carte (sources GeoJSON, métadonnées)

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use anyhow::{Context, Result};

use plowmap::{MapFeature, MapView, MetadataLookup, SourceId};

/// Exporte une source de la carte en FeatureCollection (écriture en streaming)
pub fn export_source<M: MapView + ?Sized>(
    map: &M,
    source: SourceId,
    output_path: &Path,
) -> Result<usize> {
    let features = map.source_features(source);
    let file = File::create(output_path)
        .context(format!("Failed to create file: {}", output_path.display()))?;
    let mut writer = BufWriter::new(file);

    write!(writer, r#"{{"type":"FeatureCollection","features":["#)?;
    for (i, feature) in features.iter().enumerate() {
        if i > 0 {
            write!(writer, ",")?;
        }
        write_feature(&mut writer, feature)?;
    }
    write!(writer, "]}}")?;
    writer.flush()?;

    Ok(features.len())
}

/// Écrit une feature en GeoJSON
fn write_feature<W: Write>(writer: &mut W, feature: &MapFeature) -> Result<()> {
    let feature = geojson::Feature {
        bbox: None,
        geometry: Some(geojson::Geometry::new(geojson::Value::from(
            &feature.geometry,
        ))),
        id: None,
        properties: Some(feature.properties.clone()),
        foreign_members: None,
    };
    serde_json::to_writer(writer, &feature)?;
    Ok(())
}

/// Sauvegarde le lookup de métadonnées tel que reçu
pub fn export_metadata(metadata: &MetadataLookup, output_path: &Path) -> Result<()> {
    let json = serde_json::to_string_pretty(metadata)?;
    std::fs::write(output_path, json)
        .context(format!("Failed to write file: {}", output_path.display()))?;
    Ok(())
}
