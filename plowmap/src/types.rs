//! Types de données pour le crate plowmap

use std::collections::HashMap;
use std::fmt;

use geo::Geometry;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

use crate::PlowmapError;

/// Propriétés brutes d'une feature (objet JSON)
pub type JsonObject = Map<String, Value>;

/// Coordonnées géographiques en degrés (WGS84)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LngLat {
    pub lng: f64,
    pub lat: f64,
}

impl LngLat {
    pub fn new(lng: f64, lat: f64) -> Self {
        Self { lng, lat }
    }
}

impl fmt::Display for LngLat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "LngLat({}, {})", self.lng, self.lat)
    }
}

/// Position écran en pixels (origine en haut à gauche)
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScreenPoint {
    pub x: f64,
    pub y: f64,
}

impl ScreenPoint {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// Sources de données remplaçables de la carte
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SourceId {
    /// Positions des chasse-neige
    Plows,
    /// Tronçons de rues déneigés
    PlowRoutes,
}

impl SourceId {
    pub fn name(self) -> &'static str {
        match self {
            SourceId::Plows => "plows",
            SourceId::PlowRoutes => "plow_routes",
        }
    }
}

/// Couches rendues, interrogeables par hit-test
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum LayerId {
    /// Icônes des véhicules
    Plows,
    /// Lignes des tronçons
    PlowRoutes,
}

impl LayerId {
    pub fn name(self) -> &'static str {
        match self {
            LayerId::Plows => "plows",
            LayerId::PlowRoutes => "plow_routes",
        }
    }

    /// Source alimentant la couche
    pub fn source(self) -> SourceId {
        match self {
            LayerId::Plows => SourceId::Plows,
            LayerId::PlowRoutes => SourceId::PlowRoutes,
        }
    }
}

/// Curseur affiché au survol
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Cursor {
    #[default]
    Default,
    Pointer,
}

/// Contrôles standards de la carte
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Control {
    Navigation,
    Fullscreen,
    Geolocate,
}

/// Une feature affichable: géométrie + propriétés brutes
#[derive(Debug, Clone, PartialEq)]
pub struct MapFeature {
    pub geometry: Geometry<f64>,
    pub properties: JsonObject,
}

/// Collection décodée d'un flux, prête à remplacer une source
#[derive(Debug, Default)]
pub struct FeatureSet {
    /// Features retenues
    pub features: Vec<MapFeature>,

    /// Erreurs non fatales (features ignorées)
    pub errors: Vec<PlowmapError>,
}

impl FeatureSet {
    pub fn len(&self) -> usize {
        self.features.len()
    }

    pub fn is_empty(&self) -> bool {
        self.features.is_empty()
    }
}

/// Feature retournée par un hit-test, avec sa couche d'origine
#[derive(Debug, Clone, PartialEq)]
pub struct RenderedFeature {
    pub layer: LayerId,
    pub geometry: Geometry<f64>,
    pub properties: JsonObject,
}

/// Propriétés d'un véhicule (feature Point)
#[derive(Debug, Clone, Default, Deserialize)]
pub struct VehicleProperties {
    #[serde(rename = "vehicleName", default, deserialize_with = "scalar_string")]
    pub vehicle_name: Option<String>,

    #[serde(rename = "vehicleNickName", default, deserialize_with = "scalar_string")]
    pub nickname: Option<String>,

    /// Horodatage de la position (epoch ms ou texte)
    #[serde(rename = "dateTime", default)]
    pub date_time: Option<Value>,

    #[serde(rename = "deviceType", default, deserialize_with = "scalar_string")]
    pub device_type: Option<String>,

    #[serde(rename = "device_id", default, deserialize_with = "scalar_string")]
    pub device_id: Option<String>,

    #[serde(default, deserialize_with = "scalar_string")]
    pub speed: Option<String>,

    /// Payload de décodage VIN, texte JSON ou objet
    #[serde(rename = "vinData", default)]
    pub vin_data: Option<Value>,
}

impl VehicleProperties {
    pub fn from_properties(properties: &JsonObject) -> Result<Self, PlowmapError> {
        Ok(serde_json::from_value(Value::Object(properties.clone()))?)
    }

    /// Décode vinData; `Ok(None)` si absent
    pub fn vin(&self) -> Result<Option<VinData>, PlowmapError> {
        match &self.vin_data {
            None | Some(Value::Null) => Ok(None),
            Some(Value::String(s)) if s.trim().is_empty() => Ok(None),
            Some(Value::String(s)) => serde_json::from_str::<VinData>(s)
                .map(Some)
                .map_err(|e| PlowmapError::InvalidVinData(e.to_string())),
            Some(v @ Value::Object(_)) => serde_json::from_value::<VinData>(v.clone())
                .map(Some)
                .map_err(|e| PlowmapError::InvalidVinData(e.to_string())),
            Some(other) => Err(PlowmapError::InvalidVinData(format!(
                "expected JSON text or object, got {}",
                other
            ))),
        }
    }
}

/// Enregistrement de décodage VIN d'un véhicule
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VinData {
    #[serde(default, deserialize_with = "scalar_string")]
    pub model_year: Option<String>,
    #[serde(default, deserialize_with = "scalar_string")]
    pub make: Option<String>,
    #[serde(default, deserialize_with = "scalar_string")]
    pub model: Option<String>,
    #[serde(default, deserialize_with = "scalar_string")]
    pub engine_manufacturer: Option<String>,
    #[serde(default, deserialize_with = "scalar_string")]
    pub engine_model: Option<String>,
    #[serde(default, deserialize_with = "scalar_string")]
    pub engine_configuration: Option<String>,
    #[serde(default, deserialize_with = "scalar_string")]
    pub engine_cylinders: Option<String>,
    #[serde(default, deserialize_with = "scalar_string")]
    pub fuel_type_primary: Option<String>,
    #[serde(rename = "engineHP", default, deserialize_with = "scalar_string")]
    pub engine_hp: Option<String>,
    #[serde(rename = "engineHP_to", default, deserialize_with = "scalar_string")]
    pub engine_hp_to: Option<String>,
    #[serde(default, deserialize_with = "scalar_string")]
    pub plant_city: Option<String>,
    #[serde(default, deserialize_with = "scalar_string")]
    pub plant_state: Option<String>,
    #[serde(default, deserialize_with = "scalar_string")]
    pub plant_country: Option<String>,
}

/// Propriétés d'un tronçon de rue (feature ligne)
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RouteProperties {
    /// Identifiant de rue, clé de `filterValues.streets`
    #[serde(default, deserialize_with = "scalar_string")]
    pub roadname: Option<String>,

    /// Dernier passage (absent si jamais déneigé)
    #[serde(default)]
    pub lastserviced: Option<Value>,

    /// Temps écoulé depuis le dernier passage, en ms
    #[serde(rename = "timeSinceLastUpdate", default, deserialize_with = "scalar_f64")]
    pub time_since_last_update: Option<f64>,

    /// Identifiant de priorité, clé de `filterValues.priorities`
    #[serde(default, deserialize_with = "scalar_string")]
    pub routepriority: Option<String>,
}

impl RouteProperties {
    pub fn from_properties(properties: &JsonObject) -> Result<Self, PlowmapError> {
        Ok(serde_json::from_value(Value::Object(properties.clone()))?)
    }

    /// `lastserviced` renseigné (ni null, ni chaîne vide, ni zéro)
    pub fn was_serviced(&self) -> bool {
        match &self.lastserviced {
            None | Some(Value::Null) | Some(Value::Bool(false)) => false,
            Some(Value::String(s)) => !s.is_empty(),
            Some(Value::Number(n)) => n.as_f64().map_or(false, |v| v != 0.0),
            Some(_) => true,
        }
    }
}

/// Tables de correspondance id -> libellé publiées avec les tronçons
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MetadataLookup {
    #[serde(default)]
    pub filter_values: FilterValues,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct FilterValues {
    #[serde(default)]
    pub streets: HashMap<String, String>,
    #[serde(default)]
    pub priorities: HashMap<String, String>,
}

impl MetadataLookup {
    pub fn street_name(&self, id: &str) -> Option<&str> {
        self.filter_values.streets.get(id).map(String::as_str)
    }

    pub fn priority_label(&self, id: &str) -> Option<&str> {
        self.filter_values.priorities.get(id).map(String::as_str)
    }
}

/// Accepte une chaîne, un nombre ou un booléen; vide/null -> None
fn scalar_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(match value {
        None | Some(Value::Null) => None,
        Some(Value::String(s)) if s.is_empty() => None,
        Some(Value::String(s)) => Some(s),
        Some(Value::Number(n)) => Some(number_to_string(&n)),
        Some(Value::Bool(b)) => Some(b.to_string()),
        Some(other) => Some(other.to_string()),
    })
}

fn scalar_f64<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(Value::Number(n)) => n.as_f64(),
        Some(Value::String(s)) => s.trim().parse().ok(),
        _ => None,
    })
}

/// Les entiers stockés en flottant s'affichent sans ".0"
pub(crate) fn number_to_string(n: &serde_json::Number) -> String {
    if let Some(i) = n.as_i64() {
        return i.to_string();
    }
    match n.as_f64() {
        Some(f) if f.is_finite() && f.fract() == 0.0 && f.abs() < 1e15 => format!("{}", f as i64),
        _ => n.to_string(),
    }
}
