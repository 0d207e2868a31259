//! Horodatages des flux: parsing et affichage localisé

use std::fmt::Display;

use chrono::{DateTime, NaiveDateTime, TimeZone, Utc};
use serde_json::Value;

/// Affiché quand un horodatage est présent mais illisible
pub const INVALID_DATE: &str = "Invalid Date";

/// Format d'affichage "M/D/YYYY, h:mm:ss AM"
const DISPLAY_FORMAT: &str = "%-m/%-d/%Y, %-I:%M:%S %p";

/// Parse un horodatage: epoch en ms (nombre ou texte), RFC 3339, ou ISO sans fuseau
///
/// Une date sans décalage est lue comme une heure locale de `tz`.
pub fn parse<Tz: TimeZone>(value: &Value, tz: &Tz) -> Option<DateTime<Tz>> {
    match value {
        Value::Number(n) => from_millis(n.as_f64()?).map(|dt| dt.with_timezone(tz)),
        Value::String(s) => parse_str(s.trim(), tz),
        _ => None,
    }
}

fn parse_str<Tz: TimeZone>(s: &str, tz: &Tz) -> Option<DateTime<Tz>> {
    if s.is_empty() {
        return None;
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.with_timezone(tz));
    }
    if let Ok(ms) = s.parse::<f64>() {
        return from_millis(ms).map(|dt| dt.with_timezone(tz));
    }
    let naive = ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"]
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(s, fmt).ok())?;
    // Heure inexistante (passage à l'heure d'été): None
    tz.from_local_datetime(&naive).earliest()
}

fn from_millis(ms: f64) -> Option<DateTime<Utc>> {
    if !ms.is_finite() {
        return None;
    }
    Utc.timestamp_millis_opt(ms as i64).single()
}

/// Formate une date façon "M/D/YYYY, h:mm:ss AM" dans le fuseau donné
pub fn format_local<Tz>(dt: &DateTime<Utc>, tz: &Tz) -> String
where
    Tz: TimeZone,
    Tz::Offset: Display,
{
    dt.with_timezone(tz).format(DISPLAY_FORMAT).to_string()
}

/// Texte affichable pour une valeur brute de flux
pub fn display<Tz>(value: &Value, tz: &Tz) -> String
where
    Tz: TimeZone,
    Tz::Offset: Display,
{
    parse(value, tz)
        .map(|dt| dt.format(DISPLAY_FORMAT).to_string())
        .unwrap_or_else(|| INVALID_DATE.to_string())
}
