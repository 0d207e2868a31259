//! Construction des descriptions véhicule / tronçon

use std::fmt::Display;

use chrono::TimeZone;

use super::{Heading, Item, PopupContent, Section};
use crate::time_ago::time_ago_f64;
use crate::timestamp;
use crate::types::{MetadataLookup, RouteProperties, VehicleProperties, VinData};

/// Tronçon jamais déneigé
pub const NOT_SERVICED: &str = "8+ hours ago";

/// Date de passage absente
pub const NOT_LOGGED: &str = "Not Logged";

/// vinData absent ou illisible
pub const VIN_UNAVAILABLE: &str = "Vehicle details unavailable";

/// Décrit un véhicule. `vin` vaut `None` si le décodage VIN est absent ou invalide.
pub fn describe_vehicle<Tz>(
    vehicle: &VehicleProperties,
    vin: Option<&VinData>,
    tz: &Tz,
) -> PopupContent
where
    Tz: TimeZone,
    Tz::Offset: Display,
{
    let updated = vehicle
        .date_time
        .as_ref()
        .map(|v| timestamp::display(v, tz))
        .unwrap_or_else(|| timestamp::INVALID_DATE.to_string());

    let position = Section::titled(
        "Position Info",
        vec![
            Item::new(format!("Updated: {}", updated)),
            Item::new(format!(
                "Device: {} ({})",
                or_empty(&vehicle.device_type),
                or_empty(&vehicle.device_id)
            )),
            Item::new(format!("Speed: {}mph", or_empty(&vehicle.speed))),
        ],
    );

    let details = match vin {
        Some(vin) => vin_items(vin),
        None => vec![Item::new(VIN_UNAVAILABLE)],
    };

    PopupContent {
        heading: Heading {
            level: 1,
            text: format!("Snow Plow {}", or_empty(&vehicle.vehicle_name)),
        },
        subtitle: vehicle.nickname.clone(),
        sections: vec![position, Section::titled("Vehicle Info", details)],
    }
}

fn vin_items(vin: &VinData) -> Vec<Item> {
    let mut items = vec![Item::strong(join_present(&[
        &vin.model_year,
        &vin.make,
        &vin.model,
    ]))];

    items.push(Item::new(join_present(&[
        &vin.engine_manufacturer,
        &vin.engine_model,
    ])));

    // Cylindres et carburant séparés par deux espaces
    let mut engine = [
        join_present(&[&vin.engine_configuration, &vin.engine_cylinders]),
        or_empty(&vin.fuel_type_primary).to_string(),
    ]
    .into_iter()
    .filter(|part| !part.is_empty())
    .collect::<Vec<_>>()
    .join("  ");
    if let Some(hp) = &vin.engine_hp {
        let range = match &vin.engine_hp_to {
            Some(to) => format!("{}hp - {}hp", hp, to),
            None => format!("{}hp", hp),
        };
        if engine.is_empty() {
            engine = format!("({})", range);
        } else {
            engine = format!("{} ({})", engine, range);
        }
    }
    items.push(Item::new(engine));

    if vin.plant_city.is_some() || vin.plant_state.is_some() {
        let built = [&vin.plant_city, &vin.plant_state, &vin.plant_country]
            .into_iter()
            .flatten()
            .map(String::as_str)
            .collect::<Vec<_>>()
            .join(", ");
        items.push(Item::new(format!("Built: {}", built)));
    }

    items
}

/// Décrit un tronçon. Sans métadonnées, les identifiants bruts sont affichés.
pub fn describe_route<Tz>(
    route: &RouteProperties,
    metadata: Option<&MetadataLookup>,
    tz: &Tz,
) -> PopupContent
where
    Tz: TimeZone,
    Tz::Offset: Display,
{
    let street = label(route.roadname.as_deref(), |id| {
        metadata.and_then(|m| m.street_name(id))
    });
    let priority = label(route.routepriority.as_deref(), |id| {
        metadata.and_then(|m| m.priority_label(id))
    });

    let serviced = match (&route.lastserviced, route.was_serviced()) {
        (Some(value), true) => Item::new(format!("Plowed at {}", timestamp::display(value, tz)))
            .with_child(Item::new(time_ago_f64(
                route.time_since_last_update.unwrap_or(0.0),
            ))),
        _ => Item::new(format!("Plowed at {}", NOT_LOGGED)).with_child(Item::new(NOT_SERVICED)),
    };

    PopupContent {
        heading: Heading {
            level: 2,
            text: street,
        },
        subtitle: None,
        sections: vec![Section::untitled(vec![
            serviced,
            Item::new(format!("Priority: {}", priority)),
        ])],
    }
}

fn label<'a>(id: Option<&'a str>, resolve: impl Fn(&str) -> Option<&'a str>) -> String {
    match id {
        Some(id) => resolve(id).unwrap_or(id).to_string(),
        None => String::new(),
    }
}

fn or_empty(value: &Option<String>) -> &str {
    value.as_deref().unwrap_or_default()
}

fn join_present(parts: &[&Option<String>]) -> String {
    parts
        .iter()
        .filter_map(|p| p.as_deref())
        .collect::<Vec<_>>()
        .join(" ")
}
