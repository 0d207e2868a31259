//! Tests d'intégration: flux GeoJSON -> carte headless -> clic -> popup

use std::sync::Arc;

use chrono::Utc;
use plowmap::popup::{NOT_SERVICED, VIN_UNAVAILABLE};
use plowmap::{
    decode_bytes, render_html, Cursor, HeadlessMap, HitTolerance, LngLat, MapView, MetadataCell,
    MetadataLookup, PopupController, ScreenPoint, SourceId, Viewport,
};

const PLOWS: &[u8] = include_bytes!("fixtures/plows.geojson");
const ROUTES: &[u8] = include_bytes!("fixtures/plow_routes.geojson");
const META: &[u8] = include_bytes!("fixtures/meta.json");

struct Fixture {
    map: Arc<HeadlessMap>,
    metadata: MetadataCell,
    controller: PopupController<HeadlessMap, Utc>,
}

fn fixture() -> Fixture {
    let viewport = Viewport::new(LngLat::new(-87.63, 41.878), 15.0, 1024.0, 768.0);
    let map = Arc::new(HeadlessMap::new(viewport, HitTolerance::default()));
    map.set_source_data(SourceId::Plows, decode_bytes(PLOWS).unwrap());
    map.set_source_data(SourceId::PlowRoutes, decode_bytes(ROUTES).unwrap());

    let metadata = MetadataCell::new();
    metadata.replace(serde_json::from_slice::<MetadataLookup>(META).unwrap());

    let controller = PopupController::with_timezone(Arc::clone(&map), metadata.reader(), Utc);
    Fixture {
        map,
        metadata,
        controller,
    }
}

#[test]
fn test_vehicle_wins_over_route_at_same_point() {
    let f = fixture();
    let point = f.map.project(LngLat::new(-87.6298, 41.8781));

    let popup = f.controller.on_click(point).expect("popup");

    assert_eq!(popup.content.heading.text, "Snow Plow S-101");
    assert!(popup.content.contains("2019 INTERNATIONAL HV"));
    assert!(popup.content.contains("Built: ESCOBEDO, MEXICO"));
    assert_eq!(f.map.popups_shown(), 1);
}

#[test]
fn test_vehicle_popup_anchored_on_feature() {
    let f = fixture();
    let center = f.map.project(LngLat::new(-87.6298, 41.8781));

    // Deux clics à des endroits différents de l'icône
    for (dx, dy) in [(-8.0, 3.0), (6.0, -9.0)] {
        let popup = f
            .controller
            .on_click(ScreenPoint::new(center.x + dx, center.y + dy))
            .expect("popup");
        assert_eq!(popup.anchor, LngLat::new(-87.6298, 41.8781));
        assert_eq!(popup.offset_px, 16.0);
    }
}

#[test]
fn test_route_popup_anchored_on_click() {
    let f = fixture();
    let click = f.map.project(LngLat::new(-87.6330, 41.8781));

    let popup = f.controller.on_click(click).expect("popup");
    let expected = f.map.unproject(click);

    assert_eq!(popup.anchor, expected);
    assert_eq!(popup.content.heading.text, "W MADISON ST");
    assert!(popup.content.contains("Plowed at 1/15/2025, 9:04:05 PM"));
    assert!(popup.content.contains("1 days 1 hours 0 minutes ago"));
    assert!(popup.content.contains("Priority: Main Route"));
}

#[test]
fn test_never_serviced_route_shows_fallback() {
    let f = fixture();
    let click = f.map.project(LngLat::new(-87.6300, 41.8700));

    let popup = f.controller.on_click(click).expect("popup");

    assert_eq!(popup.content.heading.text, "W ROOSEVELT RD");
    assert!(popup.content.contains(NOT_SERVICED));
    assert!(!popup.content.contains("2 minutes ago"));
}

#[test]
fn test_vehicle_without_vin_uses_placeholder() {
    let f = fixture();
    let point = f.map.project(LngLat::new(-87.6400, 41.8900));

    let popup = f.controller.on_click(point).expect("popup");

    assert_eq!(popup.content.heading.text, "Snow Plow S-202");
    assert!(popup.content.contains(VIN_UNAVAILABLE));
    assert!(popup.content.contains("Speed: 0mph"));
}

#[test]
fn test_vehicle_with_malformed_vin_uses_placeholder() {
    let f = fixture();
    let plows = br#"{"type":"FeatureCollection","features":[
        {"type":"Feature","geometry":{"type":"Point","coordinates":[-87.6298,41.8781]},
         "properties":{"vehicleName":"S-303","deviceType":"GPS","device_id":"77","speed":12,
                       "vinData":"{not json"}}]}"#;
    f.map
        .set_source_data(SourceId::Plows, decode_bytes(plows).unwrap());

    let point = f.map.project(LngLat::new(-87.6298, 41.8781));
    let popup = f.controller.on_click(point).expect("popup");

    assert_eq!(popup.content.heading.text, "Snow Plow S-303");
    assert!(popup.content.contains(VIN_UNAVAILABLE));
    assert!(popup.content.contains("Speed: 12mph"));
    assert_eq!(popup.anchor, LngLat::new(-87.6298, 41.8781));
}

#[test]
fn test_empty_area_produces_no_popup() {
    let f = fixture();
    let nowhere = f.map.project(LngLat::new(-87.6100, 41.8850));

    assert!(f.controller.on_click(nowhere).is_none());
    assert!(f.map.popup().is_none());
    assert_eq!(f.map.popups_shown(), 0);
}

#[test]
fn test_empty_click_keeps_open_popup() {
    let f = fixture();
    let shown = f
        .controller
        .on_click(f.map.project(LngLat::new(-87.6298, 41.8781)))
        .expect("popup");

    let nowhere = f.map.project(LngLat::new(-87.6100, 41.8850));
    assert!(f.controller.on_click(nowhere).is_none());

    assert_eq!(f.map.popup(), Some(shown));
    assert_eq!(f.map.popups_shown(), 1);
}

#[test]
fn test_new_click_replaces_popup() {
    let f = fixture();
    f.controller
        .on_click(f.map.project(LngLat::new(-87.6298, 41.8781)))
        .expect("vehicle");
    f.controller
        .on_click(f.map.project(LngLat::new(-87.6300, 41.8700)))
        .expect("route");

    let shown = f.map.popup().expect("popup shown");
    assert_eq!(shown.content.heading.text, "W ROOSEVELT RD");
    assert_eq!(f.map.popups_shown(), 2);
}

#[test]
fn test_metadata_swap_is_seen_on_next_click() {
    let f = fixture();
    let click = f.map.project(LngLat::new(-87.6330, 41.8781));

    let mut renamed = MetadataLookup::default();
    renamed
        .filter_values
        .streets
        .insert("1042".to_string(), "E MADISON ST".to_string());
    f.metadata.replace(renamed);

    let popup = f.controller.on_click(click).expect("popup");
    assert_eq!(popup.content.heading.text, "E MADISON ST");
    assert!(popup.content.contains("Priority: 1"));
}

#[test]
fn test_cursor_affordance() {
    let f = fixture();

    let over = f.map.project(LngLat::new(-87.6298, 41.8781));
    assert_eq!(f.controller.on_pointer_move(over), Cursor::Pointer);
    assert_eq!(f.map.cursor(), Cursor::Pointer);

    let away = f.map.project(LngLat::new(-87.6100, 41.8850));
    assert_eq!(f.controller.on_pointer_move(away), Cursor::Default);
    assert_eq!(f.map.cursor(), Cursor::Default);
}

#[test]
fn test_rendered_html_is_escaped() {
    let f = fixture();
    let mut meta = MetadataLookup::default();
    meta.filter_values
        .streets
        .insert("1042".to_string(), "<b>MADISON</b>".to_string());
    f.metadata.replace(meta);

    let popup = f
        .controller
        .on_click(f.map.project(LngLat::new(-87.6330, 41.8781)))
        .expect("popup");
    let html = render_html(&popup.content);

    assert!(html.starts_with("<h2>&lt;b&gt;MADISON&lt;/b&gt;</h2>"));
}
