//! Benchmarks du hit-test de la carte headless

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use geo::{Geometry, LineString, Point};
use plowmap::{
    FeatureSet, HeadlessMap, HitTolerance, LngLat, MapFeature, MapView, SourceId, Viewport,
    LAYER_PRIORITY,
};
use serde_json::Map;

/// Grille de tronçons et de véhicules autour du centre de Chicago
fn build_map(segments: usize) -> HeadlessMap {
    let viewport = Viewport::new(LngLat::new(-87.63, 41.88), 13.0, 1920.0, 1080.0);
    let map = HeadlessMap::new(viewport, HitTolerance::default());

    let side = (segments as f64).sqrt().ceil() as usize;
    let mut routes = Vec::with_capacity(segments);
    let mut plows = Vec::with_capacity(segments / 10);

    for i in 0..segments {
        let x = -87.70 + (i % side) as f64 * 0.002;
        let y = 41.80 + (i / side) as f64 * 0.002;
        routes.push(MapFeature {
            geometry: Geometry::LineString(LineString::from(vec![(x, y), (x + 0.0018, y)])),
            properties: Map::new(),
        });
        if i % 10 == 0 {
            plows.push(MapFeature {
                geometry: Geometry::Point(Point::new(x + 0.001, y)),
                properties: Map::new(),
            });
        }
    }

    map.set_source_data(
        SourceId::PlowRoutes,
        FeatureSet {
            features: routes,
            errors: Vec::new(),
        },
    );
    map.set_source_data(
        SourceId::Plows,
        FeatureSet {
            features: plows,
            errors: Vec::new(),
        },
    );
    map
}

fn bench_query(c: &mut Criterion) {
    let mut group = c.benchmark_group("query_rendered_features");

    for segments in [1_000usize, 10_000] {
        let map = build_map(segments);
        let point = map.project(LngLat::new(-87.63, 41.88));

        group.throughput(Throughput::Elements(segments as u64));
        group.bench_with_input(BenchmarkId::from_parameter(segments), &map, |b, map| {
            b.iter(|| map.query_rendered_features(black_box(point), &LAYER_PRIORITY))
        });
    }

    group.finish();
}

criterion_group!(benches, bench_query);
criterion_main!(benches);
