//! Nearest-unclaimed query cost over typical and oversized crystal fields.

use std::collections::HashMap;

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use crystalpets_logic::claims::{ClaimCoordinator, ResourceView};
use crystalpets_logic::geometry::Point3;

struct Field {
    positions: HashMap<u32, Point3>,
}

impl ResourceView<u32> for Field {
    fn is_alive(&self, _resource: u32) -> bool {
        true
    }

    fn position(&self, resource: u32) -> Option<Point3> {
        self.positions.get(&resource).copied()
    }
}

fn build(count: u32) -> (ClaimCoordinator<u32, u32>, Field) {
    let coordinator = ClaimCoordinator::new();
    let mut positions = HashMap::new();
    for id in 0..count {
        let angle = id as f32 * 0.618;
        positions.insert(id, Point3::flat(angle.cos() * id as f32, angle.sin() * id as f32));
        coordinator.register_resource(id);
        // Every third crystal is already taken.
        if id % 3 == 0 {
            let _ = coordinator.claim(id, 10_000 + id);
        }
    }
    (coordinator, Field { positions })
}

fn bench_nearest(c: &mut Criterion) {
    let mut group = c.benchmark_group("find_nearest_unclaimed");
    for count in [16u32, 64, 512] {
        let (coordinator, field) = build(count);
        group.bench_with_input(BenchmarkId::from_parameter(count), &count, |b, _| {
            b.iter(|| {
                coordinator.find_nearest_unclaimed(black_box(Point3::flat(1.0, -2.0)), 0, &field)
            })
        });
    }
    group.finish();
}

fn bench_claim_release(c: &mut Criterion) {
    let (coordinator, _field) = build(64);
    c.bench_function("claim_release_cycle", |b| {
        b.iter(|| {
            let _ = coordinator.claim(black_box(1), 7);
            coordinator.release(black_box(1), 7)
        })
    });
}

criterion_group!(benches, bench_nearest, bench_claim_release);
criterion_main!(benches);
