//! Criterion benchmarks for placement scans.
//!
//! Run with: `cargo bench`

use std::hint::black_box;

use criterion::{criterion_group, criterion_main, Criterion};
use satchel::items::{InventoryGrid, SortMode};
use satchel::{InstanceIdGen, TemplateLibrary};

/// Bag filled by auto-placing the default templates until nothing fits.
fn crowded_bag(library: &TemplateLibrary, ids: &mut InstanceIdGen) -> InventoryGrid {
    let mut grid = InventoryGrid::new(10, 8);
    let cycle = ["rifle", "shield", "pistol", "amulet", "boomerang", "helm", "dagger"];
    for id in cycle.iter().cycle().take(40) {
        if let Some(instance) = library.instantiate(id, ids) {
            let _ = grid.auto_place_any_rotation(instance);
        }
    }
    grid
}

fn bench_find_free_placement(c: &mut Criterion) {
    let library = TemplateLibrary::defaults();
    let mut ids = InstanceIdGen::new();
    let grid = crowded_bag(&library, &mut ids);
    let Some(probe) = library.instantiate("amulet", &mut ids) else {
        return;
    };

    c.bench_function("find_free_placement_crowded", |b| {
        b.iter(|| grid.find_free_placement(black_box(&probe)));
    });
    c.bench_function("find_free_placement_any_rotation_crowded", |b| {
        b.iter(|| grid.find_free_placement_any_rotation(black_box(&probe)));
    });
}

fn bench_place_remove(c: &mut Criterion) {
    let library = TemplateLibrary::defaults();
    let mut ids = InstanceIdGen::new();
    let mut grid = InventoryGrid::new(10, 8);

    c.bench_function("place_remove_rifle", |b| {
        b.iter(|| {
            if let Some(rifle) = library.instantiate("rifle", &mut ids) {
                if let Ok(id) = grid.place_at(rifle, 2, 3) {
                    let _ = grid.remove_instance(black_box(id));
                }
            }
        });
    });
}

fn bench_auto_organize(c: &mut Criterion) {
    let library = TemplateLibrary::defaults();
    let mut ids = InstanceIdGen::new();
    let mut grid = crowded_bag(&library, &mut ids);

    c.bench_function("auto_organize_size", |b| {
        b.iter(|| grid.auto_organize(black_box(SortMode::Size)));
    });
}

criterion_group!(
    benches,
    bench_find_free_placement,
    bench_place_remove,
    bench_auto_organize
);
criterion_main!(benches);
