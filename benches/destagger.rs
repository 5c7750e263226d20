use {
    criterion::{black_box, criterion_group, criterion_main, Benchmark, Criterion},
    wrf2iff::{
        destagger::{destagger, Destaggered},
        grid::{self, synthetic_grid, Dims, MemoryOrder, LEVEL, WEST_EAST},
    },
};

pub fn criterion_benchmark(c: &mut Criterion) {
    c.bench(
        "destagger",
        Benchmark::new("bottom_top_nx64_ny64_nz40", |b| {
            let grid = synthetic_grid(64, 64, 1, 40);
            let dims = Dims::from_grid(&grid).unwrap();
            let phb = grid::field4(&grid, "PHB", MemoryOrder::BottomTopStaggered, &dims).unwrap();

            b.iter(|| destagger(black_box(phb.view()), LEVEL))
        }),
    );

    c.bench(
        "destagger",
        Benchmark::new("west_east_nx64_ny64_nz40", |b| {
            let grid = synthetic_grid(64, 64, 1, 40);
            let dims = Dims::from_grid(&grid).unwrap();
            let u = grid::field4(&grid, "U", MemoryOrder::WestEastStaggered, &dims).unwrap();

            b.iter(|| destagger(black_box(u.view()), WEST_EAST))
        }),
    );

    c.bench(
        "destagger",
        Benchmark::new("from_grid_nx32_ny32_nz30", |b| {
            let grid = synthetic_grid(32, 32, 2, 30);
            let dims = Dims::from_grid(&grid).unwrap();

            b.iter(|| Destaggered::from_grid(black_box(&grid), &dims).unwrap())
        })
        .sample_size(20),
    );
}

criterion_group!(benches, criterion_benchmark);
criterion_main!(benches);
