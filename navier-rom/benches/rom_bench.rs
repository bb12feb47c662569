use criterion::{black_box, criterion_group, criterion_main, Criterion};
use navier_rom::*;

fn swirl_snapshots(n: usize) -> (Grid2D, faer::Mat<f64>) {
    let grid = Grid2D::new(n, n, 1.0, 1.0).unwrap();
    let mut solver = FullOrderSolver::new(grid, 0.05, 0.001, 0.05, 2).unwrap();
    let x = solver.run().to_matrix().unwrap();
    (grid, x)
}

fn bench_full_order(c: &mut Criterion) {
    let mut group = c.benchmark_group("full_order");

    for &n in &[16, 32, 64] {
        let grid = Grid2D::new(n, n, 1.0, 1.0).unwrap();
        group.bench_function(format!("{n}x{n}_50_steps"), |b| {
            b.iter(|| {
                let mut solver = FullOrderSolver::new(grid, 0.05, 0.001, 0.05, 10).unwrap();
                solver.run().len()
            })
        });
    }

    group.finish();
}

fn bench_train(c: &mut Criterion) {
    let (_, x) = swirl_snapshots(32);
    let mut group = c.benchmark_group("train");

    group.bench_function("pod_8", |b| {
        b.iter(|| {
            let mut pod = Pod::new(8);
            pod.train(black_box(&x)).unwrap();
        })
    });

    group.bench_function("dmd", |b| {
        b.iter(|| {
            let mut dmd = Dmd::new();
            dmd.train(black_box(&x)).unwrap();
        })
    });

    group.finish();
}

fn bench_reduced_step(c: &mut Criterion) {
    let (grid, x) = swirl_snapshots(32);
    let integration = TimeIntegration::new(0.001, 1).unwrap();

    let mut galerkin = GalerkinProjector::new(8, BurgersResidual::new(grid, 0.05), integration);
    galerkin.train(&x).unwrap();
    let mut deim = GalerkinProjector::new(
        8,
        DeimEvaluator::new(8).with_selection(GreedyDeim),
        integration,
    );
    deim.train(&x).unwrap();

    let x0: Vec<f64> = (0..x.nrows()).map(|i| x[(i, 0)]).collect();
    let a_galerkin = galerkin.project(&x0).unwrap();
    let a_deim = deim.project(&x0).unwrap();

    let mut group = c.benchmark_group("reduced_step");

    group.bench_function("galerkin_burgers", |b| {
        b.iter(|| {
            galerkin
                .step_explicit_euler(black_box(&a_galerkin), 0.001)
                .unwrap()
        })
    });

    group.bench_function("deim_square", |b| {
        b.iter(|| deim.step_explicit_euler(black_box(&a_deim), 0.001).unwrap())
    });

    group.finish();
}

criterion_group!(benches, bench_full_order, bench_train, bench_reduced_step);
criterion_main!(benches);
