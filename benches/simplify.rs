//! Benchmarks for mesh construction and edge-collapse simplification.

use criterion::{criterion_group, criterion_main, BatchSize, BenchmarkId, Criterion};
use edgefold::algo::decimate::{
    decimate, edge_collapse, CollapseMaps, CollapseOptions, CollapsePolicies, DecimateOptions,
    EdgeCountStop,
};
use edgefold::prelude::*;
use nalgebra::Point3;

fn grid(n: usize) -> (Vec<Point3<f64>>, Vec<[usize; 3]>) {
    let mut vertices = Vec::with_capacity((n + 1) * (n + 1));
    let mut faces = Vec::with_capacity(n * n * 2);

    // Slightly bumpy so edge costs are not all equal.
    for j in 0..=n {
        for i in 0..=n {
            let z = 0.1 * ((i as f64) * 0.7).sin() * ((j as f64) * 0.3).cos();
            vertices.push(Point3::new(i as f64, j as f64, z));
        }
    }

    for j in 0..n {
        for i in 0..n {
            let v00 = j * (n + 1) + i;
            let v10 = v00 + 1;
            let v01 = v00 + (n + 1);
            let v11 = v01 + 1;

            faces.push([v00, v10, v11]);
            faces.push([v00, v11, v01]);
        }
    }

    (vertices, faces)
}

fn grid_mesh(n: usize) -> HalfEdgeMesh {
    let (vertices, faces) = grid(n);
    build_from_triangles(&vertices, &faces).unwrap()
}

fn bench_mesh_construction(c: &mut Criterion) {
    let (vertices, faces) = grid(50);
    c.bench_function("build_grid_50x50", |b| {
        b.iter(|| {
            let mesh: HalfEdgeMesh = build_from_triangles(&vertices, &faces).unwrap();
            mesh
        });
    });
}

fn bench_edge_collapse(c: &mut Criterion) {
    let mut group = c.benchmark_group("edge_collapse_half");
    for n in [20, 50, 100] {
        let mesh = grid_mesh(n);
        let target = mesh.num_edges() / 2;
        group.bench_with_input(BenchmarkId::from_parameter(n), &mesh, |b, mesh| {
            b.iter_batched(
                || mesh.clone(),
                |mut mesh| {
                    edge_collapse(
                        &mut mesh,
                        EdgeCountStop::new(target),
                        CollapseMaps::defaults(),
                        CollapsePolicies::edge_length(),
                        (),
                        CollapseOptions::default(),
                    )
                },
                BatchSize::LargeInput,
            );
        });
    }
    group.finish();
}

fn bench_decimate_and_compact(c: &mut Criterion) {
    let mesh = grid_mesh(50);
    let options = DecimateOptions::with_target_ratio(0.1)
        .with_preserve_boundary(true)
        .with_compact(true);

    c.bench_function("decimate_compact_50x50", |b| {
        b.iter_batched(
            || mesh.clone(),
            |mut mesh| decimate(&mut mesh, &options).unwrap(),
            BatchSize::LargeInput,
        );
    });
}

criterion_group!(
    benches,
    bench_mesh_construction,
    bench_edge_collapse,
    bench_decimate_and_compact
);
criterion_main!(benches);
