//! Criterion benchmarks for `dpmm-math`.
//!
//! Focus on the predictive kernels evaluated once per point per cluster in a
//! Gibbs sweep.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use dpmm_math::math::matrix::{mvt_log_pdf, SpdFactor};
use dpmm_math::math::normal::student_t_log_pdf;
use nalgebra::{DMatrix, DVector};

fn bench_scalar_kernels(c: &mut Criterion) {
    let mut group = c.benchmark_group("scalar");

    for (name, df, s2) in [("diffuse", 3.0, 10.0), ("tight", 40.0, 0.1)] {
        group.bench_with_input(
            BenchmarkId::new("student_t_log_pdf", name),
            &(df, s2),
            |b, &(df, s2)| {
                b.iter(|| {
                    black_box(student_t_log_pdf(
                        black_box(0.37),
                        black_box(0.1),
                        black_box(df),
                        black_box(s2),
                    ));
                });
            },
        );
    }

    group.finish();
}

fn bench_matrix_kernels(c: &mut Criterion) {
    let mut group = c.benchmark_group("matrix");

    for d in [2usize, 5, 10] {
        let scale = DMatrix::from_fn(d, d, |i, j| if i == j { 1.0 + 0.1 } else { 0.1 });
        let loc = DVector::zeros(d);
        let x = DVector::from_fn(d, |i, _| 0.1 * i as f64);

        group.bench_with_input(BenchmarkId::new("spd_factor", d), &scale, |b, m| {
            b.iter(|| black_box(SpdFactor::new(black_box(m))));
        });

        if let Some(factor) = SpdFactor::new(&scale) {
            group.bench_with_input(BenchmarkId::new("mvt_log_pdf", d), &factor, |b, f| {
                b.iter(|| black_box(mvt_log_pdf(black_box(&x), &loc, black_box(5.0), f)));
            });
        }
    }

    group.finish();
}

criterion_group!(benches, bench_scalar_kernels, bench_matrix_kernels);
criterion_main!(benches);
