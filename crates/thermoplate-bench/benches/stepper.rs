//! Criterion benchmarks for the explicit stepper: both kernels on both
//! profiles.

use std::hint::black_box;

use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};
use thermoplate_bench::{reference_profile, step_or_restart, stress_profile, warmed_engine};
use thermoplate_core::PhysicalParameters;
use thermoplate_solver::StencilKernel;

fn bench_single_step(c: &mut Criterion) {
    let profiles: [(&str, PhysicalParameters); 2] = [
        ("reference_7k", reference_profile()),
        ("stress_90k", stress_profile()),
    ];
    let mut group = c.benchmark_group("step");
    for (name, params) in profiles {
        for kernel in StencilKernel::ALL {
            let mut engine = warmed_engine(params.clone(), kernel, 200);
            group.bench_with_input(BenchmarkId::new(kernel.name(), name), &(), |b, _| {
                b.iter(|| black_box(step_or_restart(&mut engine)));
            });
        }
    }
    group.finish();
}

fn bench_batch_1000_reference(c: &mut Criterion) {
    let mut group = c.benchmark_group("batch_1000_reference");
    group.sample_size(20);
    for kernel in StencilKernel::ALL {
        group.bench_function(kernel.name(), |b| {
            b.iter_batched_ref(
                || warmed_engine(reference_profile(), kernel, 0),
                |engine| black_box(engine.run_batch(1000)),
                criterion::BatchSize::LargeInput,
            );
        });
    }
    group.finish();
}

criterion_group!(benches, bench_single_step, bench_batch_1000_reference);
criterion_main!(benches);
