//! # Gate Benchmarks
//!
//! Measures the 1-, 2- and k-qubit primitives on the host backends.
//!
//! Run: `cargo bench --bench gate_bench`

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use qsim_core::{random_state, Backend, Gate, QuantumRegister};
use rand::rngs::StdRng;
use rand::SeedableRng;

const SIZES: [usize; 3] = [10, 14, 18];
const HOST_BACKENDS: [Backend; 2] = [Backend::Scalar, Backend::Vectorized];

fn prepared(backend: Backend, qubits: usize) -> Box<dyn QuantumRegister> {
    let mut register = qsim_core::create_register(backend, qubits).unwrap();
    let state = random_state(qubits, &mut StdRng::seed_from_u64(qubits as u64)).unwrap();
    register.set_state_vector(&state).unwrap();
    register
}

/// Benchmark Hadamard on the lowest and highest qubit
fn bench_one_qubit(c: &mut Criterion) {
    let mut group = c.benchmark_group("one_qubit");

    for qubits in SIZES {
        group.throughput(Throughput::Elements(1 << qubits));
        for backend in HOST_BACKENDS {
            let mut register = prepared(backend, qubits);
            let high = qubits - 1;

            group.bench_with_input(BenchmarkId::new(format!("{backend}/low"), qubits), &0, |b, &q| {
                b.iter(|| register.hadamard(black_box(q)).unwrap())
            });
            group.bench_with_input(BenchmarkId::new(format!("{backend}/high"), qubits), &high, |b, &q| {
                b.iter(|| register.hadamard(black_box(q)).unwrap())
            });
        }
    }

    group.finish();
}

/// Benchmark controlled gates, both target orders
fn bench_two_qubit(c: &mut Criterion) {
    let mut group = c.benchmark_group("two_qubit");

    for qubits in SIZES {
        group.throughput(Throughput::Elements(1 << qubits));
        for backend in HOST_BACKENDS {
            let mut register = prepared(backend, qubits);
            let high = qubits - 1;

            group.bench_function(BenchmarkId::new(format!("{backend}/cx"), qubits), |b| {
                b.iter(|| register.controlled_x(black_box(0), black_box(high)).unwrap())
            });
            group.bench_function(BenchmarkId::new(format!("{backend}/cp"), qubits), |b| {
                b.iter(|| register.controlled_phase(black_box(high), black_box(1), 0.3).unwrap())
            });
        }
    }

    group.finish();
}

/// Benchmark the general k-qubit path
fn bench_k_qubit(c: &mut Criterion) {
    let mut group = c.benchmark_group("k_qubit");
    let c3x = Gate::make_controlled(&Gate::pauli_x(), 3).unwrap();

    for qubits in SIZES {
        group.throughput(Throughput::Elements(1 << qubits));
        for backend in HOST_BACKENDS {
            let mut register = prepared(backend, qubits);
            let targets = [qubits - 1, 0, qubits / 2, 1];

            group.bench_function(BenchmarkId::new(format!("{backend}/toffoli"), qubits), |b| {
                b.iter(|| register.toffoli(black_box(0), black_box(1), black_box(qubits - 1)).unwrap())
            });
            group.bench_function(BenchmarkId::new(format!("{backend}/c3x"), qubits), |b| {
                b.iter(|| register.gate(&c3x, black_box(&targets)).unwrap())
            });
        }
    }

    group.finish();
}

/// Probability extraction, used by the sampler and the dump
fn bench_probabilities(c: &mut Criterion) {
    let mut group = c.benchmark_group("probabilities");

    for qubits in SIZES {
        let register = prepared(Backend::Vectorized, qubits);
        group.bench_function(BenchmarkId::from_parameter(qubits), |b| {
            b.iter(|| black_box(register.probabilities().unwrap()))
        });
    }

    group.finish();
}

criterion_group!(
    benches,
    bench_one_qubit,
    bench_two_qubit,
    bench_k_qubit,
    bench_probabilities,
);
criterion_main!(benches);
