use criterion::{black_box, criterion_group, criterion_main, Criterion};
use skops::dense::fill_dense_unpacked;
use skops::prelude::*;

fn bench_samplers(c: &mut Criterion) {
    let mut group = c.benchmark_group("samplers");

    for &n in &[1_000usize, 100_000] {
        let mut cdf = vec![1.0f64; n];
        weights_to_cdf(&mut cdf).unwrap();
        group.bench_function(format!("iid_n{}_k1000", n), |b| {
            let state: RngState = RngState::new(0);
            let mut out = vec![0i64; 1000];
            b.iter(|| {
                black_box(sample_indices_iid(black_box(&cdf), &mut out, state).unwrap());
            })
        });
    }

    for &(k, d) in &[(8usize, 1_000usize), (64, 100_000)] {
        group.bench_function(format!("fisher_yates_k{}_d{}_r100", k, d), |b| {
            let state: RngState = RngState::new(0);
            let mut major = vec![0i64; k * 100];
            let mut minor = vec![0i64; k * 100];
            let mut vals = vec![0.0f64; k * 100];
            b.iter(|| {
                black_box(
                    repeated_fisher_yates(state, k, d, 100, &mut major, &mut minor, &mut vals)
                        .unwrap(),
                );
            })
        });
    }
    group.finish();
}

fn bench_dense_fill(c: &mut Criterion) {
    let mut group = c.benchmark_group("dense_fill");

    for family in [DenseDistName::Gaussian, DenseDistName::Uniform] {
        let dist = DenseDist::new(256, 1024, family);
        let mut buf = vec![0.0f64; dist.n_elems()];
        group.bench_function(format!("{:?}_256x1024", family), |b| {
            let state: RngState = RngState::new(0);
            b.iter(|| {
                black_box(fill_dense_unpacked(&dist, state, &mut buf).unwrap());
            })
        });
    }
    group.finish();
}

fn bench_sketch_apply(c: &mut Criterion) {
    let mut group = c.benchmark_group("sketch_apply");

    let (d, m, n) = (64usize, 4096usize, 32usize);
    let mut a = vec![0.0f64; m * n];
    fill_dense_unpacked(&DenseDist::gaussian(m, n), RngState::new(1), &mut a).unwrap();

    let mut dense_op: DenseSkOp<f64> =
        DenseSkOp::new(DenseDist::gaussian(d, m), RngState::new(2));
    fill_dense(&mut dense_op).unwrap();
    group.bench_function("lskge3_64x4096", |b| {
        let mut out = vec![0.0f64; d * n];
        b.iter(|| {
            lskge3(
                Layout::ColMajor,
                Op::NoTrans,
                Op::NoTrans,
                d,
                n,
                m,
                1.0,
                black_box(&dense_op),
                0,
                0,
                black_box(&a),
                m,
                0.0,
                &mut out,
                d,
            )
            .unwrap();
        })
    });

    let mut sparse_op: SparseSkOp<f64> =
        SparseSkOp::new(SparseDist::new(d, m, 8), RngState::new(3)).unwrap();
    fill_sparse(&mut sparse_op).unwrap();
    group.bench_function("lskges_64x4096_nnz8", |b| {
        let mut out = vec![0.0f64; d * n];
        b.iter(|| {
            lskges(
                Layout::ColMajor,
                Op::NoTrans,
                Op::NoTrans,
                d,
                n,
                m,
                1.0,
                black_box(&sparse_op),
                0,
                0,
                black_box(&a),
                m,
                0.0,
                &mut out,
                d,
            )
            .unwrap();
        })
    });
    group.finish();
}

criterion_group!(benches, bench_samplers, bench_dense_fill, bench_sketch_apply);
criterion_main!(benches);
