use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use ndarray::Array1;
use pdp_explorer::clustering::dtw_distance;
use pdp_explorer::prelude::*;
use polars::prelude::{Column, DataFrame, NamedFrom, Series};
use rand::prelude::*;

fn create_data(n_rows: usize, n_features: usize) -> (DataFrame, FeatureCatalog) {
    let mut rng = StdRng::seed_from_u64(42);
    let mut columns: Vec<Column> = Vec::with_capacity(n_features);
    let mut catalog = FeatureCatalog::new();

    for i in 0..n_features {
        let name = format!("feature_{}", i);
        let values: Vec<f64> = (0..n_rows).map(|_| rng.gen::<f64>() * 10.0).collect();
        catalog.insert(&name, FeatureDescriptor::continuous(&values).unwrap());
        columns.push(Series::new(name.as_str().into(), values).into());
    }

    (DataFrame::new(columns).unwrap(), catalog)
}

fn sum_of_squares(ds: &DataFrame) -> pdp_explorer::Result<Array1<f64>> {
    let mut out = Array1::zeros(ds.height());
    for name in ds.get_column_names() {
        out = out + ds.numeric(name.as_str())?.mapv(|v| v * v);
    }
    Ok(out)
}

fn bench_one_way(c: &mut Criterion) {
    let mut group = c.benchmark_group("one_way");
    group.sample_size(10);

    for resolution in [10, 20, 50].iter() {
        let (data, catalog) = create_data(1000, 5);
        let analyzer = Analyzer::new(sum_of_squares, catalog).with_config(
            AnalysisConfig::new()
                .with_n_instances(200)
                .with_resolution(*resolution)
                .with_seed(1),
        );

        group.bench_with_input(BenchmarkId::new("run", resolution), &data, |b, data| {
            b.iter(|| analyzer.run(black_box(data), &[], &[]).unwrap())
        });
    }

    group.finish();
}

fn bench_parallel(c: &mut Criterion) {
    let mut group = c.benchmark_group("parallel");
    group.sample_size(10);

    let (data, catalog) = create_data(1000, 8);
    let pairs = [("feature_0", "feature_1"), ("feature_2", "feature_3"), ("feature_4", "feature_5")];

    for threads in [1, 2, 4].iter() {
        let analyzer = Analyzer::new(sum_of_squares, catalog.clone()).with_config(
            AnalysisConfig::new()
                .with_n_instances(200)
                .with_resolution(15)
                .with_seed(1)
                .with_threads(*threads),
        );

        group.bench_with_input(BenchmarkId::new("threads", threads), &data, |b, data| {
            b.iter(|| analyzer.run(black_box(data), &[], &pairs).unwrap())
        });
    }

    group.finish();
}

fn bench_dtw(c: &mut Criterion) {
    let mut group = c.benchmark_group("dtw");
    let mut rng = StdRng::seed_from_u64(7);

    for len in [20, 50, 100].iter() {
        let a: Vec<f64> = (0..*len).map(|_| rng.gen()).collect();
        let b: Vec<f64> = (0..*len).map(|_| rng.gen()).collect();

        group.bench_with_input(BenchmarkId::new("distance", len), &(a, b), |bench, (a, b)| {
            bench.iter(|| dtw_distance(black_box(a), black_box(b)))
        });
    }

    group.finish();
}

criterion_group!(benches, bench_one_way, bench_parallel, bench_dtw);
criterion_main!(benches);
