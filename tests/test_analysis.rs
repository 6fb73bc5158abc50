//! Integration test: analysis runs, persistence and error handling

use ndarray::Array1;
use pdp_explorer::prelude::*;
use polars::prelude::{DataFrame, NamedFrom, Series};
use std::sync::atomic::{AtomicUsize, Ordering};

fn housing() -> (DataFrame, FeatureCatalog) {
    let n = 120;
    let size: Vec<f64> = (0..n).map(|i| 40.0 + (i * 37 % n) as f64).collect();
    let floor: Vec<f64> = (0..n).map(|i| (i % 6) as f64).collect();
    let grade: Vec<f64> = (0..n).map(|i| (i % 3) as f64).collect();
    let city: Vec<&str> = (0..n).map(|i| ["oslo", "bergen", "tromso"][i % 3]).collect();
    let data = DataFrame::new(vec![
        Series::new("size".into(), &size).into(),
        Series::new("floor".into(), &floor).into(),
        Series::new("grade".into(), &grade).into(),
        Series::new("city".into(), &city).into(),
    ])
    .unwrap();
    let catalog = FeatureCatalog::new()
        .with_feature("size", FeatureDescriptor::continuous(&size).unwrap())
        .with_feature("floor", FeatureDescriptor::integer(&floor).unwrap())
        .with_feature("grade", FeatureDescriptor::ordinal(&grade).unwrap())
        .with_feature("city", FeatureDescriptor::categorical(city));
    (data, catalog)
}

fn price(ds: &DataFrame) -> pdp_explorer::Result<Array1<f64>> {
    let size = ds.numeric("size")?;
    let floor = ds.numeric("floor")?;
    let grade = ds.numeric("grade")?;
    let city: Array1<f64> = ds
        .text("city")?
        .iter()
        .map(|c| if c == "oslo" { 1.5 } else { 1.0 })
        .collect();
    Ok(size * &city + &floor.mapv(|f| 3.0 * f) + &grade.mapv(|g| g * g))
}

#[test]
fn test_full_run_produces_complete_report() {
    let (data, catalog) = housing();
    let analyzer = Analyzer::new(price, catalog)
        .with_config(AnalysisConfig::new().with_n_instances(60).with_resolution(10).with_seed(11));
    let report = analyzer
        .run(&data, &["grade"], &[("size", "city"), ("floor", "size")])
        .unwrap();

    let ids: Vec<&str> = report.one_way.iter().map(|p| p.id.as_str()).collect();
    assert_eq!(ids, vec!["grade", "size", "city", "floor"]);
    assert_eq!(report.two_way.len(), 2);
    assert_eq!(report.n_instances, 60);
    assert_eq!(report.resolution, 10);
    assert_eq!(report.marginal_distributions.len(), 4);

    let size_city = report.two_way("size", "city").unwrap();
    assert!(size_city.h_statistic > 0.0);
    let floor_size = report.two_way("floor", "size").unwrap();
    assert!(floor_size.h_statistic < 1e-8);
    assert_eq!(floor_size.kind, TwoWayKind::Quantitative);

    let extent = report.prediction_extent;
    for p in &report.one_way {
        assert!(extent.min <= p.min_prediction && p.max_prediction <= extent.max);
    }
    for p in &report.two_way {
        assert!(extent.min <= p.min_prediction && p.max_prediction <= extent.max);
    }
}

#[test]
fn test_parallel_matches_sequential() {
    let (data, catalog) = housing();
    let pairs = [("size", "city"), ("floor", "grade")];

    let sequential = Analyzer::new(price, catalog.clone())
        .with_config(AnalysisConfig::new().with_resolution(8).with_seed(21))
        .run(&data, &[], &pairs)
        .unwrap();
    let parallel = Analyzer::new(price, catalog)
        .with_config(AnalysisConfig::new().with_resolution(8).with_seed(21).with_threads(4))
        .run(&data, &[], &pairs)
        .unwrap();

    assert_eq!(sequential.one_way, parallel.one_way);
    assert_eq!(sequential.two_way, parallel.two_way);
    assert_eq!(sequential.quantitative_clusters, parallel.quantitative_clusters);
    assert_eq!(sequential.categorical_clusters, parallel.categorical_clusters);
}

#[test]
fn test_report_is_saved_and_reloaded() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("pdp.json");
    let (data, catalog) = housing();
    let analyzer = Analyzer::new(price, catalog).with_config(
        AnalysisConfig::new()
            .with_resolution(6)
            .with_seed(8)
            .with_output_path(&path),
    );
    let report = analyzer.run(&data, &[], &[("size", "floor")]).unwrap();

    assert!(path.is_file());
    let loaded = AnalysisReport::load(&path).unwrap();
    assert_eq!(loaded, report);
}

#[test]
fn test_bad_output_path_fails_before_predicting() {
    let calls = AtomicUsize::new(0);
    let counting = |ds: &DataFrame| -> pdp_explorer::Result<Array1<f64>> {
        calls.fetch_add(1, Ordering::SeqCst);
        price(ds)
    };
    let dir = tempfile::tempdir().unwrap();
    let (data, catalog) = housing();
    let analyzer = Analyzer::new(counting, catalog).with_config(
        AnalysisConfig::new().with_output_path(dir.path().join("missing").join("pdp.json")),
    );

    let err = analyzer.run(&data, &[], &[]).unwrap_err();
    assert!(matches!(err, PdpError::ConfigError(_)));
    assert_eq!(calls.load(Ordering::SeqCst), 0);
}

#[test]
fn test_unknown_feature_is_reported() {
    let (data, catalog) = housing();
    let analyzer = Analyzer::new(price, catalog);
    assert!(matches!(
        analyzer.run(&data, &["balcony"], &[]),
        Err(PdpError::FeatureNotFound(_))
    ));
    assert!(matches!(
        analyzer.run(&data, &[], &[("size", "balcony")]),
        Err(PdpError::FeatureNotFound(_))
    ));
}

#[test]
fn test_missing_column_is_reported() {
    let (data, catalog) = housing();
    let catalog = catalog.with_feature("age", FeatureDescriptor::continuous(&[1.0, 2.0]).unwrap());
    let analyzer = Analyzer::new(price, catalog);
    assert!(matches!(
        analyzer.run(&data, &["age"], &[]),
        Err(PdpError::ColumnNotFound(_))
    ));
}

#[test]
fn test_empty_catalog_is_a_config_error() {
    let (data, _) = housing();
    let analyzer = Analyzer::new(price, FeatureCatalog::new());
    assert!(matches!(analyzer.run(&data, &[], &[]), Err(PdpError::ConfigError(_))));
}

#[test]
fn test_prediction_errors_propagate() {
    let (data, catalog) = housing();
    let failing = |_: &DataFrame| -> pdp_explorer::Result<Array1<f64>> {
        Err(PdpError::PredictionError("scoring service unavailable".to_string()))
    };
    let analyzer = Analyzer::new(failing, catalog)
        .with_config(AnalysisConfig::new().with_threads(2).with_seed(1));
    match analyzer.run(&data, &[], &[]) {
        Err(PdpError::PredictionError(msg)) => assert_eq!(msg, "scoring service unavailable"),
        other => panic!("unexpected {:?}", other.map(|r| r.one_way.len())),
    }
}

#[test]
fn test_constant_model_is_degenerate_for_trends() {
    let (data, catalog) = housing();
    let constant = |ds: &DataFrame| -> pdp_explorer::Result<Array1<f64>> { Ok(Array1::from_elem(ds.height(), 7.0)) };

    let analyzer = Analyzer::new(constant, catalog);
    assert!(matches!(
        analyzer.run(&data, &["size"], &[]),
        Err(PdpError::DegenerateInput(_))
    ));
    // categorical features need no trend
    let report = analyzer.run(&data, &["city"], &[]).unwrap();
    assert_eq!(report.one_way("city").unwrap().mean_predictions, vec![7.0; 3]);
}
