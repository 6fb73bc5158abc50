//! Integration test: partial dependence evaluation end-to-end

use ndarray::Array1;
use pdp_explorer::prelude::*;
use polars::prelude::{DataFrame, NamedFrom, Series};

const REGIONS: [&str; 4] = ["north", "south", "east", "west"];

fn age_region_data() -> (DataFrame, FeatureCatalog) {
    let age: Vec<f64> = (0..200).map(|i| 18.0 + 62.0 * i as f64 / 199.0).collect();
    let region: Vec<&str> = (0..200).map(|i| REGIONS[(i * 3) % 4]).collect();
    let data = DataFrame::new(vec![
        Series::new("age".into(), &age).into(),
        Series::new("region".into(), &region).into(),
    ])
    .unwrap();
    let catalog = FeatureCatalog::new()
        .with_feature("age", FeatureDescriptor::continuous(&age).unwrap())
        .with_feature("region", FeatureDescriptor::categorical(region));
    (data, catalog)
}

fn age_only(ds: &DataFrame) -> pdp_explorer::Result<Array1<f64>> {
    Ok(ds.numeric("age")?.mapv(|a| 0.1 * a))
}

fn region_effect(ds: &DataFrame) -> pdp_explorer::Result<Vec<f64>> {
    Ok(ds
        .text("region")?
        .iter()
        .map(|r| match r.as_str() {
            "north" => 1.0,
            "south" => -1.0,
            "east" => 0.5,
            _ => 0.0,
        })
        .collect())
}

#[test]
fn test_linear_age_scenario() {
    let (data, catalog) = age_region_data();
    let analyzer = Analyzer::new(age_only, catalog)
        .with_config(AnalysisConfig::new().with_resolution(10).with_seed(42));
    let report = analyzer.run(&data, &["age", "region"], &[]).unwrap();

    let age = report.one_way("age").unwrap();
    assert_eq!(age.x_values.len(), 10);
    assert_eq!(age.mean_predictions.len(), 10);
    for w in age.mean_predictions.windows(2) {
        assert!(w[1] > w[0], "curve must be strictly increasing");
    }
    let trend = age.trend.as_ref().unwrap();
    assert_eq!(trend.complexity, 2);
    assert!(trend.nrmse < 0.02, "nrmse = {}", trend.nrmse);

    let region = report.one_way("region").unwrap();
    assert_eq!(region.x_values.len(), 4);
    assert!(region.trend.is_none());
    assert!(region.deviation.abs() < 1e-12);
    assert_eq!(region.kind, PdpKind::Categorical);
}

#[test]
fn test_grid_lengths_and_centering() {
    let (data, catalog) = age_region_data();
    let analyzer = Analyzer::new(age_only, catalog)
        .with_config(AnalysisConfig::new().with_resolution(7).with_seed(1));
    let report = analyzer.run(&data, &[], &[]).unwrap();

    assert_eq!(report.one_way.len(), 2);
    for pdp in &report.one_way {
        assert_eq!(pdp.mean_predictions.len(), pdp.x_values.len());
        assert_eq!(pdp.mean_predictions_centered.len(), pdp.x_values.len());
        let mean: f64 = pdp.mean_predictions_centered.iter().sum::<f64>() / pdp.len() as f64;
        assert!(mean.abs() < 1e-9);
    }
    let age = report.one_way("age").unwrap();
    assert_eq!(age.x_values.first(), Some(&Value::Number(18.0)));
    assert_eq!(age.x_values.last(), Some(&Value::Number(80.0)));
}

#[test]
fn test_additive_model_has_no_interaction() {
    let (data, catalog) = age_region_data();
    let predict = |ds: &DataFrame| -> pdp_explorer::Result<Array1<f64>> {
        let age = ds.numeric("age")?;
        let effect = Array1::from_vec(region_effect(ds)?);
        Ok(age.mapv(|a| (a / 10.0).powi(2)) + effect)
    };
    let analyzer = Analyzer::new(predict, catalog)
        .with_config(AnalysisConfig::new().with_resolution(8).with_seed(5));
    let report = analyzer.run(&data, &[], &[("region", "age")]).unwrap();

    let surface = report.two_way("age", "region").unwrap();
    assert_eq!(surface.x_feature, "age");
    assert_eq!(surface.kind, TwoWayKind::Mixed);
    assert_eq!(surface.mean_predictions.len(), 8 * 4);
    assert_eq!(surface.interactions.len(), 8 * 4);
    assert!(surface.h_statistic < 1e-8, "H = {}", surface.h_statistic);
}

#[test]
fn test_cross_term_interacts() {
    let (data, catalog) = age_region_data();
    let predict = |ds: &DataFrame| -> pdp_explorer::Result<Array1<f64>> {
        let age = ds.numeric("age")?;
        let effect = Array1::from_vec(region_effect(ds)?);
        Ok(age * &effect)
    };
    let analyzer = Analyzer::new(predict, catalog)
        .with_config(AnalysisConfig::new().with_resolution(8).with_seed(5));
    let report = analyzer.run(&data, &[], &[("age", "region")]).unwrap();

    let surface = report.two_way("age", "region").unwrap();
    assert!(surface.h_statistic > 0.1, "H = {}", surface.h_statistic);
    assert!(surface.h_statistic >= 0.0);
}

#[test]
fn test_one_hot_and_integer_features() {
    let n = 120;
    let rooms: Vec<f64> = (0..n).map(|i| (i % 40) as f64).collect();
    let red: Vec<f64> = (0..n).map(|i| if i % 3 == 0 { 1.0 } else { 0.0 }).collect();
    let blue: Vec<f64> = red.iter().map(|v| 1.0 - v).collect();
    let data = DataFrame::new(vec![
        Series::new("rooms".into(), &rooms).into(),
        Series::new("color_red".into(), red).into(),
        Series::new("color_blue".into(), blue).into(),
    ])
    .unwrap();
    let catalog = FeatureCatalog::new()
        .with_feature("rooms", FeatureDescriptor::integer(&rooms).unwrap())
        .with_feature(
            "color",
            FeatureDescriptor::one_hot(vec![("color_red", "red"), ("color_blue", "blue")]),
        );

    let predict = |ds: &DataFrame| -> pdp_explorer::Result<Array1<f64>> {
        Ok(ds.numeric("rooms")? + ds.numeric("color_red")?.mapv(|v| 3.0 * v))
    };
    let analyzer = Analyzer::new(predict, catalog)
        .with_config(AnalysisConfig::new().with_resolution(10).with_seed(3));
    let report = analyzer.run(&data, &[], &[("rooms", "color")]).unwrap();

    let color = report.one_way("color").unwrap();
    assert_eq!(color.x_values, vec![Value::from("red"), Value::from("blue")]);
    assert!((color.mean_predictions[0] - color.mean_predictions[1] - 3.0).abs() < 1e-9);

    // 40 unique values at resolution 10: ends plus every 4th interior value
    let rooms = report.one_way("rooms").unwrap();
    assert_eq!(rooms.x_values.first(), Some(&Value::Number(0.0)));
    assert_eq!(rooms.x_values.last(), Some(&Value::Number(39.0)));
    assert_eq!(rooms.x_values.len(), 12);

    let surface = report.two_way("rooms", "color").unwrap();
    assert!(surface.h_statistic < 1e-8);

    match &report.marginal_distributions["color"] {
        MarginalDistribution::Categorical { counts, .. } => assert_eq!(counts.iter().sum::<usize>(), 100),
        other => panic!("unexpected {:?}", other),
    }
}
