//! Analysis orchestration: validation, sampling, the one-way, clustering and
//! two-way phases, and report assembly

use crate::analysis::config::AnalysisConfig;
use crate::analysis::report::{validate_output_path, AnalysisReport, PredictionExtent};
use crate::clustering::cluster_one_way;
use crate::data::sample_rows;
use crate::error::{PdpError, Result};
use crate::explainability::{
    marginal_distribution, OneWayPdp, PartialDependence, TrendFitter, TwoWayPdp, WorkingSample,
};
use crate::metadata::FeatureCatalog;
use crate::utils::stats::iqr;
use crate::utils::try_map_with_config;
use chrono::Utc;
use ndarray::Array1;
use polars::prelude::DataFrame;
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::collections::BTreeMap;
use tracing::{info, warn};

/// One independent unit of evaluation
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WorkItem {
    OneWay(String),
    TwoWay(String, String),
}

impl WorkItem {
    pub fn one_way(feature: &str) -> Self {
        WorkItem::OneWay(feature.to_string())
    }

    pub fn two_way(x: &str, y: &str) -> Self {
        WorkItem::TwoWay(x.to_string(), y.to_string())
    }
}

/// Outcome of a [`WorkItem`]
#[derive(Debug, Clone, PartialEq)]
pub enum WorkResult {
    OneWay(OneWayPdp),
    TwoWay(TwoWayPdp),
}

impl WorkResult {
    pub fn into_one_way(self) -> Option<OneWayPdp> {
        match self {
            WorkResult::OneWay(p) => Some(p),
            WorkResult::TwoWay(_) => None,
        }
    }

    pub fn into_two_way(self) -> Option<TwoWayPdp> {
        match self {
            WorkResult::TwoWay(p) => Some(p),
            WorkResult::OneWay(_) => None,
        }
    }
}

/// Features and pairs an analysis covers, after validation
#[derive(Debug, Clone, PartialEq)]
struct Request {
    features: Vec<String>,
    pairs: Vec<(String, String)>,
}

/// Partial dependence analyzer around a black-box prediction function.
///
/// `predict_fn` maps a data frame to one prediction per row. It is called from
/// worker threads when parallelism is configured, so it must be `Sync`.
pub struct Analyzer<F>
where
    F: Fn(&DataFrame) -> Result<Array1<f64>> + Sync,
{
    predict_fn: F,
    catalog: FeatureCatalog,
    config: AnalysisConfig,
}

impl<F> Analyzer<F>
where
    F: Fn(&DataFrame) -> Result<Array1<f64>> + Sync,
{
    pub fn new(predict_fn: F, catalog: FeatureCatalog) -> Self {
        Self {
            predict_fn,
            catalog,
            config: AnalysisConfig::default(),
        }
    }

    pub fn with_config(mut self, config: AnalysisConfig) -> Self {
        self.config = config;
        self
    }

    pub fn config(&self) -> &AnalysisConfig {
        &self.config
    }

    pub fn catalog(&self) -> &FeatureCatalog {
        &self.catalog
    }

    /// Run a full analysis of `features` and `pairs` against `data`.
    ///
    /// Every feature named in a pair is analyzed one-way as well. With no
    /// features and no pairs every catalog feature is analyzed.
    pub fn run(&self, data: &DataFrame, features: &[&str], pairs: &[(&str, &str)]) -> Result<AnalysisReport> {
        let request = self.validate(data, features, pairs)?;

        let sample = self.draw_sample(data)?;
        info!(
            rows = sample.n_rows(),
            features = request.features.len(),
            pairs = request.pairs.len(),
            "working sample drawn"
        );

        let mut needs_trend = false;
        for feature in &request.features {
            needs_trend |= self.catalog.get(feature)?.is_quantitative();
        }
        let output_iqr = if needs_trend {
            let value = self.output_iqr(data)?;
            info!(iqr = value, "prediction output spread measured");
            Some(value)
        } else {
            None
        };

        let pdp = self.evaluator(output_iqr)?;

        // One-way phase
        let items = request.features.iter().map(|f| WorkItem::one_way(f)).collect();
        let mut one_way: Vec<OneWayPdp> = self
            .dispatch(&pdp, &sample, items, &[])?
            .into_iter()
            .filter_map(WorkResult::into_one_way)
            .collect();
        info!(curves = one_way.len(), "one-way phase complete");

        let clusters = cluster_one_way(&mut one_way, &self.config.clustering)?;

        // Two-way phase
        let items = request
            .pairs
            .iter()
            .map(|(x, y)| WorkItem::two_way(x, y))
            .collect();
        let two_way: Vec<TwoWayPdp> = self
            .dispatch(&pdp, &sample, items, &one_way)?
            .into_iter()
            .filter_map(WorkResult::into_two_way)
            .collect();
        info!(surfaces = two_way.len(), "two-way phase complete");

        let mut marginal_distributions = BTreeMap::new();
        for feature in &request.features {
            let descriptor = self.catalog.get(feature)?;
            let distribution = marginal_distribution(feature, descriptor, sample.snapshot())?;
            marginal_distributions.insert(feature.clone(), distribution);
        }

        let mut prediction_extent = PredictionExtent::empty();
        for p in &one_way {
            prediction_extent.include(p.min_prediction, p.max_prediction);
        }
        for p in &two_way {
            prediction_extent.include(p.min_prediction, p.max_prediction);
        }

        let report = AnalysisReport {
            one_way,
            two_way,
            quantitative_clusters: clusters.quantitative,
            categorical_clusters: clusters.categorical,
            prediction_extent,
            marginal_distributions,
            n_instances: sample.n_rows(),
            resolution: self.config.resolution,
            warnings: clusters.warnings,
            generated_at: Utc::now(),
        };

        if let Some(path) = &self.config.output_path {
            report.save(path)?;
        }

        Ok(report)
    }

    /// Evaluate additional work items against an existing working sample.
    ///
    /// Two-way items need the one-way results of both their features in
    /// `one_way`. Quantitative one-way items are trend-fitted only when
    /// `output_iqr` is given. `sample` itself is never modified; every item
    /// runs on its own copy.
    pub fn evaluate(
        &self,
        sample: &WorkingSample,
        items: Vec<WorkItem>,
        one_way: &[OneWayPdp],
        output_iqr: Option<f64>,
    ) -> Result<Vec<WorkResult>> {
        self.config.validate()?;
        for item in &items {
            match item {
                WorkItem::OneWay(f) => {
                    self.catalog.check_against(f, sample.data())?;
                }
                WorkItem::TwoWay(x, y) => {
                    check_pair(x, y)?;
                    self.catalog.check_against(x, sample.data())?;
                    self.catalog.check_against(y, sample.data())?;
                }
            }
        }

        let pdp = self.evaluator(output_iqr)?;
        self.dispatch(&pdp, sample, items, one_way)
    }

    /// Interquartile range of the predictions over the whole of `data`
    pub fn output_iqr(&self, data: &DataFrame) -> Result<f64> {
        let predictions = (self.predict_fn)(data)?;
        if predictions.len() != data.height() {
            return Err(PdpError::ShapeError {
                expected: format!("{} predictions", data.height()),
                actual: format!("{} predictions", predictions.len()),
            });
        }
        Ok(iqr(&predictions.to_vec()))
    }

    fn evaluator(&self, output_iqr: Option<f64>) -> Result<PartialDependence<'_, F>> {
        let pdp = PartialDependence::new(&self.predict_fn, &self.catalog)
            .with_resolution(self.config.resolution);
        match output_iqr {
            Some(value) => {
                let fitter = TrendFitter::new(self.config.trend.clone(), value)?;
                Ok(pdp.with_trend_fitter(fitter))
            }
            None => Ok(pdp),
        }
    }

    // Each task clones its own working sample before touching it
    fn dispatch(
        &self,
        pdp: &PartialDependence<'_, F>,
        sample: &WorkingSample,
        items: Vec<WorkItem>,
        one_way: &[OneWayPdp],
    ) -> Result<Vec<WorkResult>> {
        try_map_with_config(items, &self.config.parallel, |item| {
            let mut local = sample.clone();
            match item {
                WorkItem::OneWay(feature) => pdp.one_way(&mut local, &feature).map(WorkResult::OneWay),
                WorkItem::TwoWay(x, y) => pdp
                    .two_way(&mut local, (x.as_str(), y.as_str()), one_way)
                    .map(WorkResult::TwoWay),
            }
        })
    }

    /// Everything that can be checked before sampling
    fn validate(&self, data: &DataFrame, features: &[&str], pairs: &[(&str, &str)]) -> Result<Request> {
        self.config.validate()?;
        if let Some(path) = &self.config.output_path {
            validate_output_path(path)?;
        }
        if self.catalog.is_empty() {
            return Err(PdpError::ConfigError(
                "Feature catalog is empty, nothing to analyze".to_string(),
            ));
        }
        if data.height() == 0 {
            return Err(PdpError::DataError("Reference dataset has no rows".to_string()));
        }

        let mut requested: Vec<String> = Vec::new();
        let mut push = |f: &str| {
            if !requested.iter().any(|r| r == f) {
                requested.push(f.to_string());
            }
        };
        for &f in features {
            push(f);
        }
        let mut unique_pairs: Vec<(String, String)> = Vec::new();
        for &(x, y) in pairs {
            check_pair(x, y)?;
            push(x);
            push(y);
            let seen = unique_pairs
                .iter()
                .any(|(a, b)| (a == x && b == y) || (a == y && b == x));
            if !seen {
                unique_pairs.push((x.to_string(), y.to_string()));
            }
        }
        if requested.is_empty() {
            requested = self.catalog.feature_names().map(str::to_string).collect();
        }

        for f in &requested {
            self.catalog.check_against(f, data)?;
        }

        Ok(Request {
            features: requested,
            pairs: unique_pairs,
        })
    }

    fn draw_sample(&self, data: &DataFrame) -> Result<WorkingSample> {
        let mut n = self.config.n_instances;
        if n > data.height() {
            warn!(
                requested = n,
                available = data.height(),
                "sample size exceeds dataset, using every row"
            );
            n = data.height();
        }

        let mut rng = match self.config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        Ok(WorkingSample::new(sample_rows(data, n, &mut rng)?))
    }
}

fn check_pair(x: &str, y: &str) -> Result<()> {
    if x == y {
        return Err(PdpError::ConfigError(format!(
            "Pair ('{}', '{}') must name two different features",
            x, y
        )));
    }
    Ok(())
}
