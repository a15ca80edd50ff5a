use serde::Deserialize;
use serde::Serialize;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MetricKind {
    /// root mean squared error
    Absolute,
    /// root mean squared error relative to the rms of the inputs
    Relative,
}

/// error metric recorded by one comparison
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Metric {
    pub kind: MetricKind,
    pub value: f64,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Outcome {
    Passed,
    Failed,
    Skipped,
}

/// what's left of a test once it finished
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TestResult {
    pub test_id: String,
    pub outcome: Outcome,
    /// metrics in the order they were recorded
    #[serde(default)]
    pub metrics: Vec<Metric>,
}

/// mean and population standard deviation of one kind of metric
#[derive(Clone, Debug, PartialEq)]
pub struct Summary {
    pub relative: bool,
    pub count: usize,
    pub mean: f64,
    pub std: f64,
}

impl std::fmt::Display for Summary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let rel = if self.relative { "relative " } else { "" };
        writeln!(f, "{}root mean squared error for allclose checks", rel)?;
        write!(
            f,
            "mean {}RMSE: {:.5} +/- {:.4} (std)",
            rel, self.mean, self.std
        )
    }
}

/// summarize the metrics recorded by all passed tests
///
/// Returns `None` if no passed test recorded a metric of the requested kind.
pub fn report(results: &[TestResult], relative: bool) -> Option<Summary> {
    let kind = if relative {
        MetricKind::Relative
    } else {
        MetricKind::Absolute
    };

    let values: Vec<f64> = results
        .iter()
        .filter(|result| result.outcome == Outcome::Passed)
        .flat_map(|result| result.metrics.iter())
        .filter(|metric| metric.kind == kind)
        .map(|metric| metric.value)
        .collect();
    if values.is_empty() {
        return None;
    }

    let count = values.len();
    let mean = values.iter().sum::<f64>() / count as f64;
    let var = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / count as f64;

    Some(Summary {
        relative,
        count,
        mean,
        std: var.sqrt(),
    })
}
