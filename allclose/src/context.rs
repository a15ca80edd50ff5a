use crate::report::Metric;
use crate::report::MetricKind;
use crate::report::Outcome;
use crate::report::TestResult;
use crate::Error;
use crate::Override;
use crate::OverrideEntry;
use crate::Params;

/// state of `allclose` checks within one test
///
/// Every check consumes the next configured override. Once all overrides
/// have been used, the last one applies to all remaining checks.
#[derive(Debug)]
pub struct TestContext {
    test_id: String,
    overrides: Vec<Override>,
    call_count: usize,
    metrics: Vec<Metric>,
}

impl TestContext {
    pub fn new<N: Into<String>>(test_id: N, overrides: Vec<OverrideEntry>) -> Self {
        Self {
            test_id: test_id.into(),
            overrides: overrides.into_iter().map(|entry| entry.params).collect(),
            call_count: 0,
            metrics: Vec::new(),
        }
    }

    /// create a context with the overrides from a tolerance config
    pub fn resolve<N: Into<String>>(test_id: N, config: &str) -> Result<Self, Error> {
        let test_id = test_id.into();
        let overrides = crate::resolve(&test_id, config)?;
        Ok(Self::new(test_id, overrides))
    }

    pub fn test_id(&self) -> &str {
        &self.test_id
    }

    pub fn overrides(&self) -> &[Override] {
        &self.overrides
    }

    /// number of checks done so far
    pub fn call_count(&self) -> usize {
        self.call_count
    }

    pub fn metrics(&self) -> &[Metric] {
        &self.metrics
    }

    /// apply the override for the next check
    ///
    /// This counts as a check, even if there are no overrides.
    pub fn effective_params(&mut self, params: Params) -> Params {
        let ret = if self.overrides.is_empty() {
            params
        } else {
            let id = self.call_count.min(self.overrides.len() - 1);
            log::debug!(
                "{}: check {} uses override {} ({})",
                self.test_id,
                self.call_count,
                id,
                self.overrides[id]
            );
            params.with_override(&self.overrides[id])
        };

        self.call_count += 1;
        ret
    }

    fn record(&mut self, kind: MetricKind, value: f64) {
        log::debug!("{}: {:?} rmse {}", self.test_id, kind, value);
        self.metrics.push(Metric { kind, value });
    }

    /// check if two arrays are close
    ///
    /// `params` are the values given at the call site; the configured
    /// override for this check replaces them. On failure the first
    /// `print_fail` mismatches are printed to stdout.
    pub fn allclose<A, Sa, Sb, Da, Db>(
        &mut self,
        a: &ndarray::ArrayBase<Sa, Da>,
        b: &ndarray::ArrayBase<Sb, Db>,
        params: Params,
    ) -> Result<bool, Error>
    where
        A: num_traits::Float + std::fmt::Display,
        Sa: ndarray::Data<Elem = A>,
        Sb: ndarray::Data<Elem = A>,
        Da: ndarray::Dimension,
        Db: ndarray::Dimension,
    {
        let params = self.effective_params(params);
        let res = crate::compare(a, b, &params)?;

        if params.record_rmse {
            if let Some(rmse) = res.rmse {
                self.record(MetricKind::Absolute, rmse);
            }
            if let Some(rel_rmse) = res.rel_rmse {
                self.record(MetricKind::Relative, rel_rmse);
            }
        }

        if !res.close && params.print_fail > 0 {
            println!("{}", res);
        }

        Ok(res.close)
    }

    /// hand the recorded metrics over for reporting
    pub fn finish(self, outcome: Outcome) -> TestResult {
        TestResult {
            test_id: self.test_id,
            outcome,
            metrics: self.metrics,
        }
    }
}
