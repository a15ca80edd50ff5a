#[macro_export]
macro_rules! unwrap_opt_or {
    ($opt:expr, $default:expr) => {
        match $opt {
            Some(x) => x,
            None => $default,
        }
    };
}

/// check two arrays within a [TestContext]
///
/// Named arguments replace the defaults of [Params]:
/// `allclose!(ctx, y, x, atol = 0.1, xtol = 2)`
#[macro_export]
macro_rules! allclose {
    ($ctx:expr, $a:expr, $b:expr $(, $key:ident = $value:expr)* $(,)?) => {
        $ctx.allclose(
            &$a,
            &$b,
            $crate::Params {
                $($key: $value,)*
                ..$crate::Params::default()
            },
        )
    };
}

mod compare;
pub use compare::{broadcast_shape, compare, rms, Comparison, Mismatch};

pub mod config;

mod context;
pub use context::TestContext;

mod error;
pub use error::Error;

pub mod overrides;
pub use overrides::{resolve, OverrideEntry};

mod params;
pub use params::{Override, Params};

pub mod report;
pub use report::{report, Metric, MetricKind, Outcome, Summary, TestResult};
