use anyhow::Context as _;
use structopt::StructOpt;

#[derive(Debug, StructOpt)]
struct ResolveOpt {
    /// TOML file with an `[allclose]` table
    config: std::path::PathBuf,
    /// full test id, e.g. `tests/filter.rs::test_step`
    test_id: String,
}

fn resolve(opt: &ResolveOpt) -> anyhow::Result<()> {
    let cfg = allclose::config::load(&opt.config)
        .with_context(|| format!("can't load config {:?}", opt.config))?;
    let entries = allclose::resolve(&opt.test_id, &cfg.allclose.tolerances)
        .with_context(|| format!("can't resolve tolerances for {}", opt.test_id))?;

    if entries.is_empty() {
        log::info!("no tolerances configured for {}", opt.test_id);
    }
    for entry in &entries {
        if entry.params.is_empty() {
            println!("{}", entry.pattern);
        } else {
            println!("{} {}", entry.pattern, entry.params);
        }
    }

    Ok(())
}

#[derive(Debug, StructOpt)]
struct ReportOpt {
    /// JSON array of test results
    results: std::path::PathBuf,
    /// summarize the absolute instead of the relative RMSE
    #[structopt(long)]
    absolute: bool,
}

fn report(opt: &ReportOpt) -> anyhow::Result<()> {
    let file = std::fs::File::open(&opt.results)
        .with_context(|| format!("can't open {:?}", opt.results))?;
    let results: Vec<allclose::TestResult> =
        serde_json::from_reader(std::io::BufReader::new(file)).context("can't read results")?;
    log::debug!("read {} test results", results.len());

    if let Some(summary) = allclose::report(&results, !opt.absolute) {
        println!("{}", summary);
    }

    Ok(())
}

#[derive(Debug, StructOpt)]
struct CompareOpt {
    /// JSON array of numbers
    a: std::path::PathBuf,
    /// JSON array of numbers, reference for `rtol`
    b: std::path::PathBuf,
    #[structopt(long, default_value = "1e-5")]
    rtol: f64,
    #[structopt(long, default_value = "1e-8")]
    atol: f64,
    #[structopt(long, default_value = "0")]
    xtol: usize,
    #[structopt(long)]
    equal_nan: bool,
    #[structopt(long, default_value = "5")]
    print_fail: usize,
}

fn load_array(path: &std::path::Path) -> anyhow::Result<ndarray::Array1<f64>> {
    let file = std::fs::File::open(path).with_context(|| format!("can't open {:?}", path))?;
    let values: Vec<f64> = serde_json::from_reader(std::io::BufReader::new(file))
        .with_context(|| format!("can't read array from {:?}", path))?;
    Ok(ndarray::Array1::from(values))
}

fn compare(opt: &CompareOpt) -> anyhow::Result<bool> {
    let a = load_array(&opt.a)?;
    let b = load_array(&opt.b)?;
    let params = allclose::Params {
        rtol: opt.rtol,
        atol: opt.atol,
        xtol: opt.xtol,
        equal_nan: opt.equal_nan,
        print_fail: opt.print_fail,
        record_rmse: true,
    };

    let mut ctx = allclose::TestContext::new("allclose_tool::compare", vec![]);
    let close = ctx.allclose(&a, &b, params)?;

    for metric in ctx.metrics() {
        println!("{:?} RMSE: {}", metric.kind, metric.value);
    }

    Ok(close)
}

#[derive(Debug, StructOpt)]
enum Opt {
    /// print the tolerance overrides that apply to a test
    Resolve(ResolveOpt),
    /// summarize the RMSE recorded by passed tests
    Report(ReportOpt),
    /// compare two arrays
    Compare(CompareOpt),
}

fn main() -> anyhow::Result<()> {
    env_logger::init();

    let opt = Opt::from_args();

    match &opt {
        Opt::Resolve(o) => resolve(o),
        Opt::Report(o) => report(o),
        Opt::Compare(o) => {
            if !compare(o)? {
                std::process::exit(1);
            }
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn args() {
        let opt = Opt::from_iter(vec![
            "allclose_tool",
            "compare",
            "a.json",
            "b.json",
            "--xtol",
            "2",
        ]);
        match opt {
            Opt::Compare(o) => {
                assert_eq!(o.xtol, 2);
                assert_eq!(o.print_fail, 5);
                assert_eq!(o.rtol, 1e-5);
                assert!(!o.equal_nan);
            }
            _ => panic!("wrong subcommand"),
        }

        let opt = Opt::from_iter(vec!["allclose_tool", "report", "r.json", "--absolute"]);
        assert!(matches!(opt, Opt::Report(ReportOpt { absolute: true, .. })));
    }

    #[test]
    fn compare_files() {
        let dir = std::env::temp_dir();
        let a = dir.join(format!("allclose-tool-a-{}.json", std::process::id()));
        let b = dir.join(format!("allclose-tool-b-{}.json", std::process::id()));
        std::fs::write(&a, "[1.0, 2.0, 3.0]").unwrap();
        std::fs::write(&b, "[1.0, 2.0, 3.5]").unwrap();

        let opt = |atol| CompareOpt {
            a: a.clone(),
            b: b.clone(),
            rtol: 0.0,
            atol,
            xtol: 0,
            equal_nan: false,
            print_fail: 5,
        };
        let strict = compare(&opt(0.1));
        let loose = compare(&opt(1.0));

        std::fs::remove_file(&a).unwrap();
        std::fs::remove_file(&b).unwrap();
        assert!(!strict.unwrap());
        assert!(loose.unwrap());
    }
}
