use crate::Error;
use crate::TestContext;
use serde::Deserialize;

/// the `[allclose]` table
#[derive(Deserialize, Debug, Default)]
pub struct Section {
    /// one override per line: `testname key=value ... # comment`
    #[serde(default)]
    pub tolerances: String,
}

/// tolerance configuration, usually a table in a shared project file
#[derive(Deserialize, Debug, Default)]
pub struct Config {
    #[serde(default)]
    pub allclose: Section,
}

impl Config {
    /// parse a TOML document
    ///
    /// Tables other than `[allclose]` are ignored, unknown keys inside it
    /// are an error.
    pub fn from_toml(buffer: &str) -> Result<Self, Error> {
        let value: toml::Value = toml::from_str(buffer)?;
        let mut has_unsupported: bool = false;
        let cfg: Config = serde_ignored::deserialize(value, |path| {
            let path = path.to_string();
            if path.starts_with("allclose.") {
                log::warn!("unsupported config: {:?}", path);
                has_unsupported = true;
            } else {
                log::debug!("ignoring config: {:?}", path);
            }
        })?;
        if has_unsupported {
            return Err(Error::UnsupportedConfigs);
        }

        Ok(cfg)
    }

    /// context for a test, with the overrides that apply to it
    pub fn context<N: Into<String>>(&self, test_id: N) -> Result<TestContext, Error> {
        TestContext::resolve(test_id, &self.allclose.tolerances)
    }
}

/// load config file
pub fn load<P: AsRef<std::path::Path>>(filename: P) -> Result<Config, Error> {
    let buffer = std::fs::read_to_string(filename.as_ref())?;
    Config::from_toml(&buffer)
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::Override;

    const CONFIG: &str = r#"
[package]
name = "something"

[allclose]
tolerances = """
test_a atol=0.1
test_a atol=0.2  # second check
test_b xtol=2 equal_nan=true
"""
"#;

    #[test]
    fn parse() {
        let cfg = Config::from_toml(CONFIG).unwrap();

        let ctx = cfg.context("tests/a.rs::test_a").unwrap();
        assert_eq!(ctx.test_id(), "tests/a.rs::test_a");
        assert_eq!(
            ctx.overrides(),
            &[
                Override {
                    atol: Some(0.1),
                    ..Override::default()
                },
                Override {
                    atol: Some(0.2),
                    ..Override::default()
                },
            ]
        );

        let ctx = cfg.context("tests/a.rs::test_b").unwrap();
        assert_eq!(
            ctx.overrides(),
            &[Override {
                xtol: Some(2),
                equal_nan: Some(true),
                ..Override::default()
            }]
        );

        assert!(cfg.context("tests/a.rs::test_c").unwrap().overrides().is_empty());
    }

    #[test]
    fn empty() {
        let cfg = Config::from_toml("").unwrap();
        assert!(cfg.allclose.tolerances.is_empty());
        assert!(cfg.context("a").unwrap().overrides().is_empty());
    }

    #[test]
    fn unsupported() {
        assert!(matches!(
            Config::from_toml("[allclose]\ntolerance = \"a atol=1\"\n"),
            Err(Error::UnsupportedConfigs)
        ));
        assert!(matches!(
            Config::from_toml("[allclose]\ntolerances = 5\n"),
            Err(Error::TomlDe(_))
        ));
    }

    #[test]
    fn bad_tolerances() {
        let cfg = Config::from_toml("[allclose]\ntolerances = \"a rtol=x\"\n").unwrap();
        assert!(matches!(
            cfg.context("a"),
            Err(Error::InvalidValue { key, .. }) if key == "rtol"
        ));
    }

    #[test]
    fn load_file() {
        let path =
            std::env::temp_dir().join(format!("allclose-config-{}.toml", std::process::id()));
        std::fs::write(&path, CONFIG).unwrap();
        let cfg = load(&path);
        std::fs::remove_file(&path).unwrap();

        assert!(cfg.unwrap().allclose.tolerances.contains("test_b"));
        assert!(matches!(
            load(std::env::temp_dir().join("allclose-does-not-exist.toml")),
            Err(Error::Io(_))
        ));
    }
}
