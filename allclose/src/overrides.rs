use crate::Error;
use crate::Override;

/// one config line that applies to a test
#[derive(Clone, Debug, PartialEq)]
pub struct OverrideEntry {
    /// escaped glob pattern, including the leading wildcard
    pub pattern: String,
    pub params: Override,
}

/// turn a bare test name from the config into a glob pattern
///
/// A leading `*` lets `testname` match `path/to/file.rs::testname`.
/// Brackets, braces and `?` match literally, so `test[1-2]` selects
/// exactly that parametrization. `*` keeps its meaning.
pub fn test_pattern(name: &str) -> String {
    let mut pattern = String::with_capacity(name.len() + 1);
    pattern.push('*');

    for c in name.chars() {
        match c {
            '[' | ']' | '?' | '{' | '}' => {
                pattern.push('[');
                pattern.push(c);
                pattern.push(']');
            }
            _ => pattern.push(c),
        }
    }

    pattern
}

fn compile(pattern: &str) -> Result<globset::GlobMatcher, Error> {
    Ok(globset::GlobBuilder::new(pattern)
        .literal_separator(false)
        .backslash_escape(false)
        .build()?
        .compile_matcher())
}

fn parse_line(line: &str) -> Result<Option<OverrideEntry>, Error> {
    let mut tokens = line.split_whitespace();
    let name = unwrap_opt_or!(tokens.next(), return Ok(None));

    let mut params = Override::default();
    for token in tokens {
        if token.starts_with('#') {
            break;
        }
        params.set(token)?;
    }

    Ok(Some(OverrideEntry {
        pattern: test_pattern(name),
        params,
    }))
}

/// parse a tolerance config and return the entries that apply to `test_id`
///
/// Only the first pattern that matches is used. All further lines with
/// exactly that pattern are added in config order, lines with other
/// patterns are ignored even if they match too.
/// Every line is parsed, so a bad line fails resolution for all tests.
pub fn resolve(test_id: &str, config: &str) -> Result<Vec<OverrideEntry>, Error> {
    let mut locked: Option<String> = None;
    let mut ret = Vec::new();

    for line in config.lines() {
        let entry = unwrap_opt_or!(parse_line(line)?, continue);

        let accept = match &locked {
            Some(pattern) => *pattern == entry.pattern,
            None => compile(&entry.pattern)?.is_match(test_id),
        };
        if !accept {
            continue;
        }

        if locked.is_none() {
            log::debug!("{}: using tolerances of {:?}", test_id, entry.pattern);
            locked = Some(entry.pattern.clone());
        }
        ret.push(entry);
    }

    Ok(ret)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn atol(v: f64) -> Override {
        Override {
            atol: Some(v),
            ..Override::default()
        }
    }

    fn params(entries: Vec<OverrideEntry>) -> Vec<Override> {
        entries.into_iter().map(|e| e.params).collect()
    }

    #[test]
    fn escape() {
        assert_eq!(test_pattern("test_a"), "*test_a");
        assert_eq!(test_pattern("test_a[1-2]"), "*test_a[[]1-2[]]");
        assert_eq!(test_pattern("test_?*"), "*test_[?]*");
    }

    #[test]
    fn first_pattern_wins() {
        let cfg = "foo atol=1\nfoo atol=2\nbar atol=9";
        assert_eq!(
            params(resolve("tests/a.rs::foo", cfg).unwrap()),
            vec![atol(1.0), atol(2.0)]
        );

        // `*oo` matches as well, but `foo` was matched first
        let cfg = "foo atol=1\n*oo atol=5\nfoo atol=2";
        assert_eq!(
            params(resolve("tests/a.rs::foo", cfg).unwrap()),
            vec![atol(1.0), atol(2.0)]
        );

        let cfg = "*oo atol=5\nfoo atol=1";
        assert_eq!(
            params(resolve("tests/a.rs::foo", cfg).unwrap()),
            vec![atol(5.0)]
        );
    }

    #[test]
    fn suffix_only() {
        let cfg = "foo atol=1";
        assert!(resolve("tests/a.rs::foobar", cfg).unwrap().is_empty());
        assert!(resolve("tests/a.rs::bar", cfg).unwrap().is_empty());
        assert_eq!(resolve("a.rs::foo", cfg).unwrap().len(), 1);
        assert_eq!(resolve("a.rs::barfoo", cfg).unwrap().len(), 1);
    }

    #[test]
    fn parametrized() {
        let cfg = "test_p[True] atol=0.1 rtol=0.2\ntest_p[False] atol=0.001 rtol=0.002";
        assert_eq!(
            params(resolve("a.rs::test_p[False]", cfg).unwrap()),
            vec![Override {
                atol: Some(0.001),
                rtol: Some(0.002),
                ..Override::default()
            }]
        );
        // brackets are literal, not a character class
        assert!(resolve("a.rs::test_pT", cfg).unwrap().is_empty());

        let cfg = "test_p* atol=3";
        assert_eq!(
            params(resolve("a.rs::test_p[False]", cfg).unwrap()),
            vec![atol(3.0)]
        );
        assert_eq!(resolve("a.rs::test_p", cfg).unwrap().len(), 1);
    }

    #[test]
    fn comments_and_blank_lines() {
        let cfg = "\n  \nfoo atol=1 # rtol=4\n\nfoo #atol=2\n";
        assert_eq!(
            params(resolve("a.rs::foo", cfg).unwrap()),
            vec![atol(1.0), Override::default()]
        );
    }

    #[test]
    fn separators() {
        let cfg = "mod/test_x atol=1";
        assert_eq!(resolve("crate/mod/test_x", cfg).unwrap().len(), 1);

        let cfg = r"a\b atol=1";
        assert_eq!(resolve(r"x::a\b", cfg).unwrap().len(), 1);
    }

    #[test]
    fn unknown_key() {
        let cfg = "foo atol=1\nbar foo=1";
        assert!(matches!(
            resolve("a.rs::foo", cfg),
            Err(Error::UnknownParameter(k)) if k == "foo"
        ));
        assert!(matches!(
            resolve("a.rs::foo", "foo atol"),
            Err(Error::MalformedEntry(_))
        ));
    }

    #[test]
    fn no_match() {
        assert!(resolve("a.rs::foo", "").unwrap().is_empty());
        assert!(resolve("a.rs::foo", "bar atol=1").unwrap().is_empty());
    }
}
