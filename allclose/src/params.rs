use crate::Error;

/// tolerances and reporting options of a single comparison
#[derive(Clone, Debug, PartialEq)]
pub struct Params {
    /// relative tolerance, scaled by the magnitude of the reference value
    pub rtol: f64,
    /// absolute tolerance
    pub atol: f64,
    /// number of positions along the first axis an element may be shifted by
    pub xtol: usize,
    /// treat NaN as equal to NaN
    pub equal_nan: bool,
    /// maximum number of mismatches to print on failure, 0 disables printing
    pub print_fail: usize,
    /// record the error metrics in the test context
    pub record_rmse: bool,
}

impl Default for Params {
    fn default() -> Self {
        Self {
            rtol: 1e-5,
            atol: 1e-8,
            xtol: 0,
            equal_nan: false,
            print_fail: 5,
            record_rmse: true,
        }
    }
}

impl Params {
    /// return a copy with every parameter that is set in `ovr` replaced
    pub fn with_override(&self, ovr: &Override) -> Self {
        Self {
            rtol: ovr.rtol.unwrap_or(self.rtol),
            atol: ovr.atol.unwrap_or(self.atol),
            xtol: ovr.xtol.unwrap_or(self.xtol),
            equal_nan: ovr.equal_nan.unwrap_or(self.equal_nan),
            print_fail: ovr.print_fail.unwrap_or(self.print_fail),
            record_rmse: ovr.record_rmse.unwrap_or(self.record_rmse),
        }
    }
}

/// parameters set by one line of the tolerance config
///
/// Parameters that are `None` keep the value passed at the call site.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Override {
    pub rtol: Option<f64>,
    pub atol: Option<f64>,
    pub xtol: Option<usize>,
    pub equal_nan: Option<bool>,
    pub print_fail: Option<usize>,
    pub record_rmse: Option<bool>,
}

fn parse_value<T: std::str::FromStr>(key: &str, value: &str) -> Result<T, Error> {
    value.parse().map_err(|_| Error::InvalidValue {
        key: key.to_string(),
        value: value.to_string(),
    })
}

fn parse_bool(key: &str, value: &str) -> Result<bool, Error> {
    match value.to_ascii_lowercase().as_str() {
        "true" | "1" => Ok(true),
        "false" | "0" => Ok(false),
        _ => Err(Error::InvalidValue {
            key: key.to_string(),
            value: value.to_string(),
        }),
    }
}

impl Override {
    /// parse a `key=value` token and store it
    pub fn set(&mut self, token: &str) -> Result<(), Error> {
        let (key, value) = token
            .split_once('=')
            .ok_or_else(|| Error::MalformedEntry(token.to_string()))?;

        match key {
            "atol" => self.atol = Some(parse_value(key, value)?),
            "rtol" => self.rtol = Some(parse_value(key, value)?),
            "xtol" => self.xtol = Some(parse_value(key, value)?),
            "equal_nan" => self.equal_nan = Some(parse_bool(key, value)?),
            "print_fail" => self.print_fail = Some(parse_value(key, value)?),
            "record_rmse" => self.record_rmse = Some(parse_bool(key, value)?),
            _ => return Err(Error::UnknownParameter(key.to_string())),
        }

        Ok(())
    }

    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

impl std::fmt::Display for Override {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut parts = Vec::new();
        if let Some(v) = self.atol {
            parts.push(format!("atol={}", v));
        }
        if let Some(v) = self.rtol {
            parts.push(format!("rtol={}", v));
        }
        if let Some(v) = self.xtol {
            parts.push(format!("xtol={}", v));
        }
        if let Some(v) = self.equal_nan {
            parts.push(format!("equal_nan={}", v));
        }
        if let Some(v) = self.print_fail {
            parts.push(format!("print_fail={}", v));
        }
        if let Some(v) = self.record_rmse {
            parts.push(format!("record_rmse={}", v));
        }

        write!(f, "{}", parts.join(" "))
    }
}
