#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Pattern(#[from] globset::Error),
    #[error(transparent)]
    Shape(#[from] ndarray::ShapeError),
    #[error(transparent)]
    TomlDe(#[from] toml::de::Error),

    #[error("can't convert float")]
    FloatConversion,
    #[error("invalid value for {key}: {value:?}")]
    InvalidValue { key: String, value: String },
    #[error("malformed tolerance entry {0:?}, expected key=value")]
    MalformedEntry(String),
    #[error("unknown tolerance parameter {0:?}")]
    UnknownParameter(String),
    #[error("unsupported configs")]
    UnsupportedConfigs,
}
