use thiserror::Error;

#[derive(Debug, Error)]
pub enum SimError {
    /// The domain needs a solid ring around at least one fluid cell and room
    /// for the three-sample inlet.
    #[error("domain length must be at least 3 cells, got {0}")]
    InvalidDomainLength(usize),
    #[error("{name} = {value} is outside [{min}, {max}]")]
    OutOfRange {
        name: &'static str,
        value: f64,
        min: f64,
        max: f64,
    },
    #[error("failed to read or write {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse config: {0}")]
    Yaml(#[from] serde_yaml::Error),
    #[error("failed to encode png: {0}")]
    Png(#[from] png::EncodingError),
}

impl SimError {
    pub(crate) fn io(path: &std::path::Path, source: std::io::Error) -> Self {
        Self::Io {
            path: path.display().to_string(),
            source,
        }
    }
}
