use {std::path::PathBuf, thiserror::Error};

pub type Result<T> = std::result::Result<T, Error>;

/// Everything that can abort a run. None of these are recoverable.
#[derive(Error, Debug)]
pub enum Error {
    // Configuration
    #[error("projection code {code} not supported")]
    UnsupportedProjection { code: i64 },

    #[error("{found} soil layers not supported, expected 4")]
    SoilLayerCount { found: usize },

    #[error("depth structure {depths:?} of soil layers not supported")]
    SoilLayerDepths { depths: Vec<f32> },

    #[error("memory order of {variable} not compatible: expected {expected:?}, found {found:?}")]
    MemoryOrder {
        variable: String,
        expected: Vec<String>,
        found: Vec<String>,
    },

    #[error("{variable} has shape {found:?}, expected {expected:?}")]
    Shape {
        variable: String,
        expected: Vec<usize>,
        found: Vec<usize>,
    },

    #[error("dimension {0} of source grid is empty")]
    EmptyDimension(String),

    #[error("variable {0} not found in source grid")]
    MissingVariable(String),

    #[error("dimension {0} not found in source grid")]
    MissingDimension(String),

    #[error("global attribute {0} not found or not numeric")]
    MissingAttribute(String),

    #[error("time stamp {index} not available")]
    Timestamp { index: usize },

    #[error("{field} value {value:?} does not fit in {width} bytes")]
    TextTooLong {
        field: &'static str,
        value: String,
        width: usize,
    },

    // I/O
    #[error("failed to access {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to write {field} at {level} to {path}: {source}")]
    WriteRecord {
        path: PathBuf,
        field: String,
        level: f32,
        source: std::io::Error,
    },

    #[error(transparent)]
    Stream(#[from] std::io::Error),

    // Format
    #[error("{block} block length marker is {found}, expected {expected}")]
    BlockMarker {
        block: &'static str,
        expected: i32,
        found: i32,
    },

    #[error("stream ended inside {block} block")]
    Truncated { block: &'static str },

    #[error("unrecognized projection tag {tag}")]
    UnknownProjectionTag { tag: i32 },

    #[error("field {field} not found in record stream")]
    FieldNotFound { field: String },

    #[error("record for {field} has invalid dimensions {nx}x{ny}")]
    Dimensions { field: String, nx: i32, ny: i32 },
}

impl Error {
    pub(crate) fn io<P: Into<PathBuf>>(path: P) -> impl FnOnce(std::io::Error) -> Self {
        let path = path.into();
        move |source| Error::Io { path, source }
    }
}
