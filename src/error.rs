use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

/// Errors that stop reading a genbank file.
#[derive(Debug, Error)]
pub enum Error {
    /// The input could not be opened or read.
    #[error("unable to read {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// The genbank parser rejected the input.
    #[error("failed to parse genbank record {index} in {path}: {message}")]
    Parse {
        path: String,
        index: usize,
        message: String,
    },

    #[error("unsupported genetic code {0}, expected one of 1, 4, or 11")]
    UnsupportedTable(u8),
}

/// Problems with a single CDS. The feature is skipped and the rest of the
/// record is still processed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FeatureError {
    #[error("{record}: CDS {index} has no usable location")]
    MissingLocation { record: String, index: usize },

    #[error("{record}: CDS {index} starts after it ends ({start} > {end})")]
    InvertedBounds {
        record: String,
        index: usize,
        start: i64,
        end: i64,
    },

    #[error("{record}: CDS {index} spans {start}..{end} outside a sequence of length {len}")]
    OutOfBounds {
        record: String,
        index: usize,
        start: i64,
        end: i64,
        len: usize,
    },

    #[error("{record}: CDS {index} has an unknown strand")]
    UnknownStrand { record: String, index: usize },
}
