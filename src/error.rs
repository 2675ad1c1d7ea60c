// THEORY:
// Errors are layered by the scope that absorbs them.
//
// 1.  `CheckError` belongs to one annotation; the pipeline turns it into an
//     ERROR finding.
// 2.  `ImageFetchError` belongs to one task; the pipeline logs it and skips
//     the task.
// 3.  `SourceError`, `ReportError` and `ConfigError` end the run and reach
//     `main` through `AuditError`.

/// Why a single annotation check could not produce a verdict.
#[derive(Debug, thiserror::Error)]
pub enum CheckError {
    /// The box lies outside the image, has a non-positive size, or the image
    /// itself has no area.
    #[error("invalid geometry: {0}")]
    InvalidGeometry(String),

    /// The cropped region cannot be split into the requested number of clusters.
    #[error("cannot cluster {points} pixel(s) into {clusters} cluster(s)")]
    Clustering { points: usize, clusters: usize },
}

/// The transport-level cause of a failed image fetch.
#[derive(Debug, thiserror::Error)]
pub enum FetchFailure {
    #[error(transparent)]
    Request(#[from] reqwest::Error),

    #[error("server answered with status {0}")]
    Status(u16),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// Errors from downloading and decoding a task image.
#[derive(Debug, thiserror::Error)]
pub enum ImageFetchError {
    /// The bytes could not be retrieved.
    #[error("failed to fetch image {url}: {source}")]
    Fetch {
        url: String,
        #[source]
        source: FetchFailure,
    },

    /// The bytes were retrieved but are not a decodable image.
    #[error("failed to decode image {url}: {source}")]
    Decode {
        url: String,
        #[source]
        source: image::ImageError,
    },
}

/// Errors from the task source. These end the run.
#[derive(Debug, thiserror::Error)]
pub enum SourceError {
    /// The HTTP request itself failed (network, DNS, TLS, body decoding).
    #[error("task listing request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// The annotation service returned a non-2xx status code.
    #[error("task listing API error ({status}): {body}")]
    Api { status: u16, body: String },

    #[error("failed to read task dump: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse task dump: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Errors from the report sink. These end the run.
#[derive(Debug, thiserror::Error)]
pub enum ReportError {
    #[error("failed to write report row: {0}")]
    Csv(#[from] csv::Error),

    #[error("failed to write report: {0}")]
    Io(#[from] std::io::Error),
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("environment variable {0} is required")]
    Missing(&'static str),

    #[error("environment variable {var} has invalid value {value:?}")]
    Invalid { var: &'static str, value: String },
}

/// Top-level error returned from a run.
#[derive(Debug, thiserror::Error)]
pub enum AuditError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Source(#[from] SourceError),

    #[error(transparent)]
    Report(#[from] ReportError),
}
