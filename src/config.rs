use crate::error::ConfigError;
use std::path::PathBuf;

pub const DEFAULT_API_URL: &str = "https://api.scale.com/v1";
pub const DEFAULT_PROJECT: &str = "Traffic Sign Detection";
pub const DEFAULT_OUTPUT_FILE_PATH: &str = "result.csv";
pub const DEFAULT_PAGE_SIZE: u32 = 100;

/// Audit configuration loaded from environment variables.
#[derive(Debug, Clone, PartialEq)]
pub struct AuditConfig {
    /// Annotation service API key. Required unless `tasks_file` is set.
    pub api_key: Option<String>,
    pub api_url: String,
    pub project: String,
    /// Read tasks from this JSON dump instead of the annotation service.
    pub tasks_file: Option<PathBuf>,
    pub output_path: PathBuf,
    /// Tasks requested per listing page.
    pub page_size: u32,
}

impl AuditConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var            | Default                    |
    /// |--------------------|----------------------------|
    /// | `SCALE_API_KEY`    | (none)                     |
    /// | `SCALE_API_URL`    | `https://api.scale.com/v1` |
    /// | `SCALE_PROJECT`    | `Traffic Sign Detection`   |
    /// | `TASKS_FILE`       | (none)                     |
    /// | `OUTPUT_FILE_PATH` | `result.csv`               |
    /// | `PAGE_SIZE`        | `100`                      |
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|var| std::env::var(var).ok())
    }

    /// Same as [`from_env`](Self::from_env), reading variables through `lookup`.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_empty = |var: &str| lookup(var).filter(|value| !value.trim().is_empty());

        let page_size = match non_empty("PAGE_SIZE") {
            None => DEFAULT_PAGE_SIZE,
            Some(value) => value
                .trim()
                .parse::<u32>()
                .ok()
                .filter(|size| *size > 0)
                .ok_or(ConfigError::Invalid {
                    var: "PAGE_SIZE",
                    value,
                })?,
        };

        let config = Self {
            api_key: non_empty("SCALE_API_KEY"),
            api_url: non_empty("SCALE_API_URL").unwrap_or_else(|| DEFAULT_API_URL.into()),
            project: non_empty("SCALE_PROJECT").unwrap_or_else(|| DEFAULT_PROJECT.into()),
            tasks_file: non_empty("TASKS_FILE").map(PathBuf::from),
            output_path: non_empty("OUTPUT_FILE_PATH")
                .unwrap_or_else(|| DEFAULT_OUTPUT_FILE_PATH.into())
                .into(),
            page_size,
        };

        if config.api_key.is_none() && config.tasks_file.is_none() {
            return Err(ConfigError::Missing("SCALE_API_KEY"));
        }
        Ok(config)
    }
}
