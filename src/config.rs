use crate::core::{Result, validate_field_name};
use std::env;

pub const DEFAULT_FIELD_NAME: &str = "PartCount";

pub const FIELD_ENV: &str = "PARTCOUNT_FIELD";
pub const OVERWRITE_ENV: &str = "PARTCOUNT_OVERWRITE";
pub const REPORT_ONLY_ENV: &str = "PARTCOUNT_REPORT_ONLY";

/// Options for one part-count run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CountOptions {
    /// Name of the SHORT field that receives the part counts
    pub field_name: String,

    /// Replace the field if it already exists
    pub overwrite: bool,

    /// Only report how many multipart features there are
    pub report_only: bool,
}

impl Default for CountOptions {
    fn default() -> Self {
        Self {
            field_name: DEFAULT_FIELD_NAME.to_string(),
            overwrite: false,
            report_only: false,
        }
    }
}

impl CountOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the output field name
    pub fn field_name(mut self, name: &str) -> Self {
        self.field_name = name.to_string();
        self
    }

    /// Allow an existing output field to be replaced
    pub fn overwrite(mut self, overwrite: bool) -> Self {
        self.overwrite = overwrite;
        self
    }

    /// Skip the schema change and row updates
    pub fn report_only(mut self, report_only: bool) -> Self {
        self.report_only = report_only;
        self
    }

    pub fn validate(&self) -> Result<()> {
        validate_field_name(&self.field_name)
    }
}

/// Defaults read from the environment. Command line flags take precedence.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Settings {
    pub field_name: Option<String>,
    pub overwrite: bool,
    pub report_only: bool,
}

impl Settings {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        Self {
            field_name: lookup(FIELD_ENV)
                .map(|name| name.trim().to_string())
                .filter(|name| !name.is_empty()),
            overwrite: lookup(OVERWRITE_ENV).is_some_and(|v| parse_flag(&v)),
            report_only: lookup(REPORT_ONLY_ENV).is_some_and(|v| parse_flag(&v)),
        }
    }

    /// Merge command line values over these settings.
    pub fn count_options(
        &self,
        field_name: Option<&str>,
        overwrite: bool,
        report_only: bool,
    ) -> CountOptions {
        let field_name = field_name
            .or(self.field_name.as_deref())
            .unwrap_or(DEFAULT_FIELD_NAME);

        CountOptions::new()
            .field_name(field_name)
            .overwrite(overwrite || self.overwrite)
            .report_only(report_only || self.report_only)
    }
}

fn parse_flag(value: &str) -> bool {
    matches!(
        value.trim().to_ascii_lowercase().as_str(),
        "1" | "true" | "yes" | "on"
    )
}
